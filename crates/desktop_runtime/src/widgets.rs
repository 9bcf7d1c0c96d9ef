//! External-data widgets: current weather and news headlines.
//!
//! Fetching is delegated to provider traits so the runtime never performs network I/O itself.
//! Failures degrade to a placeholder report or an empty list plus a warning notification.

use chrono::{DateTime, Utc};
use leptos::logging;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::notifications::NotificationDraft;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
/// Widget data fetch failures.
pub enum WidgetError {
    /// The provider could not be reached or reported an error status.
    #[error("provider unavailable: {0}")]
    Unavailable(String),
    /// The provider answered with a payload that could not be decoded.
    #[error("malformed payload: {0}")]
    Malformed(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// One forecast entry.
pub struct ForecastDay {
    /// Day label ("Tomorrow", "Wed", ...).
    pub day: String,
    /// Temperature in degrees Celsius.
    pub temperature: i32,
    /// Short condition text.
    pub condition: String,
    /// Condition glyph.
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Current conditions plus a short forecast for one location.
pub struct WeatherReport {
    /// Location name the report is for.
    pub location: String,
    /// Temperature in degrees Celsius.
    pub temperature: i32,
    /// Short condition text.
    pub condition: String,
    /// Condition glyph.
    pub icon: String,
    /// Relative humidity percentage.
    #[serde(default)]
    pub humidity: Option<u8>,
    /// Wind speed in km/h.
    #[serde(default)]
    pub wind_speed: Option<u32>,
    /// Upcoming days.
    #[serde(default)]
    pub forecast: Vec<ForecastDay>,
}

impl WeatherReport {
    /// Static report shown when the provider fails.
    pub fn placeholder(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            temperature: 22,
            condition: "Sunny".to_string(),
            icon: "☀️".to_string(),
            humidity: None,
            wind_speed: None,
            forecast: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Ranked news article summary.
pub struct Headline {
    /// Publisher name.
    pub source: String,
    /// Article title.
    pub title: String,
    /// Optional teaser text.
    pub description: Option<String>,
    /// Article URL.
    pub url: String,
    /// Publication time.
    pub published_at: DateTime<Utc>,
}

/// Source of current weather data.
pub trait WeatherProvider {
    /// Fetches the report for `location`.
    fn fetch_weather(&self, location: &str) -> Result<WeatherReport, WidgetError>;
}

/// Source of ranked headlines.
pub trait HeadlinesProvider {
    /// Fetches at most `limit` headlines.
    fn fetch_headlines(&self, limit: usize) -> Result<Vec<Headline>, WidgetError>;
}

/// Weather provider backed by a raw JSON fetch callback.
pub struct JsonWeatherSource<F> {
    fetch: F,
}

impl<F> JsonWeatherSource<F>
where
    F: Fn(&str) -> Result<String, String>,
{
    /// Wraps a callback that returns the JSON payload for a location.
    pub fn new(fetch: F) -> Self {
        Self { fetch }
    }
}

impl<F> WeatherProvider for JsonWeatherSource<F>
where
    F: Fn(&str) -> Result<String, String>,
{
    fn fetch_weather(&self, location: &str) -> Result<WeatherReport, WidgetError> {
        let raw = (self.fetch)(location).map_err(WidgetError::Unavailable)?;
        decode_weather_payload(&raw)
    }
}

/// Headlines provider backed by a raw JSON fetch callback.
pub struct JsonHeadlinesSource<F> {
    fetch: F,
}

impl<F> JsonHeadlinesSource<F>
where
    F: Fn() -> Result<String, String>,
{
    /// Wraps a callback that returns a news-API style JSON payload.
    pub fn new(fetch: F) -> Self {
        Self { fetch }
    }
}

impl<F> HeadlinesProvider for JsonHeadlinesSource<F>
where
    F: Fn() -> Result<String, String>,
{
    fn fetch_headlines(&self, limit: usize) -> Result<Vec<Headline>, WidgetError> {
        let raw = (self.fetch)().map_err(WidgetError::Unavailable)?;
        decode_headlines_payload(&raw, limit)
    }
}

/// Decodes a weather JSON payload.
///
/// # Errors
///
/// Returns [`WidgetError::Malformed`] when the payload does not match [`WeatherReport`].
pub fn decode_weather_payload(raw: &str) -> Result<WeatherReport, WidgetError> {
    serde_json::from_str(raw).map_err(|e| WidgetError::Malformed(e.to_string()))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewsPayload {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    articles: Vec<NewsArticle>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewsArticle {
    source: NewsSource,
    title: String,
    #[serde(default)]
    description: Option<String>,
    url: String,
    published_at: DateTime<Utc>,
}

#[derive(Deserialize)]
struct NewsSource {
    name: String,
}

/// Decodes a news-API style payload and keeps the first `limit` articles.
///
/// # Errors
///
/// Returns [`WidgetError::Unavailable`] for a non-`ok` status and [`WidgetError::Malformed`]
/// when the payload cannot be decoded.
pub fn decode_headlines_payload(raw: &str, limit: usize) -> Result<Vec<Headline>, WidgetError> {
    let payload: NewsPayload =
        serde_json::from_str(raw).map_err(|e| WidgetError::Malformed(e.to_string()))?;
    if payload.status != "ok" {
        return Err(WidgetError::Unavailable(
            payload.message.unwrap_or(payload.status),
        ));
    }
    Ok(payload
        .articles
        .into_iter()
        .take(limit)
        .map(|article| Headline {
            source: article.source.name,
            title: article.title,
            description: article.description,
            url: article.url,
            published_at: article.published_at,
        })
        .collect())
}

/// Latest widget data held by the runtime.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WidgetData {
    /// Last weather report, placeholder included.
    pub weather: Option<WeatherReport>,
    /// Last headline list.
    pub headlines: Vec<Headline>,
}

/// Fetches weather, falling back to [`WeatherReport::placeholder`] with a warning on failure.
pub fn resolve_weather(
    provider: &dyn WeatherProvider,
    location: &str,
) -> (WeatherReport, Option<NotificationDraft>) {
    match provider.fetch_weather(location) {
        Ok(report) => (report, None),
        Err(err) => {
            logging::warn!("weather refresh failed: {err}");
            (
                WeatherReport::placeholder(location),
                Some(NotificationDraft::warning(
                    "Weather Widget",
                    "Could not fetch weather data",
                )),
            )
        }
    }
}

/// Fetches headlines, falling back to an empty list with a warning on failure.
pub fn resolve_headlines(
    provider: &dyn HeadlinesProvider,
    limit: usize,
) -> (Vec<Headline>, Option<NotificationDraft>) {
    match provider.fetch_headlines(limit) {
        Ok(headlines) => (headlines, None),
        Err(err) => {
            logging::warn!("headlines refresh failed: {err}");
            (
                Vec::new(),
                Some(NotificationDraft::warning(
                    "News Widget",
                    "Could not fetch latest news",
                )),
            )
        }
    }
}
