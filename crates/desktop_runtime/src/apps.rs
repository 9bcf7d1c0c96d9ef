//! Built-in application registry.
//!
//! Each app is a plain record plus an [`AppEntryPoint`] tag the shell dispatches on to
//! materialize the app inside a window frame.

use serde::{Deserialize, Serialize};

use crate::model::{AppId, WindowSize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
/// Capability the shell invokes to render an app's UI.
pub enum AppEntryPoint {
    Calculator,
    Notepad,
    Explorer,
    Terminal,
    Settings,
    Weather,
    Calendar,
    PdfViewer,
}

impl AppEntryPoint {
    /// Every built-in entry point in launcher order.
    pub const ALL: [AppEntryPoint; 8] = [
        Self::Calculator,
        Self::Notepad,
        Self::Explorer,
        Self::Terminal,
        Self::Settings,
        Self::Weather,
        Self::Calendar,
        Self::PdfViewer,
    ];

    pub fn app_id(self) -> &'static str {
        match self {
            Self::Calculator => "calculator",
            Self::Notepad => "notepad",
            Self::Explorer => "explorer",
            Self::Terminal => "terminal",
            Self::Settings => "settings",
            Self::Weather => "weather",
            Self::Calendar => "calendar",
            Self::PdfViewer => "pdfviewer",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Calculator => "Calculator",
            Self::Notepad => "Notepad",
            Self::Explorer => "File Explorer",
            Self::Terminal => "Terminal",
            Self::Settings => "Settings",
            Self::Weather => "Weather",
            Self::Calendar => "Calendar",
            Self::PdfViewer => "PDF Viewer",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Self::Calculator => "🧮",
            Self::Notepad => "📝",
            Self::Explorer => "📁",
            Self::Terminal => "💻",
            Self::Settings => "⚙️",
            Self::Weather => "🌤️",
            Self::Calendar => "📅",
            Self::PdfViewer => "📕",
        }
    }

    pub fn default_size(self) -> WindowSize {
        let (w, h) = match self {
            Self::Calculator => (320, 500),
            Self::Notepad => (600, 500),
            Self::Terminal => (700, 500),
            Self::Weather => (400, 600),
            Self::Explorer | Self::Settings | Self::Calendar | Self::PdfViewer => (800, 600),
        };
        WindowSize { w, h }
    }

    pub fn pinned_by_default(self) -> bool {
        !matches!(self, Self::Terminal | Self::Weather | Self::PdfViewer)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Desktop-visible application record.
pub struct AppDescriptor {
    pub id: AppId,
    pub display_name: String,
    pub icon: String,
    pub default_size: WindowSize,
    pub resizable: bool,
    pub entry_point: AppEntryPoint,
}

impl AppDescriptor {
    pub fn builtin(entry_point: AppEntryPoint) -> Self {
        Self {
            id: AppId::new(entry_point.app_id()),
            display_name: entry_point.title().to_string(),
            icon: entry_point.icon().to_string(),
            default_size: entry_point.default_size(),
            resizable: true,
            entry_point,
        }
    }
}

/// Returns the built-in registry in launcher order.
pub fn app_registry() -> Vec<AppDescriptor> {
    AppEntryPoint::ALL
        .iter()
        .copied()
        .map(AppDescriptor::builtin)
        .collect()
}

/// App ids pinned to the taskbar on first boot.
pub fn default_pinned_apps() -> Vec<AppId> {
    AppEntryPoint::ALL
        .iter()
        .copied()
        .filter(|entry| entry.pinned_by_default())
        .map(|entry| AppId::new(entry.app_id()))
        .collect()
}

/// Picks the viewer app for a file by mime type (PDFs open in the PDF viewer, anything else in
/// Notepad).
pub fn viewer_for_mime(mime_type: Option<&str>) -> AppEntryPoint {
    match mime_type {
        Some(mime) if mime.eq_ignore_ascii_case("application/pdf") => AppEntryPoint::PdfViewer,
        _ => AppEntryPoint::Notepad,
    }
}
