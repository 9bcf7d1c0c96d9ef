use std::fmt;

use serde::{Deserialize, Serialize};

use crate::apps::{app_registry, default_pinned_apps, AppDescriptor};

pub const DEFAULT_WALLPAPER: &str = "/wallpapers/default.jpg";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WindowId(pub u64);

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AppId(pub String);

impl AppId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AppId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowPosition {
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowSize {
    pub w: i32,
    pub h: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowRect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl WindowRect {
    pub fn at(position: WindowPosition, size: WindowSize) -> Self {
        Self {
            x: position.x,
            y: position.y,
            w: size.w,
            h: size.h,
        }
    }

    pub fn position(self) -> WindowPosition {
        WindowPosition {
            x: self.x,
            y: self.y,
        }
    }

    pub fn size(self) -> WindowSize {
        WindowSize {
            w: self.w,
            h: self.h,
        }
    }
}

/// One open application instance.
///
/// `rect` keeps the restored geometry while `maximized` is set; the rendered frame comes from
/// [`crate::window_manager::rendered_rect`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowRecord {
    pub id: WindowId,
    pub app_id: AppId,
    pub title: String,
    pub icon: String,
    pub rect: WindowRect,
    pub z_index: u32,
    pub is_focused: bool,
    pub minimized: bool,
    pub maximized: bool,
    pub resizable: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    Light,
    Dark,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IconSize {
    Small,
    #[default]
    Medium,
    Large,
}

impl IconSize {
    pub fn label(self) -> &'static str {
        match self {
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOption {
    #[default]
    Name,
    Size,
    Type,
    Date,
}

impl SortOption {
    pub fn label(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Size => "size",
            Self::Type => "type",
            Self::Date => "date",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewSettings {
    pub icon_size: IconSize,
    pub auto_arrange: bool,
    pub align_to_grid: bool,
    pub show_icons: bool,
    pub sort_by: SortOption,
    pub sort_direction: SortDirection,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            icon_size: IconSize::Medium,
            auto_arrange: false,
            align_to_grid: true,
            show_icons: true,
            sort_by: SortOption::Name,
            sort_direction: SortDirection::Asc,
        }
    }
}

/// Partial update applied by [`crate::DesktopAction::UpdateViewSettings`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ViewSettingsPatch {
    pub icon_size: Option<IconSize>,
    pub auto_arrange: Option<bool>,
    pub align_to_grid: Option<bool>,
    pub show_icons: Option<bool>,
    pub sort_by: Option<SortOption>,
    pub sort_direction: Option<SortDirection>,
}

impl ViewSettings {
    pub fn apply(&mut self, patch: ViewSettingsPatch) {
        if let Some(icon_size) = patch.icon_size {
            self.icon_size = icon_size;
        }
        if let Some(auto_arrange) = patch.auto_arrange {
            self.auto_arrange = auto_arrange;
        }
        if let Some(align_to_grid) = patch.align_to_grid {
            self.align_to_grid = align_to_grid;
        }
        if let Some(show_icons) = patch.show_icons {
            self.show_icons = show_icons;
        }
        if let Some(sort_by) = patch.sort_by {
            self.sort_by = sort_by;
        }
        if let Some(sort_direction) = patch.sort_direction {
            self.sort_direction = sort_direction;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShellPanel {
    StartMenu,
    NotificationCenter,
    WidgetPanel,
    SearchPanel,
}

/// Shell overlay flags. At most one panel is open at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ShellPanels {
    pub start_menu: bool,
    pub notification_center: bool,
    pub widget_panel: bool,
    pub search_panel: bool,
}

impl ShellPanels {
    pub fn is_open(self, panel: ShellPanel) -> bool {
        match panel {
            ShellPanel::StartMenu => self.start_menu,
            ShellPanel::NotificationCenter => self.notification_center,
            ShellPanel::WidgetPanel => self.widget_panel,
            ShellPanel::SearchPanel => self.search_panel,
        }
    }

    /// Flips `panel` and closes every other panel.
    pub fn toggle(&mut self, panel: ShellPanel) {
        let open = !self.is_open(panel);
        *self = Self::default();
        match panel {
            ShellPanel::StartMenu => self.start_menu = open,
            ShellPanel::NotificationCenter => self.notification_center = open,
            ShellPanel::WidgetPanel => self.widget_panel = open,
            ShellPanel::SearchPanel => self.search_panel = open,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClipboardMode {
    Cut,
    Copy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppClipboard {
    pub mode: ClipboardMode,
    pub app: AppDescriptor,
}

/// Runtime tuning knobs. Lives in [`DesktopState`] so reducers read it without extra plumbing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesktopPreferences {
    pub recent_apps_limit: usize,
    pub notification_timeout_ms: u64,
    pub weather_refresh_ms: u64,
    pub headlines_refresh_ms: u64,
    pub headlines_limit: usize,
    pub weather_location: String,
}

impl Default for DesktopPreferences {
    fn default() -> Self {
        Self {
            recent_apps_limit: 6,
            notification_timeout_ms: 5_000,
            weather_refresh_ms: 30 * 60 * 1_000,
            headlines_refresh_ms: 60 * 60 * 1_000,
            headlines_limit: 3,
            weather_location: "Seattle".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesktopState {
    pub next_window_id: u64,
    pub highest_z_index: u32,
    pub windows: Vec<WindowRecord>,
    pub apps: Vec<AppDescriptor>,
    pub deleted_apps: Vec<AppDescriptor>,
    pub next_app_copy_id: u64,
    pub clipboard: Option<AppClipboard>,
    pub pinned_apps: Vec<AppId>,
    pub recent_apps: Vec<AppId>,
    pub panels: ShellPanels,
    pub theme: ThemeMode,
    pub wallpaper: String,
    pub icon_size: IconSize,
    pub view_settings: ViewSettings,
    pub preferences: DesktopPreferences,
}

impl Default for DesktopState {
    fn default() -> Self {
        Self {
            next_window_id: 1,
            highest_z_index: 0,
            windows: Vec::new(),
            apps: app_registry(),
            deleted_apps: Vec::new(),
            next_app_copy_id: 1,
            clipboard: None,
            pinned_apps: default_pinned_apps(),
            recent_apps: Vec::new(),
            panels: ShellPanels::default(),
            theme: ThemeMode::default(),
            wallpaper: DEFAULT_WALLPAPER.to_string(),
            icon_size: IconSize::default(),
            view_settings: ViewSettings::default(),
            preferences: DesktopPreferences::default(),
        }
    }
}

impl DesktopState {
    pub fn focused_window_id(&self) -> Option<WindowId> {
        self.windows.iter().find(|w| w.is_focused).map(|w| w.id)
    }

    pub fn window(&self, window_id: WindowId) -> Option<&WindowRecord> {
        self.windows.iter().find(|w| w.id == window_id)
    }

    pub fn app(&self, app_id: &AppId) -> Option<&AppDescriptor> {
        self.apps.iter().find(|app| &app.id == app_id)
    }

    /// Topmost window in the visual stack, whether or not it is focused.
    pub fn top_window_id(&self) -> Option<WindowId> {
        self.windows.iter().max_by_key(|w| w.z_index).map(|w| w.id)
    }

    pub fn shell_prefs_snapshot(&self) -> ShellPrefsSnapshot {
        ShellPrefsSnapshot {
            theme: self.theme,
            wallpaper: self.wallpaper.clone(),
            icon_size: self.icon_size,
            view_settings: self.view_settings,
            pinned_apps: self.pinned_apps.clone(),
            recent_apps: self.recent_apps.clone(),
        }
    }

    pub fn apply_shell_prefs(&mut self, snapshot: ShellPrefsSnapshot) {
        self.theme = snapshot.theme;
        self.wallpaper = snapshot.wallpaper;
        self.icon_size = snapshot.icon_size;
        self.view_settings = snapshot.view_settings;
        self.pinned_apps = snapshot.pinned_apps;
        self.recent_apps = snapshot.recent_apps;
        self.recent_apps.truncate(self.preferences.recent_apps_limit);
    }
}

/// Persisted shell preferences, each field stored under its own key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShellPrefsSnapshot {
    pub theme: ThemeMode,
    pub wallpaper: String,
    pub icon_size: IconSize,
    pub view_settings: ViewSettings,
    pub pinned_apps: Vec<AppId>,
    pub recent_apps: Vec<AppId>,
}

impl Default for ShellPrefsSnapshot {
    fn default() -> Self {
        DesktopState::default().shell_prefs_snapshot()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointerPosition {
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResizeEdge {
    North,
    South,
    East,
    West,
    NorthEast,
    NorthWest,
    SouthEast,
    SouthWest,
}

impl ResizeEdge {
    pub fn grows_east(self) -> bool {
        matches!(self, Self::East | Self::NorthEast | Self::SouthEast)
    }

    pub fn grows_south(self) -> bool {
        matches!(self, Self::South | Self::SouthEast | Self::SouthWest)
    }

    pub fn shifts_west(self) -> bool {
        matches!(self, Self::West | Self::NorthWest | Self::SouthWest)
    }

    pub fn shifts_north(self) -> bool {
        matches!(self, Self::North | Self::NorthEast | Self::NorthWest)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragSession {
    pub window_id: WindowId,
    /// Pointer position relative to the window origin at pointer-down.
    pub pointer_offset: PointerPosition,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResizeSession {
    pub window_id: WindowId,
    pub edge: ResizeEdge,
    pub pointer_start: PointerPosition,
    pub rect_start: WindowRect,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InteractionState {
    pub dragging: Option<DragSession>,
    pub resizing: Option<ResizeSession>,
}
