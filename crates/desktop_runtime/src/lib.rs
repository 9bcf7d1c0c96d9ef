//! Desktop session runtime: window management, the virtual filesystem, notifications, and the
//! container that wires them to persistence and timers.

pub mod apps;
mod effect_executor;
pub mod model;
pub mod notifications;
pub mod persistence;
pub mod reducer;
pub mod runtime_context;
pub mod vfs;
pub mod widgets;
pub mod window_manager;

pub use apps::{app_registry, default_pinned_apps, viewer_for_mime, AppDescriptor, AppEntryPoint};
pub use model::*;
pub use notifications::{
    Notification, NotificationDraft, NotificationId, NotificationKind, NotificationQueue,
};
pub use persistence::{load_boot_snapshot, persist_shell_prefs, persist_vfs, BootSnapshot};
pub use reducer::{reduce_desktop, DesktopAction, ReducerError, RuntimeEffect};
pub use runtime_context::{
    ConfirmationPrompt, DesktopRuntime, RuntimeView, ScheduledTask, StoreChange, SubscriptionId,
};
pub use vfs::{reduce_vfs, sorted_listing, SortKey, VfsAction, VfsError, VfsSnapshot, VfsState};
pub use widgets::{
    Headline, HeadlinesProvider, WeatherProvider, WeatherReport, WidgetData, WidgetError,
};
