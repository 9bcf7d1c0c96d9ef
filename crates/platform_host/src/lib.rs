//! Typed host-domain contracts and shared models used across the desktop runtime and browser
//! adapters.
//!
//! This crate is the API-first boundary for platform services. It exposes the key-value prefs
//! storage contract, virtual-filesystem item models and path helpers, clock/time helpers, and the
//! timer queue used for expiry and polling. Concrete browser adapters live in
//! `platform_host_web`.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod fs;
pub mod scheduler;
pub mod storage;
pub mod time;

pub use fs::path::{join_child_path, normalize_virtual_path, rebase_descendant_path};
pub use fs::types::{FileSystemItem, FsItemId, FsItemKind, DEFAULT_TEXT_MIME_TYPE};
pub use scheduler::{TimerHandle, TimerQueue};
pub use storage::prefs::{
    load_pref_with, save_pref_with, MemoryPrefsStore, NoopPrefsStore, PrefsStore,
};
pub use time::{
    next_monotonic_timestamp_ms, unix_time_ms_now, utc_from_unix_ms, Clock, ManualClock,
    SystemClock,
};
