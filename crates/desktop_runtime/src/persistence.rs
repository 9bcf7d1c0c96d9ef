//! Desktop runtime persistence adapters for boot hydration, shell preferences, the VFS, and the
//! per-window scratch/handoff keys apps use to pass data between mounts.

use leptos::logging;
use platform_host::{load_pref_with, save_pref_with, FsItemId, PrefsStore};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::model::{AppId, ShellPrefsSnapshot, WindowId};
use crate::vfs::{VfsSnapshot, VFS_SCHEMA_VERSION};

/// Theme key.
pub const THEME_KEY: &str = "webdesk.theme.v1";
/// Taskbar pin list key.
pub const PINNED_APPS_KEY: &str = "webdesk.pinned_apps.v1";
/// Recent apps key.
pub const RECENT_APPS_KEY: &str = "webdesk.recent_apps.v1";
/// Wallpaper key.
pub const WALLPAPER_KEY: &str = "webdesk.wallpaper.v1";
/// Desktop icon size key.
pub const ICON_SIZE_KEY: &str = "webdesk.icon_size.v1";
/// Desktop view settings key.
pub const VIEW_SETTINGS_KEY: &str = "webdesk.view_settings.v1";
/// Virtual filesystem key.
pub const VFS_KEY: &str = "webdesk.vfs.v1";

/// Persisted state read once at startup.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BootSnapshot {
    /// Shell preferences, when any preference key was present.
    pub shell: Option<ShellPrefsSnapshot>,
    /// Filesystem snapshot, when present and readable.
    pub vfs: Option<VfsSnapshot>,
}

/// Unsaved notepad buffer for one window.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NotepadScratch {
    /// Editor text.
    pub text: String,
    /// File name shown in the title bar, if the buffer has one.
    pub file_name: Option<String>,
}

/// Scratch text key for a notepad window.
pub fn notepad_text_key(window_id: WindowId) -> String {
    format!("webdesk.notepad.{}.text.v1", window_id.0)
}

/// Scratch file-name key for a notepad window.
pub fn notepad_file_name_key(window_id: WindowId) -> String {
    format!("webdesk.notepad.{}.file_name.v1", window_id.0)
}

/// Open-file handoff key read by `app_id` on its next mount.
pub fn open_file_handoff_key(app_id: &AppId) -> String {
    format!("webdesk.open_file.{}.v1", app_id.as_str())
}

/// Loads persisted shell preferences and the VFS snapshot.
///
/// Unreadable values are logged and skipped so a corrupt key never blocks boot.
pub fn load_boot_snapshot<S: PrefsStore + ?Sized>(store: &S) -> BootSnapshot {
    BootSnapshot {
        shell: load_shell_prefs(store),
        vfs: load_lenient::<_, VfsSnapshot>(store, VFS_KEY).and_then(migrate_vfs_snapshot),
    }
}

fn load_shell_prefs<S: PrefsStore + ?Sized>(store: &S) -> Option<ShellPrefsSnapshot> {
    let mut snapshot = ShellPrefsSnapshot::default();
    let mut found = false;

    if let Some(theme) = load_lenient(store, THEME_KEY) {
        snapshot.theme = theme;
        found = true;
    }
    if let Some(wallpaper) = load_lenient(store, WALLPAPER_KEY) {
        snapshot.wallpaper = wallpaper;
        found = true;
    }
    if let Some(icon_size) = load_lenient(store, ICON_SIZE_KEY) {
        snapshot.icon_size = icon_size;
        found = true;
    }
    if let Some(view_settings) = load_lenient(store, VIEW_SETTINGS_KEY) {
        snapshot.view_settings = view_settings;
        found = true;
    }
    if let Some(pinned_apps) = load_lenient(store, PINNED_APPS_KEY) {
        snapshot.pinned_apps = pinned_apps;
        found = true;
    }
    if let Some(recent_apps) = load_lenient(store, RECENT_APPS_KEY) {
        snapshot.recent_apps = recent_apps;
        found = true;
    }

    found.then_some(snapshot)
}

fn migrate_vfs_snapshot(snapshot: VfsSnapshot) -> Option<VfsSnapshot> {
    match snapshot.schema_version {
        VFS_SCHEMA_VERSION => Some(snapshot),
        other => {
            logging::warn!("unsupported vfs schema version {other}; reseeding");
            None
        }
    }
}

fn load_lenient<S: PrefsStore + ?Sized, T: DeserializeOwned>(store: &S, key: &str) -> Option<T> {
    match load_pref_with(store, key) {
        Ok(value) => value,
        Err(err) => {
            logging::warn!("{err}");
            None
        }
    }
}

/// Writes every shell preference key.
///
/// # Errors
///
/// Returns the first serialization or storage error.
pub fn persist_shell_prefs<S: PrefsStore + ?Sized>(
    store: &S,
    snapshot: &ShellPrefsSnapshot,
) -> Result<(), String> {
    save_pref_with(store, THEME_KEY, &snapshot.theme)?;
    save_pref_with(store, WALLPAPER_KEY, &snapshot.wallpaper)?;
    save_pref_with(store, ICON_SIZE_KEY, &snapshot.icon_size)?;
    save_pref_with(store, VIEW_SETTINGS_KEY, &snapshot.view_settings)?;
    save_pref_with(store, PINNED_APPS_KEY, &snapshot.pinned_apps)?;
    save_pref_with(store, RECENT_APPS_KEY, &snapshot.recent_apps)
}

/// Writes the full VFS snapshot.
///
/// # Errors
///
/// Returns serialization or storage errors (for example a full quota).
pub fn persist_vfs<S: PrefsStore + ?Sized>(store: &S, snapshot: &VfsSnapshot) -> Result<(), String> {
    save_pref_with(store, VFS_KEY, snapshot)
}

/// Saves the unsaved buffer of a notepad window.
pub fn save_notepad_scratch<S: PrefsStore + ?Sized>(
    store: &S,
    window_id: WindowId,
    scratch: &NotepadScratch,
) -> Result<(), String> {
    save_pref_with(store, &notepad_text_key(window_id), &scratch.text)?;
    match &scratch.file_name {
        Some(file_name) => save_pref_with(store, &notepad_file_name_key(window_id), file_name),
        None => store.delete_pref(&notepad_file_name_key(window_id)),
    }
}

/// Loads the unsaved buffer of a notepad window, if one was saved.
pub fn load_notepad_scratch<S: PrefsStore + ?Sized>(
    store: &S,
    window_id: WindowId,
) -> Option<NotepadScratch> {
    let text = load_lenient::<_, String>(store, &notepad_text_key(window_id))?;
    Some(NotepadScratch {
        text,
        file_name: load_lenient(store, &notepad_file_name_key(window_id)),
    })
}

/// Removes both scratch keys of a notepad window.
pub fn clear_notepad_scratch<S: PrefsStore + ?Sized>(
    store: &S,
    window_id: WindowId,
) -> Result<(), String> {
    store.delete_pref(&notepad_text_key(window_id))?;
    store.delete_pref(&notepad_file_name_key(window_id))
}

/// Leaves a file id for `app_id` to pick up on its next mount.
pub fn write_open_file_handoff<S: PrefsStore + ?Sized>(
    store: &S,
    app_id: &AppId,
    file_id: FsItemId,
) -> Result<(), String> {
    save_pref_with(store, &open_file_handoff_key(app_id), &file_id)
}

/// Reads and clears the pending file id for `app_id`.
pub fn take_open_file_handoff<S: PrefsStore + ?Sized>(
    store: &S,
    app_id: &AppId,
) -> Option<FsItemId> {
    let key = open_file_handoff_key(app_id);
    let file_id = load_lenient(store, &key);
    if let Err(err) = store.delete_pref(&key) {
        logging::warn!("clear open-file handoff failed: {err}");
    }
    file_id
}

#[cfg(test)]
mod tests {
    use platform_host::MemoryPrefsStore;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::{IconSize, ThemeMode};
    use crate::vfs::VfsState;

    #[test]
    fn empty_store_boots_without_snapshots() {
        let store = MemoryPrefsStore::default();
        assert_eq!(load_boot_snapshot(&store), BootSnapshot::default());
    }

    #[test]
    fn shell_prefs_round_trip_through_individual_keys() {
        let store = MemoryPrefsStore::default();
        let mut snapshot = ShellPrefsSnapshot::default();
        snapshot.theme = ThemeMode::Dark;
        snapshot.icon_size = IconSize::Small;
        snapshot.recent_apps = vec![AppId::new("notepad")];
        persist_shell_prefs(&store, &snapshot).expect("persist");

        assert_eq!(
            store.load_pref(THEME_KEY).expect("load"),
            Some("\"dark\"".to_string())
        );
        assert_eq!(load_boot_snapshot(&store).shell, Some(snapshot));
    }

    #[test]
    fn malformed_keys_are_skipped_individually() {
        let store = MemoryPrefsStore::default();
        store.save_pref(THEME_KEY, "\"dark\"").unwrap();
        store.save_pref(WALLPAPER_KEY, "{not json").unwrap();
        store.save_pref(VFS_KEY, "[]").unwrap();

        let boot = load_boot_snapshot(&store);
        let shell = boot.shell.expect("theme present");
        assert_eq!(shell.theme, ThemeMode::Dark);
        assert_eq!(shell.wallpaper, ShellPrefsSnapshot::default().wallpaper);
        assert!(boot.vfs.is_none());
    }

    #[test]
    fn vfs_snapshot_with_unknown_schema_is_dropped() {
        let store = MemoryPrefsStore::default();
        let mut snapshot = VfsState::seeded().snapshot();
        persist_vfs(&store, &snapshot).unwrap();
        assert_eq!(load_boot_snapshot(&store).vfs, Some(snapshot.clone()));

        snapshot.schema_version = VFS_SCHEMA_VERSION + 1;
        persist_vfs(&store, &snapshot).unwrap();
        assert!(load_boot_snapshot(&store).vfs.is_none());
    }

    #[test]
    fn notepad_scratch_is_scoped_per_window() {
        let store = MemoryPrefsStore::default();
        let scratch = NotepadScratch {
            text: "draft".to_string(),
            file_name: Some("todo.txt".to_string()),
        };
        save_notepad_scratch(&store, WindowId(1), &scratch).unwrap();

        assert_eq!(load_notepad_scratch(&store, WindowId(1)), Some(scratch));
        assert_eq!(load_notepad_scratch(&store, WindowId(2)), None);

        clear_notepad_scratch(&store, WindowId(1)).unwrap();
        assert_eq!(load_notepad_scratch(&store, WindowId(1)), None);
        assert!(store.keys().is_empty());
    }

    #[test]
    fn handoff_is_read_once() {
        let store = MemoryPrefsStore::default();
        let viewer = AppId::new("pdfviewer");
        write_open_file_handoff(&store, &viewer, FsItemId(7)).unwrap();

        assert_eq!(take_open_file_handoff(&store, &AppId::new("notepad")), None);
        assert_eq!(take_open_file_handoff(&store, &viewer), Some(FsItemId(7)));
        assert_eq!(take_open_file_handoff(&store, &viewer), None);
    }

    #[test]
    fn quota_failure_is_reported() {
        let store = MemoryPrefsStore::with_capacity(64);
        let err = persist_vfs(&store, &VfsState::seeded().snapshot()).expect_err("quota");
        assert!(err.contains("quota"), "{err}");
    }
}
