//! Reducer actions, side-effect intents, and transition logic for the desktop session.

use thiserror::Error;

use crate::model::{
    AppClipboard, AppId, ClipboardMode, DesktopState, DragSession, IconSize, InteractionState,
    PointerPosition, ResizeEdge, ResizeSession, ShellPanel, ShellPrefsSnapshot, SortDirection,
    SortOption, ThemeMode, ViewSettingsPatch, WindowId, WindowPosition, WindowRecord, WindowRect,
    WindowSize,
};
use crate::notifications::NotificationDraft;
use crate::window_manager::{
    activate_window_in_place, cascade_position, drag_position, focus_topmost_visible,
    focus_window_internal, normalize_window_stack, resize_rect,
};

#[derive(Debug, Clone, PartialEq)]
/// Actions accepted by [`reduce_desktop`] to mutate [`DesktopState`].
pub enum DesktopAction {
    /// Open an app, or focus its visible window if one exists.
    OpenApp {
        /// App to open.
        app_id: AppId,
    },
    /// Close a window by id.
    CloseWindow {
        /// Window to close.
        window_id: WindowId,
    },
    /// Focus (and raise) a window by id.
    FocusWindow {
        /// Window to focus.
        window_id: WindowId,
    },
    /// Minimize a window and hand focus to the next visible window.
    MinimizeWindow {
        /// Window to minimize.
        window_id: WindowId,
    },
    /// Maximize a window. Stored geometry is kept for restore.
    MaximizeWindow {
        /// Window to maximize.
        window_id: WindowId,
    },
    /// Restore a minimized or maximized window.
    RestoreWindow {
        /// Window to restore.
        window_id: WindowId,
    },
    /// Replace a window's origin.
    MoveWindow {
        /// Window to move.
        window_id: WindowId,
        /// New origin.
        position: WindowPosition,
    },
    /// Replace a window's size.
    ResizeWindow {
        /// Window to resize.
        window_id: WindowId,
        /// New size.
        size: WindowSize,
    },
    /// Toggle taskbar behavior for a window (focus, minimize, or restore).
    ToggleTaskbarWindow {
        /// Window associated with the taskbar button.
        window_id: WindowId,
    },
    /// Begin dragging a window by its title bar.
    BeginMove {
        /// Window being dragged.
        window_id: WindowId,
        /// Pointer position at drag start.
        pointer: PointerPosition,
    },
    /// Update an in-progress window drag.
    UpdateMove {
        /// Current pointer position.
        pointer: PointerPosition,
    },
    /// End the active window drag.
    EndMove,
    /// Begin resizing a window from an edge or corner handle.
    BeginResize {
        /// Window being resized.
        window_id: WindowId,
        /// Edge or corner being dragged.
        edge: ResizeEdge,
        /// Pointer position at resize start.
        pointer: PointerPosition,
    },
    /// Update an in-progress window resize.
    UpdateResize {
        /// Current pointer position.
        pointer: PointerPosition,
    },
    /// End the active window resize.
    EndResize,
    /// Toggle a shell panel, closing the others.
    TogglePanel {
        /// Panel to toggle.
        panel: ShellPanel,
    },
    /// Close the start menu if open.
    CloseStartMenu,
    /// Switch between light and dark themes.
    SetTheme {
        /// New theme.
        theme: ThemeMode,
    },
    /// Set the wallpaper URL/path.
    SetWallpaper {
        /// Wallpaper location.
        wallpaper: String,
    },
    /// Change desktop icon size.
    SetIconSize {
        /// New icon size.
        icon_size: IconSize,
    },
    /// Merge a partial view-settings update.
    UpdateViewSettings {
        /// Fields to overwrite.
        patch: ViewSettingsPatch,
    },
    /// Sort desktop icons, toggling direction when the key is unchanged.
    SortIcons {
        /// Sort key.
        sort_by: SortOption,
    },
    /// Toggle icon auto-arrange.
    ToggleAutoArrange,
    /// Toggle icon grid alignment.
    ToggleAlignToGrid,
    /// Show or hide desktop icons.
    ToggleShowIcons,
    /// Pin an app to the taskbar.
    PinApp {
        /// App to pin.
        app_id: AppId,
    },
    /// Unpin an app from the taskbar.
    UnpinApp {
        /// App to unpin.
        app_id: AppId,
    },
    /// Remove a desktop shortcut (kept aside in the recycle list).
    DeleteApp {
        /// App to delete.
        app_id: AppId,
    },
    /// Rename a desktop shortcut.
    RenameApp {
        /// App to rename.
        app_id: AppId,
        /// New display name.
        display_name: String,
    },
    /// Put a shortcut on the clipboard for a later move.
    CutApp {
        /// App to cut.
        app_id: AppId,
    },
    /// Put a shortcut on the clipboard for a later duplicate.
    CopyApp {
        /// App to copy.
        app_id: AppId,
    },
    /// Paste the clipboard shortcut onto the desktop.
    PasteApp,
    /// Show a shortcut's properties as a persistent notification.
    ShowAppProperties {
        /// App to describe.
        app_id: AppId,
    },
    /// Hydrate shell preferences from persisted state.
    HydrateShellPrefs {
        /// Snapshot to restore.
        snapshot: ShellPrefsSnapshot,
    },
}

#[derive(Debug, Clone, PartialEq)]
/// Side-effect intents emitted by the reducers for the runtime to execute.
pub enum RuntimeEffect {
    /// Persist theme, wallpaper, icon size, view settings, pinned and recent apps.
    PersistShellPrefs,
    /// Persist the virtual filesystem.
    PersistVfs,
    /// Push a notification.
    Notify(NotificationDraft),
    /// Move keyboard focus into the focused window's primary input.
    FocusWindowInput(WindowId),
    /// Drop per-window scratch data for a closed window.
    DiscardWindowScratch(WindowId),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
/// Reducer errors for actions that reference missing entities.
pub enum ReducerError {
    /// The target window id was not found in the current state.
    #[error("window not found")]
    WindowNotFound,
    /// The target app id is not on the desktop.
    #[error("app `{0}` not found")]
    AppNotFound(AppId),
}

/// Applies a [`DesktopAction`] to the desktop state and collects resulting side effects.
///
/// This function is the authoritative state transition engine for window management and
/// shell-level preferences.
///
/// # Errors
///
/// Returns [`ReducerError`] when an action references a window or app that is not present. State
/// is left untouched in that case.
pub fn reduce_desktop(
    state: &mut DesktopState,
    interaction: &mut InteractionState,
    action: DesktopAction,
) -> Result<Vec<RuntimeEffect>, ReducerError> {
    let mut effects = Vec::new();
    match action {
        DesktopAction::OpenApp { app_id } => {
            let app = state
                .app(&app_id)
                .cloned()
                .ok_or_else(|| ReducerError::AppNotFound(app_id.clone()))?;
            push_recent_app(state, &app_id);
            effects.push(RuntimeEffect::PersistShellPrefs);
            state.panels.start_menu = false;

            let existing = state
                .windows
                .iter()
                .find(|w| w.app_id == app_id && !w.minimized)
                .map(|w| w.id);
            let window_id = match existing {
                Some(window_id) => {
                    focus_window_internal(state, window_id);
                    window_id
                }
                None => {
                    let window_id = next_window_id(state);
                    let rect = WindowRect::at(cascade_position(state.windows.len()), app.default_size);
                    state.highest_z_index = state.highest_z_index.saturating_add(1);
                    state.windows.push(WindowRecord {
                        id: window_id,
                        app_id,
                        title: app.display_name,
                        icon: app.icon,
                        rect,
                        z_index: state.highest_z_index,
                        is_focused: false,
                        minimized: false,
                        maximized: false,
                        resizable: app.resizable,
                    });
                    activate_window_in_place(state, window_id);
                    window_id
                }
            };
            effects.push(RuntimeEffect::FocusWindowInput(window_id));
        }
        DesktopAction::CloseWindow { window_id } => {
            let index = window_index(state, window_id)?;
            let closed = state.windows.remove(index);
            if interaction
                .dragging
                .as_ref()
                .is_some_and(|s| s.window_id == window_id)
            {
                interaction.dragging = None;
            }
            if interaction
                .resizing
                .as_ref()
                .is_some_and(|s| s.window_id == window_id)
            {
                interaction.resizing = None;
            }
            if closed.is_focused {
                if let Some(next) = focus_topmost_visible(state, None) {
                    effects.push(RuntimeEffect::FocusWindowInput(next));
                }
            }
            effects.push(RuntimeEffect::DiscardWindowScratch(window_id));
        }
        DesktopAction::FocusWindow { window_id } => {
            focus_existing(state, window_id)?;
            state.panels.start_menu = false;
            effects.push(RuntimeEffect::FocusWindowInput(window_id));
        }
        DesktopAction::MinimizeWindow { window_id } => {
            let window = find_window_mut(state, window_id)?;
            window.minimized = true;
            window.is_focused = false;
            if let Some(next) = focus_topmost_visible(state, Some(window_id)) {
                effects.push(RuntimeEffect::FocusWindowInput(next));
            }
        }
        DesktopAction::MaximizeWindow { window_id } => {
            let window = find_window_mut(state, window_id)?;
            window.maximized = true;
            window.minimized = false;
            activate_window_in_place(state, window_id);
        }
        DesktopAction::RestoreWindow { window_id } => {
            let window = find_window_mut(state, window_id)?;
            window.maximized = false;
            window.minimized = false;
            activate_window_in_place(state, window_id);
        }
        DesktopAction::MoveWindow {
            window_id,
            position,
        } => {
            let window = find_window_mut(state, window_id)?;
            window.rect = WindowRect::at(position, window.rect.size());
        }
        DesktopAction::ResizeWindow { window_id, size } => {
            let window = find_window_mut(state, window_id)?;
            window.rect = WindowRect::at(window.rect.position(), size);
        }
        DesktopAction::ToggleTaskbarWindow { window_id } => {
            let window = state
                .window(window_id)
                .ok_or(ReducerError::WindowNotFound)?;
            let next = if window.minimized {
                DesktopAction::FocusWindow { window_id }
            } else if window.is_focused {
                DesktopAction::MinimizeWindow { window_id }
            } else {
                DesktopAction::FocusWindow { window_id }
            };
            effects.extend(reduce_desktop(state, interaction, next)?);
        }
        DesktopAction::BeginMove { window_id, pointer } => {
            let window = find_window_mut(state, window_id)?;
            if !window.maximized {
                let origin = window.rect.position();
                focus_window_internal(state, window_id);
                interaction.dragging = Some(DragSession {
                    window_id,
                    pointer_offset: PointerPosition {
                        x: pointer.x.saturating_sub(origin.x),
                        y: pointer.y.saturating_sub(origin.y),
                    },
                });
            }
        }
        DesktopAction::UpdateMove { pointer } => {
            if let Some(session) = interaction.dragging.as_ref() {
                let position = drag_position(pointer, session.pointer_offset);
                let window = find_window_mut(state, session.window_id)?;
                window.rect = WindowRect::at(position, window.rect.size());
            }
        }
        DesktopAction::EndMove => {
            interaction.dragging = None;
        }
        DesktopAction::BeginResize {
            window_id,
            edge,
            pointer,
        } => {
            let window = find_window_mut(state, window_id)?;
            if !window.maximized && window.resizable {
                let rect_start = window.rect;
                focus_window_internal(state, window_id);
                interaction.resizing = Some(ResizeSession {
                    window_id,
                    edge,
                    pointer_start: pointer,
                    rect_start,
                });
            }
        }
        DesktopAction::UpdateResize { pointer } => {
            if let Some(session) = interaction.resizing.as_ref() {
                let dx = pointer.x.saturating_sub(session.pointer_start.x);
                let dy = pointer.y.saturating_sub(session.pointer_start.y);
                let rect = resize_rect(session.rect_start, session.edge, dx, dy);
                find_window_mut(state, session.window_id)?.rect = rect;
            }
        }
        DesktopAction::EndResize => {
            interaction.resizing = None;
        }
        DesktopAction::TogglePanel { panel } => {
            state.panels.toggle(panel);
        }
        DesktopAction::CloseStartMenu => {
            state.panels.start_menu = false;
        }
        DesktopAction::SetTheme { theme } => {
            state.theme = theme;
            effects.push(RuntimeEffect::PersistShellPrefs);
        }
        DesktopAction::SetWallpaper { wallpaper } => {
            state.wallpaper = wallpaper;
            effects.push(RuntimeEffect::PersistShellPrefs);
        }
        DesktopAction::SetIconSize { icon_size } => {
            state.icon_size = icon_size;
            state.view_settings.icon_size = icon_size;
            effects.push(RuntimeEffect::PersistShellPrefs);
            effects.push(desktop_notice(format!(
                "Icon size changed to {}",
                icon_size.label()
            )));
        }
        DesktopAction::UpdateViewSettings { patch } => {
            state.view_settings.apply(patch);
            if let Some(icon_size) = patch.icon_size {
                state.icon_size = icon_size;
            }
            effects.push(RuntimeEffect::PersistShellPrefs);
        }
        DesktopAction::SortIcons { sort_by } => {
            let settings = &mut state.view_settings;
            settings.sort_direction = if settings.sort_by == sort_by {
                settings.sort_direction.toggled()
            } else {
                SortDirection::Asc
            };
            settings.sort_by = sort_by;
            effects.push(RuntimeEffect::PersistShellPrefs);
            effects.push(desktop_notice(format!(
                "Sorted icons by {}",
                sort_by.label()
            )));
        }
        DesktopAction::ToggleAutoArrange => {
            let enabled = !state.view_settings.auto_arrange;
            state.view_settings.auto_arrange = enabled;
            effects.push(RuntimeEffect::PersistShellPrefs);
            effects.push(desktop_notice(if enabled {
                "Auto-arrange enabled"
            } else {
                "Auto-arrange disabled"
            }));
        }
        DesktopAction::ToggleAlignToGrid => {
            let enabled = !state.view_settings.align_to_grid;
            state.view_settings.align_to_grid = enabled;
            effects.push(RuntimeEffect::PersistShellPrefs);
            effects.push(desktop_notice(if enabled {
                "Align to grid enabled"
            } else {
                "Align to grid disabled"
            }));
        }
        DesktopAction::ToggleShowIcons => {
            let shown = !state.view_settings.show_icons;
            state.view_settings.show_icons = shown;
            effects.push(RuntimeEffect::PersistShellPrefs);
            effects.push(desktop_notice(if shown {
                "Desktop icons shown"
            } else {
                "Desktop icons hidden"
            }));
        }
        DesktopAction::PinApp { app_id } => {
            require_app(state, &app_id)?;
            if !state.pinned_apps.contains(&app_id) {
                state.pinned_apps.push(app_id);
                effects.push(RuntimeEffect::PersistShellPrefs);
            }
        }
        DesktopAction::UnpinApp { app_id } => {
            let before = state.pinned_apps.len();
            state.pinned_apps.retain(|id| id != &app_id);
            if state.pinned_apps.len() != before {
                effects.push(RuntimeEffect::PersistShellPrefs);
            }
        }
        DesktopAction::DeleteApp { app_id } => {
            let index = state
                .apps
                .iter()
                .position(|app| app.id == app_id)
                .ok_or_else(|| ReducerError::AppNotFound(app_id.clone()))?;
            let app = state.apps.remove(index);
            state.pinned_apps.retain(|id| id != &app_id);
            state.recent_apps.retain(|id| id != &app_id);
            effects.push(RuntimeEffect::PersistShellPrefs);
            effects.push(RuntimeEffect::Notify(NotificationDraft::info(
                "Delete",
                format!("{} moved to Recycle Bin", app.display_name),
            )));
            state.deleted_apps.push(app);
        }
        DesktopAction::RenameApp {
            app_id,
            display_name,
        } => {
            let app = state
                .apps
                .iter_mut()
                .find(|app| app.id == app_id)
                .ok_or_else(|| ReducerError::AppNotFound(app_id.clone()))?;
            app.display_name = display_name.clone();
            effects.push(RuntimeEffect::Notify(NotificationDraft::info(
                "Rename",
                format!("Item renamed to {display_name}"),
            )));
        }
        DesktopAction::CutApp { app_id } => {
            let app = require_app(state, &app_id)?.clone();
            effects.push(RuntimeEffect::Notify(NotificationDraft::info(
                "Cut",
                format!("{} cut to clipboard", app.display_name),
            )));
            state.clipboard = Some(AppClipboard {
                mode: ClipboardMode::Cut,
                app,
            });
        }
        DesktopAction::CopyApp { app_id } => {
            let app = require_app(state, &app_id)?.clone();
            effects.push(RuntimeEffect::Notify(NotificationDraft::info(
                "Copy",
                format!("{} copied to clipboard", app.display_name),
            )));
            state.clipboard = Some(AppClipboard {
                mode: ClipboardMode::Copy,
                app,
            });
        }
        DesktopAction::PasteApp => match state.clipboard.clone() {
            None => effects.push(RuntimeEffect::Notify(NotificationDraft::warning(
                "Paste",
                "Nothing to paste",
            ))),
            Some(AppClipboard {
                mode: ClipboardMode::Cut,
                app,
            }) => {
                state.clipboard = None;
                effects.push(RuntimeEffect::Notify(NotificationDraft::info(
                    "Paste",
                    format!("{} pasted to desktop", app.display_name),
                )));
            }
            Some(AppClipboard {
                mode: ClipboardMode::Copy,
                app,
            }) => {
                let mut duplicate = app.clone();
                duplicate.id = AppId::new(format!("{}-copy-{}", app.id, state.next_app_copy_id));
                duplicate.display_name = format!("{} - Copy", app.display_name);
                state.next_app_copy_id = state.next_app_copy_id.saturating_add(1);
                state.apps.push(duplicate);
                effects.push(RuntimeEffect::Notify(NotificationDraft::info(
                    "Paste",
                    format!("{} copied to desktop", app.display_name),
                )));
            }
        },
        DesktopAction::ShowAppProperties { app_id } => {
            let app = require_app(state, &app_id)?;
            effects.push(RuntimeEffect::Notify(
                NotificationDraft::info(
                    "Properties",
                    format!(
                        "{} - Type: Application, Location: Desktop",
                        app.display_name
                    ),
                )
                .persistent(),
            ));
        }
        DesktopAction::HydrateShellPrefs { snapshot } => {
            state.apply_shell_prefs(snapshot);
        }
    }

    normalize_window_stack(state);
    Ok(effects)
}

fn desktop_notice(message: impl Into<String>) -> RuntimeEffect {
    RuntimeEffect::Notify(NotificationDraft::info("Desktop", message))
}

fn push_recent_app(state: &mut DesktopState, app_id: &AppId) {
    state.recent_apps.retain(|id| id != app_id);
    state.recent_apps.insert(0, app_id.clone());
    state.recent_apps.truncate(state.preferences.recent_apps_limit);
}

fn next_window_id(state: &mut DesktopState) -> WindowId {
    let id = WindowId(state.next_window_id);
    state.next_window_id = state.next_window_id.saturating_add(1);
    id
}

fn window_index(state: &DesktopState, window_id: WindowId) -> Result<usize, ReducerError> {
    state
        .windows
        .iter()
        .position(|w| w.id == window_id)
        .ok_or(ReducerError::WindowNotFound)
}

fn find_window_mut(
    state: &mut DesktopState,
    window_id: WindowId,
) -> Result<&mut WindowRecord, ReducerError> {
    state
        .windows
        .iter_mut()
        .find(|w| w.id == window_id)
        .ok_or(ReducerError::WindowNotFound)
}

fn focus_existing(state: &mut DesktopState, window_id: WindowId) -> Result<(), ReducerError> {
    if focus_window_internal(state, window_id) {
        Ok(())
    } else {
        Err(ReducerError::WindowNotFound)
    }
}

fn require_app<'a>(
    state: &'a DesktopState,
    app_id: &AppId,
) -> Result<&'a crate::apps::AppDescriptor, ReducerError> {
    state
        .app(app_id)
        .ok_or_else(|| ReducerError::AppNotFound(app_id.clone()))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::notifications::NotificationKind;

    fn open(state: &mut DesktopState, interaction: &mut InteractionState, app: &str) -> WindowId {
        let _ = reduce_desktop(
            state,
            interaction,
            DesktopAction::OpenApp {
                app_id: AppId::new(app),
            },
        )
        .expect("open app");
        state.focused_window_id().expect("focused window")
    }

    fn dispatch(
        state: &mut DesktopState,
        interaction: &mut InteractionState,
        action: DesktopAction,
    ) -> Vec<RuntimeEffect> {
        reduce_desktop(state, interaction, action).expect("dispatch")
    }

    fn focused_count(state: &DesktopState) -> usize {
        state.windows.iter().filter(|w| w.is_focused).count()
    }

    fn notices(effects: &[RuntimeEffect]) -> Vec<String> {
        effects
            .iter()
            .filter_map(|effect| match effect {
                RuntimeEffect::Notify(draft) => Some(draft.message.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn open_app_creates_focused_window_with_defaults() {
        let mut state = DesktopState::default();
        let mut interaction = InteractionState::default();

        let first = open(&mut state, &mut interaction, "explorer");
        let second = open(&mut state, &mut interaction, "calculator");

        assert_eq!(state.windows.len(), 2);
        assert_eq!(state.focused_window_id(), Some(second));
        let calc = state.window(second).expect("calculator window");
        assert_eq!(calc.title, "Calculator");
        assert_eq!(
            calc.rect,
            WindowRect {
                x: 130,
                y: 130,
                w: 320,
                h: 500
            }
        );
        assert!(calc.z_index > state.window(first).expect("explorer").z_index);
        assert_eq!(
            state.recent_apps,
            vec![AppId::new("calculator"), AppId::new("explorer")]
        );
    }

    #[test]
    fn opening_a_visible_app_twice_focuses_the_existing_window() {
        let mut state = DesktopState::default();
        let mut interaction = InteractionState::default();

        let notepad = open(&mut state, &mut interaction, "notepad");
        open(&mut state, &mut interaction, "terminal");
        let again = open(&mut state, &mut interaction, "notepad");

        assert_eq!(again, notepad);
        let notepads = state
            .windows
            .iter()
            .filter(|w| w.app_id == AppId::new("notepad"))
            .collect::<Vec<_>>();
        assert_eq!(notepads.len(), 1);
        assert!(notepads[0].is_focused);
        assert_eq!(state.top_window_id(), Some(notepad));
    }

    #[test]
    fn opening_a_minimized_app_creates_a_second_window() {
        let mut state = DesktopState::default();
        let mut interaction = InteractionState::default();

        let first = open(&mut state, &mut interaction, "notepad");
        dispatch(
            &mut state,
            &mut interaction,
            DesktopAction::MinimizeWindow { window_id: first },
        );
        let second = open(&mut state, &mut interaction, "notepad");

        assert_ne!(first, second);
        assert_eq!(state.windows.len(), 2);
    }

    #[test]
    fn recent_apps_are_deduplicated_and_capped() {
        let mut state = DesktopState::default();
        let mut interaction = InteractionState::default();
        for app in [
            "calculator",
            "notepad",
            "explorer",
            "terminal",
            "settings",
            "weather",
            "calendar",
            "notepad",
        ] {
            open(&mut state, &mut interaction, app);
        }
        assert_eq!(state.recent_apps.len(), 6);
        assert_eq!(state.recent_apps[0], AppId::new("notepad"));
        assert_eq!(
            state
                .recent_apps
                .iter()
                .filter(|id| id.as_str() == "notepad")
                .count(),
            1
        );
        assert!(!state.recent_apps.contains(&AppId::new("calculator")));
    }

    #[test]
    fn unknown_app_is_rejected_without_state_change() {
        let mut state = DesktopState::default();
        let mut interaction = InteractionState::default();
        let before = state.clone();

        let err = reduce_desktop(
            &mut state,
            &mut interaction,
            DesktopAction::OpenApp {
                app_id: AppId::new("paint"),
            },
        )
        .expect_err("unknown app");
        assert_eq!(err, ReducerError::AppNotFound(AppId::new("paint")));
        assert_eq!(state, before);
    }

    #[test]
    fn focus_raises_window_above_previous_max() {
        let mut state = DesktopState::default();
        let mut interaction = InteractionState::default();
        let a = open(&mut state, &mut interaction, "explorer");
        let b = open(&mut state, &mut interaction, "notepad");
        let previous_max = state.windows.iter().map(|w| w.z_index).max().unwrap();

        dispatch(
            &mut state,
            &mut interaction,
            DesktopAction::FocusWindow { window_id: a },
        );

        let a_rec = state.window(a).unwrap();
        assert!(a_rec.z_index > previous_max);
        assert!(a_rec.is_focused);
        assert!(!state.window(b).unwrap().is_focused);
    }

    #[test]
    fn minimize_hands_focus_to_highest_visible_window() {
        let mut state = DesktopState::default();
        let mut interaction = InteractionState::default();
        let a = open(&mut state, &mut interaction, "explorer");
        let b = open(&mut state, &mut interaction, "notepad");
        let c = open(&mut state, &mut interaction, "terminal");
        dispatch(
            &mut state,
            &mut interaction,
            DesktopAction::FocusWindow { window_id: a },
        );
        dispatch(
            &mut state,
            &mut interaction,
            DesktopAction::FocusWindow { window_id: c },
        );

        dispatch(
            &mut state,
            &mut interaction,
            DesktopAction::MinimizeWindow { window_id: c },
        );

        let c_rec = state.window(c).unwrap();
        assert!(c_rec.minimized);
        assert!(!c_rec.is_focused);
        // `a` was raised after `b`, so it is highest among the visible windows.
        assert_eq!(state.focused_window_id(), Some(a));
        assert_ne!(state.focused_window_id(), Some(b));
        assert_eq!(focused_count(&state), 1);
    }

    #[test]
    fn minimizing_the_only_window_leaves_nothing_focused() {
        let mut state = DesktopState::default();
        let mut interaction = InteractionState::default();
        let only = open(&mut state, &mut interaction, "explorer");

        dispatch(
            &mut state,
            &mut interaction,
            DesktopAction::MinimizeWindow { window_id: only },
        );
        assert_eq!(state.focused_window_id(), None);
    }

    #[test]
    fn closing_focused_window_focuses_highest_remaining() {
        let mut state = DesktopState::default();
        let mut interaction = InteractionState::default();
        let a = open(&mut state, &mut interaction, "explorer");
        let b = open(&mut state, &mut interaction, "notepad");
        let c = open(&mut state, &mut interaction, "terminal");
        dispatch(
            &mut state,
            &mut interaction,
            DesktopAction::MinimizeWindow { window_id: b },
        );
        dispatch(
            &mut state,
            &mut interaction,
            DesktopAction::FocusWindow { window_id: c },
        );

        let effects = dispatch(
            &mut state,
            &mut interaction,
            DesktopAction::CloseWindow { window_id: c },
        );

        assert!(state.window(c).is_none());
        assert_eq!(state.focused_window_id(), Some(a));
        assert!(effects.contains(&RuntimeEffect::DiscardWindowScratch(c)));
        assert!(effects.contains(&RuntimeEffect::FocusWindowInput(a)));
    }

    #[test]
    fn closing_unfocused_window_keeps_current_focus() {
        let mut state = DesktopState::default();
        let mut interaction = InteractionState::default();
        let a = open(&mut state, &mut interaction, "explorer");
        let b = open(&mut state, &mut interaction, "notepad");

        dispatch(
            &mut state,
            &mut interaction,
            DesktopAction::CloseWindow { window_id: a },
        );
        assert_eq!(state.focused_window_id(), Some(b));
    }

    #[test]
    fn maximize_then_restore_preserves_geometry() {
        let mut state = DesktopState::default();
        let mut interaction = InteractionState::default();
        let a = open(&mut state, &mut interaction, "explorer");
        let b = open(&mut state, &mut interaction, "notepad");
        dispatch(
            &mut state,
            &mut interaction,
            DesktopAction::MoveWindow {
                window_id: a,
                position: WindowPosition { x: 17, y: 23 },
            },
        );
        let before = state.window(a).unwrap().rect;
        let z_before = state.window(a).unwrap().z_index;

        dispatch(
            &mut state,
            &mut interaction,
            DesktopAction::MaximizeWindow { window_id: a },
        );
        let maxed = state.window(a).unwrap();
        assert!(maxed.maximized && maxed.is_focused);
        assert_eq!(maxed.rect, before);
        assert!(!state.window(b).unwrap().is_focused);

        dispatch(
            &mut state,
            &mut interaction,
            DesktopAction::RestoreWindow { window_id: a },
        );
        let restored = state.window(a).unwrap();
        assert!(!restored.maximized && !restored.minimized && restored.is_focused);
        assert_eq!(restored.rect, before);
        assert_eq!(restored.z_index, z_before);
    }

    #[test]
    fn move_and_resize_replace_fields_directly() {
        let mut state = DesktopState::default();
        let mut interaction = InteractionState::default();
        let a = open(&mut state, &mut interaction, "settings");

        dispatch(
            &mut state,
            &mut interaction,
            DesktopAction::ResizeWindow {
                window_id: a,
                size: WindowSize { w: 10, h: 20 },
            },
        );
        dispatch(
            &mut state,
            &mut interaction,
            DesktopAction::MoveWindow {
                window_id: a,
                position: WindowPosition { x: -5, y: 9 },
            },
        );
        assert_eq!(
            state.window(a).unwrap().rect,
            WindowRect {
                x: -5,
                y: 9,
                w: 10,
                h: 20
            }
        );
    }

    #[test]
    fn drag_gesture_tracks_pointer_offset_and_clamps() {
        let mut state = DesktopState::default();
        let mut interaction = InteractionState::default();
        let win = open(&mut state, &mut interaction, "terminal");
        let origin = state.window(win).unwrap().rect;

        dispatch(
            &mut state,
            &mut interaction,
            DesktopAction::BeginMove {
                window_id: win,
                pointer: PointerPosition {
                    x: origin.x + 40,
                    y: origin.y + 10,
                },
            },
        );
        dispatch(
            &mut state,
            &mut interaction,
            DesktopAction::UpdateMove {
                pointer: PointerPosition { x: 300, y: 250 },
            },
        );
        let moved = state.window(win).unwrap().rect;
        assert_eq!((moved.x, moved.y), (260, 240));
        assert_eq!(moved.size(), origin.size());

        dispatch(
            &mut state,
            &mut interaction,
            DesktopAction::UpdateMove {
                pointer: PointerPosition { x: 5, y: 5 },
            },
        );
        let clamped = state.window(win).unwrap().rect;
        assert_eq!((clamped.x, clamped.y), (0, 0));

        dispatch(&mut state, &mut interaction, DesktopAction::EndMove);
        assert!(interaction.dragging.is_none());
        dispatch(
            &mut state,
            &mut interaction,
            DesktopAction::UpdateMove {
                pointer: PointerPosition { x: 500, y: 500 },
            },
        );
        assert_eq!(state.window(win).unwrap().rect, clamped);
    }

    #[test]
    fn maximized_windows_ignore_drag_and_resize_gestures() {
        let mut state = DesktopState::default();
        let mut interaction = InteractionState::default();
        let win = open(&mut state, &mut interaction, "explorer");
        dispatch(
            &mut state,
            &mut interaction,
            DesktopAction::MaximizeWindow { window_id: win },
        );

        dispatch(
            &mut state,
            &mut interaction,
            DesktopAction::BeginMove {
                window_id: win,
                pointer: PointerPosition { x: 0, y: 0 },
            },
        );
        dispatch(
            &mut state,
            &mut interaction,
            DesktopAction::BeginResize {
                window_id: win,
                edge: ResizeEdge::East,
                pointer: PointerPosition { x: 0, y: 0 },
            },
        );
        assert_eq!(interaction, InteractionState::default());
    }

    #[test]
    fn resize_gesture_applies_floor_and_fixed_opposite_edge() {
        let mut state = DesktopState::default();
        let mut interaction = InteractionState::default();
        let win = open(&mut state, &mut interaction, "explorer");
        let start = state.window(win).unwrap().rect;

        dispatch(
            &mut state,
            &mut interaction,
            DesktopAction::BeginResize {
                window_id: win,
                edge: ResizeEdge::NorthWest,
                pointer: PointerPosition { x: 100, y: 100 },
            },
        );
        dispatch(
            &mut state,
            &mut interaction,
            DesktopAction::UpdateResize {
                pointer: PointerPosition { x: 900, y: 900 },
            },
        );
        let rect = state.window(win).unwrap().rect;
        assert_eq!((rect.w, rect.h), (400, 300));
        assert_eq!(rect.x + rect.w, start.x + start.w);
        assert_eq!(rect.y + rect.h, start.y + start.h);
        dispatch(&mut state, &mut interaction, DesktopAction::EndResize);
        assert!(interaction.resizing.is_none());
    }

    #[test]
    fn extreme_pointer_positions_saturate() {
        let mut state = DesktopState::default();
        let mut interaction = InteractionState::default();
        let win = open(&mut state, &mut interaction, "explorer");
        let far_low = PointerPosition {
            x: i32::MIN,
            y: i32::MIN,
        };
        let far_high = PointerPosition {
            x: i32::MAX,
            y: i32::MAX,
        };

        dispatch(
            &mut state,
            &mut interaction,
            DesktopAction::BeginMove {
                window_id: win,
                pointer: far_low,
            },
        );
        dispatch(
            &mut state,
            &mut interaction,
            DesktopAction::UpdateMove { pointer: far_high },
        );
        let rect = state.window(win).unwrap().rect;
        assert_eq!((rect.x, rect.y), (i32::MAX, i32::MAX));
        dispatch(&mut state, &mut interaction, DesktopAction::EndMove);

        dispatch(
            &mut state,
            &mut interaction,
            DesktopAction::BeginResize {
                window_id: win,
                edge: ResizeEdge::SouthEast,
                pointer: far_low,
            },
        );
        dispatch(
            &mut state,
            &mut interaction,
            DesktopAction::UpdateResize { pointer: far_high },
        );
        let rect = state.window(win).unwrap().rect;
        assert_eq!((rect.w, rect.h), (i32::MAX, i32::MAX));
    }

    #[test]
    fn taskbar_toggle_minimizes_if_focused_and_restores_if_minimized() {
        let mut state = DesktopState::default();
        let mut interaction = InteractionState::default();
        let win = open(&mut state, &mut interaction, "explorer");

        dispatch(
            &mut state,
            &mut interaction,
            DesktopAction::ToggleTaskbarWindow { window_id: win },
        );
        let record = state.window(win).unwrap();
        assert!(record.minimized && !record.is_focused);

        dispatch(
            &mut state,
            &mut interaction,
            DesktopAction::ToggleTaskbarWindow { window_id: win },
        );
        let record = state.window(win).unwrap();
        assert!(!record.minimized && record.is_focused);
    }

    #[test]
    fn at_most_one_window_is_focused_across_mixed_commands() {
        let mut state = DesktopState::default();
        let mut interaction = InteractionState::default();
        let apps = ["explorer", "notepad", "terminal", "calendar"];
        let mut ids = Vec::new();
        for (step, app) in apps.iter().cycle().take(24).enumerate() {
            match step % 4 {
                0 => ids.push(open(&mut state, &mut interaction, app)),
                1 => {
                    if let Some(id) = ids.get(step % ids.len().max(1)).copied() {
                        let _ = reduce_desktop(
                            &mut state,
                            &mut interaction,
                            DesktopAction::FocusWindow { window_id: id },
                        );
                    }
                }
                2 => {
                    if let Some(id) = ids.first().copied() {
                        let _ = reduce_desktop(
                            &mut state,
                            &mut interaction,
                            DesktopAction::MinimizeWindow { window_id: id },
                        );
                    }
                }
                _ => {
                    if let Some(id) = ids.pop() {
                        let _ = reduce_desktop(
                            &mut state,
                            &mut interaction,
                            DesktopAction::CloseWindow { window_id: id },
                        );
                    }
                }
            }
            assert!(focused_count(&state) <= 1, "step {step}");
            assert!(state.windows.iter().all(|w| !(w.minimized && w.is_focused)));
            let mut z = state.windows.iter().map(|w| w.z_index).collect::<Vec<_>>();
            z.sort();
            z.dedup();
            assert_eq!(z.len(), state.windows.len(), "z-index unique at step {step}");
        }
    }

    #[test]
    fn unknown_window_actions_error_without_mutation() {
        let mut state = DesktopState::default();
        let mut interaction = InteractionState::default();
        open(&mut state, &mut interaction, "explorer");
        let before = state.clone();

        for action in [
            DesktopAction::CloseWindow {
                window_id: WindowId(99),
            },
            DesktopAction::FocusWindow {
                window_id: WindowId(99),
            },
            DesktopAction::MaximizeWindow {
                window_id: WindowId(99),
            },
        ] {
            assert_eq!(
                reduce_desktop(&mut state, &mut interaction, action),
                Err(ReducerError::WindowNotFound)
            );
        }
        assert_eq!(state, before);
    }

    #[test]
    fn sort_icons_toggles_direction_for_same_key() {
        let mut state = DesktopState::default();
        let mut interaction = InteractionState::default();

        let effects = dispatch(
            &mut state,
            &mut interaction,
            DesktopAction::SortIcons {
                sort_by: SortOption::Name,
            },
        );
        assert_eq!(state.view_settings.sort_direction, SortDirection::Desc);
        assert_eq!(notices(&effects), vec!["Sorted icons by name".to_string()]);

        dispatch(
            &mut state,
            &mut interaction,
            DesktopAction::SortIcons {
                sort_by: SortOption::Size,
            },
        );
        assert_eq!(state.view_settings.sort_by, SortOption::Size);
        assert_eq!(state.view_settings.sort_direction, SortDirection::Asc);

        for expected in [SortDirection::Desc, SortDirection::Asc] {
            dispatch(
                &mut state,
                &mut interaction,
                DesktopAction::SortIcons {
                    sort_by: SortOption::Size,
                },
            );
            assert_eq!(state.view_settings.sort_direction, expected);
        }
    }

    #[test]
    fn icon_size_updates_both_fields_and_notifies() {
        let mut state = DesktopState::default();
        let mut interaction = InteractionState::default();
        let effects = dispatch(
            &mut state,
            &mut interaction,
            DesktopAction::SetIconSize {
                icon_size: IconSize::Large,
            },
        );
        assert_eq!(state.icon_size, IconSize::Large);
        assert_eq!(state.view_settings.icon_size, IconSize::Large);
        assert!(effects.contains(&RuntimeEffect::PersistShellPrefs));
        assert_eq!(
            notices(&effects),
            vec!["Icon size changed to large".to_string()]
        );
    }

    #[test]
    fn view_toggles_report_new_state() {
        let mut state = DesktopState::default();
        let mut interaction = InteractionState::default();
        let effects = dispatch(&mut state, &mut interaction, DesktopAction::ToggleShowIcons);
        assert!(!state.view_settings.show_icons);
        assert_eq!(notices(&effects), vec!["Desktop icons hidden".to_string()]);

        let effects = dispatch(
            &mut state,
            &mut interaction,
            DesktopAction::ToggleAutoArrange,
        );
        assert!(state.view_settings.auto_arrange);
        assert_eq!(notices(&effects), vec!["Auto-arrange enabled".to_string()]);
    }

    #[test]
    fn delete_app_unpins_and_forgets_recent_use() {
        let mut state = DesktopState::default();
        let mut interaction = InteractionState::default();
        open(&mut state, &mut interaction, "calculator");
        let calculator = AppId::new("calculator");
        assert!(state.pinned_apps.contains(&calculator));

        let effects = dispatch(
            &mut state,
            &mut interaction,
            DesktopAction::DeleteApp {
                app_id: calculator.clone(),
            },
        );
        assert!(state.app(&calculator).is_none());
        assert!(!state.pinned_apps.contains(&calculator));
        assert!(!state.recent_apps.contains(&calculator));
        assert_eq!(state.deleted_apps.len(), 1);
        assert_eq!(
            notices(&effects),
            vec!["Calculator moved to Recycle Bin".to_string()]
        );
    }

    #[test]
    fn copy_paste_duplicates_shortcut_and_cut_paste_clears_clipboard() {
        let mut state = DesktopState::default();
        let mut interaction = InteractionState::default();
        let app_count = state.apps.len();

        dispatch(
            &mut state,
            &mut interaction,
            DesktopAction::CopyApp {
                app_id: AppId::new("notepad"),
            },
        );
        dispatch(&mut state, &mut interaction, DesktopAction::PasteApp);
        assert_eq!(state.apps.len(), app_count + 1);
        let copy = state.apps.last().unwrap();
        assert_eq!(copy.id, AppId::new("notepad-copy-1"));
        assert_eq!(copy.display_name, "Notepad - Copy");
        assert!(state.clipboard.is_some());

        dispatch(
            &mut state,
            &mut interaction,
            DesktopAction::CutApp {
                app_id: AppId::new("explorer"),
            },
        );
        let effects = dispatch(&mut state, &mut interaction, DesktopAction::PasteApp);
        assert!(state.clipboard.is_none());
        assert_eq!(
            notices(&effects),
            vec!["File Explorer pasted to desktop".to_string()]
        );

        let effects = dispatch(&mut state, &mut interaction, DesktopAction::PasteApp);
        match effects.as_slice() {
            [RuntimeEffect::Notify(draft)] => {
                assert_eq!(draft.kind, NotificationKind::Warning);
                assert_eq!(draft.message, "Nothing to paste");
            }
            other => panic!("unexpected effects: {other:?}"),
        }
    }

    #[test]
    fn properties_notification_is_persistent() {
        let mut state = DesktopState::default();
        let mut interaction = InteractionState::default();
        let effects = dispatch(
            &mut state,
            &mut interaction,
            DesktopAction::ShowAppProperties {
                app_id: AppId::new("weather"),
            },
        );
        match effects.as_slice() {
            [RuntimeEffect::Notify(draft)] => assert!(draft.persistent),
            other => panic!("unexpected effects: {other:?}"),
        }
    }

    #[test]
    fn opening_an_app_closes_the_start_menu() {
        let mut state = DesktopState::default();
        let mut interaction = InteractionState::default();
        dispatch(
            &mut state,
            &mut interaction,
            DesktopAction::TogglePanel {
                panel: ShellPanel::StartMenu,
            },
        );
        assert!(state.panels.start_menu);
        open(&mut state, &mut interaction, "settings");
        assert!(!state.panels.start_menu);
    }
}
