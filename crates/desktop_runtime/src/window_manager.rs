//! Shared window-manager transition helpers used by the desktop reducer.

use crate::model::{
    DesktopState, PointerPosition, ResizeEdge, WindowId, WindowPosition, WindowRecord, WindowRect,
};

/// Minimum window width enforced during interactive resize.
pub const MIN_WINDOW_WIDTH: i32 = 400;
/// Minimum window height enforced during interactive resize.
pub const MIN_WINDOW_HEIGHT: i32 = 300;
/// Height of the taskbar strip reserved at the bottom of the viewport.
pub const TASKBAR_HEIGHT: i32 = 48;
/// Origin of the first cascaded window.
pub const CASCADE_ORIGIN: i32 = 100;
/// Per-window cascade offset in both axes.
pub const CASCADE_STEP: i32 = 30;
/// Number of cascade slots before the offset wraps.
pub const CASCADE_SLOTS: usize = 5;

/// Focuses and raises `window_id` above every other window.
///
/// Returns `false` when the window does not exist.
pub fn focus_window_internal(state: &mut DesktopState, window_id: WindowId) -> bool {
    let top_z = state.highest_z_index;
    let Some(target) = state.windows.iter().find(|w| w.id == window_id) else {
        return false;
    };

    let already_focused_top = target.is_focused && !target.minimized && target.z_index == top_z;
    if already_focused_top {
        return true;
    }

    state.highest_z_index = top_z.saturating_add(1);
    let z_index = state.highest_z_index;
    for window in &mut state.windows {
        if window.id == window_id {
            window.is_focused = true;
            window.minimized = false;
            window.z_index = z_index;
        } else {
            window.is_focused = false;
        }
    }
    true
}

/// Marks `window_id` as the only focused window without touching the stack order.
pub fn activate_window_in_place(state: &mut DesktopState, window_id: WindowId) {
    for window in &mut state.windows {
        window.is_focused = window.id == window_id;
    }
}

/// Focuses the visible window with the highest z-index, skipping `excluding`.
///
/// Returns the newly focused window, if any.
pub fn focus_topmost_visible(
    state: &mut DesktopState,
    excluding: Option<WindowId>,
) -> Option<WindowId> {
    let next = state
        .windows
        .iter()
        .filter(|w| !w.minimized && Some(w.id) != excluding)
        .max_by_key(|w| w.z_index)
        .map(|w| w.id)?;
    focus_window_internal(state, next);
    Some(next)
}

/// Enforces focus invariants: minimized windows are never focused and at most one window is.
///
/// When several windows claim focus, the one highest in the stack keeps it.
pub fn normalize_window_stack(state: &mut DesktopState) {
    for window in &mut state.windows {
        if window.minimized {
            window.is_focused = false;
        }
    }

    let keeper = state
        .windows
        .iter()
        .filter(|w| w.is_focused)
        .max_by_key(|w| w.z_index)
        .map(|w| w.id);
    for window in &mut state.windows {
        if Some(window.id) != keeper {
            window.is_focused = false;
        }
    }

    let max_z = state.windows.iter().map(|w| w.z_index).max().unwrap_or(0);
    state.highest_z_index = state.highest_z_index.max(max_z);
}

/// Origin for a newly opened window given the number of windows already open.
pub fn cascade_position(open_count: usize) -> WindowPosition {
    let offset = (open_count % CASCADE_SLOTS) as i32 * CASCADE_STEP;
    WindowPosition {
        x: CASCADE_ORIGIN + offset,
        y: CASCADE_ORIGIN + offset,
    }
}

/// New window origin for a title-bar drag, clamped to the non-negative quadrant.
pub fn drag_position(pointer: PointerPosition, pointer_offset: PointerPosition) -> WindowPosition {
    WindowPosition {
        x: pointer.x.saturating_sub(pointer_offset.x).max(0),
        y: pointer.y.saturating_sub(pointer_offset.y).max(0),
    }
}

/// Applies resize deltas for a given edge/corner drag.
///
/// Width and height never drop below [`MIN_WINDOW_WIDTH`]/[`MIN_WINDOW_HEIGHT`]. When shrinking
/// from the west or north edge the origin moves by exactly the consumed delta, so the opposite
/// edge stays fixed on screen.
pub fn resize_rect(start: WindowRect, edge: ResizeEdge, dx: i32, dy: i32) -> WindowRect {
    let mut rect = start;

    if edge.grows_east() {
        rect.w = start.w.saturating_add(dx).max(MIN_WINDOW_WIDTH);
    } else if edge.shifts_west() {
        rect.w = start.w.saturating_sub(dx).max(MIN_WINDOW_WIDTH);
        rect.x = start.x.saturating_add(start.w.saturating_sub(rect.w));
    }

    if edge.grows_south() {
        rect.h = start.h.saturating_add(dy).max(MIN_WINDOW_HEIGHT);
    } else if edge.shifts_north() {
        rect.h = start.h.saturating_sub(dy).max(MIN_WINDOW_HEIGHT);
        rect.y = start.y.saturating_add(start.h.saturating_sub(rect.h));
    }

    rect
}

/// Frame occupied by a maximized window: the viewport minus the taskbar strip.
pub fn maximized_rect(viewport: WindowRect) -> WindowRect {
    WindowRect {
        h: viewport.h.saturating_sub(TASKBAR_HEIGHT).max(0),
        ..viewport
    }
}

/// Geometry a window should be drawn with inside `viewport`.
pub fn rendered_rect(window: &WindowRecord, viewport: WindowRect) -> WindowRect {
    if window.maximized {
        maximized_rect(viewport)
    } else {
        window.rect
    }
}
