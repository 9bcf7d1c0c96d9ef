//! Explicit runtime effect executor for reducer-emitted side effects.

use leptos::logging;

use crate::persistence;
use crate::reducer::RuntimeEffect;
use crate::runtime_context::DesktopRuntime;

/// Executes reducer effects in emission order.
///
/// Persistence failures are logged and never roll back the state change that produced them.
pub(crate) fn run_effects(runtime: &mut DesktopRuntime, effects: Vec<RuntimeEffect>) {
    for effect in effects {
        run_effect(runtime, effect);
    }
}

fn run_effect(runtime: &mut DesktopRuntime, effect: RuntimeEffect) {
    match effect {
        RuntimeEffect::PersistShellPrefs => {
            let snapshot = runtime.desktop.shell_prefs_snapshot();
            if let Err(err) = persistence::persist_shell_prefs(runtime.store.as_ref(), &snapshot) {
                logging::warn!("persist shell prefs failed: {err}");
            }
        }
        RuntimeEffect::PersistVfs => {
            let snapshot = runtime.vfs.snapshot();
            if let Err(err) = persistence::persist_vfs(runtime.store.as_ref(), &snapshot) {
                logging::warn!("persist vfs failed: {err}");
            }
        }
        RuntimeEffect::Notify(draft) => {
            runtime.notify(draft);
        }
        RuntimeEffect::FocusWindowInput(window_id) => {
            runtime.focus_request = Some(window_id);
        }
        RuntimeEffect::DiscardWindowScratch(window_id) => {
            if let Err(err) = persistence::clear_notepad_scratch(runtime.store.as_ref(), window_id)
            {
                logging::warn!("discard window scratch failed: {err}");
            }
            if runtime.focus_request == Some(window_id) {
                runtime.focus_request = None;
            }
        }
    }
}
