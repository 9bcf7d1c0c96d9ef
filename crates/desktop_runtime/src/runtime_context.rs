//! Runtime container that owns the desktop stores and wires them to persistence, timers, widget
//! providers, and subscribers.
//!
//! A [`DesktopRuntime`] is constructed once at startup and handed by reference to every surface
//! that needs it. Commands go through its methods; surfaces observe changes through
//! [`DesktopRuntime::subscribe`].

use std::collections::HashMap;
use std::rc::Rc;

use leptos::logging;
use platform_host::{Clock, FsItemId, PrefsStore, TimerHandle, TimerQueue, DEFAULT_TEXT_MIME_TYPE};

use crate::apps::viewer_for_mime;
use crate::effect_executor;
use crate::model::{AppId, DesktopPreferences, DesktopState, InteractionState, WindowId};
use crate::notifications::{NotificationDraft, NotificationId, NotificationQueue};
use crate::persistence::{self, NotepadScratch};
use crate::reducer::{reduce_desktop, DesktopAction};
use crate::vfs::{reduce_vfs, VfsAction, VfsError, VfsState};
use crate::widgets::{
    resolve_headlines, resolve_weather, HeadlinesProvider, WeatherProvider, WidgetData,
};

/// Work registered on the runtime timer queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduledTask {
    /// Auto-dismiss a non-persistent notification.
    DismissNotification(NotificationId),
    /// Poll the weather provider.
    RefreshWeather,
    /// Poll the headlines provider.
    RefreshHeadlines,
}

/// Store touched by a committed change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreChange {
    /// Windows, shell flags, or preferences.
    Desktop,
    /// Virtual filesystem.
    Vfs,
    /// Notification list.
    Notifications,
    /// Weather or headlines data.
    Widgets,
}

/// Read-only view handed to subscribers after each change.
#[derive(Clone, Copy)]
pub struct RuntimeView<'a> {
    /// Desktop session state.
    pub desktop: &'a DesktopState,
    /// Virtual filesystem.
    pub vfs: &'a VfsState,
    /// Notification list.
    pub notifications: &'a NotificationQueue,
    /// Widget data.
    pub widgets: &'a WidgetData,
}

/// Handle returned by [`DesktopRuntime::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(StoreChange, RuntimeView<'_>)>;

/// Interactive yes/no gate for destructive commands.
pub trait ConfirmationPrompt {
    /// Returns `true` when the user accepts.
    fn confirm(&self, title: &str, message: &str) -> bool;
}

impl<F> ConfirmationPrompt for F
where
    F: Fn(&str, &str) -> bool,
{
    fn confirm(&self, title: &str, message: &str) -> bool {
        self(title, message)
    }
}

/// Long-lived owner of the desktop, VFS, notification, and widget stores.
pub struct DesktopRuntime {
    pub(crate) desktop: DesktopState,
    pub(crate) interaction: InteractionState,
    pub(crate) vfs: VfsState,
    pub(crate) notifications: NotificationQueue,
    pub(crate) widgets: WidgetData,
    pub(crate) timers: TimerQueue<ScheduledTask>,
    pub(crate) notification_timers: HashMap<NotificationId, TimerHandle>,
    pub(crate) store: Rc<dyn PrefsStore>,
    pub(crate) clock: Rc<dyn Clock>,
    pub(crate) focus_request: Option<WindowId>,
    weather_provider: Option<Box<dyn WeatherProvider>>,
    weather_timer: Option<TimerHandle>,
    headlines_provider: Option<Box<dyn HeadlinesProvider>>,
    headlines_timer: Option<TimerHandle>,
    subscribers: Vec<(SubscriptionId, Listener)>,
    next_subscription_id: u64,
}

impl DesktopRuntime {
    /// Boots with default preferences. See [`DesktopRuntime::boot_with`].
    pub fn boot(store: Rc<dyn PrefsStore>, clock: Rc<dyn Clock>) -> Self {
        Self::boot_with(store, clock, DesktopPreferences::default())
    }

    /// Hydrates shell preferences and the VFS from `store`, seeding the VFS on first boot.
    pub fn boot_with(
        store: Rc<dyn PrefsStore>,
        clock: Rc<dyn Clock>,
        preferences: DesktopPreferences,
    ) -> Self {
        let boot = persistence::load_boot_snapshot(store.as_ref());
        // Window ids key per-window scratch that outlives a session, so start from the clock.
        let mut desktop = DesktopState {
            next_window_id: clock.now_ms().max(1),
            preferences,
            ..DesktopState::default()
        };
        if let Some(shell) = boot.shell {
            desktop.apply_shell_prefs(shell);
        }

        let vfs = match boot.vfs {
            Some(snapshot) => VfsState::from_snapshot(snapshot),
            None => {
                let seeded = VfsState::seeded();
                if let Err(err) = persistence::persist_vfs(store.as_ref(), &seeded.snapshot()) {
                    logging::warn!("persist seeded vfs failed: {err}");
                }
                seeded
            }
        };

        Self {
            desktop,
            interaction: InteractionState::default(),
            vfs,
            notifications: NotificationQueue::default(),
            widgets: WidgetData::default(),
            timers: TimerQueue::default(),
            notification_timers: HashMap::new(),
            store,
            clock,
            focus_request: None,
            weather_provider: None,
            weather_timer: None,
            headlines_provider: None,
            headlines_timer: None,
            subscribers: Vec::new(),
            next_subscription_id: 1,
        }
    }

    pub fn desktop(&self) -> &DesktopState {
        &self.desktop
    }

    pub fn interaction(&self) -> &InteractionState {
        &self.interaction
    }

    pub fn vfs(&self) -> &VfsState {
        &self.vfs
    }

    pub fn notifications(&self) -> &NotificationQueue {
        &self.notifications
    }

    pub fn widgets(&self) -> &WidgetData {
        &self.widgets
    }

    /// Number of pending timer registrations.
    pub fn pending_timers(&self) -> usize {
        self.timers.pending()
    }

    /// Window whose primary input should receive keyboard focus, cleared on read.
    pub fn take_focus_request(&mut self) -> Option<WindowId> {
        self.focus_request.take()
    }

    /// Registers a change listener.
    pub fn subscribe(
        &mut self,
        listener: impl FnMut(StoreChange, RuntimeView<'_>) + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription_id);
        self.next_subscription_id += 1;
        self.subscribers.push((id, Box::new(listener)));
        id
    }

    /// Removes a listener. Returns `false` for unknown ids.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub, _)| *sub != id);
        self.subscribers.len() != before
    }

    pub(crate) fn publish(&mut self, change: StoreChange) {
        let view = RuntimeView {
            desktop: &self.desktop,
            vfs: &self.vfs,
            notifications: &self.notifications,
            widgets: &self.widgets,
        };
        for (_, listener) in &mut self.subscribers {
            listener(change, view);
        }
    }

    /// Applies a desktop action. Unknown ids are logged and ignored.
    pub fn dispatch(&mut self, action: DesktopAction) {
        match reduce_desktop(&mut self.desktop, &mut self.interaction, action) {
            Ok(effects) => {
                self.publish(StoreChange::Desktop);
                effect_executor::run_effects(self, effects);
            }
            Err(err) => logging::warn!("desktop reducer error: {err}"),
        }
    }

    /// Applies a VFS action and returns the created item id, if any.
    ///
    /// # Errors
    ///
    /// Returns the [`VfsError`] unchanged; state is untouched in that case.
    pub fn try_dispatch_vfs(&mut self, action: VfsAction) -> Result<Option<FsItemId>, VfsError> {
        let outcome = reduce_vfs(&mut self.vfs, action, self.clock.now_utc())?;
        self.publish(StoreChange::Vfs);
        effect_executor::run_effects(self, outcome.effects);
        Ok(outcome.created)
    }

    /// Like [`DesktopRuntime::try_dispatch_vfs`], logging and swallowing errors.
    pub fn dispatch_vfs(&mut self, action: VfsAction) -> Option<FsItemId> {
        match self.try_dispatch_vfs(action) {
            Ok(created) => created,
            Err(err) => {
                logging::warn!("vfs reducer error: {err}");
                None
            }
        }
    }

    /// Pushes a notification and schedules its expiry unless it is persistent.
    pub fn notify(&mut self, draft: NotificationDraft) -> NotificationId {
        let persistent = draft.persistent;
        let id = self.notifications.add(draft, self.clock.now_utc());
        if !persistent {
            let handle = self.timers.schedule_once(
                self.clock.now_ms(),
                self.desktop.preferences.notification_timeout_ms,
                ScheduledTask::DismissNotification(id),
            );
            self.notification_timers.insert(id, handle);
        }
        self.publish(StoreChange::Notifications);
        id
    }

    /// Removes a notification and cancels its expiry timer.
    pub fn dismiss_notification(&mut self, id: NotificationId) {
        if let Some(handle) = self.notification_timers.remove(&id) {
            self.timers.cancel(handle);
        }
        if self.notifications.dismiss(id) {
            self.publish(StoreChange::Notifications);
        }
    }

    /// Empties the notification list and cancels every pending expiry.
    pub fn clear_notifications(&mut self) {
        self.timers
            .cancel_where(|task| matches!(task, ScheduledTask::DismissNotification(_)));
        self.notification_timers.clear();
        self.notifications.clear();
        self.publish(StoreChange::Notifications);
    }

    /// Runs every timer due at the current clock time. Returns how many tasks ran.
    pub fn run_due_timers(&mut self) -> usize {
        let due = self.timers.drain_due(self.clock.now_ms());
        let count = due.len();
        for task in due {
            match task {
                ScheduledTask::DismissNotification(id) => {
                    self.notification_timers.remove(&id);
                    if self.notifications.dismiss(id) {
                        self.publish(StoreChange::Notifications);
                    }
                }
                ScheduledTask::RefreshWeather => self.refresh_weather(),
                ScheduledTask::RefreshHeadlines => self.refresh_headlines(),
            }
        }
        count
    }

    /// Installs (or removes) the weather provider, refreshing now and polling on an interval.
    pub fn set_weather_provider(&mut self, provider: Option<Box<dyn WeatherProvider>>) {
        if let Some(handle) = self.weather_timer.take() {
            self.timers.cancel(handle);
        }
        self.weather_provider = provider;
        if self.weather_provider.is_some() {
            self.weather_timer = Some(self.timers.schedule_repeating(
                self.clock.now_ms(),
                self.desktop.preferences.weather_refresh_ms,
                ScheduledTask::RefreshWeather,
            ));
            self.refresh_weather();
        }
    }

    /// Installs (or removes) the headlines provider, refreshing now and polling on an interval.
    pub fn set_headlines_provider(&mut self, provider: Option<Box<dyn HeadlinesProvider>>) {
        if let Some(handle) = self.headlines_timer.take() {
            self.timers.cancel(handle);
        }
        self.headlines_provider = provider;
        if self.headlines_provider.is_some() {
            self.headlines_timer = Some(self.timers.schedule_repeating(
                self.clock.now_ms(),
                self.desktop.preferences.headlines_refresh_ms,
                ScheduledTask::RefreshHeadlines,
            ));
            self.refresh_headlines();
        }
    }

    /// Fetches weather for the configured location.
    pub fn refresh_weather(&mut self) {
        let Some(provider) = self.weather_provider.as_deref() else {
            return;
        };
        let (report, notice) = resolve_weather(provider, &self.desktop.preferences.weather_location);
        self.widgets.weather = Some(report);
        self.publish(StoreChange::Widgets);
        if let Some(notice) = notice {
            self.notify(notice);
        }
    }

    /// Fetches the configured number of headlines.
    pub fn refresh_headlines(&mut self) {
        let Some(provider) = self.headlines_provider.as_deref() else {
            return;
        };
        let (headlines, notice) = resolve_headlines(provider, self.desktop.preferences.headlines_limit);
        self.widgets.headlines = headlines;
        self.publish(StoreChange::Widgets);
        if let Some(notice) = notice {
            self.notify(notice);
        }
    }

    /// Deletes a VFS item after the user confirms. Returns `true` if the item was deleted.
    pub fn delete_item_confirmed(
        &mut self,
        id: FsItemId,
        prompt: &dyn ConfirmationPrompt,
    ) -> bool {
        let Some(item) = self.vfs.file_by_id(id) else {
            return false;
        };
        let message = format!("Are you sure you want to delete \"{}\"?", item.name);
        if !prompt.confirm("Delete Item", &message) {
            return false;
        }
        self.try_dispatch_vfs(VfsAction::Delete { id }).is_ok()
    }

    /// Closes a window, asking first when it holds unsaved changes. Returns `true` if closed.
    pub fn close_window_confirmed(
        &mut self,
        window_id: WindowId,
        has_unsaved_changes: bool,
        prompt: &dyn ConfirmationPrompt,
    ) -> bool {
        if self.desktop.window(window_id).is_none() {
            return false;
        }
        if has_unsaved_changes
            && !prompt.confirm(
                "Unsaved Changes",
                "You have unsaved changes. Do you want to discard them?",
            )
        {
            return false;
        }
        self.dispatch(DesktopAction::CloseWindow { window_id });
        true
    }

    /// Opens a file in its viewer app via the open-file handoff key.
    ///
    /// Returns the focused viewer window, or `None` when `id` is not a file or the viewer is
    /// no longer on the desktop.
    pub fn open_file(&mut self, id: FsItemId) -> Option<WindowId> {
        let item = self.vfs.file_by_id(id).filter(|item| item.is_file())?;
        let app_id = AppId::new(viewer_for_mime(item.mime_type.as_deref()).app_id());
        self.desktop.app(&app_id)?;
        if let Err(err) = persistence::write_open_file_handoff(self.store.as_ref(), &app_id, id) {
            logging::warn!("open-file handoff failed: {err}");
            return None;
        }
        self.dispatch(DesktopAction::OpenApp { app_id });
        self.desktop.focused_window_id()
    }

    /// Reads and clears the pending open-file id for `app_id`.
    pub fn take_open_file(&self, app_id: &AppId) -> Option<FsItemId> {
        persistence::take_open_file_handoff(self.store.as_ref(), app_id)
    }

    /// Saves a text document: updates the named file under `parent` or creates it.
    ///
    /// # Errors
    ///
    /// Returns a [`VfsError`] for invalid names, missing parents, or a folder with the same name.
    pub fn save_text_document(
        &mut self,
        parent: Option<FsItemId>,
        name: &str,
        content: &str,
    ) -> Result<FsItemId, VfsError> {
        let existing = self
            .vfs
            .files_in_folder(parent)
            .into_iter()
            .find(|item| item.name == name)
            .map(|item| (item.id, item.is_file()));

        match existing {
            Some((id, true)) => {
                self.try_dispatch_vfs(VfsAction::UpdateContent {
                    id,
                    content: content.to_string(),
                })?;
                self.notify(NotificationDraft::success(
                    "File Saved",
                    format!("{name} has been saved"),
                ));
                Ok(id)
            }
            Some((id, false)) => Err(VfsError::NotAFile(id)),
            None => self
                .try_dispatch_vfs(VfsAction::CreateFile {
                    name: name.to_string(),
                    parent,
                    content: content.to_string(),
                    mime_type: Some(DEFAULT_TEXT_MIME_TYPE.to_string()),
                })?
                .ok_or(VfsError::InvalidName(name.to_string())),
        }
    }

    /// Stores the unsaved buffer of a notepad window.
    pub fn save_notepad_scratch(&self, window_id: WindowId, scratch: &NotepadScratch) {
        if let Err(err) = persistence::save_notepad_scratch(self.store.as_ref(), window_id, scratch)
        {
            logging::warn!("notepad scratch save failed: {err}");
        }
    }

    /// Unsaved buffer of a notepad window, if any.
    pub fn notepad_scratch(&self, window_id: WindowId) -> Option<NotepadScratch> {
        persistence::load_notepad_scratch(self.store.as_ref(), window_id)
    }
}
