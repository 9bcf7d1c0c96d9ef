//! One-shot and repeating timer registrations driven by an external clock.
//!
//! The queue never reads a clock itself. Owners pass the current time when scheduling and when
//! draining, which keeps expiry deterministic under a [`crate::ManualClock`]. Every registration
//! returns a [`TimerHandle`] that can be cancelled, and dropping the queue drops every pending
//! task.

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// Handle for a pending timer registration.
pub struct TimerHandle(u64);

#[derive(Debug, Clone)]
struct TimerEntry<T> {
    handle: TimerHandle,
    due_ms: u64,
    interval_ms: Option<u64>,
    task: T,
}

#[derive(Debug, Clone)]
/// Pending timer registrations carrying task payloads of type `T`.
pub struct TimerQueue<T> {
    next_handle: u64,
    entries: Vec<TimerEntry<T>>,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self {
            next_handle: 1,
            entries: Vec::new(),
        }
    }
}

impl<T: Clone> TimerQueue<T> {
    /// Registers `task` to fire once, `delay_ms` after `now_ms`.
    pub fn schedule_once(&mut self, now_ms: u64, delay_ms: u64, task: T) -> TimerHandle {
        self.push(now_ms.saturating_add(delay_ms), None, task)
    }

    /// Registers `task` to fire every `interval_ms`, first at `now_ms + interval_ms`.
    ///
    /// Intervals below one millisecond are raised to one.
    pub fn schedule_repeating(&mut self, now_ms: u64, interval_ms: u64, task: T) -> TimerHandle {
        let interval_ms = interval_ms.max(1);
        self.push(now_ms.saturating_add(interval_ms), Some(interval_ms), task)
    }

    /// Cancels a registration. Returns `false` if it already fired (one-shot) or was cancelled.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.handle != handle);
        self.entries.len() != before
    }

    /// Cancels every registration.
    pub fn cancel_all(&mut self) {
        self.entries.clear();
    }

    /// Cancels every registration whose task matches `predicate`.
    pub fn cancel_where(&mut self, mut predicate: impl FnMut(&T) -> bool) -> usize {
        let before = self.entries.len();
        self.entries.retain(|entry| !predicate(&entry.task));
        before - self.entries.len()
    }

    /// Returns `true` while `handle` is still registered.
    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.entries.iter().any(|entry| entry.handle == handle)
    }

    /// Number of pending registrations.
    pub fn pending(&self) -> usize {
        self.entries.len()
    }

    /// Earliest due time across pending registrations.
    pub fn next_due_ms(&self) -> Option<u64> {
        self.entries.iter().map(|entry| entry.due_ms).min()
    }

    /// Removes and returns every task due at or before `now_ms`.
    ///
    /// Tasks come out ordered by due time, then by registration order. One-shot timers are
    /// removed; repeating timers fire at most once per drain and re-arm on their next interval
    /// boundary after `now_ms`.
    pub fn drain_due(&mut self, now_ms: u64) -> Vec<T> {
        let mut due = self
            .entries
            .iter()
            .filter(|entry| entry.due_ms <= now_ms)
            .map(|entry| (entry.due_ms, entry.handle))
            .collect::<Vec<_>>();
        due.sort();

        let mut fired = Vec::with_capacity(due.len());
        for (_, handle) in due {
            let Some(index) = self.entries.iter().position(|entry| entry.handle == handle) else {
                continue;
            };
            match self.entries[index].interval_ms {
                Some(interval) => {
                    let entry = &mut self.entries[index];
                    fired.push(entry.task.clone());
                    let missed = (now_ms - entry.due_ms) / interval + 1;
                    entry.due_ms = entry.due_ms.saturating_add(missed.saturating_mul(interval));
                }
                None => fired.push(self.entries.remove(index).task),
            }
        }
        fired
    }

    fn push(&mut self, due_ms: u64, interval_ms: Option<u64>, task: T) -> TimerHandle {
        let handle = TimerHandle(self.next_handle);
        self.next_handle = self.next_handle.saturating_add(1);
        self.entries.push(TimerEntry {
            handle,
            due_ms,
            interval_ms,
            task,
        });
        handle
    }
}
