//! Mutual exclusion and throttling of sync runs

use chrono::{DateTime, Duration, Utc};
use fieldsync_domain::SkipReason;
use parking_lot::Mutex;

#[derive(Debug, Default)]
struct GuardState {
    running: bool,
    last_run_at: Option<DateTime<Utc>>,
    last_success_at: Option<DateTime<Utc>>,
}

/// Admits at most one run at a time, and no run sooner than the throttle
/// window after the previously accepted one.
///
/// State is mutated only under the lock and never across an await point.
#[derive(Debug)]
pub struct SyncGuard {
    state: Mutex<GuardState>,
    throttle_window: Duration,
}

impl SyncGuard {
    pub fn new(throttle_window: Duration) -> Self {
        Self { state: Mutex::new(GuardState::default()), throttle_window }
    }

    /// Try to start a run at `now`.
    ///
    /// On acceptance `last_run_at` becomes `now`. A rejected attempt leaves
    /// the state untouched.
    pub fn try_acquire(&self, now: DateTime<Utc>) -> Result<RunPermit<'_>, SkipReason> {
        let mut state = self.state.lock();
        if state.running {
            return Err(SkipReason::AlreadyRunning);
        }
        if let Some(last) = state.last_run_at {
            if now - last < self.throttle_window {
                return Err(SkipReason::Throttled);
            }
        }
        state.running = true;
        state.last_run_at = Some(now);
        Ok(RunPermit { guard: self })
    }

    pub fn is_running(&self) -> bool {
        self.state.lock().running
    }

    /// Completion time of the last successful run
    pub fn last_success_at(&self) -> Option<DateTime<Utc>> {
        self.state.lock().last_success_at
    }
}

/// Proof that the holder owns the running slot. Dropping it releases the
/// slot, whether the run returned, panicked or was cancelled.
#[derive(Debug)]
#[must_use = "dropping the permit ends the run"]
pub struct RunPermit<'a> {
    guard: &'a SyncGuard,
}

impl RunPermit<'_> {
    pub fn mark_success(&self, completed_at: DateTime<Utc>) {
        self.guard.state.lock().last_success_at = Some(completed_at);
    }
}

impl Drop for RunPermit<'_> {
    fn drop(&mut self) {
        self.guard.state.lock().running = false;
    }
}
