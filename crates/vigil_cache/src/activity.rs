//! Editor activity tracking.

use std::sync::atomic::{AtomicI64, Ordering};

use crate::now_ms;

/// How long after the last editor activity periodic refreshes keep running.
pub const ACTIVITY_WINDOW_MS: i64 = 10 * 60 * 1000;

/// Records the time of the last document open or change.
#[derive(Debug, Default)]
pub struct ActivityTracker {
    last_activity_ms: AtomicI64,
}

impl ActivityTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records activity now.
    pub fn record(&self) {
        self.record_at(now_ms());
    }

    /// Records activity at `at_ms`.
    pub fn record_at(&self, at_ms: i64) {
        self.last_activity_ms.fetch_max(at_ms, Ordering::Relaxed);
    }

    /// Returns the time of the last recorded activity (0 if none).
    pub fn last_activity_ms(&self) -> i64 {
        self.last_activity_ms.load(Ordering::Relaxed)
    }

    /// Returns `true` if activity was recorded within the window before `now_ms`.
    pub fn is_recent_at(&self, now_ms: i64) -> bool {
        let last = self.last_activity_ms();
        last > 0 && now_ms - last <= ACTIVITY_WINDOW_MS
    }
}
