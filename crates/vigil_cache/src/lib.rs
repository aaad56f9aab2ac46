//! # vigil_cache
//!
//! Per-workspace cache of the parsed `vigil.yml` and the rules it selects.
//!
//! [`RuleCache`] decides on every refresh whether the cached rules are still
//! current (same remote rule set timestamp, same config file modification
//! time) and only then re-fetches rule content. [`select_rules`] narrows the
//! cached rules to the ones applicable to one file.

mod activity;
mod entry;
mod error;
mod filter;
mod manager;

pub use activity::{ACTIVITY_WINDOW_MS, ActivityTracker};
pub use entry::CacheEntry;
pub use error::CacheError;
pub use filter::{owning_workspace, relative_path, select_rules};
pub use manager::{CACHE_MAX_AGE_MS, CacheEvent, RefreshOutcome, RuleCache};

/// Milliseconds since the Unix epoch.
pub fn now_ms() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}
