//! Cache entry types.

use std::sync::Arc;

use vigil_config::WorkspaceConfig;
use vigil_registry::Rule;

/// Cached state for one workspace.
///
/// `config` and `rules` are shared so readers can hold on to a snapshot
/// while the cache replaces the entry.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    /// Parsed configuration.
    pub config: Arc<WorkspaceConfig>,
    /// Rules of every selected rule set.
    pub rules: Arc<Vec<Rule>>,
    /// Last time this entry was confirmed current.
    pub last_refreshed_at_ms: i64,
    /// Remote rule set timestamp the rules were fetched at.
    pub last_rule_set_timestamp: i64,
    /// Modification time of `vigil.yml` when the entry was built.
    pub config_file_modified_at_ms: i64,
}

impl CacheEntry {
    /// Creates a new cache entry.
    pub fn new(
        config: WorkspaceConfig,
        rules: Vec<Rule>,
        refreshed_at_ms: i64,
        rule_set_timestamp: i64,
        config_file_modified_at_ms: i64,
    ) -> Self {
        Self {
            config: Arc::new(config),
            rules: Arc::new(rules),
            last_refreshed_at_ms: refreshed_at_ms,
            last_rule_set_timestamp: rule_set_timestamp,
            config_file_modified_at_ms,
        }
    }

    /// Checks if this entry was built from the given timestamps.
    pub fn is_current(&self, rule_set_timestamp: i64, config_file_modified_at_ms: i64) -> bool {
        self.last_rule_set_timestamp == rule_set_timestamp
            && self.config_file_modified_at_ms == config_file_modified_at_ms
    }

    /// Returns `true` if the entry was last refreshed before `cutoff_ms`.
    pub fn is_stale(&self, cutoff_ms: i64) -> bool {
        self.last_refreshed_at_ms < cutoff_ms
    }
}
