//! Rule cache manager.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::UNIX_EPOCH;

use parking_lot::Mutex;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};
use vigil_config::WorkspaceConfig;
use vigil_registry::{Language, Rule, RuleSource};

use crate::{ActivityTracker, CacheEntry, CacheError, filter, now_ms};

/// Entries not refreshed for this long are garbage collected.
pub const CACHE_MAX_AGE_MS: i64 = 10 * 60 * 1000;

const EVENT_CAPACITY: usize = 16;

/// Notification sent to cache subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheEvent {
    /// The rules of a workspace were replaced.
    RulesUpdated { workspace: PathBuf },
}

/// What a workspace refresh did to the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The existing entry was still current; only its refresh time moved.
    Touched,
    /// A new entry was built and stored.
    Replaced,
    /// The entry was deleted (no usable config or unknown rule sets).
    Removed,
    /// Rule content could not be fetched; the existing entry was kept.
    Kept,
    /// A later refresh of the same workspace started meanwhile; this one
    /// stored nothing.
    Superseded,
}

/// Per-workspace cache of configuration and rules.
pub struct RuleCache {
    source: Arc<dyn RuleSource>,
    entries: Mutex<HashMap<PathBuf, CacheEntry>>,
    /// Ticket of the latest refresh started per workspace.
    ///
    /// Lock order: `tickets` before `entries`.
    tickets: Mutex<HashMap<PathBuf, u64>>,
    next_ticket: AtomicU64,
    activity: ActivityTracker,
    events: broadcast::Sender<CacheEvent>,
}

impl RuleCache {
    /// Creates an empty cache backed by `source`.
    pub fn new(source: Arc<dyn RuleSource>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            source,
            entries: Mutex::new(HashMap::new()),
            tickets: Mutex::new(HashMap::new()),
            next_ticket: AtomicU64::new(0),
            activity: ActivityTracker::new(),
            events,
        }
    }

    /// Editor activity clock consulted by [`RuleCache::refresh_all`].
    pub fn activity(&self) -> &ActivityTracker {
        &self.activity
    }

    /// Subscribes to cache events.
    pub fn subscribe(&self) -> broadcast::Receiver<CacheEvent> {
        self.events.subscribe()
    }

    /// Returns a snapshot of a workspace's entry.
    pub fn get(&self, workspace: &Path) -> Option<CacheEntry> {
        self.entries.lock().get(workspace).cloned()
    }

    /// Stores an entry directly, bypassing the refresh logic.
    pub fn force_set(&self, workspace: impl Into<PathBuf>, entry: CacheEntry) {
        self.entries.lock().insert(workspace.into(), entry);
    }

    /// Returns the number of cached workspaces.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Returns `true` if no workspace is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Refreshes every workspace that has a `vigil.yml`.
    ///
    /// Does nothing unless the editor was active within the activity window.
    /// Workspaces without a configuration file are skipped; their entries
    /// are only dropped by [`RuleCache::garbage_collect`].
    pub async fn refresh_all(&self, workspaces: &[PathBuf]) {
        if !self.activity.is_recent_at(now_ms()) {
            debug!("No recent editor activity, skipping rule refresh");
            return;
        }

        for workspace in workspaces {
            if WorkspaceConfig::discover(workspace).is_some() {
                self.refresh_workspace(workspace).await;
            }
        }
    }

    /// Refreshes a single workspace.
    ///
    /// Refreshes of one workspace may overlap (periodic tick and a config
    /// file change). Only the most recently started one may store or delete
    /// the entry; older ones finish as [`RefreshOutcome::Superseded`].
    pub async fn refresh_workspace(&self, workspace: &Path) -> RefreshOutcome {
        let ticket = self.begin_refresh(workspace);
        let config_path = workspace.join(vigil_config::CONFIG_FILE);

        let (config, modified_at_ms, timestamp) = match self.observe(&config_path).await {
            Ok(observed) => observed,
            Err(e) => {
                let removed = self.commit_if_latest(workspace, ticket, |entries| {
                    entries.remove(workspace);
                });
                if removed.is_none() {
                    return RefreshOutcome::Superseded;
                }
                debug!("Dropping rules for {}: {}", workspace.display(), e);
                return RefreshOutcome::Removed;
            }
        };

        {
            let mut entries = self.entries.lock();
            if let Some(entry) = entries.get_mut(workspace)
                && entry.is_current(timestamp, modified_at_ms)
            {
                entry.last_refreshed_at_ms = now_ms();
                return RefreshOutcome::Touched;
            }
        }

        let rules = match self.source.fetch_rules(&config.rule_set_names).await {
            Ok(rules) => rules,
            Err(e) => {
                warn!("Failed to fetch rules for {}: {}", workspace.display(), e);
                return RefreshOutcome::Kept;
            }
        };

        let rule_count = rules.len();
        let rule_set_names = config.rule_set_names.clone();
        let entry = CacheEntry::new(config, rules, now_ms(), timestamp, modified_at_ms);
        let stored = self.commit_if_latest(workspace, ticket, |entries| {
            // An overlapping refresh may already have stored the same data.
            if let Some(existing) = entries.get_mut(workspace)
                && existing.is_current(timestamp, modified_at_ms)
            {
                existing.last_refreshed_at_ms = entry.last_refreshed_at_ms;
                return false;
            }
            entries.insert(workspace.to_path_buf(), entry);
            true
        });
        match stored {
            None => {
                debug!("Discarding superseded refresh of {}", workspace.display());
                return RefreshOutcome::Superseded;
            }
            Some(false) => return RefreshOutcome::Touched,
            Some(true) => {}
        }

        info!(
            "Loaded {} rules for {} ({:?})",
            rule_count,
            workspace.display(),
            rule_set_names
        );

        // No subscribers is fine.
        let _ = self.events.send(CacheEvent::RulesUpdated {
            workspace: workspace.to_path_buf(),
        });

        RefreshOutcome::Replaced
    }

    fn begin_refresh(&self, workspace: &Path) -> u64 {
        let ticket = self.next_ticket.fetch_add(1, Ordering::Relaxed) + 1;
        self.tickets.lock().insert(workspace.to_path_buf(), ticket);
        ticket
    }

    /// Applies `commit` to the entries unless a refresh of `workspace`
    /// started after the one holding `ticket`.
    fn commit_if_latest<R>(
        &self,
        workspace: &Path,
        ticket: u64,
        commit: impl FnOnce(&mut HashMap<PathBuf, CacheEntry>) -> R,
    ) -> Option<R> {
        let tickets = self.tickets.lock();
        if tickets.get(workspace).is_some_and(|latest| *latest != ticket) {
            return None;
        }
        let mut entries = self.entries.lock();
        Some(commit(&mut entries))
    }

    /// Parses the config, reads its mtime and asks for the remote timestamp.
    async fn observe(
        &self,
        config_path: &Path,
    ) -> Result<(WorkspaceConfig, i64, i64), CacheError> {
        let config = WorkspaceConfig::load(config_path).ok_or(CacheError::EmptyConfig)?;
        let modified_at_ms = modified_at_ms(config_path)?;

        let timestamp = self
            .source
            .last_updated(&config.rule_set_names)
            .await?
            .ok_or(CacheError::UnknownTimestamp)?;

        Ok((config, modified_at_ms, timestamp))
    }

    /// Drops entries not refreshed within [`CACHE_MAX_AGE_MS`].
    pub fn garbage_collect(&self) -> usize {
        self.garbage_collect_at(now_ms())
    }

    /// Drops entries not refreshed within [`CACHE_MAX_AGE_MS`] before `now_ms`.
    pub fn garbage_collect_at(&self, now_ms: i64) -> usize {
        let cutoff = now_ms - CACHE_MAX_AGE_MS;
        let mut entries = self.entries.lock();

        let stale: Vec<PathBuf> = entries
            .iter()
            .filter(|(_, entry)| entry.is_stale(cutoff))
            .map(|(workspace, _)| workspace.clone())
            .collect();

        for workspace in &stale {
            debug!("Evicting rules for {}", workspace.display());
            entries.remove(workspace);
        }

        stale.len()
    }

    /// Returns the cached rules that apply to `file`.
    ///
    /// Fails closed: an empty list is returned when the file does not belong
    /// to exactly one workspace or that workspace has no entry.
    pub fn applicable_rules(
        &self,
        workspaces: &[PathBuf],
        language: Language,
        file: &Path,
    ) -> Vec<Rule> {
        let Some(workspace) = filter::owning_workspace(workspaces, file) else {
            debug!("No unique workspace for {}", file.display());
            return Vec::new();
        };
        let Some(entry) = self.get(workspace) else {
            return Vec::new();
        };
        let Some(relative) = filter::relative_path(workspace, file) else {
            return Vec::new();
        };

        filter::select_rules(language, &entry.rules, &entry.config, &relative)
    }
}

fn modified_at_ms(path: &Path) -> Result<i64, CacheError> {
    let modified = fs::metadata(path)?.modified()?;
    Ok(modified
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0))
}
