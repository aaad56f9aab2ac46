//! Periodic cache refresh and garbage collection.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;
use vigil_cache::RuleCache;
use vigil_config::WorkspaceConfig;

/// Refreshes every configured workspace, regardless of editor activity.
pub async fn prime(cache: &RuleCache, workspaces: &[PathBuf]) {
    for workspace in workspaces {
        if WorkspaceConfig::discover(workspace).is_some() {
            cache.refresh_workspace(workspace).await;
        }
    }
}

/// Runs one maintenance pass: activity-gated refresh, then garbage collection.
pub async fn tick(cache: &RuleCache, workspaces: &[PathBuf]) {
    cache.refresh_all(workspaces).await;
    let evicted = cache.garbage_collect();
    if evicted > 0 {
        debug!("Evicted {} idle workspace entries", evicted);
    }
}

/// Spawns the maintenance loop.
///
/// `workspaces` is called on every tick so folder changes are picked up.
pub fn spawn<F>(cache: Arc<RuleCache>, period: Duration, workspaces: F) -> JoinHandle<()>
where
    F: Fn() -> Vec<PathBuf> + Send + 'static,
{
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        interval.tick().await;

        loop {
            interval.tick().await;
            tick(&cache, &workspaces()).await;
        }
    })
}
