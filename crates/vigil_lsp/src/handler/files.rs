//! Watched files handler.

use std::path::PathBuf;

use tower_lsp::lsp_types::*;
use tracing::{debug, info};

use crate::state::BackendState;

/// Handles the `workspace/didChangeWatchedFiles` notification.
///
/// Returns the workspaces whose `vigil.yml` was created, changed or deleted.
pub fn changed_config_workspaces(
    state: &BackendState,
    params: &DidChangeWatchedFilesParams,
) -> Vec<PathBuf> {
    debug!("Watched files changed: {:?}", params.changes);

    let workspaces = state.workspaces();
    let mut changed = Vec::new();

    for change in &params.changes {
        let Ok(path) = change.uri.to_file_path() else {
            continue;
        };
        if path.file_name().and_then(|n| n.to_str()) != Some(vigil_config::CONFIG_FILE) {
            continue;
        }
        let Some(root) = path.parent() else {
            continue;
        };
        if let Some(workspace) = workspaces.iter().find(|w| w.as_path() == root)
            && !changed.contains(workspace)
        {
            info!("Configuration changed in {}", workspace.display());
            changed.push(workspace.clone());
        }
    }

    changed
}
