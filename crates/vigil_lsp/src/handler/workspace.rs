//! Workspace folder tracking.

use std::path::PathBuf;

use tower_lsp::lsp_types::*;
use tracing::debug;

use crate::state::BackendState;

/// Workspace roots announced by the client at initialization.
///
/// Prefers `workspaceFolders`; falls back to the deprecated `rootUri`.
#[allow(deprecated)]
pub fn initial_workspaces(params: &InitializeParams) -> Vec<PathBuf> {
    if let Some(folders) = &params.workspace_folders
        && !folders.is_empty()
    {
        return folders
            .iter()
            .filter_map(|folder| folder.uri.to_file_path().ok())
            .collect();
    }

    params
        .root_uri
        .as_ref()
        .and_then(|uri| uri.to_file_path().ok())
        .into_iter()
        .collect()
}

/// Handles the `workspace/didChangeWorkspaceFolders` notification.
///
/// Returns the roots that were added.
pub fn handle_did_change_workspace_folders(
    state: &BackendState,
    params: DidChangeWorkspaceFoldersParams,
) -> Vec<PathBuf> {
    debug!("Workspace folders changed: {:?}", params.event);

    let removed: Vec<PathBuf> = params
        .event
        .removed
        .iter()
        .filter_map(|folder| folder.uri.to_file_path().ok())
        .collect();
    let added: Vec<PathBuf> = params
        .event
        .added
        .iter()
        .filter_map(|folder| folder.uri.to_file_path().ok())
        .collect();

    let mut workspaces = state.workspaces.write();
    workspaces.retain(|root| !removed.contains(root));
    for root in &added {
        if !workspaces.contains(root) {
            workspaces.push(root.clone());
        }
    }

    added
}
