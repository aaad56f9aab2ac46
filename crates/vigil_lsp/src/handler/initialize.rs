//! Initialize and shutdown handlers.

use std::sync::Arc;

use tower_lsp::jsonrpc::{Error, Result};
use tower_lsp::lsp_types::*;
use tracing::{error, info};

use crate::handler::initial_workspaces;
use crate::services::Services;
use crate::state::BackendState;

/// Handles the `initialize` LSP request.
///
/// Records the workspace folders and, unless services were injected up
/// front, builds them from the base settings merged with the client's
/// `initializationOptions`.
pub async fn handle_initialize(
    state: &BackendState,
    params: InitializeParams,
) -> Result<InitializeResult> {
    info!("Vigil LSP server initializing...");

    let workspaces = initial_workspaces(&params);
    info!("Workspace folders: {:?}", workspaces);
    *state.workspaces.write() = workspaces;

    if state.services.get().is_none() {
        let mut settings = state.base_settings.clone();
        if let Some(options) = &params.initialization_options {
            settings.merge_json(options);
        }

        let services = Services::from_settings(settings).map_err(|e| {
            error!("Failed to create remote clients: {}", e);
            Error::internal_error()
        })?;
        // A concurrent initialize losing the race keeps the first services.
        let _ = state.services.set(Arc::new(services));
    }

    Ok(InitializeResult {
        capabilities: ServerCapabilities {
            text_document_sync: Some(TextDocumentSyncCapability::Options(
                TextDocumentSyncOptions {
                    open_close: Some(true),
                    change: Some(TextDocumentSyncKind::FULL),
                    ..Default::default()
                },
            )),
            code_action_provider: Some(CodeActionProviderCapability::Options(CodeActionOptions {
                code_action_kinds: Some(vec![CodeActionKind::QUICKFIX]),
                resolve_provider: Some(false),
                work_done_progress_options: Default::default(),
            })),
            workspace: Some(WorkspaceServerCapabilities {
                workspace_folders: Some(WorkspaceFoldersServerCapabilities {
                    supported: Some(true),
                    change_notifications: Some(OneOf::Left(true)),
                }),
                file_operations: None,
            }),
            ..Default::default()
        },
        server_info: Some(ServerInfo {
            name: "vigil-lsp".to_string(),
            version: Some(env!("CARGO_PKG_VERSION").to_string()),
        }),
    })
}

/// Dynamic registration for `vigil.yml` change notifications.
pub fn watched_files_registration() -> Registration {
    let options = DidChangeWatchedFilesRegistrationOptions {
        watchers: vec![FileSystemWatcher {
            glob_pattern: GlobPattern::String(format!("**/{}", vigil_config::CONFIG_FILE)),
            kind: None,
        }],
    };

    Registration {
        id: "vigil-config-watcher".to_string(),
        method: "workspace/didChangeWatchedFiles".to_string(),
        register_options: serde_json::to_value(options).ok(),
    }
}

/// Handles the `shutdown` LSP request.
pub async fn handle_shutdown() -> Result<()> {
    info!("Vigil LSP server shutting down...");
    Ok(())
}
