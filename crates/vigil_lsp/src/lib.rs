//! Vigil LSP Server
//!
//! Language Server Protocol front end of Vigil. Documents opened in the
//! editor are analysed by the remote engine with the rules selected by the
//! `vigil.yml` of their workspace; the results are published as diagnostics
//! and their fixes offered as quick fixes.

pub mod conversion;
pub mod debounce;
pub mod fix_registry;
pub mod fixer;
mod handler;
pub mod maintenance;
pub mod pipeline;
pub mod services;
pub mod settings;
mod state;

use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;
use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer, LspService, Server};
use tracing::{debug, info, warn};
use vigil_cache::CacheEvent;

pub use debounce::{AnalysisGate, DEFAULT_DEBOUNCE_MS};
pub use fix_registry::FixRegistry;
pub use pipeline::{AnalysisOutcome, DiagnosticsPipeline, DocumentSnapshot};
pub use services::Services;
pub use settings::ServerSettings;

use crate::state::{BackendState, Freshness, SharedState};

/// The LSP backend for Vigil.
#[derive(Clone)]
pub struct Backend {
    /// LSP client for sending notifications.
    client: Client,
    /// Shared state
    state: SharedState,
}

impl Backend {
    /// Creates a backend whose services are built during `initialize`.
    pub fn new(client: Client, settings: ServerSettings) -> Self {
        Self {
            client,
            state: Arc::new(BackendState::new(settings)),
        }
    }

    /// Creates a backend over pre-built services.
    ///
    /// `initializationOptions` are ignored in that case.
    pub fn with_services(client: Client, services: Services) -> Self {
        let state = BackendState::new(services.settings.clone());
        let _ = state.services.set(Arc::new(services));
        Self {
            client,
            state: Arc::new(state),
        }
    }

    /// Schedules a gated analysis of `uri` in the background.
    fn schedule_analysis(&self, uri: Url) {
        let backend = self.clone();
        tokio::spawn(async move { backend.analyze_when_settled(uri).await });
    }

    /// Waits out the debounce delay, then analyses and publishes.
    async fn analyze_when_settled(&self, uri: Url) {
        let Some(services) = self.state.services() else {
            return;
        };
        if !services.gate.admit(&uri).await {
            return;
        }

        let Some(snapshot) = self.state.snapshot(&uri) else {
            debug!("Skipping analysis of closed or non-file document {}", uri);
            return;
        };
        debug!("Validating document: {}", uri);

        let workspaces = self.state.workspaces();
        let Some(outcome) = services.pipeline.run(&snapshot, &workspaces).await else {
            return;
        };

        // The document may have changed or closed while the engine was busy.
        let AnalysisOutcome { diagnostics, fixes } = outcome;
        let freshness = self
            .state
            .commit_if_current(&uri, snapshot.version, || services.fixes.replace(&uri, fixes));
        match freshness {
            Freshness::Current => {}
            Freshness::Outdated => {
                debug!("Discarding analysis of outdated {}", uri);
                return;
            }
            Freshness::Closed => {
                services.fixes.clear(&uri);
                return;
            }
        }

        self.client
            .publish_diagnostics(uri, diagnostics, snapshot.version)
            .await;
    }

    /// Re-analyses every open document once rules change.
    fn spawn_event_listener(&self) {
        let Some(services) = self.state.services() else {
            return;
        };
        let mut events = services.cache.subscribe();
        let backend = self.clone();

        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(CacheEvent::RulesUpdated { workspace }) => {
                        info!("Rules updated for {}", workspace.display());
                        backend.reanalyze_open_documents();
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        debug!("Missed {} cache events", skipped);
                        backend.reanalyze_open_documents();
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        });
    }

    fn reanalyze_open_documents(&self) {
        for uri in self.state.open_documents() {
            self.schedule_analysis(uri);
        }
    }

    async fn register_config_watcher(&self) {
        let registration = handler::watched_files_registration();
        if let Err(e) = self.client.register_capability(vec![registration]).await {
            debug!("Client did not accept the config watcher: {}", e);
        }
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for Backend {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        handler::handle_initialize(&self.state, params).await
    }

    async fn initialized(&self, _: InitializedParams) {
        self.client
            .log_message(MessageType::INFO, "Vigil LSP server initialized!")
            .await;

        let Some(services) = self.state.services() else {
            warn!("Initialized without services, analysis disabled");
            return;
        };

        self.spawn_event_listener();

        let watcher = self.clone();
        tokio::spawn(async move { watcher.register_config_watcher().await });

        let state = self.state.clone();
        maintenance::spawn(
            services.cache.clone(),
            services.settings.refresh_interval(),
            move || state.workspaces(),
        );

        let cache = services.cache.clone();
        let workspaces = self.state.workspaces();
        tokio::spawn(async move { maintenance::prime(&cache, &workspaces).await });
    }

    async fn shutdown(&self) -> Result<()> {
        handler::handle_shutdown().await
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let uri = handler::handle_did_open(&self.state, params);
        if let Some(services) = self.state.services() {
            services.cache.activity().record();
        }
        self.schedule_analysis(uri);
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let Some(uri) = handler::handle_did_change(&self.state, params) else {
            return;
        };
        if let Some(services) = self.state.services() {
            services.cache.activity().record();
        }
        self.schedule_analysis(uri);
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let uri = handler::handle_did_close(&self.state, params);
        if let Some(services) = self.state.services() {
            services.gate.forget(&uri);
            services.fixes.clear(&uri);
        }

        self.client.publish_diagnostics(uri, vec![], None).await;
    }

    async fn did_change_watched_files(&self, params: DidChangeWatchedFilesParams) {
        let Some(services) = self.state.services() else {
            return;
        };
        for workspace in handler::changed_config_workspaces(&self.state, &params) {
            let outcome = services.cache.refresh_workspace(&workspace).await;
            debug!("Refresh of {}: {:?}", workspace.display(), outcome);
        }
    }

    async fn did_change_workspace_folders(&self, params: DidChangeWorkspaceFoldersParams) {
        let added = handler::handle_did_change_workspace_folders(&self.state, params);
        if let Some(services) = self.state.services()
            && !added.is_empty()
        {
            maintenance::prime(&services.cache, &added).await;
        }
    }

    async fn code_action(&self, params: CodeActionParams) -> Result<Option<CodeActionResponse>> {
        let Some(services) = self.state.services() else {
            return Ok(None);
        };
        Ok(handler::handle_code_action(
            &self.state,
            &services.fixes,
            &params,
        ))
    }
}

/// Starts the LSP server on stdio.
///
/// This function does not return unless an error occurs or the server shuts down.
pub async fn run(settings: ServerSettings) {
    info!("Vigil LSP server starting...");

    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let (service, socket) = LspService::new(move |client| Backend::new(client, settings));
    Server::new(stdin, stdout, socket).serve(service).await;
}
