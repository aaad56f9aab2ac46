//! LSP Backend state management.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;
use tower_lsp::lsp_types::Url;
use vigil_registry::Language;

use crate::pipeline::DocumentSnapshot;
use crate::services::Services;
use crate::settings::ServerSettings;

/// Document content and version cache.
#[derive(Debug, Clone)]
pub(crate) struct DocumentData {
    pub text: String,
    pub version: i32,
    pub language: Option<Language>,
}

/// Shared backend state.
pub(crate) struct BackendState {
    /// Document contents cache.
    pub documents: RwLock<HashMap<Url, DocumentData>>,
    /// Workspace folder roots.
    pub workspaces: RwLock<Vec<PathBuf>>,
    /// Settings before `initializationOptions` are applied.
    pub base_settings: ServerSettings,
    /// Built once during `initialize`.
    pub services: OnceLock<Arc<Services>>,
}

impl fmt::Debug for BackendState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendState")
            .field("documents", &self.documents.read().len())
            .field("workspaces", &self.workspaces)
            .field("initialized", &self.services.get().is_some())
            .finish()
    }
}

impl BackendState {
    pub fn new(base_settings: ServerSettings) -> Self {
        Self {
            documents: RwLock::new(HashMap::new()),
            workspaces: RwLock::new(Vec::new()),
            base_settings,
            services: OnceLock::new(),
        }
    }

    pub fn services(&self) -> Option<Arc<Services>> {
        self.services.get().cloned()
    }

    pub fn workspaces(&self) -> Vec<PathBuf> {
        self.workspaces.read().clone()
    }

    /// Returns the current state of an open file document.
    pub fn snapshot(&self, uri: &Url) -> Option<DocumentSnapshot> {
        let path = uri.to_file_path().ok()?;
        let docs = self.documents.read();
        let doc = docs.get(uri)?;
        Some(DocumentSnapshot {
            uri: uri.clone(),
            path,
            text: doc.text.clone(),
            version: Some(doc.version),
            language: doc.language,
        })
    }

    pub fn text(&self, uri: &Url) -> Option<String> {
        self.documents.read().get(uri).map(|doc| doc.text.clone())
    }

    pub fn open_documents(&self) -> Vec<Url> {
        self.documents.read().keys().cloned().collect()
    }
}

/// Whether an analysis result still matches the open document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Freshness {
    Current,
    Outdated,
    Closed,
}

impl BackendState {
    /// Runs `commit` if `uri` is still open at `version`.
    ///
    /// The document table stays read-locked while `commit` runs, so no edit
    /// can be recorded in between.
    pub fn commit_if_current(
        &self,
        uri: &Url,
        version: Option<i32>,
        commit: impl FnOnce(),
    ) -> Freshness {
        let docs = self.documents.read();
        match docs.get(uri) {
            None => Freshness::Closed,
            Some(doc) if Some(doc.version) != version => Freshness::Outdated,
            Some(_) => {
                commit();
                Freshness::Current
            }
        }
    }
}

/// Type alias for shared state.
pub(crate) type SharedState = Arc<BackendState>;

#[cfg(test)]
mod tests {
    use super::*;

    fn state_with(uri: &Url, version: i32) -> BackendState {
        let state = BackendState::new(ServerSettings::default());
        state.documents.write().insert(
            uri.clone(),
            DocumentData {
                text: "import os\n".to_string(),
                version,
                language: Some(Language::Python),
            },
        );
        state
    }

    #[test]
    fn commit_runs_only_for_current_version() {
        let uri = Url::parse("file:///w/app.py").unwrap();
        let state = state_with(&uri, 3);
        let mut commits = 0;

        assert_eq!(
            state.commit_if_current(&uri, Some(2), || commits += 1),
            Freshness::Outdated
        );
        assert_eq!(
            state.commit_if_current(&uri, Some(3), || commits += 1),
            Freshness::Current
        );
        assert_eq!(commits, 1);
    }

    #[test]
    fn commit_is_skipped_for_closed_document() {
        let uri = Url::parse("file:///w/app.py").unwrap();
        let state = BackendState::new(ServerSettings::default());

        assert_eq!(
            state.commit_if_current(&uri, Some(0), || panic!("closed document committed")),
            Freshness::Closed
        );
    }
}
