//! Document lifecycle handlers (open, change, close).

use tower_lsp::lsp_types::*;
use tracing::debug;
use vigil_registry::Language;

use crate::state::{BackendState, DocumentData};

fn resolve_language(language_id: &str, uri: &Url) -> Option<Language> {
    Language::from_language_id(language_id).or_else(|| {
        uri.to_file_path()
            .ok()
            .and_then(|path| Language::from_path(&path))
    })
}

/// Handles the `textDocument/didOpen` notification.
pub fn handle_did_open(state: &BackendState, params: DidOpenTextDocumentParams) -> Url {
    let doc = params.text_document;
    debug!("Document opened: {} ({})", doc.uri, doc.language_id);

    let language = resolve_language(&doc.language_id, &doc.uri);
    state.documents.write().insert(
        doc.uri.clone(),
        DocumentData {
            text: doc.text,
            version: doc.version,
            language,
        },
    );

    doc.uri
}

/// Handles the `textDocument/didChange` notification.
///
/// Returns the URI to re-analyse, or `None` if the change carried no text
/// or the document is unknown.
pub fn handle_did_change(state: &BackendState, params: DidChangeTextDocumentParams) -> Option<Url> {
    debug!("Document changed: {}", params.text_document.uri);

    // FULL sync: the last change holds the whole text.
    let change = params.content_changes.into_iter().last()?;
    let uri = params.text_document.uri;

    let mut docs = state.documents.write();
    let doc = docs.get_mut(&uri)?;
    doc.text = change.text;
    doc.version = params.text_document.version;

    Some(uri)
}

/// Handles the `textDocument/didClose` notification.
pub fn handle_did_close(state: &BackendState, params: DidCloseTextDocumentParams) -> Url {
    debug!("Document closed: {}", params.text_document.uri);

    state.documents.write().remove(&params.text_document.uri);
    params.text_document.uri
}
