//! Code action handler for quick fixes.

use std::collections::HashMap;

use tower_lsp::lsp_types::*;
use tracing::debug;

use crate::conversion::range_contains;
use crate::fix_registry::FixRegistry;
use crate::fixer::build_edits;
use crate::state::BackendState;

/// Handles the `textDocument/codeAction` request.
///
/// Returns one quick fix per registered fix whose violation range contains
/// the requested range. Fixes whose edits are all invalid still produce an
/// action, with no edits.
pub fn handle_code_action(
    state: &BackendState,
    fixes: &FixRegistry,
    params: &CodeActionParams,
) -> Option<CodeActionResponse> {
    debug!("Code action request: {}", params.text_document.uri);

    if let Some(only) = &params.context.only
        && !only.contains(&CodeActionKind::QUICKFIX)
    {
        return Some(Vec::new());
    }

    let uri = &params.text_document.uri;
    let text = state.text(uri)?;

    let related: Vec<Diagnostic> = params
        .context
        .diagnostics
        .iter()
        .filter(|d| range_contains(&d.range, &params.range))
        .cloned()
        .collect();

    let actions = fixes
        .fixes_for_range(uri, &params.range)
        .into_iter()
        .map(|fix| {
            let edits = build_edits(&fix, &text);
            CodeActionOrCommand::CodeAction(CodeAction {
                title: fix.description,
                kind: Some(CodeActionKind::QUICKFIX),
                diagnostics: (!related.is_empty()).then(|| related.clone()),
                edit: Some(WorkspaceEdit {
                    changes: Some(HashMap::from([(uri.clone(), edits)])),
                    ..Default::default()
                }),
                ..Default::default()
            })
        })
        .collect();

    Some(actions)
}
