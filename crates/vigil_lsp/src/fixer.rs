//! Turning engine fixes into LSP text edits.

use tower_lsp::lsp_types::{Range, TextEdit};
use tracing::{debug, warn};
use vigil_registry::{Edit, EditType, Fix};

use crate::conversion::{engine_to_lsp_position, offset_to_position, position_to_offset};

/// Converts the edits of `fix` into text edits against `text`.
///
/// The returned edits are meant to be applied together as one change.
/// Invalid instructions are dropped individually:
/// - `add` with a negative start line or column,
/// - `update`/`remove` with any negative coordinate, or whose start resolves
///   past its end,
/// - unknown edit types.
///
/// Positions past the end of a line or of the document are clamped, so a fix
/// aimed beyond EOF degrades to an append, replace-to-end or delete-to-end.
pub fn build_edits(fix: &Fix, text: &str) -> Vec<TextEdit> {
    let edits: Vec<TextEdit> = fix
        .edits
        .iter()
        .filter_map(|edit| build_edit(edit, text))
        .collect();

    if edits.len() != fix.edits.len() {
        debug!(
            "Dropped {} of {} edits for fix '{}'",
            fix.edits.len() - edits.len(),
            fix.edits.len(),
            fix.description
        );
    }

    edits
}

fn build_edit(edit: &Edit, text: &str) -> Option<TextEdit> {
    let content = edit.content.clone().unwrap_or_default();

    match edit.edit_type {
        EditType::Add => {
            if edit.start.is_negative() {
                return None;
            }
            let offset = resolve_offset(edit.start, text);
            let position = offset_to_position(offset, text)?;
            Some(TextEdit::new(Range::new(position, position), content))
        }
        EditType::Update | EditType::Remove => {
            if edit.start.is_negative() || edit.end.is_negative() {
                return None;
            }
            let start = resolve_offset(edit.start, text);
            let end = resolve_offset(edit.end, text);
            if start > end {
                return None;
            }
            let range = Range::new(
                offset_to_position(start, text)?,
                offset_to_position(end, text)?,
            );
            let new_text = if edit.edit_type == EditType::Update {
                content
            } else {
                String::new()
            };
            Some(TextEdit::new(range, new_text))
        }
        EditType::Unknown => None,
    }
}

fn resolve_offset(position: vigil_registry::EnginePosition, text: &str) -> usize {
    position_to_offset(engine_to_lsp_position(position), text)
}

/// Applies simultaneous text edits to `text`.
///
/// Edits are applied from the end of the document backwards; an edit that
/// overlaps one already applied is skipped.
pub fn apply_edits(text: &str, edits: &[TextEdit]) -> String {
    let mut spans: Vec<(usize, usize, &str)> = edits
        .iter()
        .map(|edit| {
            (
                position_to_offset(edit.range.start, text),
                position_to_offset(edit.range.end, text),
                edit.new_text.as_str(),
            )
        })
        .collect();
    spans.sort_by(|a, b| b.0.cmp(&a.0).then(b.1.cmp(&a.1)));

    let mut result = text.to_string();
    let mut applied_start = usize::MAX;
    for (start, end, new_text) in spans {
        if start > end || end > applied_start {
            warn!("Skipping overlapping edit at [{}, {}]", start, end);
            continue;
        }
        result.replace_range(start..end, new_text);
        applied_start = start;
    }

    result
}
