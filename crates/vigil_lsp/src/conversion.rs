//! LSP type conversion utilities.

use tower_lsp::lsp_types::{Position, Range};
use vigil_registry::EnginePosition;

/// Converts a byte offset to an LSP position.
pub fn offset_to_position(offset: usize, text: &str) -> Option<Position> {
    if offset > text.len() {
        return None;
    }

    let mut line = 0u32;
    let mut col = 0u32;
    let mut current_offset = 0;

    for ch in text.chars() {
        if current_offset >= offset {
            break;
        }

        if ch == '\n' {
            line += 1;
            col = 0;
        } else {
            col += ch.len_utf16() as u32;
        }

        current_offset += ch.len_utf8();
    }

    Some(Position::new(line, col))
}

/// Converts an LSP position to a byte offset, clamping to the document.
///
/// A line past the last line resolves to the end of the document; a column
/// past the end of its line resolves to the end of that line.
pub fn position_to_offset(position: Position, text: &str) -> usize {
    let mut line_start = 0;
    for _ in 0..position.line {
        match text[line_start..].find('\n') {
            Some(idx) => line_start += idx + 1,
            None => return text.len(),
        }
    }

    let mut line_end = text[line_start..]
        .find('\n')
        .map_or(text.len(), |idx| line_start + idx);
    if text[line_start..line_end].ends_with('\r') {
        line_end -= 1;
    }

    let mut col = 0u32;
    for (idx, ch) in text[line_start..line_end].char_indices() {
        if col >= position.character {
            return line_start + idx;
        }
        col += ch.len_utf16() as u32;
    }

    line_end
}

/// Converts a 1-based engine position to a 0-based LSP position.
///
/// Coordinates below 1 are clamped to 0.
pub fn engine_to_lsp_position(position: EnginePosition) -> Position {
    Position::new(
        (position.line - 1).clamp(0, i64::from(u32::MAX)) as u32,
        (position.col - 1).clamp(0, i64::from(u32::MAX)) as u32,
    )
}

/// Converts an engine start/end pair to an LSP range.
pub fn engine_range(start: EnginePosition, end: EnginePosition) -> Range {
    Range::new(engine_to_lsp_position(start), engine_to_lsp_position(end))
}

/// Helper to compare Positions (p1 <= p2)
pub fn positions_le(p1: Position, p2: Position) -> bool {
    p1.line < p2.line || (p1.line == p2.line && p1.character <= p2.character)
}

/// Returns `true` if `outer` contains `inner`, bounds inclusive.
pub fn range_contains(outer: &Range, inner: &Range) -> bool {
    positions_le(outer.start, inner.start) && positions_le(inner.end, outer.end)
}

/// Canonical string key of a range.
pub fn range_key(range: &Range) -> String {
    format!(
        "{}:{}-{}:{}",
        range.start.line, range.start.character, range.end.line, range.end.character
    )
}
