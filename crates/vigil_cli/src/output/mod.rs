//! Output formatters

mod text;

use std::path::PathBuf;

use tower_lsp::lsp_types::Diagnostic;

pub use text::output_text;

/// Diagnostics found in one file.
pub struct FileReport {
    pub path: PathBuf,
    pub diagnostics: Vec<Diagnostic>,
}
