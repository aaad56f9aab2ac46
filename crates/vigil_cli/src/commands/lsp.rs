//! LSP command implementation

use miette::Result;
use vigil_lsp::ServerSettings;

use crate::utils::block_on;

pub fn run_lsp(settings: ServerSettings) -> Result<()> {
    block_on(vigil_lsp::run(settings))
}
