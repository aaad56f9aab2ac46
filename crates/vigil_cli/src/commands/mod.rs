//! Subcommand implementations

mod check;
mod init;
mod lsp;

pub use check::run_check;
pub use init::run_init;
pub use lsp::run_lsp;
