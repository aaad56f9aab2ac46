//! LSP request/notification handlers.

mod code_action;
mod documents;
mod files;
mod initialize;
mod workspace;

pub use code_action::handle_code_action;
pub use documents::{handle_did_change, handle_did_close, handle_did_open};
pub use files::changed_config_workspaces;
pub use initialize::{handle_initialize, handle_shutdown, watched_files_registration};
pub use workspace::{handle_did_change_workspace_folders, initial_workspaces};
