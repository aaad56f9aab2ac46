//! # vigil_config
//!
//! Parsing of the per-workspace `vigil.yml` file.
//!
//! The file selects remote rule sets and optionally lists rules to ignore,
//! either everywhere or below a set of path prefixes:
//!
//! ```yaml
//! rulesets:
//!   - python-security
//!   - python-best-practices
//! ignore:
//!   - python-security:
//!       - no-eval
//!       - hardcoded-secret:
//!           - prefix: tests/
//! ```
//!
//! Parsing never fails from the caller's point of view: [`WorkspaceConfig::load`]
//! returns `None` (the empty configuration) for a missing, unreadable or
//! malformed file.

mod config;
mod error;
mod ignore;

pub use config::{CONFIG_FILE, WorkspaceConfig, is_valid_rule_set_name};
pub use error::ConfigError;
pub use ignore::{RuleIgnore, RuleSetIgnore};
