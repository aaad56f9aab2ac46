//! Narrowing cached rules to the ones that apply to a file.

use std::path::{Path, PathBuf};

use vigil_config::WorkspaceConfig;
use vigil_registry::{Language, Rule};

/// Returns the single workspace root containing `file`.
///
/// Returns `None` when no root or more than one root (nested workspaces)
/// contains the file.
pub fn owning_workspace<'a>(workspaces: &'a [PathBuf], file: &Path) -> Option<&'a PathBuf> {
    let mut owners = workspaces.iter().filter(|root| file.starts_with(root));
    let owner = owners.next()?;
    if owners.next().is_some() {
        return None;
    }
    Some(owner)
}

/// Returns `file` relative to `root`, using `/` separators.
pub fn relative_path(root: &Path, file: &Path) -> Option<String> {
    let relative = file.strip_prefix(root).ok()?;
    let parts: Vec<_> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect();
    Some(parts.join("/"))
}

/// Selects the rules applicable to a file.
///
/// A rule applies when its language is accepted by `language` and it is not
/// ignored for `relative_path` by the workspace configuration.
pub fn select_rules(
    language: Language,
    rules: &[Rule],
    config: &WorkspaceConfig,
    relative_path: &str,
) -> Vec<Rule> {
    rules
        .iter()
        .filter(|rule| language.accepts(rule.language))
        .filter(|rule| {
            config
                .rule_ignore(&rule.rule_set_name, &rule.rule_name)
                .is_none_or(|ignore| !ignore.ignores(relative_path))
        })
        .cloned()
        .collect()
}
