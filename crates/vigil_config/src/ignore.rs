//! Ignore entries declared under the `ignore` key.

use std::collections::HashMap;

/// Ignore entries for every rule of one rule set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSetIgnore {
    /// Name of the rule set.
    pub rule_set_name: String,
    /// Ignore entries keyed by rule name.
    pub rule_ignores: HashMap<String, RuleIgnore>,
}

impl RuleSetIgnore {
    /// Creates an empty ignore set for a rule set.
    pub fn new(rule_set_name: impl Into<String>) -> Self {
        Self {
            rule_set_name: rule_set_name.into(),
            rule_ignores: HashMap::new(),
        }
    }

    /// Adds (or merges into) the ignore entry for `rule_name`.
    ///
    /// Prefixes are appended in encounter order; duplicates are skipped. An
    /// entry without prefixes makes the rule ignored everywhere, whatever
    /// prefixes other entries for the same rule declare.
    pub fn add(&mut self, rule_name: &str, prefixes: impl IntoIterator<Item = String>) {
        let entry = self
            .rule_ignores
            .entry(rule_name.to_string())
            .or_insert_with(|| RuleIgnore {
                rule_name: rule_name.to_string(),
                prefixes: Vec::new(),
                blanket: false,
            });

        let mut any_prefix = false;
        for prefix in prefixes {
            any_prefix = true;
            if !entry.prefixes.contains(&prefix) {
                entry.prefixes.push(prefix);
            }
        }
        if !any_prefix {
            entry.blanket = true;
        }
    }

    /// Returns the ignore entry for a rule, if any.
    pub fn get(&self, rule_name: &str) -> Option<&RuleIgnore> {
        self.rule_ignores.get(rule_name)
    }
}

/// An ignore entry for a single rule.
///
/// A blanket entry ignores the rule for the whole workspace; otherwise the
/// rule is only ignored for files whose workspace-relative path starts with
/// a prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleIgnore {
    /// Name of the ignored rule.
    pub rule_name: String,
    /// Path prefixes, deduplicated, in encounter order.
    pub prefixes: Vec<String>,
    blanket: bool,
}

impl RuleIgnore {
    /// Creates an entry that ignores the rule everywhere.
    pub fn new(rule_name: impl Into<String>) -> Self {
        Self {
            rule_name: rule_name.into(),
            prefixes: Vec::new(),
            blanket: true,
        }
    }

    /// Creates an entry scoped to the given prefixes.
    ///
    /// Without prefixes this is the same as [`RuleIgnore::new`].
    pub fn with_prefixes(rule_name: impl Into<String>, prefixes: Vec<String>) -> Self {
        Self {
            rule_name: rule_name.into(),
            blanket: prefixes.is_empty(),
            prefixes,
        }
    }

    /// Returns `true` when the rule is ignored for every file.
    pub fn is_blanket(&self) -> bool {
        self.blanket
    }

    /// Returns `true` if the rule must be skipped for `relative_path`.
    ///
    /// `relative_path` is the workspace-relative path of the file; either
    /// separator kind is accepted and one leading separator is ignored.
    pub fn ignores(&self, relative_path: &str) -> bool {
        if self.is_blanket() {
            return true;
        }

        let path = normalize_path(relative_path);
        self.prefixes
            .iter()
            .filter_map(|prefix| usable_prefix(prefix))
            .any(|prefix| path.starts_with(&prefix))
    }
}

fn normalize_path(path: &str) -> String {
    let path = path.replace('\\', "/");
    match path.strip_prefix('/') {
        Some(stripped) => stripped.to_string(),
        None => path,
    }
}

/// Normalizes a configured prefix, or returns `None` if it may never match.
///
/// Prefixes containing `..` or a `.` segment are not allowed in ignore
/// configuration and have no effect.
fn usable_prefix(prefix: &str) -> Option<String> {
    let prefix = normalize_path(prefix);
    if prefix.contains("..") || prefix.split('/').any(|segment| segment == ".") {
        return None;
    }
    Some(prefix)
}
