//! Workspace configuration.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use serde_yaml::Value;
use tracing::debug;

use crate::{ConfigError, RuleIgnore, RuleSetIgnore};

/// Name of the configuration file at a workspace root.
pub const CONFIG_FILE: &str = "vigil.yml";

static RULE_SET_NAME: OnceLock<Regex> = OnceLock::new();

/// Returns `true` if `name` is an acceptable rule set name.
///
/// Rule set names are 5 to 32 characters of lowercase ASCII letters, digits
/// and hyphens, starting with a letter or digit. Besides catching typos this
/// rejects structurally valid but meaningless YAML, such as a scalar that was
/// written as a sequence of single characters.
pub fn is_valid_rule_set_name(name: &str) -> bool {
    RULE_SET_NAME
        .get_or_init(|| {
            Regex::new(r"^[a-z0-9][a-z0-9-]{4,31}$").expect("Invalid rule set name pattern")
        })
        .is_match(name)
}

/// A parsed `vigil.yml`.
///
/// A value of this type always selects at least one rule set. The absence of
/// a usable configuration (missing file, malformed file, or no valid rule
/// sets) is represented by `None` from [`WorkspaceConfig::load`], never by an
/// empty `WorkspaceConfig`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceConfig {
    /// Selected rule set names, in file order.
    pub rule_set_names: Vec<String>,
    /// Ignore entries keyed by rule set name.
    pub ignore: HashMap<String, RuleSetIgnore>,
}

impl WorkspaceConfig {
    /// Returns the configuration file path for a workspace root if it exists.
    pub fn discover(workspace_root: &Path) -> Option<PathBuf> {
        let path = workspace_root.join(CONFIG_FILE);
        path.is_file().then_some(path)
    }

    /// Loads a configuration file, returning `None` when it is not usable.
    pub fn load(path: &Path) -> Option<Self> {
        match Self::from_file(path) {
            Ok(config) => Some(config),
            Err(e) => {
                debug!("Ignoring config {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Reads and parses a configuration file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parses configuration from YAML text.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let root: Value = serde_yaml::from_str(yaml)?;
        let Value::Mapping(_) = root else {
            return Err(ConfigError::NotAMapping);
        };

        let rule_set_names = parse_rule_set_names(root.get("rulesets"));
        if rule_set_names.is_empty() {
            return Err(ConfigError::NoRuleSets);
        }

        Ok(Self {
            rule_set_names,
            ignore: parse_ignore(root.get("ignore")),
        })
    }

    /// Returns the ignore entry for a rule, if one is configured.
    pub fn rule_ignore(&self, rule_set_name: &str, rule_name: &str) -> Option<&RuleIgnore> {
        self.ignore.get(rule_set_name)?.get(rule_name)
    }
}

fn parse_rule_set_names(node: Option<&Value>) -> Vec<String> {
    let Some(Value::Sequence(items)) = node else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(Value::as_str)
        .filter(|name| is_valid_rule_set_name(name))
        .map(str::to_string)
        .collect()
}

fn parse_ignore(node: Option<&Value>) -> HashMap<String, RuleSetIgnore> {
    let mut ignore: HashMap<String, RuleSetIgnore> = HashMap::new();

    let Some(Value::Sequence(entries)) = node else {
        return ignore;
    };

    for entry in entries {
        let Value::Mapping(map) = entry else {
            continue;
        };

        for (key, value) in map {
            let Some(rule_set_name) = key.as_str() else {
                continue;
            };
            if !is_valid_rule_set_name(rule_set_name) {
                continue;
            }
            let Value::Sequence(rules) = value else {
                continue;
            };

            let rule_set = ignore
                .entry(rule_set_name.to_string())
                .or_insert_with(|| RuleSetIgnore::new(rule_set_name));

            for rule in rules {
                parse_rule_entry(rule, rule_set);
            }
        }
    }

    ignore
}

/// Parses `rule-name` or `rule-name: [ {prefix: ...}, ... ]`.
fn parse_rule_entry(node: &Value, rule_set: &mut RuleSetIgnore) {
    match node {
        Value::String(rule_name) if !rule_name.is_empty() => {
            rule_set.add(rule_name, Vec::new());
        }
        Value::Mapping(map) => {
            for (key, value) in map {
                let Some(rule_name) = key.as_str().filter(|name| !name.is_empty()) else {
                    continue;
                };
                rule_set.add(rule_name, collect_prefixes(rule_name, value));
            }
        }
        _ => {}
    }
}

/// Collects the prefixes of one rule's ignore entry.
///
/// Malformed entries contribute no prefix, so a rule whose entries are all
/// malformed ends up ignored everywhere.
fn collect_prefixes(rule_name: &str, node: &Value) -> Vec<String> {
    match node {
        Value::Sequence(entries) => entries
            .iter()
            .flat_map(|entry| prefixes_of_entry(rule_name, entry))
            .collect(),
        Value::Mapping(_) => prefixes_of_entry(rule_name, node),
        Value::Null => Vec::new(),
        _ => {
            debug!("Malformed ignore entry for rule {}: {:?}", rule_name, node);
            Vec::new()
        }
    }
}

/// Reads `prefix: value` where value is a string or a list of strings.
fn prefixes_of_entry(rule_name: &str, node: &Value) -> Vec<String> {
    match node.get("prefix") {
        Some(Value::String(prefix)) => vec![prefix.clone()],
        Some(Value::Sequence(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        _ => {
            debug!(
                "Expected `prefix: ...` in ignore entry for rule {}, got {:?}",
                rule_name, node
            );
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use tempfile::tempdir;

    #[rstest]
    #[case::typical("python-security", true)]
    #[case::digits_first("1abcd", true)]
    #[case::minimum_length("abcde", true)]
    #[case::maximum_length("a234567890123456789012345678901b", true)]
    #[case::too_short("abcd", false)]
    #[case::too_long("a2345678901234567890123456789012b", false)]
    #[case::uppercase("Python-Security", false)]
    #[case::leading_hyphen("-python", false)]
    #[case::underscore("python_security", false)]
    #[case::single_char("p", false)]
    fn rule_set_name_validation(#[case] name: &str, #[case] valid: bool) {
        assert_eq!(is_valid_rule_set_name(name), valid);
    }

    #[test]
    fn parses_rule_sets_in_order_keeping_duplicates() {
        let config = WorkspaceConfig::from_yaml(
            r#"
rulesets:
  - python-security
  - BAD
  - python-best-practices
  - python-security
  - 42
"#,
        )
        .unwrap();

        assert_eq!(
            config.rule_set_names,
            vec![
                "python-security",
                "python-best-practices",
                "python-security"
            ]
        );
        assert!(config.ignore.is_empty());
    }

    #[test]
    fn exploded_scalar_is_rejected() {
        let err = WorkspaceConfig::from_yaml(
            r#"
rulesets:
  - p
  - y
  - t
"#,
        )
        .unwrap_err();

        assert!(matches!(err, ConfigError::NoRuleSets));
    }

    #[rstest]
    #[case::no_rulesets_key("ignore: []\n")]
    #[case::rulesets_scalar("rulesets: python-security\n")]
    #[case::rulesets_null("rulesets:\n")]
    #[case::empty_list("rulesets: []\n")]
    fn missing_rule_sets_yield_error(#[case] yaml: &str) {
        assert!(matches!(
            WorkspaceConfig::from_yaml(yaml),
            Err(ConfigError::NoRuleSets)
        ));
    }

    #[test]
    fn non_mapping_root_is_rejected() {
        assert!(matches!(
            WorkspaceConfig::from_yaml("- python-security\n"),
            Err(ConfigError::NotAMapping)
        ));
    }

    #[test]
    fn malformed_yaml_is_rejected() {
        assert!(matches!(
            WorkspaceConfig::from_yaml("rulesets: [python-security"),
            Err(ConfigError::Yaml(_))
        ));
    }

    #[test]
    fn parses_ignore_entries() {
        let config = WorkspaceConfig::from_yaml(
            r#"
rulesets:
  - python-security
ignore:
  - python-security:
      - no-eval
      - hardcoded-secret:
          - prefix: tests/
          - prefix:
              - fixtures/
              - tests/
      - no-assert:
          - prefix: /src
"#,
        )
        .unwrap();

        let no_eval = config.rule_ignore("python-security", "no-eval").unwrap();
        assert!(no_eval.is_blanket());

        let secret = config
            .rule_ignore("python-security", "hardcoded-secret")
            .unwrap();
        assert_eq!(secret.prefixes, vec!["tests/", "fixtures/"]);

        let no_assert = config.rule_ignore("python-security", "no-assert").unwrap();
        assert_eq!(no_assert.prefixes, vec!["/src"]);

        assert!(config.rule_ignore("python-security", "other").is_none());
        assert!(config.rule_ignore("other-ruleset", "no-eval").is_none());
    }

    #[test]
    fn ignore_entries_for_same_rule_are_merged() {
        let config = WorkspaceConfig::from_yaml(
            r#"
rulesets:
  - python-security
ignore:
  - python-security:
      - no-eval:
          - prefix: a/
  - python-security:
      - no-eval:
          - prefix: [a/, b/]
"#,
        )
        .unwrap();

        let entry = config.rule_ignore("python-security", "no-eval").unwrap();
        assert_eq!(entry.prefixes, vec!["a/", "b/"]);
    }

    #[rstest]
    #[case::blanket_first("      - no-eval\n      - no-eval:\n          - prefix: tests/\n")]
    #[case::prefixed_first("      - no-eval:\n          - prefix: tests/\n      - no-eval\n")]
    fn blanket_and_prefixed_entries_stay_blanket(#[case] entries: &str) {
        let yaml =
            format!("rulesets:\n  - python-security\nignore:\n  - python-security:\n{entries}");
        let config = WorkspaceConfig::from_yaml(&yaml).unwrap();

        let entry = config.rule_ignore("python-security", "no-eval").unwrap();
        assert!(entry.is_blanket());
        assert!(entry.ignores("src/app.py"));
    }

    #[test]
    fn prefix_entries_without_prefix_key_contribute_nothing() {
        let config = WorkspaceConfig::from_yaml(
            r#"
rulesets:
  - python-security
ignore:
  - python-security:
      - no-eval:
          - tests/
      - no-assert:
          - tests/
          - prefix: fixtures/
"#,
        )
        .unwrap();

        let no_eval = config.rule_ignore("python-security", "no-eval").unwrap();
        assert!(no_eval.prefixes.is_empty());
        assert!(no_eval.is_blanket());

        let no_assert = config.rule_ignore("python-security", "no-assert").unwrap();
        assert_eq!(no_assert.prefixes, vec!["fixtures/"]);
        assert!(!no_assert.is_blanket());
    }

    #[test]
    fn malformed_ignore_nodes_are_skipped() {
        let config = WorkspaceConfig::from_yaml(
            r#"
rulesets:
  - python-security
ignore:
  - null
  - just-a-string
  - p:
      - no-eval
  - python-security:
  - python-best-practices:
      - null
      - 12
      - no-print:
"#,
        )
        .unwrap();

        assert!(!config.ignore.contains_key("p"));
        assert!(!config.ignore.contains_key("python-security"));

        let entry = config
            .rule_ignore("python-best-practices", "no-print")
            .unwrap();
        assert!(entry.is_blanket());
        assert_eq!(config.ignore["python-best-practices"].rule_ignores.len(), 1);
    }

    #[test]
    fn ignore_that_is_not_a_sequence_is_ignored() {
        let config = WorkspaceConfig::from_yaml(
            r#"
rulesets:
  - python-security
ignore:
  python-security:
    - no-eval
"#,
        )
        .unwrap();

        assert!(config.ignore.is_empty());
    }

    #[test]
    fn load_returns_none_for_missing_file() {
        let dir = tempdir().unwrap();
        assert!(WorkspaceConfig::load(&dir.path().join(CONFIG_FILE)).is_none());
    }

    #[test]
    fn load_returns_none_for_broken_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "rulesets: [\n").unwrap();

        assert!(WorkspaceConfig::load(&path).is_none());
    }

    #[test]
    fn discover_and_load_existing_file() {
        let dir = tempdir().unwrap();
        assert!(WorkspaceConfig::discover(dir.path()).is_none());

        fs::write(dir.path().join(CONFIG_FILE), "rulesets:\n  - python-security\n").unwrap();

        let path = WorkspaceConfig::discover(dir.path()).unwrap();
        let config = WorkspaceConfig::load(&path).unwrap();
        assert_eq!(config.rule_set_names, vec!["python-security"]);
    }
}
