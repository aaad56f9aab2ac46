//! Rules fetched from the metadata service.

use serde::{Deserialize, Serialize};

use crate::Language;

/// How the engine evaluates a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleType {
    /// The rule walks the syntax tree.
    Ast,
    /// The rule matches a textual pattern.
    Pattern,
}

impl RuleType {
    /// Parses a wire tag (case-insensitive).
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.to_ascii_lowercase().as_str() {
            "ast" => Some(RuleType::Ast),
            "pattern" => Some(RuleType::Pattern),
            _ => None,
        }
    }
}

/// A compiled rule, immutable once fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    /// Name of the owning rule set.
    pub rule_set_name: String,
    /// Name of the rule within its rule set.
    pub rule_name: String,
    /// `"<rule set>/<rule>"`.
    pub id: String,
    /// Language the rule is written for.
    pub language: Language,
    /// Evaluation strategy.
    pub rule_type: RuleType,
    /// AST entity the rule inspects, for AST rules.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_checked: Option<String>,
    /// Base64-encoded rule source.
    pub content_base64: String,
    /// Pattern text, for pattern rules.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

impl Rule {
    /// Creates a rule, deriving its identifier.
    pub fn new(
        rule_set_name: impl Into<String>,
        rule_name: impl Into<String>,
        language: Language,
        rule_type: RuleType,
        content_base64: impl Into<String>,
    ) -> Self {
        let rule_set_name = rule_set_name.into();
        let rule_name = rule_name.into();
        Self {
            id: Self::make_id(&rule_set_name, &rule_name),
            rule_set_name,
            rule_name,
            language,
            rule_type,
            entity_checked: None,
            content_base64: content_base64.into(),
            pattern: None,
        }
    }

    /// Sets the checked entity.
    pub fn with_entity_checked(mut self, entity: impl Into<String>) -> Self {
        self.entity_checked = Some(entity.into());
        self
    }

    /// Sets the pattern.
    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    /// Builds a rule identifier.
    pub fn make_id(rule_set_name: &str, rule_name: &str) -> String {
        format!("{rule_set_name}/{rule_name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_derives_id() {
        let rule = Rule::new("python-security", "no-eval", Language::Python, RuleType::Ast, "Zm9v");

        assert_eq!(rule.id, "python-security/no-eval");
        assert!(rule.entity_checked.is_none());
        assert!(rule.pattern.is_none());
    }

    #[test]
    fn rule_type_from_tag() {
        assert_eq!(RuleType::from_tag("AST"), Some(RuleType::Ast));
        assert_eq!(RuleType::from_tag("pattern"), Some(RuleType::Pattern));
        assert_eq!(RuleType::from_tag("regex"), None);
    }
}
