//! Languages understood by the analysis engine.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// A source language supported by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Python,
    JavaScript,
    TypeScript,
}

impl Language {
    /// Returns the tag used on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            Language::Python => "python",
            Language::JavaScript => "javascript",
            Language::TypeScript => "typescript",
        }
    }

    /// Parses a wire tag (case-insensitive).
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.to_ascii_lowercase().as_str() {
            "python" => Some(Language::Python),
            "javascript" => Some(Language::JavaScript),
            "typescript" => Some(Language::TypeScript),
            _ => None,
        }
    }

    /// Resolves an LSP `languageId`.
    pub fn from_language_id(language_id: &str) -> Option<Self> {
        match language_id {
            "python" => Some(Language::Python),
            "javascript" | "javascriptreact" => Some(Language::JavaScript),
            "typescript" | "typescriptreact" => Some(Language::TypeScript),
            _ => None,
        }
    }

    /// Resolves a language from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "py" | "pyi" => Some(Language::Python),
            "js" | "jsx" | "mjs" | "cjs" => Some(Language::JavaScript),
            "ts" | "tsx" | "mts" | "cts" => Some(Language::TypeScript),
            _ => None,
        }
    }

    /// Returns `true` if rules written for `rule_language` apply to files
    /// in this language.
    ///
    /// TypeScript is a superset of JavaScript and also runs JavaScript rules.
    pub fn accepts(self, rule_language: Language) -> bool {
        self == rule_language || (self == Language::TypeScript && rule_language == Language::JavaScript)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("python", Some(Language::Python))]
    #[case("javascriptreact", Some(Language::JavaScript))]
    #[case("typescriptreact", Some(Language::TypeScript))]
    #[case("rust", None)]
    fn from_language_id(#[case] id: &str, #[case] expected: Option<Language>) {
        assert_eq!(Language::from_language_id(id), expected);
    }

    #[rstest]
    #[case("app.py", Some(Language::Python))]
    #[case("src/index.mjs", Some(Language::JavaScript))]
    #[case("src/App.tsx", Some(Language::TypeScript))]
    #[case("README.md", None)]
    #[case("Makefile", None)]
    fn from_path(#[case] path: &str, #[case] expected: Option<Language>) {
        assert_eq!(Language::from_path(Path::new(path)), expected);
    }

    #[test]
    fn typescript_accepts_javascript_rules() {
        assert!(Language::TypeScript.accepts(Language::TypeScript));
        assert!(Language::TypeScript.accepts(Language::JavaScript));
        assert!(!Language::JavaScript.accepts(Language::TypeScript));
        assert!(!Language::Python.accepts(Language::JavaScript));
    }

    #[test]
    fn wire_tag_round_trip() {
        assert_eq!(Language::from_tag("PYTHON"), Some(Language::Python));
        assert_eq!(
            serde_json::to_string(&Language::TypeScript).unwrap(),
            "\"typescript\""
        );
    }
}
