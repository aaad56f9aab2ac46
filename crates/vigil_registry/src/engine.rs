//! Remote rule-execution engine.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use crate::http_client::{HttpClientBuilder, post_json};
use crate::{FetchError, Language, Rule, RuleType};

/// Executes rules against a single file.
#[async_trait]
pub trait AnalysisEngine: Send + Sync {
    /// Runs `request.rules` against `request`'s source.
    async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResponse, FetchError>;
}

/// A rule as sent to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineRule {
    pub id: String,
    pub content_base64: String,
    pub language: Language,
    #[serde(rename = "type")]
    pub rule_type: RuleType,
    pub entity_checked: Option<String>,
    pub pattern: Option<String>,
}

impl From<&Rule> for EngineRule {
    fn from(rule: &Rule) -> Self {
        Self {
            id: rule.id.clone(),
            content_base64: rule.content_base64.clone(),
            language: rule.language,
            rule_type: rule.rule_type,
            entity_checked: rule.entity_checked.clone(),
            pattern: rule.pattern.clone(),
        }
    }
}

/// Request body for one analysis call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    pub filename: String,
    pub file_encoding: String,
    pub language: Language,
    pub code_base64: String,
    pub rules: Vec<EngineRule>,
    pub log_output: bool,
}

impl AnalysisRequest {
    /// Builds a request, base64-encoding `source`.
    pub fn new(filename: impl Into<String>, language: Language, source: &str, rules: &[Rule]) -> Self {
        Self {
            filename: filename.into(),
            file_encoding: "utf-8".to_string(),
            language,
            code_base64: STANDARD.encode(source.as_bytes()),
            rules: rules.iter().map(EngineRule::from).collect(),
            log_output: false,
        }
    }
}

/// Engine response.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResponse {
    #[serde(default)]
    pub rule_responses: Vec<RuleResponse>,
}

impl AnalysisResponse {
    /// Iterates `(rule id, violation)` pairs across all rule responses.
    pub fn violations(&self) -> impl Iterator<Item = (&str, &Violation)> {
        self.rule_responses.iter().flat_map(|response| {
            response
                .violations
                .iter()
                .map(move |violation| (response.identifier.as_str(), violation))
        })
    }
}

/// Result of running a single rule.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleResponse {
    /// Identifier of the rule (`"<rule set>/<rule>"`).
    pub identifier: String,
    #[serde(default)]
    pub execution_time_ms: Option<f64>,
    #[serde(default)]
    pub errors: Vec<String>,
    #[serde(default)]
    pub violations: Vec<Violation>,
}

/// 1-based line/column position reported by the engine.
///
/// Signed because the engine may report out-of-range values, which fix
/// application has to reject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnginePosition {
    pub line: i64,
    pub col: i64,
}

impl EnginePosition {
    pub fn new(line: i64, col: i64) -> Self {
        Self { line, col }
    }

    /// Returns `true` if either coordinate is negative.
    pub fn is_negative(&self) -> bool {
        self.line < 0 || self.col < 0
    }
}

/// A single issue reported by a rule.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    pub message: String,
    pub start: EnginePosition,
    pub end: EnginePosition,
    pub severity: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub fixes: Vec<Fix>,
}

/// A named group of edits resolving a violation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fix {
    pub description: String,
    #[serde(default)]
    pub edits: Vec<Edit>,
}

/// Kind of an edit instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditType {
    /// Insert `content` at `start`.
    Add,
    /// Replace `start..end` with `content`.
    Update,
    /// Delete `start..end`.
    Remove,
    /// Anything the engine may add later; never applied.
    #[serde(other)]
    Unknown,
}

/// One edit instruction of a fix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edit {
    pub edit_type: EditType,
    pub start: EnginePosition,
    pub end: EnginePosition,
    #[serde(default)]
    pub content: Option<String>,
}

/// HTTP implementation of [`AnalysisEngine`].
#[derive(Debug, Clone)]
pub struct HttpEngine {
    client: reqwest::Client,
    url: String,
}

impl HttpEngine {
    /// Creates an engine client posting to `url`.
    pub fn new(url: impl Into<String>, builder: HttpClientBuilder) -> Result<Self, FetchError> {
        Ok(Self {
            client: builder.build()?,
            url: url.into(),
        })
    }
}

#[async_trait]
impl AnalysisEngine for HttpEngine {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResponse, FetchError> {
        post_json(&self.client, &self.url, request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn rule() -> Rule {
        Rule::new(
            "python-security",
            "no-eval",
            Language::Python,
            RuleType::Ast,
            "cnVsZQ==",
        )
        .with_entity_checked("functioncall")
    }

    #[test]
    fn request_serializes_wire_shape() {
        let request = AnalysisRequest::new("app.py", Language::Python, "eval(x)\n", &[rule()]);

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "filename": "app.py",
                "fileEncoding": "utf-8",
                "language": "python",
                "codeBase64": "ZXZhbCh4KQo=",
                "rules": [{
                    "id": "python-security/no-eval",
                    "contentBase64": "cnVsZQ==",
                    "language": "python",
                    "type": "ast",
                    "entityChecked": "functioncall",
                    "pattern": null
                }],
                "logOutput": false
            })
        );
    }

    #[test]
    fn unknown_edit_type_deserializes() {
        let edit: Edit = serde_json::from_value(serde_json::json!({
            "editType": "rename",
            "start": { "line": 1, "col": 1 },
            "end": { "line": 1, "col": 2 }
        }))
        .unwrap();

        assert_eq!(edit.edit_type, EditType::Unknown);
        assert!(edit.content.is_none());
    }

    #[test]
    fn violations_iterates_across_rules() {
        let response: AnalysisResponse = serde_json::from_value(serde_json::json!({
            "ruleResponses": [
                {
                    "identifier": "set-one/a",
                    "violations": [{
                        "message": "m1",
                        "start": { "line": 1, "col": 1 },
                        "end": { "line": 1, "col": 5 },
                        "severity": "CRITICAL"
                    }]
                },
                { "identifier": "set-one/b", "errors": ["timeout"] }
            ]
        }))
        .unwrap();

        let ids: Vec<_> = response.violations().map(|(id, v)| (id, v.message.as_str())).collect();
        assert_eq!(ids, vec![("set-one/a", "m1")]);
    }

    #[tokio::test]
    async fn http_engine_posts_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/analyze"))
            .and(body_partial_json(serde_json::json!({ "language": "python" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "ruleResponses": [{
                    "identifier": "python-security/no-eval",
                    "executionTimeMs": 12.5,
                    "violations": [{
                        "message": "Do not use eval",
                        "start": { "line": 1, "col": 1 },
                        "end": { "line": 1, "col": 8 },
                        "severity": "ERROR",
                        "category": "SECURITY",
                        "fixes": [{
                            "description": "Use ast.literal_eval",
                            "edits": [{
                                "editType": "update",
                                "start": { "line": 1, "col": 1 },
                                "end": { "line": 1, "col": 5 },
                                "content": "ast.literal_eval"
                            }]
                        }]
                    }]
                }]
            })))
            .mount(&server)
            .await;

        let engine = HttpEngine::new(format!("{}/analyze", server.uri()), HttpClientBuilder::new())
            .unwrap();
        let request = AnalysisRequest::new("app.py", Language::Python, "eval(x)\n", &[rule()]);
        let response = engine.analyze(&request).await.unwrap();

        let (id, violation) = response.violations().next().unwrap();
        assert_eq!(id, "python-security/no-eval");
        assert_eq!(violation.fixes[0].edits[0].edit_type, EditType::Update);
        assert_eq!(violation.fixes[0].edits[0].end, EnginePosition::new(1, 5));
    }

    #[tokio::test]
    async fn http_engine_reports_bad_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let engine = HttpEngine::new(server.uri(), HttpClientBuilder::new()).unwrap();
        let request = AnalysisRequest::new("app.py", Language::Python, "x\n", &[]);

        assert!(matches!(
            engine.analyze(&request).await,
            Err(FetchError::HttpError(_))
        ));
    }
}
