//! From a document snapshot to published diagnostics.

use std::path::PathBuf;
use std::sync::Arc;

use tower_lsp::lsp_types::{
    CodeDescription, Diagnostic, DiagnosticSeverity, NumberOrString, Range, Url,
};
use tracing::{debug, warn};
use vigil_cache::RuleCache;
use vigil_registry::{AnalysisEngine, AnalysisRequest, Fix, Language, Violation};

use crate::conversion::engine_range;

/// Documents with fewer lines are never analysed.
pub const MIN_ANALYSABLE_LINES: usize = 2;

/// Diagnostic source reported to the editor.
pub const DIAGNOSTIC_SOURCE: &str = "vigil";

/// The state of a document at the time an analysis starts.
#[derive(Debug, Clone)]
pub struct DocumentSnapshot {
    pub uri: Url,
    pub path: PathBuf,
    pub text: String,
    pub version: Option<i32>,
    pub language: Option<Language>,
}

/// Result of one analysis pass.
///
/// Nothing is stored by the pass itself: the caller decides whether the
/// result is still current before publishing the diagnostics and replacing
/// the document's fixes with `fixes`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalysisOutcome {
    pub diagnostics: Vec<Diagnostic>,
    /// Fixes keyed by the range of the violation reporting them.
    pub fixes: Vec<(Range, Fix)>,
}

/// Runs one analysis pass for a document.
pub struct DiagnosticsPipeline {
    cache: Arc<RuleCache>,
    engine: Arc<dyn AnalysisEngine>,
    rule_docs_url: String,
}

impl DiagnosticsPipeline {
    pub fn new(
        cache: Arc<RuleCache>,
        engine: Arc<dyn AnalysisEngine>,
        rule_docs_url: impl Into<String>,
    ) -> Self {
        Self {
            cache,
            engine,
            rule_docs_url: rule_docs_url.into(),
        }
    }

    /// Analyses `document`.
    ///
    /// Returns `None` when the document is not worth analysing (unsupported
    /// language, empty, or a single line); previously published diagnostics
    /// and fixes should then be left alone. When no rule applies, or the
    /// engine call fails, the outcome is empty.
    pub async fn run(
        &self,
        document: &DocumentSnapshot,
        workspaces: &[PathBuf],
    ) -> Option<AnalysisOutcome> {
        let Some(language) = document.language else {
            debug!("Unsupported language for {}", document.uri);
            return None;
        };
        if document.text.is_empty() || document.text.lines().count() < MIN_ANALYSABLE_LINES {
            debug!("Too little text to analyse {}", document.uri);
            return None;
        }

        let rules = self
            .cache
            .applicable_rules(workspaces, language, &document.path);

        if rules.is_empty() {
            debug!("No applicable rules for {}", document.uri);
            return Some(AnalysisOutcome::default());
        }

        let request = AnalysisRequest::new(
            document.path.to_string_lossy(),
            language,
            &document.text,
            &rules,
        );

        debug!("Analysing {} with {} rules", document.uri, rules.len());
        let response = match self.engine.analyze(&request).await {
            Ok(response) => response,
            Err(e) => {
                warn!("Analysis failed for {}: {}", document.uri, e);
                return Some(AnalysisOutcome::default());
            }
        };

        let mut outcome = AnalysisOutcome::default();
        for (rule_id, violation) in response.violations() {
            let diagnostic = self.to_diagnostic(rule_id, violation);
            outcome.fixes.extend(
                violation
                    .fixes
                    .iter()
                    .map(|fix| (diagnostic.range, fix.clone())),
            );
            outcome.diagnostics.push(diagnostic);
        }

        Some(outcome)
    }

    /// Builds the diagnostic of one violation.
    fn to_diagnostic(&self, rule_id: &str, violation: &Violation) -> Diagnostic {
        let range = engine_range(violation.start, violation.end);

        Diagnostic {
            range,
            severity: Some(map_severity(&violation.severity)),
            code: Some(NumberOrString::String(rule_id.to_string())),
            code_description: self.rule_link(rule_id),
            source: Some(DIAGNOSTIC_SOURCE.to_string()),
            message: violation.message.clone(),
            ..Default::default()
        }
    }

    fn rule_link(&self, rule_id: &str) -> Option<CodeDescription> {
        let link = format!("{}/{}", self.rule_docs_url.trim_end_matches('/'), rule_id);
        Url::parse(&link).ok().map(|href| CodeDescription { href })
    }
}

/// Maps an engine severity to a diagnostic severity.
///
/// `ERROR` and `WARNING` intentionally share one tier.
pub fn map_severity(severity: &str) -> DiagnosticSeverity {
    match severity.to_ascii_uppercase().as_str() {
        "CRITICAL" => DiagnosticSeverity::ERROR,
        "ERROR" | "WARNING" => DiagnosticSeverity::WARNING,
        _ => DiagnosticSeverity::INFORMATION,
    }
}
