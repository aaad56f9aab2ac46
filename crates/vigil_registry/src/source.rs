//! Rule metadata service.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::http_client::{HttpClientBuilder, join_url, post_json};
use crate::{FetchError, Language, Rule, RuleType};

/// Source of rule content and rule set timestamps.
#[async_trait]
pub trait RuleSource: Send + Sync {
    /// Returns the latest update timestamp (ms) across the named rule sets.
    ///
    /// `Ok(None)` means the service could not resolve a timestamp, which
    /// signals that one of the rule sets is unknown or was deleted.
    async fn last_updated(&self, rule_set_names: &[String]) -> Result<Option<i64>, FetchError>;

    /// Fetches every rule of the named rule sets.
    async fn fetch_rules(&self, rule_set_names: &[String]) -> Result<Vec<Rule>, FetchError>;
}

#[derive(Debug, Serialize)]
struct NamesRequest<'a> {
    names: &'a [String],
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LastUpdatedResponse {
    #[serde(default)]
    last_updated_at_ms: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct RuleSetPayload {
    name: String,
    #[serde(default)]
    rules: Vec<RulePayload>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RulePayload {
    name: String,
    language: String,
    rule_type: String,
    #[serde(default)]
    entity_checked: Option<String>,
    content_base64: String,
    #[serde(default)]
    pattern: Option<String>,
}

impl RulePayload {
    /// Converts to a [`Rule`], dropping rules for unsupported languages or types.
    fn into_rule(self, rule_set_name: &str) -> Option<Rule> {
        let Some(language) = Language::from_tag(&self.language) else {
            debug!("Skipping rule {} with language {}", self.name, self.language);
            return None;
        };
        let Some(rule_type) = RuleType::from_tag(&self.rule_type) else {
            debug!("Skipping rule {} with type {}", self.name, self.rule_type);
            return None;
        };

        let mut rule = Rule::new(
            rule_set_name,
            self.name,
            language,
            rule_type,
            self.content_base64,
        );
        rule.entity_checked = self.entity_checked;
        rule.pattern = self.pattern;
        Some(rule)
    }
}

/// HTTP implementation of [`RuleSource`].
#[derive(Debug, Clone)]
pub struct HttpRuleSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpRuleSource {
    /// Creates a source talking to the metadata service at `base_url`.
    pub fn new(base_url: impl Into<String>, builder: HttpClientBuilder) -> Result<Self, FetchError> {
        Ok(Self {
            client: builder.build()?,
            base_url: base_url.into(),
        })
    }
}

#[async_trait]
impl RuleSource for HttpRuleSource {
    async fn last_updated(&self, rule_set_names: &[String]) -> Result<Option<i64>, FetchError> {
        let url = join_url(&self.base_url, "rulesets/last-updated");
        let response: LastUpdatedResponse =
            post_json(&self.client, &url, &NamesRequest { names: rule_set_names }).await?;
        Ok(response.last_updated_at_ms)
    }

    async fn fetch_rules(&self, rule_set_names: &[String]) -> Result<Vec<Rule>, FetchError> {
        let url = join_url(&self.base_url, "rulesets/rules");
        let rule_sets: Vec<RuleSetPayload> =
            post_json(&self.client, &url, &NamesRequest { names: rule_set_names }).await?;

        let mut rules = Vec::new();
        for rule_set in rule_sets {
            if !rule_set_names.contains(&rule_set.name) {
                warn!("Metadata service returned unrequested rule set {}", rule_set.name);
                continue;
            }
            let name = rule_set.name;
            rules.extend(
                rule_set
                    .rules
                    .into_iter()
                    .filter_map(|payload| payload.into_rule(&name)),
            );
        }

        debug!("Fetched {} rules for {:?}", rules.len(), rule_set_names);
        Ok(rules)
    }
}
