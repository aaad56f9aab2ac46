//! Server settings.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Settings of the server itself, as opposed to a workspace's `vigil.yml`.
///
/// Built from CLI flags and then overridden field by field from the LSP
/// `initializationOptions`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerSettings {
    /// Analysis engine endpoint.
    pub engine_url: String,
    /// Metadata service base URL.
    pub api_url: String,
    /// Token sent to both services.
    pub api_token: Option<String>,
    /// Base of rule documentation links.
    pub rule_docs_url: String,
    /// Debounce delay before analysing a changed document.
    pub debounce_ms: u64,
    /// Interval of the cache refresh and garbage collection task.
    pub refresh_interval_secs: u64,
    /// Timeout of remote calls.
    pub request_timeout_secs: u64,
}

pub const DEFAULT_ENGINE_URL: &str = "https://analysis.vigil.dev/analyze";
pub const DEFAULT_API_URL: &str = "https://api.vigil.dev";
pub const DEFAULT_RULE_DOCS_URL: &str = "https://hub.vigil.dev/rulesets";

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            engine_url: DEFAULT_ENGINE_URL.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            api_token: None,
            rule_docs_url: DEFAULT_RULE_DOCS_URL.to_string(),
            debounce_ms: crate::debounce::DEFAULT_DEBOUNCE_MS,
            refresh_interval_secs: 30,
            request_timeout_secs: 10,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsOverride {
    engine_url: Option<String>,
    api_url: Option<String>,
    api_token: Option<String>,
    rule_docs_url: Option<String>,
    debounce_ms: Option<u64>,
    refresh_interval_secs: Option<u64>,
    request_timeout_secs: Option<u64>,
}

impl ServerSettings {
    /// Applies the fields present in `options` on top of these settings.
    ///
    /// Options that do not deserialize are logged and ignored as a whole.
    pub fn merge_json(&mut self, options: &serde_json::Value) {
        let overrides = match SettingsOverride::deserialize(options) {
            Ok(o) => o,
            Err(e) => {
                warn!("Ignoring invalid initialization options: {}", e);
                return;
            }
        };

        if let Some(v) = overrides.engine_url {
            self.engine_url = v;
        }
        if let Some(v) = overrides.api_url {
            self.api_url = v;
        }
        if let Some(v) = overrides.api_token {
            self.api_token = Some(v);
        }
        if let Some(v) = overrides.rule_docs_url {
            self.rule_docs_url = v;
        }
        if let Some(v) = overrides.debounce_ms {
            self.debounce_ms = v;
        }
        if let Some(v) = overrides.refresh_interval_secs {
            self.refresh_interval_secs = v.max(1);
        }
        if let Some(v) = overrides.request_timeout_secs {
            self.request_timeout_secs = v.max(1);
        }
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs.max(1))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}
