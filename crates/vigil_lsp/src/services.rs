//! Service objects owned by one server instance.

use std::sync::Arc;

use vigil_cache::RuleCache;
use vigil_registry::{
    AnalysisEngine, FetchError, HttpClientBuilder, HttpEngine, HttpRuleSource, RuleSource,
};

use crate::debounce::AnalysisGate;
use crate::fix_registry::FixRegistry;
use crate::pipeline::DiagnosticsPipeline;
use crate::settings::ServerSettings;

/// Everything the backend needs besides document state.
pub struct Services {
    pub settings: ServerSettings,
    pub cache: Arc<RuleCache>,
    pub fixes: Arc<FixRegistry>,
    pub gate: AnalysisGate,
    pub pipeline: DiagnosticsPipeline,
}

impl Services {
    /// Builds services talking to the remote endpoints in `settings`.
    pub fn from_settings(settings: ServerSettings) -> Result<Self, FetchError> {
        let builder = HttpClientBuilder::new()
            .timeout(settings.request_timeout())
            .api_token(settings.api_token.clone());

        let source = HttpRuleSource::new(settings.api_url.clone(), builder.clone())?;
        let engine = HttpEngine::new(settings.engine_url.clone(), builder)?;

        Ok(Self::new(settings, Arc::new(source), Arc::new(engine)))
    }

    /// Builds services over arbitrary remote collaborators.
    pub fn new(
        settings: ServerSettings,
        source: Arc<dyn RuleSource>,
        engine: Arc<dyn AnalysisEngine>,
    ) -> Self {
        let cache = Arc::new(RuleCache::new(source));
        let fixes = Arc::new(FixRegistry::new());
        let pipeline =
            DiagnosticsPipeline::new(cache.clone(), engine, settings.rule_docs_url.clone());

        Self {
            gate: AnalysisGate::new(settings.debounce()),
            settings,
            cache,
            fixes,
            pipeline,
        }
    }
}
