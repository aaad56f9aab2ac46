//! Vigil remote service clients.
//!
//! - [`RuleSource`]: the rule metadata service (rule content and
//!   last-update timestamps per rule set).
//! - [`AnalysisEngine`]: the rule-execution engine that runs rules against
//!   a single file and reports violations with optional fixes.
//!
//! Both are traits so the cache and the diagnostics pipeline can be driven
//! by in-memory implementations in tests. The HTTP implementations share one
//! [`HttpClientBuilder`].

pub mod engine;
pub mod error;
pub mod http_client;
pub mod language;
pub mod rule;
pub mod source;

pub use engine::{
    AnalysisEngine, AnalysisRequest, AnalysisResponse, Edit, EditType, EnginePosition,
    EngineRule, Fix, HttpEngine, RuleResponse, Violation,
};
pub use error::FetchError;
pub use http_client::{DEFAULT_TIMEOUT, HttpClientBuilder};
pub use language::Language;
pub use rule::{Rule, RuleType};
pub use source::{HttpRuleSource, RuleSource};
