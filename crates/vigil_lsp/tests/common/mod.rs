#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use vigil_lsp::{ServerSettings, Services};
use vigil_registry::{
    AnalysisEngine, AnalysisRequest, AnalysisResponse, Edit, EditType, EnginePosition,
    FetchError, Fix, Language, Rule, RuleResponse, RuleSource, RuleType, Violation,
};

pub const PYTHON_SOURCE: &str = "import os\nresult = eval(data)\n";

pub struct FakeSource;

#[async_trait]
impl RuleSource for FakeSource {
    async fn last_updated(&self, _: &[String]) -> Result<Option<i64>, FetchError> {
        Ok(Some(1_700_000_000_000))
    }

    async fn fetch_rules(&self, _: &[String]) -> Result<Vec<Rule>, FetchError> {
        Ok(vec![Rule::new(
            "python-security",
            "no-eval",
            Language::Python,
            RuleType::Ast,
            "cnVsZQ==",
        )])
    }
}

/// Reports one `eval` violation with a fix on every call.
///
/// With `delays`, call `n` first sleeps for `delays[n]` (no delay past the
/// end) and its fix is titled `fix-from-pass{n}`.
#[derive(Default)]
pub struct FakeEngine {
    pub calls: AtomicUsize,
    delays: Vec<Duration>,
}

impl FakeEngine {
    pub fn with_delays(delays: &[u64]) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            delays: delays.iter().copied().map(Duration::from_millis).collect(),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AnalysisEngine for FakeEngine {
    async fn analyze(&self, _: &AnalysisRequest) -> Result<AnalysisResponse, FetchError> {
        let pass = self.calls.fetch_add(1, Ordering::SeqCst);
        let description = match self.delays.get(pass) {
            Some(delay) => {
                tokio::time::sleep(*delay).await;
                format!("fix-from-pass{pass}")
            }
            None if self.delays.is_empty() => "Use ast.literal_eval".to_string(),
            None => format!("fix-from-pass{pass}"),
        };
        Ok(AnalysisResponse {
            rule_responses: vec![RuleResponse {
                identifier: "python-security/no-eval".to_string(),
                execution_time_ms: None,
                errors: Vec::new(),
                violations: vec![Violation {
                    message: "eval is dangerous".to_string(),
                    start: EnginePosition::new(2, 10),
                    end: EnginePosition::new(2, 20),
                    severity: "CRITICAL".to_string(),
                    category: None,
                    fixes: vec![Fix {
                        description,
                        edits: vec![Edit {
                            edit_type: EditType::Update,
                            start: EnginePosition::new(2, 10),
                            end: EnginePosition::new(2, 14),
                            content: Some("ast.literal_eval".to_string()),
                        }],
                    }],
                }],
            }],
        })
    }
}

pub fn services(debounce_ms: u64, engine: Arc<FakeEngine>) -> Services {
    let settings = ServerSettings {
        debounce_ms,
        ..ServerSettings::default()
    };
    Services::new(settings, Arc::new(FakeSource), engine)
}

pub fn write_config(root: &Path) {
    std::fs::write(
        root.join(vigil_config::CONFIG_FILE),
        "rulesets:\n  - python-security\n",
    )
    .unwrap();
}

pub async fn send_msg<W: AsyncWriteExt + Unpin>(writer: &mut W, msg: &str) {
    let content = format!("Content-Length: {}\r\n\r\n{}", msg.len(), msg);
    writer.write_all(content.as_bytes()).await.unwrap();
    writer.flush().await.unwrap();
}

pub async fn recv_msg<R: AsyncReadExt + Unpin>(reader: &mut R) -> Option<String> {
    let mut buffer = Vec::new();
    let mut content_length = 0;

    loop {
        let byte = reader.read_u8().await.ok()?;
        buffer.push(byte);
        if buffer.ends_with(b"\r\n\r\n") {
            let headers = String::from_utf8_lossy(&buffer);
            for line in headers.lines() {
                if let Some(value) = line.to_lowercase().strip_prefix("content-length:") {
                    content_length = value.trim().parse().unwrap_or_else(|e| {
                        panic!("Failed to parse Content-Length: {e}, header: {line}")
                    });
                }
            }
            break;
        }
    }

    if content_length == 0 {
        return None;
    }

    let mut body = vec![0u8; content_length];
    reader.read_exact(&mut body).await.ok()?;

    Some(String::from_utf8(body).unwrap())
}
