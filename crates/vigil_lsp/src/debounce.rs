//! Debouncing of analysis requests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use tower_lsp::lsp_types::Url;
use tracing::debug;

/// Default debounce delay in milliseconds.
pub const DEFAULT_DEBOUNCE_MS: u64 = 400;

/// Coalesces bursts of analysis requests for the same document.
///
/// Every request takes a ticket from a generation counter and stores it
/// under the document. After the delay the request proceeds only if its
/// ticket is still the latest one, so a burst of N requests results in a
/// single analysis for the last one.
#[derive(Debug)]
pub struct AnalysisGate {
    delay: Duration,
    generation: AtomicU64,
    latest: Mutex<HashMap<Url, u64>>,
}

impl AnalysisGate {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            generation: AtomicU64::new(0),
            latest: Mutex::new(HashMap::new()),
        }
    }

    /// Waits out the debounce delay; returns `true` if no newer request for
    /// `uri` arrived in the meantime.
    pub async fn admit(&self, uri: &Url) -> bool {
        let ticket = self.generation.fetch_add(1, Ordering::Relaxed) + 1;
        self.latest.lock().insert(uri.clone(), ticket);

        tokio::time::sleep(self.delay).await;

        let is_latest = self.latest.lock().get(uri) == Some(&ticket);
        if !is_latest {
            debug!("Superseded analysis request for {}", uri);
        }
        is_latest
    }

    /// Forgets a document; pending requests for it will not be admitted.
    pub fn forget(&self, uri: &Url) {
        self.latest.lock().remove(uri);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn uri(name: &str) -> Url {
        Url::parse(&format!("file:///tmp/{name}")).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn single_request_is_admitted() {
        let gate = AnalysisGate::new(Duration::from_millis(300));
        assert!(gate.admit(&uri("a.py")).await);
    }

    #[tokio::test(start_paused = true)]
    async fn burst_admits_only_last_request() {
        let gate = Arc::new(AnalysisGate::new(Duration::from_millis(300)));
        let doc = uri("a.py");

        let mut handles = Vec::new();
        for _ in 0..5 {
            let gate = gate.clone();
            let doc = doc.clone();
            handles.push(tokio::spawn(async move { gate.admit(&doc).await }));
            tokio::time::sleep(Duration::from_millis(50)).await;
        }

        let mut results = Vec::new();
        for handle in handles {
            results.push(handle.await.unwrap());
        }
        assert_eq!(results, vec![false, false, false, false, true]);
    }

    #[tokio::test(start_paused = true)]
    async fn requests_spaced_beyond_delay_are_all_admitted() {
        let gate = AnalysisGate::new(Duration::from_millis(100));
        let doc = uri("a.py");

        assert!(gate.admit(&doc).await);
        assert!(gate.admit(&doc).await);
    }

    #[tokio::test(start_paused = true)]
    async fn documents_are_debounced_independently() {
        let gate = Arc::new(AnalysisGate::new(Duration::from_millis(300)));

        let a = tokio::spawn({
            let gate = gate.clone();
            async move { gate.admit(&uri("a.py")).await }
        });
        let b = tokio::spawn({
            let gate = gate.clone();
            async move { gate.admit(&uri("b.py")).await }
        });

        assert!(a.await.unwrap());
        assert!(b.await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn forget_cancels_pending_request() {
        let gate = Arc::new(AnalysisGate::new(Duration::from_millis(300)));
        let doc = uri("a.py");

        let pending = tokio::spawn({
            let gate = gate.clone();
            let doc = doc.clone();
            async move { gate.admit(&doc).await }
        });
        tokio::time::sleep(Duration::from_millis(10)).await;
        gate.forget(&doc);

        assert!(!pending.await.unwrap());
    }
}
