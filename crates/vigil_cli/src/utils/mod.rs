//! CLI utility functions

use std::future::Future;

use miette::{IntoDiagnostic, Result};

/// Runs `future` to completion on a fresh multi-threaded runtime.
pub fn block_on<F: Future>(future: F) -> Result<F::Output> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .thread_name("vigil-worker")
        .enable_all()
        .build()
        .into_diagnostic()?;
    Ok(runtime.block_on(future))
}
