//! Command implementations.

pub mod remote;
pub mod serve;

use crate::ui;
use std::future::Future;

/// Run `fut` to completion on a fresh multi-threaded runtime.
pub(crate) fn block_on<F: Future>(fut: F) -> F::Output {
    let rt = tokio::runtime::Runtime::new()
        .unwrap_or_else(|e| ui::fail(&format!("Failed to start async runtime: {e}")));
    rt.block_on(fut)
}
