use std::sync::Arc;

use futures::future::{BoxFuture, join_all};
use sitters_types::{HookError, HookStage};
use tracing::{debug, warn};

/// A user-supplied lifecycle callback: zero arguments, asynchronous,
/// fallible.
pub type Hook = Arc<dyn Fn() -> BoxFuture<'static, anyhow::Result<()>> + Send + Sync>;

/// Run every hook of one list concurrently and wait for all of them.
///
/// Dispatch happens in the calling task, which gives two guarantees at once:
/// the ambient sit context stays visible to the hooks, and once dispatch
/// begins no select point exists through which a concurrent cancellation
/// could truncate it. There is no ordering among hooks of one list.
///
/// An empty list is a no-op. Failures are collected into one grouped
/// [`HookError`]; hooks that did not fail still ran to completion.
pub async fn dispatch(stage: HookStage, hooks: &[Hook]) -> Result<(), HookError> {
    if hooks.is_empty() {
        return Ok(());
    }
    debug!(%stage, hooks = hooks.len(), "dispatching hooks");
    let results = join_all(hooks.iter().map(|hook| hook())).await;
    let failures: Vec<anyhow::Error> = results.into_iter().filter_map(Result::err).collect();
    if failures.is_empty() {
        return Ok(());
    }
    warn!(%stage, failed = failures.len(), "hook dispatch failed");
    Err(HookError { stage, failures })
}
