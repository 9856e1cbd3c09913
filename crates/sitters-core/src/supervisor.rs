use std::pin::pin;
use std::sync::Arc;

use sitters_types::{CacheKey, CallArgs, Command, HookStage, SitError};
use tokio::select;
use tokio::sync::mpsc;
use tokio::time::{Instant, sleep_until};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::cache::SitCache;
use crate::context::{SitContext, SitterRef, with_context};
use crate::hooks::dispatch;
use crate::signal::demultiplex;
use crate::sitter::Sitter;

/// Drives a single invocation from admission to termination.
///
/// The supervisor owns the invocation's context and cancellation scopes,
/// races the signal demultiplexer against the call driver, and collapses
/// everything when the driver delivers a terminal outcome.
pub struct Supervisor<R> {
    sitter: Arc<Sitter<R>>,
    args: CallArgs,
}

/// How one pass through the user function ended.
enum Iteration<R> {
    Completed(R),
    Failed(anyhow::Error),
    TimedOut,
    Cancelled,
    Restarted,
}

impl<R> Supervisor<R>
where
    R: Clone + Send + Sync + 'static,
{
    pub fn new(sitter: Arc<Sitter<R>>, args: CallArgs) -> Self {
        Self { sitter, args }
    }

    /// Run the invocation to completion.
    ///
    /// `Ok(Some(value))` on success, including success served from the
    /// cache; `Ok(None)` when the invocation timed out or was cancelled;
    /// `Err` when the user computation or a hook failed.
    pub async fn start(self) -> Result<Option<R>, SitError> {
        let sitter: Arc<dyn SitterRef> = self.sitter.clone();
        let ctx = Arc::new(SitContext::for_sitter(sitter));
        let run = self.supervise(ctx.clone());
        with_context(ctx, run).await
    }

    async fn supervise(self, ctx: Arc<SitContext>) -> Result<Option<R>, SitError> {
        let cache_entry = self
            .sitter
            .cache
            .as_ref()
            .map(|cache| (cache.clone(), CacheKey::for_call(&self.sitter.name, &self.args)));

        // A cache hit bypasses the call driver entirely: no hooks fire, the
        // context stays Pending, and no timeout applies.
        if let Some((cache, key)) = &cache_entry
            && let Some(value) = cache.get(key)
        {
            debug!(sit = %ctx.name(), id = %ctx.id(), "cache hit");
            return Ok(Some(value));
        }

        let (commands, command_rx) = mpsc::unbounded_channel();
        let signals = pin!(demultiplex((self.sitter.signals)(), commands));
        let driver = pin!(self.drive(&ctx, command_rx, cache_entry));

        // The structured group for this invocation: the demultiplexer never
        // resolves on its own, so the driver's outcome is the result-ready
        // event, and returning from the select drops the demultiplexer.
        select! {
            outcome = driver => outcome,
            _ = signals => unreachable!("signal demultiplexer never resolves"),
        }
    }

    /// The restart loop. Iterative on purpose: every iteration re-creates
    /// its scopes and re-arms the timeout, and the caller's stack must not
    /// grow per restart.
    async fn drive(
        &self,
        ctx: &SitContext,
        mut commands: mpsc::UnboundedReceiver<Command>,
        cache_entry: Option<(Arc<dyn SitCache<R>>, CacheKey)>,
    ) -> Result<Option<R>, SitError> {
        let outer = CancellationToken::new();
        let mut commands_open = true;
        loop {
            let restart_scope = CancellationToken::new();
            let timeout_scope = CancellationToken::new();
            let deadline = self.sitter.timeout.map(|t| Instant::now() + t);

            ctx.set_starting().await;
            dispatch(HookStage::Startup, &self.sitter.hooks.startup).await?;

            let mut call = (self.sitter.bind(&self.args))();

            let outcome = loop {
                select! {
                    biased;
                    _ = outer.cancelled() => break Iteration::Cancelled,
                    _ = restart_scope.cancelled() => break Iteration::Restarted,
                    _ = timeout_scope.cancelled() => break Iteration::TimedOut,
                    _ = deadline_elapsed(deadline) => timeout_scope.cancel(),
                    command = commands.recv(), if commands_open => match command {
                        Some(Command::Cancel) => outer.cancel(),
                        Some(Command::Restart) => restart_scope.cancel(),
                        None => commands_open = false,
                    },
                    result = &mut call => break match result {
                        Ok(value) => Iteration::Completed(value),
                        Err(error) => Iteration::Failed(error),
                    },
                }
            };

            // Everything below runs outside the select: once a hook list
            // starts, later commands queue on the channel and cannot
            // truncate it. The state transition runs before its hook list
            // so no user hook observes the prior state.
            match outcome {
                Iteration::Completed(value) => {
                    ctx.set_completed().await;
                    dispatch(HookStage::Completion, &self.sitter.hooks.completion).await?;
                    if let Some((cache, key)) = &cache_entry {
                        cache.insert(key.clone(), value.clone());
                    }
                    return Ok(Some(value));
                }
                Iteration::Failed(error) => {
                    warn!(sit = %ctx.name(), id = %ctx.id(), error = %error, "task failed");
                    ctx.set_failed().await;
                    dispatch(HookStage::Exception, &self.sitter.hooks.exception).await?;
                    return Err(SitError::Task(error));
                }
                Iteration::TimedOut => {
                    debug!(sit = %ctx.name(), id = %ctx.id(), "timed out");
                    ctx.set_timedout().await;
                    dispatch(HookStage::Timeout, &self.sitter.hooks.timeout).await?;
                    return Ok(None);
                }
                Iteration::Cancelled => {
                    debug!(sit = %ctx.name(), id = %ctx.id(), "cancelled");
                    ctx.set_cancelled().await;
                    dispatch(HookStage::Cancellation, &self.sitter.hooks.cancellation).await?;
                    return Ok(None);
                }
                Iteration::Restarted => {
                    debug!(sit = %ctx.name(), id = %ctx.id(), "restarting");
                    dispatch(HookStage::Restart, &self.sitter.hooks.restart).await?;
                }
            }
        }
    }
}

/// Resolves when the iteration's deadline elapses; pends forever when no
/// timeout is configured.
async fn deadline_elapsed(deadline: Option<Instant>) {
    match deadline {
        Some(at) => sleep_until(at).await,
        None => futures::future::pending().await,
    }
}
