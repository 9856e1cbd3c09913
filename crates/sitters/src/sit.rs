use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use sitters_core::{HookSet, RetryLayer, SignalSource, SitCache, Sitter, Supervisor};
use sitters_types::{CallArgs, SitError};

use crate::unix::UnixSignals;

/// A runnable unit: a user async function plus its supervision
/// configuration. Cheap to clone; every invocation shares the same
/// configuration and gets its own supervisor.
pub struct Sit<R> {
    inner: Arc<Sitter<R>>,
}

impl<R> Clone for Sit<R> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<R> Sit<R>
where
    R: Clone + Send + Sync + 'static,
{
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Drive one supervised invocation with the given arguments.
    ///
    /// `Ok(Some(value))` on success (possibly from cache), `Ok(None)` when
    /// the invocation timed out or was cancelled, `Err` when the user
    /// computation or a hook failed.
    pub async fn call(&self, args: CallArgs) -> Result<Option<R>, SitError> {
        Supervisor::new(self.inner.clone(), args).start().await
    }

    /// Invoke with no arguments.
    pub async fn run(&self) -> Result<Option<R>, SitError> {
        self.call(CallArgs::new()).await
    }
}

/// Wrap `task` into a supervised runnable unit.
///
/// The name labels the invocation in logs and keys the result cache, so two
/// differently named units never share cached results.
pub fn sit<R, F, Fut>(name: &str, task: F) -> SitBuilder<R>
where
    R: Clone + Send + Sync + 'static,
    F: Fn(CallArgs) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<R>> + Send + 'static,
{
    SitBuilder::new(name, task)
}

/// Fluent configuration for a [`Sit`].
pub struct SitBuilder<R> {
    sitter: Sitter<R>,
}

impl<R> SitBuilder<R>
where
    R: Clone + Send + Sync + 'static,
{
    pub fn new<F, Fut>(name: &str, task: F) -> Self
    where
        F: Fn(CallArgs) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<R>> + Send + 'static,
    {
        Self {
            sitter: Sitter {
                name: name.to_string(),
                task: Arc::new(move |args| task(args).boxed()),
                timeout: None,
                retry: None,
                cache: None,
                hooks: HookSet::default(),
                signals: Arc::new(UnixSignals::subscribe),
            },
        }
    }

    /// Cancel the user call after `timeout`, terminating the invocation
    /// with no result. The clock re-arms on every restart.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.sitter.timeout = Some(timeout);
        self
    }

    /// Wrap the raw user call with a retry transform, e.g.
    /// [`retry::stop_after_attempt`](crate::retry::stop_after_attempt).
    pub fn retry(mut self, retry: RetryLayer<R>) -> Self {
        self.sitter.retry = Some(retry);
        self
    }

    /// Memoize successful results keyed by call identity.
    pub fn cache(mut self, cache: Arc<dyn SitCache<R>>) -> Self {
        self.sitter.cache = Some(cache);
        self
    }

    /// Replace the per-invocation signal subscription. Defaults to the
    /// process-wide Unix signals; tests substitute a
    /// [`SignalScript`](crate::SignalScript).
    pub fn signals<S>(mut self, factory: S) -> Self
    where
        S: Fn() -> Box<dyn SignalSource> + Send + Sync + 'static,
    {
        self.sitter.signals = Arc::new(factory);
        self
    }

    /// Fired once per iteration before the user function runs, including
    /// once per restart.
    pub fn startup_hook<H, Fut>(mut self, hook: H) -> Self
    where
        H: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.sitter.hooks.startup.push(Arc::new(move || hook().boxed()));
        self
    }

    /// Fired on normal return.
    pub fn completion_hook<H, Fut>(mut self, hook: H) -> Self
    where
        H: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.sitter.hooks.completion.push(Arc::new(move || hook().boxed()));
        self
    }

    /// Fired when the user computation fails.
    pub fn exception_hook<H, Fut>(mut self, hook: H) -> Self
    where
        H: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.sitter.hooks.exception.push(Arc::new(move || hook().boxed()));
        self
    }

    /// Fired when the timeout elapses.
    pub fn timeout_hook<H, Fut>(mut self, hook: H) -> Self
    where
        H: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.sitter.hooks.timeout.push(Arc::new(move || hook().boxed()));
        self
    }

    /// Fired on an external cancel (TERM/INT/KILL).
    pub fn cancellation_hook<H, Fut>(mut self, hook: H) -> Self
    where
        H: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.sitter.hooks.cancellation.push(Arc::new(move || hook().boxed()));
        self
    }

    /// Fired when a restart is triggered (HUP).
    pub fn restart_hook<H, Fut>(mut self, hook: H) -> Self
    where
        H: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.sitter.hooks.restart.push(Arc::new(move || hook().boxed()));
        self
    }

    pub fn build(self) -> Sit<R> {
        Sit {
            inner: Arc::new(self.sitter),
        }
    }
}
