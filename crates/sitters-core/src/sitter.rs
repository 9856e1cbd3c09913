use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use sitters_types::{CallArgs, HookStage};

use crate::cache::SitCache;
use crate::context::SitterRef;
use crate::hooks::Hook;
use crate::signal::SignalSource;

/// The user computation: invoked with the call's arguments, yields the task
/// result or the user's error.
pub type TaskFn<R> = Arc<dyn Fn(CallArgs) -> BoxFuture<'static, anyhow::Result<R>> + Send + Sync>;

/// A user computation already bound to its arguments.
pub type RawCall<R> = Arc<dyn Fn() -> BoxFuture<'static, anyhow::Result<R>> + Send + Sync>;

/// Opaque transform wrapping a bound call with retry logic. Applied inside
/// the timeout scope and outside the hook machinery: it retries the raw
/// computation only.
pub type RetryLayer<R> = Arc<dyn Fn(RawCall<R>) -> RawCall<R> + Send + Sync>;

/// Produces a fresh signal subscription for each invocation.
pub type SignalFactory = Arc<dyn Fn() -> Box<dyn SignalSource> + Send + Sync>;

/// The six hook lists, one per lifecycle point. Empty lists are permitted
/// and dispatch as no-ops.
#[derive(Clone, Default)]
pub struct HookSet {
    pub startup: Vec<Hook>,
    pub completion: Vec<Hook>,
    pub exception: Vec<Hook>,
    pub timeout: Vec<Hook>,
    pub cancellation: Vec<Hook>,
    pub restart: Vec<Hook>,
}

impl HookSet {
    pub fn for_stage(&self, stage: HookStage) -> &[Hook] {
        match stage {
            HookStage::Startup => &self.startup,
            HookStage::Completion => &self.completion,
            HookStage::Exception => &self.exception,
            HookStage::Timeout => &self.timeout,
            HookStage::Cancellation => &self.cancellation,
            HookStage::Restart => &self.restart,
        }
    }

    pub fn count(&self, stage: HookStage) -> usize {
        self.for_stage(stage).len()
    }
}

/// The configuration-bearing wrapper around a user function: everything a
/// supervisor needs to drive one invocation. Shared immutably between the
/// caller and any number of concurrent invocations.
pub struct Sitter<R> {
    pub name: String,
    pub task: TaskFn<R>,
    pub timeout: Option<Duration>,
    pub retry: Option<RetryLayer<R>>,
    pub cache: Option<Arc<dyn SitCache<R>>>,
    pub hooks: HookSet,
    pub signals: SignalFactory,
}

impl<R: 'static> Sitter<R> {
    /// Bind the task to `args` and apply the retry transform to the raw
    /// bound call. Called once per iteration, so every restart begins with a
    /// fresh retry budget.
    pub fn bind(&self, args: &CallArgs) -> RawCall<R> {
        let task = self.task.clone();
        let args = args.clone();
        let mut call: RawCall<R> = Arc::new(move || task(args.clone()));
        if let Some(retry) = &self.retry {
            call = retry(call);
        }
        call
    }
}

impl<R> SitterRef for Sitter<R> {
    fn name(&self) -> &str {
        &self.name
    }

    fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    fn hook_count(&self, stage: HookStage) -> usize {
        self.hooks.count(stage)
    }

    fn has_retry(&self) -> bool {
        self.retry.is_some()
    }

    fn has_cache(&self) -> bool {
        self.cache.is_some()
    }
}
