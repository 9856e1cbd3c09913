use std::fmt;

/// Named lifecycle points at which user hooks fire.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HookStage {
    Startup,
    Completion,
    Exception,
    Timeout,
    Cancellation,
    Restart,
}

impl HookStage {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Startup => "startup",
            Self::Completion => "completion",
            Self::Exception => "exception",
            Self::Timeout => "timeout",
            Self::Cancellation => "cancellation",
            Self::Restart => "restart",
        }
    }
}

impl fmt::Display for HookStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Grouped failure from one hook list.
///
/// Hooks of a list run concurrently, so several may fail in the same
/// dispatch; every failure is retained. The hooks that did not fail still
/// ran to completion before this error was produced.
#[derive(Debug)]
pub struct HookError {
    pub stage: HookStage,
    pub failures: Vec<anyhow::Error>,
}

impl fmt::Display for HookError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} hook(s) failed", self.failures.len(), self.stage)?;
        if let Some(first) = self.failures.first() {
            write!(f, ": {first}")?;
        }
        Ok(())
    }
}

impl std::error::Error for HookError {}

/// Errors surfaced to the caller of a supervised invocation.
///
/// Cancellations never appear here: a timeout or an external cancel
/// terminates the invocation with no result instead of an error.
#[derive(Debug, thiserror::Error)]
pub enum SitError {
    /// The ambient sit context was requested outside any supervised
    /// invocation.
    #[error("sit context is only available from within a sit")]
    NoActiveContext,
    /// The user computation failed with a non-cancellation error. Exception
    /// hooks have already run.
    #[error(transparent)]
    Task(anyhow::Error),
    /// One or more hooks failed during dispatch.
    #[error(transparent)]
    Hooks(#[from] HookError),
}

impl SitError {
    pub fn task(error: impl Into<anyhow::Error>) -> Self {
        Self::Task(error.into())
    }
}
