//! Supervised asynchronous task running.
//!
//! Wrap an async function into a [`Sit`] with [`sit`], configure lifecycle
//! hooks, a timeout, a retry policy, and a result cache on the builder, and
//! invoke it. Every invocation runs under a supervisor that reacts to Unix
//! signals (restart on SIGHUP, cancel on SIGTERM/SIGINT, pause/resume on
//! SIGUSR1/SIGUSR2) and exposes an ambient [`SitContext`] to the running
//! computation via [`current_sit`].

pub mod retry;
mod sit;
mod unix;

pub use sit::{Sit, SitBuilder, sit};
pub use unix::UnixSignals;

pub use sitters_core::{
    LruCache, SignalScript, SignalSource, SitCache, SitContext, SitterRef, Supervisor, current_sit,
};
pub use sitters_types::{
    CacheKey, CallArgs, Command, HookError, HookStage, SitError, SitSignal, SitState,
};
