pub mod cache;
pub mod context;
pub mod hooks;
pub mod signal;
pub mod sitter;
pub mod supervisor;

pub use cache::{LruCache, SitCache};
pub use context::{SitContext, SitterRef, current_sit, with_context};
pub use hooks::{Hook, dispatch};
pub use signal::{SignalScript, SignalSource, demultiplex};
pub use sitter::{HookSet, RawCall, RetryLayer, SignalFactory, Sitter, TaskFn};
pub use supervisor::Supervisor;
