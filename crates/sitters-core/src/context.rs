use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use sitters_types::{HookStage, SitError, SitState};
use tracing::debug;
use uuid::Uuid;

tokio::task_local! {
    /// Innermost active sit context. Scopes stack: a nested sit shadows the
    /// outer one and the outer is restored when the inner scope exits,
    /// including on error paths.
    static CURRENT_SIT: Arc<SitContext>;
}

/// Read-only view of the runnable unit that owns an invocation.
///
/// Hooks and user code reach configuration through this trait so the
/// context does not have to be generic over the task's result type.
pub trait SitterRef: Send + Sync {
    fn name(&self) -> &str;
    fn timeout(&self) -> Option<Duration>;
    fn hook_count(&self, stage: HookStage) -> usize;
    fn has_retry(&self) -> bool;
    fn has_cache(&self) -> bool;
}

/// Ambient per-invocation datum: identity, timing, lifecycle state, and a
/// back-reference to the configuration it runs under.
///
/// Created eagerly when the invocation is admitted and owned by its
/// supervisor; hooks and user code see it through [`current_sit`].
pub struct SitContext {
    id: Uuid,
    name: String,
    started_at: DateTime<Utc>,
    sitter: Arc<dyn SitterRef>,
    progress: Mutex<Progress>,
}

#[derive(Clone, Copy)]
struct Progress {
    state: SitState,
    stopped_at: Option<DateTime<Utc>>,
}

impl SitContext {
    pub fn for_sitter(sitter: Arc<dyn SitterRef>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: sitter.name().to_string(),
            started_at: Utc::now(),
            sitter,
            progress: Mutex::new(Progress {
                state: SitState::Pending,
                stopped_at: None,
            }),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Wall-clock time of the first terminal transition. `Some` if and only
    /// if [`state`](Self::state) is terminal.
    pub fn stopped_at(&self) -> Option<DateTime<Utc>> {
        self.progress.lock().stopped_at
    }

    pub fn state(&self) -> SitState {
        self.progress.lock().state
    }

    /// The configuration this invocation runs under.
    pub fn sitter(&self) -> &Arc<dyn SitterRef> {
        &self.sitter
    }

    /// Pending -> Running. Runs before the startup hook list, once per
    /// iteration (a restart passes through here again).
    pub async fn set_starting(&self) {
        self.transition(SitState::Running);
    }

    pub async fn set_completed(&self) {
        self.transition(SitState::Completed);
    }

    pub async fn set_failed(&self) {
        self.transition(SitState::Failed);
    }

    /// A timeout terminates as `Cancelled`; the timeout hook list is what
    /// distinguishes it from an external cancel.
    pub async fn set_timedout(&self) {
        self.transition(SitState::Cancelled);
    }

    pub async fn set_cancelled(&self) {
        self.transition(SitState::Cancelled);
    }

    /// Terminal states are never left; `stopped_at` is stamped exactly when
    /// a terminal state is entered.
    fn transition(&self, next: SitState) {
        let mut progress = self.progress.lock();
        if progress.state.is_terminal() {
            return;
        }
        progress.state = next;
        if next.is_terminal() {
            progress.stopped_at = Some(Utc::now());
        }
        debug!(sit = %self.name, id = %self.id, state = %next, "state transition");
    }
}

/// Run `fut` with `ctx` installed as the ambient sit context.
pub async fn with_context<F>(ctx: Arc<SitContext>, fut: F) -> F::Output
where
    F: Future,
{
    CURRENT_SIT.scope(ctx, fut).await
}

/// The innermost active sit context.
///
/// Available to hooks, the user computation, and anything it transitively
/// calls on the same task. Fails with [`SitError::NoActiveContext`] outside
/// any supervised invocation.
pub fn current_sit() -> Result<Arc<SitContext>, SitError> {
    CURRENT_SIT
        .try_with(|ctx| ctx.clone())
        .map_err(|_| SitError::NoActiveContext)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StubSitter;

    impl SitterRef for StubSitter {
        fn name(&self) -> &str {
            "stub"
        }
        fn timeout(&self) -> Option<Duration> {
            None
        }
        fn hook_count(&self, _stage: HookStage) -> usize {
            0
        }
        fn has_retry(&self) -> bool {
            false
        }
        fn has_cache(&self) -> bool {
            false
        }
    }

    fn ctx() -> SitContext {
        SitContext::for_sitter(Arc::new(StubSitter))
    }

    #[tokio::test]
    async fn stopped_at_is_stamped_with_the_first_terminal_transition() {
        let ctx = ctx();
        assert_eq!(ctx.state(), SitState::Pending);
        assert!(ctx.stopped_at().is_none());

        ctx.set_starting().await;
        assert_eq!(ctx.state(), SitState::Running);
        assert!(ctx.stopped_at().is_none());

        ctx.set_completed().await;
        assert_eq!(ctx.state(), SitState::Completed);
        assert!(ctx.stopped_at().is_some());
    }

    #[tokio::test]
    async fn terminal_states_are_never_left() {
        let ctx = ctx();
        ctx.set_starting().await;
        ctx.set_timedout().await;
        let stopped = ctx.stopped_at();

        ctx.set_completed().await;
        ctx.set_starting().await;

        assert_eq!(ctx.state(), SitState::Cancelled);
        assert_eq!(ctx.stopped_at(), stopped);
    }

    #[tokio::test]
    async fn current_sit_fails_outside_any_invocation() {
        assert!(matches!(current_sit(), Err(SitError::NoActiveContext)));
    }

    #[tokio::test]
    async fn nested_scopes_shadow_and_restore() {
        let outer = Arc::new(ctx());
        let inner = Arc::new(ctx());

        let outer_id = outer.id();
        let inner_id = inner.id();

        with_context(outer, async move {
            assert_eq!(current_sit().unwrap().id(), outer_id);
            with_context(inner, async move {
                assert_eq!(current_sit().unwrap().id(), inner_id);
            })
            .await;
            assert_eq!(current_sit().unwrap().id(), outer_id);
        })
        .await;
    }
}
