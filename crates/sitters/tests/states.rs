mod common;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use common::no_signals;
use sitters::{SitState, current_sit, sit};

type SeenState = Arc<Mutex<Option<SitState>>>;

fn state_slot() -> SeenState {
    Arc::new(Mutex::new(None))
}

fn observed(slot: &SeenState) -> SitState {
    slot.lock().unwrap().expect("state was observed")
}

fn state_hook(
    slot: &SeenState,
) -> impl Fn() -> futures::future::BoxFuture<'static, anyhow::Result<()>> + Send + Sync + 'static {
    use futures::FutureExt;
    let slot = slot.clone();
    move || {
        let slot = slot.clone();
        async move {
            *slot.lock().unwrap() = Some(current_sit()?.state());
            Ok(())
        }
        .boxed()
    }
}

#[test_log::test(tokio::test)]
async fn an_active_sit_is_running() {
    let seen = state_slot();
    let slot = seen.clone();
    let unit = sit("active", move |_args| {
        let slot = slot.clone();
        async move {
            *slot.lock().unwrap() = Some(current_sit()?.state());
            anyhow::Ok(())
        }
    })
    .signals(no_signals())
    .build();

    unit.run().await.unwrap();

    assert_eq!(observed(&seen), SitState::Running);
}

#[test_log::test(tokio::test)]
async fn a_failed_sit_is_failed() {
    let seen = state_slot();
    let unit = sit("failing", |_args| async {
        Err::<(), _>(anyhow::anyhow!("boom"))
    })
    .exception_hook(state_hook(&seen))
    .signals(no_signals())
    .build();

    let result = unit.run().await;

    assert!(result.is_err());
    assert_eq!(observed(&seen), SitState::Failed);
}

#[test_log::test(tokio::test(start_paused = true))]
async fn a_timedout_sit_is_cancelled() {
    let seen = state_slot();
    let unit = sit("slow", |_args| async {
        tokio::time::sleep(Duration::from_secs(5)).await;
        anyhow::Ok(())
    })
    .timeout(Duration::from_secs(1))
    .timeout_hook(state_hook(&seen))
    .signals(no_signals())
    .build();

    unit.run().await.unwrap();

    assert_eq!(observed(&seen), SitState::Cancelled);
}

#[test_log::test(tokio::test)]
async fn a_completed_sit_is_completed() {
    let seen = state_slot();
    let unit = sit("passing", |_args| async { anyhow::Ok(()) })
        .completion_hook(state_hook(&seen))
        .signals(no_signals())
        .build();

    unit.run().await.unwrap();

    assert_eq!(observed(&seen), SitState::Completed);
}

#[test_log::test(tokio::test)]
async fn terminal_contexts_carry_a_stop_timestamp() {
    let seen: Arc<Mutex<Option<Arc<sitters::SitContext>>>> = Arc::new(Mutex::new(None));
    let slot = seen.clone();
    let unit = sit("timed", |_args| async { anyhow::Ok(()) })
        .completion_hook(move || {
            let slot = slot.clone();
            async move {
                *slot.lock().unwrap() = Some(current_sit()?);
                Ok(())
            }
        })
        .signals(no_signals())
        .build();

    unit.run().await.unwrap();

    let ctx = seen.lock().unwrap().clone().expect("context was captured");
    assert_eq!(ctx.state(), SitState::Completed);
    let stopped_at = ctx.stopped_at().expect("terminal contexts are stamped");
    assert!(ctx.started_at() <= stopped_at);
}
