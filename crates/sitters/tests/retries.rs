mod common;

use std::sync::atomic::Ordering;

use common::{count, counter, no_signals, tick};
use sitters::{SitError, retry, sit};

#[test_log::test(tokio::test)]
async fn retries_on_fn_that_always_fails() {
    let calls = counter();
    let task_calls = calls.clone();
    let unit = sit("doomed", move |_args| {
        let calls = task_calls.clone();
        async move {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            Err::<bool, _>(anyhow::anyhow!("attempt {n} failed"))
        }
    })
    .retry(retry::stop_after_attempt(5))
    .signals(no_signals())
    .build();

    let result = unit.run().await;

    assert!(matches!(result, Err(SitError::Task(_))));
    assert_eq!(count(&calls), 5);
}

#[test_log::test(tokio::test)]
async fn retries_on_fn_that_eventually_succeeds() {
    let calls = counter();
    let completion_hooks = counter();
    let exception_hooks = counter();
    let task_calls = calls.clone();
    let unit = sit("flaky", move |_args| {
        let calls = task_calls.clone();
        async move {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            if n < 5 {
                anyhow::bail!("attempt {n} failed");
            }
            Ok(true)
        }
    })
    .retry(retry::stop_after_attempt(5))
    .completion_hook(tick(&completion_hooks))
    .exception_hook(tick(&exception_hooks))
    .signals(no_signals())
    .build();

    let result = unit.run().await.unwrap();

    assert_eq!(result, Some(true));
    assert_eq!(count(&calls), 5);
    assert_eq!(count(&completion_hooks), 1);
    assert_eq!(count(&exception_hooks), 0);
}

#[test_log::test(tokio::test)]
async fn successful_fn_without_retries_runs_once() {
    let calls = counter();
    let task_calls = calls.clone();
    let unit = sit("steady", move |_args| {
        let calls = task_calls.clone();
        async move {
            calls.fetch_add(1, Ordering::SeqCst);
            anyhow::Ok(true)
        }
    })
    .signals(no_signals())
    .build();

    let result = unit.run().await.unwrap();

    assert_eq!(result, Some(true));
    assert_eq!(count(&calls), 1);
}

#[test_log::test(tokio::test)]
async fn an_exhausted_retry_fails_like_any_other_exception() {
    let exception_hooks = counter();
    let unit = sit("doomed", |_args| async {
        Err::<bool, _>(anyhow::anyhow!("no luck"))
    })
    .retry(retry::stop_after_attempt(3))
    .exception_hook(tick(&exception_hooks))
    .signals(no_signals())
    .build();

    let result = unit.run().await;

    assert!(matches!(result, Err(SitError::Task(_))));
    assert_eq!(count(&exception_hooks), 1);
}
