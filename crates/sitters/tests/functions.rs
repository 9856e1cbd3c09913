mod common;

use std::sync::atomic::Ordering;

use common::{count, counter, no_signals};
use sitters::sit;

#[test_log::test(tokio::test)]
async fn functions_are_run() {
    let calls = counter();
    let task_calls = calls.clone();
    let unit = sit("plain", move |_args| {
        let calls = task_calls.clone();
        async move {
            calls.fetch_add(1, Ordering::SeqCst);
            anyhow::Ok(())
        }
    })
    .signals(no_signals())
    .build();

    let result = unit.run().await.unwrap();

    assert_eq!(result, Some(()));
    assert_eq!(count(&calls), 1);
}

#[test_log::test(tokio::test)]
async fn nested_runs() {
    let calls = counter();
    let task_calls = calls.clone();
    let inner = sit("inner", move |_args| {
        let calls = task_calls.clone();
        async move {
            calls.fetch_add(1, Ordering::SeqCst);
            anyhow::Ok("g".to_string())
        }
    })
    .signals(no_signals())
    .build();

    let inner_unit = inner.clone();
    let outer = sit("outer", move |_args| {
        let inner = inner_unit.clone();
        async move {
            let nested = inner.run().await?;
            anyhow::Ok(nested.expect("inner sit completes"))
        }
    })
    .signals(no_signals())
    .build();

    let result = outer.run().await.unwrap();

    assert_eq!(result.as_deref(), Some("g"));
    assert_eq!(count(&calls), 1);
}
