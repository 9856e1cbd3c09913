#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use sitters::{SignalScript, SignalSource, SitSignal};

pub fn counter() -> Arc<AtomicUsize> {
    Arc::new(AtomicUsize::new(0))
}

pub fn count(calls: &Arc<AtomicUsize>) -> usize {
    calls.load(Ordering::SeqCst)
}

/// Hook that bumps a counter, standing in for a mock callback.
pub fn tick(
    calls: &Arc<AtomicUsize>,
) -> impl Fn() -> std::future::Ready<anyhow::Result<()>> + Send + Sync + 'static {
    let calls = calls.clone();
    move || {
        calls.fetch_add(1, Ordering::SeqCst);
        std::future::ready(Ok(()))
    }
}

/// Signal factory that never yields a signal.
pub fn no_signals() -> impl Fn() -> Box<dyn SignalSource> + Send + Sync + 'static {
    || SignalScript::new(std::iter::empty::<SitSignal>()).source()
}

/// Signal factory replaying `signals` in order, one per script tick.
pub fn scripted(
    signals: Vec<SitSignal>,
) -> impl Fn() -> Box<dyn SignalSource> + Send + Sync + 'static {
    let script = SignalScript::new(signals);
    move || script.source()
}

/// Like [`scripted`], with a custom delay between deliveries.
pub fn scripted_with_delay(
    signals: Vec<SitSignal>,
    delay: std::time::Duration,
) -> impl Fn() -> Box<dyn SignalSource> + Send + Sync + 'static {
    let script = SignalScript::with_delay(signals, delay);
    move || script.source()
}
