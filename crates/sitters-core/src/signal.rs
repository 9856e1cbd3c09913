use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use sitters_types::{Command, SitSignal};
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

/// Delivery of operating-system signals to one invocation.
///
/// `recv` is the asynchronous stream used while the invocation is live.
/// `wait` is the synchronous primitive used inside the pause loop, where all
/// asynchronous progress is deliberately halted until the pause ends.
#[async_trait]
pub trait SignalSource: Send {
    /// Next signal from the asynchronous stream, or `None` once the stream
    /// is exhausted.
    async fn recv(&mut self) -> Option<SitSignal>;

    /// Block until the next signal arrives. Only called while paused.
    fn wait(&mut self) -> Option<SitSignal>;
}

/// Turn incoming signals into lifecycle commands.
///
/// TERM/INT/KILL cancel, HUP restarts, USR1 enters the pause loop, USR2 is a
/// no-op outside of it. This future never resolves: the supervisor tears it
/// down by dropping it when the invocation terminates, and an exhausted
/// source merely parks the demultiplexer.
pub async fn demultiplex(mut source: Box<dyn SignalSource>, commands: UnboundedSender<Command>) {
    while let Some(signal) = source.recv().await {
        match signal {
            SitSignal::Term | SitSignal::Int | SitSignal::Kill => {
                debug!(signal = %signal, command = %Command::Cancel, "signal received");
                let _ = commands.send(Command::Cancel);
            }
            SitSignal::Hup => {
                debug!(signal = %signal, command = %Command::Restart, "signal received");
                let _ = commands.send(Command::Restart);
            }
            SitSignal::Usr1 => {
                if !pause(source.as_mut(), &commands) {
                    break;
                }
            }
            SitSignal::Usr2 => {}
        }
    }
    debug!("signal stream exhausted; parking demultiplexer");
    futures::future::pending::<()>().await;
}

/// The pause loop. Waits synchronously on the signal set: further USR1s are
/// absorbed without re-dispatch, USR2 resumes, HUP and the cancel family
/// resume and dispatch their command after the pause exits. Returns `false`
/// when the source is exhausted.
fn pause(source: &mut dyn SignalSource, commands: &UnboundedSender<Command>) -> bool {
    debug!("paused; waiting synchronously for signals");
    loop {
        match source.wait() {
            // Already paused.
            Some(SitSignal::Usr1) => {}
            Some(SitSignal::Usr2) => {
                debug!("resuming");
                return true;
            }
            Some(SitSignal::Hup) => {
                debug!("resuming with restart");
                let _ = commands.send(Command::Restart);
                return true;
            }
            Some(signal) if signal.is_cancel() => {
                debug!(signal = %signal, "resuming with cancel");
                let _ = commands.send(Command::Cancel);
                return true;
            }
            _ => return false,
        }
    }
}

/// Deterministic signal source driven by a prepared sequence.
///
/// The asynchronous side yields one signal per delay tick, mirroring how a
/// process observes signals spaced out in time; the synchronous side pops
/// immediately. Intended for tests and simulations.
#[derive(Clone)]
pub struct SignalScript {
    delay: Duration,
    queue: Arc<Mutex<VecDeque<SitSignal>>>,
}

impl SignalScript {
    pub fn new(signals: impl IntoIterator<Item = SitSignal>) -> Self {
        Self::with_delay(signals, Duration::from_millis(50))
    }

    pub fn with_delay(signals: impl IntoIterator<Item = SitSignal>, delay: Duration) -> Self {
        Self {
            delay,
            queue: Arc::new(Mutex::new(signals.into_iter().collect())),
        }
    }

    /// A handle usable as a supervisor's signal source. Handles share the
    /// underlying queue.
    pub fn source(&self) -> Box<dyn SignalSource> {
        Box::new(self.clone())
    }

    pub fn remaining(&self) -> usize {
        self.queue.lock().len()
    }
}

#[async_trait]
impl SignalSource for SignalScript {
    async fn recv(&mut self) -> Option<SitSignal> {
        tokio::time::sleep(self.delay).await;
        self.queue.lock().pop_front()
    }

    fn wait(&mut self) -> Option<SitSignal> {
        self.queue.lock().pop_front()
    }
}
