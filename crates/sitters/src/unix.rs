use async_trait::async_trait;
use signal_hook::consts::signal::{SIGHUP, SIGINT, SIGTERM, SIGUSR1, SIGUSR2};
use signal_hook::iterator::Signals;
use sitters_core::SignalSource;
use sitters_types::SitSignal;
use tokio::signal::unix::{Signal, SignalKind, signal};
use tracing::debug;

/// The signal set a supervised invocation reacts to. SIGKILL cannot be
/// caught and is never registered; [`SitSignal::Kill`] exists for scripted
/// sources only.
const SIGNAL_SET: [i32; 5] = [SIGTERM, SIGINT, SIGHUP, SIGUSR1, SIGUSR2];

/// Process-wide Unix signal subscription for one invocation.
///
/// The asynchronous side listens on tokio's per-kind signal streams. The
/// synchronous side, used only inside the pause loop, registers a
/// signal-hook iterator for the duration of the wait; both mechanisms sit on
/// `signal-hook-registry`, so the subscriptions coexist. A delivery during a
/// pause may also be latched by the async streams and surface again after
/// resume.
pub struct UnixSignals {
    term: Signal,
    int: Signal,
    hup: Signal,
    usr1: Signal,
    usr2: Signal,
}

impl UnixSignals {
    /// Subscribe to the supervised signal set. Panics if signal handlers
    /// cannot be registered, which only happens outside a tokio runtime or
    /// when the process denies handler installation.
    pub fn subscribe() -> Box<dyn SignalSource> {
        Box::new(Self::try_subscribe().expect("failed to register signal handlers"))
    }

    pub fn try_subscribe() -> std::io::Result<Self> {
        Ok(Self {
            term: signal(SignalKind::terminate())?,
            int: signal(SignalKind::interrupt())?,
            hup: signal(SignalKind::hangup())?,
            usr1: signal(SignalKind::user_defined1())?,
            usr2: signal(SignalKind::user_defined2())?,
        })
    }
}

#[async_trait]
impl SignalSource for UnixSignals {
    async fn recv(&mut self) -> Option<SitSignal> {
        tokio::select! {
            received = self.term.recv() => received.map(|()| SitSignal::Term),
            received = self.int.recv() => received.map(|()| SitSignal::Int),
            received = self.hup.recv() => received.map(|()| SitSignal::Hup),
            received = self.usr1.recv() => received.map(|()| SitSignal::Usr1),
            received = self.usr2.recv() => received.map(|()| SitSignal::Usr2),
        }
    }

    fn wait(&mut self) -> Option<SitSignal> {
        let mut signals = match Signals::new(SIGNAL_SET) {
            Ok(signals) => signals,
            Err(error) => {
                debug!(error = %error, "could not register blocking signal wait");
                return None;
            }
        };
        for raw in signals.forever() {
            if let Some(signal) = from_raw(raw) {
                return Some(signal);
            }
        }
        None
    }
}

fn from_raw(raw: i32) -> Option<SitSignal> {
    match raw {
        SIGTERM => Some(SitSignal::Term),
        SIGINT => Some(SitSignal::Int),
        SIGHUP => Some(SitSignal::Hup),
        SIGUSR1 => Some(SitSignal::Usr1),
        SIGUSR2 => Some(SitSignal::Usr2),
        _ => None,
    }
}
