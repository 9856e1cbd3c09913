use serde::{Deserialize, Serialize};

/// Operating-system signals the runner reacts to.
///
/// `Kill` is a category label: SIGKILL cannot actually be caught, so the
/// production source never registers it, but scripted sources deliver it to
/// exercise the cancel family.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SitSignal {
    Term,
    Int,
    Kill,
    /// Restart the running invocation.
    Hup,
    /// Enter the pause loop.
    Usr1,
    /// Exit the pause loop; a no-op outside of it.
    Usr2,
}

impl SitSignal {
    /// Whether this signal belongs to the cancel family (TERM/INT/KILL).
    pub fn is_cancel(&self) -> bool {
        matches!(self, Self::Term | Self::Int | Self::Kill)
    }

    /// Conventional Unix name, for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Term => "SIGTERM",
            Self::Int => "SIGINT",
            Self::Kill => "SIGKILL",
            Self::Hup => "SIGHUP",
            Self::Usr1 => "SIGUSR1",
            Self::Usr2 => "SIGUSR2",
        }
    }
}

impl std::fmt::Display for SitSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Lifecycle command produced by the signal demultiplexer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// Cancel the invocation; it terminates with no result.
    Cancel,
    /// Unwind the current iteration and run the user function again.
    Restart,
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cancel => write!(f, "cancel"),
            Self::Restart => write!(f, "restart"),
        }
    }
}
