use serde::{Deserialize, Serialize};

/// Lifecycle state of a single supervised invocation.
///
/// Terminal states are never left. Timeouts and external cancellations share
/// the `Cancelled` terminal state; which one occurred is visible through the
/// hook list that fired, not through the state tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SitState {
    /// Admitted, user function not yet started. Also the final state of a
    /// cache hit, which bypasses the call driver entirely.
    Pending,
    Running,
    /// Terminal.
    Completed,
    /// Terminal.
    Failed,
    /// Terminal. Covers timeouts and external cancellation.
    Cancelled,
}

impl SitState {
    /// Whether the invocation has reached a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }
}

impl std::fmt::Display for SitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "Pending"),
            Self::Running => write!(f, "Running"),
            Self::Completed => write!(f, "Completed"),
            Self::Failed => write!(f, "Failed"),
            Self::Cancelled => write!(f, "Cancelled"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_the_three_end_states_are_terminal() {
        assert!(!SitState::Pending.is_terminal());
        assert!(!SitState::Running.is_terminal());
        assert!(SitState::Completed.is_terminal());
        assert!(SitState::Failed.is_terminal());
        assert!(SitState::Cancelled.is_terminal());
    }
}
