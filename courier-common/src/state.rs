//! Message lifecycle states and the transition table.
//!
//! Pure logic, no I/O: persistence and log rows are handled by the audit
//! writer in `courier-store`, which refuses any edge this module rejects.

use core::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lifecycle states for a message moving through the dispatch pipeline.
///
/// The operator kill-switch (`Message::is_disabled`) is an independent
/// overlay, not a state: a disabled message keeps whatever state it had.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageState {
    /// Waiting for provider assignment.
    #[default]
    Pending,
    /// Assigned to a provider and queued for dispatch.
    Processing,
    /// The provider accepted the message.
    Sent,
    /// The provider reported an error; recoverable until the error budget
    /// is spent.
    Failed,
}

/// A state edge that is not in the transition table.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("invalid message transition: {from} -> {to}")]
pub struct InvalidTransition {
    pub from: MessageState,
    pub to: MessageState,
}

impl MessageState {
    /// The full transition table:
    ///
    /// - `Pending -> Processing` (provider assigned)
    /// - `Processing -> Sent` (adapter success)
    /// - `Processing -> Failed` (adapter error)
    /// - `Failed -> Pending` (retry reset, below the error budget)
    ///
    /// Everything else is rejected. Intake creates messages directly in
    /// `Pending`; that edge never passes through the pipeline.
    #[must_use]
    pub const fn can_transition_to(self, to: Self) -> bool {
        matches!(
            (self, to),
            (Self::Pending, Self::Processing)
                | (Self::Processing, Self::Sent)
                | (Self::Processing, Self::Failed)
                | (Self::Failed, Self::Pending)
        )
    }

    /// Check if this state is terminal given the message's error counters.
    ///
    /// `Sent` is always terminal; `Failed` becomes terminal once
    /// `error_count` reaches the bound. Terminal messages only ever leave
    /// the store through the archive stage.
    #[must_use]
    pub fn is_terminal(self, error_count: u32, max_errors: u32) -> bool {
        match self {
            Self::Sent => true,
            Self::Failed => error_count >= max_errors,
            Self::Pending | Self::Processing => false,
        }
    }

    /// Check if the message is currently being worked on.
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Processing)
    }
}

/// Validate a state edge against the transition table.
///
/// # Errors
///
/// Returns [`InvalidTransition`] when the edge is not in the table.
pub const fn verify_transition(
    from: MessageState,
    to: MessageState,
) -> Result<(), InvalidTransition> {
    if from.can_transition_to(to) {
        Ok(())
    } else {
        Err(InvalidTransition { from, to })
    }
}

impl Display for MessageState {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Processing => write!(f, "processing"),
            Self::Sent => write!(f, "sent"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

impl std::str::FromStr for MessageState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "processing" => Ok(Self::Processing),
            "sent" => Ok(Self::Sent),
            "failed" => Ok(Self::Failed),
            _ => Err(format!("Invalid message state: {s}")),
        }
    }
}
