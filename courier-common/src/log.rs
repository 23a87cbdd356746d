//! Append-only process log rows.
//!
//! One row per business event, written by the audit writer in the same
//! logical operation as the state change it describes. Rows are never
//! updated or deleted by the pipeline; the archive stage removes them only
//! as part of deleting their message.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{message::Message, state::MessageState};

/// The business events the pipeline records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogEvent {
    /// Intake accepted the message.
    Stored,
    /// A provider was assigned and the message moved to processing.
    Assigned,
    /// The provider accepted the message.
    Sent,
    /// The retry stage returned a failed message to pending.
    Reset,
    /// An operator disabled the message or provider.
    Disabled,
    /// An operator re-enabled the message or provider.
    Enabled,
    /// A provider failure, adapter failure, or group-level failure.
    Error,
}

impl core::fmt::Display for LogEvent {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Stored => write!(f, "stored"),
            Self::Assigned => write!(f, "assigned"),
            Self::Sent => write!(f, "sent"),
            Self::Reset => write!(f, "reset"),
            Self::Disabled => write!(f, "disabled"),
            Self::Enabled => write!(f, "enabled"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// One immutable record of a pipeline event.
///
/// `message_id` is `None` for events that are not about a single message
/// (a provider group that could not be dispatched, for instance); the
/// states are `None` when the event changed no state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessLog {
    pub message_id: Option<i64>,
    pub provider_type_id: Option<i64>,
    pub event: LogEvent,
    pub before_state: Option<MessageState>,
    pub after_state: Option<MessageState>,
    /// Free-form context for operators.
    pub data: Option<String>,
    pub error: Option<String>,
    pub actor: String,
    pub created_at: DateTime<Utc>,
}

impl ProcessLog {
    /// A row about one message, carrying its currently assigned provider.
    #[must_use]
    pub fn for_message(message: &Message, event: LogEvent, actor: &str) -> Self {
        Self {
            message_id: Some(message.id),
            provider_type_id: message.assigned_provider,
            event,
            before_state: None,
            after_state: None,
            data: None,
            error: None,
            actor: actor.to_string(),
            created_at: Utc::now(),
        }
    }

    /// A row about a provider rather than a single message; group-level
    /// dispatch failures land here.
    #[must_use]
    pub fn for_provider(provider_type_id: i64, event: LogEvent, actor: &str) -> Self {
        Self {
            message_id: None,
            provider_type_id: Some(provider_type_id),
            event,
            before_state: None,
            after_state: None,
            data: None,
            error: None,
            actor: actor.to_string(),
            created_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn with_states(mut self, before: MessageState, after: MessageState) -> Self {
        self.before_state = Some(before);
        self.after_state = Some(after);
        self
    }

    #[must_use]
    pub fn with_data(mut self, data: impl Into<String>) -> Self {
        self.data = Some(data.into());
        self
    }

    #[must_use]
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }
}
