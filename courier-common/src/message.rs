//! The message record the pipeline moves through its lifecycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::state::MessageState;

/// The two message classes the pipeline can deliver. Immutable after
/// creation; used by provider assignment to match capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    Mail,
    Text,
}

impl core::fmt::Display for MessageKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Mail => write!(f, "mail"),
            Self::Text => write!(f, "text"),
        }
    }
}

/// One key/value tag attached to a message.
///
/// Properties form an *ordered* extensible set written by intake
/// (destination addresses, subject, template parameters). The pipeline
/// carries them through untouched; adapters read what they need.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageProperty {
    pub name: String,
    pub value: String,
}

/// A unit of work to deliver.
///
/// Created by intake in `Pending` with a zero error count; mutated only by
/// the dispatch pipeline afterwards; destroyed only by the archive stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Storage identity.
    pub id: i64,
    /// Immutable external key clients use to query status.
    pub public_id: Uuid,
    pub kind: MessageKind,
    pub state: MessageState,
    /// Operator kill-switch. A disabled message is invisible to discovery
    /// regardless of its state.
    pub is_disabled: bool,
    /// Lower is more urgent. Orders messages within a provider group; has
    /// no effect on which provider is assigned.
    pub priority: i32,
    /// Incremented on each provider failure, never reset.
    pub error_count: u32,
    /// Per-message error budget. `None` defers to the configured default.
    pub max_errors: Option<u32>,
    /// Delayed delivery: not eligible for processing until this passes.
    pub process_after: Option<DateTime<Utc>>,
    /// `ProviderType` id set during assignment; the single authoritative
    /// record of which provider owns the message.
    pub assigned_provider: Option<i64>,
    pub properties: Vec<MessageProperty>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub last_updated_by: String,
    pub last_updated_at: DateTime<Utc>,
}

impl Message {
    /// Create a new pending message, as intake would.
    #[must_use]
    pub fn new(id: i64, kind: MessageKind, created_by: &str) -> Self {
        let now = Utc::now();

        Self {
            id,
            public_id: Uuid::new_v4(),
            kind,
            state: MessageState::Pending,
            is_disabled: false,
            priority: 0,
            error_count: 0,
            max_errors: None,
            process_after: None,
            assigned_provider: None,
            properties: Vec::new(),
            created_by: created_by.to_string(),
            created_at: now,
            last_updated_by: created_by.to_string(),
            last_updated_at: now,
        }
    }

    /// The effective error budget for this message.
    #[must_use]
    pub fn error_bound(&self, default_max_errors: u32) -> u32 {
        self.max_errors.unwrap_or(default_max_errors)
    }

    /// Check if the message has reached a terminal condition: sent, or
    /// failed with the error budget spent.
    #[must_use]
    pub fn is_terminal(&self, default_max_errors: u32) -> bool {
        self.state
            .is_terminal(self.error_count, self.error_bound(default_max_errors))
    }

    /// Look up a property value by name.
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&str> {
        self.properties
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.value.as_str())
    }

    /// Set a property, replacing an existing entry in place so the set
    /// keeps its order.
    pub fn set_property(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.properties.iter_mut().find(|p| p.name == name) {
            Some(existing) => existing.value = value,
            None => self.properties.push(MessageProperty {
                name: name.to_string(),
                value,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn new_messages_start_pending_with_zero_errors() {
        let message = Message::new(1, MessageKind::Mail, "intake");

        assert_eq!(message.state, MessageState::Pending);
        assert_eq!(message.error_count, 0);
        assert!(message.assigned_provider.is_none());
        assert!(!message.is_disabled);
        assert_eq!(message.created_by, "intake");
    }

    #[test]
    fn error_bound_prefers_the_per_message_budget() {
        let mut message = Message::new(1, MessageKind::Text, "intake");
        assert_eq!(message.error_bound(3), 3);

        message.max_errors = Some(5);
        assert_eq!(message.error_bound(3), 5);
    }

    #[test]
    fn terminal_condition() {
        let mut message = Message::new(1, MessageKind::Mail, "intake");
        assert!(!message.is_terminal(3));

        message.state = MessageState::Sent;
        assert!(message.is_terminal(3));

        message.state = MessageState::Failed;
        message.error_count = 2;
        assert!(!message.is_terminal(3));
        message.error_count = 3;
        assert!(message.is_terminal(3));
    }

    #[test]
    fn properties_keep_their_order() {
        let mut message = Message::new(1, MessageKind::Mail, "intake");
        message.set_property("to", "someone@example.com");
        message.set_property("subject", "hello");
        message.set_property("to", "other@example.com");

        assert_eq!(
            message
                .properties
                .iter()
                .map(|p| p.name.as_str())
                .collect::<Vec<_>>(),
            vec!["to", "subject"]
        );
        assert_eq!(message.property("to"), Some("other@example.com"));
        assert_eq!(message.property("missing"), None);
    }
}
