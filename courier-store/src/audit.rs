//! The audit writer: one state change, one log row, one logical operation.
//!
//! Every pipeline mutation of a message goes through here so that a
//! transition can never be persisted without the row that explains it, and
//! no component can write an edge the transition table rejects.

use courier_common::{
    log::{LogEvent, ProcessLog},
    message::Message,
    state::{self, MessageState},
};

use crate::{MessageStore, Result};

/// Transition a message and append the matching log row.
///
/// Verifies the edge against the transition table, applies the state (and
/// the error-count increment when the message fails), persists, and writes
/// one `ProcessLog` row carrying the captured before/after pair.
///
/// # Errors
///
/// Rejects edges outside the transition table without touching the store;
/// otherwise propagates store failures.
pub async fn record_transition(
    store: &dyn MessageStore,
    message: &mut Message,
    to: MessageState,
    event: LogEvent,
    actor: &str,
    data: Option<String>,
    error: Option<String>,
) -> Result<()> {
    let before = message.state;
    state::verify_transition(before, to)?;

    message.state = to;
    if to == MessageState::Failed {
        message.error_count += 1;
    }

    store.update_message(message, actor).await?;

    let mut row = ProcessLog::for_message(message, event, actor).with_states(before, to);
    if let Some(data) = data {
        row = row.with_data(data);
    }
    if let Some(error) = error {
        row = row.with_error(error);
    }

    store.create_log_entry(row).await
}

/// Record an operator toggle of the message kill-switch.
///
/// Toggles are orthogonal to the state machine: no state changes, so the
/// row carries no before/after pair.
pub async fn record_toggle(
    store: &dyn MessageStore,
    message: &mut Message,
    disabled: bool,
    actor: &str,
) -> Result<()> {
    message.is_disabled = disabled;
    store.update_message(message, actor).await?;

    let event = if disabled {
        LogEvent::Disabled
    } else {
        LogEvent::Enabled
    };

    store
        .create_log_entry(ProcessLog::for_message(message, event, actor))
        .await
}

#[cfg(test)]
mod tests {
    use courier_common::{SYSTEM_ACTOR, message::MessageKind};
    use pretty_assertions::assert_eq;

    use crate::{MemoryStore, StoreError};

    use super::*;

    fn store_with_message() -> (MemoryStore, Message) {
        let store = MemoryStore::new();
        let message = store.add_message(Message::new(1, MessageKind::Mail, "intake"));
        (store, message)
    }

    #[tokio::test]
    async fn transition_writes_exactly_one_row_with_matching_states() {
        let (store, mut message) = store_with_message();
        message.assigned_provider = Some(9);

        record_transition(
            &store,
            &mut message,
            MessageState::Processing,
            LogEvent::Assigned,
            SYSTEM_ACTOR,
            None,
            None,
        )
        .await
        .expect("valid transition should persist");

        let stored = store.get_message(1).await.unwrap();
        assert_eq!(stored.state, MessageState::Processing);
        assert_eq!(stored.last_updated_by, SYSTEM_ACTOR);

        let logs = store.find_logs(1).await.unwrap();
        // One row from intake (Stored) plus the transition row.
        assert_eq!(logs.len(), 2);
        let row = logs.last().unwrap();
        assert_eq!(row.event, LogEvent::Assigned);
        assert_eq!(row.before_state, Some(MessageState::Pending));
        assert_eq!(row.after_state, Some(MessageState::Processing));
        assert_eq!(row.provider_type_id, Some(9));
    }

    #[tokio::test]
    async fn failing_increments_the_error_count() {
        let (store, mut message) = store_with_message();
        message.assigned_provider = Some(9);
        record_transition(
            &store,
            &mut message,
            MessageState::Processing,
            LogEvent::Assigned,
            SYSTEM_ACTOR,
            None,
            None,
        )
        .await
        .unwrap();

        record_transition(
            &store,
            &mut message,
            MessageState::Failed,
            LogEvent::Error,
            SYSTEM_ACTOR,
            None,
            Some("gateway timeout".to_string()),
        )
        .await
        .unwrap();

        let stored = store.get_message(1).await.unwrap();
        assert_eq!(stored.error_count, 1);
        let logs = store.find_logs(1).await.unwrap();
        assert_eq!(logs.last().unwrap().error.as_deref(), Some("gateway timeout"));
    }

    #[tokio::test]
    async fn invalid_edges_touch_nothing() {
        let (store, mut message) = store_with_message();
        let rows_before = store.log_count();

        let result = record_transition(
            &store,
            &mut message,
            MessageState::Sent,
            LogEvent::Sent,
            SYSTEM_ACTOR,
            None,
            None,
        )
        .await;

        assert!(matches!(result, Err(StoreError::Transition(_))));
        let stored = store.get_message(1).await.unwrap();
        assert_eq!(stored.state, MessageState::Pending);
        assert_eq!(store.log_count(), rows_before);
    }

    #[tokio::test]
    async fn toggles_record_without_states() {
        let (store, mut message) = store_with_message();

        record_toggle(&store, &mut message, true, "operator").await.unwrap();
        record_toggle(&store, &mut message, false, "operator").await.unwrap();

        let stored = store.get_message(1).await.unwrap();
        assert!(!stored.is_disabled);
        assert_eq!(stored.state, MessageState::Pending);

        let logs = store.find_logs(1).await.unwrap();
        let events: Vec<_> = logs.iter().map(|l| l.event).collect();
        assert_eq!(
            events,
            vec![LogEvent::Stored, LogEvent::Disabled, LogEvent::Enabled]
        );
        assert!(logs.iter().skip(1).all(|l| l.before_state.is_none()));
    }
}
