//! Service trait abstraction for status queries
//!
//! Control interfaces and notification channels look messages up by their
//! external key, never the storage id. This trait keeps them decoupled
//! from the store so they can be handed a mock in tests.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use courier_common::{
    log::ProcessLog,
    message::{Message, MessageKind},
    state::MessageState,
};
use courier_store::{MessageStore, Result};
use serde::Serialize;
use uuid::Uuid;

/// Snapshot of one message's progress, keyed by the external id.
#[derive(Debug, Clone, Serialize)]
pub struct MessageStatus {
    pub public_id: Uuid,
    pub kind: MessageKind,
    pub state: MessageState,
    pub is_disabled: bool,
    pub error_count: u32,
    pub assigned_provider: Option<i64>,
    pub last_updated_at: DateTime<Utc>,
}

impl From<&Message> for MessageStatus {
    fn from(message: &Message) -> Self {
        Self {
            public_id: message.public_id,
            kind: message.kind,
            state: message.state,
            is_disabled: message.is_disabled,
            error_count: message.error_count,
            assigned_provider: message.assigned_provider,
            last_updated_at: message.last_updated_at,
        }
    }
}

/// Service trait for querying dispatch state by external key
#[async_trait]
pub trait DispatchQueryService: Send + Sync {
    /// Current status of a message, or `None` if the key is unknown
    /// (never stored, or already archived).
    async fn message_status(&self, public_id: Uuid) -> Result<Option<MessageStatus>>;

    /// The message's process log trail, oldest first. Empty for unknown
    /// keys.
    async fn log_trail(&self, public_id: Uuid) -> Result<Vec<ProcessLog>>;
}

/// Store-backed implementation of the query service.
#[derive(Debug, Clone)]
pub struct StoreQueryService {
    store: Arc<dyn MessageStore>,
}

impl StoreQueryService {
    #[must_use]
    pub fn new(store: Arc<dyn MessageStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl DispatchQueryService for StoreQueryService {
    async fn message_status(&self, public_id: Uuid) -> Result<Option<MessageStatus>> {
        Ok(self
            .store
            .find_by_public_id(public_id)
            .await?
            .as_ref()
            .map(MessageStatus::from))
    }

    async fn log_trail(&self, public_id: Uuid) -> Result<Vec<ProcessLog>> {
        match self.store.find_by_public_id(public_id).await? {
            Some(message) => self.store.find_logs(message.id).await,
            None => Ok(Vec::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use courier_common::log::LogEvent;
    use courier_store::MemoryStore;

    use super::*;

    #[tokio::test]
    async fn status_is_keyed_by_the_external_id() {
        let store = Arc::new(MemoryStore::new());
        let message = store.add_message(Message::new(1, MessageKind::Mail, "intake"));

        let service = StoreQueryService::new(store);

        let status = service
            .message_status(message.public_id)
            .await
            .unwrap()
            .expect("known key should resolve");
        assert_eq!(status.state, MessageState::Pending);
        assert_eq!(status.error_count, 0);

        assert!(
            service
                .message_status(Uuid::new_v4())
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn log_trail_follows_the_same_key() {
        let store = Arc::new(MemoryStore::new());
        let message = store.add_message(Message::new(1, MessageKind::Text, "intake"));

        let service = StoreQueryService::new(store);

        let trail = service.log_trail(message.public_id).await.unwrap();
        assert_eq!(trail.len(), 1);
        assert_eq!(trail[0].event, LogEvent::Stored);

        assert!(service.log_trail(Uuid::new_v4()).await.unwrap().is_empty());
    }
}
