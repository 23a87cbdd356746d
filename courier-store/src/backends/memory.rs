//! In-memory backing store implementation.

use std::{
    collections::HashMap,
    sync::RwLock,
};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use courier_common::{
    log::{LogEvent, ProcessLog},
    message::Message,
    provider::ProviderType,
    state::MessageState,
};
use uuid::Uuid;

use crate::{MessageStore, Result, StoreError};

const fn default_max_errors() -> u32 {
    3
}

/// In-memory store implementation
///
/// Messages, providers, and log rows live in `RwLock`-protected maps. This
/// backend is primarily intended for tests, but also serves transient
/// single-process deployments where durability is not required.
///
/// # Concurrency
/// Uses `RwLock` for interior mutability under the crate's single-writer
/// assumption. Production workloads should use a database-backed store.
#[derive(Debug)]
pub struct MemoryStore {
    messages: RwLock<HashMap<i64, Message>>,
    providers: RwLock<Vec<ProviderType>>,
    logs: RwLock<Vec<ProcessLog>>,
    /// Error budget applied to messages without a per-message bound when
    /// deciding whether a failed message is terminal for archival.
    default_max_errors: u32,
}

impl MemoryStore {
    /// Create a new empty store
    #[must_use]
    pub fn new() -> Self {
        Self {
            messages: RwLock::new(HashMap::new()),
            providers: RwLock::new(Vec::new()),
            logs: RwLock::new(Vec::new()),
            default_max_errors: default_max_errors(),
        }
    }

    /// Override the default error budget used by the archive query
    #[must_use]
    pub const fn with_default_max_errors(mut self, default_max_errors: u32) -> Self {
        self.default_max_errors = default_max_errors;
        self
    }

    /// Seed a message, as the intake API would: the message is stored
    /// verbatim and a `Stored` log row is appended.
    ///
    /// Returns the stored copy.
    pub fn add_message(&self, message: Message) -> Message {
        let mut row = ProcessLog::for_message(&message, LogEvent::Stored, &message.created_by);
        row.after_state = Some(message.state);

        self.logs
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(row);
        self.messages
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .insert(message.id, message.clone());

        message
    }

    /// Seed a provider.
    pub fn add_provider(&self, provider: ProviderType) {
        self.providers
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(provider);
    }

    /// Get the current number of messages in the store
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .len()
    }

    /// Check if the store is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total number of log rows across all messages and providers
    #[must_use]
    pub fn log_count(&self) -> usize {
        self.logs
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .len()
    }

    /// Every log row in insertion order, including provider-level rows
    /// that `find_logs` cannot reach.
    #[must_use]
    pub fn all_logs(&self) -> Vec<ProcessLog> {
        self.logs
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MessageStore for MemoryStore {
    async fn find_ready_to_process(&self) -> Result<Vec<Message>> {
        let now = Utc::now();

        let mut ready: Vec<_> = self
            .messages
            .read()?
            .values()
            .filter(|m| {
                !m.is_disabled
                    && matches!(m.state, MessageState::Pending | MessageState::Processing)
                    && m.process_after.is_none_or(|after| after <= now)
            })
            .cloned()
            .collect();

        // Stable discovery order
        ready.sort_by_key(|m| m.id);

        Ok(ready)
    }

    async fn find_ready_to_retry(&self, default_max_errors: u32) -> Result<Vec<Message>> {
        let mut ready: Vec<_> = self
            .messages
            .read()?
            .values()
            .filter(|m| {
                m.state == MessageState::Failed
                    && m.error_count < m.error_bound(default_max_errors)
            })
            .cloned()
            .collect();

        ready.sort_by_key(|m| m.id);

        Ok(ready)
    }

    async fn find_ready_to_archive(&self, max_days_to_live: i64) -> Result<Vec<Message>> {
        let cutoff = Utc::now() - Duration::days(max_days_to_live);

        let mut ready: Vec<_> = self
            .messages
            .read()?
            .values()
            .filter(|m| {
                (m.is_terminal(self.default_max_errors) || m.is_disabled)
                    && m.last_updated_at < cutoff
            })
            .cloned()
            .collect();

        ready.sort_by_key(|m| m.id);

        Ok(ready)
    }

    async fn find_enabled_providers(&self) -> Result<Vec<ProviderType>> {
        let mut enabled: Vec<_> = self
            .providers
            .read()?
            .iter()
            .filter(|p| !p.is_disabled)
            .cloned()
            .collect();

        enabled.sort_by(|a, b| a.priority.cmp(&b.priority).then_with(|| a.name.cmp(&b.name)));

        Ok(enabled)
    }

    async fn get_message(&self, id: i64) -> Result<Message> {
        self.messages
            .read()?
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    async fn find_by_public_id(&self, public_id: Uuid) -> Result<Option<Message>> {
        Ok(self
            .messages
            .read()?
            .values()
            .find(|m| m.public_id == public_id)
            .cloned())
    }

    async fn update_message(&self, message: &Message, actor: &str) -> Result<()> {
        let mut messages = self.messages.write()?;

        if !messages.contains_key(&message.id) {
            return Err(StoreError::NotFound(message.id));
        }

        let mut stored = message.clone();
        stored.last_updated_by = actor.to_string();
        stored.last_updated_at = Utc::now();
        messages.insert(stored.id, stored);

        Ok(())
    }

    async fn delete_message(&self, message: &Message, actor: &str) -> Result<()> {
        self.messages
            .write()?
            .remove(&message.id)
            .ok_or(StoreError::NotFound(message.id))?;

        // Cascade: dependent log rows leave with the message
        self.logs
            .write()?
            .retain(|row| row.message_id != Some(message.id));

        tracing::debug!(id = message.id, actor, "Deleted message and dependent rows");

        Ok(())
    }

    async fn create_log_entry(&self, entry: ProcessLog) -> Result<()> {
        self.logs.write()?.push(entry);
        Ok(())
    }

    async fn find_logs(&self, message_id: i64) -> Result<Vec<ProcessLog>> {
        Ok(self
            .logs
            .read()?
            .iter()
            .filter(|row| row.message_id == Some(message_id))
            .cloned()
            .collect())
    }
}
