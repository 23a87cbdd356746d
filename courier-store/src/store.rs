//! The query and command surface the pipeline consumes.

use async_trait::async_trait;
use courier_common::{log::ProcessLog, message::Message, provider::ProviderType};
use uuid::Uuid;

use crate::Result;

/// Backing store for messages, providers, and process log rows.
///
/// The pipeline assumes a single active worker per store: no locking,
/// leases, or optimistic-concurrency retries are layered on top of this
/// trait, and running two orchestrators against the same store is a
/// deployment error, not a case implementations defend against.
#[async_trait]
pub trait MessageStore: Send + Sync + std::fmt::Debug {
    /// Messages eligible for the process stage right now: enabled, in
    /// `Pending` or `Processing`, with `process_after` unset or in the
    /// past. Stable discovery order.
    async fn find_ready_to_process(&self) -> Result<Vec<Message>>;

    /// Failed messages still below their error budget, independent of the
    /// disabled flag. `default_max_errors` applies to messages without a
    /// per-message budget.
    async fn find_ready_to_retry(&self, default_max_errors: u32) -> Result<Vec<Message>>;

    /// Messages in a terminal condition (sent, failed with the budget
    /// spent, or disabled) whose last update is older than
    /// `max_days_to_live` days.
    async fn find_ready_to_archive(&self, max_days_to_live: i64) -> Result<Vec<Message>>;

    /// The enabled provider set, in deterministic order.
    async fn find_enabled_providers(&self) -> Result<Vec<ProviderType>>;

    /// Look up a message by storage id.
    ///
    /// # Errors
    /// Returns [`StoreError::NotFound`](crate::StoreError::NotFound) if
    /// the message does not exist.
    async fn get_message(&self, id: i64) -> Result<Message>;

    /// Look up a message by its immutable external key.
    async fn find_by_public_id(&self, public_id: Uuid) -> Result<Option<Message>>;

    /// Persist a message. Implementations stamp `last_updated_by` and
    /// `last_updated_at` from `actor`.
    async fn update_message(&self, message: &Message, actor: &str) -> Result<()>;

    /// Hard-delete a message and every dependent row (properties, log
    /// rows) as one logical operation.
    async fn delete_message(&self, message: &Message, actor: &str) -> Result<()>;

    /// Append one immutable process log row.
    async fn create_log_entry(&self, entry: ProcessLog) -> Result<()>;

    /// The log trail for one message, in insertion order.
    async fn find_logs(&self, message_id: i64) -> Result<Vec<ProcessLog>>;
}
