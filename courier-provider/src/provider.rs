//! The adapter capability contract and its factory.

use std::sync::Arc;

use async_trait::async_trait;
use courier_common::{message::Message, provider::ProviderType};
use courier_store::MessageStore;

use crate::ProviderError;

/// A delivery backend adapter.
///
/// The adapter owns the outcome of every message it is handed: it
/// transitions each one to `Sent` or `Failed` through the audit writer
/// (which appends the matching log row) before returning. The pipeline
/// never re-derives per-message outcomes from the return value; an `Err`
/// means the batch failed at the group level.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Deliver one batch of messages assigned to `provider`.
    ///
    /// # Errors
    ///
    /// Returns an error only for group-level failures. The caller logs it
    /// against the provider and moves on to the next group.
    async fn send_batch(
        &self,
        store: &dyn MessageStore,
        messages: Vec<Message>,
        provider: &ProviderType,
    ) -> Result<(), ProviderError>;
}

/// Constructs adapters from provider configuration.
pub trait ProviderFactory: Send + Sync + std::fmt::Debug {
    /// Build the adapter selected by `provider.adapter`.
    ///
    /// Returns `None` when no adapter exists for the key or construction
    /// fails; the caller records the failure against the provider and
    /// skips its group.
    fn create(&self, provider: &ProviderType) -> Option<Arc<dyn Provider>>;
}
