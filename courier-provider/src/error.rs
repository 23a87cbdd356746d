//! Error types for provider adapters.

use courier_store::StoreError;
use thiserror::Error;

/// Failures raised by adapter construction or a batch send.
///
/// Group-level failures only: a provider that rejects an individual
/// message records that on the message itself (`Failed` plus an `Error`
/// log row) and keeps going.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The adapter could not be constructed from the provider's
    /// configuration.
    #[error("Adapter construction failed: {0}")]
    Create(String),

    /// The batch send failed as a whole (connection lost, gateway down).
    #[error("Batch send failed: {0}")]
    Send(String),

    /// The adapter could not persist a transition or log row.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}
