//! Error types for store operations.

use courier_common::state::InvalidTransition;
use thiserror::Error;

/// Top-level store error type.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Message not found in the store.
    #[error("Message not found: {0}")]
    NotFound(i64),

    /// A state edge outside the transition table was requested.
    #[error("Rejected transition: {0}")]
    Transition(#[from] InvalidTransition),

    /// The backing store rejected or failed the operation.
    #[error("Store backend error: {0}")]
    Backend(String),

    /// Internal error (lock poisoning, etc.).
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Specialized `Result` type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

// Convenience conversion for lock poisoning
impl<T> From<std::sync::PoisonError<T>> for StoreError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        Self::Internal(format!("Lock poisoned: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use courier_common::state::MessageState;

    use super::*;

    #[test]
    fn test_transition_error_conversion() {
        let err = courier_common::state::verify_transition(MessageState::Sent, MessageState::Pending)
            .unwrap_err();
        let store_err: StoreError = err.into();

        assert!(matches!(store_err, StoreError::Transition(_)));
        assert!(store_err.to_string().contains("sent -> pending"));
    }
}
