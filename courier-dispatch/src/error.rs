//! Typed error handling for the dispatch pipeline.
//!
//! The taxonomy the stages work with:
//! - Configuration failures (no capable provider, invalid retention) abort
//!   the current stage and need an operator; retrying them faster than the
//!   tick cadence cannot help.
//! - Store failures are fatal for the tick and surface wrapped in stage
//!   context.
//! - Group-level adapter failures are *not* errors at this level: the
//!   process stage logs them against the provider and keeps going.
//! - Per-message failures never surface here at all; they live on the
//!   message as `Failed` plus an `Error` log row.

use courier_store::StoreError;
use thiserror::Error;

use crate::assignment::AssignmentError;

/// Top-level dispatch error type.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The store has no enabled providers at all.
    #[error("No enabled providers are configured")]
    NoEnabledProviders,

    /// No enabled provider is capable of a message class.
    #[error(transparent)]
    Assignment(#[from] AssignmentError),

    /// The archive stage refuses non-positive retention windows.
    #[error("Refusing to archive with non-positive retention: max_days_to_live = {0}")]
    InvalidRetention(i64),

    /// Dispatch processor not initialized.
    #[error("Dispatch processor not initialized: {0}")]
    NotInitialized(String),

    /// The backing store failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// A stage failure, wrapped with the stage's name for the host.
    #[error("{stage} stage failed: {source}")]
    Stage {
        stage: &'static str,
        #[source]
        source: Box<DispatchError>,
    },
}

impl DispatchError {
    /// Wrap this error with the name of the stage it escaped from.
    /// Already-wrapped errors keep their original stage.
    #[must_use]
    pub fn in_stage(self, stage: &'static str) -> Self {
        match self {
            wrapped @ Self::Stage { .. } => wrapped,
            source => Self::Stage {
                stage,
                source: Box::new(source),
            },
        }
    }

    /// Returns `true` for configuration problems that need operator
    /// attention rather than another attempt.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        match self {
            Self::NoEnabledProviders
            | Self::Assignment(_)
            | Self::InvalidRetention(_)
            | Self::NotInitialized(_) => true,
            Self::Store(_) => false,
            Self::Stage { source, .. } => source.is_configuration(),
        }
    }
}

#[cfg(test)]
mod tests {
    use courier_common::message::MessageKind;

    use super::*;

    #[test]
    fn test_stage_wrapping() {
        let err = DispatchError::NoEnabledProviders.in_stage("process");
        assert_eq!(
            err.to_string(),
            "process stage failed: No enabled providers are configured"
        );

        // Re-wrapping keeps the original stage
        let err = err.in_stage("retry");
        assert!(err.to_string().starts_with("process stage failed"));
    }

    #[test]
    fn test_configuration_classification() {
        assert!(DispatchError::NoEnabledProviders.is_configuration());
        assert!(
            DispatchError::Assignment(AssignmentError {
                kind: MessageKind::Text
            })
            .is_configuration()
        );
        assert!(DispatchError::InvalidRetention(0).is_configuration());
        assert!(
            !DispatchError::Store(StoreError::NotFound(1)).is_configuration()
        );

        // Classification looks through stage wrapping
        assert!(
            DispatchError::NoEnabledProviders
                .in_stage("process")
                .is_configuration()
        );
        assert!(
            !DispatchError::Store(StoreError::NotFound(1))
                .in_stage("process")
                .is_configuration()
        );
    }
}
