//! The archive stage: reclaim storage for resolved messages.

use chrono::Utc;
use courier_common::{SYSTEM_ACTOR, audit};
use courier_store::MessageStore;

use crate::{error::DispatchError, processor::DispatchProcessor};

/// Counts from one archive pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArchiveOutcome {
    /// Messages hard-deleted together with their dependent rows.
    pub archived: usize,
}

/// Delete terminal messages whose retention window has passed.
///
/// Each deletion removes the message and all dependent rows (properties,
/// log rows) as one logical operation. This is irreversible, so the stage
/// refuses to run against a non-positive retention window: that
/// configuration would reclaim live traffic.
pub async fn archive_expired(
    processor: &DispatchProcessor,
    store: &dyn MessageStore,
) -> Result<ArchiveOutcome, DispatchError> {
    if processor.max_days_to_live <= 0 {
        return Err(DispatchError::InvalidRetention(processor.max_days_to_live));
    }

    let messages = store
        .find_ready_to_archive(processor.max_days_to_live)
        .await?;
    let mut outcome = ArchiveOutcome::default();

    for message in messages {
        let age_days = (Utc::now() - message.last_updated_at).num_days();

        store.delete_message(&message, SYSTEM_ACTOR).await?;

        audit::log_archived(&message.public_id.to_string(), age_days);
        outcome.archived += 1;
    }

    Ok(outcome)
}
