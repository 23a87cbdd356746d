//! The retry stage: give failed messages another chance.

use courier_common::{SYSTEM_ACTOR, audit, log::LogEvent, state::MessageState};
use courier_store::{MessageStore, record_transition};

use crate::{error::DispatchError, processor::DispatchProcessor};

/// Counts from one retry stage pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct RetryOutcome {
    /// Failed messages returned to pending.
    pub reset: usize,
}

/// Return failed messages below their error budget to `Pending`.
///
/// Only the state moves: the error count keeps its lifetime total, the
/// assigned provider stays until the next assignment pass overwrites it,
/// and any delivery delay is untouched. Messages at the budget are never
/// returned by discovery and stay failed until archived.
pub async fn retry_failed(
    processor: &DispatchProcessor,
    store: &dyn MessageStore,
) -> Result<RetryOutcome, DispatchError> {
    let messages = store.find_ready_to_retry(processor.max_errors).await?;
    let mut outcome = RetryOutcome::default();

    for mut message in messages {
        let error_count = message.error_count;
        let bound = message.error_bound(processor.max_errors);

        record_transition(
            store,
            &mut message,
            MessageState::Pending,
            LogEvent::Reset,
            SYSTEM_ACTOR,
            Some(format!("error count {error_count}/{bound}")),
            None,
        )
        .await?;

        audit::log_reset(&message.public_id.to_string(), error_count);
        outcome.reset += 1;
    }

    Ok(outcome)
}
