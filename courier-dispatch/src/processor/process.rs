//! The process stage: discover, assign, group, dispatch.

use std::{collections::HashMap, time::Duration};

use courier_common::{
    SYSTEM_ACTOR, audit,
    log::{LogEvent, ProcessLog},
    message::Message,
    provider::ProviderType,
    state::MessageState,
};
use courier_provider::ProviderFactory;
use courier_store::{MessageStore, record_transition};
use tracing::warn;

use crate::{assignment, error::DispatchError, processor::DispatchProcessor};

/// Counts from one process stage pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessOutcome {
    /// Eligible messages discovery returned.
    pub discovered: usize,
    /// Pending messages that received a provider this pass.
    pub assigned: usize,
    /// Provider groups handed to an adapter.
    pub groups_dispatched: usize,
    /// Provider groups skipped because no adapter could be built or the
    /// adapter call failed.
    pub groups_failed: usize,
    /// Discovery found nothing; the stage slept out the idle delay.
    pub idled: bool,
}

/// One full pass moving messages from `Pending` toward `Sent`/`Failed`.
///
/// Fatal conditions (no enabled providers, no capable provider for a
/// message class, store failure) abort the pass; group-level adapter
/// failures are logged against their provider and never touch the other
/// groups.
pub async fn process_messages(
    processor: &DispatchProcessor,
    store: &dyn MessageStore,
    factory: &dyn ProviderFactory,
) -> Result<ProcessOutcome, DispatchError> {
    let mut messages = store.find_ready_to_process().await?;

    if messages.is_empty() {
        // Backpressure: nothing eligible, wait out the idle delay instead
        // of re-querying immediately.
        tokio::time::sleep(Duration::from_secs(processor.idle_delay_secs)).await;
        return Ok(ProcessOutcome {
            idled: true,
            ..Default::default()
        });
    }

    let mut providers = store.find_enabled_providers().await?;
    if providers.is_empty() {
        return Err(DispatchError::NoEnabledProviders);
    }
    providers.sort_by(|a, b| a.priority.cmp(&b.priority).then_with(|| a.name.cmp(&b.name)));

    let mut outcome = ProcessOutcome {
        discovered: messages.len(),
        ..Default::default()
    };

    // Assignment pass: every pending message gets the best capable
    // provider. A message reset by the retry stage arrives here still
    // pending and is assigned afresh, overwriting its previous provider.
    // An assignment failure is a configuration problem, not this
    // message's: abort the rest of the stage without touching its error
    // count.
    for message in &mut messages {
        if message.state != MessageState::Pending {
            continue;
        }

        let provider = assignment::assign(message.kind, &providers)?;
        message.assigned_provider = Some(provider.id);

        record_transition(
            store,
            message,
            MessageState::Processing,
            LogEvent::Assigned,
            SYSTEM_ACTOR,
            Some(format!("assigned to {}", provider.name)),
            None,
        )
        .await?;

        audit::log_assigned(
            &message.public_id.to_string(),
            &provider.name,
            provider.priority,
        );

        outcome.assigned += 1;
    }

    // Partition the active messages into provider groups
    let mut by_provider: HashMap<i64, Vec<Message>> = HashMap::new();
    for message in messages.into_iter().filter(|m| m.state.is_active()) {
        match message.assigned_provider {
            Some(provider_id) => by_provider.entry(provider_id).or_default().push(message),
            None => {
                // Unreachable while the store honors the discovery
                // contract; dropped from the pass rather than guessed at.
                warn!(id = message.id, "Processing message without a provider");
            }
        }
    }

    // Visit groups in ascending provider priority so a slow low-priority
    // adapter can never starve a higher-priority one within the tick.
    for provider in &providers {
        let Some(batch) = by_provider.remove(&provider.id) else {
            continue;
        };

        dispatch_group(store, factory, provider, batch, &mut outcome).await?;
    }

    // Whatever is left references providers that are no longer enabled
    // (disabled or removed mid-flight). Those groups are skipped like any
    // other group failure; discovery returns the messages next tick.
    for (provider_id, batch) in by_provider {
        store
            .create_log_entry(
                ProcessLog::for_provider(provider_id, LogEvent::Error, SYSTEM_ACTOR)
                    .with_data(format!("{} messages held", batch.len()))
                    .with_error("assigned provider is not enabled".to_string()),
            )
            .await?;

        warn!(
            provider_id,
            count = batch.len(),
            "Skipping group for provider that is no longer enabled"
        );
        outcome.groups_failed += 1;
    }

    Ok(outcome)
}

/// Hand one provider group to its adapter.
///
/// Factory and adapter failures stay inside the group: they are recorded
/// against the provider and the pass carries on with the next group.
async fn dispatch_group(
    store: &dyn MessageStore,
    factory: &dyn ProviderFactory,
    provider: &ProviderType,
    mut batch: Vec<Message>,
    outcome: &mut ProcessOutcome,
) -> Result<(), DispatchError> {
    // Deterministic order within the group: message priority first,
    // discovery order for equal priorities (stable sort).
    batch.sort_by_key(|m| m.priority);
    let count = batch.len();

    let Some(adapter) = factory.create(provider) else {
        store
            .create_log_entry(
                ProcessLog::for_provider(provider.id, LogEvent::Error, SYSTEM_ACTOR)
                    .with_data(format!("{count} messages held"))
                    .with_error(format!("no adapter for key '{}'", provider.adapter)),
            )
            .await?;

        audit::log_batch_failed(&provider.name, count, "adapter instantiation failed");
        outcome.groups_failed += 1;
        return Ok(());
    };

    match adapter.send_batch(store, batch, provider).await {
        Ok(()) => {
            audit::log_batch_dispatched(&provider.name, count);
            outcome.groups_dispatched += 1;
        }
        Err(e) => {
            store
                .create_log_entry(
                    ProcessLog::for_provider(provider.id, LogEvent::Error, SYSTEM_ACTOR)
                        .with_data(format!("{count} messages in batch"))
                        .with_error(e.to_string()),
                )
                .await?;

            audit::log_batch_failed(&provider.name, count, &e.to_string());
            outcome.groups_failed += 1;
        }
    }

    Ok(())
}
