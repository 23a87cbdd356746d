//! An adapter that accepts everything and delivers nothing.
//!
//! Useful for tests and local smoke runs: every message in the batch is
//! marked `Sent` with a log row, exactly the way a real adapter reports
//! success, but nothing leaves the process.

use std::sync::Arc;

use async_trait::async_trait;
use courier_common::{
    SYSTEM_ACTOR, audit,
    log::LogEvent,
    message::Message,
    provider::ProviderType,
    state::MessageState,
};
use courier_store::{MessageStore, record_transition};
use tracing::debug;

use crate::{Provider, ProviderError};

pub struct BlackholeProvider;

impl BlackholeProvider {
    /// Adapter key providers use to select this implementation.
    pub const ADAPTER: &'static str = "blackhole";

    /// Constructor for `FactoryRegistry::register`.
    ///
    /// # Errors
    ///
    /// Never fails; the blackhole needs no configuration.
    pub fn constructor(_provider: &ProviderType) -> Result<Arc<dyn Provider>, ProviderError> {
        Ok(Arc::new(Self))
    }
}

#[async_trait]
impl Provider for BlackholeProvider {
    async fn send_batch(
        &self,
        store: &dyn MessageStore,
        messages: Vec<Message>,
        provider: &ProviderType,
    ) -> Result<(), ProviderError> {
        let config = audit::config();

        for mut message in messages {
            let destination = message
                .property("to")
                .map(|to| audit::redact_destination(to, config.redact_destinations));

            record_transition(
                store,
                &mut message,
                MessageState::Sent,
                LogEvent::Sent,
                SYSTEM_ACTOR,
                Some(format!("accepted by {}", provider.name)),
                None,
            )
            .await?;

            debug!(
                id = message.id,
                destination = ?destination,
                "Blackhole accepted message"
            );
        }

        Ok(())
    }
}
