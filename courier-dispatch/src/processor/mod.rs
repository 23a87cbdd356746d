//! Dispatch processor orchestration

pub mod archive;
pub mod process;
pub mod retry;

use std::{sync::Arc, time::Duration};

use courier_common::{Signal, internal};
use courier_provider::ProviderFactory;
use courier_store::MessageStore;
use serde::Deserialize;
use tracing::{debug, error, info};

use crate::error::DispatchError;

pub use archive::ArchiveOutcome;
pub use process::ProcessOutcome;
pub use retry::RetryOutcome;

const fn default_tick_interval() -> u64 {
    15
}

const fn default_idle_delay() -> u64 {
    5
}

const fn default_max_errors() -> u32 {
    3
}

const fn default_max_days_to_live() -> i64 {
    30
}

const fn default_archive_interval() -> u64 {
    86400 // daily
}

/// Processor driving the dispatch pipeline against the backing store
///
/// Runs continuously once served: the process and retry stages execute on
/// every tick, the archive stage on its own coarser cadence. One processor
/// instance per store: the pipeline is a single cooperative worker and
/// does not coordinate with other writers.
#[derive(Debug, Deserialize)]
pub struct DispatchProcessor {
    /// How often to run a pipeline tick (process + retry), in seconds
    #[serde(default = "default_tick_interval")]
    pub tick_interval_secs: u64,

    /// How long the process stage idles when discovery finds no work (in
    /// seconds)
    ///
    /// This is the backpressure mechanism: with nothing eligible the stage
    /// sleeps instead of hammering the store with discovery queries.
    #[serde(default = "default_idle_delay")]
    pub idle_delay_secs: u64,

    /// Error budget for messages without a per-message bound
    ///
    /// A failed message is retried until its error count reaches the
    /// budget; after that it only leaves the store through archival.
    ///
    /// Default: 3
    #[serde(default = "default_max_errors")]
    pub max_errors: u32,

    /// Retention window in days for terminal messages
    ///
    /// Messages sent, exhausted, or disabled for longer than this are
    /// hard-deleted by the archive stage. Must be positive; the archive
    /// stage refuses to run otherwise.
    ///
    /// Default: 30 days
    #[serde(default = "default_max_days_to_live")]
    pub max_days_to_live: i64,

    /// How often to run the archive stage (in seconds)
    ///
    /// Default: 86400 (daily)
    #[serde(default = "default_archive_interval")]
    pub archive_interval_secs: u64,

    /// The backing store (initialized in `init()`)
    #[serde(skip)]
    pub store: Option<Arc<dyn MessageStore>>,

    /// The adapter factory (initialized in `init()`)
    #[serde(skip)]
    pub factory: Option<Arc<dyn ProviderFactory>>,
}

impl Default for DispatchProcessor {
    fn default() -> Self {
        Self {
            tick_interval_secs: default_tick_interval(),
            idle_delay_secs: default_idle_delay(),
            max_errors: default_max_errors(),
            max_days_to_live: default_max_days_to_live(),
            archive_interval_secs: default_archive_interval(),
            store: None,
            factory: None,
        }
    }
}

/// Counts from one pipeline tick.
#[derive(Debug, Clone, Copy, Default)]
pub struct TickOutcome {
    pub process: ProcessOutcome,
    pub retry: RetryOutcome,
}

impl TickOutcome {
    /// Check whether the tick found nothing at all to do.
    #[must_use]
    pub const fn is_idle(&self) -> bool {
        self.process.idled && self.retry.reset == 0
    }
}

impl DispatchProcessor {
    /// Initialize the dispatch processor
    ///
    /// # Errors
    ///
    /// Returns an error if the configured retention window is not positive.
    pub fn init(
        &mut self,
        store: Arc<dyn MessageStore>,
        factory: Arc<dyn ProviderFactory>,
    ) -> Result<(), DispatchError> {
        internal!("Initialising Dispatch Processor ...");

        if self.max_days_to_live <= 0 {
            return Err(DispatchError::InvalidRetention(self.max_days_to_live));
        }

        self.store = Some(store);
        self.factory = Some(factory);

        Ok(())
    }

    fn collaborators(
        &self,
    ) -> Result<(&Arc<dyn MessageStore>, &Arc<dyn ProviderFactory>), DispatchError> {
        let store = self.store.as_ref().ok_or_else(|| {
            DispatchError::NotInitialized("no store. Call init() first.".to_string())
        })?;
        let factory = self.factory.as_ref().ok_or_else(|| {
            DispatchError::NotInitialized("no adapter factory. Call init() first.".to_string())
        })?;

        Ok((store, factory))
    }

    /// Run one pipeline tick: the process stage, then the retry stage.
    ///
    /// # Errors
    ///
    /// Stage errors surface wrapped with the stage's name; the caller
    /// decides whether to retry at the next scheduled tick. This method
    /// never self-retries.
    pub async fn tick(&self) -> Result<TickOutcome, DispatchError> {
        let (store, factory) = self.collaborators()?;

        let process = process::process_messages(self, store.as_ref(), factory.as_ref())
            .await
            .map_err(|e| e.in_stage("process"))?;

        let retry = retry::retry_failed(self, store.as_ref())
            .await
            .map_err(|e| e.in_stage("retry"))?;

        Ok(TickOutcome { process, retry })
    }

    /// Run one archive pass.
    ///
    /// # Errors
    ///
    /// Surfaces stage errors wrapped with the stage's name; refuses to run
    /// against a non-positive retention window.
    pub async fn run_archive(&self) -> Result<ArchiveOutcome, DispatchError> {
        let (store, _) = self.collaborators()?;

        archive::archive_expired(self, store.as_ref())
            .await
            .map_err(|e| e.in_stage("archive"))
    }

    /// Run the dispatch processor
    ///
    /// This method runs continuously until a shutdown signal is received,
    /// executing pipeline ticks and archive passes on their intervals. A
    /// tick in flight always runs to completion before shutdown is acted
    /// on, so no message is abandoned mid-transition.
    ///
    /// Stage failures are logged and left for the next scheduled
    /// invocation; the processor never retries a failed tick early.
    ///
    /// # Errors
    ///
    /// Returns an error if the processor was not initialized.
    pub async fn serve(
        &self,
        mut shutdown: tokio::sync::broadcast::Receiver<Signal>,
    ) -> Result<(), DispatchError> {
        internal!("Dispatch processor starting");

        // Fail fast before entering the loop
        self.collaborators()?;

        let mut tick_timer = tokio::time::interval(Duration::from_secs(self.tick_interval_secs));
        let mut archive_timer =
            tokio::time::interval(Duration::from_secs(self.archive_interval_secs));

        // Skip the first tick to avoid immediate execution
        tick_timer.tick().await;
        archive_timer.tick().await;

        loop {
            tokio::select! {
                _ = tick_timer.tick() => {
                    match self.tick().await {
                        Ok(outcome) if outcome.is_idle() => {
                            debug!("Pipeline tick found no work");
                        }
                        Ok(outcome) => {
                            info!(
                                discovered = outcome.process.discovered,
                                assigned = outcome.process.assigned,
                                groups_dispatched = outcome.process.groups_dispatched,
                                groups_failed = outcome.process.groups_failed,
                                reset = outcome.retry.reset,
                                "Pipeline tick complete"
                            );
                        }
                        Err(e) if e.is_configuration() => {
                            error!(error = %e, "Pipeline halted by configuration error; operator attention required");
                        }
                        Err(e) => {
                            error!(error = %e, "Pipeline tick failed; next scheduled tick will retry");
                        }
                    }
                }
                _ = archive_timer.tick() => {
                    match self.run_archive().await {
                        Ok(outcome) if outcome.archived > 0 => {
                            info!(archived = outcome.archived, "Archive pass complete");
                        }
                        Ok(_) => {
                            debug!("Archive pass found nothing to reclaim");
                        }
                        Err(e) => {
                            error!(error = %e, "Archive pass failed");
                        }
                    }
                }
                sig = shutdown.recv() => {
                    match sig {
                        Ok(Signal::Shutdown | Signal::Finalised) => {
                            internal!("Dispatch processor received shutdown signal");
                            break;
                        }
                        Err(e) => {
                            error!("Dispatch processor shutdown channel error: {e}");
                            break;
                        }
                    }
                }
            }
        }

        internal!("Dispatch processor shutdown complete");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let processor = DispatchProcessor::default();

        assert_eq!(processor.tick_interval_secs, 15);
        assert_eq!(processor.idle_delay_secs, 5);
        assert_eq!(processor.max_errors, 3);
        assert_eq!(processor.max_days_to_live, 30);
        assert_eq!(processor.archive_interval_secs, 86400);
    }

    #[test]
    fn test_init_rejects_non_positive_retention() {
        let mut processor = DispatchProcessor {
            max_days_to_live: 0,
            ..Default::default()
        };

        let store = Arc::new(courier_store::MemoryStore::new());
        let factory = Arc::new(courier_provider::FactoryRegistry::new());

        assert!(matches!(
            processor.init(store, factory),
            Err(DispatchError::InvalidRetention(0))
        ));
    }

    #[tokio::test]
    async fn test_tick_requires_init() {
        let processor = DispatchProcessor::default();

        assert!(matches!(
            processor.tick().await,
            Err(DispatchError::NotInitialized(_))
        ));
    }
}
