use std::sync::{Arc, LazyLock};

use courier_common::{Signal, audit::AuditConfig, internal, logging, provider::ProviderType};
use courier_dispatch::DispatchProcessor;
use courier_provider::{BlackholeProvider, FactoryRegistry};
use courier_store::{MemoryStore, MessageStore};
use serde::Deserialize;
use tokio::sync::broadcast;

/// Backing store selection.
///
/// Only the transient in-memory store ships in this repository; deployments
/// with durable storage register their own `MessageStore` implementation
/// here as a new variant.
#[derive(Debug, Default, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreConfig {
    #[default]
    Memory,
}

#[derive(Default, Deserialize)]
pub struct Courier {
    #[serde(alias = "pipeline")]
    pub dispatch: DispatchProcessor,
    #[serde(default)]
    pub store: StoreConfig,
    /// Provider rows seeded into the store at startup. With a durable
    /// store these live in the database and this list stays empty.
    #[serde(default, alias = "provider")]
    pub providers: Vec<ProviderType>,
    #[serde(default)]
    pub audit: AuditConfig,
}

pub static SHUTDOWN_BROADCAST: LazyLock<broadcast::Sender<Signal>> = LazyLock::new(|| {
    let (sender, _receiver) = broadcast::channel(64);
    sender
});

async fn shutdown() -> anyhow::Result<()> {
    let mut terminate = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            internal!("CTRL+C entered -- Enter it again to force shutdown");
        }
        _ = terminate.recv() => {
            internal!("Terminate Signal received, shutting down");
        }
    };

    let mut receiver = SHUTDOWN_BROADCAST.subscribe();

    SHUTDOWN_BROADCAST
        .send(Signal::Shutdown)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Interrupted, e.to_string()))?;

    loop {
        tokio::select! {
            sig = receiver.recv() => {
                match sig {
                    Ok(s) => tracing::debug!("Received {s:?}"),
                    Err(broadcast::error::RecvError::Closed) => break,
                    Err(e) => tracing::debug!("Received: {e:?}"),
                }
            }

            _ = tokio::signal::ctrl_c() => {
                break;
            }
        }
    }

    Ok(())
}

impl Courier {
    /// Wire the store, adapter registry, and dispatch processor.
    ///
    /// Separated from [`run`](Self::run) so tests can drive pipeline ticks
    /// directly after wiring.
    ///
    /// # Errors
    ///
    /// Returns an error if the dispatch configuration is invalid.
    pub fn init(&mut self) -> anyhow::Result<()> {
        courier_common::audit::init(self.audit.clone());

        let store: Arc<dyn MessageStore> = match self.store {
            StoreConfig::Memory => {
                let store =
                    MemoryStore::new().with_default_max_errors(self.dispatch.max_errors);
                for provider in self.providers.drain(..) {
                    store.add_provider(provider);
                }
                Arc::new(store)
            }
        };

        let registry = FactoryRegistry::new();
        registry.register(BlackholeProvider::ADAPTER, BlackholeProvider::constructor);

        self.dispatch.init(store, Arc::new(registry))?;

        Ok(())
    }

    /// Run this controller, and everything it controls
    ///
    /// # Errors
    ///
    /// This function will return an error if the pipeline fails to
    /// initialise or exits with a stage failure.
    pub async fn run(mut self) -> anyhow::Result<()> {
        logging::init();
        self.init()?;

        internal!("Controller running");

        let ret = tokio::select! {
            r = self.dispatch.serve(SHUTDOWN_BROADCAST.subscribe()) => {
                r.map_err(Into::into)
            }
            r = shutdown() => {
                r
            }
        };

        internal!("Shutting down...");

        ret
    }
}
