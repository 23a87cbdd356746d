//! Provider adapter interface for the courier pipeline
//!
//! Delivery backends are consumed through two seams:
//! - `Provider`: the capability contract, delivering one batch and owning
//!   the per-message Sent/Failed transitions and their log rows
//! - `ProviderFactory`: construct an adapter for a `ProviderType` by its
//!   adapter key
//!
//! `FactoryRegistry` is the default factory: adapter constructors register
//! under their key and get selected by configuration. The `Blackhole`
//! adapter accepts everything and exists for tests and smoke runs.

mod blackhole;
mod error;
mod provider;
mod registry;

pub use blackhole::BlackholeProvider;
pub use error::ProviderError;
pub use provider::{Provider, ProviderFactory};
pub use registry::FactoryRegistry;
