//! Storage collaborator for the courier dispatch pipeline
//!
//! This crate defines the query and command surface the pipeline consumes:
//! - `MessageStore`: discovery queries and CRUD commands over messages,
//!   providers, and process log rows
//! - The audit writer: state transition plus matching log row as one
//!   logical operation
//! - `MemoryStore`: an in-memory backend for tests and transient use

pub mod audit;
pub mod backends;
pub mod error;
pub mod store;

pub use audit::{record_toggle, record_transition};
pub use backends::MemoryStore;
pub use error::{Result, StoreError};
pub use store::MessageStore;
