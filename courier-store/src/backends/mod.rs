//! Backend implementations of the store surface
//!
//! Only the in-memory backend lives in this repository: production
//! deployments bring their own database-backed implementation of
//! `MessageStore`, which stays out of scope here.

pub mod memory;

pub use memory::MemoryStore;
