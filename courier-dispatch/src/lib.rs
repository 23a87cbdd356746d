//! Dispatch pipeline for the courier delivery system
//!
//! This crate provides functionality to:
//! - Assign a capable, enabled provider to each pending message
//! - Move messages through their lifecycle and batch them per provider
//! - Delegate batches to provider adapters in priority order
//! - Return failed messages to the queue while their error budget lasts
//! - Archive terminal messages once their retention window passes

pub mod assignment;
mod error;
pub mod processor;
mod service;

pub use assignment::{AssignmentError, assign};
pub use error::DispatchError;
pub use processor::{
    ArchiveOutcome, DispatchProcessor, ProcessOutcome, RetryOutcome, TickOutcome,
};
pub use service::{DispatchQueryService, MessageStatus, StoreQueryService};
