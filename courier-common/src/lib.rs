pub mod audit;
pub mod log;
pub mod logging;
pub mod message;
pub mod provider;
pub mod state;

pub use tracing;

/// Identity attributed to every automated pipeline transition, as opposed
/// to an interactive operator. Passed explicitly through every
/// audit-writing call; there is no ambient actor state.
pub const SYSTEM_ACTOR: &str = "courier-pipeline";

#[derive(Debug, Clone, Copy)]
pub enum Signal {
    Shutdown,
    Finalised,
}
