//! Delivery backend descriptors.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::message::MessageKind;

/// A configured delivery backend: capability flags, selection priority,
/// and the parameters its adapter needs to connect.
///
/// Providers are configuration data. The pipeline never creates or edits
/// them; it only reads the enabled set when assigning work.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderType {
    pub id: i64,
    pub name: String,
    /// Lower is preferred during assignment and group ordering.
    pub priority: i32,
    #[serde(default)]
    pub can_process_mail: bool,
    #[serde(default)]
    pub can_process_text: bool,
    #[serde(default)]
    pub is_disabled: bool,
    /// Factory selector key naming the adapter implementation.
    pub adapter: String,
    /// Adapter connection parameters. May hold secrets; never logged
    /// verbatim.
    #[serde(default)]
    pub parameters: AHashMap<String, String>,
}

impl ProviderType {
    /// Check whether this provider can handle the given message class.
    #[must_use]
    pub const fn can_process(&self, kind: MessageKind) -> bool {
        match kind {
            MessageKind::Mail => self.can_process_mail,
            MessageKind::Text => self.can_process_text,
        }
    }
}
