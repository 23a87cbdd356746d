//! Audit tracing for pipeline lifecycle events.
//!
//! Structured `tracing` events emitted alongside the store's process log
//! rows, for operators following the live system. Destination addresses can
//! be redacted for privacy compliance.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Audit tracing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Enable audit tracing for pipeline lifecycle events
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Redact destination addresses from audit events (PII protection)
    #[serde(default)]
    pub redact_destinations: bool,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            redact_destinations: false,
        }
    }
}

const fn default_true() -> bool {
    true
}

/// Global audit configuration (thread-safe)
static AUDIT_CONFIG: std::sync::OnceLock<Arc<AuditConfig>> = std::sync::OnceLock::new();

/// Initialize audit tracing with configuration
pub fn init(config: AuditConfig) {
    AUDIT_CONFIG.get_or_init(|| Arc::new(config));
}

/// Get the current audit configuration
#[must_use]
pub fn config() -> Arc<AuditConfig> {
    AUDIT_CONFIG
        .get()
        .cloned()
        .unwrap_or_else(|| Arc::new(AuditConfig::default()))
}

/// Redact a destination address if redaction is enabled.
///
/// Keeps the domain of mail addresses so delivery problems stay
/// diagnosable; phone numbers redact entirely.
#[must_use]
pub fn redact_destination(destination: &str, redact: bool) -> String {
    if redact {
        if let Some((_, domain)) = destination.split_once('@') {
            format!("[REDACTED]@{domain}")
        } else {
            "[REDACTED]".to_string()
        }
    } else {
        destination.to_string()
    }
}

/// Log a provider assignment event
pub fn log_assigned(message_id: &str, provider: &str, priority: i32) {
    let config = config();
    if !config.enabled {
        return;
    }

    tracing::event!(
        tracing::Level::INFO,
        event = "Assigned",
        message_id = %message_id,
        provider = %provider,
        priority = priority,
        "Audit: Provider assigned"
    );
}

/// Log a provider group dispatch event
pub fn log_batch_dispatched(provider: &str, count: usize) {
    let config = config();
    if !config.enabled {
        return;
    }

    tracing::event!(
        tracing::Level::INFO,
        event = "BatchDispatched",
        provider = %provider,
        count = count,
        "Audit: Batch handed to provider adapter"
    );
}

/// Log a group-level dispatch failure
///
/// Covers both adapter instantiation failures and adapter call failures;
/// individual message failures are recorded by the adapter itself.
pub fn log_batch_failed(provider: &str, count: usize, error: &str) {
    let config = config();
    if !config.enabled {
        return;
    }

    tracing::event!(
        tracing::Level::WARN,
        event = "BatchFailed",
        provider = %provider,
        count = count,
        error = %error,
        "Audit: Batch dispatch failed"
    );
}

/// Log a retry reset event
pub fn log_reset(message_id: &str, error_count: u32) {
    let config = config();
    if !config.enabled {
        return;
    }

    tracing::event!(
        tracing::Level::INFO,
        event = "Reset",
        message_id = %message_id,
        error_count = error_count,
        "Audit: Failed message returned to pending"
    );
}

/// Log an archive deletion event
pub fn log_archived(message_id: &str, age_days: i64) {
    let config = config();
    if !config.enabled {
        return;
    }

    tracing::event!(
        tracing::Level::INFO,
        event = "Archived",
        message_id = %message_id,
        age_days = age_days,
        "Audit: Terminal message archived"
    );
}
