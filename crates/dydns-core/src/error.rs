//! Error types for the dydns system
//!
//! Every failure a reconciliation pass can hit maps to exactly one variant
//! here, so retry and alerting policy can tell them apart.

use std::time::Duration;
use thiserror::Error;

/// Result type alias for dydns operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the dydns system
///
/// Errors are `Clone` so a failed pass can be carried inside a
/// [`ReconciliationOutcome`](crate::ReconciliationOutcome) and broadcast
/// on the scheduler's event channel.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The address-echo service was unreachable or returned something
    /// that is not an IPv4 address
    #[error("Address resolution failed: {0}")]
    Resolution(String),

    /// HTTP-layer failure talking to the DNS provider (connectivity,
    /// non-2xx status, undecodable body)
    #[error("Provider transport error: {0}")]
    Transport(String),

    /// The provider answered, but its reply code is not the success code
    #[error("Provider rejected {operation} (code {code}): {detail}")]
    ProviderLogical {
        /// Provider operation that was rejected
        operation: String,
        /// Reply code from the envelope
        code: u32,
        /// Human-readable explanation from the envelope
        detail: String,
    },

    /// No A record exists for the configured host
    #[error("No A record found for host '{host}' in domain '{domain}'")]
    RecordNotFound {
        /// Configured host (bare record name)
        host: String,
        /// Configured domain
        domain: String,
    },

    /// The per-attempt ceiling elapsed before the pass finished
    #[error("Reconciliation attempt timed out after {0:?}")]
    Timeout(Duration),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create an address resolution error
    pub fn resolution(msg: impl Into<String>) -> Self {
        Self::Resolution(msg.into())
    }

    /// Create a provider transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create a provider logical error from a rejected reply envelope
    pub fn provider_logical(
        operation: impl Into<String>,
        code: u32,
        detail: impl Into<String>,
    ) -> Self {
        Self::ProviderLogical {
            operation: operation.into(),
            code,
            detail: detail.into(),
        }
    }

    /// Create a "record not found" error
    pub fn record_not_found(host: impl Into<String>, domain: impl Into<String>) -> Self {
        Self::RecordNotFound {
            host: host.into(),
            domain: domain.into(),
        }
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether this error points at operator configuration rather than a
    /// transient fault
    pub fn is_configuration_problem(&self) -> bool {
        matches!(self, Self::RecordNotFound { .. } | Self::Config(_))
    }
}
