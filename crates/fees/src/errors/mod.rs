//! Error types and retry classification for the fee client.
//!
//! This module provides:
//! - [`FeeError`]: the main error enum for all fee-client operations
//! - [`catalogue`]: the numeric-coded error catalogue of the fee engine
//!
//! Configuration errors ("not set up") and availability errors
//! ("temporarily unavailable") are kept distinct so callers can message
//! users differently.

pub mod catalogue;

use thiserror::Error;

/// Errors that can occur while talking to the fee engine.
///
/// Each variant answers [`is_retryable`](Self::is_retryable), which the
/// retry policy consults before re-attempting an operation.
#[derive(Error, Debug)]
pub enum FeeError {
    /// The fee integration is switched off. Fatal, never retried,
    /// surfaced before any downstream machinery runs.
    #[error("Fee integration is disabled")]
    Disabled,

    /// The fee integration is enabled but incomplete (missing base URL,
    /// missing tenancy scope). A setup problem, not a downstream failure.
    #[error("Fee service is not configured: {message}")]
    Configuration {
        /// What exactly is missing.
        message: String,
    },

    /// The circuit breaker rejected the call without making it.
    #[error("Fee service circuit is open")]
    CircuitOpen,

    /// The engine could not be reached after the circuit breaker and
    /// retry policy gave up. Safe to retry later.
    #[error("Fee service unavailable: {message}")]
    ServiceUnavailable {
        /// The underlying failure, for logs and diagnostics.
        message: String,
    },

    /// A coded business error returned by the engine itself.
    /// Not transient, never retried.
    #[error("Fee engine error {code}: {message}")]
    Remote {
        /// Stable catalogue code.
        code: String,
        /// The user-facing catalogue message for that code.
        message: String,
    },

    /// The request failed local validation and was never sent.
    #[error("Invalid calculation request: {0}")]
    InvalidRequest(String),

    /// The requested resource does not exist (HTTP 404).
    #[error("Fee package not found")]
    NotFound,

    /// The engine rate limited the request (HTTP 429).
    /// Retried with exponential backoff.
    #[error("Rate limited by fee service")]
    RateLimited,

    /// The request to the engine timed out.
    /// Retried with exponential backoff.
    #[error("Request to fee service timed out")]
    Timeout,

    /// A transport-level failure (connection refused, DNS, TLS).
    /// Retried with exponential backoff.
    #[error("Network error: {0}")]
    Network(String),

    /// An HTTP status with no richer classification. Server errors are
    /// retried; uncoded client errors are not.
    #[error("Fee service returned HTTP {status}")]
    Http {
        /// The raw status code.
        status: u16,
    },

    /// The engine answered with a body the client could not interpret.
    #[error("Invalid fee engine response: {0}")]
    InvalidResponse(String),
}

impl FeeError {
    /// Map a completed non-2xx exchange onto the error taxonomy.
    ///
    /// 404 becomes [`NotFound`](Self::NotFound) so package lookups can
    /// normalize absence; 429 becomes [`RateLimited`](Self::RateLimited);
    /// other client errors are parsed for a catalogue code; everything
    /// else keeps its status.
    pub fn from_status(status: u16, body: &str) -> Self {
        match status {
            404 => Self::NotFound,
            429 => Self::RateLimited,
            400..=499 => {
                catalogue::parse_remote_error(body).unwrap_or(Self::Http { status })
            }
            _ => Self::Http { status },
        }
    }

    /// Whether the retry policy should re-attempt after this error.
    ///
    /// Client errors (400-499) are not retried except rate limiting;
    /// transport failures and server errors (>= 500) are; anything
    /// unclassified is not.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::RateLimited | Self::Timeout | Self::Network(_) => true,
            Self::Http { status } => *status >= 500,
            _ => false,
        }
    }

    /// Whether this error reports a setup problem rather than a failure.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Disabled | Self::Configuration { .. })
    }

    /// Whether this error reports temporary unavailability.
    pub fn is_unavailability(&self) -> bool {
        matches!(self, Self::CircuitOpen | Self::ServiceUnavailable { .. })
    }
}
