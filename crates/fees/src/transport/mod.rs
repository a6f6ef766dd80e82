//! HTTP transport seam for the fee engine.
//!
//! The client never talks to `reqwest` directly; it goes through
//! [`FeeTransport`] so tests and embedders can substitute their own
//! credentialed transport. A completed HTTP exchange is always `Ok`,
//! whatever the status code; interpreting statuses (404 as absence, 5xx
//! as retryable) is the caller's concern. Only transport-level failures
//! (connect, timeout) surface as errors.

mod http;

pub use http::HttpFeeTransport;

use async_trait::async_trait;

use crate::errors::FeeError;

/// A completed HTTP exchange.
#[derive(Clone, Debug)]
pub struct TransportResponse {
    /// HTTP status code.
    pub status: u16,
    /// Raw response body.
    pub body: String,
}

impl TransportResponse {
    /// Whether the status is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Credentialed HTTP transport to the fee engine.
#[async_trait]
pub trait FeeTransport: Send + Sync {
    /// POST a JSON body.
    async fn post(
        &self,
        url: &str,
        headers: &[(String, String)],
        body: serde_json::Value,
    ) -> Result<TransportResponse, FeeError>;

    /// GET a resource.
    async fn get(
        &self,
        url: &str,
        headers: &[(String, String)],
    ) -> Result<TransportResponse, FeeError>;
}
