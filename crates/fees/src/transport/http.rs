//! reqwest-backed transport.

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::Client;

use super::{FeeTransport, TransportResponse};
use crate::errors::FeeError;

/// Default HTTP request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP transport over a shared [`reqwest::Client`].
pub struct HttpFeeTransport {
    client: Client,
}

impl HttpFeeTransport {
    /// Create a transport with the default request timeout.
    pub fn new() -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { client }
    }

    /// Create a transport over an existing client (shared connection
    /// pools, custom middleware).
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    fn map_error(error: reqwest::Error) -> FeeError {
        if error.is_timeout() {
            FeeError::Timeout
        } else {
            FeeError::Network(error.to_string())
        }
    }

    async fn read(response: reqwest::Response) -> Result<TransportResponse, FeeError> {
        let status = response.status().as_u16();
        let body = response.text().await.map_err(Self::map_error)?;
        Ok(TransportResponse { status, body })
    }
}

impl Default for HttpFeeTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FeeTransport for HttpFeeTransport {
    async fn post(
        &self,
        url: &str,
        headers: &[(String, String)],
        body: serde_json::Value,
    ) -> Result<TransportResponse, FeeError> {
        debug!("POST {url}");
        let mut request = self.client.post(url).json(&body);
        for (name, value) in headers {
            request = request.header(name.as_str(), value.as_str());
        }
        let response = request.send().await.map_err(Self::map_error)?;
        Self::read(response).await
    }

    async fn get(
        &self,
        url: &str,
        headers: &[(String, String)],
    ) -> Result<TransportResponse, FeeError> {
        debug!("GET {url}");
        let mut request = self.client.get(url);
        for (name, value) in headers {
            request = request.header(name.as_str(), value.as_str());
        }
        let response = request.send().await.map_err(Self::map_error)?;
        Self::read(response).await
    }
}
