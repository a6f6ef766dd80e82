//! Fee calculation client.
//!
//! The orchestrator composes the circuit breaker, retry policy, and
//! package cache around an injected HTTP transport:
//!
//! 1. Check configuration (misconfiguration never counts as a downstream
//!    failure)
//! 2. Validate the context and the transaction draft locally
//! 3. `retry.execute(|| breaker.execute(|| transport.post(...)))`
//! 4. Map the raw response through the transaction mapper
//!
//! Package lookups consult the cache before the network and degrade to
//! `None` on failure; health probes never error.

mod cache;
mod circuit_breaker;
mod retry;
mod validator;

pub use cache::{FeePackageCache, PackageKey};
pub use circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitState};
pub use retry::{RetryPolicy, RetryPolicyConfig};
pub use validator::{PackageValidator, ValidationIssue, ValidationSeverity};

use std::sync::Arc;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::config::{FeeClientConfig, FEES_PATH_ENV};
use crate::errors::FeeError;
use crate::mapper::{CalculateFeesResponseDto, FeeTransactionMapper};
use crate::models::{FeeCalculationContext, FeeCalculationResult, FeePackage, FeeTransaction};
use crate::transport::{FeeTransport, TransportResponse};

/// Status value the health endpoint reports when the engine is usable.
const HEALTHY_STATUS: &str = "healthy";

/// Health payload reported by the engine.
#[derive(Debug, Deserialize)]
struct HealthResponse {
    #[serde(default)]
    status: String,
}

/// Integration status reported to the console host.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeServiceStatus {
    /// Whether the integration is switched on.
    pub enabled: bool,
    /// Whether a base URL is configured.
    pub configured: bool,
    /// The configured base URL, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Why the integration is not usable right now, if it is not.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Client for the external fee-calculation engine.
///
/// One instance is constructed at startup and shared; the breaker and
/// cache it owns are the process-wide state for the fee dependency.
pub struct FeeCalculationClient {
    config: FeeClientConfig,
    transport: Arc<dyn FeeTransport>,
    breaker: CircuitBreaker,
    retry: RetryPolicy,
    cache: FeePackageCache,
    validator: PackageValidator,
}

impl FeeCalculationClient {
    /// Create a client with default breaker and retry settings.
    pub fn new(config: FeeClientConfig, transport: Arc<dyn FeeTransport>) -> Self {
        Self::with_components(config, transport, CircuitBreaker::new(), RetryPolicy::new())
    }

    /// Create a client with custom resilience components.
    pub fn with_components(
        config: FeeClientConfig,
        transport: Arc<dyn FeeTransport>,
        breaker: CircuitBreaker,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            config,
            transport,
            breaker,
            retry,
            cache: FeePackageCache::new(),
            validator: PackageValidator::new(),
        }
    }

    /// Ask the engine to price a transaction draft.
    ///
    /// A draft the engine prices with zero fees is a success with
    /// `fees_applied == false`. Transport failures are retried with
    /// backoff behind the circuit breaker; once both give up the error
    /// surfaces as [`FeeError::ServiceUnavailable`]. Engine business
    /// errors keep their catalogue code and are not retried.
    pub async fn calculate_fees(
        &self,
        request: &FeeTransaction,
        context: &FeeCalculationContext,
    ) -> Result<FeeCalculationResult, FeeError> {
        let base_url = self.config.ensure_ready()?;
        context.validate()?;
        request.validate()?;

        let payload = FeeTransactionMapper::to_create_dto(
            request,
            &context.ledger_id,
            None,
            context.segment_id.as_deref(),
        );
        let body = serde_json::to_value(&payload)
            .map_err(|e| FeeError::InvalidRequest(e.to_string()))?;
        let url = format!("{base_url}/fees");
        let headers = context.headers();

        debug!("Calculating fees for ledger '{}'", context.ledger_id);

        let response = self
            .retry
            .execute(|| {
                self.breaker.execute(|| async {
                    let exchange = self.transport.post(&url, &headers, body.clone()).await?;
                    Self::into_success(exchange)
                })
            })
            .await
            .map_err(Self::escalate)?;

        let parsed: CalculateFeesResponseDto = serde_json::from_str(&response.body)
            .map_err(|e| FeeError::InvalidResponse(e.to_string()))?;

        if parsed.has_no_fees.unwrap_or(false) || !parsed.fees_applied {
            info!("Fee engine applied no fees");
            return Ok(FeeCalculationResult::without_fees(parsed.message));
        }

        let transaction = parsed
            .transaction
            .map(FeeTransactionMapper::to_entity)
            .ok_or_else(|| {
                FeeError::InvalidResponse("feesApplied without a transaction".to_string())
            })?;

        Ok(FeeCalculationResult::with_fees(transaction, parsed.message))
    }

    /// Fetch a fee package, consulting the cache first.
    ///
    /// Returns `None` both when the package does not exist (404) and when
    /// the fetch fails; the degraded path logs the underlying error.
    /// Callers that must distinguish absence from unavailability consult
    /// [`service_status`](Self::service_status). Fetch failures never
    /// populate the cache.
    pub async fn get_fee_package(
        &self,
        package_id: &str,
        context: &FeeCalculationContext,
    ) -> Option<FeePackage> {
        let base_url = match self.config.ensure_ready() {
            Ok(url) => url,
            Err(error) => {
                warn!("Fee package lookup skipped: {error}");
                return None;
            }
        };

        let key = PackageKey::new(package_id, context);
        if let Some(package) = self.cache.get(&key) {
            return Some(package);
        }

        let url = format!("{base_url}/packages/{package_id}");
        let headers = context.headers();

        let fetched = self
            .retry
            .execute(|| async {
                let exchange = self.transport.get(&url, &headers).await?;
                Self::into_success(exchange)
            })
            .await;

        match fetched {
            Ok(response) => {
                let package: FeePackage = match serde_json::from_str(&response.body) {
                    Ok(package) => package,
                    Err(error) => {
                        warn!("Malformed fee package '{package_id}': {error}");
                        return None;
                    }
                };
                if let Err(issue) = self.validator.validate(&package) {
                    warn!("Rejecting fee package '{package_id}': {}", issue.message);
                    return None;
                }
                self.cache.set(key, package.clone());
                Some(package)
            }
            Err(FeeError::NotFound) => {
                debug!("Fee package '{package_id}' does not exist");
                None
            }
            Err(error) => {
                warn!("Fee package '{package_id}' lookup failed: {error}");
                None
            }
        }
    }

    /// Probe the engine's health endpoint.
    ///
    /// Returns `true` only when the endpoint is reachable and reports
    /// `status == "healthy"`. Never errors.
    pub async fn is_healthy(&self) -> bool {
        let base_url = match self.config.ensure_ready() {
            Ok(url) => url,
            Err(_) => return false,
        };

        let url = format!("{base_url}/health");
        match self.transport.get(&url, &[]).await {
            Ok(response) if response.is_success() => {
                serde_json::from_str::<HealthResponse>(&response.body)
                    .map(|health| health.status == HEALTHY_STATUS)
                    .unwrap_or(false)
            }
            Ok(response) => {
                debug!("Health probe returned HTTP {}", response.status);
                false
            }
            Err(error) => {
                debug!("Health probe failed: {error}");
                false
            }
        }
    }

    /// Report the integration status without requiring it to be usable.
    ///
    /// Makes no network call when the integration is disabled or
    /// unconfigured; otherwise annotates `message` when the health probe
    /// fails.
    pub async fn service_status(&self) -> FeeServiceStatus {
        let enabled = self.config.enabled;
        let configured = self.config.is_configured();
        let base_url = self.config.base_url.clone();

        if !enabled {
            return FeeServiceStatus {
                enabled,
                configured,
                base_url,
                message: Some("fee integration is disabled".to_string()),
            };
        }
        if !configured {
            return FeeServiceStatus {
                enabled,
                configured,
                base_url,
                message: Some(format!("{FEES_PATH_ENV} is not set")),
            };
        }

        let message = if self.is_healthy().await {
            None
        } else {
            Some("fee service is unreachable".to_string())
        };

        FeeServiceStatus {
            enabled,
            configured,
            base_url,
            message,
        }
    }

    /// Circuit breaker state, for health reporting.
    pub fn circuit_state(&self) -> CircuitState {
        self.breaker.state()
    }

    /// Force the circuit breaker closed.
    pub fn reset_circuit(&self) {
        self.breaker.reset()
    }

    /// The package cache, for diagnostics.
    pub fn cache(&self) -> &FeePackageCache {
        &self.cache
    }

    /// Treat non-2xx statuses as errors so retry classification and 404
    /// normalization see them.
    fn into_success(response: TransportResponse) -> Result<TransportResponse, FeeError> {
        if response.is_success() {
            Ok(response)
        } else {
            Err(FeeError::from_status(response.status, &response.body))
        }
    }

    /// After retries give up, transient failures and the open-circuit
    /// sentinel become "temporarily unavailable"; everything else keeps
    /// its shape.
    fn escalate(error: FeeError) -> FeeError {
        match error {
            FeeError::CircuitOpen => FeeError::ServiceUnavailable {
                message: "fee service circuit is open".to_string(),
            },
            error if error.is_retryable() => FeeError::ServiceUnavailable {
                message: error.to_string(),
            },
            error => error,
        }
    }
}
