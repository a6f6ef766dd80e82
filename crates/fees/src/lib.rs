//! Meridian Fees Crate
//!
//! Resilient client for the external fee-calculation engine used by the
//! Meridian ledger console. The console asks the engine to price a
//! candidate transaction before it is submitted to the ledger; this crate
//! keeps that call working - or failing predictably - when the engine is
//! slow, flapping, or down.
//!
//! # Architecture
//!
//! ```text
//! +----------------------+
//! | FeeCalculationClient |  (orchestrator)
//! +----------------------+
//!     |        config gate (enabled? base URL?)
//!     v
//! +-------------+     +----------------+
//! | RetryPolicy | --> | CircuitBreaker |  (backoff around fail-fast)
//! +-------------+     +----------------+
//!                             |
//!                             v
//!                     +--------------+
//!                     | FeeTransport |  (POST /fees, GET /packages, /health)
//!                     +--------------+
//!                             |
//!                             v
//!               +----------------------+
//!               | FeeTransactionMapper |  (wire <-> domain)
//!               +----------------------+
//! ```
//!
//! Package lookups additionally consult [`FeePackageCache`] before the
//! network and degrade to `None` rather than failing.
//!
//! # Core Types
//!
//! - [`FeeCalculationClient`] - the orchestrator
//! - [`FeeCalculationContext`] - tenancy scope forwarded as headers
//! - [`FeeTransaction`] - the transaction draft being priced
//! - [`FeeCalculationResult`] - priced outcome (fee-free is a success)
//! - [`FeePackage`] / [`FeeRule`] - fee rule bundles, cached per tenancy
//! - [`FeeError`] - the full error taxonomy with retry classification
//!
//! # Resilience Components
//!
//! - [`CircuitBreaker`] - fails fast once the engine is deemed unhealthy
//! - [`RetryPolicy`] - exponential backoff over retryable failures
//! - [`FeePackageCache`] - read-through cache for package lookups

pub mod client;
pub mod config;
pub mod errors;
pub mod mapper;
pub mod models;
pub mod time;
pub mod transport;

// Re-export the orchestrator and resilience components
pub use client::{
    CircuitBreaker, CircuitBreakerConfig, CircuitState, FeeCalculationClient, FeePackageCache,
    FeeServiceStatus, PackageKey, PackageValidator, RetryPolicy, RetryPolicyConfig,
    ValidationIssue, ValidationSeverity,
};

// Re-export configuration
pub use config::{FeeClientConfig, FEES_ENABLED_ENV, FEES_PATH_ENV};

// Re-export the error taxonomy
pub use errors::FeeError;

// Re-export the mapper
pub use mapper::{FeeTransactionMapper, DEFAULT_ROUTE};

// Re-export all public types from models
pub use models::{
    Amount, FeeCalculationContext, FeeCalculationResult, FeePackage, FeeRule, FeeTransaction,
    PackageStatus, SendOperation, TransactionLeg,
};

// Re-export the transport seam
pub use transport::{FeeTransport, HttpFeeTransport, TransportResponse};

// Re-export time seams for embedders that inject their own
pub use time::{Clock, Sleeper, SystemClock, TokioSleeper};
