//! Tenancy context forwarded to the fee engine.

use serde::{Deserialize, Serialize};

use crate::errors::FeeError;

/// Header carrying the organization scope.
pub const ORGANIZATION_HEADER: &str = "X-Organization-Id";
/// Header carrying the ledger scope.
pub const LEDGER_HEADER: &str = "X-Ledger-Id";
/// Header carrying the optional segment scope.
pub const SEGMENT_HEADER: &str = "X-Segment-Id";

/// Tenancy scope under which fees are calculated.
///
/// Forwarded to the engine as request headers on every call.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeCalculationContext {
    /// Owning organization. Mandatory; absence is a configuration error.
    pub organization_id: String,

    /// Ledger the candidate transaction belongs to.
    pub ledger_id: String,

    /// Optional segment scope.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub segment_id: Option<String>,
}

impl FeeCalculationContext {
    /// Create a context scoped to an organization and ledger.
    pub fn new(organization_id: impl Into<String>, ledger_id: impl Into<String>) -> Self {
        Self {
            organization_id: organization_id.into(),
            ledger_id: ledger_id.into(),
            segment_id: None,
        }
    }

    /// Narrow the context to a segment.
    pub fn with_segment(mut self, segment_id: impl Into<String>) -> Self {
        self.segment_id = Some(segment_id.into());
        self
    }

    /// Check the mandatory scope before any network call is attempted.
    pub fn validate(&self) -> Result<(), FeeError> {
        if self.organization_id.trim().is_empty() {
            return Err(FeeError::Configuration {
                message: "organization id is required".to_string(),
            });
        }
        Ok(())
    }

    /// Headers attached to every fee engine request.
    pub fn headers(&self) -> Vec<(String, String)> {
        let mut headers = vec![
            (
                ORGANIZATION_HEADER.to_string(),
                self.organization_id.clone(),
            ),
            (LEDGER_HEADER.to_string(), self.ledger_id.clone()),
        ];
        if let Some(segment) = &self.segment_id {
            headers.push((SEGMENT_HEADER.to_string(), segment.clone()));
        }
        headers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_organization_is_a_configuration_error() {
        let context = FeeCalculationContext::new("  ", "ledger-1");
        let error = context.validate().unwrap_err();
        assert!(error.is_configuration());
    }

    #[test]
    fn test_headers_include_segment_only_when_present() {
        let context = FeeCalculationContext::new("org-1", "ledger-1");
        assert_eq!(context.headers().len(), 2);

        let scoped = context.with_segment("seg-1");
        let headers = scoped.headers();
        assert_eq!(headers.len(), 3);
        assert!(headers.contains(&(SEGMENT_HEADER.to_string(), "seg-1".to_string())));
    }
}
