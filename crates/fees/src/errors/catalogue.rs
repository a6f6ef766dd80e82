//! Numeric-coded error catalogue of the fee engine.
//!
//! The engine reports business failures as `{code, message}` bodies. Codes
//! are stable; messages are not. Each known code maps to exactly one
//! user-facing message, and anything unrecognized falls back to a generic
//! internal-error message so raw engine payloads never reach the console.

use log::debug;
use serde::Deserialize;

use super::FeeError;

/// The calculation request failed engine-side validation.
pub const INVALID_CALCULATION_REQUEST: &str = "0001";
/// The referenced fee package does not exist.
pub const PACKAGE_NOT_FOUND: &str = "0002";
/// The engine could not complete the calculation.
pub const CALCULATION_FAILED: &str = "0003";
/// An applied fee exceeded the configured maximum.
pub const MAXIMUM_FEE_EXCEEDED: &str = "0004";
/// A priority-1 fee referenced something other than the original amount.
pub const PRIORITY_ONE_ORIGINAL_AMOUNT: &str = "0005";
/// A priority>1 fee referenced something other than the after-fees amount.
pub const PRIORITY_AFTER_FEES_AMOUNT: &str = "0006";

/// Fallback message for unrecognized codes.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal error while calculating fees";

/// Wire shape of an engine error body.
#[derive(Debug, Deserialize)]
pub(crate) struct RemoteErrorBody {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// User-facing message for a catalogue code.
pub fn message_for(code: &str) -> &'static str {
    match code {
        INVALID_CALCULATION_REQUEST => "The fee calculation request is invalid",
        PACKAGE_NOT_FOUND => "The requested fee package was not found",
        CALCULATION_FAILED => "The fee calculation could not be completed",
        MAXIMUM_FEE_EXCEEDED => "A fee exceeded the configured maximum",
        PRIORITY_ONE_ORIGINAL_AMOUNT => {
            "A priority-1 fee must be calculated over the original transaction amount"
        }
        PRIORITY_AFTER_FEES_AMOUNT => {
            "Fees with priority above 1 must be calculated over the after-fees amount"
        }
        _ => INTERNAL_ERROR_MESSAGE,
    }
}

/// Parse a coded engine error out of a response body, if one is present.
///
/// The raw engine message is logged at debug and replaced with the
/// catalogue message before the error is surfaced.
pub(crate) fn parse_remote_error(body: &str) -> Option<FeeError> {
    let parsed: RemoteErrorBody = serde_json::from_str(body).ok()?;
    let code = parsed.code?;
    if let Some(raw) = parsed.message {
        debug!("fee engine error {code}: {raw}");
    }
    Some(FeeError::Remote {
        message: message_for(&code).to_string(),
        code,
    })
}
