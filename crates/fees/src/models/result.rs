//! Outcome of a fee calculation.

use serde::{Deserialize, Serialize};

use super::transaction::FeeTransaction;

/// Result returned to the console for a priced transaction draft.
///
/// A legitimately fee-free transaction is a success with
/// `fees_applied == false`. Failure paths are errors, never values, so
/// a calculation failure can't masquerade as "no fees applied".
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeCalculationResult {
    /// Whether the calculation completed.
    pub success: bool,

    /// Whether the engine applied any fees.
    pub fees_applied: bool,

    /// The transaction with fee operations folded in, when fees applied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction: Option<FeeTransaction>,

    /// Engine-supplied annotation (e.g. why no fees applied).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl FeeCalculationResult {
    /// A completed calculation that applied no fees.
    pub fn without_fees(message: Option<String>) -> Self {
        Self {
            success: true,
            fees_applied: false,
            transaction: None,
            message,
        }
    }

    /// A completed calculation with fees folded into the transaction.
    pub fn with_fees(transaction: FeeTransaction, message: Option<String>) -> Self {
        Self {
            success: true,
            fees_applied: true,
            transaction: Some(transaction),
            message,
        }
    }
}
