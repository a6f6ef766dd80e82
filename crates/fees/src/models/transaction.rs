//! Transaction draft priced by the fee engine.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::FeeError;

/// Monetary amount of a single operation leg.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Amount {
    /// Asset code (e.g. "USD", "BRL").
    pub asset: String,
    /// Amount value.
    pub value: Decimal,
}

impl Amount {
    /// Create an amount.
    pub fn new(asset: impl Into<String>, value: Decimal) -> Self {
        Self {
            asset: asset.into(),
            value,
        }
    }
}

/// One source or destination leg of the transaction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionLeg {
    /// Account the leg debits or credits.
    pub account_alias: String,

    /// Amount moved by this leg. Its asset must match the send asset.
    pub amount: Amount,

    /// Chart-of-accounts classification.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chart_of_accounts: Option<String>,

    /// Free-form leg description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Caller-defined metadata forwarded to the engine untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
}

impl TransactionLeg {
    /// Create a leg with the required fields only.
    pub fn new(account_alias: impl Into<String>, amount: Amount) -> Self {
        Self {
            account_alias: account_alias.into(),
            amount,
            chart_of_accounts: None,
            description: None,
            metadata: None,
        }
    }
}

/// The send side of the draft: what is moved, from where, to where.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SendOperation {
    /// Asset being transferred.
    pub asset: String,
    /// Total value being transferred.
    pub value: Decimal,
    /// Debited legs.
    pub source: Vec<TransactionLeg>,
    /// Credited legs.
    pub distribute: Vec<TransactionLeg>,
}

/// Transaction draft submitted for fee calculation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeTransaction {
    /// Free-form transaction description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Chart-of-accounts group for the whole transaction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chart_of_accounts_group_name: Option<String>,

    /// What is being sent and how it is split across legs.
    pub send: SendOperation,
}

impl FeeTransaction {
    /// Check the draft before it is sent: every leg must move the same
    /// asset the send declares.
    pub fn validate(&self) -> Result<(), FeeError> {
        for leg in self.send.source.iter().chain(self.send.distribute.iter()) {
            if leg.amount.asset != self.send.asset {
                return Err(FeeError::InvalidRequest(format!(
                    "leg '{}' moves {} but the transaction sends {}",
                    leg.account_alias, leg.amount.asset, self.send.asset
                )));
            }
        }
        Ok(())
    }
}
