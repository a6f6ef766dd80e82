//! Wire DTOs of the fee engine.
//!
//! CamelCase JSON with absent optional fields omitted entirely. The four
//! schema-required fields (`chartOfAccounts`, `accountAlias`, `asset`,
//! `value`) are plain fields, serialized even when empty, because the
//! engine schema requires their presence.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Direction tag the engine expects on every operation leg.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OperationDirection {
    /// Source leg.
    Debit,
    /// Destination leg.
    Credit,
}

/// Monetary amount on the wire.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AmountDto {
    pub asset: String,
    pub value: Decimal,
}

/// One operation leg on the wire.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationDto {
    pub account_alias: String,
    pub amount: AmountDto,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation: Option<OperationDirection>,
    pub chart_of_accounts: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
}

/// Debited legs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SourceDto {
    pub from: Vec<OperationDto>,
}

/// Credited legs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DistributeDto {
    pub to: Vec<OperationDto>,
}

/// The send block on the wire.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendDto {
    pub asset: String,
    pub value: Decimal,
    pub source: SourceDto,
    pub distribute: DistributeDto,
}

/// Transaction shape shared by the request payload and the response.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chart_of_accounts_group_name: Option<String>,
    pub send: SendDto,
}

/// Top-level payload for `POST /fees`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeCalculationDto {
    pub ledger_id: String,
    pub route: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub segment_id: Option<String>,
    pub transaction: TransactionDto,
}

/// Response body of `POST /fees`.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculateFeesResponseDto {
    #[serde(default)]
    pub transaction: Option<TransactionDto>,
    #[serde(default)]
    pub fees_applied: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub has_no_fees: Option<bool>,
}
