//! Translation between the console transaction shape and the engine wire
//! format.
//!
//! Pure functions in both directions: [`FeeTransactionMapper::to_create_dto`]
//! builds the `POST /fees` payload, [`FeeTransactionMapper::to_entity`]
//! types the engine's response back into the domain shape. No I/O, no
//! state - the same inputs always produce structurally identical outputs.

mod dto;

pub use dto::{
    AmountDto, CalculateFeesResponseDto, DistributeDto, FeeCalculationDto, OperationDirection,
    OperationDto, SendDto, SourceDto, TransactionDto,
};

use serde_json::{Map, Value};

use crate::models::{Amount, FeeTransaction, SendOperation, TransactionLeg};

/// Route attached when the caller does not supply one.
pub const DEFAULT_ROUTE: &str = "default";

/// Pure translation between the console's transaction representation and
/// the wire format expected and returned by the fee engine.
pub struct FeeTransactionMapper;

impl FeeTransactionMapper {
    /// Build the `POST /fees` payload.
    ///
    /// Empty optional fields are dropped from the output. The
    /// schema-required fields (`chartOfAccounts`, `accountAlias`, `asset`,
    /// `value`) stay present even when empty. Source legs are tagged
    /// `DEBIT`, destination legs `CREDIT`.
    pub fn to_create_dto(
        transaction: &FeeTransaction,
        ledger_id: &str,
        route: Option<&str>,
        segment_id: Option<&str>,
    ) -> FeeCalculationDto {
        FeeCalculationDto {
            ledger_id: ledger_id.to_string(),
            route: route
                .filter(|r| !r.trim().is_empty())
                .unwrap_or(DEFAULT_ROUTE)
                .to_string(),
            segment_id: clean_string(segment_id.map(str::to_string)),
            transaction: TransactionDto {
                description: clean_string(transaction.description.clone()),
                chart_of_accounts_group_name: clean_string(
                    transaction.chart_of_accounts_group_name.clone(),
                ),
                send: SendDto {
                    asset: transaction.send.asset.clone(),
                    value: transaction.send.value,
                    source: SourceDto {
                        from: legs_to_dto(&transaction.send.source, OperationDirection::Debit),
                    },
                    distribute: DistributeDto {
                        to: legs_to_dto(
                            &transaction.send.distribute,
                            OperationDirection::Credit,
                        ),
                    },
                },
            },
        }
    }

    /// Type the engine's transaction shape back into the console's.
    ///
    /// The response is already close to the domain shape; this only types
    /// it and normalizes empty fields away.
    pub fn to_entity(dto: TransactionDto) -> FeeTransaction {
        FeeTransaction {
            description: clean_string(dto.description),
            chart_of_accounts_group_name: clean_string(dto.chart_of_accounts_group_name),
            send: SendOperation {
                asset: dto.send.asset,
                value: dto.send.value,
                source: dto.send.source.from.into_iter().map(leg_from_dto).collect(),
                distribute: dto
                    .send
                    .distribute
                    .to
                    .into_iter()
                    .map(leg_from_dto)
                    .collect(),
            },
        }
    }
}

fn legs_to_dto(legs: &[TransactionLeg], direction: OperationDirection) -> Vec<OperationDto> {
    legs.iter()
        .map(|leg| OperationDto {
            account_alias: leg.account_alias.clone(),
            amount: AmountDto {
                asset: leg.amount.asset.clone(),
                value: leg.amount.value,
            },
            operation: Some(direction),
            chart_of_accounts: leg.chart_of_accounts.clone().unwrap_or_default(),
            description: clean_string(leg.description.clone()),
            metadata: clean_metadata(leg.metadata.clone()),
        })
        .collect()
}

fn leg_from_dto(dto: OperationDto) -> TransactionLeg {
    TransactionLeg {
        account_alias: dto.account_alias,
        amount: Amount {
            asset: dto.amount.asset,
            value: dto.amount.value,
        },
        chart_of_accounts: clean_string(Some(dto.chart_of_accounts)),
        description: clean_string(dto.description),
        metadata: clean_metadata(dto.metadata),
    }
}

/// Empty or whitespace-only strings count as absent.
fn clean_string(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Empty metadata maps count as absent.
fn clean_metadata(value: Option<Map<String, Value>>) -> Option<Map<String, Value>> {
    value.filter(|m| !m.is_empty())
}
