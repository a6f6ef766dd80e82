//! Domain types for fee calculation.

mod context;
mod package;
mod result;
mod transaction;

pub use context::{
    FeeCalculationContext, LEDGER_HEADER, ORGANIZATION_HEADER, SEGMENT_HEADER,
};
pub use package::{FeePackage, FeeRule, PackageStatus};
pub use result::FeeCalculationResult;
pub use transaction::{Amount, FeeTransaction, SendOperation, TransactionLeg};
