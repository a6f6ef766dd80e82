//! Fee packages and the rules they bundle.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Lifecycle status of a fee package.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PackageStatus {
    /// The package is in force.
    Active,
    /// The package exists but is not applied.
    Inactive,
    /// A status this client version does not know.
    #[serde(other)]
    Unknown,
}

/// A single fee rule inside a package.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeRule {
    /// Stable rule identifier.
    pub fee_id: String,

    /// Human-readable label.
    pub fee_label: String,

    /// Whether the fee is deducted from the sent amount rather than
    /// charged on top of it.
    pub is_deductible_from: bool,

    /// Account credited with the collected fee.
    pub credit_account: String,

    /// Application order. Priority 1 is computed against the original
    /// transaction amount; higher priorities against the amount remaining
    /// after previously applied fees.
    pub priority: u32,
}

/// A named bundle of fee rules applicable to a scope.
///
/// Packages are fetched on demand, cached per tenancy, and never mutated
/// in place; a refresh replaces the cached entry wholesale.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeePackage {
    /// Package identifier.
    pub id: String,

    /// Display name.
    pub name: String,

    /// Optional description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Lifecycle status.
    pub status: PackageStatus,

    /// Rules keyed by fee id.
    pub fees: HashMap<String, FeeRule>,
}

impl FeePackage {
    /// Rules in application order (ascending priority, then fee id for a
    /// stable order).
    pub fn rules_by_priority(&self) -> Vec<&FeeRule> {
        let mut rules: Vec<&FeeRule> = self.fees.values().collect();
        rules.sort_by(|a, b| {
            a.priority
                .cmp(&b.priority)
                .then_with(|| a.fee_id.cmp(&b.fee_id))
        });
        rules
    }
}
