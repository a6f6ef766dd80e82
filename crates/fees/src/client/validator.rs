//! Fee package validation.
//!
//! Validates packages fetched from the engine before they are cached:
//! - rule identity (non-empty fee id and credit account)
//! - priority invariants (>= 1, no duplicates)
//! - package status (non-active packages are accepted with a warning)

use std::collections::HashSet;

use log::warn;

use crate::models::{FeePackage, PackageStatus};

/// Validation severity levels.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ValidationSeverity {
    /// Reject the package; it is not cached and the lookup degrades to
    /// absent.
    Hard,
    /// Accept the package but log a warning.
    Soft,
}

/// A single validation finding.
#[derive(Clone, Debug)]
pub struct ValidationIssue {
    /// Severity of the finding.
    pub severity: ValidationSeverity,
    /// Description of the finding.
    pub message: String,
}

impl ValidationIssue {
    fn hard(message: impl Into<String>) -> Self {
        Self {
            severity: ValidationSeverity::Hard,
            message: message.into(),
        }
    }
}

/// Structural validator for fetched fee packages.
pub struct PackageValidator;

impl PackageValidator {
    /// Create a validator.
    pub fn new() -> Self {
        Self
    }

    /// Validate a package.
    ///
    /// `Ok` packages may still have produced soft warnings, which are
    /// logged here rather than returned.
    pub fn validate(&self, package: &FeePackage) -> Result<(), ValidationIssue> {
        let mut seen_priorities = HashSet::new();

        for rule in package.fees.values() {
            if rule.fee_id.trim().is_empty() {
                return Err(ValidationIssue::hard(format!(
                    "package '{}' contains a rule with an empty fee id",
                    package.id
                )));
            }
            if rule.credit_account.trim().is_empty() {
                return Err(ValidationIssue::hard(format!(
                    "rule '{}' has no credit account",
                    rule.fee_id
                )));
            }
            if rule.priority < 1 {
                return Err(ValidationIssue::hard(format!(
                    "rule '{}' has priority {}, the minimum is 1",
                    rule.fee_id, rule.priority
                )));
            }
            if !seen_priorities.insert(rule.priority) {
                // Two rules at the same priority would make the
                // after-fees amount ambiguous.
                return Err(ValidationIssue::hard(format!(
                    "package '{}' has duplicate priority {}",
                    package.id, rule.priority
                )));
            }
        }

        if package.status != PackageStatus::Active {
            warn!(
                "Fee package '{}' has status {:?}, rules will not be applied by the engine",
                package.id, package.status
            );
        }

        Ok(())
    }
}

impl Default for PackageValidator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FeeRule;
    use std::collections::HashMap;

    fn rule(fee_id: &str, priority: u32) -> FeeRule {
        FeeRule {
            fee_id: fee_id.to_string(),
            fee_label: format!("Fee {fee_id}"),
            is_deductible_from: false,
            credit_account: "@fees".to_string(),
            priority,
        }
    }

    fn package_with(rules: Vec<FeeRule>) -> FeePackage {
        let fees: HashMap<String, FeeRule> = rules
            .into_iter()
            .map(|r| (r.fee_id.clone(), r))
            .collect();
        FeePackage {
            id: "pkg-1".to_string(),
            name: "Standard".to_string(),
            description: None,
            status: PackageStatus::Active,
            fees,
        }
    }

    #[test]
    fn test_well_formed_package_passes() {
        let package = package_with(vec![rule("base", 1), rule("extra", 2)]);
        assert!(PackageValidator::new().validate(&package).is_ok());
    }

    #[test]
    fn test_duplicate_priorities_are_rejected() {
        let package = package_with(vec![rule("a", 1), rule("b", 1)]);
        let issue = PackageValidator::new().validate(&package).unwrap_err();
        assert_eq!(issue.severity, ValidationSeverity::Hard);
        assert!(issue.message.contains("duplicate priority"));
    }

    #[test]
    fn test_zero_priority_is_rejected() {
        let package = package_with(vec![rule("a", 0)]);
        let issue = PackageValidator::new().validate(&package).unwrap_err();
        assert_eq!(issue.severity, ValidationSeverity::Hard);
    }

    #[test]
    fn test_missing_credit_account_is_rejected() {
        let mut bad = rule("a", 1);
        bad.credit_account = String::new();
        let package = package_with(vec![bad]);
        assert!(PackageValidator::new().validate(&package).is_err());
    }

    #[test]
    fn test_inactive_package_is_accepted_with_warning() {
        let mut package = package_with(vec![rule("a", 1)]);
        package.status = PackageStatus::Inactive;
        assert!(PackageValidator::new().validate(&package).is_ok());
    }
}
