use crate::rule::RuleCategory;
use maple_phase_invariants::InvariantId;
use serde::{Deserialize, Serialize};

/// Why the stage firewall rejected a rule.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum FirewallViolation {
    #[error("cannot transform after seal")]
    TransformAfterSeal,
    #[error("already sealed")]
    AlreadySealed,
    #[error("must be sealed before compaction")]
    NotSealed,
    #[error("already compacted")]
    AlreadyCompacted,
    /// Rule-specific rejection from a caller-defined `requires`.
    #[error("{0}")]
    Rejected(String),
}

/// Errors from applying a rule. The pipeline is never modified when one of
/// these is returned.
#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    #[error("firewall rejected {rule}: {violation}")]
    Firewall {
        rule: String,
        violation: FirewallViolation,
    },
    #[error("precondition failed for {rule}: {reason}")]
    Precondition { rule: String, reason: String },
    #[error("invariant violation in {rule}: {}", join_ids(.failed))]
    InvariantViolation {
        rule: String,
        failed: Vec<InvariantId>,
        details: Vec<String>,
    },
    #[error("rule {rule} produced non-finite scalars")]
    NonFiniteScalars { rule: String },
    #[error("{category} rule {rule} must not alter the genesis state")]
    StateAltered { rule: String, category: RuleCategory },
    #[error("rule {rule} is a {actual} rule, expected {expected}")]
    CategoryMismatch {
        rule: String,
        expected: RuleCategory,
        actual: RuleCategory,
    },
}

impl RuleError {
    pub fn rule(&self) -> &str {
        match self {
            Self::Firewall { rule, .. }
            | Self::Precondition { rule, .. }
            | Self::InvariantViolation { rule, .. }
            | Self::NonFiniteScalars { rule }
            | Self::StateAltered { rule, .. }
            | Self::CategoryMismatch { rule, .. } => rule,
        }
    }

    pub fn firewall_violation(&self) -> Option<&FirewallViolation> {
        match self {
            Self::Firewall { violation, .. } => Some(violation),
            _ => None,
        }
    }
}

fn join_ids(ids: &[InvariantId]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
