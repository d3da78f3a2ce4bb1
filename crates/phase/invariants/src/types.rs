use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of one of the three invariants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InvariantId {
    #[serde(rename = "inv_ast")]
    Ast,
    #[serde(rename = "inv_witness")]
    Witness,
    #[serde(rename = "inv_phase")]
    Phase,
}

impl InvariantId {
    pub const ALL: [InvariantId; 3] = [Self::Ast, Self::Witness, Self::Phase];

    pub fn description(&self) -> &'static str {
        match self {
            Self::Ast => "Structural skeleton: history, phase and tick unchanged",
            Self::Witness => "Witness integrity: hashes reproduce, kinds match, progress floor",
            Self::Phase => "Phase monotonicity: every transition advances exactly one phase",
        }
    }
}

impl fmt::Display for InvariantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ast => write!(f, "inv_ast"),
            Self::Witness => write!(f, "inv_witness"),
            Self::Phase => write!(f, "inv_phase"),
        }
    }
}

/// Result of a single invariant check.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvariantResult {
    pub id: InvariantId,
    pub holds: bool,
    /// Empty when the invariant holds; otherwise every violation found.
    pub reason: String,
}

impl InvariantResult {
    pub(crate) fn from_violations(id: InvariantId, violations: Vec<String>) -> Self {
        Self {
            id,
            holds: violations.is_empty(),
            reason: violations.join("; "),
        }
    }
}

/// All three invariant results for one state replacement.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvariantReport {
    pub inv_ast: InvariantResult,
    pub inv_witness: InvariantResult,
    pub inv_phase: InvariantResult,
}

impl InvariantReport {
    /// All three hold.
    pub fn holds(&self) -> bool {
        self.inv_ast.holds && self.inv_witness.holds && self.inv_phase.holds
    }

    pub fn results(&self) -> [&InvariantResult; 3] {
        [&self.inv_ast, &self.inv_witness, &self.inv_phase]
    }

    /// Names of every failing invariant, in check order.
    pub fn failures(&self) -> Vec<InvariantId> {
        self.results()
            .into_iter()
            .filter(|r| !r.holds)
            .map(|r| r.id)
            .collect()
    }

    /// Failure reasons, one `"<id>: <reason>"` per failing invariant.
    pub fn failure_details(&self) -> Vec<String> {
        self.results()
            .into_iter()
            .filter(|r| !r.holds)
            .map(|r| format!("{}: {}", r.id, r.reason))
            .collect()
    }
}

/// Outcome of a reporting-only verification. Never an error: callers decide
/// how to react.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationResult {
    pub valid: bool,
    pub checks_performed: usize,
    pub checks_passed: usize,
    pub errors: Vec<String>,
}

impl VerificationResult {
    pub fn ok(checks: usize) -> Self {
        Self {
            valid: true,
            checks_performed: checks,
            checks_passed: checks,
            errors: Vec::new(),
        }
    }

    pub fn failed(checks_performed: usize, checks_passed: usize, errors: Vec<String>) -> Self {
        Self {
            valid: false,
            checks_performed,
            checks_passed,
            errors,
        }
    }

    /// Start an empty tally.
    pub fn tally() -> Self {
        Self::ok(0)
    }

    /// Record one check.
    pub fn check(&mut self, passed: bool, error: impl FnOnce() -> String) {
        self.checks_performed += 1;
        if passed {
            self.checks_passed += 1;
        } else {
            self.valid = false;
            self.errors.push(error());
        }
    }

    /// Fold another result into this one.
    pub fn merge(&mut self, other: VerificationResult) {
        self.checks_performed += other.checks_performed;
        self.checks_passed += other.checks_passed;
        self.valid &= other.valid;
        self.errors.extend(other.errors);
    }
}
