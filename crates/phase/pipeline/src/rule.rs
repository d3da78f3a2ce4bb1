use crate::error::FirewallViolation;
use crate::mark::MarkKind;
use crate::pipeline::{Pipeline, Stage};
use maple_phase_invariants::{InvariantChecker, InvariantReport};
use maple_phase_lattice::GenesisState;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Rule category. Determines the stage a rule may run in and the stage the
/// pipeline moves to afterwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleCategory {
    /// Structure-preserving transform (Φ). `Open → Open`.
    Transform,
    /// Seal (Ψ). `Open → Sealed`.
    Seal,
    /// Compaction (Ω). `Sealed → Compacted`.
    Compact,
}

impl fmt::Display for RuleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transform => write!(f, "transform"),
            Self::Seal => write!(f, "seal"),
            Self::Compact => write!(f, "compact"),
        }
    }
}

/// Stage firewall: which categories may run in which stage.
pub fn stage_firewall(category: RuleCategory, stage: Stage) -> Result<(), FirewallViolation> {
    match (category, stage) {
        (RuleCategory::Transform, Stage::Open) => Ok(()),
        (RuleCategory::Transform, Stage::Sealed | Stage::Compacted) => {
            Err(FirewallViolation::TransformAfterSeal)
        }
        (RuleCategory::Seal, Stage::Open) => Ok(()),
        (RuleCategory::Seal, Stage::Sealed | Stage::Compacted) => {
            Err(FirewallViolation::AlreadySealed)
        }
        (RuleCategory::Compact, Stage::Sealed) => Ok(()),
        (RuleCategory::Compact, Stage::Open) => Err(FirewallViolation::NotSealed),
        (RuleCategory::Compact, Stage::Compacted) => Err(FirewallViolation::AlreadyCompacted),
    }
}

/// A named, categorized bundle of the four protocol functions.
///
/// Rules never run on their own: [`crate::RuleEngine::apply_rule`] calls
/// them in order and is the only way their effect reaches a pipeline.
pub trait Rule: Send + Sync {
    fn name(&self) -> &str;

    fn category(&self) -> RuleCategory;

    fn mark_kind(&self) -> MarkKind {
        match self.category() {
            RuleCategory::Transform => MarkKind::Transform,
            RuleCategory::Seal => MarkKind::Seal,
            RuleCategory::Compact => MarkKind::Compact,
        }
    }

    /// Firewall. The engine applies [`stage_firewall`] before this
    /// regardless of what an implementation returns here.
    fn requires(&self, pipeline: &Pipeline) -> Result<(), FirewallViolation> {
        stage_firewall(self.category(), pipeline.stage())
    }

    /// Precondition over the current and original states.
    fn pre(
        &self,
        checker: &InvariantChecker,
        state: &GenesisState,
        original: &GenesisState,
    ) -> Result<(), String>;

    /// The transform itself. Seal and compact rules leave the state alone.
    fn apply(&self, state: &GenesisState) -> GenesisState {
        state.clone()
    }

    /// Postcondition over the pre- and post-transform states.
    fn post(
        &self,
        checker: &InvariantChecker,
        before: &GenesisState,
        after: &GenesisState,
        _original: &GenesisState,
    ) -> InvariantReport {
        checker.check_all(before, after)
    }
}

/// Φ: rounds curvature, entropy and structure to a fixed precision.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NormalizeRule {
    decimals: u32,
}

impl NormalizeRule {
    pub const NAME: &'static str = "Φ_normalize";

    pub fn new(decimals: u32) -> Self {
        Self { decimals }
    }

    pub fn decimals(&self) -> u32 {
        self.decimals
    }

    /// Values too large to scale are already coarser than the precision
    /// and come back unchanged.
    fn round(&self, value: f64) -> f64 {
        let scale = 10f64.powi(self.decimals.min(i32::MAX as u32) as i32);
        let scaled = value * scale;
        if !scaled.is_finite() {
            return value;
        }
        scaled.round() / scale
    }
}

impl Default for NormalizeRule {
    fn default() -> Self {
        Self::new(6)
    }
}

impl Rule for NormalizeRule {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Transform
    }

    fn mark_kind(&self) -> MarkKind {
        MarkKind::Normalize
    }

    fn pre(
        &self,
        _checker: &InvariantChecker,
        state: &GenesisState,
        _original: &GenesisState,
    ) -> Result<(), String> {
        if state.has_finite_scalars() {
            Ok(())
        } else {
            Err("scalars must be finite to normalize".into())
        }
    }

    fn apply(&self, state: &GenesisState) -> GenesisState {
        GenesisState {
            curvature: self.round(state.curvature),
            entropy: self.round(state.entropy),
            structure: self.round(state.structure),
            ..state.clone()
        }
    }
}

/// Ψ: irreversibly seals the pipeline.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SealRule;

impl SealRule {
    pub const NAME: &'static str = "Ψ_commit";
}

impl Rule for SealRule {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Seal
    }

    /// The original state (not necessarily the current one) must already
    /// satisfy witness and phase integrity.
    fn pre(
        &self,
        checker: &InvariantChecker,
        _state: &GenesisState,
        original: &GenesisState,
    ) -> Result<(), String> {
        let reasons: Vec<String> = [checker.inv_witness(original), checker.inv_phase(original)]
            .into_iter()
            .filter(|r| !r.holds)
            .map(|r| format!("original state violates {}: {}", r.id, r.reason))
            .collect();
        if reasons.is_empty() {
            Ok(())
        } else {
            Err(reasons.join("; "))
        }
    }
}

/// Ω: folds the mark chain and history into a compact proof.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CompactRule;

impl CompactRule {
    pub const NAME: &'static str = "Ω_compact";
}

impl Rule for CompactRule {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Compact
    }

    fn pre(
        &self,
        checker: &InvariantChecker,
        state: &GenesisState,
        _original: &GenesisState,
    ) -> Result<(), String> {
        let phase = checker.inv_phase(state);
        if phase.holds {
            Ok(())
        } else {
            Err(format!("sealed state violates {}: {}", phase.id, phase.reason))
        }
    }
}
