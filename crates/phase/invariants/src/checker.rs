use crate::types::{InvariantId, InvariantReport, InvariantResult};
use maple_phase_lattice::{
    default_strategy, phase_delta, GenesisState, HashStrategy, Phase, WitnessKind,
};
use std::sync::Arc;
use tracing::debug;

/// Evaluates the three invariants.
///
/// Witness hashes are recomputed with the injected strategy, which must be
/// the one the states were produced under.
#[derive(Clone, Debug)]
pub struct InvariantChecker {
    hasher: Arc<dyn HashStrategy>,
}

impl InvariantChecker {
    pub fn new(hasher: Arc<dyn HashStrategy>) -> Self {
        Self { hasher }
    }

    pub fn hasher(&self) -> &Arc<dyn HashStrategy> {
        &self.hasher
    }

    /// Structural skeleton: what a shape-changing but skeleton-preserving
    /// transform must keep.
    pub fn inv_ast(&self, before: &GenesisState, after: &GenesisState) -> InvariantResult {
        let mut violations = Vec::new();
        if before.history.len() != after.history.len() {
            violations.push(format!(
                "history length changed: {} -> {}",
                before.history.len(),
                after.history.len()
            ));
        }
        for (i, (b, a)) in before.history.iter().zip(&after.history).enumerate() {
            if b.from != a.from || b.to != a.to {
                violations.push(format!(
                    "transition {} changed: {}→{} became {}→{}",
                    i, b.from, b.to, a.from, a.to
                ));
            }
            if b.witness.kind != a.witness.kind {
                violations.push(format!(
                    "transition {} witness kind changed: {} -> {}",
                    i, b.witness.kind, a.witness.kind
                ));
            }
        }
        if before.phase != after.phase {
            violations.push(format!("phase changed: {} -> {}", before.phase, after.phase));
        }
        if before.tick != after.tick {
            violations.push(format!("tick changed: {} -> {}", before.tick, after.tick));
        }
        InvariantResult::from_violations(InvariantId::Ast, violations)
    }

    /// Witness integrity over the whole history.
    pub fn inv_witness(&self, state: &GenesisState) -> InvariantResult {
        let mut violations = Vec::new();
        for (i, t) in state.history.iter().enumerate() {
            if !t.witness.verify_hash(self.hasher.as_ref()) {
                violations.push(format!("transition {} witness hash mismatch", i));
            }
            if WitnessKind::for_source(t.from) != Some(t.witness.kind) {
                violations.push(format!(
                    "transition {} witness kind {} does not match source phase {}",
                    i, t.witness.kind, t.from
                ));
            }
            if t.from != Phase::Void && t.witness.payload.progress < 1.0 {
                violations.push(format!(
                    "transition {} fired with progress {:.6} < 1.0",
                    i, t.witness.payload.progress
                ));
            }
        }
        InvariantResult::from_violations(InvariantId::Witness, violations)
    }

    /// Every recorded transition advances exactly one phase.
    pub fn inv_phase(&self, state: &GenesisState) -> InvariantResult {
        let violations = state
            .history
            .iter()
            .enumerate()
            .filter(|(_, t)| phase_delta(t.from, t.to) != 1)
            .map(|(i, t)| {
                format!(
                    "transition {} {}→{} has delta {}",
                    i,
                    t.from,
                    t.to,
                    phase_delta(t.from, t.to)
                )
            })
            .collect();
        InvariantResult::from_violations(InvariantId::Phase, violations)
    }

    /// All three: skeleton of `after` against `before`, witness and phase
    /// integrity of `after`.
    pub fn check_all(&self, before: &GenesisState, after: &GenesisState) -> InvariantReport {
        let report = InvariantReport {
            inv_ast: self.inv_ast(before, after),
            inv_witness: self.inv_witness(after),
            inv_phase: self.inv_phase(after),
        };
        debug!(
            holds = report.holds(),
            failures = ?report.failures(),
            "Invariants checked"
        );
        report
    }
}

impl Default for InvariantChecker {
    fn default() -> Self {
        Self::new(default_strategy())
    }
}
