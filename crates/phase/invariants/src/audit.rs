use crate::types::VerificationResult;
use maple_phase_lattice::{phase_delta, GenesisState, HashStrategy, Phase, WitnessKind};

/// Audit every witness in a state's history.
///
/// Per transition: hash reproduces, kind matches the source phase, the
/// payload agrees with the transition record, and the progress floor holds.
/// Reports each failing transition; never errors.
pub fn verify_all_witnesses(
    strategy: &dyn HashStrategy,
    state: &GenesisState,
) -> VerificationResult {
    let mut result = VerificationResult::tally();

    for (i, t) in state.history.iter().enumerate() {
        let w = &t.witness;
        result.check(w.verify_hash(strategy), || {
            format!("transition {}: witness hash {} does not reproduce", i, w.hash)
        });
        result.check(WitnessKind::for_source(t.from) == Some(w.kind), || {
            format!("transition {}: kind {} invalid for source {}", i, w.kind, t.from)
        });
        result.check(
            w.payload.from == t.from && w.payload.to == t.to && w.payload.tick == t.tick,
            || format!("transition {}: payload disagrees with transition record", i),
        );
        result.check(t.from == Phase::Void || w.payload.progress >= 1.0, || {
            format!("transition {}: progress {:.6} below floor", i, w.payload.progress)
        });
        result.check(phase_delta(t.from, t.to) == 1, || {
            format!("transition {}: {}→{} is not a single step", i, t.from, t.to)
        });
    }

    result
}
