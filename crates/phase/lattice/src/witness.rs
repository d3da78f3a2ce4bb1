use crate::hash::{canonical_digest, HashStrategy};
use crate::phase::Phase;
use crate::state::GenesisState;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of a transition, determined solely by its source phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WitnessKind {
    /// `void → dot`
    Emergence,
    /// `dot → zero_zero`
    Separation,
    /// `zero_zero → zero`
    Fixation,
    /// `zero → number`
    Genesis,
}

impl WitnessKind {
    /// The witness kind for a transition leaving `from`. The terminal phase
    /// has no outgoing transition.
    pub fn for_source(from: Phase) -> Option<WitnessKind> {
        match from {
            Phase::Void => Some(Self::Emergence),
            Phase::Dot => Some(Self::Separation),
            Phase::ZeroZero => Some(Self::Fixation),
            Phase::Zero => Some(Self::Genesis),
            Phase::Number => None,
        }
    }
}

impl fmt::Display for WitnessKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Emergence => write!(f, "emergence"),
            Self::Separation => write!(f, "separation"),
            Self::Fixation => write!(f, "fixation"),
            Self::Genesis => write!(f, "genesis"),
        }
    }
}

/// General-position assumption: the precondition under which a transition
/// is claimed unique. Recomputed at every transition and embedded in the
/// witness so it can be audited later.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CsAssumption {
    pub satisfied: bool,
    /// `clamp(structure) · clamp(energy) · clamp(entropy)`, each to [0, 1].
    pub indicator: f64,
    pub description: String,
}

/// Evaluate the CS assumption against an (energized) state.
pub fn evaluate_cs(state: &GenesisState, energy: f64) -> CsAssumption {
    let satisfied = state.structure > 0.0 && energy > 0.0 && state.entropy > 0.0;
    let indicator =
        state.structure.clamp(0.0, 1.0) * energy.clamp(0.0, 1.0) * state.entropy.clamp(0.0, 1.0);
    let description = if satisfied {
        format!("general position holds (indicator {:.6})", indicator)
    } else {
        let mut degenerate = Vec::new();
        if state.structure <= 0.0 {
            degenerate.push("structure");
        }
        if energy <= 0.0 {
            degenerate.push("energy");
        }
        if state.entropy <= 0.0 {
            degenerate.push("entropy");
        }
        format!("degenerate position: {} not positive", degenerate.join(", "))
    };
    CsAssumption {
        satisfied,
        indicator,
        description,
    }
}

/// The hashed body of a witness. Field order is the canonical order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WitnessPayload {
    pub from: Phase,
    pub to: Phase,
    pub tick: u64,
    pub curvature: f64,
    pub entropy: f64,
    pub structure: f64,
    pub threshold: f64,
    pub progress: f64,
    pub cs: CsAssumption,
}

/// Hash-verifiable record of the conditions under which a transition
/// occurred. `hash == canonical_digest(payload)` must always hold.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Witness {
    pub kind: WitnessKind,
    pub hash: String,
    pub payload: WitnessPayload,
}

impl Witness {
    /// Recompute the payload digest and compare it with the stored hash.
    pub fn verify_hash(&self, strategy: &dyn HashStrategy) -> bool {
        canonical_digest(strategy, &self.payload) == self.hash
    }
}

/// Assemble a witness for `from → to` observed on the energized `state`.
///
/// Returns `None` when `from` is terminal (no witness kind exists).
pub fn build_witness(
    strategy: &dyn HashStrategy,
    from: Phase,
    to: Phase,
    state: &GenesisState,
    threshold: f64,
    progress: f64,
    cs: CsAssumption,
) -> Option<Witness> {
    let kind = WitnessKind::for_source(from)?;
    let payload = WitnessPayload {
        from,
        to,
        tick: state.tick,
        curvature: state.curvature,
        entropy: state.entropy,
        structure: state.structure,
        threshold,
        progress,
        cs,
    };
    let hash = canonical_digest(strategy, &payload);
    Some(Witness {
        kind,
        hash,
        payload,
    })
}
