use crate::axiom::AxiomId;
use crate::config::EvolutionConfig;
use crate::hash::{canonical_digest, HashStrategy};
use crate::phase::Phase;
use crate::witness::Witness;
use serde::{Deserialize, Serialize};

/// One recorded phase advance. Created exactly once per axiom firing and
/// immutable thereafter.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GenesisTransition {
    pub from: Phase,
    pub to: Phase,
    pub tick: u64,
    /// Curvature at the transition point (energized value).
    pub curvature: f64,
    pub axiom: AxiomId,
    pub witness: Witness,
}

/// Immutable snapshot of the engine.
///
/// Updates never mutate a published snapshot; the engine clones and returns
/// a new value, so holding on to an earlier state is always safe.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GenesisState {
    pub phase: Phase,
    pub curvature: f64,
    pub entropy: f64,
    pub structure: f64,
    /// Append-only transition history.
    pub history: Vec<GenesisTransition>,
    /// Monotonic step counter.
    pub tick: u64,
}

impl GenesisState {
    /// The canonical initial state: `void`, curvature 0, entropy 1.0,
    /// structure 0.1, tick 0, empty history.
    pub fn genesis() -> Self {
        Self::from_config(&EvolutionConfig::default())
    }

    pub fn from_config(config: &EvolutionConfig) -> Self {
        Self {
            phase: Phase::Void,
            curvature: 0.0,
            entropy: config.initial_entropy,
            structure: config.initial_structure,
            history: Vec::new(),
            tick: 0,
        }
    }

    pub fn transition_count(&self) -> usize {
        self.history.len()
    }

    pub fn is_terminal(&self) -> bool {
        self.phase.is_terminal()
    }

    /// Phases visited, e.g. `void→dot→zero_zero→zero→number`.
    pub fn phase_progression(&self) -> String {
        match self.history.first() {
            None => self.phase.to_string(),
            Some(first) => {
                let mut parts = vec![first.from.to_string()];
                parts.extend(self.history.iter().map(|t| t.to.to_string()));
                parts.join("→")
            }
        }
    }

    /// Whether the CS assumption held for every recorded transition.
    pub fn all_cs_held(&self) -> bool {
        self.history
            .iter()
            .all(|t| t.witness.payload.cs.satisfied)
    }

    /// Curvature, entropy and structure are all finite. Non-finite values do
    /// not survive canonical serialization.
    pub fn has_finite_scalars(&self) -> bool {
        [self.curvature, self.entropy, self.structure]
            .iter()
            .all(|v| v.is_finite())
    }

    /// Canonical digest of the whole snapshot.
    pub fn digest(&self, strategy: &dyn HashStrategy) -> String {
        canonical_digest(strategy, self)
    }
}

impl Default for GenesisState {
    fn default() -> Self {
        Self::genesis()
    }
}
