use crate::config::EvolutionConfig;
use crate::error::{ConfigError, LatticeError};
use crate::hash::{default_strategy, HashStrategy};
use crate::phase::{phase_delta, Phase};
use crate::state::{GenesisState, GenesisTransition};
use crate::witness::{build_witness, evaluate_cs};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Name of the axiom that fired a transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AxiomId {
    Existence,
    StructureSeparation,
    ValueFixation,
    NumberGenesis,
}

impl fmt::Display for AxiomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Existence => write!(f, "existence"),
            Self::StructureSeparation => write!(f, "structure_separation"),
            Self::ValueFixation => write!(f, "value_fixation"),
            Self::NumberGenesis => write!(f, "number_genesis"),
        }
    }
}

/// Numeric precondition of an axiom.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(tag = "on", content = "at", rename_all = "snake_case")]
pub enum Threshold {
    Unconditional,
    Curvature(f64),
    Structure(f64),
}

impl Threshold {
    pub fn value(&self) -> f64 {
        match self {
            Self::Unconditional => 0.0,
            Self::Curvature(t) | Self::Structure(t) => *t,
        }
    }

    pub fn is_met(&self, state: &GenesisState) -> bool {
        match self {
            Self::Unconditional => true,
            Self::Curvature(t) => state.curvature >= *t,
            Self::Structure(t) => state.structure >= *t,
        }
    }

    /// Ratio of the observed quantity to the threshold. `>= 1.0` whenever
    /// [`Threshold::is_met`] holds.
    pub fn progress(&self, state: &GenesisState) -> f64 {
        match self {
            Self::Unconditional => 1.0,
            Self::Curvature(t) => state.curvature / t,
            Self::Structure(t) => state.structure / t,
        }
    }
}

/// A predicate + effect pair firing a single phase advance.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Axiom {
    pub id: AxiomId,
    pub from: Phase,
    pub to: Phase,
    pub threshold: Threshold,
}

/// The ordered axiom table.
///
/// Both the firing predicates and [`AxiomTable::compute_progress`] read
/// their thresholds from here, so the two cannot drift apart.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AxiomTable {
    axioms: [Axiom; 4],
}

impl AxiomTable {
    pub fn from_config(config: &EvolutionConfig) -> Self {
        Self {
            axioms: [
                Axiom {
                    id: AxiomId::Existence,
                    from: Phase::Void,
                    to: Phase::Dot,
                    threshold: Threshold::Unconditional,
                },
                Axiom {
                    id: AxiomId::StructureSeparation,
                    from: Phase::Dot,
                    to: Phase::ZeroZero,
                    threshold: Threshold::Curvature(config.critical_curvature * 0.5),
                },
                Axiom {
                    id: AxiomId::ValueFixation,
                    from: Phase::ZeroZero,
                    to: Phase::Zero,
                    threshold: Threshold::Curvature(config.critical_curvature),
                },
                Axiom {
                    id: AxiomId::NumberGenesis,
                    from: Phase::Zero,
                    to: Phase::Number,
                    threshold: Threshold::Structure(config.number_structure_threshold),
                },
            ],
        }
    }

    /// Axioms in firing order.
    pub fn axioms(&self) -> &[Axiom] {
        &self.axioms
    }

    pub fn axiom_for(&self, phase: Phase) -> Option<&Axiom> {
        self.axioms.iter().find(|a| a.from == phase)
    }

    /// `(threshold, progress)` for the state's current phase. `void` and
    /// `number` report `(0, 1.0)`.
    pub fn compute_progress(&self, state: &GenesisState) -> (f64, f64) {
        match self.axiom_for(state.phase) {
            Some(axiom) => (axiom.threshold.value(), axiom.threshold.progress(state)),
            None => (0.0, 1.0),
        }
    }
}

impl Default for AxiomTable {
    fn default() -> Self {
        Self::from_config(&EvolutionConfig::default())
    }
}

/// Energizes states and fires at most one axiom per step.
#[derive(Clone, Debug)]
pub struct AxiomEngine {
    config: EvolutionConfig,
    table: AxiomTable,
    hasher: Arc<dyn HashStrategy>,
}

impl AxiomEngine {
    pub fn new(config: EvolutionConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            table: AxiomTable::from_config(&config),
            config,
            hasher: default_strategy(),
        })
    }

    pub fn with_hash_strategy(mut self, hasher: Arc<dyn HashStrategy>) -> Self {
        self.hasher = hasher;
        self
    }

    pub fn config(&self) -> &EvolutionConfig {
        &self.config
    }

    pub fn table(&self) -> &AxiomTable {
        &self.table
    }

    pub fn hasher(&self) -> &Arc<dyn HashStrategy> {
        &self.hasher
    }

    /// A fresh genesis state under this engine's configuration.
    pub fn genesis(&self) -> GenesisState {
        GenesisState::from_config(&self.config)
    }

    /// Apply one step of energy and decay without firing any axiom.
    ///
    /// Negative or non-finite energy counts as zero, and curvature stays
    /// within `[0, curvature_ceiling]`.
    pub fn energize(&self, state: &GenesisState, energy: f64) -> GenesisState {
        let energy = effective_energy(energy);
        let mut next = state.clone();
        next.curvature =
            (state.curvature + energy).clamp(0.0, self.config.curvature_ceiling);
        next.entropy = state.entropy * self.config.entropy_decay;
        next.structure = state.structure * self.config.structure_growth;
        next.tick = state.tick + 1;
        next
    }

    /// One evolution step.
    ///
    /// Axioms are tried in table order against the energized state; the
    /// first whose precondition holds fires. Threshold, progress and CS are
    /// all computed on the energized state. If nothing fires, the energized
    /// state is returned with no transition recorded.
    ///
    /// # Panics
    ///
    /// Panics if a firing axiom does not advance the phase by exactly one
    /// step. That can only happen if the axiom table itself is broken.
    pub fn evolve(&self, state: &GenesisState, energy: f64) -> GenesisState {
        let energy = effective_energy(energy);
        let mut next = self.energize(state, energy);

        let Some(axiom) = self
            .table
            .axioms()
            .iter()
            .find(|a| a.from == next.phase && a.threshold.is_met(&next))
        else {
            return next;
        };

        if phase_delta(axiom.from, axiom.to) != 1 {
            error!(
                axiom = %axiom.id,
                from = %axiom.from,
                to = %axiom.to,
                "Firewall violated by axiom table"
            );
            panic!(
                "firewall violated: axiom {} moves {} -> {}",
                axiom.id, axiom.from, axiom.to
            );
        }

        let (threshold, progress) = self.table.compute_progress(&next);
        let cs = evaluate_cs(&next, energy);
        let witness = build_witness(
            self.hasher.as_ref(),
            axiom.from,
            axiom.to,
            &next,
            threshold,
            progress,
            cs,
        )
        .unwrap_or_else(|| unreachable!("axiom {} has a terminal source phase", axiom.id));

        debug!(
            axiom = %axiom.id,
            from = %axiom.from,
            to = %axiom.to,
            tick = next.tick,
            progress,
            witness = %witness.hash,
            "Axiom fired"
        );

        next.history.push(GenesisTransition {
            from: axiom.from,
            to: axiom.to,
            tick: next.tick,
            curvature: next.curvature,
            axiom: axiom.id,
            witness,
        });
        next.phase = axiom.to;
        next
    }

    /// [`AxiomEngine::evolve`] that rejects negative or non-finite energy.
    pub fn evolve_checked(
        &self,
        state: &GenesisState,
        energy: f64,
    ) -> Result<GenesisState, LatticeError> {
        if !energy.is_finite() || energy < 0.0 {
            return Err(LatticeError::InvalidEnergy(energy));
        }
        Ok(self.evolve(state, energy))
    }

    /// Evolve with constant energy until the terminal phase or `max_steps`.
    pub fn run_until(&self, state: &GenesisState, energy: f64, max_steps: usize) -> GenesisState {
        let mut current = state.clone();
        for _ in 0..max_steps {
            if current.is_terminal() {
                break;
            }
            current = self.evolve(&current, energy);
        }
        current
    }
}

/// Energy as the engine applies it: negative and non-finite inputs are zero.
fn effective_energy(energy: f64) -> f64 {
    if energy.is_finite() && energy >= 0.0 {
        energy
    } else {
        warn!(energy, "Invalid energy treated as zero");
        0.0
    }
}

impl Default for AxiomEngine {
    fn default() -> Self {
        Self {
            config: EvolutionConfig::default(),
            table: AxiomTable::default(),
            hasher: default_strategy(),
        }
    }
}
