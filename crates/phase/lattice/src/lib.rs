#![deny(unsafe_code)]
//! # maple-phase-lattice
//!
//! The phase lattice and axiom engine at the bottom of the phase-evolution
//! engine.
//!
//! A [`GenesisState`] advances one step at a time through the totally
//! ordered phases:
//!
//! ```text
//! void → dot → zero_zero → zero → number
//! ```
//!
//! Every advance is fired by an axiom and recorded as a
//! [`GenesisTransition`] carrying a hash-verifiable [`Witness`].
//!
//! ## Key Types
//!
//! - [`Phase`]: Lifecycle phase with a fixed total order
//! - [`GenesisState`]: Immutable snapshot; every update yields a new value
//! - [`AxiomEngine`]: Energizes a state and fires at most one axiom per step
//! - [`AxiomTable`]: Single source of thresholds for axioms and progress
//! - [`Witness`] / [`CsAssumption`]: Auditable record of a transition
//! - [`HashStrategy`]: Pluggable digest (FNV-1a placeholder, BLAKE3)
//! - [`EvolutionConfig`]: Numeric constants of the engine

pub mod axiom;
pub mod config;
pub mod error;
pub mod hash;
pub mod phase;
pub mod state;
pub mod witness;

pub use axiom::{Axiom, AxiomEngine, AxiomId, AxiomTable, Threshold};
pub use config::EvolutionConfig;
pub use error::{ConfigError, LatticeError};
pub use hash::{canonical_digest, default_strategy, Blake3Strategy, Fnv1a32, HashStrategy};
pub use phase::{phase_delta, Phase};
pub use state::{GenesisState, GenesisTransition};
pub use witness::{build_witness, evaluate_cs, CsAssumption, Witness, WitnessKind, WitnessPayload};
