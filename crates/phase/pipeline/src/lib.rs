#![deny(unsafe_code)]
//! # maple-phase-pipeline
//!
//! The irreversible transformation pipeline over [`GenesisState`] values.
//!
//! Every rule runs through one protocol:
//!
//! ```text
//! firewall → precondition → transform → postcondition → mark → record
//! ```
//!
//! and the pipeline moves through its stages exactly once, in order:
//!
//! ```text
//! Open --Φ*--> Open --Ψ--> Sealed --Ω--> Compacted
//! ```
//!
//! Stage order is enforced by the types ([`OpenPipeline`],
//! [`SealedPipeline`], [`CompactedPipeline`]) and again at runtime by the
//! stage firewall inside [`RuleEngine::apply_rule`].
//!
//! ## Key Types
//!
//! - [`RuleEngine`]: Sole entry point for applying rules
//! - [`Rule`]: Trait for built-in and caller-defined rules
//! - [`Pipeline`]: Stage-tagged pipeline value
//! - [`Mark`] / [`MarkChain`]: Append-only, parent-linked provenance log
//! - [`SealProof`] / [`CompactProof`]: Reproducible attestation artifacts
//!
//! [`GenesisState`]: maple_phase_lattice::GenesisState

pub mod engine;
pub mod error;
pub mod mark;
pub mod pipeline;
pub mod proof;
pub mod rule;

pub use engine::RuleEngine;
pub use error::{FirewallViolation, RuleError};
pub use mark::{verify_mark_chain, Mark, MarkChain, MarkKind};
pub use pipeline::{
    CompactedPipeline, OpenPipeline, Pipeline, PipelineCore, SealedPipeline, Stage,
    TransformRecord,
};
pub use proof::{
    verify_compact_proof, verify_pipeline, verify_seal_proof, CompactProof, SealProof,
    StateSnapshot,
};
pub use rule::{stage_firewall, CompactRule, NormalizeRule, Rule, RuleCategory, SealRule};
