//! Seal and compact proofs.
//!
//! Both proofs hash their own fields (everything except `hash`) with the
//! pipeline's [`HashStrategy`], so a verifier only needs the proof itself
//! and, for seal proofs, the state to compare against.

use crate::mark::Mark;
use crate::pipeline::{Pipeline, PipelineCore};
use maple_phase_invariants::{verify_all_witnesses, InvariantReport, VerificationResult};
use maple_phase_lattice::{canonical_digest, GenesisState, HashStrategy, Phase};
use serde::{Deserialize, Serialize};

/// Point-in-time summary of a [`GenesisState`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub phase: Phase,
    pub transition_count: usize,
    pub tick: u64,
    pub curvature: f64,
    pub entropy: f64,
    pub structure: f64,
    pub state_hash: String,
}

impl StateSnapshot {
    pub fn capture(strategy: &dyn HashStrategy, state: &GenesisState) -> Self {
        Self {
            phase: state.phase,
            transition_count: state.transition_count(),
            tick: state.tick,
            curvature: state.curvature,
            entropy: state.entropy,
            structure: state.structure,
            state_hash: state.digest(strategy),
        }
    }
}

/// Produced by Ψ.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SealProof {
    pub seal_mark: Mark,
    pub state_at_seal: StateSnapshot,
    pub invariants_at_seal: InvariantReport,
    pub all_cs_held: bool,
    pub hash: String,
}

#[derive(Serialize)]
struct SealBody<'a> {
    seal_mark: &'a Mark,
    state_at_seal: &'a StateSnapshot,
    invariants_at_seal: &'a InvariantReport,
    all_cs_held: bool,
}

impl SealProof {
    pub(crate) fn build(
        strategy: &dyn HashStrategy,
        seal_mark: Mark,
        state: &GenesisState,
        invariants_at_seal: InvariantReport,
    ) -> Self {
        let mut proof = Self {
            seal_mark,
            state_at_seal: StateSnapshot::capture(strategy, state),
            invariants_at_seal,
            all_cs_held: state.all_cs_held(),
            hash: String::new(),
        };
        proof.hash = proof.compute_hash(strategy);
        proof
    }

    /// Hash over every field except `hash`.
    pub fn compute_hash(&self, strategy: &dyn HashStrategy) -> String {
        canonical_digest(
            strategy,
            &SealBody {
                seal_mark: &self.seal_mark,
                state_at_seal: &self.state_at_seal,
                invariants_at_seal: &self.invariants_at_seal,
                all_cs_held: self.all_cs_held,
            },
        )
    }
}

/// Produced by Ω. Folds the mark chain and history into one record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CompactProof {
    pub compact_mark: Mark,
    pub original_hash: String,
    pub final_hash: String,
    /// Rule applications folded in, Ω included.
    pub steps_compacted: usize,
    /// Digest of every mark, in chain order, Ω's own mark last.
    pub mark_hashes: Vec<String>,
    pub seal_proof_hash: Option<String>,
    pub genesis_transitions: usize,
    pub phase_progression: String,
    pub all_cs_held: bool,
    pub hash: String,
}

#[derive(Serialize)]
struct CompactBody<'a> {
    compact_mark: &'a Mark,
    original_hash: &'a str,
    final_hash: &'a str,
    steps_compacted: usize,
    mark_hashes: &'a [String],
    seal_proof_hash: Option<&'a str>,
    genesis_transitions: usize,
    phase_progression: &'a str,
    all_cs_held: bool,
}

impl CompactProof {
    /// `core` must already contain the compaction mark and record.
    pub(crate) fn build(
        strategy: &dyn HashStrategy,
        compact_mark: Mark,
        core: &PipelineCore,
        seal_proof: Option<&SealProof>,
    ) -> Self {
        let mut proof = Self {
            compact_mark,
            original_hash: core.original().digest(strategy),
            final_hash: core.current().digest(strategy),
            steps_compacted: core.records().len(),
            mark_hashes: core.marks().digests(strategy),
            seal_proof_hash: seal_proof.map(|p| p.hash.clone()),
            genesis_transitions: core.current().transition_count(),
            phase_progression: core.current().phase_progression(),
            all_cs_held: core.current().all_cs_held(),
            hash: String::new(),
        };
        proof.hash = proof.compute_hash(strategy);
        proof
    }

    /// Hash over every field except `hash`.
    pub fn compute_hash(&self, strategy: &dyn HashStrategy) -> String {
        canonical_digest(
            strategy,
            &CompactBody {
                compact_mark: &self.compact_mark,
                original_hash: &self.original_hash,
                final_hash: &self.final_hash,
                steps_compacted: self.steps_compacted,
                mark_hashes: &self.mark_hashes,
                seal_proof_hash: self.seal_proof_hash.as_deref(),
                genesis_transitions: self.genesis_transitions,
                phase_progression: &self.phase_progression,
                all_cs_held: self.all_cs_held,
            },
        )
    }
}

/// Verify a seal proof against the live state.
pub fn verify_seal_proof(
    strategy: &dyn HashStrategy,
    proof: &SealProof,
    state: &GenesisState,
) -> VerificationResult {
    let mut result = VerificationResult::tally();
    let snapshot = &proof.state_at_seal;

    result.check(proof.compute_hash(strategy) == proof.hash, || {
        format!("seal proof hash {} does not reproduce", proof.hash)
    });
    result.check(snapshot.phase == state.phase, || {
        format!("sealed phase {} differs from live phase {}", snapshot.phase, state.phase)
    });
    result.check(snapshot.transition_count == state.transition_count(), || {
        format!(
            "sealed transition count {} differs from live count {}",
            snapshot.transition_count,
            state.transition_count()
        )
    });
    result.check(proof.invariants_at_seal.inv_witness.holds, || {
        format!(
            "inv_witness did not hold at seal: {}",
            proof.invariants_at_seal.inv_witness.reason
        )
    });
    result.check(proof.invariants_at_seal.inv_phase.holds, || {
        format!(
            "inv_phase did not hold at seal: {}",
            proof.invariants_at_seal.inv_phase.reason
        )
    });

    result
}

/// Verify a compact proof from its own fields.
pub fn verify_compact_proof(
    strategy: &dyn HashStrategy,
    proof: &CompactProof,
) -> VerificationResult {
    let mut result = VerificationResult::tally();

    result.check(proof.compute_hash(strategy) == proof.hash, || {
        format!("compact proof hash {} does not reproduce", proof.hash)
    });
    result.check(proof.mark_hashes.len() >= 2, || {
        format!(
            "mark chain has {} hashes, expected at least seal and compact",
            proof.mark_hashes.len()
        )
    });
    result.check(proof.genesis_transitions >= 1, || {
        "no genesis transitions recorded".to_string()
    });
    result.check(proof.all_cs_held, || {
        "CS assumption did not hold for every transition".to_string()
    });

    result
}

/// Everything that can be checked about a pipeline value: mark-chain
/// linkage, agreement between records and marks, every witness in the
/// current history, and whichever proofs the stage carries, cross-checked
/// against the chain and live state.
pub fn verify_pipeline(strategy: &dyn HashStrategy, pipeline: &Pipeline) -> VerificationResult {
    let core = pipeline.core();
    let mut result = core.marks().verify(strategy);

    let marks = core.marks().marks();
    result.check(core.records().len() == marks.len(), || {
        format!(
            "{} transform records but {} marks",
            core.records().len(),
            marks.len()
        )
    });
    for (i, (record, mark)) in core.records().iter().zip(marks).enumerate() {
        result.check(record.mark == *mark, || {
            format!(
                "record {} ({}) carries mark {}, chain has {}",
                i, record.rule_name, record.mark.id, mark.id
            )
        });
    }

    result.merge(verify_all_witnesses(strategy, core.current()));

    if let Some(seal) = pipeline.seal_proof() {
        result.merge(verify_seal_proof(strategy, seal, core.current()));
        result.check(core.marks().marks().contains(&seal.seal_mark), || {
            format!("seal mark {} is not in the mark chain", seal.seal_mark.id)
        });
    }

    if let Some(compact) = pipeline.compact_proof() {
        result.merge(verify_compact_proof(strategy, compact));
        result.check(compact.mark_hashes == core.marks().digests(strategy), || {
            "compact proof mark hashes differ from the mark chain".to_string()
        });
        result.check(compact.final_hash == core.current().digest(strategy), || {
            "compact proof final hash differs from the current state".to_string()
        });
        result.check(compact.original_hash == core.original().digest(strategy), || {
            "compact proof original hash differs from the original state".to_string()
        });
        result.check(
            compact.seal_proof_hash.as_deref() == pipeline.seal_proof().map(|s| s.hash.as_str()),
            || "compact proof does not reference the seal proof".to_string(),
        );
    }

    result
}
