//! E2E: create → evolve → Φ → Ψ → Ω, then verify every artifact.

use maple_phase_lattice::{AxiomEngine, Blake3Strategy, EvolutionConfig, Phase};
use maple_phase_pipeline::{
    verify_compact_proof, verify_pipeline, verify_seal_proof, MarkKind, NormalizeRule, Pipeline,
    RuleEngine, SealRule, Stage,
};
use maple_phase_tests::{canonical_compacted, evolve_constant, run_pipeline, CANONICAL_ENERGY};
use std::sync::Arc;

#[test]
fn canonical_run_produces_valid_proofs() {
    let p = canonical_compacted().unwrap();
    let hasher = RuleEngine::default().hasher().clone();

    let seal = verify_seal_proof(hasher.as_ref(), p.seal_proof(), p.current());
    assert!(seal.valid, "{:?}", seal.errors);
    let compact = verify_compact_proof(hasher.as_ref(), p.compact_proof());
    assert!(compact.valid, "{:?}", compact.errors);

    let whole = verify_pipeline(hasher.as_ref(), &Pipeline::from(p.clone()));
    assert!(whole.valid, "{:?}", whole.errors);
    assert_eq!(whole.checks_passed, whole.checks_performed);
}

#[test]
fn compact_proof_summarises_the_run() {
    let p = canonical_compacted().unwrap();
    let proof = p.compact_proof();
    assert_eq!(proof.genesis_transitions, 4);
    assert_eq!(proof.phase_progression, "void→dot→zero_zero→zero→number");
    assert!(proof.all_cs_held);
    assert_eq!(proof.steps_compacted, p.core().records().len());
    assert_eq!(proof.mark_hashes.len(), p.core().marks().len());
    assert_eq!(proof.seal_proof_hash.as_ref(), Some(&p.seal_proof().hash));
    assert!(p.seal_proof().all_cs_held);
}

#[test]
fn records_and_marks_line_up() {
    let p = canonical_compacted().unwrap();
    let records = p.core().records();
    let marks = p.core().marks().marks();
    assert_eq!(records.len(), 3);
    for (record, mark) in records.iter().zip(marks) {
        assert_eq!(&record.mark, mark);
        assert!(record.invariants.holds());
    }
    let kinds: Vec<MarkKind> = marks.iter().map(|m| m.kind).collect();
    assert_eq!(kinds, vec![MarkKind::Normalize, MarkKind::Seal, MarkKind::Compact]);
    assert_eq!(records[0].rule_name, NormalizeRule::NAME);
    assert_eq!(records[1].rule_name, SealRule::NAME);
    // Seal and compact leave the state alone.
    assert_eq!(marks[1].source_hash, marks[1].result_hash);
    assert_eq!(marks[2].source_hash, marks[2].result_hash);
    assert_eq!(marks[0].result_hash, marks[1].source_hash);
}

#[test]
fn repeated_normalize_before_seal() {
    let axioms = AxiomEngine::default();
    let rules = RuleEngine::from_axiom_engine(&axioms);
    let mut open = rules.open(evolve_constant(&axioms, CANONICAL_ENERGY));
    for _ in 0..3 {
        open = rules.normalize(&open).unwrap();
    }
    assert_eq!(open.core().marks().len(), 3);
    let compacted = rules.compact(&rules.seal(&open).unwrap()).unwrap();
    assert_eq!(compacted.compact_proof().steps_compacted, 5);
    assert_eq!(compacted.current().phase, Phase::Number);
    assert_eq!(Pipeline::from(compacted).stage(), Stage::Compacted);
}

#[test]
fn blake3_pipeline_verifies_under_blake3_only() {
    let axioms = AxiomEngine::new(EvolutionConfig::fast())
        .unwrap()
        .with_hash_strategy(Arc::new(Blake3Strategy));
    let rules = RuleEngine::from_axiom_engine(&axioms);
    let p = run_pipeline(&rules, evolve_constant(&axioms, CANONICAL_ENERGY)).unwrap();
    assert_eq!(p.compact_proof().hash.len(), 64);

    let pipeline = Pipeline::from(p);
    assert!(verify_pipeline(&Blake3Strategy, &pipeline).valid);
    let fnv = RuleEngine::default();
    assert!(!verify_pipeline(fnv.hasher().as_ref(), &pipeline).valid);
}

#[test]
fn pipeline_json_round_trip_keeps_proofs_valid() {
    let p = Pipeline::from(canonical_compacted().unwrap());
    let json = serde_json::to_string(&p).unwrap();
    let back: Pipeline = serde_json::from_str(&json).unwrap();
    assert_eq!(back.stage(), Stage::Compacted);
    assert_eq!(back.compact_proof(), p.compact_proof());
    let hasher = RuleEngine::default().hasher().clone();
    assert!(verify_pipeline(hasher.as_ref(), &back).valid);
}
