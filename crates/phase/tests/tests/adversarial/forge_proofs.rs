//! Adversarial test: forged seal and compact proofs are rejected, whether or
//! not the forger recomputes the proof hash.

use maple_phase_lattice::{Blake3Strategy, Phase};
use maple_phase_pipeline::{
    verify_compact_proof, verify_pipeline, verify_seal_proof, CompactedPipeline, Pipeline,
    RuleEngine,
};
use maple_phase_tests::canonical_compacted;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn setup() -> (RuleEngine, CompactedPipeline) {
    (RuleEngine::default(), canonical_compacted().unwrap())
}

// ---------------------------------------------------------------------------
// Tests: seal proofs
// ---------------------------------------------------------------------------

#[test]
fn edited_seal_proof_without_rehash_is_rejected() {
    let (rules, p) = setup();
    let mut proof = p.seal_proof().clone();
    proof.state_at_seal.tick += 1;
    let result = verify_seal_proof(rules.hasher().as_ref(), &proof, p.current());
    assert!(!result.valid);
    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].contains("does not reproduce"));
}

#[test]
fn rehashed_seal_proof_still_disagrees_with_live_state() {
    let (rules, p) = setup();
    let hasher = rules.hasher().as_ref();
    let mut proof = p.seal_proof().clone();
    proof.state_at_seal.phase = Phase::Zero;
    proof.state_at_seal.transition_count = 3;
    proof.hash = proof.compute_hash(hasher);

    let result = verify_seal_proof(hasher, &proof, p.current());
    assert!(!result.valid);
    assert_eq!(result.errors.len(), 2);
    assert!(result.errors[0].contains("sealed phase zero"));
}

#[test]
fn seal_proof_with_failed_invariants_is_rejected() {
    let (rules, p) = setup();
    let hasher = rules.hasher().as_ref();
    let mut proof = p.seal_proof().clone();
    proof.invariants_at_seal.inv_phase.holds = false;
    proof.invariants_at_seal.inv_phase.reason = "forged".into();
    proof.hash = proof.compute_hash(hasher);

    let result = verify_seal_proof(hasher, &proof, p.current());
    assert!(!result.valid);
    assert!(result.errors[0].contains("inv_phase did not hold at seal: forged"));
}

// ---------------------------------------------------------------------------
// Tests: compact proofs
// ---------------------------------------------------------------------------

#[test]
fn edited_compact_proof_without_rehash_is_rejected() {
    let (rules, p) = setup();
    let mut proof = p.compact_proof().clone();
    proof.genesis_transitions = 5;
    let result = verify_compact_proof(rules.hasher().as_ref(), &proof);
    assert!(!result.valid);
    assert!(result.errors[0].contains("does not reproduce"));
}

#[test]
fn rehashed_compact_proof_must_still_meet_requirements() {
    let (rules, p) = setup();
    let hasher = rules.hasher().as_ref();
    let mut proof = p.compact_proof().clone();
    proof.mark_hashes.truncate(1);
    proof.genesis_transitions = 0;
    proof.all_cs_held = false;
    proof.hash = proof.compute_hash(hasher);

    let result = verify_compact_proof(hasher, &proof);
    assert!(!result.valid);
    assert_eq!(result.checks_performed, 4);
    assert_eq!(result.checks_passed, 1);
}

#[test]
fn rehashed_compact_proof_is_caught_against_the_pipeline() {
    let (rules, p) = setup();
    let hasher = rules.hasher().as_ref();
    let mut proof = p.compact_proof().clone();
    proof.final_hash = "00000000".into();
    proof.hash = proof.compute_hash(hasher);

    let mut value = serde_json::to_value(Pipeline::from(p)).unwrap();
    value["compact_proof"] = serde_json::to_value(&proof).unwrap();
    let forged: Pipeline = serde_json::from_value(value).unwrap();

    let own = verify_compact_proof(hasher, &proof);
    assert!(own.valid, "{:?}", own.errors);
    let whole = verify_pipeline(hasher, &forged);
    assert!(!whole.valid);
    assert!(whole
        .errors
        .iter()
        .any(|e| e.contains("final hash differs from the current state")));
}

// ---------------------------------------------------------------------------
// Tests: tampered state and wrong strategy
// ---------------------------------------------------------------------------

#[test]
fn tampered_witness_in_sealed_state_is_caught() {
    let (rules, p) = setup();
    let mut value = serde_json::to_value(Pipeline::from(p)).unwrap();
    value["core"]["current"]["history"][1]["witness"]["payload"]["curvature"] = 0.99.into();
    let forged: Pipeline = serde_json::from_value(value).unwrap();

    let result = verify_pipeline(rules.hasher().as_ref(), &forged);
    assert!(!result.valid);
    assert!(result.errors.iter().any(|e| e.contains("transition 1")));
}

#[test]
fn proofs_do_not_verify_under_another_strategy() {
    let (_, p) = setup();
    assert!(!verify_seal_proof(&Blake3Strategy, p.seal_proof(), p.current()).valid);
    assert!(!verify_compact_proof(&Blake3Strategy, p.compact_proof()).valid);
}
