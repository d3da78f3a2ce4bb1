//! Adversarial test: the stage order cannot be violated, even when the
//! stage tag is forcibly miscast.
//!
//! Each misuse is tried through the generic `apply_rule` entry point on both
//! an honestly tagged pipeline and one whose tag was rewritten in its
//! serialized form before being loaded back.

use maple_phase_invariants::InvariantChecker;
use maple_phase_lattice::{AxiomEngine, GenesisState};
use maple_phase_pipeline::{
    CompactRule, FirewallViolation, MarkKind, NormalizeRule, Pipeline, Rule, RuleCategory,
    RuleEngine, RuleError, SealRule, Stage,
};
use maple_phase_tests::{evolve_constant, CANONICAL_ENERGY};
use serde_json::Value;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

struct Fixture {
    rules: RuleEngine,
    open: Pipeline,
    sealed: Pipeline,
    compacted: Pipeline,
}

fn fixture() -> Fixture {
    let axioms = AxiomEngine::default();
    let rules = RuleEngine::from_axiom_engine(&axioms);
    let open = rules.open(evolve_constant(&axioms, CANONICAL_ENERGY));
    let sealed = rules.seal(&open).unwrap();
    let compacted = rules.compact(&sealed).unwrap();
    Fixture {
        rules,
        open: open.into(),
        sealed: sealed.into(),
        compacted: compacted.into(),
    }
}

/// Rewrite the stage tag of `pipeline`, borrowing any proofs the new tag
/// needs from `donor`.
fn miscast(pipeline: &Pipeline, stage: &str, donor: &Pipeline) -> Pipeline {
    let mut value = serde_json::to_value(pipeline).unwrap();
    let donor = serde_json::to_value(donor).unwrap();
    value["stage"] = Value::from(stage);
    for proof in ["seal_proof", "compact_proof"] {
        if value.get(proof).is_none() {
            if let Some(p) = donor.get(proof) {
                value[proof] = p.clone();
            }
        }
    }
    serde_json::from_value(value).unwrap()
}

fn violation(result: Result<Pipeline, RuleError>) -> FirewallViolation {
    match result {
        Err(RuleError::Firewall { violation, .. }) => violation,
        Err(other) => panic!("expected firewall rejection, got {other}"),
        Ok(p) => panic!("expected firewall rejection, got a {} pipeline", p.stage()),
    }
}

// ---------------------------------------------------------------------------
// Tests: honest stage tags
// ---------------------------------------------------------------------------

#[test]
fn transform_after_seal_is_rejected() {
    let f = fixture();
    let v = violation(f.rules.apply_rule(&f.sealed, &NormalizeRule::default()));
    assert_eq!(v, FirewallViolation::TransformAfterSeal);
    assert_eq!(v.to_string(), "cannot transform after seal");
    let v = violation(f.rules.apply_rule(&f.compacted, &NormalizeRule::default()));
    assert_eq!(v, FirewallViolation::TransformAfterSeal);
}

#[test]
fn seal_after_seal_is_rejected() {
    let f = fixture();
    let v = violation(f.rules.apply_rule(&f.sealed, &SealRule));
    assert_eq!(v.to_string(), "already sealed");
    let v = violation(f.rules.apply_rule(&f.compacted, &SealRule));
    assert_eq!(v, FirewallViolation::AlreadySealed);
}

#[test]
fn compact_before_seal_is_rejected() {
    let f = fixture();
    let v = violation(f.rules.apply_rule(&f.open, &CompactRule));
    assert!(v.to_string().contains("must be sealed"));
}

#[test]
fn compact_after_compact_is_rejected() {
    let f = fixture();
    let v = violation(f.rules.apply_rule(&f.compacted, &CompactRule));
    assert_eq!(v.to_string(), "already compacted");
}

#[test]
fn rejection_leaves_pipeline_untouched() {
    let f = fixture();
    let before = f.sealed.clone();
    let _ = f.rules.apply_rule(&f.sealed, &NormalizeRule::default());
    assert_eq!(f.sealed, before);
    assert_eq!(f.sealed.marks().len(), 1);
}

// ---------------------------------------------------------------------------
// Tests: forcibly miscast stage tags
// ---------------------------------------------------------------------------

#[test]
fn sealed_miscast_as_open_still_refuses_transform_and_seal() {
    let f = fixture();
    let forged = miscast(&f.sealed, "open", &f.sealed);
    assert_eq!(forged.stage(), Stage::Open);
    assert_eq!(forged.core().recorded_stage(), Stage::Sealed);

    let v = violation(f.rules.apply_rule(&forged, &NormalizeRule::default()));
    assert_eq!(v, FirewallViolation::TransformAfterSeal);
    let v = violation(f.rules.apply_rule(&forged, &SealRule));
    assert_eq!(v, FirewallViolation::AlreadySealed);
}

#[test]
fn open_miscast_as_sealed_still_refuses_compact() {
    let f = fixture();
    let forged = miscast(&f.open, "sealed", &f.sealed);
    assert_eq!(forged.stage(), Stage::Sealed);
    let v = violation(f.rules.apply_rule(&forged, &CompactRule));
    assert_eq!(v, FirewallViolation::NotSealed);
}

#[test]
fn compacted_miscast_as_sealed_still_refuses_compact() {
    let f = fixture();
    let forged = miscast(&f.compacted, "sealed", &f.compacted);
    assert_eq!(forged.stage(), Stage::Sealed);
    let v = violation(f.rules.apply_rule(&forged, &CompactRule));
    assert_eq!(v, FirewallViolation::AlreadyCompacted);
}

#[test]
fn compacted_miscast_as_open_still_refuses_everything() {
    let f = fixture();
    let forged = miscast(&f.compacted, "open", &f.compacted);
    let v = violation(f.rules.apply_rule(&forged, &NormalizeRule::default()));
    assert_eq!(v, FirewallViolation::TransformAfterSeal);
    let v = violation(f.rules.apply_rule(&forged, &SealRule));
    assert_eq!(v, FirewallViolation::AlreadySealed);
}

// ---------------------------------------------------------------------------
// Tests: caller-defined rules
// ---------------------------------------------------------------------------

/// Refuses to run on any state that already reached `number`.
struct OnlyBeforeNumber;

impl Rule for OnlyBeforeNumber {
    fn name(&self) -> &str {
        "only_before_number"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Transform
    }

    fn requires(&self, pipeline: &Pipeline) -> Result<(), FirewallViolation> {
        if pipeline.current().is_terminal() {
            Err(FirewallViolation::Rejected("state is terminal".into()))
        } else {
            Ok(())
        }
    }

    fn pre(
        &self,
        _checker: &InvariantChecker,
        _state: &GenesisState,
        _original: &GenesisState,
    ) -> Result<(), String> {
        Ok(())
    }
}

/// Claims to be a transform but would record a seal mark.
struct DisguisedSeal;

impl Rule for DisguisedSeal {
    fn name(&self) -> &str {
        "disguised_seal"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Transform
    }

    fn mark_kind(&self) -> MarkKind {
        MarkKind::Seal
    }

    fn pre(
        &self,
        _checker: &InvariantChecker,
        _state: &GenesisState,
        _original: &GenesisState,
    ) -> Result<(), String> {
        Ok(())
    }
}

#[test]
fn caller_requires_is_honoured() {
    let f = fixture();
    let v = violation(f.rules.apply_rule(&f.open, &OnlyBeforeNumber));
    assert_eq!(v, FirewallViolation::Rejected("state is terminal".into()));

    let fresh = Pipeline::from(f.rules.open(GenesisState::genesis()));
    assert!(f.rules.apply_rule(&fresh, &OnlyBeforeNumber).is_ok());
}

#[test]
fn caller_requires_cannot_override_stage_firewall() {
    let f = fixture();
    let sealed_before_number = f
        .rules
        .seal(&f.rules.open(GenesisState::genesis()))
        .unwrap();
    let pipeline = Pipeline::from(sealed_before_number);
    let v = violation(f.rules.apply_rule(&pipeline, &OnlyBeforeNumber));
    assert_eq!(v, FirewallViolation::TransformAfterSeal);
}

#[test]
fn mark_kind_must_match_category() {
    let f = fixture();
    let err = f.rules.apply_rule(&f.open, &DisguisedSeal).unwrap_err();
    assert!(matches!(err, RuleError::CategoryMismatch { .. }));
    assert_eq!(err.rule(), "disguised_seal");
}
