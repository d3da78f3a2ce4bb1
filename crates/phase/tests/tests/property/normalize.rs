//! Property tests: Φ is structure-preserving and idempotent.

use maple_phase_lattice::AxiomEngine;
use maple_phase_pipeline::{NormalizeRule, Rule, RuleEngine};
use maple_phase_tests::evolve_schedule;
use proptest::prelude::*;

proptest! {
    /// A second Φ changes nothing at all.
    #[test]
    fn normalize_is_idempotent(
        schedule in prop::collection::vec(0.01f64..1.0, 1..40),
        decimals in 0u32..10,
    ) {
        let axioms = AxiomEngine::default();
        let rules = RuleEngine::from_axiom_engine(&axioms);
        let rule = NormalizeRule::new(decimals);
        let open = rules.open(evolve_schedule(&axioms, &schedule));

        let once = rules.transform(&open, &rule).unwrap();
        let twice = rules.transform(&once, &rule).unwrap();
        prop_assert_eq!(once.current(), twice.current());
        prop_assert_eq!(rule.apply(once.current()), once.current().clone());
    }

    /// Φ never touches phase, tick or the history skeleton.
    #[test]
    fn normalize_preserves_skeleton(
        schedule in prop::collection::vec(0.01f64..1.0, 1..40),
    ) {
        let axioms = AxiomEngine::default();
        let rules = RuleEngine::from_axiom_engine(&axioms);
        let open = rules.open(evolve_schedule(&axioms, &schedule));
        let next = rules.normalize(&open).unwrap();

        let (before, after) = (open.current(), next.current());
        prop_assert_eq!(before.phase, after.phase);
        prop_assert_eq!(before.tick, after.tick);
        prop_assert_eq!(&before.history, &after.history);
        prop_assert!(next.core().records()[0].invariants.holds());
        prop_assert_eq!(next.core().original(), before);
    }
}
