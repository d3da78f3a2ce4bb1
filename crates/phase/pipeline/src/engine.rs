use crate::error::RuleError;
use crate::mark::Mark;
use crate::pipeline::{
    CompactedPipeline, OpenPipeline, Pipeline, PipelineCore, SealedPipeline, TransformRecord,
};
use crate::proof::{CompactProof, SealProof};
use crate::rule::{stage_firewall, CompactRule, NormalizeRule, Rule, RuleCategory, SealRule};
use chrono::Utc;
use maple_phase_invariants::{InvariantChecker, InvariantReport};
use maple_phase_lattice::{default_strategy, AxiomEngine, GenesisState, HashStrategy};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Outcome of a protocol run before it is placed into a stage.
struct Applied {
    core: PipelineCore,
    mark: Mark,
    report: InvariantReport,
}

/// Applies rules to pipelines.
///
/// [`RuleEngine::apply_rule`] is the only way a rule's effect reaches a
/// pipeline. The typed helpers ([`RuleEngine::normalize`],
/// [`RuleEngine::seal`], [`RuleEngine::compact`]) go through it too and only
/// accept the stage their rule is legal in.
#[derive(Clone, Debug)]
pub struct RuleEngine {
    checker: InvariantChecker,
    normalize_decimals: u32,
}

impl RuleEngine {
    pub fn new(hasher: Arc<dyn HashStrategy>) -> Self {
        Self {
            checker: InvariantChecker::new(hasher),
            normalize_decimals: 6,
        }
    }

    /// Engine sharing the axiom engine's hash strategy and Φ precision.
    pub fn from_axiom_engine(engine: &AxiomEngine) -> Self {
        Self {
            checker: InvariantChecker::new(engine.hasher().clone()),
            normalize_decimals: engine.config().normalize_decimals,
        }
    }

    pub fn hasher(&self) -> &Arc<dyn HashStrategy> {
        self.checker.hasher()
    }

    pub fn checker(&self) -> &InvariantChecker {
        &self.checker
    }

    pub fn normalize_decimals(&self) -> u32 {
        self.normalize_decimals
    }

    /// Wrap a state in a fresh open pipeline.
    pub fn open(&self, state: GenesisState) -> OpenPipeline {
        OpenPipeline::new(state)
    }

    /// Apply `rule` to `pipeline`.
    ///
    /// Runs `requires → pre → apply → post → mark → record` and returns the
    /// pipeline in its next stage. On any error the input is untouched and
    /// nothing is returned.
    pub fn apply_rule(&self, pipeline: &Pipeline, rule: &dyn Rule) -> Result<Pipeline, RuleError> {
        let applied = self.run(pipeline, rule)?;

        let next = match (pipeline, rule.category()) {
            (Pipeline::Open(_), RuleCategory::Transform) => {
                Pipeline::Open(OpenPipeline { core: applied.core })
            }
            (Pipeline::Open(_), RuleCategory::Seal) => {
                let seal_proof = SealProof::build(
                    self.hasher().as_ref(),
                    applied.mark,
                    &applied.core.current,
                    applied.report,
                );
                info!(
                    rule = rule.name(),
                    proof = %seal_proof.hash,
                    transitions = applied.core.current.transition_count(),
                    "Pipeline sealed"
                );
                Pipeline::Sealed(SealedPipeline {
                    core: applied.core,
                    seal_proof,
                })
            }
            (Pipeline::Sealed(sealed), RuleCategory::Compact) => {
                let compact_proof = CompactProof::build(
                    self.hasher().as_ref(),
                    applied.mark,
                    &applied.core,
                    Some(&sealed.seal_proof),
                );
                info!(
                    rule = rule.name(),
                    proof = %compact_proof.hash,
                    steps = compact_proof.steps_compacted,
                    progression = %compact_proof.phase_progression,
                    "Pipeline compacted"
                );
                Pipeline::Compacted(CompactedPipeline {
                    core: applied.core,
                    seal_proof: sealed.seal_proof.clone(),
                    compact_proof,
                })
            }
            (p, category) => unreachable!(
                "stage firewall admitted a {} rule on a {} pipeline",
                category,
                p.stage()
            ),
        };

        Ok(next)
    }

    /// Φ with this engine's precision.
    pub fn normalize(&self, pipeline: &OpenPipeline) -> Result<OpenPipeline, RuleError> {
        self.transform(pipeline, &NormalizeRule::new(self.normalize_decimals))
    }

    /// Any structure-preserving rule, built-in or caller-defined.
    pub fn transform(
        &self,
        pipeline: &OpenPipeline,
        rule: &dyn Rule,
    ) -> Result<OpenPipeline, RuleError> {
        self.expect_category(rule, RuleCategory::Transform)?;
        match self.apply_rule(&Pipeline::Open(pipeline.clone()), rule)? {
            Pipeline::Open(next) => Ok(next),
            other => unreachable!("transform produced a {} pipeline", other.stage()),
        }
    }

    /// Ψ.
    pub fn seal(&self, pipeline: &OpenPipeline) -> Result<SealedPipeline, RuleError> {
        match self.apply_rule(&Pipeline::Open(pipeline.clone()), &SealRule)? {
            Pipeline::Sealed(next) => Ok(next),
            other => unreachable!("seal produced a {} pipeline", other.stage()),
        }
    }

    /// Ω.
    pub fn compact(&self, pipeline: &SealedPipeline) -> Result<CompactedPipeline, RuleError> {
        match self.apply_rule(&Pipeline::Sealed(pipeline.clone()), &CompactRule)? {
            Pipeline::Compacted(next) => Ok(next),
            other => unreachable!("compact produced a {} pipeline", other.stage()),
        }
    }

    fn expect_category(&self, rule: &dyn Rule, expected: RuleCategory) -> Result<(), RuleError> {
        if rule.category() == expected {
            Ok(())
        } else {
            Err(self.reject(RuleError::CategoryMismatch {
                rule: rule.name().to_string(),
                expected,
                actual: rule.category(),
            }))
        }
    }

    fn run(&self, pipeline: &Pipeline, rule: &dyn Rule) -> Result<Applied, RuleError> {
        let name = rule.name().to_string();
        let category = rule.category();
        let core = pipeline.core();

        // A rule's mark must record the same category the rule runs under,
        // otherwise the chain would claim a stage change that never happened.
        if rule.mark_kind().category() != category {
            return Err(self.reject(RuleError::CategoryMismatch {
                rule: name,
                expected: category,
                actual: rule.mark_kind().category(),
            }));
        }

        // Firewall: the stage tag, the stage the mark chain records, then the
        // rule's own requirements. The second check catches a miscast tag.
        stage_firewall(category, pipeline.stage())
            .and_then(|()| stage_firewall(category, core.recorded_stage()))
            .and_then(|()| rule.requires(pipeline))
            .map_err(|violation| {
                self.reject(RuleError::Firewall {
                    rule: name.clone(),
                    violation,
                })
            })?;
        debug!(rule = %name, stage = %pipeline.stage(), "Firewall passed");

        rule.pre(&self.checker, &core.current, &core.original)
            .map_err(|reason| {
                self.reject(RuleError::Precondition {
                    rule: name.clone(),
                    reason,
                })
            })?;
        debug!(rule = %name, "Precondition passed");

        let after = rule.apply(&core.current);
        if !after.has_finite_scalars() {
            return Err(self.reject(RuleError::NonFiniteScalars { rule: name }));
        }
        let hasher = self.hasher().as_ref();
        let source_hash = core.current.digest(hasher);
        let result_hash = after.digest(hasher);
        if category != RuleCategory::Transform && source_hash != result_hash {
            return Err(self.reject(RuleError::StateAltered {
                rule: name,
                category,
            }));
        }

        let report = rule.post(&self.checker, &core.current, &after, &core.original);
        if !report.holds() {
            return Err(self.reject(RuleError::InvariantViolation {
                rule: name,
                failed: report.failures(),
                details: report.failure_details(),
            }));
        }
        debug!(rule = %name, "Postcondition passed");

        let mark = core
            .marks
            .next_mark(hasher, rule.mark_kind(), source_hash, result_hash);
        let marks = core.marks.with_mark(mark.clone());
        let mut records = core.records.clone();
        records.push(TransformRecord {
            rule_name: name.clone(),
            mark: mark.clone(),
            invariants: report.clone(),
            timestamp: Utc::now(),
        });
        debug!(rule = %name, mark = %mark.id, tick = mark.tick, "Mark appended");

        Ok(Applied {
            core: PipelineCore {
                current: after,
                original: core.original.clone(),
                records,
                marks,
            },
            mark,
            report,
        })
    }

    fn reject(&self, err: RuleError) -> RuleError {
        warn!(rule = err.rule(), error = %err, "Rule rejected");
        err
    }
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::new(default_strategy())
    }
}
