use crate::rule::RuleCategory;
use maple_phase_invariants::VerificationResult;
use maple_phase_lattice::{canonical_digest, HashStrategy};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// What produced a mark.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkKind {
    /// Built-in Φ rounding transform.
    Normalize,
    /// Caller-defined structure-preserving transform.
    Transform,
    Seal,
    Compact,
}

impl MarkKind {
    pub fn category(&self) -> RuleCategory {
        match self {
            Self::Normalize | Self::Transform => RuleCategory::Transform,
            Self::Seal => RuleCategory::Seal,
            Self::Compact => RuleCategory::Compact,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            Self::Normalize => "phi-normalize",
            Self::Transform => "phi",
            Self::Seal => "psi",
            Self::Compact => "omega",
        }
    }
}

impl fmt::Display for MarkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// One provenance entry. Never mutated after creation.
///
/// The id embeds a digest of every other field, so a mark cannot be edited
/// or carried over from another chain without its id going stale.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mark {
    pub id: String,
    pub kind: MarkKind,
    /// Digest of the state before the rule ran.
    pub source_hash: String,
    /// Digest of the state after the rule ran.
    pub result_hash: String,
    pub tick: u64,
    pub parent_mark_id: Option<String>,
}

#[derive(Serialize)]
struct MarkBody<'a> {
    kind: MarkKind,
    source_hash: &'a str,
    result_hash: &'a str,
    tick: u64,
    parent_mark_id: Option<&'a str>,
}

impl Mark {
    pub fn digest(&self, strategy: &dyn HashStrategy) -> String {
        canonical_digest(strategy, self)
    }

    /// The id these contents must carry under `strategy`.
    pub fn expected_id(&self, strategy: &dyn HashStrategy) -> String {
        mark_id(
            strategy,
            &MarkBody {
                kind: self.kind,
                source_hash: &self.source_hash,
                result_hash: &self.result_hash,
                tick: self.tick,
                parent_mark_id: self.parent_mark_id.as_deref(),
            },
        )
    }
}

fn mark_id(strategy: &dyn HashStrategy, body: &MarkBody<'_>) -> String {
    format!(
        "mark-{:06}-{}-{}",
        body.tick,
        body.kind,
        canonical_digest(strategy, body)
    )
}

/// Append-only, parent-linked chain of marks.
///
/// The tick counter belongs to the chain, so independent pipelines never
/// share or interfere with each other's ticks.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkChain {
    marks: Vec<Mark>,
    next_tick: u64,
}

impl MarkChain {
    pub fn new() -> Self {
        Self {
            marks: Vec::new(),
            next_tick: 1,
        }
    }

    pub fn marks(&self) -> &[Mark] {
        &self.marks
    }

    pub fn len(&self) -> usize {
        self.marks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }

    pub fn tail(&self) -> Option<&Mark> {
        self.marks.last()
    }

    /// The mark that would be appended next, linked to the current tail.
    pub fn next_mark(
        &self,
        strategy: &dyn HashStrategy,
        kind: MarkKind,
        source_hash: impl Into<String>,
        result_hash: impl Into<String>,
    ) -> Mark {
        let mut mark = Mark {
            id: String::new(),
            kind,
            source_hash: source_hash.into(),
            result_hash: result_hash.into(),
            tick: self.next_tick,
            parent_mark_id: self.tail().map(|m| m.id.clone()),
        };
        mark.id = mark.expected_id(strategy);
        mark
    }

    /// A new chain with `mark` appended.
    pub fn with_mark(&self, mark: Mark) -> Self {
        let mut marks = self.marks.clone();
        let next_tick = self.next_tick.max(mark.tick + 1);
        marks.push(mark);
        Self { marks, next_tick }
    }

    /// Digests of every mark, in chain order.
    pub fn digests(&self, strategy: &dyn HashStrategy) -> Vec<String> {
        self.marks.iter().map(|m| m.digest(strategy)).collect()
    }

    pub fn verify(&self, strategy: &dyn HashStrategy) -> VerificationResult {
        verify_mark_chain(strategy, &self.marks)
    }
}

impl Default for MarkChain {
    fn default() -> Self {
        Self::new()
    }
}

/// Verify chain linkage.
///
/// The first mark has no parent; every later mark names its immediate
/// predecessor; ticks strictly increase; ids are unique and reproduce from
/// the mark's contents under `strategy`. Detects insertion, deletion (except
/// of the tail), reordering, duplication and edited marks.
pub fn verify_mark_chain(strategy: &dyn HashStrategy, marks: &[Mark]) -> VerificationResult {
    let mut result = VerificationResult::tally();
    let mut seen = HashSet::new();

    for (i, mark) in marks.iter().enumerate() {
        result.check(seen.insert(mark.id.as_str()), || {
            format!("mark {} ({}): duplicate id", i, mark.id)
        });

        match i.checked_sub(1).map(|p| &marks[p]) {
            None => {
                result.check(mark.parent_mark_id.is_none(), || {
                    format!(
                        "mark 0 ({}): first mark must have no parent, found {}",
                        mark.id,
                        mark.parent_mark_id.as_deref().unwrap_or_default()
                    )
                });
            }
            Some(prev) => {
                result.check(mark.parent_mark_id.as_deref() == Some(prev.id.as_str()), || {
                    format!(
                        "mark {} ({}): parent {} does not match preceding mark {}",
                        i,
                        mark.id,
                        mark.parent_mark_id.as_deref().unwrap_or("<none>"),
                        prev.id
                    )
                });
                result.check(mark.tick > prev.tick, || {
                    format!(
                        "mark {} ({}): tick {} not greater than preceding tick {}",
                        i, mark.id, mark.tick, prev.tick
                    )
                });
            }
        }

        result.check(mark.id == mark.expected_id(strategy), || {
            format!("mark {} ({}): id does not match its contents", i, mark.id)
        });
    }

    result
}
