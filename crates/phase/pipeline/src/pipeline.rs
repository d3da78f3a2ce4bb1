use crate::mark::{Mark, MarkChain, MarkKind};
use crate::proof::{CompactProof, SealProof};
use chrono::{DateTime, Utc};
use maple_phase_invariants::InvariantReport;
use maple_phase_lattice::GenesisState;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Pipeline lifecycle stage. Passed through exactly once, in order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Open,
    Sealed,
    Compacted,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::Sealed => write!(f, "sealed"),
            Self::Compacted => write!(f, "compacted"),
        }
    }
}

/// One successful rule application.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransformRecord {
    pub rule_name: String,
    pub mark: Mark,
    pub invariants: InvariantReport,
    /// Wall-clock time of the application. Informational only; never hashed.
    pub timestamp: DateTime<Utc>,
}

/// State shared by every stage.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PipelineCore {
    pub(crate) current: GenesisState,
    pub(crate) original: GenesisState,
    pub(crate) records: Vec<TransformRecord>,
    pub(crate) marks: MarkChain,
}

impl PipelineCore {
    pub(crate) fn new(state: GenesisState) -> Self {
        Self {
            current: state.clone(),
            original: state,
            records: Vec::new(),
            marks: MarkChain::new(),
        }
    }

    pub fn current(&self) -> &GenesisState {
        &self.current
    }

    /// The state before any rule ran.
    pub fn original(&self) -> &GenesisState {
        &self.original
    }

    pub fn records(&self) -> &[TransformRecord] {
        &self.records
    }

    pub fn marks(&self) -> &MarkChain {
        &self.marks
    }

    /// Stage implied by the mark chain alone, independent of any stage tag.
    pub fn recorded_stage(&self) -> Stage {
        let kinds = || self.marks.marks().iter().map(|m| m.kind);
        if kinds().any(|k| k == MarkKind::Compact) {
            Stage::Compacted
        } else if kinds().any(|k| k == MarkKind::Seal) {
            Stage::Sealed
        } else {
            Stage::Open
        }
    }
}

/// Accepts Φ transforms; may be sealed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OpenPipeline {
    pub(crate) core: PipelineCore,
}

impl OpenPipeline {
    pub fn new(state: GenesisState) -> Self {
        Self {
            core: PipelineCore::new(state),
        }
    }

    pub fn core(&self) -> &PipelineCore {
        &self.core
    }

    pub fn current(&self) -> &GenesisState {
        &self.core.current
    }
}

/// Sealed: no further transforms; may only be compacted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SealedPipeline {
    pub(crate) core: PipelineCore,
    pub(crate) seal_proof: SealProof,
}

impl SealedPipeline {
    pub fn core(&self) -> &PipelineCore {
        &self.core
    }

    pub fn current(&self) -> &GenesisState {
        &self.core.current
    }

    pub fn seal_proof(&self) -> &SealProof {
        &self.seal_proof
    }
}

/// Terminal stage.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CompactedPipeline {
    pub(crate) core: PipelineCore,
    pub(crate) seal_proof: SealProof,
    pub(crate) compact_proof: CompactProof,
}

impl CompactedPipeline {
    pub fn core(&self) -> &PipelineCore {
        &self.core
    }

    pub fn current(&self) -> &GenesisState {
        &self.core.current
    }

    pub fn seal_proof(&self) -> &SealProof {
        &self.seal_proof
    }

    pub fn compact_proof(&self) -> &CompactProof {
        &self.compact_proof
    }
}

/// A pipeline in any stage.
///
/// Each variant carries exactly the proofs valid for its stage, so "sealed
/// without a seal proof" cannot be built. Serialized with a `"stage"` tag.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum Pipeline {
    Open(OpenPipeline),
    Sealed(SealedPipeline),
    Compacted(CompactedPipeline),
}

impl Pipeline {
    /// Stage according to the tag.
    pub fn stage(&self) -> Stage {
        match self {
            Self::Open(_) => Stage::Open,
            Self::Sealed(_) => Stage::Sealed,
            Self::Compacted(_) => Stage::Compacted,
        }
    }

    pub fn core(&self) -> &PipelineCore {
        match self {
            Self::Open(p) => &p.core,
            Self::Sealed(p) => &p.core,
            Self::Compacted(p) => &p.core,
        }
    }

    pub fn current(&self) -> &GenesisState {
        &self.core().current
    }

    pub fn original(&self) -> &GenesisState {
        &self.core().original
    }

    pub fn records(&self) -> &[TransformRecord] {
        &self.core().records
    }

    pub fn marks(&self) -> &MarkChain {
        &self.core().marks
    }

    pub fn seal_proof(&self) -> Option<&SealProof> {
        match self {
            Self::Open(_) => None,
            Self::Sealed(p) => Some(&p.seal_proof),
            Self::Compacted(p) => Some(&p.seal_proof),
        }
    }

    pub fn compact_proof(&self) -> Option<&CompactProof> {
        match self {
            Self::Compacted(p) => Some(&p.compact_proof),
            _ => None,
        }
    }
}

impl From<OpenPipeline> for Pipeline {
    fn from(p: OpenPipeline) -> Self {
        Self::Open(p)
    }
}

impl From<SealedPipeline> for Pipeline {
    fn from(p: SealedPipeline) -> Self {
        Self::Sealed(p)
    }
}

impl From<CompactedPipeline> for Pipeline {
    fn from(p: CompactedPipeline) -> Self {
        Self::Compacted(p)
    }
}
