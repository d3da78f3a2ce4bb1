use crate::error::LatticeError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A lifecycle phase.
///
/// The order is total and fixed: `void < dot < zero_zero < zero < number`.
/// A recorded transition must advance by exactly one step (the firewall rule).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Void,
    Dot,
    ZeroZero,
    Zero,
    Number,
}

impl Phase {
    /// All phases in lattice order.
    pub const ALL: [Phase; 5] = [
        Phase::Void,
        Phase::Dot,
        Phase::ZeroZero,
        Phase::Zero,
        Phase::Number,
    ];

    /// Position in the lattice (void = 0).
    pub fn index(self) -> i32 {
        match self {
            Self::Void => 0,
            Self::Dot => 1,
            Self::ZeroZero => 2,
            Self::Zero => 3,
            Self::Number => 4,
        }
    }

    /// The successor phase, or `None` at the terminal phase.
    pub fn next(self) -> Option<Phase> {
        match self {
            Self::Void => Some(Self::Dot),
            Self::Dot => Some(Self::ZeroZero),
            Self::ZeroZero => Some(Self::Zero),
            Self::Zero => Some(Self::Number),
            Self::Number => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        self.next().is_none()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Void => "void",
            Self::Dot => "dot",
            Self::ZeroZero => "zero_zero",
            Self::Zero => "zero",
            Self::Number => "number",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Phase {
    type Err = LatticeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Phase::ALL
            .iter()
            .copied()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| LatticeError::UnknownPhase(s.to_string()))
    }
}

/// `index(to) - index(from)`. A legal transition has delta exactly 1.
pub fn phase_delta(from: Phase, to: Phase) -> i32 {
    to.index() - from.index()
}
