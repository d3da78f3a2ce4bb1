#![deny(unsafe_code)]
//! # maple-phase-invariants
//!
//! The three invariants every accepted state replacement must satisfy:
//!
//! - **inv_ast**: structural skeleton unchanged (history, phase, tick)
//! - **inv_witness**: every witness hash reproduces, kinds match source
//!   phases, progress floor holds
//! - **inv_phase**: every recorded transition advances exactly one phase
//!
//! ## Key Types
//!
//! - [`InvariantChecker`]: Evaluates the invariants under a hash strategy
//! - [`InvariantReport`]: Result of [`InvariantChecker::check_all`]
//! - [`VerificationResult`]: Structured, non-fatal audit outcome

pub mod audit;
pub mod checker;
pub mod types;

pub use audit::verify_all_witnesses;
pub use checker::InvariantChecker;
pub use types::{InvariantId, InvariantReport, InvariantResult, VerificationResult};
