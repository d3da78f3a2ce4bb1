/// Errors from configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{field} must be finite, got {value}")]
    NotFinite { field: &'static str, value: f64 },
    #[error("{field} must be positive, got {value}")]
    NotPositive { field: &'static str, value: f64 },
    #[error("{field} out of range: {value} (expected {expected})")]
    OutOfRange {
        field: &'static str,
        value: f64,
        expected: &'static str,
    },
    #[error("invalid configuration document: {0}")]
    Parse(String),
}

/// Errors from the axiom engine's checked entry points.
#[derive(Debug, thiserror::Error)]
pub enum LatticeError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("invalid energy: {0} (must be finite and non-negative)")]
    InvalidEnergy(f64),
    #[error("unknown phase: {0}")]
    UnknownPhase(String),
}
