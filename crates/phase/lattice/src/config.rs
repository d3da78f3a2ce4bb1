use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Numeric constants of the axiom engine and the structure-preserving
/// transform.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvolutionConfig {
    /// Critical curvature κc. `dot → zero_zero` fires at κc·0.5,
    /// `zero_zero → zero` at κc.
    pub critical_curvature: f64,
    /// Upper bound curvature saturates at.
    pub curvature_ceiling: f64,
    /// Multiplicative entropy decay per step.
    pub entropy_decay: f64,
    /// Multiplicative structure growth per step.
    pub structure_growth: f64,
    /// Structure required for `zero → number`.
    pub number_structure_threshold: f64,
    /// Entropy of a fresh genesis state.
    pub initial_entropy: f64,
    /// Structure of a fresh genesis state.
    pub initial_structure: f64,
    /// Decimal places the normalize transform rounds scalars to.
    pub normalize_decimals: u32,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            critical_curvature: 0.7,
            curvature_ceiling: 1.0,
            entropy_decay: 0.95,
            structure_growth: 1.15,
            number_structure_threshold: 2.0,
            initial_entropy: 1.0,
            initial_structure: 0.1,
            normalize_decimals: 6,
        }
    }
}

impl EvolutionConfig {
    /// Faster structure growth; reaches `number` in fewer steps.
    pub fn fast() -> Self {
        Self {
            structure_growth: 1.5,
            entropy_decay: 0.9,
            ..Self::default()
        }
    }

    /// Higher critical curvature and slower growth.
    pub fn conservative() -> Self {
        Self {
            critical_curvature: 0.9,
            structure_growth: 1.08,
            entropy_decay: 0.98,
            ..Self::default()
        }
    }

    /// Parse a JSON document (missing fields take defaults) and validate it.
    pub fn from_json(doc: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(doc).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("critical_curvature", self.critical_curvature),
            ("curvature_ceiling", self.curvature_ceiling),
            ("entropy_decay", self.entropy_decay),
            ("structure_growth", self.structure_growth),
            ("number_structure_threshold", self.number_structure_threshold),
            ("initial_entropy", self.initial_entropy),
            ("initial_structure", self.initial_structure),
        ];
        for (field, value) in fields {
            if !value.is_finite() {
                return Err(ConfigError::NotFinite { field, value });
            }
            if value <= 0.0 {
                return Err(ConfigError::NotPositive { field, value });
            }
        }
        if self.critical_curvature > self.curvature_ceiling {
            return Err(ConfigError::OutOfRange {
                field: "critical_curvature",
                value: self.critical_curvature,
                expected: "<= curvature_ceiling",
            });
        }
        if self.entropy_decay > 1.0 {
            return Err(ConfigError::OutOfRange {
                field: "entropy_decay",
                value: self.entropy_decay,
                expected: "(0, 1]",
            });
        }
        if self.structure_growth <= 1.0 {
            return Err(ConfigError::OutOfRange {
                field: "structure_growth",
                value: self.structure_growth,
                expected: "> 1",
            });
        }
        if self.normalize_decimals > 15 {
            return Err(ConfigError::OutOfRange {
                field: "normalize_decimals",
                value: f64::from(self.normalize_decimals),
                expected: "0..=15",
            });
        }
        Ok(())
    }
}
