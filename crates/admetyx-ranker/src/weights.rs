//! Weight vector for the composite screening score.

use admetyx_common::config::ScoringWeights;
use admetyx_common::{EngineError, Result};
use serde::{Deserialize, Serialize};

/// The 3-component weight vector W, normalised to sum to 1.0.
///
/// Construct it through [`CompositeWeights::from_config`] so the sum invariant
/// always holds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompositeWeights {
    /// Rule-family compliance
    pub rule_compliance: f64,
    /// Drug-likeness probability
    pub drug_likeness: f64,
    /// Weighted mean ADMET score
    pub admet: f64,
}

impl Default for CompositeWeights {
    fn default() -> Self {
        let w = ScoringWeights::default();
        Self { rule_compliance: w.rule_compliance, drug_likeness: w.drug_likeness, admet: w.admet }
    }
}

impl CompositeWeights {
    /// Normalise configured weights. Negative, non-finite or all-zero weights are rejected.
    pub fn from_config(weights: &ScoringWeights) -> Result<Self> {
        if !weights.validate() {
            return Err(EngineError::Configuration(
                "scoring weights must be non-negative with a positive sum".to_string(),
            ));
        }
        let mut w = weights.clone();
        w.normalise();
        Ok(Self { rule_compliance: w.rule_compliance, drug_likeness: w.drug_likeness, admet: w.admet })
    }

    /// Validate that all weights sum to ~1.0
    pub fn validate(&self) -> bool {
        (self.as_array().iter().sum::<f64>() - 1.0).abs() < 1e-6
    }

    pub fn as_array(&self) -> [f64; 3] {
        [self.rule_compliance, self.drug_likeness, self.admet]
    }
}
