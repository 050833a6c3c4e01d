//! Composite screening score and ranking.
//!
//! S(c) = w_rules × compliance + w_model × p(drug-like) + w_admet × admet_mean
//!
//! Every input lies in [0, 1] and every weight is non-negative, so S is
//! non-decreasing in each input and stays in [0, 1].

use admetyx_common::error::ErrorKind;
use admetyx_common::{DescriptorVector, EngineError};
use admetyx_molecules::{AdmetResult, Compound, PredictionResult, RuleReport};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::normalise::tie_key;
use crate::weights::CompositeWeights;

/// Normalised inputs of the composite score (all in [0, 1]).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreComponents {
    pub rule_compliance: f64,
    pub drug_likeness: f64,
    pub admet: f64,
}

impl ScoreComponents {
    pub fn as_array(&self) -> [f64; 3] {
        [self.rule_compliance, self.drug_likeness, self.admet]
    }
}

/// Weighted sum of the components, clamped into [0, 1].
pub fn compute_composite_score(components: &ScoreComponents, weights: &CompositeWeights) -> f64 {
    components
        .as_array()
        .iter()
        .zip(weights.as_array().iter())
        .map(|(n, w)| n * w)
        .sum::<f64>()
        .clamp(0.0, 1.0)
}

/// Everything computed for one successfully scored compound.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreeningEntry {
    pub compound_id: Uuid,
    pub name: String,
    pub smiles: String,
    pub descriptors: DescriptorVector,
    pub rules: RuleReport,
    pub prediction: PredictionResult,
    pub admet: AdmetResult,
    pub components: ScoreComponents,
    pub composite_score: f64,
    /// 1-based position after ranking; 0 until ranked
    pub rank: usize,
}

/// A compound that could not be scored, with the reason.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreeningFailure {
    pub compound_id: Uuid,
    pub name: String,
    pub smiles: String,
    pub kind: ErrorKind,
    pub message: String,
}

impl ScreeningFailure {
    pub fn new(compound: &Compound, error: &EngineError) -> Self {
        Self {
            compound_id: compound.id,
            name: compound.name.clone(),
            smiles: compound.smiles.clone(),
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}

/// Sort entries by composite score, descending, and assign ranks.
///
/// Scores sharing an `epsilon`-quantised key keep their input order.
pub fn rank_entries(entries: &mut [ScreeningEntry], epsilon: f64) {
    entries.sort_by_key(|e| std::cmp::Reverse(tie_key(e.composite_score, epsilon)));
    for (i, entry) in entries.iter_mut().enumerate() {
        entry.rank = i + 1;
    }
}
