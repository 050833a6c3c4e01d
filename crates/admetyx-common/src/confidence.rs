//! Confidence banding for classifier probabilities.
//! The band depends only on the distance of the probability from the 0.5 decision
//! boundary, so it is monotonic in |p - 0.5|.

use serde::{Deserialize, Serialize};

use crate::config::ConfidenceCutoffs;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceBand {
    Low,
    Medium,
    High,
}

/// Binary drug-likeness call at the 0.5 boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DrugLikenessLabel {
    #[serde(rename = "Drug-Like")]
    DrugLike,
    #[serde(rename = "Non Drug-Like")]
    NonDrugLike,
}

impl DrugLikenessLabel {
    pub fn from_probability(p: f64) -> Self {
        if p >= 0.5 {
            DrugLikenessLabel::DrugLike
        } else {
            DrugLikenessLabel::NonDrugLike
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DrugLikenessLabel::DrugLike => "Drug-Like",
            DrugLikenessLabel::NonDrugLike => "Non Drug-Like",
        }
    }
}

/// Map a probability in [0, 1] to a confidence band.
pub fn confidence_band(probability: f64, cutoffs: &ConfidenceCutoffs) -> ConfidenceBand {
    let distance = (probability - 0.5).abs();
    if distance >= cutoffs.high_distance {
        ConfidenceBand::High
    } else if distance >= cutoffs.medium_distance {
        ConfidenceBand::Medium
    } else {
        ConfidenceBand::Low
    }
}
