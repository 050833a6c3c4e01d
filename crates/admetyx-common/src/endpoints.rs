//! ADMET endpoints and traffic-light categories.

use serde::{Deserialize, Serialize};

/// One of the five pharmacokinetic / toxicological endpoints.
/// Every endpoint score is oriented so that higher is more favourable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AdmetEndpoint {
    Absorption,
    Distribution,
    Metabolism,
    Excretion,
    Toxicity,
}

impl AdmetEndpoint {
    pub const ALL: [AdmetEndpoint; 5] = [
        AdmetEndpoint::Absorption,
        AdmetEndpoint::Distribution,
        AdmetEndpoint::Metabolism,
        AdmetEndpoint::Excretion,
        AdmetEndpoint::Toxicity,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AdmetEndpoint::Absorption => "Absorption",
            AdmetEndpoint::Distribution => "Distribution",
            AdmetEndpoint::Metabolism => "Metabolism",
            AdmetEndpoint::Excretion => "Excretion",
            AdmetEndpoint::Toxicity => "Toxicity",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            AdmetEndpoint::Absorption => "Predicted oral absorption via GI tract (Caco-2 / F%)",
            AdmetEndpoint::Distribution => "Volume of distribution / tissue binding estimate",
            AdmetEndpoint::Metabolism => "Hepatic metabolic stability (CYP450 clearance)",
            AdmetEndpoint::Excretion => "Renal clearance and half-life estimate",
            AdmetEndpoint::Toxicity => "Safety score (hERG, AMES, hepatotoxicity composite), higher = safer",
        }
    }

    /// Position in `ALL`, also the column of this endpoint in regressor targets.
    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl std::fmt::Display for AdmetEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrafficLight {
    Green,
    Amber,
    Red,
}
