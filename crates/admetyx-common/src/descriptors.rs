//! Physicochemical descriptor vector and its model feature projections.

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// Feature order consumed by the drug-likeness classifier.
pub const CLASSIFIER_FEATURES: [&str; 7] = ["mw", "logp", "hbd", "hba", "tpsa", "rotbonds", "qed"];

/// Feature order consumed by the ADMET regressor.
pub const REGRESSOR_FEATURES: [&str; 8] =
    ["mw", "logp", "hbd", "hba", "tpsa", "rotbonds", "qed", "fsp3"];

/// Descriptors computed for one structure.
///
/// Derived from the structure by the descriptor service; never edited by hand.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DescriptorVector {
    /// Molecular weight (Da)
    pub mw: f64,
    /// Lipophilicity estimate (cLogP)
    pub logp: f64,
    /// Hydrogen-bond donors
    pub hbd: u32,
    /// Hydrogen-bond acceptors
    pub hba: u32,
    /// Topological polar surface area (Å²)
    pub tpsa: f64,
    pub rotatable_bonds: u32,
    /// Quantitative estimate of drug-likeness, 0–1
    pub qed: f64,
    /// Fraction of sp3 carbons, 0–1
    pub fsp3: f64,
    pub heavy_atoms: u32,
    pub molar_refractivity: f64,
}

impl DescriptorVector {
    /// Reject vectors that no model or rule can score meaningfully.
    pub fn validate(&self) -> Result<()> {
        let reals = [
            ("mw", self.mw),
            ("logp", self.logp),
            ("tpsa", self.tpsa),
            ("qed", self.qed),
            ("fsp3", self.fsp3),
            ("molar_refractivity", self.molar_refractivity),
        ];
        for (name, value) in reals {
            if !value.is_finite() {
                return Err(EngineError::Input(format!("descriptor '{name}' is not finite ({value})")));
            }
        }
        if self.mw < 0.0 || self.tpsa < 0.0 || self.molar_refractivity < 0.0 {
            return Err(EngineError::Input(
                "mw, tpsa and molar_refractivity must be non-negative".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.qed) || !(0.0..=1.0).contains(&self.fsp3) {
            return Err(EngineError::Input(format!(
                "qed ({}) and fsp3 ({}) must lie in [0, 1]",
                self.qed, self.fsp3
            )));
        }
        Ok(())
    }

    pub fn classifier_features(&self) -> [f64; 7] {
        [
            self.mw,
            self.logp,
            self.hbd as f64,
            self.hba as f64,
            self.tpsa,
            self.rotatable_bonds as f64,
            self.qed,
        ]
    }

    pub fn regressor_features(&self) -> [f64; 8] {
        [
            self.mw,
            self.logp,
            self.hbd as f64,
            self.hba as f64,
            self.tpsa,
            self.rotatable_bonds as f64,
            self.qed,
            self.fsp3,
        ]
    }
}

/// Check a raw feature vector before it reaches a model.
/// Fails on wrong arity or any non-finite value.
pub fn check_features(values: &[f64], expected: usize) -> Result<()> {
    if values.len() != expected {
        return Err(EngineError::Input(format!(
            "expected {expected} features, got {}",
            values.len()
        )));
    }
    if let Some((idx, v)) = values.iter().enumerate().find(|(_, v)| !v.is_finite()) {
        return Err(EngineError::Input(format!("feature {idx} is not finite ({v})")));
    }
    Ok(())
}
