//! Rule-family assessment (Lipinski, Veber, Ghose).
//!
//! Each family is a fixed set of threshold comparisons over a descriptor vector.
//! A family passes while its violation count stays within the family's allowance.
//! Families are evaluated independently; a compound may pass some and fail others.

use admetyx_common::config::{GhoseThresholds, LipinskiThresholds, RuleThresholds, VeberThresholds};
use admetyx_common::DescriptorVector;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RuleFamily {
    Lipinski,
    Veber,
    Ghose,
}

/// One named threshold comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Criterion {
    pub name: String,
    pub passed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleAssessment {
    pub family: RuleFamily,
    pub criteria: Vec<Criterion>,
    pub violations: u32,
    pub passed: bool,
}

impl RuleAssessment {
    fn from_criteria(family: RuleFamily, criteria: Vec<Criterion>, max_violations: u32) -> Self {
        let violations = criteria.iter().filter(|c| !c.passed).count() as u32;
        Self { family, criteria, violations, passed: violations <= max_violations }
    }

    pub fn criterion(&self, name: &str) -> Option<&Criterion> {
        self.criteria.iter().find(|c| c.name == name)
    }
}

/// The three family assessments for one compound.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleReport {
    pub lipinski: RuleAssessment,
    pub veber: RuleAssessment,
    pub ghose: RuleAssessment,
}

impl RuleReport {
    pub fn families(&self) -> [&RuleAssessment; 3] {
        [&self.lipinski, &self.veber, &self.ghose]
    }

    pub fn families_passed(&self) -> usize {
        self.families().iter().filter(|a| a.passed).count()
    }

    pub fn criteria_satisfied(&self) -> usize {
        self.families().iter().flat_map(|a| &a.criteria).filter(|c| c.passed).count()
    }

    pub fn total_criteria(&self) -> usize {
        self.families().iter().map(|a| a.criteria.len()).sum()
    }
}

fn criterion(name: String, passed: bool) -> Criterion {
    Criterion { name, passed }
}

pub fn assess_lipinski(d: &DescriptorVector, t: &LipinskiThresholds) -> RuleAssessment {
    let criteria = vec![
        criterion(format!("MW ≤ {}", t.max_mw), d.mw <= t.max_mw),
        criterion(format!("LogP ≤ {}", t.max_logp), d.logp <= t.max_logp),
        criterion(format!("HBD ≤ {}", t.max_hbd), d.hbd <= t.max_hbd),
        criterion(format!("HBA ≤ {}", t.max_hba), d.hba <= t.max_hba),
    ];
    RuleAssessment::from_criteria(RuleFamily::Lipinski, criteria, t.max_violations)
}

pub fn assess_veber(d: &DescriptorVector, t: &VeberThresholds) -> RuleAssessment {
    let criteria = vec![
        criterion(format!("TPSA ≤ {} Å²", t.max_tpsa), d.tpsa <= t.max_tpsa),
        criterion(format!("RotBonds ≤ {}", t.max_rotatable_bonds), d.rotatable_bonds <= t.max_rotatable_bonds),
    ];
    RuleAssessment::from_criteria(RuleFamily::Veber, criteria, t.max_violations)
}

pub fn assess_ghose(d: &DescriptorVector, t: &GhoseThresholds) -> RuleAssessment {
    let criteria = vec![
        criterion(
            format!("MW {}–{}", t.min_mw, t.max_mw),
            (t.min_mw..=t.max_mw).contains(&d.mw),
        ),
        criterion(
            format!("LogP {} to {}", t.min_logp, t.max_logp),
            (t.min_logp..=t.max_logp).contains(&d.logp),
        ),
        criterion(
            format!("HeavyAtoms {}–{}", t.min_heavy_atoms, t.max_heavy_atoms),
            (t.min_heavy_atoms..=t.max_heavy_atoms).contains(&d.heavy_atoms),
        ),
        criterion(
            format!("Molar Refractivity {}–{}", t.min_molar_refractivity, t.max_molar_refractivity),
            (t.min_molar_refractivity..=t.max_molar_refractivity).contains(&d.molar_refractivity),
        ),
    ];
    RuleAssessment::from_criteria(RuleFamily::Ghose, criteria, t.max_violations)
}

/// Evaluate all three families. Pure; never fails for a validated vector.
pub fn assess_rules(d: &DescriptorVector, thresholds: &RuleThresholds) -> RuleReport {
    RuleReport {
        lipinski: assess_lipinski(d, &thresholds.lipinski),
        veber: assess_veber(d, &thresholds.veber),
        ghose: assess_ghose(d, &thresholds.ghose),
    }
}
