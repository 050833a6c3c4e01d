//! Engine configuration.
//!
//! Every policy constant of the engine lives here as a named, serde-defaulted value:
//! rule thresholds, ADMET traffic-light cutoffs, confidence cutoffs, composite score
//! weights and the training setup. A config file only needs to name what it changes.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::endpoints::AdmetEndpoint;
use crate::error::EngineError;

/// Complete engine configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub rules: RuleThresholds,

    #[serde(default)]
    pub admet: AdmetConfig,

    #[serde(default)]
    pub confidence: ConfidenceCutoffs,

    #[serde(default)]
    pub scoring: ScoringConfig,

    #[serde(default)]
    pub training: TrainingConfig,
}

// ── Rule thresholds ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleThresholds {
    #[serde(default)]
    pub lipinski: LipinskiThresholds,
    #[serde(default)]
    pub veber: VeberThresholds,
    #[serde(default)]
    pub ghose: GhoseThresholds,
}

/// Lipinski's Rule of Five.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LipinskiThresholds {
    pub max_mw: f64,
    pub max_logp: f64,
    pub max_hbd: u32,
    pub max_hba: u32,
    /// The family still passes with this many violated criteria
    pub max_violations: u32,
}

impl Default for LipinskiThresholds {
    fn default() -> Self {
        Self { max_mw: 500.0, max_logp: 5.0, max_hbd: 5, max_hba: 10, max_violations: 1 }
    }
}

/// Veber oral bioavailability rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VeberThresholds {
    pub max_tpsa: f64,
    pub max_rotatable_bonds: u32,
    pub max_violations: u32,
}

impl Default for VeberThresholds {
    fn default() -> Self {
        Self { max_tpsa: 140.0, max_rotatable_bonds: 10, max_violations: 0 }
    }
}

/// Ghose filter ranges (inclusive).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GhoseThresholds {
    pub min_mw: f64,
    pub max_mw: f64,
    pub min_logp: f64,
    pub max_logp: f64,
    pub min_heavy_atoms: u32,
    pub max_heavy_atoms: u32,
    pub min_molar_refractivity: f64,
    pub max_molar_refractivity: f64,
    pub max_violations: u32,
}

impl Default for GhoseThresholds {
    fn default() -> Self {
        Self {
            min_mw: 160.0,
            max_mw: 480.0,
            min_logp: -0.4,
            max_logp: 5.6,
            min_heavy_atoms: 20,
            max_heavy_atoms: 70,
            min_molar_refractivity: 40.0,
            max_molar_refractivity: 130.0,
            max_violations: 1,
        }
    }
}

// ── ADMET traffic lights ─────────────────────────────────────────────────────

/// Score >= `good` is green, >= `moderate` is amber, anything lower is red.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrafficLightCutoffs {
    pub good: f64,
    pub moderate: f64,
}

/// Per-endpoint traffic-light cutoffs.
///
/// The endpoints deliberately carry different cutoffs: distribution and excretion
/// scores are compressed towards the middle of [0, 1] by their generating functions,
/// so their green band starts lower.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdmetConfig {
    pub absorption: TrafficLightCutoffs,
    pub distribution: TrafficLightCutoffs,
    pub metabolism: TrafficLightCutoffs,
    pub excretion: TrafficLightCutoffs,
    pub toxicity: TrafficLightCutoffs,
}

impl Default for AdmetConfig {
    fn default() -> Self {
        Self {
            absorption:   TrafficLightCutoffs { good: 0.60, moderate: 0.35 },
            distribution: TrafficLightCutoffs { good: 0.50, moderate: 0.30 },
            metabolism:   TrafficLightCutoffs { good: 0.65, moderate: 0.40 },
            excretion:    TrafficLightCutoffs { good: 0.55, moderate: 0.30 },
            toxicity:     TrafficLightCutoffs { good: 0.65, moderate: 0.40 },
        }
    }
}

impl AdmetConfig {
    pub fn cutoffs(&self, endpoint: AdmetEndpoint) -> &TrafficLightCutoffs {
        match endpoint {
            AdmetEndpoint::Absorption => &self.absorption,
            AdmetEndpoint::Distribution => &self.distribution,
            AdmetEndpoint::Metabolism => &self.metabolism,
            AdmetEndpoint::Excretion => &self.excretion,
            AdmetEndpoint::Toxicity => &self.toxicity,
        }
    }
}

// ── Confidence bands ─────────────────────────────────────────────────────────

/// Cutoffs on |p - 0.5| for the classifier confidence band.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfidenceCutoffs {
    pub medium_distance: f64,
    pub high_distance: f64,
}

impl Default for ConfidenceCutoffs {
    fn default() -> Self {
        Self { medium_distance: 0.10, high_distance: 0.25 }
    }
}

// ── Scoring ──────────────────────────────────────────────────────────────────

/// Composite score configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    #[serde(default)]
    pub weights: ScoringWeights,

    #[serde(default)]
    pub endpoint_weights: EndpointWeights,

    /// Share of rule compliance taken from whole families passed; the rest comes from
    /// individual criteria satisfied.
    #[serde(default = "default_family_share")]
    pub family_share: f64,

    /// Composite scores closer than this rank as ties and keep input order.
    #[serde(default = "default_tie_epsilon")]
    pub tie_epsilon: f64,
}

fn default_family_share() -> f64 { 0.5 }
fn default_tie_epsilon() -> f64 { 1e-9 }

/// Smallest non-zero tie tolerance. Composite scores lie in [0, 1], so quantised
/// keys stay far below `i64::MAX`.
pub const MIN_TIE_EPSILON: f64 = 1e-15;
/// Largest tie tolerance.
pub const MAX_TIE_EPSILON: f64 = 1e-2;

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            weights: ScoringWeights::default(),
            endpoint_weights: EndpointWeights::default(),
            family_share: default_family_share(),
            tie_epsilon: default_tie_epsilon(),
        }
    }
}

/// Weights of the three composite score inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    pub rule_compliance: f64,
    pub drug_likeness: f64,
    pub admet: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self { rule_compliance: 0.25, drug_likeness: 0.35, admet: 0.40 }
    }
}

/// Weights used for the weighted mean of the five ADMET endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointWeights {
    pub absorption: f64,
    pub distribution: f64,
    pub metabolism: f64,
    pub excretion: f64,
    pub toxicity: f64,
}

impl Default for EndpointWeights {
    fn default() -> Self {
        Self { absorption: 1.0, distribution: 1.0, metabolism: 1.0, excretion: 1.0, toxicity: 1.0 }
    }
}

impl EndpointWeights {
    pub fn weight(&self, endpoint: AdmetEndpoint) -> f64 {
        match endpoint {
            AdmetEndpoint::Absorption => self.absorption,
            AdmetEndpoint::Distribution => self.distribution,
            AdmetEndpoint::Metabolism => self.metabolism,
            AdmetEndpoint::Excretion => self.excretion,
            AdmetEndpoint::Toxicity => self.toxicity,
        }
    }

    pub fn as_array(&self) -> [f64; 5] {
        AdmetEndpoint::ALL.map(|e| self.weight(e))
    }
}

// ── Training ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    #[serde(default = "default_seed")]
    pub seed: u64,

    #[serde(default = "default_classifier_samples")]
    pub classifier_samples: usize,

    #[serde(default = "default_regressor_samples")]
    pub regressor_samples: usize,

    #[serde(default = "default_cv_folds")]
    pub cv_folds: usize,

    #[serde(default)]
    pub ensemble: EnsembleConfig,
}

fn default_seed() -> u64 { 42 }
fn default_classifier_samples() -> usize { 1_500 }
fn default_regressor_samples() -> usize { 2_000 }
fn default_cv_folds() -> usize { 5 }

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            classifier_samples: default_classifier_samples(),
            regressor_samples: default_regressor_samples(),
            cv_folds: default_cv_folds(),
            ensemble: EnsembleConfig::default(),
        }
    }
}

/// Boosted ensemble hyper-parameters shared by the classifier and all regressors.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnsembleConfig {
    pub n_estimators: usize,
    pub learning_rate: f64,
    pub max_depth: usize,
    pub min_samples_leaf: usize,
    /// Row subsampling ratio per boosting round
    pub subsample: f64,
    /// Histogram bins per feature for split search
    pub max_bins: usize,
}

impl Default for EnsembleConfig {
    fn default() -> Self {
        Self {
            n_estimators: 200,
            learning_rate: 0.08,
            max_depth: 4,
            min_samples_leaf: 5,
            subsample: 0.85,
            max_bins: 64,
        }
    }
}

// ── Validation ───────────────────────────────────────────────────────────────

fn config_err(msg: impl Into<String>) -> EngineError {
    EngineError::Configuration(msg.into())
}

impl ScoringWeights {
    pub fn as_array(&self) -> [f64; 3] {
        [self.rule_compliance, self.drug_likeness, self.admet]
    }

    /// Weights must be non-negative with a positive sum.
    pub fn validate(&self) -> bool {
        let w = self.as_array();
        w.iter().all(|v| v.is_finite() && *v >= 0.0) && w.iter().sum::<f64>() > 0.0
    }

    /// Renormalise weights so they sum to 1.0
    pub fn normalise(&mut self) {
        let sum: f64 = self.as_array().iter().sum();
        if sum > 0.0 {
            self.rule_compliance /= sum;
            self.drug_likeness /= sum;
            self.admet /= sum;
        }
    }
}

impl EngineConfig {
    /// Check every policy constant for internal consistency.
    pub fn validate(&self) -> Result<(), EngineError> {
        let g = &self.rules.ghose;
        if g.min_mw > g.max_mw
            || g.min_logp > g.max_logp
            || g.min_heavy_atoms > g.max_heavy_atoms
            || g.min_molar_refractivity > g.max_molar_refractivity
        {
            return Err(config_err("Ghose ranges must have min <= max"));
        }

        for endpoint in AdmetEndpoint::ALL {
            let c = self.admet.cutoffs(endpoint);
            if !(0.0..=1.0).contains(&c.moderate) || !(0.0..=1.0).contains(&c.good) || c.moderate > c.good {
                return Err(config_err(format!(
                    "{endpoint} traffic-light cutoffs must satisfy 0 <= moderate <= good <= 1"
                )));
            }
        }

        let c = &self.confidence;
        if !(0.0 <= c.medium_distance && c.medium_distance <= c.high_distance && c.high_distance <= 0.5) {
            return Err(config_err("confidence cutoffs must satisfy 0 <= medium <= high <= 0.5"));
        }

        if !self.scoring.weights.validate() {
            return Err(config_err("scoring weights must be non-negative with a positive sum"));
        }
        let ew = self.scoring.endpoint_weights.as_array();
        if ew.iter().any(|w| !w.is_finite() || *w < 0.0) || ew.iter().sum::<f64>() <= 0.0 {
            return Err(config_err("endpoint weights must be non-negative with a positive sum"));
        }
        if !(0.0..=1.0).contains(&self.scoring.family_share) {
            return Err(config_err("family_share must lie in [0, 1]"));
        }
        let eps = self.scoring.tie_epsilon;
        if eps != 0.0 && !(MIN_TIE_EPSILON..=MAX_TIE_EPSILON).contains(&eps) {
            return Err(config_err(format!(
                "tie_epsilon must be 0 or lie in [{MIN_TIE_EPSILON:e}, {MAX_TIE_EPSILON:e}]"
            )));
        }

        let t = &self.training;
        if t.classifier_samples < 2 * t.cv_folds || t.regressor_samples < 2 {
            return Err(config_err("training corpus is too small"));
        }
        if t.cv_folds < 2 {
            return Err(config_err("cv_folds must be at least 2"));
        }
        let e = &t.ensemble;
        if e.n_estimators == 0 || e.max_depth == 0 || !(2..=256).contains(&e.max_bins) {
            return Err(config_err("n_estimators and max_depth must be > 0, max_bins in [2, 256]"));
        }
        if !(e.learning_rate > 0.0) || !(e.subsample > 0.0 && e.subsample <= 1.0) {
            return Err(config_err("learning_rate must be > 0 and subsample in (0, 1]"));
        }
        Ok(())
    }

    /// Load from YAML file
    pub fn from_yaml(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Load from JSON file
    pub fn from_json(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Load from TOML file
    pub fn from_toml(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load by file extension (.yaml/.yml, .json, anything else as TOML) and validate.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let ext = Path::new(path)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let config = match ext.as_str() {
            "yaml" | "yml" => Self::from_yaml(path)?,
            "json" => Self::from_json(path)?,
            _ => Self::from_toml(path)?,
        };
        config.validate()?;
        tracing::debug!(path, "engine configuration loaded");
        Ok(config)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;

    #[test]
    fn test_default_config_is_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.rules.lipinski.max_mw, 500.0);
        assert_eq!(config.training.ensemble.n_estimators, 200);
        assert_eq!(config.training.cv_folds, 5);
    }

    #[test]
    fn test_scoring_weights_normalise() {
        let mut w = ScoringWeights { rule_compliance: 1.0, drug_likeness: 1.0, admet: 2.0 };
        w.normalise();
        assert!((w.admet - 0.5).abs() < 1e-12);
        assert!((w.as_array().iter().sum::<f64>() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_negative_weight_rejected() {
        let mut config = EngineConfig::default();
        config.scoring.weights.admet = -0.1;
        assert!(matches!(config.validate(), Err(EngineError::Configuration(_))));
    }

    #[test]
    fn test_unordered_traffic_lights_rejected() {
        let mut config = EngineConfig::default();
        config.admet.toxicity = TrafficLightCutoffs { good: 0.3, moderate: 0.6 };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let src = r#"
            [training]
            seed = 7

            [rules.veber]
            max_tpsa = 120.0
        "#;
        let config: EngineConfig = toml::from_str(src).unwrap();
        assert_eq!(config.training.seed, 7);
        assert_eq!(config.training.classifier_samples, 1_500);
        assert_eq!(config.rules.veber.max_tpsa, 120.0);
        assert_eq!(config.rules.veber.max_rotatable_bonds, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_yaml_roundtrip() {
        let config = EngineConfig::default();
        let yaml = serde_yaml::to_string(&config).unwrap();
        let parsed: EngineConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed.rules.ghose.max_mw, config.rules.ghose.max_mw);
        assert_eq!(parsed.admet.metabolism, config.admet.metabolism);
    }

    #[test]
    fn test_tie_epsilon_bounds() {
        let mut config = EngineConfig::default();
        for eps in [0.0, MIN_TIE_EPSILON, MAX_TIE_EPSILON] {
            config.scoring.tie_epsilon = eps;
            assert!(config.validate().is_ok(), "eps = {eps}");
        }
        for eps in [1e-300, 0.5, -1e-9, f64::INFINITY, f64::NAN] {
            config.scoring.tie_epsilon = eps;
            assert!(matches!(config.validate(), Err(EngineError::Configuration(_))), "eps = {eps}");
        }
    }

    #[test]
    fn test_load_dispatches_on_extension() {
        let dir = tempfile::tempdir().unwrap();

        let yaml = dir.path().join("engine.yaml");
        fs::write(&yaml, "training:\n  seed: 11\nscoring:\n  family_share: 0.25\n").unwrap();
        let config = EngineConfig::load(yaml.to_str().unwrap()).unwrap();
        assert_eq!(config.training.seed, 11);
        assert_eq!(config.scoring.family_share, 0.25);

        let json = dir.path().join("engine.json");
        fs::write(&json, r#"{"training": {"seed": 12}, "rules": {"veber": {"max_tpsa": 130.0}}}"#).unwrap();
        let config = EngineConfig::load(json.to_str().unwrap()).unwrap();
        assert_eq!(config.training.seed, 12);
        assert_eq!(config.rules.veber.max_tpsa, 130.0);

        let toml_path = dir.path().join("engine.toml");
        fs::write(&toml_path, "[training]\nseed = 13\n").unwrap();
        let config = EngineConfig::load(toml_path.to_str().unwrap()).unwrap();
        assert_eq!(config.training.seed, 13);
        assert_eq!(config.training.cv_folds, 5);
    }

    #[test]
    fn test_load_rejects_invalid_files() {
        let dir = tempfile::tempdir().unwrap();

        // valid TOML, rejected by validation
        let negative = dir.path().join("negative.toml");
        fs::write(&negative, "[scoring.weights]\nadmet = -1.0\n").unwrap();
        assert!(EngineConfig::load(negative.to_str().unwrap()).is_err());

        // YAML content behind a .json extension
        let mislabelled = dir.path().join("engine.json");
        fs::write(&mislabelled, "training:\n  seed: 1\n").unwrap();
        assert!(EngineConfig::load(mislabelled.to_str().unwrap()).is_err());

        let missing = dir.path().join("absent.yaml");
        assert!(EngineConfig::load(missing.to_str().unwrap()).is_err());
    }
}
