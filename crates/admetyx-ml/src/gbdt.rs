//! Gradient boosted decision trees.
//!
//! Squared-error regression and binary log-loss classification over shallow
//! second-order trees, with row subsampling and gain-based feature importance.
//!
//! # Example
//!
//! ```
//! use admetyx_ml::{GbdtConfig, GradientBoostedTrees, Objective};
//!
//! // fit y = 2x
//! let data: Vec<f64> = (0..50).map(|i| i as f64 / 10.0).collect();
//! let targets: Vec<f64> = data.iter().map(|x| 2.0 * x).collect();
//! let config = GbdtConfig { n_estimators: 100, learning_rate: 0.2, ..Default::default() };
//! let model = GradientBoostedTrees::fit(&data, 1, &targets, Objective::SquaredError, &config).unwrap();
//! let pred = model.predict(&[2.5]).unwrap();
//! assert!((pred - 5.0).abs() < 0.5);
//! ```

use tracing::debug;

use crate::binning::{FeatureBins, MAX_BINS_LIMIT};
use crate::error::{MlError, Result};
use crate::sampling;
use crate::tree::{GradientStats, RegressionTree, TreeParams};

/// Loss minimised by the ensemble.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Objective {
    /// Real-valued targets.
    SquaredError,
    /// Targets in {0, 1}; the raw score is a log-odds.
    BinaryLogistic,
}

#[derive(Debug, Clone)]
pub struct GbdtConfig {
    /// Boosting rounds (default: 100).
    pub n_estimators: usize,
    /// Shrinkage applied to every tree (default: 0.1).
    pub learning_rate: f64,
    /// Maximum depth per tree (default: 4).
    pub max_depth: usize,
    /// Minimum rows per leaf (default: 1).
    pub min_samples_leaf: usize,
    /// Row subsampling ratio per round (default: 1.0 = no subsampling).
    pub subsample: f64,
    /// Histogram bins per feature (default: 64, at most 256).
    pub max_bins: usize,
    /// Random seed for reproducibility (default: 42).
    pub seed: u64,
}

impl Default for GbdtConfig {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            learning_rate: 0.1,
            max_depth: 4,
            min_samples_leaf: 1,
            subsample: 1.0,
            max_bins: 64,
            seed: 42,
        }
    }
}

impl GbdtConfig {
    pub fn validate(&self) -> Result<()> {
        if self.n_estimators == 0 {
            return Err(MlError::InvalidConfig("n_estimators must be > 0".into()));
        }
        if self.max_depth == 0 {
            return Err(MlError::InvalidConfig("max_depth must be > 0".into()));
        }
        if !(self.learning_rate > 0.0 && self.learning_rate.is_finite()) {
            return Err(MlError::InvalidConfig("learning_rate must be > 0".into()));
        }
        if !(self.subsample > 0.0 && self.subsample <= 1.0) {
            return Err(MlError::InvalidConfig("subsample must be in (0, 1]".into()));
        }
        if !(2..=MAX_BINS_LIMIT).contains(&self.max_bins) {
            return Err(MlError::InvalidConfig(format!(
                "max_bins must be in [2, {MAX_BINS_LIMIT}]"
            )));
        }
        Ok(())
    }
}

fn validate_data(data: &[f64], n_features: usize, targets: &[f64]) -> Result<usize> {
    if n_features == 0 {
        return Err(MlError::InvalidInput("n_features must be > 0".into()));
    }
    if data.is_empty() {
        return Err(MlError::DegenerateData("empty training set".into()));
    }
    if data.len() % n_features != 0 {
        return Err(MlError::InvalidInput(format!(
            "data length {} not divisible by n_features {}",
            data.len(),
            n_features
        )));
    }
    let n_samples = data.len() / n_features;
    if targets.len() != n_samples {
        return Err(MlError::InvalidInput(format!(
            "targets length {} != n_samples {}",
            targets.len(),
            n_samples
        )));
    }
    if data.iter().chain(targets).any(|v| !v.is_finite()) {
        return Err(MlError::InvalidInput("training data contains non-finite values".into()));
    }
    Ok(n_samples)
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// A fitted boosted ensemble. Immutable once trained.
#[derive(Debug, Clone)]
pub struct GradientBoostedTrees {
    objective: Objective,
    trees: Vec<RegressionTree>,
    n_features: usize,
    /// F_0: mean target or base log-odds
    base_score: f64,
    learning_rate: f64,
    feature_importance: Vec<f64>,
}

impl GradientBoostedTrees {
    // ── Fitting ─────────────────────────────────────────────────

    /// Fit an ensemble.
    ///
    /// * `data`: flat row-major `n_samples x n_features`
    /// * `targets`: one value per row; 0.0 / 1.0 for [`Objective::BinaryLogistic`]
    pub fn fit(
        data: &[f64],
        n_features: usize,
        targets: &[f64],
        objective: Objective,
        config: &GbdtConfig,
    ) -> Result<Self> {
        config.validate()?;
        let n_samples = validate_data(data, n_features, targets)?;

        let base_score = match objective {
            Objective::SquaredError => targets.iter().sum::<f64>() / n_samples as f64,
            Objective::BinaryLogistic => {
                if targets.iter().any(|&y| y != 0.0 && y != 1.0) {
                    return Err(MlError::InvalidInput("binary targets must be 0 or 1".into()));
                }
                let positives = targets.iter().filter(|&&y| y == 1.0).count();
                if positives == 0 || positives == n_samples {
                    return Err(MlError::DegenerateData(
                        "binary training set contains a single class".into(),
                    ));
                }
                let p0 = positives as f64 / n_samples as f64;
                (p0 / (1.0 - p0)).ln()
            }
        };

        let bins = FeatureBins::fit(data, n_features, config.max_bins);
        let binned = bins.transform(data);
        let params = TreeParams {
            max_depth: config.max_depth,
            min_samples_leaf: config.min_samples_leaf,
        };

        let mut rng = sampling::seeded(config.seed);
        let sub_count = ((n_samples as f64 * config.subsample).round() as usize).max(1);

        let mut raw = vec![base_score; n_samples];
        let mut gradients = vec![0.0; n_samples];
        let mut hessians = vec![1.0; n_samples];
        let mut trees = Vec::with_capacity(config.n_estimators);
        let mut gains = vec![0.0; n_features];

        for _ in 0..config.n_estimators {
            // negative gradient of the loss, so leaves add to the raw score
            match objective {
                Objective::SquaredError => {
                    for i in 0..n_samples {
                        gradients[i] = targets[i] - raw[i];
                    }
                }
                Objective::BinaryLogistic => {
                    for i in 0..n_samples {
                        let p = sigmoid(raw[i]);
                        gradients[i] = targets[i] - p;
                        hessians[i] = p * (1.0 - p);
                    }
                }
            }

            let rows = sampling::subsample_indices(&mut rng, n_samples, sub_count);
            let stats = GradientStats { gradients: &gradients, hessians: &hessians };
            let tree = RegressionTree::fit(&binned, &bins, &stats, &rows, params);

            for (i, score) in raw.iter_mut().enumerate() {
                let row = &data[i * n_features..(i + 1) * n_features];
                *score += config.learning_rate * tree.predict(row);
            }
            tree.accumulate_gains(&mut gains);
            trees.push(tree);
        }

        debug!(
            ?objective,
            n_samples,
            n_features,
            n_trees = trees.len(),
            "boosted ensemble fitted"
        );

        Ok(Self {
            objective,
            trees,
            n_features,
            base_score,
            learning_rate: config.learning_rate,
            feature_importance: normalise_importance(gains),
        })
    }

    // ── Inference ───────────────────────────────────────────────

    /// Additive raw score (log-odds for binary models).
    pub fn raw_score(&self, row: &[f64]) -> Result<f64> {
        if row.len() != self.n_features {
            return Err(MlError::InvalidInput(format!(
                "expected {} features, got {}",
                self.n_features,
                row.len()
            )));
        }
        if row.iter().any(|v| !v.is_finite()) {
            return Err(MlError::InvalidInput("feature vector contains non-finite values".into()));
        }
        Ok(self.base_score
            + self.learning_rate * self.trees.iter().map(|t| t.predict(row)).sum::<f64>())
    }

    /// Regression value, or the positive-class probability for binary models.
    pub fn predict(&self, row: &[f64]) -> Result<f64> {
        let raw = self.raw_score(row)?;
        Ok(match self.objective {
            Objective::SquaredError => raw,
            Objective::BinaryLogistic => sigmoid(raw),
        })
    }

    /// Positive-class probability. Fails on regression models.
    pub fn predict_proba(&self, row: &[f64]) -> Result<f64> {
        if self.objective != Objective::BinaryLogistic {
            return Err(MlError::InvalidInput("predict_proba needs a binary model".into()));
        }
        self.predict(row)
    }

    // ── Introspection ───────────────────────────────────────────

    /// Gain-based importance per feature, non-negative and summing to 1.0.
    pub fn feature_importance(&self) -> &[f64] {
        &self.feature_importance
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn objective(&self) -> Objective {
        self.objective
    }
}

/// A model without any split spreads importance evenly.
fn normalise_importance(gains: Vec<f64>) -> Vec<f64> {
    let total: f64 = gains.iter().sum();
    if total > 0.0 {
        gains.into_iter().map(|g| g / total).collect()
    } else {
        let n = gains.len();
        vec![1.0 / n as f64; n]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_blobs(n: usize, seed: u64) -> (Vec<f64>, Vec<f64>) {
        let mut rng = sampling::seeded(seed);
        let mut data = Vec::with_capacity(n * 2);
        let mut labels = Vec::with_capacity(n);
        for i in 0..n {
            let positive = i % 2 == 0;
            let centre = if positive { 1.0 } else { -1.0 };
            data.push(sampling::gaussian(&mut rng, centre, 0.6));
            data.push(sampling::uniform(&mut rng, 0.0, 1.0));
            labels.push(if positive { 1.0 } else { 0.0 });
        }
        (data, labels)
    }

    #[test]
    fn test_binary_separates_blobs() {
        let (data, labels) = two_blobs(400, 5);
        let config = GbdtConfig { n_estimators: 60, max_depth: 3, ..Default::default() };
        let model = GradientBoostedTrees::fit(&data, 2, &labels, Objective::BinaryLogistic, &config).unwrap();
        let hi = model.predict_proba(&[2.0, 0.5]).unwrap();
        let lo = model.predict_proba(&[-2.0, 0.5]).unwrap();
        assert!(hi > 0.8, "p(positive centre) = {hi}");
        assert!(lo < 0.2, "p(negative centre) = {lo}");
        let imp = model.feature_importance();
        assert!(imp[0] > imp[1]);
        assert!((imp.iter().sum::<f64>() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_probabilities_in_unit_interval() {
        let (data, labels) = two_blobs(200, 9);
        let model =
            GradientBoostedTrees::fit(&data, 2, &labels, Objective::BinaryLogistic, &GbdtConfig::default()).unwrap();
        for x in [-100.0, -3.0, 0.0, 3.0, 100.0] {
            let p = model.predict_proba(&[x, 0.5]).unwrap();
            assert!((0.0..=1.0).contains(&p));
        }
    }

    #[test]
    fn test_single_class_is_degenerate() {
        let data = vec![1.0, 2.0, 3.0];
        let labels = vec![1.0, 1.0, 1.0];
        let err = GradientBoostedTrees::fit(&data, 1, &labels, Objective::BinaryLogistic, &GbdtConfig::default())
            .unwrap_err();
        assert!(matches!(err, MlError::DegenerateData(_)));
    }

    #[test]
    fn test_empty_is_degenerate() {
        let err = GradientBoostedTrees::fit(&[], 3, &[], Objective::SquaredError, &GbdtConfig::default())
            .unwrap_err();
        assert!(matches!(err, MlError::DegenerateData(_)));
    }

    #[test]
    fn test_same_seed_same_model() {
        let (data, labels) = two_blobs(300, 11);
        let config = GbdtConfig { subsample: 0.8, n_estimators: 40, ..Default::default() };
        let a = GradientBoostedTrees::fit(&data, 2, &labels, Objective::BinaryLogistic, &config).unwrap();
        let b = GradientBoostedTrees::fit(&data, 2, &labels, Objective::BinaryLogistic, &config).unwrap();
        let row = [0.3, 0.7];
        assert_eq!(a.predict(&row).unwrap().to_bits(), b.predict(&row).unwrap().to_bits());
        assert_eq!(a.feature_importance(), b.feature_importance());
    }

    #[test]
    fn test_wrong_arity_and_nan_rejected() {
        let (data, labels) = two_blobs(50, 1);
        let model = GradientBoostedTrees::fit(
            &data,
            2,
            &labels,
            Objective::BinaryLogistic,
            &GbdtConfig { n_estimators: 5, ..Default::default() },
        )
        .unwrap();
        assert!(model.predict(&[1.0]).is_err());
        assert!(model.predict(&[f64::NAN, 1.0]).is_err());
    }

    #[test]
    fn test_regression_tracks_target() {
        let data: Vec<f64> = (0..200).map(|i| i as f64 / 20.0).collect();
        let targets: Vec<f64> = data.iter().map(|x| (x / 2.0).sin()).collect();
        let config = GbdtConfig { n_estimators: 150, ..Default::default() };
        let model = GradientBoostedTrees::fit(&data, 1, &targets, Objective::SquaredError, &config).unwrap();
        for &x in &[1.0, 4.0, 8.0] {
            let pred = model.predict(&[x]).unwrap();
            assert!((pred - (x / 2.0).sin()).abs() < 0.1, "x = {x}, pred = {pred}");
        }
        assert!(model.predict_proba(&[1.0]).is_err());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = GbdtConfig { subsample: 0.0, ..Default::default() };
        assert!(matches!(config.validate(), Err(MlError::InvalidConfig(_))));
        let config = GbdtConfig { max_bins: 1000, ..Default::default() };
        assert!(config.validate().is_err());
    }
}
