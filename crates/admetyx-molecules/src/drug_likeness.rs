//! Drug-likeness binary classifier.
//!
//! A boosted ensemble over the seven classifier descriptors, trained once on the
//! synthetic corpus. Training also reports a k-fold cross-validated accuracy and a
//! ranked feature-importance list.

use admetyx_common::confidence::{confidence_band, ConfidenceBand, DrugLikenessLabel};
use admetyx_common::config::{ConfidenceCutoffs, EnsembleConfig};
use admetyx_common::descriptors::{check_features, CLASSIFIER_FEATURES};
use admetyx_common::{DescriptorVector, EngineError, Result};
use admetyx_ml::{accuracy, cross_validate_kfold, GradientBoostedTrees, Objective};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::corpus::ClassifierCorpus;
use crate::{boosting_config, inference_error, training_error};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureImportance {
    pub feature: String,
    pub importance: f64,
}

/// Classifier output for one compound.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Probability of the drug-like class, in [0, 1]
    pub probability: f64,
    pub label: DrugLikenessLabel,
    pub confidence: ConfidenceBand,
    /// Cross-validated accuracy of the model that made the prediction
    pub cv_accuracy: f64,
    /// Most important feature first
    pub feature_importance: Vec<FeatureImportance>,
}

#[derive(Debug, Clone)]
pub struct DrugLikenessClassifier {
    model: GradientBoostedTrees,
    cv_accuracy: f64,
    importance: Vec<FeatureImportance>,
}

fn round4(x: f64) -> f64 {
    (x * 1e4).round() / 1e4
}

/// Rows of a row-major matrix selected by index.
fn gather(features: &[f64], n_features: usize, rows: &[usize]) -> Vec<f64> {
    rows.iter()
        .flat_map(|&i| &features[i * n_features..(i + 1) * n_features])
        .copied()
        .collect()
}

impl DrugLikenessClassifier {
    /// Fit on `corpus`, then estimate accuracy with `cv_folds`-fold cross-validation.
    ///
    /// Fails with `Configuration` on an empty or single-class corpus.
    #[instrument(skip(corpus, ensemble), fields(samples = corpus.len()))]
    pub fn train(corpus: &ClassifierCorpus, ensemble: &EnsembleConfig, seed: u64, cv_folds: usize) -> Result<Self> {
        if corpus.is_empty() {
            return Err(EngineError::Configuration("classifier corpus is empty".into()));
        }
        let n_features = ClassifierCorpus::N_FEATURES;
        let config = boosting_config(ensemble, seed);

        let model = GradientBoostedTrees::fit(
            &corpus.features,
            n_features,
            &corpus.labels,
            Objective::BinaryLogistic,
            &config,
        )
        .map_err(training_error)?;

        let cv = cross_validate_kfold(corpus.len(), cv_folds, seed, |train, test| {
            let fold_model = GradientBoostedTrees::fit(
                &gather(&corpus.features, n_features, train),
                n_features,
                &train.iter().map(|&i| corpus.labels[i]).collect::<Vec<_>>(),
                Objective::BinaryLogistic,
                &config,
            )?;
            let mut truth = Vec::with_capacity(test.len());
            let mut predicted = Vec::with_capacity(test.len());
            for &i in test {
                let p = fold_model.predict_proba(&corpus.features[i * n_features..(i + 1) * n_features])?;
                predicted.push(if p >= 0.5 { 1.0 } else { 0.0 });
                truth.push(corpus.labels[i]);
            }
            Ok(accuracy(&truth, &predicted))
        })
        .map_err(training_error)?;

        let mut importance: Vec<FeatureImportance> = CLASSIFIER_FEATURES
            .iter()
            .zip(model.feature_importance())
            .map(|(name, &value)| FeatureImportance { feature: name.to_string(), importance: value })
            .collect();
        importance.sort_by(|a, b| b.importance.total_cmp(&a.importance));

        let cv_accuracy = round4(cv.mean_score);
        info!(cv_accuracy, cv_std = cv.std_score, top_feature = %importance[0].feature, "drug-likeness classifier trained");

        Ok(Self { model, cv_accuracy, importance })
    }

    /// Mean k-fold accuracy, rounded to four decimals.
    pub fn cv_accuracy(&self) -> f64 {
        self.cv_accuracy
    }

    pub fn feature_importance(&self) -> &[FeatureImportance] {
        &self.importance
    }

    /// Drug-like probability for a raw feature vector in `CLASSIFIER_FEATURES` order.
    pub fn probability_from_features(&self, features: &[f64]) -> Result<f64> {
        check_features(features, CLASSIFIER_FEATURES.len())?;
        self.model.predict_proba(features).map_err(inference_error)
    }

    pub fn probability(&self, descriptors: &DescriptorVector) -> Result<f64> {
        descriptors.validate()?;
        self.probability_from_features(&descriptors.classifier_features())
    }

    pub fn predict(&self, descriptors: &DescriptorVector, cutoffs: &ConfidenceCutoffs) -> Result<PredictionResult> {
        let probability = self.probability(descriptors)?;
        Ok(PredictionResult {
            probability,
            label: DrugLikenessLabel::from_probability(probability),
            confidence: confidence_band(probability, cutoffs),
            cv_accuracy: self.cv_accuracy,
            feature_importance: self.importance.clone(),
        })
    }

    /// Predict a batch of named compounds. One failure does not stop the rest.
    pub fn classify_batch(
        &self,
        compounds: &[(String, DescriptorVector)],
        cutoffs: &ConfidenceCutoffs,
    ) -> Vec<(String, Result<PredictionResult>)> {
        compounds
            .iter()
            .map(|(name, d)| (name.clone(), self.predict(d, cutoffs)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::classifier_corpus;

    fn small_ensemble() -> EnsembleConfig {
        EnsembleConfig { n_estimators: 40, ..EnsembleConfig::default() }
    }

    fn trained() -> DrugLikenessClassifier {
        DrugLikenessClassifier::train(&classifier_corpus(600, 42), &small_ensemble(), 42, 5).unwrap()
    }

    fn sample(mw: f64, logp: f64, hbd: u32, hba: u32, tpsa: f64, rot: u32, qed: f64) -> DescriptorVector {
        DescriptorVector {
            mw,
            logp,
            hbd,
            hba,
            tpsa,
            rotatable_bonds: rot,
            qed,
            fsp3: 0.3,
            heavy_atoms: 25,
            molar_refractivity: 80.0,
        }
    }

    #[test]
    fn test_separates_prototypes() {
        let clf = trained();
        let drug = clf.probability(&sample(300.0, 2.0, 1, 4, 60.0, 4, 0.8)).unwrap();
        let decoy = clf.probability(&sample(800.0, 9.0, 12, 16, 200.0, 15, 0.1)).unwrap();
        assert!(drug > 0.5, "drug-like prototype p = {drug}");
        assert!(decoy < 0.5, "decoy prototype p = {decoy}");
        assert!(clf.cv_accuracy() > 0.8 && clf.cv_accuracy() <= 1.0);
    }

    #[test]
    fn test_importance_ranked_and_normalised() {
        let clf = trained();
        let imp = clf.feature_importance();
        assert_eq!(imp.len(), CLASSIFIER_FEATURES.len());
        assert!(imp.windows(2).all(|w| w[0].importance >= w[1].importance));
        assert!(imp.iter().all(|f| f.importance >= 0.0));
        let total: f64 = imp.iter().map(|f| f.importance).sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_malformed_inputs_rejected() {
        let clf = trained();
        assert!(matches!(clf.probability_from_features(&[1.0, 2.0]), Err(EngineError::Input(_))));
        let mut d = sample(300.0, 2.0, 1, 4, 60.0, 4, 0.8);
        d.tpsa = f64::NAN;
        assert!(matches!(clf.probability(&d), Err(EngineError::Input(_))));
    }

    #[test]
    fn test_single_class_corpus_is_configuration_error() {
        let mut corpus = classifier_corpus(100, 1);
        corpus.labels.iter_mut().for_each(|y| *y = 1.0);
        let err = DrugLikenessClassifier::train(&corpus, &small_ensemble(), 1, 5).unwrap_err();
        assert!(matches!(err, EngineError::Configuration(_)));

        let empty = ClassifierCorpus { features: vec![], labels: vec![] };
        assert!(matches!(
            DrugLikenessClassifier::train(&empty, &small_ensemble(), 1, 5),
            Err(EngineError::Configuration(_))
        ));
    }

    #[test]
    fn test_batch_reports_each_compound() {
        let clf = trained();
        let mut bad = sample(300.0, 2.0, 1, 4, 60.0, 4, 0.8);
        bad.qed = 3.0;
        let batch = vec![
            ("good".to_string(), sample(300.0, 2.0, 1, 4, 60.0, 4, 0.8)),
            ("bad".to_string(), bad),
        ];
        let results = clf.classify_batch(&batch, &ConfidenceCutoffs::default());
        assert_eq!(results.len(), 2);
        assert!(results[0].1.is_ok());
        assert!(results[1].1.is_err());
        let good = results[0].1.as_ref().unwrap();
        assert_eq!(good.label, DrugLikenessLabel::from_probability(good.probability));
    }

    #[test]
    fn test_prediction_carries_model_accuracy() {
        let clf = trained();
        let prediction = clf
            .predict(&sample(300.0, 2.0, 1, 4, 60.0, 4, 0.8), &ConfidenceCutoffs::default())
            .unwrap();
        assert_eq!(prediction.cv_accuracy, clf.cv_accuracy());
        assert!(prediction.cv_accuracy > 0.0);
    }
}
