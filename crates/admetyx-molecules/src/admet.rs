//! ADMET prediction for molecules.
//!
//! Five independent boosted regressors, one per endpoint, sharing the classifier's
//! ensemble configuration. Predictions are clipped to [0, 1] and graded green /
//! amber / red against per-endpoint cutoffs.

use admetyx_common::config::{AdmetConfig, EndpointWeights, EnsembleConfig, TrafficLightCutoffs};
use admetyx_common::descriptors::{check_features, REGRESSOR_FEATURES};
use admetyx_common::{AdmetEndpoint, DescriptorVector, EngineError, Result, TrafficLight};
use admetyx_ml::{GradientBoostedTrees, Objective};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::corpus::RegressorCorpus;
use crate::{boosting_config, inference_error, training_error};

/// One endpoint's prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointScore {
    pub endpoint: AdmetEndpoint,
    /// Clipped to [0, 1], higher is more favourable
    pub score: f64,
    pub light: TrafficLight,
    pub description: String,
}

/// ADMET properties for a molecule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdmetResult {
    /// In `AdmetEndpoint::ALL` order
    pub scores: Vec<EndpointScore>,
    /// Unweighted mean of the five scores
    pub overall: f64,
}

impl AdmetResult {
    pub fn score(&self, endpoint: AdmetEndpoint) -> f64 {
        self.scores[endpoint.index()].score
    }

    pub fn light(&self, endpoint: AdmetEndpoint) -> TrafficLight {
        self.scores[endpoint.index()].light
    }

    /// Mean of the endpoint scores weighted by `weights`.
    pub fn weighted_mean(&self, weights: &EndpointWeights) -> f64 {
        let w = weights.as_array();
        let total: f64 = w.iter().sum();
        if total <= 0.0 {
            return self.overall;
        }
        self.scores.iter().zip(w).map(|(s, w)| s.score * w).sum::<f64>() / total
    }
}

/// Green at or above `good`, amber at or above `moderate`, red below.
pub fn traffic_light(score: f64, cutoffs: &TrafficLightCutoffs) -> TrafficLight {
    if score >= cutoffs.good {
        TrafficLight::Green
    } else if score >= cutoffs.moderate {
        TrafficLight::Amber
    } else {
        TrafficLight::Red
    }
}

/// Predictor for ADMET properties.
#[derive(Debug, Clone)]
pub struct AdmetRegressor {
    /// One model per endpoint, in `AdmetEndpoint::ALL` order
    models: Vec<GradientBoostedTrees>,
}

impl AdmetRegressor {
    #[instrument(skip(corpus, ensemble), fields(samples = corpus.len()))]
    pub fn train(corpus: &RegressorCorpus, ensemble: &EnsembleConfig, seed: u64) -> Result<Self> {
        if corpus.is_empty() {
            return Err(EngineError::Configuration("regressor corpus is empty".into()));
        }
        let mut models = Vec::with_capacity(AdmetEndpoint::ALL.len());
        for endpoint in AdmetEndpoint::ALL {
            let config = boosting_config(ensemble, seed.wrapping_add(endpoint.index() as u64));
            let model = GradientBoostedTrees::fit(
                &corpus.features,
                RegressorCorpus::N_FEATURES,
                &corpus.targets[endpoint.index()],
                Objective::SquaredError,
                &config,
            )
            .map_err(training_error)?;
            debug!(%endpoint, trees = model.n_trees(), "endpoint regressor fitted");
            models.push(model);
        }
        info!("ADMET regressors trained");
        Ok(Self { models })
    }

    /// Clipped endpoint scores for a raw feature vector in `REGRESSOR_FEATURES` order.
    pub fn scores_from_features(&self, features: &[f64]) -> Result<[f64; 5]> {
        check_features(features, REGRESSOR_FEATURES.len())?;
        let mut scores = [0.0; 5];
        for (slot, model) in scores.iter_mut().zip(&self.models) {
            *slot = model.predict(features).map_err(inference_error)?.clamp(0.0, 1.0);
        }
        Ok(scores)
    }

    pub fn predict(&self, descriptors: &DescriptorVector, config: &AdmetConfig) -> Result<AdmetResult> {
        descriptors.validate()?;
        let raw = self.scores_from_features(&descriptors.regressor_features())?;

        let scores: Vec<EndpointScore> = AdmetEndpoint::ALL
            .iter()
            .zip(raw)
            .map(|(&endpoint, score)| EndpointScore {
                endpoint,
                score,
                light: traffic_light(score, config.cutoffs(endpoint)),
                description: endpoint.description().to_string(),
            })
            .collect();
        let overall = raw.iter().sum::<f64>() / raw.len() as f64;

        Ok(AdmetResult { scores, overall })
    }
}
