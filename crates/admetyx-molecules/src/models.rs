//! Trained model snapshots shared by every inference call.
//!
//! Training is seeded and deterministic. The resulting classifier + regressor pair
//! is immutable and handed out as an `Arc` from a [`ModelStore`]; a retrain builds
//! a fresh pair without holding the read lock and swaps the reference in one step.
//!
//! # Example
//!
//! ```rust,no_run
//! use admetyx_common::TrainingConfig;
//! use admetyx_molecules::ModelStore;
//!
//! let store = ModelStore::global();
//! let models = store.get_or_train(42, &TrainingConfig::default())?;
//! println!("cv accuracy {}", models.classifier.cv_accuracy());
//! # Ok::<(), admetyx_common::EngineError>(())
//! ```

use std::sync::{Arc, Mutex, OnceLock, RwLock};

use admetyx_common::{EngineError, Result, TrainingConfig};
use tracing::{debug, info, instrument};

use crate::admet::AdmetRegressor;
use crate::corpus::{classifier_corpus, regressor_corpus};
use crate::drug_likeness::DrugLikenessClassifier;

/// An immutable classifier + regressor pair.
#[derive(Debug, Clone)]
pub struct TrainedModels {
    pub classifier: DrugLikenessClassifier,
    pub regressor: AdmetRegressor,
    /// Seed the pair was trained from
    pub seed: u64,
}

/// Generate both corpora from `seed` and fit both models.
///
/// Training the same seed with the same configuration always yields the same models.
#[instrument(skip(config), fields(
    classifier_samples = config.classifier_samples,
    regressor_samples = config.regressor_samples,
))]
pub fn train_models(seed: u64, config: &TrainingConfig) -> Result<TrainedModels> {
    if config.cv_folds < 2 {
        return Err(EngineError::Configuration(format!(
            "cv_folds must be at least 2, got {}",
            config.cv_folds
        )));
    }
    if config.classifier_samples < 2 * config.cv_folds {
        return Err(EngineError::Configuration(format!(
            "classifier_samples ({}) too small for {} folds",
            config.classifier_samples, config.cv_folds
        )));
    }
    if config.regressor_samples == 0 {
        return Err(EngineError::Configuration("regressor_samples must be positive".into()));
    }

    info!("Generating synthetic training corpora");
    let classifier_data = classifier_corpus(config.classifier_samples, seed);
    let regressor_data = regressor_corpus(config.regressor_samples, seed);

    let classifier = DrugLikenessClassifier::train(&classifier_data, &config.ensemble, seed, config.cv_folds)?;
    let regressor = AdmetRegressor::train(&regressor_data, &config.ensemble, seed)?;

    info!(cv_accuracy = classifier.cv_accuracy(), "Models trained");
    Ok(TrainedModels { classifier, regressor, seed })
}

/// Holder of the current model snapshot.
pub struct ModelStore {
    current: RwLock<Option<Arc<TrainedModels>>>,
    /// Serialises retrains
    retrain_guard: Mutex<()>,
}

impl std::fmt::Debug for ModelStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelStore")
            .field("ready", &self.is_ready())
            .finish()
    }
}

impl Default for ModelStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelStore {
    /// An empty store. Inference fails with `ModelNotTrained` until a pair is installed.
    pub fn new() -> Self {
        Self {
            current: RwLock::new(None),
            retrain_guard: Mutex::new(()),
        }
    }

    /// A store that already serves `models`.
    pub fn with_models(models: TrainedModels) -> Self {
        let store = Self::new();
        store.install(models);
        store
    }

    /// Process-wide store, created empty on first use.
    pub fn global() -> &'static ModelStore {
        static STORE: OnceLock<ModelStore> = OnceLock::new();
        STORE.get_or_init(ModelStore::new)
    }

    pub fn is_ready(&self) -> bool {
        self.current.read().unwrap_or_else(|e| e.into_inner()).is_some()
    }

    /// The current snapshot.
    pub fn snapshot(&self) -> Result<Arc<TrainedModels>> {
        let current = self.current.read().unwrap_or_else(|e| e.into_inner());
        current
            .as_ref()
            .map(Arc::clone)
            .ok_or_else(|| EngineError::ModelNotTrained("no model snapshot installed".into()))
    }

    /// Replace the current snapshot.
    pub fn install(&self, models: TrainedModels) -> Arc<TrainedModels> {
        let models = Arc::new(models);
        let mut current = self.current.write().unwrap_or_else(|e| e.into_inner());
        *current = Some(Arc::clone(&models));
        info!(seed = models.seed, "Model snapshot installed");
        models
    }

    /// Train a fresh pair and swap it in. Readers keep their old snapshot until they ask again.
    pub fn retrain(&self, seed: u64, config: &TrainingConfig) -> Result<Arc<TrainedModels>> {
        let _guard = self.retrain_guard.lock().unwrap_or_else(|e| e.into_inner());
        let models = train_models(seed, config)?;
        Ok(self.install(models))
    }

    /// The current snapshot, training one first if the store is empty.
    pub fn get_or_train(&self, seed: u64, config: &TrainingConfig) -> Result<Arc<TrainedModels>> {
        if let Ok(models) = self.snapshot() {
            debug!(seed = models.seed, "Model snapshot cache hit");
            return Ok(models);
        }
        let _guard = self.retrain_guard.lock().unwrap_or_else(|e| e.into_inner());
        // another caller may have trained while we waited
        if let Ok(models) = self.snapshot() {
            return Ok(models);
        }
        let models = train_models(seed, config)?;
        Ok(self.install(models))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use admetyx_common::EnsembleConfig;

    fn quick_config() -> TrainingConfig {
        TrainingConfig {
            classifier_samples: 300,
            regressor_samples: 300,
            cv_folds: 3,
            ensemble: EnsembleConfig { n_estimators: 15, ..EnsembleConfig::default() },
            ..TrainingConfig::default()
        }
    }

    #[test]
    fn test_empty_store_not_trained() {
        let store = ModelStore::new();
        assert!(!store.is_ready());
        assert!(matches!(store.snapshot(), Err(EngineError::ModelNotTrained(_))));
    }

    #[test]
    fn test_training_is_reproducible() {
        let a = train_models(7, &quick_config()).unwrap();
        let b = train_models(7, &quick_config()).unwrap();
        assert_eq!(a.classifier.cv_accuracy(), b.classifier.cv_accuracy());
        assert_eq!(a.classifier.feature_importance(), b.classifier.feature_importance());
    }

    #[test]
    fn test_retrain_swaps_snapshot() {
        let store = ModelStore::new();
        let first = store.get_or_train(1, &quick_config()).unwrap();
        assert_eq!(first.seed, 1);

        // cached, seed argument ignored
        let again = store.get_or_train(2, &quick_config()).unwrap();
        assert!(Arc::ptr_eq(&first, &again));

        let second = store.retrain(2, &quick_config()).unwrap();
        assert_eq!(second.seed, 2);
        assert_eq!(store.snapshot().unwrap().seed, 2);
        // an old reader still holds its pair
        assert_eq!(first.seed, 1);
    }

    #[test]
    fn test_invalid_training_config() {
        let mut config = quick_config();
        config.cv_folds = 1;
        assert!(matches!(train_models(1, &config), Err(EngineError::Configuration(_))));

        let mut config = quick_config();
        config.classifier_samples = 4;
        assert!(matches!(train_models(1, &config), Err(EngineError::Configuration(_))));

        let mut config = quick_config();
        config.ensemble.learning_rate = 0.0;
        assert!(matches!(train_models(1, &config), Err(EngineError::Configuration(_))));
    }
}
