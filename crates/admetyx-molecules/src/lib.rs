//! Admetyx Molecules - descriptor handling and the trained prediction models.
//!
//! 1. Resolving structures into descriptor vectors (`adapter`)
//! 2. Rule-family assessment (`rules`)
//! 3. Synthetic training corpora (`corpus`)
//! 4. Drug-likeness classification (`drug_likeness`)
//! 5. ADMET endpoint regression (`admet`)
//! 6. Process-wide trained model snapshots (`models`)
//! 7. The curated reference library (`library`)

pub mod compound;
pub mod adapter;
pub mod rules;
pub mod corpus;
pub mod drug_likeness;
pub mod admet;
pub mod models;
pub mod library;

pub use adapter::{DescriptorService, HeuristicDescriptorService, ParseError, StaticDescriptorService};
pub use admet::{AdmetRegressor, AdmetResult, EndpointScore};
pub use compound::Compound;
pub use library::{
    library_id, reference_compounds, reference_library, summarize, LibraryEntry, LibrarySummary, TARGETS,
};
pub use drug_likeness::{DrugLikenessClassifier, FeatureImportance, PredictionResult};
pub use models::{train_models, ModelStore, TrainedModels};
pub use rules::{assess_rules, RuleAssessment, RuleReport};

use admetyx_common::EngineError;
use admetyx_ml::MlError;

/// Model failures while serving a prediction.
pub(crate) fn inference_error(err: MlError) -> EngineError {
    match err {
        MlError::InvalidInput(msg) => EngineError::Input(msg),
        other => EngineError::Configuration(other.to_string()),
    }
}

/// Any failure while fitting leaves the process without a servable model.
pub(crate) fn training_error(err: MlError) -> EngineError {
    EngineError::Configuration(err.to_string())
}

/// Boosting hyper-parameters for one fitted ensemble.
pub(crate) fn boosting_config(ensemble: &admetyx_common::EnsembleConfig, seed: u64) -> admetyx_ml::GbdtConfig {
    admetyx_ml::GbdtConfig {
        n_estimators: ensemble.n_estimators,
        learning_rate: ensemble.learning_rate,
        max_depth: ensemble.max_depth,
        min_samples_leaf: ensemble.min_samples_leaf,
        subsample: ensemble.subsample,
        max_bins: ensemble.max_bins,
        seed,
    }
}
