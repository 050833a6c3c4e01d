//! End-to-end screening over the reference library.

use std::sync::{Arc, OnceLock};

use admetyx_common::config::MIN_TIE_EPSILON;
use admetyx_common::error::ErrorKind;
use admetyx_common::{EngineConfig, EngineError, TrainingConfig};
use admetyx_molecules::models::{train_models, TrainedModels};
use admetyx_molecules::{
    reference_compounds, Compound, HeuristicDescriptorService, ModelStore, StaticDescriptorService,
};
use admetyx_ranker::ScreeningEngine;
use admetyx_test_utils::{
    decoy_descriptors, drug_like_descriptors, quick_training_config, small_lipophilic_descriptors,
    MockDescriptorService,
};
use pretty_assertions::assert_eq;

/// Default-configuration models for seed 42, trained once per test binary.
fn seed_42_models() -> &'static TrainedModels {
    static MODELS: OnceLock<TrainedModels> = OnceLock::new();
    MODELS.get_or_init(|| train_models(42, &TrainingConfig::default()).unwrap())
}

fn engine() -> ScreeningEngine {
    let store = Arc::new(ModelStore::with_models(seed_42_models().clone()));
    ScreeningEngine::with_store(EngineConfig::default(), Arc::new(HeuristicDescriptorService::new()), store)
        .unwrap()
}

#[test]
fn test_seed_42_training_reproducible() {
    let again = train_models(42, &TrainingConfig::default()).unwrap();
    let first = seed_42_models();
    assert_eq!(again.classifier.cv_accuracy(), first.classifier.cv_accuracy());
    let order = |m: &TrainedModels| {
        m.classifier
            .feature_importance()
            .iter()
            .map(|f| f.feature.clone())
            .collect::<Vec<_>>()
    };
    assert_eq!(order(&again), order(first));
    assert!(first.classifier.cv_accuracy() > 0.8);
}

#[test]
fn test_library_screening_ranked_and_stable() {
    let engine = engine();
    let library = reference_compounds();
    let a = engine.screen_library(&library).unwrap();
    let b = engine.screen_library(&library).unwrap();

    assert_eq!(a.succeeded, 20);
    assert_eq!(a.failed, 0);
    assert!(a.entries.windows(2).all(|w| w[0].composite_score >= w[1].composite_score));
    for (i, entry) in a.entries.iter().enumerate() {
        assert_eq!(entry.rank, i + 1);
        assert!((0.0..=1.0).contains(&entry.composite_score));
    }

    let names = |r: &admetyx_ranker::ScreeningReport| r.entries.iter().map(|e| e.name.clone()).collect::<Vec<_>>();
    assert_eq!(names(&a), names(&b));
    for (x, y) in a.entries.iter().zip(&b.entries) {
        assert_eq!(x.composite_score, y.composite_score);
    }
    assert_ne!(a.run_id, b.run_id);
}

#[test]
fn test_partial_failure_reported() {
    let engine = engine();
    let mut compounds: Vec<Compound> = reference_compounds().into_iter().take(19).collect();
    compounds.insert(7, Compound::new("C1CC(C", "submitted").with_name("broken"));

    let report = engine.screen_library(&compounds).unwrap();
    assert_eq!(report.succeeded, 19);
    assert_eq!(report.failed, 1);
    assert_eq!(report.failures[0].name, "broken");
    assert_eq!(report.failures[0].kind, ErrorKind::InvalidStructure);
    assert!(report.entry("broken").is_none());
}

#[test]
fn test_small_lipophilic_compound() {
    let engine = engine();
    let d = small_lipophilic_descriptors();

    let rules = engine.assess_rules(&d).unwrap();
    assert!(rules.lipinski.passed);
    assert!(rules.veber.passed);

    let prediction = engine.classify(&d).unwrap();
    assert!(prediction.probability > 0.5, "p = {}", prediction.probability);
    assert_eq!(prediction.label.as_str(), "Drug-Like");
}

#[test]
fn test_drug_like_outranks_decoy() {
    let service = MockDescriptorService::new()
        .with("decoy", decoy_descriptors())
        .with("lead", drug_like_descriptors());
    let store = Arc::new(ModelStore::with_models(seed_42_models().clone()));
    let engine = ScreeningEngine::with_store(EngineConfig::default(), Arc::new(service), store).unwrap();

    let report = engine.screen_structures(&["decoy", "lead"]).unwrap();
    assert_eq!(report.entries[0].smiles, "lead");
    assert_eq!(report.entries[1].smiles, "decoy");
    assert_eq!(report.entries[1].rules.families_passed(), 0);
}

#[test]
fn test_smallest_tie_epsilon_still_ranks_descending() {
    let service = MockDescriptorService::new()
        .with("decoy", decoy_descriptors())
        .with("lead", drug_like_descriptors());
    let mut config = EngineConfig::default();
    config.scoring.tie_epsilon = MIN_TIE_EPSILON;
    let store = Arc::new(ModelStore::with_models(seed_42_models().clone()));
    let engine = ScreeningEngine::with_store(config, Arc::new(service), store).unwrap();

    let report = engine.screen_structures(&["decoy", "lead"]).unwrap();
    assert_eq!(report.entries[0].smiles, "lead");
    assert!(report.entries[0].composite_score > report.entries[1].composite_score);
}

#[test]
fn test_degenerate_tie_epsilon_rejected() {
    for eps in [1e-300, f64::INFINITY] {
        let mut config = EngineConfig::default();
        config.scoring.tie_epsilon = eps;
        let engine = ScreeningEngine::new(config, Arc::new(HeuristicDescriptorService::new()));
        assert!(matches!(engine, Err(EngineError::Configuration(_))), "eps = {eps}");
    }
}

#[test]
fn test_equal_scores_keep_input_order() {
    let engine = engine();
    let d = drug_like_descriptors();
    let compounds = vec![
        Compound::new("CCO", "submitted").with_name("first").with_descriptors(d),
        Compound::new("CCO", "submitted").with_name("second").with_descriptors(d),
        Compound::new("CCO", "submitted").with_name("third").with_descriptors(d),
    ];
    let report = engine.screen_library(&compounds).unwrap();
    let names: Vec<&str> = report.entries.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["first", "second", "third"]);
}

#[test]
fn test_inference_before_training_fails() {
    let engine = ScreeningEngine::new(EngineConfig::default(), Arc::new(HeuristicDescriptorService::new())).unwrap();
    let d = drug_like_descriptors();

    // rules need no models
    assert!(engine.assess_rules(&d).is_ok());
    assert!(matches!(engine.classify(&d), Err(EngineError::ModelNotTrained(_))));
    assert!(matches!(engine.predict_admet(&d), Err(EngineError::ModelNotTrained(_))));
    assert!(matches!(
        engine.screen_library(&reference_compounds()),
        Err(EngineError::ModelNotTrained(_))
    ));
}

#[test]
fn test_engine_trains_into_empty_store() {
    let mut config = EngineConfig::default();
    config.training = quick_training_config();
    let engine = ScreeningEngine::new(config, Arc::new(HeuristicDescriptorService::new())).unwrap();
    assert!(!engine.store().is_ready());

    let models = engine.train_models(7).unwrap();
    assert_eq!(models.seed, 7);
    assert!(engine.store().is_ready());

    let prediction = engine.classify(&drug_like_descriptors()).unwrap();
    assert_eq!(prediction.cv_accuracy, models.classifier.cv_accuracy());
    let report = engine.screen_library(&reference_compounds()).unwrap();
    assert_eq!(report.model_seed, 7);
    assert_eq!(report.succeeded, 20);
}

#[test]
fn test_library_ids_stable_across_runs() {
    let engine = engine();
    let ids = |r: &admetyx_ranker::ScreeningReport| {
        let mut ids: Vec<_> = r.entries.iter().map(|e| e.compound_id).collect();
        ids.sort();
        ids
    };
    let a = engine.screen_library(&reference_compounds()).unwrap();
    let b = engine.screen_library(&reference_compounds()).unwrap();
    assert_eq!(ids(&a), ids(&b));
}

#[test]
fn test_repeated_inference_identical() {
    let engine = engine();
    let d = small_lipophilic_descriptors();
    assert_eq!(engine.classify(&d).unwrap(), engine.classify(&d).unwrap());
    assert_eq!(engine.predict_admet(&d).unwrap(), engine.predict_admet(&d).unwrap());
}

#[test]
fn test_non_finite_descriptors_rejected() {
    let engine = engine();
    let mut d = drug_like_descriptors();
    d.logp = f64::INFINITY;
    assert!(matches!(engine.assess_rules(&d), Err(EngineError::Input(_))));
    assert!(matches!(engine.classify(&d), Err(EngineError::Input(_))));
}

#[test]
fn test_precomputed_descriptors_skip_service() {
    let service = Arc::new(MockDescriptorService::new().with("CCN", drug_like_descriptors()));
    let store = Arc::new(ModelStore::with_models(seed_42_models().clone()));
    let engine = ScreeningEngine::with_store(EngineConfig::default(), service.clone(), store).unwrap();

    let compounds = vec![
        Compound::new("CCO", "submitted").with_descriptors(small_lipophilic_descriptors()),
        Compound::new("CCN", "submitted"),
    ];
    let report = engine.screen_library(&compounds).unwrap();
    assert_eq!(report.succeeded, 2);
    assert_eq!(service.calls(), 1);
}

#[test]
fn test_library_structures_resolve_through_static_table() {
    let library = reference_compounds();
    let service = StaticDescriptorService::from_compounds(&library);
    assert_eq!(service.len(), 20);

    let store = Arc::new(ModelStore::with_models(seed_42_models().clone()));
    let engine = ScreeningEngine::with_store(EngineConfig::default(), Arc::new(service), store).unwrap();
    let smiles: Vec<&str> = library.iter().map(|c| c.smiles.as_str()).collect();
    let by_structure = engine.screen_structures(&smiles).unwrap();
    let by_compound = engine.screen_library(&library).unwrap();

    assert_eq!(by_structure.succeeded, 20);
    for (x, y) in by_structure.entries.iter().zip(&by_compound.entries) {
        assert_eq!(x.smiles, y.smiles);
        assert_eq!(x.composite_score, y.composite_score);
    }
}

#[test]
fn test_report_serializes() {
    let report = engine().screen_library(&reference_compounds()[..3]).unwrap();
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["succeeded"], 3);
    assert_eq!(json["entries"][0]["rank"], 1);
    assert_eq!(json["entries"][0]["admet"]["scores"].as_array().map(|s| s.len()), Some(5));
    assert!(json["entries"][0]["prediction"]["label"].is_string());
}
