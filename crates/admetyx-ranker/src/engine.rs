//! Screening engine: rules, models and the composite score behind one entry point.
//!
//! The engine is synchronous and performs no I/O. Each request takes one model
//! snapshot from the [`ModelStore`] and scores every compound against it, so a
//! retrain that lands mid-request never mixes two model pairs in one report.

use std::sync::Arc;

use admetyx_common::{DescriptorVector, EngineConfig, Result};
use admetyx_molecules::adapter::resolve;
use admetyx_molecules::models::TrainedModels;
use admetyx_molecules::{
    assess_rules, AdmetResult, Compound, DescriptorService, ModelStore, PredictionResult, RuleReport,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::normalise::rule_compliance;
use crate::scorer::{compute_composite_score, rank_entries, ScoreComponents, ScreeningEntry, ScreeningFailure};
use crate::weights::CompositeWeights;

/// Source tag for structures submitted outside the reference library.
pub const SUBMITTED_SOURCE: &str = "submitted";

/// Ranked result of one screening request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreeningReport {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    /// Seed of the model pair used for every entry
    pub model_seed: u64,
    pub cv_accuracy: f64,
    /// Best first, `rank` starting at 1
    pub entries: Vec<ScreeningEntry>,
    /// In input order
    pub failures: Vec<ScreeningFailure>,
    pub succeeded: usize,
    pub failed: usize,
}

impl ScreeningReport {
    pub fn top(&self, n: usize) -> &[ScreeningEntry] {
        &self.entries[..n.min(self.entries.len())]
    }

    pub fn entry(&self, name: &str) -> Option<&ScreeningEntry> {
        self.entries.iter().find(|e| e.name == name)
    }
}

pub struct ScreeningEngine {
    config: EngineConfig,
    weights: CompositeWeights,
    store: Arc<ModelStore>,
    descriptors: Arc<dyn DescriptorService>,
}

impl std::fmt::Debug for ScreeningEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScreeningEngine")
            .field("weights", &self.weights)
            .field("store", &self.store)
            .finish()
    }
}

impl ScreeningEngine {
    /// Engine with its own empty model store. Fails if `config` is inconsistent.
    pub fn new(config: EngineConfig, descriptors: Arc<dyn DescriptorService>) -> Result<Self> {
        Self::with_store(config, descriptors, Arc::new(ModelStore::new()))
    }

    /// Engine serving from a shared store.
    pub fn with_store(
        config: EngineConfig,
        descriptors: Arc<dyn DescriptorService>,
        store: Arc<ModelStore>,
    ) -> Result<Self> {
        config.validate()?;
        let weights = CompositeWeights::from_config(&config.scoring.weights)?;
        Ok(Self { config, weights, store, descriptors })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<ModelStore> {
        &self.store
    }

    /// Train (or retrain) the model pair from `seed` and make it current.
    pub fn train_models(&self, seed: u64) -> Result<Arc<TrainedModels>> {
        self.store.retrain(seed, &self.config.training)
    }

    /// The three rule-family assessments.
    pub fn assess_rules(&self, descriptors: &DescriptorVector) -> Result<RuleReport> {
        descriptors.validate()?;
        Ok(assess_rules(descriptors, &self.config.rules))
    }

    pub fn classify(&self, descriptors: &DescriptorVector) -> Result<PredictionResult> {
        let models = self.store.snapshot()?;
        models.classifier.predict(descriptors, &self.config.confidence)
    }

    pub fn predict_admet(&self, descriptors: &DescriptorVector) -> Result<AdmetResult> {
        let models = self.store.snapshot()?;
        models.regressor.predict(descriptors, &self.config.admet)
    }

    /// Score one compound against a fixed model pair. The entry is unranked.
    fn score(&self, models: &TrainedModels, compound: &Compound) -> Result<ScreeningEntry> {
        let descriptors = resolve(compound, self.descriptors.as_ref())?;
        let rules = assess_rules(&descriptors, &self.config.rules);
        let prediction = models.classifier.predict(&descriptors, &self.config.confidence)?;
        let admet = models.regressor.predict(&descriptors, &self.config.admet)?;

        let components = ScoreComponents {
            rule_compliance: rule_compliance(&rules, self.config.scoring.family_share),
            drug_likeness: prediction.probability,
            admet: admet.weighted_mean(&self.config.scoring.endpoint_weights),
        };
        let composite_score = compute_composite_score(&components, &self.weights);

        Ok(ScreeningEntry {
            compound_id: compound.id,
            name: compound.name.clone(),
            smiles: compound.smiles.clone(),
            descriptors,
            rules,
            prediction,
            admet,
            components,
            composite_score,
            rank: 0,
        })
    }

    /// Score a single ad-hoc compound.
    pub fn score_compound(&self, compound: &Compound) -> Result<ScreeningEntry> {
        let models = self.store.snapshot()?;
        let mut entry = self.score(&models, compound)?;
        entry.rank = 1;
        Ok(entry)
    }

    /// Score and rank every compound. A compound that fails lands in `failures`
    /// without affecting the others; only a missing model pair fails the request.
    #[instrument(skip(self, compounds), fields(compounds = compounds.len()))]
    pub fn screen_library(&self, compounds: &[Compound]) -> Result<ScreeningReport> {
        let models = self.store.snapshot()?;
        let mut entries = Vec::with_capacity(compounds.len());
        let mut failures = Vec::new();

        for compound in compounds {
            match self.score(&models, compound) {
                Ok(entry) => {
                    debug!(name = %entry.name, score = entry.composite_score, "compound scored");
                    entries.push(entry);
                }
                Err(e) if e.is_recoverable() => {
                    warn!(name = %compound.name, error = %e, "compound could not be scored");
                    failures.push(ScreeningFailure::new(compound, &e));
                }
                Err(e) => return Err(e),
            }
        }

        rank_entries(&mut entries, self.config.scoring.tie_epsilon);

        let report = ScreeningReport {
            run_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            model_seed: models.seed,
            cv_accuracy: models.classifier.cv_accuracy(),
            succeeded: entries.len(),
            failed: failures.len(),
            entries,
            failures,
        };
        info!(
            run_id = %report.run_id,
            succeeded = report.succeeded,
            failed = report.failed,
            "screening complete"
        );
        Ok(report)
    }

    /// Screen structures given only as notation; descriptors come from the service.
    pub fn screen_structures(&self, structures: &[&str]) -> Result<ScreeningReport> {
        let compounds: Vec<Compound> = structures
            .iter()
            .map(|s| Compound::new(s, SUBMITTED_SOURCE))
            .collect();
        self.screen_library(&compounds)
    }
}
