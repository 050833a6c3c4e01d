//! Shared testing utilities for the Admetyx workspace.
//!
//! Descriptor fixtures, a scriptable descriptor service and a small training
//! configuration that keeps model-backed tests fast.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use admetyx_common::{DescriptorVector, EnsembleConfig, TrainingConfig};
use admetyx_molecules::{DescriptorService, ParseError};

pub use pretty_assertions;

// ── Fixtures ────────────────────────────────────────────────────────────────

/// Comfortably inside every rule family.
pub fn drug_like_descriptors() -> DescriptorVector {
    DescriptorVector {
        mw: 320.0,
        logp: 2.5,
        hbd: 2,
        hba: 5,
        tpsa: 75.0,
        rotatable_bonds: 5,
        qed: 0.75,
        fsp3: 0.35,
        heavy_atoms: 23,
        molar_refractivity: 88.0,
    }
}

/// Violates every rule family by a wide margin.
pub fn decoy_descriptors() -> DescriptorVector {
    DescriptorVector {
        mw: 820.0,
        logp: 9.0,
        hbd: 11,
        hba: 17,
        tpsa: 210.0,
        rotatable_bonds: 16,
        qed: 0.10,
        fsp3: 0.15,
        heavy_atoms: 75,
        molar_refractivity: 190.0,
    }
}

/// A small lipophilic molecule in the ibuprofen region.
pub fn small_lipophilic_descriptors() -> DescriptorVector {
    DescriptorVector {
        mw: 206.3,
        logp: 3.5,
        hbd: 1,
        hba: 2,
        tpsa: 37.3,
        rotatable_bonds: 4,
        qed: 0.72,
        fsp3: 0.46,
        heavy_atoms: 15,
        molar_refractivity: 61.0,
    }
}

/// Training settings small enough for unit and integration tests.
pub fn quick_training_config() -> TrainingConfig {
    TrainingConfig {
        classifier_samples: 600,
        regressor_samples: 600,
        cv_folds: 3,
        ensemble: EnsembleConfig { n_estimators: 40, ..EnsembleConfig::default() },
        ..TrainingConfig::default()
    }
}

// ── Mock descriptor service ─────────────────────────────────────────────────

/// Mock service with scripted answers. Unknown structures are parse errors.
#[derive(Debug, Default)]
pub struct MockDescriptorService {
    data: HashMap<String, DescriptorVector>,
    failures: HashMap<String, String>,
    calls: AtomicUsize,
}

impl MockDescriptorService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `structure` with `descriptors`.
    pub fn with(mut self, structure: &str, descriptors: DescriptorVector) -> Self {
        self.data.insert(structure.to_string(), descriptors);
        self
    }

    /// Reject `structure` with `reason`.
    pub fn failing(mut self, structure: &str, reason: &str) -> Self {
        self.failures.insert(structure.to_string(), reason.to_string());
        self
    }

    /// Number of lookups served so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl DescriptorService for MockDescriptorService {
    fn descriptors(&self, structure: &str) -> Result<DescriptorVector, ParseError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(reason) = self.failures.get(structure) {
            return Err(ParseError::new(structure, reason.clone()));
        }
        self.data
            .get(structure)
            .copied()
            .ok_or_else(|| ParseError::new(structure, "unknown structure"))
    }
}
