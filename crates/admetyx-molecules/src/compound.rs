//! Compounds submitted for scoring.

use admetyx_common::DescriptorVector;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A named structure, optionally carrying precomputed descriptors.
///
/// Compounds without descriptors are resolved through a
/// [`DescriptorService`](crate::adapter::DescriptorService) at scoring time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Compound {
    pub id: Uuid,
    pub name: String,
    pub smiles: String,
    pub descriptors: Option<DescriptorVector>,
    pub source: String,
}

impl Compound {
    /// Create a new compound from SMILES.
    pub fn new(smiles: &str, source: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: smiles.to_string(),
            smiles: smiles.to_string(),
            descriptors: None,
            source: source.to_string(),
        }
    }

    /// Replace the random id, e.g. with one derived from a stable key.
    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn with_descriptors(mut self, descriptors: DescriptorVector) -> Self {
        self.descriptors = Some(descriptors);
        self
    }
}
