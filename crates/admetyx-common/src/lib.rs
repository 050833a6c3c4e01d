//! admetyx-common: Shared types, errors, and configuration used across all Admetyx crates.

pub mod error;
pub mod descriptors;
pub mod endpoints;
pub mod confidence;
pub mod config;

// Re-export commonly used types
pub use config::{EngineConfig, RuleThresholds, ScoringConfig, TrainingConfig, EnsembleConfig};
pub use descriptors::DescriptorVector;
pub use endpoints::{AdmetEndpoint, TrafficLight};
pub use error::{EngineError, Result};
