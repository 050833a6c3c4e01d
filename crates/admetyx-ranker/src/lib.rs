//! admetyx-ranker: Virtual screening: composite scoring and ranking of compounds.

pub mod engine;
pub mod scorer;
pub mod normalise;
pub mod weights;

pub use engine::{ScreeningEngine, ScreeningReport};
pub use scorer::{compute_composite_score, rank_entries, ScoreComponents, ScreeningEntry, ScreeningFailure};
pub use weights::CompositeWeights;
