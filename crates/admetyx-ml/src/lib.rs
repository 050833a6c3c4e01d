//! admetyx-ml: Boosted tree ensembles for drug-likeness classification and ADMET regression.
//!
//! Data is flat row-major `&[f64]` with an explicit `n_features`, so callers can
//! hand over a training corpus without building an intermediate matrix type.

pub mod error;
pub mod sampling;
pub mod binning;
pub mod tree;
pub mod gbdt;
pub mod cross_validation;

pub use cross_validation::{accuracy, cross_validate_kfold, CvResult, FoldResult};
pub use error::{MlError, Result};
pub use gbdt::{GbdtConfig, GradientBoostedTrees, Objective};
