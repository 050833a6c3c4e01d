use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MlError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The training set cannot produce a usable model (empty, single class, ...).
    #[error("Degenerate training data: {0}")]
    DegenerateData(String),

    #[error("Invalid model configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, MlError>;
