use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error taxonomy of the scoring engine.
///
/// `InvalidStructure` and `Input` are recoverable at the request boundary and are
/// reported per compound. `ModelNotTrained` means inference ran before startup
/// finished. `Configuration` is fatal: the process must not serve predictions.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("Invalid structure '{structure}': {reason}")]
    InvalidStructure { structure: String, reason: String },

    #[error("Invalid input: {0}")]
    Input(String),

    #[error("Models not trained: {0}")]
    ModelNotTrained(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Coarse error category, carried by failed screening entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidStructure,
    Input,
    ModelNotTrained,
    Configuration,
}

impl EngineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::InvalidStructure { .. } => ErrorKind::InvalidStructure,
            EngineError::Input(_) => ErrorKind::Input,
            EngineError::ModelNotTrained(_) => ErrorKind::ModelNotTrained,
            EngineError::Configuration(_) => ErrorKind::Configuration,
        }
    }

    /// True for errors that only affect a single compound.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, EngineError::InvalidStructure { .. } | EngineError::Input(_))
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
