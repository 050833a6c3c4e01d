//! Configuration loading for the Admetyx driver.
//! Reads admetyx.toml from the current directory or the path in ADMETYX_CONFIG.

use admetyx_common::EngineConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub run: RunConfig,
    #[serde(flatten)]
    pub engine: EngineConfig,
}

/// What a single invocation of the binary does.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Overrides `training.seed` when set
    pub seed: Option<u64>,
    #[serde(default = "bool_true")]
    pub screen_library: bool,
    /// Entries kept per report in the printed output; 0 keeps all
    #[serde(default)]
    pub top_n: usize,
    #[serde(default = "bool_true")]
    pub pretty: bool,
}

fn bool_true() -> bool { true }

impl Default for RunConfig {
    fn default() -> Self {
        Self { seed: None, screen_library: bool_true(), top_n: 0, pretty: bool_true() }
    }
}


impl Config {
    /// Load configuration from admetyx.toml.
    /// Checks ADMETYX_CONFIG env var first, then current directory.
    ///
    /// A missing file yields `None`; a file that does not parse or validate is an error.
    pub fn load() -> anyhow::Result<Option<Self>> {
        let path = std::env::var("ADMETYX_CONFIG")
            .unwrap_or_else(|_| "admetyx.toml".to_string());
        Self::load_from(Path::new(&path))
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(path)?;
        let config = Self::parse(&content)
            .map_err(|e| anyhow::anyhow!("invalid config {}: {e}", path.display()))?;
        Ok(Some(config))
    }

    /// Parse TOML and check the engine section for consistency.
    pub fn parse(content: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.engine.validate()?;
        Ok(config)
    }

    /// Training seed for this run.
    pub fn seed(&self) -> u64 {
        self.run.seed.unwrap_or(self.engine.training.seed)
    }
}
