//! Balance configuration loader.

use std::path::Path;

use anyhow::Context;
use encounter_core::EncounterConfig;

use crate::loaders::{LoadResult, read_file};

/// Loader for encounter balance from TOML files.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load balance data from a TOML file.
    ///
    /// Missing sections and fields keep their defaults.
    pub fn load(path: &Path) -> LoadResult<EncounterConfig> {
        let content = read_file(path)?;
        Self::parse(&content).with_context(|| format!("in {}", path.display()))
    }

    /// Parse balance data from TOML text.
    pub fn parse(content: &str) -> LoadResult<EncounterConfig> {
        let config: EncounterConfig = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config TOML: {}", e))?;
        if config.tick_rate == 0 {
            anyhow::bail!("tick_rate must be positive");
        }
        Ok(config)
    }
}
