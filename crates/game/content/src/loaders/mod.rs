//! Content loaders for reading encounter data from files.

pub mod config;
pub mod room;

pub use config::ConfigLoader;
pub use room::RoomLoader;

use std::path::Path;

use anyhow::Context;
use encounter_core::EncounterConfig;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read file {}", path.display()))
}

/// Loads `balance.toml` and `room.ron` from `dir` into one configuration.
pub fn load_encounter(dir: &Path) -> LoadResult<EncounterConfig> {
    let mut config = ConfigLoader::load(&dir.join("balance.toml"))?;
    config.room = RoomLoader::load(&dir.join("room.ron"))?;
    Ok(config)
}
