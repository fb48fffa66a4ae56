//! Room geometry loader.

use std::path::Path;

use encounter_core::RoomLayout;

use crate::loaders::{LoadResult, read_file};

/// Loader for the room layout from RON files.
pub struct RoomLoader;

impl RoomLoader {
    /// Load the room layout from a RON file.
    ///
    /// File format: a single `RoomLayout` struct.
    ///
    /// Example:
    /// ```ron
    /// (
    ///     entry_limit: 9820.0,
    ///     hazard: (start: (x: 4197.0, y: 4197.0), length: 690, width: 368.0),
    ///     entrance: [(x: 205, y: 209)],
    ///     // ...
    /// )
    /// ```
    pub fn load(path: &Path) -> LoadResult<RoomLayout> {
        let content = read_file(path)?;
        let room: RoomLayout = ron::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse room RON at {:?}: {}", path, e))?;
        if room.far_wall >= room.close_wall {
            anyhow::bail!("room at {:?}: far wall must lie before the close wall", path);
        }
        Ok(room)
    }
}
