//! Data-driven encounter content and loaders.
//!
//! This crate ships the Stone Guard data files and the loaders that read them:
//! - Balance configuration (data-driven via TOML)
//! - Room geometry (data-driven via RON)
//!
//! All loaders deserialize encounter-core types directly through its `serde` feature.

#[cfg(feature = "loaders")]
pub mod loaders;

#[cfg(feature = "loaders")]
pub use loaders::{ConfigLoader, LoadResult, RoomLoader, load_encounter};

/// Directory holding the shipped data files.
pub const DATA_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/data");
