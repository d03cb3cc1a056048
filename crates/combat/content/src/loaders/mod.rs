//! Content loaders for reading combat definitions from files.
//!
//! Definition families live in RON files and tunables in TOML. Every loader
//! produces core types; [`ContentFactory`] assembles them into a validated
//! [`Catalog`](crate::Catalog).

pub mod config;
pub mod definitions;
pub mod factory;

pub use config::ConfigLoader;
pub use definitions::{
    BossFile, BossSpec, ComboFile, ComboSpec, HazardFile, HazardSpec, StanceFile, StanceSpec,
    StatusEffectSpec, StatusFile, ZoneFile, ZoneSpec,
};
pub use factory::{CatalogSources, ContentFactory};

use std::path::Path;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
}
