//! Data-driven combat content.
//!
//! This crate turns definition files into a [`Catalog`] that implements every
//! oracle trait `combat-core` consumes:
//! - Status effects, stances, combos, hazards, zones and bosses (RON)
//! - Combat tunables (TOML)
//!
//! Content is read once, validated eagerly, and never appears in combat
//! state. The same data ships embedded in the crate for tools and tests.

pub mod catalog;

#[cfg(feature = "loaders")]
pub mod loaders;

pub use catalog::{Catalog, CatalogError};

#[cfg(feature = "loaders")]
pub use loaders::{CatalogSources, ConfigLoader, ContentFactory, LoadResult};
