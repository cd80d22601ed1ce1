//! Data-driven battle content and loaders.
//!
//! This crate houses the combatant catalog and battle tuning, and provides
//! loaders for the RON/TOML files they ship in:
//! - Character and enemy templates with their actions (RON)
//! - Battle configuration (TOML)
//!
//! Content is resolved into `battle-core` types before a battle starts and
//! never appears in battle state directly.

pub mod catalog;

#[cfg(feature = "loaders")]
pub mod loaders;

pub use catalog::{Catalog, DEFAULT_ENEMY};

#[cfg(feature = "loaders")]
pub use loaders::{CatalogLoader, ConfigLoader, LoadResult};
