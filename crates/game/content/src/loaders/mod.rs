//! Content loaders for reading battle data from files.
//!
//! Each loader reads one file format and returns `battle-core` types or a
//! [`crate::Catalog`]. The built-in data under `data/` is embedded at compile
//! time and available through each loader's `builtin()`.

pub mod catalog;
pub mod config;

pub use catalog::CatalogLoader;
pub use config::ConfigLoader;

use std::path::Path;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
}
