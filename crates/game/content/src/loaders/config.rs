//! Battle configuration loader.

use std::path::Path;

use battle_core::BattleConfig;

use crate::loaders::{LoadResult, read_file};

const BUILTIN: &str = include_str!("../../data/battle.toml");

/// Loader for battle configuration from TOML files.
///
/// Missing keys keep their [`BattleConfig`] defaults.
pub struct ConfigLoader;

impl ConfigLoader {
    pub fn load(path: &Path) -> LoadResult<BattleConfig> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<BattleConfig> {
        let config: BattleConfig = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config TOML: {}", e))?;

        if config.turn_threshold == 0 {
            anyhow::bail!("turn_threshold must be positive");
        }
        if config.min_speed > config.max_speed {
            anyhow::bail!(
                "min_speed {} exceeds max_speed {}",
                config.min_speed,
                config.max_speed
            );
        }
        if config.damage_cap_divisor == 0 {
            anyhow::bail!("damage_cap_divisor must be positive");
        }
        Ok(config)
    }

    /// The shipped `battle.toml`.
    pub fn builtin() -> LoadResult<BattleConfig> {
        Self::parse(BUILTIN)
    }
}
