//! Client configuration structures and loaders.
use std::env;
use std::path::PathBuf;

use battle_core::Loadout;

/// What to fight and how to report it.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub level: String,
    pub roster: Vec<String>,
    pub catalog_path: Option<PathBuf>,
    pub log_dir: Option<PathBuf>,
    /// Log events as JSON lines instead of debug output.
    pub json_events: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            level: battle_content::DEFAULT_ENEMY.to_owned(),
            roster: Loadout::DEFAULT_ROSTER.map(String::from).to_vec(),
            catalog_path: None,
            log_dir: None,
            json_events: false,
        }
    }
}

impl ClientConfig {
    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `BATTLE_LEVEL` - Level id resolved to an enemy (default: `boss_doll`)
    /// - `BATTLE_ROSTER` - Comma-separated character codes (default: `kai,sosa,aya`)
    /// - `BATTLE_CATALOG_PATH` - RON catalog replacing the built-in one
    /// - `BATTLE_LOG_DIR` - Also write logs to `battler.log` in this directory
    /// - `BATTLE_EVENTS_JSON` - Report events as JSON lines (default: false)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(level) = env::var("BATTLE_LEVEL") {
            config.level = level;
        }

        if let Ok(roster) = env::var("BATTLE_ROSTER") {
            let roster = parse_roster(&roster);
            if !roster.is_empty() {
                config.roster = roster;
            }
        }

        config.catalog_path = read_env::<PathBuf>("BATTLE_CATALOG_PATH");
        config.log_dir = read_env::<PathBuf>("BATTLE_LOG_DIR");

        if let Some(enable) = read_env::<bool>("BATTLE_EVENTS_JSON") {
            config.json_events = enable;
        } else if env::var("BATTLE_EVENTS_JSON").is_ok() {
            config.json_events = true;
        }

        config
    }
}

/// Splits a comma-separated roster, dropping blanks.
pub fn parse_roster(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|code| !code.is_empty())
        .map(String::from)
        .collect()
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roster_parsing_trims_and_skips_blanks() {
        assert_eq!(parse_roster(" kai, ,aya,"), vec!["kai", "aya"]);
        assert!(parse_roster(" , ").is_empty());
    }

    #[test]
    fn defaults_fight_the_default_enemy() {
        let config = ClientConfig::default();
        assert_eq!(config.level, "boss_doll");
        assert_eq!(config.roster, vec!["kai", "sosa", "aya"]);
    }
}
