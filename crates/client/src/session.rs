//! Assembles content and runtime into a running battle.
use anyhow::{Context, Result};

use battle_content::{Catalog, CatalogLoader};
use battle_core::Loadout;
use battle_runtime::{EventBus, GreedyMatchProvider, Runtime, RuntimeConfig};

use crate::config::ClientConfig;

/// Loads the configured catalog, or the built-in one.
pub fn load_catalog(config: &ClientConfig) -> Result<Catalog> {
    match &config.catalog_path {
        Some(path) => CatalogLoader::load(path),
        None => CatalogLoader::builtin(),
    }
}

/// Loadout for the configured roster, falling back to the default party when
/// the roster does not validate.
pub fn loadout(config: &ClientConfig) -> Loadout {
    let loadout = Loadout::auto_fill(config.roster.iter().cloned())
        .and_then(|loadout| loadout.validate().map(|()| loadout));
    match loadout {
        Ok(loadout) => loadout,
        Err(error) => {
            tracing::warn!(
                roster = ?config.roster,
                error = %error,
                "Invalid roster, using the default party"
            );
            Loadout::default_party()
        }
    }
}

/// Builds an auto-played battle publishing on `event_bus`.
pub fn build(
    config: &ClientConfig,
    runtime_config: RuntimeConfig,
    event_bus: EventBus,
) -> Result<Runtime> {
    let catalog = load_catalog(config)?;
    let loadout = loadout(config);
    for code in &loadout.roster {
        if catalog.character(code).is_none() {
            tracing::warn!(code = %code, "Unknown character, seating a placeholder");
        }
    }

    let seed = runtime_config.seed_or_random();
    let setup = catalog.setup(&loadout, &config.level, seed);
    tracing::info!(
        level = %config.level,
        enemy = %setup.enemies.first().map(|e| e.name.as_str()).unwrap_or("none"),
        seed,
        "Battle assembled"
    );

    Runtime::builder()
        .config(runtime_config)
        .setup(setup)
        .player_provider(GreedyMatchProvider)
        .event_bus(event_bus)
        .build()
        .context("Failed to start battle runtime")
}

#[cfg(test)]
mod tests {
    use super::*;
    use battle_runtime::PacingConfig;

    #[test]
    fn short_roster_falls_back_to_default_party() {
        let config = ClientConfig {
            roster: vec!["kai".into()],
            ..ClientConfig::default()
        };
        assert_eq!(loadout(&config), Loadout::default_party());
    }

    #[tokio::test(start_paused = true)]
    async fn builtin_battle_runs_to_an_outcome() {
        let config = ClientConfig::default();
        let runtime_config = RuntimeConfig::default()
            .with_pacing(PacingConfig::instant())
            .with_seed(11);

        let runtime = build(&config, runtime_config, EventBus::new()).unwrap();
        assert_eq!(runtime.seed(), 11);

        let outcome = runtime.wait().await.unwrap();
        assert!(matches!(
            outcome,
            battle_core::BattleOutcome::Victory | battle_core::BattleOutcome::Defeat
        ));
    }
}
