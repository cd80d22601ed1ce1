//! Headless battle client binary.
//!
//! Loads `.env`, installs logging, assembles a battle from the catalog and
//! auto-plays it, logging every published event.
//!
//! ```bash
//! BATTLE_ROSTER=kai,aya,rin BATTLE_LEVEL=tide_golem cargo run -p battle-client
//! ```

use anyhow::Result;
use battle_client::{ClientConfig, logging, reporter, session};
use battle_runtime::{EventBus, RuntimeConfig};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // 1. Load configuration from environment
    let runtime_config = RuntimeConfig::from_env();
    let client_config = ClientConfig::from_env();

    // 2. Setup logging
    let _guard = logging::setup_logging(client_config.log_dir.as_deref())?;
    tracing::info!("Starting battler");

    // 3. Subscribe reporters before the worker starts publishing
    let event_bus = EventBus::with_capacity(runtime_config.event_buffer_size);
    let reporters = reporter::spawn(&event_bus, client_config.json_events);

    // 4. Build and run
    let runtime = session::build(&client_config, runtime_config, event_bus)?;
    let outcome = runtime.wait().await?;

    for task in reporters {
        if let Err(error) = task.await {
            tracing::warn!("Reporter task failed: {}", error);
        }
    }

    tracing::info!(outcome = %outcome, "Battle finished");
    Ok(())
}
