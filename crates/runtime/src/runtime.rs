//! High-level runtime orchestrator.
//!
//! The runtime owns the battle worker, wires up command/event channels, and
//! exposes a builder-based API for clients to start a battle.

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::debug;

use battle_core::{Battle, BattleOutcome, BattleSetup};

use crate::api::{ActionProvider, BattleHandle, RandomTargetProvider, Result, RuntimeError};
use crate::config::RuntimeConfig;
use crate::events::{Event, EventBus, Topic};
use crate::workers::{BattleWorker, Command};

/// A battle running on a background task.
///
/// [`BattleHandle`] provides a cloneable façade for clients.
pub struct Runtime {
    handle: BattleHandle,
    seed: u64,
    worker: JoinHandle<BattleOutcome>,
}

impl Runtime {
    /// Create a new runtime builder
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Get a cloneable handle to this battle
    pub fn handle(&self) -> BattleHandle {
        self.handle.clone()
    }

    /// Subscribe to events from one topic
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.handle.subscribe(topic)
    }

    /// Seed the battle board was built from.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Wait for the battle to finish.
    ///
    /// Drops this runtime's own handle first; a battle waiting on player input
    /// with no handles left is surrendered.
    pub async fn wait(self) -> Result<BattleOutcome> {
        drop(self.handle);
        self.worker.await.map_err(RuntimeError::WorkerJoin)
    }

    /// Stop the worker without waiting for an outcome.
    pub fn abort(self) {
        self.worker.abort();
    }
}

/// Builder for [`Runtime`] with flexible configuration.
pub struct RuntimeBuilder {
    config: RuntimeConfig,
    setup: Option<BattleSetup>,
    player_provider: Option<Arc<dyn ActionProvider>>,
    enemy_provider: Option<Arc<dyn ActionProvider>>,
    event_bus: Option<EventBus>,
}

impl RuntimeBuilder {
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            setup: None,
            player_provider: None,
            enemy_provider: None,
            event_bus: None,
        }
    }

    /// Override runtime configuration
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the resolved battle inputs (required)
    pub fn setup(mut self, setup: BattleSetup) -> Self {
        self.setup = Some(setup);
        self
    }

    /// Drive player turns from a provider instead of handle taps (optional)
    pub fn player_provider(mut self, provider: impl ActionProvider + 'static) -> Self {
        self.player_provider = Some(Arc::new(provider));
        self
    }

    /// Replace the default random-target enemy behavior (optional)
    pub fn enemy_provider(mut self, provider: impl ActionProvider + 'static) -> Self {
        self.enemy_provider = Some(Arc::new(provider));
        self
    }

    /// Publish on an existing bus, so receivers subscribed before `build`
    /// see the opening events (optional)
    pub fn event_bus(mut self, event_bus: EventBus) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    /// Build the runtime and spawn its worker.
    ///
    /// A seed in the config overrides the setup's seed.
    pub fn build(self) -> Result<Runtime> {
        let mut setup = self.setup.ok_or(RuntimeError::MissingSetup)?;
        let seed = self.config.seed.unwrap_or(setup.seed);
        setup.seed = seed;
        debug!(target: "runtime::builder", seed, "Building battle");

        let battle = Battle::new(setup, self.config.battle.clone());

        let (command_tx, command_rx) = mpsc::channel::<Command>(self.config.command_buffer_size);
        let event_bus = self
            .event_bus
            .unwrap_or_else(|| EventBus::with_capacity(self.config.event_buffer_size));
        let handle = BattleHandle::new(command_tx, event_bus.clone());

        let enemy_provider: Arc<dyn ActionProvider> = match self.enemy_provider {
            Some(provider) => provider,
            None => Arc::new(RandomTargetProvider::new(seed)),
        };

        let worker = BattleWorker::new(
            battle,
            self.config.pacing,
            command_rx,
            event_bus,
            self.player_provider,
            enemy_provider,
        );

        let worker = tokio::spawn(worker.run());

        Ok(Runtime {
            handle,
            seed,
            worker,
        })
    }
}
