//! Async battle session built on the deterministic `battle-core` rules.
//!
//! This crate runs one [`battle_core::Battle`] on a background tokio task and
//! exposes it through a cloneable [`BattleHandle`]. The worker paces AI turns,
//! suspends on player input, honors pause/resume/surrender, and publishes
//! everything that happens on a topic-based [`EventBus`].
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the orchestrator and builder
//! - [`config`] holds runtime tuning and pacing delays
//! - [`api`] exposes the types downstream clients interact with
//! - [`events`] provides the topic-based event bus
//! - `workers` keeps the battle loop internal to the crate
pub mod api;
pub mod config;
pub mod events;
pub mod runtime;

mod workers;

pub use api::{
    ActionProvider, BattleHandle, BattleSnapshot, GreedyMatchProvider, ProviderKind,
    RandomTargetProvider, Result, RuntimeError, TurnAction,
};
pub use config::{PacingConfig, RuntimeConfig};
pub use events::{BattleEvent, BoardEvent, Event, EventBus, Topic, TurnEvent};
pub use runtime::{Runtime, RuntimeBuilder};
