//! Public runtime API surface.
//!
//! This module gathers the types exposed to consumers of the runtime crate so
//! the worker can stay focused on driving the battle.

pub mod errors;
pub mod handle;
pub mod providers;
pub mod snapshot;

pub use errors::{ProviderKind, Result, RuntimeError};
pub use handle::BattleHandle;
pub use providers::{ActionProvider, GreedyMatchProvider, RandomTargetProvider, TurnAction};
pub use snapshot::BattleSnapshot;
