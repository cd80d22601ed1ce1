//! Worker tasks that back the runtime orchestration.

mod battle;
mod pending;

pub use battle::{BattleWorker, Command};
