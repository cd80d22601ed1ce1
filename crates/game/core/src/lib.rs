//! Deterministic battle rules shared by the runtime and offline tools.
//!
//! `battle-core` defines the canonical combat model: entity state, the damage
//! resolver and break mechanic, the match-3 board engine, and the action-point
//! turn scheduler. Everything here is pure data plus synchronous transitions;
//! timing, pacing and input plumbing live in the runtime crate. All battle
//! mutation flows through [`engine::Battle`].
pub mod board;
pub mod combat;
pub mod config;
pub mod engine;
pub mod error;
pub mod loadout;
pub mod rng;
pub mod state;
pub mod template;

pub use board::{
    Board, Coord, DeckEntry, DeckPool, Elimination, Grid, IgnoreReason, TapOutcome, Tile, TileId,
    TileView,
};
pub use combat::{
    BreakProgress, CombatEvent, CombatEventKind, DamageInput, DamageMode, DamageSplit, HitFlags,
    calculate_damage, register_break_hit, resolve_damage,
};
pub use config::BattleConfig;
pub use engine::{
    ActiveTurn, Battle, BattleOutcome, BattleSetup, OrderEntry, OrderPrediction, Scheduler,
    TickReport, TurnPhase,
};
pub use error::{LoadoutError, TurnError};
pub use loadout::{DeckSlot, Loadout};
pub use rng::{PcgRng, RngOracle, compute_seed};
pub use state::{
    BreakGauge, Buff, BuffKind, Combatants, DamageReport, Element, Entity, EntityId, EntityStatus,
    Modifiers, ReviveStep, Stats, Team,
};
pub use template::{ActionDef, ActionEffect, ActionId, BreakSpec, CombatantTemplate};
