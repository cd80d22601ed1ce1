//! Pure combat math: hit resolution, break gauges, and the events they produce.
//!
//! Nothing here mutates entities directly except the gauge map handed to
//! [`register_break_hit`]; applying results is the battle engine's job.
mod breaks;
mod damage;
mod events;

pub use breaks::{BreakProgress, register_break_hit};
pub use damage::{DamageInput, DamageMode, DamageSplit, calculate_damage, resolve_damage};
pub use events::{CombatEvent, CombatEventKind, HitFlags};
