//! Combatant state owned by a battle session.
mod combatants;
mod entity;
mod types;

pub use combatants::Combatants;
pub use entity::{
    BreakGauge, Buff, BuffKind, DamageReport, Entity, EntityStatus, Modifiers, ReviveStep, Stats,
};
pub use types::{Element, EntityId, Team};
