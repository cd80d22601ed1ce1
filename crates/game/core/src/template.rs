//! Static combatant and action definitions.
//!
//! Templates are content: they are loaded once, resolved into [`crate::Entity`]
//! values at battle start, and never mutated afterwards.
use core::fmt;

use crate::state::{BuffKind, Element};

/// 1-based key into a character's action list. Tiles carry this as their type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct ActionId(pub u8);

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "action {}", self.0)
    }
}

/// What an action does when its tiles are eliminated.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ActionEffect {
    /// Hit the first living enemy with `atk × multiplier` power.
    Damage { true_damage: bool },
    /// Grant the actor `amount × multiplier` shield.
    Shield { amount: u32 },
    /// Restore `amount × multiplier` HP to the actor.
    Heal { amount: u32 },
    /// Add a timed modifier to the actor.
    Buff {
        kind: BuffKind,
        amount: f64,
        turns: u8,
    },
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActionDef {
    pub id: ActionId,
    pub name: String,
    pub element: Element,
    pub effect: ActionEffect,
}

impl ActionDef {
    pub fn is_damaging(&self) -> bool {
        matches!(self.effect, ActionEffect::Damage { .. })
    }
}

/// Initial break gauge for one element.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BreakSpec {
    pub element: Element,
    pub hits: i32,
    pub damage: u32,
}

/// Character or enemy definition.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatantTemplate {
    pub code: String,
    pub name: String,
    pub hp: u32,
    pub atk: u32,
    pub def: u32,
    pub spd: u32,
    pub element: Element,
    #[cfg_attr(feature = "serde", serde(default))]
    pub breaks: Vec<BreakSpec>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub actions: Vec<ActionDef>,
}

impl CombatantTemplate {
    pub fn action(&self, id: ActionId) -> Option<&ActionDef> {
        self.actions.iter().find(|action| action.id == id)
    }
}
