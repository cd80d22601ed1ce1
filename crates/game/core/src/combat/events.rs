use crate::state::{BuffKind, Element, EntityId, Team};

bitflags::bitflags! {
    /// Presentation flags attached to a damage event.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct HitFlags: u8 {
        const HEAVY = 0b0001;
        const BREAK = 0b0010;
        const TRUE_DAMAGE = 0b0100;
    }
}

/// Something that happened to one combatant, for floating combat text.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatEvent {
    pub entity: EntityId,
    pub team: Team,
    pub slot: u8,
    pub kind: CombatEventKind,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CombatEventKind {
    /// The entity used an action or attacked `target`.
    Acted {
        target: Option<EntityId>,
        action: Option<String>,
    },
    Damaged {
        hp: u32,
        shield: u32,
        flags: HitFlags,
    },
    Healed {
        amount: u32,
    },
    Shielded {
        amount: u32,
    },
    Buffed {
        kind: BuffKind,
        amount: f64,
        turns: u8,
    },
    BreakChipped {
        element: Element,
        remaining: i32,
    },
    BreakTriggered {
        element: Element,
        damage: u32,
    },
    Fainted,
    /// The turn was skipped because the entity had nothing it could use.
    Passed,
    ReviveProgress {
        progress: u8,
        threshold: u8,
    },
    Revived {
        hp: u32,
        charges_left: u8,
    },
}

impl CombatEvent {
    pub fn is_player_side(&self) -> bool {
        self.team.is_player()
    }
}
