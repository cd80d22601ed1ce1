use crate::loadout::DeckSlot;
use crate::state::{Combatants, Element, Team};
use crate::template::ActionId;

/// Identity of one generated tile; never reused within a battle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TileId(pub u64);

/// One occupied board cell. Owner and action are fixed at creation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tile {
    pub id: TileId,
    pub action: ActionId,
    /// Player slot that owns this tile.
    pub owner: u8,
    pub element: Element,
    /// Rows fallen during the last refill. Presentation only.
    pub drop_distance: u8,
}

impl Tile {
    /// Two tiles match when both owner and action agree.
    #[inline]
    pub fn matches(&self, other: &Tile) -> bool {
        self.owner == other.owner && self.action == other.action
    }
}

/// One drawable (owner, action, element) triple.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DeckEntry {
    pub owner: u8,
    pub action: ActionId,
    pub element: Element,
}

/// Entries tiles are drawn from. Duplicates weight the draw.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DeckPool {
    entries: Vec<DeckEntry>,
}

impl DeckPool {
    pub fn new(entries: Vec<DeckEntry>) -> Self {
        Self { entries }
    }

    /// Builds the pool from a deck loadout against the player party.
    ///
    /// Slots whose owner is not in the party, or whose action the owner does
    /// not have, are skipped. The tile element is the action's element unless
    /// that is neutral, in which case the owner's element is used.
    pub fn from_deck(deck: &[DeckSlot], party: &Combatants) -> Self {
        let entries = deck
            .iter()
            .filter_map(|slot| {
                let owner = party
                    .team(Team::Player)
                    .find(|e| e.slot == slot.owner)?;
                let action = owner.action(slot.action)?;
                let element = if action.element.is_neutral() {
                    owner.element
                } else {
                    action.element
                };
                Some(DeckEntry {
                    owner: slot.owner,
                    action: slot.action,
                    element,
                })
            })
            .collect();

        Self { entries }
    }

    pub fn entries(&self) -> &[DeckEntry] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&DeckEntry> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn has_owner(&self, owner: u8) -> bool {
        self.entries.iter().any(|entry| entry.owner == owner)
    }
}
