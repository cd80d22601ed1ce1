//! Pre-battle roster and deck selection.
use arrayvec::ArrayVec;

use crate::config::BattleConfig;
use crate::error::LoadoutError;
use crate::template::ActionId;

/// One deck entry: a roster slot and one of that character's actions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DeckSlot {
    pub owner: u8,
    pub action: ActionId,
}

impl DeckSlot {
    pub const fn new(owner: u8, action: u8) -> Self {
        Self {
            owner,
            action: ActionId(action),
        }
    }
}

/// Ordered roster of character codes plus the action deck built from it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Loadout {
    pub roster: ArrayVec<String, { BattleConfig::MAX_ROSTER }>,
    pub deck: ArrayVec<DeckSlot, { BattleConfig::DECK_SIZE }>,
}

impl Loadout {
    pub const DEFAULT_ROSTER: [&'static str; BattleConfig::MAX_ROSTER] = ["kai", "sosa", "aya"];

    pub fn new<I, S>(roster: I, deck: &[DeckSlot]) -> Result<Self, LoadoutError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut loadout = Self::default();
        for code in roster {
            loadout
                .roster
                .try_push(code.into())
                .map_err(|_| LoadoutError::RosterOverflow {
                    max: BattleConfig::MAX_ROSTER,
                })?;
        }
        for slot in deck {
            loadout
                .deck
                .try_push(*slot)
                .map_err(|_| LoadoutError::DeckSize {
                    expected: BattleConfig::DECK_SIZE,
                    found: deck.len(),
                })?;
        }
        Ok(loadout)
    }

    /// Roster with the default deck: actions 1 and 2 for everyone, plus
    /// action 3 for the first two slots.
    pub fn auto_fill<I, S>(roster: I) -> Result<Self, LoadoutError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut loadout = Self::new(roster, &[])?;
        let members = loadout.roster.len() as u8;

        for owner in 0..members {
            for action in [1, 2] {
                let _ = loadout.deck.try_push(DeckSlot::new(owner, action));
            }
        }
        for owner in 0..members.min(2) {
            let _ = loadout.deck.try_push(DeckSlot::new(owner, 3));
        }
        Ok(loadout)
    }

    pub fn default_party() -> Self {
        Self::auto_fill(Self::DEFAULT_ROSTER).unwrap_or_default()
    }

    /// Checks roster size, deck size, owner references and coverage.
    pub fn validate(&self) -> Result<(), LoadoutError> {
        if self.roster.len() != BattleConfig::MAX_ROSTER {
            return Err(LoadoutError::RosterSize {
                expected: BattleConfig::MAX_ROSTER,
                found: self.roster.len(),
            });
        }
        if self.deck.len() != BattleConfig::DECK_SIZE {
            return Err(LoadoutError::DeckSize {
                expected: BattleConfig::DECK_SIZE,
                found: self.deck.len(),
            });
        }
        for slot in &self.deck {
            if usize::from(slot.owner) >= self.roster.len() {
                return Err(LoadoutError::UnknownOwner { owner: slot.owner });
            }
            if slot.action.0 == 0 {
                return Err(LoadoutError::InvalidAction {
                    owner: slot.owner,
                    action: slot.action,
                });
            }
        }
        for slot in 0..self.roster.len() as u8 {
            if !self.deck.iter().any(|d| d.owner == slot) {
                return Err(LoadoutError::UncoveredCharacter { slot });
            }
        }
        Ok(())
    }
}
