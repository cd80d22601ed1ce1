//! Error types for setup validation and turn lifecycle misuse.
//!
//! In-battle input problems are not errors: the board reports them as
//! [`crate::IgnoreReason`] and leaves state untouched.
use crate::template::ActionId;

/// Errors raised when validating a roster and deck loadout.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum LoadoutError {
    #[error("roster must contain {expected} characters, found {found}")]
    RosterSize { expected: usize, found: usize },

    #[error("roster holds more than {max} characters")]
    RosterOverflow { max: usize },

    #[error("deck must contain exactly {expected} actions, found {found}")]
    DeckSize { expected: usize, found: usize },

    #[error("deck slot references roster slot {owner}, which is empty")]
    UnknownOwner { owner: u8 },

    #[error("roster slot {slot} has no action in the deck")]
    UncoveredCharacter { slot: u8 },

    #[error("deck slot for roster slot {owner} uses invalid action {action}")]
    InvalidAction { owner: u8, action: ActionId },
}

/// Errors raised when a turn transition is requested out of order.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TurnError {
    #[error("no entity is currently acting")]
    NoActiveEntity,

    #[error("battle has already ended")]
    BattleOver,

    #[error("acting entity is not on the {expected:?} team")]
    WrongController { expected: crate::state::Team },
}
