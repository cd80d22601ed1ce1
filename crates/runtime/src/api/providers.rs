//! Asynchronous abstraction for sourcing player and enemy intent.
//!
//! Runtime users plug in [`ActionProvider`] implementations so a battle can
//! run with scripted fixtures, AI policies or headless auto-play. Player
//! turns without a provider wait for taps through the handle instead.
use async_trait::async_trait;
use battle_core::{ActiveTurn, Battle, Coord, EntityId};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;

use super::errors::{ProviderKind, Result, RuntimeError};

/// What an actor does with its turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnAction {
    /// Basic attack with the actor's own stats. `None` hits the first living opponent.
    Attack { target: Option<EntityId> },
    /// Board gestures, applied in order until one eliminates.
    Taps(Vec<Coord>),
    /// End the turn without acting.
    Pass,
}

/// Trait for providing actions based on the current battle state.
#[async_trait]
pub trait ActionProvider: Send + Sync {
    /// Provide an action for the acting entity.
    ///
    /// `battle` is a read-only copy taken when the turn started.
    async fn provide_action(&self, turn: &ActiveTurn, battle: &Battle) -> Result<TurnAction>;
}

/// Enemy behavior: attack a random living opponent.
pub struct RandomTargetProvider {
    rng: Mutex<StdRng>,
}

impl RandomTargetProvider {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

#[async_trait]
impl ActionProvider for RandomTargetProvider {
    async fn provide_action(&self, turn: &ActiveTurn, battle: &Battle) -> Result<TurnAction> {
        let targets = battle.living_opponents(turn.actor);
        if targets.is_empty() {
            return Ok(TurnAction::Pass);
        }

        let index = match self.rng.lock() {
            Ok(mut rng) => rng.random_range(0..targets.len()),
            Err(_) => 0,
        };
        Ok(TurnAction::Attack {
            target: targets.get(index).copied(),
        })
    }
}

/// Headless player: the first swap that makes an owned match, else a
/// double-tap on an owned tile.
#[derive(Debug, Default, Clone, Copy)]
pub struct GreedyMatchProvider;

#[async_trait]
impl ActionProvider for GreedyMatchProvider {
    async fn provide_action(&self, turn: &ActiveTurn, battle: &Battle) -> Result<TurnAction> {
        if !turn.team.is_player() {
            return Err(RuntimeError::Provider {
                kind: ProviderKind::Player,
                message: format!("{} is not player-controlled", turn.actor),
            });
        }

        let board = battle.board();
        if let Some((from, to)) = board.find_swap(turn.slot) {
            return Ok(TurnAction::Taps(vec![from, to]));
        }

        let owned = board
            .grid()
            .tiles()
            .find(|(_, tile)| tile.owner == turn.slot)
            .map(|(coord, _)| coord);
        Ok(match owned {
            Some(coord) => TurnAction::Taps(vec![coord, coord]),
            None => TurnAction::Pass,
        })
    }
}
