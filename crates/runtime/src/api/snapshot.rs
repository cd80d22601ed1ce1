//! Read-only view of a running battle.
use battle_core::{Battle, BattleOutcome, EntityId, EntityStatus, OrderEntry, TileView, TurnPhase};
use serde::{Deserialize, Serialize};

/// Everything a renderer needs to redraw the battle from scratch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleSnapshot {
    pub turn: u64,
    pub phase: TurnPhase,
    pub current: Option<EntityId>,
    pub statuses: Vec<EntityStatus>,
    pub board: Vec<TileView>,
    pub board_locked: bool,
    pub order: Vec<OrderEntry>,
    pub paused: bool,
    pub outcome: Option<BattleOutcome>,
}

impl BattleSnapshot {
    pub fn capture(battle: &Battle, paused: bool) -> Self {
        Self {
            turn: battle.scheduler().turn_number(),
            phase: battle.phase(),
            current: battle.current_actor().map(|e| e.id),
            statuses: battle.statuses(),
            board: battle.board_views(),
            board_locked: battle.board().is_locked(),
            order: battle.predict_order(battle.config().order_preview_len),
            paused,
            outcome: battle.outcome(),
        }
    }

    pub fn status(&self, id: EntityId) -> Option<&EntityStatus> {
        self.statuses.iter().find(|s| s.id == id)
    }
}
