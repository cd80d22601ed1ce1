//! Event types for different topics.

use battle_core::{
    ActiveTurn, BattleOutcome, CombatEvent, Coord, Elimination, EntityId, EntityStatus,
    OrderEntry, TileView,
};
use serde::{Deserialize, Serialize};

/// Combat results and battle-level state changes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum BattleEvent {
    /// Emitted once before the first turn.
    Started {
        statuses: Vec<EntityStatus>,
        order: Vec<OrderEntry>,
    },
    /// One damage, heal, shield, break, faint or revive step.
    Combat(CombatEvent),
    /// Every entity's status after a batch of combat events.
    StatusChanged(Vec<EntityStatus>),
    Paused,
    Resumed,
    Ended { outcome: BattleOutcome },
}

/// Turn lifecycle events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TurnEvent {
    Started {
        turn: ActiveTurn,
        order: Vec<OrderEntry>,
    },
    /// The board is open for the acting player slot.
    AwaitingInput { actor: EntityId, slot: u8 },
    /// Nobody reached the turn threshold within the tick cap.
    Stalled,
    Finished {
        actor: EntityId,
        order: Vec<OrderEntry>,
    },
}

/// Board changes, for animation sequencing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum BoardEvent {
    /// The board was fully redrawn so the acting slot owns a tile.
    Refreshed { owner: u8, tiles: Vec<TileView> },
    Eliminated {
        elimination: Elimination,
        tiles: Vec<TileView>,
    },
    SwapReverted { from: Coord, to: Coord },
}

#[cfg(test)]
mod tests {
    use super::*;
    use battle_core::Team;

    #[test]
    fn turn_events_forward_as_json() {
        let event = TurnEvent::Started {
            turn: ActiveTurn {
                actor: EntityId(2),
                team: Team::Enemy,
                slot: 0,
                turn: 4,
                board_refreshed: false,
            },
            order: Vec::new(),
        };

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["Started"]["turn"]["team"], "enemy");
        assert_eq!(json["Started"]["turn"]["turn"], 4);
    }
}
