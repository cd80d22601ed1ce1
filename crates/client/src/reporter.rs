//! Logs published battle events.
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use battle_core::CombatEventKind;
use battle_runtime::{BattleEvent, BoardEvent, Event, EventBus, Topic, TurnEvent};

/// Spawns one logging task per topic. Tasks end when the bus is dropped.
pub fn spawn(event_bus: &EventBus, json: bool) -> Vec<JoinHandle<()>> {
    Topic::ALL
        .iter()
        .map(|&topic| {
            let rx = event_bus.subscribe(topic);
            tokio::spawn(report(topic, rx, json))
        })
        .collect()
}

async fn report(topic: Topic, mut rx: broadcast::Receiver<Event>, json: bool) {
    loop {
        match rx.recv().await {
            Ok(event) if json => match serde_json::to_string(&event) {
                Ok(line) => info!(target: "client::events", "{}", line),
                Err(error) => warn!(target: "client::events", error = %error, "Unserializable event"),
            },
            Ok(event) => log_event(&event),
            Err(RecvError::Lagged(skipped)) => {
                warn!(target: "client::events", topic = ?topic, skipped, "Reporter lagged")
            }
            Err(RecvError::Closed) => break,
        }
    }
}

fn log_event(event: &Event) {
    match event {
        Event::Battle(BattleEvent::Started { statuses, .. }) => {
            for status in statuses {
                info!(
                    target: "client::events",
                    "{} {} joins the {} side with {} HP",
                    status.id, status.name, status.team, status.max_hp
                );
            }
        }
        Event::Battle(BattleEvent::Combat(combat)) => match &combat.kind {
            CombatEventKind::Acted {
                action: Some(name), ..
            } => info!(target: "client::events", "{} uses {}", combat.entity, name),
            CombatEventKind::Damaged { hp, shield, flags } => info!(
                target: "client::events",
                "{} takes {} damage ({} absorbed) {:?}",
                combat.entity, hp, shield, flags
            ),
            CombatEventKind::Fainted => info!(target: "client::events", "{} fainted", combat.entity),
            CombatEventKind::Revived { hp, charges_left } => info!(
                target: "client::events",
                "{} revived with {} HP ({} charges left)",
                combat.entity, hp, charges_left
            ),
            other => debug!(target: "client::events", "{} {:?}", combat.entity, other),
        },
        Event::Battle(BattleEvent::Ended { outcome }) => {
            info!(target: "client::events", "Battle over: {}", outcome)
        }
        Event::Turn(TurnEvent::Started { turn, .. }) => debug!(
            target: "client::events",
            "Turn {}: {} ({})",
            turn.turn, turn.actor, turn.team
        ),
        Event::Board(BoardEvent::Eliminated { elimination, .. }) => debug!(
            target: "client::events",
            "Eliminated {} tiles, multiplier {:.1}",
            elimination.coords.len(),
            elimination.multiplier
        ),
        other => debug!(target: "client::events", "{:?}", other),
    }
}
