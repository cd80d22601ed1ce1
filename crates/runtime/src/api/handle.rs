//! Cloneable façade for issuing commands to the battle worker.
//!
//! [`BattleHandle`] hides channel plumbing and offers async helpers for
//! player gestures, pause control and snapshots.
use tokio::sync::{broadcast, mpsc, oneshot};

use battle_core::{Coord, TapOutcome};

use super::errors::{Result, RuntimeError};
use super::snapshot::BattleSnapshot;
use crate::events::{Event, EventBus, Topic};
use crate::workers::Command;

/// Client-facing handle to interact with a running battle
#[derive(Clone)]
pub struct BattleHandle {
    command_tx: mpsc::Sender<Command>,
    event_bus: EventBus,
}

impl BattleHandle {
    pub(crate) fn new(command_tx: mpsc::Sender<Command>, event_bus: EventBus) -> Self {
        Self {
            command_tx,
            event_bus,
        }
    }

    async fn request<T>(&self, build: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(build(reply_tx))
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }

    /// Tap a board cell. Taps outside the acting player's window come back
    /// as [`TapOutcome::Ignored`].
    pub async fn tap(&self, coord: Coord) -> Result<TapOutcome> {
        self.request(|reply| Command::Tap { coord, reply }).await
    }

    /// Suspend the battle after the current step. Returns `false` if it was
    /// already paused.
    pub async fn pause(&self) -> Result<bool> {
        self.request(|reply| Command::SetPaused {
            paused: true,
            reply,
        })
        .await
    }

    /// Returns `false` if the battle was not paused.
    pub async fn resume(&self) -> Result<bool> {
        self.request(|reply| Command::SetPaused {
            paused: false,
            reply,
        })
        .await
    }

    /// End the battle as a loss. Any turn waiting on input is abandoned.
    pub async fn surrender(&self) -> Result<()> {
        self.request(|reply| Command::Surrender { reply }).await
    }

    /// Query the current battle state (read-only snapshot)
    pub async fn snapshot(&self) -> Result<BattleSnapshot> {
        self.request(|reply| Command::QuerySnapshot { reply }).await
    }

    /// Subscribe to events from a specific topic
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.event_bus.subscribe(topic)
    }

    /// Subscribe to multiple topics at once
    pub fn subscribe_multiple(
        &self,
        topics: &[Topic],
    ) -> std::collections::HashMap<Topic, broadcast::Receiver<Event>> {
        self.event_bus.subscribe_multiple(topics)
    }

    /// Get a reference to the event bus for advanced usage
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }
}
