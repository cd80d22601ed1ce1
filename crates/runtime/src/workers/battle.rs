//! Battle worker that owns the authoritative [`battle_core::Battle`].
//!
//! Drives the turn loop, applies commands from [`crate::BattleHandle`], and
//! publishes events to the [`EventBus`]. Commands are serviced at every
//! suspension point: pacing delays, provider calls and player input waits.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use battle_core::{
    ActiveTurn, Battle, BattleOutcome, Coord, Elimination, IgnoreReason, OrderEntry, TapOutcome,
};

use super::pending::PendingAction;
use crate::api::{ActionProvider, BattleSnapshot, ProviderKind, Result, TurnAction};
use crate::config::PacingConfig;
use crate::events::{BattleEvent, BoardEvent, EventBus, TurnEvent};

/// Commands that can be sent to the battle worker
pub enum Command {
    /// Player gesture on the board.
    Tap {
        coord: Coord,
        reply: oneshot::Sender<TapOutcome>,
    },
    /// Pause or resume. Replies whether the state changed.
    SetPaused {
        paused: bool,
        reply: oneshot::Sender<bool>,
    },
    Surrender {
        reply: oneshot::Sender<()>,
    },
    /// Query the current battle state (read-only).
    QuerySnapshot {
        reply: oneshot::Sender<BattleSnapshot>,
    },
}

/// Background task that runs one battle to completion.
pub struct BattleWorker {
    battle: Battle,
    pacing: PacingConfig,
    command_rx: mpsc::Receiver<Command>,
    commands_open: bool,
    event_bus: EventBus,
    player_provider: Option<Arc<dyn ActionProvider>>,
    enemy_provider: Arc<dyn ActionProvider>,
    pending: PendingAction,
    paused: bool,
    started: Instant,
}

impl BattleWorker {
    /// Consecutive stalls without any AP gain before the battle is given up.
    pub const MAX_IDLE_STALLS: u32 = 3;

    pub fn new(
        battle: Battle,
        pacing: PacingConfig,
        command_rx: mpsc::Receiver<Command>,
        event_bus: EventBus,
        player_provider: Option<Arc<dyn ActionProvider>>,
        enemy_provider: Arc<dyn ActionProvider>,
    ) -> Self {
        Self {
            battle,
            pacing,
            command_rx,
            commands_open: true,
            event_bus,
            player_provider,
            enemy_provider,
            pending: PendingAction::default(),
            paused: false,
            started: Instant::now(),
        }
    }

    /// Main worker loop. Returns once the battle has an outcome.
    pub async fn run(mut self) -> BattleOutcome {
        info!(
            target: "runtime::worker",
            entities = self.battle.roster().len(),
            autoplay = self.player_provider.is_some(),
            "Battle started"
        );
        self.event_bus.publish(BattleEvent::Started {
            statuses: self.battle.statuses(),
            order: self.order(),
        });

        let mut stalls = 0;
        let outcome = loop {
            self.hold_while_paused().await;
            if let Some(outcome) = self.battle.check_end() {
                break outcome;
            }

            let ap_before = self.total_ap();
            let turn = self.battle.begin_turn();
            self.flush_combat();
            let Some(turn) = turn else {
                if self.battle.check_end().is_some() {
                    continue;
                }
                stalls = if self.total_ap() == ap_before { stalls + 1 } else { 0 };
                warn!(
                    target: "runtime::worker",
                    cap = self.battle.config().tick_iteration_cap,
                    stalls,
                    "No entity reached the turn threshold"
                );
                self.event_bus.publish(TurnEvent::Stalled);
                if stalls >= Self::MAX_IDLE_STALLS {
                    error!(
                        target: "runtime::worker",
                        stalls,
                        "Action points stopped moving, ending battle"
                    );
                    self.surrender();
                    continue;
                }
                self.pace(self.pacing.stall_backoff).await;
                continue;
            };
            stalls = 0;

            if let Err(error) = self.play_turn(turn).await {
                error!(
                    target: "runtime::worker",
                    turn = turn.turn,
                    actor = %turn.actor,
                    error = %error,
                    "Turn resolution failed"
                );
            }
            self.close_turn(turn).await;
        };

        info!(target: "runtime::worker", outcome = %outcome, "Battle ended");
        self.event_bus.publish(BattleEvent::Ended { outcome });
        outcome
    }

    async fn play_turn(&mut self, turn: ActiveTurn) -> Result<()> {
        debug!(
            target: "runtime::worker",
            turn = turn.turn,
            actor = %turn.actor,
            team = %turn.team,
            "Turn started"
        );
        self.event_bus.publish(TurnEvent::Started {
            turn,
            order: self.order(),
        });
        if turn.board_refreshed {
            self.event_bus.publish(BoardEvent::Refreshed {
                owner: turn.slot,
                tiles: self.battle.board_views(),
            });
        }
        self.battle.await_action()?;

        let action = if turn.team.is_player() {
            match self.player_provider.clone() {
                Some(provider) => self.ask(provider, turn).await,
                None => return self.await_player(turn).await,
            }
        } else {
            self.pace(self.pacing.ai_think).await;
            self.ask(self.enemy_provider.clone(), turn).await
        };

        if self.battle.is_over() {
            return Ok(());
        }
        self.perform(turn, action).await
    }

    /// Spends the actor's AP, relocks the board for the pacing window and
    /// returns the scheduler to idle.
    async fn close_turn(&mut self, turn: ActiveTurn) {
        if let Err(error) = self.battle.advance_turn() {
            warn!(target: "runtime::worker", actor = %turn.actor, error = %error, "Advance failed");
        }
        self.flush_combat();

        if self.battle.check_end().is_none() {
            self.pace(self.pacing.relock).await;
        }
        self.battle.finish_turn();

        self.event_bus.publish(TurnEvent::Finished {
            actor: turn.actor,
            order: self.order(),
        });
    }

    async fn ask(&mut self, provider: Arc<dyn ActionProvider>, turn: ActiveTurn) -> TurnAction {
        let snapshot = self.battle.clone();
        let mut request = provider.provide_action(&turn, &snapshot);

        loop {
            tokio::select! {
                result = &mut request => {
                    return result.unwrap_or_else(|error| {
                        error!(
                            target: "runtime::worker",
                            actor = %turn.actor,
                            provider = %ProviderKind::from(turn.team),
                            error = %error,
                            "Action provider failed, passing turn"
                        );
                        TurnAction::Pass
                    });
                }
                cmd = self.command_rx.recv(), if self.commands_open => {
                    self.on_command(cmd);
                    if self.battle.is_over() {
                        return TurnAction::Pass;
                    }
                }
            }
        }
    }

    async fn await_player(&mut self, turn: ActiveTurn) -> Result<()> {
        if !self.commands_open {
            warn!(
                target: "runtime::worker",
                actor = %turn.actor,
                "No battle handles left to supply input, surrendering"
            );
            self.surrender();
            return Ok(());
        }

        self.event_bus.publish(TurnEvent::AwaitingInput {
            actor: turn.actor,
            slot: turn.slot,
        });

        let mut rx = self.pending.arm(turn.actor);
        let received = loop {
            tokio::select! {
                result = &mut rx => break result.ok(),
                cmd = self.command_rx.recv(), if self.commands_open => self.on_command(cmd),
            }
        };
        self.pending.abandon();

        match received {
            Some(elimination) => self.resolve(elimination).await,
            None => {
                debug!(target: "runtime::worker", actor = %turn.actor, "Player turn abandoned");
                Ok(())
            }
        }
    }

    async fn perform(&mut self, turn: ActiveTurn, action: TurnAction) -> Result<()> {
        match action {
            TurnAction::Attack { target } => {
                self.pace(self.pacing.ai_strike).await;
                if self.battle.is_over() {
                    return Ok(());
                }
                self.battle.resolve_attack(target)?;
                self.flush_combat();
                self.pace(self.pacing.skill).await;
            }
            TurnAction::Taps(coords) => {
                for coord in coords {
                    match self.battle.tap(coord, self.now_ms()) {
                        TapOutcome::Eliminated(elimination) => {
                            return self.resolve(elimination).await;
                        }
                        outcome => self.report_tap(coord, &outcome),
                    }
                }
                debug!(
                    target: "runtime::worker",
                    actor = %turn.actor,
                    "Taps produced no elimination, passing turn"
                );
            }
            TurnAction::Pass => {
                debug!(target: "runtime::worker", actor = %turn.actor, "Turn passed");
            }
        }
        Ok(())
    }

    async fn resolve(&mut self, elimination: Elimination) -> Result<()> {
        debug!(
            target: "runtime::worker",
            owner = elimination.owner,
            action = %elimination.action,
            tiles = elimination.coords.len(),
            multiplier = elimination.multiplier,
            via_swap = elimination.via_swap,
            "Tiles eliminated"
        );
        let delay = if elimination.via_swap {
            self.pacing.swap_check
        } else {
            self.pacing.elimination
        };
        self.event_bus.publish(BoardEvent::Eliminated {
            tiles: self.battle.board_views(),
            elimination: elimination.clone(),
        });

        self.pace(delay).await;
        if self.battle.is_over() {
            return Ok(());
        }

        self.battle.resolve_elimination(&elimination)?;
        self.flush_combat();
        self.pace(self.pacing.skill).await;
        Ok(())
    }

    fn report_tap(&self, coord: Coord, outcome: &TapOutcome) {
        if let TapOutcome::SwapReverted { from, to } = *outcome {
            self.event_bus.publish(BoardEvent::SwapReverted { from, to });
        }
        debug!(target: "runtime::worker", coord = ?coord, outcome = ?outcome, "Tap");
    }

    /// Sleeps for `delay` while servicing commands, then honors a pause.
    async fn pace(&mut self, delay: Duration) {
        if !delay.is_zero() {
            let sleep = tokio::time::sleep(delay);
            tokio::pin!(sleep);

            loop {
                tokio::select! {
                    _ = &mut sleep => break,
                    cmd = self.command_rx.recv(), if self.commands_open => self.on_command(cmd),
                }
            }
        }
        self.hold_while_paused().await;
    }

    async fn hold_while_paused(&mut self) {
        while self.paused && !self.battle.is_over() {
            let cmd = self.command_rx.recv().await;
            self.on_command(cmd);
        }
    }

    fn on_command(&mut self, cmd: Option<Command>) {
        match cmd {
            Some(cmd) => self.handle_command(cmd),
            None => {
                self.commands_open = false;
                if self.pending.is_armed() || self.paused {
                    warn!(
                        target: "runtime::worker",
                        "All battle handles dropped while waiting on input, surrendering"
                    );
                    self.surrender();
                }
            }
        }
    }

    fn handle_command(&mut self, cmd: Command) {
        match cmd {
            Command::Tap { coord, reply } => {
                let outcome = self.tap(coord);
                if reply.send(outcome).is_err() {
                    debug!(target: "runtime::worker", "Tap reply channel closed (caller dropped)");
                }
            }
            Command::SetPaused { paused, reply } => {
                let changed = self.set_paused(paused);
                if reply.send(changed).is_err() {
                    debug!(target: "runtime::worker", "Pause reply channel closed (caller dropped)");
                }
            }
            Command::Surrender { reply } => {
                self.surrender();
                if reply.send(()).is_err() {
                    debug!(target: "runtime::worker", "Surrender reply channel closed (caller dropped)");
                }
            }
            Command::QuerySnapshot { reply } => {
                let snapshot = BattleSnapshot::capture(&self.battle, self.paused);
                if reply.send(snapshot).is_err() {
                    debug!(target: "runtime::worker", "Snapshot reply channel closed (caller dropped)");
                }
            }
        }
    }

    /// Taps are accepted only while a player turn is waiting on input.
    fn tap(&mut self, coord: Coord) -> TapOutcome {
        if self.paused {
            return TapOutcome::Ignored(IgnoreReason::Paused);
        }
        let Some(actor) = self.pending.actor() else {
            let reason = if self.battle.board().is_locked() {
                IgnoreReason::Locked
            } else {
                IgnoreReason::NotPlayerTurn
            };
            return TapOutcome::Ignored(reason);
        };

        let outcome = self.battle.tap(coord, self.now_ms());
        match &outcome {
            TapOutcome::Eliminated(elimination) => {
                if !self.pending.complete(actor, elimination.clone()) {
                    warn!(target: "runtime::worker", actor = %actor, "Late elimination dropped");
                }
            }
            other => self.report_tap(coord, other),
        }
        outcome
    }

    fn set_paused(&mut self, paused: bool) -> bool {
        if self.paused == paused || self.battle.is_over() {
            return false;
        }
        self.paused = paused;
        info!(target: "runtime::worker", paused, "Pause state changed");
        self.event_bus.publish(if paused {
            BattleEvent::Paused
        } else {
            BattleEvent::Resumed
        });
        true
    }

    fn surrender(&mut self) {
        if self.battle.is_over() {
            return;
        }
        info!(target: "runtime::worker", "Battle surrendered");
        self.battle.surrender();
        self.pending.abandon();
    }

    fn flush_combat(&mut self) {
        let events = self.battle.drain_events();
        if events.is_empty() {
            return;
        }
        for event in events {
            debug!(
                target: "runtime::worker",
                entity = %event.entity,
                kind = ?event.kind,
                "Combat event"
            );
            self.event_bus.publish(BattleEvent::Combat(event));
        }
        self.event_bus
            .publish(BattleEvent::StatusChanged(self.battle.statuses()));
    }

    fn order(&self) -> Vec<OrderEntry> {
        self.battle
            .predict_order(self.battle.config().order_preview_len)
    }

    fn total_ap(&self) -> u64 {
        self.battle.roster().iter().map(|e| u64::from(e.ap)).sum()
    }

    fn now_ms(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }
}
