//! Battle session: the single owner of combatants, board and scheduler.
//!
//! [`Battle`] exposes the turn lifecycle as explicit synchronous steps. A
//! driver (the async runtime, or a test) calls them in order:
//!
//! ```text
//! check_end → begin_turn → await_action → tap… / resolve_attack
//!           → resolve_elimination → advance_turn → finish_turn
//! ```
//!
//! Every mutation of entity state appends [`CombatEvent`]s that the driver
//! drains and forwards.
mod predict;
mod turns;

pub use predict::{OrderEntry, OrderPrediction};
pub use turns::{Scheduler, TickReport, TurnPhase};

use crate::board::{Board, Coord, DeckPool, Elimination, TapOutcome, TileView};
use crate::combat::{
    BreakProgress, CombatEvent, CombatEventKind, DamageMode, DamageSplit, HitFlags,
    calculate_damage, register_break_hit,
};
use crate::config::BattleConfig;
use crate::error::TurnError;
use crate::loadout::DeckSlot;
use crate::state::{
    Buff, Combatants, DamageReport, Element, Entity, EntityId, EntityStatus, ReviveStep, Team,
};
use crate::template::{ActionEffect, CombatantTemplate};

/// Terminal state of a battle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "lowercase")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BattleOutcome {
    Victory,
    Defeat,
    /// Player gave up; treated as a defeat.
    Surrendered,
}

impl BattleOutcome {
    pub const fn is_victory(self) -> bool {
        matches!(self, BattleOutcome::Victory)
    }
}

/// Resolved inputs for a new battle.
///
/// Party slots that failed to resolve are `None` and become placeholders.
#[derive(Clone, Debug, Default)]
pub struct BattleSetup {
    pub party: Vec<Option<CombatantTemplate>>,
    pub enemies: Vec<CombatantTemplate>,
    pub deck: Vec<DeckSlot>,
    pub seed: u64,
}

/// The entity whose turn just started.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActiveTurn {
    pub actor: EntityId,
    pub team: Team,
    pub slot: u8,
    pub turn: u64,
    /// The board was fully refilled so the actor has a tile to use.
    pub board_refreshed: bool,
}

#[derive(Clone, Debug)]
pub struct Battle {
    config: BattleConfig,
    roster: Combatants,
    board: Board,
    scheduler: Scheduler,
    events: Vec<CombatEvent>,
    outcome: Option<BattleOutcome>,
}

impl Battle {
    pub fn new(setup: BattleSetup, config: BattleConfig) -> Self {
        let mut roster = Combatants::new();

        for (slot, template) in setup.party.iter().enumerate() {
            let id = roster.next_id();
            let slot = slot as u8;
            let entity = match template {
                Some(t) => Entity::from_template(id, Team::Player, slot, t, &config),
                None => Entity::placeholder(id, Team::Player, slot, &config),
            };
            roster.push(entity);
        }
        for (slot, template) in setup.enemies.iter().enumerate() {
            let id = roster.next_id();
            roster.push(Entity::from_template(
                id,
                Team::Enemy,
                slot as u8,
                template,
                &config,
            ));
        }

        let pool = DeckPool::from_deck(&setup.deck, &roster);
        let board = Board::new(pool, setup.seed, &config);

        Self {
            config,
            roster,
            board,
            scheduler: Scheduler::new(),
            events: Vec::new(),
            outcome: None,
        }
    }

    pub fn config(&self) -> &BattleConfig {
        &self.config
    }

    pub fn roster(&self) -> &Combatants {
        &self.roster
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.roster.get(id)
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn phase(&self) -> TurnPhase {
        self.scheduler.phase()
    }

    pub fn current_actor(&self) -> Option<&Entity> {
        self.scheduler.current().and_then(|id| self.roster.get(id))
    }

    pub fn outcome(&self) -> Option<BattleOutcome> {
        self.outcome
    }

    pub fn is_over(&self) -> bool {
        self.outcome.is_some()
    }

    fn decided(&self) -> Option<BattleOutcome> {
        if let Some(outcome) = self.outcome {
            return Some(outcome);
        }
        if self.roster.all_fainted(Team::Player) {
            Some(BattleOutcome::Defeat)
        } else if self.roster.all_fainted(Team::Enemy) {
            Some(BattleOutcome::Victory)
        } else {
            None
        }
    }

    /// Evaluates the end condition. Defeat is checked before victory.
    pub fn check_end(&mut self) -> Option<BattleOutcome> {
        self.outcome = self.decided();
        self.outcome
    }

    /// Ends the battle immediately, whatever the HP situation.
    pub fn surrender(&mut self) {
        if self.outcome.is_none() {
            self.outcome = Some(BattleOutcome::Surrendered);
        }
        self.board.lock();
    }

    /// Player slot allowed to act on the board right now.
    pub fn active_player_slot(&self) -> Option<u8> {
        if self.is_over() || self.phase() != TurnPhase::AwaitingAction {
            return None;
        }
        self.current_actor()
            .filter(|e| e.team.is_player())
            .map(|e| e.slot)
    }

    /// Ticks AP if needed and activates the next living actor.
    ///
    /// A player slot that can never own a tile passes its turn here and the
    /// search continues. Returns `None` once the battle is over, when the
    /// tick cap is hit without anyone becoming ready, or when more than
    /// `tick_iteration_cap` turns in a row were passed.
    pub fn begin_turn(&mut self) -> Option<ActiveTurn> {
        let mut passed = 0;

        loop {
            if self.decided().is_some() || passed > self.config.tick_iteration_cap {
                return None;
            }
            if self.scheduler.queue_is_empty() {
                let report = self.scheduler.tick(&mut self.roster, &self.config);
                if report.exhausted {
                    return None;
                }
            }

            let id = self.scheduler.pop_ready()?;
            let Some(entity) = self.roster.get(id).filter(|e| e.is_alive()) else {
                continue;
            };
            let (team, slot) = (entity.team, entity.slot);

            self.scheduler.activate(id);
            let board_refreshed = team.is_player()
                && self.board.pool().has_owner(slot)
                && self.board.prepare_for(slot);
            if team.is_player() && !self.board.owns_any(slot) {
                self.pass_turn(id);
                passed += 1;
                continue;
            }

            return Some(ActiveTurn {
                actor: id,
                team,
                slot,
                turn: self.scheduler.turn_number(),
                board_refreshed,
            });
        }
    }

    fn acting(&self) -> Result<EntityId, TurnError> {
        if self.is_over() {
            return Err(TurnError::BattleOver);
        }
        self.scheduler.current().ok_or(TurnError::NoActiveEntity)
    }

    /// Suspends the turn until the actor commits an action.
    pub fn await_action(&mut self) -> Result<(), TurnError> {
        self.acting()?;
        self.scheduler.set_phase(TurnPhase::AwaitingAction);
        Ok(())
    }

    /// Routes a tap to the board. Only the acting player slot may use it.
    pub fn tap(&mut self, coord: Coord, now_ms: u64) -> TapOutcome {
        let active = self.active_player_slot();
        let outcome = self.board.tap(coord, now_ms, active);
        if matches!(outcome, TapOutcome::Eliminated(_)) {
            self.scheduler.set_phase(TurnPhase::Resolving);
        }
        outcome
    }

    /// Applies the actor's action for a board elimination.
    ///
    /// Unknown action ids resolve with no effect.
    pub fn resolve_elimination(&mut self, elimination: &Elimination) -> Result<(), TurnError> {
        let actor_id = self.acting()?;
        self.scheduler.set_phase(TurnPhase::Resolving);

        let Some(actor) = self.roster.get(actor_id) else {
            return Err(TurnError::NoActiveEntity);
        };
        if !actor.team.is_player() {
            return Err(TurnError::WrongController {
                expected: Team::Player,
            });
        }
        let (atk, opponents) = (actor.current.atk, actor.team.opponent());
        let Some(action) = actor.action(elimination.action).cloned() else {
            return Ok(());
        };
        let scaled = |value: u32| (f64::from(value) * elimination.multiplier).floor() as u32;

        match action.effect {
            ActionEffect::Damage { true_damage } => {
                let target = self.roster.front_target(opponents);
                self.record(
                    actor_id,
                    CombatEventKind::Acted {
                        target,
                        action: Some(action.name.clone()),
                    },
                );
                if let Some(target) = target {
                    let mode = if true_damage {
                        DamageMode::True
                    } else {
                        DamageMode::Normal
                    };
                    self.strike(actor_id, target, scaled(atk), action.element, mode);
                }
            }
            ActionEffect::Shield { amount } => {
                self.record(
                    actor_id,
                    CombatEventKind::Acted {
                        target: Some(actor_id),
                        action: Some(action.name.clone()),
                    },
                );
                let amount = scaled(amount);
                if self.roster.get_mut(actor_id).is_some_and(|e| e.add_shield(amount)) {
                    self.record(actor_id, CombatEventKind::Shielded { amount });
                }
            }
            ActionEffect::Heal { amount } => {
                self.record(
                    actor_id,
                    CombatEventKind::Acted {
                        target: Some(actor_id),
                        action: Some(action.name.clone()),
                    },
                );
                if let Some(amount) = self
                    .roster
                    .get_mut(actor_id)
                    .and_then(|e| e.heal(scaled(amount)))
                {
                    self.record(actor_id, CombatEventKind::Healed { amount });
                }
            }
            ActionEffect::Buff {
                kind,
                amount,
                turns,
            } => {
                self.record(
                    actor_id,
                    CombatEventKind::Acted {
                        target: Some(actor_id),
                        action: Some(action.name.clone()),
                    },
                );
                let amount = amount * elimination.multiplier;
                let buff = Buff {
                    kind,
                    amount,
                    turns_left: turns,
                };
                if self.roster.get_mut(actor_id).is_some_and(|e| e.add_buff(buff)) {
                    self.record(
                        actor_id,
                        CombatEventKind::Buffed {
                            kind,
                            amount,
                            turns,
                        },
                    );
                }
            }
        }
        Ok(())
    }

    /// Opponents of `id` that are still standing.
    pub fn living_opponents(&self, id: EntityId) -> Vec<EntityId> {
        self.roster
            .get(id)
            .map(|actor| {
                self.roster
                    .living(actor.team.opponent())
                    .map(|e| e.id)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Basic attack by the acting entity: current atk, own element, shield first.
    ///
    /// A missing or fainted `target` falls back to the first living opponent.
    pub fn resolve_attack(&mut self, target: Option<EntityId>) -> Result<(), TurnError> {
        let actor_id = self.acting()?;
        self.scheduler.set_phase(TurnPhase::Resolving);

        let Some(actor) = self.roster.get(actor_id) else {
            return Err(TurnError::NoActiveEntity);
        };
        let (power, element, opponents) = (actor.current.atk, actor.element, actor.team.opponent());

        let target = target
            .filter(|id| {
                self.roster
                    .get(*id)
                    .is_some_and(|e| e.is_alive() && e.team == opponents)
            })
            .or_else(|| self.roster.living(opponents).next().map(|e| e.id));

        self.record(
            actor_id,
            CombatEventKind::Acted {
                target,
                action: None,
            },
        );
        if let Some(target) = target {
            self.strike(actor_id, target, power, element, DamageMode::Normal);
        }
        Ok(())
    }

    /// Closes the actor's turn: spends AP, ages buffs, locks the board and
    /// advances revive progress for fainted entities.
    pub fn advance_turn(&mut self) -> Result<(), TurnError> {
        let actor_id = self.scheduler.current().ok_or(TurnError::NoActiveEntity)?;
        self.scheduler.set_phase(TurnPhase::Advancing);
        self.board.lock();

        if let Some(actor) = self.roster.get_mut(actor_id) {
            actor.end_turn(self.config.turn_threshold);
        }

        if self.decided().is_none() {
            self.tick_revives();
        }
        Ok(())
    }

    /// Skips a turn that has no usable action: AP is spent and revive
    /// progress still advances.
    fn pass_turn(&mut self, id: EntityId) {
        self.record(id, CombatEventKind::Passed);
        if let Some(actor) = self.roster.get_mut(id) {
            actor.end_turn(self.config.turn_threshold);
        }
        if self.decided().is_none() {
            self.tick_revives();
        }
        self.scheduler.finish();
    }

    /// Returns to idle and reopens the board.
    pub fn finish_turn(&mut self) {
        self.scheduler.finish();
        if !self.is_over() {
            self.board.unlock();
        }
    }

    fn tick_revives(&mut self) {
        let config = &self.config;
        let steps: Vec<_> = self
            .roster
            .iter_mut()
            .filter(|e| e.fainted)
            .map(|e| (e.id, e.try_revive(config)))
            .collect();

        for (id, step) in steps {
            match step {
                ReviveStep::Ineligible => {}
                ReviveStep::Progress {
                    progress,
                    threshold,
                } => self.record(
                    id,
                    CombatEventKind::ReviveProgress {
                        progress,
                        threshold,
                    },
                ),
                ReviveStep::Revived { hp, charges_left } => {
                    self.record(id, CombatEventKind::Revived { hp, charges_left })
                }
            }
        }
    }

    /// Resolves and applies one hit, then runs the break mechanic.
    fn strike(
        &mut self,
        attacker: EntityId,
        target: EntityId,
        power: u32,
        element: Element,
        mode: DamageMode,
    ) {
        let (Some(a), Some(d)) = (self.roster.get(attacker), self.roster.get(target)) else {
            return;
        };
        let split = calculate_damage(a, d, power, mode, &self.config);

        let mut flags = HitFlags::empty();
        if mode == DamageMode::True {
            flags |= HitFlags::TRUE_DAMAGE;
        }
        self.apply_hit(target, split, false, flags);

        let reset = self.config.break_reset_hits;
        let Some(defender) = self.roster.get_mut(target) else {
            return;
        };
        let progress = register_break_hit(&mut defender.breaks, element, reset);
        match progress {
            BreakProgress::Unaffected => {}
            BreakProgress::Chipped { remaining } => {
                self.record(target, CombatEventKind::BreakChipped { element, remaining })
            }
            BreakProgress::Triggered { damage } => {
                self.record(target, CombatEventKind::BreakTriggered { element, damage });
                self.apply_hit(target, DamageSplit::hp_only(damage), true, HitFlags::BREAK);
            }
        }
    }

    fn apply_hit(&mut self, target: EntityId, split: DamageSplit, is_break: bool, flags: HitFlags) {
        let report: Option<DamageReport> = self
            .roster
            .get_mut(target)
            .and_then(|e| e.take_damage(split, is_break, &self.config));
        let Some(report) = report else {
            return;
        };

        let mut flags = flags;
        if report.heavy {
            flags |= HitFlags::HEAVY;
        }
        self.record(
            target,
            CombatEventKind::Damaged {
                hp: report.hp,
                shield: report.shield,
                flags,
            },
        );
        if report.fainted {
            self.record(target, CombatEventKind::Fainted);
        }
    }

    fn record(&mut self, id: EntityId, kind: CombatEventKind) {
        if let Some(entity) = self.roster.get(id) {
            self.events.push(CombatEvent {
                entity: id,
                team: entity.team,
                slot: entity.slot,
                kind,
            });
        }
    }

    /// Takes every combat event recorded since the last drain.
    pub fn drain_events(&mut self) -> Vec<CombatEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn statuses(&self) -> Vec<EntityStatus> {
        self.roster.iter().map(Entity::status).collect()
    }

    pub fn predict_order(&self, count: usize) -> Vec<OrderEntry> {
        self.scheduler
            .predict(&self.roster, &self.config)
            .take(count)
            .collect()
    }

    /// Board cells with tiles outside the acting player's ownership dimmed.
    pub fn board_views(&self) -> Vec<TileView> {
        let active = self
            .current_actor()
            .filter(|e| e.team.is_player())
            .map(|e| e.slot);
        self.board.views(active)
    }
}
