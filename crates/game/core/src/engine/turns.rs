use std::cmp::Reverse;
use std::collections::VecDeque;

use crate::config::BattleConfig;
use crate::state::{Combatants, EntityId};

use super::predict::OrderPrediction;

/// Lifecycle of the acting entity's turn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display, strum::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TurnPhase {
    #[default]
    Idle,
    Activated,
    AwaitingAction,
    Resolving,
    Advancing,
}

impl TurnPhase {
    /// Phases in which the actor's turn has started but its AP is not yet spent.
    pub const fn holds_turn(self) -> bool {
        matches!(
            self,
            TurnPhase::Activated | TurnPhase::AwaitingAction | TurnPhase::Resolving
        )
    }
}

/// Summary of one [`Scheduler::tick`] call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TickReport {
    pub passes: u32,
    pub queued: usize,
    /// The iteration cap was hit before anyone became ready.
    pub exhausted: bool,
}

/// Action-point scheduler: accumulates AP and hands out turns.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Scheduler {
    queue: VecDeque<EntityId>,
    current: Option<EntityId>,
    phase: TurnPhase,
    turn: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<EntityId> {
        self.current
    }

    pub fn phase(&self) -> TurnPhase {
        self.phase
    }

    /// Number of turns activated so far.
    pub fn turn_number(&self) -> u64 {
        self.turn
    }

    pub fn queue(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.queue.iter().copied()
    }

    pub fn queue_is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Adds speed to every living entity's AP until at least one crosses the
    /// threshold, or the configured pass cap is reached.
    ///
    /// Entities crossing in the same pass are queued and the queue is sorted
    /// by AP descending. The sort is stable, so ties keep insertion order.
    pub fn tick(&mut self, roster: &mut Combatants, config: &BattleConfig) -> TickReport {
        let mut passes = 0;

        while self.queue.is_empty() {
            if passes >= config.tick_iteration_cap {
                return TickReport {
                    passes,
                    queued: 0,
                    exhausted: true,
                };
            }
            passes += 1;

            let mut crossed = false;
            for entity in roster.iter_mut().filter(|e| e.is_alive()) {
                entity.ap = entity.ap.saturating_add(entity.current.spd);
                if entity.ap >= config.turn_threshold {
                    self.queue.push_back(entity.id);
                    crossed = true;
                }
            }

            if crossed {
                self.queue
                    .make_contiguous()
                    .sort_by_key(|id| Reverse(roster.get(*id).map_or(0, |e| e.ap)));
            }
        }

        TickReport {
            passes,
            queued: self.queue.len(),
            exhausted: false,
        }
    }

    pub fn pop_ready(&mut self) -> Option<EntityId> {
        self.queue.pop_front()
    }

    pub fn activate(&mut self, entity: EntityId) {
        self.current = Some(entity);
        self.phase = TurnPhase::Activated;
        self.turn += 1;
    }

    pub fn set_phase(&mut self, phase: TurnPhase) {
        self.phase = phase;
    }

    pub fn finish(&mut self) {
        self.current = None;
        self.phase = TurnPhase::Idle;
    }

    /// Lazily predicts upcoming actors without touching real state.
    ///
    /// While a turn is held, the acting entity is yielded first and its
    /// pending threshold is pre-spent in the simulation.
    pub fn predict<'a>(
        &self,
        roster: &'a Combatants,
        config: &BattleConfig,
    ) -> OrderPrediction<'a> {
        let current = self.current.filter(|_| self.phase.holds_turn());
        OrderPrediction::new(roster, current, config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{Entity, Team};

    fn roster(speeds: &[u32]) -> Combatants {
        let config = BattleConfig::default();
        let mut all = Combatants::new();
        for (slot, &spd) in speeds.iter().enumerate() {
            let mut e = Entity::placeholder(EntityId(0), Team::Player, slot as u8, &config);
            e.current.spd = spd;
            all.push(e);
        }
        all
    }

    #[test]
    fn tick_runs_until_someone_is_ready() {
        let config = BattleConfig::default();
        let mut all = roster(&[10, 5]);
        let mut scheduler = Scheduler::new();

        let report = scheduler.tick(&mut all, &config);
        assert_eq!(report.passes, 100);
        assert!(!report.exhausted);
        assert_eq!(scheduler.pop_ready(), Some(EntityId(0)));
        assert_eq!(all.get(EntityId(1)).unwrap().ap, 500);
    }

    #[test]
    fn simultaneous_crossers_sort_by_ap_then_insertion() {
        let config = BattleConfig::default();
        let mut all = roster(&[50, 100, 100]);
        all.get_mut(EntityId(0)).unwrap().ap = 980;
        all.get_mut(EntityId(2)).unwrap().ap = 900;

        let mut scheduler = Scheduler::new();
        scheduler.tick(&mut all, &config);
        // After one pass: #0=1030, #1=100, #2=1000.
        let order: Vec<_> = scheduler.queue().collect();
        assert_eq!(order, vec![EntityId(0), EntityId(2)]);

        let mut tied = roster(&[100, 100]);
        tied.get_mut(EntityId(0)).unwrap().ap = 900;
        tied.get_mut(EntityId(1)).unwrap().ap = 900;
        let mut scheduler = Scheduler::new();
        scheduler.tick(&mut tied, &config);
        let order: Vec<_> = scheduler.queue().collect();
        assert_eq!(order, vec![EntityId(0), EntityId(1)]);
    }

    #[test]
    fn zero_speed_hits_iteration_cap() {
        let config = BattleConfig::default().with_iteration_caps(50, 50);
        let mut all = roster(&[0, 0]);
        let mut scheduler = Scheduler::new();
        let report = scheduler.tick(&mut all, &config);
        assert!(report.exhausted);
        assert_eq!(report.passes, 50);
        assert!(scheduler.queue_is_empty());
    }

    #[test]
    fn fainted_entities_do_not_gain_ap() {
        let config = BattleConfig::default();
        let mut all = roster(&[10, 100]);
        all.get_mut(EntityId(1)).unwrap().faint();
        let mut scheduler = Scheduler::new();
        scheduler.tick(&mut all, &config);
        assert_eq!(all.get(EntityId(1)).unwrap().ap, 0);
        assert_eq!(scheduler.pop_ready(), Some(EntityId(0)));
    }

    #[test]
    fn tick_is_noop_while_queue_has_entries() {
        let config = BattleConfig::default();
        let mut all = roster(&[100, 100]);
        let mut scheduler = Scheduler::new();
        scheduler.tick(&mut all, &config);
        let before = all.clone();
        let report = scheduler.tick(&mut all, &config);
        assert_eq!(report.passes, 0);
        assert_eq!(all, before);
    }
}
