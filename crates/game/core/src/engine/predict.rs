use std::cmp::Reverse;
use std::collections::VecDeque;

use crate::config::BattleConfig;
use crate::state::{Combatants, Element, Entity, EntityId, Team};

/// One row of the turn-order preview.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OrderEntry {
    pub id: EntityId,
    pub name: String,
    pub team: Team,
    pub element: Element,
    pub is_current: bool,
}

impl OrderEntry {
    fn of(entity: &Entity, is_current: bool) -> Self {
        Self {
            id: entity.id,
            name: entity.name.clone(),
            team: entity.team,
            element: entity.element,
            is_current,
        }
    }
}

struct SimActor<'a> {
    entity: &'a Entity,
    ap: u32,
}

/// Non-mutating turn-order simulation over a scratch copy of AP values.
///
/// Yields actors in the order the scheduler would activate them. Ends early
/// when the pass cap is reached.
pub struct OrderPrediction<'a> {
    actors: Vec<SimActor<'a>>,
    seeded: Option<OrderEntry>,
    ready: VecDeque<usize>,
    passes: u32,
    cap: u32,
    threshold: u32,
}

impl<'a> OrderPrediction<'a> {
    pub fn new(roster: &'a Combatants, current: Option<EntityId>, config: &BattleConfig) -> Self {
        let mut actors: Vec<_> = roster
            .iter()
            .filter(|e| e.is_alive())
            .map(|entity| SimActor {
                entity,
                ap: entity.ap,
            })
            .collect();

        let mut seeded = None;
        if let Some(actor) = current.and_then(|id| actors.iter_mut().find(|a| a.entity.id == id)) {
            actor.ap = actor.ap.saturating_sub(config.turn_threshold);
            seeded = Some(OrderEntry::of(actor.entity, true));
        }

        Self {
            actors,
            seeded,
            ready: VecDeque::new(),
            passes: 0,
            cap: config.prediction_iteration_cap,
            threshold: config.turn_threshold,
        }
    }
}

impl Iterator for OrderPrediction<'_> {
    type Item = OrderEntry;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(current) = self.seeded.take() {
            return Some(current);
        }

        loop {
            if let Some(index) = self.ready.pop_front() {
                let actor = &mut self.actors[index];
                actor.ap = actor.ap.saturating_sub(self.threshold);
                return Some(OrderEntry::of(actor.entity, false));
            }

            if self.passes >= self.cap || self.actors.is_empty() {
                return None;
            }
            self.passes += 1;

            let mut ready: Vec<usize> = (0..self.actors.len())
                .filter(|&i| self.actors[i].ap >= self.threshold)
                .collect();

            if ready.is_empty() {
                for actor in &mut self.actors {
                    actor.ap = actor.ap.saturating_add(actor.entity.current.spd);
                }
            } else {
                ready.sort_by_key(|&i| Reverse(self.actors[i].ap));
                self.ready.extend(ready);
            }
        }
    }
}
