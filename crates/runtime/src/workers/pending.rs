//! Suspended player turn, completed at most once.
use tokio::sync::oneshot;

use battle_core::{Elimination, EntityId};

/// Slot for the elimination that ends a waiting player turn.
///
/// [`PendingAction::arm`] hands out the receiving end. The first
/// [`PendingAction::complete`] for the armed actor wins; later completions,
/// completions for another actor, and completions after
/// [`PendingAction::abandon`] are rejected.
#[derive(Debug, Default)]
pub struct PendingAction {
    armed: Option<(EntityId, oneshot::Sender<Elimination>)>,
}

impl PendingAction {
    pub fn arm(&mut self, actor: EntityId) -> oneshot::Receiver<Elimination> {
        let (tx, rx) = oneshot::channel();
        self.armed = Some((actor, tx));
        rx
    }

    pub fn is_armed(&self) -> bool {
        self.armed.is_some()
    }

    pub fn actor(&self) -> Option<EntityId> {
        self.armed.as_ref().map(|(actor, _)| *actor)
    }

    pub fn complete(&mut self, actor: EntityId, elimination: Elimination) -> bool {
        match self.armed.take() {
            Some((armed, tx)) if armed == actor => tx.send(elimination).is_ok(),
            other => {
                self.armed = other;
                false
            }
        }
    }

    /// Drops the sender so the waiting receiver resolves with an error.
    pub fn abandon(&mut self) {
        self.armed = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use battle_core::{ActionId, Coord};

    fn elimination() -> Elimination {
        Elimination {
            coords: vec![Coord::new(0, 0)],
            owner: 0,
            action: ActionId(1),
            via_swap: false,
            multiplier: 1.0,
        }
    }

    #[tokio::test]
    async fn completes_exactly_once() {
        let mut pending = PendingAction::default();
        let rx = pending.arm(EntityId(0));

        assert!(pending.complete(EntityId(0), elimination()));
        assert!(!pending.complete(EntityId(0), elimination()));
        assert_eq!(rx.await.unwrap().coords.len(), 1);
    }

    #[tokio::test]
    async fn wrong_actor_keeps_waiting() {
        let mut pending = PendingAction::default();
        let _rx = pending.arm(EntityId(1));

        assert!(!pending.complete(EntityId(0), elimination()));
        assert_eq!(pending.actor(), Some(EntityId(1)));
    }

    #[tokio::test]
    async fn abandoned_wait_resolves_with_error() {
        let mut pending = PendingAction::default();
        let rx = pending.arm(EntityId(0));
        pending.abandon();

        assert!(!pending.complete(EntityId(0), elimination()));
        assert!(rx.await.is_err());
    }
}
