use super::{Entity, EntityId, Team};

/// Every combatant in a battle, indexed by [`EntityId`].
///
/// Ids are assigned densely at construction so lookups are plain indexing.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Combatants {
    entities: Vec<Entity>,
}

impl Combatants {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next id that [`Self::push`] will accept.
    pub fn next_id(&self) -> EntityId {
        EntityId(self.entities.len() as u32)
    }

    /// Appends an entity, re-stamping its id to keep ids dense.
    pub fn push(&mut self, mut entity: Entity) -> EntityId {
        let id = self.next_id();
        entity.id = id;
        self.entities.push(entity);
        id
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(id.index())
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(id.index())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.entities.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn team(&self, team: Team) -> impl Iterator<Item = &Entity> {
        self.entities.iter().filter(move |e| e.team == team)
    }

    pub fn living(&self, team: Team) -> impl Iterator<Item = &Entity> {
        self.team(team).filter(|e| e.is_alive())
    }

    /// True when no member of `team` is standing. An empty team counts as fallen.
    pub fn all_fainted(&self, team: Team) -> bool {
        self.team(team).all(|e| e.fainted)
    }

    pub fn player_in_slot(&self, slot: u8) -> Option<&Entity> {
        self.team(Team::Player).find(|e| e.slot == slot)
    }

    /// Default target for player actions: the first living enemy, else the first enemy.
    pub fn front_target(&self, team: Team) -> Option<EntityId> {
        self.living(team)
            .next()
            .or_else(|| self.team(team).next())
            .map(|e| e.id)
    }
}
