//! Template lookup with the fallbacks battles rely on.
use std::collections::BTreeMap;

use battle_core::{BattleSetup, CombatantTemplate, Element, Loadout};

/// Enemy fought when a level id does not resolve.
pub const DEFAULT_ENEMY: &str = "boss_doll";

/// Characters and enemies keyed by code.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Catalog {
    characters: BTreeMap<String, CombatantTemplate>,
    enemies: BTreeMap<String, CombatantTemplate>,
}

impl Catalog {
    pub fn new(
        characters: impl IntoIterator<Item = CombatantTemplate>,
        enemies: impl IntoIterator<Item = CombatantTemplate>,
    ) -> Self {
        Self {
            characters: characters
                .into_iter()
                .map(|t| (t.code.clone(), t))
                .collect(),
            enemies: enemies.into_iter().map(|t| (t.code.clone(), t)).collect(),
        }
    }

    pub fn character(&self, code: &str) -> Option<&CombatantTemplate> {
        self.characters.get(code)
    }

    pub fn enemy(&self, code: &str) -> Option<&CombatantTemplate> {
        self.enemies.get(code)
    }

    pub fn characters(&self) -> impl Iterator<Item = &CombatantTemplate> {
        self.characters.values()
    }

    pub fn enemies(&self) -> impl Iterator<Item = &CombatantTemplate> {
        self.enemies.values()
    }

    /// Enemy for a level: the matching enemy, else [`DEFAULT_ENEMY`], else a
    /// one-HP stand-in so the battle can still start.
    pub fn enemy_for_level(&self, level: &str) -> CombatantTemplate {
        self.enemy(level)
            .or_else(|| self.enemy(DEFAULT_ENEMY))
            .cloned()
            .unwrap_or_else(|| CombatantTemplate {
                code: DEFAULT_ENEMY.into(),
                name: "Unknown".into(),
                hp: 1,
                atk: 0,
                def: 0,
                spd: 1,
                element: Element::Neutral,
                breaks: Vec::new(),
                actions: Vec::new(),
            })
    }

    /// Resolves a loadout and level into battle inputs.
    ///
    /// Unknown character codes stay as `None` so the engine seats a placeholder.
    pub fn setup(&self, loadout: &Loadout, level: &str, seed: u64) -> BattleSetup {
        BattleSetup {
            party: loadout
                .roster
                .iter()
                .map(|code| self.character(code).cloned())
                .collect(),
            enemies: vec![self.enemy_for_level(level)],
            deck: loadout.deck.to_vec(),
            seed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template(code: &str) -> CombatantTemplate {
        CombatantTemplate {
            code: code.into(),
            name: code.into(),
            hp: 100,
            atk: 10,
            def: 10,
            spd: 10,
            element: Element::Dark,
            breaks: Vec::new(),
            actions: Vec::new(),
        }
    }

    #[test]
    fn unknown_level_falls_back_to_default_enemy() {
        let catalog = Catalog::new([], [template(DEFAULT_ENEMY), template("golem")]);
        assert_eq!(catalog.enemy_for_level("golem").code, "golem");
        assert_eq!(catalog.enemy_for_level("nowhere").code, DEFAULT_ENEMY);
    }

    #[test]
    fn empty_catalog_still_yields_an_enemy() {
        let enemy = Catalog::default().enemy_for_level("any");
        assert_eq!(enemy.hp, 1);
    }

    #[test]
    fn setup_keeps_unknown_characters_as_gaps() {
        let catalog = Catalog::new([template("kai")], [template(DEFAULT_ENEMY)]);
        let loadout = Loadout::auto_fill(["kai", "ghost", "kai"]).unwrap();
        let setup = catalog.setup(&loadout, "stage1", 5);

        assert_eq!(setup.party.len(), 3);
        assert!(setup.party[0].is_some());
        assert!(setup.party[1].is_none());
        assert_eq!(setup.enemies[0].code, DEFAULT_ENEMY);
        assert_eq!(setup.deck.len(), 8);
        assert_eq!(setup.seed, 5);
    }
}
