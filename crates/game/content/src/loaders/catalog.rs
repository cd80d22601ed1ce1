//! Combatant catalog loader.
//!
//! Loads characters and enemies from a RON file of the form
//! `(characters: [...], enemies: [...])`.

use std::collections::BTreeSet;
use std::path::Path;

use battle_core::CombatantTemplate;
use serde::Deserialize;

use crate::Catalog;
use crate::loaders::{LoadResult, read_file};

const BUILTIN: &str = include_str!("../../data/catalog.ron");

#[derive(Deserialize)]
struct CatalogFile {
    #[serde(default)]
    characters: Vec<CombatantTemplate>,
    #[serde(default)]
    enemies: Vec<CombatantTemplate>,
}

/// Loader for the combatant catalog from RON files.
pub struct CatalogLoader;

impl CatalogLoader {
    pub fn load(path: &Path) -> LoadResult<Catalog> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    /// Parses and validates catalog RON.
    ///
    /// Codes must be unique within each list, and action ids must be unique
    /// and non-zero within each template.
    pub fn parse(content: &str) -> LoadResult<Catalog> {
        let file: CatalogFile = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse catalog RON: {}", e))?;

        validate("character", &file.characters)?;
        validate("enemy", &file.enemies)?;

        Ok(Catalog::new(file.characters, file.enemies))
    }

    /// The shipped `catalog.ron`.
    pub fn builtin() -> LoadResult<Catalog> {
        Self::parse(BUILTIN)
    }
}

fn validate(kind: &str, templates: &[CombatantTemplate]) -> LoadResult<()> {
    let mut codes = BTreeSet::new();
    for template in templates {
        if !codes.insert(template.code.as_str()) {
            anyhow::bail!("Duplicate {} code '{}'", kind, template.code);
        }
        if template.hp == 0 {
            anyhow::bail!("{} '{}' has zero hp", kind, template.code);
        }

        let mut ids = BTreeSet::new();
        for action in &template.actions {
            if action.id.0 == 0 {
                anyhow::bail!("{} '{}' declares action id 0", kind, template.code);
            }
            if !ids.insert(action.id) {
                anyhow::bail!(
                    "{} '{}' declares {} twice",
                    kind,
                    template.code,
                    action.id
                );
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use battle_core::{ActionId, Element, Loadout};

    use super::*;
    use crate::DEFAULT_ENEMY;

    #[test]
    fn builtin_covers_default_party() {
        let catalog = CatalogLoader::builtin().unwrap();
        for code in Loadout::DEFAULT_ROSTER {
            let template = catalog.character(code).unwrap();
            for id in 1..=3 {
                assert!(template.action(ActionId(id)).is_some(), "{code} action {id}");
            }
        }
        assert_eq!(catalog.enemy(DEFAULT_ENEMY).unwrap().element, Element::Dark);
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"(
                characters: [
                    (code: "a", name: "A", hp: 10, atk: 1, def: 1, spd: 5, element: fire),
                ],
            )"#
        )
        .unwrap();

        let catalog = CatalogLoader::load(file.path()).unwrap();
        let a = catalog.character("a").unwrap();
        assert!(a.actions.is_empty());
        assert!(a.breaks.is_empty());
        assert_eq!(catalog.enemies().count(), 0);
    }

    #[test]
    fn rejects_duplicate_codes() {
        let err = CatalogLoader::parse(
            r#"(enemies: [
                (code: "x", name: "X", hp: 1, atk: 1, def: 1, spd: 1, element: dark),
                (code: "x", name: "Y", hp: 1, atk: 1, def: 1, spd: 1, element: dark),
            ])"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("Duplicate enemy code"));
    }

    #[test]
    fn rejects_duplicate_action_ids() {
        let err = CatalogLoader::parse(
            r#"(characters: [
                (code: "x", name: "X", hp: 1, atk: 1, def: 1, spd: 1, element: none, actions: [
                    (id: 1, name: "a", element: none, effect: Heal(amount: 1)),
                    (id: 1, name: "b", element: none, effect: Shield(amount: 1)),
                ]),
            ])"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("action 1 twice"));
    }
}
