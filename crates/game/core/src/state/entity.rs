//! Per-combatant battle state and its transitions.
//!
//! Entities are only mutated through the methods here so that the HP, shield
//! and faint invariants hold after every call:
//! - `0 <= hp <= max_hp`
//! - a fainted entity has `hp == 0`, `ap == 0`, `shield == 0` and no buffs
use std::collections::BTreeMap;

use crate::combat::DamageSplit;
use crate::config::BattleConfig;
use crate::template::{ActionDef, ActionId, CombatantTemplate};

use super::{Element, EntityId, Team};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Stats {
    pub max_hp: u32,
    pub atk: u32,
    pub def: u32,
    pub spd: u32,
}

/// Break progress for one element.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BreakGauge {
    pub remaining: i32,
    pub damage: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "lowercase")]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum BuffKind {
    Attack,
    Defense,
    Damage,
}

/// Timed modifier expressed as a fraction (`0.2` is +20%).
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Buff {
    pub kind: BuffKind,
    pub amount: f64,
    pub turns_left: u8,
}

/// Transient modifier set, cleared on faint.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Modifiers {
    pub buffs: Vec<Buff>,
}

impl Modifiers {
    fn fraction(&self, kind: BuffKind) -> f64 {
        self.buffs
            .iter()
            .filter(|buff| buff.kind == kind)
            .map(|buff| buff.amount)
            .sum()
    }

    pub fn atk_multiplier(&self) -> f64 {
        1.0 + self.fraction(BuffKind::Attack)
    }

    pub fn def_multiplier(&self) -> f64 {
        1.0 + self.fraction(BuffKind::Defense)
    }

    pub fn dmg_multiplier(&self) -> f64 {
        1.0 + self.fraction(BuffKind::Damage)
    }

    pub fn push(&mut self, buff: Buff) {
        if buff.turns_left > 0 {
            self.buffs.push(buff);
        }
    }

    /// Counts down every buff by one turn and drops the expired ones.
    pub fn expire_turn(&mut self) {
        for buff in &mut self.buffs {
            buff.turns_left = buff.turns_left.saturating_sub(1);
        }
        self.buffs.retain(|buff| buff.turns_left > 0);
    }

    pub fn clear(&mut self) {
        self.buffs.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.buffs.is_empty()
    }
}

/// Damage actually taken by [`Entity::take_damage`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DamageReport {
    pub hp: u32,
    pub shield: u32,
    pub heavy: bool,
    pub fainted: bool,
}

/// Result of one revive-progress tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReviveStep {
    /// Not fainted, or no charges left.
    Ineligible,
    Progress { progress: u8, threshold: u8 },
    Revived { hp: u32, charges_left: u8 },
}

/// Read-only projection for status bars.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EntityStatus {
    pub id: EntityId,
    pub name: String,
    pub team: Team,
    pub slot: u8,
    pub hp: u32,
    pub max_hp: u32,
    pub shield: u32,
    pub ap: u32,
    pub breaks: Vec<(Element, BreakGauge)>,
    pub fainted: bool,
    pub revive_progress: u8,
    pub revive_charges: u8,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Entity {
    pub id: EntityId,
    pub code: String,
    pub name: String,
    pub team: Team,
    /// Position index within the team. Player tiles are owned by this index.
    pub slot: u8,
    pub element: Element,
    pub base: Stats,
    pub current: Stats,
    pub hp: u32,
    pub shield: u32,
    pub ap: u32,
    pub breaks: BTreeMap<Element, BreakGauge>,
    pub fainted: bool,
    pub revive_progress: u8,
    pub revive_charges: u8,
    pub modifiers: Modifiers,
    pub actions: BTreeMap<ActionId, ActionDef>,
}

impl Entity {
    pub fn from_template(
        id: EntityId,
        team: Team,
        slot: u8,
        template: &CombatantTemplate,
        config: &BattleConfig,
    ) -> Self {
        let base = Stats {
            max_hp: template.hp,
            atk: template.atk,
            def: template.def,
            spd: config.clamp_speed(template.spd),
        };

        Self {
            id,
            code: template.code.clone(),
            name: template.name.clone(),
            team,
            slot,
            element: template.element,
            base,
            current: base,
            hp: base.max_hp,
            shield: 0,
            ap: 0,
            breaks: template
                .breaks
                .iter()
                .map(|spec| {
                    (
                        spec.element,
                        BreakGauge {
                            remaining: spec.hits,
                            damage: spec.damage,
                        },
                    )
                })
                .collect(),
            fainted: false,
            revive_progress: 0,
            revive_charges: config.revive_charges,
            modifiers: Modifiers::default(),
            actions: template
                .actions
                .iter()
                .map(|action| (action.id, action.clone()))
                .collect(),
        }
    }

    /// Stand-in for a template that could not be resolved.
    pub fn placeholder(id: EntityId, team: Team, slot: u8, config: &BattleConfig) -> Self {
        let template = CombatantTemplate {
            code: String::new(),
            name: "Unknown".into(),
            hp: 1,
            atk: 0,
            def: 0,
            spd: config.min_speed,
            element: Element::Neutral,
            breaks: Vec::new(),
            actions: Vec::new(),
        };
        Self::from_template(id, team, slot, &template, config)
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        !self.fainted
    }

    pub fn max_hp(&self) -> u32 {
        self.current.max_hp
    }

    pub fn action(&self, id: ActionId) -> Option<&ActionDef> {
        self.actions.get(&id)
    }

    /// Applies a pre-split hit. Ignored once fainted.
    ///
    /// A hit is heavy when it is a break hit or when its HP portion reaches
    /// `heavy_hit_percent` of base max HP.
    pub fn take_damage(
        &mut self,
        split: DamageSplit,
        is_break: bool,
        config: &BattleConfig,
    ) -> Option<DamageReport> {
        if self.fainted {
            return None;
        }

        self.shield = self.shield.saturating_sub(split.shield);
        self.hp = self.hp.saturating_sub(split.hp);

        let heavy = is_break
            || u64::from(split.hp) * 100
                >= u64::from(self.base.max_hp) * u64::from(config.heavy_hit_percent);

        let fainted = self.hp == 0;
        if fainted {
            self.faint();
        }

        Some(DamageReport {
            hp: split.hp,
            shield: split.shield,
            heavy,
            fainted,
        })
    }

    /// Restores HP up to max. Returns the amount restored.
    pub fn heal(&mut self, amount: u32) -> Option<u32> {
        if self.fainted {
            return None;
        }
        let before = self.hp;
        self.hp = self.hp.saturating_add(amount).min(self.max_hp());
        Some(self.hp - before)
    }

    pub fn add_shield(&mut self, amount: u32) -> bool {
        if self.fainted {
            return false;
        }
        self.shield = self.shield.saturating_add(amount);
        true
    }

    pub fn add_buff(&mut self, buff: Buff) -> bool {
        if self.fainted {
            return false;
        }
        self.modifiers.push(buff);
        true
    }

    pub fn faint(&mut self) {
        self.fainted = true;
        self.hp = 0;
        self.ap = 0;
        self.shield = 0;
        self.modifiers.clear();
    }

    /// Advances revive progress by one tick.
    ///
    /// At the threshold the entity returns at half max HP (rounded down, at
    /// least 1) and consumes one charge.
    pub fn try_revive(&mut self, config: &BattleConfig) -> ReviveStep {
        if !self.fainted || self.revive_charges == 0 {
            return ReviveStep::Ineligible;
        }

        self.revive_progress = self.revive_progress.saturating_add(1);
        if self.revive_progress < config.revive_threshold {
            return ReviveStep::Progress {
                progress: self.revive_progress,
                threshold: config.revive_threshold,
            };
        }

        self.fainted = false;
        self.hp = (self.max_hp() / 2).max(1);
        self.ap = 0;
        self.revive_charges -= 1;
        self.revive_progress = 0;

        ReviveStep::Revived {
            hp: self.hp,
            charges_left: self.revive_charges,
        }
    }

    /// Ends this entity's turn: spends one threshold of AP and ages buffs.
    pub fn end_turn(&mut self, threshold: u32) {
        self.ap = self.ap.saturating_sub(threshold);
        self.modifiers.expire_turn();
    }

    pub fn status(&self) -> EntityStatus {
        EntityStatus {
            id: self.id,
            name: self.name.clone(),
            team: self.team,
            slot: self.slot,
            hp: self.hp,
            max_hp: self.max_hp(),
            shield: self.shield,
            ap: self.ap,
            breaks: self.breaks.iter().map(|(e, g)| (*e, *g)).collect(),
            fainted: self.fainted,
            revive_progress: self.revive_progress,
            revive_charges: self.revive_charges,
        }
    }
}
