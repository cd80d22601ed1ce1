//! Damage resolution.

use crate::config::BattleConfig;
use crate::state::Entity;

/// How a resolved hit is routed between shield and HP.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DamageMode {
    /// Shield absorbs first, the remainder reaches HP.
    #[default]
    Normal,
    /// Everything goes to HP; shield is untouched.
    True,
    /// Everything goes to the shield channel, never to HP.
    ShieldOnly,
}

/// Outcome of the resolver: how much each channel loses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DamageSplit {
    pub hp: u32,
    pub shield: u32,
}

impl DamageSplit {
    pub const fn hp_only(hp: u32) -> Self {
        Self { hp, shield: 0 }
    }

    pub const fn total(&self) -> u32 {
        self.hp + self.shield
    }
}

/// Numeric inputs of one hit, decoupled from entity storage.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DamageInput {
    /// Effective attack term (attacker atk scaled by the action multiplier).
    pub power: u32,
    pub atk_buff: f64,
    pub defense: u32,
    pub def_buff: f64,
    pub dmg_buff: f64,
    pub defender_max_hp: u32,
    pub defender_shield: u32,
}

impl DamageInput {
    pub fn between(attacker: &Entity, defender: &Entity, power: u32) -> Self {
        Self {
            power,
            atk_buff: attacker.modifiers.atk_multiplier() - 1.0,
            defense: defender.current.def,
            def_buff: defender.modifiers.def_multiplier() - 1.0,
            dmg_buff: attacker.modifiers.dmg_multiplier() - 1.0,
            defender_max_hp: defender.max_hp(),
            defender_shield: defender.shield,
        }
    }
}

/// Resolves one hit.
///
/// # Formula
///
/// ```text
/// numerator   = power × (1 + atk_buff) × K
/// denominator = def × (1 + def_buff) + K        (1 if that is not positive)
/// raw         = floor(numerator / denominator × (1 + dmg_buff))
/// final       = clamp(raw, 1, floor(max_hp / cap_divisor))   (never below 1)
/// ```
///
/// `final` is then routed according to `mode`. In `Normal` mode the shield
/// absorbs up to its current value and HP takes the rest.
pub fn resolve_damage(input: &DamageInput, mode: DamageMode, config: &BattleConfig) -> DamageSplit {
    let k = f64::from(config.armor_constant);

    let numerator = f64::from(input.power) * (1.0 + input.atk_buff) * k;
    let mut denominator = f64::from(input.defense) * (1.0 + input.def_buff) + k;
    if denominator <= 0.0 {
        denominator = 1.0;
    }

    let raw = (numerator / denominator * (1.0 + input.dmg_buff)).floor();
    // `as` saturates: NaN and negatives become 0, huge values u32::MAX.
    let raw = raw as u32;

    let cap = input.defender_max_hp / config.damage_cap_divisor.max(1);
    let amount = raw.min(cap).max(1);

    match mode {
        DamageMode::ShieldOnly => DamageSplit {
            hp: 0,
            shield: amount,
        },
        DamageMode::True => DamageSplit::hp_only(amount),
        DamageMode::Normal => {
            let absorbed = amount.min(input.defender_shield);
            DamageSplit {
                hp: amount - absorbed,
                shield: absorbed,
            }
        }
    }
}

/// Convenience wrapper reading modifiers and defense straight from entities.
pub fn calculate_damage(
    attacker: &Entity,
    defender: &Entity,
    power: u32,
    mode: DamageMode,
    config: &BattleConfig,
) -> DamageSplit {
    resolve_damage(&DamageInput::between(attacker, defender, power), mode, config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(power: u32, defense: u32, max_hp: u32, shield: u32) -> DamageInput {
        DamageInput {
            power,
            atk_buff: 0.0,
            defense,
            def_buff: 0.0,
            dmg_buff: 0.0,
            defender_max_hp: max_hp,
            defender_shield: shield,
        }
    }

    #[test]
    fn reference_hit_deals_ten() {
        let config = BattleConfig::default();
        let split = resolve_damage(&input(50, 20, 1000, 0), DamageMode::Normal, &config);
        assert_eq!(split, DamageSplit::hp_only(10));
    }

    #[test]
    fn hit_is_capped_by_fifth_of_max_hp() {
        let config = BattleConfig::default();
        let split = resolve_damage(&input(5000, 0, 120, 0), DamageMode::Normal, &config);
        assert_eq!(split.total(), 24);
    }

    #[test]
    fn hit_never_drops_below_one() {
        let config = BattleConfig::default();
        let split = resolve_damage(&input(0, 500, 1000, 0), DamageMode::Normal, &config);
        assert_eq!(split.total(), 1);

        // Tiny targets still take the minimum even though the cap is zero.
        let split = resolve_damage(&input(100, 0, 3, 0), DamageMode::Normal, &config);
        assert_eq!(split.total(), 1);
    }

    #[test]
    fn shield_absorbs_before_hp() {
        let config = BattleConfig::default();
        let split = resolve_damage(&input(50, 20, 1000, 4), DamageMode::Normal, &config);
        assert_eq!(split, DamageSplit { hp: 6, shield: 4 });

        let split = resolve_damage(&input(50, 20, 1000, 40), DamageMode::Normal, &config);
        assert_eq!(split, DamageSplit { hp: 0, shield: 10 });
    }

    #[test]
    fn true_damage_ignores_shield() {
        let config = BattleConfig::default();
        let split = resolve_damage(&input(50, 20, 1000, 40), DamageMode::True, &config);
        assert_eq!(split, DamageSplit::hp_only(10));
    }

    #[test]
    fn shield_only_mode_never_touches_hp() {
        let config = BattleConfig::default();
        let split = resolve_damage(&input(50, 20, 1000, 0), DamageMode::ShieldOnly, &config);
        assert_eq!(split, DamageSplit { hp: 0, shield: 10 });
    }

    #[test]
    fn buffs_scale_each_term() {
        let config = BattleConfig::default();
        let mut buffed = input(50, 20, 1000, 0);
        buffed.atk_buff = 0.5;
        // 50 × 1.5 × 5 / 25 = 15
        assert_eq!(
            resolve_damage(&buffed, DamageMode::Normal, &config).total(),
            15
        );

        buffed.dmg_buff = 1.0;
        assert_eq!(
            resolve_damage(&buffed, DamageMode::Normal, &config).total(),
            30
        );

        let mut armored = input(50, 20, 1000, 0);
        armored.def_buff = 1.0;
        // 250 / 45 = 5.55
        assert_eq!(
            resolve_damage(&armored, DamageMode::Normal, &config).total(),
            5
        );
    }

    #[test]
    fn same_inputs_same_output() {
        let config = BattleConfig::default();
        let hit = input(73, 11, 640, 3);
        assert_eq!(
            resolve_damage(&hit, DamageMode::Normal, &config),
            resolve_damage(&hit, DamageMode::Normal, &config)
        );
    }
}
