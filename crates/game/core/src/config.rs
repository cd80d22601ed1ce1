/// Battle tuning constants and safety caps.
///
/// Every field has a `DEFAULT_*` counterpart; partially specified config files
/// fall back to those values field by field.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct BattleConfig {
    /// AP an entity must accumulate before it may act.
    pub turn_threshold: u32,
    pub min_speed: u32,
    pub max_speed: u32,
    /// Upper bound on AP tick passes while waiting for someone to become ready.
    pub tick_iteration_cap: u32,
    /// Upper bound on simulated passes when predicting turn order.
    pub prediction_iteration_cap: u32,
    pub order_preview_len: usize,
    /// Armor curve constant `K` in the damage formula.
    pub armor_constant: u32,
    /// Single hits are capped at `max_hp / damage_cap_divisor`.
    pub damage_cap_divisor: u32,
    /// Remaining hits a break gauge is reset to after it triggers.
    pub break_reset_hits: i32,
    /// HP damage at or above this percentage of base max HP counts as heavy.
    pub heavy_hit_percent: u32,
    pub revive_threshold: u8,
    pub revive_charges: u8,
    pub double_tap_window_ms: u64,
}

impl BattleConfig {
    // ===== compile-time constants used as type parameters =====
    pub const GRID_WIDTH: usize = 10;
    pub const GRID_HEIGHT: usize = 10;
    pub const MAX_ROSTER: usize = 3;
    pub const DECK_SIZE: usize = 8;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_TURN_THRESHOLD: u32 = 1000;
    pub const DEFAULT_MIN_SPEED: u32 = 1;
    pub const DEFAULT_MAX_SPEED: u32 = 100;
    pub const DEFAULT_TICK_ITERATION_CAP: u32 = 10_000;
    pub const DEFAULT_PREDICTION_ITERATION_CAP: u32 = 5_000;
    pub const DEFAULT_ORDER_PREVIEW_LEN: usize = 8;
    pub const DEFAULT_ARMOR_CONSTANT: u32 = 5;
    pub const DEFAULT_DAMAGE_CAP_DIVISOR: u32 = 5;
    pub const DEFAULT_BREAK_RESET_HITS: i32 = 10;
    pub const DEFAULT_HEAVY_HIT_PERCENT: u32 = 10;
    pub const DEFAULT_REVIVE_THRESHOLD: u8 = 5;
    pub const DEFAULT_REVIVE_CHARGES: u8 = 3;
    pub const DEFAULT_DOUBLE_TAP_WINDOW_MS: u64 = 300;

    pub const fn new() -> Self {
        Self {
            turn_threshold: Self::DEFAULT_TURN_THRESHOLD,
            min_speed: Self::DEFAULT_MIN_SPEED,
            max_speed: Self::DEFAULT_MAX_SPEED,
            tick_iteration_cap: Self::DEFAULT_TICK_ITERATION_CAP,
            prediction_iteration_cap: Self::DEFAULT_PREDICTION_ITERATION_CAP,
            order_preview_len: Self::DEFAULT_ORDER_PREVIEW_LEN,
            armor_constant: Self::DEFAULT_ARMOR_CONSTANT,
            damage_cap_divisor: Self::DEFAULT_DAMAGE_CAP_DIVISOR,
            break_reset_hits: Self::DEFAULT_BREAK_RESET_HITS,
            heavy_hit_percent: Self::DEFAULT_HEAVY_HIT_PERCENT,
            revive_threshold: Self::DEFAULT_REVIVE_THRESHOLD,
            revive_charges: Self::DEFAULT_REVIVE_CHARGES,
            double_tap_window_ms: Self::DEFAULT_DOUBLE_TAP_WINDOW_MS,
        }
    }

    pub fn with_turn_threshold(mut self, turn_threshold: u32) -> Self {
        self.turn_threshold = turn_threshold.max(1);
        self
    }

    pub fn with_speed_range(mut self, min_speed: u32, max_speed: u32) -> Self {
        self.min_speed = min_speed;
        self.max_speed = max_speed.max(min_speed);
        self
    }

    pub fn with_iteration_caps(mut self, tick: u32, prediction: u32) -> Self {
        self.tick_iteration_cap = tick;
        self.prediction_iteration_cap = prediction;
        self
    }

    pub fn with_revive(mut self, threshold: u8, charges: u8) -> Self {
        self.revive_threshold = threshold.max(1);
        self.revive_charges = charges;
        self
    }

    /// Clamps a template speed into the configured range.
    pub fn clamp_speed(&self, speed: u32) -> u32 {
        speed.clamp(self.min_speed, self.max_speed.max(self.min_speed))
    }
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self::new()
    }
}
