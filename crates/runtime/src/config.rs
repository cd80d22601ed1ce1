//! Runtime configuration and pacing delays.
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use battle_content::ConfigLoader;
use battle_core::BattleConfig;
use tracing::warn;

/// Presentation delays the worker inserts between battle steps.
///
/// Delays never change battle results; they only space out events for
/// consumers that animate them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PacingConfig {
    /// Before an AI actor picks its action.
    pub ai_think: Duration,
    /// Between an AI decision and its hit landing.
    pub ai_strike: Duration,
    /// After a swap, before its elimination resolves.
    pub swap_check: Duration,
    /// After a double-tap elimination, before it resolves.
    pub elimination: Duration,
    /// After an action's effect is applied.
    pub skill: Duration,
    /// Board lock window between turns.
    pub relock: Duration,
    /// Wait before retrying when no entity reached the turn threshold.
    pub stall_backoff: Duration,
}

impl PacingConfig {
    pub const DEFAULT_AI_THINK: Duration = Duration::from_millis(800);
    pub const DEFAULT_AI_STRIKE: Duration = Duration::from_millis(300);
    pub const DEFAULT_SWAP_CHECK: Duration = Duration::from_millis(200);
    pub const DEFAULT_ELIMINATION: Duration = Duration::from_millis(300);
    pub const DEFAULT_SKILL: Duration = Duration::from_millis(300);
    pub const DEFAULT_RELOCK: Duration = Duration::from_millis(600);
    pub const DEFAULT_STALL_BACKOFF: Duration = Duration::from_millis(200);

    /// Largest factor [`PacingConfig::scaled`] accepts.
    pub const MAX_SCALE: f64 = 100.0;

    pub const fn new() -> Self {
        Self {
            ai_think: Self::DEFAULT_AI_THINK,
            ai_strike: Self::DEFAULT_AI_STRIKE,
            swap_check: Self::DEFAULT_SWAP_CHECK,
            elimination: Self::DEFAULT_ELIMINATION,
            skill: Self::DEFAULT_SKILL,
            relock: Self::DEFAULT_RELOCK,
            stall_backoff: Self::DEFAULT_STALL_BACKOFF,
        }
    }

    /// Every delay zero except the stall backoff, which must stay positive.
    pub const fn instant() -> Self {
        Self {
            ai_think: Duration::ZERO,
            ai_strike: Duration::ZERO,
            swap_check: Duration::ZERO,
            elimination: Duration::ZERO,
            skill: Duration::ZERO,
            relock: Duration::ZERO,
            stall_backoff: Duration::from_millis(1),
        }
    }

    /// Multiplies every delay; `0.0` behaves like [`PacingConfig::instant`].
    pub fn scaled(&self, factor: f64) -> Self {
        let factor = if factor.is_nan() {
            0.0
        } else {
            factor.clamp(0.0, Self::MAX_SCALE)
        };
        let scale = |d: Duration| d.mul_f64(factor);
        Self {
            ai_think: scale(self.ai_think),
            ai_strike: scale(self.ai_strike),
            swap_check: scale(self.swap_check),
            elimination: scale(self.elimination),
            skill: scale(self.skill),
            relock: scale(self.relock),
            stall_backoff: scale(self.stall_backoff).max(Duration::from_millis(1)),
        }
    }
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Runtime configuration shared across the orchestrator and worker.
#[derive(Clone, Debug, PartialEq)]
pub struct RuntimeConfig {
    pub battle: BattleConfig,
    pub pacing: PacingConfig,
    pub event_buffer_size: usize,
    pub command_buffer_size: usize,
    /// Fixed battle seed, overriding the one in the battle setup.
    pub seed: Option<u64>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            battle: BattleConfig::default(),
            pacing: PacingConfig::default(),
            event_buffer_size: 256,
            command_buffer_size: 32,
            seed: None,
        }
    }
}

impl RuntimeConfig {
    pub fn with_pacing(mut self, pacing: PacingConfig) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// The configured seed, or a fresh random one.
    pub fn seed_or_random(&self) -> u64 {
        self.seed.unwrap_or_else(rand::random)
    }

    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `BATTLE_CONFIG_PATH` - TOML file with battle tuning (default: built-in values)
    /// - `BATTLE_SEED` - Fixed battle seed (default: random)
    /// - `BATTLE_PACING_SCALE` - Multiplier applied to every pacing delay (default: 1.0)
    /// - `BATTLE_EVENT_BUFFER` - Per-topic event capacity (default: 256)
    /// - `BATTLE_COMMAND_BUFFER` - Command queue size (default: 32)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(path) = read_env::<PathBuf>("BATTLE_CONFIG_PATH") {
            match ConfigLoader::load(&path) {
                Ok(battle) => config.battle = battle,
                Err(error) => warn!(
                    target: "runtime::config",
                    path = %path.display(),
                    error = %error,
                    "Falling back to default battle config"
                ),
            }
        }

        config.seed = read_env::<u64>("BATTLE_SEED");

        if let Some(scale) = read_env::<f64>("BATTLE_PACING_SCALE") {
            config.pacing = config.pacing.scaled(scale);
        }

        if let Some(capacity) = read_env::<usize>("BATTLE_EVENT_BUFFER") {
            config.event_buffer_size = capacity.max(1);
        }

        if let Some(capacity) = read_env::<usize>("BATTLE_COMMAND_BUFFER") {
            config.command_buffer_size = capacity.max(1);
        }

        config
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scaling_keeps_backoff_positive() {
        let pacing = PacingConfig::default().scaled(0.0);
        assert_eq!(pacing.ai_think, Duration::ZERO);
        assert!(pacing.stall_backoff > Duration::ZERO);
    }

    #[test]
    fn scaling_halves_delays() {
        let pacing = PacingConfig::default().scaled(0.5);
        assert_eq!(pacing.ai_think, Duration::from_millis(400));
        assert_eq!(pacing.relock, Duration::from_millis(300));
    }
}
