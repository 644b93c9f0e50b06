//! Controller configuration.
//!
//! Pacing delays exist only so the player can follow reveals. They are data,
//! loaded from the environment and zeroed in tests.

use std::time::Duration;
use thiserror::Error;

/// Longest delay the controller accepts for any phase.
pub const MAX_DELAY: Duration = Duration::from_secs(60);

/// Per-phase pacing delays.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PhaseDelays {
    /// Minimum time the loading screen stays up.
    pub min_loading: Duration,
    /// After the deck was built.
    pub shuffle: Duration,
    /// Between stand-and-rewards and the outcome display.
    pub rewards_settle: Duration,
    /// Main hand outcome display.
    pub main_stand: Duration,
    /// Between finished split hands.
    pub split_stand: Duration,
    /// Natural 21 on a split hand.
    pub split_nat21: Duration,
    /// Split aces moving through the queue.
    pub split_ace: Duration,
    /// Each settled split hand.
    pub split_outcome: Duration,
    /// Out-of-tokens notice.
    pub out_of_tokens: Duration,
    /// New tokens granted notice.
    pub restart: Duration,
    /// Reloading screen.
    pub reloading: Duration,
    /// Wait on the error screen before the forced restart.
    pub error_retry: Duration,
}

impl Default for PhaseDelays {
    fn default() -> Self {
        Self {
            min_loading: Duration::from_millis(700),
            shuffle: Duration::from_millis(1000),
            rewards_settle: Duration::from_millis(200),
            main_stand: Duration::from_millis(4000),
            split_stand: Duration::from_millis(2000),
            split_nat21: Duration::from_millis(2000),
            split_ace: Duration::from_millis(2000),
            split_outcome: Duration::from_millis(4000),
            out_of_tokens: Duration::from_millis(5000),
            restart: Duration::from_millis(5000),
            reloading: Duration::from_millis(5000),
            error_retry: Duration::from_millis(5000),
        }
    }
}

impl PhaseDelays {
    /// No pacing at all.
    #[must_use]
    pub const fn zero() -> Self {
        Self {
            min_loading: Duration::ZERO,
            shuffle: Duration::ZERO,
            rewards_settle: Duration::ZERO,
            main_stand: Duration::ZERO,
            split_stand: Duration::ZERO,
            split_nat21: Duration::ZERO,
            split_ace: Duration::ZERO,
            split_outcome: Duration::ZERO,
            out_of_tokens: Duration::ZERO,
            restart: Duration::ZERO,
            reloading: Duration::ZERO,
            error_retry: Duration::ZERO,
        }
    }

    /// Defaults, overridden by `RB_DELAY_<NAME>_MS` variables.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let ms = |key: &str, default: Duration| {
            Duration::from_millis(parse_env_or(key, default.as_millis() as u64))
        };
        Self {
            min_loading: ms("RB_DELAY_MIN_LOADING_MS", defaults.min_loading),
            shuffle: ms("RB_DELAY_SHUFFLE_MS", defaults.shuffle),
            rewards_settle: ms("RB_DELAY_REWARDS_SETTLE_MS", defaults.rewards_settle),
            main_stand: ms("RB_DELAY_MAIN_STAND_MS", defaults.main_stand),
            split_stand: ms("RB_DELAY_SPLIT_STAND_MS", defaults.split_stand),
            split_nat21: ms("RB_DELAY_SPLIT_NAT21_MS", defaults.split_nat21),
            split_ace: ms("RB_DELAY_SPLIT_ACE_MS", defaults.split_ace),
            split_outcome: ms("RB_DELAY_SPLIT_OUTCOME_MS", defaults.split_outcome),
            out_of_tokens: ms("RB_DELAY_OUT_OF_TOKENS_MS", defaults.out_of_tokens),
            restart: ms("RB_DELAY_RESTART_MS", defaults.restart),
            reloading: ms("RB_DELAY_RELOADING_MS", defaults.reloading),
            error_retry: ms("RB_DELAY_ERROR_RETRY_MS", defaults.error_retry),
        }
    }

    fn named(&self) -> [(&'static str, Duration); 12] {
        [
            ("RB_DELAY_MIN_LOADING_MS", self.min_loading),
            ("RB_DELAY_SHUFFLE_MS", self.shuffle),
            ("RB_DELAY_REWARDS_SETTLE_MS", self.rewards_settle),
            ("RB_DELAY_MAIN_STAND_MS", self.main_stand),
            ("RB_DELAY_SPLIT_STAND_MS", self.split_stand),
            ("RB_DELAY_SPLIT_NAT21_MS", self.split_nat21),
            ("RB_DELAY_SPLIT_ACE_MS", self.split_ace),
            ("RB_DELAY_SPLIT_OUTCOME_MS", self.split_outcome),
            ("RB_DELAY_OUT_OF_TOKENS_MS", self.out_of_tokens),
            ("RB_DELAY_RESTART_MS", self.restart),
            ("RB_DELAY_RELOADING_MS", self.reloading),
            ("RB_DELAY_ERROR_RETRY_MS", self.error_retry),
        ]
    }

    /// Rejects delays above [`MAX_DELAY`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (var, delay) in self.named() {
            if delay > MAX_DELAY {
                return Err(ConfigError::Invalid {
                    var: var.to_string(),
                    reason: format!("Must be at most {} ms", MAX_DELAY.as_millis()),
                });
            }
        }
        Ok(())
    }
}

/// Controller settings.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ControllerConfig {
    pub delays: PhaseDelays,
}

impl ControllerConfig {
    /// Configuration without any pacing.
    #[must_use]
    pub const fn immediate() -> Self {
        Self {
            delays: PhaseDelays::zero(),
        }
    }

    #[must_use]
    pub fn from_env() -> Self {
        Self {
            delays: PhaseDelays::from_env(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.delays.validate()
    }
}

/// Configuration error types
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

/// Helper to parse environment variable with default fallback
pub fn parse_env_or<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_pacing() {
        let delays = PhaseDelays::default();
        assert_eq!(delays.min_loading, Duration::from_millis(700));
        assert_eq!(delays.rewards_settle, Duration::from_millis(200));
        assert_eq!(delays.main_stand, Duration::from_secs(4));
        assert_eq!(delays.error_retry, Duration::from_secs(5));
        assert!(delays.validate().is_ok());
    }

    #[test]
    fn zero_is_valid() {
        assert!(ControllerConfig::immediate().validate().is_ok());
    }

    #[test]
    fn overlong_delay_is_rejected() {
        let delays = PhaseDelays {
            reloading: Duration::from_secs(61),
            ..PhaseDelays::default()
        };
        let err = delays.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref var, .. } if var == "RB_DELAY_RELOADING_MS"));
    }

    #[test]
    fn config_error_display() {
        let err = ConfigError::Invalid {
            var: "RB_DELAY_SHUFFLE_MS".to_string(),
            reason: "Must be at most 60000 ms".to_string(),
        };
        assert!(err.to_string().contains("RB_DELAY_SHUFFLE_MS"));
    }
}
