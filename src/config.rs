//! Tunable thresholds for trend classification.

use clap::Args;
use thiserror::Error;

pub const DEFAULT_MIN_SESSIONS: usize = 2;
pub const DEFAULT_MIN_TIMED_VALUES: usize = 2;
pub const DEFAULT_TREND_THRESHOLD_PCT: f64 = 10.0;
pub const DEFAULT_MIN_QUALITATIVE_SUCCESSES: usize = 2;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("trend threshold must be a positive finite percentage, got {0}")]
    InvalidThreshold(f64),
    #[error("{field} must be at least 1")]
    ZeroMinimum { field: &'static str },
}

#[derive(Debug, Clone, PartialEq, Args)]
pub struct InsightConfig {
    /// Sessions a student needs before any trend is reported
    #[arg(
        long,
        global = true,
        env = "INSIGHT_MIN_SESSIONS",
        default_value_t = DEFAULT_MIN_SESSIONS,
    )]
    pub min_sessions: usize,

    /// Timed results needed to use the timed channel
    #[arg(
        long = "min-timed",
        global = true,
        env = "INSIGHT_MIN_TIMED",
        default_value_t = DEFAULT_MIN_TIMED_VALUES,
    )]
    pub min_timed_values: usize,

    /// Percentage change in time that counts as a trend
    #[arg(
        long = "trend-threshold",
        global = true,
        env = "INSIGHT_TREND_THRESHOLD",
        default_value_t = DEFAULT_TREND_THRESHOLD_PCT,
    )]
    pub trend_threshold_pct: f64,

    /// Successful qualitative results needed for a consistent label
    #[arg(
        long = "min-successes",
        global = true,
        env = "INSIGHT_MIN_SUCCESSES",
        default_value_t = DEFAULT_MIN_QUALITATIVE_SUCCESSES,
    )]
    pub min_qualitative_successes: usize,
}

impl Default for InsightConfig {
    fn default() -> Self {
        Self {
            min_sessions: DEFAULT_MIN_SESSIONS,
            min_timed_values: DEFAULT_MIN_TIMED_VALUES,
            trend_threshold_pct: DEFAULT_TREND_THRESHOLD_PCT,
            min_qualitative_successes: DEFAULT_MIN_QUALITATIVE_SUCCESSES,
        }
    }
}

impl InsightConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.trend_threshold_pct.is_finite() || self.trend_threshold_pct <= 0.0 {
            return Err(ConfigError::InvalidThreshold(self.trend_threshold_pct));
        }
        if self.min_sessions == 0 {
            return Err(ConfigError::ZeroMinimum {
                field: "min_sessions",
            });
        }
        if self.min_timed_values == 0 {
            return Err(ConfigError::ZeroMinimum {
                field: "min_timed_values",
            });
        }
        if self.min_qualitative_successes == 0 {
            return Err(ConfigError::ZeroMinimum {
                field: "min_qualitative_successes",
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = InsightConfig::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.trend_threshold_pct, 10.0);
        assert_eq!(config.min_sessions, 2);
    }

    #[test]
    fn rejects_bad_threshold() {
        let config = InsightConfig {
            trend_threshold_pct: f64::NAN,
            ..InsightConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidThreshold(_))
        ));

        let config = InsightConfig {
            trend_threshold_pct: -5.0,
            ..InsightConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::InvalidThreshold(-5.0)));
    }

    #[test]
    fn rejects_zero_minimums() {
        let config = InsightConfig {
            min_timed_values: 0,
            ..InsightConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::ZeroMinimum {
                field: "min_timed_values"
            })
        );
    }
}
