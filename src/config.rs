//! Engine configuration
//!
//! The tunable business rules live in [`EngineConfig`]. The defaults are the
//! product rules; a config can be persisted and reloaded as JSON. The target
//! tolerance is a fixed constant and cannot be overridden.

use crate::error::StreakError;
use serde::{Deserialize, Serialize};

/// Relative tolerance around a `target` threshold (5%). Fixed, not part of [`EngineConfig`].
pub const TARGET_TOLERANCE: f64 = 0.05;

/// Fixed milestone checkpoints before the open-ended step
pub const MILESTONE_CHECKPOINTS: [u32; 4] = [7, 14, 30, 90];

/// Milestone spacing past the last checkpoint
pub const MILESTONE_STEP: u32 = 30;

/// Probability bonus applied when the achievement trend is not declining
pub const TREND_BONUS: f64 = 15.0;

/// Tunables for the streak, insight, and prediction stages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Ordered milestone checkpoints
    pub milestone_checkpoints: Vec<u32>,
    /// Milestone spacing once the last checkpoint is reached
    pub milestone_step: u32,
    /// Tier thresholds
    pub tiers: TierThresholds,
    /// Continuation predictor settings
    pub prediction: PredictionConfig,
}

/// Minimum streak and achievement rate for each insight tier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TierThresholds {
    pub excellent_min_streak: u32,
    pub excellent_min_rate: f64,
    pub good_min_streak: u32,
    pub good_min_rate: f64,
}

/// Settings for the continuation predictor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictionConfig {
    /// Histories shorter than this get the neutral estimate
    pub min_history: usize,
    /// Number of most recent entries for the recent achievement rate
    pub recent_window: usize,
    /// Number of most recent entries for the trend comparison
    pub trend_window: usize,
    /// Below this many entries the trend is assumed up
    pub min_trend_sample: usize,
    /// Bonus added when trending up
    pub trend_bonus: f64,
    /// Probability returned for short histories
    pub neutral_probability: f64,
    /// Recent rate below which inconsistency is flagged (0-1)
    pub inconsistency_threshold: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            milestone_checkpoints: MILESTONE_CHECKPOINTS.to_vec(),
            milestone_step: MILESTONE_STEP,
            tiers: TierThresholds::default(),
            prediction: PredictionConfig::default(),
        }
    }
}

impl Default for TierThresholds {
    fn default() -> Self {
        Self {
            excellent_min_streak: 7,
            excellent_min_rate: 80.0,
            good_min_streak: 3,
            good_min_rate: 60.0,
        }
    }
}

impl Default for PredictionConfig {
    fn default() -> Self {
        Self {
            min_history: 7,
            recent_window: 7,
            trend_window: 14,
            min_trend_sample: 4,
            trend_bonus: TREND_BONUS,
            neutral_probability: 50.0,
            inconsistency_threshold: 0.6,
        }
    }
}

impl EngineConfig {
    /// Check that the configuration can drive the engine
    pub fn validate(&self) -> Result<(), StreakError> {
        if self.milestone_checkpoints.is_empty() {
            return Err(StreakError::ConfigError(
                "milestone_checkpoints must not be empty".to_string(),
            ));
        }
        if self.milestone_checkpoints.windows(2).any(|w| w[0] >= w[1]) {
            return Err(StreakError::ConfigError(
                "milestone_checkpoints must be strictly increasing".to_string(),
            ));
        }
        if self.milestone_step == 0 {
            return Err(StreakError::ConfigError(
                "milestone_step must be positive".to_string(),
            ));
        }

        let p = &self.prediction;
        if p.recent_window == 0 || p.trend_window == 0 {
            return Err(StreakError::ConfigError(
                "prediction windows must be positive".to_string(),
            ));
        }
        if p.min_history < p.recent_window {
            return Err(StreakError::ConfigError(format!(
                "min_history ({}) must cover recent_window ({})",
                p.min_history, p.recent_window
            )));
        }
        if !(0.0..=1.0).contains(&p.inconsistency_threshold) {
            return Err(StreakError::ConfigError(
                "inconsistency_threshold must be within 0-1".to_string(),
            ));
        }
        Ok(())
    }

    /// Load a configuration from JSON and validate it
    pub fn from_json(json: &str) -> Result<Self, StreakError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the configuration to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
