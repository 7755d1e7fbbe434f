//! Continuation prediction
//!
//! Estimates how likely a streak is to continue from the recent achievement
//! rate and a first-half/second-half trend comparison, then collects risk
//! factors and recommendations from a small rule table.

use crate::config::{EngineConfig, PredictionConfig};
use crate::streak::round2;
use crate::types::{ContinuationPrediction, StreakDay, TrendDirection};

const INSUFFICIENT_DATA_RISK: &str = "Insufficient data for an accurate prediction";
const INSUFFICIENT_DATA_RECOMMENDATION: &str =
    "Keep logging daily to improve prediction accuracy";

/// Signals the rules are evaluated against
struct TrendSignals {
    recent_rate: f64,
    trending_up: bool,
}

/// A rule contributing one risk factor and one recommendation when it fires
struct PredictionRule {
    applies: fn(&TrendSignals, &PredictionConfig) -> bool,
    risk: &'static str,
    recommendation: &'static str,
}

fn is_inconsistent(signals: &TrendSignals, config: &PredictionConfig) -> bool {
    signals.recent_rate < config.inconsistency_threshold
}

fn is_declining(signals: &TrendSignals, _config: &PredictionConfig) -> bool {
    !signals.trending_up
}

const RULES: &[PredictionRule] = &[
    PredictionRule {
        applies: is_inconsistent,
        risk: "Recent inconsistency in meeting your goal",
        recommendation: "Set smaller, more achievable targets to rebuild momentum",
    },
    PredictionRule {
        applies: is_declining,
        risk: "Declining trend in goal achievement",
        recommendation: "Review your routine for obstacles that are getting in the way",
    },
];

/// Predictor for streak continuation
pub struct ContinuationPredictor {
    config: PredictionConfig,
}

impl Default for ContinuationPredictor {
    fn default() -> Self {
        Self::new(EngineConfig::default().prediction)
    }
}

impl ContinuationPredictor {
    pub fn new(config: PredictionConfig) -> Self {
        Self { config }
    }

    /// Predict continuation from a chronological (oldest first) history
    pub fn predict(&self, history: &[StreakDay]) -> ContinuationPrediction {
        if history.len() < self.config.min_history {
            return ContinuationPrediction {
                continuation_probability: self.config.neutral_probability,
                risk_factors: vec![INSUFFICIENT_DATA_RISK.to_string()],
                recommendations: vec![INSUFFICIENT_DATA_RECOMMENDATION.to_string()],
                recent_achievement_rate: None,
                trend: None,
            };
        }

        let recent_rate = achieved_fraction(tail(history, self.config.recent_window));
        let trending_up = self.is_trending_up(tail(history, self.config.trend_window));
        let signals = TrendSignals {
            recent_rate,
            trending_up,
        };

        let bonus = if trending_up {
            self.config.trend_bonus
        } else {
            0.0
        };
        let continuation_probability = round2((recent_rate * 100.0 + bonus).clamp(0.0, 100.0));

        let mut risk_factors = Vec::new();
        let mut recommendations = Vec::new();
        for rule in RULES {
            if (rule.applies)(&signals, &self.config) {
                risk_factors.push(rule.risk.to_string());
                recommendations.push(rule.recommendation.to_string());
            }
        }

        tracing::debug!(
            recent_rate,
            trending_up,
            continuation_probability,
            "predicted continuation"
        );

        ContinuationPrediction {
            continuation_probability,
            risk_factors,
            recommendations,
            recent_achievement_rate: Some(recent_rate),
            trend: Some(if trending_up {
                TrendDirection::Up
            } else {
                TrendDirection::Down
            }),
        }
    }

    /// Second half at least as strong as the first half
    fn is_trending_up(&self, window: &[StreakDay]) -> bool {
        if window.len() < self.config.min_trend_sample {
            return true;
        }
        let (first, second) = window.split_at(window.len() / 2);
        achieved_fraction(second) >= achieved_fraction(first)
    }
}

fn tail(history: &[StreakDay], n: usize) -> &[StreakDay] {
    &history[history.len().saturating_sub(n)..]
}

fn achieved_fraction(days: &[StreakDay]) -> f64 {
    if days.is_empty() {
        return 0.0;
    }
    days.iter().filter(|d| d.achieved).count() as f64 / days.len() as f64
}

/// Predict continuation with the default settings
pub fn predict_continuation(history: &[StreakDay]) -> ContinuationPrediction {
    ContinuationPredictor::default().predict(history)
}
