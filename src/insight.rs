//! Insight generation
//!
//! Maps streak statistics to a performance tier, a message, a tip, and the
//! next milestone to aim for.

use crate::config::EngineConfig;
use crate::types::{Insight, InsightLevel, StreakResult};

const EXCELLENT_TIP: &str =
    "Keep up the amazing work! Consistency is the key to lasting health improvements.";
const GOOD_TIP: &str = "You're building a great habit. Try to keep the momentum going!";
const NEEDS_IMPROVEMENT_TIP: &str =
    "Small consistent steps lead to big changes. Focus on reaching your goal today.";

/// Generator for motivational insights
pub struct InsightGenerator {
    config: EngineConfig,
}

impl Default for InsightGenerator {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl InsightGenerator {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Build the insight for `result`, naming the goal with `goal_label`
    pub fn generate(&self, result: &StreakResult, goal_label: &str) -> Insight {
        let streak = result.current_streak;
        let level = self.level(result);

        let (message, tip) = match level {
            InsightLevel::Excellent => (
                format!(
                    "Excellent! You've met your {goal_label} goal {streak} days in a row!"
                ),
                EXCELLENT_TIP,
            ),
            InsightLevel::Good => (
                format!("Good progress! You're on a {streak}-day {goal_label} streak."),
                GOOD_TIP,
            ),
            InsightLevel::NeedsImprovement if streak > 0 => (
                format!("You're on a {streak}-day {goal_label} streak. Every day counts!"),
                NEEDS_IMPROVEMENT_TIP,
            ),
            InsightLevel::NeedsImprovement => (
                format!("Start a new {goal_label} streak today!"),
                NEEDS_IMPROVEMENT_TIP,
            ),
        };

        Insight {
            message,
            level,
            motivational_tip: tip.to_string(),
            next_milestone: self.next_milestone(streak),
        }
    }

    /// Tier for `result`; first matching rule wins
    pub fn level(&self, result: &StreakResult) -> InsightLevel {
        let tiers = &self.config.tiers;
        if result.current_streak >= tiers.excellent_min_streak
            && result.achievement_rate >= tiers.excellent_min_rate
        {
            InsightLevel::Excellent
        } else if result.current_streak >= tiers.good_min_streak
            && result.achievement_rate >= tiers.good_min_rate
        {
            InsightLevel::Good
        } else {
            InsightLevel::NeedsImprovement
        }
    }

    /// Smallest checkpoint strictly above `current_streak`.
    ///
    /// Past the last checkpoint, the next step multiple strictly above
    /// `current_streak + 1`.
    pub fn next_milestone(&self, current_streak: u32) -> u32 {
        if let Some(checkpoint) = self
            .config
            .milestone_checkpoints
            .iter()
            .copied()
            .find(|c| *c > current_streak)
        {
            return checkpoint;
        }

        let step = self.config.milestone_step.max(1);
        (current_streak.saturating_add(1) / step + 1).saturating_mul(step)
    }
}

/// Generate an insight with the default tiers and milestones
pub fn generate_insights(result: &StreakResult, goal_label: &str) -> Insight {
    InsightGenerator::default().generate(result, goal_label)
}
