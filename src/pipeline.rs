//! Pipeline orchestration
//!
//! This module provides the high-level API for Synheart Streak. It validates
//! inputs and runs every stage over one (user, metric) series:
//! goal validation → streak scan → insights → continuation prediction →
//! metric summary → report.

use crate::adapter::{validate_observations, ObservationAdapter};
use crate::config::EngineConfig;
use crate::error::StreakError;
use crate::goal::validate_goal;
use crate::insight::InsightGenerator;
use crate::prediction::ContinuationPredictor;
use crate::streak::StreakScanner;
use crate::summary::summarize;
use crate::types::{GoalDefinition, Observation, ReportProducer, StreakReport};
use crate::{PRODUCER_NAME, STREAK_VERSION};
use chrono::Utc;
use uuid::Uuid;

/// Analyze a JSON array of observations against a JSON goal definition.
///
/// # Arguments
/// * `observations_json` - JSON array of `{date, value, source?}` records
/// * `goal_json` - Goal definition JSON (`{kind, threshold, unit}`)
///
/// # Returns
/// The analysis report as a JSON string
///
/// # Example
/// ```ignore
/// let report_json = streak_report_json(
///     r#"[{"date": "2024-01-15", "value": 8.2}]"#.to_string(),
///     r#"{"kind": "minimum", "threshold": 8, "unit": "hours"}"#.to_string(),
/// )?;
/// ```
pub fn streak_report_json(
    observations_json: String,
    goal_json: String,
) -> Result<String, StreakError> {
    StreakProcessor::new().analyze_json(&observations_json, &goal_json)
}

/// Processor that runs the full analysis with a fixed configuration.
///
/// Holds no per-series state; one processor can serve any number of
/// independent (user, metric) series.
pub struct StreakProcessor {
    config: EngineConfig,
    instance_id: String,
}

impl Default for StreakProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl StreakProcessor {
    /// Create a processor with the default business rules
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    /// Create a processor with a custom configuration
    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            config,
            instance_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create a processor from a JSON configuration
    pub fn from_config_json(json: &str) -> Result<Self, StreakError> {
        Ok(Self::with_config(EngineConfig::from_json(json)?))
    }

    /// Override the producer instance ID
    pub fn with_instance_id(mut self, instance_id: String) -> Self {
        self.instance_id = instance_id;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Validate inputs and run every stage.
    ///
    /// Fails only on a goal threshold that does not fit its kind or on
    /// non-finite observation values. `goal_label` names the goal in messages;
    /// it defaults to the goal's unit, then its kind.
    pub fn analyze(
        &self,
        observations: &[Observation],
        goal: &GoalDefinition,
        goal_label: Option<&str>,
    ) -> Result<StreakReport, StreakError> {
        validate_goal(goal)?;
        validate_observations(observations)?;

        let streak = StreakScanner::default().compute(observations, goal);

        let label = goal_label
            .filter(|l| !l.trim().is_empty())
            .or_else(|| Some(goal.unit.as_str()).filter(|u| !u.trim().is_empty()))
            .unwrap_or_else(|| goal.kind.as_str());
        let insight = InsightGenerator::new(self.config.clone()).generate(&streak, label);

        let prediction =
            ContinuationPredictor::new(self.config.prediction.clone()).predict(&streak.streak_history);

        let summary = summarize(observations);
        if summary.date_gaps > 0 {
            tracing::warn!(
                date_gaps = summary.date_gaps,
                "streaks span untracked days; gaps do not break a streak"
            );
        }

        Ok(StreakReport {
            producer: ReportProducer {
                name: PRODUCER_NAME.to_string(),
                version: STREAK_VERSION.to_string(),
                instance_id: self.instance_id.clone(),
            },
            computed_at_utc: Utc::now().to_rfc3339(),
            goal: goal.clone(),
            streak,
            insight,
            prediction,
            summary,
        })
    }

    /// Analyze JSON inputs and return the report as JSON
    pub fn analyze_json(
        &self,
        observations_json: &str,
        goal_json: &str,
    ) -> Result<String, StreakError> {
        let observations = ObservationAdapter::parse_array(observations_json)?;
        let goal: GoalDefinition = serde_json::from_str(goal_json)?;
        let report = self.analyze(&observations, &goal, None)?;
        serde_json::to_string_pretty(&report).map_err(StreakError::JsonError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{InsightLevel, ValueTrend};

    fn sample_observations_json() -> &'static str {
        r#"[
            {"date": "2024-01-01", "value": 6, "source": "device"},
            {"date": "2024-01-02", "value": 7, "source": "device"},
            {"date": "2024-01-03", "value": 8, "source": "device"},
            {"date": "2024-01-04", "value": 6, "source": "device"},
            {"date": "2024-01-05", "value": 9, "source": "device"},
            {"date": "2024-01-06", "value": 10, "source": "device"},
            {"date": "2024-01-07", "value": 11, "source": "manual"},
            {"date": "2024-01-08", "value": 9, "source": "device"},
            {"date": "2024-01-09", "value": 8, "source": "device"},
            {"date": "2024-01-10", "value": 10, "source": "device"}
        ]"#
    }

    fn sleep_goal_json() -> &'static str {
        r#"{"kind": "minimum", "threshold": 8, "unit": "hours"}"#
    }

    #[test]
    fn test_streak_report_json() {
        let result = streak_report_json(
            sample_observations_json().to_string(),
            sleep_goal_json().to_string(),
        );
        assert!(result.is_ok());

        let report: serde_json::Value = serde_json::from_str(&result.unwrap()).unwrap();
        assert_eq!(report["producer"]["name"], "synheart-streak");
        assert_eq!(report["goal"]["kind"], "minimum");
        assert_eq!(report["streak"]["current_streak"], 6);
        assert_eq!(report["streak"]["longest_streak"], 6);
        assert_eq!(report["streak"]["achievement_rate"], 70.0);
        assert_eq!(report["streak"]["streak_start_date"], "2024-01-05");
        assert_eq!(report["streak"]["streak_history"].as_array().unwrap().len(), 10);
        assert_eq!(report["insight"]["level"], "good");
        assert_eq!(report["insight"]["next_milestone"], 7);
        assert_eq!(report["summary"]["count"], 10);
    }

    #[test]
    fn test_analyze_stages() {
        let observations = ObservationAdapter::parse_array(sample_observations_json()).unwrap();
        let goal = GoalDefinition::minimum(8.0).with_unit("hours");
        let processor = StreakProcessor::new().with_instance_id("test-instance".to_string());

        let report = processor.analyze(&observations, &goal, Some("sleep")).unwrap();

        assert_eq!(report.producer.instance_id, "test-instance");
        assert_eq!(report.streak.current_streak, 6);
        assert_eq!(report.insight.level, InsightLevel::Good);
        assert!(report.insight.message.contains("sleep"));
        // Last 7: 6,9,10,11,9,8,10 -> 6/7; second half of 10 at least as strong
        assert_eq!(report.prediction.continuation_probability, 100.0);
        assert!(report.prediction.risk_factors.is_empty());
        assert_eq!(report.summary.trend, ValueTrend::Up);
        assert_eq!(report.summary.date_gaps, 0);
    }

    #[test]
    fn test_label_falls_back_to_unit_then_kind() {
        let observations = ObservationAdapter::parse_array(sample_observations_json()).unwrap();
        let processor = StreakProcessor::new();

        let with_unit = processor
            .analyze(&observations, &GoalDefinition::minimum(8.0).with_unit("hours"), None)
            .unwrap();
        assert!(with_unit.insight.message.contains("hours"));

        let bare = processor
            .analyze(&observations, &GoalDefinition::minimum(8.0), Some("  "))
            .unwrap();
        assert!(bare.insight.message.contains("minimum"));
    }

    #[test]
    fn test_empty_series() {
        let report = StreakProcessor::new()
            .analyze(&[], &GoalDefinition::maximum(2000.0), None)
            .unwrap();
        assert_eq!(report.streak.current_streak, 0);
        assert_eq!(report.prediction.continuation_probability, 50.0);
        assert_eq!(report.insight.level, InsightLevel::NeedsImprovement);
        assert_eq!(report.summary.count, 0);
    }

    #[test]
    fn test_rejects_mismatched_threshold() {
        let result = streak_report_json(
            sample_observations_json().to_string(),
            r#"{"kind": "range", "threshold": 8}"#.to_string(),
        );
        assert!(matches!(result, Err(StreakError::ThresholdShapeMismatch { .. })));
    }

    #[test]
    fn test_rejects_non_finite_value() {
        let date = chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let observations = vec![Observation::new(date, f64::NEG_INFINITY)];
        let result = StreakProcessor::new().analyze(&observations, &GoalDefinition::minimum(1.0), None);
        assert!(matches!(result, Err(StreakError::NonFiniteValue { .. })));
    }

    #[test]
    fn test_unknown_kind_is_not_an_error() {
        let result = streak_report_json(
            sample_observations_json().to_string(),
            r#"{"kind": "weekly", "threshold": 8}"#.to_string(),
        )
        .unwrap();
        let report: serde_json::Value = serde_json::from_str(&result).unwrap();
        assert_eq!(report["goal"]["kind"], "unknown");
        assert_eq!(report["streak"]["achievement_rate"], 0.0);
    }

    #[test]
    fn test_config_cannot_widen_target_band() {
        let processor =
            StreakProcessor::from_config_json(r#"{"target_tolerance": 0.5}"#).unwrap();
        let date = chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let observations = vec![
            Observation::new(date, 140.0),
            Observation::new(date.succ_opt().unwrap(), 104.0),
        ];

        let report = processor
            .analyze(&observations, &GoalDefinition::target(100.0), None)
            .unwrap();
        assert_eq!(report.streak.achievement_rate, 50.0);
        assert!(!report.streak.streak_history[0].achieved);
        assert!(report.streak.streak_history[1].achieved);
    }

    #[test]
    fn test_custom_config_changes_tiers() {
        let processor =
            StreakProcessor::from_config_json(r#"{"tiers": {"good_min_streak": 7}}"#).unwrap();
        assert_eq!(processor.config().tiers.good_min_streak, 7);

        let observations = ObservationAdapter::parse_array(sample_observations_json()).unwrap();
        let report = processor
            .analyze(&observations, &GoalDefinition::minimum(8.0), None)
            .unwrap();
        assert_eq!(report.insight.level, InsightLevel::NeedsImprovement);
    }

    #[test]
    fn test_invalid_json() {
        let result = streak_report_json("not valid json".to_string(), sleep_goal_json().to_string());
        assert!(result.is_err());
    }
}
