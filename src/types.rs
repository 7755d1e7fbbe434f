//! Core types for the Synheart Streak engine
//!
//! This module defines the values that flow through the engine: dated
//! observations, goal definitions, the computed streak result, and the
//! insight and prediction outputs derived from it.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Provenance of an observation. Informational only, never used in computation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObservationSource {
    Manual,
    Device,
    Import,
    /// For sources not covered above, keep the original tag
    #[serde(untagged)]
    Other(String),
}

impl ObservationSource {
    pub fn as_str(&self) -> &str {
        match self {
            ObservationSource::Manual => "manual",
            ObservationSource::Device => "device",
            ObservationSource::Import => "import",
            ObservationSource::Other(name) => name.as_str(),
        }
    }
}

/// One measured value for one metric on one day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Calendar date (YYYY-MM-DD), the natural key within a series
    pub date: NaiveDate,
    /// Numeric measurement
    pub value: f64,
    /// Optional provenance tag
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<ObservationSource>,
}

impl Observation {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self {
            date,
            value,
            source: None,
        }
    }

    pub fn with_source(mut self, source: ObservationSource) -> Self {
        self.source = Some(source);
        self
    }
}

/// How a day's value is compared against the goal threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalKind {
    Minimum,
    Maximum,
    Target,
    Range,
    /// Any unrecognized kind. Evaluates as never met.
    #[serde(other)]
    Unknown,
}

impl GoalKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            GoalKind::Minimum => "minimum",
            GoalKind::Maximum => "maximum",
            GoalKind::Target => "target",
            GoalKind::Range => "range",
            GoalKind::Unknown => "unknown",
        }
    }

    /// Whether this kind expects a `{low, high}` pair rather than a scalar
    pub fn expects_range(&self) -> bool {
        matches!(self, GoalKind::Range)
    }
}

/// Goal threshold: a scalar for minimum/maximum/target, a pair for range
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Threshold {
    Scalar(f64),
    Range { low: f64, high: f64 },
}

impl Threshold {
    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            Threshold::Scalar(v) => Some(*v),
            Threshold::Range { .. } => None,
        }
    }

    pub fn as_range(&self) -> Option<(f64, f64)> {
        match self {
            Threshold::Range { low, high } => Some((*low, *high)),
            Threshold::Scalar(_) => None,
        }
    }

    pub fn is_finite(&self) -> bool {
        match self {
            Threshold::Scalar(v) => v.is_finite(),
            Threshold::Range { low, high } => low.is_finite() && high.is_finite(),
        }
    }
}

/// The success criterion a series of observations is evaluated against
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalDefinition {
    pub kind: GoalKind,
    pub threshold: Threshold,
    /// Display unit, not used in comparisons
    #[serde(default)]
    pub unit: String,
}

impl GoalDefinition {
    pub fn minimum(threshold: f64) -> Self {
        Self::scalar(GoalKind::Minimum, threshold)
    }

    pub fn maximum(threshold: f64) -> Self {
        Self::scalar(GoalKind::Maximum, threshold)
    }

    pub fn target(threshold: f64) -> Self {
        Self::scalar(GoalKind::Target, threshold)
    }

    pub fn range(low: f64, high: f64) -> Self {
        Self {
            kind: GoalKind::Range,
            threshold: Threshold::Range { low, high },
            unit: String::new(),
        }
    }

    fn scalar(kind: GoalKind, threshold: f64) -> Self {
        Self {
            kind,
            threshold: Threshold::Scalar(threshold),
            unit: String::new(),
        }
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = unit.into();
        self
    }
}

/// One day of the annotated streak history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreakDay {
    pub date: NaiveDate,
    pub achieved: bool,
    pub value: f64,
    /// Length of the met run this day belongs to (0 for unmet days)
    pub streak_count: u32,
}

/// Streak statistics computed from one observation series
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StreakResult {
    /// Consecutive met days counting back from the most recent observation
    pub current_streak: u32,
    /// Longest run of consecutive met days anywhere in the history
    pub longest_streak: u32,
    /// First day of the current streak, if any
    pub streak_start_date: Option<NaiveDate>,
    /// Most recent met day, if any
    pub last_achievement_date: Option<NaiveDate>,
    /// Percentage of observations that met the goal (0-100, 2 decimals)
    pub achievement_rate: f64,
    /// Per-day annotations, oldest first
    pub streak_history: Vec<StreakDay>,
}

/// Qualitative performance tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightLevel {
    Excellent,
    Good,
    NeedsImprovement,
}

/// Motivational insight derived from a streak result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    pub message: String,
    pub level: InsightLevel,
    pub motivational_tip: String,
    pub next_milestone: u32,
}

/// Direction of the short-term achievement trend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Up,
    Down,
}

/// Forward-looking estimate that the current streak continues
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContinuationPrediction {
    /// Heuristic probability (0-100), clamped and rounded to 2 decimals
    pub continuation_probability: f64,
    pub risk_factors: Vec<String>,
    pub recommendations: Vec<String>,
    /// Achieved fraction of the recent window, when enough history exists
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recent_achievement_rate: Option<f64>,
    /// Trend over the trend window, when enough history exists
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trend: Option<TrendDirection>,
}

/// Short-term movement of the raw metric values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueTrend {
    Up,
    Down,
    Stable,
}

/// Descriptive statistics over one observation series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSummary {
    pub count: usize,
    pub average: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub latest_value: Option<f64>,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    pub trend: ValueTrend,
    /// Missing calendar days between consecutive distinct observation dates
    pub date_gaps: u32,
}

/// Producer metadata attached to every report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportProducer {
    pub name: String,
    pub version: String,
    pub instance_id: String,
}

/// Complete analysis of one (user, metric) series against one goal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreakReport {
    pub producer: ReportProducer,
    pub computed_at_utc: String,
    pub goal: GoalDefinition,
    pub streak: StreakResult,
    pub insight: Insight,
    pub prediction: ContinuationPrediction,
    pub summary: MetricSummary,
}
