//! Goal predicate evaluation
//!
//! Decides whether a single day's value met a goal, and validates goal
//! definitions for the strict entry points.

use crate::config::TARGET_TOLERANCE;
use crate::error::StreakError;
use crate::types::{GoalDefinition, GoalKind, Threshold};

/// Evaluator for goal predicates
pub struct GoalEvaluator {
    target_tolerance: f64,
}

impl Default for GoalEvaluator {
    fn default() -> Self {
        Self::new(TARGET_TOLERANCE)
    }
}

impl GoalEvaluator {
    pub fn new(target_tolerance: f64) -> Self {
        Self { target_tolerance }
    }

    /// Whether `value` meets `goal`.
    ///
    /// Total: an unknown kind or a threshold shaped for another kind is never met.
    pub fn is_met(&self, value: f64, goal: &GoalDefinition) -> bool {
        match (goal.kind, goal.threshold) {
            (GoalKind::Minimum, Threshold::Scalar(threshold)) => value >= threshold,
            (GoalKind::Maximum, Threshold::Scalar(threshold)) => value <= threshold,
            // A zero target collapses the band to exact equality
            (GoalKind::Target, Threshold::Scalar(threshold)) => {
                (value - threshold).abs() <= threshold * self.target_tolerance
            }
            (GoalKind::Range, Threshold::Range { low, high }) => low <= value && value <= high,
            _ => false,
        }
    }
}

/// Whether `value` meets `goal` using the fixed 5% target tolerance
pub fn is_goal_met(value: f64, goal: &GoalDefinition) -> bool {
    GoalEvaluator::default().is_met(value, goal)
}

/// Reject goal definitions that cannot be meaningfully compared.
///
/// Unknown kinds pass: they degrade to "never met" rather than failing.
pub fn validate_goal(goal: &GoalDefinition) -> Result<(), StreakError> {
    if !goal.threshold.is_finite() {
        return Err(StreakError::NonFiniteThreshold);
    }

    match (goal.kind, goal.threshold) {
        (GoalKind::Unknown, _) => Ok(()),
        (GoalKind::Range, Threshold::Range { low, high }) => {
            if low > high {
                Err(StreakError::InvalidRange { low, high })
            } else {
                Ok(())
            }
        }
        (GoalKind::Range, Threshold::Scalar(_)) => Err(StreakError::ThresholdShapeMismatch {
            kind: goal.kind.as_str().to_string(),
            expected: "a {low, high} pair".to_string(),
        }),
        (_, Threshold::Range { .. }) => Err(StreakError::ThresholdShapeMismatch {
            kind: goal.kind.as_str().to_string(),
            expected: "a single number".to_string(),
        }),
        _ => Ok(()),
    }
}
