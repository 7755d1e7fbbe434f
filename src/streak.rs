//! Streak scanning
//!
//! Walks an observation series once, most recent first, and produces the
//! current streak, longest streak, achievement rate, and annotated history.
//!
//! Streaks follow list order after sorting by date. Consecutive entries are
//! not checked for calendar adjacency, so untracked days never break a streak.

use crate::goal::GoalEvaluator;
use crate::types::{GoalDefinition, GoalKind, Observation, StreakDay, StreakResult};

/// Scanner for computing streak statistics
pub struct StreakScanner {
    evaluator: GoalEvaluator,
}

impl Default for StreakScanner {
    fn default() -> Self {
        Self {
            evaluator: GoalEvaluator::default(),
        }
    }
}

impl StreakScanner {
    pub fn new(evaluator: GoalEvaluator) -> Self {
        Self { evaluator }
    }

    /// Compute streak statistics for `observations` against `goal`.
    ///
    /// Never fails: empty input yields an empty result and an unknown goal
    /// kind marks every day as not met.
    pub fn compute(&self, observations: &[Observation], goal: &GoalDefinition) -> StreakResult {
        if observations.is_empty() {
            return StreakResult::default();
        }

        if goal.kind == GoalKind::Unknown {
            tracing::warn!("goal kind is unknown; every day will be treated as not met");
        }

        // Stable sort: among equal dates the earlier input entry is scanned as more recent
        let mut sorted: Vec<&Observation> = observations.iter().collect();
        sorted.sort_by(|a, b| b.date.cmp(&a.date));

        let mut current_streak = 0u32;
        let mut current_open = true;
        let mut temp_streak = 0u32;
        let mut longest_streak = 0u32;
        let mut met_count = 0usize;
        let mut streak_start_date = None;
        let mut last_achievement_date = None;
        let mut history: Vec<StreakDay> = Vec::with_capacity(sorted.len());

        for obs in &sorted {
            let achieved = self.evaluator.is_met(obs.value, goal);

            if achieved {
                met_count += 1;
                temp_streak += 1;
                longest_streak = longest_streak.max(temp_streak);

                if last_achievement_date.is_none() {
                    last_achievement_date = Some(obs.date);
                }

                if current_open {
                    current_streak += 1;
                    // Scanning backward, so the latest match is the earliest day
                    streak_start_date = Some(obs.date);
                }
            } else {
                close_run(&mut history, temp_streak);
                temp_streak = 0;
                current_open = false;
            }

            history.push(StreakDay {
                date: obs.date,
                achieved,
                value: obs.value,
                streak_count: 0,
            });
        }
        close_run(&mut history, temp_streak);

        history.reverse();

        let achievement_rate = round2(100.0 * met_count as f64 / sorted.len() as f64);

        tracing::debug!(
            observations = sorted.len(),
            met = met_count,
            current_streak,
            longest_streak,
            "computed streak"
        );

        StreakResult {
            current_streak,
            longest_streak,
            streak_start_date,
            last_achievement_date,
            achievement_rate,
            streak_history: history,
        }
    }
}

/// Stamp the run that just ended (the trailing `len` entries) with its length
fn close_run(history: &mut [StreakDay], len: u32) {
    if len == 0 {
        return;
    }
    let start = history.len() - len as usize;
    for day in &mut history[start..] {
        day.streak_count = len;
    }
}

/// Round to two decimal places
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Compute streak statistics with the default target tolerance
pub fn compute_streak(observations: &[Observation], goal: &GoalDefinition) -> StreakResult {
    StreakScanner::default().compute(observations, goal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn day(offset: i64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + Duration::days(offset)
    }

    /// Consecutive daily observations starting 2024-01-01, oldest first
    fn series(values: &[f64]) -> Vec<Observation> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| Observation::new(day(i as i64), *v))
            .collect()
    }

    fn pattern(result: &StreakResult) -> Vec<bool> {
        result.streak_history.iter().map(|d| d.achieved).collect()
    }

    #[test]
    fn test_empty_input() {
        let result = compute_streak(&[], &GoalDefinition::minimum(8.0));
        assert_eq!(result, StreakResult::default());
        assert_eq!(result.current_streak, 0);
        assert_eq!(result.longest_streak, 0);
        assert_eq!(result.achievement_rate, 0.0);
        assert!(result.streak_history.is_empty());
        assert_eq!(result.streak_start_date, None);
        assert_eq!(result.last_achievement_date, None);
    }

    #[test]
    fn test_single_met_day() {
        let result = compute_streak(&series(&[10.0]), &GoalDefinition::minimum(8.0));
        assert_eq!(result.current_streak, 1);
        assert_eq!(result.longest_streak, 1);
        assert_eq!(result.achievement_rate, 100.0);
        assert_eq!(result.streak_start_date, Some(day(0)));
        assert_eq!(result.last_achievement_date, Some(day(0)));
    }

    #[test]
    fn test_sleep_scenario() {
        let obs = series(&[6.0, 7.0, 8.0, 6.0, 9.0, 10.0, 11.0, 9.0, 8.0, 10.0]);
        let result = compute_streak(&obs, &GoalDefinition::minimum(8.0));

        assert_eq!(
            pattern(&result),
            vec![false, false, true, false, true, true, true, true, true, true]
        );
        assert_eq!(result.current_streak, 6);
        assert_eq!(result.longest_streak, 6);
        assert_eq!(result.achievement_rate, 70.0);
        assert_eq!(result.streak_start_date, Some(day(4)));
        assert_eq!(result.last_achievement_date, Some(day(9)));

        let counts: Vec<u32> = result.streak_history.iter().map(|d| d.streak_count).collect();
        assert_eq!(counts, vec![0, 0, 1, 0, 6, 6, 6, 6, 6, 6]);
    }

    #[test]
    fn test_current_streak_truncation() {
        // D-4, D-3 met; D-2 unmet; D-1, D met
        for earlier in [[10.0, 10.0], [0.0, 0.0], [10.0, 0.0]] {
            let obs = series(&[earlier[0], earlier[1], 0.0, 10.0, 10.0]);
            let result = compute_streak(&obs, &GoalDefinition::minimum(5.0));
            assert_eq!(result.current_streak, 2);
            assert_eq!(result.streak_start_date, Some(day(3)));
        }
    }

    #[test]
    fn test_longest_streak_independent_of_recency() {
        let mut values = vec![0.0; 30];
        for v in values.iter_mut().skip(12).take(5) {
            *v = 10.0;
        }
        let result = compute_streak(&series(&values), &GoalDefinition::minimum(5.0));

        assert_eq!(result.longest_streak, 5);
        assert_eq!(result.current_streak, 0);
        assert_eq!(result.streak_start_date, None);
        assert_eq!(result.last_achievement_date, Some(day(16)));
    }

    #[test]
    fn test_unsorted_input_is_sorted_by_date() {
        let mut obs = series(&[1.0, 9.0, 9.0]);
        obs.reverse();
        let result = compute_streak(&obs, &GoalDefinition::minimum(5.0));

        let dates: Vec<NaiveDate> = result.streak_history.iter().map(|d| d.date).collect();
        assert_eq!(dates, vec![day(0), day(1), day(2)]);
        assert_eq!(result.current_streak, 2);
    }

    #[test]
    fn test_gaps_do_not_break_streak() {
        let obs = vec![
            Observation::new(day(0), 10.0),
            Observation::new(day(5), 10.0),
            Observation::new(day(20), 10.0),
        ];
        let result = compute_streak(&obs, &GoalDefinition::minimum(5.0));
        assert_eq!(result.current_streak, 3);
        assert_eq!(result.streak_start_date, Some(day(0)));
    }

    #[test]
    fn test_unknown_kind_degrades_to_unmet() {
        let goal: GoalDefinition =
            serde_json::from_str(r#"{"kind": "streaky", "threshold": 1}"#).unwrap();
        let result = compute_streak(&series(&[5.0, 5.0, 5.0]), &goal);

        assert_eq!(result.current_streak, 0);
        assert_eq!(result.longest_streak, 0);
        assert_eq!(result.achievement_rate, 0.0);
        assert_eq!(result.streak_history.len(), 3);
        assert_eq!(result.last_achievement_date, None);
    }

    #[test]
    fn test_equal_dates_keep_input_order() {
        let obs = vec![Observation::new(day(0), 10.0), Observation::new(day(0), 0.0)];
        let result = compute_streak(&obs, &GoalDefinition::minimum(5.0));

        let values: Vec<f64> = result.streak_history.iter().map(|d| d.value).collect();
        assert_eq!(values, vec![0.0, 10.0]);
        assert_eq!(result.current_streak, 1);
        assert_eq!(result.longest_streak, 1);
        assert_eq!(result.streak_start_date, Some(day(0)));
    }

    #[test]
    fn test_achievement_rate_rounding() {
        let result = compute_streak(&series(&[10.0, 0.0, 0.0]), &GoalDefinition::minimum(5.0));
        assert_eq!(result.achievement_rate, 33.33);
    }

    proptest! {
        #[test]
        fn prop_rate_independent_of_order(
            values in proptest::collection::vec(0.0f64..20.0, 1..60),
            seed in any::<u64>(),
        ) {
            let goal = GoalDefinition::minimum(10.0);
            let obs = series(&values);
            let mut shuffled = obs.clone();
            let len = shuffled.len();
            shuffled.rotate_left((seed as usize) % len);
            shuffled.reverse();

            let a = compute_streak(&obs, &goal);
            let b = compute_streak(&shuffled, &goal);
            let met = values.iter().filter(|v| **v >= 10.0).count();

            prop_assert_eq!(a.achievement_rate, b.achievement_rate);
            prop_assert_eq!(a.achievement_rate, round2(100.0 * met as f64 / values.len() as f64));
            prop_assert_eq!(a, b);
        }

        #[test]
        fn prop_same_day_entries_scan_in_input_order(
            values in proptest::collection::vec(0.0f64..20.0, 1..30),
        ) {
            let obs: Vec<Observation> = values.iter().map(|v| Observation::new(day(0), *v)).collect();
            let result = compute_streak(&obs, &GoalDefinition::minimum(10.0));

            let leading_met = values.iter().take_while(|v| **v >= 10.0).count() as u32;
            let mut chronological = values.clone();
            chronological.reverse();
            let history: Vec<f64> = result.streak_history.iter().map(|d| d.value).collect();

            prop_assert_eq!(result.current_streak, leading_met);
            prop_assert_eq!(history, chronological);
        }

        #[test]
        fn prop_longest_covers_current(values in proptest::collection::vec(0.0f64..20.0, 0..60)) {
            let result = compute_streak(&series(&values), &GoalDefinition::minimum(10.0));
            prop_assert!(result.longest_streak >= result.current_streak);
            prop_assert_eq!(result.streak_history.len(), values.len());
        }
    }
}
