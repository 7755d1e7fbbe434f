//! Metric summary
//!
//! Descriptive statistics for one observation series: average, extremes,
//! latest reading, a last-two-values trend, and a count of calendar gaps.

use crate::types::{MetricSummary, Observation, ValueTrend};

/// Relative change between the last two values below which the trend is stable
pub const STABLE_CHANGE_RATIO: f64 = 0.05;

/// Summarize `observations` (any order; summarized chronologically)
pub fn summarize(observations: &[Observation]) -> MetricSummary {
    let mut sorted: Vec<&Observation> = observations.iter().collect();
    sorted.sort_by(|a, b| a.date.cmp(&b.date));

    let values: Vec<f64> = sorted.iter().map(|o| o.value).collect();

    let average = if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    };

    let min = values.iter().copied().reduce(f64::min);
    let max = values.iter().copied().reduce(f64::max);
    let date_gaps = count_date_gaps(&sorted);

    if date_gaps > 0 {
        tracing::debug!(date_gaps, "observation series has calendar gaps");
    }

    MetricSummary {
        count: values.len(),
        average,
        min,
        max,
        latest_value: values.last().copied(),
        first_date: sorted.first().map(|o| o.date),
        last_date: sorted.last().map(|o| o.date),
        trend: value_trend(&values),
        date_gaps,
    }
}

/// Trend of the last two values; stable when the change is under 5% of the earlier
/// value's magnitude, so negative readings get a band too
pub fn value_trend(values: &[f64]) -> ValueTrend {
    let [.., previous, last] = values else {
        return ValueTrend::Stable;
    };

    let diff = last - previous;
    if diff.abs() < STABLE_CHANGE_RATIO * previous.abs() {
        ValueTrend::Stable
    } else if diff > 0.0 {
        ValueTrend::Up
    } else {
        ValueTrend::Down
    }
}

/// Missing calendar days between consecutive distinct dates of a sorted series
fn count_date_gaps(sorted: &[&Observation]) -> u32 {
    sorted
        .windows(2)
        .map(|pair| (pair[1].date - pair[0].date).num_days())
        .filter(|days| *days > 1)
        .map(|days| (days - 1) as u32)
        .sum()
}
