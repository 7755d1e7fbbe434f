//! Observation ingestion
//!
//! Parses observation series from JSON arrays or NDJSON into typed
//! [`Observation`]s and validates them for the strict entry points.
//!
//! Input records look like `{"date": "2024-01-15", "value": 7.5, "source": "device"}`.
//! `value` may also be a string: numeric strings are parsed, and paired
//! readings such as blood pressure (`"120/80"`) contribute their first
//! (systolic) component. `date` accepts `YYYY-MM-DD` or an RFC 3339 timestamp.

use crate::error::StreakError;
use crate::types::{Observation, ObservationSource};
use chrono::{DateTime, NaiveDate};
use serde::Deserialize;

/// Observation record as it arrives from collaborators
#[derive(Debug, Clone, Deserialize)]
struct RawObservation {
    date: String,
    value: RawValue,
    #[serde(default)]
    source: Option<ObservationSource>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RawValue {
    Number(f64),
    Text(String),
}

/// Adapter for converting raw observation records to typed observations
pub struct ObservationAdapter;

impl ObservationAdapter {
    /// Parse a JSON array of observation records
    pub fn parse_array(json: &str) -> Result<Vec<Observation>, StreakError> {
        let records: Vec<RawObservation> = serde_json::from_str(json)?;
        records
            .into_iter()
            .enumerate()
            .map(|(idx, raw)| {
                to_observation(raw).map_err(|e| {
                    StreakError::ParseError(format!("record {}: {}", idx, e))
                })
            })
            .collect()
    }

    /// Parse NDJSON (one observation record per line)
    pub fn parse_ndjson(ndjson: &str) -> Result<Vec<Observation>, StreakError> {
        let mut observations = Vec::new();
        for (line_num, line) in ndjson.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            let raw: RawObservation = serde_json::from_str(trimmed).map_err(|e| {
                StreakError::ParseError(format!("Failed to parse line {}: {}", line_num + 1, e))
            })?;
            let observation = to_observation(raw).map_err(|e| {
                StreakError::ParseError(format!("Failed to parse line {}: {}", line_num + 1, e))
            })?;
            observations.push(observation);
        }
        Ok(observations)
    }

    /// Validate a batch of observations, returning only the invalid ones
    pub fn validate_observations(observations: &[Observation]) -> Vec<ValidationResult> {
        observations
            .iter()
            .enumerate()
            .filter_map(|(idx, obs)| {
                validate_observation(obs).err().map(|error| ValidationResult {
                    index: idx,
                    date: obs.date,
                    error,
                })
            })
            .collect()
    }
}

/// An observation that failed validation
#[derive(Debug)]
pub struct ValidationResult {
    pub index: usize,
    pub date: NaiveDate,
    pub error: StreakError,
}

/// Reject observations whose value cannot be compared
pub fn validate_observation(observation: &Observation) -> Result<(), StreakError> {
    if observation.value.is_finite() {
        Ok(())
    } else {
        Err(StreakError::NonFiniteValue {
            date: observation.date.to_string(),
            value: observation.value,
        })
    }
}

/// Fail on the first observation that cannot be compared
pub fn validate_observations(observations: &[Observation]) -> Result<(), StreakError> {
    observations.iter().try_for_each(validate_observation)
}

fn to_observation(raw: RawObservation) -> Result<Observation, StreakError> {
    let date = parse_date(&raw.date)?;
    let value = match raw.value {
        RawValue::Number(n) => n,
        RawValue::Text(text) => parse_reading(&text)?,
    };
    Ok(Observation {
        date,
        value,
        source: raw.source,
    })
}

/// Parse an ISO calendar date or take the date part of an RFC 3339 timestamp
pub fn parse_date(s: &str) -> Result<NaiveDate, StreakError> {
    let trimmed = s.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date);
    }
    DateTime::parse_from_rfc3339(trimmed)
        .map(|dt| dt.date_naive())
        .map_err(|_| StreakError::DateParseError(format!("'{}' is not an ISO date", s)))
}

/// Parse a textual reading; paired readings like "120/80" use the first component
pub fn parse_reading(s: &str) -> Result<f64, StreakError> {
    let primary = s.split('/').next().unwrap_or(s).trim();
    primary
        .parse::<f64>()
        .map_err(|_| StreakError::ParseError(format!("'{}' is not a numeric reading", s)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_array() {
        let json = r#"[
            {"date": "2024-01-15", "value": 7.5, "source": "device"},
            {"date": "2024-01-16", "value": "8", "source": "manual"},
            {"date": "2024-01-17T06:30:00Z", "value": 6.25}
        ]"#;

        let observations = ObservationAdapter::parse_array(json).unwrap();
        assert_eq!(observations.len(), 3);
        assert_eq!(observations[0].value, 7.5);
        assert_eq!(observations[0].source, Some(ObservationSource::Device));
        assert_eq!(observations[1].value, 8.0);
        assert_eq!(observations[1].source, Some(ObservationSource::Manual));
        assert_eq!(observations[2].date, NaiveDate::from_ymd_opt(2024, 1, 17).unwrap());
        assert_eq!(observations[2].source, None);
    }

    #[test]
    fn test_custom_source_is_preserved() {
        let json = r#"[{"date": "2024-01-15", "value": 1, "source": "oura"}]"#;
        let observations = ObservationAdapter::parse_array(json).unwrap();
        assert_eq!(
            observations[0].source,
            Some(ObservationSource::Other("oura".to_string()))
        );
        assert_eq!(observations[0].source.as_ref().unwrap().as_str(), "oura");
    }

    #[test]
    fn test_blood_pressure_uses_systolic() {
        assert_eq!(parse_reading("120/80").unwrap(), 120.0);
        assert_eq!(parse_reading(" 118 / 76 ").unwrap(), 118.0);
        assert_eq!(parse_reading("72.5").unwrap(), 72.5);
        assert!(parse_reading("high").is_err());
    }

    #[test]
    fn test_parse_ndjson() {
        let ndjson = "{\"date\":\"2024-01-15\",\"value\":10000}\n\n{\"date\":\"2024-01-16\",\"value\":8500}\n";
        let observations = ObservationAdapter::parse_ndjson(ndjson).unwrap();
        assert_eq!(observations.len(), 2);
        assert_eq!(observations[1].value, 8500.0);
    }

    #[test]
    fn test_ndjson_reports_line_number() {
        let ndjson = "{\"date\":\"2024-01-15\",\"value\":1}\n{\"date\":\"yesterday\",\"value\":1}";
        let err = ObservationAdapter::parse_ndjson(ndjson).unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            ObservationAdapter::parse_array("not json"),
            Err(StreakError::JsonError(_))
        ));
    }

    #[test]
    fn test_validate_observations() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let observations = vec![
            Observation::new(date, 1.0),
            Observation::new(date, f64::NAN),
            Observation::new(date, f64::INFINITY),
        ];

        let invalid = ObservationAdapter::validate_observations(&observations);
        assert_eq!(invalid.len(), 2);
        assert_eq!(invalid[0].index, 1);
        assert_eq!(invalid[1].index, 2);
        assert!(invalid[0].error.is_invalid_argument());

        assert!(validate_observations(&observations[..1]).is_ok());
        assert!(matches!(
            validate_observations(&observations),
            Err(StreakError::NonFiniteValue { .. })
        ));
    }
}
