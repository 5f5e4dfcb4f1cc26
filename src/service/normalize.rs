use crate::error::{ReconcileError, Result};
use crate::models::{CountRecord, RawCountRecord, UNKNOWN_WAREHOUSE};
use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;
use std::str::FromStr;

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// Read a `cycle_date` value. Only unambiguous ISO forms are accepted;
/// slash-separated dates are rejected because day and month can swap.
pub fn parse_cycle_date(value: &Value) -> Option<NaiveDate> {
    let text = value.as_str()?.trim();
    if let Ok(date) = NaiveDate::parse_from_str(text, DATE_FORMAT) {
        return Some(date);
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
        return Some(ts.date_naive());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .map(|ts| ts.date())
}

/// Coerce the `cycle_date` of every record. One bad date fails the whole set.
pub fn coerce_cycle_dates(raws: &[RawCountRecord]) -> Result<Vec<NaiveDate>> {
    raws.iter()
        .enumerate()
        .map(|(index, raw)| record_date(raw, index))
        .collect()
}

/// Normalize one raw record into a [`CountRecord`]
pub fn normalize_record(raw: &RawCountRecord, index: usize) -> Result<CountRecord> {
    let cycle_date = record_date(raw, index)?;
    normalize_dated(raw, index, cycle_date)
}

/// Normalize a batch. Dates are checked for every record before any other
/// field so a malformed date always surfaces as `DataFormat`.
pub fn normalize_records(raws: &[RawCountRecord]) -> Result<Vec<CountRecord>> {
    let dates = coerce_cycle_dates(raws)?;
    raws.iter()
        .zip(dates)
        .enumerate()
        .map(|(index, (raw, date))| normalize_dated(raw, index, date))
        .collect()
}

/// Normalize a record whose `cycle_date` was already coerced
pub(crate) fn normalize_dated(
    raw: &RawCountRecord,
    index: usize,
    cycle_date: NaiveDate,
) -> Result<CountRecord> {
    let item_id = text_field(raw, "item_id").ok_or(ReconcileError::MissingField {
        field: "item_id",
        index,
    })?;
    let location = text_field(raw, "location").ok_or(ReconcileError::MissingField {
        field: "location",
        index,
    })?;

    let system_count = numeric_field(raw, "system_count");
    let actual_count = numeric_field(raw, "actual_count");
    let variance = match numeric_field(raw, "variance") {
        Some(v) => v,
        None => match (&system_count, &actual_count) {
            (Some(system), Some(actual)) => actual - system,
            _ => {
                return Err(ReconcileError::MissingField {
                    field: "variance",
                    index,
                })
            }
        },
    };

    Ok(CountRecord {
        item_id,
        description: text_field(raw, "description").unwrap_or_default(),
        location,
        warehouse: text_field(raw, "warehouse").unwrap_or_else(|| UNKNOWN_WAREHOUSE.to_string()),
        unit: text_field(raw, "unit").unwrap_or_default(),
        system_count,
        actual_count,
        variance,
        cycle_date,
        notes: text_field(raw, "notes").unwrap_or_default(),
    })
}

fn record_date(raw: &RawCountRecord, index: usize) -> Result<NaiveDate> {
    let value = raw.get("cycle_date").unwrap_or(&Value::Null);
    parse_cycle_date(value).ok_or_else(|| ReconcileError::DataFormat {
        index,
        value: value.to_string(),
    })
}

/// Non-empty text; numeric ids are accepted as their decimal form
fn text_field(raw: &RawCountRecord, key: &str) -> Option<String> {
    match raw.get(key)? {
        Value::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn numeric_field(raw: &RawCountRecord, key: &str) -> Option<BigDecimal> {
    match raw.get(key)? {
        Value::Number(n) => BigDecimal::from_str(&n.to_string()).ok(),
        Value::String(s) => BigDecimal::from_str(s.trim()).ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: Value) -> RawCountRecord {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_parse_cycle_date_forms() {
        let expected = NaiveDate::from_ymd_opt(2025, 3, 4).unwrap();
        assert_eq!(parse_cycle_date(&json!("2025-03-04")), Some(expected));
        assert_eq!(parse_cycle_date(&json!("2025-03-04T10:15:00Z")), Some(expected));
        assert_eq!(parse_cycle_date(&json!("2025-03-04T10:15:00+02:00")), Some(expected));
        assert_eq!(parse_cycle_date(&json!("2025-03-04 10:15:00")), Some(expected));
        assert_eq!(parse_cycle_date(&json!("2025-03-04T10:15:00.250")), Some(expected));
    }

    #[test]
    fn test_parse_cycle_date_rejects_ambiguous() {
        assert_eq!(parse_cycle_date(&json!("03/04/2025")), None);
        assert_eq!(parse_cycle_date(&json!("yesterday")), None);
        assert_eq!(parse_cycle_date(&json!(20250304)), None);
        assert_eq!(parse_cycle_date(&Value::Null), None);
    }

    #[test]
    fn test_normalize_defaults_optional_fields() {
        let rec = normalize_record(
            &raw(json!({
                "item_id": "A100",
                "location": "L1",
                "variance": 5,
                "cycle_date": "2025-03-04"
            })),
            0,
        )
        .unwrap();
        assert_eq!(rec.warehouse, "Unknown");
        assert_eq!(rec.unit, "");
        assert_eq!(rec.description, "");
        assert_eq!(rec.notes, "");
        assert_eq!(rec.variance, BigDecimal::from(5));
    }

    #[test]
    fn test_normalize_mixed_types() {
        let rec = normalize_record(
            &raw(json!({
                "item_id": 100234,
                "location": " B-01 ",
                "warehouse": "North",
                "unit": "EA",
                "variance": "-2.5",
                "system_count": "10",
                "actual_count": 7.5,
                "cycle_date": "2025-03-04 08:00:00"
            })),
            3,
        )
        .unwrap();
        assert_eq!(rec.item_id, "100234");
        assert_eq!(rec.location, "B-01");
        assert_eq!(rec.warehouse, "North");
        assert_eq!(rec.variance, BigDecimal::from_str("-2.5").unwrap());
        assert_eq!(rec.system_count, Some(BigDecimal::from(10)));
    }

    #[test]
    fn test_variance_derived_from_counts() {
        let rec = normalize_record(
            &raw(json!({
                "item_id": "A100",
                "location": "L2",
                "system_count": 8,
                "actual_count": 3,
                "cycle_date": "2025-03-04"
            })),
            0,
        )
        .unwrap();
        assert_eq!(rec.variance, BigDecimal::from(-5));
    }

    #[test]
    fn test_missing_required_fields() {
        let err = normalize_record(
            &raw(json!({"location": "L1", "variance": 1, "cycle_date": "2025-03-04"})),
            2,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ReconcileError::MissingField { field: "item_id", index: 2 }
        ));

        let err = normalize_record(
            &raw(json!({"item_id": "A", "location": "  ", "variance": 1, "cycle_date": "2025-03-04"})),
            0,
        )
        .unwrap_err();
        assert!(matches!(err, ReconcileError::MissingField { field: "location", .. }));

        let err = normalize_record(
            &raw(json!({"item_id": "A", "location": "L1", "system_count": 4, "cycle_date": "2025-03-04"})),
            0,
        )
        .unwrap_err();
        assert!(matches!(err, ReconcileError::MissingField { field: "variance", .. }));
    }

    #[test]
    fn test_bad_date_fails_whole_batch() {
        let raws = vec![
            raw(json!({"item_id": "A", "location": "L1", "variance": 1, "cycle_date": "2025-03-04"})),
            raw(json!({"location": "L2", "variance": 1, "cycle_date": "04.03.2025"})),
        ];
        // The date problem wins over the missing item_id on the same record.
        let err = normalize_records(&raws).unwrap_err();
        assert!(matches!(err, ReconcileError::DataFormat { index: 1, .. }));
    }
}
