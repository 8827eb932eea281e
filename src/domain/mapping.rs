//! # Report Builders
//!
//! Pure, deterministic mappings from VAST API payloads to [`Report`]s.
//! The same payload always yields the same report; nothing here performs
//! I/O or mutates its inputs.

use chrono::{DateTime, Datelike, Utc};

use crate::domain::entities::{Report, Value};
use crate::domain::errors::{JobError, Result};
use crate::domain::models::{Capacity, CapacityData, Quota};

/// Raw metrics payload: an ordered mapping of metric name to scalar value.
pub type MetricsPayload = serde_json::Map<String, serde_json::Value>;

/// Derives the cluster-level metrics payload from a capacity response by
/// zipping `keys` with `root_data`.
pub fn metrics_payload(capacity: &Capacity) -> Result<MetricsPayload> {
    if capacity.keys.len() != capacity.root_data.len() {
        return Err(JobError::MalformedPayload(format!(
            "capacity keys/root_data length mismatch ({} vs {})",
            capacity.keys.len(),
            capacity.root_data.len()
        )));
    }
    let mut payload = MetricsPayload::new();
    for (key, value) in capacity.keys.iter().zip(capacity.root_data.iter()) {
        payload.insert(key.clone(), serde_json::Value::from(*value));
    }
    Ok(payload)
}

/// Builds the one-row summary report from a flat metrics payload.
///
/// Columns are the payload keys in order. Values must be scalars.
pub fn summary_report(payload: &MetricsPayload) -> Result<Report> {
    if payload.is_empty() {
        return Err(JobError::MalformedPayload(
            "metrics payload is empty".to_string(),
        ));
    }
    let mut columns = Vec::with_capacity(payload.len());
    let mut row = Vec::with_capacity(payload.len());
    for (key, value) in payload {
        columns.push(key.clone());
        row.push(scalar_value(key, value)?);
    }
    Ok(Report::new("summary", columns, vec![row]))
}

fn scalar_value(key: &str, value: &serde_json::Value) -> Result<Value> {
    match value {
        serde_json::Value::Null => Ok(Value::Null),
        serde_json::Value::Bool(b) => Ok(Value::Bool(*b)),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::Int(i))
            } else if let Some(f) = n.as_f64() {
                Ok(Value::Float(f))
            } else {
                Err(JobError::MalformedPayload(format!(
                    "metric '{}' has an out-of-range number",
                    key
                )))
            }
        }
        serde_json::Value::String(s) => Ok(Value::Str(s.clone())),
        other => Err(JobError::MalformedPayload(format!(
            "metric '{}' is not a scalar: {}",
            key, other
        ))),
    }
}

/// Column layout of the capacity report.
pub const CAPACITY_COLUMNS: [&str; 10] = [
    "report_datetime",
    "path",
    "is_small_folders",
    "usable",
    "unique",
    "logical",
    "parent",
    "percent",
    "report_date",
    "report_year",
];

/// Builds the per-folder capacity report.
///
/// Main folders come first, then small folders, each group sorted by
/// `logical` descending. `report_date`/`report_year` are the partition
/// columns added for downstream dataset layouts.
pub fn capacity_report(capacity: &Capacity, report_datetime: DateTime<Utc>) -> Result<Report> {
    let usable = key_index(capacity, "usable")?;
    let unique = key_index(capacity, "unique")?;
    let logical = key_index(capacity, "logical")?;

    let mut main_rows = folder_rows(&capacity.details, false, usable, unique, logical)?;
    let mut small_rows = folder_rows(&capacity.small_folders, true, usable, unique, logical)?;
    main_rows.sort_by(|a, b| b.logical.cmp(&a.logical));
    small_rows.sort_by(|a, b| b.logical.cmp(&a.logical));
    main_rows.append(&mut small_rows);

    let rows = main_rows
        .into_iter()
        .map(|f| {
            vec![
                Value::Timestamp(report_datetime),
                Value::Str(f.path),
                Value::Bool(f.is_small_folders),
                Value::Int(f.usable),
                Value::Int(f.unique),
                Value::Int(f.logical),
                Value::Str(f.parent),
                Value::Float(f.percent),
                Value::Str(report_datetime.format("%Y-%m-%d").to_string()),
                Value::Int(i64::from(report_datetime.year())),
            ]
        })
        .collect();

    Ok(Report::new(
        "capacity",
        CAPACITY_COLUMNS.iter().map(|c| c.to_string()).collect(),
        rows,
    ))
}

struct FolderRow {
    path: String,
    is_small_folders: bool,
    usable: i64,
    unique: i64,
    logical: i64,
    parent: String,
    percent: f64,
}

fn key_index(capacity: &Capacity, key: &str) -> Result<usize> {
    capacity.keys.iter().position(|k| k == key).ok_or_else(|| {
        JobError::MalformedPayload(format!("capacity response is missing key '{}'", key))
    })
}

fn folder_rows(
    folders: &[(String, CapacityData)],
    is_small_folders: bool,
    usable: usize,
    unique: usize,
    logical: usize,
) -> Result<Vec<FolderRow>> {
    folders
        .iter()
        .map(|(name, data)| {
            let fetch = |idx: usize| -> Result<i64> {
                data.data.get(idx).copied().ok_or_else(|| {
                    JobError::MalformedPayload(format!(
                        "capacity data for '{}' has fewer entries than keys",
                        name
                    ))
                })
            };
            Ok(FolderRow {
                path: name.clone(),
                is_small_folders,
                usable: fetch(usable)?,
                unique: fetch(unique)?,
                logical: fetch(logical)?,
                parent: data.parent.clone(),
                percent: data.percent,
            })
        })
        .collect()
}

/// Column layout of the quota report.
pub const QUOTA_COLUMNS: [&str; 9] = [
    "report_datetime",
    "path",
    "state",
    "used_capacity",
    "soft_limit",
    "hard_limit",
    "percent_capacity",
    "report_date",
    "report_year",
];

/// Builds the per-quota report. Missing optional fields become nulls.
pub fn quota_report(quotas: &[Quota], report_datetime: DateTime<Utc>) -> Report {
    let rows = quotas
        .iter()
        .map(|q| {
            vec![
                Value::Timestamp(report_datetime),
                opt_str(&q.path),
                opt_str(&q.state),
                opt_int(q.used_capacity),
                opt_int(q.soft_limit),
                opt_int(q.hard_limit),
                opt_int(q.percent_capacity),
                Value::Str(report_datetime.format("%Y-%m-%d").to_string()),
                Value::Int(i64::from(report_datetime.year())),
            ]
        })
        .collect();

    Report::new(
        "quota",
        QUOTA_COLUMNS.iter().map(|c| c.to_string()).collect(),
        rows,
    )
}

fn opt_str(v: &Option<String>) -> Value {
    v.as_ref()
        .map(|s| Value::Str(s.clone()))
        .unwrap_or(Value::Null)
}

fn opt_int(v: Option<i64>) -> Value {
    v.map(Value::Int).unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_capacity() -> Capacity {
        serde_json::from_str(
            r#"{
                "details": [
                    ["/scratch/b", {"data": [50, 40, 80], "parent": "/scratch", "percent": 40.0}],
                    ["/scratch/a", {"data": [100, 90, 120], "parent": "/scratch", "percent": 60.0}]
                ],
                "keys": ["usable", "unique", "logical"],
                "time": "2025-11-12T00:00:00Z",
                "sort_key": "logical",
                "root_data": [150, 130, 200],
                "small_folders": [
                    ["/scratch/tiny", {"data": [1, 1, 2], "parent": "/scratch", "percent": 0.1}]
                ]
            }"#,
        )
        .unwrap()
    }

    fn report_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 11, 12, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_metrics_payload_zips_keys_and_root_data() {
        let payload = metrics_payload(&sample_capacity()).unwrap();
        let keys: Vec<&String> = payload.keys().collect();
        assert_eq!(keys, vec!["usable", "unique", "logical"]);
        assert_eq!(payload["logical"], serde_json::json!(200));
    }

    #[test]
    fn test_metrics_payload_length_mismatch_is_malformed() {
        let mut capacity = sample_capacity();
        capacity.root_data.pop();
        let err = metrics_payload(&capacity).unwrap_err();
        assert!(matches!(err, JobError::MalformedPayload(_)));
    }

    #[test]
    fn test_summary_report_keeps_payload_order() {
        let mut payload = MetricsPayload::new();
        payload.insert("capacity_used".into(), serde_json::json!(10));
        payload.insert("capacity_total".into(), serde_json::json!(100));
        let report = summary_report(&payload).unwrap();
        assert_eq!(report.columns, vec!["capacity_used", "capacity_total"]);
        assert_eq!(report.rows, vec![vec![Value::Int(10), Value::Int(100)]]);
    }

    #[test]
    fn test_summary_report_is_deterministic() {
        let payload = metrics_payload(&sample_capacity()).unwrap();
        assert_eq!(
            summary_report(&payload).unwrap(),
            summary_report(&payload).unwrap()
        );
    }

    #[test]
    fn test_summary_report_rejects_non_scalar() {
        let mut payload = MetricsPayload::new();
        payload.insert("nested".into(), serde_json::json!({"a": 1}));
        let err = summary_report(&payload).unwrap_err();
        assert!(matches!(err, JobError::MalformedPayload(_)));
    }

    #[test]
    fn test_summary_report_rejects_empty_payload() {
        let err = summary_report(&MetricsPayload::new()).unwrap_err();
        assert!(matches!(err, JobError::MalformedPayload(_)));
    }

    #[test]
    fn test_capacity_report_sorts_main_then_small() {
        let report = capacity_report(&sample_capacity(), report_time()).unwrap();
        assert_eq!(report.columns.len(), CAPACITY_COLUMNS.len());
        assert_eq!(report.rows.len(), 3);
        // Main folders by logical descending, then small folders.
        assert_eq!(report.rows[0][1], Value::Str("/scratch/a".into()));
        assert_eq!(report.rows[1][1], Value::Str("/scratch/b".into()));
        assert_eq!(report.rows[2][1], Value::Str("/scratch/tiny".into()));
        assert_eq!(report.rows[2][2], Value::Bool(true));
        assert_eq!(report.rows[0][9], Value::Int(2025));
    }

    #[test]
    fn test_capacity_report_missing_key_is_malformed() {
        let mut capacity = sample_capacity();
        capacity.keys = vec!["usable".into(), "unique".into()];
        let err = capacity_report(&capacity, report_time()).unwrap_err();
        assert!(matches!(err, JobError::MalformedPayload(_)));
    }

    #[test]
    fn test_quota_report_maps_missing_fields_to_null() {
        let quotas = vec![Quota {
            path: Some("/scratch".into()),
            state: Some("OK".into()),
            used_capacity: Some(10),
            ..Quota::default()
        }];
        let report = quota_report(&quotas, report_time());
        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.rows[0][1], Value::Str("/scratch".into()));
        assert_eq!(report.rows[0][4], Value::Null);
        assert_eq!(report.rows[0][8], Value::Int(2025));
    }
}
