//! # Domain Entities
//!
//! Entities are the "Nouns" of the exporter: credentials, report rows and
//! values, and the output destination. They are plain data structures; all
//! behavior that touches the outside world lives in `infrastructure`.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use crate::domain::errors::{JobError, Result};

/// Connection material for the VAST REST API.
///
/// Opaque to everything except the metrics client. Sourced once per run,
/// never persisted.
#[derive(Clone, Deserialize)]
pub struct Credentials {
    /// Address of the VAST cluster (host name, no scheme).
    pub address: String,
    pub user: String,
    pub password: String,
}

// The password must never leak into logs or error chains.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("address", &self.address)
            .field("user", &self.user)
            .field("password", &"********")
            .finish()
    }
}

/// Which report a single run compiles.
///
/// Exactly one fetch and one report per run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    /// One-row report of cluster-level metrics (metric name -> value).
    Summary,
    /// One row per folder, from the capacity endpoint.
    Capacity,
    /// One row per quota, from the quotas endpoint.
    Quota,
}

impl ReportKind {
    /// Report/table name used for file names and S3 keys.
    pub fn name(&self) -> &'static str {
        match self {
            ReportKind::Summary => "summary",
            ReportKind::Capacity => "capacity",
            ReportKind::Quota => "quota",
        }
    }
}

/// A single scalar cell in a report.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Timestamp(DateTime<Utc>),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            // Debug formatting keeps the decimal point on integral floats
            // ("40.0", not "40"), so a float column stays a float column
            // after a CSV write and read-back.
            Value::Float(x) => write!(f, "{:?}", x),
            Value::Str(s) => write!(f, "{}", s),
            Value::Timestamp(t) => {
                write!(f, "{}", t.to_rfc3339_opts(SecondsFormat::Secs, true))
            }
        }
    }
}

/// The column types a report can carry, used to build the Parquet schema.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ValueKind {
    Bool,
    Int,
    Float,
    Str,
    Timestamp,
}

impl Value {
    pub fn kind(&self) -> Option<ValueKind> {
        match self {
            Value::Null => None,
            Value::Bool(_) => Some(ValueKind::Bool),
            Value::Int(_) => Some(ValueKind::Int),
            Value::Float(_) => Some(ValueKind::Float),
            Value::Str(_) => Some(ValueKind::Str),
            Value::Timestamp(_) => Some(ValueKind::Timestamp),
        }
    }
}

/// The tabular artifact of one run: ordered columns plus rows of scalars.
///
/// Derived deterministically from exactly one metrics payload; the only
/// entity a sink ever writes.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl Report {
    pub fn new(name: &str, columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        Self {
            name: name.to_string(),
            columns,
            rows,
        }
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Infers each column's type from its first non-null cell.
    ///
    /// A column with no non-null cells is treated as a string column.
    pub fn column_kinds(&self) -> Vec<ValueKind> {
        (0..self.columns.len())
            .map(|i| {
                self.rows
                    .iter()
                    .find_map(|row| row[i].kind())
                    .unwrap_or(ValueKind::Str)
            })
            .collect()
    }
}

/// Destination descriptor for the report of one run.
#[derive(Debug, Clone, PartialEq)]
pub enum OutputLocation {
    /// No location configured: render the report to stdout.
    Console,
    /// Local filesystem path, written as CSV.
    LocalPath(PathBuf),
    /// `s3://` URI, written as Parquet and uploaded.
    S3(String),
}

impl OutputLocation {
    /// Parses an optional `--output_location` value.
    ///
    /// Absent means console. A value with a URI scheme must be `s3://`;
    /// anything else (e.g. `ftp://`) is unsupported. A value without a
    /// scheme is a local path.
    pub fn parse(location: Option<&str>) -> Result<Self> {
        match location {
            None => Ok(OutputLocation::Console),
            Some(loc) if loc.is_empty() => Ok(OutputLocation::Console),
            Some(loc) => {
                if let Some((scheme, _rest)) = loc.split_once("://") {
                    if scheme.eq_ignore_ascii_case("s3") {
                        Ok(OutputLocation::S3(loc.trim_end_matches('/').to_string()))
                    } else {
                        Err(JobError::UnsupportedLocation(format!(
                            "scheme '{}://' is not supported (use s3:// or a local path)",
                            scheme
                        )))
                    }
                } else {
                    Ok(OutputLocation::LocalPath(PathBuf::from(loc)))
                }
            }
        }
    }
}
