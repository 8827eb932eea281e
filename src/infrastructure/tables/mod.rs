//! Readers for previously compiled report tables.
//!
//! The notification job reads the capacity/quota tables back from wherever
//! the compile job wrote them: CSV in a local directory, or the run date's
//! Parquet partition under an `s3://` prefix.

use arrow_array::{
    Array, ArrayRef, BooleanArray, Float64Array, Int64Array, StringArray,
    TimestampMicrosecondArray,
};
use arrow_schema::{DataType, TimeUnit};
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use std::fs::File;
use std::path::Path;

use crate::domain::entities::{Report, Value};
use crate::domain::errors::{JobError, Result};
use crate::infrastructure::aws::s3;

/// Reads one table (`capacity` or `quota`) from the tables location.
pub fn read_table(tables_location: &str, name: &str, report_date: NaiveDate) -> Result<Report> {
    if tables_location.starts_with("s3://") {
        let base = tables_location.trim_end_matches('/');
        let uri = format!(
            "{}/{}/report_year={}/report_date={}/{}.parquet",
            base,
            name,
            report_date.year(),
            report_date.format("%Y-%m-%d"),
            name
        );
        let staged = tempfile::Builder::new()
            .suffix(".parquet")
            .tempfile()
            .map_err(|e| JobError::TransientRequest(format!("cannot stage download: {}", e)))?;
        s3::download_file(&uri, staged.path())?;
        report_from_parquet(staged.path(), name)
    } else {
        let path = Path::new(tables_location).join(format!("{}.csv", name));
        report_from_csv(&path, name)
    }
}

/// Reads a CSV table back into a report.
///
/// CSV carries no types, so cells are re-typed from their text: empty is
/// null, then bool, then int, then float, then RFC3339 timestamp, else
/// string.
pub fn report_from_csv(path: &Path, name: &str) -> Result<Report> {
    let mut reader = csv::Reader::from_path(path)
        .map_err(|e| JobError::TransientRequest(format!("cannot read {}: {}", path.display(), e)))?;

    let columns: Vec<String> = reader
        .headers()
        .map_err(|e| JobError::MalformedPayload(format!("bad csv header: {}", e)))?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record =
            record.map_err(|e| JobError::MalformedPayload(format!("bad csv row: {}", e)))?;
        rows.push(record.iter().map(parse_cell).collect());
    }
    Ok(Report::new(name, columns, rows))
}

fn parse_cell(cell: &str) -> Value {
    if cell.is_empty() {
        return Value::Null;
    }
    match cell {
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        _ => {}
    }
    if let Ok(i) = cell.parse::<i64>() {
        return Value::Int(i);
    }
    if let Ok(f) = cell.parse::<f64>() {
        return Value::Float(f);
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(cell) {
        return Value::Timestamp(ts.with_timezone(&Utc));
    }
    Value::Str(cell.to_string())
}

/// Reads a Parquet table back into a report.
pub fn report_from_parquet(path: &Path, name: &str) -> Result<Report> {
    let file = File::open(path)
        .map_err(|e| JobError::TransientRequest(format!("cannot open {}: {}", path.display(), e)))?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .map_err(|e| JobError::MalformedPayload(format!("bad parquet file: {}", e)))?;
    let schema = builder.schema().clone();
    let reader = builder
        .build()
        .map_err(|e| JobError::MalformedPayload(format!("bad parquet file: {}", e)))?;

    let columns: Vec<String> = schema.fields().iter().map(|f| f.name().clone()).collect();
    let mut rows = Vec::new();
    for batch in reader {
        let batch =
            batch.map_err(|e| JobError::MalformedPayload(format!("bad parquet batch: {}", e)))?;
        for row_idx in 0..batch.num_rows() {
            let row: Result<Vec<Value>> = batch
                .columns()
                .iter()
                .zip(columns.iter())
                .map(|(array, column)| cell_value(array, row_idx, column))
                .collect();
            rows.push(row?);
        }
    }
    Ok(Report::new(name, columns, rows))
}

fn cell_value(array: &ArrayRef, row: usize, column: &str) -> Result<Value> {
    if array.is_null(row) {
        return Ok(Value::Null);
    }
    let unsupported = || {
        JobError::MalformedPayload(format!(
            "column '{}' has unsupported type {}",
            column,
            array.data_type()
        ))
    };
    match array.data_type() {
        DataType::Int64 => {
            let values = array.as_any().downcast_ref::<Int64Array>().ok_or_else(unsupported)?;
            Ok(Value::Int(values.value(row)))
        }
        DataType::Float64 => {
            let values = array
                .as_any()
                .downcast_ref::<Float64Array>()
                .ok_or_else(unsupported)?;
            Ok(Value::Float(values.value(row)))
        }
        DataType::Boolean => {
            let values = array
                .as_any()
                .downcast_ref::<BooleanArray>()
                .ok_or_else(unsupported)?;
            Ok(Value::Bool(values.value(row)))
        }
        DataType::Utf8 => {
            let values = array
                .as_any()
                .downcast_ref::<StringArray>()
                .ok_or_else(unsupported)?;
            Ok(Value::Str(values.value(row).to_string()))
        }
        DataType::Timestamp(TimeUnit::Microsecond, _) => {
            let values = array
                .as_any()
                .downcast_ref::<TimestampMicrosecondArray>()
                .ok_or_else(unsupported)?;
            let ts = DateTime::from_timestamp_micros(values.value(row)).ok_or_else(|| {
                JobError::MalformedPayload(format!("column '{}' has out-of-range timestamp", column))
            })?;
            Ok(Value::Timestamp(ts))
        }
        _ => Err(unsupported()),
    }
}
