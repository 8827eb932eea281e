//! Parquet serialization and the S3 sink.
//!
//! Reports are encoded with Arrow builders and written through
//! `parquet::arrow::ArrowWriter` (Snappy, one row group), staged in a temp
//! file and uploaded with the `aws` CLI.

use arrow_array::builder::{
    BooleanBuilder, Float64Builder, Int64Builder, StringBuilder, TimestampMicrosecondBuilder,
};
use arrow_array::{ArrayRef, RecordBatch};
use arrow_schema::{DataType, Field, Schema, TimeUnit};
use chrono::{Datelike, Utc};
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use crate::domain::entities::{Report, Value, ValueKind};
use crate::domain::errors::{JobError, Result};
use crate::infrastructure::aws::s3;
use crate::ports::sink_port::SinkPort;

/// Serializes a report as Parquet and uploads it to an `s3://` URI.
pub struct S3ParquetSink {
    uri: String,
}

impl S3ParquetSink {
    pub fn new(uri: String) -> Self {
        Self { uri }
    }
}

impl SinkPort for S3ParquetSink {
    fn write(&self, report: &Report) -> Result<()> {
        let staged = tempfile::Builder::new()
            .suffix(".parquet")
            .tempfile()
            .map_err(|e| JobError::Write(format!("cannot stage parquet file: {}", e)))?;

        write_parquet(report, staged.path())?;
        s3::upload_file(staged.path(), &object_key(&self.uri, report))
    }
}

/// Computes the object key for a report under the configured URI.
///
/// A URI naming a `.parquet` object is used as-is; otherwise the report is
/// placed in a Hive-partitioned dataset layout, overwriting the partition of
/// the run date.
fn object_key(uri: &str, report: &Report) -> String {
    if uri.ends_with(".parquet") {
        return uri.to_string();
    }
    let (year, date) = partition_values(report);
    format!(
        "{}/{}/report_year={}/report_date={}/{}.parquet",
        uri, report.name, year, date, report.name
    )
}

/// Pulls the partition values from the report's own partition columns,
/// falling back to the current UTC date for reports without them.
fn partition_values(report: &Report) -> (String, String) {
    let first_cell = |name: &str| -> Option<String> {
        let idx = report.column_index(name)?;
        report.rows.first().map(|row| row[idx].to_string())
    };
    match (first_cell("report_year"), first_cell("report_date")) {
        (Some(year), Some(date)) => (year, date),
        _ => {
            let now = Utc::now();
            (
                now.year().to_string(),
                now.format("%Y-%m-%d").to_string(),
            )
        }
    }
}

/// Helper enum to manage the Arrow array builders, one per report column.
enum ColumnBuilder {
    Int64(Int64Builder),
    Float64(Float64Builder),
    Boolean(BooleanBuilder),
    Utf8(StringBuilder),
    Timestamp(TimestampMicrosecondBuilder),
}

impl ColumnBuilder {
    fn new(kind: ValueKind, capacity: usize) -> Self {
        match kind {
            ValueKind::Int => ColumnBuilder::Int64(Int64Builder::with_capacity(capacity)),
            ValueKind::Float => ColumnBuilder::Float64(Float64Builder::with_capacity(capacity)),
            ValueKind::Bool => ColumnBuilder::Boolean(BooleanBuilder::with_capacity(capacity)),
            ValueKind::Str => {
                ColumnBuilder::Utf8(StringBuilder::with_capacity(capacity, capacity * 20))
            }
            ValueKind::Timestamp => {
                ColumnBuilder::Timestamp(TimestampMicrosecondBuilder::with_capacity(capacity))
            }
        }
    }

    fn push(&mut self, column: &str, value: &Value) -> Result<()> {
        match (self, value) {
            (ColumnBuilder::Int64(b), Value::Int(v)) => b.append_value(*v),
            (ColumnBuilder::Int64(b), Value::Null) => b.append_null(),
            (ColumnBuilder::Float64(b), Value::Float(v)) => b.append_value(*v),
            // An int cell in a float column is widened, not rejected.
            (ColumnBuilder::Float64(b), Value::Int(v)) => b.append_value(*v as f64),
            (ColumnBuilder::Float64(b), Value::Null) => b.append_null(),
            (ColumnBuilder::Boolean(b), Value::Bool(v)) => b.append_value(*v),
            (ColumnBuilder::Boolean(b), Value::Null) => b.append_null(),
            (ColumnBuilder::Utf8(b), Value::Str(v)) => b.append_value(v),
            (ColumnBuilder::Utf8(b), Value::Null) => b.append_null(),
            (ColumnBuilder::Timestamp(b), Value::Timestamp(v)) => {
                b.append_value(v.timestamp_micros())
            }
            (ColumnBuilder::Timestamp(b), Value::Null) => b.append_null(),
            (_, other) => {
                return Err(JobError::Write(format!(
                    "column '{}' has mixed types (unexpected {:?})",
                    column, other
                )))
            }
        }
        Ok(())
    }

    fn finish(&mut self) -> ArrayRef {
        match self {
            ColumnBuilder::Int64(b) => Arc::new(b.finish()) as ArrayRef,
            ColumnBuilder::Float64(b) => Arc::new(b.finish()) as ArrayRef,
            ColumnBuilder::Boolean(b) => Arc::new(b.finish()) as ArrayRef,
            ColumnBuilder::Utf8(b) => Arc::new(b.finish()) as ArrayRef,
            ColumnBuilder::Timestamp(b) => Arc::new(b.finish()) as ArrayRef,
        }
    }
}

fn arrow_type(kind: ValueKind) -> DataType {
    match kind {
        ValueKind::Int => DataType::Int64,
        ValueKind::Float => DataType::Float64,
        ValueKind::Bool => DataType::Boolean,
        ValueKind::Str => DataType::Utf8,
        ValueKind::Timestamp => DataType::Timestamp(TimeUnit::Microsecond, None),
    }
}

/// Writes a report to a local Parquet file (schema = report columns).
pub fn write_parquet(report: &Report, path: &Path) -> Result<()> {
    let kinds = report.column_kinds();
    let fields: Vec<Field> = report
        .columns
        .iter()
        .zip(kinds.iter())
        .map(|(name, kind)| Field::new(name, arrow_type(*kind), true))
        .collect();
    let schema = Arc::new(Schema::new(fields));

    let mut builders: Vec<ColumnBuilder> = kinds
        .iter()
        .map(|kind| ColumnBuilder::new(*kind, report.rows.len()))
        .collect();
    for row in &report.rows {
        for ((builder, value), column) in
            builders.iter_mut().zip(row.iter()).zip(report.columns.iter())
        {
            builder.push(column, value)?;
        }
    }
    let arrays: Vec<ArrayRef> = builders.iter_mut().map(|b| b.finish()).collect();

    let batch = RecordBatch::try_new(schema.clone(), arrays)
        .map_err(|e| JobError::Write(format!("cannot assemble record batch: {}", e)))?;

    let file = File::create(path)
        .map_err(|e| JobError::Write(format!("cannot create {}: {}", path.display(), e)))?;
    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();
    let mut writer = ArrowWriter::try_new(file, schema, Some(props))
        .map_err(|e| JobError::Write(format!("cannot open parquet writer: {}", e)))?;
    writer
        .write(&batch)
        .map_err(|e| JobError::Write(format!("cannot write parquet: {}", e)))?;
    writer
        .close()
        .map_err(|e| JobError::Write(format!("cannot finalize parquet: {}", e)))?;
    Ok(())
}
