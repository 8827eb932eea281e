//! Local CSV sink.

use csv::WriterBuilder;
use log::info;
use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::entities::Report;
use crate::domain::errors::{JobError, Result};
use crate::ports::sink_port::SinkPort;

/// Serializes a report as CSV on the local filesystem, creating or
/// overwriting the target file.
pub struct CsvFileSink {
    path: PathBuf,
}

impl CsvFileSink {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// A location ending in `.csv` is the file itself; anything else is a
    /// directory the report file is placed in.
    fn target_file(&self, report: &Report) -> PathBuf {
        if self
            .path
            .extension()
            .map(|e| e.eq_ignore_ascii_case("csv"))
            .unwrap_or(false)
        {
            self.path.clone()
        } else {
            self.path.join(format!("{}.csv", report.name))
        }
    }
}

impl SinkPort for CsvFileSink {
    fn write(&self, report: &Report) -> Result<()> {
        let target = self.target_file(report);
        write_csv(report, &target)?;
        info!("Wrote {} rows to {}", report.rows.len(), target.display());
        Ok(())
    }
}

/// Writes one header row plus one row per report row.
pub fn write_csv(report: &Report, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .map_err(|e| JobError::Write(format!("cannot create {}: {}", parent.display(), e)))?;
        }
    }

    let mut writer = WriterBuilder::new()
        .from_path(path)
        .map_err(|e| JobError::Write(format!("cannot create {}: {}", path.display(), e)))?;

    writer
        .write_record(&report.columns)
        .map_err(|e| JobError::Write(e.to_string()))?;
    for row in &report.rows {
        let record: Vec<String> = row.iter().map(|v| v.to_string()).collect();
        writer
            .write_record(&record)
            .map_err(|e| JobError::Write(e.to_string()))?;
    }
    writer.flush().map_err(|e| JobError::Write(e.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::Value;
    use std::fs;

    #[test]
    fn test_write_csv_header_and_rows() {
        let report = Report::new(
            "summary",
            vec!["capacity_used".into(), "capacity_total".into()],
            vec![vec![Value::Int(10), Value::Int(100)]],
        );
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("r.csv");

        CsvFileSink::new(path.clone()).write(&report).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        let mut lines = contents.lines();
        assert_eq!(lines.next(), Some("capacity_used,capacity_total"));
        assert_eq!(lines.next(), Some("10,100"));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_directory_location_uses_report_name() {
        let report = Report::new(
            "quota",
            vec!["path".into()],
            vec![vec![Value::Str("/scratch".into())]],
        );
        let dir = tempfile::tempdir().unwrap();

        CsvFileSink::new(dir.path().to_path_buf())
            .write(&report)
            .unwrap();

        assert!(dir.path().join("quota.csv").exists());
    }

    #[test]
    fn test_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("r.csv");
        fs::write(&path, "old,content\n1,2\n3,4\n").unwrap();

        let report = Report::new("summary", vec!["a".into()], vec![vec![Value::Int(1)]]);
        CsvFileSink::new(path.clone()).write(&report).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "a\n1\n");
    }
}
