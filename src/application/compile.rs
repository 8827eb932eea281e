//! The core application logic of the `compile_metrics` job.
//!
//! Strictly linear: resolve settings, fetch exactly one payload from the
//! metrics port, build exactly one report, hand it to the sink. Any failure
//! terminates the run.

use log::info;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::domain::entities::{Report, ReportKind};
use crate::domain::errors::Result;
use crate::domain::mapping;
use crate::ports::metrics_port::MetricsPort;
use crate::ports::sink_port::SinkPort;

/// Job to compile metrics about a VAST cluster and write a report.
pub struct CompileMetricsJob {
    config: AppConfig,
    metrics: Arc<dyn MetricsPort>,
    sink: Arc<dyn SinkPort>,
}

impl CompileMetricsJob {
    pub fn new(config: AppConfig, metrics: Arc<dyn MetricsPort>, sink: Arc<dyn SinkPort>) -> Self {
        Self {
            config,
            metrics,
            sink,
        }
    }

    /// Compiles the configured report and writes it to the sink.
    pub fn run(&self) -> Result<Report> {
        let kind = self.config.report_kind();
        let path = self.config.vast_path();
        let report_datetime = self.config.report_datetime();
        info!("Compiling {} report for {}", kind.name(), path);

        let report = match kind {
            ReportKind::Summary => {
                let capacity = self.metrics.get_capacity(path, self.config.sort_key())?;
                let payload = mapping::metrics_payload(&capacity)?;
                mapping::summary_report(&payload)?
            }
            ReportKind::Capacity => {
                let capacity = self.metrics.get_capacity(path, self.config.sort_key())?;
                mapping::capacity_report(&capacity, report_datetime)?
            }
            ReportKind::Quota => {
                let quotas = self.metrics.get_quotas(path)?;
                mapping::quota_report(&quotas, report_datetime)
            }
        };

        self.sink.write(&report)?;
        info!("Wrote {} report ({} rows)", report.name, report.rows.len());
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::Value;
    use crate::domain::models::{Capacity, Quota};
    use std::sync::Mutex;

    struct MockMetrics;

    impl MetricsPort for MockMetrics {
        fn get_capacity(&self, _path: &str, _sort_key: &str) -> Result<Capacity> {
            Ok(serde_json::from_str(
                r#"{
                    "details": [
                        ["/scratch/a", {"data": [100, 90, 120], "parent": "/scratch", "percent": 60.0}]
                    ],
                    "keys": ["usable", "unique", "logical"],
                    "time": "2025-11-12T00:00:00Z",
                    "sort_key": "logical",
                    "root_data": [150, 130, 200],
                    "small_folders": []
                }"#,
            )
            .unwrap())
        }

        fn get_quotas(&self, _path: &str) -> Result<Vec<Quota>> {
            Ok(vec![Quota {
                path: Some("/scratch".into()),
                state: Some("OK".into()),
                used_capacity: Some(10),
                soft_limit: Some(100),
                hard_limit: Some(200),
                percent_capacity: Some(5),
                ..Quota::default()
            }])
        }
    }

    #[derive(Default)]
    struct CollectingSink {
        written: Mutex<Vec<Report>>,
    }

    impl SinkPort for CollectingSink {
        fn write(&self, report: &Report) -> Result<()> {
            self.written.lock().unwrap().push(report.clone());
            Ok(())
        }
    }

    fn config(kind: &str) -> AppConfig {
        AppConfig::from_json_str(&format!(
            r#"{{"vast": {{"path": "/scratch"}},
                 "report": {{"kind": "{}", "report_datetime": "2025-11-12T00:00:00Z"}}}}"#,
            kind
        ))
        .unwrap()
    }

    fn run_job(kind: &str) -> (Report, Arc<CollectingSink>) {
        let sink = Arc::new(CollectingSink::default());
        let job = CompileMetricsJob::new(config(kind), Arc::new(MockMetrics), sink.clone());
        (job.run().unwrap(), sink)
    }

    #[test]
    fn test_summary_run_writes_one_row() {
        let (report, sink) = run_job("summary");
        assert_eq!(report.columns, vec!["usable", "unique", "logical"]);
        assert_eq!(report.rows, vec![vec![
            Value::Int(150),
            Value::Int(130),
            Value::Int(200),
        ]]);
        assert_eq!(sink.written.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_capacity_run_builds_folder_rows() {
        let (report, _) = run_job("capacity");
        assert_eq!(report.name, "capacity");
        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.rows[0][1], Value::Str("/scratch/a".into()));
    }

    #[test]
    fn test_quota_run_builds_quota_rows() {
        let (report, _) = run_job("quota");
        assert_eq!(report.name, "quota");
        assert_eq!(report.rows[0][3], Value::Int(10));
    }

    #[test]
    fn test_repeated_runs_are_identical() {
        let (first, _) = run_job("capacity");
        let (second, _) = run_job("capacity");
        assert_eq!(first, second);
    }
}
