//! The `send_notification` job.
//!
//! Reads the compiled quota and capacity tables back, looks for quotas whose
//! state is not `OK`, and posts an HTML alert to a webhook. With every quota
//! healthy the job just logs the table and exits cleanly.

use log::info;
use serde_json::json;

use crate::config::NotifyConfig;
use crate::domain::entities::{Report, Value};
use crate::domain::errors::{JobError, Result};
use crate::infrastructure::sinks::console::render_text;
use crate::infrastructure::tables;

const TIB: f64 = 1024.0 * 1024.0 * 1024.0 * 1024.0;

/// Job to send quota alerts to an endpoint.
pub struct SendNotificationJob {
    config: NotifyConfig,
}

impl SendNotificationJob {
    pub fn new(config: NotifyConfig) -> Self {
        Self { config }
    }

    /// Reads the quota and capacity tables, sends a notification if needed.
    pub fn run(&self) -> Result<()> {
        let report_date = self.config.report_date();
        let quota = tables::read_table(&self.config.tables_location, "quota", report_date)?;
        let problems = problem_quota_table(&quota)?;

        if problems.rows.is_empty() {
            info!("All quotas good.");
            info!("\n{}", render_text(&quota));
            return Ok(());
        }

        let capacity = tables::read_table(&self.config.tables_location, "capacity", report_date)?;
        let path_idx = problems.column_index("Path").ok_or_else(|| {
            JobError::MalformedPayload("problem table is missing its Path column".to_string())
        })?;
        let mut problem_paths: Vec<String> = problems
            .rows
            .iter()
            .filter_map(|row| as_str(&row[path_idx]).map(|s| s.to_string()))
            .collect();
        problem_paths.sort();

        let mut sections = Vec::new();
        for path in problem_paths {
            let table = top_capacity_table(&capacity, &path)?;
            sections.push((path, table));
        }

        let html = render_html(&problems, &sections);
        match &self.config.alert_url {
            Some(url) => send_notification(url, &html),
            None => {
                info!("No alert_url configured; alert body:\n{}", html);
                Ok(())
            }
        }
    }
}

/// Filters the quota table down to quotas whose state is not `OK`, with the
/// byte limits converted to TiB.
pub fn problem_quota_table(quota: &Report) -> Result<Report> {
    let col = |name: &str| -> Result<usize> {
        quota.column_index(name).ok_or_else(|| {
            JobError::MalformedPayload(format!("quota table is missing column '{}'", name))
        })
    };
    let path = col("path")?;
    let state = col("state")?;
    let used_capacity = col("used_capacity")?;
    let soft_limit = col("soft_limit")?;
    let hard_limit = col("hard_limit")?;
    let percent_capacity = col("percent_capacity")?;

    let rows = quota
        .rows
        .iter()
        .filter(|row| {
            // A quota with no state at all is not healthy either.
            as_str(&row[state])
                .map(|s| !s.eq_ignore_ascii_case("OK"))
                .unwrap_or(true)
        })
        .map(|row| {
            vec![
                row[path].clone(),
                row[state].clone(),
                tib_value(&row[used_capacity]),
                tib_value(&row[soft_limit]),
                tib_value(&row[hard_limit]),
                row[percent_capacity].clone(),
            ]
        })
        .collect();

    Ok(Report::new(
        "problem_quotas",
        vec![
            "Path".into(),
            "State".into(),
            "Used Capacity (TiB)".into(),
            "Soft Limit (TiB)".into(),
            "Hard Limit (TiB)".into(),
            "Percent Capacity".into(),
        ],
        rows,
    ))
}

/// Filters the capacity table to the top 5 folders under `parent_path` and
/// the top 3 subfolders of each, by logical size descending.
pub fn top_capacity_table(capacity: &Report, parent_path: &str) -> Result<Report> {
    let col = |name: &str| -> Result<usize> {
        capacity.column_index(name).ok_or_else(|| {
            JobError::MalformedPayload(format!("capacity table is missing column '{}'", name))
        })
    };
    let path = col("path")?;
    let parent = col("parent")?;
    let logical = col("logical")?;
    let is_small = col("is_small_folders")?;

    struct Folder {
        path: String,
        parent: String,
        logical: f64,
        small: bool,
    }

    let folders: Vec<Folder> = capacity
        .rows
        .iter()
        .filter_map(|row| {
            Some(Folder {
                path: as_str(&row[path])?.to_string(),
                parent: as_str(&row[parent])?.to_string(),
                logical: as_f64(&row[logical])?,
                small: matches!(&row[is_small], Value::Bool(true)),
            })
        })
        .collect();

    // Only the top-5 selection excludes the aggregated small-folder rows;
    // a top folder's subfolder listing keeps them.
    let mut top: Vec<&Folder> = folders
        .iter()
        .filter(|f| f.parent == parent_path && !f.small)
        .collect();
    top.sort_by(|a, b| b.logical.total_cmp(&a.logical));
    top.truncate(5);

    let mut rows = Vec::new();
    for folder in &top {
        rows.push(vec![
            Value::Str(folder.path.clone()),
            Value::Float(folder.logical / TIB),
        ]);
        let mut subs: Vec<&Folder> =
            folders.iter().filter(|f| f.parent == folder.path).collect();
        subs.sort_by(|a, b| b.logical.total_cmp(&a.logical));
        for sub in subs.iter().take(3) {
            rows.push(vec![
                Value::Str(sub.path.clone()),
                Value::Float(sub.logical / TIB),
            ]);
        }
    }

    Ok(Report::new(
        "top_capacity",
        vec!["Path".into(), "Logical TiB".into()],
        rows,
    ))
}

fn tib_value(value: &Value) -> Value {
    as_f64(value)
        .map(|v| Value::Float(v / TIB))
        .unwrap_or(Value::Null)
}

fn as_str(value: &Value) -> Option<&str> {
    match value {
        Value::Str(s) => Some(s),
        _ => None,
    }
}

fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Int(i) => Some(*i as f64),
        Value::Float(f) => Some(*f),
        _ => None,
    }
}

/// Renders one report as an HTML table.
fn html_table(report: &Report) -> String {
    let mut out = String::from("<table border=\"1\">\n<thead><tr>");
    for column in &report.columns {
        out.push_str(&format!("<th>{}</th>", column));
    }
    out.push_str("</tr></thead>\n<tbody>\n");
    for row in &report.rows {
        out.push_str("<tr>");
        for cell in row {
            out.push_str(&format!("<td>{}</td>", cell));
        }
        out.push_str("</tr>\n");
    }
    out.push_str("</tbody>\n</table>");
    out
}

/// Builds the alert body: problem quotas first, then one top-folders table
/// per problem path.
pub fn render_html(problems: &Report, sections: &[(String, Report)]) -> String {
    let mut body = String::new();
    body.push_str("<div><p>We have reached a limit for data storage on VAST</p></div>\n");
    body.push_str("<hr style=\"border-top: dashed 2px;\">\n");
    body.push_str("<div>\n");
    body.push_str(&html_table(problems));
    body.push_str("\n</div>\n");
    for (path, table) in sections {
        body.push_str("<div>\n");
        body.push_str(&format!("<p> {} </p>\n", path));
        body.push_str(&html_table(table));
        body.push_str("\n</div>\n");
    }
    body.push_str(
        "<div>\n<p>\nDISCLAIMER:\nThese are numbers estimated by VAST using \
         statistical sampling.\n</p>\n</div>\n",
    );
    body
}

/// POSTs the alert body to the webhook.
fn send_notification(alert_url: &str, html_body: &str) -> Result<()> {
    let client = reqwest::blocking::Client::builder()
        .danger_accept_invalid_certs(true)
        .build()?;
    let response = client
        .post(alert_url)
        .json(&json!({ "text": html_body }))
        .send()?;
    if !response.status().is_success() {
        return Err(JobError::TransientRequest(format!(
            "webhook returned {}",
            response.status()
        )));
    }
    info!("Alert sent to {}", alert_url);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quota_fixture() -> Report {
        Report::new(
            "quota",
            vec![
                "path".into(),
                "state".into(),
                "used_capacity".into(),
                "soft_limit".into(),
                "hard_limit".into(),
                "percent_capacity".into(),
            ],
            vec![
                vec![
                    Value::Str("/scratch".into()),
                    Value::Str("OK".into()),
                    Value::Int(10),
                    Value::Int(100),
                    Value::Int(200),
                    Value::Int(5),
                ],
                vec![
                    Value::Str("/stage".into()),
                    Value::Str("Exceeded".into()),
                    Value::Int(TIB as i64 * 2),
                    Value::Int(TIB as i64),
                    Value::Int(TIB as i64 * 3),
                    Value::Int(200),
                ],
            ],
        )
    }

    fn capacity_fixture() -> Report {
        let folder = |path: &str, parent: &str, logical: i64, small: bool| {
            vec![
                Value::Str(path.into()),
                Value::Bool(small),
                Value::Int(logical),
                Value::Str(parent.into()),
            ]
        };
        Report::new(
            "capacity",
            vec![
                "path".into(),
                "is_small_folders".into(),
                "logical".into(),
                "parent".into(),
            ],
            vec![
                folder("/stage/a", "/stage", 300, false),
                folder("/stage/b", "/stage", 500, false),
                folder("/stage/a/x", "/stage/a", 200, false),
                folder("/stage/a/y", "/stage/a", 50, false),
                folder("/stage/a/small", "/stage/a", 10, true),
                folder("/stage/tiny", "/stage", 900, true),
            ],
        )
    }

    #[test]
    fn test_problem_quota_filters_ok_rows() {
        let problems = problem_quota_table(&quota_fixture()).unwrap();
        assert_eq!(problems.rows.len(), 1);
        assert_eq!(problems.rows[0][0], Value::Str("/stage".into()));
        assert_eq!(problems.rows[0][2], Value::Float(2.0));
        assert_eq!(problems.rows[0][3], Value::Float(1.0));
    }

    #[test]
    fn test_problem_quota_missing_column_is_malformed() {
        let quota = Report::new("quota", vec!["path".into()], vec![]);
        let err = problem_quota_table(&quota).unwrap_err();
        assert!(matches!(err, JobError::MalformedPayload(_)));
    }

    #[test]
    fn test_top_capacity_orders_folders_and_subfolders() {
        let table = top_capacity_table(&capacity_fixture(), "/stage").unwrap();
        let paths: Vec<String> = table
            .rows
            .iter()
            .map(|row| row[0].to_string())
            .collect();
        // Biggest folder first, each followed by its subfolders. The small
        // aggregate under /stage is skipped for the top-5 selection, but a
        // small subfolder of a top folder is still listed.
        assert_eq!(
            paths,
            vec![
                "/stage/b",
                "/stage/a",
                "/stage/a/x",
                "/stage/a/y",
                "/stage/a/small"
            ]
        );
    }

    #[test]
    fn test_problem_quota_null_state_is_a_problem() {
        let quota = Report::new(
            "quota",
            vec![
                "path".into(),
                "state".into(),
                "used_capacity".into(),
                "soft_limit".into(),
                "hard_limit".into(),
                "percent_capacity".into(),
            ],
            vec![vec![
                Value::Str("/stage".into()),
                Value::Null,
                Value::Int(10),
                Value::Int(100),
                Value::Int(200),
                Value::Int(5),
            ]],
        );
        let problems = problem_quota_table(&quota).unwrap();
        assert_eq!(problems.rows.len(), 1);
        assert_eq!(problems.rows[0][1], Value::Null);
    }

    #[test]
    fn test_render_html_includes_tables_and_paths() {
        let problems = problem_quota_table(&quota_fixture()).unwrap();
        let sections = vec![(
            "/stage".to_string(),
            top_capacity_table(&capacity_fixture(), "/stage").unwrap(),
        )];
        let html = render_html(&problems, &sections);
        assert!(html.contains("<table"));
        assert!(html.contains("/stage/b"));
        assert!(html.contains("Percent Capacity"));
        assert!(html.contains("DISCLAIMER"));
    }

    #[test]
    fn test_run_all_quotas_good_sends_nothing() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("quota.csv"),
            "path,state,used_capacity,soft_limit,hard_limit,percent_capacity\n\
             /scratch,OK,10,100,200,5\n",
        )
        .unwrap();

        let job = SendNotificationJob::new(NotifyConfig {
            tables_location: dir.path().to_str().unwrap().to_string(),
            alert_url: None,
            report_date: None,
        });
        job.run().unwrap();
    }
}
