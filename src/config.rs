//! Job settings for the exporter binaries.
//!
//! Settings come from three layers, lowest priority first: a YAML/JSON config
//! file, `VAST_*` environment variables, and CLI overrides. Credentials that
//! are still missing after that are looked up in AWS Secrets Manager via the
//! secret id named by `AWS_SECRETS_MANAGER_SECRET_ID`.

use chrono::{DateTime, NaiveDate, Utc};
use clap::Parser;
use serde::Deserialize;
use std::env;
use std::fs;

use crate::domain::entities::{Credentials, ReportKind};
use crate::domain::errors::{JobError, Result};
use crate::ports::secrets_port::SecretsPort;

/// Environment variable naming the secret to fetch when explicit
/// credentials are not provided.
pub const SECRET_ID_ENV: &str = "AWS_SECRETS_MANAGER_SECRET_ID";

/// Settings for the `compile_metrics` job.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub vast: VastConfig,
    #[serde(default)]
    pub report: ReportConfig,
}

/// Connection settings for the VAST cluster.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VastConfig {
    pub address: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    /// Top folder to run the inspection against.
    pub path: Option<String>,
    /// Sort key passed to the capacity endpoint.
    pub sort_key: Option<String>,
}

/// Report selection and destination settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportConfig {
    /// Which report this run compiles. Defaults to `summary`.
    pub kind: Option<ReportKind>,
    /// Location to write the report to. Console if absent.
    pub output_location: Option<String>,
    /// Timestamp stamped on every report row. Defaults to now (UTC).
    pub report_datetime: Option<DateTime<Utc>>,
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Compile a VAST metrics report", long_about = None)]
pub struct CliArgs {
    /// Path to configuration file (YAML or JSON)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Full settings document as a JSON string (overrides --config)
    #[arg(long = "job-settings")]
    pub job_settings: Option<String>,

    // Overrides for ad-hoc runs
    #[arg(long)]
    pub address: Option<String>,
    #[arg(long)]
    pub user: Option<String>,
    #[arg(long)]
    pub password: Option<String>,
    #[arg(long)]
    pub path: Option<String>,
    #[arg(long, value_enum)]
    pub report: Option<ReportKindArg>,
    #[arg(long = "output_location")]
    pub output_location: Option<String>,
}

/// Clap-friendly wrapper so `--report capacity` parses into a [`ReportKind`].
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum ReportKindArg {
    Summary,
    Capacity,
    Quota,
}

impl From<ReportKindArg> for ReportKind {
    fn from(arg: ReportKindArg) -> Self {
        match arg {
            ReportKindArg::Summary => ReportKind::Summary,
            ReportKindArg::Capacity => ReportKind::Capacity,
            ReportKindArg::Quota => ReportKind::Quota,
        }
    }
}

impl AppConfig {
    /// Loads settings from a YAML or JSON file.
    pub fn from_file(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| JobError::Configuration(format!("cannot read {}: {}", path, e)))?;
        let config: AppConfig = if path.ends_with(".json") {
            serde_json::from_str(&contents)
                .map_err(|e| JobError::Configuration(format!("invalid config {}: {}", path, e)))?
        } else {
            serde_yaml::from_str(&contents)
                .map_err(|e| JobError::Configuration(format!("invalid config {}: {}", path, e)))?
        };
        Ok(config)
    }

    /// Parses a full settings document passed on the CLI as JSON.
    pub fn from_json_str(settings: &str) -> Result<Self> {
        serde_json::from_str(settings)
            .map_err(|e| JobError::Configuration(format!("invalid --job-settings: {}", e)))
    }

    /// Builds the effective config: file/JSON settings, then environment,
    /// then CLI overrides.
    pub fn resolve(args: &CliArgs) -> Result<Self> {
        let mut config = if let Some(settings) = &args.job_settings {
            Self::from_json_str(settings)?
        } else if let Some(path) = &args.config {
            Self::from_file(path)?
        } else {
            Self::default()
        };
        config.merge_env();
        config.merge_cli(args);
        Ok(config)
    }

    /// Fills unset connection fields from `VAST_*` environment variables.
    pub fn merge_env(&mut self) {
        let fill = |slot: &mut Option<String>, var: &str| {
            if slot.is_none() {
                if let Ok(v) = env::var(var) {
                    if !v.is_empty() {
                        *slot = Some(v);
                    }
                }
            }
        };
        fill(&mut self.vast.address, "VAST_ADDRESS");
        fill(&mut self.vast.user, "VAST_USER");
        fill(&mut self.vast.password, "VAST_PASSWORD");
        fill(&mut self.vast.path, "VAST_PATH");
        fill(&mut self.report.output_location, "VAST_OUTPUT_LOCATION");
    }

    /// Applies CLI overrides on top of file/env settings.
    pub fn merge_cli(&mut self, args: &CliArgs) {
        if let Some(a) = &args.address {
            self.vast.address = Some(a.clone());
        }
        if let Some(u) = &args.user {
            self.vast.user = Some(u.clone());
        }
        if let Some(p) = &args.password {
            self.vast.password = Some(p.clone());
        }
        if let Some(p) = &args.path {
            self.vast.path = Some(p.clone());
        }
        if let Some(r) = args.report {
            self.report.kind = Some(r.into());
        }
        if let Some(o) = &args.output_location {
            self.report.output_location = Some(o.clone());
        }
    }

    pub fn report_kind(&self) -> ReportKind {
        self.report.kind.unwrap_or(ReportKind::Summary)
    }

    pub fn vast_path(&self) -> &str {
        self.vast.path.as_deref().unwrap_or("/")
    }

    pub fn sort_key(&self) -> &str {
        self.vast.sort_key.as_deref().unwrap_or("logical")
    }

    pub fn report_datetime(&self) -> DateTime<Utc> {
        self.report.report_datetime.unwrap_or_else(Utc::now)
    }

    /// Produces the credentials for this run.
    ///
    /// Explicit settings win; otherwise the secret named by
    /// `AWS_SECRETS_MANAGER_SECRET_ID` is fetched and parsed. One secrets
    /// call at most.
    pub fn resolve_credentials(&self, secrets: &dyn SecretsPort) -> Result<Credentials> {
        let secret_id = env::var(SECRET_ID_ENV).ok();
        self.resolve_credentials_from(secrets, secret_id.as_deref())
    }

    /// Same as [`resolve_credentials`](Self::resolve_credentials) but with the
    /// secret id passed in, so the lookup chain is testable without touching
    /// the process environment.
    pub fn resolve_credentials_from(
        &self,
        secrets: &dyn SecretsPort,
        secret_id: Option<&str>,
    ) -> Result<Credentials> {
        if let (Some(address), Some(user), Some(password)) =
            (&self.vast.address, &self.vast.user, &self.vast.password)
        {
            return Ok(Credentials {
                address: address.clone(),
                user: user.clone(),
                password: password.clone(),
            });
        }

        if let Some(id) = secret_id {
            let payload = secrets.fetch_secret(id)?;
            return parse_secret_payload(&payload);
        }

        Err(JobError::Configuration(format!(
            "no VAST credentials: set vast.address/user/password (or VAST_* env vars) \
             or point {} at a secret",
            SECRET_ID_ENV
        )))
    }
}

/// Parses the secret payload into credentials.
///
/// The secret is a JSON document `{"address": ..., "user": ..., "password": ...}`.
pub fn parse_secret_payload(payload: &str) -> Result<Credentials> {
    serde_json::from_str(payload).map_err(|e| {
        JobError::Configuration(format!("secret payload is not valid credentials JSON: {}", e))
    })
}

/// Settings for the `send_notification` job.
#[derive(Debug, Clone, Deserialize)]
pub struct NotifyConfig {
    /// Location of the compiled tables. Local directory or `s3://` prefix.
    pub tables_location: String,
    /// Endpoint to send the alert to. Log-only when absent.
    #[serde(default)]
    pub alert_url: Option<String>,
    /// Date of the reported data. Defaults to today (UTC).
    #[serde(default)]
    pub report_date: Option<NaiveDate>,
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Send a VAST quota alert", long_about = None)]
pub struct NotifyArgs {
    /// Full settings document as a JSON string
    #[arg(long = "job-settings")]
    pub job_settings: Option<String>,

    #[arg(long = "tables_location")]
    pub tables_location: Option<String>,
    #[arg(long = "alert_url")]
    pub alert_url: Option<String>,
}

impl NotifyConfig {
    pub fn resolve(args: &NotifyArgs) -> Result<Self> {
        let mut config: NotifyConfig = if let Some(settings) = &args.job_settings {
            serde_json::from_str(settings)
                .map_err(|e| JobError::Configuration(format!("invalid --job-settings: {}", e)))?
        } else {
            let tables_location = args
                .tables_location
                .clone()
                .or_else(|| env::var("VAST_TABLES_LOCATION").ok())
                .ok_or_else(|| {
                    JobError::Configuration("--tables_location is required".to_string())
                })?;
            NotifyConfig {
                tables_location,
                alert_url: None,
                report_date: None,
            }
        };
        if let Some(loc) = &args.tables_location {
            config.tables_location = loc.clone();
        }
        if let Some(url) = &args.alert_url {
            config.alert_url = Some(url.clone());
        }
        if config.alert_url.is_none() {
            config.alert_url = env::var("VAST_ALERT_URL").ok();
        }
        Ok(config)
    }

    pub fn report_date(&self) -> NaiveDate {
        self.report_date.unwrap_or_else(|| Utc::now().date_naive())
    }
}
