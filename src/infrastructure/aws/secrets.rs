//! Secrets Manager adapter.
//!
//! Resolves a secret id to its string payload using the `aws` CLI, which
//! carries the IAM role/credential chain of the host running the job.

use log::info;
use std::process::Command;

use crate::domain::errors::{JobError, Result};
use crate::ports::secrets_port::SecretsPort;

/// Fetches secrets with `aws secretsmanager get-secret-value`.
pub struct AwsSecretsManagerAdapter;

impl SecretsPort for AwsSecretsManagerAdapter {
    fn fetch_secret(&self, secret_id: &str) -> Result<String> {
        info!("Fetching secret {}", secret_id);

        let output = Command::new("aws")
            .args([
                "secretsmanager",
                "get-secret-value",
                "--secret-id",
                secret_id,
                "--query",
                "SecretString",
                "--output",
                "text",
            ])
            .output()
            .map_err(|e| {
                JobError::TransientRequest(format!("cannot run aws cli: {}", e))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(JobError::TransientRequest(format!(
                "secret lookup failed for {}: {}",
                secret_id,
                stderr.trim()
            )));
        }

        let payload = String::from_utf8(output.stdout).map_err(|e| {
            JobError::Configuration(format!("secret {} is not UTF-8: {}", secret_id, e))
        })?;
        Ok(payload.trim_end_matches('\n').to_string())
    }
}
