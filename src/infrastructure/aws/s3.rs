//! S3 transfer helpers, shelling out to the `aws` CLI.

use log::info;
use std::path::Path;
use std::process::Command;

use crate::domain::errors::{JobError, Result};

/// Uploads a local file to an `s3://` URI with `aws s3 cp`.
pub fn upload_file(local: &Path, s3_uri: &str) -> Result<()> {
    info!("Uploading {} to {}", local.display(), s3_uri);

    let status = Command::new("aws")
        .args(["s3", "cp", &local.to_string_lossy(), s3_uri])
        .status();

    match status {
        Ok(s) if s.success() => Ok(()),
        Ok(s) => Err(JobError::Write(format!(
            "upload to {} failed with {}",
            s3_uri, s
        ))),
        Err(e) => Err(JobError::Write(format!(
            "cannot run aws cli for {}: {}",
            s3_uri, e
        ))),
    }
}

/// Downloads an `s3://` object to a local file with `aws s3 cp`.
pub fn download_file(s3_uri: &str, local: &Path) -> Result<()> {
    info!("Downloading {} to {}", s3_uri, local.display());

    let output = Command::new("aws")
        .args(["s3", "cp", s3_uri, &local.to_string_lossy()])
        .output()
        .map_err(|e| JobError::TransientRequest(format!("cannot run aws cli: {}", e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(JobError::TransientRequest(format!(
            "download from {} failed: {}",
            s3_uri,
            stderr.trim()
        )));
    }
    Ok(())
}
