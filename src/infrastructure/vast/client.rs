//! Infrastructure adapter for the VAST REST API.
//!
//! One blocking, basic-authenticated GET per fetch. The appliance serves a
//! self-signed certificate, so TLS verification is disabled, matching how
//! the cluster is deployed.

use log::info;
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;

use crate::domain::entities::Credentials;
use crate::domain::errors::{JobError, Result};
use crate::domain::models::{Capacity, Quota};
use crate::ports::metrics_port::MetricsPort;

/// Concrete implementation of `MetricsPort` backed by the VAST REST API.
pub struct VastClient {
    http: Client,
    credentials: Credentials,
}

impl VastClient {
    pub fn new(credentials: Credentials) -> Result<Self> {
        let http = Client::builder()
            .danger_accept_invalid_certs(true)
            .build()?;
        Ok(Self { http, credentials })
    }

    fn get_json<T: DeserializeOwned>(&self, resource: &str, query: &[(&str, &str)]) -> Result<T> {
        let url = api_url(&self.credentials.address, resource);
        info!("GET {} {:?}", url, query);

        let response = self
            .http
            .get(&url)
            .basic_auth(&self.credentials.user, Some(&self.credentials.password))
            .query(query)
            .send()?;

        classify_status(response.status())?;

        response.json::<T>().map_err(|e| {
            JobError::MalformedPayload(format!("cannot decode {} response: {}", resource, e))
        })
    }
}

impl MetricsPort for VastClient {
    fn get_capacity(&self, path: &str, sort_key: &str) -> Result<Capacity> {
        self.get_json("capacity", &[("path", path), ("type", sort_key)])
    }

    fn get_quotas(&self, path: &str) -> Result<Vec<Quota>> {
        self.get_json("quotas", &[("path", path)])
    }
}

/// Builds the URL of one VAST API resource.
fn api_url(address: &str, resource: &str) -> String {
    format!("https://{}/api/{}/", address, resource)
}

/// Maps an HTTP status to the error kind the caller surfaces.
///
/// 401/403 mean the credentials were rejected; anything else that is not a
/// success is treated as a transient request failure (no retry here).
fn classify_status(status: StatusCode) -> Result<()> {
    if status.is_success() {
        return Ok(());
    }
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(JobError::Authentication(
            format!("VAST returned {}", status),
        )),
        other => Err(JobError::TransientRequest(format!(
            "VAST returned {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_url() {
        assert_eq!(
            api_url("example.com", "capacity"),
            "https://example.com/api/capacity/"
        );
    }

    #[test]
    fn test_classify_status_success() {
        assert!(classify_status(StatusCode::OK).is_ok());
    }

    #[test]
    fn test_classify_status_auth_rejection() {
        assert!(matches!(
            classify_status(StatusCode::UNAUTHORIZED).unwrap_err(),
            JobError::Authentication(_)
        ));
        assert!(matches!(
            classify_status(StatusCode::FORBIDDEN).unwrap_err(),
            JobError::Authentication(_)
        ));
    }

    #[test]
    fn test_classify_status_server_error_is_transient() {
        assert!(matches!(
            classify_status(StatusCode::INTERNAL_SERVER_ERROR).unwrap_err(),
            JobError::TransientRequest(_)
        ));
        assert!(matches!(
            classify_status(StatusCode::SERVICE_UNAVAILABLE).unwrap_err(),
            JobError::TransientRequest(_)
        ));
    }
}
