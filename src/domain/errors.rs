// Copyright 2026 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Core error definitions for the VAST metrics exporter.
//!
//! This module provides a centralized `JobError` enum and a `Result` type
//! used throughout the application. Every failure surfaces to the invoker as
//! one of these kinds; nothing is retried.

use thiserror::Error;

/// Error types encountered while compiling or sending a report.
#[derive(Error, Debug)]
pub enum JobError {
    /// Bad or missing credentials/configuration before any work starts.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The VAST API rejected our credentials (401/403).
    #[error("Authentication rejected by VAST: {0}")]
    Authentication(String),

    /// Network-level failure talking to an external service.
    #[error("Transient request failure: {0}")]
    TransientRequest(String),

    /// The API response did not have the expected shape.
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    /// The output URI scheme is not one we can write to.
    #[error("Unsupported output location: {0}")]
    UnsupportedLocation(String),

    /// Filesystem or upload failure while writing a report.
    #[error("Write error: {0}")]
    Write(String),
}

impl From<reqwest::Error> for JobError {
    fn from(e: reqwest::Error) -> Self {
        JobError::TransientRequest(e.to_string())
    }
}

/// A specialized Result type for the VAST metrics exporter.
pub type Result<T> = std::result::Result<T, JobError>;
