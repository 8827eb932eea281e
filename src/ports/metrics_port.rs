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

//! # Metrics Port
//!
//! This Port defines the contract for fetching raw metrics payloads from the
//! VAST cluster. It doesn't care whether the other side is the real REST API
//! or a mock for testing.

use crate::domain::errors::Result;
use crate::domain::models::{Capacity, Quota};

/// `MetricsPort` is the read side of the pipeline: one authenticated fetch
/// per call, no pagination, no retries.
pub trait MetricsPort: Send + Sync {
    /// Fetches capacity info for one folder of the cluster, sorted by
    /// `sort_key` (usually `logical`).
    fn get_capacity(&self, path: &str, sort_key: &str) -> Result<Capacity>;

    /// Fetches the quotas configured under one folder.
    fn get_quotas(&self, path: &str) -> Result<Vec<Quota>>;
}
