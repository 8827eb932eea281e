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

//! # Sink Port
//!
//! Contract for the write side of the pipeline: take a finished report and
//! put it somewhere (console, local CSV, remote Parquet).

use crate::domain::entities::Report;
use crate::domain::errors::Result;

/// `SinkPort` writes exactly one report per call, with overwrite semantics.
pub trait SinkPort: Send + Sync {
    fn write(&self, report: &Report) -> Result<()>;
}
