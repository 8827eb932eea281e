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

//! # Secrets Port
//!
//! Contract for resolving an opaque secret identifier to secret material in
//! an external secrets-management service.

use crate::domain::errors::Result;

/// `SecretsPort` performs at most one lookup per run.
pub trait SecretsPort: Send + Sync {
    /// Returns the secret string stored under `secret_id`.
    fn fetch_secret(&self, secret_id: &str) -> Result<String>;
}
