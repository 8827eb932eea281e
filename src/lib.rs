//! # VAST Metrics Exporter
//!
//! Jobs that compile capacity and quota metrics from a VAST storage cluster
//! into tabular reports (console, local CSV, or S3 Parquet) and send quota
//! alerts to a webhook.
//!
//! The crate follows the **Hexagonal Architecture** (Ports and Adapters):
//! pure report-building logic lives in `domain`, the contracts the jobs
//! depend on live in `ports`, and everything that touches the network or the
//! filesystem lives in `infrastructure`.

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod ports;
