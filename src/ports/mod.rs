pub mod metrics_port;
pub mod secrets_port;
pub mod sink_port;
