//! Entry point for the metrics-compilation job.
//!
//! Wires the real adapters (Secrets Manager, VAST REST client, the sink for
//! the configured output location) into the job and runs it once.

use clap::Parser;
use log::{error, info};
use std::process;
use std::sync::Arc;

use vast_exporter::application::compile::CompileMetricsJob;
use vast_exporter::config::{AppConfig, CliArgs};
use vast_exporter::domain::entities::OutputLocation;
use vast_exporter::domain::errors::Result;
use vast_exporter::infrastructure::aws::secrets::AwsSecretsManagerAdapter;
use vast_exporter::infrastructure::sinks;
use vast_exporter::infrastructure::vast::client::VastClient;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = CliArgs::parse();

    match run(&args) {
        Ok(()) => info!("Compile metrics job finished."),
        Err(e) => {
            error!("Compile metrics job failed: {}", e);
            process::exit(1);
        }
    }
}

fn run(args: &CliArgs) -> Result<()> {
    let config = AppConfig::resolve(args)?;
    let credentials = config.resolve_credentials(&AwsSecretsManagerAdapter)?;
    let location = OutputLocation::parse(config.report.output_location.as_deref())?;

    let client = Arc::new(VastClient::new(credentials)?);
    let sink: Arc<dyn vast_exporter::ports::sink_port::SinkPort> =
        Arc::from(sinks::sink_for(&location));

    let job = CompileMetricsJob::new(config, client, sink);
    job.run()?;
    Ok(())
}
