//! Entry point for the quota-alert job.

use clap::Parser;
use log::{error, info};
use std::process;

use vast_exporter::application::notify::SendNotificationJob;
use vast_exporter::config::{NotifyArgs, NotifyConfig};
use vast_exporter::domain::errors::Result;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = NotifyArgs::parse();

    match run(&args) {
        Ok(()) => info!("Send notification job finished."),
        Err(e) => {
            error!("Send notification job failed: {}", e);
            process::exit(1);
        }
    }
}

fn run(args: &NotifyArgs) -> Result<()> {
    let config = NotifyConfig::resolve(args)?;
    SendNotificationJob::new(config).run()
}
