use anyhow::Result;
use options::{Command, LogFormat};
use scriptorium::harness::ModuleRunner;
use scriptorium::module::essay::Essay;
use scriptorium::module::notifier::Notifier;
use scriptorium::module::review::Review;
use structopt::StructOpt;
use tracing::info;

mod options;

#[tokio::main]
async fn main() -> Result<()> {
    let (command, runner) = init().await?;

    match command {
        Command::Essay(options) => runner.run(Essay::new(options)).await,
        Command::Review(options) => runner.run(Review::new(options)).await,
        Command::Notifier(options) => runner.run(Notifier::new(options)).await,
    };

    Ok(())
}

async fn init() -> Result<(options::Command, ModuleRunner)> {
    let options = options::MainOptions::from_args();

    let formatter = tracing_subscriber::fmt().with_env_filter(options.log);

    match options.log_format {
        LogFormat::Text => formatter.init(),
        LogFormat::Compact => formatter.compact().init(),
        LogFormat::Json => formatter.json().init(),
    };

    let runner = match options.status_server {
        Some(port) => ModuleRunner::new_with_status_server(port),
        None => ModuleRunner::default(),
    };

    info!("Scriptorium {}", env!("CARGO_PKG_VERSION"));

    Ok((options.command, runner))
}
