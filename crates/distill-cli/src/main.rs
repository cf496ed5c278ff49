//! Distill CLI - Turn a document into a JSONL question/answer dataset.

use clap::Parser;
use distill_cli::commands;
use distill_cli::{Cli, Command, Config, Formatter};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.log_level.as_deref());

    let formatter = Formatter::new(!cli.no_color);
    if let Err(e) = run(cli, &formatter).await {
        eprintln!("{}", formatter.error(&e.to_string()));
        std::process::exit(1);
    }
}

async fn run(cli: Cli, formatter: &Formatter) -> distill_cli::Result<()> {
    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Command::Run(args) => {
            commands::execute_run(args, config, formatter).await?;
        }
        Command::Status(args) => {
            commands::execute_status(args, &config, formatter)?;
        }
    }

    Ok(())
}

// Logs go to stderr so stdout only carries command output.
fn init_tracing(level: Option<&str>) {
    let filter = match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}
