use std::fs::OpenOptions;

use anyhow::{Context, Result};
use clap::Parser;

use grocery_tui::app::{self, ExitReason};
use grocery_tui::cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli)?;

    match app::run(&cli).await? {
        ExitReason::Quit => {}
        ExitReason::LoggedOut { expired: true } => {
            println!("Your session has expired due to inactivity. Please log in again.");
        }
        ExitReason::LoggedOut { expired: false } => println!("You have been logged out."),
    }
    Ok(())
}

fn init_logging(cli: &Cli) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&cli.log_file)
        .with_context(|| format!("Failed to open log file {}", cli.log_file.display()))?;
    let level = if cli.debug { "debug" } else { "info" };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .format_timestamp_millis()
        .init();
    Ok(())
}
