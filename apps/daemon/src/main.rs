use clap::Parser;

use quotesync_daemon::cli::Cli;
use quotesync_daemon::config::Config;
use quotesync_daemon::{build_state, init_tracing, run_command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env();
    init_tracing();
    let state = build_state(&config)?;
    run_command(state, cli.command.unwrap_or_default()).await
}
