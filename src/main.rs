use anyhow::{Context, Result};

use netmon::cli::build_cli;
use netmon::core::config::AppConfig;

#[tokio::main]
async fn main() -> Result<()> {
    let matches = build_cli().get_matches();

    // global args are visible from both levels; prefer the subcommand's view
    let (command, args) = match matches.subcommand() {
        Some((name, sub)) => (name, sub),
        None => ("serve", &matches),
    };

    let config = AppConfig::from_matches(args).context("Invalid configuration")?;
    netmon::init_logging(config.log_level);

    match command {
        "check" => netmon::commands::check(config, args.get_flag("json")).await,
        _ => netmon::commands::serve(config).await,
    }
}
