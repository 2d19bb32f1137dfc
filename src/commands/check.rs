use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use colored::Colorize;

use crate::core::config::AppConfig;
use crate::core::network_monitor::{
    HttpNodeStatsSource, MonitorState, NetworkMonitor, StatsSnapshot,
};
use crate::logging::Logger;

/// Fetch node stats once, evaluate them and print the snapshot.
///
/// Alerts do not affect the exit status; fetch and config errors do.
pub async fn execute(config: AppConfig, json: bool) -> Result<()> {
    let log = Logger::global();

    let source = HttpNodeStatsSource::new(
        config.stats_url.as_str(),
        config.max_response_size,
        config.request_timeout,
        log.with_target("netmon::scraper"),
    )
    .context("Failed to build stats client")?;

    let mut settings = config.monitor_settings();
    settings.initial_state = MonitorState::Active;
    let monitor = NetworkMonitor::new(settings, Arc::new(source), log)
        .context("Failed to create network monitor")?;

    monitor
        .check_nodes(Utc::now())
        .await
        .with_context(|| format!("Failed to check nodes from {}", config.stats_url))?;

    let snapshot = monitor
        .latest_snapshot()
        .context("No snapshot was recorded")?;

    if json {
        let text = serde_json::to_string_pretty(&snapshot).context("Failed to serialize snapshot")?;
        println!("{}", text);
    } else {
        print_snapshot(&config, &snapshot);
    }
    Ok(())
}

fn flag(alert: bool) -> colored::ColoredString {
    if alert {
        "ALERT".red().bold()
    } else {
        "ok".green()
    }
}

fn print_snapshot(config: &AppConfig, snapshot: &StatsSnapshot) {
    let working = snapshot.nodes.working_nodes().len();
    let down = snapshot.nodes.down_nodes().len();

    println!(
        "{} {}",
        "Network".bold(),
        config.network.to_string().cyan()
    );
    println!("  checked at:  {}", snapshot.created_at.to_rfc3339());
    println!("  max height:  {}", snapshot.max_height);
    println!(
        "  nodes:       {} total, {} working, {} down",
        snapshot.nodes.len(),
        working.to_string().green(),
        if down > 0 {
            down.to_string().red()
        } else {
            down.to_string().normal()
        }
    );
    println!();
    println!("  down nodes:  {}", flag(snapshot.down_nodes_alert));
    println!("  height:      {}", flag(snapshot.height_alert));
    println!("  state hash:  {}", flag(snapshot.state_hash_alert));
    println!();

    if snapshot.has_alert() {
        println!("{}", "✗ Network criteria raised an alert".red());
    } else {
        println!("{}", "✓ Network operates normally".green());
    }

    for node in snapshot.nodes.iter() {
        let height = if node.is_down() {
            "down".red().to_string()
        } else {
            node.height.to_string()
        };
        println!("  {} {} {}", "•".cyan(), node.domain.bold(), height);
    }
}
