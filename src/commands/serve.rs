use std::sync::Arc;

use anyhow::{Context, Result};

use crate::api::{self, ApiState};
use crate::core::config::AppConfig;
use crate::core::network_monitor::{HttpNodeStatsSource, MonitorRuntime, NetworkMonitor};
use crate::logging::{kv, Logger};

/// Run the scheduler and the HTTP API until SIGINT or SIGTERM.
pub async fn execute(config: AppConfig) -> Result<()> {
    let log = Logger::global();

    let source = HttpNodeStatsSource::new(
        config.stats_url.as_str(),
        config.max_response_size,
        config.request_timeout,
        log.with_target("netmon::scraper"),
    )
    .context("Failed to build stats client")?;

    let monitor = Arc::new(
        NetworkMonitor::new(config.monitor_settings(), Arc::new(source), log.clone())
            .context("Failed to create network monitor")?,
    );

    if !config.auth_enabled() {
        log.warn(
            format_args!("http auth token is empty, privileged routes are disabled"),
            &[kv("header", &config.auth_header.as_str())],
        );
    }

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind HTTP API on {}", config.bind_addr))?;

    let runtime = MonitorRuntime::spawn(
        Arc::clone(&monitor),
        config.poll_interval,
        log.with_target("netmon::runtime"),
    );

    let state = ApiState::new(
        monitor,
        config.auth_header.clone(),
        config.auth_token.as_str(),
        log.with_target("netmon::api"),
    );

    log.info(
        format_args!("starting HTTP API"),
        &[kv("bind_addr", &config.bind_addr), kv("network", &config.network)],
    );

    let served = axum::serve(listener, api::router(state))
        .with_graceful_shutdown(shutdown_signal(log.clone()))
        .await;

    runtime.shutdown().await;
    log.info(format_args!("netmon stopped"), &[]);

    served.context("HTTP API failed")
}

async fn shutdown_signal(log: Logger) {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            log.error(format_args!("failed to listen for ctrl-c"), &[kv("error", &err)]);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                log.error(format_args!("failed to listen for SIGTERM"), &[kv("error", &err)]);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    log.info(format_args!("shutdown signal received"), &[]);
}
