use std::time::Duration;

use netmon::cli::build_cli;
use netmon::core::config::AppConfig;
use netmon::{MonitorState, NetworkScheme};

/// Drop every env fallback the CLI reads so only explicit flags and
/// defaults are seen.
fn clear_env() {
    let cli = build_cli();
    for arg in cli.get_arguments() {
        if let Some(env) = arg.get_env() {
            std::env::remove_var(env);
        }
    }
}

fn config_from(args: &[&str]) -> netmon::Result<AppConfig> {
    clear_env();
    let mut argv = vec!["netmon"];
    argv.extend_from_slice(args);
    let matches = build_cli().try_get_matches_from(argv).unwrap();
    AppConfig::from_matches(&matches)
}

#[test]
fn test_config_explicit_flags() {
    let config = config_from(&[
        "--log-level",
        "DEV",
        "--bind-addr",
        "127.0.0.1:8080",
        "--network-scheme",
        "T",
        "--stats-url",
        "http://localhost:9000/stats",
        "--stats-poll-interval",
        "15s",
        "--stats-history-size",
        "3",
        "--network-errors-streak",
        "2",
        "--initial-mon-state",
        "frozen_operates_stable",
        "--http-auth-token",
        "secret",
        "--criterion-height-diff",
        "10",
        "--criterion-down-total-part",
        "0.5",
    ])
    .unwrap();

    assert_eq!(config.log_level, log::LevelFilter::Debug);
    assert_eq!(config.bind_addr.port(), 8080);
    assert_eq!(config.network, NetworkScheme::Testnet);
    assert_eq!(config.stats_url.as_str(), "http://localhost:9000/stats");
    assert_eq!(config.poll_interval, Duration::from_secs(15));
    assert_eq!(config.initial_state, MonitorState::FrozenOperatesStable);
    assert!(config.auth_enabled());
    assert_eq!(config.criteria.height.height_diff, 10);
    assert_eq!(config.criteria.down_nodes.total_down_fraction, 0.5);

    let settings = config.monitor_settings();
    assert_eq!(settings.history_size, 3);
    assert_eq!(settings.alert_streak_threshold, 2);
    assert_eq!(settings.network, NetworkScheme::Testnet);
}

#[test]
fn test_config_defaults() {
    let config = config_from(&[]).unwrap();

    assert_eq!(config.log_level, log::LevelFilter::Info);
    assert_eq!(config.bind_addr.to_string(), "0.0.0.0:2048");
    assert_eq!(config.network, NetworkScheme::Mainnet);
    assert_eq!(
        config.stats_url.as_str(),
        "https://waves-nodes-get-height.wavesnodes.com/"
    );
    assert_eq!(config.poll_interval, Duration::from_secs(60));
    assert_eq!(config.history_size, 10);
    assert_eq!(config.errors_streak, 5);
    assert_eq!(config.initial_state, MonitorState::Active);
    assert_eq!(config.auth_header.as_str(), "x-waves-monitor-auth");
    assert!(!config.auth_enabled());
    assert_eq!(config.max_response_size, 128 * 1024);
    assert_eq!(config.request_timeout, Duration::from_secs(30));
    assert_eq!(config.criteria, netmon::core::network_monitor::Criteria::default());
}

#[test]
fn test_config_flags_after_subcommand() {
    clear_env();
    let matches = build_cli()
        .try_get_matches_from(["netmon", "check", "--network-scheme", "S", "--json"])
        .unwrap();
    let (_, sub) = matches.subcommand().unwrap();
    let config = AppConfig::from_matches(sub).unwrap();
    assert_eq!(config.network, NetworkScheme::Stagenet);
}

#[test]
fn test_config_rejects_invalid_values() {
    let cases: &[&[&str]] = &[
        &["--network-scheme", "X"],
        &["--stats-url", "not a url"],
        &["--stats-url", "ftp://example.com/"],
        &["--bind-addr", "localhost"],
        &["--stats-poll-interval", "0s"],
        &["--stats-poll-interval", "soon"],
        &["--stats-history-size", "0"],
        &["--network-errors-streak", "0"],
        &["--initial-mon-state", "paused"],
        &["--log-level", "LOUD"],
        &["--http-auth-header", "bad header"],
        &["--criterion-down-total-part", "1.5"],
        &["--criterion-height-diff", "0"],
    ];

    for args in cases {
        assert!(config_from(args).is_err(), "args {:?}", args);
    }
}
