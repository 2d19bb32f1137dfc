use clap::{Arg, ArgAction, Command};

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:2048";
pub const DEFAULT_STATS_URL: &str = "https://waves-nodes-get-height.wavesnodes.com/";
pub const DEFAULT_AUTH_HEADER: &str = "X-Waves-Monitor-Auth";

/// A long option with an environment variable fallback.
fn env_arg(id: &'static str, env: &'static str, help: &'static str) -> Arg {
    Arg::new(id)
        .long(id)
        .env(env)
        .value_name(env)
        .help(help)
        .global(true)
}

pub fn build_cli() -> Command {
    Command::new("netmon")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Blockchain network health monitor")
        .arg(
            env_arg("log-level", "LOG_LEVEL", "Logging level: DEV, DEBUG, INFO, WARN, ERROR or FATAL")
                .default_value("INFO"),
        )
        .arg(
            env_arg("bind-addr", "BIND_ADDR", "Local network address to bind the HTTP API of the service on")
                .default_value(DEFAULT_BIND_ADDR),
        )
        .arg(
            env_arg("network-scheme", "NETWORK_SCHEME", "Monitored network scheme: W, T, S or E")
                .default_value("W"),
        )
        .arg(
            env_arg("stats-url", "STATS_URL", "Nodes statistics URL")
                .default_value(DEFAULT_STATS_URL),
        )
        .arg(
            env_arg("stats-poll-interval", "STATS_POLL_INTERVAL", "Nodes statistics polling interval, e.g. 30s, 1m, 1500ms")
                .default_value("1m"),
        )
        .arg(
            env_arg("stats-history-size", "STATS_HISTORY_SIZE", "Nodes statistics history size")
                .default_value("10"),
        )
        .arg(
            env_arg("network-errors-streak", "NETWORK_ERRORS_STREAK", "Consecutive alerting checks after which the network is reported as degraded")
                .default_value("5"),
        )
        .arg(
            env_arg("initial-mon-state", "INITIAL_MON_STATE", "Initial monitoring state: active, frozen_operates_stable or frozen_degraded")
                .default_value("active"),
        )
        .arg(
            env_arg("http-auth-header", "HTTP_AUTH_HEADER", "HTTP header carrying the auth token for privileged routes")
                .default_value(DEFAULT_AUTH_HEADER),
        )
        .arg(
            env_arg("http-auth-token", "HTTP_AUTH_TOKEN", "Auth token for privileged routes; empty disables them")
                .default_value("")
                .hide_env_values(true),
        )
        .arg(
            env_arg("stats-max-response-size", "STATS_MAX_RESPONSE_SIZE", "Maximum accepted size of the statistics response in bytes")
                .default_value("131072"),
        )
        .arg(
            env_arg("stats-request-timeout", "STATS_REQUEST_TIMEOUT", "Timeout of a single statistics request")
                .default_value("30s"),
        )
        .arg(
            env_arg("criterion-down-total-part", "CRITERION_DOWN_TOTAL_PART", "Fraction of down nodes that raises an alert")
                .default_value("0.3"),
        )
        .arg(
            env_arg("criterion-height-diff", "CRITERION_HEIGHT_DIFF", "Height spread between working nodes that raises an alert")
                .default_value("5"),
        )
        .arg(
            env_arg(
                "criterion-height-require-min-nodes-on-same-height",
                "CRITERION_HEIGHT_REQUIRE_MIN_NODES_ON_SAME_HEIGHT",
                "Minimum nodes required on both the lowest and highest height",
            )
            .default_value("2"),
        )
        .arg(
            env_arg(
                "criterion-statehash-min-groups-on-same-height",
                "CRITERION_STATEHASH_MIN_GROUPS_ON_SAME_HEIGHT",
                "Minimum distinct state hashes on one height that can raise an alert",
            )
            .default_value("2"),
        )
        .arg(
            env_arg(
                "criterion-statehash-min-valuable-groups",
                "CRITERION_STATEHASH_MIN_VALUABLE_GROUPS",
                "Minimum large-enough state hash groups on one height that raise an alert",
            )
            .default_value("2"),
        )
        .arg(
            env_arg(
                "criterion-statehash-min-nodes-in-valuable-group",
                "CRITERION_STATEHASH_MIN_NODES_IN_VALUABLE_GROUP",
                "Minimum nodes for a state hash group to count as valuable",
            )
            .default_value("2"),
        )
        .arg(
            env_arg(
                "criterion-statehash-require-min-nodes-on-same-height",
                "CRITERION_STATEHASH_REQUIRE_MIN_NODES_ON_SAME_HEIGHT",
                "Minimum nodes on a height for its state hashes to be compared",
            )
            .default_value("4"),
        )
        .subcommand(Command::new("serve").about("Run the monitor and its HTTP API (default)"))
        .subcommand(
            Command::new("check")
                .about("Fetch node statistics once and print the evaluation")
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Print the snapshot as JSON")
                        .action(ArgAction::SetTrue),
                ),
        )
}
