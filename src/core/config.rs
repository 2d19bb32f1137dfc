//! Process configuration assembled from command line flags and environment.

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use axum::http::HeaderName;
use clap::ArgMatches;
use log::LevelFilter;
use url::Url;

use crate::core::network_monitor::{
    Criteria, DownNodesCriterion, HeightCriterion, MonitorSettings, MonitorState, NetworkScheme,
    StateHashCriterion,
};
use crate::error::{NetmonError, Result};

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub log_level: LevelFilter,
    pub bind_addr: SocketAddr,
    pub network: NetworkScheme,
    pub stats_url: Url,
    pub poll_interval: Duration,
    pub history_size: usize,
    pub errors_streak: usize,
    pub initial_state: MonitorState,
    pub auth_header: HeaderName,
    pub auth_token: String,
    pub max_response_size: usize,
    pub request_timeout: Duration,
    pub criteria: Criteria,
}

impl AppConfig {
    pub fn from_matches(matches: &ArgMatches) -> Result<Self> {
        let stats_url = value(matches, "stats-url")?;
        let stats_url = Url::parse(stats_url)
            .map_err(|e| NetmonError::config(format!("invalid stats url {:?}: {}", stats_url, e)))?;
        if !matches!(stats_url.scheme(), "http" | "https") {
            return Err(NetmonError::config(format!(
                "stats url must be http or https, got {:?}",
                stats_url.as_str()
            )));
        }

        let auth_header = value(matches, "http-auth-header")?;
        let auth_header = HeaderName::from_bytes(auth_header.as_bytes())
            .map_err(|_| NetmonError::config(format!("invalid http auth header {:?}", auth_header)))?;

        let criteria = Criteria {
            down_nodes: DownNodesCriterion {
                total_down_fraction: parse(matches, "criterion-down-total-part")?,
            },
            height: HeightCriterion {
                height_diff: parse(matches, "criterion-height-diff")?,
                min_nodes_on_extreme_height: parse(
                    matches,
                    "criterion-height-require-min-nodes-on-same-height",
                )?,
            },
            state_hash: StateHashCriterion {
                min_groups_on_same_height: parse(matches, "criterion-statehash-min-groups-on-same-height")?,
                min_valuable_groups: parse(matches, "criterion-statehash-min-valuable-groups")?,
                min_nodes_per_valuable_group: parse(
                    matches,
                    "criterion-statehash-min-nodes-in-valuable-group",
                )?,
                min_nodes_on_height: parse(
                    matches,
                    "criterion-statehash-require-min-nodes-on-same-height",
                )?,
            },
        };
        criteria.validate()?;

        let config = Self {
            log_level: parse_log_level(value(matches, "log-level")?)?,
            bind_addr: parse(matches, "bind-addr")?,
            network: value(matches, "network-scheme")?.parse()?,
            stats_url,
            poll_interval: parse_duration(value(matches, "stats-poll-interval")?)?,
            history_size: parse(matches, "stats-history-size")?,
            errors_streak: parse(matches, "network-errors-streak")?,
            initial_state: value(matches, "initial-mon-state")?.parse()?,
            auth_header,
            auth_token: value(matches, "http-auth-token")?.to_string(),
            max_response_size: parse(matches, "stats-max-response-size")?,
            request_timeout: parse_duration(value(matches, "stats-request-timeout")?)?,
            criteria,
        };

        if config.history_size < 1 {
            return Err(NetmonError::config("stats history size should be greater than zero"));
        }
        if config.errors_streak < 1 {
            return Err(NetmonError::config(
                "network errors streak should be greater than zero",
            ));
        }
        if config.max_response_size < 1 {
            return Err(NetmonError::config(
                "stats max response size should be greater than zero",
            ));
        }

        Ok(config)
    }

    pub fn monitor_settings(&self) -> MonitorSettings {
        MonitorSettings {
            initial_state: self.initial_state,
            network: self.network,
            history_size: self.history_size,
            alert_streak_threshold: self.errors_streak,
            criteria: self.criteria.clone(),
        }
    }

    /// Whether privileged routes can ever be authorized.
    pub fn auth_enabled(&self) -> bool {
        !self.auth_token.is_empty()
    }
}

fn value<'a>(matches: &'a ArgMatches, id: &str) -> Result<&'a str> {
    matches
        .get_one::<String>(id)
        .map(String::as_str)
        .ok_or_else(|| NetmonError::config(format!("missing value for --{}", id)))
}

fn parse<T>(matches: &ArgMatches, id: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = value(matches, id)?;
    raw.trim()
        .parse()
        .map_err(|e| NetmonError::config(format!("invalid value {:?} for --{}: {}", raw, id, e)))
}

/// Map a level name to a filter. `DEV` is an alias of `DEBUG` and `FATAL`
/// maps to `ERROR`.
pub fn parse_log_level(level: &str) -> Result<LevelFilter> {
    match level.trim().to_ascii_uppercase().as_str() {
        "DEV" | "DEBUG" => Ok(LevelFilter::Debug),
        "INFO" => Ok(LevelFilter::Info),
        "WARN" | "WARNING" => Ok(LevelFilter::Warn),
        "ERROR" | "FATAL" => Ok(LevelFilter::Error),
        _ => Err(NetmonError::config(format!("invalid log level {:?}", level))),
    }
}

/// Parse durations like `1m`, `30s`, `1500ms`, `2h` or `1m30s`. A bare
/// number is taken as seconds. Zero is rejected.
pub fn parse_duration(input: &str) -> Result<Duration> {
    let invalid = || NetmonError::config(format!("invalid duration {:?}", input));
    let text = input.trim();
    if text.is_empty() {
        return Err(invalid());
    }

    let total = if let Ok(secs) = text.parse::<u64>() {
        Duration::from_secs(secs)
    } else {
        let mut total = Duration::ZERO;
        let mut rest = text;
        while !rest.is_empty() {
            let digits = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
            if digits == 0 {
                return Err(invalid());
            }
            let amount: u64 = rest[..digits].parse().map_err(|_| invalid())?;
            rest = &rest[digits..];

            let unit_len = rest.find(|c: char| c.is_ascii_digit()).unwrap_or(rest.len());
            let unit = match &rest[..unit_len] {
                "ms" => Duration::from_millis(amount),
                "s" => Duration::from_secs(amount),
                "m" => Duration::from_secs(amount.checked_mul(60).ok_or_else(invalid)?),
                "h" => Duration::from_secs(amount.checked_mul(3600).ok_or_else(invalid)?),
                _ => return Err(invalid()),
            };
            rest = &rest[unit_len..];
            total = total.checked_add(unit).ok_or_else(invalid)?;
        }
        total
    };

    if total.is_zero() {
        return Err(NetmonError::config(format!(
            "duration {:?} should be greater than zero",
            input
        )));
    }
    Ok(total)
}
