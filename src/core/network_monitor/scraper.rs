//! Telemetry source: where node stats come from.

use std::time::Duration;

use async_trait::async_trait;

use super::nodes::NodeSet;
use crate::error::{NetmonError, Result};
use crate::logging::{kv, Logger};

pub const DEFAULT_MAX_RESPONSE_SIZE: usize = 128 * 1024;
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Fetches the current telemetry of every known node.
///
/// Implementations apply their own timeout and size limits. Any error is
/// treated by the monitor as transient.
#[async_trait]
pub trait NodeStatsSource: Send + Sync {
    async fn fetch(&self) -> Result<NodeSet>;
}

/// Fetches node stats from the HTTP stats service.
pub struct HttpNodeStatsSource {
    client: reqwest::Client,
    url: String,
    max_response_size: usize,
    log: Logger,
}

impl HttpNodeStatsSource {
    pub fn new(
        url: impl Into<String>,
        max_response_size: usize,
        timeout: Duration,
        log: Logger,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("netmon/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            url: url.into(),
            max_response_size,
            log,
        })
    }

    /// Read the body chunk by chunk, refusing to buffer more than the limit.
    async fn read_limited(&self, mut response: reqwest::Response) -> Result<Vec<u8>> {
        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            if body.len() + chunk.len() > self.max_response_size {
                return Err(NetmonError::fetch(format!(
                    "response from {:?} exceeds {} bytes",
                    self.url, self.max_response_size
                )));
            }
            body.extend_from_slice(&chunk);
        }
        Ok(body)
    }
}

#[async_trait]
impl NodeStatsSource for HttpNodeStatsSource {
    async fn fetch(&self) -> Result<NodeSet> {
        let response = self.client.get(&self.url).send().await?;
        let status = response.status();

        if !status.is_success() {
            // the body is only for the log; a read failure must not mask the status
            let body = self.read_limited(response).await.unwrap_or_default();
            self.log.error(
                format_args!("stats service returned an error response"),
                &[
                    kv("url", &self.url),
                    kv("status", &status),
                    kv("body", &String::from_utf8_lossy(&body)),
                ],
            );
            return Err(NetmonError::fetch(format!(
                "failed to get nodes statuses from {:?}, HTTP status {}",
                self.url, status
            )));
        }

        let body = self.read_limited(response).await?;
        let nodes: NodeSet = serde_json::from_slice(&body)?;

        self.log.debug(
            format_args!("stats successfully received"),
            &[kv("url", &self.url), kv("nodes", &nodes.len())],
        );
        Ok(nodes)
    }
}
