//! Shared HTTP transport with bounded retry.
//!
//! All upstream clients reuse one `reqwest::Client` (connection pooling,
//! fixed user-agent) and route calls through the retry loop below. The
//! retry behavior is carried by an explicit [`RetryPolicy`] value rather
//! than ambient state, so callers and tests can substitute their own.

use std::time::Duration;

use corpscope_core::RetryPolicy;
use serde::Serialize;
use tracing::{debug, warn};

use crate::errors::UpstreamError;

/// User-agent presented to every upstream, matching a desktop browser.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Shared HTTP transport for all upstream clients.
///
/// Cloning is cheap and clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    retry: RetryPolicy,
}

impl HttpTransport {
    /// Creates a transport with the given retry policy.
    pub fn new(retry: RetryPolicy) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self { client, retry }
    }

    /// Issues a GET request with query parameters.
    ///
    /// Retries on transient statuses and transport errors per the policy;
    /// the final response is returned as-is, including non-success statuses,
    /// so callers decide how to surface them.
    ///
    /// # Errors
    /// - `UpstreamError::RequestFailed` - Transport error after exhausting retries
    pub async fn get<Q>(
        &self,
        url: &str,
        query: &Q,
        timeout: Duration,
    ) -> Result<reqwest::Response, UpstreamError>
    where
        Q: Serialize + ?Sized,
    {
        self.execute(|| self.client.get(url).query(query).timeout(timeout))
            .await
    }

    /// Issues a POST request with a JSON body and query parameters.
    ///
    /// Same retry and status semantics as [`HttpTransport::get`].
    ///
    /// # Errors
    /// - `UpstreamError::RequestFailed` - Transport error after exhausting retries
    pub async fn post_json<Q>(
        &self,
        url: &str,
        query: &Q,
        body: &serde_json::Value,
        timeout: Duration,
    ) -> Result<reqwest::Response, UpstreamError>
    where
        Q: Serialize + ?Sized,
    {
        self.execute(|| {
            self.client
                .post(url)
                .query(query)
                .json(body)
                .timeout(timeout)
        })
        .await
    }

    /// Runs the request builder through the bounded retry loop.
    ///
    /// Attempt numbering is 1-based; backoff grows exponentially between
    /// attempts. Only statuses listed in the policy are retried.
    async fn execute<F>(&self, build: F) -> Result<reqwest::Response, UpstreamError>
    where
        F: Fn() -> reqwest::RequestBuilder,
    {
        let mut attempt = 0u32;

        loop {
            attempt += 1;
            if attempt > 1 {
                debug!(attempt, "retrying upstream request");
            }

            match build().send().await {
                Ok(response) => {
                    let status = response.status().as_u16();
                    if self.retry.is_retryable(status) && attempt <= self.retry.max_retries {
                        warn!(status, attempt, "transient upstream status, backing off");
                        tokio::time::sleep(self.retry.backoff_delay(attempt)).await;
                        continue;
                    }
                    return Ok(response);
                }
                Err(e) => {
                    if attempt <= self.retry.max_retries {
                        warn!(attempt, "upstream request error, backing off: {e}");
                        tokio::time::sleep(self.retry.backoff_delay(attempt)).await;
                        continue;
                    }
                    return Err(UpstreamError::RequestFailed {
                        reason: e.to_string(),
                    });
                }
            }
        }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new(RetryPolicy::default())
    }
}
