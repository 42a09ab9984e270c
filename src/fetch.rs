//! Metrics source client
//!
//! Fetches the current snapshot from the external metrics source and, for
//! chart display, trend history. The HTTP client is built once and reused
//! across polls. Any transport or decode failure surfaces as a
//! [`FetchError`]; the caller skips that cycle and leaves all persisted
//! state untouched.

use std::fmt;
use std::time::Duration;

use serde::Deserialize;
use tracing::{instrument, trace};

use crate::{MetricSnapshot, SourcePayload, TrendPoint};

/// Result type alias for source operations.
pub type FetchResult<T> = Result<T, FetchError>;

/// Errors reaching or decoding the metrics source.
#[derive(Debug)]
pub enum FetchError {
    /// Request could not be sent or the response body not read
    Transport(reqwest::Error),

    /// The source answered with a non-success status
    Status(reqwest::StatusCode),

    /// The response body was not a valid payload
    Decode(String),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Transport(err) => write!(f, "failed to reach metrics source: {err}"),
            FetchError::Status(status) => write!(f, "metrics source returned {status}"),
            FetchError::Decode(msg) => write!(f, "failed to decode source payload: {msg}"),
        }
    }
}

impl std::error::Error for FetchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FetchError::Transport(err) => Some(err),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        FetchError::Transport(err)
    }
}

#[derive(Debug, Deserialize)]
struct TrendPayload {
    #[serde(default)]
    points: Vec<TrendPoint>,
}

/// Client for the metrics source endpoints.
#[derive(Debug, Clone)]
pub struct MetricsFetcher {
    client: reqwest::Client,
    base_url: String,
    secret: Option<String>,
}

impl MetricsFetcher {
    /// Create a fetcher for a source base URL (no trailing slash needed).
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .expect("Failed to build HTTP client"),
            base_url: base_url.trim_end_matches('/').to_string(),
            secret: None,
        }
    }

    /// Authenticate requests with the source's shared secret.
    pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
        self.secret = Some(secret.into());
        self
    }

    fn get(&self, url: &str) -> reqwest::RequestBuilder {
        let mut request = self.client.get(url);
        if let Some(secret) = &self.secret {
            request = request.header("X-WALLBOARD-SECRET", secret);
        }
        request
    }

    /// Fetch the current metric snapshot.
    #[instrument(skip(self), fields(source = %self.base_url))]
    pub async fn fetch_snapshot(&self) -> FetchResult<MetricSnapshot> {
        let url = format!("{}/metrics", self.base_url);
        trace!("requesting snapshot from {url}");

        let response = self.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(FetchError::Status(response.status()));
        }

        let body = response.text().await?;
        let payload: SourcePayload =
            serde_json::from_str(&body).map_err(|e| FetchError::Decode(e.to_string()))?;

        trace!("snapshot with {} metrics received", payload.metrics.len());
        Ok(MetricSnapshot::from_payload(payload))
    }

    /// Fetch trend history for one metric. The points are passed through
    /// untouched for chart display.
    #[instrument(skip(self), fields(source = %self.base_url))]
    pub async fn fetch_trend(&self, metric_id: &str, range: &str) -> FetchResult<Vec<TrendPoint>> {
        let url = format!(
            "{}/trend?metricId={metric_id}&range={range}",
            self.base_url
        );
        trace!("requesting trend from {url}");

        let response = self.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(FetchError::Status(response.status()));
        }

        let body = response.text().await?;
        let payload: TrendPayload =
            serde_json::from_str(&body).map_err(|e| FetchError::Decode(e.to_string()))?;

        Ok(payload.points)
    }
}
