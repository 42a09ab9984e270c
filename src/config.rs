use std::path::PathBuf;

use tracing::trace;

use crate::MetricId;

/// Wallboard hub configuration, read from a JSON file.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct Config {
    /// Base URL of the metrics source (its `/metrics` endpoint is polled)
    pub source_url: String,

    /// Poll interval in seconds
    #[serde(default = "default_interval")]
    pub interval: u64,

    /// Shared secret expected by the source, if it requires one
    pub token: Option<String>,

    /// Directory for durable state; omit to keep state in memory only
    pub storage_dir: Option<PathBuf>,

    /// Metric ids shown on the board, in display and dispatch order
    #[serde(default = "default_metric_order")]
    pub metrics: Vec<MetricId>,
}

fn default_interval() -> u64 {
    10
}

/// The board's standard metric line-up, used when the config file does
/// not override it.
pub fn default_metric_order() -> Vec<MetricId> {
    [
        "conversations_today",
        "eval_completion_pct",
        "instascore_pct",
        "aht_seconds",
        "frt_seconds",
        "crt_minutes",
        "icsat_pct",
        "manual_qa_pct",
        "coaching_today",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

pub fn read_config_file(path: &str) -> anyhow::Result<Config> {
    let file_content = std::fs::read_to_string(path)?;
    serde_json::from_str(&file_content)
        .map_err(|_| anyhow::anyhow!("Invalid configuration file provided!"))
        .inspect(|config| trace!("loaded config: {config:?}"))
}
