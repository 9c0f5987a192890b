use std::env;
use std::net::SocketAddr;

const DEFAULT_TICK_MS: u64 = 50;
const DEFAULT_FEED_BUFFER: usize = 1024;
const DEFAULT_SUMMARY_INTERVAL_MS: u64 = 1_000;

#[derive(Debug, Clone)]
pub struct AppConfig {
    // Estimator
    pub estimator_tick_ms: u64,
    pub summary_interval_ms: u64,

    // Feed
    pub feed_buffer: usize,
    pub replay_file: Option<String>,
    pub replay_interval_ms: u64,

    // Observability (optional: the metrics facade stays a no-op when unset)
    pub metrics_addr: Option<SocketAddr>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            estimator_tick_ms: env::var("ESTIMATOR_TICK_MS")
                .unwrap_or_else(|_| DEFAULT_TICK_MS.to_string())
                .parse()?,
            summary_interval_ms: env::var("SUMMARY_INTERVAL_MS")
                .unwrap_or_else(|_| DEFAULT_SUMMARY_INTERVAL_MS.to_string())
                .parse()?,

            feed_buffer: env::var("FEED_BUFFER")
                .unwrap_or_else(|_| DEFAULT_FEED_BUFFER.to_string())
                .parse()?,
            replay_file: env::var("REPLAY_FILE").ok(),
            replay_interval_ms: env::var("REPLAY_INTERVAL_MS")
                .unwrap_or_else(|_| "0".into())
                .parse()?,

            metrics_addr: match env::var("METRICS_ADDR") {
                Ok(raw) => Some(
                    raw.parse()
                        .map_err(|_| anyhow::anyhow!("METRICS_ADDR is not a socket address: {raw}"))?,
                ),
                Err(_) => None,
            },
        })
    }
}
