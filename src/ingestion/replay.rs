use std::time::Duration;

use anyhow::Context;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::time::sleep;

use crate::ingestion::feed::{parse_feed_line, FeedEvent};

/// Replay a newline-delimited capture file into the feed channel,
/// optionally pacing events `interval_ms` apart. With no pacing the whole
/// file is pushed as fast as the channel accepts it.
pub async fn run_replay(
    path: &str,
    interval_ms: u64,
    tx: mpsc::Sender<FeedEvent>,
) -> anyhow::Result<()> {
    let file = File::open(path)
        .await
        .with_context(|| format!("failed to open replay file: {path}"))?;
    let mut lines = BufReader::new(file).lines();

    tracing::info!(file = %path, interval_ms, "Replaying feed capture");
    let mut sent: u64 = 0;

    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let Some(event) = parse_feed_line(line) else {
                    tracing::debug!(raw = %line, "Skipping unparseable replay line");
                    continue;
                };
                if tx.send(event).await.is_err() {
                    tracing::warn!("Feed channel closed; stopping replay");
                    break;
                }
                sent += 1;
                if interval_ms > 0 {
                    sleep(Duration::from_millis(interval_ms)).await;
                }
            }
            Ok(None) => break,
            Err(e) => {
                tracing::error!(error = %e, file = %path, "Failed to read replay line");
                break;
            }
        }
    }

    tracing::info!(events = sent, file = %path, "Replay complete");
    Ok(())
}
