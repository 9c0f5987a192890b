use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use crate::ingestion::feed::{parse_feed_line, FeedEvent};

/// Read newline-delimited feed events from stdin and forward them to the
/// pipeline. Returns when stdin closes, the channel closes, or a read
/// fails; upstream restarts are the supervisor's problem, not ours.
pub async fn run_stdin_listener(tx: mpsc::Sender<FeedEvent>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    tracing::info!("Reading feed events from stdin");

    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                match parse_feed_line(line) {
                    Some(event) => {
                        if tx.send(event).await.is_err() {
                            tracing::warn!("Feed channel closed; stopping stdin listener");
                            break;
                        }
                    }
                    None => {
                        tracing::debug!(raw = %line, "Skipping unparseable feed line");
                    }
                }
            }
            Ok(None) => {
                tracing::info!("Stdin feed ended");
                break;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to read feed line from stdin");
                break;
            }
        }
    }
}
