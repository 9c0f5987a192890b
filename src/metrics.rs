use std::net::SocketAddr;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter on its own listener and register all
/// application metrics. The exporter serves the text/plain scrape payload
/// at `http://{addr}/metrics`.
pub fn init_metrics(addr: SocketAddr) -> anyhow::Result<()> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()?;

    // Pre-register counters so they appear even before the first increment.
    counter!("feed_events_total").absolute(0);
    counter!("feed_records_rejected_total").absolute(0);
    counter!("estimator_ticks_total").absolute(0);

    // Pre-register gauges at zero.
    gauge!("orders_tracked").set(0.0);

    // Histogram is lazily created on first record; force creation.
    histogram!("estimator_batch_seconds").record(0.0);

    Ok(())
}
