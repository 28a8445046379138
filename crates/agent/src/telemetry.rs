//! Process-wide logging and Prometheus exporter setup, driven by `RADAR_*` environment variables.

use std::str::FromStr;

/// Log filter comes from `RADAR_LOG` (default `info`).
pub fn init_tracing() {
    let env = std::env::var("RADAR_LOG").unwrap_or_else(|_| "info".to_string());
    let filter = tracing_subscriber::EnvFilter::from_str(&env).unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(true).init();
}

/// Install the Prometheus exporter when `RADAR_METRICS_ADDR` holds a `host:port`.
pub fn init_metrics() {
    if let Ok(addr) = std::env::var("RADAR_METRICS_ADDR") {
        if let Ok(sock) = addr.parse::<std::net::SocketAddr>() {
            let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
            match builder.with_http_listener(sock).install() {
                Ok(_) => tracing::info!(addr = %addr, "Prometheus metrics exporter listening"),
                Err(e) => tracing::warn!(error = %e, "failed to install metrics exporter"),
            }
        } else {
            tracing::warn!(addr = %addr, "invalid RADAR_METRICS_ADDR; expected host:port");
        }
    }
}
