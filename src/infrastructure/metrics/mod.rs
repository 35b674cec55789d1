//! Prometheus Metrics Module
//!
//! Provides application-wide metrics collection using Prometheus.
//!
//! # Metrics Collected
//! - HTTP request counts by method, route, and status
//! - HTTP request latency histograms
//! - Live session gauge and cleanup eviction counter
//! - Heatmap size histogram

use once_cell::sync::Lazy;
use prometheus::{
    Encoder, Histogram, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts,
    Registry, TextEncoder,
};

const NAMESPACE: &str = "speedmap";

/// Global metrics registry
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

/// HTTP request counter - tracks total requests by method, route, and status code
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("http_requests_total", "Total number of HTTP requests").namespace(NAMESPACE),
        &["method", "path", "status"],
    )
    .expect("Failed to create HTTP_REQUESTS_TOTAL metric")
});

/// HTTP request latency histogram - tracks request duration in seconds
pub static HTTP_REQUEST_DURATION_SECONDS: Lazy<HistogramVec> = Lazy::new(|| {
    let buckets = vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0];
    HistogramVec::new(
        HistogramOpts::new(
            "http_request_duration_seconds",
            "HTTP request latency in seconds",
        )
        .namespace(NAMESPACE)
        .buckets(buckets),
        &["method", "path"],
    )
    .expect("Failed to create HTTP_REQUEST_DURATION_SECONDS metric")
});

/// Sessions currently held by the live session store
pub static TRACKED_SESSIONS: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::with_opts(
        Opts::new("tracked_sessions", "Number of live sessions in memory").namespace(NAMESPACE),
    )
    .expect("Failed to create TRACKED_SESSIONS metric")
});

/// Sessions removed by the cleanup scheduler
pub static SESSIONS_EVICTED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::with_opts(
        Opts::new(
            "sessions_evicted_total",
            "Number of inactive sessions removed by cleanup",
        )
        .namespace(NAMESPACE),
    )
    .expect("Failed to create SESSIONS_EVICTED_TOTAL metric")
});

/// Points emitted per heatmap response
pub static HEATMAP_POINTS: Lazy<Histogram> = Lazy::new(|| {
    let buckets = vec![0.0, 10.0, 50.0, 100.0, 500.0, 1000.0, 5000.0, 10000.0];
    Histogram::with_opts(
        HistogramOpts::new("heatmap_points", "Points emitted per heatmap response")
            .namespace(NAMESPACE)
            .buckets(buckets),
    )
    .expect("Failed to create HEATMAP_POINTS metric")
});

/// Register all metrics with the registry
fn register_metrics(registry: &Registry) {
    registry
        .register(Box::new(HTTP_REQUESTS_TOTAL.clone()))
        .expect("Failed to register HTTP_REQUESTS_TOTAL");
    registry
        .register(Box::new(HTTP_REQUEST_DURATION_SECONDS.clone()))
        .expect("Failed to register HTTP_REQUEST_DURATION_SECONDS");
    registry
        .register(Box::new(TRACKED_SESSIONS.clone()))
        .expect("Failed to register TRACKED_SESSIONS");
    registry
        .register(Box::new(SESSIONS_EVICTED_TOTAL.clone()))
        .expect("Failed to register SESSIONS_EVICTED_TOTAL");
    registry
        .register(Box::new(HEATMAP_POINTS.clone()))
        .expect("Failed to register HEATMAP_POINTS");
}

/// Collect and encode all metrics as Prometheus text format
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode metrics");
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}

/// Helper to record HTTP request metrics
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    let status = status.to_string();
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[method, path, status.as_str()])
        .inc();
    HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&[method, path])
        .observe(duration_secs);
}

/// Helper to record the outcome of one cleanup pass
pub fn record_cleanup_pass(evicted: usize, remaining: usize) {
    SESSIONS_EVICTED_TOTAL.inc_by(evicted as u64);
    set_tracked_sessions(remaining);
}

/// Helper to update the live session gauge
pub fn set_tracked_sessions(count: usize) {
    TRACKED_SESSIONS.set(count as i64);
}

/// Helper to record a heatmap response size
pub fn record_heatmap(points: usize) {
    HEATMAP_POINTS.observe(points as f64);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_registration() {
        // Force lazy initialization
        let _ = &*REGISTRY;
        let _ = &*HTTP_REQUESTS_TOTAL;
        let _ = &*TRACKED_SESSIONS;
        let _ = &*SESSIONS_EVICTED_TOTAL;
        let _ = &*HEATMAP_POINTS;
    }

    #[test]
    fn test_record_http_request() {
        record_http_request("GET", "/heatmap-data", 200, 0.001);
        let metrics = gather_metrics();
        assert!(metrics.contains("speedmap_http_requests_total"));
    }

    #[test]
    fn test_record_cleanup_pass() {
        let before = SESSIONS_EVICTED_TOTAL.get();
        record_cleanup_pass(3, 7);
        assert!(SESSIONS_EVICTED_TOTAL.get() >= before + 3);
        assert!(gather_metrics().contains("speedmap_sessions_evicted_total"));
    }
}
