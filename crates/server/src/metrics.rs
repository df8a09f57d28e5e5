//! Prometheus metrics for observability.
//!
//! This module provides metrics for monitoring the podmatch server:
//! - HTTP request metrics (latency, counts, in flight)
//! - Saved match counts by status (collected dynamically)
//! - Cache and rate limiter gauges (collected dynamically)
//!
//! Core metrics (directory calls, cache lookups, match batches) are
//! registered from `podmatch_core::metrics`.

use once_cell::sync::Lazy;
use prometheus::{
    self, Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, IntGaugeVec, Opts,
    Registry, TextEncoder,
};

use podmatch_core::saved::{MatchStore, SavedMatchFilter};

/// Global metrics registry.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

// =============================================================================
// HTTP Request Metrics
// =============================================================================

/// HTTP request duration in seconds.
pub static HTTP_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "podmatch_http_request_duration_seconds",
            "HTTP request duration in seconds",
        )
        .buckets(vec![
            0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
        ]),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests total count.
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("podmatch_http_requests_total", "Total HTTP requests"),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests currently in flight.
pub static HTTP_REQUESTS_IN_FLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "podmatch_http_requests_in_flight",
        "Number of HTTP requests currently being processed",
    )
    .unwrap()
});

// =============================================================================
// Saved Match Metrics (collected dynamically)
// =============================================================================

/// Saved matches by current status.
pub static SAVED_MATCHES_BY_STATUS: Lazy<IntGaugeVec> = Lazy::new(|| {
    IntGaugeVec::new(
        Opts::new(
            "podmatch_saved_matches_by_status",
            "Current saved match count by status",
        ),
        &["status"],
    )
    .unwrap()
});

// =============================================================================
// Cache and Rate Limiter Metrics (collected dynamically)
// =============================================================================

/// Entries currently held by the analysis cache.
pub static CACHE_ENTRIES: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new("podmatch_cache_entries", "Entries in the analysis cache").unwrap()
});

/// Directory requests admitted in the current rate limit window.
pub static RATE_LIMIT_IN_WINDOW: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "podmatch_rate_limit_requests_in_window",
        "Directory requests admitted in the current window",
    )
    .unwrap()
});

// =============================================================================
// Registration
// =============================================================================

fn register_metrics(registry: &Registry) {
    // HTTP
    registry
        .register(Box::new(HTTP_REQUEST_DURATION.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_TOTAL.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_IN_FLIGHT.clone()))
        .unwrap();

    // Saved matches
    registry
        .register(Box::new(SAVED_MATCHES_BY_STATUS.clone()))
        .unwrap();

    // Cache and limiter
    registry.register(Box::new(CACHE_ENTRIES.clone())).unwrap();
    registry
        .register(Box::new(RATE_LIMIT_IN_WINDOW.clone()))
        .unwrap();

    // Core metrics (directory, cache, matching)
    for metric in podmatch_core::metrics::all_metrics() {
        registry.register(metric).unwrap();
    }
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer).unwrap();
    String::from_utf8(buffer).unwrap()
}

/// Collect dynamic metrics from current application state.
///
/// Called before encoding so gauges reflect current values.
pub fn collect_dynamic_metrics(state: &crate::state::AppState) {
    CACHE_ENTRIES.set(state.cache().stats().size as i64);

    if let Some(limiter) = state.limiter() {
        RATE_LIMIT_IN_WINDOW.set(limiter.status().requests_in_window as i64);
    }

    let store = state.match_store();
    for status in [
        "viewed",
        "contacted",
        "pending",
        "scheduled",
        "completed",
        "rejected",
    ] {
        let filter = SavedMatchFilter::new().with_status(status);
        if let Ok(count) = store.count(&filter) {
            SAVED_MATCHES_BY_STATUS
                .with_label_values(&[status])
                .set(count);
        }
    }
}

/// Normalize a path for metric labels (replace IDs with placeholders).
pub fn normalize_path(path: &str) -> String {
    path.split('/')
        .map(|segment| {
            let is_id = uuid::Uuid::parse_str(segment).is_ok()
                || (!segment.is_empty() && segment.chars().all(|c| c.is_ascii_digit()));
            if is_id {
                "{id}"
            } else {
                segment
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}
