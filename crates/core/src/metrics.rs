//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Rate limiting of directory calls
//! - External services (podcast directory)
//! - Analysis cache
//! - Matching (scoring, batch processing, saved match lifecycle)

use once_cell::sync::Lazy;
use prometheus::{
    Histogram, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts,
};

// =============================================================================
// Rate Limiter Metrics
// =============================================================================

/// Calls that had to sleep before admission.
pub static RATE_LIMIT_WAITS: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "podmatch_rate_limit_waits_total",
        "Total directory calls delayed by the rate limiter",
    )
    .unwrap()
});

/// Time spent waiting for admission.
pub static RATE_LIMIT_WAIT_DURATION: Lazy<Histogram> = Lazy::new(|| {
    Histogram::with_opts(
        HistogramOpts::new(
            "podmatch_rate_limit_wait_seconds",
            "Time spent waiting for a rate limit slot",
        )
        .buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 60.0]),
    )
    .unwrap()
});

// =============================================================================
// External Service Metrics
// =============================================================================

/// External service request duration.
pub static EXTERNAL_SERVICE_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "podmatch_external_service_duration_seconds",
            "Duration of external service calls",
        )
        .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        &["service", "operation"],
    )
    .unwrap()
});

/// External service requests total.
pub static EXTERNAL_SERVICE_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "podmatch_external_service_requests_total",
            "Total external service requests",
        ),
        &["service", "operation", "status"], // status: "success", "error"
    )
    .unwrap()
});

/// Podcasts returned per directory search.
pub static SEARCH_RESULTS: Lazy<Histogram> = Lazy::new(|| {
    Histogram::with_opts(
        HistogramOpts::new(
            "podmatch_search_results",
            "Number of podcasts returned per directory search",
        )
        .buckets(vec![0.0, 1.0, 5.0, 10.0, 25.0, 50.0, 100.0]),
    )
    .unwrap()
});

// =============================================================================
// Cache Metrics
// =============================================================================

/// Cache lookups by result.
pub static CACHE_LOOKUPS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("podmatch_cache_lookups_total", "Total analysis cache lookups"),
        &["result"], // "hit", "miss"
    )
    .unwrap()
});

/// Cache entries removed before being read again.
pub static CACHE_EVICTIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "podmatch_cache_evictions_total",
            "Total analysis cache evictions",
        ),
        &["reason"], // "capacity", "expired", "max_age"
    )
    .unwrap()
});

/// Cache operations that failed and degraded to a miss.
pub static CACHE_ERRORS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("podmatch_cache_errors_total", "Total analysis cache errors"),
        &["kind"], // "storage", "retrieval", "invalidation"
    )
    .unwrap()
});

// =============================================================================
// Matching Metrics
// =============================================================================

/// Podcast analyses by source.
pub static ANALYSES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("podmatch_analyses_total", "Total podcast feature analyses"),
        &["source"], // "cached", "computed"
    )
    .unwrap()
});

/// Author/podcast pairs scored.
pub static MATCHES_SCORED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new("podmatch_matches_scored_total", "Total podcasts scored").unwrap()
});

/// Result batches by outcome.
pub static MATCH_BATCHES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("podmatch_match_batches_total", "Total match batches processed"),
        &["result"], // "processed", "rejected"
    )
    .unwrap()
});

/// Confidence of every processed match.
pub static MATCH_CONFIDENCE: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "podmatch_match_confidence",
            "Distribution of match confidence values",
        )
        .buckets(vec![0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8, 0.9, 0.95, 1.0]),
        &[],
    )
    .unwrap()
});

/// Saved match status transitions by target status.
pub static MATCH_STATUS_TRANSITIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "podmatch_match_status_transitions_total",
            "Total saved match status transitions",
        ),
        &["status"],
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Rate limiter
        Box::new(RATE_LIMIT_WAITS.clone()),
        Box::new(RATE_LIMIT_WAIT_DURATION.clone()),
        // External services
        Box::new(EXTERNAL_SERVICE_DURATION.clone()),
        Box::new(EXTERNAL_SERVICE_REQUESTS.clone()),
        Box::new(SEARCH_RESULTS.clone()),
        // Cache
        Box::new(CACHE_LOOKUPS.clone()),
        Box::new(CACHE_EVICTIONS.clone()),
        Box::new(CACHE_ERRORS.clone()),
        // Matching
        Box::new(ANALYSES.clone()),
        Box::new(MATCHES_SCORED.clone()),
        Box::new(MATCH_BATCHES.clone()),
        Box::new(MATCH_CONFIDENCE.clone()),
        Box::new(MATCH_STATUS_TRANSITIONS.clone()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_metrics_register() {
        let registry = prometheus::Registry::new();
        for metric in all_metrics() {
            registry.register(metric).unwrap();
        }
        CACHE_LOOKUPS.with_label_values(&["hit"]).inc();
        assert!(!registry.gather().is_empty());
    }
}
