//! Extractor Phase Metrics
//!
//! Candidate volume and acceptance per locator tier, emitted profiles,
//! duplicates, and fallback activations.

use crate::metrics::{phase_metric, MetricDoc, MetricType, PhaseMetrics};

/// Metrics collection for the extraction engine
pub struct ExtractorMetrics;

impl ExtractorMetrics {
    /// Record one tier pass
    pub fn record_tier(tier: &'static str, located: usize, accepted: usize) {
        ::metrics::counter!(phase_metric!(counter, "extractor", "candidates_located"), "tier" => tier)
            .increment(located as u64);
        ::metrics::counter!(phase_metric!(counter, "extractor", "candidates_accepted"), "tier" => tier)
            .increment(accepted as u64);
        ::metrics::counter!(phase_metric!(counter, "extractor", "candidates_rejected"), "tier" => tier)
            .increment(located.saturating_sub(accepted) as u64);
    }

    /// Record the unfiltered fallback being used
    pub fn record_fallback() {
        ::metrics::counter!(phase_metric!(counter, "extractor", "fallback_activations")).increment(1);
    }

    /// Record the outcome of a complete run
    pub fn record_run(emitted: usize, duplicates: usize, duration_secs: f64) {
        ::metrics::counter!(phase_metric!(counter, "extractor", "runs")).increment(1);
        ::metrics::counter!(phase_metric!(counter, "extractor", "profiles_emitted"))
            .increment(emitted as u64);
        ::metrics::counter!(phase_metric!(counter, "extractor", "duplicates_dropped"))
            .increment(duplicates as u64);
        if emitted == 0 {
            ::metrics::counter!(phase_metric!(counter, "extractor", "empty_runs")).increment(1);
        }
        ::metrics::histogram!(phase_metric!(histogram, "extractor", "run_duration_seconds"))
            .record(duration_secs);
        ::metrics::histogram!(phase_metric!(histogram, "extractor", "profiles_per_run"))
            .record(emitted as f64);
    }
}

impl PhaseMetrics for ExtractorMetrics {
    fn register_metrics() {
        use ::metrics::{counter, histogram};

        let _ = counter!(phase_metric!(counter, "extractor", "candidates_located"));
        let _ = counter!(phase_metric!(counter, "extractor", "candidates_accepted"));
        let _ = counter!(phase_metric!(counter, "extractor", "candidates_rejected"));
        let _ = counter!(phase_metric!(counter, "extractor", "fallback_activations"));
        let _ = counter!(phase_metric!(counter, "extractor", "runs"));
        let _ = counter!(phase_metric!(counter, "extractor", "profiles_emitted"));
        let _ = counter!(phase_metric!(counter, "extractor", "duplicates_dropped"));
        let _ = counter!(phase_metric!(counter, "extractor", "empty_runs"));

        let _ = histogram!(phase_metric!(histogram, "extractor", "run_duration_seconds"));
        let _ = histogram!(phase_metric!(histogram, "extractor", "profiles_per_run"));
    }

    fn phase_name() -> &'static str {
        "extractor"
    }

    fn metrics_documentation() -> Vec<MetricDoc> {
        vec![
            MetricDoc {
                name: phase_metric!(counter, "extractor", "candidates_located"),
                metric_type: MetricType::Counter,
                help: "Candidate blocks produced by the locator",
                labels: vec!["tier"],
            },
            MetricDoc {
                name: phase_metric!(counter, "extractor", "candidates_accepted"),
                metric_type: MetricType::Counter,
                help: "Candidate blocks accepted by the relevance classifier",
                labels: vec!["tier"],
            },
            MetricDoc {
                name: phase_metric!(counter, "extractor", "candidates_rejected"),
                metric_type: MetricType::Counter,
                help: "Candidate blocks rejected by the relevance classifier",
                labels: vec!["tier"],
            },
            MetricDoc {
                name: phase_metric!(counter, "extractor", "fallback_activations"),
                metric_type: MetricType::Counter,
                help: "Runs that fell back to the unfiltered container pass",
                labels: vec![],
            },
            MetricDoc {
                name: phase_metric!(counter, "extractor", "runs"),
                metric_type: MetricType::Counter,
                help: "Completed extraction runs",
                labels: vec![],
            },
            MetricDoc {
                name: phase_metric!(counter, "extractor", "profiles_emitted"),
                metric_type: MetricType::Counter,
                help: "Canonical profiles emitted after deduplication",
                labels: vec![],
            },
            MetricDoc {
                name: phase_metric!(counter, "extractor", "duplicates_dropped"),
                metric_type: MetricType::Counter,
                help: "Profiles dropped for sharing an identity key",
                labels: vec![],
            },
            MetricDoc {
                name: phase_metric!(counter, "extractor", "empty_runs"),
                metric_type: MetricType::Counter,
                help: "Runs that produced no profiles",
                labels: vec![],
            },
            MetricDoc {
                name: phase_metric!(histogram, "extractor", "run_duration_seconds"),
                metric_type: MetricType::Histogram,
                help: "Wall time of an extraction run in seconds",
                labels: vec![],
            },
            MetricDoc {
                name: phase_metric!(histogram, "extractor", "profiles_per_run"),
                metric_type: MetricType::Histogram,
                help: "Profiles emitted per run",
                labels: vec![],
            },
        ]
    }
}
