//! Metrics for the extraction engine
//!
//! Recording goes through the `metrics` facade, so it costs nothing unless a
//! recorder is installed. The CLI installs a Prometheus recorder with
//! [`init_metrics`] and renders a snapshot on request.

pub mod extractor;

pub use extractor::ExtractorMetrics;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::collections::HashMap;
use std::sync::{Once, OnceLock};
use tracing::{info, warn};

static INIT: Once = Once::new();
static HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the global Prometheus recorder and register all metrics.
///
/// Idempotent. Failure to install is logged, never fatal.
pub fn init_metrics() {
    INIT.call_once(|| match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            if HANDLE.set(handle).is_err() {
                warn!("METRICS: recorder handle was already stored");
            }
            register_all_metrics();
            info!("Prometheus recorder installed");
        }
        Err(e) => {
            warn!("Failed to install Prometheus recorder: {}", e);
        }
    });
}

/// Render the current snapshot in Prometheus text format, if a recorder is installed
pub fn render() -> Option<String> {
    HANDLE.get().map(|handle| handle.render())
}

/// Trait for phase-specific metrics collections
///
/// Each phase implements this trait to provide:
/// - Metric registration at startup
/// - Consistent naming conventions
/// - Documentation of what each metric measures
pub trait PhaseMetrics {
    /// Register all metrics for this phase
    fn register_metrics();

    /// Get the phase name for prefixing metrics
    fn phase_name() -> &'static str;

    /// Get documentation for all metrics in this phase
    fn metrics_documentation() -> Vec<MetricDoc>;
}

/// Documentation for a single metric
#[derive(Debug, Clone)]
pub struct MetricDoc {
    pub name: &'static str,
    pub metric_type: MetricType,
    pub help: &'static str,
    pub labels: Vec<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetricType {
    Counter,
    Histogram,
}

/// Macro to create phase-specific metric names with consistent naming
///
/// This ensures all metrics follow the naming convention:
/// profile_{phase}_{metric_name}_{type}
macro_rules! phase_metric {
    (counter, $phase:literal, $name:literal) => {
        concat!("profile_", $phase, "_", $name, "_total")
    };
    (histogram, $phase:literal, $name:literal) => {
        concat!("profile_", $phase, "_", $name)
    };
}

pub(crate) use phase_metric;

/// Register metrics for every phase, warning on name conflicts
pub fn register_all_metrics() {
    let mut all_metrics = HashMap::new();
    register_phase_metrics::<ExtractorMetrics>(&mut all_metrics);
    info!("Registered {} total metrics", all_metrics.len());
}

fn register_phase_metrics<T: PhaseMetrics>(all_metrics: &mut HashMap<&'static str, MetricDoc>) {
    T::register_metrics();
    let phase_name = T::phase_name();
    for doc in T::metrics_documentation() {
        match doc.metric_type {
            MetricType::Counter => ::metrics::describe_counter!(doc.name, doc.help),
            MetricType::Histogram => ::metrics::describe_histogram!(doc.name, doc.help),
        }
        if all_metrics.contains_key(doc.name) {
            warn!(
                "Metric name conflict detected: '{}' registered twice (phase '{}')",
                doc.name, phase_name
            );
        } else {
            all_metrics.insert(doc.name, doc);
        }
    }
}
