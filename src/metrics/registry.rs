//! Registration of every phase's metrics, with early conflict detection.

use crate::metrics::{MetricDoc, PhaseMetrics};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

pub fn register_all_metrics() {
    let mut all_metrics = BTreeMap::new();

    register_phase_metrics::<super::cleaning::CleaningMetrics>(&mut all_metrics);
    register_phase_metrics::<super::loader::LoaderMetrics>(&mut all_metrics);

    info!(
        "Registered {} total metrics across all phases",
        all_metrics.len()
    );
    for doc in all_metrics.values() {
        debug!(
            "  - {} ({:?}) [{}]: {}",
            doc.name,
            doc.metric_type,
            doc.labels.join(","),
            doc.help
        );
    }
}

/// Register metrics for a specific phase and detect conflicts
fn register_phase_metrics<T: PhaseMetrics>(all_metrics: &mut BTreeMap<&'static str, MetricDoc>) {
    T::register_metrics();
    let phase_name = T::phase_name();

    for doc in T::metrics_documentation() {
        if extract_phase_from_metric_name(doc.name) != phase_name {
            warn!("Metric '{}' does not carry its phase prefix '{}'", doc.name, phase_name);
        }
        if all_metrics.contains_key(doc.name) {
            warn!("Metric name conflict detected: '{}' in phase '{}'", doc.name, phase_name);
        } else {
            all_metrics.insert(doc.name, doc);
        }
    }
}

/// Extract phase name from metric name (e.g., "sbc_loader_rows_inserted_total" -> "loader")
fn extract_phase_from_metric_name(metric_name: &str) -> &str {
    if let Some(stripped) = metric_name.strip_prefix("sbc_") {
        if let Some(next_underscore) = stripped.find('_') {
            return &stripped[..next_underscore];
        }
    }
    "unknown"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{CleaningMetrics, LoaderMetrics, MetricType};

    #[test]
    fn test_extract_phase_from_metric_name() {
        assert_eq!(
            extract_phase_from_metric_name("sbc_cleaning_rows_valid_total"),
            "cleaning"
        );
        assert_eq!(
            extract_phase_from_metric_name("sbc_loader_duration_seconds"),
            "loader"
        );
        assert_eq!(
            extract_phase_from_metric_name("invalid_metric_name"),
            "unknown"
        );
    }

    #[test]
    fn test_register_all_metrics_without_recorder() {
        register_all_metrics();
    }

    #[test]
    fn test_documented_metrics_follow_type_suffix() {
        let docs = CleaningMetrics::metrics_documentation()
            .into_iter()
            .chain(LoaderMetrics::metrics_documentation());
        for doc in docs {
            match doc.metric_type {
                MetricType::Counter => assert!(doc.name.ends_with("_total"), "{}", doc.name),
                MetricType::Histogram => assert!(!doc.name.ends_with("_total"), "{}", doc.name),
            }
        }
    }
}
