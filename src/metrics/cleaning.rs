//! Cleaning Phase Metrics
//!
//! Row verdicts, export writes and fatal failures, labelled by pipeline.

use crate::metrics::{phase_metric, MetricDoc, MetricType, PhaseMetrics};

pub struct CleaningMetrics;

impl CleaningMetrics {
    /// Record the verdict split of one validated table
    pub fn record_validation(pipeline: &str, valid: usize, rejected: usize) {
        ::metrics::counter!(phase_metric!(counter, "cleaning", "rows_valid"), "pipeline" => pipeline.to_string())
            .increment(valid as u64);
        ::metrics::counter!(phase_metric!(counter, "cleaning", "rows_rejected"), "pipeline" => pipeline.to_string())
            .increment(rejected as u64);
    }

    pub fn record_export_written(pipeline: &str, kind: &str, rows: usize) {
        ::metrics::counter!(
            phase_metric!(counter, "cleaning", "exports_written"),
            "pipeline" => pipeline.to_string(),
            "kind" => kind.to_string()
        )
        .increment(1);
        ::metrics::histogram!(
            phase_metric!(histogram, "cleaning", "export_rows"),
            "pipeline" => pipeline.to_string(),
            "kind" => kind.to_string()
        )
        .record(rows as f64);
    }

    pub fn record_run_success(pipeline: &str, duration_secs: f64) {
        ::metrics::counter!(phase_metric!(counter, "cleaning", "runs_succeeded"), "pipeline" => pipeline.to_string())
            .increment(1);
        ::metrics::histogram!(phase_metric!(histogram, "cleaning", "duration_seconds"), "pipeline" => pipeline.to_string())
            .record(duration_secs);
    }

    pub fn record_run_failure(pipeline: &str, stage: &str) {
        ::metrics::counter!(
            phase_metric!(counter, "cleaning", "runs_failed"),
            "pipeline" => pipeline.to_string(),
            "stage" => stage.to_string()
        )
        .increment(1);
    }
}

impl PhaseMetrics for CleaningMetrics {
    fn register_metrics() {
        use metrics::{counter, histogram};

        let _ = counter!(phase_metric!(counter, "cleaning", "rows_valid"));
        let _ = counter!(phase_metric!(counter, "cleaning", "rows_rejected"));
        let _ = counter!(phase_metric!(counter, "cleaning", "exports_written"));
        let _ = counter!(phase_metric!(counter, "cleaning", "runs_succeeded"));
        let _ = counter!(phase_metric!(counter, "cleaning", "runs_failed"));
        let _ = histogram!(phase_metric!(histogram, "cleaning", "export_rows"));
        let _ = histogram!(phase_metric!(histogram, "cleaning", "duration_seconds"));
    }

    fn phase_name() -> &'static str {
        "cleaning"
    }

    fn metrics_documentation() -> Vec<MetricDoc> {
        vec![
            MetricDoc {
                name: phase_metric!(counter, "cleaning", "rows_valid"),
                metric_type: MetricType::Counter,
                help: "Raw rows that passed every shape predicate",
                labels: vec!["pipeline"],
            },
            MetricDoc {
                name: phase_metric!(counter, "cleaning", "rows_rejected"),
                metric_type: MetricType::Counter,
                help: "Raw rows routed to the rejected export",
                labels: vec!["pipeline"],
            },
            MetricDoc {
                name: phase_metric!(counter, "cleaning", "exports_written"),
                metric_type: MetricType::Counter,
                help: "Export files committed",
                labels: vec!["pipeline", "kind"],
            },
            MetricDoc {
                name: phase_metric!(counter, "cleaning", "runs_succeeded"),
                metric_type: MetricType::Counter,
                help: "Pipeline runs that committed all exports",
                labels: vec!["pipeline"],
            },
            MetricDoc {
                name: phase_metric!(counter, "cleaning", "runs_failed"),
                metric_type: MetricType::Counter,
                help: "Pipeline runs aborted by a fatal error",
                labels: vec!["pipeline", "stage"],
            },
            MetricDoc {
                name: phase_metric!(histogram, "cleaning", "export_rows"),
                metric_type: MetricType::Histogram,
                help: "Rows per committed export",
                labels: vec!["pipeline", "kind"],
            },
            MetricDoc {
                name: phase_metric!(histogram, "cleaning", "duration_seconds"),
                metric_type: MetricType::Histogram,
                help: "Wall time of a successful pipeline run",
                labels: vec!["pipeline"],
            },
        ]
    }
}
