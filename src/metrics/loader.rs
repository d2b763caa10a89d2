//! Loader Phase Metrics

use crate::metrics::{phase_metric, MetricDoc, MetricType, PhaseMetrics};

pub struct LoaderMetrics;

impl LoaderMetrics {
    pub fn record_table_loaded(table: &str, rows: usize) {
        ::metrics::counter!(phase_metric!(counter, "loader", "rows_inserted"), "table" => table.to_string())
            .increment(rows as u64);
    }

    pub fn record_load_success(duration_secs: f64) {
        ::metrics::counter!(phase_metric!(counter, "loader", "loads_succeeded")).increment(1);
        ::metrics::histogram!(phase_metric!(histogram, "loader", "duration_seconds")).record(duration_secs);
    }

    pub fn record_load_failure() {
        ::metrics::counter!(phase_metric!(counter, "loader", "loads_failed")).increment(1);
    }
}

impl PhaseMetrics for LoaderMetrics {
    fn register_metrics() {
        use metrics::{counter, histogram};

        let _ = counter!(phase_metric!(counter, "loader", "rows_inserted"));
        let _ = counter!(phase_metric!(counter, "loader", "loads_succeeded"));
        let _ = counter!(phase_metric!(counter, "loader", "loads_failed"));
        let _ = histogram!(phase_metric!(histogram, "loader", "duration_seconds"));
    }

    fn phase_name() -> &'static str {
        "loader"
    }

    fn metrics_documentation() -> Vec<MetricDoc> {
        vec![
            MetricDoc {
                name: phase_metric!(counter, "loader", "rows_inserted"),
                metric_type: MetricType::Counter,
                help: "Rows inserted into the relational store",
                labels: vec!["table"],
            },
            MetricDoc {
                name: phase_metric!(counter, "loader", "loads_succeeded"),
                metric_type: MetricType::Counter,
                help: "Loads committed against a recreated schema",
                labels: vec![],
            },
            MetricDoc {
                name: phase_metric!(counter, "loader", "loads_failed"),
                metric_type: MetricType::Counter,
                help: "Loads rolled back",
                labels: vec![],
            },
            MetricDoc {
                name: phase_metric!(histogram, "loader", "duration_seconds"),
                metric_type: MetricType::Histogram,
                help: "Wall time of a committed load",
                labels: vec![],
            },
        ]
    }
}
