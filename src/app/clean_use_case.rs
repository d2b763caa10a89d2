use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{error, info, info_span, warn};

use crate::app::ports::{ExportReceipt, ExportSinkPort, TableSourcePort};
use crate::config::PathsConfig;
use crate::constants;
use crate::error::{PipelineFailure, Stage, StageContext};
use crate::metrics::CleaningMetrics;
use crate::pipeline::processing::derive::{rejected_table, DerivedTable, ExportKind, PlannedExport};
use crate::pipeline::processing::validate::split_by_verdict;
use crate::pipeline::CleaningPipeline;

/// Outcome of one successful pipeline run
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub pipeline: String,
    pub raw_path: PathBuf,
    pub total_rows: usize,
    pub valid_rows: usize,
    pub rejected_rows: usize,
    pub exports: Vec<ExportReceipt>,
}

/// Use case running one cleaning pipeline end to end:
/// read, validate, derive (partition + normalize inside), commit exports
pub struct CleanUseCase<'a> {
    source: &'a dyn TableSourcePort,
    sink: &'a dyn ExportSinkPort,
    paths: &'a PathsConfig,
}

impl<'a> CleanUseCase<'a> {
    pub fn new(
        source: &'a dyn TableSourcePort,
        sink: &'a dyn ExportSinkPort,
        paths: &'a PathsConfig,
    ) -> Self {
        Self {
            source,
            sink,
            paths,
        }
    }

    pub fn raw_path(&self, pipeline: &dyn CleaningPipeline) -> PathBuf {
        self.paths.raw_dir.join(constants::raw_file_name(pipeline.stem()))
    }

    pub fn export_path(&self, stem: &str, kind: ExportKind) -> PathBuf {
        match kind {
            ExportKind::Rejected => self.paths.removed_dir.join(constants::removed_file_name(stem)),
            ExportKind::Cleaned => self.paths.cleaned_dir.join(constants::cleaned_file_name(stem)),
            ExportKind::Yearly => self.paths.cleaned_dir.join(constants::yearly_file_name(stem)),
            ExportKind::Career => self.paths.cleaned_dir.join(constants::career_file_name(stem)),
        }
    }

    /// Run one pipeline. A failure aborts only this pipeline and leaves its
    /// previous exports untouched.
    pub fn run(&self, pipeline: &dyn CleaningPipeline) -> Result<PipelineReport, PipelineFailure> {
        let span = info_span!("pipeline", pipeline = pipeline.name());
        let _enter = span.enter();
        let started = Instant::now();

        info!("Starting pipeline");
        let result = self.run_stages(pipeline);
        match &result {
            Ok(report) => {
                CleaningMetrics::record_run_success(pipeline.name(), started.elapsed().as_secs_f64());
                info!(
                    "Pipeline finished: {} valid, {} rejected of {} rows",
                    report.valid_rows, report.rejected_rows, report.total_rows
                );
            }
            Err(failure) => {
                CleaningMetrics::record_run_failure(pipeline.name(), &failure.stage.to_string());
                error!(stage = %failure.stage, "Pipeline failed: {}", failure.source);
            }
        }
        result
    }

    fn run_stages(&self, pipeline: &dyn CleaningPipeline) -> Result<PipelineReport, PipelineFailure> {
        let name = pipeline.name();
        let raw_path = self.raw_path(pipeline);

        // Read
        let raw = self.source.read_table(&raw_path).at_stage(name, Stage::Read)?;
        raw.require_columns(
            &raw_path,
            pipeline.rules().columns().chain(pipeline.extra_columns().iter().copied()),
        )
        .at_stage(name, Stage::Read)?;
        info!("Read {} raw rows from {}", raw.len(), raw_path.display());

        // Validate
        let outcome = split_by_verdict(pipeline.rules(), &raw);
        CleaningMetrics::record_validation(name, outcome.valid.len(), outcome.rejected.len());
        if !outcome.rejected.is_empty() {
            warn!("{} rows failed validation", outcome.rejected.len());
        }

        // Partition, normalize, derive
        let mut derived = pipeline.derive(&raw, &outcome.valid)?;
        derived.push(DerivedTable::new(
            ExportKind::Rejected,
            rejected_table(&raw, &outcome.rejected),
        ));

        // Persist
        let planned: Vec<PlannedExport> = derived
            .into_iter()
            .map(|d| PlannedExport {
                kind: d.kind,
                path: self.export_path(pipeline.stem(), d.kind),
                table: d.table,
            })
            .collect();
        let exports = self.sink.commit(&planned).at_stage(name, Stage::Persist)?;
        for receipt in &exports {
            CleaningMetrics::record_export_written(name, &receipt.kind.to_string(), receipt.rows);
            info!(
                "Wrote {} export ({} rows) to {}",
                receipt.kind,
                receipt.rows,
                receipt.path.display()
            );
        }

        Ok(PipelineReport {
            pipeline: name.to_string(),
            raw_path,
            total_rows: outcome.total(),
            valid_rows: outcome.valid.len(),
            rejected_rows: outcome.rejected.len(),
            exports,
        })
    }

    /// Run several pipelines independently; one failing never stops the others.
    pub fn run_all(
        &self,
        pipelines: &[Box<dyn CleaningPipeline>],
    ) -> Vec<Result<PipelineReport, PipelineFailure>> {
        pipelines.iter().map(|p| self.run(p.as_ref())).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Table;
    use crate::error::{CleanError, Result};
    use crate::pipeline::LeaderboardPipeline;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::path::Path;

    struct MemorySource {
        tables: HashMap<PathBuf, Table>,
    }

    impl TableSourcePort for MemorySource {
        fn read_table(&self, path: &Path) -> Result<Table> {
            self.tables.get(path).cloned().ok_or_else(|| CleanError::Read {
                path: path.to_path_buf(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            })
        }
    }

    #[derive(Default)]
    struct MemorySink {
        committed: RefCell<Vec<PlannedExport>>,
    }

    impl ExportSinkPort for MemorySink {
        fn commit(&self, exports: &[PlannedExport]) -> Result<Vec<ExportReceipt>> {
            self.committed.borrow_mut().extend(exports.iter().cloned());
            Ok(exports
                .iter()
                .map(|e| ExportReceipt {
                    kind: e.kind,
                    path: e.path.clone(),
                    rows: e.table.len(),
                    sha256: String::new(),
                })
                .collect())
        }
    }

    fn leaderboard_raw() -> Table {
        let mut table = Table::with_headers(&[
            "Year",
            "League",
            "Player ID",
            "Player Name",
            "Team",
            "Bases Stolen",
        ]);
        for row in [
            ["1982", "American League", "henderi01", "Rickey Henderson", "Oakland Athletics", "130"],
            ["1982", "National League", "raineti01", "Tim Raines", "Montreal Expos", "78"],
            ["1982*", "National League", "x", "x", "x", "78"],
        ] {
            table.push_row(row.iter().map(|v| v.to_string()).collect());
        }
        table
    }

    #[test]
    fn test_run_reports_counts_and_routes_exports() {
        let paths = PathsConfig::rooted_at(Path::new("/data"));
        let pipeline = LeaderboardPipeline::new();
        let source = MemorySource {
            tables: HashMap::from([(
                PathBuf::from("/data/raw_data/bases_stolen_league_leaders.csv"),
                leaderboard_raw(),
            )]),
        };
        let sink = MemorySink::default();
        let use_case = CleanUseCase::new(&source, &sink, &paths);

        let report = use_case.run(&pipeline).unwrap();
        assert_eq!(report.total_rows, 3);
        assert_eq!(report.valid_rows, 2);
        assert_eq!(report.rejected_rows, 1);

        let committed = sink.committed.borrow();
        let rejected = committed.iter().find(|e| e.kind == ExportKind::Rejected).unwrap();
        assert_eq!(
            rejected.path,
            PathBuf::from("/data/removed_data/bases_stolen_league_leaders_removed.csv")
        );
        assert_eq!(rejected.table.rows[0][0], "1982*");
    }

    #[test]
    fn test_missing_input_fails_at_read_stage() {
        let paths = PathsConfig::rooted_at(Path::new("/data"));
        let source = MemorySource {
            tables: HashMap::new(),
        };
        let sink = MemorySink::default();
        let use_case = CleanUseCase::new(&source, &sink, &paths);

        let failure = use_case.run(&LeaderboardPipeline::new()).unwrap_err();
        assert_eq!(failure.stage, Stage::Read);
        assert!(sink.committed.borrow().is_empty());
    }

    #[test]
    fn test_missing_column_fails_at_read_stage() {
        let paths = PathsConfig::rooted_at(Path::new("/data"));
        let mut raw = leaderboard_raw();
        raw.headers[3] = "Name".to_string();
        let source = MemorySource {
            tables: HashMap::from([(
                PathBuf::from("/data/raw_data/bases_stolen_league_leaders.csv"),
                raw,
            )]),
        };
        let sink = MemorySink::default();
        let use_case = CleanUseCase::new(&source, &sink, &paths);

        let failure = use_case.run(&LeaderboardPipeline::new()).unwrap_err();
        assert_eq!(failure.stage, Stage::Read);
        assert!(failure.to_string().contains("Player Name"));
    }
}
