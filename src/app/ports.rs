use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::app::load_use_case::Dataset;
use crate::domain::Table;
use crate::error::Result;
use crate::pipeline::processing::derive::{ExportKind, PlannedExport};

/// Reads one raw or cleaned table fully into memory
pub trait TableSourcePort {
    fn read_table(&self, path: &Path) -> Result<Table>;
}

/// Writes one pipeline's export set. Either every export is committed or none is.
pub trait ExportSinkPort {
    fn commit(&self, exports: &[PlannedExport]) -> Result<Vec<ExportReceipt>>;
}

/// Replaces the whole relational dataset in one go
pub trait DatasetStorePort {
    fn replace_dataset(&mut self, dataset: &Dataset) -> Result<LoadSummary>;
}

/// Proof of one committed export
#[derive(Clone, Debug, Serialize)]
pub struct ExportReceipt {
    pub kind: ExportKind,
    pub path: PathBuf,
    pub rows: usize,
    /// Hex SHA-256 of the written bytes
    pub sha256: String,
}

#[derive(Clone, Debug, Default, Serialize, PartialEq, Eq)]
pub struct LoadSummary {
    pub players: usize,
    pub yoy_leader: usize,
    pub player_career_stats: usize,
    pub player_yearly_stats: usize,
    pub player_salary: usize,
}
