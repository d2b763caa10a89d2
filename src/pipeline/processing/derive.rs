use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

use crate::domain::{RawRecord, Table};

/// Terminal destination of a derived table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportKind {
    Cleaned,
    Rejected,
    Yearly,
    Career,
}

impl fmt::Display for ExportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExportKind::Cleaned => "cleaned",
            ExportKind::Rejected => "rejected",
            ExportKind::Yearly => "yearly",
            ExportKind::Career => "career",
        };
        f.write_str(name)
    }
}

/// A table produced by a pipeline, before a destination path is assigned
#[derive(Debug, Clone)]
pub struct DerivedTable {
    pub kind: ExportKind,
    pub table: Table,
}

impl DerivedTable {
    pub fn new(kind: ExportKind, table: Table) -> Self {
        Self { kind, table }
    }
}

/// A derived table bound to the file it will be written to
#[derive(Debug, Clone)]
pub struct PlannedExport {
    pub kind: ExportKind,
    pub path: PathBuf,
    pub table: Table,
}

/// Rejected rows keep the raw header and raw values, padded to header width.
pub fn rejected_table(raw: &Table, rejected: &[RawRecord<'_>]) -> Table {
    let mut table = Table::new(raw.headers.clone());
    for record in rejected {
        table.push_row(record.to_padded_row());
    }
    table
}
