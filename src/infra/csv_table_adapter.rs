use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::app::ports::{ExportReceipt, ExportSinkPort, TableSourcePort};
use crate::domain::Table;
use crate::error::{CleanError, Result};
use crate::pipeline::processing::derive::PlannedExport;

/// File-based implementation of the table ports, comma delimited with a header row
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvTableAdapter;

impl CsvTableAdapter {
    pub fn new() -> Self {
        Self
    }

    /// Serialize a table to CSV bytes. Same table, same bytes.
    pub fn encode(table: &Table) -> std::result::Result<Vec<u8>, csv::Error> {
        let mut writer = csv::WriterBuilder::new()
            .flexible(false)
            .from_writer(Vec::new());
        writer.write_record(&table.headers)?;
        for row in &table.rows {
            writer.write_record(row)?;
        }
        writer
            .into_inner()
            .map_err(|e| csv::Error::from(e.into_error()))
    }

    fn sibling_path(path: &Path, suffix: &str) -> PathBuf {
        let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        name.push(suffix);
        path.with_file_name(name)
    }

    fn staging_path(path: &Path) -> PathBuf {
        Self::sibling_path(path, ".tmp")
    }

    fn backup_path(path: &Path) -> PathBuf {
        Self::sibling_path(path, ".bak")
    }

    fn stage(export: &PlannedExport) -> Result<(PathBuf, ExportReceipt)> {
        let bytes = Self::encode(&export.table).map_err(|source| CleanError::Csv {
            path: export.path.clone(),
            source,
        })?;

        if let Some(dir) = export.path.parent() {
            fs::create_dir_all(dir).map_err(|source| CleanError::Write {
                path: dir.to_path_buf(),
                source,
            })?;
        }

        let staging = Self::staging_path(&export.path);
        fs::write(&staging, &bytes).map_err(|source| CleanError::Write {
            path: staging.clone(),
            source,
        })?;
        debug!("Staged {} bytes at {}", bytes.len(), staging.display());

        let receipt = ExportReceipt {
            kind: export.kind,
            path: export.path.clone(),
            rows: export.table.len(),
            sha256: hex::encode(Sha256::digest(&bytes)),
        };
        Ok((staging, receipt))
    }

    /// Move the staged file over `dest`, keeping any previous file as a
    /// backup until the whole set is in place.
    fn swap_in(staging: &Path, dest: &Path) -> Result<Option<PathBuf>> {
        let backup = if dest.is_file() {
            let backup = Self::backup_path(dest);
            fs::rename(dest, &backup).map_err(|source| CleanError::Write {
                path: dest.to_path_buf(),
                source,
            })?;
            Some(backup)
        } else {
            None
        };

        if let Err(source) = fs::rename(staging, dest) {
            if let Some(backup) = &backup {
                Self::restore(backup, dest);
            }
            return Err(CleanError::Write {
                path: dest.to_path_buf(),
                source,
            });
        }
        Ok(backup)
    }

    fn restore(backup: &Path, dest: &Path) {
        if let Err(e) = fs::rename(backup, dest) {
            warn!("Could not restore {} from {}: {}", dest.display(), backup.display(), e);
        }
    }

    /// Undo already swapped exports, newest first.
    fn roll_back(swapped: &[(&Path, Option<PathBuf>)]) {
        for (dest, backup) in swapped.iter().rev() {
            match backup {
                Some(backup) => Self::restore(backup, dest),
                None => {
                    if let Err(e) = fs::remove_file(dest) {
                        warn!("Could not remove partial export {}: {}", dest.display(), e);
                    }
                }
            }
        }
    }

    fn discard(staged: &[(PathBuf, ExportReceipt)]) {
        for (staging, _) in staged {
            if let Err(e) = fs::remove_file(staging) {
                warn!("Could not remove staged export {}: {}", staging.display(), e);
            }
        }
    }
}

impl TableSourcePort for CsvTableAdapter {
    fn read_table(&self, path: &Path) -> Result<Table> {
        let file = File::open(path).map_err(|source| CleanError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let csv_error = |source: csv::Error| CleanError::Csv {
            path: path.to_path_buf(),
            source,
        };

        // Short and long rows are kept as-is; validation decides what they mean
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(file);

        let headers: Vec<String> = reader
            .headers()
            .map_err(csv_error)?
            .iter()
            .map(str::to_string)
            .collect();

        let mut table = Table::new(headers);
        for record in reader.records() {
            let record = record.map_err(csv_error)?;
            table.push_row(record.iter().map(str::to_string).collect());
        }
        Ok(table)
    }
}

impl ExportSinkPort for CsvTableAdapter {
    /// Write every export to a staging file first, then rename them all into
    /// place. Any failure removes the staged files and puts previous exports
    /// back, so the set is replaced whole or not at all.
    fn commit(&self, exports: &[PlannedExport]) -> Result<Vec<ExportReceipt>> {
        let mut staged = Vec::with_capacity(exports.len());
        for export in exports {
            match Self::stage(export) {
                Ok(entry) => staged.push(entry),
                Err(e) => {
                    Self::discard(&staged);
                    return Err(e);
                }
            }
        }

        let mut swapped: Vec<(&Path, Option<PathBuf>)> = Vec::with_capacity(staged.len());
        for (index, (staging, receipt)) in staged.iter().enumerate() {
            match Self::swap_in(staging, &receipt.path) {
                Ok(backup) => swapped.push((receipt.path.as_path(), backup)),
                Err(e) => {
                    Self::discard(&staged[index..]);
                    Self::roll_back(&swapped);
                    return Err(e);
                }
            }
        }

        for backup in swapped.iter().filter_map(|(_, backup)| backup.as_ref()) {
            if let Err(e) = fs::remove_file(backup) {
                warn!("Could not remove backup {}: {}", backup.display(), e);
            }
        }
        Ok(staged.iter().map(|(_, receipt)| receipt.clone()).collect())
    }
}
