//! Data shapes shared across the pipeline stages.
//!
//! Raw input and every export are plain header + rows tables of text. Typed
//! rows only exist between the normalize and derive stages.

use std::path::Path;

use crate::error::{CleanError, Result};

/// A delimited text table with a header row, kept entirely in memory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    pub fn with_headers(headers: &[&str]) -> Self {
        Self::new(headers.iter().map(|h| h.to_string()).collect())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.headers.iter().any(|h| h == column)
    }

    /// Fail with `MissingColumn` for the first required column not in the header.
    pub fn require_columns<'c>(
        &self,
        path: &Path,
        columns: impl IntoIterator<Item = &'c str>,
    ) -> Result<()> {
        for column in columns {
            if !self.has_column(column) {
                return Err(CleanError::MissingColumn {
                    path: path.to_path_buf(),
                    column: column.to_string(),
                });
            }
        }
        Ok(())
    }

    pub fn push_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    /// Records in source order.
    pub fn records(&self) -> impl Iterator<Item = RawRecord<'_>> {
        self.rows.iter().enumerate().map(move |(index, fields)| RawRecord {
            headers: &self.headers,
            fields,
            index,
        })
    }
}

/// Read-only view of one raw row, addressable by column name.
#[derive(Debug, Clone, Copy)]
pub struct RawRecord<'a> {
    headers: &'a [String],
    fields: &'a [String],
    index: usize,
}

impl<'a> RawRecord<'a> {
    /// Value of `column`, or `None` when the column is unknown or the row is short.
    pub fn get(&self, column: &str) -> Option<&'a str> {
        let position = self.headers.iter().position(|h| h == column)?;
        self.fields.get(position).map(String::as_str)
    }

    /// Zero-based position in the raw table.
    pub fn index(&self) -> usize {
        self.index
    }

    /// One-based data row number, as reported in errors.
    pub fn row_number(&self) -> usize {
        self.index + 1
    }

    /// Fields padded to the header width, values untouched.
    pub fn to_padded_row(&self) -> Vec<String> {
        let mut row: Vec<String> = self.fields.iter().take(self.headers.len()).cloned().collect();
        row.resize(self.headers.len(), String::new());
        row
    }
}

/// Clean leaderboard row.
#[derive(Debug, Clone, PartialEq)]
pub struct LeaderRow {
    pub year: i32,
    pub league: String,
    pub player_id: String,
    pub player_name: String,
    pub team: String,
    pub bases_stolen: i64,
}

/// Decoded composite Team column of the stats table.
#[derive(Debug, Clone, PartialEq)]
pub enum Season {
    Yearly { year: i32, team: String },
    Career { total_years: u32 },
}

/// Clean base running stats row, either one season or a career aggregate.
#[derive(Debug, Clone, PartialEq)]
pub struct StatLine {
    pub player_id: String,
    pub player_name: Option<String>,
    pub season: Season,
    pub stolen_bases: i64,
    pub caught_stealing: i64,
    pub stolen_base_pct: f64,
}

impl StatLine {
    pub fn is_career(&self) -> bool {
        matches!(self.season, Season::Career { .. })
    }
}

/// Clean salary row. `salary` stays `None` when nothing could be filled in.
#[derive(Debug, Clone, PartialEq)]
pub struct SalaryRow {
    pub player_id: String,
    pub uniform_number: i64,
    pub salary: Option<f64>,
    pub year: i32,
    pub team: String,
}

/// Render a float the same way on every run: whole numbers keep one decimal.
pub fn format_float(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}
