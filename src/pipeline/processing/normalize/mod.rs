//! Sentinel-aware coercion of validated text fields into typed values.
//!
//! Every function returns the reason as a plain string on failure; callers
//! attach row and column through [`field`]. A failure here is fatal for the
//! whole pipeline run: once a row passed validation it must normalize.

use crate::constants::UNDETERMINED;
use crate::domain::RawRecord;
use crate::error::{CleanError, Result};

/// Trim surrounding whitespace from free text.
pub fn text(value: &str) -> String {
    value.trim().to_string()
}

/// Calendar year token of a composite field or a leaderboard Year column.
pub fn year(value: &str) -> std::result::Result<i32, String> {
    value.trim().parse::<i32>().map_err(|e| e.to_string())
}

/// Total years played, from a career composite field.
pub fn total_years(value: &str) -> std::result::Result<u32, String> {
    value.trim().parse::<u32>().map_err(|e| e.to_string())
}

/// Count-like fields: thousands separators and dashes are dropped, an empty
/// remainder (or the `n/a` placeholder) is a known zero.
pub fn count(value: &str) -> std::result::Result<i64, String> {
    let cleaned: String = value.chars().filter(|c| *c != ',' && *c != '-').collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() || cleaned.eq_ignore_ascii_case("n/a") {
        return Ok(0);
    }
    cleaned.parse::<i64>().map_err(|e| e.to_string())
}

/// Percentage fields: dashes are dropped, an empty remainder is zero. No range check.
pub fn percentage(value: &str) -> std::result::Result<f64, String> {
    let cleaned: String = value.chars().filter(|c| *c != '-').collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return Ok(0.0);
    }
    cleaned.parse::<f64>().map_err(|e| e.to_string())
}

/// Currency fields. Placeholders and `Undetermined` are absent, not zero.
pub fn currency(value: &str) -> std::result::Result<Option<f64>, String> {
    let trimmed = value.trim();
    if is_placeholder(trimmed) || trimmed == UNDETERMINED {
        return Ok(None);
    }

    let amount: String = trimmed.chars().filter(|c| *c != '$' && *c != ',').collect();
    let amount = amount.trim();
    if is_placeholder(amount) {
        return Ok(None);
    }
    amount.parse::<f64>().map(Some).map_err(|e| e.to_string())
}

/// Blank, dash-only, or a quoted run of blanks.
fn is_placeholder(value: &str) -> bool {
    value
        .chars()
        .all(|c| c.is_whitespace() || c == '-' || c == '"')
}

/// Apply `convert` to `column` of `record`, turning a failure into a
/// `Normalization` error that names the row, column and raw value.
pub fn field<T>(
    record: &RawRecord<'_>,
    column: &str,
    convert: impl FnOnce(&str) -> std::result::Result<T, String>,
) -> Result<T> {
    let raw = record.get(column).unwrap_or_default();
    convert(raw).map_err(|reason| CleanError::Normalization {
        row: record.row_number(),
        column: column.to_string(),
        value: raw.to_string(),
        reason,
    })
}

/// Last-known-value accumulator carried through one ordered pass.
#[derive(Debug, Default, Clone)]
pub struct ForwardFill {
    last: Option<f64>,
}

impl ForwardFill {
    pub fn new() -> Self {
        Self::default()
    }

    /// Known values pass through and become the new carry; absent values take the carry.
    pub fn fill(&mut self, value: Option<f64>) -> Option<f64> {
        if value.is_some() {
            self.last = value;
        }
        self.last
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}
