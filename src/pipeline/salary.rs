use tracing::info;

use crate::config::FillScope;
use crate::constants::*;
use crate::domain::{format_float, RawRecord, SalaryRow, Table};
use crate::error::{PipelineFailure, Result, Stage, StageContext};
use crate::pipeline::processing::derive::{DerivedTable, ExportKind};
use crate::pipeline::processing::normalize::{self, ForwardFill};
use crate::pipeline::processing::partition;
use crate::pipeline::processing::validate::RuleSet;
use crate::pipeline::CleaningPipeline;

const CLEANED_HEADERS: [&str; 5] = [COL_PLAYER_ID, COL_UNIFORM_NUMBERS, COL_SALARY, COL_YEAR, COL_TEAM];

/// Per-season salary and uniform number history
pub struct SalaryPipeline {
    rules: RuleSet,
    fill_scope: FillScope,
}

impl SalaryPipeline {
    pub fn new(fill_scope: FillScope) -> Self {
        Self {
            rules: RuleSet::salary(),
            fill_scope,
        }
    }

    /// Salary tables carry no career marker, so every remainder is a team name.
    pub fn partition<'a>(valid: &[RawRecord<'a>]) -> Result<Vec<(RawRecord<'a>, &'a str, &'a str)>> {
        valid
            .iter()
            .map(|record| {
                let raw = record.get(COL_TEAM).unwrap_or_default();
                let (year, team) = partition::split_validated(raw, record.row_number(), COL_TEAM)?;
                Ok((*record, year, team))
            })
            .collect()
    }

    /// Type every row, then resolve absent salaries in source order.
    pub fn normalize_rows(&self, decoded: &[(RawRecord<'_>, &str, &str)]) -> Result<Vec<SalaryRow>> {
        let mut rows = decoded
            .iter()
            .map(|(record, year, team)| {
                Ok(SalaryRow {
                    player_id: normalize::field(record, COL_PLAYER_ID, |v| Ok(normalize::text(v)))?,
                    uniform_number: normalize::field(record, COL_UNIFORM_NUMBERS, normalize::count)?,
                    salary: normalize::field(record, COL_SALARY, normalize::currency)?,
                    year: normalize::field(record, COL_TEAM, |_| normalize::year(year))?,
                    team: normalize::text(team),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        fill_salaries(&mut rows, self.fill_scope);
        Ok(rows)
    }

    pub fn cleaned_table(rows: &[SalaryRow]) -> Table {
        let mut table = Table::with_headers(&CLEANED_HEADERS);
        for row in rows {
            table.push_row(vec![
                row.player_id.clone(),
                row.uniform_number.to_string(),
                row.salary.map(format_float).unwrap_or_default(),
                row.year.to_string(),
                row.team.clone(),
            ]);
        }
        table
    }
}

/// Forward-fill `salary` over rows in the order given. With `FillScope::Player`
/// the carry is dropped whenever the player changes between consecutive rows.
pub fn fill_salaries(rows: &mut [SalaryRow], scope: FillScope) {
    let mut carry = ForwardFill::new();
    let mut previous_player: Option<String> = None;

    for row in rows.iter_mut() {
        if scope == FillScope::Player && previous_player.as_deref() != Some(row.player_id.as_str()) {
            carry.reset();
            previous_player = Some(row.player_id.clone());
        }
        row.salary = carry.fill(row.salary);
    }
}

impl CleaningPipeline for SalaryPipeline {
    fn name(&self) -> &'static str {
        SALARY_PIPELINE
    }

    fn stem(&self) -> &'static str {
        SALARY_STEM
    }

    fn rules(&self) -> &RuleSet {
        &self.rules
    }

    fn extra_columns(&self) -> &'static [&'static str] {
        &[COL_PLAYER_ID]
    }

    fn derive(
        &self,
        _raw: &Table,
        valid: &[RawRecord<'_>],
    ) -> std::result::Result<Vec<DerivedTable>, PipelineFailure> {
        let decoded = Self::partition(valid).at_stage(self.name(), Stage::Partition)?;
        let rows = self
            .normalize_rows(&decoded)
            .at_stage(self.name(), Stage::Normalize)?;

        let unresolved = rows.iter().filter(|r| r.salary.is_none()).count();
        info!(
            "Normalized {} salary rows ({} without a known salary)",
            rows.len(),
            unresolved
        );

        Ok(vec![DerivedTable::new(
            ExportKind::Cleaned,
            Self::cleaned_table(&rows),
        )])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(rows: &[[&str; 4]]) -> Table {
        let mut table = Table::with_headers(&[COL_PLAYER_ID, COL_TEAM, COL_UNIFORM_NUMBERS, COL_SALARY]);
        for row in rows {
            table.push_row(row.iter().map(|v| v.to_string()).collect());
        }
        table
    }

    fn cleaned(table: &Table, scope: FillScope) -> Table {
        let valid: Vec<_> = table.records().collect();
        let mut derived = SalaryPipeline::new(scope).derive(table, &valid).unwrap();
        derived.remove(0).table
    }

    #[test]
    fn test_salary_fill_in_source_order() {
        let table = raw(&[
            ["p1", "2001 Boston Red Sox", "7", "$1,000.00"],
            ["p1", "2002 Boston Red Sox", "7", "Undetermined"],
            ["p1", "2003 Boston Red Sox", "7", "$2,000.00"],
        ]);
        let out = cleaned(&table, FillScope::Sequence);
        let salaries: Vec<&str> = out.rows.iter().map(|r| r[2].as_str()).collect();
        assert_eq!(salaries, vec!["1000.0", "1000.0", "2000.0"]);
    }

    #[test]
    fn test_leading_unknown_salary_stays_absent() {
        let table = raw(&[
            ["p1", "2001 Boston Red Sox", "7", "\"     \""],
            ["p1", "2002 Boston Red Sox", "-", "$500"],
        ]);
        let out = cleaned(&table, FillScope::Sequence);
        assert_eq!(out.rows[0][2], "");
        assert_eq!(out.rows[1][2], "500.0");
        assert_eq!(out.rows[1][1], "0");
    }

    #[test]
    fn test_sequence_scope_crosses_players() {
        let table = raw(&[
            ["p1", "2001 Boston Red Sox", "7", "$1,000"],
            ["p2", "1999 Chicago Cubs", "12", "Undetermined"],
        ]);
        assert_eq!(cleaned(&table, FillScope::Sequence).rows[1][2], "1000.0");
        assert_eq!(cleaned(&table, FillScope::Player).rows[1][2], "");
    }

    #[test]
    fn test_composite_split_without_career_marker() {
        let table = raw(&[["p1", "2004  Boston Red Sox ", "n/a", "$5"]]);
        let out = cleaned(&table, FillScope::Sequence);
        assert_eq!(out.headers, CLEANED_HEADERS.to_vec());
        assert_eq!(out.rows[0], vec!["p1", "0", "5.0", "2004", "Boston Red Sox"]);
    }

    #[test]
    fn test_unparseable_salary_fails_the_run() {
        let table = raw(&[["p1", "2004 Boston Red Sox", "7", "about $5"]]);
        let valid: Vec<_> = table.records().collect();
        let failure = SalaryPipeline::new(FillScope::Sequence)
            .derive(&table, &valid)
            .unwrap_err();
        assert_eq!(failure.stage, Stage::Normalize);
        assert!(failure.to_string().contains("Salary"));
    }
}
