use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::constants::*;
use crate::domain::{RawRecord, Table};

static DIGITS_ONLY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]+$").unwrap());
static YEAR_AND_TEAM: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]+\s+\S.*$").unwrap());
static DIGIT_OR_DASH: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9-]").unwrap());
static UNIFORM_SHAPE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9-]|n/a").unwrap());
// The extractor writes a quoted run of blanks when the salary cell is empty
static SALARY_SHAPE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"[0-9]|Undetermined|\$|""#).unwrap());

/// Structural predicate over a single raw field. Never coerces.
#[derive(Debug, Clone, Copy)]
pub enum Predicate {
    /// Regex finds a match; anchored patterns constrain the whole value
    Matches(&'static Lazy<Regex>),
    /// Value is exactly one of the listed strings
    OneOf(&'static [&'static str]),
}

impl Predicate {
    pub fn holds(&self, value: Option<&str>) -> bool {
        // Absent fields fail every predicate
        let Some(value) = value else {
            return false;
        };
        match self {
            Predicate::Matches(regex) => regex.is_match(value),
            Predicate::OneOf(allowed) => allowed.iter().any(|a| *a == value),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub column: &'static str,
    pub predicate: Predicate,
}

impl FieldRule {
    pub const fn new(column: &'static str, predicate: Predicate) -> Self {
        Self { column, predicate }
    }
}

/// Verdict for one raw record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Verdict {
    Valid,
    /// Columns whose predicate failed, in rule order
    Rejected { failed: Vec<&'static str> },
}

impl Verdict {
    pub fn is_valid(&self) -> bool {
        matches!(self, Verdict::Valid)
    }
}

/// Trait for classifying raw records by shape
pub trait RowValidator {
    fn verdict(&self, record: &RawRecord<'_>) -> Verdict;
}

/// Conjunction of independent field rules
#[derive(Debug, Clone)]
pub struct RuleSet {
    pub rules: Vec<FieldRule>,
}

impl RuleSet {
    pub fn leaderboard() -> Self {
        Self {
            rules: vec![
                FieldRule::new(COL_YEAR, Predicate::Matches(&DIGITS_ONLY)),
                FieldRule::new(COL_LEAGUE, Predicate::OneOf(&LEAGUES)),
                FieldRule::new(COL_BASES_STOLEN, Predicate::Matches(&DIGITS_ONLY)),
            ],
        }
    }

    pub fn stats() -> Self {
        Self {
            rules: vec![
                FieldRule::new(COL_TEAM, Predicate::Matches(&YEAR_AND_TEAM)),
                FieldRule::new(COL_SB, Predicate::Matches(&DIGIT_OR_DASH)),
                FieldRule::new(COL_CS, Predicate::Matches(&DIGIT_OR_DASH)),
                FieldRule::new(COL_SBP, Predicate::Matches(&DIGIT_OR_DASH)),
            ],
        }
    }

    /// Deliberately coarse. The currency normalizer is the real gate for Salary.
    pub fn salary() -> Self {
        Self {
            rules: vec![
                FieldRule::new(COL_TEAM, Predicate::Matches(&YEAR_AND_TEAM)),
                FieldRule::new(COL_UNIFORM_NUMBERS, Predicate::Matches(&UNIFORM_SHAPE)),
                FieldRule::new(COL_SALARY, Predicate::Matches(&SALARY_SHAPE)),
            ],
        }
    }

    pub fn columns(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.rules.iter().map(|rule| rule.column)
    }
}

impl RowValidator for RuleSet {
    fn verdict(&self, record: &RawRecord<'_>) -> Verdict {
        let failed: Vec<&'static str> = self
            .rules
            .iter()
            .filter(|rule| !rule.predicate.holds(record.get(rule.column)))
            .map(|rule| rule.column)
            .collect();

        if failed.is_empty() {
            Verdict::Valid
        } else {
            Verdict::Rejected { failed }
        }
    }
}

/// Records of one table split by verdict, both halves in source order.
#[derive(Debug, Default)]
pub struct ValidationOutcome<'a> {
    pub valid: Vec<RawRecord<'a>>,
    pub rejected: Vec<RawRecord<'a>>,
}

impl ValidationOutcome<'_> {
    pub fn total(&self) -> usize {
        self.valid.len() + self.rejected.len()
    }
}

pub fn split_by_verdict<'a>(validator: &dyn RowValidator, table: &'a Table) -> ValidationOutcome<'a> {
    let mut outcome = ValidationOutcome::default();
    for record in table.records() {
        match validator.verdict(&record) {
            Verdict::Valid => outcome.valid.push(record),
            Verdict::Rejected { failed } => {
                tracing::debug!(row = record.row_number(), failed = ?failed, "Row rejected");
                outcome.rejected.push(record);
            }
        }
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(headers: &[&str], rows: &[&[&str]]) -> Table {
        let mut table = Table::with_headers(headers);
        for row in rows {
            table.push_row(row.iter().map(|v| v.to_string()).collect());
        }
        table
    }

    fn verdicts(rules: &RuleSet, table: &Table) -> Vec<bool> {
        table.records().map(|r| rules.verdict(&r).is_valid()).collect()
    }

    #[test]
    fn test_leaderboard_rules() {
        let t = table(
            &["Year", "League", "Bases Stolen"],
            &[
                &["1990", "American League", "65"],
                &["1990", "National League", "77"],
                &["1990*", "American League", "65"],
                &["1990", "Federal League", "65"],
                &["1990", "American League", ""],
                &["Year", "League", "Bases Stolen"],
                &[" 1990", "American League", "65"],
            ],
        );
        assert_eq!(
            verdicts(&RuleSet::leaderboard(), &t),
            vec![true, true, false, false, false, false, false]
        );
    }

    #[test]
    fn test_stats_rules() {
        let t = table(
            &["Team", "Stolen Bases (SB)", "Caught Stealing (CS)", "Stolen Bases Percentage"],
            &[
                &["1990 Miami", "12", "3-", "-"],
                &["15 Years", "150", "40", "78.9"],
                &["1990 St. Louis Cardinals", "1,234", "--", "55.0%"],
                &["Miami", "12", "3", "50"],
                &["1990 ", "12", "3", "50"],
                &["1990 Miami", "", "3", "50"],
                &["1990 Miami", "n/a", "3", "50"],
            ],
        );
        assert_eq!(
            verdicts(&RuleSet::stats(), &t),
            vec![true, true, true, false, false, false, false]
        );
    }

    #[test]
    fn test_salary_rules() {
        let t = table(
            &["Team", "Uniform Numbers", "Salary"],
            &[
                &["2001 Boston Red Sox", "7", "$1,000.00"],
                &["2002 Boston Red Sox", "n/a", "Undetermined"],
                &["2003 Boston Red Sox", "-", "\"     \""],
                &["2004 Boston Red Sox", "", "$5"],
                &["2004 Boston Red Sox", "7", "unknown"],
                &["2004 Boston Red Sox", "7", ""],
            ],
        );
        assert_eq!(
            verdicts(&RuleSet::salary(), &t),
            vec![true, true, true, false, false, false]
        );
    }

    #[test]
    fn test_rejected_verdict_lists_every_failed_column() {
        let t = table(&["Year", "League", "Bases Stolen"], &[&["x", "y", "z"]]);
        let record = t.records().next().unwrap();
        assert_eq!(
            RuleSet::leaderboard().verdict(&record),
            Verdict::Rejected {
                failed: vec!["Year", "League", "Bases Stolen"]
            }
        );
    }

    #[test]
    fn test_split_is_a_partition_of_the_input() {
        let t = table(
            &["Year", "League", "Bases Stolen"],
            &[
                &["1990", "American League", "65"],
                &["bad", "American League", "65"],
                &["1991", "National League", "50"],
                &["1992"],
            ],
        );
        let outcome = split_by_verdict(&RuleSet::leaderboard(), &t);
        assert_eq!(outcome.total(), t.len());

        let mut seen: Vec<usize> = outcome
            .valid
            .iter()
            .chain(outcome.rejected.iter())
            .map(|r| r.index())
            .collect();
        seen.sort();
        assert_eq!(seen, vec![0, 1, 2, 3]);
        assert_eq!(outcome.valid.iter().map(|r| r.index()).collect::<Vec<_>>(), vec![0, 2]);
    }
}
