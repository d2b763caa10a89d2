use tracing::info;

use crate::constants::*;
use crate::domain::{format_float, RawRecord, Season, StatLine, Table};
use crate::error::{PipelineFailure, Result, Stage, StageContext};
use crate::pipeline::processing::derive::{DerivedTable, ExportKind};
use crate::pipeline::processing::normalize;
use crate::pipeline::processing::partition::{self, Composite};
use crate::pipeline::processing::validate::RuleSet;
use crate::pipeline::CleaningPipeline;

/// Per-player base running lines: seasons and career totals in one raw table
pub struct StatsPipeline {
    rules: RuleSet,
}

impl StatsPipeline {
    pub fn new() -> Self {
        Self {
            rules: RuleSet::stats(),
        }
    }

    /// Decode every composite Team field. Nothing numeric has been touched yet.
    pub fn partition<'a>(valid: &[RawRecord<'a>]) -> Result<Vec<(RawRecord<'a>, Composite<'a>)>> {
        valid
            .iter()
            .map(|record| {
                let raw = record.get(COL_TEAM).unwrap_or_default();
                let composite =
                    partition::decode_validated(raw, CAREER_MARKER, record.row_number(), COL_TEAM)?;
                Ok((*record, composite))
            })
            .collect()
    }

    pub fn normalize_rows(decoded: &[(RawRecord<'_>, Composite<'_>)]) -> Result<Vec<StatLine>> {
        decoded
            .iter()
            .map(|(record, composite)| {
                let season = match composite {
                    Composite::Yearly { year, team } => Season::Yearly {
                        year: normalize::field(record, COL_TEAM, |_| normalize::year(year))?,
                        team: normalize::text(team),
                    },
                    Composite::Career { total_years } => Season::Career {
                        total_years: normalize::field(record, COL_TEAM, |_| {
                            normalize::total_years(total_years)
                        })?,
                    },
                };

                Ok(StatLine {
                    player_id: normalize::field(record, COL_PLAYER_ID, |v| Ok(normalize::text(v)))?,
                    player_name: record.get(COL_PLAYER_NAME).map(normalize::text),
                    season,
                    stolen_bases: normalize::field(record, COL_SB, normalize::count)?,
                    caught_stealing: normalize::field(record, COL_CS, normalize::count)?,
                    stolen_base_pct: normalize::field(record, COL_SBP, normalize::percentage)?,
                })
            })
            .collect()
    }

    fn leading_headers(with_name: bool) -> Vec<&'static str> {
        let mut headers = vec![COL_PLAYER_ID];
        if with_name {
            headers.push(COL_PLAYER_NAME);
        }
        headers.extend([COL_SB, COL_CS, COL_SBP]);
        headers
    }

    fn leading_fields(line: &StatLine, with_name: bool) -> Vec<String> {
        let mut fields = vec![line.player_id.clone()];
        if with_name {
            fields.push(line.player_name.clone().unwrap_or_default());
        }
        fields.extend([
            line.stolen_bases.to_string(),
            line.caught_stealing.to_string(),
            format_float(line.stolen_base_pct),
        ]);
        fields
    }

    /// Every valid line. Career rows keep the marker as their Team.
    pub fn cleaned_table(lines: &[StatLine], with_name: bool) -> Table {
        let mut headers = Self::leading_headers(with_name);
        headers.extend([COL_YEAR, COL_TEAM]);
        let mut table = Table::with_headers(&headers);
        for line in lines {
            let mut fields = Self::leading_fields(line, with_name);
            match &line.season {
                Season::Yearly { year, team } => fields.extend([year.to_string(), team.clone()]),
                Season::Career { total_years } => {
                    fields.extend([total_years.to_string(), CAREER_MARKER.to_string()])
                }
            }
            table.push_row(fields);
        }
        table
    }

    pub fn yearly_table(lines: &[StatLine], with_name: bool) -> Table {
        let mut headers = Self::leading_headers(with_name);
        headers.extend([COL_YEAR, COL_TEAM]);
        let mut table = Table::with_headers(&headers);
        for line in lines {
            if let Season::Yearly { year, team } = &line.season {
                let mut fields = Self::leading_fields(line, with_name);
                fields.extend([year.to_string(), team.clone()]);
                table.push_row(fields);
            }
        }
        table
    }

    /// Career aggregates have no team; Year becomes Total Years.
    pub fn career_table(lines: &[StatLine], with_name: bool) -> Table {
        let mut headers = Self::leading_headers(with_name);
        headers.push(COL_TOTAL_YEARS);
        let mut table = Table::with_headers(&headers);
        for line in lines {
            if let Season::Career { total_years } = &line.season {
                let mut fields = Self::leading_fields(line, with_name);
                fields.push(total_years.to_string());
                table.push_row(fields);
            }
        }
        table
    }
}

impl Default for StatsPipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl CleaningPipeline for StatsPipeline {
    fn name(&self) -> &'static str {
        STATS_PIPELINE
    }

    fn stem(&self) -> &'static str {
        STATS_STEM
    }

    fn rules(&self) -> &RuleSet {
        &self.rules
    }

    fn extra_columns(&self) -> &'static [&'static str] {
        &[COL_PLAYER_ID]
    }

    fn derive(
        &self,
        raw: &Table,
        valid: &[RawRecord<'_>],
    ) -> std::result::Result<Vec<DerivedTable>, PipelineFailure> {
        let decoded = Self::partition(valid).at_stage(self.name(), Stage::Partition)?;
        let lines = Self::normalize_rows(&decoded).at_stage(self.name(), Stage::Normalize)?;

        let careers = lines.iter().filter(|l| l.is_career()).count();
        info!(
            "Normalized {} stat lines ({} seasons, {} careers)",
            lines.len(),
            lines.len() - careers,
            careers
        );

        let with_name = raw.has_column(COL_PLAYER_NAME);
        Ok(vec![
            DerivedTable::new(ExportKind::Cleaned, Self::cleaned_table(&lines, with_name)),
            DerivedTable::new(ExportKind::Yearly, Self::yearly_table(&lines, with_name)),
            DerivedTable::new(ExportKind::Career, Self::career_table(&lines, with_name)),
        ])
    }
}
