use tracing::info;

use crate::constants::*;
use crate::domain::{LeaderRow, RawRecord, Table};
use crate::error::{PipelineFailure, Result, Stage, StageContext};
use crate::pipeline::processing::derive::{DerivedTable, ExportKind};
use crate::pipeline::processing::normalize;
use crate::pipeline::processing::validate::RuleSet;
use crate::pipeline::CleaningPipeline;

const CLEANED_HEADERS: [&str; 6] = [
    COL_YEAR,
    COL_LEAGUE,
    COL_PLAYER_ID,
    COL_PLAYER_NAME,
    COL_TEAM,
    COL_BASES_STOLEN,
];

/// Yearly stolen-base leaders, one row per league and season
pub struct LeaderboardPipeline {
    rules: RuleSet,
}

impl LeaderboardPipeline {
    pub fn new() -> Self {
        Self {
            rules: RuleSet::leaderboard(),
        }
    }

    pub fn normalize_rows(valid: &[RawRecord<'_>]) -> Result<Vec<LeaderRow>> {
        valid
            .iter()
            .map(|record| {
                Ok(LeaderRow {
                    year: normalize::field(record, COL_YEAR, normalize::year)?,
                    league: normalize::field(record, COL_LEAGUE, |v| Ok(normalize::text(v)))?,
                    player_id: normalize::field(record, COL_PLAYER_ID, |v| Ok(normalize::text(v)))?,
                    player_name: normalize::field(record, COL_PLAYER_NAME, |v| Ok(normalize::text(v)))?,
                    team: normalize::field(record, COL_TEAM, |v| Ok(normalize::text(v)))?,
                    bases_stolen: normalize::field(record, COL_BASES_STOLEN, normalize::count)?,
                })
            })
            .collect()
    }

    pub fn cleaned_table(rows: &[LeaderRow]) -> Table {
        let mut table = Table::with_headers(&CLEANED_HEADERS);
        for row in rows {
            table.push_row(vec![
                row.year.to_string(),
                row.league.clone(),
                row.player_id.clone(),
                row.player_name.clone(),
                row.team.clone(),
                row.bases_stolen.to_string(),
            ]);
        }
        table
    }
}

impl Default for LeaderboardPipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl CleaningPipeline for LeaderboardPipeline {
    fn name(&self) -> &'static str {
        LEADERBOARD_PIPELINE
    }

    fn stem(&self) -> &'static str {
        LEADERBOARD_STEM
    }

    fn rules(&self) -> &RuleSet {
        &self.rules
    }

    fn extra_columns(&self) -> &'static [&'static str] {
        &[COL_PLAYER_ID, COL_PLAYER_NAME, COL_TEAM]
    }

    fn derive(
        &self,
        _raw: &Table,
        valid: &[RawRecord<'_>],
    ) -> std::result::Result<Vec<DerivedTable>, PipelineFailure> {
        let rows = Self::normalize_rows(valid).at_stage(self.name(), Stage::Normalize)?;
        info!("Normalized {} leaderboard rows", rows.len());

        Ok(vec![DerivedTable::new(
            ExportKind::Cleaned,
            Self::cleaned_table(&rows),
        )])
    }
}
