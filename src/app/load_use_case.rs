use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Instant;
use tracing::{error, info, info_span};

use crate::app::ports::{DatasetStorePort, LoadSummary, TableSourcePort};
use crate::config::PathsConfig;
use crate::constants::*;
use crate::domain::{LeaderRow, RawRecord, SalaryRow, Season, StatLine, Table};
use crate::error::{CleanError, PipelineFailure, Result, Stage, StageContext};
use crate::metrics::LoaderMetrics;

const LOAD_PIPELINE: &str = "load";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerRow {
    pub player_id: String,
    pub name: String,
}

/// Everything the relational store receives in one load
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub players: Vec<PlayerRow>,
    pub leaders: Vec<LeaderRow>,
    pub careers: Vec<StatLine>,
    pub seasons: Vec<StatLine>,
    pub salaries: Vec<SalaryRow>,
}

/// Distinct players of the leaderboard, in first-seen order. When one
/// identifier appears with several names the first name wins.
pub fn derive_players(leaders: &[LeaderRow]) -> Vec<PlayerRow> {
    let mut seen = HashSet::new();
    leaders
        .iter()
        .filter(|row| seen.insert(row.player_id.clone()))
        .map(|row| PlayerRow {
            player_id: row.player_id.clone(),
            name: row.player_name.clone(),
        })
        .collect()
}

/// Typed view over a cleaned export read back from disk
struct CleanedTable<'t> {
    path: &'t Path,
    table: &'t Table,
}

impl<'t> CleanedTable<'t> {
    fn parse<T>(&self, record: &RawRecord<'_>, column: &str) -> Result<T>
    where
        T: FromStr,
    {
        let value = record.get(column).unwrap_or_default();
        value.parse::<T>().map_err(|_| CleanError::CleanedValue {
            path: self.path.to_path_buf(),
            row: record.row_number(),
            column: column.to_string(),
            value: value.to_string(),
        })
    }

    fn text(&self, record: &RawRecord<'_>, column: &str) -> String {
        record.get(column).unwrap_or_default().to_string()
    }

    /// Empty cell is absent; anything else must parse.
    fn optional<T>(&self, record: &RawRecord<'_>, column: &str) -> Result<Option<T>>
    where
        T: FromStr,
    {
        match record.get(column) {
            None | Some("") => Ok(None),
            Some(_) => self.parse(record, column).map(Some),
        }
    }

    fn leaders(&self) -> Result<Vec<LeaderRow>> {
        self.table
            .records()
            .map(|r| {
                Ok(LeaderRow {
                    year: self.parse(&r, COL_YEAR)?,
                    league: self.text(&r, COL_LEAGUE),
                    player_id: self.text(&r, COL_PLAYER_ID),
                    player_name: self.text(&r, COL_PLAYER_NAME),
                    team: self.text(&r, COL_TEAM),
                    bases_stolen: self.parse(&r, COL_BASES_STOLEN)?,
                })
            })
            .collect()
    }

    fn stat_lines(&self, career: bool) -> Result<Vec<StatLine>> {
        self.table
            .records()
            .map(|r| {
                let season = if career {
                    Season::Career {
                        total_years: self.parse(&r, COL_TOTAL_YEARS)?,
                    }
                } else {
                    Season::Yearly {
                        year: self.parse(&r, COL_YEAR)?,
                        team: self.text(&r, COL_TEAM),
                    }
                };
                Ok(StatLine {
                    player_id: self.text(&r, COL_PLAYER_ID),
                    player_name: r.get(COL_PLAYER_NAME).map(str::to_string),
                    season,
                    stolen_bases: self.parse(&r, COL_SB)?,
                    caught_stealing: self.parse(&r, COL_CS)?,
                    stolen_base_pct: self.parse(&r, COL_SBP)?,
                })
            })
            .collect()
    }

    fn salaries(&self) -> Result<Vec<SalaryRow>> {
        self.table
            .records()
            .map(|r| {
                Ok(SalaryRow {
                    player_id: self.text(&r, COL_PLAYER_ID),
                    uniform_number: self.parse(&r, COL_UNIFORM_NUMBERS)?,
                    salary: self.optional(&r, COL_SALARY)?,
                    year: self.parse(&r, COL_YEAR)?,
                    team: self.text(&r, COL_TEAM),
                })
            })
            .collect()
    }
}

/// Use case loading the cleaned exports into the relational store
pub struct LoadUseCase<'a> {
    source: &'a dyn TableSourcePort,
    store: &'a mut dyn DatasetStorePort,
    paths: &'a PathsConfig,
}

impl<'a> LoadUseCase<'a> {
    pub fn new(
        source: &'a dyn TableSourcePort,
        store: &'a mut dyn DatasetStorePort,
        paths: &'a PathsConfig,
    ) -> Self {
        Self {
            source,
            store,
            paths,
        }
    }

    fn read(&self, file_name: String, required: &[&str]) -> Result<(PathBuf, Table)> {
        let path = self.paths.cleaned_dir.join(file_name);
        let table = self.source.read_table(&path)?;
        table.require_columns(&path, required.iter().copied())?;
        Ok((path, table))
    }

    /// Read every cleaned export needed by the load contract.
    pub fn read_dataset(&self) -> Result<Dataset> {
        let (path, table) = self.read(
            cleaned_file_name(LEADERBOARD_STEM),
            &[COL_YEAR, COL_LEAGUE, COL_PLAYER_ID, COL_PLAYER_NAME, COL_TEAM, COL_BASES_STOLEN],
        )?;
        let leaders = CleanedTable { path: &path, table: &table }.leaders()?;

        let (path, table) = self.read(
            career_file_name(STATS_STEM),
            &[COL_PLAYER_ID, COL_SB, COL_CS, COL_SBP, COL_TOTAL_YEARS],
        )?;
        let careers = CleanedTable { path: &path, table: &table }.stat_lines(true)?;

        let (path, table) = self.read(
            yearly_file_name(STATS_STEM),
            &[COL_PLAYER_ID, COL_SB, COL_CS, COL_SBP, COL_YEAR, COL_TEAM],
        )?;
        let seasons = CleanedTable { path: &path, table: &table }.stat_lines(false)?;

        let (path, table) = self.read(
            cleaned_file_name(SALARY_STEM),
            &[COL_PLAYER_ID, COL_UNIFORM_NUMBERS, COL_SALARY, COL_YEAR, COL_TEAM],
        )?;
        let salaries = CleanedTable { path: &path, table: &table }.salaries()?;

        Ok(Dataset {
            players: derive_players(&leaders),
            leaders,
            careers,
            seasons,
            salaries,
        })
    }

    pub fn run(&mut self) -> std::result::Result<LoadSummary, PipelineFailure> {
        let span = info_span!("pipeline", pipeline = LOAD_PIPELINE);
        let _enter = span.enter();
        let started = Instant::now();

        let dataset = self.read_dataset().at_stage(LOAD_PIPELINE, Stage::Read)?;
        info!(
            "Loading {} players into {}",
            dataset.players.len(),
            self.paths.database.display()
        );

        match self.store.replace_dataset(&dataset) {
            Ok(summary) => {
                LoaderMetrics::record_table_loaded("players", summary.players);
                LoaderMetrics::record_table_loaded("yoy_leader", summary.yoy_leader);
                LoaderMetrics::record_table_loaded("player_career_stats", summary.player_career_stats);
                LoaderMetrics::record_table_loaded("player_yearly_stats", summary.player_yearly_stats);
                LoaderMetrics::record_table_loaded("player_salary", summary.player_salary);
                LoaderMetrics::record_load_success(started.elapsed().as_secs_f64());
                info!("Load committed: {:?}", summary);
                Ok(summary)
            }
            Err(e) => {
                LoaderMetrics::record_load_failure();
                error!("Load rolled back: {}", e);
                Err(PipelineFailure::new(LOAD_PIPELINE, Stage::Load, e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leader(id: &str, name: &str) -> LeaderRow {
        LeaderRow {
            year: 1980,
            league: AMERICAN_LEAGUE.to_string(),
            player_id: id.to_string(),
            player_name: name.to_string(),
            team: "Oakland Athletics".to_string(),
            bases_stolen: 100,
        }
    }

    #[test]
    fn test_derive_players_is_distinct_and_ordered() {
        let players = derive_players(&[
            leader("henderi01", "Rickey Henderson"),
            leader("raineti01", "Tim Raines"),
            leader("henderi01", "Rickey Henley Henderson"),
        ]);
        assert_eq!(
            players,
            vec![
                PlayerRow {
                    player_id: "henderi01".to_string(),
                    name: "Rickey Henderson".to_string()
                },
                PlayerRow {
                    player_id: "raineti01".to_string(),
                    name: "Tim Raines".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_cleaned_value_errors_name_the_file() {
        let mut table = Table::with_headers(&[COL_PLAYER_ID, COL_UNIFORM_NUMBERS, COL_SALARY, COL_YEAR, COL_TEAM]);
        table.push_row(vec!["p1".into(), "7".into(), "".into(), "20x1".into(), "Boston".into()]);
        let path = PathBuf::from("cleaned/player_salary_cleaned.csv");
        let err = CleanedTable { path: &path, table: &table }.salaries().unwrap_err();
        let message = err.to_string();
        assert!(message.contains("player_salary_cleaned.csv"));
        assert!(message.contains("Year"));
    }

    #[test]
    fn test_empty_salary_reads_back_as_absent() {
        let mut table = Table::with_headers(&[COL_PLAYER_ID, COL_UNIFORM_NUMBERS, COL_SALARY, COL_YEAR, COL_TEAM]);
        table.push_row(vec!["p1".into(), "7".into(), "".into(), "2001".into(), "Boston".into()]);
        let path = PathBuf::from("x.csv");
        let rows = CleanedTable { path: &path, table: &table }.salaries().unwrap();
        assert_eq!(rows[0].salary, None);
    }
}
