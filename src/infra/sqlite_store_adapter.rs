use rusqlite::{params, Connection, Transaction};
use std::path::Path;
use tracing::debug;

use crate::app::load_use_case::Dataset;
use crate::app::ports::{DatasetStorePort, LoadSummary};
use crate::domain::Season;
use crate::error::{CleanError, Result};

const SCHEMA: &str = r#"
    DROP TABLE IF EXISTS player_salary;
    DROP TABLE IF EXISTS player_yearly_stats;
    DROP TABLE IF EXISTS player_career_stats;
    DROP TABLE IF EXISTS yoy_leader;
    DROP TABLE IF EXISTS players;

    CREATE TABLE players (
        player_id TEXT PRIMARY KEY NOT NULL,
        name      TEXT NOT NULL
    );
    CREATE TABLE yoy_leader (
        id           INTEGER PRIMARY KEY AUTOINCREMENT,
        year         INTEGER NOT NULL,
        league       TEXT NOT NULL,
        player_id    TEXT NOT NULL,
        team         TEXT NOT NULL,
        bases_stolen INTEGER NOT NULL,
        FOREIGN KEY (player_id) REFERENCES players (player_id)
    );
    CREATE TABLE player_career_stats (
        id                    INTEGER PRIMARY KEY AUTOINCREMENT,
        player_id             TEXT NOT NULL,
        total_bases_stolen    INTEGER NOT NULL,
        total_caught_stealing INTEGER NOT NULL,
        total_sb_perc         FLOAT NOT NULL,
        total_years           INTEGER NOT NULL,
        FOREIGN KEY (player_id) REFERENCES players (player_id)
    );
    CREATE TABLE player_yearly_stats (
        id               INTEGER PRIMARY KEY AUTOINCREMENT,
        player_id        TEXT NOT NULL,
        bases_stolen     INTEGER NOT NULL,
        caught_stealing  INTEGER NOT NULL,
        stolen_base_perc FLOAT NOT NULL,
        year             INTEGER NOT NULL,
        team             TEXT NOT NULL,
        FOREIGN KEY (player_id) REFERENCES players (player_id)
    );
    CREATE TABLE player_salary (
        id           INTEGER PRIMARY KEY AUTOINCREMENT,
        player_id    TEXT NOT NULL,
        uniform_nums TEXT,
        salary       FLOAT,
        year         INTEGER NOT NULL,
        team         TEXT NOT NULL,
        FOREIGN KEY (player_id) REFERENCES players (player_id)
    );
"#;

/// SQLite-backed relational store. Every load drops and recreates the schema
/// inside the same transaction as the inserts.
pub struct SqliteDatasetStore {
    conn: Connection,
}

impl SqliteDatasetStore {
    pub fn open<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let db_path = db_path.as_ref();
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| CleanError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let conn = Connection::open(db_path)?;
        conn.execute_batch("PRAGMA foreign_keys = 1;")?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = 1;")?;
        Ok(Self { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    fn insert_all(tx: &Transaction<'_>, dataset: &Dataset) -> Result<LoadSummary> {
        let mut summary = LoadSummary::default();

        let mut stmt = tx.prepare("INSERT INTO players (player_id, name) VALUES (?1, ?2)")?;
        for player in &dataset.players {
            summary.players += stmt.execute(params![player.player_id, player.name])?;
        }

        let mut stmt = tx.prepare(
            "INSERT INTO yoy_leader (year, league, player_id, team, bases_stolen)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )?;
        for row in &dataset.leaders {
            summary.yoy_leader += stmt.execute(params![
                row.year,
                row.league,
                row.player_id,
                row.team,
                row.bases_stolen
            ])?;
        }

        let mut stmt = tx.prepare(
            "INSERT INTO player_career_stats
                (player_id, total_bases_stolen, total_caught_stealing, total_sb_perc, total_years)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )?;
        for line in &dataset.careers {
            if let Season::Career { total_years } = line.season {
                summary.player_career_stats += stmt.execute(params![
                    line.player_id,
                    line.stolen_bases,
                    line.caught_stealing,
                    line.stolen_base_pct,
                    total_years
                ])?;
            }
        }

        let mut stmt = tx.prepare(
            "INSERT INTO player_yearly_stats
                (player_id, bases_stolen, caught_stealing, stolen_base_perc, year, team)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )?;
        for line in &dataset.seasons {
            if let Season::Yearly { year, team } = &line.season {
                summary.player_yearly_stats += stmt.execute(params![
                    line.player_id,
                    line.stolen_bases,
                    line.caught_stealing,
                    line.stolen_base_pct,
                    year,
                    team
                ])?;
            }
        }

        let mut stmt = tx.prepare(
            "INSERT INTO player_salary (player_id, uniform_nums, salary, year, team)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )?;
        for row in &dataset.salaries {
            summary.player_salary += stmt.execute(params![
                row.player_id,
                row.uniform_number.to_string(),
                row.salary,
                row.year,
                row.team
            ])?;
        }

        Ok(summary)
    }
}

impl DatasetStorePort for SqliteDatasetStore {
    fn replace_dataset(&mut self, dataset: &Dataset) -> Result<LoadSummary> {
        // Dropping the transaction without commit rolls everything back
        let tx = self.conn.transaction()?;
        tx.execute_batch(SCHEMA)?;
        debug!("Schema recreated");
        let summary = Self::insert_all(&tx, dataset)?;
        tx.commit()?;
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::load_use_case::PlayerRow;
    use crate::domain::{LeaderRow, SalaryRow, StatLine};

    fn dataset() -> Dataset {
        Dataset {
            players: vec![PlayerRow {
                player_id: "henderi01".to_string(),
                name: "Rickey Henderson".to_string(),
            }],
            leaders: vec![LeaderRow {
                year: 1982,
                league: "American League".to_string(),
                player_id: "henderi01".to_string(),
                player_name: "Rickey Henderson".to_string(),
                team: "Oakland Athletics".to_string(),
                bases_stolen: 130,
            }],
            careers: vec![StatLine {
                player_id: "henderi01".to_string(),
                player_name: None,
                season: Season::Career { total_years: 25 },
                stolen_bases: 1406,
                caught_stealing: 335,
                stolen_base_pct: 80.8,
            }],
            seasons: vec![StatLine {
                player_id: "henderi01".to_string(),
                player_name: None,
                season: Season::Yearly {
                    year: 1982,
                    team: "OAK".to_string(),
                },
                stolen_bases: 130,
                caught_stealing: 42,
                stolen_base_pct: 75.6,
            }],
            salaries: vec![SalaryRow {
                player_id: "henderi01".to_string(),
                uniform_number: 24,
                salary: None,
                year: 1982,
                team: "OAK".to_string(),
            }],
        }
    }

    fn count(store: &SqliteDatasetStore, table: &str) -> i64 {
        store
            .connection()
            .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |r| r.get(0))
            .unwrap()
    }

    #[test]
    fn test_replace_dataset_loads_every_table() {
        let mut store = SqliteDatasetStore::open_in_memory().unwrap();
        let summary = store.replace_dataset(&dataset()).unwrap();
        assert_eq!(
            summary,
            LoadSummary {
                players: 1,
                yoy_leader: 1,
                player_career_stats: 1,
                player_yearly_stats: 1,
                player_salary: 1,
            }
        );

        let salary: Option<f64> = store
            .connection()
            .query_row("SELECT salary FROM player_salary", [], |r| r.get(0))
            .unwrap();
        assert_eq!(salary, None);
    }

    #[test]
    fn test_reload_replaces_instead_of_appending() {
        let mut store = SqliteDatasetStore::open_in_memory().unwrap();
        store.replace_dataset(&dataset()).unwrap();
        store.replace_dataset(&dataset()).unwrap();
        assert_eq!(count(&store, "yoy_leader"), 1);
        assert_eq!(count(&store, "players"), 1);
    }

    #[test]
    fn test_unknown_player_rolls_back_whole_load() {
        let mut store = SqliteDatasetStore::open_in_memory().unwrap();
        store.replace_dataset(&dataset()).unwrap();

        let mut broken = dataset();
        broken.salaries[0].player_id = "nobody01".to_string();
        let err = store.replace_dataset(&broken).unwrap_err();
        assert!(matches!(err, CleanError::Database(_)));

        // Previous load survives
        assert_eq!(count(&store, "player_salary"), 1);
    }
}
