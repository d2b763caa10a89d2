/// Pipeline names used on the CLI, in logs and in reports
pub const LEADERBOARD_PIPELINE: &str = "leaderboard";
pub const STATS_PIPELINE: &str = "stats";
pub const SALARY_PIPELINE: &str = "salary";

// Raw table stems; exports are derived from these
pub const LEADERBOARD_STEM: &str = "bases_stolen_league_leaders";
pub const STATS_STEM: &str = "base_running_stats";
pub const SALARY_STEM: &str = "player_salary";

// Column headers as emitted by the extractor
pub const COL_YEAR: &str = "Year";
pub const COL_LEAGUE: &str = "League";
pub const COL_PLAYER_ID: &str = "Player ID";
pub const COL_PLAYER_NAME: &str = "Player Name";
pub const COL_TEAM: &str = "Team";
pub const COL_BASES_STOLEN: &str = "Bases Stolen";
pub const COL_SB: &str = "Stolen Bases (SB)";
pub const COL_CS: &str = "Caught Stealing (CS)";
pub const COL_SBP: &str = "Stolen Bases Percentage";
pub const COL_UNIFORM_NUMBERS: &str = "Uniform Numbers";
pub const COL_SALARY: &str = "Salary";

/// Replaces `Year` in the career export
pub const COL_TOTAL_YEARS: &str = "Total Years";

pub const AMERICAN_LEAGUE: &str = "American League";
pub const NATIONAL_LEAGUE: &str = "National League";
pub const LEAGUES: [&str; 2] = [AMERICAN_LEAGUE, NATIONAL_LEAGUE];

/// Remainder of the composite Team column that marks a career aggregate row
pub const CAREER_MARKER: &str = "Years";

pub const UNDETERMINED: &str = "Undetermined";

/// Get all pipeline names in run order
pub fn all_pipelines() -> Vec<&'static str> {
    vec![LEADERBOARD_PIPELINE, STATS_PIPELINE, SALARY_PIPELINE]
}

pub fn raw_file_name(stem: &str) -> String {
    format!("{}.csv", stem)
}

pub fn removed_file_name(stem: &str) -> String {
    format!("{}_removed.csv", stem)
}

pub fn cleaned_file_name(stem: &str) -> String {
    format!("{}_cleaned.csv", stem)
}

pub fn yearly_file_name(stem: &str) -> String {
    format!("{}_cleaned_yoy.csv", stem)
}

pub fn career_file_name(stem: &str) -> String {
    format!("{}_cleaned_career.csv", stem)
}
