#![allow(dead_code)]

use std::fs;
use std::path::Path;

use sb_cleaner::config::{CleanerConfig, PathsConfig};
use sb_cleaner::constants;
use sb_cleaner::pipeline::{create_pipeline, CleaningPipeline};

pub const LEADERBOARD_CSV: &str = "\
Year,League,Player ID,Player Name,Team,Bases Stolen
1982,American League,henderi01,Rickey Henderson,Oakland Athletics,130
1990,National League,raineti01,Tim Raines,Montreal Expos,70
1991,Negro League,paigesa01,Satchel Paige,Kansas City Monarchs,5
1983,American League,henderi01,Rickey Henderson,Oakland Athletics,10x
";

pub const STATS_CSV: &str = "\
Player ID,Player Name,Team,Stolen Bases (SB),Caught Stealing (CS),Stolen Bases Percentage
henderi01,Rickey Henderson,1982 OAK,130,42,75.6
henderi01,Rickey Henderson,25 Years,\"1,406\",335,80.8
raineti01,Tim Raines,1990 Miami,12,3-,-
raineti01,Tim Raines,15 Years,150,40,78.9
raineti01,Tim Raines,Totals,10,2,50
";

pub const SALARY_CSV: &str = "\
Player ID,Uniform Numbers,Salary,Team
henderi01,24,\"$1,000.00\",1982 OAK
henderi01,24,Undetermined,1983 OAK
raineti01,30,\"$2,000.00\",1990 Montreal Expos
raineti01,abc,$5,1991 MON
";

pub fn write_raw(paths: &PathsConfig, stem: &str, content: &str) {
    fs::create_dir_all(&paths.raw_dir).unwrap();
    fs::write(paths.raw_dir.join(constants::raw_file_name(stem)), content).unwrap();
}

/// Config rooted in `root` with all three raw tables in place
pub fn seeded_config(root: &Path) -> CleanerConfig {
    let config = CleanerConfig {
        paths: PathsConfig::rooted_at(root),
        ..CleanerConfig::default()
    };
    write_raw(&config.paths, constants::LEADERBOARD_STEM, LEADERBOARD_CSV);
    write_raw(&config.paths, constants::STATS_STEM, STATS_CSV);
    write_raw(&config.paths, constants::SALARY_STEM, SALARY_CSV);
    config
}

pub fn build_pipelines(config: &CleanerConfig) -> Vec<Box<dyn CleaningPipeline>> {
    constants::all_pipelines()
        .into_iter()
        .map(|name| create_pipeline(name, config).unwrap())
        .collect()
}

pub fn read_lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}
