// Cleaning pipelines: one per raw table, all sharing the
// validate -> partition -> normalize -> derive stage layout

pub mod leaderboard;
pub mod processing;
pub mod salary;
pub mod stats;

use crate::config::CleanerConfig;
use crate::constants;
use crate::domain::{RawRecord, Table};
use crate::error::PipelineFailure;
use processing::derive::DerivedTable;
use processing::validate::RuleSet;

pub use leaderboard::LeaderboardPipeline;
pub use salary::SalaryPipeline;
pub use stats::StatsPipeline;

/// One independent cleaning pipeline over one raw table.
pub trait CleaningPipeline {
    /// Name used on the CLI and in logs
    fn name(&self) -> &'static str;

    /// File stem of the raw table and of every export
    fn stem(&self) -> &'static str;

    fn rules(&self) -> &RuleSet;

    /// Columns read by the normalize stage that no rule inspects
    fn extra_columns(&self) -> &'static [&'static str];

    /// Partition, normalize and derive the valid rows into cleaned tables.
    /// Rejected rows are handled by the caller.
    fn derive(
        &self,
        raw: &Table,
        valid: &[RawRecord<'_>],
    ) -> Result<Vec<DerivedTable>, PipelineFailure>;
}

/// Look up a pipeline by its CLI name.
pub fn create_pipeline(name: &str, config: &CleanerConfig) -> Option<Box<dyn CleaningPipeline>> {
    match name {
        constants::LEADERBOARD_PIPELINE => Some(Box::new(LeaderboardPipeline::new())),
        constants::STATS_PIPELINE => Some(Box::new(StatsPipeline::new())),
        constants::SALARY_PIPELINE => Some(Box::new(SalaryPipeline::new(config.salary.fill_scope))),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_pipeline_name_resolves() {
        let config = CleanerConfig::default();
        for name in constants::all_pipelines() {
            let pipeline = create_pipeline(name, &config).expect("known pipeline");
            assert_eq!(pipeline.name(), name);
        }
        assert!(create_pipeline("injuries", &config).is_none());
    }
}
