use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CleanError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("missing required column '{column}' in {path}")]
    MissingColumn { path: PathBuf, column: String },

    #[error("row {row}: cannot normalize {column} = {value:?}: {reason}")]
    Normalization {
        row: usize,
        column: String,
        value: String,
        reason: String,
    },

    #[error("{path}: row {row}: unreadable {column} value {value:?}")]
    CleanedValue {
        path: PathBuf,
        row: usize,
        column: String,
        value: String,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

pub type Result<T> = std::result::Result<T, CleanError>;

/// Pipeline stage in which a fatal error surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Read,
    Partition,
    Normalize,
    Persist,
    Load,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Read => "read",
            Stage::Partition => "partition",
            Stage::Normalize => "normalize",
            Stage::Persist => "persist",
            Stage::Load => "load",
        };
        f.write_str(name)
    }
}

/// A fatal, pipeline-scoped failure. Never crosses into other pipelines.
#[derive(Error, Debug)]
#[error("{pipeline} pipeline failed during {stage}: {source}")]
pub struct PipelineFailure {
    pub pipeline: String,
    pub stage: Stage,
    #[source]
    pub source: CleanError,
}

impl PipelineFailure {
    pub fn new(pipeline: impl Into<String>, stage: Stage, source: CleanError) -> Self {
        Self {
            pipeline: pipeline.into(),
            stage,
            source,
        }
    }
}

/// Attach a pipeline name and stage to a library result.
pub trait StageContext<T> {
    fn at_stage(self, pipeline: &str, stage: Stage) -> std::result::Result<T, PipelineFailure>;
}

impl<T> StageContext<T> for Result<T> {
    fn at_stage(self, pipeline: &str, stage: Stage) -> std::result::Result<T, PipelineFailure> {
        self.map_err(|e| PipelineFailure::new(pipeline, stage, e))
    }
}
