use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info, warn};

use sb_cleaner::app::clean_use_case::{CleanUseCase, PipelineReport};
use sb_cleaner::app::load_use_case::LoadUseCase;
use sb_cleaner::app::ports::LoadSummary;
use sb_cleaner::config::CleanerConfig;
use sb_cleaner::constants;
use sb_cleaner::error::{PipelineFailure, Stage};
use sb_cleaner::infra::{CsvTableAdapter, SqliteDatasetStore};
use sb_cleaner::pipeline::{create_pipeline, CleaningPipeline};
use sb_cleaner::{logging, metrics};

#[derive(Parser)]
#[command(name = "sb_cleaner")]
#[command(about = "Stolen-base statistics cleaner and loader")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print reports as JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    /// Write a Prometheus text snapshot of the run's metrics to this file
    #[arg(long, global = true)]
    metrics_out: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate, normalize and export the raw tables
    Clean {
        /// Pipelines to run (repeatable). Defaults to all of them.
        #[arg(long = "pipeline", value_enum)]
        pipelines: Vec<PipelineArg>,
    },
    /// Load the cleaned exports into a freshly recreated SQLite database
    Load,
    /// Clean every table, then load if all pipelines succeeded
    Run,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum PipelineArg {
    Leaderboard,
    Stats,
    Salary,
}

impl PipelineArg {
    fn name(self) -> &'static str {
        match self {
            PipelineArg::Leaderboard => constants::LEADERBOARD_PIPELINE,
            PipelineArg::Stats => constants::STATS_PIPELINE,
            PipelineArg::Salary => constants::SALARY_PIPELINE,
        }
    }
}

#[derive(Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum PipelineOutcome {
    Succeeded(PipelineReport),
    Failed {
        pipeline: String,
        stage: Stage,
        error: String,
    },
}

impl From<Result<PipelineReport, PipelineFailure>> for PipelineOutcome {
    fn from(result: Result<PipelineReport, PipelineFailure>) -> Self {
        match result {
            Ok(report) => PipelineOutcome::Succeeded(report),
            Err(failure) => PipelineOutcome::Failed {
                pipeline: failure.pipeline.clone(),
                stage: failure.stage,
                error: failure.source.to_string(),
            },
        }
    }
}

#[derive(Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum LoadOutcome {
    Committed {
        database: PathBuf,
        tables: LoadSummary,
    },
    Failed {
        stage: Stage,
        error: String,
    },
    Skipped,
}

#[derive(Serialize)]
struct RunSummary {
    command: &'static str,
    completed_at: DateTime<Utc>,
    pipelines: Vec<PipelineOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    load: Option<LoadOutcome>,
}

impl RunSummary {
    fn succeeded(&self) -> bool {
        let pipelines_ok = self
            .pipelines
            .iter()
            .all(|p| matches!(p, PipelineOutcome::Succeeded(_)));
        let load_ok = !matches!(
            self.load,
            Some(LoadOutcome::Failed { .. }) | Some(LoadOutcome::Skipped)
        );
        pipelines_ok && load_ok
    }
}

fn clean(config: &CleanerConfig, names: &[&str]) -> anyhow::Result<Vec<PipelineOutcome>> {
    let pipelines: Vec<Box<dyn CleaningPipeline>> = names
        .iter()
        .map(|name| create_pipeline(name, config).with_context(|| format!("unknown pipeline '{}'", name)))
        .collect::<anyhow::Result<_>>()?;

    let adapter = CsvTableAdapter::new();
    let use_case = CleanUseCase::new(&adapter, &adapter, &config.paths);
    Ok(use_case
        .run_all(&pipelines)
        .into_iter()
        .map(PipelineOutcome::from)
        .collect())
}

fn load(config: &CleanerConfig) -> anyhow::Result<LoadOutcome> {
    let adapter = CsvTableAdapter::new();
    let mut store = SqliteDatasetStore::open(&config.paths.database)
        .with_context(|| format!("opening database {}", config.paths.database.display()))?;
    let mut use_case = LoadUseCase::new(&adapter, &mut store, &config.paths);
    Ok(match use_case.run() {
        Ok(tables) => LoadOutcome::Committed {
            database: config.paths.database.clone(),
            tables,
        },
        Err(failure) => LoadOutcome::Failed {
            stage: failure.stage,
            error: failure.source.to_string(),
        },
    })
}

fn print_text(summary: &RunSummary) {
    for outcome in &summary.pipelines {
        match outcome {
            PipelineOutcome::Succeeded(report) => {
                println!("\n📊 Pipeline Results for {}:", report.pipeline);
                println!("   Input: {}", report.raw_path.display());
                println!("   Total rows: {}", report.total_rows);
                println!("   Valid: {}", report.valid_rows);
                println!("   Rejected: {}", report.rejected_rows);
                for export in &report.exports {
                    println!(
                        "   {} ({} rows): {}",
                        export.kind,
                        export.rows,
                        export.path.display()
                    );
                    println!("      sha256 {}", export.sha256);
                }
            }
            PipelineOutcome::Failed {
                pipeline,
                stage,
                error,
            } => {
                println!("\n❌ {} pipeline failed during {}: {}", pipeline, stage, error);
            }
        }
    }

    match &summary.load {
        Some(LoadOutcome::Committed { database, tables }) => {
            println!("\n🗄️  Loaded {}:", database.display());
            println!("   players: {}", tables.players);
            println!("   yoy_leader: {}", tables.yoy_leader);
            println!("   player_career_stats: {}", tables.player_career_stats);
            println!("   player_yearly_stats: {}", tables.player_yearly_stats);
            println!("   player_salary: {}", tables.player_salary);
        }
        Some(LoadOutcome::Failed { stage, error }) => {
            println!("\n❌ Load failed during {}: {}", stage, error);
        }
        Some(LoadOutcome::Skipped) => {
            println!("\n⚠️  Load skipped because a pipeline failed");
        }
        None => {}
    }

    if summary.succeeded() {
        println!("\n✅ {} completed successfully", summary.command);
    }
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let config = CleanerConfig::load(cli.config.as_deref()).context("loading configuration")?;

    // Guard keeps the file writer flushing until exit
    let _guard = logging::init_logging(&config.logging);
    if cli.metrics_out.is_some() {
        metrics::init_metrics();
    }

    let summary = match cli.command {
        Commands::Clean { pipelines } => {
            let names: Vec<&str> = if pipelines.is_empty() {
                constants::all_pipelines()
            } else {
                pipelines.iter().map(|p| p.name()).collect()
            };
            info!("Running pipelines: {}", names.join(", "));
            RunSummary {
                command: "clean",
                completed_at: Utc::now(),
                pipelines: clean(&config, &names)?,
                load: None,
            }
        }
        Commands::Load => RunSummary {
            command: "load",
            completed_at: Utc::now(),
            pipelines: Vec::new(),
            load: Some(load(&config)?),
        },
        Commands::Run => {
            let pipelines = clean(&config, &constants::all_pipelines())?;
            let all_clean = pipelines
                .iter()
                .all(|p| matches!(p, PipelineOutcome::Succeeded(_)));
            let load = if all_clean {
                load(&config)?
            } else {
                warn!("Skipping load because a pipeline failed");
                LoadOutcome::Skipped
            };
            RunSummary {
                command: "run",
                completed_at: Utc::now(),
                pipelines,
                load: Some(load),
            }
        }
    };

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_text(&summary);
    }

    if let Some(path) = &cli.metrics_out {
        match metrics::render_snapshot() {
            Some(snapshot) => std::fs::write(path, snapshot)
                .with_context(|| format!("writing metrics snapshot to {}", path.display()))?,
            None => warn!("No metrics recorder installed, snapshot not written"),
        }
    }

    if summary.succeeded() {
        Ok(ExitCode::SUCCESS)
    } else {
        error!("{} finished with failures", summary.command);
        Ok(ExitCode::FAILURE)
    }
}
