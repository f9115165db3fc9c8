//! `lsum` command-line entry point.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

use lsum_media::{check_ffmpeg, check_ffprobe, FfmpegBackend};
use lsum_models::{parse_timestamp, ClassBudgetSpec, Recording, SegmentBoundary, SummaryTarget};
use lsum_worker::{init_tracing, Pipeline, PipelineConfig, SummaryRequest};

/// Lecture segmentation and highlight summaries
#[derive(Parser, Debug)]
#[command(name = "lsum")]
#[command(version)]
#[command(about = "Cut lectures at pauses and assemble class-budgeted summaries", long_about = None)]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct CommonArgs {
    /// Root data directory (overrides LSUM_DATA_DIR)
    #[arg(long, global = true, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Segment directory (overrides LSUM_SEGMENTS_DIR)
    #[arg(long, global = true, value_name = "DIR")]
    segments_dir: Option<PathBuf>,

    /// Per-invocation timeout for ffmpeg and ffprobe, in seconds
    #[arg(long, global = true, value_name = "SECS")]
    tool_timeout: Option<u64>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Reset the workspace and cut every source recording into segments
    Segment {
        /// Upper bound on segment length in seconds
        #[arg(long)]
        up_bound: Option<f64>,

        /// Recordings processed concurrently
        #[arg(long)]
        max_parallel: Option<usize>,
    },

    /// Print the planned boundaries of one recording as JSON without cutting it
    Plan {
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Upper bound on segment length in seconds
        #[arg(long)]
        up_bound: Option<f64>,
    },

    /// Fill missing DURATION cells of a classified table
    Enrich {
        /// Classified-segment table
        #[arg(long, value_name = "PATH")]
        table: PathBuf,

        /// Where to write the result (defaults to overwriting the table)
        #[arg(long, value_name = "PATH")]
        output: Option<PathBuf>,
    },

    /// Select, order and concatenate classified segments into a summary
    Summarize(SummarizeArgs),

    /// Print the JSON schema of budget files
    BudgetSchema,
}

#[derive(Args, Debug)]
struct SummarizeArgs {
    /// Classified-segment table
    #[arg(long, value_name = "PATH")]
    table: PathBuf,

    /// Budget JSON file (defaults to the built-in budget)
    #[arg(long, value_name = "PATH")]
    budget: Option<PathBuf>,

    /// Column holding the class label
    #[arg(long, value_name = "NAME")]
    class_column: Option<String>,

    /// Target duration (seconds or HH:MM:SS), or -1 for a share of each class count
    #[arg(long, value_name = "TIME", allow_hyphen_values = true)]
    target_duration: Option<String>,

    /// Assembled summary video
    #[arg(long, value_name = "PATH", default_value = "summary.mp4")]
    output: PathBuf,

    /// Summary manifest (defaults to the output path with a .csv extension)
    #[arg(long, value_name = "PATH")]
    manifest: Option<PathBuf>,
}

impl SummarizeArgs {
    fn validate(&self) -> Result<()> {
        if !self.table.is_file() {
            bail!("Classified table does not exist: {:?}", self.table);
        }
        if let Some(budget) = &self.budget {
            if !budget.is_file() {
                bail!("Budget file does not exist: {:?}", budget);
            }
        }
        if self.output.exists() && !self.output.is_file() {
            bail!("Output path is not a file: {:?}", self.output);
        }
        Ok(())
    }

    fn target(&self) -> Result<Option<SummaryTarget>> {
        let Some(raw) = self.target_duration.as_deref() else {
            return Ok(None);
        };
        if raw.trim() == "-1" {
            return Ok(Some(SummaryTarget::ShareOfCount));
        }
        let secs = parse_timestamp(raw).with_context(|| format!("Invalid target duration '{}'", raw))?;
        Ok(Some(SummaryTarget::Duration(secs)))
    }

    fn budget(&self) -> Result<ClassBudgetSpec> {
        let mut budget = match &self.budget {
            Some(path) => {
                let json = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read budget {:?}", path))?;
                ClassBudgetSpec::from_json(&json)
                    .with_context(|| format!("Invalid budget {:?}", path))?
            }
            None => ClassBudgetSpec::default(),
        };
        if let Some(target) = self.target()? {
            budget.target_duration = target;
        }
        budget.validate().context("Budget validation failed")?;
        Ok(budget)
    }

    fn manifest_path(&self) -> PathBuf {
        self.manifest
            .clone()
            .unwrap_or_else(|| self.output.with_extension("csv"))
    }
}

#[derive(Serialize)]
struct PlanOutput<'a> {
    recording: &'a Recording,
    boundaries: &'a [SegmentBoundary],
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let mut config = build_config(&cli.common);

    if let Command::BudgetSchema = cli.command {
        let schema = schemars::schema_for!(ClassBudgetSpec);
        println!("{}", serde_json::to_string_pretty(&schema)?);
        return Ok(());
    }

    match &cli.command {
        Command::Segment { up_bound, max_parallel } => {
            if let Some(up_bound) = up_bound {
                config.planner = config.planner.clone().with_up_bound(*up_bound);
            }
            if let Some(max_parallel) = max_parallel {
                config.max_parallel_recordings = (*max_parallel).max(1);
            }
        }
        Command::Plan { up_bound: Some(up_bound), .. } => {
            config.planner = config.planner.clone().with_up_bound(*up_bound);
        }
        Command::Summarize(args) => {
            if let Some(column) = &args.class_column {
                config.class_column = column.clone();
            }
        }
        _ => {}
    }

    check_tools()?;
    info!(config = ?config, "Starting lsum");

    let backend = FfmpegBackend::new().with_timeout(config.tool_timeout.as_secs());
    let pipeline = Pipeline::new(config, Arc::new(backend));

    match cli.command {
        Command::Segment { .. } => segment(&pipeline).await,
        Command::Plan { input, .. } => plan(&pipeline, &input).await,
        Command::Enrich { table, output } => {
            let output = output.unwrap_or_else(|| table.clone());
            let report = pipeline
                .run_enrich(&table, &output)
                .await
                .with_context(|| format!("Failed to enrich {:?}", table))?;
            println!(
                "Filled {} durations, kept {}, {} failed",
                report.filled,
                report.kept,
                report.failed.len()
            );
            Ok(())
        }
        Command::Summarize(args) => summarize(&pipeline, &args).await,
        Command::BudgetSchema => Ok(()),
    }
}

fn build_config(common: &CommonArgs) -> PipelineConfig {
    let mut config = PipelineConfig::from_env();
    if let Some(data_dir) = &common.data_dir {
        let defaults = PipelineConfig::with_data_dir(data_dir);
        config.media_dir = defaults.media_dir;
        config.audio_dir = defaults.audio_dir;
        config.segments_dir = defaults.segments_dir;
    }
    if let Some(dir) = &common.segments_dir {
        config.segments_dir = dir.clone();
    }
    if let Some(secs) = common.tool_timeout {
        config.tool_timeout = Duration::from_secs(secs);
    }
    config
}

fn check_tools() -> Result<()> {
    check_ffmpeg().context("ffmpeg is required")?;
    check_ffprobe().context("ffprobe is required")?;
    Ok(())
}

async fn segment(pipeline: &Pipeline) -> Result<()> {
    let reports = pipeline
        .run_segmentation()
        .await
        .context("Segmentation failed")?;

    let mut failed = 0;
    for report in &reports {
        match &report.outcome {
            Ok(segments) => println!("{}: {} segments", report.source.display(), segments.len()),
            Err(e) => {
                failed += 1;
                error!(source = %report.source.display(), error = %e, "Recording failed");
                println!("{}: FAILED ({})", report.source.display(), e);
            }
        }
    }

    println!(
        "Manifest: {}",
        pipeline.workspace().manifest_path().display()
    );
    if failed > 0 {
        bail!("{} of {} recordings failed", failed, reports.len());
    }
    Ok(())
}

async fn plan(pipeline: &Pipeline, input: &Path) -> Result<()> {
    if !input.is_file() {
        bail!("Input file does not exist: {:?}", input);
    }
    let (recording, boundaries) = pipeline
        .plan(input)
        .await
        .with_context(|| format!("Failed to plan {:?}", input))?;

    let output = PlanOutput {
        recording: &recording,
        boundaries: &boundaries,
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

async fn summarize(pipeline: &Pipeline, args: &SummarizeArgs) -> Result<()> {
    args.validate()
        .context("Failed to validate command-line arguments")?;

    let request = SummaryRequest {
        table: args.table.clone(),
        budget: args.budget()?,
        output: args.output.clone(),
        manifest: args.manifest_path(),
    };

    let outcome = pipeline
        .run_summary(&request)
        .await
        .context("Summary failed")?;

    println!(
        "Summary: {} ({} segments, {:.2}s, planned {:.2}s)",
        request.output.display(),
        outcome.selection.len(),
        outcome.duration,
        outcome.selection.total_duration()
    );
    println!("Manifest: {}", request.manifest.display());
    Ok(())
}
