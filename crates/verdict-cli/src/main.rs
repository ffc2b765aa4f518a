//! Verdict
//!
//! Classifies free-form LLM judge outputs as `Response A`, `Response B` or
//! `UNSURE`, evaluates the classifier against reference labels, walks a human
//! through the outputs it could not settle, and collects fresh outputs with
//! the DUET two-model debate.

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{error, info};
use verdict_batch::{
    write_clean_csvs, write_debug_csv, BatchRunner, EvaluationReport, ReviewOutcome,
    ReviewSession, SnapshotStore,
};
use verdict_classifiers::VerdictEngine;
use verdict_collect::{DuetRunner, OpenAiCompatibleProvider};
use verdict_core::{ClassificationUnit, Label};

mod config;
mod terminal;

use config::VerdictConfig;
use terminal::{confirm, TerminalReviewer};

#[derive(Parser, Debug)]
#[command(name = "verdict")]
#[command(
    about = "Classify LLM judge outputs as Response A / Response B / UNSURE",
    long_about = None
)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "verdict.yaml", global = true)]
    config: String,

    /// Prompt column name
    #[arg(long, global = true)]
    prompt_column: Option<String>,

    /// Reference label column name
    #[arg(long, global = true)]
    label_column: Option<String>,

    /// Regex of columns never classified
    #[arg(long, global = true)]
    exclude_columns: Option<String>,

    /// Debug export path
    #[arg(long, global = true)]
    debug_export: Option<PathBuf>,

    /// Debug log file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Manual review progress file
    #[arg(long, global = true)]
    snapshot: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Classify raw tables and write debug and clean exports
    Classify {
        /// Raw CSV files
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Measure accuracy against hand-cleaned reference tables
    Evaluate {
        /// Raw CSV files
        #[arg(long = "raw", required = true)]
        raw: Vec<PathBuf>,

        /// Reference CSV files, in the same order as --raw
        #[arg(long = "reference", required = true)]
        reference: Vec<PathBuf>,
    },

    /// Manually classify the outputs left unsure
    Review {
        /// Raw CSV files
        files: Vec<PathBuf>,

        /// Reference CSV files paired with the raw files
        #[arg(long = "reference")]
        reference: Vec<PathBuf>,
    },

    /// Run the DUET debate over a prompt table
    Collect {
        /// Input CSV with a prompt column
        input: PathBuf,

        /// Output CSV
        #[arg(short, long)]
        output: PathBuf,

        /// Completion endpoint base URL
        #[arg(long, env = "VERDICT_BASE_URL")]
        base_url: Option<String>,

        /// Pause between rows in milliseconds
        #[arg(long)]
        delay_ms: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = VerdictConfig::load(&cli.config, &cli)?;
    init_tracing(cli.verbose, &config.log_file)?;
    info!(config = %cli.config, "configuration loaded");

    match cli.command {
        Command::Classify { files } => classify(&config, &files),
        Command::Evaluate { raw, reference } => evaluate(&config, &raw, &reference),
        Command::Review { files, reference } => review(&config, &files, &reference),
        Command::Collect {
            input,
            output,
            base_url,
            delay_ms,
        } => collect(&config, &input, &output, base_url, delay_ms).await,
    }
}

/// Initialize tracing/logging: filtered output on stderr plus a full debug
/// log appended to `log_file`
fn init_tracing(verbose: bool, log_file: &Path) -> Result<()> {
    use std::sync::Mutex;
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

    let filter = if verbose {
        EnvFilter::new("verdict=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("verdict=warn"))
    };

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)?;

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr).with_filter(filter))
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .with_filter(EnvFilter::new("verdict=debug")),
        )
        .init();

    Ok(())
}

fn runner(config: &VerdictConfig) -> Result<BatchRunner<VerdictEngine>> {
    Ok(BatchRunner::new(VerdictEngine::new()?, config.column_rules()?))
}

fn pair<'a>(
    raw: &'a [PathBuf],
    reference: &'a [PathBuf],
) -> Result<Vec<(&'a PathBuf, &'a PathBuf)>> {
    if raw.len() != reference.len() {
        bail!(
            "{} raw files but {} reference files; they must pair up in order",
            raw.len(),
            reference.len()
        );
    }
    Ok(raw.iter().zip(reference).collect())
}

/// Write both exports for a finished batch
fn export(config: &VerdictConfig, units: &[ClassificationUnit]) -> Result<()> {
    write_debug_csv(&config.debug_export, units)?;
    let written = write_clean_csvs(units, &config.column_rules()?, &config.clean_suffix)?;
    for path in written {
        println!("Wrote {}", path.display());
    }
    println!(
        "See {} and {} for more information",
        config.log_file.display(),
        config.debug_export.display()
    );
    Ok(())
}

fn classify(config: &VerdictConfig, files: &[PathBuf]) -> Result<()> {
    let units = runner(config)?.run_raw(files)?;
    let unsure = units
        .iter()
        .filter(|u| u.automatic_label == Some(Label::Unsure))
        .count();

    println!("Classified {} LLM outputs; {} left unsure", units.len(), unsure);
    export(config, &units)
}

fn evaluate(config: &VerdictConfig, raw: &[PathBuf], reference: &[PathBuf]) -> Result<()> {
    let units = runner(config)?.run_paired(&pair(raw, reference)?)?;
    write_debug_csv(&config.debug_export, &units)?;

    let report = EvaluationReport::from_units(&units);
    if report.confidently_wrong > 0 {
        error!(count = report.confidently_wrong, "classifier contradicted reference labels");
    }
    println!("{}", report);
    println!(
        "See {} and {} for more information",
        config.log_file.display(),
        config.debug_export.display()
    );
    Ok(())
}

fn review(config: &VerdictConfig, files: &[PathBuf], reference: &[PathBuf]) -> Result<()> {
    let store = SnapshotStore::new(&config.snapshot_path);
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout();

    let mut session = None;
    if store.exists() {
        let question = format!(
            "Do you want to load manual classification progress from {}?",
            store.path().display()
        );
        if confirm(&mut input, &mut output, &question)? {
            session = ReviewSession::resume(store.clone())?;
        }
    }

    let session = match session {
        Some(session) => session,
        None => {
            let runner = runner(config)?;
            let units = if reference.is_empty() {
                if files.is_empty() {
                    bail!("no input files given and no review progress to resume");
                }
                runner.run_raw(files)?
            } else {
                runner.run_paired(&pair(files, reference)?)?
            };
            info!(units = units.len(), "starting manual review from CSVs");
            ReviewSession::new(units, store.clone())
        }
    };

    println!(
        "Number to be manually classified: {} out of {} total",
        session.pending(),
        session.units().len()
    );

    let mut reviewer = TerminalReviewer::new(&mut input, &mut output);
    match session.run(&mut reviewer)? {
        ReviewOutcome::Suspended { reviewed, remaining } => {
            println!(
                "Progress saved ({} reviewed, {} remaining), run this again any time to resume",
                reviewed, remaining
            );
        }
        ReviewOutcome::Completed(units) => {
            export(config, &units)?;
            store.discard()?;

            // Building the report logs every contradiction of a known label
            let wrong = EvaluationReport::from_units(&units).confidently_wrong;
            if wrong > 0 {
                println!("{} outputs contradict their reference labels; see the log", wrong);
            }
        }
    }

    output.flush()?;
    Ok(())
}

async fn collect(
    config: &VerdictConfig,
    input: &Path,
    output: &Path,
    base_url: Option<String>,
    delay_ms: Option<u64>,
) -> Result<()> {
    let settings = &config.collect;
    let base_url = base_url.unwrap_or_else(|| settings.base_url.clone());
    let provider =
        OpenAiCompatibleProvider::from_env(base_url, &settings.api_key_env, settings.settings)?;

    let delay = Duration::from_millis(delay_ms.unwrap_or(settings.delay_ms));
    let runner = DuetRunner::new(provider, settings.models.clone()).with_delay(delay);

    let rows = runner.run_file(input, output, &config.prompt_column).await?;
    println!("Collected {} rows into {}", rows, output.display());
    Ok(())
}
