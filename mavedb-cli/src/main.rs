use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use mavedb_core::io::csv::HGVS_TX;
use mavedb_core::job::{Executor, InlineExecutor, ThreadPoolExecutor};
use mavedb_core::{
    check_variant, parse, validate, Coordinator, CoordinateSpace, IngestConfig, JobState,
    JobStatus, SequenceType, Submission, TargetSequence, VariantRecord,
};
use serde::Serialize;
use std::fs::{read_to_string, File};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "mave-ingest", version, about = "Validate and normalize MAVE score/count tables")]
struct Cli {
    /// Log at debug level (RUST_LOG takes precedence).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run one ingestion job and print its report as JSON.
    Ingest(IngestArgs),
    /// Parse a single variant and print its canonical form.
    Parse(ParseArgs),
}

#[derive(Args)]
struct TargetArgs {
    /// Target sequence, or a path to a file holding it.
    #[arg(long)]
    target: String,

    /// dna, rna or protein; inferred when omitted.
    #[arg(long = "type")]
    sequence_type: Option<SequenceType>,
}

impl TargetArgs {
    fn load(&self) -> Result<TargetSequence> {
        let path = Path::new(&self.target);
        let sequence = if path.is_file() {
            read_to_string(path).with_context(|| format!("reading target {}", path.display()))?
        } else {
            self.target.clone()
        };
        Ok(TargetSequence {
            sequence,
            sequence_type: self.sequence_type,
        })
    }
}

#[derive(Args)]
struct IngestArgs {
    #[command(flatten)]
    target: TargetArgs,

    #[arg(long)]
    scores: PathBuf,

    #[arg(long)]
    counts: Option<PathBuf>,

    /// TOML ingestion settings.
    #[arg(long)]
    config: Option<PathBuf>,

    /// JSON license/metadata record attached to the job.
    #[arg(long)]
    metadata: Option<PathBuf>,

    /// Also print the variant records, with URNs under this dataset URN.
    #[arg(long)]
    urn: Option<String>,

    /// Run on a worker pool instead of the current thread.
    #[arg(long)]
    pool: bool,

    /// Seconds to wait for a pooled job.
    #[arg(long, default_value_t = 600)]
    timeout: u64,
}

#[derive(Args)]
struct ParseArgs {
    variant: String,

    /// hgvs_nt, hgvs_splice (or hgvs_tx) or hgvs_pro.
    #[arg(long, default_value = "hgvs_nt")]
    column: String,

    /// Also check the variant against this target sequence or file.
    #[arg(long)]
    target: Option<String>,

    #[arg(long = "type", requires = "target")]
    sequence_type: Option<SequenceType>,
}

#[derive(Serialize)]
struct Report {
    status: JobStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    records: Option<Vec<VariantRecord>>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let result = match &cli.command {
        Command::Ingest(args) => run_ingest(args),
        Command::Parse(args) => run_parse(args),
    };
    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(2)
        }
    }
}

fn run_ingest(args: &IngestArgs) -> Result<bool> {
    let config = match &args.config {
        Some(path) => IngestConfig::try_from(path.as_path())
            .with_context(|| format!("loading config {}", path.display()))?,
        None => IngestConfig::default(),
    };
    let executor: Arc<dyn Executor> = if args.pool {
        Arc::new(ThreadPoolExecutor::from_config(&config)?)
    } else {
        Arc::new(InlineExecutor)
    };

    let open = |path: &Path| {
        File::open(path).with_context(|| format!("opening {}", path.display()))
    };
    let mut submission = Submission::new(args.target.load()?, open(args.scores.as_path())?);
    if let Some(counts) = &args.counts {
        submission = submission.with_counts(open(counts.as_path())?);
    }
    if let Some(path) = &args.metadata {
        let text = read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        submission = submission.with_metadata(
            serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))?,
        );
    }

    let coordinator = Coordinator::new(executor, config);
    let id = coordinator.submit_ingestion(submission);
    let status = coordinator.wait(id, Duration::from_secs(args.timeout))?;
    if !status.state.is_terminal() {
        bail!("job {id} did not finish within {} seconds", args.timeout);
    }
    info!(job = %id, state = %status.state, "job finished");

    let records = match (&args.urn, coordinator.dataset(id)?) {
        (Some(urn), Some(dataset)) => Some(dataset.records(urn)),
        _ => None,
    };
    let succeeded = status.state == JobState::Success;
    let report = Report { status, records };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(succeeded)
}

fn column_space(column: &str) -> Option<CoordinateSpace> {
    if column == HGVS_TX {
        return Some(CoordinateSpace::Transcript);
    }
    CoordinateSpace::ALL.into_iter().find(|s| s.column() == column)
}

fn run_parse(args: &ParseArgs) -> Result<bool> {
    let Some(space) = column_space(&args.column) else {
        bail!("unknown column '{}'", args.column);
    };
    let variant = match parse(&args.variant, space) {
        Ok(v) => v,
        Err(e) => {
            println!("{}: {e}", e.code());
            return Ok(false);
        }
    };
    if let Some(target) = &args.target {
        let target = TargetArgs {
            target: target.clone(),
            sequence_type: args.sequence_type,
        };
        let target = validate(&target.load()?)?;
        if let Err(e) = check_variant(&variant, &target) {
            println!("{}: {e}", e.code());
            return Ok(false);
        }
    }
    println!("{variant}");
    Ok(true)
}
