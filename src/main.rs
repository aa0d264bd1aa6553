use anyhow::Context;
use backlog::{
    CancelToken, Config, ImportMode, IngestionPipeline, IngestionReport, MemoryStore,
    PipelineError, SqliteOptions, SqliteStore, TimeZoneSpec,
};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "backlog",
    version,
    about = "Import ZNC bouncer logs into The Lounge's message store"
)]
struct Cli {
    /// Configuration file (default: $XDG_CONFIG_HOME/backlog/config.toml).
    #[arg(long, global = true, env = "BACKLOG_CONFIG")]
    config: Option<PathBuf>,

    /// Log at debug level.
    #[arg(long, global = true)]
    debug: bool,

    /// Write logs to this file instead of stderr.
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Import one channel's day files.
    Import(ImportArgs),
}

#[derive(clap::Args)]
struct ImportArgs {
    /// Directory holding `YYYY-MM-DD.log` files for one channel.
    #[arg(long)]
    dir: Option<PathBuf>,

    /// The Lounge SQLite database.
    #[arg(long)]
    db: Option<PathBuf>,

    /// Network UUID from The Lounge user file.
    #[arg(long)]
    network: Option<String>,

    /// Channel name, e.g. `#rust`.
    #[arg(long)]
    channel: Option<String>,

    /// Zone the bouncer wrote local times in: `UTC` or a fixed offset like `+02:00`.
    #[arg(long)]
    timezone: Option<String>,

    /// Hold back any file that has a rejected line.
    #[arg(long)]
    strict: bool,

    /// Files normalised in parallel.
    #[arg(long)]
    workers: Option<usize>,

    /// Create the messages table if missing.
    #[arg(long)]
    create_schema: bool,

    /// Parse and report without writing anything.
    #[arg(long)]
    dry_run: bool,

    /// Also write the report as JSON to this path.
    #[arg(long)]
    report_json: Option<PathBuf>,
}

fn init_tracing(debug: bool, log_file: Option<&Path>) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_env("RUST_LOG")
        .unwrap_or_else(|_| EnvFilter::new(if debug { "debug" } else { "info" }));

    match log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("opening log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_writer(std::sync::Mutex::new(file))
                .with_ansi(false)
                .with_env_filter(filter)
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_writer(std::io::stderr)
                .with_env_filter(filter)
                .init();
        }
    }
    Ok(())
}

/// CLI flags override whatever the config layers produced.
fn apply_overrides(config: &mut Config, args: &ImportArgs) -> anyhow::Result<()> {
    if let Some(dir) = &args.dir {
        config.source.directory = dir.clone();
    }
    if let Some(db) = &args.db {
        config.target.database = db.clone();
    }
    if let Some(network) = &args.network {
        config.target.network = network.clone();
    }
    if let Some(channel) = &args.channel {
        config.target.channel = channel.clone();
    }
    if let Some(tz) = &args.timezone {
        config.import.timezone = tz.parse::<TimeZoneSpec>()?;
    }
    if args.strict {
        config.import.mode = ImportMode::Strict;
    }
    if let Some(workers) = args.workers {
        config.import.workers = workers;
    }
    if args.create_schema {
        config.target.create_schema = true;
    }
    Ok(())
}

fn import(config: Config, args: &ImportArgs, cancel: CancelToken) -> anyhow::Result<IngestionReport> {
    let import = config.import_config().context("invalid configuration")?;
    let dir = config.source.directory.as_path();

    if args.dry_run {
        tracing::info!(dir = %dir.display(), "dry run, nothing will be written");
        let mut pipeline =
            IngestionPipeline::new(import, MemoryStore::counting()).with_cancel(cancel);
        return Ok(pipeline.run_dir(dir)?);
    }

    let options = SqliteOptions {
        create_schema: config.target.create_schema,
        busy_timeout: Some(Duration::from_secs(10)),
    };
    let store = SqliteStore::open(&config.target.database, options)
        .with_context(|| format!("opening {}", config.target.database.display()))?;
    let mut pipeline = IngestionPipeline::new(import, store).with_cancel(cancel);
    Ok(pipeline.run_dir(dir)?)
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.debug, cli.log_file.as_deref())?;

    let mut config = Config::load(cli.config.as_deref()).context("loading configuration")?;

    match cli.command {
        Command::Import(args) => {
            apply_overrides(&mut config, &args)?;

            let cancel = CancelToken::new();
            let handler = cancel.clone();
            ctrlc::set_handler(move || {
                tracing::warn!("interrupt received, stopping after the current record");
                handler.cancel();
            })
            .context("installing Ctrl+C handler")?;

            let report = match import(config, &args, cancel) {
                Ok(report) => report,
                Err(e) => {
                    // Files in the partial report are already committed.
                    let partial = e
                        .downcast_ref::<PipelineError>()
                        .and_then(PipelineError::report);
                    if let Some(partial) = partial {
                        print!("{partial}");
                    }
                    return Err(e);
                }
            };
            print!("{report}");

            if let Some(path) = &args.report_json {
                let json = serde_json::to_string_pretty(&report)?;
                std::fs::write(path, json)
                    .with_context(|| format!("writing report to {}", path.display()))?;
            }

            if report.is_cancelled() {
                return Ok(ExitCode::from(130));
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}
