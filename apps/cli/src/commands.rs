//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use chrono::Utc;
use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use jobscout_classify::ClassificationEngine;
use jobscout_core::{
    CheckpointWriter, CollectionRunner, ExtractionPipeline, RunProgress, RunRequest,
    export_file_name, read_checkpoint, to_csv,
};
use jobscout_crawler::{CollectProgress, DocumentSnapshot, HttpPageSource, StopReason};
use jobscout_shared::{
    AppConfig, CategoryLabel, Identifier, Record, SourceConfig, init_config, load_config,
    load_config_from,
};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// jobscout: collect job postings and tag their cloud skills.
#[derive(Parser)]
#[command(
    name = "jobscout",
    version,
    about = "Collect job postings by listing position and classify their cloud-provider skills.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file to use instead of ~/.jobscout/jobscout.toml.
    #[arg(long, global = true, env = "JOBSCOUT_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Enumerate identifiers from a listing, fetch every posting, export CSV.
    Collect {
        /// Listing URL, or a query string joined onto `source.listing_url`
        /// (e.g. "keywords=cloud&location=Worldwide").
        #[arg(short, long)]
        query: Option<String>,

        /// Stop after this many identifiers.
        #[arg(short, long)]
        limit: Option<usize>,

        /// First listing position.
        #[arg(short, long, default_value = "0")]
        start: u64,

        /// Comma-separated identifiers used when enumeration finds nothing.
        #[arg(long)]
        ids: Option<String>,

        /// File with one identifier per line (e.g. a previous checkpoint).
        #[arg(long)]
        ids_file: Option<PathBuf>,

        /// Export directory (overrides `output.export_dir`).
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Disable the delays between positions and records.
        #[arg(long)]
        no_pacing: bool,
    },

    /// Run the extraction pipeline over a saved posting document.
    Extract {
        /// HTML file to read.
        file: PathBuf,

        /// Identifier to give the record.
        #[arg(long, default_value = "local")]
        id: String,
    },

    /// Classify text and print the matched sentences per category.
    Classify {
        /// Text to classify.
        text: String,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "jobscout=info",
        1 => "jobscout=debug",
        _ => "jobscout=trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config;
    match cli.command {
        Command::Collect {
            query,
            limit,
            start,
            ids,
            ids_file,
            out,
            no_pacing,
        } => {
            let mut config = resolve_config(config_path.as_deref())?;
            if no_pacing {
                config.pacing.position_min_ms = 0;
                config.pacing.position_max_ms = 0;
                config.pacing.record_min_ms = 0;
                config.pacing.record_max_ms = 0;
            }
            let mut manual = ids.as_deref().map(Identifier::parse_list).unwrap_or_default();
            if let Some(path) = ids_file {
                manual.extend(read_checkpoint(&path)?);
            }
            let request = RunRequest {
                query: query.unwrap_or_default(),
                limit,
                start,
                manual_identifiers: manual,
                ..RunRequest::default()
            };
            cmd_collect(&config, request, out).await
        }
        Command::Extract { file, id } => cmd_extract(&file, &id),
        Command::Classify { text } => cmd_classify(&text),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(config_path.as_deref()),
        },
    }
}

fn resolve_config(path: Option<&Path>) -> Result<AppConfig> {
    Ok(match path {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    })
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_collect(config: &AppConfig, request: RunRequest, out: Option<PathBuf>) -> Result<()> {
    if request.query.trim().is_empty() && request.manual_identifiers.is_empty() {
        return Err(eyre!("nothing to collect: pass --query, --ids or --ids-file"));
    }

    let runner = CollectionRunner::from_config(config)?;
    let mut source = HttpPageSource::new(&SourceConfig::from(config))?;
    let checkpoint = CheckpointWriter::new(
        &config.output.checkpoint_file,
        config.collector.checkpoint_every,
    );

    info!(
        query = %request.query,
        limit = ?request.limit,
        start = request.start,
        manual = request.manual_identifiers.len(),
        "starting collection"
    );

    let progress = CliProgress::new(Some(checkpoint));
    let outcome = runner.run(&mut source, &request, &progress).await;
    progress.finish();
    let report = outcome?;

    let records = report.aggregator.records();
    let export_dir = out.unwrap_or_else(|| PathBuf::from(&config.output.export_dir));
    std::fs::create_dir_all(&export_dir)
        .map_err(|e| eyre!("cannot create {}: {e}", export_dir.display()))?;
    let export_path = export_dir.join(export_file_name(Utc::now()));
    std::fs::write(&export_path, to_csv(records)?)
        .map_err(|e| eyre!("cannot write {}: {e}", export_path.display()))?;

    let summary = report.aggregator.summary();
    println!();
    println!("  Collection complete!");
    println!("  Source:   {:?}", report.origin);
    println!("  Records:  {}", summary.total_records);
    for label in CategoryLabel::ALL {
        println!("  {:<20} {}", label.display_name(), summary.count(label));
    }
    println!("  Export:   {}", export_path.display());
    println!("  Time:     {:.1}s", report.duration.as_secs_f64());
    println!();

    Ok(())
}

fn cmd_extract(file: &Path, id: &str) -> Result<()> {
    let html = std::fs::read_to_string(file)
        .map_err(|e| eyre!("cannot read {}: {e}", file.display()))?;
    let id = Identifier::new(id).ok_or_else(|| eyre!("identifier must not be blank"))?;

    let snapshot = DocumentSnapshot::from_html(file.display().to_string(), html);
    let record = ExtractionPipeline::default().build(id, &snapshot);
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}

fn cmd_classify(text: &str) -> Result<()> {
    let classifications = ClassificationEngine::default().classify(text);
    if !classifications.any() {
        println!("No categories matched.");
        return Ok(());
    }
    for (label, sentences) in classifications.iter().filter(|(_, s)| !s.is_empty()) {
        println!("{}:", label.display_name());
        for sentence in sentences {
            println!("  - {sentence}");
        }
    }
    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(path: Option<&Path>) -> Result<()> {
    let config = resolve_config(path)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// Spinner progress that also keeps the identifier checkpoint up to date.
struct CliProgress {
    spinner: ProgressBar,
    checkpoint: Option<CheckpointWriter>,
}

impl CliProgress {
    fn new(checkpoint: Option<CheckpointWriter>) -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self {
            spinner,
            checkpoint,
        }
    }

    fn finish(&self) {
        self.spinner.finish_and_clear();
    }
}

impl CollectProgress for CliProgress {
    fn on_identifier(&self, collected: &[Identifier]) {
        if let Some(checkpoint) = &self.checkpoint {
            checkpoint.on_identifier(collected);
        }
        if let Some(last) = collected.last() {
            self.spinner
                .set_message(format!("Collected [{}] {last}", collected.len()));
        }
    }

    fn on_finished(&self, collected: &[Identifier], reason: StopReason) {
        if let Some(checkpoint) = &self.checkpoint {
            checkpoint.on_finished(collected, reason);
        }
        self.spinner
            .set_message(format!("Collected {} identifiers ({reason})", collected.len()));
    }
}

impl RunProgress for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn on_record(&self, record: &Record, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Extracting [{current}/{total}] {}", record.title));
    }
}
