//! CLI binary for docscan.
//!
//! A thin shim over the library crate: the positional path plays the part of
//! the file picker, the spinner stands in for the loading state, and the
//! export flags are the download buttons.

use anyhow::{bail, Context, Result};
use clap::Parser;
use docscan::{
    input, present, write_export, write_export_to, CandidateFile, ConfidenceTier, ExportFormat,
    HttpExtractionClient, Rejection, ScanConfig, SelectionSource, StateKind, UploadController,
    ViewData, WorkflowObserver, WorkflowState, DEFAULT_ENDPOINT,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── CLI observer using indicatif ─────────────────────────────────────────────

/// Shows a spinner for as long as the workflow is `Submitting`.
struct CliObserver {
    bar: ProgressBar,
}

impl CliObserver {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::hidden();
        let template = "{spinner:.cyan} {prefix:.bold}  {msg}  ⏱ {elapsed}";
        let style = ProgressStyle::with_template(template)
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(style);
        Arc::new(Self { bar })
    }
}

impl WorkflowObserver for CliObserver {
    fn on_transition(&self, _from: StateKind, to: StateKind) {
        match to {
            StateKind::Submitting => {
                self.bar.set_draw_target(indicatif::ProgressDrawTarget::stderr());
                self.bar.set_prefix("Extracting");
                self.bar.set_message("uploading document…");
                self.bar.enable_steady_tick(Duration::from_millis(80));
            }
            StateKind::Validating => {}
            _ => self.bar.finish_and_clear(),
        }
    }

    fn on_rejected(&self, _rejection: &Rejection) {
        self.bar.finish_and_clear();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Extract and print the fields
  docscan receipt.jpg

  # Save both exports next to each other
  docscan invoice.pdf --export-dir out/

  # Print the JSON export to stdout
  docscan scan.png --json > extracted-data.json

  # Use a remote service with a 90 s deadline
  docscan --endpoint https://scanner.example.com/extract --timeout 90 receipt.png

  # Check the service is up
  docscan --check

ACCEPTED FILES:
  image/jpeg (.jpg, .jpeg), image/png (.png), application/pdf (.pdf)
  Maximum size: 10 MB (10,485,760 bytes)

ENVIRONMENT VARIABLES:
  DOCSCAN_ENDPOINT        Extraction endpoint (default: http://localhost:8000/extract)
  DOCSCAN_TIMEOUT         Request deadline in seconds (default: none)
  RUST_LOG                Override the log filter
"#;

/// Extract structured data from invoices and receipts.
#[derive(Parser, Debug)]
#[command(
    name = "docscan",
    version,
    about = "Extract structured data from invoices and receipts",
    long_about = "Upload an image (JPG, PNG) or PDF to a document extraction service and show the \
vendor, date, total amount, category and confidence it found. Results can be exported as JSON \
or CSV.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Image or PDF to extract from. With `--source drop` several may be
    /// given, as in a multi-file drop; only the first is used.
    #[arg(value_name = "INPUT", required_unless_present = "check")]
    inputs: Vec<PathBuf>,

    /// Extraction endpoint URL.
    #[arg(long, env = "DOCSCAN_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    endpoint: String,

    /// Request deadline in seconds. No deadline by default.
    #[arg(long, env = "DOCSCAN_TIMEOUT",
          value_parser = clap::value_parser!(u64).range(1..))]
    timeout: Option<u64>,

    /// Declared media type; derived from the file extension when omitted.
    #[arg(long, env = "DOCSCAN_MEDIA_TYPE")]
    media_type: Option<String>,

    /// How the file was selected.
    #[arg(long, value_enum, default_value = "picker")]
    source: SourceArg,

    /// Print the JSON export to stdout instead of the field summary.
    #[arg(long, env = "DOCSCAN_JSON")]
    json: bool,

    /// Include the raw OCR text in the summary.
    #[arg(long)]
    raw_text: bool,

    /// Write extracted-data.json and extracted-data.csv into this directory.
    #[arg(long, env = "DOCSCAN_EXPORT_DIR")]
    export_dir: Option<PathBuf>,

    /// Write the JSON export to this file.
    #[arg(long)]
    json_out: Option<PathBuf>,

    /// Write the CSV export to this file.
    #[arg(long)]
    csv_out: Option<PathBuf>,

    /// Probe the service's /health endpoint and exit.
    #[arg(long)]
    check: bool,

    /// Disable the spinner.
    #[arg(long, env = "DOCSCAN_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "DOCSCAN_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors and results.
    #[arg(short, long, env = "DOCSCAN_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum SourceArg {
    Picker,
    Drop,
}

impl From<SourceArg> for SelectionSource {
    fn from(v: SourceArg) -> Self {
        match v {
            SourceArg::Picker => SelectionSource::FilePicker,
            SourceArg::Drop => SelectionSource::DragDrop,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner is the feedback while a request runs; keep library INFO
    // logs out of its way unless asked for.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && !cli.check;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let mut builder = ScanConfig::builder().endpoint(cli.endpoint.clone());
    if let Some(secs) = cli.timeout {
        builder = builder.request_timeout_secs(secs);
    }
    if show_progress {
        builder = builder.observer(CliObserver::new() as Arc<dyn WorkflowObserver>);
    }
    let config = builder.build().context("Invalid configuration")?;
    let client = HttpExtractionClient::new(&config).context("Failed to create HTTP client")?;

    // ── Health check mode ────────────────────────────────────────────────
    if cli.check {
        let health = client.health().await.context("Health check failed")?;
        println!("Endpoint:  {}", config.endpoint);
        println!("Status:    {}", health.status);
        if let Some(ref ts) = health.timestamp {
            println!("Timestamp: {}", ts);
        }
        return Ok(());
    }

    // ── Select, validate, submit ─────────────────────────────────────────
    let file = select_input(&cli.inputs, cli.source, cli.media_type.as_deref())?;

    let mut workflow = UploadController::with_config(&config);
    let state = workflow
        .run(&client, file, cli.source.into())
        .await?
        .clone();

    let result = match state {
        WorkflowState::Succeeded(result) => result,
        WorkflowState::Failed(message) => bail!("{message}"),
        other => bail!("Extraction ended in unexpected state {:?}", other.kind()),
    };

    // ── Render ───────────────────────────────────────────────────────────
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    if cli.json {
        let export = workflow.export(ExportFormat::Json)?;
        handle
            .write_all(&export.bytes)
            .and_then(|_| handle.write_all(b"\n"))
            .context("Failed to write to stdout")?;
    } else {
        if !cli.quiet {
            eprintln!("{} {}", green("✔"), bold("Data extracted successfully"));
        }
        write!(handle, "{}", render_view(&present(&result), cli.raw_text))
            .context("Failed to write to stdout")?;
    }
    drop(handle);

    // ── Exports ──────────────────────────────────────────────────────────
    let mut written = Vec::new();
    if let Some(ref dir) = cli.export_dir {
        for format in [ExportFormat::Json, ExportFormat::Csv] {
            let export = workflow.export(format)?;
            written.push(write_export(&export, dir).await?);
        }
    }
    for (format, target) in [
        (ExportFormat::Json, &cli.json_out),
        (ExportFormat::Csv, &cli.csv_out),
    ] {
        if let Some(path) = target {
            let export = workflow.export(format)?;
            write_export_to(&export, path).await?;
            written.push(path.clone());
        }
    }
    if !cli.quiet {
        for path in written {
            eprintln!("   {} {}", dim("→"), path.display());
        }
    }

    Ok(())
}

/// Turn the positional paths into one candidate, the way the chosen source
/// would: the picker yields exactly one file, a drop keeps the first.
fn select_input(
    paths: &[PathBuf],
    source: SourceArg,
    media_type: Option<&str>,
) -> Result<CandidateFile> {
    let open = |path: &PathBuf| {
        input::resolve_path(path, media_type)
            .with_context(|| format!("Failed to open {}", path.display()))
    };
    match source {
        SourceArg::Picker => match paths {
            [path] => open(path),
            [] => bail!("No input file given"),
            _ => bail!("The file picker takes one file; use --source drop to pass several"),
        },
        SourceArg::Drop => {
            let files = paths.iter().map(open).collect::<Result<Vec<_>>>()?;
            input::first_dropped(files).context("No input file given")
        }
    }
}

/// Plain-text rendering of the view data, one `Label: value` per line.
fn render_view(view: &ViewData, raw_text: bool) -> String {
    let tier = match view.confidence_tier {
        ConfidenceTier::High => green("high"),
        ConfidenceTier::Medium => yellow("medium"),
        ConfidenceTier::Low => red("low"),
    };

    let mut out = format!(
        "Vendor: {}\nDate: {}\nTotal Amount: {}\nCategory: {}\nConfidence: {} ({})\n",
        view.vendor, view.date, view.total_amount, view.category, view.confidence, tier
    );
    if raw_text {
        out.push_str("\nRaw Text:\n");
        out.push_str(&view.raw_text);
        if !view.raw_text.ends_with('\n') {
            out.push('\n');
        }
    }
    out
}
