//! CLI binary for labreport.
//!
//! A thin shim over the library crate that walks a [`WizardSession`] through
//! its four steps from command-line arguments and saves `report.tex`.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use labreport::pipeline::postprocess::clean_latex;
use labreport::pipeline::request::build_request;
use labreport::{
    resolve_backend, GenerationConfig, PickedFile, ProgressCallback, ReportDownload,
    ReportProgressCallback, ReportRequest, RequestPart, WizardSession,
};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
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
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

/// Terminal progress callback: one log line per data photo, then a spinner
/// while the model call is in flight.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::hidden();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  ⏱ {elapsed}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(TICKS),
        );
        Arc::new(Self { bar })
    }
}

impl ReportProgressCallback for CliProgressCallback {
    fn on_batch_start(&self, total_files: usize) {
        eprintln!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Reading {total_files} data photos…"))
        );
    }

    fn on_file_ingested(&self, name: &str, index: usize, total: usize) {
        eprintln!("  {} Photo {:>2}/{:<2}  {}", green("✓"), index, total, dim(name));
    }

    fn on_file_skipped(&self, name: &str, index: usize, total: usize, error: String) {
        // Truncate very long error messages to keep output tidy.
        let msg = if error.chars().count() > 80 {
            format!("{}\u{2026}", error.chars().take(79).collect::<String>())
        } else {
            error
        };
        eprintln!(
            "  {} Photo {:>2}/{:<2}  {}  {}",
            red("✗"),
            index,
            total,
            name,
            red(&msg)
        );
    }

    fn on_generation_start(&self, attachments: usize) {
        self.bar.set_draw_target(indicatif::ProgressDrawTarget::stderr());
        self.bar.set_prefix("Generating");
        self.bar.set_message(format!(
            "Analyzing handwriting and calculating data… ({attachments} attachments)"
        ));
        self.bar.enable_steady_tick(Duration::from_millis(80));
    }

    fn on_generation_complete(&self, latex_len: usize) {
        self.bar.finish_and_clear();
        eprintln!(
            "{} Report generated  {}",
            green("✔"),
            dim(&format!("{latex_len} chars"))
        );
    }

    fn on_generation_error(&self, error: String) {
        self.bar.finish_and_clear();
        eprintln!("{} {}", red("✘"), red(&error));
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Generate report.tex in the current directory (Gemini)
  labreport template.tex guide.pdf page1.jpg page2.jpg

  # Plain-text guide, write into ./out
  labreport template.tex guide.txt data/*.png -o out

  # Print the LaTeX instead of saving it
  labreport --stdout template.tex guide.pdf page1.jpg > report.tex

  # Inspect the request that would be sent (no API key needed)
  labreport --dry-run template.tex guide.pdf page1.jpg page2.jpg

  # Use another multimodal provider through edgequake-llm
  labreport --provider openai --model gpt-4.1 template.tex guide.pdf page1.jpg

ENVIRONMENT VARIABLES:
  GEMINI_API_KEY       Google Gemini API key (API_KEY is accepted as fallback)
  LABREPORT_PROVIDER   Use a non-Gemini provider (openai, anthropic, ollama, …)
  LABREPORT_MODEL      Override the model ID (default: gemini-2.5-flash)
  RUST_LOG             Override the log filter

SETUP:
  1. Set API key:   export GEMINI_API_KEY=...
  2. Generate:      labreport template.tex guide.pdf photos/*.jpg
  3. Compile:       pdflatex report.tex
"#;

/// Generate a LaTeX lab report from a template, a guide and data photos.
#[derive(Parser, Debug)]
#[command(
    name = "labreport",
    version,
    about = "Generate a LaTeX lab report from a template, an experiment guide and photos of handwritten data",
    long_about = "Walks the four report steps (template, guide, data, generate) from the \
command line: reads the LaTeX template and the experiment guide (PDF or text), attaches every \
data photo in order and asks a multimodal model to write the complete report as LaTeX.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// LaTeX template file (.tex / .txt).
    template: PathBuf,

    /// Experiment guide: a PDF, or any text file.
    guide: PathBuf,

    /// Photos of handwritten data pages, in page order.
    images: Vec<PathBuf>,

    /// Directory to write report.tex into.
    #[arg(short, long, env = "LABREPORT_OUTPUT", default_value = ".")]
    output: PathBuf,

    /// Model ID (default: gemini-2.5-flash).
    #[arg(long, env = "LABREPORT_MODEL")]
    model: Option<String>,

    /// Use an edgequake-llm provider instead of the native Gemini API.
    #[arg(
        long,
        env = "LABREPORT_PROVIDER",
        long_help = "Provider name passed to edgequake-llm (openai, anthropic, ollama, …).\n\
          When unset, Gemini is called directly with GEMINI_API_KEY.\n\
          Requires --model, since the default model is a Gemini one."
    )]
    provider: Option<String>,

    /// Sampling temperature (0.0–2.0).
    #[arg(long, env = "LABREPORT_TEMPERATURE", default_value_t = 0.2)]
    temperature: f32,

    /// Save the model's text exactly as returned (no code-fence cleanup).
    #[arg(long)]
    keep_fences: bool,

    /// Print the assembled request (attachments elided) and exit.
    #[arg(long)]
    dry_run: bool,

    /// Write the LaTeX to stdout instead of report.tex.
    #[arg(long)]
    stdout: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "LABREPORT_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "LABREPORT_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress lines replace INFO logs unless --verbose is given.
    let show_progress = !cli.quiet && !cli.dry_run;
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

    let generation = build_config(&cli)?;

    // Fail on a missing key before reading any photos.
    let backend = if cli.dry_run {
        None
    } else {
        Some(resolve_backend(&generation).context("No model backend available")?)
    };

    let mut session = WizardSession::new();
    if show_progress {
        let cb = CliProgressCallback::new();
        session = session.with_progress(cb as ProgressCallback);
    }

    // ── Step 1: template ─────────────────────────────────────────────────
    session
        .upload_template(&PickedFile::from_path(&cli.template))
        .await
        .with_context(|| format!("Failed to read template {:?}", cli.template))?;
    session.advance()?;

    // ── Step 2: guide ────────────────────────────────────────────────────
    session
        .upload_guide(&PickedFile::from_path(&cli.guide))
        .await
        .with_context(|| format!("Failed to read guide {:?}", cli.guide))?;
    session.advance()?;

    // ── Step 3: data photos ──────────────────────────────────────────────
    let files: Vec<PickedFile> = cli.images.iter().map(PickedFile::from_path).collect();
    let outcome = session.upload_images(&files).await;
    if !cli.quiet && !show_progress {
        for (name, err) in &outcome.skipped {
            eprintln!("{} skipped {name}: {err}", cyan("⚠"));
        }
    }
    session.advance()?;

    if !cli.quiet {
        eprintln!("{} {}", cyan("◆"), bold(&session.summary()));
    }

    // ── Dry run ──────────────────────────────────────────────────────────
    let Some(backend) = backend else {
        let request = elide_attachments(build_request(session.config(), &generation));
        println!(
            "{}",
            serde_json::to_string_pretty(&request).context("Failed to serialise request")?
        );
        return Ok(());
    };

    // ── Step 4: generate ─────────────────────────────────────────────────
    let raw = session
        .generate(backend.as_ref(), &generation)
        .await
        .context("Report generation failed")?
        .to_string();

    let latex = if cli.keep_fences { raw } else { clean_latex(&raw) };

    if cli.stdout {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        handle
            .write_all(latex.as_bytes())
            .context("Failed to write to stdout")?;
        if !latex.ends_with('\n') {
            handle.write_all(b"\n").ok();
        }
        return Ok(());
    }

    let path = ReportDownload::new(latex)
        .write_to_dir(&cli.output)
        .await
        .context("Failed to save report")?;

    if !cli.quiet {
        eprintln!("{}  →  {}", green("✔"), bold(&path.display().to_string()));
        eprintln!("   {}", dim(&format!("compile with: pdflatex {}", path.display())));
    }

    Ok(())
}

/// Map CLI args to `GenerationConfig`.
fn build_config(cli: &Cli) -> Result<GenerationConfig> {
    if cli.provider.is_some() && cli.model.is_none() {
        anyhow::bail!("--provider requires --model (or LABREPORT_MODEL): the default model is a Gemini model");
    }
    let mut builder = GenerationConfig::builder().temperature(cli.temperature);
    if let Some(ref model) = cli.model {
        builder = builder.model(model);
    }
    if let Some(ref provider) = cli.provider {
        builder = builder.provider_name(provider);
    }
    builder.build().context("Invalid configuration")
}

/// Replace base64 payloads with their length so the request stays readable.
fn elide_attachments(mut request: ReportRequest) -> ReportRequest {
    for part in &mut request.parts {
        if let RequestPart::InlineData { data, .. } = part {
            *data = format!("<{} base64 chars>", data.len());
        }
    }
    request
}
