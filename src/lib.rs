//! # labreport
//!
//! Turn a LaTeX template, an experiment guide and photos of handwritten
//! measurements into a complete LaTeX lab report using a multimodal LLM.
//!
//! ## Why this crate?
//!
//! Writing up a lab report means transcribing hand-written tables, redoing
//! the calculations and pasting everything into the department's template.
//! A vision model can read the data pages directly. This crate collects the
//! three inputs through a small four-step wizard, packs them into one
//! multimodal request and hands back LaTeX ready for `pdflatex`.
//!
//! ## Pipeline Overview
//!
//! ```text
//! template.tex   guide.pdf|.txt   photo1.jpg … photoN.jpg
//!      │               │                 │
//!      ├─ 1. Input    resolve disk paths, in-memory bytes or data URLs
//!      ├─ 2. Ingest   text → UTF-8, binaries → base64 (one at a time)
//!      ├─ 3. Wizard   Template → Guide → Data → Generate (gated steps)
//!      ├─ 4. Request  [guide] [photo 1..N] [instructions + template]
//!      ├─ 5. Backend  one Gemini / provider call, no retry
//!      └─ 6. Output   report.tex (application/x-latex)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use labreport::{resolve_backend, GenerationConfig, PickedFile, WizardSession};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Gemini key read from GEMINI_API_KEY
//!     let generation = GenerationConfig::default();
//!     let backend = resolve_backend(&generation)?;
//!
//!     let mut session = WizardSession::new();
//!     session.upload_template(&PickedFile::from_path("template.tex")).await?;
//!     session.advance()?;
//!     session.upload_guide(&PickedFile::from_path("guide.pdf")).await?;
//!     session.advance()?;
//!     session
//!         .upload_images(&[PickedFile::from_path("page1.jpg"), PickedFile::from_path("page2.jpg")])
//!         .await;
//!     session.advance()?;
//!
//!     let latex = session.generate(backend.as_ref(), &generation).await?;
//!     println!("{latex}");
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `labreport` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! labreport = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod backend;
pub mod config;
pub mod download;
pub mod error;
pub mod generate;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod report;
pub mod wizard;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use backend::{resolve_backend, GeminiBackend, ProviderBackend, ReportBackend};
pub use config::{GenerationConfig, GenerationConfigBuilder};
pub use download::ReportDownload;
pub use error::{IngestError, ReportError};
pub use generate::{generate, generate_sync, generate_to_dir, generate_with_config};
pub use pipeline::input::{FileSource, PickedFile};
pub use pipeline::request::{ReportRequest, RequestPart};
pub use progress::{NoopProgressCallback, ProgressCallback, ReportProgressCallback};
pub use report::{FileKind, ReportConfig, UploadedFile};
pub use wizard::{BatchOutcome, WizardSession, WizardStep};
