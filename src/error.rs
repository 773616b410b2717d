//! Error types for the labreport library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`IngestError`] — **Non-fatal**: a single picked file could not be read
//!   or decoded. For a batch of data photos the file is skipped and the rest
//!   of the batch is kept; for the template or guide the upload is refused
//!   and the session keeps its previous value.
//!
//! * [`ReportError`] — **Fatal for the current action**: the wizard refused a
//!   navigation request, the generation call failed, or the report could not
//!   be written. Returned as `Err(ReportError)` from session operations and
//!   from [`crate::generate::generate`].
//!
//! Neither type carries a structured error code; callers show the
//! `Display` text to the user.

use crate::wizard::WizardStep;
use std::path::PathBuf;
use thiserror::Error;

/// User-facing text shown for every failed generation attempt.
pub const GENERATION_FAILED_MESSAGE: &str =
    "Failed to generate report. Please check your API key and file formats.";

/// All fatal errors returned by the labreport library.
#[derive(Debug, Error)]
pub enum ReportError {
    // ── Ingestion ─────────────────────────────────────────────────────────
    /// A single-file upload (template or guide) could not be read.
    #[error("Failed to read '{name}': {source}")]
    Read {
        name: String,
        #[source]
        source: IngestError,
    },

    // ── Wizard navigation ─────────────────────────────────────────────────
    /// `advance()` was called while the current step is missing its input.
    #[error("Cannot leave the {step} step yet: {requirement}")]
    StepIncomplete {
        step: WizardStep,
        requirement: &'static str,
    },

    /// `jump_to()` targeted the current step or a later one.
    #[error("Cannot jump from {from} to {to}: only completed steps can be revisited")]
    JumpForward { from: WizardStep, to: WizardStep },

    // ── Generation ────────────────────────────────────────────────────────
    /// The model service rejected or failed the request (transport, auth, quota).
    ///
    /// `Display` shows only [`GENERATION_FAILED_MESSAGE`]; the underlying
    /// cause is kept in `detail` for logs.
    #[error("{}", GENERATION_FAILED_MESSAGE)]
    Generation { detail: String },

    /// The service answered but produced no usable text.
    #[error("Error: No response generated.")]
    EmptyResult,

    /// No backend could be built (missing API key, unknown provider, …).
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    // ── Output ────────────────────────────────────────────────────────────
    /// Could not create or write `report.tex`.
    #[error("Failed to write report '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config ────────────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ReportError {
    /// Wrap any transport-level failure from a backend.
    pub fn generation(detail: impl std::fmt::Display) -> Self {
        ReportError::Generation {
            detail: detail.to_string(),
        }
    }
}

/// A non-fatal error for a single picked file.
#[derive(Debug, Error)]
pub enum IngestError {
    /// The file disappeared between picking and reading.
    #[error("file not found: '{path}'")]
    NotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("permission denied reading '{path}'")]
    PermissionDenied { path: PathBuf },

    /// Any other read failure.
    #[error("I/O error reading '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Content could not be decoded (not UTF-8, broken data URL, …).
    #[error("could not decode '{name}': {detail}")]
    Decode { name: String, detail: String },

    /// A template must contain something.
    #[error("template '{name}' is empty")]
    EmptyTemplate { name: String },
}
