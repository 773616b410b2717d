//! The four-step wizard: template → guide → data → generate.
//!
//! [`WizardSession`] owns everything the user has supplied and the current
//! step. It is a plain value mutated through `&mut self`, so a UI layer,
//! the CLI and the tests all drive the same code without any global state.
//!
//! Navigation is strictly linear: [`WizardSession::advance`] is gated on the
//! current step's required input, and [`WizardSession::jump_to`] only goes
//! back to steps that are already completed.

use crate::backend::ReportBackend;
use crate::config::GenerationConfig;
use crate::download::ReportDownload;
use crate::error::{IngestError, ReportError};
use crate::generate::generate;
use crate::pipeline::ingest::{guide_kind, ingest, ingest_batch};
use crate::pipeline::input::PickedFile;
use crate::progress::ProgressCallback;
use crate::report::{FileKind, ReportConfig, UploadedFile};
use std::cmp::Ordering;
use std::fmt;
use tracing::{debug, info, warn};

/// Message recorded when the template cannot be read.
pub const TEMPLATE_READ_FAILED: &str = "Failed to read template file.";

/// Message recorded when the guide cannot be read.
pub const GUIDE_READ_FAILED: &str = "Failed to read guide file.";

// ── Steps ────────────────────────────────────────────────────────────────

/// A wizard step.
///
/// Ordering is defined by [`WizardStep::position`], not by discriminant
/// values, so inserting a step only requires updating that one match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WizardStep {
    #[default]
    Template,
    Guide,
    Data,
    Generate,
}

impl WizardStep {
    /// All steps in order.
    pub const ALL: [WizardStep; 4] = [
        WizardStep::Template,
        WizardStep::Guide,
        WizardStep::Data,
        WizardStep::Generate,
    ];

    /// Zero-based position in the wizard.
    pub fn position(self) -> usize {
        match self {
            WizardStep::Template => 0,
            WizardStep::Guide => 1,
            WizardStep::Data => 2,
            WizardStep::Generate => 3,
        }
    }

    /// Step number shown to the user (1-based).
    pub fn number(self) -> usize {
        self.position() + 1
    }

    pub fn title(self) -> &'static str {
        match self {
            WizardStep::Template => "Template",
            WizardStep::Guide => "Guide",
            WizardStep::Data => "Data",
            WizardStep::Generate => "Generate",
        }
    }

    pub fn next(self) -> Option<WizardStep> {
        Self::ALL.get(self.position() + 1).copied()
    }

    pub fn previous(self) -> Option<WizardStep> {
        self.position()
            .checked_sub(1)
            .and_then(|i| Self::ALL.get(i).copied())
    }

    pub fn is_first(self) -> bool {
        self.previous().is_none()
    }

    pub fn is_last(self) -> bool {
        self.next().is_none()
    }
}

impl PartialOrd for WizardStep {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for WizardStep {
    fn cmp(&self, other: &Self) -> Ordering {
        self.position().cmp(&other.position())
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

// ── Batch outcome ────────────────────────────────────────────────────────

/// What happened to each file of a data-photo batch.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    /// Names of files appended to the image list, in order.
    pub added: Vec<String>,
    /// Files that could not be read, with the reason.
    pub skipped: Vec<(String, IngestError)>,
}

// ── Session ──────────────────────────────────────────────────────────────

/// One user's pass through the wizard.
#[derive(Default)]
pub struct WizardSession {
    step: WizardStep,
    config: ReportConfig,
    template_name: Option<String>,
    guide_name: Option<String>,
    result: Option<String>,
    error: Option<String>,
    progress: Option<ProgressCallback>,
}

impl fmt::Debug for WizardSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WizardSession")
            .field("step", &self.step)
            .field("template_name", &self.template_name)
            .field("guide_name", &self.guide_name)
            .field("images", &self.config.images.len())
            .field("result", &self.result.as_ref().map(String::len))
            .field("error", &self.error)
            .finish()
    }
}

impl WizardSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a progress callback.
    pub fn with_progress(mut self, progress: ProgressCallback) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    pub fn images(&self) -> &[UploadedFile] {
        &self.config.images
    }

    pub fn template_name(&self) -> Option<&str> {
        self.template_name.as_deref()
    }

    pub fn guide_name(&self) -> Option<&str> {
        self.guide_name.as_deref()
    }

    /// LaTeX from the last successful generation.
    pub fn result(&self) -> Option<&str> {
        self.result.as_deref()
    }

    /// Message of the last failure, until dismissed.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    // ── Navigation ───────────────────────────────────────────────────────

    /// Whether the current step's required input is present.
    pub fn can_advance(&self) -> bool {
        self.missing_requirement().is_none()
    }

    fn missing_requirement(&self) -> Option<&'static str> {
        match self.step {
            WizardStep::Template if !self.config.has_template() => Some("upload a LaTeX template"),
            WizardStep::Guide if !self.config.has_guide() => Some("upload an experiment guide"),
            _ => None,
        }
    }

    /// Move to the next step.
    ///
    /// At the last step this is a no-op. If the current step is incomplete
    /// the state is unchanged and [`ReportError::StepIncomplete`] is returned.
    pub fn advance(&mut self) -> Result<WizardStep, ReportError> {
        let Some(next) = self.step.next() else {
            return Ok(self.step);
        };
        if let Some(requirement) = self.missing_requirement() {
            return Err(ReportError::StepIncomplete {
                step: self.step,
                requirement,
            });
        }
        info!("Wizard: {} → {}", self.step, next);
        self.step = next;
        Ok(next)
    }

    /// Move to the previous step; no-op at the first step.
    pub fn retreat(&mut self) -> WizardStep {
        if let Some(prev) = self.step.previous() {
            info!("Wizard: {} → {}", self.step, prev);
            self.step = prev;
        }
        self.step
    }

    /// Go back to a completed step. Jumping to the current or a later step
    /// is rejected and leaves the state unchanged.
    pub fn jump_to(&mut self, step: WizardStep) -> Result<WizardStep, ReportError> {
        if step >= self.step {
            return Err(ReportError::JumpForward {
                from: self.step,
                to: step,
            });
        }
        info!("Wizard: jump {} → {}", self.step, step);
        self.step = step;
        Ok(step)
    }

    /// A step counts as completed once the wizard has moved past it.
    pub fn is_completed(&self, step: WizardStep) -> bool {
        step < self.step
    }

    // ── Uploads ──────────────────────────────────────────────────────────

    /// Read a template file and make it the current template.
    ///
    /// On failure the previous template is kept and a user-facing message is
    /// recorded in [`WizardSession::error`].
    pub async fn upload_template(&mut self, file: &PickedFile) -> Result<(), ReportError> {
        let uploaded = ingest(file, FileKind::Text).await.and_then(|f| {
            if f.content().is_empty() {
                Err(IngestError::EmptyTemplate {
                    name: file.name.clone(),
                })
            } else {
                Ok(f)
            }
        });

        match uploaded {
            Ok(f) => {
                info!("Template '{}' loaded ({} bytes)", file.name, f.content().len());
                self.config.template = f.content().to_string();
                self.template_name = Some(file.name.clone());
                Ok(())
            }
            Err(source) => {
                warn!("Template '{}' rejected: {}", file.name, source);
                self.error = Some(TEMPLATE_READ_FAILED.to_string());
                Err(ReportError::Read {
                    name: file.name.clone(),
                    source,
                })
            }
        }
    }

    /// Read the experiment guide: PDF when the mime type is exactly
    /// `application/pdf`, text otherwise.
    pub async fn upload_guide(&mut self, file: &PickedFile) -> Result<(), ReportError> {
        let kind = guide_kind(&file.mime_type);
        match ingest(file, kind).await {
            Ok(f) => {
                info!("Guide '{}' loaded as {}", file.name, kind);
                self.config.guide = Some(f);
                self.guide_name = Some(file.name.clone());
                Ok(())
            }
            Err(source) => {
                warn!("Guide '{}' rejected: {}", file.name, source);
                self.error = Some(GUIDE_READ_FAILED.to_string());
                Err(ReportError::Read {
                    name: file.name.clone(),
                    source,
                })
            }
        }
    }

    /// Read a batch of data photos and append the readable ones.
    ///
    /// Files are read one at a time. A file that fails is logged and skipped;
    /// the rest of the batch is still appended, in order.
    pub async fn upload_images(&mut self, files: &[PickedFile]) -> BatchOutcome {
        let total = files.len();
        if let Some(ref cb) = self.progress {
            cb.on_batch_start(total);
        }

        let progress = self.progress.clone();
        let results = ingest_batch(files, FileKind::Image, |index, name, result| {
            if let Some(ref cb) = progress {
                match result {
                    Ok(_) => cb.on_file_ingested(name, index + 1, total),
                    Err(e) => cb.on_file_skipped(name, index + 1, total, e.to_string()),
                }
            }
        })
        .await;

        let mut outcome = BatchOutcome::default();
        for (name, result) in results {
            match result {
                Ok(f) => {
                    self.config.images.push(f);
                    outcome.added.push(name);
                }
                Err(e) => outcome.skipped.push((name, e)),
            }
        }

        info!(
            "Images: {} added, {} skipped, {} total",
            outcome.added.len(),
            outcome.skipped.len(),
            self.config.images.len()
        );
        outcome
    }

    /// Remove the photo at `index`. Other photos keep their relative order;
    /// an out-of-range index changes nothing.
    pub fn remove_image(&mut self, index: usize) -> Option<UploadedFile> {
        if index >= self.config.images.len() {
            debug!("remove_image: index {} out of range", index);
            return None;
        }
        let removed = self.config.images.remove(index);
        debug!("Removed image '{}'", removed.name());
        Some(removed)
    }

    // ── Generation ───────────────────────────────────────────────────────

    /// Run one generation attempt with `backend`.
    ///
    /// Clears any previous result and error first. On success the LaTeX is
    /// stored and returned; on failure the error's message is stored for
    /// display and the error is returned. There is no retry.
    pub async fn generate(
        &mut self,
        backend: &dyn ReportBackend,
        generation: &GenerationConfig,
    ) -> Result<&str, ReportError> {
        self.error = None;
        self.result = None;

        if let Some(ref cb) = self.progress {
            cb.on_generation_start(self.config.attachment_count());
        }

        match generate(backend, &self.config, generation).await {
            Ok(latex) => {
                if let Some(ref cb) = self.progress {
                    cb.on_generation_complete(latex.len());
                }
                Ok(self.result.insert(latex).as_str())
            }
            Err(e) => {
                let message = e.to_string();
                if let Some(ref cb) = self.progress {
                    cb.on_generation_error(message.clone());
                }
                self.error = Some(message);
                Err(e)
            }
        }
    }

    /// The generated report as a download, if one exists.
    pub fn download(&self) -> Option<ReportDownload> {
        self.result.as_ref().map(|latex| ReportDownload::new(latex.clone()))
    }

    /// "1 Template, 1 Guide, N Images" overview shown before generating.
    pub fn summary(&self) -> String {
        format!(
            "{}, {}, {} Images",
            if self.config.has_template() { "1 Template" } else { "No Template" },
            if self.config.has_guide() { "1 Guide" } else { "No Guide" },
            self.config.images.len()
        )
    }
}
