//! Report generation entry points.
//!
//! [`generate`] is a single request/response exchange: assemble the parts,
//! call the backend once, and hand back the LaTeX. There is no retry loop;
//! a failed attempt is reported and the user re-invokes it.

use crate::backend::{resolve_backend, ReportBackend};
use crate::config::GenerationConfig;
use crate::download::ReportDownload;
use crate::error::ReportError;
use crate::pipeline::request::build_request;
use crate::report::ReportConfig;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{error, info};

/// Generate a LaTeX report from the supplied template, guide and photos.
///
/// # Errors
/// - [`ReportError::Generation`] — transport, auth or quota failure; its
///   `Display` is the user-facing "check your API key and file formats" text.
/// - [`ReportError::EmptyResult`] — the service answered with no text.
pub async fn generate(
    backend: &dyn ReportBackend,
    config: &ReportConfig,
    generation: &GenerationConfig,
) -> Result<String, ReportError> {
    let start = Instant::now();
    let request = build_request(config, generation);
    info!(
        "Generating report with {} ({}): {} parts, {} images",
        backend.name(),
        request.model,
        request.parts.len(),
        config.images.len()
    );

    let text = match backend.complete(&request).await {
        Ok(text) => text,
        Err(e) => {
            if let ReportError::Generation { ref detail } = e {
                error!("{} API error: {}", backend.name(), detail);
            }
            return Err(e);
        }
    };

    if text.trim().is_empty() {
        error!("{} returned no text", backend.name());
        return Err(ReportError::EmptyResult);
    }

    info!(
        "Report generated: {} chars in {}ms",
        text.len(),
        start.elapsed().as_millis()
    );
    Ok(text)
}

/// Resolve the backend from `generation` and run [`generate`].
pub async fn generate_with_config(
    config: &ReportConfig,
    generation: &GenerationConfig,
) -> Result<String, ReportError> {
    let backend = resolve_backend(generation)?;
    generate(backend.as_ref(), config, generation).await
}

/// Generate and write `report.tex` into `dir`.
pub async fn generate_to_dir(
    config: &ReportConfig,
    generation: &GenerationConfig,
    dir: impl AsRef<Path>,
) -> Result<PathBuf, ReportError> {
    let latex = generate_with_config(config, generation).await?;
    ReportDownload::new(latex).write_to_dir(dir).await
}

/// Synchronous wrapper around [`generate_with_config`].
///
/// Creates a temporary tokio runtime internally.
pub fn generate_sync(
    config: &ReportConfig,
    generation: &GenerationConfig,
) -> Result<String, ReportError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| ReportError::generation(format!("failed to create tokio runtime: {e}")))?
        .block_on(generate_with_config(config, generation))
}
