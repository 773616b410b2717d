//! Ingestion: `PickedFile` → `UploadedFile`.
//!
//! Model APIs accept binary attachments as base64 strings embedded in the
//! JSON request body, while templates and plain-text guides are sent as
//! literal text. This stage reads each picked file once and stores it in the
//! representation the request builder needs, so nothing downstream touches
//! the file system again.

use super::input::{PickedFile, PDF_MIME};
use super::request::DEFAULT_IMAGE_MIME;
use crate::error::IngestError;
use crate::report::{FileKind, UploadedFile};
use tracing::{debug, warn};

/// Read a picked file as the declared kind.
///
/// * `Text` — strict UTF-8 decode, no mime type attached.
/// * `Image` / `Pdf` — base64 payload plus the picker's mime type.
pub async fn ingest(file: &PickedFile, kind: FileKind) -> Result<UploadedFile, IngestError> {
    match kind {
        FileKind::Text => {
            let content = file.read_text().await?;
            debug!("Ingested '{}' as text ({} bytes)", file.name, content.len());
            Ok(UploadedFile::text(&file.name, content))
        }
        FileKind::Image | FileKind::Pdf => {
            let content = file.read_base64().await?;
            let mime = declared_mime(file, kind);
            debug!("Ingested '{}' as {} ({})", file.name, kind, mime);
            Ok(UploadedFile::binary(&file.name, content, kind, mime))
        }
    }
}

/// Choose how a guide file is ingested: PDF only for exactly `application/pdf`.
pub fn guide_kind(mime_type: &str) -> FileKind {
    if mime_type == PDF_MIME {
        FileKind::Pdf
    } else {
        FileKind::Text
    }
}

/// Ingest every file of a batch one after another.
///
/// Each file gets its own result; a failure never aborts the remaining
/// files. Results are returned in input order. `on_item` is called with the
/// zero-based index as soon as each file has been read.
pub async fn ingest_batch<F>(
    files: &[PickedFile],
    kind: FileKind,
    mut on_item: F,
) -> Vec<(String, Result<UploadedFile, IngestError>)>
where
    F: FnMut(usize, &str, &Result<UploadedFile, IngestError>),
{
    let mut results = Vec::with_capacity(files.len());
    for (index, file) in files.iter().enumerate() {
        let result = ingest(file, kind).await;
        if let Err(ref e) = result {
            warn!("Skipped '{}': {}", file.name, e);
        }
        on_item(index, &file.name, &result);
        results.push((file.name.clone(), result));
    }
    results
}

fn declared_mime(file: &PickedFile, kind: FileKind) -> String {
    if !file.mime_type.is_empty() {
        return file.mime_type.clone();
    }
    match kind {
        FileKind::Pdf => PDF_MIME.to_string(),
        _ => DEFAULT_IMAGE_MIME.to_string(),
    }
}
