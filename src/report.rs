//! Data model shared by the wizard, the ingestion pipeline and the request
//! builder.
//!
//! [`UploadedFile`] keeps its fields private so the `mime_type` ⇔ `kind`
//! invariant can only be established by its constructors. Deserialisation
//! goes through the same check.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How a picked file is represented once ingested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    /// UTF-8 text kept verbatim.
    Text,
    /// Photograph of handwritten data, base64 encoded.
    Image,
    /// PDF document, base64 encoded.
    Pdf,
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FileKind::Text => "text",
            FileKind::Image => "image",
            FileKind::Pdf => "pdf",
        })
    }
}

/// A file read from the picker, ready to be sent to the model.
///
/// `content` is literal text for [`FileKind::Text`] and base64 without any
/// `data:` prefix otherwise. `mime_type` is present iff the kind is binary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "UploadedFileRepr")]
pub struct UploadedFile {
    name: String,
    content: String,
    kind: FileKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    mime_type: Option<String>,
}

impl UploadedFile {
    /// A text file; never carries a mime type.
    pub fn text(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
            kind: FileKind::Text,
            mime_type: None,
        }
    }

    /// A binary file (image or PDF) with its base64 payload.
    ///
    /// Passing [`FileKind::Text`] is a caller bug; it is coerced to
    /// [`FileKind::Image`] so the invariant still holds.
    pub fn binary(
        name: impl Into<String>,
        base64: impl Into<String>,
        kind: FileKind,
        mime_type: impl Into<String>,
    ) -> Self {
        let kind = match kind {
            FileKind::Text => FileKind::Image,
            other => other,
        };
        Self {
            name: name.into(),
            content: base64.into(),
            kind,
            mime_type: Some(mime_type.into()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn kind(&self) -> FileKind {
        self.kind
    }

    pub fn mime_type(&self) -> Option<&str> {
        self.mime_type.as_deref()
    }
}

/// Unchecked wire form of [`UploadedFile`].
#[derive(Deserialize)]
struct UploadedFileRepr {
    name: String,
    content: String,
    kind: FileKind,
    #[serde(default)]
    mime_type: Option<String>,
}

impl TryFrom<UploadedFileRepr> for UploadedFile {
    type Error = String;

    fn try_from(repr: UploadedFileRepr) -> Result<Self, Self::Error> {
        match (repr.kind, repr.mime_type) {
            (FileKind::Text, None) => Ok(UploadedFile::text(repr.name, repr.content)),
            (FileKind::Text, Some(_)) => {
                Err(format!("text file '{}' must not carry a mime_type", repr.name))
            }
            (kind, Some(mime)) if !mime.is_empty() => {
                Ok(UploadedFile::binary(repr.name, repr.content, kind, mime))
            }
            (kind, _) => Err(format!("{kind} file '{}' requires a mime_type", repr.name)),
        }
    }
}

/// Everything the user has supplied so far.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportConfig {
    /// LaTeX template source; empty until the first template upload succeeds.
    pub template: String,
    /// Experiment guide, PDF or text.
    pub guide: Option<UploadedFile>,
    /// Data photos in upload order. Order matters: tables may continue
    /// across photos.
    pub images: Vec<UploadedFile>,
}

impl ReportConfig {
    pub fn has_template(&self) -> bool {
        !self.template.is_empty()
    }

    pub fn has_guide(&self) -> bool {
        self.guide.is_some()
    }

    /// Number of binary parts a request will carry: the guide when it is a
    /// PDF, plus every photo.
    pub fn attachment_count(&self) -> usize {
        let guide = self
            .guide
            .as_ref()
            .map_or(0, |g| usize::from(g.kind() == FileKind::Pdf));
        guide + self.images.len()
    }
}
