//! Picked files: what the user selected, before anything has been read.
//!
//! A [`PickedFile`] records the name and declared mime type up front (as a
//! browser file picker does) and defers reading the bytes until ingestion.
//! Three sources are supported:
//!
//! * a path on disk, read asynchronously with `tokio::fs`;
//! * bytes already in memory;
//! * a `data:` URL produced by a browser-style reader, whose media-type
//!   prefix is stripped before the payload is used.

use crate::error::IngestError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::path::{Path, PathBuf};
use tracing::debug;

/// The PDF media type; the only mime that routes a guide to binary upload.
pub const PDF_MIME: &str = "application/pdf";

/// Where the bytes of a picked file live.
#[derive(Debug, Clone)]
pub enum FileSource {
    /// File on the local file system.
    Disk(PathBuf),
    /// Raw bytes already loaded.
    Memory(Vec<u8>),
    /// `data:<mime>;base64,<payload>` string.
    DataUrl(String),
}

/// A file chosen by the user, not yet read.
#[derive(Debug, Clone)]
pub struct PickedFile {
    /// Display name (file name without directories).
    pub name: String,
    /// Declared media type; empty when the picker could not tell.
    pub mime_type: String,
    pub source: FileSource,
}

impl PickedFile {
    /// Pick a file on disk. The mime type is guessed from the extension.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let mime_type = mime_guess::from_path(path)
            .first()
            .map(|m| m.essence_str().to_string())
            .unwrap_or_default();

        Self {
            name,
            mime_type,
            source: FileSource::Disk(path.to_path_buf()),
        }
    }

    /// Wrap bytes that are already in memory.
    pub fn from_bytes(
        name: impl Into<String>,
        mime_type: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            source: FileSource::Memory(bytes.into()),
        }
    }

    /// Wrap a `data:` URL. The declared mime type is taken from the URL
    /// header when present.
    pub fn from_data_url(name: impl Into<String>, data_url: impl Into<String>) -> Self {
        let data_url = data_url.into();
        let mime_type = data_url_mime(&data_url).unwrap_or_default().to_string();
        Self {
            name: name.into(),
            mime_type,
            source: FileSource::DataUrl(data_url),
        }
    }

    /// Read the raw bytes of the file.
    pub async fn read_bytes(&self) -> Result<Vec<u8>, IngestError> {
        match &self.source {
            FileSource::Disk(path) => read_disk(path).await,
            FileSource::Memory(bytes) => Ok(bytes.clone()),
            FileSource::DataUrl(url) => {
                STANDARD
                    .decode(strip_data_url_prefix(url).trim())
                    .map_err(|e| IngestError::Decode {
                        name: self.name.clone(),
                        detail: format!("invalid base64 payload: {e}"),
                    })
            }
        }
    }

    /// Read the file as base64 with no media-type prefix.
    pub async fn read_base64(&self) -> Result<String, IngestError> {
        match &self.source {
            FileSource::DataUrl(url) => {
                let payload = strip_data_url_prefix(url).trim();
                // Validate so a corrupt URL fails here rather than at the API.
                STANDARD.decode(payload).map_err(|e| IngestError::Decode {
                    name: self.name.clone(),
                    detail: format!("invalid base64 payload: {e}"),
                })?;
                Ok(payload.to_string())
            }
            _ => {
                let bytes = self.read_bytes().await?;
                let b64 = STANDARD.encode(&bytes);
                debug!("Encoded '{}' → {} bytes base64", self.name, b64.len());
                Ok(b64)
            }
        }
    }

    /// Read the file as strict UTF-8 text.
    pub async fn read_text(&self) -> Result<String, IngestError> {
        let bytes = self.read_bytes().await?;
        String::from_utf8(bytes).map_err(|e| IngestError::Decode {
            name: self.name.clone(),
            detail: format!("not valid UTF-8: {e}"),
        })
    }
}

async fn read_disk(path: &Path) -> Result<Vec<u8>, IngestError> {
    tokio::fs::read(path).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => IngestError::NotFound {
            path: path.to_path_buf(),
        },
        std::io::ErrorKind::PermissionDenied => IngestError::PermissionDenied {
            path: path.to_path_buf(),
        },
        _ => IngestError::Io {
            path: path.to_path_buf(),
            source: e,
        },
    })
}

/// Strip the `data:<mime>;base64,` header from a data URL.
///
/// Anything that is not a data URL is returned unchanged.
pub fn strip_data_url_prefix(s: &str) -> &str {
    if !s.starts_with("data:") {
        return s;
    }
    match s.split_once(',') {
        Some((_, payload)) => payload,
        None => "",
    }
}

/// Media type declared in a data URL header, if any.
pub fn data_url_mime(s: &str) -> Option<&str> {
    let header = s.strip_prefix("data:")?.split(',').next()?;
    let mime = header.split(';').next()?;
    if mime.is_empty() {
        None
    } else {
        Some(mime)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_prefix_variants() {
        assert_eq!(strip_data_url_prefix("data:image/jpeg;base64,/9j/4A"), "/9j/4A");
        assert_eq!(strip_data_url_prefix("data:application/pdf;base64,JVBE"), "JVBE");
        assert_eq!(strip_data_url_prefix("QUJD"), "QUJD");
        assert_eq!(strip_data_url_prefix("data:text/plain"), "");
    }

    #[test]
    fn mime_from_data_url() {
        assert_eq!(data_url_mime("data:image/png;base64,AAAA"), Some("image/png"));
        assert_eq!(data_url_mime("data:;base64,AAAA"), None);
        assert_eq!(data_url_mime("AAAA"), None);
    }

    #[test]
    fn from_path_guesses_mime() {
        let f = PickedFile::from_path("/tmp/labs/guide.pdf");
        assert_eq!(f.name, "guide.pdf");
        assert_eq!(f.mime_type, PDF_MIME);

        let f = PickedFile::from_path("page1.JPG");
        assert_eq!(f.mime_type, "image/jpeg");
    }

    #[tokio::test]
    async fn missing_file_is_not_found() {
        let f = PickedFile::from_path("/definitely/not/here/template.tex");
        match f.read_text().await {
            Err(IngestError::NotFound { path }) => {
                assert!(path.ends_with("template.tex"));
            }
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn invalid_utf8_is_decode_error() {
        let f = PickedFile::from_bytes("bad.txt", "text/plain", vec![0xff, 0xfe, 0x00]);
        assert!(matches!(
            f.read_text().await,
            Err(IngestError::Decode { .. })
        ));
    }

    #[tokio::test]
    async fn data_url_base64_is_passed_through() {
        let f = PickedFile::from_data_url("a.png", "data:image/png;base64,QUJD");
        assert_eq!(f.mime_type, "image/png");
        assert_eq!(f.read_base64().await.unwrap(), "QUJD");
        assert_eq!(f.read_bytes().await.unwrap(), b"ABC");
    }

    #[tokio::test]
    async fn corrupt_data_url_is_decode_error() {
        let f = PickedFile::from_data_url("a.png", "data:image/png;base64,!!not base64!!");
        assert!(matches!(
            f.read_base64().await,
            Err(IngestError::Decode { .. })
        ));
    }
}
