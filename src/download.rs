//! The downloadable report: `report.tex`, media type `application/x-latex`.

use crate::error::ReportError;
use std::path::{Path, PathBuf};
use tracing::info;

/// File name offered for download.
pub const REPORT_FILE_NAME: &str = "report.tex";

/// Media type of the downloadable report.
pub const REPORT_MEDIA_TYPE: &str = "application/x-latex";

/// A finished report, ready to be saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportDownload {
    pub file_name: &'static str,
    pub media_type: &'static str,
    pub body: String,
}

impl ReportDownload {
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            file_name: REPORT_FILE_NAME,
            media_type: REPORT_MEDIA_TYPE,
            body: body.into(),
        }
    }

    /// Write `report.tex` into `dir`, creating it if needed.
    ///
    /// Uses atomic write (temp file + rename) so an interrupted save never
    /// leaves a truncated report behind.
    pub async fn write_to_dir(&self, dir: impl AsRef<Path>) -> Result<PathBuf, ReportError> {
        let dir = dir.as_ref();
        let path = dir.join(self.file_name);
        let write_err = |source| ReportError::OutputWriteFailed {
            path: path.clone(),
            source,
        };

        tokio::fs::create_dir_all(dir).await.map_err(write_err)?;

        let tmp_path = path.with_extension("tex.tmp");
        tokio::fs::write(&tmp_path, &self.body)
            .await
            .map_err(write_err)?;
        if let Err(e) = tokio::fs::rename(&tmp_path, &path).await {
            let _ = tokio::fs::remove_file(&tmp_path).await;
            return Err(write_err(e));
        }

        info!("Saved {} ({} bytes)", path.display(), self.body.len());
        Ok(path)
    }
}
