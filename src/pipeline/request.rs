//! Request assembly: `ReportConfig` → backend-neutral [`ReportRequest`].
//!
//! The part order is fixed: guide, then every data photo in upload order,
//! then the instruction text. Backends translate the parts into their own
//! wire format but must not reorder them.

use crate::config::GenerationConfig;
use crate::pipeline::input::PDF_MIME;
use crate::prompts::{build_instructions, guide_text_block, DEFAULT_SYSTEM_INSTRUCTION};
use crate::report::{FileKind, ReportConfig};
use serde::Serialize;

/// Mime type assumed for a data photo that arrived without one.
pub const DEFAULT_IMAGE_MIME: &str = "image/jpeg";

/// One element of the multimodal content list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum RequestPart {
    Text { text: String },
    InlineData { mime_type: String, data: String },
}

impl RequestPart {
    pub fn text(&self) -> Option<&str> {
        match self {
            RequestPart::Text { text } => Some(text),
            RequestPart::InlineData { .. } => None,
        }
    }

    pub fn is_inline(&self) -> bool {
        matches!(self, RequestPart::InlineData { .. })
    }
}

/// A fully assembled generation request.
#[derive(Debug, Clone, Serialize)]
pub struct ReportRequest {
    pub model: String,
    pub system_instruction: String,
    pub temperature: f32,
    pub parts: Vec<RequestPart>,
}

impl ReportRequest {
    /// Number of binary attachments (guide PDF + photos).
    pub fn attachment_count(&self) -> usize {
        self.parts.iter().filter(|p| p.is_inline()).count()
    }

    /// The instruction block (always the last part).
    pub fn instructions(&self) -> Option<&str> {
        self.parts.last().and_then(RequestPart::text)
    }
}

/// Build the request for the current configuration.
pub fn build_request(config: &ReportConfig, generation: &GenerationConfig) -> ReportRequest {
    let mut parts = Vec::with_capacity(config.images.len() + 2);

    // (a) guide
    match &config.guide {
        Some(guide) if guide.kind() == FileKind::Pdf => parts.push(RequestPart::InlineData {
            mime_type: PDF_MIME.to_string(),
            data: guide.content().to_string(),
        }),
        Some(guide) => parts.push(RequestPart::Text {
            text: guide_text_block(guide.content()),
        }),
        None => parts.push(RequestPart::Text {
            text: guide_text_block(""),
        }),
    }

    // (b) every data photo, in order
    parts.extend(config.images.iter().map(|img| RequestPart::InlineData {
        mime_type: img.mime_type().unwrap_or(DEFAULT_IMAGE_MIME).to_string(),
        data: img.content().to_string(),
    }));

    // (c) instructions
    parts.push(RequestPart::Text {
        text: build_instructions(
            &config.template,
            config.guide.as_ref().map(|g| g.name()),
            &config.images,
        ),
    });

    ReportRequest {
        model: generation.model.clone(),
        system_instruction: generation
            .system_instruction
            .clone()
            .unwrap_or_else(|| DEFAULT_SYSTEM_INSTRUCTION.to_string()),
        temperature: generation.temperature,
        parts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::UploadedFile;

    fn config_with(guide: Option<UploadedFile>, images: Vec<UploadedFile>) -> ReportConfig {
        ReportConfig {
            template: "\\documentclass{article}...".into(),
            guide,
            images,
        }
    }

    #[test]
    fn pdf_guide_two_images_gives_four_parts() {
        let config = config_with(
            Some(UploadedFile::binary("guide.pdf", "JVBERi0=", FileKind::Pdf, PDF_MIME)),
            vec![
                UploadedFile::binary("img1.jpg", "AAA=", FileKind::Image, "image/jpeg"),
                UploadedFile::binary("img2.jpg", "BBB=", FileKind::Image, "image/jpeg"),
            ],
        );
        let req = build_request(&config, &GenerationConfig::default());

        assert_eq!(req.parts.len(), 4);
        assert_eq!(
            req.parts[0],
            RequestPart::InlineData {
                mime_type: PDF_MIME.into(),
                data: "JVBERi0=".into()
            }
        );
        assert_eq!(
            req.parts[2],
            RequestPart::InlineData {
                mime_type: "image/jpeg".into(),
                data: "BBB=".into()
            }
        );
        let text = req.instructions().unwrap();
        assert!(text.contains('2'));
        assert!(text.contains("\\documentclass{article}..."));
        assert_eq!(req.attachment_count(), 3);
    }

    #[test]
    fn text_guide_is_labelled_text_part() {
        let config = config_with(Some(UploadedFile::text("guide.txt", "Drop the ball.")), vec![]);
        let req = build_request(&config, &GenerationConfig::default());
        assert_eq!(req.parts.len(), 2);
        assert_eq!(
            req.parts[0].text(),
            Some("Experiment Guide Content:\nDrop the ball.")
        );
    }

    #[test]
    fn missing_guide_sends_empty_block() {
        let req = build_request(&config_with(None, vec![]), &GenerationConfig::default());
        assert_eq!(req.parts[0].text(), Some("Experiment Guide Content:\n"));
    }

    #[test]
    fn request_carries_model_settings() {
        let gen = GenerationConfig::builder()
            .model("gemini-2.5-pro")
            .temperature(0.5)
            .system_instruction("Be brief.")
            .build()
            .unwrap();
        let req = build_request(&config_with(None, vec![]), &gen);
        assert_eq!(req.model, "gemini-2.5-pro");
        assert_eq!(req.temperature, 0.5);
        assert_eq!(req.system_instruction, "Be brief.");

        let req = build_request(&config_with(None, vec![]), &GenerationConfig::default());
        assert_eq!(req.system_instruction, DEFAULT_SYSTEM_INSTRUCTION);
        assert_eq!(req.temperature, 0.2);
    }
}
