//! Model backends: send a [`ReportRequest`] and return the generated text.
//!
//! Two implementations ship with the crate:
//!
//! * [`GeminiBackend`] — the native `generateContent` REST call. Every
//!   request part keeps its position, so the guide PDF, each data photo and
//!   the instruction block reach the model in exactly the assembled order.
//! * [`ProviderBackend`] — any `edgequake-llm` provider (OpenAI, Anthropic,
//!   Ollama, …). Chat APIs take one text plus a list of images per message,
//!   so text parts are joined and attachments follow in their original order.
//!
//! A backend makes exactly one call per request. Empty text is returned as-is;
//! [`crate::generate::generate`] decides what counts as a usable result.

use crate::config::GenerationConfig;
use crate::error::ReportError;
use crate::pipeline::request::{ReportRequest, RequestPart};
use edgequake_llm::{ChatMessage, CompletionOptions, ImageData, LLMProvider, ProviderFactory};
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Anything that can turn a report request into model output.
pub trait ReportBackend: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Perform one generation call.
    fn complete<'a>(&'a self, request: &'a ReportRequest) -> BoxFuture<'a, Result<String, ReportError>>;
}

// ── Gemini ───────────────────────────────────────────────────────────────

/// Native Gemini REST backend.
pub struct GeminiBackend {
    client: reqwest::Client,
    api_key: String,
    api_base: String,
}

impl GeminiBackend {
    pub fn new(api_key: impl Into<String>, api_base: impl Into<String>) -> Result<Self, ReportError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| ReportError::ProviderNotConfigured {
                provider: "gemini".to_string(),
                hint: format!("HTTP client could not be created: {e}"),
            })?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.api_base, model)
    }

    async fn call(&self, request: &ReportRequest) -> Result<String, ReportError> {
        let body = GeminiRequest::from(request);
        let url = self.endpoint(&request.model);
        debug!("POST {} ({} parts)", url, request.parts.len());

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(ReportError::generation)?;

        let status = response.status();
        let text = response.text().await.map_err(ReportError::generation)?;
        if !status.is_success() {
            return Err(ReportError::generation(format!("HTTP {status}: {text}")));
        }

        parse_gemini_response(&text)
    }
}

impl ReportBackend for GeminiBackend {
    fn name(&self) -> &str {
        "gemini"
    }

    fn complete<'a>(&'a self, request: &'a ReportRequest) -> BoxFuture<'a, Result<String, ReportError>> {
        Box::pin(self.call(request))
    }
}

/// Gemini `generateContent` request body.
#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<Content>,
    #[serde(rename = "systemInstruction")]
    system_instruction: Content,
    #[serde(rename = "generationConfig")]
    generation_config: WireGenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part {
    Text { text: String },
    InlineData { inline_data: InlineData },
}

#[derive(Debug, Serialize)]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
struct WireGenerationConfig {
    temperature: f32,
}

impl From<&ReportRequest> for GeminiRequest {
    fn from(request: &ReportRequest) -> Self {
        let parts = request
            .parts
            .iter()
            .map(|p| match p {
                RequestPart::Text { text } => Part::Text { text: text.clone() },
                RequestPart::InlineData { mime_type, data } => Part::InlineData {
                    inline_data: InlineData {
                        mime_type: mime_type.clone(),
                        data: data.clone(),
                    },
                },
            })
            .collect();

        GeminiRequest {
            contents: vec![Content {
                role: Some("user"),
                parts,
            }],
            system_instruction: Content {
                role: None,
                parts: vec![Part::Text {
                    text: request.system_instruction.clone(),
                }],
            },
            generation_config: WireGenerationConfig {
                temperature: request.temperature,
            },
        }
    }
}

/// Gemini `generateContent` response body (only the fields we read).
#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<ResponseContent>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

/// Concatenate the text parts of the first candidate.
///
/// A response with no candidates or no text yields an empty string.
fn parse_gemini_response(body: &str) -> Result<String, ReportError> {
    let response: GeminiResponse = serde_json::from_str(body)
        .map_err(|e| ReportError::generation(format!("malformed response: {e}")))?;

    Ok(response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect::<String>()
        })
        .unwrap_or_default())
}

// ── edgequake-llm providers ─────────────────────────────────────────────

/// Adapter over an `edgequake-llm` provider.
pub struct ProviderBackend {
    provider: Arc<dyn LLMProvider>,
    label: String,
    max_tokens: Option<usize>,
}

impl ProviderBackend {
    pub fn new(provider: Arc<dyn LLMProvider>, label: impl Into<String>) -> Self {
        Self {
            provider,
            label: label.into(),
            max_tokens: None,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<usize>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    async fn call(&self, request: &ReportRequest) -> Result<String, ReportError> {
        let messages = provider_messages(request);
        let options = CompletionOptions {
            temperature: Some(request.temperature),
            max_tokens: self.max_tokens,
            ..Default::default()
        };

        let response = self
            .provider
            .chat(&messages, Some(&options))
            .await
            .map_err(ReportError::generation)?;

        debug!(
            "{}: {} input tokens, {} output tokens",
            self.label, response.prompt_tokens, response.completion_tokens
        );
        Ok(response.content)
    }
}

impl ReportBackend for ProviderBackend {
    fn name(&self) -> &str {
        &self.label
    }

    fn complete<'a>(&'a self, request: &'a ReportRequest) -> BoxFuture<'a, Result<String, ReportError>> {
        Box::pin(self.call(request))
    }
}

/// System message plus one user message carrying text and attachments.
fn provider_messages(request: &ReportRequest) -> Vec<ChatMessage> {
    let text = request
        .parts
        .iter()
        .filter_map(RequestPart::text)
        .collect::<Vec<_>>()
        .join("\n\n");

    let images: Vec<ImageData> = request
        .parts
        .iter()
        .filter_map(|p| match p {
            RequestPart::InlineData { mime_type, data } => {
                Some(ImageData::new(data.clone(), mime_type.clone()))
            }
            RequestPart::Text { .. } => None,
        })
        .collect();

    vec![
        ChatMessage::system(request.system_instruction.clone()),
        ChatMessage::user_with_images(text, images),
    ]
}

// ── Resolution ───────────────────────────────────────────────────────────

/// Resolve the backend, from most-specific to least-specific:
///
/// 1. **Pre-built backend** (`config.backend`), used as-is.
/// 2. **Named provider** (`config.provider_name`) via
///    [`ProviderFactory::create_llm_provider`], which reads the provider's
///    own API key variable.
/// 3. **Native Gemini** with `config.api_key`, else `GEMINI_API_KEY`, else
///    `API_KEY`.
pub fn resolve_backend(config: &GenerationConfig) -> Result<Arc<dyn ReportBackend>, ReportError> {
    if let Some(ref backend) = config.backend {
        return Ok(Arc::clone(backend));
    }

    if let Some(ref name) = config.provider_name {
        let provider = ProviderFactory::create_llm_provider(name, &config.model).map_err(|e| {
            ReportError::ProviderNotConfigured {
                provider: name.clone(),
                hint: format!("{e}"),
            }
        })?;
        let backend = ProviderBackend::new(provider, name.clone()).with_max_tokens(config.max_tokens);
        return Ok(Arc::new(backend));
    }

    let api_key = config
        .api_key
        .clone()
        .filter(|k| !k.is_empty())
        .or_else(|| env_key("GEMINI_API_KEY"))
        .or_else(|| env_key("API_KEY"))
        .ok_or_else(|| ReportError::ProviderNotConfigured {
            provider: "gemini".to_string(),
            hint: "No API key found. Set GEMINI_API_KEY (or API_KEY), or pass --provider."
                .to_string(),
        })?;

    Ok(Arc::new(GeminiBackend::new(api_key, config.api_base.clone())?))
}

fn env_key(var: &str) -> Option<String> {
    std::env::var(var).ok().filter(|k| !k.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_request() -> ReportRequest {
        ReportRequest {
            model: "gemini-2.5-flash".into(),
            system_instruction: "sys".into(),
            temperature: 0.2,
            parts: vec![
                RequestPart::InlineData {
                    mime_type: "application/pdf".into(),
                    data: "JVBE".into(),
                },
                RequestPart::InlineData {
                    mime_type: "image/jpeg".into(),
                    data: "/9j/".into(),
                },
                RequestPart::Text {
                    text: "instructions".into(),
                },
            ],
        }
    }

    #[test]
    fn gemini_wire_format_keeps_order() {
        let wire = serde_json::to_value(GeminiRequest::from(&sample_request())).unwrap();
        let parts = wire["contents"][0]["parts"].as_array().unwrap();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0]["inline_data"]["mime_type"], "application/pdf");
        assert_eq!(parts[1]["inline_data"]["data"], "/9j/");
        assert_eq!(parts[2]["text"], "instructions");
        assert_eq!(wire["contents"][0]["role"], "user");
        assert_eq!(wire["systemInstruction"]["parts"][0]["text"], "sys");
        assert!(wire["systemInstruction"].get("role").is_none());
        let t = wire["generationConfig"]["temperature"].as_f64().unwrap();
        assert!((t - 0.2).abs() < 1e-6);
    }

    #[test]
    fn parse_joins_text_parts() {
        let body = r#"{"candidates":[{"content":{"parts":[{"text":"\\documentclass"},{"text":"{article}"}]}}]}"#;
        assert_eq!(parse_gemini_response(body).unwrap(), "\\documentclass{article}");
    }

    #[test]
    fn parse_without_candidates_is_empty() {
        assert_eq!(parse_gemini_response(r#"{}"#).unwrap(), "");
        assert_eq!(
            parse_gemini_response(r#"{"candidates":[{"finishReason":"SAFETY"}]}"#).unwrap(),
            ""
        );
    }

    #[test]
    fn parse_garbage_is_generation_error() {
        assert!(matches!(
            parse_gemini_response("<html>"),
            Err(ReportError::Generation { .. })
        ));
    }

    #[test]
    fn endpoint_trims_trailing_slash() {
        let b = GeminiBackend::new("k", "https://example.test/v1beta/").unwrap();
        assert_eq!(
            b.endpoint("gemini-2.5-flash"),
            "https://example.test/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[test]
    fn provider_messages_split_text_and_attachments() {
        let messages = provider_messages(&sample_request());
        assert_eq!(messages.len(), 2);
    }

    #[test]
    fn prebuilt_backend_wins() {
        struct Fixed;
        impl ReportBackend for Fixed {
            fn name(&self) -> &str {
                "fixed"
            }
            fn complete<'a>(
                &'a self,
                _request: &'a ReportRequest,
            ) -> BoxFuture<'a, Result<String, ReportError>> {
                Box::pin(async { Ok(String::new()) })
            }
        }

        let config = GenerationConfig::builder()
            .backend(Arc::new(Fixed))
            .provider_name("openai")
            .build()
            .unwrap();
        let backend = resolve_backend(&config).unwrap();
        assert_eq!(backend.name(), "fixed");
    }

    #[test]
    fn explicit_api_key_builds_gemini() {
        let config = GenerationConfig::builder().api_key("test-key").build().unwrap();
        let backend = resolve_backend(&config).unwrap();
        assert_eq!(backend.name(), "gemini");
    }
}
