//! Configuration for report generation.
//!
//! All generation behaviour is controlled through [`GenerationConfig`], built
//! via its [`GenerationConfigBuilder`]. The wizard's own state
//! ([`crate::report::ReportConfig`]) is kept separate: it describes *what*
//! the user supplied, this struct describes *how* the model is called.

use crate::backend::ReportBackend;
use crate::error::ReportError;
use std::fmt;
use std::sync::Arc;

/// Default model for the native Gemini backend.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Default Gemini REST endpoint (without the `/models/...` suffix).
pub const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Configuration for a generation attempt.
///
/// # Example
/// ```rust
/// use labreport::GenerationConfig;
///
/// let config = GenerationConfig::builder()
///     .model("gemini-2.5-pro")
///     .temperature(0.2)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct GenerationConfig {
    /// Model identifier. Default: `gemini-2.5-flash`.
    pub model: String,

    /// Sampling temperature. Range: 0.0–2.0. Default: 0.2.
    ///
    /// A low value keeps transcribed numbers faithful to the photos.
    pub temperature: f32,

    /// Custom system instruction. If None, uses the built-in default.
    pub system_instruction: Option<String>,

    /// API key for the Gemini backend. If None, read from
    /// `GEMINI_API_KEY`, then `API_KEY`.
    pub api_key: Option<String>,

    /// Gemini REST base URL.
    pub api_base: String,

    /// `edgequake-llm` provider name (e.g. "openai", "anthropic", "ollama").
    /// When set, the provider backend is used instead of native Gemini.
    pub provider_name: Option<String>,

    /// Pre-constructed backend. Takes precedence over everything else.
    pub backend: Option<Arc<dyn ReportBackend>>,

    /// Maximum output tokens, passed to backends that accept a limit.
    pub max_tokens: Option<usize>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.2,
            system_instruction: None,
            api_key: None,
            api_base: DEFAULT_GEMINI_API_BASE.to_string(),
            provider_name: None,
            backend: None,
            max_tokens: None,
        }
    }
}

impl fmt::Debug for GenerationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerationConfig")
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("system_instruction", &self.system_instruction)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("api_base", &self.api_base)
            .field("provider_name", &self.provider_name)
            .field("backend", &self.backend.as_ref().map(|_| "<dyn ReportBackend>"))
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

impl GenerationConfig {
    /// Create a new builder for `GenerationConfig`.
    pub fn builder() -> GenerationConfigBuilder {
        GenerationConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`GenerationConfig`].
#[derive(Debug)]
pub struct GenerationConfigBuilder {
    config: GenerationConfig,
}

impl GenerationConfigBuilder {
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn system_instruction(mut self, s: impl Into<String>) -> Self {
        self.config.system_instruction = Some(s.into());
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    pub fn api_base(mut self, base: impl Into<String>) -> Self {
        self.config.api_base = base.into();
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn backend(mut self, backend: Arc<dyn ReportBackend>) -> Self {
        self.config.backend = Some(backend);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = Some(n);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<GenerationConfig, ReportError> {
        let c = &self.config;
        if c.model.trim().is_empty() {
            return Err(ReportError::InvalidConfig("model must not be empty".into()));
        }
        if !(0.0..=2.0).contains(&c.temperature) {
            return Err(ReportError::InvalidConfig(format!(
                "temperature must be 0.0–2.0, got {}",
                c.temperature
            )));
        }
        if c.max_tokens == Some(0) {
            return Err(ReportError::InvalidConfig("max_tokens must be ≥ 1".into()));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = GenerationConfig::default();
        assert_eq!(c.model, "gemini-2.5-flash");
        assert_eq!(c.temperature, 0.2);
        assert!(c.system_instruction.is_none());
        assert!(c.backend.is_none());
    }

    #[test]
    fn temperature_is_clamped() {
        let c = GenerationConfig::builder().temperature(9.0).build().unwrap();
        assert_eq!(c.temperature, 2.0);
    }

    #[test]
    fn empty_model_rejected() {
        let err = GenerationConfig::builder().model("  ").build().unwrap_err();
        assert!(matches!(err, ReportError::InvalidConfig(_)));
    }

    #[test]
    fn debug_redacts_api_key() {
        let c = GenerationConfig::builder().api_key("secret-123").build().unwrap();
        let dbg = format!("{c:?}");
        assert!(!dbg.contains("secret-123"));
        assert!(dbg.contains("<redacted>"));
    }
}
