//! Remote image generation.
//!
//! [`ImageGenerator`] is the seam between the workflow and the network: the
//! production [`GeminiClient`] calls Google's `generateContent` endpoint with a
//! fixed model, aspect ratio and resolution tier; tests substitute a stub.
//!
//! One call, no retry. A failed generation is re-run by the user.

use async_trait::async_trait;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use thiserror::Error;

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Longest error body echoed back to the user.
const MAX_ERROR_BODY: usize = 500;

#[derive(Error, Debug)]
pub enum ClientError {
    /// Credential missing or rejected.
    #[error("authentication failed: {0}")]
    Auth(String),
    /// The service answered with a non-success status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },
    /// The service did not answer within the configured timeout.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    /// The prompt or the result was blocked by safety filters.
    #[error("content blocked: {0}")]
    Blocked(String),
    /// The response carried no image.
    #[error("no image in response: {0}")]
    NoImage(String),
    #[error("network error: {0}")]
    Network(reqwest::Error),
    #[error("failed to decode image data: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) if status.as_u16() == 401 || status.as_u16() == 403 => {
                Self::Auth(err.to_string())
            }
            _ => Self::Network(err),
        }
    }
}

/// Raw image bytes returned by a generator.
#[derive(Debug, Clone)]
#[must_use = "generated image should be written to disk"]
pub struct GeneratedImage {
    pub data: Vec<u8>,
    /// MIME type reported by the service (`image/png` when unreported).
    pub mime_type: String,
    /// Model that produced the image.
    pub model: String,
    pub duration: Duration,
}

/// Something that turns a prompt into image bytes.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<GeneratedImage, ClientError>;

    /// Model identifier, for display.
    fn model(&self) -> &str;
}

/// Builder for [`GeminiClient`].
#[derive(Debug, Clone)]
pub struct GeminiClientBuilder {
    api_key: Option<String>,
    model: String,
    aspect_ratio: String,
    image_size: String,
    timeout: Duration,
    base_url: String,
}

impl Default for GeminiClientBuilder {
    fn default() -> Self {
        let generation = crate::config::GenerationConfig::default();
        Self {
            api_key: None,
            model: generation.model.clone(),
            aspect_ratio: generation.aspect_ratio.clone(),
            image_size: generation.image_size.clone(),
            timeout: generation.timeout(),
            base_url: API_BASE.to_string(),
        }
    }
}

impl GeminiClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API key. Required.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Applies model, aspect ratio, size tier and timeout from config.
    pub fn generation_config(mut self, config: &crate::config::GenerationConfig) -> Self {
        self.model = config.model.clone();
        self.aspect_ratio = config.aspect_ratio.clone();
        self.image_size = config.image_size.clone();
        self.timeout = config.timeout();
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Overrides the API root, e.g. for a proxy.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Builds the client. Fails with [`ClientError::Auth`] when no non-empty
    /// API key was supplied.
    pub fn build(self) -> Result<GeminiClient, ClientError> {
        let api_key = self
            .api_key
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| ClientError::Auth("no API key provided".into()))?;

        let http = reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(ClientError::Network)?;

        Ok(GeminiClient {
            http,
            api_key,
            model: self.model,
            aspect_ratio: self.aspect_ratio,
            image_size: self.image_size,
            timeout: self.timeout,
            base_url: self.base_url,
        })
    }
}

/// Gemini image generation client.
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    aspect_ratio: String,
    image_size: String,
    timeout: Duration,
    base_url: String,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("model", &self.model)
            .field("aspect_ratio", &self.aspect_ratio)
            .field("image_size", &self.image_size)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl GeminiClient {
    pub fn builder() -> GeminiClientBuilder {
        GeminiClientBuilder::new()
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    async fn generate_impl(&self, prompt: &str) -> Result<GeneratedImage, ClientError> {
        let start = Instant::now();
        let body = GeminiRequest::new(prompt, &self.aspect_ratio, &self.image_size);

        tracing::info!(
            model = %self.model,
            aspect_ratio = %self.aspect_ratio,
            image_size = %self.image_size,
            "sending generation request"
        );

        let response = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let text = match response.text().await {
                Ok(text) => text,
                Err(e) => {
                    tracing::warn!(status = status.as_u16(), error = %e, "unreadable error body");
                    format!("failed to read response body: {e}")
                }
            };
            return Err(parse_error(status.as_u16(), &text));
        }

        let parsed: GeminiResponse = response
            .json()
            .await
            .map_err(|e| self.map_transport_error(e))?;
        let (data, mime_type) = extract_image(parsed)?;

        let duration = start.elapsed();
        tracing::debug!(
            bytes = data.len(),
            mime_type = %mime_type,
            elapsed_ms = elapsed_ms(duration),
            "generation complete"
        );

        Ok(GeneratedImage {
            data,
            mime_type,
            model: self.model.clone(),
            duration,
        })
    }

    fn map_transport_error(&self, err: reqwest::Error) -> ClientError {
        if err.is_timeout() {
            ClientError::Timeout(self.timeout)
        } else {
            ClientError::from(err)
        }
    }
}

#[async_trait]
impl ImageGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<GeneratedImage, ClientError> {
        self.generate_impl(prompt).await
    }

    fn model(&self) -> &str {
        &self.model
    }
}

/// Whole milliseconds in `duration`, saturating at `u64::MAX`.
pub(crate) fn elapsed_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Map a non-success HTTP response to an error.
fn parse_error(status: u16, body: &str) -> ClientError {
    let message = error_message(body);
    match status {
        401 | 403 => ClientError::Auth(message),
        _ => ClientError::Api { status, message },
    }
}

/// Prefer `error.message` from a JSON error body; fall back to the raw text,
/// truncated.
fn error_message(body: &str) -> String {
    #[derive(Deserialize)]
    struct Envelope {
        error: Detail,
    }
    #[derive(Deserialize)]
    struct Detail {
        message: String,
    }

    if let Ok(envelope) = serde_json::from_str::<Envelope>(body) {
        return envelope.error.message;
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "empty response body".to_string();
    }
    match trimmed.char_indices().nth(MAX_ERROR_BODY) {
        Some((idx, _)) => format!("{}...", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}

/// Pull the first inline image out of a successful response.
fn extract_image(response: GeminiResponse) -> Result<(Vec<u8>, String), ClientError> {
    if let Some(feedback) = response.prompt_feedback {
        if let Some(reason) = feedback.block_reason {
            let msg = feedback
                .block_reason_message
                .unwrap_or_else(|| format!("prompt blocked: {reason}"));
            return Err(ClientError::Blocked(msg));
        }
    }

    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| ClientError::NoImage("no candidates".into()))?;

    if let Some(reason) = candidate.finish_reason.as_deref() {
        match reason {
            "SAFETY" | "IMAGE_SAFETY" | "IMAGE_PROHIBITED_CONTENT" | "PROHIBITED_CONTENT"
            | "RECITATION" | "IMAGE_RECITATION" | "BLOCKLIST" => {
                return Err(ClientError::Blocked(format!(
                    "generation stopped by safety filter: {reason}"
                )));
            }
            "IMAGE_OTHER" | "NO_IMAGE" => {
                return Err(ClientError::NoImage(format!(
                    "generation failed: {reason}"
                )));
            }
            _ => {}
        }
    }

    let inline = candidate
        .content
        .into_iter()
        .flat_map(|c| c.parts)
        .find_map(|p| p.inline_data)
        .ok_or_else(|| ClientError::NoImage("no inline image data".into()))?;

    let data = base64::engine::general_purpose::STANDARD
        .decode(inline.data.trim())
        .map_err(|e| ClientError::Decode(e.to_string()))?;
    if data.is_empty() {
        return Err(ClientError::NoImage("inline image data is empty".into()));
    }
    let mime_type = inline.mime_type.unwrap_or_else(|| "image/png".to_string());
    Ok((data, mime_type))
}

// Request/Response types
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    parts: Vec<GeminiTextPart>,
}

#[derive(Debug, Serialize)]
struct GeminiTextPart {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    response_modalities: Vec<String>,
    image_config: GeminiImageConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiImageConfig {
    aspect_ratio: String,
    image_size: String,
}

impl GeminiRequest {
    fn new(prompt: &str, aspect_ratio: &str, image_size: &str) -> Self {
        Self {
            contents: vec![GeminiContent {
                parts: vec![GeminiTextPart {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GeminiGenerationConfig {
                response_modalities: vec!["IMAGE".to_string()],
                image_config: GeminiImageConfig {
                    aspect_ratio: aspect_ratio.to_string(),
                    image_size: image_size.to_string(),
                },
            },
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiContentResponse>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
    #[serde(default)]
    block_reason_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiContentResponse {
    #[serde(default)]
    parts: Vec<GeminiPartResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPartResponse {
    #[serde(default)]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    #[serde(default)]
    mime_type: Option<String>,
    data: String,
}
