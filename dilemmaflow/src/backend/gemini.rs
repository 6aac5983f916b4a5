//! Gemini `generateContent` backend.

use super::GenerationBackend;
use crate::config::GeminiConfig;
use crate::errors::GenerationError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationSettings,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct GenerationSettings {
    temperature: f32,
}

#[derive(Debug, Default, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

impl GenerateResponse {
    /// Text of the first candidate, parts joined in order.
    fn into_text(self) -> Option<String> {
        let content = self.candidates.into_iter().next()?.content?;
        let text: String = content.parts.into_iter().filter_map(|part| part.text).collect();
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

/// Generation backend for Google's Gemini models.
#[derive(Debug, Clone)]
pub struct GeminiBackend {
    client: reqwest::Client,
    config: GeminiConfig,
}

impl GeminiBackend {
    /// Creates a backend from settings.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::Request`] if the HTTP client cannot be built.
    pub fn new(config: GeminiConfig) -> Result<Self, GenerationError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| GenerationError::Request(format!("HTTP client error: {e}")))?;
        Ok(Self { client, config })
    }

    /// The configured model name.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.config.model
    }
}

#[async_trait]
impl GenerationBackend for GeminiBackend {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![RequestPart { text: prompt }],
            }],
            generation_config: GenerationSettings {
                temperature: self.config.temperature,
            },
        };

        debug!(model = %self.config.model, prompt_chars = prompt.len(), "sending generateContent request");

        let response = self
            .client
            .post(self.config.generate_url())
            .header("x-goog-api-key", &self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| GenerationError::Request(format!("HTTP error: {e}")))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            warn!(status, "generateContent request rejected");
            return Err(GenerationError::Status { status, body });
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::Decode(format!("JSON parse error: {e}")))?;

        parsed.into_text().ok_or(GenerationError::EmptyResponse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &str) -> GenerateResponse {
        serde_json::from_str(raw).unwrap()
    }

    #[test]
    fn test_response_text_joins_parts() {
        let response = parse(
            r#"{"candidates": [{"content": {"parts": [{"text": "Hello, "}, {"text": "world"}], "role": "model"}}]}"#,
        );
        assert_eq!(response.into_text().as_deref(), Some("Hello, world"));
    }

    #[test]
    fn test_response_without_text() {
        assert!(parse(r#"{}"#).into_text().is_none());
        assert!(parse(r#"{"candidates": [{"finishReason": "SAFETY"}]}"#).into_text().is_none());
        assert!(parse(r#"{"candidates": [{"content": {"parts": [{"text": "  "}]}}]}"#)
            .into_text()
            .is_none());
    }

    #[test]
    fn test_request_shape() {
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![RequestPart { text: "hi" }],
            }],
            generation_config: GenerationSettings { temperature: 0.5 },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["contents"][0]["parts"][0]["text"], "hi");
        assert_eq!(json["generationConfig"]["temperature"], 0.5);
    }

    #[test]
    fn test_backend_construction() {
        let backend = GeminiBackend::new(GeminiConfig::new("k").with_model("gemini-1.5-flash")).unwrap();
        assert_eq!(backend.model(), "gemini-1.5-flash");
    }
}
