//! Gemini `generateContent` client.

use crate::client::ModelClient;
use crate::config::AnalyzerConfig;
use crate::error::ClientError;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use deck_core::PromptPart;
use image::{DynamicImage, ImageFormat};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::io::Cursor;
use std::time::Duration;

const API_KEY_HEADER: &str = "x-goog-api-key";
const IMAGE_MIME_TYPE: &str = "image/png";

/// Gemini API request body.
#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    system_instruction: Content,
    contents: Vec<Content>,
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
    mime_type: &'static str,
    data: String,
}

/// Gemini API response body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<ResponseContent>,
    finish_reason: Option<String>,
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

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Blocking client for the Generative Language API.
pub struct GeminiClient {
    http: Client,
    api_key: String,
    model: String,
    api_base: String,
}

impl GeminiClient {
    /// Create a client for `model` at the given API base URL.
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        api_base: impl Into<String>,
    ) -> Result<Self, ClientError> {
        // The call blocks until the service answers; no client-side deadline.
        let http = Client::builder().timeout(None::<Duration>).build()?;

        Ok(Self {
            http,
            api_key: api_key.into(),
            model: model.into(),
            api_base: api_base.into(),
        })
    }

    /// Create a client from configuration and an already resolved credential.
    pub fn from_config(config: &AnalyzerConfig, api_key: &str) -> Result<Self, ClientError> {
        Self::new(api_key, &config.model, &config.api_base)
    }

    /// The model this client talks to.
    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.api_base.trim_end_matches('/'),
            self.model
        )
    }
}

impl ModelClient for GeminiClient {
    fn service_name(&self) -> &str {
        "Gemini"
    }

    fn generate(
        &self,
        system_instruction: &str,
        parts: &[PromptPart],
    ) -> Result<String, ClientError> {
        let request = build_request(system_instruction, parts);
        log::debug!(
            "Sending {} parts to {} ({} images)",
            parts.len(),
            self.model,
            parts.iter().filter(|p| matches!(p, PromptPart::Image(_))).count()
        );

        let response = self
            .http
            .post(self.endpoint())
            .header(API_KEY_HEADER, &self.api_key)
            .json(&request)
            .send()?;

        let status = response.status();
        let body = response.text()?;
        log::debug!("Gemini responded with {} ({} bytes)", status, body.len());

        if !status.is_success() {
            return Err(ClientError::Status {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        response_text(&body)
    }
}

fn build_request(system_instruction: &str, parts: &[PromptPart]) -> GenerateContentRequest {
    let parts = parts
        .iter()
        .filter_map(|part| match part {
            PromptPart::Text(text) => Some(Part::Text { text: text.clone() }),
            PromptPart::Image(image) => match encode_png(image) {
                Ok(data) => Some(Part::InlineData {
                    inline_data: InlineData {
                        mime_type: IMAGE_MIME_TYPE,
                        data,
                    },
                }),
                Err(e) => {
                    log::warn!("Skipping an image that could not be encoded: {}", e);
                    None
                }
            },
        })
        .collect();

    GenerateContentRequest {
        system_instruction: Content {
            role: None,
            parts: vec![Part::Text {
                text: system_instruction.to_string(),
            }],
        },
        contents: vec![Content {
            role: Some("user"),
            parts,
        }],
    }
}

/// Re-encode a decoded image as base64 PNG.
///
/// PNG has no float sample types, so float images are narrowed to 8 bits.
fn encode_png(image: &DynamicImage) -> Result<String, image::ImageError> {
    let image = match image {
        DynamicImage::ImageRgb32F(_) => Cow::Owned(DynamicImage::ImageRgb8(image.to_rgb8())),
        DynamicImage::ImageRgba32F(_) => Cow::Owned(DynamicImage::ImageRgba8(image.to_rgba8())),
        other => Cow::Borrowed(other),
    };

    let mut bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(STANDARD.encode(bytes))
}

/// Concatenate the text of the first candidate.
fn response_text(body: &str) -> Result<String, ClientError> {
    let response: GenerateContentResponse =
        serde_json::from_str(body).map_err(|e| ClientError::Decode(e.to_string()))?;

    let Some(candidate) = response.candidates.into_iter().next() else {
        let reason = response
            .prompt_feedback
            .and_then(|f| f.block_reason)
            .map(|r| format!("prompt blocked: {}", r))
            .unwrap_or_else(|| "no candidates returned".to_string());
        return Err(ClientError::EmptyResponse(reason));
    };

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.is_empty() {
        let reason = candidate
            .finish_reason
            .map(|r| format!("finish reason: {}", r))
            .unwrap_or_else(|| "empty candidate".to_string());
        return Err(ClientError::EmptyResponse(reason));
    }

    Ok(text)
}

/// Pull the service's message out of an error body, falling back to the raw body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(body)
        .map(|envelope| envelope.error.message)
        .unwrap_or_else(|_| body.trim().to_string())
}
