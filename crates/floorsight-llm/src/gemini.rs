//! Google Gemini `generateContent` adapter

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use floorsight_core::config::DEFAULT_MODEL_URL;
use floorsight_core::error::{FloorsightError, Result};
use floorsight_core::models::Stage;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::ports::{GenerationRequest, MultimodalModel};

/// Gemini API client
pub struct GeminiClient {
    /// Base URL of the models collection
    base_url: String,

    /// Model identifier (e.g. "gemini-2.5-pro")
    model: String,

    api_key: String,

    /// Per-request timeout enforced by the HTTP client
    timeout: Duration,

    /// HTTP client
    client: reqwest::Client,
}

impl GeminiClient {
    /// Create a new Gemini client against the public endpoint
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build().map_err(|e| {
            FloorsightError::ConfigInvalid {
                key: "http_client".to_string(),
                reason: e.to_string(),
            }
        })?;

        Ok(Self {
            base_url: DEFAULT_MODEL_URL.to_string(),
            model: model.into(),
            api_key: api_key.into(),
            timeout,
            client,
        })
    }

    /// Point the client at a different models collection (proxies, test servers)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/{}:generateContent", self.base_url, self.model)
    }

    fn remote_error(stage: Stage, reason: impl Into<String>) -> FloorsightError {
        FloorsightError::RemoteInference {
            stage,
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl MultimodalModel for GeminiClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        let stage = request.stage;
        let body = build_request_body(request);

        tracing::debug!(
            stage = %stage,
            model = %self.model,
            prompt_chars = request.prompt.chars().count(),
            has_image = request.image.is_some(),
            "Sending generateContent request"
        );

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    FloorsightError::RemoteInferenceTimeout {
                        stage,
                        seconds: self.timeout.as_secs(),
                    }
                } else {
                    Self::remote_error(stage, format!("Failed to reach Gemini: {}", e))
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(Self::remote_error(
                stage,
                format!("Gemini API error ({}): {}", status, error_text),
            ));
        }

        let parsed: GeminiResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                FloorsightError::RemoteInferenceTimeout {
                    stage,
                    seconds: self.timeout.as_secs(),
                }
            } else {
                Self::remote_error(stage, format!("Failed to parse Gemini response: {}", e))
            }
        })?;

        extract_text(parsed, stage)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Build the wire body for a generation request
fn build_request_body(request: &GenerationRequest) -> GeminiRequest {
    let mut parts = vec![GeminiPart::Text {
        text: request.prompt.clone(),
    }];

    if let Some(image) = &request.image {
        parts.push(GeminiPart::InlineData {
            inline_data: GeminiBlob {
                mime_type: image.mime_type.clone(),
                data: BASE64.encode(&image.data),
            },
        });
    }

    GeminiRequest {
        contents: vec![GeminiContent {
            role: "user".to_string(),
            parts,
        }],
        generation_config: GeminiGenerationConfig {
            temperature: request.sampling.temperature,
            top_p: request.sampling.top_p,
            top_k: request.sampling.top_k,
            response_mime_type: request.format.mime_type().map(str::to_string),
        },
    }
}

/// Concatenate the text parts of the first candidate
fn extract_text(response: GeminiResponse, stage: Stage) -> Result<String> {
    if let Some(reason) = response.prompt_feedback.and_then(|f| f.block_reason) {
        return Err(GeminiClient::remote_error(stage, format!("Prompt blocked: {}", reason)));
    }

    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| GeminiClient::remote_error(stage, "Response has no candidates"))?;

    let text: String = candidate
        .content
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter(|part| !part.thought)
                .filter_map(|part| part.text)
                .collect()
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        let finish = candidate.finish_reason.unwrap_or_else(|| "unknown".to_string());
        return Err(GeminiClient::remote_error(
            stage,
            format!("Empty response (finish reason: {})", finish),
        ));
    }

    Ok(text)
}

/// Request body for the generateContent API
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    role: String,
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum GeminiPart {
    Text {
        text: String,
    },
    #[serde(rename_all = "camelCase")]
    InlineData {
        inline_data: GeminiBlob,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiBlob {
    mime_type: String,
    /// Base64 payload
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    temperature: f32,
    top_p: f32,
    top_k: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
}

/// Response from the generateContent API
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    prompt_feedback: Option<GeminiPromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiResponseContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponseContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponsePart {
    #[serde(default)]
    text: Option<String>,
    /// Set on reasoning summaries, which are not part of the answer
    #[serde(default)]
    thought: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}
