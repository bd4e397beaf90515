// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Gemini API gateway implementation
//!
//! Talks to the Gemini REST API: `generateContent` for text and image
//! requests, `predictLongRunning` plus operation polling for video.
//! Raw backend errors are classified into the [`GatewayError`] taxonomy,
//! keying off the structured error status where present and falling back to
//! substring heuristics for unstructured bodies.

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::io::AsyncWriteExt;

use crate::conversation::{Attachment, GenerationConfig, MediaKind, MediaRef};
use crate::error::GatewayError;
use crate::gateway::{Gateway, GatewayResult};
use crate::media::MediaStore;
use crate::models;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_TIMEOUT_SECS: u64 = 120;
const DEFAULT_POLL_INTERVAL_SECS: u64 = 10;
const DEFAULT_MAX_POLL_ATTEMPTS: u32 = 90;

/// Environment variable the credential is read from at call time
pub const CREDENTIAL_ENV: &str = "GEMINI_API_KEY";

/// Which backend capability a request belongs to.
///
/// Video errors classify differently: a permission failure there means the
/// credential lacks the video entitlement, not that the key is bad.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Capability {
    Text,
    Image,
    Video,
}

/// Gateway backed by the Gemini REST API
pub struct GeminiGateway {
    client: Client,
    base_url: String,
    credential_override: Option<String>,
    media: MediaStore,
    poll_interval: Duration,
    max_poll_attempts: u32,
}

impl GeminiGateway {
    /// Create a gateway writing generated media through `media`.
    pub fn new(media: MediaStore) -> Self {
        Self {
            client: Client::new(),
            base_url: GEMINI_API_BASE.to_string(),
            credential_override: None,
            media,
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            max_poll_attempts: DEFAULT_MAX_POLL_ATTEMPTS,
        }
    }

    /// Point the gateway at a custom API base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Use a fixed credential instead of the environment variable.
    pub fn with_credential(mut self, credential: impl Into<String>) -> Self {
        self.credential_override = Some(credential.into());
        self
    }

    /// Override the video operation poll interval.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Override the video poll budget.
    pub fn with_max_poll_attempts(mut self, attempts: u32) -> Self {
        self.max_poll_attempts = attempts;
        self
    }

    /// Resolve the credential at call time. Absent or empty is a hard
    /// failure for every operation.
    fn credential(&self) -> GatewayResult<String> {
        let key = match &self.credential_override {
            Some(key) => key.clone(),
            None => std::env::var(CREDENTIAL_ENV).unwrap_or_default(),
        };
        if key.is_empty() {
            return Err(GatewayError::CredentialMissing(CREDENTIAL_ENV));
        }
        Ok(key)
    }

    /// POST a `generateContent` request and surface classified errors.
    async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
        key: &str,
        capability: Capability,
    ) -> GatewayResult<GenerateContentResponse> {
        let url = format!("{}/models/{}:generateContent?key={}", self.base_url, model, key);
        tracing::debug!(target: "fahz.gateway", model, "dispatching generateContent");

        let response = self
            .client
            .post(&url)
            .json(request)
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .send()
            .await?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_error(status, &body, capability, model));
        }

        let api_response: GenerateContentResponse = response.json().await?;
        if let Some(error) = &api_response.error {
            return Err(classify_detail(status, error, capability, model));
        }
        Ok(api_response)
    }

    /// Fetch the current state of a long-running operation.
    async fn fetch_operation(&self, name: &str, key: &str) -> GatewayResult<Operation> {
        let url = format!("{}/{}?key={}", self.base_url, name, key);
        let response = self.client.get(&url).send().await?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_error(
                status,
                &body,
                Capability::Video,
                models::VIDEO_MODEL,
            ));
        }

        Ok(response.json().await?)
    }

    /// Download the finished video from its resource locator into the media
    /// store, streaming rather than buffering the whole payload.
    async fn download_video(&self, uri: &str, key: &str) -> GatewayResult<MediaRef> {
        let separator = if uri.contains('?') { '&' } else { '?' };
        let url = format!("{}{}key={}", uri, separator, key);

        let response = self.client.get(&url).send().await?;
        let status = response.status().as_u16();
        if !response.status().is_success() {
            return Err(GatewayError::upstream(status, "failed to download the generated video"));
        }

        let mime_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("video/mp4")
            .to_string();

        let path = self.media.allocate_path(&mime_type);
        let mut file = tokio::fs::File::create(&path)
            .await
            .map_err(|e| GatewayError::Upstream(format!("cannot write video file: {}", e)))?;

        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let bytes = chunk?;
            file.write_all(&bytes)
                .await
                .map_err(|e| GatewayError::Upstream(format!("cannot write video file: {}", e)))?;
        }
        file.flush()
            .await
            .map_err(|e| GatewayError::Upstream(format!("cannot write video file: {}", e)))?;

        Ok(MediaRef {
            kind: MediaKind::Video,
            mime_type,
            path,
        })
    }
}

#[async_trait]
impl Gateway for GeminiGateway {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn complete_text(
        &self,
        prompt: &str,
        config: &GenerationConfig,
        attachments: &[Attachment],
    ) -> GatewayResult<String> {
        let key = self.credential()?;

        let mut parts = vec![Part::Text {
            text: prompt.to_string(),
        }];
        for att in attachments {
            parts.push(Part::Inline {
                inline_data: InlineData {
                    mime_type: att.mime_type.clone(),
                    data: att.data.clone(),
                },
            });
        }

        let request = GenerateContentRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts,
            }],
            system_instruction: Some(SystemInstruction {
                parts: vec![TextPart {
                    text: config.system_prompt.clone(),
                }],
            }),
            generation_config: Some(RequestGenerationConfig {
                temperature: Some(config.temperature),
                top_k: Some(64),
                top_p: Some(0.95),
                image_config: None,
            }),
        };

        let response = self
            .generate_content(&config.model, &request, &key, Capability::Text)
            .await?;

        let text = response.text();
        if text.is_empty() {
            return Err(GatewayError::EmptyResponse);
        }
        Ok(text)
    }

    async fn complete_image(&self, prompt: &str) -> GatewayResult<MediaRef> {
        let key = self.credential()?;

        let request = GenerateContentRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![Part::Text {
                    text: prompt.to_string(),
                }],
            }],
            system_instruction: None,
            generation_config: Some(RequestGenerationConfig {
                temperature: None,
                top_k: None,
                top_p: None,
                image_config: Some(ImageConfig {
                    aspect_ratio: "1:1".to_string(),
                }),
            }),
        };

        let response = self
            .generate_content(models::IMAGE_MODEL, &request, &key, Capability::Image)
            .await?;

        let inline = response
            .inline_data()
            .ok_or(GatewayError::NoImageProduced)?;
        self.media
            .save_base64(MediaKind::Image, &inline.mime_type, &inline.data)
            .map_err(|e| GatewayError::Upstream(e.to_string()))
    }

    async fn complete_video(&self, prompt: &str) -> GatewayResult<MediaRef> {
        let key = self.credential()?;

        let url = format!(
            "{}/models/{}:predictLongRunning?key={}",
            self.base_url,
            models::VIDEO_MODEL,
            key
        );
        let request = PredictLongRunningRequest {
            instances: vec![VideoInstance {
                prompt: prompt.to_string(),
            }],
            parameters: VideoParameters {
                sample_count: 1,
                resolution: "720p".to_string(),
                aspect_ratio: "16:9".to_string(),
            },
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .send()
            .await?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_error(
                status,
                &body,
                Capability::Video,
                models::VIDEO_MODEL,
            ));
        }

        let mut operation: Operation = response.json().await?;
        let mut attempts = 0u32;
        while !operation.done {
            if attempts >= self.max_poll_attempts {
                return Err(GatewayError::Upstream(format!(
                    "video generation still pending after {} status checks; giving up",
                    attempts
                )));
            }
            attempts += 1;
            tracing::debug!(target: "fahz.gateway", attempt = attempts, "video operation pending");
            tokio::time::sleep(self.poll_interval).await;
            operation = self.fetch_operation(&operation.name, &key).await?;
        }

        if let Some(error) = &operation.error {
            return Err(classify_detail(
                error.code.unwrap_or(0),
                &GeminiErrorDetail {
                    code: error.code,
                    message: error.message.clone(),
                    status: error.status.clone(),
                },
                Capability::Video,
                models::VIDEO_MODEL,
            ));
        }

        let uri = operation
            .video_uri()
            .ok_or_else(|| GatewayError::Upstream("no video link in the completed operation".to_string()))?;
        self.download_video(&uri, &key).await
    }
}

/// Classify a raw error body into the gateway taxonomy.
fn classify_error(status: u16, body: &str, capability: Capability, model: &str) -> GatewayError {
    if let Ok(envelope) = serde_json::from_str::<GeminiErrorEnvelope>(body) {
        return classify_detail(status, &envelope.error, capability, model);
    }
    classify_fallback(status, body, capability, model)
}

/// Classification from the structured error detail.
fn classify_detail(
    status: u16,
    detail: &GeminiErrorDetail,
    capability: Capability,
    model: &str,
) -> GatewayError {
    match detail.status.as_deref().unwrap_or("") {
        "UNAUTHENTICATED" => return GatewayError::InvalidCredential,
        "PERMISSION_DENIED" if capability == Capability::Video => {
            return GatewayError::AccessDenied;
        }
        "NOT_FOUND" => return GatewayError::ModelUnavailable(model.to_string()),
        "RESOURCE_EXHAUSTED" => return GatewayError::QuotaExceeded,
        _ => {}
    }
    classify_fallback(
        detail.code.unwrap_or(status),
        &detail.message,
        capability,
        model,
    )
}

/// Substring fallback for bodies without a usable structured status.
fn classify_fallback(status: u16, message: &str, capability: Capability, model: &str) -> GatewayError {
    if status == 401 || message.contains("API key not valid") {
        GatewayError::InvalidCredential
    } else if capability == Capability::Video
        && (status == 403 || message.contains("entity was not found"))
    {
        GatewayError::AccessDenied
    } else if status == 404 || message.contains("is not found") {
        GatewayError::ModelUnavailable(model.to_string())
    } else if status == 429 || message.contains("quota") {
        GatewayError::QuotaExceeded
    } else {
        GatewayError::upstream(status, message)
    }
}

// Gemini API types

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(rename = "systemInstruction", skip_serializing_if = "Option::is_none")]
    system_instruction: Option<SystemInstruction>,
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    generation_config: Option<RequestGenerationConfig>,
}

#[derive(Debug, Serialize)]
struct SystemInstruction {
    parts: Vec<TextPart>,
}

#[derive(Debug, Serialize)]
struct TextPart {
    text: String,
}

#[derive(Debug, Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part {
    Text {
        text: String,
    },
    Inline {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct InlineData {
    #[serde(rename = "mimeType")]
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
struct RequestGenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(rename = "topK", skip_serializing_if = "Option::is_none")]
    top_k: Option<u32>,
    #[serde(rename = "topP", skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(rename = "imageConfig", skip_serializing_if = "Option::is_none")]
    image_config: Option<ImageConfig>,
}

#[derive(Debug, Serialize)]
struct ImageConfig {
    #[serde(rename = "aspectRatio")]
    aspect_ratio: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
    error: Option<GeminiErrorDetail>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate's parts.
    fn text(&self) -> String {
        let mut out = String::new();
        if let Some(candidate) = self.candidates.as_ref().and_then(|c| c.first()) {
            for part in &candidate.content.parts {
                if let Some(text) = &part.text {
                    out.push_str(text);
                }
            }
        }
        out
    }

    /// First inline payload of the first candidate, if any.
    fn inline_data(&self) -> Option<&InlineData> {
        self.candidates
            .as_ref()?
            .first()?
            .content
            .parts
            .iter()
            .find_map(|p| p.inline_data.as_ref())
    }
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: CandidateContent,
}

#[derive(Debug, Default, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
    #[serde(rename = "inlineData")]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Serialize)]
struct PredictLongRunningRequest {
    instances: Vec<VideoInstance>,
    parameters: VideoParameters,
}

#[derive(Debug, Serialize)]
struct VideoInstance {
    prompt: String,
}

#[derive(Debug, Serialize)]
struct VideoParameters {
    #[serde(rename = "sampleCount")]
    sample_count: u32,
    resolution: String,
    #[serde(rename = "aspectRatio")]
    aspect_ratio: String,
}

#[derive(Debug, Deserialize)]
struct Operation {
    name: String,
    #[serde(default)]
    done: bool,
    response: Option<OperationResponse>,
    error: Option<OperationError>,
}

impl Operation {
    /// Resource locator of the first generated video, if present.
    fn video_uri(&self) -> Option<String> {
        self.response
            .as_ref()?
            .generate_video_response
            .as_ref()?
            .generated_samples
            .first()?
            .video
            .as_ref()?
            .uri
            .clone()
    }
}

#[derive(Debug, Deserialize)]
struct OperationResponse {
    #[serde(rename = "generateVideoResponse")]
    generate_video_response: Option<GenerateVideoResponse>,
}

#[derive(Debug, Deserialize)]
struct GenerateVideoResponse {
    #[serde(rename = "generatedSamples", default)]
    generated_samples: Vec<GeneratedSample>,
}

#[derive(Debug, Deserialize)]
struct GeneratedSample {
    video: Option<VideoHandle>,
}

#[derive(Debug, Deserialize)]
struct VideoHandle {
    uri: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorEnvelope {
    error: GeminiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorDetail {
    code: Option<u16>,
    #[serde(default)]
    message: String,
    status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OperationError {
    code: Option<u16>,
    #[serde(default)]
    message: String,
    status: Option<String>,
}
