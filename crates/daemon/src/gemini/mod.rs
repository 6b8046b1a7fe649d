use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use bytes::Bytes;
use engine::SeedImage;
use reqwest::{Response, StatusCode};
use std::time::Duration;
use tracing::{debug, warn};

use crate::credential::Credential;
use crate::error::{RemoteResult, RemoteServiceError};
use crate::reasoning::{ReasoningRequest, ReasoningService};
use crate::settings::Settings;
use crate::video::{JobHandle, VideoJobService, VideoRequest};

pub mod wire;

use wire::{
    Content, ErrorEnvelope, GenerateContentRequest, GenerateContentResponse, GenerationConfig,
    InlineImage, Operation, Part, PredictRequest, VideoInstance, VideoParameters,
};

const API_KEY_HEADER: &str = "x-goog-api-key";
/// Upper bound for any single request, the video download included.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// Gemini REST client for both the reasoning model and the video model.
///
/// Holds no credential: every call receives the currently selected one.
#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    api_base: String,
    reasoning_model: String,
    video_model: String,
}

impl GeminiClient {
    pub fn new(settings: &Settings) -> RemoteResult<Self> {
        GeminiClient::with_models(
            &settings.api_base,
            &settings.reasoning_model,
            &settings.video_model,
        )
    }

    pub fn with_models(
        api_base: &str,
        reasoning_model: &str,
        video_model: &str,
    ) -> RemoteResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(GeminiClient {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
            reasoning_model: reasoning_model.to_string(),
            video_model: video_model.to_string(),
        })
    }

    async fn predict_long_running(
        &self,
        credential: &Credential,
        request: &PredictRequest,
    ) -> RemoteResult<JobHandle> {
        let response = self
            .http
            .post(format!(
                "{}/models/{}:predictLongRunning",
                self.api_base, self.video_model
            ))
            .header(API_KEY_HEADER, credential.expose())
            .json(request)
            .send()
            .await?;
        let operation: Operation = ensure_success(response).await?.json().await?;
        to_handle(operation)
    }
}

fn video_parameters(request: &VideoRequest) -> VideoParameters {
    VideoParameters {
        aspect_ratio: request.aspect_ratio.as_str(),
        resolution: request.resolution.as_str(),
        sample_count: 1,
    }
}

/// Maps a non-success response onto the error taxonomy. 404, or an error body whose
/// status is NOT_FOUND, means the credential or the resource is gone.
pub fn classify_failure(status: StatusCode, body: &str) -> RemoteServiceError {
    let envelope = serde_json::from_str::<ErrorEnvelope>(body).ok();
    let detail = match &envelope {
        Some(envelope) if !envelope.error.message.is_empty() => envelope.error.message.clone(),
        _ => body.chars().take(300).collect(),
    };
    let message = format!("HTTP {}: {}", status.as_u16(), detail);

    let not_found = status == StatusCode::NOT_FOUND
        || envelope.as_ref().map_or(false, |e| e.error.is_not_found());
    if not_found {
        RemoteServiceError::not_found(message)
    } else {
        RemoteServiceError::upstream(message)
    }
}

async fn ensure_success(response: Response) -> RemoteResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    warn!("[Gemini] Request failed with {}", status);
    Err(classify_failure(status, &body))
}

fn to_handle(operation: Operation) -> RemoteResult<JobHandle> {
    if let Some(error) = &operation.error {
        if error.is_not_found() {
            return Err(RemoteServiceError::not_found(error.message.clone()));
        }
    }
    let media_uri = operation.media_uri();
    let failure = operation.error.map(|e| {
        if e.message.is_empty() {
            format!("operation failed with code {}", e.code)
        } else {
            e.message
        }
    });
    Ok(JobHandle {
        name: operation.name,
        // an error always terminates the operation
        done: operation.done || failure.is_some(),
        media_uri,
        failure,
    })
}

#[async_trait]
impl ReasoningService for GeminiClient {
    async fn generate_manifest(
        &self,
        credential: &Credential,
        request: &ReasoningRequest,
    ) -> RemoteResult<String> {
        let body = GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: Some(request.prompt.clone()),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: request.temperature,
                response_mime_type: "application/json",
                response_schema: wire::manifest_schema(),
            },
        };

        let response = self
            .http
            .post(format!(
                "{}/models/{}:generateContent",
                self.api_base, self.reasoning_model
            ))
            .header(API_KEY_HEADER, credential.expose())
            .json(&body)
            .send()
            .await?;
        let parsed: GenerateContentResponse = ensure_success(response).await?.json().await?;
        parsed
            .text()
            .ok_or_else(|| RemoteServiceError::invalid_response("reasoning response had no text"))
    }
}

#[async_trait]
impl VideoJobService for GeminiClient {
    async fn submit_text_to_video(
        &self,
        credential: &Credential,
        request: &VideoRequest,
    ) -> RemoteResult<JobHandle> {
        let body = PredictRequest {
            instances: vec![VideoInstance {
                prompt: request.prompt.clone(),
                image: None,
            }],
            parameters: video_parameters(request),
        };
        self.predict_long_running(credential, &body).await
    }

    async fn submit_image_to_video(
        &self,
        credential: &Credential,
        image: &SeedImage,
        request: &VideoRequest,
    ) -> RemoteResult<JobHandle> {
        let body = PredictRequest {
            instances: vec![VideoInstance {
                prompt: request.prompt.clone(),
                image: Some(InlineImage {
                    bytes_base64_encoded: STANDARD.encode(image.bytes()),
                    mime_type: image.mime_type().to_string(),
                }),
            }],
            parameters: video_parameters(request),
        };
        self.predict_long_running(credential, &body).await
    }

    async fn poll_job(&self, credential: &Credential, handle: &JobHandle) -> RemoteResult<JobHandle> {
        let response = self
            .http
            .get(format!("{}/{}", self.api_base, handle.name))
            .header(API_KEY_HEADER, credential.expose())
            .send()
            .await?;
        let operation: Operation = ensure_success(response).await?.json().await?;
        debug!("[Gemini] Operation {} done={}", operation.name, operation.done);
        to_handle(operation)
    }

    async fn download_media(&self, credential: &Credential, media_uri: &str) -> RemoteResult<Bytes> {
        // download links are credential-qualified through the query string
        let response = self
            .http
            .get(media_uri)
            .query(&[("key", credential.expose())])
            .send()
            .await?;
        Ok(ensure_success(response).await?.bytes().await?)
    }
}
