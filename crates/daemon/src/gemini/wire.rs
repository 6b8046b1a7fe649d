//! Request and response bodies of the Gemini REST API, limited to the fields used here.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::reasoning::MANIFEST_FIELDS;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    pub generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f32,
    pub response_mime_type: &'static str,
    pub response_schema: Value,
}

#[derive(Debug, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    pub content: Option<Content>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate, if it has any.
    pub fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        (!text.is_empty()).then_some(text)
    }
}

/// JSON schema that forces the five-field manifest.
pub fn manifest_schema() -> Value {
    let mut properties = Map::new();
    for field in MANIFEST_FIELDS.iter() {
        let schema = if field.allowed.is_empty() {
            json!({ "type": "STRING" })
        } else {
            json!({ "type": "STRING", "format": "enum", "enum": field.allowed })
        };
        properties.insert(field.name.to_string(), schema);
    }
    let required: Vec<&str> = MANIFEST_FIELDS.iter().map(|f| f.name).collect();
    json!({
        "type": "OBJECT",
        "properties": properties,
        "required": required,
    })
}

#[derive(Debug, Serialize)]
pub struct PredictRequest {
    pub instances: Vec<VideoInstance>,
    pub parameters: VideoParameters,
}

#[derive(Debug, Serialize)]
pub struct VideoInstance {
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<InlineImage>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineImage {
    pub bytes_base64_encoded: String,
    pub mime_type: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoParameters {
    pub aspect_ratio: &'static str,
    pub resolution: &'static str,
    pub sample_count: u32,
}

#[derive(Debug, Deserialize)]
pub struct Operation {
    pub name: String,
    #[serde(default)]
    pub done: bool,
    pub response: Option<OperationResponse>,
    pub error: Option<Status>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationResponse {
    pub generate_video_response: Option<GenerateVideoResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateVideoResponse {
    #[serde(default)]
    pub generated_samples: Vec<GeneratedSample>,
}

#[derive(Debug, Deserialize)]
pub struct GeneratedSample {
    pub video: Option<VideoFile>,
}

#[derive(Debug, Deserialize)]
pub struct VideoFile {
    pub uri: Option<String>,
}

impl Operation {
    pub fn media_uri(&self) -> Option<String> {
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

/// google.rpc.Status, used both in error bodies and in failed operations.
#[derive(Debug, Deserialize)]
pub struct Status {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: Option<String>,
}

/// gRPC NOT_FOUND, as reported inside operations.
pub const RPC_NOT_FOUND: i64 = 5;

impl Status {
    pub fn is_not_found(&self) -> bool {
        self.code == 404
            || self.code == RPC_NOT_FOUND
            || self.status.as_deref() == Some("NOT_FOUND")
    }
}

#[derive(Debug, Deserialize)]
pub struct ErrorEnvelope {
    pub error: Status,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_schema_requires_every_field() {
        let schema = manifest_schema();
        let required = schema["required"].as_array().unwrap();
        assert_eq!(required.len(), 5);
        assert_eq!(schema["properties"]["physicsEngine"]["enum"][1], "Standby");
        assert_eq!(schema["properties"]["sceneDescription"]["type"], "STRING");
    }

    #[test]
    fn test_operation_media_uri() {
        let op: Operation = serde_json::from_value(json!({
            "name": "models/veo/operations/abc",
            "done": true,
            "response": {
                "generateVideoResponse": {
                    "generatedSamples": [{ "video": { "uri": "https://files/abc:download?alt=media" } }]
                }
            }
        }))
        .unwrap();
        assert_eq!(
            op.media_uri().as_deref(),
            Some("https://files/abc:download?alt=media")
        );

        let pending: Operation =
            serde_json::from_value(json!({ "name": "models/veo/operations/abc" })).unwrap();
        assert!(!pending.done);
        assert!(pending.media_uri().is_none());
    }

    #[test]
    fn test_candidate_text_concatenates_parts() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{ "content": { "parts": [{ "text": "{\"a\":" }, { "text": "1}" }] } }]
        }))
        .unwrap();
        assert_eq!(response.text().as_deref(), Some("{\"a\":1}"));

        let empty: GenerateContentResponse = serde_json::from_value(json!({})).unwrap();
        assert!(empty.text().is_none());
    }
}
