use async_trait::async_trait;
use engine::{DirectorBreakdown, GenerationConfig};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

use crate::credential::Credential;
use crate::error::{RemoteResult, RemoteServiceError};

/// One field of the manifest the director must return. `allowed` is empty for free text.
#[derive(Debug, Clone, Copy)]
pub struct ManifestField {
    pub name: &'static str,
    pub allowed: &'static [&'static str],
}

pub const MANIFEST_FIELDS: [ManifestField; 5] = [
    ManifestField {
        name: "physicsEngine",
        allowed: &["Active", "Standby"],
    },
    ManifestField {
        name: "audioSync",
        allowed: &["Locked", "Unsynced"],
    },
    ManifestField {
        name: "sceneDescription",
        allowed: &[],
    },
    ManifestField {
        name: "audioPrompt",
        allowed: &[],
    },
    ManifestField {
        name: "directorMemory",
        allowed: &[],
    },
];

#[derive(Debug, Clone, PartialEq)]
pub struct ReasoningRequest {
    pub prompt: String,
    pub temperature: f32,
}

/// A backend that can answer a prompt with a JSON object shaped by [`MANIFEST_FIELDS`].
#[async_trait]
pub trait ReasoningService: Send + Sync {
    /// Returns the raw JSON text of the structured answer.
    async fn generate_manifest(
        &self,
        credential: &Credential,
        request: &ReasoningRequest,
    ) -> RemoteResult<String>;
}

/// Reasoning adapter: turns user intent plus config into a validated breakdown.
#[derive(Clone)]
pub struct Director {
    service: Arc<dyn ReasoningService>,
}

impl Director {
    pub fn new(service: Arc<dyn ReasoningService>) -> Self {
        Director { service }
    }

    pub async fn reason(
        &self,
        credential: &Credential,
        prompt: &str,
        config: &GenerationConfig,
    ) -> RemoteResult<DirectorBreakdown> {
        let request = ReasoningRequest {
            prompt: build_prompt(prompt, config),
            temperature: config.creativity.get() as f32,
        };
        info!("[Director] Requesting breakdown ({} chars of intent)", prompt.len());
        let raw = self.service.generate_manifest(credential, &request).await?;
        debug!("[Director] Raw manifest: {}", raw);
        parse_breakdown(&raw)
    }
}

pub fn build_prompt(prompt: &str, config: &GenerationConfig) -> String {
    // quoted as a JSON string so user text cannot break out of the request line
    let quoted = serde_json::to_string(prompt).unwrap_or_else(|_| format!("\"{}\"", prompt));
    format!(
        "You are the core director of a generative video studio. Parse this user request: {quoted}.\n\
         Output the breakdown in JSON format.\n\
         Config: Resolution={res}, Aspect={aspect}, FPS={fps}, MotionBucket={motion}/10, Creativity={creativity:.2}.\n\
         Follow the manifest response protocol:\n\
         1. physicsEngine: \"Active\" or \"Standby\"\n\
         2. audioSync: \"Locked\" or \"Unsynced\"\n\
         3. sceneDescription: a detailed shot description for a video model\n\
         4. audioPrompt: soundtrack and effects to accompany the shot\n\
         5. directorMemory: a short continuity note for later shots",
        quoted = quoted,
        res = config.resolution.as_str(),
        aspect = config.aspect_ratio.as_str(),
        fps = config.frame_rate.as_u32(),
        motion = config.motion_intensity.get(),
        creativity = config.creativity.get(),
    )
}

fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    match trimmed.strip_prefix("```") {
        Some(rest) => {
            let rest = rest.strip_prefix("json").unwrap_or(rest);
            rest.strip_suffix("```").unwrap_or(rest).trim()
        }
        None => trimmed,
    }
}

/// Validates all five manifest fields. Any missing field fails the whole breakdown.
pub fn parse_breakdown(raw: &str) -> RemoteResult<DirectorBreakdown> {
    let value: Value = serde_json::from_str(strip_code_fence(raw))
        .map_err(|e| RemoteServiceError::invalid_response(format!("manifest is not JSON: {}", e)))?;
    let object = value
        .as_object()
        .ok_or_else(|| RemoteServiceError::invalid_response("manifest is not a JSON object"))?;

    let missing: Vec<&str> = MANIFEST_FIELDS
        .iter()
        .map(|f| f.name)
        .filter(|name| !object.get(*name).map_or(false, Value::is_string))
        .collect();
    if !missing.is_empty() {
        return Err(RemoteServiceError::invalid_response(format!(
            "manifest missing required fields: {}",
            missing.join(", ")
        )));
    }

    let text = |name: &str| -> String {
        object
            .get(name)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };

    let scene_description = text("sceneDescription");
    if scene_description.trim().is_empty() {
        return Err(RemoteServiceError::invalid_response(
            "manifest sceneDescription is blank",
        ));
    }

    Ok(DirectorBreakdown {
        physics_engine_state: text("physicsEngine")
            .parse()
            .map_err(|e| RemoteServiceError::invalid_response(format!("{}", e)))?,
        audio_sync_state: text("audioSync")
            .parse()
            .map_err(|e| RemoteServiceError::invalid_response(format!("{}", e)))?,
        director_memory: text("directorMemory"),
        scene_description,
        audio_prompt: text("audioPrompt"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use engine::{AudioSyncState, PhysicsEngineState};

    fn manifest() -> Value {
        serde_json::json!({
            "physicsEngine": "Active",
            "audioSync": "Locked",
            "sceneDescription": "Slow dolly toward a lighthouse as dusk falls",
            "audioPrompt": "Waves, distant gulls",
            "directorMemory": "Warm amber palette"
        })
    }

    #[test]
    fn test_parse_complete_manifest() {
        let breakdown = parse_breakdown(&manifest().to_string()).unwrap();
        assert_eq!(breakdown.physics_engine_state, PhysicsEngineState::Active);
        assert_eq!(breakdown.audio_sync_state, AudioSyncState::Locked);
        assert_eq!(breakdown.audio_prompt, "Waves, distant gulls");
        assert_eq!(breakdown.director_memory, "Warm amber palette");
    }

    #[test]
    fn test_missing_field_is_invalid_response() {
        let mut json = manifest();
        json.as_object_mut().unwrap().remove("audioPrompt");
        let err = parse_breakdown(&json.to_string()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidResponse);
        assert!(err.message.contains("audioPrompt"));
    }

    #[test]
    fn test_non_string_field_counts_as_missing() {
        let mut json = manifest();
        json["directorMemory"] = serde_json::json!(null);
        let err = parse_breakdown(&json.to_string()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidResponse);
    }

    #[test]
    fn test_garbage_is_invalid_response() {
        for raw in ["", "not json", "[1, 2]", "{\"physicsEngine\": \"Warp\"}"] {
            let err = parse_breakdown(raw).unwrap_err();
            assert_eq!(err.kind, ErrorKind::InvalidResponse, "{}", raw);
        }
    }

    #[test]
    fn test_unknown_enum_value_is_invalid_response() {
        let mut json = manifest();
        json["audioSync"] = serde_json::json!("Drifting");
        let err = parse_breakdown(&json.to_string()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidResponse);
    }

    #[test]
    fn test_fenced_manifest_is_accepted() {
        let raw = format!("```json\n{}\n```", manifest());
        assert!(parse_breakdown(&raw).is_ok());
    }

    #[test]
    fn test_prompt_carries_config_and_quotes_intent() {
        let config: GenerationConfig = serde_json::from_value(serde_json::json!({
            "resolution": "1080p",
            "aspectRatio": "9:16",
            "fps": 60,
            "motionBucket": 8,
            "creativity": 0.25
        }))
        .unwrap();
        let prompt = build_prompt("a \"quoted\" lighthouse", &config);
        assert!(prompt.contains("Resolution=1080p"));
        assert!(prompt.contains("Aspect=9:16"));
        assert!(prompt.contains("FPS=60"));
        assert!(prompt.contains("MotionBucket=8/10"));
        assert!(prompt.contains("Creativity=0.25"));
        assert!(prompt.contains(r#""a \"quoted\" lighthouse""#));
    }
}
