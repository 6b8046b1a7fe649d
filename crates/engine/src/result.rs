use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::breakdown::{DirectorBreakdown, DirectorState};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResult {
    pub id: Uuid,
    pub status: DirectorState,
    pub visual_output: String,
    pub audio_output: String,
    #[serde(default)]
    pub media_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl GenerationResult {
    /// Provisional result shown while the video renders. No media yet.
    pub fn provisional(breakdown: &DirectorBreakdown) -> Self {
        GenerationResult {
            id: Uuid::new_v4(),
            status: breakdown.state(),
            visual_output: breakdown.scene_description.clone(),
            audio_output: breakdown.audio_prompt.clone(),
            media_url: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_media(self, media_url: impl Into<String>) -> Self {
        GenerationResult {
            media_url: Some(media_url.into()),
            ..self
        }
    }

    pub fn without_media(self) -> Self {
        GenerationResult {
            media_url: None,
            ..self
        }
    }
}
