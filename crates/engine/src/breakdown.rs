use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PhysicsEngineState {
    Active,
    Standby,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AudioSyncState {
    Locked,
    Unsynced,
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("unrecognised {field} value: {value:?}")]
pub struct UnknownVariant {
    pub field: &'static str,
    pub value: String,
}

// The director sometimes elaborates ("Active - rigid bodies enabled"), so only the
// leading word is significant.
fn leading_word(value: &str) -> String {
    value
        .trim()
        .split(|c: char| !c.is_alphanumeric())
        .find(|w| !w.is_empty())
        .unwrap_or("")
        .to_ascii_lowercase()
}

impl FromStr for PhysicsEngineState {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match leading_word(s).as_str() {
            "active" => Ok(PhysicsEngineState::Active),
            "standby" => Ok(PhysicsEngineState::Standby),
            _ => Err(UnknownVariant {
                field: "physicsEngine",
                value: s.to_string(),
            }),
        }
    }
}

impl FromStr for AudioSyncState {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match leading_word(s).as_str() {
            "locked" => Ok(AudioSyncState::Locked),
            "unsynced" => Ok(AudioSyncState::Unsynced),
            _ => Err(UnknownVariant {
                field: "audioSync",
                value: s.to_string(),
            }),
        }
    }
}

/// What the status panel shows: the narrative state of the last breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectorState {
    pub physics_engine: PhysicsEngineState,
    pub audio_sync: AudioSyncState,
    pub director_memory: String,
}

impl Default for DirectorState {
    fn default() -> Self {
        DirectorState {
            physics_engine: PhysicsEngineState::Standby,
            audio_sync: AudioSyncState::Unsynced,
            director_memory: String::new(),
        }
    }
}

/// Structured interpretation of the user's intent, produced once per attempt.
/// `scene_description` is the prompt actually sent to the video model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectorBreakdown {
    pub physics_engine_state: PhysicsEngineState,
    pub audio_sync_state: AudioSyncState,
    pub director_memory: String,
    pub scene_description: String,
    pub audio_prompt: String,
}

impl DirectorBreakdown {
    pub fn state(&self) -> DirectorState {
        DirectorState {
            physics_engine: self.physics_engine_state,
            audio_sync: self.audio_sync_state,
            director_memory: self.director_memory.clone(),
        }
    }
}
