use serde::{Deserialize, Serialize};

pub const STANDBY_MESSAGE: &str = "Engine standby";
pub const ANALYZING_MESSAGE: &str = "Director agent evaluating physics...";
pub const GENERATING_MESSAGE: &str = "Initializing world model...";
pub const COMPLETE_MESSAGE: &str = "Simulation finalized";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Idle,
    Analyzing,
    Generating,
    Complete,
    Error,
}

impl Phase {
    /// Idle and the terminal phases are the only ones a new attempt may start from.
    pub fn accepts_new_attempt(&self) -> bool {
        matches!(self, Phase::Idle | Phase::Complete | Phase::Error)
    }

    pub fn is_in_flight(&self) -> bool {
        matches!(self, Phase::Analyzing | Phase::Generating)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationStatus {
    pub phase: Phase,
    pub message: String,
    /// Completed poll count while generating. A UI hint only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<u32>,
}

impl GenerationStatus {
    pub fn new(phase: Phase, message: impl Into<String>) -> Self {
        GenerationStatus {
            phase,
            message: message.into(),
            progress: None,
        }
    }

    pub fn idle() -> Self {
        GenerationStatus::new(Phase::Idle, STANDBY_MESSAGE)
    }
}

impl Default for GenerationStatus {
    fn default() -> Self {
        GenerationStatus::idle()
    }
}
