use serde::Serialize;
use thiserror::Error;

use crate::breakdown::{DirectorBreakdown, DirectorState};
use crate::config::GenerationConfig;
use crate::credential::CredentialState;
use crate::history::History;
use crate::result::GenerationResult;
use crate::status::{
    GenerationStatus, Phase, ANALYZING_MESSAGE, COMPLETE_MESSAGE, GENERATING_MESSAGE,
};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransitionError {
    #[error("an attempt is already in flight ({0:?})")]
    Busy(Phase),
    #[error("expected phase {expected:?}, found {actual:?}")]
    WrongPhase { expected: Phase, actual: Phase },
    #[error("no provisional result to finalize")]
    MissingOutput,
}

/// The single authoritative UI state. Only the transition methods below mutate it.
#[derive(Debug, Clone, Default)]
pub struct ControlState {
    status: GenerationStatus,
    director: DirectorState,
    output: Option<GenerationResult>,
    history: History,
    config: Option<GenerationConfig>,
}

/// Read-only view handed to observers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlSnapshot {
    pub status: GenerationStatus,
    pub director: DirectorState,
    pub output: Option<GenerationResult>,
    pub history: History,
    pub credential: CredentialState,
    pub config: Option<GenerationConfig>,
}

impl ControlState {
    pub fn new() -> Self {
        ControlState::default()
    }

    pub fn status(&self) -> &GenerationStatus {
        &self.status
    }

    pub fn phase(&self) -> Phase {
        self.status.phase
    }

    pub fn director(&self) -> &DirectorState {
        &self.director
    }

    pub fn output(&self) -> Option<&GenerationResult> {
        self.output.as_ref()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn snapshot(&self, credential: CredentialState) -> ControlSnapshot {
        ControlSnapshot {
            status: self.status.clone(),
            director: self.director.clone(),
            output: self.output.clone(),
            history: self.history.clone(),
            credential,
            config: self.config,
        }
    }

    /// Idle/Complete/Error -> Analyzing. The previous output keeps its text but loses
    /// its media so a stale video does not play during re-analysis.
    pub fn begin_attempt(&mut self, config: GenerationConfig) -> Result<(), TransitionError> {
        if !self.status.phase.accepts_new_attempt() {
            return Err(TransitionError::Busy(self.status.phase));
        }
        self.output = self.output.take().map(GenerationResult::without_media);
        self.config = Some(config);
        self.status = GenerationStatus::new(Phase::Analyzing, ANALYZING_MESSAGE);
        Ok(())
    }

    /// Analyzing -> Generating, adopting the breakdown as panel state and provisional output.
    pub fn enter_generation(&mut self, breakdown: &DirectorBreakdown) -> Result<(), TransitionError> {
        self.require_phase(Phase::Analyzing)?;
        self.director = breakdown.state();
        self.output = Some(GenerationResult::provisional(breakdown));
        self.status = GenerationStatus::new(Phase::Generating, GENERATING_MESSAGE);
        Ok(())
    }

    /// Surfaces an in-flight message without changing phase.
    pub fn report_progress(
        &mut self,
        message: impl Into<String>,
        progress: Option<u32>,
    ) -> Result<(), TransitionError> {
        if !self.status.phase.is_in_flight() {
            return Err(TransitionError::WrongPhase {
                expected: Phase::Generating,
                actual: self.status.phase,
            });
        }
        self.status.message = message.into();
        if progress.is_some() {
            self.status.progress = progress;
        }
        Ok(())
    }

    /// Generating -> Complete. Returns the results pushed out of history.
    pub fn complete(
        &mut self,
        media_url: impl Into<String>,
    ) -> Result<Vec<GenerationResult>, TransitionError> {
        self.require_phase(Phase::Generating)?;
        let finished = self
            .output
            .take()
            .ok_or(TransitionError::MissingOutput)?
            .with_media(media_url);
        let (history, evicted) = self.history.prepended(finished.clone());
        self.history = history;
        self.output = Some(finished);
        self.status = GenerationStatus::new(Phase::Complete, COMPLETE_MESSAGE);
        Ok(evicted)
    }

    /// Analyzing/Generating -> Error.
    pub fn fail(&mut self, message: impl Into<String>) -> Result<(), TransitionError> {
        if !self.status.phase.is_in_flight() {
            return Err(TransitionError::WrongPhase {
                expected: Phase::Generating,
                actual: self.status.phase,
            });
        }
        self.status = GenerationStatus::new(Phase::Error, message);
        Ok(())
    }

    /// Shows a history entry as the current output. History and phase are left alone.
    pub fn recall(&mut self, index: usize) -> Option<&GenerationResult> {
        let entry = self.history.get(index)?.clone();
        self.output = Some(entry);
        self.output.as_ref()
    }

    /// Whether any visible state still points at `media_url`.
    pub fn references_media(&self, media_url: &str) -> bool {
        let matches = |r: &GenerationResult| r.media_url.as_deref() == Some(media_url);
        self.output.as_ref().map_or(false, matches) || self.history.entries().iter().any(matches)
    }

    fn require_phase(&self, expected: Phase) -> Result<(), TransitionError> {
        if self.status.phase == expected {
            Ok(())
        } else {
            Err(TransitionError::WrongPhase {
                expected,
                actual: self.status.phase,
            })
        }
    }
}
