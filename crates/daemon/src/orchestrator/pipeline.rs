use engine::{
    plan_attempt, AttemptPlan, ControlSnapshot, ControlState, CredentialState, GenerationConfig,
    GenerationMode, GenerationResult, Phase, SeedImage,
};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::credential::{Credential, CredentialGate};
use crate::error::{ErrorKind, RemoteResult, RemoteServiceError};
use crate::media::MediaStore;
use crate::orchestrator::classify::classify;
use crate::orchestrator::events::SnapshotFeed;
use crate::reasoning::Director;
use crate::video::{until_cancelled, JobProgress, VideoJobs};

/// How a generate request was handled.
#[derive(Debug)]
pub enum GenerateOutcome {
    /// The attempt is running; the handle resolves once it reaches Complete or Error.
    Started(JoinHandle<()>),
    /// Preconditions not met. Nothing changed and no backend call was made.
    Skipped,
    /// Another attempt is in flight.
    Busy(Phase),
    /// The credential gate is not Present.
    CredentialRequired(CredentialState),
}

/// Generation pipeline and sole owner of the mutable panel state.
pub struct Orchestrator {
    state: Mutex<ControlState>,
    gate: Arc<CredentialGate>,
    director: Director,
    video: VideoJobs,
    media: Arc<MediaStore>,
    feed: SnapshotFeed,
    in_flight: Mutex<Option<CancellationToken>>,
}

impl Orchestrator {
    pub fn new(
        gate: Arc<CredentialGate>,
        director: Director,
        video: VideoJobs,
        media: Arc<MediaStore>,
    ) -> Self {
        let state = ControlState::new();
        let feed = SnapshotFeed::new(state.snapshot(gate.state()));
        Orchestrator {
            state: Mutex::new(state),
            gate,
            director,
            video,
            media,
            feed,
            in_flight: Mutex::new(None),
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, ControlState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_in_flight(&self) -> MutexGuard<'_, Option<CancellationToken>> {
        self.in_flight.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Applies one mutation to the state and publishes the result.
    fn update<R>(&self, f: impl FnOnce(&mut ControlState) -> R) -> R {
        let (result, snapshot) = {
            let mut state = self.lock_state();
            let result = f(&mut state);
            (result, state.snapshot(self.gate.state()))
        };
        self.feed.publish(snapshot);
        result
    }

    pub fn snapshot(&self) -> ControlSnapshot {
        self.lock_state().snapshot(self.gate.state())
    }

    pub fn subscribe(&self) -> watch::Receiver<ControlSnapshot> {
        self.feed.subscribe()
    }

    pub fn gate(&self) -> &CredentialGate {
        &self.gate
    }

    pub fn media(&self) -> &Arc<MediaStore> {
        &self.media
    }

    /// Entry point of an attempt. At most one attempt runs at a time; a second call
    /// while Analyzing or Generating is refused without touching the running one.
    pub fn start(
        self: &Arc<Self>,
        mode: GenerationMode,
        prompt: &str,
        config: GenerationConfig,
        seed: Option<SeedImage>,
    ) -> GenerateOutcome {
        let Some(plan) = plan_attempt(mode, prompt, config, seed) else {
            info!("[Orchestrator] Preconditions not met for {:?}; skipping", mode);
            return GenerateOutcome::Skipped;
        };

        let credential = match self.gate.credential() {
            Ok(credential) => credential,
            Err(state) => {
                warn!("[Orchestrator] Credential {:?}; generation refused", state);
                return GenerateOutcome::CredentialRequired(state);
            }
        };

        if let Err(err) = self.update(|state| state.begin_attempt(plan.config)) {
            warn!("[Orchestrator] {}", err);
            return GenerateOutcome::Busy(self.lock_state().phase());
        }

        let cancel = CancellationToken::new();
        *self.lock_in_flight() = Some(cancel.clone());
        info!("[Orchestrator] Attempt started ({:?})", plan.mode);

        let this = Arc::clone(self);
        GenerateOutcome::Started(tokio::spawn(async move {
            this.run(plan, credential, cancel).await;
        }))
    }

    /// Cancels the in-flight attempt, if any.
    pub fn cancel(&self) -> bool {
        match self.lock_in_flight().as_ref() {
            Some(token) => {
                info!("[Orchestrator] Cancellation requested");
                token.cancel();
                true
            }
            None => false,
        }
    }

    /// Shows a history entry as the current output without touching history or phase.
    pub fn recall(&self, index: usize) -> Option<GenerationResult> {
        self.update(|state| state.recall(index).cloned())
    }

    pub fn select_credential(&self, key: Option<&str>) -> CredentialState {
        let state = self.gate.select(key);
        self.update(|_| ());
        state
    }

    async fn run(&self, plan: AttemptPlan, credential: Credential, cancel: CancellationToken) {
        let outcome = self.execute(&plan, &credential, &cancel).await;
        match outcome {
            Ok(media_url) => self.finish(media_url),
            Err(err) => {
                error!("[Orchestrator] Attempt failed: {}", err);
                let verdict = classify(&err);
                if verdict.revoke_credential {
                    self.gate.revoke_if(&credential);
                }
                self.update(|state| {
                    if let Err(e) = state.fail(verdict.message) {
                        warn!("[Orchestrator] Could not record failure: {}", e);
                    }
                });
            }
        }
        *self.lock_in_flight() = None;
    }

    /// Reasoning, then submission, then the polling loop and download. Each step
    /// starts only after its predecessor resolved.
    async fn execute(
        &self,
        plan: &AttemptPlan,
        credential: &Credential,
        cancel: &CancellationToken,
    ) -> RemoteResult<String> {
        let breakdown = until_cancelled(
            cancel,
            self.director.reason(credential, &plan.directive, &plan.config),
        )
        .await?;

        self.update(|state| state.enter_generation(&breakdown))
            .map_err(|e| RemoteServiceError::new(ErrorKind::Cancelled, e.to_string()))?;

        let mut on_progress = |progress: JobProgress| {
            self.update(|state| {
                if let Err(e) = state.report_progress(progress.message, progress.polls) {
                    warn!("[Orchestrator] Dropped progress update: {}", e);
                }
            });
        };

        // the refined scene description drives synthesis, not the raw user text
        let scene = breakdown.scene_description.as_str();
        let pending = match (&plan.mode, &plan.seed) {
            (GenerationMode::ImageToVideo, Some(seed)) => {
                until_cancelled(
                    cancel,
                    self.video
                        .submit_image_to_video(credential, seed, scene, &plan.config, &mut on_progress),
                )
                .await?
            }
            _ => {
                until_cancelled(
                    cancel,
                    self.video
                        .submit_text_to_video(credential, scene, &plan.config, &mut on_progress),
                )
                .await?
            }
        };

        self.video
            .await_completion(credential, pending, cancel, &mut on_progress)
            .await
    }

    fn finish(&self, media_url: String) {
        let revoked = self.update(|state| match state.complete(media_url) {
            Ok(evicted) => evicted
                .into_iter()
                .filter_map(|result| result.media_url)
                .filter(|url| !state.references_media(url))
                .collect::<Vec<_>>(),
            Err(e) => {
                warn!("[Orchestrator] Could not finalize result: {}", e);
                Vec::new()
            }
        });
        for url in revoked {
            self.media.revoke_url(&url);
        }
        info!("[Orchestrator] Attempt complete");
    }
}
