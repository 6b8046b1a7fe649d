//! Scripted stand-in for the generative backend, shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use bytes::Bytes;
use daemon::credential::{Credential, CredentialGate};
use daemon::error::{RemoteResult, RemoteServiceError};
use daemon::media::MediaStore;
use daemon::orchestrator::Orchestrator;
use daemon::reasoning::{Director, ReasoningRequest, ReasoningService};
use daemon::video::{JobHandle, PollPolicy, VideoJobService, VideoJobs, VideoRequest};
use engine::SeedImage;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const SCENE: &str = "Slow dolly toward a lighthouse as dusk falls, waves breaking below";

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Reason { prompt: String, temperature: f32 },
    SubmitText { prompt: String, request: VideoRequest },
    SubmitImage { prompt: String, mime_type: String, bytes: Vec<u8> },
    Poll { name: String },
    Download { uri: String },
}

/// Returns queued responses in order and records every call it receives.
///
/// An empty poll queue answers with a still-running job, so an unscripted job
/// never finishes on its own.
#[derive(Default)]
pub struct ScriptedBackend {
    manifests: Mutex<VecDeque<RemoteResult<String>>>,
    submissions: Mutex<VecDeque<RemoteResult<JobHandle>>>,
    polls: Mutex<VecDeque<RemoteResult<JobHandle>>>,
    downloads: Mutex<VecDeque<RemoteResult<Bytes>>>,
    reasoning_delay: Mutex<Option<Duration>>,
    polls_hang: Mutex<bool>,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(ScriptedBackend::default())
    }

    pub fn push_manifest(&self, response: RemoteResult<String>) {
        self.manifests.lock().unwrap().push_back(response);
    }

    pub fn push_submission(&self, response: RemoteResult<JobHandle>) {
        self.submissions.lock().unwrap().push_back(response);
    }

    pub fn push_poll(&self, response: RemoteResult<JobHandle>) {
        self.polls.lock().unwrap().push_back(response);
    }

    pub fn push_download(&self, response: RemoteResult<Bytes>) {
        self.downloads.lock().unwrap().push_back(response);
    }

    pub fn set_reasoning_delay(&self, delay: Duration) {
        *self.reasoning_delay.lock().unwrap() = Some(delay);
    }

    /// Every later poll is recorded and then never answers.
    pub fn hang_polls(&self) {
        *self.polls_hang.lock().unwrap() = true;
    }

    /// Scripts one successful attempt: breakdown, submission, one pending poll, then done.
    pub fn script_success(&self, job: &str) {
        self.push_manifest(Ok(manifest_json(SCENE)));
        self.push_submission(Ok(JobHandle::pending(job)));
        self.push_poll(Ok(JobHandle::pending(job)));
        self.push_poll(Ok(finished(job)));
        self.push_download(Ok(Bytes::from(format!("mp4:{}", job))));
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn poll_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Poll { .. }))
            .count()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl ReasoningService for ScriptedBackend {
    async fn generate_manifest(
        &self,
        _credential: &Credential,
        request: &ReasoningRequest,
    ) -> RemoteResult<String> {
        self.record(Call::Reason {
            prompt: request.prompt.clone(),
            temperature: request.temperature,
        });
        let delay = *self.reasoning_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.manifests
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(RemoteServiceError::upstream("no scripted manifest")))
    }
}

#[async_trait]
impl VideoJobService for ScriptedBackend {
    async fn submit_text_to_video(
        &self,
        _credential: &Credential,
        request: &VideoRequest,
    ) -> RemoteResult<JobHandle> {
        self.record(Call::SubmitText {
            prompt: request.prompt.clone(),
            request: request.clone(),
        });
        self.submissions
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(RemoteServiceError::upstream("no scripted submission")))
    }

    async fn submit_image_to_video(
        &self,
        _credential: &Credential,
        image: &SeedImage,
        request: &VideoRequest,
    ) -> RemoteResult<JobHandle> {
        self.record(Call::SubmitImage {
            prompt: request.prompt.clone(),
            mime_type: image.mime_type().to_string(),
            bytes: image.bytes().to_vec(),
        });
        self.submissions
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(RemoteServiceError::upstream("no scripted submission")))
    }

    async fn poll_job(&self, _credential: &Credential, handle: &JobHandle) -> RemoteResult<JobHandle> {
        self.record(Call::Poll {
            name: handle.name.clone(),
        });
        let hang = *self.polls_hang.lock().unwrap();
        if hang {
            std::future::pending::<()>().await;
        }
        self.polls
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(JobHandle::pending(handle.name.clone())))
    }

    async fn download_media(&self, _credential: &Credential, media_uri: &str) -> RemoteResult<Bytes> {
        self.record(Call::Download {
            uri: media_uri.to_string(),
        });
        self.downloads
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(RemoteServiceError::upstream("no scripted download")))
    }
}

pub fn manifest_json(scene: &str) -> String {
    serde_json::json!({
        "physicsEngine": "Active",
        "audioSync": "Locked",
        "sceneDescription": scene,
        "audioPrompt": "Waves against rocks, distant gulls",
        "directorMemory": "Amber dusk palette, slow camera"
    })
    .to_string()
}

pub fn finished(job: &str) -> JobHandle {
    JobHandle {
        name: job.to_string(),
        done: true,
        media_uri: Some(format!("https://files.example/{}:download", job)),
        failure: None,
    }
}

pub fn test_policy() -> PollPolicy {
    PollPolicy {
        interval: Duration::from_secs(10),
        max_wait: None,
    }
}

pub struct Harness {
    pub backend: Arc<ScriptedBackend>,
    pub gate: Arc<CredentialGate>,
    pub media: Arc<MediaStore>,
    pub orchestrator: Arc<Orchestrator>,
}

/// An orchestrator wired to a scripted backend, with a credential already Present.
pub fn harness(policy: PollPolicy) -> Harness {
    let backend = ScriptedBackend::new();
    let gate = Arc::new(CredentialGate::new());
    gate.resolve_existence(Credential::new("test-key"));
    harness_with_gate(backend, gate, policy)
}

pub fn harness_with_gate(
    backend: Arc<ScriptedBackend>,
    gate: Arc<CredentialGate>,
    policy: PollPolicy,
) -> Harness {
    let media = Arc::new(MediaStore::new());
    let orchestrator = Arc::new(Orchestrator::new(
        gate.clone(),
        Director::new(backend.clone()),
        VideoJobs::new(backend.clone(), media.clone(), policy),
        media.clone(),
    ));
    Harness {
        backend,
        gate,
        media,
        orchestrator,
    }
}
