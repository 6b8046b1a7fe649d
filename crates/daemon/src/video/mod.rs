use async_trait::async_trait;
use bytes::Bytes;
use engine::{AspectRatio, GenerationConfig, Resolution, SeedImage};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, timeout_at, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::credential::Credential;
use crate::error::{RemoteResult, RemoteServiceError};
use crate::media::MediaStore;

pub const VIDEO_MIME: &str = "video/mp4";

/// Opaque reference to a long-running synthesis operation, refreshed by polling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobHandle {
    pub name: String,
    pub done: bool,
    /// Set once `done`, when the backend produced media.
    pub media_uri: Option<String>,
    /// Set once `done`, when the backend reported a job-level failure.
    pub failure: Option<String>,
}

impl JobHandle {
    pub fn pending(name: impl Into<String>) -> Self {
        JobHandle {
            name: name.into(),
            done: false,
            media_uri: None,
            failure: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VideoRequest {
    pub prompt: String,
    pub resolution: Resolution,
    pub aspect_ratio: AspectRatio,
}

/// The video-synthesis half of the generative backend.
#[async_trait]
pub trait VideoJobService: Send + Sync {
    async fn submit_text_to_video(
        &self,
        credential: &Credential,
        request: &VideoRequest,
    ) -> RemoteResult<JobHandle>;

    async fn submit_image_to_video(
        &self,
        credential: &Credential,
        image: &SeedImage,
        request: &VideoRequest,
    ) -> RemoteResult<JobHandle>;

    async fn poll_job(&self, credential: &Credential, handle: &JobHandle) -> RemoteResult<JobHandle>;

    async fn download_media(&self, credential: &Credential, media_uri: &str) -> RemoteResult<Bytes>;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PollPolicy {
    pub interval: Duration,
    /// `None` waits until the backend reports completion, however long that takes.
    pub max_wait: Option<Duration>,
}

impl Default for PollPolicy {
    fn default() -> Self {
        PollPolicy {
            interval: Duration::from_secs(10),
            max_wait: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobKind {
    TextToVideo,
    ImageToVideo,
}

impl JobKind {
    fn in_flight_message(&self, polls: u32, elapsed: Duration) -> String {
        let secs = elapsed.as_secs();
        match self {
            JobKind::TextToVideo => {
                format!("Processing frames... poll {} ({}s elapsed)", polls, secs)
            }
            JobKind::ImageToVideo => {
                format!("Interpolating motion vectors... poll {} ({}s elapsed)", polls, secs)
            }
        }
    }
}

/// Human-readable progress emitted while a job is submitted and polled.
#[derive(Debug, Clone, PartialEq)]
pub struct JobProgress {
    pub message: String,
    pub polls: Option<u32>,
}

impl JobProgress {
    fn stage(message: &str) -> Self {
        JobProgress {
            message: message.to_string(),
            polls: None,
        }
    }
}

/// A submitted job and the variant it was submitted as.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingJob {
    pub handle: JobHandle,
    pub kind: JobKind,
}

/// Resolves with `fut`, unless the token fires first.
pub async fn until_cancelled<T>(
    cancel: &CancellationToken,
    fut: impl Future<Output = RemoteResult<T>>,
) -> RemoteResult<T> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(RemoteServiceError::cancelled()),
        result = fut => result,
    }
}

/// Video-job adapter: submission, the polling loop, and media resolution.
#[derive(Clone)]
pub struct VideoJobs {
    service: Arc<dyn VideoJobService>,
    media: Arc<MediaStore>,
    policy: PollPolicy,
}

impl VideoJobs {
    pub fn new(service: Arc<dyn VideoJobService>, media: Arc<MediaStore>, policy: PollPolicy) -> Self {
        VideoJobs {
            service,
            media,
            policy,
        }
    }

    pub async fn submit_text_to_video(
        &self,
        credential: &Credential,
        prompt: &str,
        config: &GenerationConfig,
        on_progress: &mut (dyn FnMut(JobProgress) + Send),
    ) -> RemoteResult<PendingJob> {
        on_progress(JobProgress::stage("Initializing video engine..."));
        let handle = self
            .service
            .submit_text_to_video(credential, &video_request(prompt, config))
            .await?;
        info!("[Veo] Submitted text-to-video job {}", handle.name);
        on_progress(JobProgress::stage("Rendering diffusion transformer..."));
        Ok(PendingJob {
            handle,
            kind: JobKind::TextToVideo,
        })
    }

    pub async fn submit_image_to_video(
        &self,
        credential: &Credential,
        image: &SeedImage,
        prompt: &str,
        config: &GenerationConfig,
        on_progress: &mut (dyn FnMut(JobProgress) + Send),
    ) -> RemoteResult<PendingJob> {
        on_progress(JobProgress::stage("Parsing image metadata..."));
        let handle = self
            .service
            .submit_image_to_video(credential, image, &video_request(prompt, config))
            .await?;
        info!(
            "[Veo] Submitted image-to-video job {} ({} byte seed, {})",
            handle.name,
            image.bytes().len(),
            image.mime_type()
        );
        on_progress(JobProgress::stage("Rendering diffusion transformer..."));
        Ok(PendingJob {
            handle,
            kind: JobKind::ImageToVideo,
        })
    }

    /// Polls until the backend reports `done`, then downloads the media and returns a
    /// revocable local URL for it.
    ///
    /// Each round sleeps the poll interval, re-fetches the handle, then reports
    /// progress. The loop ends early only on cancellation or when the configured
    /// maximum wait is exceeded. A job still running at its last poll past the
    /// maximum wait times out; a request still outstanding one interval after
    /// that is abandoned.
    pub async fn await_completion(
        &self,
        credential: &Credential,
        job: PendingJob,
        cancel: &CancellationToken,
        on_progress: &mut (dyn FnMut(JobProgress) + Send),
    ) -> RemoteResult<String> {
        let started = Instant::now();
        let name = job.handle.name.clone();
        let rounds = self.poll_and_download(credential, job, started, cancel, on_progress);

        let Some(max_wait) = self.policy.max_wait else {
            return rounds.await;
        };
        let hard_deadline = started + max_wait + self.policy.interval;
        match timeout_at(hard_deadline, rounds).await {
            Ok(result) => result,
            Err(_) => {
                warn!("[Veo] Request for {} still outstanding past the wait limit", name);
                Err(exceeded(&name, max_wait))
            }
        }
    }

    async fn poll_and_download(
        &self,
        credential: &Credential,
        job: PendingJob,
        started: Instant,
        cancel: &CancellationToken,
        on_progress: &mut (dyn FnMut(JobProgress) + Send),
    ) -> RemoteResult<String> {
        let PendingJob { mut handle, kind } = job;
        let mut polls: u32 = 0;

        while !handle.done {
            until_cancelled(cancel, async {
                sleep(self.policy.interval).await;
                Ok(())
            })
            .await?;

            handle = until_cancelled(cancel, self.service.poll_job(credential, &handle)).await?;
            polls += 1;
            debug!("[Veo] Poll {} for {}: done={}", polls, handle.name, handle.done);
            on_progress(JobProgress {
                message: kind.in_flight_message(polls, started.elapsed()),
                polls: Some(polls),
            });

            if let Some(max_wait) = self.policy.max_wait {
                if !handle.done && started.elapsed() >= max_wait {
                    warn!("[Veo] Job {} exceeded {}s", handle.name, max_wait.as_secs());
                    return Err(exceeded(&handle.name, max_wait));
                }
            }
        }

        if let Some(failure) = handle.failure {
            return Err(RemoteServiceError::job_failed(failure));
        }
        let media_uri = handle.media_uri.ok_or_else(|| {
            RemoteServiceError::job_failed(format!(
                "job {} completed without a media reference",
                handle.name
            ))
        })?;

        let bytes =
            until_cancelled(cancel, self.service.download_media(credential, &media_uri)).await?;
        info!("[Veo] Downloaded {} bytes for {}", bytes.len(), handle.name);
        Ok(self.media.register(bytes, VIDEO_MIME))
    }
}

fn exceeded(name: &str, max_wait: Duration) -> RemoteServiceError {
    RemoteServiceError::timed_out(format!(
        "job {} still running after {}s",
        name,
        max_wait.as_secs()
    ))
}

fn video_request(prompt: &str, config: &GenerationConfig) -> VideoRequest {
    VideoRequest {
        prompt: prompt.to_string(),
        resolution: config.resolution,
        aspect_ratio: config.aspect_ratio,
    }
}
