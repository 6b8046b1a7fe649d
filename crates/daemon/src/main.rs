use std::sync::Arc;
use tracing::info;

use daemon::credential::{Credential, CredentialGate};
use daemon::gemini::GeminiClient;
use daemon::media::MediaStore;
use daemon::orchestrator::Orchestrator;
use daemon::reasoning::Director;
use daemon::settings::Settings;
use daemon::video::VideoJobs;

// the pipeline runs as suspendable steps on a single thread
#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::from_env()?;

    tracing_subscriber::fmt()
        .with_max_level(settings.log_level)
        .init();

    // one-time existence check; nothing is served until the gate has left Unknown
    let gate = Arc::new(CredentialGate::new());
    let credential_state =
        gate.resolve_existence(settings.api_key.as_deref().and_then(Credential::new));
    info!("Credential state at boot: {:?}", credential_state);

    let media = Arc::new(MediaStore::new());
    let client = Arc::new(GeminiClient::new(&settings)?);
    let orchestrator = Arc::new(Orchestrator::new(
        gate,
        Director::new(client.clone()),
        VideoJobs::new(client, media.clone(), settings.poll_policy()),
        media,
    ));
    info!(
        "Reasoning model {}, video model {}, polling every {}s",
        settings.reasoning_model,
        settings.video_model,
        settings.poll_interval.as_secs()
    );

    let app = daemon::api::app(orchestrator, settings.panel_dir.clone());

    info!("Starting director server on {}", settings.bind);
    let listener = tokio::net::TcpListener::bind(settings.bind).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
