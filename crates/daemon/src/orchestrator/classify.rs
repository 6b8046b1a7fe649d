use crate::error::{ErrorKind, RemoteServiceError};

pub const NOT_FOUND_MESSAGE: &str = "Requested entity was not found. Please re-select an API key.";

/// What a failed attempt means for the panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub message: String,
    pub revoke_credential: bool,
}

/// The only place failure kinds are interpreted. The detail text is appended for
/// display and never inspected.
pub fn classify(error: &RemoteServiceError) -> Verdict {
    let message = match error.kind {
        ErrorKind::NotFound => {
            return Verdict {
                message: NOT_FOUND_MESSAGE.to_string(),
                revoke_credential: true,
            }
        }
        ErrorKind::InvalidResponse => {
            format!("Director returned an incomplete breakdown: {}", error.message)
        }
        ErrorKind::JobFailed => format!("Video job failed: {}", error.message),
        ErrorKind::Upstream => format!("Generation failed: {}", error.message),
        ErrorKind::Cancelled => "Generation cancelled".to_string(),
        ErrorKind::TimedOut => format!("Generation timed out: {}", error.message),
    };
    Verdict {
        message,
        revoke_credential: false,
    }
}
