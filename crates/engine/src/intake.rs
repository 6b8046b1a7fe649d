use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_IMAGE_MIME: &str = "image/png";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GenerationMode {
    #[serde(rename = "T2V", alias = "TextToVideo")]
    TextToVideo,
    #[serde(rename = "I2V", alias = "ImageToVideo")]
    ImageToVideo,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum IntakeError {
    #[error("seed image is empty")]
    Empty,
    #[error("data URI is not base64 encoded")]
    NotBase64Uri,
    #[error("seed image payload is not valid base64: {0}")]
    InvalidPayload(String),
}

/// A decoded seed image for image-to-video generation.
#[derive(Clone, PartialEq)]
pub struct SeedImage {
    mime_type: String,
    bytes: Vec<u8>,
}

impl std::fmt::Debug for SeedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeedImage")
            .field("mime_type", &self.mime_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl SeedImage {
    pub fn new(mime_type: impl Into<String>, bytes: Vec<u8>) -> Result<Self, IntakeError> {
        if bytes.is_empty() {
            return Err(IntakeError::Empty);
        }
        Ok(SeedImage {
            mime_type: mime_type.into(),
            bytes,
        })
    }

    /// Accepts either a `data:<mime>;base64,<payload>` URI as produced by a file reader,
    /// or a bare base64 payload (assumed PNG).
    pub fn from_data_uri(input: &str) -> Result<Self, IntakeError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(IntakeError::Empty);
        }

        let (mime_type, payload) = match input.strip_prefix("data:") {
            Some(rest) => {
                let (header, payload) = rest.split_once(',').ok_or(IntakeError::NotBase64Uri)?;
                let mime = header
                    .strip_suffix(";base64")
                    .ok_or(IntakeError::NotBase64Uri)?;
                let mime = if mime.is_empty() { DEFAULT_IMAGE_MIME } else { mime };
                (mime.to_string(), payload)
            }
            None => (DEFAULT_IMAGE_MIME.to_string(), input),
        };

        let bytes = STANDARD
            .decode(payload.trim())
            .map_err(|e| IntakeError::InvalidPayload(e.to_string()))?;
        SeedImage::new(mime_type, bytes)
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}
