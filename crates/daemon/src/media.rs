use bytes::Bytes;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info};
use uuid::Uuid;

pub const MEDIA_URL_PREFIX: &str = "/api/media/";

#[derive(Debug)]
pub struct StoredMedia {
    pub bytes: Bytes,
    pub mime_type: String,
    /// Hex SHA-256 of the bytes.
    pub etag: String,
}

/// In-memory store of downloaded videos behind revocable local URLs.
#[derive(Default)]
pub struct MediaStore {
    entries: Mutex<HashMap<Uuid, Arc<StoredMedia>>>,
}

impl MediaStore {
    pub fn new() -> Self {
        MediaStore::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Uuid, Arc<StoredMedia>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Stores the bytes and returns the URL the panel can play them from.
    pub fn register(&self, bytes: Bytes, mime_type: &str) -> String {
        let id = Uuid::new_v4();
        let etag = hex::encode(Sha256::digest(&bytes));
        info!("[Media] Registered {} ({} bytes, {})", id, bytes.len(), mime_type);
        self.lock().insert(
            id,
            Arc::new(StoredMedia {
                bytes,
                mime_type: mime_type.to_string(),
                etag,
            }),
        );
        media_url(id)
    }

    pub fn get(&self, id: Uuid) -> Option<Arc<StoredMedia>> {
        self.lock().get(&id).cloned()
    }

    pub fn revoke(&self, id: Uuid) -> bool {
        let removed = self.lock().remove(&id).is_some();
        if removed {
            debug!("[Media] Revoked {}", id);
        }
        removed
    }

    pub fn revoke_url(&self, url: &str) -> bool {
        match parse_media_url(url) {
            Some(id) => self.revoke(id),
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

pub fn media_url(id: Uuid) -> String {
    format!("{}{}", MEDIA_URL_PREFIX, id)
}

pub fn parse_media_url(url: &str) -> Option<Uuid> {
    url.strip_prefix(MEDIA_URL_PREFIX)
        .and_then(|id| Uuid::parse_str(id).ok())
}
