use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::Response,
    routing::get,
    Router,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::media::MediaStore;

pub fn router(media: Arc<MediaStore>) -> Router {
    Router::new()
        .route("/media/:id", get(get_media).delete(delete_media))
        .with_state(media)
}

fn parse_id(raw: &str) -> Result<Uuid, StatusCode> {
    Uuid::parse_str(raw).map_err(|_| StatusCode::NOT_FOUND)
}

/// Serves a resolved video, honouring If-None-Match and single byte ranges so the
/// panel's player can seek.
async fn get_media(
    State(media): State<Arc<MediaStore>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Response, StatusCode> {
    let stored = media.get(parse_id(&id)?).ok_or(StatusCode::NOT_FOUND)?;
    let etag = format!("\"{}\"", stored.etag);

    let not_modified = headers
        .get(header::IF_NONE_MATCH)
        .and_then(|v| v.to_str().ok())
        .map_or(false, |v| v.split(',').any(|tag| tag.trim() == etag || tag.trim() == "*"));
    if not_modified {
        return Response::builder()
            .status(StatusCode::NOT_MODIFIED)
            .header(header::ETAG, &etag)
            .body(Body::empty())
            .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR);
    }

    let size = stored.bytes.len() as u64;
    let range = headers
        .get(header::RANGE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| parse_range(v, size));

    let builder = Response::builder()
        .header(header::CONTENT_TYPE, &stored.mime_type)
        .header(header::ACCEPT_RANGES, "bytes")
        .header(header::ETAG, &etag)
        .header(header::CACHE_CONTROL, "private, no-cache");

    let response = match range {
        Some((start, end)) => builder
            .status(StatusCode::PARTIAL_CONTENT)
            .header(header::CONTENT_RANGE, format!("bytes {}-{}/{}", start, end, size))
            .header(header::CONTENT_LENGTH, (end - start + 1).to_string())
            .body(Body::from(
                stored.bytes.slice(start as usize..=end as usize),
            )),
        None => builder
            .status(StatusCode::OK)
            .header(header::CONTENT_LENGTH, size.to_string())
            .body(Body::from(stored.bytes.clone())),
    };
    response.map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

async fn delete_media(
    State(media): State<Arc<MediaStore>>,
    Path(id): Path<String>,
) -> StatusCode {
    match parse_id(&id) {
        Ok(id) if media.revoke(id) => StatusCode::NO_CONTENT,
        _ => StatusCode::NOT_FOUND,
    }
}

/// Parses a single `bytes=start-end` range. Returns `None` for anything unsatisfiable,
/// in which case the whole body is served.
fn parse_range(range: &str, size: u64) -> Option<(u64, u64)> {
    let spec = range.strip_prefix("bytes=")?;
    let (start, end) = spec.split_once('-')?;
    let (start, end) = (start.trim(), end.trim());
    if size == 0 || (start.is_empty() && end.is_empty()) {
        return None;
    }

    let (start, end) = if start.is_empty() {
        // suffix range: the last N bytes
        let suffix: u64 = end.parse().ok()?;
        (size.saturating_sub(suffix), size - 1)
    } else {
        let start: u64 = start.parse().ok()?;
        let end = if end.is_empty() {
            size - 1
        } else {
            end.parse::<u64>().ok()?.min(size - 1)
        };
        (start, end)
    };

    (start <= end && start < size).then_some((start, end))
}
