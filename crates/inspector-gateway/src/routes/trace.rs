use crate::error::InspectorError;
use crate::session_id;
use crate::state::AppState;
use crate::trace_stream::{self, ByteRange};
use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::Response;
use tokio_util::io::ReaderStream;

const STREAM_CHUNK_BYTES: usize = 1024 * 1024;

/// `GET /trace/{session_id}` (§4.7, §4.8).
pub async fn get_trace(
    State(state): State<AppState>,
    Path(requested_session_id): Path<String>,
    headers: HeaderMap,
) -> Result<Response, InspectorError> {
    if !session_id::is_valid(&requested_session_id) {
        return Err(InspectorError::NotFound("trace not found".to_string()));
    }

    let path = trace_stream::resolve_trace_path(&state.traces_dir, &requested_session_id)
        .ok_or_else(|| InspectorError::NotFound("trace not found".to_string()))?;

    let etag = trace_stream::compute_etag(&path).map_err(|_| InspectorError::NotFound("trace not found".to_string()))?;

    let range_header = headers.get(header::RANGE).and_then(|v| v.to_str().ok());
    match range_header.and_then(trace_stream::parse_range) {
        Some(range) => serve_range(path, range, etag).await,
        None => serve_full(path, etag).await,
    }
}

async fn serve_full(path: std::path::PathBuf, etag: String) -> Result<Response, InspectorError> {
    let file = tokio::fs::File::open(&path)
        .await
        .map_err(|_| InspectorError::NotFound("trace not found".to_string()))?;
    let stream = ReaderStream::with_capacity(file, STREAM_CHUNK_BYTES);
    let body = Body::from_stream(stream);

    let mut response = Response::new(body);
    *response.status_mut() = StatusCode::OK;
    let headers = response.headers_mut();
    headers.insert(header::CONTENT_ENCODING, HeaderValue::from_static("gzip"));
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/x-jsonlines+gzip"),
    );
    headers.insert(header::ETAG, HeaderValue::from_str(&etag).unwrap());
    Ok(response)
}

async fn serve_range(path: std::path::PathBuf, range: ByteRange, etag: String) -> Result<Response, InspectorError> {
    let (slice, total) = tokio::task::spawn_blocking(move || trace_stream::read_range(&path, range))
        .await
        .map_err(|_| InspectorError::Validation("range read task failed".to_string()))??;

    let served_end = range.start + slice.len() as u64 - 1;
    let mut response = Response::new(Body::from(slice));
    *response.status_mut() = StatusCode::PARTIAL_CONTENT;
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_RANGE,
        HeaderValue::from_str(&format!("bytes {}-{}/{}", range.start, served_end, total)).unwrap(),
    );
    headers.insert(header::ETAG, HeaderValue::from_str(&etag).unwrap());
    Ok(response)
}
