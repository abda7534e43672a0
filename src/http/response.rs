//! Response construction helpers.
//!
//! # Design Decisions
//! - Construction never fails: status is set on a built response
//! - Body reads are bounded by the caller-supplied limit

use axum::body::{self, Body};
use axum::http::{header, HeaderValue, Response, StatusCode};
use futures_util::StreamExt;

/// Empty response with the given status.
pub fn empty(status: StatusCode) -> Response<Body> {
    with_status(Response::new(Body::empty()), status)
}

/// `text/plain` response.
pub fn text(status: StatusCode, body: impl Into<String>) -> Response<Body> {
    let mut response = with_status(Response::new(Body::from(body.into())), status);
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    response
}

/// `application/json` response from an already-serialised document.
pub fn json(status: StatusCode, body: &serde_json::Value) -> Response<Body> {
    let mut response = with_status(Response::new(Body::from(body.to_string())), status);
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    response
}

fn with_status(mut response: Response<Body>, status: StatusCode) -> Response<Body> {
    *response.status_mut() = status;
    response
}

/// Buffer a body into a UTF-8 string (lossy), reading at most `limit` bytes.
pub async fn body_text(body: Body, limit: usize) -> Result<String, axum::Error> {
    let bytes = body::to_bytes(body, limit).await?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Buffer at most `limit` bytes of a body into a UTF-8 string (lossy).
/// Longer bodies are cut at `limit` rather than rejected; the flag reports
/// whether that happened.
pub async fn body_text_truncated(body: Body, limit: usize) -> Result<(String, bool), axum::Error> {
    let mut stream = body.into_data_stream();
    let mut buf = Vec::new();
    let mut truncated = false;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        let room = limit - buf.len();
        if chunk.len() > room {
            buf.extend_from_slice(&chunk[..room]);
            truncated = true;
            break;
        }
        buf.extend_from_slice(&chunk);
    }
    Ok((String::from_utf8_lossy(&buf).into_owned(), truncated))
}
