// HTTP response utilities for rendered pages
use axum::{
    body::Body,
    http::{header, HeaderValue, Response, StatusCode},
};

/// Build an HTML response with explicit content type and length
pub fn html_response(status: StatusCode, page: String) -> Result<Response<Body>, StatusCode> {
    let bytes = page.into_bytes();
    let content_length = HeaderValue::from_str(&bytes.len().to_string()).map_err(|e| {
        tracing::error!("Invalid content length header: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, "text/html; charset=utf-8")
        .header(header::CONTENT_LENGTH, content_length)
        .header(header::CACHE_CONTROL, "no-store")
        .body(Body::from(bytes))
        .map_err(|e| {
            tracing::error!("Response build error: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })
}
