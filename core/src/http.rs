//! HTTP transport types and the `Transport` seam.
//!
//! # Design
//! Requests and responses are plain data. `PokedexClient` builds
//! `HttpRequest` values and parses `HttpResponse` values without touching the
//! network; executing the round trip is the job of a [`Transport`]
//! implementation. The session uses [`crate::transport::UreqTransport`] in
//! production, while hosts that own their networking stack can call the
//! client's `build_*` / `parse_*` pairs directly.
//!
//! All fields use owned types so values move freely between tasks.

use std::future::Future;

use crate::error::ApiError;

/// A GET request described as plain data. The API is read-only, so no method
/// or body is carried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: vec![("accept".to_string(), "application/json".to_string())],
        }
    }
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Return the body of a successful, non-empty response.
    ///
    /// 404 maps to `NotFound`, other non-2xx statuses to `HttpError`, and a
    /// 2xx with no bytes to `EmptyBody`.
    pub fn into_body(self) -> Result<Vec<u8>, ApiError> {
        if self.status == 404 {
            return Err(ApiError::NotFound);
        }
        if !(200..300).contains(&self.status) {
            return Err(ApiError::HttpError {
                status: self.status,
                body: String::from_utf8_lossy(&self.body).into_owned(),
            });
        }
        if self.body.is_empty() {
            return Err(ApiError::EmptyBody);
        }
        Ok(self.body)
    }
}

/// Executes one HTTP round trip. Implementations must not retry.
///
/// Non-2xx statuses are returned as data, not as errors; only failures to
/// obtain a response at all are reported through `ApiError`.
pub trait Transport: Send + Sync + 'static {
    fn execute(
        &self,
        request: HttpRequest,
    ) -> impl Future<Output = Result<HttpResponse, ApiError>> + Send;
}
