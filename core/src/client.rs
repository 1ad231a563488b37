//! Stateless HTTP request builder and response parser for the PokéAPI.
//!
//! # Design
//! `PokedexClient` holds only a `base_url` and carries no mutable state between
//! calls. Each endpoint is split into a `build_*` method that produces an
//! `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`. The
//! session pairs them with a `Fetcher`; a host with its own networking stack
//! can execute the requests itself.

use crate::decode::{decode_detail, decode_page};
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::types::{Detail, PageEnvelope};

const POKEMON_ENDPOINT: &str = "pokemon/";

/// Synchronous, stateless client for the PokéAPI.
#[derive(Debug, Clone)]
pub struct PokedexClient {
    base_url: String,
}

impl PokedexClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// First page of the list endpoint.
    pub fn build_list_page(&self) -> HttpRequest {
        HttpRequest::get(format!("{}/{POKEMON_ENDPOINT}", self.base_url))
    }

    /// Continuation page. The cursor is server-owned and used verbatim.
    pub fn build_next_page(&self, cursor: &str) -> Result<HttpRequest, ApiError> {
        check_absolute(cursor)?;
        Ok(HttpRequest::get(cursor))
    }

    /// Detail record referenced by a list item.
    pub fn build_detail(&self, detail_ref: &str) -> Result<HttpRequest, ApiError> {
        check_absolute(detail_ref)?;
        Ok(HttpRequest::get(detail_ref))
    }

    /// Lookup by name. The query is trimmed and lowercased; it must be a
    /// single path segment.
    pub fn build_search(&self, query: &str) -> Result<HttpRequest, ApiError> {
        let name = query.trim().to_lowercase();
        if name.is_empty() {
            return Err(ApiError::InvalidQuery);
        }
        if !name.chars().all(is_unreserved) {
            return Err(ApiError::InvalidUri(format!("cannot search for {query:?}")));
        }
        Ok(HttpRequest::get(format!(
            "{}/{POKEMON_ENDPOINT}{name}",
            self.base_url
        )))
    }

    pub fn parse_page(&self, response: HttpResponse) -> Result<PageEnvelope, ApiError> {
        decode_page(&response.into_body()?)
    }

    pub fn parse_detail(&self, response: HttpResponse) -> Result<Detail, ApiError> {
        decode_detail(&response.into_body()?)
    }
}

/// RFC 3986 unreserved characters, which need no percent-encoding in a path
/// segment.
fn is_unreserved(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_' | '~')
}

fn check_absolute(uri: &str) -> Result<(), ApiError> {
    let rest = uri
        .strip_prefix("https://")
        .or_else(|| uri.strip_prefix("http://"))
        .ok_or_else(|| ApiError::InvalidUri(uri.to_string()))?;
    if rest.is_empty() || rest.starts_with('/') || uri.chars().any(char::is_whitespace) {
        return Err(ApiError::InvalidUri(uri.to_string()));
    }
    Ok(())
}
