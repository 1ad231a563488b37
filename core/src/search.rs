//! One-shot lookup by name.

use tracing::debug;

use crate::client::PokedexClient;
use crate::decode::decode_detail;
use crate::error::ApiError;
use crate::fetcher::Fetcher;
use crate::http::{HttpRequest, Transport};
use crate::types::{ListItem, PageEnvelope};

/// Fetch the detail behind a prepared search request and wrap it in a
/// single-item envelope. 404 and an empty body both mean `NotFound`.
pub async fn lookup<T: Transport>(
    fetcher: &Fetcher<T>,
    request: HttpRequest,
) -> Result<PageEnvelope, ApiError> {
    let detail_ref = request.url.clone();
    let bytes = match fetcher.fetch_bytes(request).await {
        Ok(bytes) => bytes,
        Err(ApiError::EmptyBody) => return Err(ApiError::NotFound),
        Err(e) => return Err(e),
    };
    let detail = decode_detail(&bytes)?;
    debug!(name = %detail.name, id = detail.id, "search matched");

    let item = ListItem {
        name: detail.name.clone(),
        detail_ref,
        detail: Some(detail),
    };
    Ok(PageEnvelope::single(item))
}

/// Validate `query` and build its request without touching the network.
pub fn prepare(client: &PokedexClient, query: &str) -> Result<HttpRequest, ApiError> {
    client.build_search(query)
}
