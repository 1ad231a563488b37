//! Connectivity-checked fetches: reachability first, then exactly one round
//! trip through the `Transport`.

use std::sync::Arc;

use tracing::debug;

use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse, Transport};
use crate::reachability::Reachability;

pub struct Fetcher<T> {
    transport: T,
    reachability: Arc<dyn Reachability>,
}

impl<T: Transport> Fetcher<T> {
    pub fn new(transport: T, reachability: Arc<dyn Reachability>) -> Self {
        Self {
            transport,
            reachability,
        }
    }

    /// Execute `request` unless the host is unreachable. Does not retry.
    pub async fn fetch(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let reachability = Arc::clone(&self.reachability);
        let reachable = tokio::task::spawn_blocking(move || reachability.is_reachable())
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        if !reachable {
            debug!(url = %request.url, "skipping request, host unreachable");
            return Err(ApiError::NoConnectivity);
        }
        debug!(url = %request.url, "GET");
        self.transport.execute(request).await
    }

    /// Body of a successful, non-empty response.
    pub async fn fetch_bytes(&self, request: HttpRequest) -> Result<Vec<u8>, ApiError> {
        self.fetch(request).await?.into_body()
    }
}
