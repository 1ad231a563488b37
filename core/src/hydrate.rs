//! Detail hydration: concurrent fan-out of detail fetches, serialized fan-in.
//!
//! `Hydrator::fetch` spawns one task per item and waits for all of them; it
//! never touches the store. The caller (the session owner task) applies the
//! results with [`merge_details`], so merges happen on one logical thread.
//!
//! A failed detail fetch is logged and dropped: the item keeps
//! `detail = None` and the batch still completes.

use std::sync::Arc;

use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::client::PokedexClient;
use crate::decode::decode_detail;
use crate::fetcher::Fetcher;
use crate::http::Transport;
use crate::store::CollectionStore;
use crate::types::Detail;

pub struct Hydrator<T> {
    fetcher: Arc<Fetcher<T>>,
    client: PokedexClient,
}

impl<T> Clone for Hydrator<T> {
    fn clone(&self) -> Self {
        Self {
            fetcher: Arc::clone(&self.fetcher),
            client: self.client.clone(),
        }
    }
}

impl<T: Transport> Hydrator<T> {
    pub fn new(fetcher: Arc<Fetcher<T>>, client: PokedexClient) -> Self {
        Self { fetcher, client }
    }

    /// Fetch the detail of every `(name, detail_ref)` target concurrently.
    ///
    /// Returns the successful results in completion order. Cancelling stops
    /// waiting, aborts outstanding tasks and returns what finished so far.
    pub async fn fetch(
        &self,
        targets: Vec<(String, String)>,
        cancel: CancellationToken,
    ) -> Vec<(String, Detail)> {
        let requested = targets.len();
        let mut tasks = JoinSet::new();
        for (name, detail_ref) in targets {
            let fetcher = Arc::clone(&self.fetcher);
            let client = self.client.clone();
            tasks.spawn(async move {
                let result = match client.build_detail(&detail_ref) {
                    Ok(request) => fetcher
                        .fetch_bytes(request)
                        .await
                        .and_then(|bytes| decode_detail(&bytes)),
                    Err(e) => Err(e),
                };
                (name, result)
            });
        }

        let mut details = Vec::with_capacity(requested);
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!(pending = tasks.len(), "hydration cancelled");
                    tasks.abort_all();
                    break;
                }
                joined = tasks.join_next() => match joined {
                    None => break,
                    Some(Ok((name, Ok(detail)))) => details.push((name, detail)),
                    Some(Ok((name, Err(error)))) => {
                        warn!(%name, %error, "detail fetch failed, item stays unhydrated");
                    }
                    Some(Err(error)) => warn!(%error, "detail task did not complete"),
                },
            }
        }

        debug!(requested, fetched = details.len(), "hydration batch finished");
        details
    }
}

/// Apply fetched details to the store by name. Names no longer present are
/// skipped. Returns how many details were applied.
pub fn merge_details(store: &mut CollectionStore, details: Vec<(String, Detail)>) -> usize {
    let mut merged = 0;
    for (name, detail) in details {
        if store.set_detail(&name, detail) {
            merged += 1;
        }
    }
    merged
}
