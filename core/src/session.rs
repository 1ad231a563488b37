//! Session owner task: the pagination and search controllers.
//!
//! # Design
//! `Session` is a cheap, cloneable handle. All state (the `CollectionStore`
//! and the `PaginationState`) lives in a single owner task spawned on tokio,
//! which handles one message at a time:
//!
//! ```text
//! Session ──Command──▶ owner task ──spawn──▶ page / search / hydration task
//!    ▲                     │  ▲                          │
//!    └────── oneshot ──────┘  └──────── Event ───────────┘
//! ```
//!
//! Network work runs in spawned tasks and reports back as `Event`s, so the
//! owner task stays responsive (overlapping `load_next_page` calls are
//! rejected immediately) and every store mutation happens in one place
//! without a lock. Completions from superseded generations are discarded.
//!
//! A first-page load or a search replaces the collection only when it
//! succeeds. Until then, older work (such as a next page that is still
//! hydrating) keeps running, and a failed replacing load leaves it intact.
//!
//! After every mutation the owner publishes a `CollectionSnapshot` on a
//! watch channel for the presentation layer.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::client::PokedexClient;
use crate::config::Config;
use crate::decode::decode_page;
use crate::error::ApiError;
use crate::fetcher::Fetcher;
use crate::http::{HttpRequest, Transport};
use crate::hydrate::{merge_details, Hydrator};
use crate::pagination::{PageKind, PaginationState, ReplaceTicket, Ticket};
use crate::reachability::{HostReachability, Reachability};
use crate::search;
use crate::store::{CollectionSnapshot, CollectionStore};
use crate::transport::UreqTransport;
use crate::types::{Detail, PageEnvelope};

type Reply = oneshot::Sender<Result<(), ApiError>>;

enum Command {
    LoadFirstPage { reply: Reply },
    LoadNextPage { reply: Reply },
    Search { query: String, reply: Reply },
    Snapshot { reply: oneshot::Sender<CollectionSnapshot> },
}

enum Event {
    PageFetched {
        origin: PageOrigin,
        result: Result<PageEnvelope, ApiError>,
        reply: Reply,
    },
    Hydrated {
        kind: PageKind,
        generation: u64,
        details: Vec<(String, Detail)>,
        reply: Reply,
    },
    SearchFetched {
        ticket: ReplaceTicket,
        result: Result<PageEnvelope, ApiError>,
        reply: Reply,
    },
}

/// The load a fetched page belongs to.
enum PageOrigin {
    First(ReplaceTicket),
    Next(Ticket),
}

impl PageOrigin {
    fn cancel(&self) -> &CancellationToken {
        match self {
            PageOrigin::First(ticket) => &ticket.cancel,
            PageOrigin::Next(ticket) => &ticket.cancel,
        }
    }
}

/// Handle to a running session. Dropping every clone stops the owner task
/// and cancels outstanding work.
#[derive(Clone)]
pub struct Session {
    commands: mpsc::UnboundedSender<Command>,
    snapshots: watch::Receiver<CollectionSnapshot>,
}

impl Session {
    /// Spawn a session against the real API described by `config`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn connect(config: &Config) -> Self {
        let reachability = Arc::new(HostReachability::for_base_url(&config.base_url));
        Self::spawn(config, UreqTransport::new(config), reachability)
    }

    /// Spawn a session with an explicit transport and reachability check.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn<T: Transport>(
        config: &Config,
        transport: T,
        reachability: Arc<dyn Reachability>,
    ) -> Self {
        let client = PokedexClient::new(&config.base_url);
        let fetcher = Arc::new(Fetcher::new(transport, reachability));
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (snapshots_tx, snapshots_rx) = watch::channel(CollectionSnapshot::default());

        let task = SessionTask {
            hydrator: Hydrator::new(Arc::clone(&fetcher), client.clone()),
            client,
            fetcher,
            store: CollectionStore::new(),
            pagination: PaginationState::new(),
            events: events_tx,
            snapshots: snapshots_tx,
        };
        tokio::spawn(task.run(commands_rx, events_rx));

        Self {
            commands: commands_tx,
            snapshots: snapshots_rx,
        }
    }

    /// Replace the collection with the first page and hydrate it. Resolves
    /// once hydration has finished; per-item detail failures are not errors.
    pub async fn load_first_page(&self) -> Result<(), ApiError> {
        self.request(|reply| Command::LoadFirstPage { reply }).await
    }

    /// Append the page behind the stored cursor and hydrate the new items.
    ///
    /// Fails with `AlreadyFetching` while another next-page load is running
    /// and with `NoMorePages` once the cursor is exhausted.
    pub async fn load_next_page(&self) -> Result<(), ApiError> {
        self.request(|reply| Command::LoadNextPage { reply }).await
    }

    /// Replace the collection with the single Pokémon named `query`.
    pub async fn search(&self, query: &str) -> Result<(), ApiError> {
        let query = query.to_string();
        self.request(|reply| Command::Search { query, reply }).await
    }

    /// Current collection, read through the owner task.
    pub async fn snapshot(&self) -> Result<CollectionSnapshot, ApiError> {
        let (reply, rx) = oneshot::channel();
        self.commands
            .send(Command::Snapshot { reply })
            .map_err(|_| ApiError::SessionClosed)?;
        rx.await.map_err(|_| ApiError::SessionClosed)
    }

    /// Receiver that observes a new snapshot after every store mutation.
    pub fn subscribe(&self) -> watch::Receiver<CollectionSnapshot> {
        self.snapshots.clone()
    }

    async fn request(&self, command: impl FnOnce(Reply) -> Command) -> Result<(), ApiError> {
        let (reply, rx) = oneshot::channel();
        self.commands
            .send(command(reply))
            .map_err(|_| ApiError::SessionClosed)?;
        rx.await.map_err(|_| ApiError::SessionClosed)?
    }
}

struct SessionTask<T> {
    client: PokedexClient,
    fetcher: Arc<Fetcher<T>>,
    hydrator: Hydrator<T>,
    store: CollectionStore,
    pagination: PaginationState,
    events: mpsc::UnboundedSender<Event>,
    snapshots: watch::Sender<CollectionSnapshot>,
}

impl<T: Transport> SessionTask<T> {
    async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<Command>,
        mut events: mpsc::UnboundedReceiver<Event>,
    ) {
        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(command) => self.handle_command(command),
                    None => break,
                },
                Some(event) = events.recv() => self.handle_event(event),
            }
        }
        self.pagination.cancel_all();
        debug!("session closed");
    }

    fn handle_command(&mut self, command: Command) {
        match command {
            Command::LoadFirstPage { reply } => {
                let ticket = self.pagination.begin_first();
                info!(generation = ticket.generation, "loading first page");
                let request = self.client.build_list_page();
                self.spawn_page(PageOrigin::First(ticket), request, reply);
            }
            Command::LoadNextPage { reply } => {
                let (ticket, cursor) = match self.pagination.begin_next(&self.store) {
                    Ok(started) => started,
                    Err(e) => {
                        debug!(error = %e, "next page not started");
                        let _ = reply.send(Err(e));
                        return;
                    }
                };
                match self.client.build_next_page(&cursor) {
                    Ok(request) => {
                        info!(generation = ticket.generation, %cursor, "loading next page");
                        self.spawn_page(PageOrigin::Next(ticket), request, reply);
                    }
                    Err(e) => {
                        self.pagination.finish_next(ticket.generation);
                        let _ = reply.send(Err(e));
                    }
                }
            }
            Command::Search { query, reply } => {
                let request = match search::prepare(&self.client, &query) {
                    Ok(request) => request,
                    Err(e) => {
                        let _ = reply.send(Err(e));
                        return;
                    }
                };
                let ticket = self.pagination.begin_search();
                info!(%query, "searching");
                let fetcher = Arc::clone(&self.fetcher);
                let events = self.events.clone();
                tokio::spawn(async move {
                    let result = tokio::select! {
                        _ = ticket.cancel.cancelled() => Err(ApiError::Superseded),
                        result = search::lookup(fetcher.as_ref(), request) => result,
                    };
                    let _ = events.send(Event::SearchFetched { ticket, result, reply });
                });
            }
            Command::Snapshot { reply } => {
                let _ = reply.send(self.store.snapshot());
            }
        }
    }

    fn handle_event(&mut self, event: Event) {
        match event {
            Event::PageFetched {
                origin,
                result,
                reply,
            } => self.apply_page(origin, result, reply),
            Event::Hydrated {
                kind,
                generation,
                details,
                reply,
            } => {
                if kind == PageKind::Next {
                    self.pagination.finish_next(generation);
                }
                if !self.pagination.is_current(generation) {
                    debug!(generation, "discarding stale hydration");
                    let _ = reply.send(Err(ApiError::Superseded));
                    return;
                }
                let merged = merge_details(&mut self.store, details);
                self.publish();
                info!(
                    ?kind,
                    merged,
                    items = self.store.len(),
                    hydrated = self.store.hydrated_count(),
                    "page loaded"
                );
                let _ = reply.send(Ok(()));
            }
            Event::SearchFetched {
                ticket,
                result,
                reply,
            } => {
                if !self.pagination.is_current_replace(&ticket) {
                    debug!(generation = ticket.generation, "discarding stale search");
                    let _ = reply.send(Err(ApiError::Superseded));
                    return;
                }
                match result {
                    Ok(envelope) => {
                        self.pagination.commit_replace();
                        self.store.reset(envelope);
                        self.publish();
                        info!("search result applied");
                        let _ = reply.send(Ok(()));
                    }
                    Err(e) => {
                        debug!(error = %e, "search failed, collection unchanged");
                        let _ = reply.send(Err(e));
                    }
                }
            }
        }
    }

    fn apply_page(
        &mut self,
        origin: PageOrigin,
        result: Result<PageEnvelope, ApiError>,
        reply: Reply,
    ) {
        let (kind, ticket, appended) = match origin {
            PageOrigin::First(started) => {
                if !self.pagination.is_current_replace(&started) {
                    debug!(generation = started.generation, "discarding stale first page");
                    let _ = reply.send(Err(ApiError::Superseded));
                    return;
                }
                let envelope = match result {
                    Ok(envelope) => envelope,
                    Err(e) => {
                        warn!(error = %e, "first page failed, collection unchanged");
                        let _ = reply.send(Err(e));
                        return;
                    }
                };
                let ticket = self.pagination.commit_replace();
                self.store.reset(envelope);
                (PageKind::First, ticket, 0..self.store.len())
            }
            PageOrigin::Next(ticket) => {
                if !self.pagination.is_current(ticket.generation) {
                    self.pagination.finish_next(ticket.generation);
                    debug!(generation = ticket.generation, "discarding stale next page");
                    let _ = reply.send(Err(ApiError::Superseded));
                    return;
                }
                let envelope = match result {
                    Ok(envelope) => envelope,
                    Err(e) => {
                        self.pagination.finish_next(ticket.generation);
                        warn!(error = %e, "next page failed, collection unchanged");
                        let _ = reply.send(Err(e));
                        return;
                    }
                };
                let appended = self.store.append(envelope);
                (PageKind::Next, ticket, appended)
            }
        };
        self.publish();

        let targets = self.store.pending_details(appended);
        debug!(?kind, count = targets.len(), "hydrating");
        let hydrator = self.hydrator.clone();
        let events = self.events.clone();
        tokio::spawn(async move {
            let details = hydrator.fetch(targets, ticket.cancel).await;
            let _ = events.send(Event::Hydrated {
                kind,
                generation: ticket.generation,
                details,
                reply,
            });
        });
    }

    fn spawn_page(&self, origin: PageOrigin, request: HttpRequest, reply: Reply) {
        let fetcher = Arc::clone(&self.fetcher);
        let events = self.events.clone();
        tokio::spawn(async move {
            let result = tokio::select! {
                _ = origin.cancel().cancelled() => Err(ApiError::Superseded),
                result = fetch_page(fetcher.as_ref(), request) => result,
            };
            let _ = events.send(Event::PageFetched {
                origin,
                result,
                reply,
            });
        });
    }

    fn publish(&self) {
        self.snapshots.send_replace(self.store.snapshot());
    }
}

async fn fetch_page<T: Transport>(
    fetcher: &Fetcher<T>,
    request: HttpRequest,
) -> Result<PageEnvelope, ApiError> {
    let bytes = fetcher.fetch_bytes(request).await?;
    decode_page(&bytes)
}
