//! Fetch, pagination and detail-hydration pipeline for the PokéAPI.
//!
//! # Overview
//! A [`Session`] pages through `GET <base>/pokemon/`, merges pages into one
//! ordered collection, fetches each item's detail record concurrently and
//! answers name lookups. Results are delivered as `Result<(), ApiError>` and
//! the collection is read through snapshots.
//!
//! # Design
//! - `PokedexClient` is stateless: `build_*` produces an `HttpRequest`,
//!   `parse_*` consumes an `HttpResponse`, so hosts can do their own I/O.
//! - `Fetcher` adds the connectivity precondition and runs one round trip
//!   through a `Transport` (ureq in production).
//! - The session owner task is the only writer of the `CollectionStore`;
//!   network work fans out into tokio tasks and fans back in as events.
//! - `ApiError::alert` maps failures to the alert a UI should show.

pub mod client;
pub mod config;
pub mod decode;
pub mod error;
pub mod fetcher;
pub mod http;
pub mod hydrate;
pub mod logging;
pub mod pagination;
pub mod reachability;
pub mod search;
pub mod session;
pub mod store;
pub mod transport;
pub mod types;

pub use client::PokedexClient;
pub use config::Config;
pub use error::{Alert, ApiError};
pub use http::{HttpRequest, HttpResponse, Transport};
pub use reachability::{HostReachability, Reachability, StaticReachability};
pub use session::Session;
pub use store::{CollectionSnapshot, CollectionStore};
pub use transport::UreqTransport;
pub use types::{Category, Detail, ImageUris, ListItem, PageEnvelope};
