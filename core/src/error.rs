//! Error types for the Pokédex pipeline.
//!
//! # Design
//! `NotFound` keeps a dedicated variant because search distinguishes "no such
//! Pokémon" from "the server returned an unexpected status." Other non-2xx
//! responses land in `HttpError` with the raw status code and body for
//! debugging. `AlreadyFetching` and `Superseded` are control-flow outcomes of
//! the single-flight and generation rules; the presentation layer treats them
//! as silent (see [`ApiError::alert`]).

use thiserror::Error;

/// Errors returned by the fetcher, decoder and session operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Reachability check failed, or the host could not be resolved/connected.
    #[error("no internet connection")]
    NoConnectivity,

    /// The request did not complete within the configured timeout.
    #[error("request timed out")]
    Timeout,

    /// The request URI could not be built or was rejected by the transport.
    #[error("invalid URI: {0}")]
    InvalidUri(String),

    /// The server answered with a success status but no body.
    #[error("response body was empty")]
    EmptyBody,

    /// The response body could not be deserialized into the expected shape.
    #[error("decode failed: {0}")]
    Decode(String),

    /// The server returned a non-2xx status other than 404.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// Any other transport-level failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// A next-page load is already in flight.
    #[error("a page load is already in flight")]
    AlreadyFetching,

    /// The collection has no continuation cursor.
    #[error("no more pages")]
    NoMorePages,

    /// The server returned 404, or search produced no result.
    #[error("resource not found")]
    NotFound,

    /// Search was called with an empty query.
    #[error("search query is empty")]
    InvalidQuery,

    /// A newer first-page load or search replaced the collection before this
    /// operation completed; its result was discarded.
    #[error("operation superseded by a newer load")]
    Superseded,

    /// The session owner task is gone.
    #[error("session closed")]
    SessionClosed,
}

/// User-facing alert a presentation layer shows for a failed operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alert {
    NoInternetConnection,
    ItemNotFound,
    Generic,
}

impl Alert {
    pub fn title(&self) -> &'static str {
        match self {
            Alert::NoInternetConnection => "No Internet Connection",
            Alert::ItemNotFound => "Item not found",
            Alert::Generic => "Error",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Alert::NoInternetConnection => "Please check your internet connection and try again.",
            Alert::ItemNotFound => {
                "There is no Pokemon with this name. Check that you have written the name correctly."
            }
            Alert::Generic => "An error occurred. Check your internet connection and try again.",
        }
    }
}

impl ApiError {
    /// Map an error to the alert the user should see, or `None` when the
    /// outcome is silent (debounced scroll loads, superseded loads).
    pub fn alert(&self) -> Option<Alert> {
        match self {
            ApiError::AlreadyFetching | ApiError::Superseded => None,
            ApiError::NoConnectivity => Some(Alert::NoInternetConnection),
            ApiError::NotFound | ApiError::InvalidQuery => Some(Alert::ItemNotFound),
            _ => Some(Alert::Generic),
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::Decode(e.to_string())
    }
}
