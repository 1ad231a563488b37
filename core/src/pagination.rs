//! Single-flight and generation bookkeeping for page loads.
//!
//! `PaginationState` is a plain state machine owned by the session task:
//! - a first-page load and a search both replace the collection; only the
//!   most recently started one may apply its result;
//! - a replacing load that succeeds starts a new generation and cancels the
//!   token handed to older work. A replacing load that fails changes nothing;
//! - at most one next-page load is in flight, tagged with the generation that
//!   started it;
//! - a completion is applied only if its generation is still current.

use tokio_util::sync::CancellationToken;

use crate::error::ApiError;
use crate::store::CollectionStore;

/// Which list operation produced a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    First,
    Next,
}

/// Handle for one started operation.
#[derive(Debug, Clone)]
pub struct Ticket {
    pub generation: u64,
    pub cancel: CancellationToken,
}

/// Handle for one started first-page load or search.
#[derive(Debug, Clone)]
pub struct ReplaceTicket {
    pub generation: u64,
    pub seq: u64,
    pub cancel: CancellationToken,
}

#[derive(Debug, Default)]
pub struct PaginationState {
    generation: u64,
    next_in_flight: Option<u64>,
    cancel: CancellationToken,
    replace_seq: u64,
    replace_cancel: CancellationToken,
}

impl PaginationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn fetch_in_flight(&self) -> bool {
        self.next_in_flight.is_some()
    }

    /// Start a first-page load. Always allowed. Older work keeps running until
    /// the load is committed.
    pub fn begin_first(&mut self) -> ReplaceTicket {
        self.begin_replace()
    }

    /// Start a next-page load from the store's cursor.
    pub fn begin_next(&mut self, store: &CollectionStore) -> Result<(Ticket, String), ApiError> {
        if self.next_in_flight.is_some() {
            return Err(ApiError::AlreadyFetching);
        }
        let cursor = store.next_cursor().ok_or(ApiError::NoMorePages)?;
        self.next_in_flight = Some(self.generation);
        Ok((self.ticket(), cursor.to_string()))
    }

    /// Start a search. Does not touch the single-flight flag or the
    /// generation.
    pub fn begin_search(&mut self) -> ReplaceTicket {
        self.begin_replace()
    }

    pub fn is_current(&self, generation: u64) -> bool {
        generation == self.generation
    }

    /// Whether a replacing load may still apply its result.
    pub fn is_current_replace(&self, ticket: &ReplaceTicket) -> bool {
        self.is_current(ticket.generation) && ticket.seq == self.replace_seq
    }

    /// Make a successful replacing load the newest state of the collection.
    /// Cancels and invalidates all older work, including an in-flight next
    /// page. Returns the ticket for follow-up work such as hydration.
    pub fn commit_replace(&mut self) -> Ticket {
        self.advance();
        self.ticket()
    }

    /// Clear the single-flight flag if `generation`'s next-page load holds it.
    pub fn finish_next(&mut self, generation: u64) {
        if self.next_in_flight == Some(generation) {
            self.next_in_flight = None;
        }
    }

    /// Cancel everything outstanding. Used at shutdown.
    pub fn cancel_all(&self) {
        self.cancel.cancel();
    }

    // An older first-page load or search still outstanding is cancelled.
    fn begin_replace(&mut self) -> ReplaceTicket {
        self.replace_cancel.cancel();
        self.replace_cancel = self.cancel.child_token();
        self.replace_seq += 1;
        ReplaceTicket {
            generation: self.generation,
            seq: self.replace_seq,
            cancel: self.replace_cancel.clone(),
        }
    }

    fn advance(&mut self) {
        self.cancel.cancel();
        self.cancel = CancellationToken::new();
        self.generation += 1;
        self.next_in_flight = None;
    }

    fn ticket(&self) -> Ticket {
        Ticket {
            generation: self.generation,
            cancel: self.cancel.child_token(),
        }
    }
}
