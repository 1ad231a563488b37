//! Accumulated collection of list items plus pagination cursors.
//!
//! # Design
//! Items are kept in API order in a `Vec`, with a `name → positions` index so
//! hydration results merge in O(1). The store is not synchronized: the
//! session owner task is its only writer and readers receive a cloned
//! [`CollectionSnapshot`].
//!
//! `append` does not de-duplicate. If the API ever repeats a name across
//! pages both entries stay in the collection and `set_detail` updates both;
//! the store only logs the collision.

use std::collections::HashMap;
use std::ops::Range;

use serde::Serialize;
use tracing::warn;

use crate::types::{Detail, ListItem, PageEnvelope};

#[derive(Debug, Default)]
pub struct CollectionStore {
    total_count: Option<u64>,
    next_cursor: Option<String>,
    previous_cursor: Option<String>,
    items: Vec<ListItem>,
    index: HashMap<String, Vec<usize>>,
}

/// Read-only copy of the collection handed to the presentation layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CollectionSnapshot {
    pub total_count: Option<u64>,
    pub next_cursor: Option<String>,
    pub previous_cursor: Option<String>,
    pub items: Vec<ListItem>,
}

impl CollectionSnapshot {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&ListItem> {
        self.items.iter().find(|item| item.name == name)
    }

    pub fn hydrated_count(&self) -> usize {
        self.items.iter().filter(|item| item.detail.is_some()).count()
    }
}

impl CollectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace all state with `envelope`.
    pub fn reset(&mut self, envelope: PageEnvelope) {
        self.items.clear();
        self.index.clear();
        self.append(envelope);
    }

    /// Take the envelope's cursors and count, and append its items.
    /// Returns the positions of the appended items.
    pub fn append(&mut self, envelope: PageEnvelope) -> Range<usize> {
        self.total_count = envelope.total_count;
        self.next_cursor = envelope.next_cursor;
        self.previous_cursor = envelope.previous_cursor;

        let start = self.items.len();
        for item in envelope.items.unwrap_or_default() {
            let positions = self.index.entry(item.name.clone()).or_default();
            if !positions.is_empty() {
                warn!(name = %item.name, "duplicate name in collection, keeping both entries");
            }
            positions.push(self.items.len());
            self.items.push(item);
        }
        start..self.items.len()
    }

    /// Attach `detail` to every item named `name`. Returns false when no such
    /// item exists.
    pub fn set_detail(&mut self, name: &str, detail: Detail) -> bool {
        let Some(positions) = self.index.get(name) else {
            return false;
        };
        for &pos in positions {
            self.items[pos].detail = Some(detail.clone());
        }
        true
    }

    pub fn get(&self, name: &str) -> Option<&ListItem> {
        self.index
            .get(name)
            .and_then(|positions| positions.first())
            .map(|&pos| &self.items[pos])
    }

    pub fn items(&self) -> &[ListItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of items that already carry a detail.
    pub fn hydrated_count(&self) -> usize {
        self.items.iter().filter(|item| item.detail.is_some()).count()
    }

    pub fn total_count(&self) -> Option<u64> {
        self.total_count
    }

    pub fn next_cursor(&self) -> Option<&str> {
        self.next_cursor.as_deref()
    }

    pub fn previous_cursor(&self) -> Option<&str> {
        self.previous_cursor.as_deref()
    }

    /// `(name, detail_ref)` of items in `range` that still lack a detail.
    pub fn pending_details(&self, range: Range<usize>) -> Vec<(String, String)> {
        self.items
            .get(range)
            .unwrap_or_default()
            .iter()
            .filter(|item| item.detail.is_none())
            .map(|item| (item.name.clone(), item.detail_ref.clone()))
            .collect()
    }

    pub fn snapshot(&self) -> CollectionSnapshot {
        CollectionSnapshot {
            total_count: self.total_count,
            next_cursor: self.next_cursor.clone(),
            previous_cursor: self.previous_cursor.clone(),
            items: self.items.clone(),
        }
    }
}
