//! Domain types for the Pokédex pipeline.
//!
//! # Design
//! These are the shapes the rest of the crate works with. They are decoupled
//! from the PokéAPI wire format, which lives in `decode` and is mapped into
//! these types once at the boundary. The mock-server crate defines its own
//! wire DTOs; integration tests catch any drift between the two.

use serde::Serialize;

/// One entry of a list page. Identity key is `name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListItem {
    pub name: String,
    /// URI of the detail record, followed verbatim during hydration.
    pub detail_ref: String,
    /// Set by the hydrator once the detail record has been fetched.
    pub detail: Option<Detail>,
}

impl ListItem {
    pub fn new(name: impl Into<String>, detail_ref: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            detail_ref: detail_ref.into(),
            detail: None,
        }
    }
}

/// Detail record of a single Pokémon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Detail {
    pub id: i64,
    pub name: String,
    pub images: ImageUris,
    /// Types in slot order as returned by the API.
    pub categories: Vec<Category>,
}

impl Detail {
    pub fn default_image_url(&self) -> Option<&str> {
        self.images.default.as_deref()
    }

    pub fn official_artwork_image_url(&self) -> Option<&str> {
        self.images.artwork.as_deref()
    }

    pub fn home_image_url(&self) -> Option<&str> {
        self.images.home.as_deref()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImageUris {
    pub default: Option<String>,
    pub artwork: Option<String>,
    pub home: Option<String>,
}

/// A Pokémon type and its slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    pub rank: i64,
    pub name: String,
    pub reference: Option<String>,
}

/// One decoded list page. `next_cursor == None` marks the end of pagination.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageEnvelope {
    pub total_count: Option<u64>,
    pub next_cursor: Option<String>,
    pub previous_cursor: Option<String>,
    pub items: Option<Vec<ListItem>>,
}

impl PageEnvelope {
    /// Envelope holding one already-hydrated item and no cursors, used when a
    /// search result replaces the collection.
    pub fn single(item: ListItem) -> Self {
        Self {
            total_count: None,
            next_cursor: None,
            previous_cursor: None,
            items: Some(vec![item]),
        }
    }

    pub fn item_count(&self) -> usize {
        self.items.as_ref().map_or(0, Vec::len)
    }
}
