//! PokéAPI wire format and its mapping into domain types.
//!
//! Only `name`/`url` of list entries and `id`/`name`/`types` of a detail are
//! required. Every other field may be missing or null, and unknown fields are
//! ignored.

use serde::Deserialize;

use crate::error::ApiError;
use crate::types::{Category, Detail, ImageUris, ListItem, PageEnvelope};

#[derive(Deserialize)]
struct WirePage {
    #[serde(default)]
    count: Option<u64>,
    #[serde(default)]
    next: Option<String>,
    #[serde(default)]
    previous: Option<String>,
    #[serde(default)]
    results: Option<Vec<WireListItem>>,
}

#[derive(Deserialize)]
struct WireListItem {
    name: String,
    url: String,
}

#[derive(Deserialize)]
struct WireDetail {
    id: i64,
    name: String,
    #[serde(default)]
    sprites: Option<WireSprites>,
    types: Vec<WireTypeSlot>,
}

#[derive(Deserialize)]
struct WireSprites {
    #[serde(default)]
    front_default: Option<String>,
    #[serde(default)]
    other: Option<WireOtherSprites>,
}

#[derive(Deserialize)]
struct WireOtherSprites {
    #[serde(default)]
    home: Option<WireSprite>,
    #[serde(default, rename = "official-artwork")]
    official_artwork: Option<WireSprite>,
}

#[derive(Deserialize)]
struct WireSprite {
    #[serde(default)]
    front_default: Option<String>,
}

#[derive(Deserialize)]
struct WireTypeSlot {
    slot: i64,
    #[serde(rename = "type")]
    kind: WireNamedResource,
}

#[derive(Deserialize)]
struct WireNamedResource {
    name: String,
    #[serde(default)]
    url: Option<String>,
}

/// Decode a list page payload.
pub fn decode_page(bytes: &[u8]) -> Result<PageEnvelope, ApiError> {
    let page: WirePage = serde_json::from_slice(bytes)?;
    Ok(PageEnvelope {
        total_count: page.count,
        next_cursor: page.next,
        previous_cursor: page.previous,
        items: page.results.map(|results| {
            results
                .into_iter()
                .map(|r| ListItem::new(r.name, r.url))
                .collect()
        }),
    })
}

/// Decode a single-Pokémon detail payload.
pub fn decode_detail(bytes: &[u8]) -> Result<Detail, ApiError> {
    let detail: WireDetail = serde_json::from_slice(bytes)?;

    let images = detail.sprites.map_or_else(ImageUris::default, |sprites| {
        let other = sprites.other;
        let artwork = other
            .as_ref()
            .and_then(|o| o.official_artwork.as_ref())
            .and_then(|s| s.front_default.clone());
        let home = other
            .as_ref()
            .and_then(|o| o.home.as_ref())
            .and_then(|s| s.front_default.clone());
        ImageUris {
            default: sprites.front_default,
            artwork,
            home,
        }
    });

    Ok(Detail {
        id: detail.id,
        name: detail.name,
        images,
        categories: detail
            .types
            .into_iter()
            .map(|t| Category {
                rank: t.slot,
                name: t.kind.name,
                reference: t.kind.url,
            })
            .collect(),
    })
}
