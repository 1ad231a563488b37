use std::{
    collections::HashSet,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

const SPRITES: &str = "https://raw.githubusercontent.com/PokeAPI/sprites/master/sprites/pokemon";

/// The first 60 National Dex entries and their types.
pub const SPECIES: &[(&str, &[&str])] = &[
    ("bulbasaur", &["grass", "poison"]),
    ("ivysaur", &["grass", "poison"]),
    ("venusaur", &["grass", "poison"]),
    ("charmander", &["fire"]),
    ("charmeleon", &["fire"]),
    ("charizard", &["fire", "flying"]),
    ("squirtle", &["water"]),
    ("wartortle", &["water"]),
    ("blastoise", &["water"]),
    ("caterpie", &["bug"]),
    ("metapod", &["bug"]),
    ("butterfree", &["bug", "flying"]),
    ("weedle", &["bug", "poison"]),
    ("kakuna", &["bug", "poison"]),
    ("beedrill", &["bug", "poison"]),
    ("pidgey", &["normal", "flying"]),
    ("pidgeotto", &["normal", "flying"]),
    ("pidgeot", &["normal", "flying"]),
    ("rattata", &["normal"]),
    ("raticate", &["normal"]),
    ("spearow", &["normal", "flying"]),
    ("fearow", &["normal", "flying"]),
    ("ekans", &["poison"]),
    ("arbok", &["poison"]),
    ("pikachu", &["electric"]),
    ("raichu", &["electric"]),
    ("sandshrew", &["ground"]),
    ("sandslash", &["ground"]),
    ("nidoran-f", &["poison"]),
    ("nidorina", &["poison"]),
    ("nidoqueen", &["poison", "ground"]),
    ("nidoran-m", &["poison"]),
    ("nidorino", &["poison"]),
    ("nidoking", &["poison", "ground"]),
    ("clefairy", &["fairy"]),
    ("clefable", &["fairy"]),
    ("vulpix", &["fire"]),
    ("ninetales", &["fire"]),
    ("jigglypuff", &["normal", "fairy"]),
    ("wigglytuff", &["normal", "fairy"]),
    ("zubat", &["poison", "flying"]),
    ("golbat", &["poison", "flying"]),
    ("oddish", &["grass", "poison"]),
    ("gloom", &["grass", "poison"]),
    ("vileplume", &["grass", "poison"]),
    ("paras", &["bug", "grass"]),
    ("parasect", &["bug", "grass"]),
    ("venonat", &["bug", "poison"]),
    ("venomoth", &["bug", "poison"]),
    ("diglett", &["ground"]),
    ("dugtrio", &["ground"]),
    ("meowth", &["normal"]),
    ("persian", &["normal"]),
    ("psyduck", &["water"]),
    ("golduck", &["water"]),
    ("mankey", &["fighting"]),
    ("primeape", &["fighting"]),
    ("growlithe", &["fire"]),
    ("arcanine", &["fire"]),
    ("poliwag", &["water"]),
];

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NamedResource {
    pub name: String,
    pub url: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PageResponse {
    pub count: usize,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<NamedResource>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Sprite {
    pub front_default: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OtherSprites {
    pub home: Sprite,
    #[serde(rename = "official-artwork")]
    pub official_artwork: Sprite,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Sprites {
    pub front_default: Option<String>,
    pub other: OtherSprites,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TypeSlot {
    pub slot: u32,
    #[serde(rename = "type")]
    pub kind: NamedResource,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PokemonResponse {
    pub id: u32,
    pub name: String,
    pub base_experience: u32,
    pub sprites: Sprites,
    pub types: Vec<TypeSlot>,
}

#[derive(Deserialize)]
pub struct ListParams {
    pub offset: Option<usize>,
    pub limit: Option<usize>,
}

/// Shape and fault injection of the served dex.
#[derive(Clone, Debug)]
pub struct DexConfig {
    /// Number of species served, capped at `SPECIES.len()`.
    pub size: usize,
    pub page_size: usize,
    /// Names whose detail endpoint answers 500.
    pub failing_details: HashSet<String>,
    /// Delay before answering continuation pages (`offset > 0`).
    pub page_delay: Duration,
    pub detail_delay: Duration,
}

impl Default for DexConfig {
    fn default() -> Self {
        Self {
            size: SPECIES.len(),
            page_size: 20,
            failing_details: HashSet::new(),
            page_delay: Duration::ZERO,
            detail_delay: Duration::ZERO,
        }
    }
}

/// Request counters, readable while the server runs.
#[derive(Debug, Default)]
pub struct Stats {
    list_requests: AtomicUsize,
    detail_requests: AtomicUsize,
}

impl Stats {
    pub fn list_requests(&self) -> usize {
        self.list_requests.load(Ordering::SeqCst)
    }

    pub fn detail_requests(&self) -> usize {
        self.detail_requests.load(Ordering::SeqCst)
    }
}

struct Dex {
    config: DexConfig,
    stats: Arc<Stats>,
}

type SharedDex = Arc<Dex>;

pub fn app() -> Router {
    app_with(DexConfig::default(), Arc::new(Stats::default()))
}

pub fn app_with(config: DexConfig, stats: Arc<Stats>) -> Router {
    let dex: SharedDex = Arc::new(Dex { config, stats });
    Router::new()
        .route("/api/v2/pokemon", get(list_pokemon))
        .route("/api/v2/pokemon/", get(list_pokemon))
        .route("/api/v2/pokemon/{key}", get(get_pokemon))
        .route("/api/v2/pokemon/{key}/", get(get_pokemon))
        .with_state(dex)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    serve(listener, DexConfig::default(), Arc::new(Stats::default())).await
}

pub async fn serve(
    listener: TcpListener,
    config: DexConfig,
    stats: Arc<Stats>,
) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with(config, stats)).await
}

impl Dex {
    fn size(&self) -> usize {
        self.config.size.min(SPECIES.len())
    }
}

fn origin(headers: &HeaderMap) -> String {
    let host = headers
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("localhost");
    format!("http://{host}")
}

fn pokemon(origin: &str, index: usize) -> PokemonResponse {
    let (name, types) = SPECIES[index];
    let id = index as u32 + 1;
    PokemonResponse {
        id,
        name: name.to_string(),
        base_experience: 64,
        sprites: Sprites {
            front_default: Some(format!("{SPRITES}/{id}.png")),
            other: OtherSprites {
                home: Sprite {
                    front_default: Some(format!("{SPRITES}/other/home/{id}.png")),
                },
                official_artwork: Sprite {
                    front_default: Some(format!("{SPRITES}/other/official-artwork/{id}.png")),
                },
            },
        },
        types: types
            .iter()
            .enumerate()
            .map(|(slot, kind)| TypeSlot {
                slot: slot as u32 + 1,
                kind: NamedResource {
                    name: kind.to_string(),
                    url: format!("{origin}/api/v2/type/{kind}/"),
                },
            })
            .collect(),
    }
}

async fn list_pokemon(
    State(dex): State<SharedDex>,
    headers: HeaderMap,
    Query(params): Query<ListParams>,
) -> Json<PageResponse> {
    dex.stats.list_requests.fetch_add(1, Ordering::SeqCst);
    let size = dex.size();
    let offset = params.offset.unwrap_or(0).min(size);
    let limit = params.limit.unwrap_or(dex.config.page_size).max(1);
    if offset > 0 && !dex.config.page_delay.is_zero() {
        tokio::time::sleep(dex.config.page_delay).await;
    }

    let origin = origin(&headers);
    let end = offset.saturating_add(limit).min(size);
    let results = (offset..end)
        .map(|i| NamedResource {
            name: SPECIES[i].0.to_string(),
            url: format!("{origin}/api/v2/pokemon/{}/", i + 1),
        })
        .collect();
    let next = (end < size).then(|| format!("{origin}/api/v2/pokemon?offset={end}&limit={limit}"));
    let previous = (offset > 0).then(|| {
        format!(
            "{origin}/api/v2/pokemon?offset={}&limit={limit}",
            offset.saturating_sub(limit)
        )
    });

    Json(PageResponse {
        count: size,
        next,
        previous,
        results,
    })
}

async fn get_pokemon(
    State(dex): State<SharedDex>,
    headers: HeaderMap,
    Path(key): Path<String>,
) -> Result<Json<PokemonResponse>, (StatusCode, &'static str)> {
    dex.stats.detail_requests.fetch_add(1, Ordering::SeqCst);
    let size = dex.size();
    let index = match key.parse::<usize>() {
        Ok(id) if (1..=size).contains(&id) => Some(id - 1),
        Ok(_) => None,
        Err(_) => SPECIES[..size].iter().position(|(name, _)| *name == key),
    };
    let Some(index) = index else {
        return Err((StatusCode::NOT_FOUND, "Not Found"));
    };

    if !dex.config.detail_delay.is_zero() {
        tokio::time::sleep(dex.config.detail_delay).await;
    }
    if dex.config.failing_details.contains(SPECIES[index].0) {
        return Err((StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error"));
    }
    Ok(Json(pokemon(&origin(&headers), index)))
}
