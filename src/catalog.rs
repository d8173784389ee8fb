use std::collections::HashMap;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::http_cache::fetch_json_cached;
use crate::http_client::{api_base, http_client};
use crate::state::Game;

/// Scoring mode a song can be charted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ChartType {
    #[serde(rename = "standard")]
    Standard,
    #[serde(rename = "dx")]
    Dx,
}

impl ChartType {
    pub const ALL: [ChartType; 2] = [ChartType::Standard, ChartType::Dx];

    pub fn as_str(self) -> &'static str {
        match self {
            ChartType::Standard => "standard",
            ChartType::Dx => "dx",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ChartType::Standard => "STD",
            ChartType::Dx => "DX",
        }
    }
}

/// One playable difficulty of a song within a chart type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chart {
    pub level: String,
    pub level_value: f64,
    /// Release epoch of the chart, e.g. 24000 for the 24xxx version window.
    pub version: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Difficulties {
    #[serde(default)]
    pub standard: Vec<Chart>,
    #[serde(default)]
    pub dx: Vec<Chart>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Song {
    pub id: u32,
    pub title: String,
    #[serde(default)]
    pub genre: String,
    #[serde(default)]
    pub difficulties: Difficulties,
}

impl Song {
    pub fn charts(&self, chart_type: ChartType) -> &[Chart] {
        match chart_type {
            ChartType::Standard => &self.difficulties.standard,
            ChartType::Dx => &self.difficulties.dx,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenreEntry {
    pub genre: String,
    pub title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionEntry {
    pub version: u32,
    pub title: String,
}

/// The full song catalog for one game, immutable once fetched.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub songs: Vec<Song>,
    pub genres: Vec<GenreEntry>,
    pub versions: Vec<VersionEntry>,
    by_id: HashMap<u32, usize>,
}

impl Catalog {
    pub fn new(songs: Vec<Song>, genres: Vec<GenreEntry>, versions: Vec<VersionEntry>) -> Self {
        let by_id = songs
            .iter()
            .enumerate()
            .map(|(idx, song)| (song.id, idx))
            .collect();
        Self {
            songs,
            genres,
            versions,
            by_id,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }

    pub fn find_song(&self, id: u32) -> Option<&Song> {
        self.by_id.get(&id).map(|idx| &self.songs[*idx])
    }

    pub fn chart(&self, song_id: u32, chart_type: ChartType, level_index: u32) -> Option<&Chart> {
        self.find_song(song_id)?
            .charts(chart_type)
            .get(level_index as usize)
    }

    /// Longest difficulty list in the catalog; games differ in how many
    /// tiers a chart type carries.
    pub fn tier_count(&self) -> usize {
        self.songs
            .iter()
            .flat_map(|song| ChartType::ALL.into_iter().map(|t| song.charts(t).len()))
            .max()
            .unwrap_or(0)
    }
}

pub fn fetch_catalog(game: Game) -> Result<Catalog> {
    let client = http_client()?;
    let url = format!("{}/{}/song/list", api_base(), game.api_slug());
    let body = fetch_json_cached(client, &url, None).context("request failed")?;
    parse_catalog_json(&body)
}

#[derive(Debug, Deserialize)]
struct CatalogPayload {
    #[serde(default)]
    songs: Vec<Song>,
    #[serde(default)]
    genres: Vec<GenreEntry>,
    #[serde(default)]
    versions: Vec<VersionEntry>,
}

pub fn parse_catalog_json(raw: &str) -> Result<Catalog> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Catalog::default());
    }
    let envelope: crate::http_client::ApiEnvelope<CatalogPayload> =
        serde_json::from_str(trimmed).context("invalid catalog json")?;
    let Some(payload) = envelope.into_data()? else {
        return Ok(Catalog::default());
    };
    Ok(Catalog::new(payload.songs, payload.genres, payload.versions))
}
