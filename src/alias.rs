//! Song alias browsing and voting. Unlike scores, the alias list is paginated
//! and sorted server-side; the client only merges the caller's own votes into
//! the returned page.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::catalog::ChartType;
use crate::http_client::{ApiEnvelope, api_base, http_client};
use crate::state::Game;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AliasSortKey {
    Alias,
    TotalWeight,
    #[default]
    SubmitTime,
}

impl AliasSortKey {
    pub const ALL: [AliasSortKey; 3] = [
        AliasSortKey::Alias,
        AliasSortKey::TotalWeight,
        AliasSortKey::SubmitTime,
    ];

    pub fn label(self) -> &'static str {
        match self {
            AliasSortKey::Alias => "Alias",
            AliasSortKey::TotalWeight => "Weight",
            AliasSortKey::SubmitTime => "Submitted",
        }
    }

    fn as_query(self) -> &'static str {
        match self {
            AliasSortKey::Alias => "alias",
            AliasSortKey::TotalWeight => "total_weight",
            AliasSortKey::SubmitTime => "alias_id",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AliasSong {
    pub id: u32,
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AliasWeight {
    #[serde(default)]
    pub up: i32,
    #[serde(default)]
    pub down: i32,
    #[serde(default)]
    pub total: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AliasUploader {
    pub id: u32,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AliasEntry {
    pub alias_id: u64,
    pub song: AliasSong,
    pub song_type: ChartType,
    /// Level index of the chart the alias belongs to.
    pub difficulty: u32,
    pub alias: String,
    #[serde(default)]
    pub approved: bool,
    #[serde(default)]
    pub weight: AliasWeight,
    pub uploader: AliasUploader,
    #[serde(default)]
    pub upload_time: String,
    /// Merged client-side from the caller's vote list.
    #[serde(skip)]
    pub vote: Option<UserVote>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct UserVote {
    pub alias_id: u64,
    #[serde(default)]
    pub vote_id: Option<u64>,
    pub weight: i32,
}

#[derive(Debug, Clone, Default)]
pub struct AliasPage {
    pub page_count: usize,
    pub aliases: Vec<AliasEntry>,
}

pub fn fetch_alias_page(
    game: Game,
    token: Option<&str>,
    page: usize,
    sort: AliasSortKey,
    descending: bool,
    only_not_approved: bool,
    song_id: Option<u32>,
) -> Result<AliasPage> {
    let client = http_client()?;
    let mut url = format!(
        "{}/{}/alias/list?page={}&sort={}&order={}&only_not_approved={}",
        api_base(),
        game.api_slug(),
        page,
        sort.as_query(),
        if descending { "desc" } else { "asc" },
        only_not_approved
    );
    if let Some(song_id) = song_id.filter(|id| *id > 0) {
        url.push_str(&format!("&song_id={song_id}"));
    }
    let mut req = client.get(&url);
    if let Some(token) = token {
        req = req.header(reqwest::header::AUTHORIZATION, token);
    }
    let resp = req.send().context("request failed")?;
    let status = resp.status();
    let body = resp.text().context("failed reading body")?;
    if !status.is_success() {
        return Err(anyhow::anyhow!("http {}: {}", status, body));
    }
    parse_alias_page_json(&body)
}

pub fn fetch_user_votes(game: Game, token: Option<&str>) -> Result<Vec<UserVote>> {
    let client = http_client()?;
    let url = format!("{}/user/{}/alias/votes", api_base(), game.api_slug());
    let mut req = client.get(&url);
    if let Some(token) = token {
        req = req.header(reqwest::header::AUTHORIZATION, token);
    }
    let resp = req.send().context("request failed")?;
    let status = resp.status();
    let body = resp.text().context("failed reading body")?;
    if !status.is_success() {
        return Err(anyhow::anyhow!("http {}: {}", status, body));
    }
    parse_votes_json(&body)
}

pub fn post_alias_vote(game: Game, token: Option<&str>, alias_id: u64, weight: i32) -> Result<()> {
    let client = http_client()?;
    let url = format!(
        "{}/user/{}/alias/{}/vote",
        api_base(),
        game.api_slug(),
        alias_id
    );
    let mut req = client.post(&url).json(&serde_json::json!({ "weight": weight }));
    if let Some(token) = token {
        req = req.header(reqwest::header::AUTHORIZATION, token);
    }
    let resp = req.send().context("request failed")?;
    let status = resp.status();
    let body = resp.text().context("failed reading body")?;
    if !status.is_success() {
        return Err(anyhow::anyhow!("http {}: {}", status, body));
    }
    let envelope: ApiEnvelope<serde_json::Value> =
        serde_json::from_str(&body).context("invalid vote response json")?;
    envelope.into_data()?;
    Ok(())
}

#[derive(Debug, Deserialize)]
struct AliasPagePayload {
    #[serde(default)]
    page_count: usize,
    #[serde(default)]
    aliases: Vec<AliasEntry>,
}

pub fn parse_alias_page_json(raw: &str) -> Result<AliasPage> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(AliasPage::default());
    }
    let envelope: ApiEnvelope<AliasPagePayload> =
        serde_json::from_str(trimmed).context("invalid alias json")?;
    let Some(payload) = envelope.into_data()? else {
        return Ok(AliasPage::default());
    };
    Ok(AliasPage {
        page_count: payload.page_count,
        aliases: payload.aliases,
    })
}

pub fn parse_votes_json(raw: &str) -> Result<Vec<UserVote>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Vec::new());
    }
    let envelope: ApiEnvelope<Vec<UserVote>> =
        serde_json::from_str(trimmed).context("invalid votes json")?;
    Ok(envelope.into_data()?.unwrap_or_default())
}

/// Attach the caller's own vote to each alias entry on the current page.
pub fn merge_votes(aliases: &mut [AliasEntry], votes: &[UserVote]) {
    for alias in aliases.iter_mut() {
        alias.vote = votes.iter().find(|v| v.alias_id == alias.alias_id).copied();
    }
}
