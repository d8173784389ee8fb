use std::cmp::Ordering;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::catalog::ChartType;
use crate::http_client::{ApiEnvelope, api_base, http_client};
use crate::state::Game;

/// Achievement value carried by synthesized unplayed placeholders.
pub const UNPLAYED: f64 = -1.0;

/// One uploaded result for a (song, chart type, level index) triple.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreRecord {
    #[serde(rename = "id")]
    pub song_id: u32,
    pub song_name: String,
    #[serde(default)]
    pub level: String,
    pub level_index: u32,
    pub achievements: f64,
    #[serde(default)]
    pub fc: String,
    #[serde(default)]
    pub fs: String,
    #[serde(default)]
    pub dx_score: i64,
    #[serde(rename = "dx_rating", default)]
    pub rating: f64,
    #[serde(default)]
    pub rate: String,
    #[serde(rename = "type")]
    pub chart_type: ChartType,
    #[serde(default)]
    pub upload_time: String,
    #[serde(default)]
    pub play_time: Option<String>,
}

impl ScoreRecord {
    /// Unique per user per game; also the deterministic sort tie-break.
    pub fn key(&self) -> (u32, ChartType, u32) {
        (self.song_id, self.chart_type, self.level_index)
    }

    pub fn is_unplayed(&self) -> bool {
        self.achievements == UNPLAYED
    }
}

pub fn fetch_player_scores(game: Game, token: Option<&str>) -> Result<Vec<ScoreRecord>> {
    let client = http_client()?;
    let url = format!("{}/user/{}/player/scores", api_base(), game.api_slug());
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
    parse_scores_json(&body)
}

pub fn fetch_score_history(
    game: Game,
    token: Option<&str>,
    song_id: u32,
    chart_type: ChartType,
    level_index: u32,
) -> Result<Vec<ScoreRecord>> {
    let client = http_client()?;
    let url = format!(
        "{}/user/{}/player/score/history?song_id={}&song_type={}&level_index={}",
        api_base(),
        game.api_slug(),
        song_id,
        chart_type.as_str(),
        level_index
    );
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
    let mut history = parse_scores_json(&body)?;
    sort_history(&mut history);
    Ok(history)
}

pub fn parse_scores_json(raw: &str) -> Result<Vec<ScoreRecord>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Vec::new());
    }
    let envelope: ApiEnvelope<Vec<ScoreRecord>> =
        serde_json::from_str(trimmed).context("invalid scores json")?;
    Ok(envelope.into_data()?.unwrap_or_default())
}

/// Oldest upload first; equal upload timestamps fall back to play time.
pub fn sort_history(history: &mut [ScoreRecord]) {
    history.sort_by(|a, b| {
        let upload = a.upload_time.cmp(&b.upload_time);
        if upload != Ordering::Equal {
            return upload;
        }
        match (a.play_time.as_ref(), b.play_time.as_ref()) {
            (Some(a_play), Some(b_play)) => a_play.cmp(b_play),
            _ => Ordering::Equal,
        }
    });
}
