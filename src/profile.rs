use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::http_client::{ApiEnvelope, api_base, http_client};

/// Link between the tracker account and one in-game account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameBinding {
    pub game: String,
    #[serde(default)]
    pub player_name: String,
    #[serde(default)]
    pub friend_code: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub binds: Vec<GameBinding>,
}

pub fn fetch_profile(token: Option<&str>) -> Result<Option<Profile>> {
    let client = http_client()?;
    let url = format!("{}/user/profile", api_base());
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
    parse_profile_json(&body)
}

pub fn parse_profile_json(raw: &str) -> Result<Option<Profile>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(None);
    }
    let envelope: ApiEnvelope<Profile> =
        serde_json::from_str(trimmed).context("invalid profile json")?;
    envelope.into_data()
}
