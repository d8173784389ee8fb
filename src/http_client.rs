use std::env;
use std::time::Duration;

use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use reqwest::blocking::Client;
use serde::Deserialize;

const REQUEST_TIMEOUT_SECS: u64 = 10;
const DEFAULT_API_BASE: &str = "https://api.rhythmtrack.app/api/v0";

static CLIENT: OnceCell<Client> = OnceCell::new();

pub fn http_client() -> Result<&'static Client> {
    CLIENT.get_or_try_init(|| {
        Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("failed to build http client")
    })
}

/// Standard `{ success, data }` response wrapper used by every endpoint.
#[derive(Debug, Deserialize)]
pub struct ApiEnvelope<T> {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    pub data: Option<T>,
}

impl<T> ApiEnvelope<T> {
    /// `data: null` with `success: true` means "no rows", not an error.
    pub fn into_data(self) -> Result<Option<T>> {
        if !self.success {
            let msg = self.message.unwrap_or_else(|| "request rejected".to_string());
            return Err(anyhow::anyhow!(msg));
        }
        Ok(self.data)
    }
}

/// Service base URL, overridable for self-hosted deployments.
pub fn api_base() -> String {
    env::var("API_BASE_URL")
        .ok()
        .map(|v| v.trim_end_matches('/').to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| DEFAULT_API_BASE.to_string())
}
