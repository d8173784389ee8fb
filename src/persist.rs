//! Preference persistence: the selected game and the API token, stored as a
//! small versioned JSON file. Nothing else survives a session; catalogs and
//! scores are refetched (through the conditional-GET cache) on startup.

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::state::Game;

const PREFS_VERSION: u32 = 1;
const PREFS_DIR: &str = "score_terminal";
const PREFS_FILE: &str = "prefs.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prefs {
    pub version: u32,
    pub game: Game,
    #[serde(default)]
    pub token: Option<String>,
}

impl Default for Prefs {
    fn default() -> Self {
        Self {
            version: PREFS_VERSION,
            game: Game::Deluxe,
            token: None,
        }
    }
}

pub fn load_prefs() -> Prefs {
    let Some(path) = prefs_path() else {
        return Prefs::default();
    };
    let Ok(raw) = fs::read_to_string(&path) else {
        return Prefs::default();
    };
    let Ok(prefs) = serde_json::from_str::<Prefs>(&raw) else {
        return Prefs::default();
    };
    if prefs.version != PREFS_VERSION {
        return Prefs::default();
    }
    prefs
}

pub fn save_prefs(prefs: &Prefs) {
    let Some(path) = prefs_path() else {
        return;
    };
    let Some(dir) = path.parent() else {
        return;
    };
    let _ = fs::create_dir_all(dir);
    if let Ok(json) = serde_json::to_string_pretty(prefs) {
        let tmp = path.with_extension("json.tmp");
        if fs::write(&tmp, json).is_ok() {
            let _ = fs::rename(&tmp, &path);
        }
    }
}

fn prefs_path() -> Option<PathBuf> {
    if let Ok(base) = std::env::var("XDG_CONFIG_HOME") {
        if !base.trim().is_empty() {
            return Some(PathBuf::from(base).join(PREFS_DIR).join(PREFS_FILE));
        }
    }
    let home = std::env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(
        PathBuf::from(home)
            .join(".config")
            .join(PREFS_DIR)
            .join(PREFS_FILE),
    )
}
