//! Background provider thread: receives fetch commands from the UI, performs
//! the blocking HTTP calls, and sends generation-tagged deltas back. A demo
//! mode synthesizes a catalog and score list offline so the UI can be driven
//! without a tracker account.

use std::env;
use std::sync::mpsc::{Receiver, Sender};
use std::thread;

use chrono::{Duration as ChronoDuration, Utc};
use rand::Rng;
use rand::rngs::ThreadRng;

use crate::alias::{
    self, AliasEntry, AliasPage, AliasSong, AliasUploader, AliasWeight, UserVote,
};
use crate::catalog::{self, Catalog, Chart, ChartType, Difficulties, GenreEntry, Song, VersionEntry};
use crate::profile::{self, GameBinding, Profile};
use crate::scores::{self, ScoreRecord};
use crate::state::{Delta, Game, ProviderCommand};

pub fn spawn_provider(tx: Sender<Delta>, cmd_rx: Receiver<ProviderCommand>, token: Option<String>) {
    thread::spawn(move || {
        let demo = env::var("DEMO_MODE")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);
        if demo {
            let _ = tx.send(Delta::Log("[INFO] Demo mode: serving synthetic data".into()));
        }

        while let Ok(cmd) = cmd_rx.recv() {
            if demo {
                handle_demo(&tx, cmd);
            } else {
                handle_live(&tx, token.as_deref(), cmd);
            }
        }
    });
}

fn handle_live(tx: &Sender<Delta>, token: Option<&str>, cmd: ProviderCommand) {
    match cmd {
        ProviderCommand::FetchCatalog { generation, game } => {
            let catalog = match catalog::fetch_catalog(game) {
                Ok(catalog) => catalog,
                Err(err) => {
                    let _ = tx.send(Delta::Log(format!("[WARN] Catalog fetch failed: {err}")));
                    Catalog::default()
                }
            };
            let _ = tx.send(Delta::SetCatalog {
                generation,
                catalog,
            });
        }
        ProviderCommand::FetchScores { generation, game } => {
            let scores = match scores::fetch_player_scores(game, token) {
                Ok(scores) => scores,
                Err(err) => {
                    let _ = tx.send(Delta::Log(format!("[WARN] Score fetch failed: {err}")));
                    Vec::new()
                }
            };
            let _ = tx.send(Delta::SetScores { generation, scores });
        }
        ProviderCommand::FetchAliasPage {
            generation,
            game,
            page,
            sort,
            descending,
            only_not_approved,
            song_id,
        } => {
            let page = match alias::fetch_alias_page(
                game,
                token,
                page,
                sort,
                descending,
                only_not_approved,
                song_id,
            ) {
                Ok(page) => page,
                Err(err) => {
                    let _ = tx.send(Delta::Log(format!("[WARN] Alias fetch failed: {err}")));
                    AliasPage::default()
                }
            };
            let _ = tx.send(Delta::SetAliasPage { generation, page });
        }
        ProviderCommand::FetchVotes { generation, game } => {
            match alias::fetch_user_votes(game, token) {
                Ok(votes) => {
                    let _ = tx.send(Delta::SetVotes { generation, votes });
                }
                Err(err) => {
                    let _ = tx.send(Delta::Log(format!("[WARN] Vote fetch failed: {err}")));
                }
            }
        }
        ProviderCommand::FetchProfile { generation } => {
            let profile = match profile::fetch_profile(token) {
                Ok(profile) => profile,
                Err(err) => {
                    let _ = tx.send(Delta::Log(format!("[WARN] Profile fetch failed: {err}")));
                    None
                }
            };
            let _ = tx.send(Delta::SetProfile {
                generation,
                profile,
            });
        }
        ProviderCommand::FetchScoreHistory {
            generation,
            game,
            song_id,
            chart_type,
            level_index,
        } => {
            let history =
                match scores::fetch_score_history(game, token, song_id, chart_type, level_index) {
                    Ok(history) => history,
                    Err(err) => {
                        let _ = tx.send(Delta::Log(format!("[WARN] History fetch failed: {err}")));
                        Vec::new()
                    }
                };
            let _ = tx.send(Delta::SetScoreHistory {
                generation,
                key: (song_id, chart_type, level_index),
                history,
            });
        }
        ProviderCommand::SubmitVote {
            generation,
            game,
            alias_id,
            weight,
        } => match alias::post_alias_vote(game, token, alias_id, weight) {
            Ok(()) => {
                let _ = tx.send(Delta::VoteSubmitted {
                    generation,
                    alias_id,
                });
            }
            Err(err) => {
                let _ = tx.send(Delta::Log(format!("[WARN] Vote submit failed: {err}")));
            }
        },
    }
}

fn handle_demo(tx: &Sender<Delta>, cmd: ProviderCommand) {
    let mut rng = rand::thread_rng();
    match cmd {
        ProviderCommand::FetchCatalog { generation, game } => {
            let _ = tx.send(Delta::SetCatalog {
                generation,
                catalog: demo_catalog(game),
            });
        }
        ProviderCommand::FetchScores { generation, game } => {
            let catalog = demo_catalog(game);
            let _ = tx.send(Delta::SetScores {
                generation,
                scores: demo_scores(&catalog, &mut rng),
            });
        }
        ProviderCommand::FetchAliasPage { generation, .. } => {
            let _ = tx.send(Delta::SetAliasPage {
                generation,
                page: demo_alias_page(&mut rng),
            });
        }
        ProviderCommand::FetchVotes { generation, .. } => {
            let votes = vec![UserVote {
                alias_id: 1,
                vote_id: Some(1),
                weight: 1,
            }];
            let _ = tx.send(Delta::SetVotes { generation, votes });
        }
        ProviderCommand::FetchProfile { generation } => {
            let _ = tx.send(Delta::SetProfile {
                generation,
                profile: Some(demo_profile()),
            });
        }
        ProviderCommand::FetchScoreHistory {
            generation,
            song_id,
            chart_type,
            level_index,
            ..
        } => {
            let _ = tx.send(Delta::SetScoreHistory {
                generation,
                key: (song_id, chart_type, level_index),
                history: Vec::new(),
            });
        }
        ProviderCommand::SubmitVote {
            generation,
            alias_id,
            ..
        } => {
            let _ = tx.send(Delta::VoteSubmitted {
                generation,
                alias_id,
            });
        }
    }
}

const DEMO_GENRES: [(&str, &str); 4] = [
    ("pop", "POPS"),
    ("electronic", "ELECTRONIC"),
    ("variety", "VARIETY"),
    ("original", "ORIGINAL"),
];

const DEMO_VERSIONS: [(u32, &str); 3] = [(21000, "AURORA"), (22000, "ECLIPSE"), (23000, "PRISM")];

const DEMO_TITLES: [&str; 10] = [
    "Starlight Parade",
    "Neon Cascade",
    "Fractal Bloom",
    "Midnight Circuit",
    "Glass Horizon",
    "Ember Waltz",
    "Signal Fire",
    "Paper Comet",
    "Vivid Static",
    "Last Encore",
];

/// Synthetic but deterministic catalog shape: ids and chart layout are fixed
/// so score keys stay valid across demo fetches.
fn demo_catalog(game: Game) -> Catalog {
    let levels_per_song = match game {
        Game::Deluxe => 5,
        Game::Chroma => 4,
    };
    let songs = DEMO_TITLES
        .iter()
        .enumerate()
        .map(|(idx, title)| {
            let id = idx as u32 + 1;
            let base = 7.0 + (idx % 7) as f64;
            let charts = |offset: f64| {
                (0..levels_per_song)
                    .map(|tier| {
                        let value = (base + offset + tier as f64 * 1.5).min(15.0);
                        Chart {
                            level: format!("{}", value.floor() as u32),
                            level_value: (value * 10.0).round() / 10.0,
                            version: DEMO_VERSIONS[idx % DEMO_VERSIONS.len()].0,
                        }
                    })
                    .collect::<Vec<_>>()
            };
            Song {
                id,
                title: (*title).to_string(),
                genre: DEMO_GENRES[idx % DEMO_GENRES.len()].0.to_string(),
                difficulties: Difficulties {
                    standard: charts(0.0),
                    dx: charts(0.3),
                },
            }
        })
        .collect();

    let genres = DEMO_GENRES
        .iter()
        .map(|(genre, title)| GenreEntry {
            genre: (*genre).to_string(),
            title: (*title).to_string(),
        })
        .collect();
    let versions = DEMO_VERSIONS
        .iter()
        .map(|(version, title)| VersionEntry {
            version: *version,
            title: (*title).to_string(),
        })
        .collect();

    Catalog::new(songs, genres, versions)
}

fn demo_scores(catalog: &Catalog, rng: &mut ThreadRng) -> Vec<ScoreRecord> {
    let mut out = Vec::new();
    for song in &catalog.songs {
        for chart_type in ChartType::ALL {
            for (index, chart) in song.charts(chart_type).iter().enumerate() {
                // Leave a share of charts unplayed so the expand toggle has
                // something to show.
                if rng.gen_bool(0.3) {
                    continue;
                }
                let achievements: f64 = rng.gen_range(92.0..101.0);
                let rating = (chart.level_value * achievements * 0.224).round();
                let days_ago = rng.gen_range(0..120_i64);
                let upload = Utc::now() - ChronoDuration::days(days_ago);
                out.push(ScoreRecord {
                    song_id: song.id,
                    song_name: song.title.clone(),
                    level: chart.level.clone(),
                    level_index: index as u32,
                    achievements: (achievements * 10000.0).round() / 10000.0,
                    fc: String::new(),
                    fs: String::new(),
                    dx_score: rng.gen_range(1000..3000),
                    rating,
                    rate: String::new(),
                    chart_type,
                    upload_time: upload.format("%Y-%m-%d %H:%M:%S").to_string(),
                    play_time: None,
                });
            }
        }
    }
    out
}

fn demo_alias_page(rng: &mut ThreadRng) -> AliasPage {
    let aliases = (0..8u64)
        .map(|idx| {
            let up = rng.gen_range(0..20);
            let down = rng.gen_range(0..5);
            AliasEntry {
                alias_id: idx + 1,
                song: AliasSong {
                    id: (idx % DEMO_TITLES.len() as u64) as u32 + 1,
                    name: DEMO_TITLES[idx as usize % DEMO_TITLES.len()].to_string(),
                },
                song_type: if idx % 2 == 0 {
                    ChartType::Standard
                } else {
                    ChartType::Dx
                },
                difficulty: (idx % 4) as u32,
                alias: format!("alias-{}", idx + 1),
                approved: false,
                weight: AliasWeight {
                    up,
                    down,
                    total: up - down,
                },
                uploader: AliasUploader {
                    id: 100 + idx as u32,
                    name: format!("player{}", idx + 1),
                },
                upload_time: "2026-08-01 12:00:00".to_string(),
                vote: None,
            }
        })
        .collect();
    AliasPage {
        page_count: 1,
        aliases,
    }
}

fn demo_profile() -> Profile {
    Profile {
        name: "demo_player".to_string(),
        email: Some("demo@example.com".to_string()),
        binds: vec![
            GameBinding {
                game: Game::Deluxe.api_slug().to_string(),
                player_name: "DEMO".to_string(),
                friend_code: Some("123456789".to_string()),
                rating: Some(15210.0),
            },
            GameBinding {
                game: Game::Chroma.api_slug().to_string(),
                player_name: "DEMO".to_string(),
                friend_code: None,
                rating: Some(16.54),
            },
        ],
    }
}

/// Synthetic catalog plus score list, exposed for benches.
pub fn demo_inputs(game: Game) -> (Catalog, Vec<ScoreRecord>) {
    let mut rng = rand::thread_rng();
    let catalog = demo_catalog(game);
    let scores = demo_scores(&catalog, &mut rng);
    (catalog, scores)
}
