use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::alias::{AliasEntry, AliasPage, AliasSortKey, UserVote, merge_votes};
use crate::catalog::{Catalog, ChartType};
use crate::processor::{self, FilterCriteria, ScoreView, SortDirection, SortKey};
use crate::profile::Profile;
use crate::scores::ScoreRecord;

const LOG_CAPACITY: usize = 200;

/// Which game's scores the tracker is showing. The choice is persisted as a
/// preference and decides both the API slug and the rating band layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Game {
    Deluxe,
    Chroma,
}

impl Game {
    pub fn api_slug(self) -> &'static str {
        match self {
            Game::Deluxe => "deluxe",
            Game::Chroma => "chroma",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Game::Deluxe => "DELUXE",
            Game::Chroma => "CHROMA",
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            Game::Deluxe => Game::Chroma,
            Game::Chroma => Game::Deluxe,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Scores,
    AliasVote,
    Profile,
}

/// State updates produced by the provider thread. Every fetch-derived delta
/// carries the generation of the request that produced it; stale generations
/// are discarded in `apply_delta` so a slow response can never overwrite a
/// newer game selection.
#[derive(Debug, Clone)]
pub enum Delta {
    SetCatalog {
        generation: u64,
        catalog: Catalog,
    },
    SetScores {
        generation: u64,
        scores: Vec<ScoreRecord>,
    },
    SetAliasPage {
        generation: u64,
        page: AliasPage,
    },
    SetVotes {
        generation: u64,
        votes: Vec<UserVote>,
    },
    SetProfile {
        generation: u64,
        profile: Option<Profile>,
    },
    SetScoreHistory {
        generation: u64,
        key: (u32, ChartType, u32),
        history: Vec<ScoreRecord>,
    },
    VoteSubmitted {
        generation: u64,
        alias_id: u64,
    },
    Log(String),
}

#[derive(Debug, Clone)]
pub enum ProviderCommand {
    FetchCatalog {
        generation: u64,
        game: Game,
    },
    FetchScores {
        generation: u64,
        game: Game,
    },
    FetchAliasPage {
        generation: u64,
        game: Game,
        page: usize,
        sort: AliasSortKey,
        descending: bool,
        only_not_approved: bool,
        song_id: Option<u32>,
    },
    FetchVotes {
        generation: u64,
        game: Game,
    },
    FetchProfile {
        generation: u64,
    },
    FetchScoreHistory {
        generation: u64,
        game: Game,
        song_id: u32,
        chart_type: ChartType,
        level_index: u32,
    },
    SubmitVote {
        generation: u64,
        game: Game,
        alias_id: u64,
        weight: i32,
    },
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub screen: Screen,
    pub game: Game,
    /// Bumped whenever inputs are invalidated wholesale (game switch, forced
    /// reload). Responses tagged with an older generation are dropped.
    pub generation: u64,
    pub token: Option<String>,

    pub catalog: Catalog,
    pub catalog_loaded: bool,
    pub scores_raw: Vec<ScoreRecord>,
    pub scores_loaded: bool,

    pub criteria: FilterCriteria,
    pub sort_key: SortKey,
    pub sort_direction: SortDirection,
    pub page: usize,
    pub view: ScoreView,
    pub selected: usize,
    pub search_active: bool,

    pub history_key: Option<(u32, ChartType, u32)>,
    pub history: Vec<ScoreRecord>,
    pub history_loading: bool,

    pub aliases: Vec<AliasEntry>,
    pub alias_votes: Vec<UserVote>,
    pub alias_page: usize,
    pub alias_total_pages: usize,
    pub alias_sort: AliasSortKey,
    pub alias_descending: bool,
    pub alias_only_not_approved: bool,
    pub alias_song_filter: Option<u32>,
    pub alias_selected: usize,
    pub alias_loading: bool,

    pub profile: Option<Profile>,
    pub profile_loaded: bool,

    pub logs: VecDeque<String>,
    pub help_overlay: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Game::Deluxe)
    }
}

impl AppState {
    pub fn new(game: Game) -> Self {
        Self {
            screen: Screen::Scores,
            game,
            generation: 0,
            token: None,
            catalog: Catalog::default(),
            catalog_loaded: false,
            scores_raw: Vec::new(),
            scores_loaded: false,
            criteria: FilterCriteria::default(),
            sort_key: SortKey::Rating,
            sort_direction: SortDirection::Descending,
            page: 1,
            view: ScoreView::default(),
            selected: 0,
            search_active: false,
            history_key: None,
            history: Vec::new(),
            history_loading: false,
            aliases: Vec::new(),
            alias_votes: Vec::new(),
            alias_page: 1,
            alias_total_pages: 0,
            alias_sort: AliasSortKey::default(),
            alias_descending: true,
            alias_only_not_approved: true,
            alias_song_filter: None,
            alias_selected: 0,
            alias_loading: false,
            profile: None,
            profile_loaded: false,
            logs: VecDeque::with_capacity(LOG_CAPACITY),
            help_overlay: false,
        }
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        if self.logs.len() >= LOG_CAPACITY {
            self.logs.pop_front();
        }
        self.logs.push_back(msg.into());
    }

    /// Invalidate all fetched data; in-flight responses for the previous
    /// generation will be discarded on arrival.
    pub fn bump_generation(&mut self) {
        self.generation += 1;
        self.catalog = Catalog::default();
        self.catalog_loaded = false;
        self.scores_raw.clear();
        self.scores_loaded = false;
        self.criteria = FilterCriteria::default();
        self.page = 1;
        self.selected = 0;
        self.view = ScoreView::default();
        self.history_key = None;
        self.history.clear();
        self.history_loading = false;
        self.aliases.clear();
        self.alias_votes.clear();
        self.alias_page = 1;
        self.alias_total_pages = 0;
        self.alias_selected = 0;
        self.alias_loading = false;
        self.profile = None;
        self.profile_loaded = false;
    }

    /// Both fetches must have resolved before any derived view is computed;
    /// level-value filters and sorts cannot resolve without the catalog.
    pub fn data_ready(&self) -> bool {
        self.catalog_loaded && self.scores_loaded
    }

    /// Recompute the derived score view wholesale. Called after every input
    /// mutation; the clamped page is written back so pagination never points
    /// past the filtered list.
    pub fn refresh_view(&mut self) {
        if !self.data_ready() {
            self.view = ScoreView::default();
            self.selected = 0;
            return;
        }
        self.view = processor::recompute(
            &self.scores_raw,
            &self.catalog,
            self.game,
            &self.criteria,
            self.sort_key,
            self.sort_direction,
            self.page,
        );
        self.page = self.view.page;
        if self.selected >= self.view.page_items.len() {
            self.selected = self.view.page_items.len().saturating_sub(1);
        }
    }

    /// Selecting the active key flips direction; a new key resets to
    /// descending. Either way the view restarts from page one.
    pub fn set_sort(&mut self, key: SortKey) {
        if self.sort_key == key {
            self.sort_direction = self.sort_direction.toggle();
        } else {
            self.sort_key = key;
            self.sort_direction = SortDirection::Descending;
        }
        self.page = 1;
        self.selected = 0;
        self.refresh_view();
    }

    pub fn next_page(&mut self) {
        if self.page < self.view.total_pages {
            self.page += 1;
            self.selected = 0;
            self.refresh_view();
        }
    }

    pub fn prev_page(&mut self) {
        if self.page > 1 {
            self.page -= 1;
            self.selected = 0;
            self.refresh_view();
        }
    }

    pub fn select_next(&mut self) {
        let len = self.view.page_items.len();
        if len > 0 && self.selected + 1 < len {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn selected_record(&self) -> Option<&ScoreRecord> {
        self.view.page_items.get(self.selected)
    }

    pub fn selected_alias(&self) -> Option<&AliasEntry> {
        self.aliases.get(self.alias_selected)
    }

    pub fn alias_select_next(&mut self) {
        let len = self.aliases.len();
        if len > 0 && self.alias_selected + 1 < len {
            self.alias_selected += 1;
        }
    }

    pub fn alias_select_prev(&mut self) {
        self.alias_selected = self.alias_selected.saturating_sub(1);
    }

    /// Same toggle convention as score sorting, but the actual ordering is
    /// done by the server on the next page fetch.
    pub fn set_alias_sort(&mut self, sort: AliasSortKey) {
        if self.alias_sort == sort {
            self.alias_descending = !self.alias_descending;
        } else {
            self.alias_sort = sort;
            self.alias_descending = true;
        }
        self.alias_page = 1;
        self.alias_selected = 0;
    }

    pub fn pages_line(&self) -> String {
        if self.view.total_pages == 0 {
            "no results".to_string()
        } else {
            format!("page {}/{}", self.view.page, self.view.total_pages)
        }
    }
}

/// Apply one provider delta on the UI thread, discarding stale generations.
pub fn apply_delta(state: &mut AppState, delta: Delta) {
    let generation = match &delta {
        Delta::SetCatalog { generation, .. }
        | Delta::SetScores { generation, .. }
        | Delta::SetAliasPage { generation, .. }
        | Delta::SetVotes { generation, .. }
        | Delta::SetProfile { generation, .. }
        | Delta::SetScoreHistory { generation, .. }
        | Delta::VoteSubmitted { generation, .. } => Some(*generation),
        Delta::Log(_) => None,
    };
    if let Some(generation) = generation {
        if generation != state.generation {
            state.push_log(format!(
                "[INFO] Discarded stale response (gen {generation}, now {})",
                state.generation
            ));
            return;
        }
    }

    match delta {
        Delta::SetCatalog { catalog, .. } => {
            state.catalog = catalog;
            state.catalog_loaded = true;
            state.refresh_view();
        }
        Delta::SetScores { scores, .. } => {
            state.scores_raw = scores;
            state.scores_loaded = true;
            state.refresh_view();
        }
        Delta::SetAliasPage { page, .. } => {
            state.alias_total_pages = page.page_count;
            state.aliases = page.aliases;
            merge_votes(&mut state.aliases, &state.alias_votes);
            state.alias_loading = false;
            if state.alias_selected >= state.aliases.len() {
                state.alias_selected = state.aliases.len().saturating_sub(1);
            }
        }
        Delta::SetVotes { votes, .. } => {
            state.alias_votes = votes;
            merge_votes(&mut state.aliases, &state.alias_votes);
        }
        Delta::SetProfile { profile, .. } => {
            state.profile = profile;
            state.profile_loaded = true;
        }
        Delta::SetScoreHistory { key, history, .. } => {
            if state.history_key == Some(key) {
                state.history = history;
                state.history_loading = false;
            }
        }
        Delta::VoteSubmitted { alias_id, .. } => {
            state.push_log(format!("[INFO] Vote recorded for alias {alias_id}"));
        }
        Delta::Log(msg) => state.push_log(msg),
    }
}

pub fn screen_label(screen: Screen) -> &'static str {
    match screen {
        Screen::Scores => "SCORES",
        Screen::AliasVote => "ALIAS VOTE",
        Screen::Profile => "PROFILE",
    }
}
