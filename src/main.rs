use std::io;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use score_terminal::alias::AliasSortKey;
use score_terminal::persist::{self, Prefs};
use score_terminal::processor::{LEVEL_RANGE_DEFAULT, SortDirection, SortKey};
use score_terminal::provider;
use score_terminal::scores::ScoreRecord;
use score_terminal::state::{
    AppState, Delta, Game, ProviderCommand, Screen, apply_delta, screen_label,
};

struct App {
    state: AppState,
    should_quit: bool,
    cmd_tx: mpsc::Sender<ProviderCommand>,
}

impl App {
    fn new(cmd_tx: mpsc::Sender<ProviderCommand>, prefs: &Prefs) -> Self {
        let mut state = AppState::new(prefs.game);
        state.token = std::env::var("API_TOKEN").ok().or_else(|| prefs.token.clone());
        Self {
            state,
            should_quit: false,
            cmd_tx,
        }
    }

    fn send(&mut self, cmd: ProviderCommand) {
        if self.cmd_tx.send(cmd).is_err() {
            self.state.push_log("[WARN] Provider unavailable");
        }
    }

    fn request_score_data(&mut self) {
        let generation = self.state.generation;
        let game = self.state.game;
        self.send(ProviderCommand::FetchCatalog { generation, game });
        self.send(ProviderCommand::FetchScores { generation, game });
    }

    fn request_alias_page(&mut self) {
        self.state.alias_loading = true;
        let cmd = ProviderCommand::FetchAliasPage {
            generation: self.state.generation,
            game: self.state.game,
            page: self.state.alias_page,
            sort: self.state.alias_sort,
            descending: self.state.alias_descending,
            only_not_approved: self.state.alias_only_not_approved,
            song_id: self.state.alias_song_filter,
        };
        self.send(cmd);
    }

    fn request_votes(&mut self) {
        let cmd = ProviderCommand::FetchVotes {
            generation: self.state.generation,
            game: self.state.game,
        };
        self.send(cmd);
    }

    fn request_profile(&mut self) {
        let cmd = ProviderCommand::FetchProfile {
            generation: self.state.generation,
        };
        self.send(cmd);
    }

    fn request_history(&mut self, record: &ScoreRecord) {
        self.state.history_key = Some(record.key());
        self.state.history.clear();
        self.state.history_loading = true;
        let cmd = ProviderCommand::FetchScoreHistory {
            generation: self.state.generation,
            game: self.state.game,
            song_id: record.song_id,
            chart_type: record.chart_type,
            level_index: record.level_index,
        };
        self.send(cmd);
    }

    fn switch_game(&mut self) {
        let game = self.state.game.toggle();
        self.state.game = game;
        self.state.bump_generation();
        persist::save_prefs(&Prefs {
            game,
            token: self.state.token.clone(),
            ..Prefs::default()
        });
        self.state.push_log(format!("[INFO] Switched to {}", game.label()));
        self.request_score_data();
        match self.state.screen {
            Screen::AliasVote => {
                self.request_votes();
                self.request_alias_page();
            }
            Screen::Profile => self.request_profile(),
            Screen::Scores => {}
        }
    }

    fn enter_screen(&mut self, screen: Screen) {
        if self.state.screen == screen {
            return;
        }
        self.state.screen = screen;
        self.state.search_active = false;
        match screen {
            Screen::AliasVote => {
                if self.state.aliases.is_empty() && !self.state.alias_loading {
                    self.request_votes();
                    self.request_alias_page();
                }
            }
            Screen::Profile => {
                if !self.state.profile_loaded {
                    self.request_profile();
                }
            }
            Screen::Scores => {}
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        if self.state.search_active {
            self.on_search_key(key);
            return;
        }
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('?') => self.state.help_overlay = !self.state.help_overlay,
            KeyCode::Char('1') => self.enter_screen(Screen::Scores),
            KeyCode::Char('2') => self.enter_screen(Screen::AliasVote),
            KeyCode::Char('3') => self.enter_screen(Screen::Profile),
            KeyCode::Char('g') => self.switch_game(),
            KeyCode::Char('r') => {
                self.state.bump_generation();
                self.state.push_log("[INFO] Reloading");
                self.request_score_data();
                match self.state.screen {
                    Screen::AliasVote => {
                        self.request_votes();
                        self.request_alias_page();
                    }
                    Screen::Profile => self.request_profile(),
                    Screen::Scores => {}
                }
            }
            _ => match self.state.screen {
                Screen::Scores => self.on_scores_key(key),
                Screen::AliasVote => self.on_alias_key(key),
                Screen::Profile => {}
            },
        }
    }

    fn on_search_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Enter => self.state.search_active = false,
            KeyCode::Backspace => {
                self.state.criteria.search.pop();
                self.state.page = 1;
                self.state.refresh_view();
            }
            KeyCode::Char(c) => {
                self.state.criteria.search.push(c);
                self.state.page = 1;
                self.state.refresh_view();
            }
            _ => {}
        }
    }

    fn on_scores_key(&mut self, key: KeyEvent) {
        if self.state.history_key.is_some() {
            if matches!(key.code, KeyCode::Esc | KeyCode::Enter | KeyCode::Char('b')) {
                self.state.history_key = None;
                self.state.history.clear();
                self.state.history_loading = false;
            }
            return;
        }
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.state.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.state.select_prev(),
            KeyCode::Char('n') | KeyCode::Right => self.state.next_page(),
            KeyCode::Char('p') | KeyCode::Left => self.state.prev_page(),
            KeyCode::Char('s') => {
                let key = next_sort_key(self.state.sort_key);
                self.state.set_sort(key);
            }
            KeyCode::Char('d') => {
                let key = self.state.sort_key;
                self.state.set_sort(key);
            }
            KeyCode::Char('/') => self.state.search_active = true,
            KeyCode::Char('u') => {
                self.state.criteria.show_unplayed = !self.state.criteria.show_unplayed;
                self.state.page = 1;
                self.state.refresh_view();
            }
            KeyCode::Char('c') => {
                cycle_selection(
                    &mut self.state.criteria.chart_types,
                    &score_terminal::catalog::ChartType::ALL,
                );
                self.state.page = 1;
                self.state.refresh_view();
            }
            KeyCode::Char('i') => {
                let tiers: Vec<u32> = (0..self.state.catalog.tier_count() as u32).collect();
                cycle_selection(&mut self.state.criteria.level_indices, &tiers);
                self.state.page = 1;
                self.state.refresh_view();
            }
            KeyCode::Char('y') => {
                let genres: Vec<String> = self
                    .state
                    .catalog
                    .genres
                    .iter()
                    .map(|g| g.genre.clone())
                    .collect();
                cycle_selection(&mut self.state.criteria.genres, &genres);
                self.state.page = 1;
                self.state.refresh_view();
            }
            KeyCode::Char('v') => {
                let versions: Vec<u32> = self
                    .state
                    .catalog
                    .versions
                    .iter()
                    .map(|v| v.version)
                    .collect();
                cycle_selection(&mut self.state.criteria.versions, &versions);
                self.state.page = 1;
                self.state.refresh_view();
            }
            KeyCode::Char(',') => self.adjust_level_range(-0.5, 0.0),
            KeyCode::Char('.') => self.adjust_level_range(0.5, 0.0),
            KeyCode::Char('<') => self.adjust_level_range(0.0, -0.5),
            KeyCode::Char('>') => self.adjust_level_range(0.0, 0.5),
            KeyCode::Char('x') => {
                self.state.criteria.reset();
                self.state.page = 1;
                self.state.refresh_view();
            }
            KeyCode::Enter => {
                if let Some(record) = self.state.selected_record().cloned() {
                    if !record.is_unplayed() {
                        self.request_history(&record);
                    }
                }
            }
            _ => {}
        }
    }

    fn adjust_level_range(&mut self, d_min: f64, d_max: f64) {
        let (mut lo, mut hi) = self.state.criteria.level_range;
        lo = (lo + d_min).clamp(LEVEL_RANGE_DEFAULT.0, hi);
        hi = (hi + d_max).clamp(lo, LEVEL_RANGE_DEFAULT.1);
        self.state.criteria.level_range = (lo, hi);
        self.state.page = 1;
        self.state.refresh_view();
    }

    fn on_alias_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.state.alias_select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.state.alias_select_prev(),
            KeyCode::Char('n') | KeyCode::Right => {
                if self.state.alias_page < self.state.alias_total_pages {
                    self.state.alias_page += 1;
                    self.state.alias_selected = 0;
                    self.request_alias_page();
                }
            }
            KeyCode::Char('p') | KeyCode::Left => {
                if self.state.alias_page > 1 {
                    self.state.alias_page -= 1;
                    self.state.alias_selected = 0;
                    self.request_alias_page();
                }
            }
            KeyCode::Char('s') => {
                let sort = next_alias_sort(self.state.alias_sort);
                self.state.set_alias_sort(sort);
                self.request_alias_page();
            }
            KeyCode::Char('d') => {
                let sort = self.state.alias_sort;
                self.state.set_alias_sort(sort);
                self.request_alias_page();
            }
            KeyCode::Char('a') => {
                self.state.alias_only_not_approved = !self.state.alias_only_not_approved;
                self.state.alias_page = 1;
                self.state.alias_selected = 0;
                self.request_alias_page();
            }
            KeyCode::Char('f') => {
                self.state.alias_song_filter =
                    self.state.selected_alias().map(|alias| alias.song.id);
                self.state.alias_page = 1;
                self.state.alias_selected = 0;
                self.request_alias_page();
            }
            KeyCode::Char('F') => {
                if self.state.alias_song_filter.take().is_some() {
                    self.state.alias_page = 1;
                    self.state.alias_selected = 0;
                    self.request_alias_page();
                }
            }
            KeyCode::Char('+') | KeyCode::Char('=') => self.submit_vote(1),
            KeyCode::Char('-') => self.submit_vote(-1),
            _ => {}
        }
    }

    fn submit_vote(&mut self, weight: i32) {
        let Some(alias) = self.state.selected_alias() else {
            self.state.push_log("[INFO] No alias selected");
            return;
        };
        let cmd = ProviderCommand::SubmitVote {
            generation: self.state.generation,
            game: self.state.game,
            alias_id: alias.alias_id,
            weight,
        };
        self.send(cmd);
    }
}

fn next_sort_key(current: SortKey) -> SortKey {
    let keys = SortKey::ALL;
    let idx = keys.iter().position(|k| *k == current).unwrap_or(0);
    keys[(idx + 1) % keys.len()]
}

fn next_alias_sort(current: AliasSortKey) -> AliasSortKey {
    let keys = AliasSortKey::ALL;
    let idx = keys.iter().position(|k| *k == current).unwrap_or(0);
    keys[(idx + 1) % keys.len()]
}

/// Cycle a single-selection filter through: empty -> each option -> empty.
fn cycle_selection<T: Clone + PartialEq>(current: &mut Vec<T>, options: &[T]) {
    if options.is_empty() {
        current.clear();
        return;
    }
    let next = match current.first() {
        None => Some(options[0].clone()),
        Some(active) => options
            .iter()
            .position(|opt| opt == active)
            .and_then(|idx| options.get(idx + 1))
            .cloned(),
    };
    current.clear();
    if let Some(next) = next {
        current.push(next);
    }
}

fn main() -> io::Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let prefs = persist::load_prefs();

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    let mut app = App::new(cmd_tx, &prefs);
    provider::spawn_provider(tx, cmd_rx, app.state.token.clone());
    app.request_score_data();

    let res = run_app(&mut terminal, &mut app, rx);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: mpsc::Receiver<Delta>,
) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        while let Ok(delta) = rx.try_recv() {
            let refetch_votes = matches!(delta, Delta::VoteSubmitted { .. });
            apply_delta(&mut app.state, delta);
            if refetch_votes {
                app.request_votes();
                app.request_alias_page();
            }
        }

        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key);
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let full = frame.size();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(1),
            Constraint::Length(2),
        ])
        .split(full);

    let header = Paragraph::new(header_text(&app.state))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    match app.state.screen {
        Screen::Scores => render_scores(frame, chunks[1], &app.state),
        Screen::AliasVote => render_alias(frame, chunks[1], &app.state),
        Screen::Profile => render_profile(frame, chunks[1], &app.state),
    }

    let footer = Paragraph::new(footer_text(&app.state))
        .block(Block::default().borders(Borders::TOP));
    frame.render_widget(footer, chunks[2]);

    if app.state.history_key.is_some() {
        render_history_overlay(frame, full, &app.state);
    }
    if app.state.help_overlay {
        render_help_overlay(frame, full);
    }
}

fn header_text(state: &AppState) -> String {
    let mut title = format!("SCORE TERMINAL | {} | {}", state.game.label(), screen_label(state.screen));
    if state.screen == Screen::Scores {
        let dir = match state.sort_direction {
            SortDirection::Descending => "v",
            SortDirection::Ascending => "^",
        };
        title.push_str(&format!(
            " | Sort: {} {} | {}",
            state.sort_key.label(),
            dir,
            state.pages_line()
        ));
    }
    title
}

fn footer_text(state: &AppState) -> String {
    let keys = match state.screen {
        Screen::Scores if state.search_active => {
            "type to search | Enter/Esc done".to_string()
        }
        Screen::Scores if state.history_key.is_some() => {
            "Esc/Enter close history".to_string()
        }
        Screen::Scores => {
            "1/2/3 Screen | j/k Move | n/p Page | s Sort | d Dir | / Search | u Unplayed | c Type | i Tier | y Genre | v Version | ,.<> Range | x Reset | Enter History | g Game | r Reload | ? Help | q Quit"
                .to_string()
        }
        Screen::AliasVote => {
            "1/2/3 Screen | j/k Move | n/p Page | s Sort | d Dir | a Approved | f/F Song filter | +/- Vote | g Game | r Reload | q Quit"
                .to_string()
        }
        Screen::Profile => "1/2/3 Screen | g Game | r Reload | ? Help | q Quit".to_string(),
    };
    let log = state.logs.back().cloned().unwrap_or_default();
    format!("{keys}\n{log}")
}

fn render_scores(frame: &mut Frame, area: Rect, state: &AppState) {
    if !state.data_ready() {
        let loading = Paragraph::new("Loading catalog and scores...")
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(loading, area);
        return;
    }

    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(1),
            Constraint::Length(6),
        ])
        .split(area);

    render_filter_summary(frame, sections[0], state);
    render_score_list(frame, sections[1], state);
    render_rating_summary(frame, sections[2], state);
}

fn render_filter_summary(frame: &mut Frame, area: Rect, state: &AppState) {
    let c = &state.criteria;
    let mut parts: Vec<String> = Vec::new();
    if !c.search.trim().is_empty() {
        parts.push(format!("name~\"{}\"", c.search.trim()));
    }
    if !c.level_indices.is_empty() {
        parts.push(format!("tier {:?}", c.level_indices));
    }
    if !c.chart_types.is_empty() {
        let labels: Vec<&str> = c.chart_types.iter().map(|t| t.label()).collect();
        parts.push(format!("type {}", labels.join("/")));
    }
    if !c.genres.is_empty() {
        parts.push(format!("genre {}", c.genres.join("/")));
    }
    if !c.versions.is_empty() {
        let titles: Vec<String> = c
            .versions
            .iter()
            .map(|v| {
                state
                    .catalog
                    .versions
                    .iter()
                    .find(|entry| entry.version == *v)
                    .map(|entry| entry.title.clone())
                    .unwrap_or_else(|| v.to_string())
            })
            .collect();
        parts.push(format!("version {}", titles.join("/")));
    }
    if c.level_range != LEVEL_RANGE_DEFAULT {
        parts.push(format!("level {:.1}-{:.1}", c.level_range.0, c.level_range.1));
    }
    if c.show_unplayed {
        parts.push("unplayed shown".to_string());
    }
    let line = if parts.is_empty() {
        "filters: none".to_string()
    } else {
        format!("filters: {}", parts.join(" | "))
    };
    let dropped = if state.view.dropped > 0 {
        format!("  ({} unresolved dropped)", state.view.dropped)
    } else {
        String::new()
    };
    let text = format!(
        "{line}{dropped}\n{} of {} records",
        state.view.page_items.len(),
        state.view.total_filtered
    );
    frame.render_widget(
        Paragraph::new(text).style(Style::default().fg(Color::Gray)),
        area,
    );
}

fn render_score_list(frame: &mut Frame, area: Rect, state: &AppState) {
    if state.scores_raw.is_empty() && !state.criteria.show_unplayed {
        let empty = Paragraph::new("No scores uploaded for this game. Press r to retry.")
            .style(Style::default().fg(Color::Yellow));
        frame.render_widget(empty, area);
        return;
    }
    if state.view.total_filtered == 0 {
        let empty = Paragraph::new("No scores match the current filters. Press x to reset.")
            .style(Style::default().fg(Color::Yellow));
        frame.render_widget(empty, area);
        return;
    }

    let mut lines: Vec<Line> = Vec::with_capacity(state.view.page_items.len() + 1);
    lines.push(Line::styled(
        format!(
            "{:<4} {:<28} {:<4} {:>5} {:>9} {:>7}  {}",
            "TYPE", "SONG", "TIER", "LVL", "ACHV", "RATING", "UPLOADED"
        ),
        Style::default().add_modifier(Modifier::BOLD),
    ));
    for (idx, record) in state.view.page_items.iter().enumerate() {
        let level_value = state
            .catalog
            .chart(record.song_id, record.chart_type, record.level_index)
            .map(|chart| format!("{:.1}", chart.level_value))
            .unwrap_or_else(|| "-".to_string());
        let achievements = if record.is_unplayed() {
            "-".to_string()
        } else {
            format!("{:.4}%", record.achievements)
        };
        let rating = if record.is_unplayed() {
            "-".to_string()
        } else {
            format!("{:.0}", record.rating)
        };
        let text = format!(
            "{:<4} {:<28} {:<4} {:>5} {:>9} {:>7}  {}",
            record.chart_type.label(),
            truncate(&record.song_name, 28),
            record.level_index,
            level_value,
            achievements,
            rating,
            record.upload_time
        );
        let style = if idx == state.selected {
            Style::default().fg(Color::White).bg(Color::DarkGray)
        } else if record.is_unplayed() {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };
        lines.push(Line::styled(text, style));
    }
    frame.render_widget(Paragraph::new(lines), area);
}

fn render_rating_summary(frame: &mut Frame, area: Rect, state: &AppState) {
    let summary = &state.view.summary;
    let mut lines: Vec<Line> = Vec::new();
    lines.push(Line::styled(
        format!("RATING  total {:.2}", summary.total),
        Style::default().add_modifier(Modifier::BOLD),
    ));
    for band in &summary.bands {
        lines.push(Line::raw(format!(
            "{:<14} {:>9.2}  {:>3}%  ({} charts)",
            band.label, band.value, band.share, band.count
        )));
    }
    let block = Block::default().borders(Borders::TOP);
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_alias(frame: &mut Frame, area: Rect, state: &AppState) {
    if state.alias_loading && state.aliases.is_empty() {
        let loading =
            Paragraph::new("Loading aliases...").style(Style::default().fg(Color::DarkGray));
        frame.render_widget(loading, area);
        return;
    }
    if state.aliases.is_empty() {
        let empty = Paragraph::new("No aliases to vote on.")
            .style(Style::default().fg(Color::Yellow));
        frame.render_widget(empty, area);
        return;
    }

    let mut lines: Vec<Line> = Vec::with_capacity(state.aliases.len() + 2);
    let dir = if state.alias_descending { "v" } else { "^" };
    let filter = state
        .alias_song_filter
        .map(|id| format!(" | song #{id}"))
        .unwrap_or_default();
    lines.push(Line::styled(
        format!(
            "Sort: {} {} | page {}/{} | {}{}",
            state.alias_sort.label(),
            dir,
            state.alias_page,
            state.alias_total_pages.max(1),
            if state.alias_only_not_approved {
                "pending only"
            } else {
                "all"
            },
            filter
        ),
        Style::default().fg(Color::Gray),
    ));
    lines.push(Line::styled(
        format!(
            "{:<24} {:<28} {:<4} {:>6} {:>6}  {}",
            "ALIAS", "SONG", "TYPE", "WEIGHT", "VOTE", "UPLOADER"
        ),
        Style::default().add_modifier(Modifier::BOLD),
    ));
    for (idx, alias) in state.aliases.iter().enumerate() {
        let own_vote = alias
            .vote
            .map(|v| if v.weight > 0 { "+1" } else { "-1" })
            .unwrap_or("-");
        let text = format!(
            "{:<24} {:<28} {:<4} {:>6} {:>6}  {}",
            truncate(&alias.alias, 24),
            truncate(&alias.song.name, 28),
            alias.song_type.label(),
            alias.weight.total,
            own_vote,
            alias.uploader.name
        );
        let style = if idx == state.alias_selected {
            Style::default().fg(Color::White).bg(Color::DarkGray)
        } else if alias.approved {
            Style::default().fg(Color::Green)
        } else {
            Style::default()
        };
        lines.push(Line::styled(text, style));
    }
    frame.render_widget(Paragraph::new(lines), area);
}

fn render_profile(frame: &mut Frame, area: Rect, state: &AppState) {
    if !state.profile_loaded {
        let loading =
            Paragraph::new("Loading profile...").style(Style::default().fg(Color::DarkGray));
        frame.render_widget(loading, area);
        return;
    }
    let Some(profile) = &state.profile else {
        let empty = Paragraph::new("Not signed in, or the profile fetch failed. Press r to retry.")
            .style(Style::default().fg(Color::Yellow));
        frame.render_widget(empty, area);
        return;
    };

    let mut lines: Vec<Line> = Vec::new();
    lines.push(Line::styled(
        format!("Account: {}", profile.name),
        Style::default().add_modifier(Modifier::BOLD),
    ));
    if let Some(email) = &profile.email {
        lines.push(Line::raw(format!("Email:   {email}")));
    }
    lines.push(Line::raw(""));
    if profile.binds.is_empty() {
        lines.push(Line::raw("No game accounts bound."));
    } else {
        lines.push(Line::styled(
            "Bound game accounts",
            Style::default().add_modifier(Modifier::BOLD),
        ));
        for bind in &profile.binds {
            let rating = bind
                .rating
                .map(|r| format!("{r}"))
                .unwrap_or_else(|| "-".to_string());
            let code = bind.friend_code.clone().unwrap_or_else(|| "-".to_string());
            lines.push(Line::raw(format!(
                "  {:<8} {:<16} rating {:<10} code {}",
                bind.game, bind.player_name, rating, code
            )));
        }
    }
    frame.render_widget(Paragraph::new(lines), area);
}

fn render_history_overlay(frame: &mut Frame, area: Rect, state: &AppState) {
    let popup = centered_rect(70, 60, area);
    frame.render_widget(Clear, popup);
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Upload history ");

    let mut lines: Vec<Line> = Vec::new();
    if state.history_loading {
        lines.push(Line::raw("Loading history..."));
    } else if state.history.is_empty() {
        lines.push(Line::raw("No uploads recorded for this chart."));
    } else {
        lines.push(Line::styled(
            format!("{:<20} {:>10} {:>8}", "UPLOADED", "ACHV", "RATING"),
            Style::default().add_modifier(Modifier::BOLD),
        ));
        for entry in &state.history {
            lines.push(Line::raw(format!(
                "{:<20} {:>9.4}% {:>8.0}",
                entry.upload_time, entry.achievements, entry.rating
            )));
        }
    }
    frame.render_widget(Paragraph::new(lines).block(block), popup);
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup);
    let block = Block::default().borders(Borders::ALL).title(" Help ");
    let text = vec![
        Line::raw("1/2/3     switch screen (scores / alias vote / profile)"),
        Line::raw("g         switch game, refetching catalog and scores"),
        Line::raw("r         reload current screen data"),
        Line::raw("j/k       move selection"),
        Line::raw("n/p       next / previous page"),
        Line::raw("s, d      cycle sort key, toggle direction"),
        Line::raw("/         filter by song name"),
        Line::raw("u         include unplayed charts"),
        Line::raw("c/i/y/v   cycle chart type / tier / genre / version filter"),
        Line::raw(",. <>     narrow or widen the level-value range"),
        Line::raw("x         reset filters"),
        Line::raw("Enter     upload history for the selected score"),
        Line::raw("+/-       vote on the selected alias"),
        Line::raw("q         quit"),
    ];
    frame.render_widget(Paragraph::new(text).block(block), popup);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);
    horizontal[1]
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}
