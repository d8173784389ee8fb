//! Score List Processor: pure transforms from a raw score list plus the song
//! catalog into the filtered, sorted, paginated view and rating aggregates.
//! No I/O happens here; the page state calls `recompute` after every input
//! change.

use std::cmp::Ordering;
use std::collections::HashSet;

use crate::catalog::{Catalog, ChartType};
use crate::scores::{ScoreRecord, UNPLAYED};
use crate::state::Game;

pub const PAGE_SIZE: usize = 20;

/// Inclusive level-value slider bounds; matching this range means "no
/// restriction".
pub const LEVEL_RANGE_DEFAULT: (f64, f64) = (1.0, 15.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    SongName,
    LevelValue,
    Achievements,
    Rating,
    UploadTime,
}

impl SortKey {
    pub const ALL: [SortKey; 5] = [
        SortKey::SongName,
        SortKey::LevelValue,
        SortKey::Achievements,
        SortKey::Rating,
        SortKey::UploadTime,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SortKey::SongName => "Name",
            SortKey::LevelValue => "Level",
            SortKey::Achievements => "Achv",
            SortKey::Rating => "Rating",
            SortKey::UploadTime => "Uploaded",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Descending,
    Ascending,
}

impl SortDirection {
    pub fn toggle(self) -> Self {
        match self {
            SortDirection::Descending => SortDirection::Ascending,
            SortDirection::Ascending => SortDirection::Descending,
        }
    }
}

/// Current UI-selected predicate. Empty sets mean "no restriction".
#[derive(Debug, Clone, PartialEq)]
pub struct FilterCriteria {
    pub search: String,
    pub level_indices: Vec<u32>,
    pub chart_types: Vec<ChartType>,
    pub genres: Vec<String>,
    pub versions: Vec<u32>,
    pub level_range: (f64, f64),
    pub show_unplayed: bool,
}

impl Default for FilterCriteria {
    fn default() -> Self {
        Self {
            search: String::new(),
            level_indices: Vec::new(),
            chart_types: Vec::new(),
            genres: Vec::new(),
            versions: Vec::new(),
            level_range: LEVEL_RANGE_DEFAULT,
            show_unplayed: false,
        }
    }
}

impl FilterCriteria {
    /// True when filtering would be a pass-through. `show_unplayed` is not a
    /// restriction, so it does not participate.
    pub fn is_default(&self) -> bool {
        self.search.trim().is_empty()
            && self.level_indices.is_empty()
            && self.chart_types.is_empty()
            && self.genres.is_empty()
            && self.versions.is_empty()
            && self.level_range == LEVEL_RANGE_DEFAULT
    }

    pub fn reset(&mut self) {
        let show_unplayed = self.show_unplayed;
        *self = FilterCriteria {
            show_unplayed,
            ..FilterCriteria::default()
        };
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RatingBand {
    pub label: &'static str,
    /// Band sum (Deluxe) or floored band mean (Chroma).
    pub value: f64,
    pub count: usize,
    /// Rounded percent share of the combined band total.
    pub share: u8,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RatingSummary {
    pub total: f64,
    pub bands: Vec<RatingBand>,
}

/// The derived view the page renders: one page of records plus aggregates.
#[derive(Debug, Clone, Default)]
pub struct ScoreView {
    pub page_items: Vec<ScoreRecord>,
    pub page: usize,
    pub total_pages: usize,
    pub total_filtered: usize,
    /// Records silently excluded because the catalog could not resolve them.
    pub dropped: usize,
    pub summary: RatingSummary,
}

/// Synthesize an unplayed placeholder for every catalog chart with no real
/// record. Existing keys are never duplicated.
pub fn expand_unplayed(raw: &[ScoreRecord], catalog: &Catalog) -> Vec<ScoreRecord> {
    let mut out = raw.to_vec();
    let seen: HashSet<(u32, ChartType, u32)> = raw.iter().map(|s| s.key()).collect();

    for song in &catalog.songs {
        for chart_type in ChartType::ALL {
            for (index, chart) in song.charts(chart_type).iter().enumerate() {
                let key = (song.id, chart_type, index as u32);
                if seen.contains(&key) {
                    continue;
                }
                out.push(ScoreRecord {
                    song_id: song.id,
                    song_name: song.title.clone(),
                    level: chart.level.clone(),
                    level_index: index as u32,
                    achievements: UNPLAYED,
                    fc: String::new(),
                    fs: String::new(),
                    dx_score: -1,
                    rating: UNPLAYED,
                    rate: String::new(),
                    chart_type,
                    upload_time: String::new(),
                    play_time: None,
                });
            }
        }
    }
    out
}

/// Apply every active criterion; returns the surviving records and the count
/// of records dropped because their song or chart is missing from the
/// catalog. Default criteria are an identity pass.
pub fn filter_scores(
    list: Vec<ScoreRecord>,
    criteria: &FilterCriteria,
    catalog: &Catalog,
) -> (Vec<ScoreRecord>, usize) {
    if criteria.is_default() {
        return (list, 0);
    }

    let search = criteria.search.trim().to_lowercase();
    let mut dropped = 0usize;

    // Cheap pass first: no catalog resolution needed.
    let coarse: Vec<ScoreRecord> = list
        .into_iter()
        .filter(|score| {
            (search.is_empty() || score.song_name.to_lowercase().contains(&search))
                && (criteria.level_indices.is_empty()
                    || criteria.level_indices.contains(&score.level_index))
                && (criteria.chart_types.is_empty()
                    || criteria.chart_types.contains(&score.chart_type))
        })
        .collect();

    let filtered = coarse
        .into_iter()
        .filter(|score| {
            let Some(song) = catalog.find_song(score.song_id) else {
                dropped += 1;
                return false;
            };
            let Some(chart) = catalog.chart(score.song_id, score.chart_type, score.level_index)
            else {
                dropped += 1;
                return false;
            };
            let genre_ok =
                criteria.genres.is_empty() || criteria.genres.iter().any(|g| *g == song.genre);
            let version_ok = criteria.versions.is_empty()
                || criteria
                    .versions
                    .iter()
                    .any(|v| chart.version >= *v && chart.version < v + 1000);
            let level_ok = chart.level_value >= criteria.level_range.0
                && chart.level_value <= criteria.level_range.1;
            genre_ok && version_ok && level_ok
        })
        .collect();

    (filtered, dropped)
}

/// Order the list by the chosen key. The comparator is total: on the
/// level-value key unresolvable records form their own group, and primary
/// ties fall back to the record key, so the result does not depend on sort
/// stability.
pub fn sort_scores(
    list: &mut [ScoreRecord],
    key: SortKey,
    direction: SortDirection,
    catalog: &Catalog,
) {
    list.sort_by(|a, b| {
        let primary = match key {
            SortKey::SongName => a.song_name.to_lowercase().cmp(&b.song_name.to_lowercase()),
            SortKey::LevelValue => {
                let resolve = |s: &ScoreRecord| {
                    catalog
                        .chart(s.song_id, s.chart_type, s.level_index)
                        .map(|chart| chart.level_value)
                };
                // Unresolvable records group together below every resolved
                // one; anything looser breaks the comparator's total order.
                match (resolve(a), resolve(b)) {
                    (Some(a_val), Some(b_val)) => {
                        a_val.partial_cmp(&b_val).unwrap_or(Ordering::Equal)
                    }
                    (Some(_), None) => Ordering::Greater,
                    (None, Some(_)) => Ordering::Less,
                    (None, None) => Ordering::Equal,
                }
            }
            SortKey::Achievements => a
                .achievements
                .partial_cmp(&b.achievements)
                .unwrap_or(Ordering::Equal),
            SortKey::Rating => a.rating.partial_cmp(&b.rating).unwrap_or(Ordering::Equal),
            SortKey::UploadTime => a.upload_time.cmp(&b.upload_time),
        };
        let primary = match direction {
            SortDirection::Descending => primary.reverse(),
            SortDirection::Ascending => primary,
        };
        primary.then_with(|| a.key().cmp(&b.key()))
    });
}

/// Page count for a filtered list; derived, never stored independently.
pub fn total_pages(len: usize, page_size: usize) -> usize {
    if page_size == 0 { 0 } else { len.div_ceil(page_size) }
}

/// One-indexed page slice; out-of-range pages are clamped, an empty list
/// yields an empty slice.
pub fn paginate(list: &[ScoreRecord], page_size: usize, page: usize) -> Vec<ScoreRecord> {
    let pages = total_pages(list.len(), page_size);
    if pages == 0 {
        return Vec::new();
    }
    let page = page.clamp(1, pages);
    let start = (page - 1) * page_size;
    let end = (start + page_size).min(list.len());
    list[start..end].to_vec()
}

const DELUXE_BANDS: [(&str, usize); 2] = [("BEST 35", 35), ("BEST 15", 15)];
const CHROMA_BANDS: [(&str, usize); 3] = [("BEST 30", 30), ("SELECTION 10", 10), ("RECENT 10", 10)];

/// Partition the played records into the game's fixed top-N rating bands.
///
/// Deluxe reports each band's rating sum and its share of the combined sum.
/// Chroma reports each band's mean (floored to 2 decimals); the middle band's
/// share is 0 by convention and the outer shares are taken against the two
/// outer means. Empty bands contribute 0 instead of dividing by zero.
pub fn aggregate_rating(list: &[ScoreRecord], game: Game) -> RatingSummary {
    let mut ratings: Vec<f64> = list
        .iter()
        .filter(|s| !s.is_unplayed())
        .map(|s| s.rating)
        .collect();
    ratings.sort_by(|a, b| b.partial_cmp(a).unwrap_or(Ordering::Equal));

    match game {
        Game::Deluxe => {
            let bands: Vec<(&str, &[f64])> = take_bands(&ratings, &DELUXE_BANDS);
            let sums: Vec<f64> = bands.iter().map(|(_, xs)| xs.iter().sum()).collect();
            let total: f64 = sums.iter().sum();
            let bands = bands
                .iter()
                .zip(&sums)
                .map(|((label, xs), sum)| RatingBand {
                    label,
                    value: *sum,
                    count: xs.len(),
                    share: percent_share(*sum, total),
                })
                .collect();
            RatingSummary { total, bands }
        }
        Game::Chroma => {
            let bands: Vec<(&str, &[f64])> = take_bands(&ratings, &CHROMA_BANDS);
            let means: Vec<f64> = bands.iter().map(|(_, xs)| floor2(mean(xs))).collect();
            let outer_total = means[0] + means[2];
            let shares = [
                percent_share(means[0], outer_total),
                0,
                percent_share(means[2], outer_total),
            ];
            let outer_count = bands[0].1.len() + bands[2].1.len();
            let total = if outer_count == 0 {
                0.0
            } else {
                floor2(
                    (means[0] * bands[0].1.len() as f64 + means[2] * bands[2].1.len() as f64)
                        / outer_count as f64,
                )
            };
            let bands = bands
                .iter()
                .zip(means.iter().zip(shares))
                .map(|((label, xs), (mean, share))| RatingBand {
                    label,
                    value: *mean,
                    count: xs.len(),
                    share,
                })
                .collect();
            RatingSummary { total, bands }
        }
    }
}

fn take_bands<'a>(
    ratings: &'a [f64],
    layout: &[(&'static str, usize)],
) -> Vec<(&'static str, &'a [f64])> {
    let mut out = Vec::with_capacity(layout.len());
    let mut start = 0usize;
    for (label, size) in layout {
        let end = (start + size).min(ratings.len());
        let band = if start < ratings.len() {
            &ratings[start..end]
        } else {
            &[][..]
        };
        out.push((*label, band));
        start = end;
    }
    out
}

fn mean(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        return 0.0;
    }
    xs.iter().sum::<f64>() / xs.len() as f64
}

fn floor2(x: f64) -> f64 {
    (x * 100.0).floor() / 100.0
}

fn percent_share(part: f64, total: f64) -> u8 {
    if total > 0.0 {
        (part / total * 100.0).round() as u8
    } else {
        0
    }
}

/// The single derived-view entry point: expand, filter, sort, aggregate,
/// paginate. Called wholesale after every input mutation.
#[allow(clippy::too_many_arguments)]
pub fn recompute(
    raw: &[ScoreRecord],
    catalog: &Catalog,
    game: Game,
    criteria: &FilterCriteria,
    key: SortKey,
    direction: SortDirection,
    page: usize,
) -> ScoreView {
    let base = if criteria.show_unplayed {
        expand_unplayed(raw, catalog)
    } else {
        raw.to_vec()
    };
    let (mut filtered, dropped) = filter_scores(base, criteria, catalog);
    sort_scores(&mut filtered, key, direction, catalog);

    let pages = total_pages(filtered.len(), PAGE_SIZE);
    let page = if pages == 0 { 1 } else { page.clamp(1, pages) };
    let summary = aggregate_rating(&filtered, game);
    let page_items = paginate(&filtered, PAGE_SIZE, page);

    ScoreView {
        page_items,
        page,
        total_pages: pages,
        total_filtered: filtered.len(),
        dropped,
        summary,
    }
}
