use score_terminal::catalog::{Catalog, Chart, ChartType, Difficulties, GenreEntry, Song, VersionEntry};
use score_terminal::processor::{
    FilterCriteria, PAGE_SIZE, SortDirection, SortKey, aggregate_rating, expand_unplayed,
    filter_scores, paginate, recompute, sort_scores, total_pages,
};
use score_terminal::scores::ScoreRecord;
use score_terminal::state::Game;

fn chart(level: &str, level_value: f64, version: u32) -> Chart {
    Chart {
        level: level.to_string(),
        level_value,
        version,
    }
}

fn song(id: u32, title: &str, genre: &str, standard: Vec<Chart>, dx: Vec<Chart>) -> Song {
    Song {
        id,
        title: title.to_string(),
        genre: genre.to_string(),
        difficulties: Difficulties { standard, dx },
    }
}

/// Three songs, ten charts total, spanning three genres and three version
/// windows.
fn test_catalog() -> Catalog {
    let songs = vec![
        song(
            1,
            "Starlight Parade",
            "pop",
            vec![
                chart("5", 5.0, 21000),
                chart("8", 8.0, 21000),
                chart("11", 11.0, 21000),
                chart("13+", 13.5, 21000),
                chart("14+", 14.7, 21000),
            ],
            Vec::new(),
        ),
        song(
            2,
            "Neon Cascade",
            "electronic",
            Vec::new(),
            vec![
                chart("6", 6.0, 23500),
                chart("9", 9.0, 23500),
                chart("12", 12.0, 23500),
                chart("14", 14.0, 23500),
            ],
        ),
        song(
            3,
            "Quiet Motion",
            "variety",
            vec![chart("13", 13.0, 22000)],
            Vec::new(),
        ),
    ];
    let genres = vec![
        GenreEntry {
            genre: "pop".to_string(),
            title: "POPS".to_string(),
        },
        GenreEntry {
            genre: "electronic".to_string(),
            title: "ELECTRONIC".to_string(),
        },
        GenreEntry {
            genre: "variety".to_string(),
            title: "VARIETY".to_string(),
        },
    ];
    let versions = vec![
        VersionEntry {
            version: 21000,
            title: "AURORA".to_string(),
        },
        VersionEntry {
            version: 22000,
            title: "ECLIPSE".to_string(),
        },
        VersionEntry {
            version: 23000,
            title: "PRISM".to_string(),
        },
    ];
    Catalog::new(songs, genres, versions)
}

fn record(
    song_id: u32,
    chart_type: ChartType,
    level_index: u32,
    name: &str,
    rating: f64,
) -> ScoreRecord {
    ScoreRecord {
        song_id,
        song_name: name.to_string(),
        level: String::new(),
        level_index,
        achievements: 99.5,
        fc: String::new(),
        fs: String::new(),
        dx_score: 1000,
        rating,
        rate: "s".to_string(),
        chart_type,
        upload_time: "2026-08-01 10:00:00".to_string(),
        play_time: None,
    }
}

#[test]
fn default_criteria_pass_everything_through() {
    let catalog = test_catalog();
    let list = vec![
        record(1, ChartType::Standard, 3, "Starlight Parade", 290.0),
        record(2, ChartType::Dx, 2, "Neon Cascade", 250.0),
        // Not in the catalog at all; default criteria must not touch it.
        record(999, ChartType::Standard, 0, "Ghost Track", 100.0),
    ];
    let criteria = FilterCriteria::default();
    assert!(criteria.is_default());

    let (out, dropped) = filter_scores(list.clone(), &criteria, &catalog);
    assert_eq!(out.len(), list.len());
    assert_eq!(dropped, 0);
    let keys: Vec<_> = out.iter().map(|s| s.key()).collect();
    let expected: Vec<_> = list.iter().map(|s| s.key()).collect();
    assert_eq!(keys, expected);
}

#[test]
fn active_criteria_drop_and_count_unresolvable_records() {
    let catalog = test_catalog();
    let list = vec![
        record(1, ChartType::Standard, 3, "Starlight Parade", 290.0),
        record(999, ChartType::Standard, 0, "Ghost Track", 100.0),
    ];
    let criteria = FilterCriteria {
        chart_types: vec![ChartType::Standard],
        ..FilterCriteria::default()
    };

    let (out, dropped) = filter_scores(list, &criteria, &catalog);
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].song_id, 1);
    assert_eq!(dropped, 1);

    // The dropped record's rating must not leak into the aggregates either.
    let summary = aggregate_rating(&out, Game::Deluxe);
    assert_eq!(summary.total, 290.0);
}

#[test]
fn genre_filter_matches_the_songs_genre() {
    let catalog = test_catalog();
    let list = vec![
        record(1, ChartType::Standard, 3, "Starlight Parade", 290.0), // pop
        record(2, ChartType::Dx, 2, "Neon Cascade", 250.0),           // electronic
        record(3, ChartType::Standard, 0, "Quiet Motion", 200.0),     // variety
    ];
    let criteria = FilterCriteria {
        genres: vec!["electronic".to_string(), "variety".to_string()],
        ..FilterCriteria::default()
    };

    let (out, dropped) = filter_scores(list, &criteria, &catalog);
    assert_eq!(dropped, 0);
    let kept: Vec<u32> = out.iter().map(|s| s.song_id).collect();
    assert_eq!(kept, vec![2, 3]);
}

#[test]
fn search_is_a_case_insensitive_substring_match() {
    let catalog = test_catalog();
    let list = vec![
        record(1, ChartType::Standard, 3, "Starlight Parade", 290.0),
        record(2, ChartType::Dx, 2, "Neon Cascade", 250.0),
    ];

    let criteria = FilterCriteria {
        search: "STARLIGHT".to_string(),
        ..FilterCriteria::default()
    };
    let (out, _) = filter_scores(list.clone(), &criteria, &catalog);
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].song_id, 1);

    // Substrings in the middle of the title match too.
    let criteria = FilterCriteria {
        search: "cas".to_string(),
        ..FilterCriteria::default()
    };
    let (out, _) = filter_scores(list, &criteria, &catalog);
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].song_id, 2);
}

#[test]
fn version_filter_window_is_half_open() {
    let catalog = test_catalog();
    // Quiet Motion's single chart is versioned 22000.
    let list = vec![record(3, ChartType::Standard, 0, "Quiet Motion", 200.0)];

    let matching = FilterCriteria {
        versions: vec![22000],
        ..FilterCriteria::default()
    };
    let (out, _) = filter_scores(list.clone(), &matching, &catalog);
    assert_eq!(out.len(), 1);

    // 22000 is exactly one window past 21000 and must fall outside it.
    let previous = FilterCriteria {
        versions: vec![21000],
        ..FilterCriteria::default()
    };
    let (out, _) = filter_scores(list, &previous, &catalog);
    assert!(out.is_empty());
}

#[test]
fn level_range_bounds_are_inclusive() {
    let catalog = test_catalog();
    let list = vec![
        record(1, ChartType::Standard, 3, "Starlight Parade", 290.0), // 13.5
        record(1, ChartType::Standard, 4, "Starlight Parade", 300.0), // 14.7
        record(3, ChartType::Standard, 0, "Quiet Motion", 200.0),     // 13.0
    ];
    let criteria = FilterCriteria {
        level_range: (13.0, 13.9),
        ..FilterCriteria::default()
    };

    let (out, dropped) = filter_scores(list, &criteria, &catalog);
    assert_eq!(dropped, 0);
    let mut kept: Vec<_> = out.iter().map(|s| (s.song_id, s.level_index)).collect();
    kept.sort();
    assert_eq!(kept, vec![(1, 3), (3, 0)]);
}

#[test]
fn flipping_direction_reverses_distinct_ratings() {
    let catalog = test_catalog();
    let mut ascending = vec![
        record(1, ChartType::Standard, 0, "Starlight Parade", 100.0),
        record(1, ChartType::Standard, 1, "Starlight Parade", 200.0),
        record(2, ChartType::Dx, 0, "Neon Cascade", 300.0),
    ];
    let mut descending = ascending.clone();

    sort_scores(&mut ascending, SortKey::Rating, SortDirection::Ascending, &catalog);
    sort_scores(&mut descending, SortKey::Rating, SortDirection::Descending, &catalog);

    let up: Vec<_> = ascending.iter().map(|s| s.key()).collect();
    let mut down: Vec<_> = descending.iter().map(|s| s.key()).collect();
    down.reverse();
    assert_eq!(up, down);
}

#[test]
fn sort_ties_fall_back_to_record_key() {
    let catalog = test_catalog();
    // Same rating everywhere; only the key tie-break decides the order.
    let mut shuffled = vec![
        record(2, ChartType::Dx, 1, "Neon Cascade", 250.0),
        record(1, ChartType::Standard, 2, "Starlight Parade", 250.0),
        record(1, ChartType::Standard, 0, "Starlight Parade", 250.0),
        record(3, ChartType::Standard, 0, "Quiet Motion", 250.0),
    ];
    sort_scores(&mut shuffled, SortKey::Rating, SortDirection::Descending, &catalog);

    let keys: Vec<_> = shuffled.iter().map(|s| s.key()).collect();
    let mut expected = keys.clone();
    expected.sort();
    assert_eq!(keys, expected);
}

#[test]
fn level_sort_is_deterministic_with_unresolved_records() {
    let catalog = test_catalog();
    let mut a = vec![
        record(999, ChartType::Standard, 0, "Ghost Track", 100.0),
        record(1, ChartType::Standard, 3, "Starlight Parade", 290.0),
        record(998, ChartType::Dx, 1, "Another Ghost", 120.0),
    ];
    let mut b = a.clone();
    b.reverse();

    sort_scores(&mut a, SortKey::LevelValue, SortDirection::Descending, &catalog);
    sort_scores(&mut b, SortKey::LevelValue, SortDirection::Descending, &catalog);

    let a_keys: Vec<_> = a.iter().map(|s| s.key()).collect();
    let b_keys: Vec<_> = b.iter().map(|s| s.key()).collect();
    assert_eq!(a_keys, b_keys);
}

#[test]
fn pages_partition_the_list_exactly() {
    let list: Vec<ScoreRecord> = (0..45)
        .map(|i| record(100 + i, ChartType::Standard, 0, "Song", i as f64))
        .collect();
    let pages = total_pages(list.len(), PAGE_SIZE);
    assert_eq!(pages, 3);

    let mut rebuilt = Vec::new();
    for page in 1..=pages {
        rebuilt.extend(paginate(&list, PAGE_SIZE, page));
    }
    assert_eq!(rebuilt.len(), list.len());
    let keys: Vec<_> = rebuilt.iter().map(|s| s.key()).collect();
    let expected: Vec<_> = list.iter().map(|s| s.key()).collect();
    assert_eq!(keys, expected);

    assert_eq!(paginate(&list, PAGE_SIZE, 3).len(), 5);
}

#[test]
fn out_of_range_pages_clamp_instead_of_emptying() {
    let list: Vec<ScoreRecord> = (0..25)
        .map(|i| record(100 + i, ChartType::Standard, 0, "Song", i as f64))
        .collect();
    let keys = |page: usize| -> Vec<(u32, ChartType, u32)> {
        paginate(&list, PAGE_SIZE, page)
            .iter()
            .map(|s| s.key())
            .collect()
    };
    assert_eq!(keys(0), keys(1));
    assert_eq!(keys(99), keys(2));
    assert!(paginate(&[], PAGE_SIZE, 1).is_empty());
}

#[test]
fn expand_unplayed_fills_catalog_gaps_without_duplicates() {
    let catalog = test_catalog();
    let raw = vec![record(1, ChartType::Standard, 3, "Starlight Parade", 290.0)];

    let expanded = expand_unplayed(&raw, &catalog);
    // Ten charts in the catalog, one already played.
    assert_eq!(expanded.len(), 10);

    let mut keys: Vec<_> = expanded.iter().map(|s| s.key()).collect();
    keys.sort();
    keys.dedup();
    assert_eq!(keys.len(), expanded.len());

    let placeholders = expanded.iter().filter(|s| s.is_unplayed()).count();
    assert_eq!(placeholders, 9);
    assert!(!expanded[0].is_unplayed());
}

#[test]
fn recompute_hides_unplayed_unless_requested() {
    let catalog = test_catalog();
    let raw = vec![record(1, ChartType::Standard, 3, "Starlight Parade", 290.0)];
    let mut criteria = FilterCriteria::default();

    let view = recompute(
        &raw,
        &catalog,
        Game::Deluxe,
        &criteria,
        SortKey::Rating,
        SortDirection::Descending,
        1,
    );
    assert_eq!(view.total_filtered, 1);
    assert_eq!(view.summary.total, 290.0);

    criteria.show_unplayed = true;
    let view = recompute(
        &raw,
        &catalog,
        Game::Deluxe,
        &criteria,
        SortKey::Rating,
        SortDirection::Descending,
        1,
    );
    assert_eq!(view.total_filtered, 10);
    // Placeholders never contribute to the rating aggregates.
    assert_eq!(view.summary.total, 290.0);
}

#[test]
fn recompute_writes_back_a_clamped_page() {
    let catalog = test_catalog();
    let raw = vec![record(1, ChartType::Standard, 3, "Starlight Parade", 290.0)];
    let view = recompute(
        &raw,
        &catalog,
        Game::Deluxe,
        &FilterCriteria::default(),
        SortKey::Rating,
        SortDirection::Descending,
        99,
    );
    assert_eq!(view.total_pages, 1);
    assert_eq!(view.page, 1);
    assert_eq!(view.page_items.len(), 1);
}

#[test]
fn deluxe_band_shares_follow_band_counts() {
    // Fifty equal ratings split 35/15, so the shares must follow the counts.
    let list: Vec<ScoreRecord> = (0..50)
        .map(|i| record(100 + i, ChartType::Standard, 0, "Song", 10.0))
        .collect();
    let summary = aggregate_rating(&list, Game::Deluxe);

    assert_eq!(summary.total, 500.0);
    assert_eq!(summary.bands.len(), 2);
    assert_eq!(summary.bands[0].count, 35);
    assert_eq!(summary.bands[0].value, 350.0);
    assert_eq!(summary.bands[0].share, 70);
    assert_eq!(summary.bands[1].count, 15);
    assert_eq!(summary.bands[1].value, 150.0);
    assert_eq!(summary.bands[1].share, 30);
}

#[test]
fn chroma_bands_report_floored_means() {
    // 30 at 17.0, 10 at 16.0, 10 at 15.0 land in the three bands in order.
    let mut list = Vec::new();
    for i in 0..30 {
        list.push(record(100 + i, ChartType::Standard, 0, "Song", 17.0));
    }
    for i in 0..10 {
        list.push(record(200 + i, ChartType::Standard, 0, "Song", 16.0));
    }
    for i in 0..10 {
        list.push(record(300 + i, ChartType::Standard, 0, "Song", 15.0));
    }
    let summary = aggregate_rating(&list, Game::Chroma);

    assert_eq!(summary.bands.len(), 3);
    assert_eq!(summary.bands[0].value, 17.0);
    assert_eq!(summary.bands[1].value, 16.0);
    assert_eq!(summary.bands[2].value, 15.0);

    // The middle band is excluded from the share split by convention.
    assert_eq!(summary.bands[0].share, 53);
    assert_eq!(summary.bands[1].share, 0);
    assert_eq!(summary.bands[2].share, 47);

    // Weighted over the outer band counts: (17*30 + 15*10) / 40.
    assert_eq!(summary.total, 16.5);
}

#[test]
fn chroma_means_truncate_to_two_decimals() {
    let list: Vec<ScoreRecord> = (0..3)
        .map(|i| record(100 + i, ChartType::Standard, 0, "Song", 16.999))
        .collect();
    let summary = aggregate_rating(&list, Game::Chroma);
    assert_eq!(summary.bands[0].value, 16.99);
}

#[test]
fn empty_list_aggregates_to_zero() {
    for game in [Game::Deluxe, Game::Chroma] {
        let summary = aggregate_rating(&[], game);
        assert_eq!(summary.total, 0.0);
        assert!(summary.bands.iter().all(|b| b.value == 0.0));
        assert!(summary.bands.iter().all(|b| b.share == 0));
        assert!(summary.bands.iter().all(|b| b.count == 0));
    }
}

#[test]
fn reset_keeps_the_unplayed_toggle() {
    let mut criteria = FilterCriteria {
        search: "neon".to_string(),
        genres: vec!["pop".to_string()],
        show_unplayed: true,
        ..FilterCriteria::default()
    };
    assert!(!criteria.is_default());

    criteria.reset();
    assert!(criteria.is_default());
    assert!(criteria.show_unplayed);
}
