use std::fs;
use std::path::PathBuf;

use score_terminal::alias::{merge_votes, parse_alias_page_json, parse_votes_json};
use score_terminal::catalog::{Catalog, ChartType, parse_catalog_json};
use score_terminal::profile::parse_profile_json;
use score_terminal::scores::{parse_scores_json, sort_history};

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

#[test]
fn parses_catalog_fixture() {
    let raw = read_fixture("catalog.json");
    let catalog = parse_catalog_json(&raw).expect("fixture should parse");

    assert_eq!(catalog.songs.len(), 2);
    assert_eq!(catalog.genres.len(), 2);
    assert_eq!(catalog.versions.len(), 2);

    let song = catalog.find_song(1).expect("song 1 should resolve");
    assert_eq!(song.title, "Starlight Parade");
    assert_eq!(song.charts(ChartType::Standard).len(), 4);
    assert!(song.charts(ChartType::Dx).is_empty());

    let chart = catalog
        .chart(2, ChartType::Dx, 2)
        .expect("chart should resolve");
    assert_eq!(chart.level_value, 14.0);
    assert_eq!(chart.version, 23500);

    assert!(catalog.find_song(999).is_none());
    assert!(catalog.chart(1, ChartType::Standard, 9).is_none());
}

#[test]
fn tier_count_tracks_the_longest_chart_list() {
    let raw = read_fixture("catalog.json");
    let catalog = parse_catalog_json(&raw).expect("fixture should parse");
    assert_eq!(catalog.tier_count(), 4);
    assert_eq!(Catalog::default().tier_count(), 0);
}

#[test]
fn catalog_null_is_empty() {
    let catalog = parse_catalog_json("null").expect("null should parse");
    assert!(catalog.is_empty());
    let catalog = parse_catalog_json("  ").expect("blank should parse");
    assert!(catalog.is_empty());
}

#[test]
fn parses_scores_fixture() {
    let raw = read_fixture("scores.json");
    let scores = parse_scores_json(&raw).expect("fixture should parse");
    assert_eq!(scores.len(), 2);

    let first = &scores[0];
    assert_eq!(first.song_id, 1);
    assert_eq!(first.rating, 294.3);
    assert_eq!(first.chart_type, ChartType::Standard);
    assert_eq!(first.key(), (1, ChartType::Standard, 3));
    assert_eq!(first.play_time.as_deref(), Some("2026-07-30 21:14:02"));

    // The second record omits the optional fields entirely.
    let second = &scores[1];
    assert_eq!(second.chart_type, ChartType::Dx);
    assert_eq!(second.rating, 0.0);
    assert_eq!(second.dx_score, 0);
    assert!(second.fc.is_empty());
    assert!(second.play_time.is_none());
}

#[test]
fn scores_null_is_empty() {
    assert!(parse_scores_json("null").expect("null should parse").is_empty());
    assert!(parse_scores_json("").expect("blank should parse").is_empty());
}

#[test]
fn failure_envelope_surfaces_the_message() {
    let raw = r#"{ "success": false, "message": "invalid token" }"#;
    let err = parse_scores_json(raw).expect_err("failure envelope should error");
    assert!(err.to_string().contains("invalid token"));
}

#[test]
fn parses_alias_fixture_and_merges_votes() {
    let raw = read_fixture("aliases.json");
    let mut page = parse_alias_page_json(&raw).expect("fixture should parse");
    assert_eq!(page.page_count, 3);
    assert_eq!(page.aliases.len(), 2);
    assert_eq!(page.aliases[0].alias, "star");
    assert_eq!(page.aliases[0].weight.total, 4);
    assert!(page.aliases[1].approved);
    // Weight block missing on the second entry defaults to zero.
    assert_eq!(page.aliases[1].weight.total, 0);

    let votes = parse_votes_json(&read_fixture("votes.json")).expect("votes should parse");
    assert_eq!(votes.len(), 2);
    assert_eq!(votes[1].vote_id, None);

    merge_votes(&mut page.aliases, &votes);
    assert_eq!(page.aliases[0].vote.map(|v| v.weight), Some(1));
    assert!(page.aliases[1].vote.is_none());
}

#[test]
fn alias_null_is_empty() {
    let page = parse_alias_page_json("null").expect("null should parse");
    assert_eq!(page.page_count, 0);
    assert!(page.aliases.is_empty());
}

#[test]
fn parses_profile_fixture() {
    let raw = read_fixture("profile.json");
    let profile = parse_profile_json(&raw)
        .expect("fixture should parse")
        .expect("profile should be present");
    assert_eq!(profile.name, "nightowl");
    assert_eq!(profile.binds.len(), 2);
    assert_eq!(profile.binds[0].rating, Some(15230.0));
    assert!(profile.binds[1].friend_code.is_none());
}

#[test]
fn profile_null_is_none() {
    assert!(parse_profile_json("null").expect("null should parse").is_none());
}

#[test]
fn envelope_without_data_field_means_no_rows() {
    let profile = parse_profile_json(r#"{ "success": true }"#).expect("should parse");
    assert!(profile.is_none());

    let scores = parse_scores_json(r#"{ "success": true }"#).expect("should parse");
    assert!(scores.is_empty());

    let page = parse_alias_page_json(r#"{ "success": true }"#).expect("should parse");
    assert!(page.aliases.is_empty());
}

#[test]
fn history_sorts_oldest_upload_first() {
    let raw = read_fixture("scores.json");
    let mut history = parse_scores_json(&raw).expect("fixture should parse");
    history.reverse();
    sort_history(&mut history);
    assert_eq!(history[0].upload_time, "2026-08-01 10:00:00");
    assert_eq!(history[1].upload_time, "2026-08-02 10:00:00");
}
