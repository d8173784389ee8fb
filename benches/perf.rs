use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use score_terminal::catalog::ChartType;
use score_terminal::processor::{
    FilterCriteria, SortDirection, SortKey, expand_unplayed, filter_scores, recompute, sort_scores,
};
use score_terminal::provider::demo_inputs;
use score_terminal::state::Game;

fn bench_recompute_default(c: &mut Criterion) {
    let (catalog, scores) = demo_inputs(Game::Deluxe);
    let criteria = FilterCriteria::default();
    c.bench_function("recompute_default", |b| {
        b.iter(|| {
            let view = recompute(
                black_box(&scores),
                &catalog,
                Game::Deluxe,
                &criteria,
                SortKey::Rating,
                SortDirection::Descending,
                1,
            );
            black_box(view.total_filtered);
        })
    });
}

fn bench_recompute_filtered(c: &mut Criterion) {
    let (catalog, scores) = demo_inputs(Game::Deluxe);
    let criteria = FilterCriteria {
        chart_types: vec![ChartType::Standard],
        level_range: (10.0, 14.0),
        show_unplayed: true,
        ..FilterCriteria::default()
    };
    c.bench_function("recompute_filtered_expanded", |b| {
        b.iter(|| {
            let view = recompute(
                black_box(&scores),
                &catalog,
                Game::Deluxe,
                &criteria,
                SortKey::LevelValue,
                SortDirection::Ascending,
                2,
            );
            black_box(view.total_filtered);
        })
    });
}

fn bench_filter_pass(c: &mut Criterion) {
    let (catalog, scores) = demo_inputs(Game::Chroma);
    let expanded = expand_unplayed(&scores, &catalog);
    let criteria = FilterCriteria {
        search: "neon".to_string(),
        genres: vec!["electronic".to_string()],
        ..FilterCriteria::default()
    };
    c.bench_function("filter_expanded_list", |b| {
        b.iter(|| {
            let (kept, dropped) = filter_scores(black_box(expanded.clone()), &criteria, &catalog);
            black_box((kept.len(), dropped));
        })
    });
}

fn bench_sort_by_level(c: &mut Criterion) {
    let (catalog, scores) = demo_inputs(Game::Deluxe);
    let expanded = expand_unplayed(&scores, &catalog);
    c.bench_function("sort_by_level_value", |b| {
        b.iter(|| {
            let mut list = expanded.clone();
            sort_scores(
                &mut list,
                SortKey::LevelValue,
                SortDirection::Descending,
                &catalog,
            );
            black_box(list.len());
        })
    });
}

criterion_group!(
    benches,
    bench_recompute_default,
    bench_recompute_filtered,
    bench_filter_pass,
    bench_sort_by_level
);
criterion_main!(benches);
