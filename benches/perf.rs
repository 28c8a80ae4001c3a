use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

use chrono::{TimeZone, Utc};

use odds_terminal::handicap::{handicap_options, normalize_to_half_bucket};
use odds_terminal::preview_fetch::parse_preview_json;
use odds_terminal::snapshot::parse_snapshot_json;

const RAW_HANDICAPS: [&str; 10] = [
    "0", "-0.5", "1/1.5", "+0,25", "\u{2212}1.5", "0/0.5", "-1.5/-2", "2.75", "abc", "N/A",
];

fn bench_normalize(c: &mut Criterion) {
    c.bench_function("normalize_handicap", |b| {
        b.iter(|| {
            for raw in RAW_HANDICAPS {
                black_box(normalize_to_half_bucket(black_box(Some(raw))));
            }
        })
    });
}

fn bench_options(c: &mut Criterion) {
    let values: Vec<String> = (0..500)
        .map(|i| format!("{}", (i as f64 - 250.0) * 0.25))
        .collect();

    c.bench_function("handicap_options", |b| {
        b.iter(|| {
            let options = handicap_options(values.iter().map(|v| Some(v.as_str())));
            black_box(options.len());
        })
    });
}

fn bench_snapshot_parse(c: &mut Criterion) {
    let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
    c.bench_function("snapshot_parse", |b| {
        b.iter(|| {
            let snapshot = parse_snapshot_json(black_box(SNAPSHOT_JSON), now).unwrap();
            black_box(snapshot.upcoming.len());
        })
    });
}

fn bench_preview_parse(c: &mut Criterion) {
    c.bench_function("preview_parse", |b| {
        b.iter(|| {
            let preview = parse_preview_json(black_box(PREVIEW_JSON)).unwrap();
            black_box(preview.home_team.len());
        })
    });
}

criterion_group!(
    perf,
    bench_normalize,
    bench_options,
    bench_snapshot_parse,
    bench_preview_parse
);
criterion_main!(perf);

static SNAPSHOT_JSON: &str = include_str!("../tests/fixtures/data.json");
static PREVIEW_JSON: &str = include_str!("../tests/fixtures/preview.json");
