use std::fs;
use std::path::PathBuf;

use chrono::{TimeZone, Utc};

use odds_terminal::preview_fetch::parse_preview_json;
use odds_terminal::snapshot::parse_snapshot_json;

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

fn fixture_now() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()
}

#[test]
fn parses_snapshot_fixture() {
    let raw = read_fixture("data.json");
    let snapshot = parse_snapshot_json(&raw, fixture_now()).expect("fixture should parse");

    // Duplicate id, past kickoff, non-object entry, and missing id are dropped.
    assert_eq!(snapshot.upcoming.len(), 3);
    assert_eq!(snapshot.finished.len(), 2);
}

#[test]
fn snapshot_coerces_numeric_ids() {
    let raw = read_fixture("data.json");
    let snapshot = parse_snapshot_json(&raw, fixture_now()).expect("fixture should parse");
    assert!(snapshot.upcoming.iter().any(|row| row.id == "2001"));
}

#[test]
fn upcoming_sorted_ascending_unknown_kickoff_last() {
    let raw = read_fixture("data.json");
    let snapshot = parse_snapshot_json(&raw, fixture_now()).expect("fixture should parse");
    let ids: Vec<&str> = snapshot.upcoming.iter().map(|row| row.id.as_str()).collect();
    assert_eq!(ids, vec!["2001", "2002", "2004"]);
}

#[test]
fn finished_sorted_descending() {
    let raw = read_fixture("data.json");
    let snapshot = parse_snapshot_json(&raw, fixture_now()).expect("fixture should parse");
    let ids: Vec<&str> = snapshot.finished.iter().map(|row| row.id.as_str()).collect();
    assert_eq!(ids, vec!["1002", "1001"]);
}

#[test]
fn snapshot_time_labels_follow_view() {
    let raw = read_fixture("data.json");
    let snapshot = parse_snapshot_json(&raw, fixture_now()).expect("fixture should parse");

    let upcoming = &snapshot.upcoming[0];
    assert_eq!(upcoming.time, "18:30");

    let finished = snapshot
        .finished
        .iter()
        .find(|row| row.id == "1001")
        .expect("finished fixture row");
    assert_eq!(finished.time, "01/05 20:00");
    assert_eq!(finished.score.as_deref(), Some("2:1"));
}

#[test]
fn snapshot_preserves_raw_handicap_text() {
    let raw = read_fixture("data.json");
    let snapshot = parse_snapshot_json(&raw, fixture_now()).expect("fixture should parse");
    let row = snapshot
        .finished
        .iter()
        .find(|row| row.id == "1001")
        .expect("finished fixture row");
    assert_eq!(row.handicap, "\u{2212}1.5");
}

#[test]
fn null_snapshot_is_empty() {
    let snapshot = parse_snapshot_json("null", fixture_now()).expect("null should parse");
    assert!(snapshot.upcoming.is_empty());
    assert!(snapshot.finished.is_empty());

    let snapshot = parse_snapshot_json("", fixture_now()).expect("empty should parse");
    assert!(snapshot.upcoming.is_empty());
}

#[test]
fn parses_preview_fixture() {
    let raw = read_fixture("preview.json");
    let preview = parse_preview_json(&raw).expect("fixture should parse");

    assert_eq!(preview.home_team, "Deportivo Norte");
    let form = preview.recent_form.expect("recent form");
    assert_eq!(form.home_wins, 3);
    assert_eq!(form.away_total, 5);

    let last_home = preview.last_home.expect("last home card");
    assert_eq!(last_home.score.as_deref(), Some("2:0"));
    assert_eq!(last_home.date.as_deref(), Some("2026-05-30"));
    assert_eq!(last_home.stats_rows.len(), 2);
    assert_eq!(last_home.cover_status.as_deref(), Some("CUBIERTO"));

    let h2h = preview.h2h.expect("h2h card");
    assert_eq!(h2h.score.as_deref(), Some("3:2"));
}

#[test]
fn preview_error_payload_is_err() {
    assert!(parse_preview_json(r#"{"error": "partido no encontrado"}"#).is_err());
    assert!(parse_preview_json("null").is_err());
    assert!(parse_preview_json("[1, 2]").is_err());
}
