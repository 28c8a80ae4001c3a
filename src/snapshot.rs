//! Loading and preparation of the scraped odds snapshot (`data.json`).
//!
//! The snapshot is produced by an external scraper and is only loosely
//! structured: ids may be numbers or strings, fields go missing, and whole
//! sections may be `null`. Parsing walks the JSON tolerantly and never fails
//! on a malformed entry, only on an unreadable document.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Datelike, NaiveDateTime, Utc};
use serde_json::Value;

/// One row of the match table. `handicap` and `goal_line` stay raw text;
/// normalization happens at filter time.
#[derive(Debug, Clone)]
pub struct MatchRow {
    pub id: String,
    pub home_team: String,
    pub away_team: String,
    pub time: String,
    pub handicap: String,
    pub goal_line: String,
    pub score: Option<String>,
    pub kickoff_utc: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchView {
    Upcoming,
    Finished,
}

#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub upcoming: Vec<MatchRow>,
    pub finished: Vec<MatchRow>,
}

pub fn load_snapshot(path: &Path) -> Result<Snapshot> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read snapshot {}", path.display()))?;
    parse_snapshot_json(&raw, Utc::now())
}

pub fn parse_snapshot_json(raw: &str, now: DateTime<Utc>) -> Result<Snapshot> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Snapshot::default());
    }

    let root: Value = serde_json::from_str(trimmed).context("invalid snapshot json")?;
    let upcoming = prepare_matches(root.get("upcoming_matches"), MatchView::Upcoming, now);
    let finished = prepare_matches(root.get("finished_matches"), MatchView::Finished, now);
    Ok(Snapshot { upcoming, finished })
}

/// Builds table rows from one raw match list: de-dupes by id, resolves
/// kickoff timestamps, drops upcoming matches already in the past, and sorts
/// upcoming ascending (unparseable kickoffs last) / finished descending
/// (unparseable kickoffs first).
pub fn prepare_matches(value: Option<&Value>, view: MatchView, now: DateTime<Utc>) -> Vec<MatchRow> {
    let mut rows = Vec::new();
    let Some(list) = value.and_then(|v| v.as_array()) else {
        return rows;
    };

    let mut seen: HashSet<String> = HashSet::new();
    for entry in list {
        let Some(row) = parse_match_row(entry, view) else {
            continue;
        };
        if !seen.insert(row.id.clone()) {
            continue;
        }
        if view == MatchView::Upcoming {
            if let Some(kickoff) = row.kickoff_utc {
                if kickoff < now {
                    continue;
                }
            }
        }
        rows.push(row);
    }

    match view {
        MatchView::Upcoming => rows.sort_by(|a, b| match (a.kickoff_utc, b.kickoff_utc) {
            (Some(ka), Some(kb)) => ka.cmp(&kb),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        }),
        MatchView::Finished => rows.sort_by(|a, b| match (a.kickoff_utc, b.kickoff_utc) {
            (Some(ka), Some(kb)) => kb.cmp(&ka),
            (Some(_), None) => std::cmp::Ordering::Greater,
            (None, Some(_)) => std::cmp::Ordering::Less,
            (None, None) => std::cmp::Ordering::Equal,
        }),
    }

    rows
}

fn parse_match_row(entry: &Value, view: MatchView) -> Option<MatchRow> {
    if !entry.is_object() {
        return None;
    }
    let id = pick_string(entry, &["id"]).unwrap_or_default();
    if id.is_empty() {
        return None;
    }

    let kickoff_utc = pick_string(entry, &["time_obj", "match_datetime"])
        .as_deref()
        .and_then(parse_match_datetime)
        .or_else(|| {
            let date = pick_string(entry, &["match_date"])?;
            let time = pick_string(entry, &["match_time"])?;
            parse_match_datetime(&format!("{date} {time}"))
        });

    let time = pick_string(entry, &["time"])
        .filter(|t| !t.is_empty())
        .or_else(|| {
            kickoff_utc.map(|dt| match view {
                MatchView::Upcoming => dt.format("%H:%M").to_string(),
                MatchView::Finished => dt.format("%d/%m %H:%M").to_string(),
            })
        })
        .unwrap_or_default();

    let score = if view == MatchView::Finished {
        pick_string(entry, &["score"]).filter(|s| !s.is_empty())
    } else {
        None
    };

    Some(MatchRow {
        id,
        home_team: pick_string(entry, &["home_team"]).unwrap_or_else(|| "N/A".to_string()),
        away_team: pick_string(entry, &["away_team"]).unwrap_or_else(|| "N/A".to_string()),
        time,
        handicap: pick_string(entry, &["handicap"]).unwrap_or_else(|| "N/A".to_string()),
        goal_line: pick_string(entry, &["goal_line"]).unwrap_or_else(|| "N/A".to_string()),
        score,
        kickoff_utc,
    })
}

/// Accepts the timestamp shapes the scraper has been seen to emit, including
/// day-first forms without a year (resolved against the current year).
pub fn parse_match_datetime(raw: &str) -> Option<DateTime<Utc>> {
    const FULL_FORMATS: [&str; 5] = [
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S",
        "%Y/%m/%d %H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ];
    const YEARLESS_FORMATS: [&str; 2] = ["%d/%m %H:%M", "%d-%m %H:%M"];

    let cleaned = raw.trim();
    if cleaned.is_empty() {
        return None;
    }

    for fmt in FULL_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(cleaned, fmt) {
            return Some(dt.and_utc());
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(cleaned) {
        return Some(dt.with_timezone(&Utc));
    }

    let year = Utc::now().year();
    for fmt in YEARLESS_FORMATS {
        let with_year = format!("{year} {cleaned}");
        if let Ok(dt) = NaiveDateTime::parse_from_str(&with_year, &format!("%Y {fmt}")) {
            return Some(dt.and_utc());
        }
    }
    None
}

fn pick_string(value: &Value, keys: &[&str]) -> Option<String> {
    for key in keys {
        match value.get(*key) {
            Some(Value::String(s)) => {
                let trimmed = s.trim();
                if !trimmed.is_empty() {
                    return Some(trimmed.to_string());
                }
            }
            Some(Value::Number(n)) => return Some(n.to_string()),
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn datetime_formats_parse() {
        assert!(parse_match_datetime("2026-08-29T18:30:00").is_some());
        assert!(parse_match_datetime("2026/08/29 18:30:00").is_some());
        assert!(parse_match_datetime("29/08 18:30").is_some());
        assert!(parse_match_datetime("tonight").is_none());
    }

    #[test]
    fn finished_sort_puts_unknown_kickoffs_first() {
        let raw = serde_json::json!([
            {"id": "1", "time_obj": "2026-05-01T20:00:00"},
            {"id": "2"},
            {"id": "3", "time_obj": "2026-05-03T17:00:00"}
        ]);
        let rows = prepare_matches(Some(&raw), MatchView::Finished, Utc::now());
        let ids: Vec<&str> = rows.iter().map(|row| row.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "3", "1"]);
    }

    #[test]
    fn null_document_is_empty() {
        let snapshot = parse_snapshot_json("null", Utc::now()).expect("null should parse");
        assert!(snapshot.upcoming.is_empty());
        assert!(snapshot.finished.is_empty());
    }
}
