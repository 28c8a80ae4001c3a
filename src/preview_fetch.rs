//! Per-match preview data from the scraper's analysis API.
//!
//! The scraper exposes `GET /api/analisis/{match_id}` returning a loosely
//! structured payload: recent-form win counts plus up to three "card" blocks
//! (last home match at home, last away match away, common rivals). Field
//! names drifted across scraper revisions, so parsing accepts the known
//! aliases and treats everything as optional.

use std::env;
use std::time::Duration;

use anyhow::{Context, Result};
use serde_json::Value;

use crate::http_cache::fetch_json_cached;
use crate::http_client::{analysis_api_base, http_client};

const DEFAULT_PREVIEW_TTL_SECS: u64 = 600;

#[derive(Debug, Clone, Default)]
pub struct PreviewData {
    pub home_team: String,
    pub away_team: String,
    pub recent_form: Option<RecentForm>,
    pub last_home: Option<RecentBlock>,
    pub last_away: Option<RecentBlock>,
    pub h2h: Option<RecentBlock>,
}

#[derive(Debug, Clone, Default)]
pub struct RecentForm {
    pub home_wins: u32,
    pub home_total: u32,
    pub away_wins: u32,
    pub away_total: u32,
}

/// One preview card: a past match with its line and outcome.
#[derive(Debug, Clone, Default)]
pub struct RecentBlock {
    pub score: Option<String>,
    pub date: Option<String>,
    pub home: Option<String>,
    pub away: Option<String>,
    pub ah: Option<String>,
    pub ou: Option<String>,
    pub cover_status: Option<String>,
    pub analysis: Option<String>,
    pub stats_rows: Vec<StatLine>,
}

#[derive(Debug, Clone)]
pub struct StatLine {
    pub home: String,
    pub label: String,
    pub away: String,
}

pub fn fetch_preview(match_id: &str) -> Result<PreviewData> {
    let client = http_client()?;
    let url = format!("{}/api/analisis/{match_id}", analysis_api_base());
    let body = fetch_json_cached(client, &url, preview_ttl()).context("request failed")?;
    parse_preview_json(&body)
}

fn preview_ttl() -> Duration {
    let secs = env::var("PREVIEW_TTL_SECS")
        .ok()
        .and_then(|val| val.parse::<u64>().ok())
        .unwrap_or(DEFAULT_PREVIEW_TTL_SECS);
    Duration::from_secs(secs)
}

pub fn parse_preview_json(raw: &str) -> Result<PreviewData> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Err(anyhow::anyhow!("empty preview payload"));
    }

    let root: Value = serde_json::from_str(trimmed).context("invalid preview json")?;
    if let Some(error) = root.get("error").and_then(|v| v.as_str()) {
        return Err(anyhow::anyhow!("analysis api error: {error}"));
    }
    if !root.is_object() {
        return Err(anyhow::anyhow!("unexpected preview payload shape"));
    }

    let recent = root
        .get("recent_indirect")
        .or_else(|| root.get("recent_indirect_full"))
        .unwrap_or(&Value::Null);

    Ok(PreviewData {
        home_team: pick_string(&root, &["home_team"]).unwrap_or_else(|| "Home".to_string()),
        away_team: pick_string(&root, &["away_team"]).unwrap_or_else(|| "Away".to_string()),
        recent_form: parse_recent_form(root.get("recent_form")),
        last_home: parse_block(recent.get("last_home")),
        last_away: parse_block(recent.get("last_away")),
        h2h: parse_block(
            recent
                .get("h2h_col3")
                .or_else(|| recent.get("h2h_general")),
        ),
    })
}

fn parse_recent_form(value: Option<&Value>) -> Option<RecentForm> {
    let form = value.filter(|v| v.is_object())?;
    let side = |key: &str, field: &str| {
        form.get(key)
            .and_then(|v| v.get(field))
            .and_then(|v| v.as_u64())
            .unwrap_or(0) as u32
    };
    Some(RecentForm {
        home_wins: side("home", "wins"),
        home_total: side("home", "total"),
        away_wins: side("away", "wins"),
        away_total: side("away", "total"),
    })
}

fn parse_block(value: Option<&Value>) -> Option<RecentBlock> {
    let block = value.filter(|v| v.is_object())?;
    Some(RecentBlock {
        score: pick_string(block, &["score", "score_line"]),
        date: pick_string(block, &["date"]).map(|d| truncate_date(&d)),
        home: pick_string(block, &["home", "home_team"]),
        away: pick_string(block, &["away", "away_team"]),
        ah: pick_string(block, &["ah"]),
        ou: pick_string(block, &["ou"]),
        cover_status: pick_string(block, &["cover_status"]),
        analysis: pick_string(block, &["analysis"]),
        stats_rows: parse_stats_rows(block.get("stats_rows")),
    })
}

fn parse_stats_rows(value: Option<&Value>) -> Vec<StatLine> {
    let mut rows = Vec::new();
    let Some(list) = value.and_then(|v| v.as_array()) else {
        return rows;
    };
    for entry in list {
        let label = pick_string(entry, &["label"]).unwrap_or_default();
        if label.is_empty() {
            continue;
        }
        rows.push(StatLine {
            home: pick_string(entry, &["home"]).unwrap_or_else(|| "-".to_string()),
            label,
            away: pick_string(entry, &["away"]).unwrap_or_else(|| "-".to_string()),
        });
    }
    rows
}

/// Scraped dates sometimes carry a time suffix; the cards only show the
/// first ten characters. Cut on a char boundary, the text is not always
/// ASCII.
fn truncate_date(raw: &str) -> String {
    match raw.char_indices().nth(10) {
        Some((idx, _)) => raw[..idx].to_string(),
        None => raw.to_string(),
    }
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
