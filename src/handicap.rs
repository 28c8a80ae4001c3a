//! Asian-handicap line normalization.
//!
//! Scraped handicap text arrives in several shapes: plain decimals
//! (`"-0.5"`), comma decimals (`"+0,25"`), Unicode minus, and split lines in
//! slash notation (`"1/1.5"` meaning a stake split across two lines). For
//! grouping and filtering, every shape is collapsed onto the conventional
//! grid of whole and half-point lines, with quarter lines (`.25`, `.75`)
//! joining the adjacent half-line.

/// Parses raw handicap text into a signed value.
///
/// Slash notation averages its segments; every segment (and any plain value)
/// must match a strict signed-decimal pattern after normalization, otherwise
/// the whole parse yields `None`.
pub fn parse_handicap(text: Option<&str>) -> Option<f64> {
    let raw = text?.trim();
    if raw.is_empty() {
        return None;
    }

    if raw.contains('/') {
        // An empty segment fails the whole parse; "1//2" is not a partial
        // average of 1 and 2.
        let mut values = Vec::new();
        for segment in raw.split('/') {
            values.push(parse_number_clean(segment)?);
        }
        return Some(values.iter().sum::<f64>() / values.len() as f64);
    }

    parse_number_clean(raw)
}

/// Normalizes one numeric token and parses it.
///
/// Unicode minus becomes ASCII `-`, comma decimals become `.`, and `+` and
/// spaces are dropped outright. What remains must be an optional `-`, digits,
/// and at most one `.` followed by digits.
fn parse_number_clean(raw: &str) -> Option<f64> {
    let mut cleaned = String::with_capacity(raw.len());
    for ch in raw.trim().chars() {
        match ch {
            '\u{2212}' => cleaned.push('-'),
            ',' => cleaned.push('.'),
            '+' | ' ' => {}
            other => cleaned.push(other),
        }
    }

    if !is_clean_number(&cleaned) {
        return None;
    }
    cleaned.parse::<f64>().ok()
}

fn is_clean_number(text: &str) -> bool {
    let digits = text.strip_prefix('-').unwrap_or(text);
    let (int_part, frac_part) = match digits.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (digits, None),
    };
    if int_part.is_empty() || !int_part.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    match frac_part {
        Some(frac) => !frac.is_empty() && frac.bytes().all(|b| b.is_ascii_digit()),
        None => true,
    }
}

/// Snaps a parsed handicap onto the nearest half-point line.
///
/// Quarter lines collapse onto the adjacent half-line. The tolerances here
/// (`1e-9` floor guard, `1e-6` exact check, `0.26` fallback catchment) define
/// the bucketing's edge behavior and are deliberate.
pub fn bucket_to_half(value: f64) -> f64 {
    if value == 0.0 {
        return 0.0;
    }
    let sign = if value < 0.0 { -1.0 } else { 1.0 };
    let av = value.abs();
    let base = (av + 1e-9).floor();
    let frac = av - base;

    let close = |a: f64, b: f64| (a - b).abs() < 1e-6;

    let magnitude = if close(frac, 0.0) {
        base
    } else if close(frac, 0.5) || close(frac, 0.25) || close(frac, 0.75) {
        base + 0.5
    } else {
        let mut rounded = (av * 2.0).round() / 2.0;
        // Near-quarter values that missed the exact check above still belong
        // on the half-line, not the integer line they rounded to.
        let rounded_frac = rounded - rounded.floor();
        if close(rounded_frac, 0.0)
            && ((av - (rounded.floor() + 0.25)).abs() < 0.26
                || (av - (rounded.floor() + 0.75)).abs() < 0.26)
        {
            rounded = rounded.floor() + 0.5;
        }
        rounded
    };

    sign * magnitude
}

/// Full pipeline: parse, bucket, render with one decimal digit.
///
/// Total over arbitrary input; anything unparseable maps to `None`.
pub fn normalize_to_half_bucket(text: Option<&str>) -> Option<String> {
    let value = parse_handicap(text)?;
    Some(format!("{:.1}", bucket_to_half(value)))
}

/// Distinct normalized buckets for a set of raw values, sorted ascending by
/// numeric value (not lexicographically, so `"-0.5"` precedes `"0.5"`).
pub fn handicap_options<'a, I>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    let mut options: Vec<String> = values
        .into_iter()
        .filter_map(normalize_to_half_bucket)
        .collect();
    options.sort_by(|a, b| {
        let a = a.parse::<f64>().unwrap_or(0.0);
        let b = b.parse::<f64>().unwrap_or(0.0);
        a.partial_cmp(&b).unwrap_or(std::cmp::Ordering::Equal)
    });
    options.dedup();
    options
}
