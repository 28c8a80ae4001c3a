use odds_terminal::handicap::{bucket_to_half, handicap_options, normalize_to_half_bucket};

#[test]
fn absent_and_malformed_input_is_none() {
    assert_eq!(normalize_to_half_bucket(None), None);
    assert_eq!(normalize_to_half_bucket(Some("")), None);
    assert_eq!(normalize_to_half_bucket(Some("   ")), None);
    assert_eq!(normalize_to_half_bucket(Some("abc")), None);
}

#[test]
fn zero_is_unsigned() {
    assert_eq!(normalize_to_half_bucket(Some("0")).as_deref(), Some("0.0"));
    assert_eq!(normalize_to_half_bucket(Some("-0")).as_deref(), Some("0.0"));
}

#[test]
fn quarter_lines_collapse_to_half_lines() {
    assert_eq!(normalize_to_half_bucket(Some("0.25")).as_deref(), Some("0.5"));
    assert_eq!(normalize_to_half_bucket(Some("0.75")).as_deref(), Some("0.5"));
    assert_eq!(
        normalize_to_half_bucket(Some("-0.25")).as_deref(),
        Some("-0.5")
    );
}

#[test]
fn whole_and_half_lines_pass_through() {
    assert_eq!(normalize_to_half_bucket(Some("1")).as_deref(), Some("1.0"));
    assert_eq!(normalize_to_half_bucket(Some("1.5")).as_deref(), Some("1.5"));
}

#[test]
fn slash_notation_buckets_the_mean() {
    // 1/1.5 averages to 1.25, a quarter line, which joins the half line.
    assert_eq!(
        normalize_to_half_bucket(Some("1/1.5")).as_deref(),
        Some("1.5")
    );
    assert_eq!(
        normalize_to_half_bucket(Some("0/0.5")).as_deref(),
        Some("0.5")
    );
    assert_eq!(
        normalize_to_half_bucket(Some("-1.5/-2")).as_deref(),
        Some("-1.5")
    );
}

#[test]
fn comma_plus_and_unicode_minus_variants() {
    assert_eq!(
        normalize_to_half_bucket(Some("+0,25")),
        normalize_to_half_bucket(Some("0.25"))
    );
    assert_eq!(
        normalize_to_half_bucket(Some("\u{2212}1.5")).as_deref(),
        Some("-1.5")
    );
}

#[test]
fn malformed_slash_expressions_are_none() {
    assert_eq!(normalize_to_half_bucket(Some("1//2")), None);
    assert_eq!(normalize_to_half_bucket(Some("1/")), None);
    assert_eq!(normalize_to_half_bucket(Some("a/2")), None);
    assert_eq!(normalize_to_half_bucket(Some("/")), None);
}

#[test]
fn rebucketing_is_a_fixed_point() {
    for raw in [
        -3.0, -2.25, -1.75, -1.1, -0.8, -0.25, 0.0, 0.2, 0.25, 0.5, 0.75, 1.25, 1.6, 2.75,
    ] {
        let once = bucket_to_half(raw);
        assert_eq!(bucket_to_half(once), once, "rebucket of {raw}");
    }
}

#[test]
fn options_sort_ascending_by_value() {
    let options = handicap_options([Some("1"), Some("-0.5"), Some("0.25")]);
    assert_eq!(options, vec!["-0.5", "0.5", "1.0"]);
}

#[test]
fn options_dedup_equivalent_representations() {
    let options = handicap_options([Some("0.25"), Some("0.75"), Some("0/0.5"), Some("+0,5")]);
    assert_eq!(options, vec!["0.5"]);
}
