mod common;

use chrono::{TimeZone, Utc};
use rustc_hash::FxHashMap;

use rubriq::scoring::{
    aggregate, Confidence, GateThresholds, ItemScore, Rubric, Verdict, DEFAULT_CONFLICT_RANGE,
};

use common::review_rubric;

fn candidates(
    entries: Vec<ItemScore>,
) -> FxHashMap<String, Vec<ItemScore>> {
    let mut map: FxHashMap<String, Vec<ItemScore>> = FxHashMap::default();
    for score in entries {
        map.entry(score.item.clone()).or_default().push(score);
    }
    map
}

#[test]
fn high_confidence_keeps_the_raw_score() {
    let score = ItemScore::new("naming", "readability", 8.0, 10.0);
    assert_eq!(score.adjusted(), 8.0);
}

#[test]
fn medium_confidence_discounts_by_fifteen_percent() {
    let score = ItemScore::new("naming", "readability", 10.0, 10.0)
        .with_confidence(Confidence::Medium);
    assert!((score.adjusted() - 8.5).abs() < 1e-9);
}

#[test]
fn low_confidence_regresses_toward_the_midpoint() {
    let score =
        ItemScore::new("naming", "readability", 10.0, 10.0).with_confidence(Confidence::Low);
    // 0.3 * 10 + 0.7 * 5
    assert!((score.adjusted() - 6.5).abs() < 1e-9);
}

#[test]
fn adjusted_scores_are_clamped_to_the_item_maximum() {
    let over = ItemScore::new("naming", "readability", 14.0, 10.0);
    assert_eq!(over.adjusted(), 10.0);
    let under = ItemScore::new("naming", "readability", -2.0, 10.0);
    assert_eq!(under.adjusted(), 0.0);
}

#[test]
fn higher_confidence_wins_regardless_of_recency() {
    let early = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap();
    let late = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
    let scores = candidates(vec![
        ItemScore::new("naming", "readability", 4.0, 10.0)
            .with_confidence(Confidence::Low)
            .with_producer("heuristic")
            .with_recorded_at(late),
        ItemScore::new("naming", "readability", 9.0, 10.0)
            .with_producer("reviewer")
            .with_recorded_at(early),
    ]);

    let rubric = Rubric::new().item("naming", "readability", 10.0);
    let summary = aggregate(&rubric, &scores, DEFAULT_CONFLICT_RANGE);
    assert!((summary.normalized - 90.0).abs() < 1e-9);
}

#[test]
fn equal_confidence_prefers_the_later_candidate() {
    let early = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap();
    let late = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
    let scores = candidates(vec![
        ItemScore::new("naming", "readability", 4.0, 10.0)
            .with_producer("first")
            .with_recorded_at(early),
        ItemScore::new("naming", "readability", 8.0, 10.0)
            .with_producer("second")
            .with_recorded_at(late),
    ]);

    let rubric = Rubric::new().item("naming", "readability", 10.0);
    let summary = aggregate(&rubric, &scores, DEFAULT_CONFLICT_RANGE);
    assert!((summary.normalized - 80.0).abs() < 1e-9);
}

#[test]
fn equal_timestamps_break_the_tie_by_producer_id() {
    let stamp = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap();
    let alpha = ItemScore::new("naming", "readability", 4.0, 10.0)
        .with_producer("alpha")
        .with_recorded_at(stamp);
    let zeta = ItemScore::new("naming", "readability", 9.0, 10.0)
        .with_producer("zeta")
        .with_recorded_at(stamp);

    assert_eq!(zeta.cmp_preference(&alpha), std::cmp::Ordering::Greater);
    // The ordering is symmetric, so either insertion order picks zeta.
    let summary = aggregate(
        &Rubric::new().item("naming", "readability", 10.0),
        &candidates(vec![zeta, alpha]),
        DEFAULT_CONFLICT_RANGE,
    );
    assert!((summary.normalized - 90.0).abs() < 1e-9);
}

#[test]
fn candidates_outside_the_rubric_are_dropped() {
    let scores = candidates(vec![
        ItemScore::new("naming", "readability", 8.0, 10.0).with_producer("lint"),
        ItemScore::new("velocity", "process", 3.0, 5.0).with_producer("lint"),
    ]);

    let rubric = Rubric::new().item("naming", "readability", 10.0);
    let summary = aggregate(&rubric, &scores, DEFAULT_CONFLICT_RANGE);

    // The unknown item never reaches the rollups or the totals.
    assert_eq!(summary.evaluated, 1);
    assert!((summary.coverage - 1.0).abs() < 1e-9);
    assert!((summary.normalized - 80.0).abs() < 1e-9);
    assert_eq!(summary.rollups.len(), 1);
    assert_eq!(summary.rollups[0].category, "readability");
}

#[test]
fn wide_disagreement_produces_a_conflict_note() {
    let scores = candidates(vec![
        ItemScore::new("naming", "readability", 3.0, 10.0).with_producer("strict"),
        ItemScore::new("naming", "readability", 9.0, 10.0).with_producer("lenient"),
    ]);

    let rubric = Rubric::new().item("naming", "readability", 10.0);
    let summary = aggregate(&rubric, &scores, DEFAULT_CONFLICT_RANGE);

    assert_eq!(summary.conflicts.len(), 1);
    let note = &summary.conflicts[0];
    assert_eq!(note.item, "naming");
    assert_eq!(note.min, 3.0);
    assert_eq!(note.max, 9.0);
    assert!((note.range - 6.0).abs() < 1e-9);
}

#[test]
fn narrow_disagreement_stays_quiet() {
    let scores = candidates(vec![
        ItemScore::new("naming", "readability", 7.0, 10.0).with_producer("a"),
        ItemScore::new("naming", "readability", 8.5, 10.0).with_producer("b"),
    ]);

    let rubric = Rubric::new().item("naming", "readability", 10.0);
    let summary = aggregate(&rubric, &scores, DEFAULT_CONFLICT_RANGE);
    assert!(summary.conflicts.is_empty());
}

#[test]
fn rollups_group_by_category_and_track_coverage() {
    let scores = candidates(vec![
        ItemScore::new("naming", "readability", 8.0, 10.0).with_producer("lint"),
        ItemScore::new("tests", "design", 4.0, 5.0).with_producer("lint"),
    ]);

    let summary = aggregate(&review_rubric(), &scores, DEFAULT_CONFLICT_RANGE);

    assert_eq!(summary.evaluated, 2);
    assert_eq!(summary.total, 3);
    assert!((summary.coverage - 2.0 / 3.0).abs() < 1e-9);
    // Normalization runs over evaluated items only: (8 + 4) / (10 + 5).
    assert!((summary.normalized - 80.0).abs() < 1e-9);

    let categories: Vec<&str> = summary
        .rollups
        .iter()
        .map(|r| r.category.as_str())
        .collect();
    assert_eq!(categories, ["design", "readability"]);
    let design = &summary.rollups[0];
    assert_eq!(design.evaluated, 1);
    assert_eq!(design.total, 2);
}

#[test]
fn empty_rubric_yields_zero_coverage() {
    let summary = aggregate(
        &Rubric::new(),
        &FxHashMap::default(),
        DEFAULT_CONFLICT_RANGE,
    );
    assert_eq!(summary.coverage, 0.0);
    assert_eq!(summary.normalized, 0.0);
    assert_eq!(
        GateThresholds::default().evaluate(&summary),
        Verdict::Incomplete
    );
}

#[test]
fn gate_thresholds_partition_the_score_range() {
    let scores_for = |raw: f64| {
        candidates(vec![
            ItemScore::new("naming", "readability", raw, 10.0).with_producer("lint"),
        ])
    };
    let rubric = Rubric::new().item("naming", "readability", 10.0);
    let gate = GateThresholds::default();

    let verdict_for = |raw: f64| gate.evaluate(&aggregate(&rubric, &scores_for(raw), 2.0));

    assert_eq!(verdict_for(7.0), Verdict::Pass);
    assert_eq!(verdict_for(5.0), Verdict::Concerns);
    assert_eq!(verdict_for(4.9), Verdict::Fail);
}

#[test]
fn low_coverage_overrides_a_passing_score() {
    let scores = candidates(vec![
        ItemScore::new("naming", "readability", 10.0, 10.0).with_producer("lint"),
    ]);
    // One of three items evaluated: coverage 1/3 < 0.5.
    let summary = aggregate(&review_rubric(), &scores, DEFAULT_CONFLICT_RANGE);
    assert_eq!(
        GateThresholds::default().evaluate(&summary),
        Verdict::Incomplete
    );
}
