use super::*;
use crate::intent::dsl::{RooflineBuilder, SegmentBuilder};
use crate::roofline::model::SegmentType;

fn house() -> RooflineConfig {
    RooflineBuilder::new(40)
        .segment(
            SegmentBuilder::new("s0", SegmentType::Run, 0, 9)
                .name("Front Eave")
                .level(1)
                .build(),
        )
        .segment(
            SegmentBuilder::new("s1", SegmentType::Peak, 10, 15)
                .name("Front Gable")
                .level(2)
                .build(),
        )
        .segment(
            SegmentBuilder::new("s2", SegmentType::Corner, 16, 20)
                .name("Left Corner")
                .level(1)
                .build(),
        )
        .segment(
            SegmentBuilder::new("s3", SegmentType::Run, 21, 39)
                .name("REAR run")
                .build(),
        )
        .build()
        .unwrap()
}

fn r(start: usize, end: usize) -> PixelRange {
    PixelRange { start, end }
}

#[test]
fn all_is_the_whole_strip() {
    assert_eq!(resolve_zone(&ZoneSelector::All, &house()), vec![r(0, 39)]);
}

#[test]
fn architectural_peak_resolves_to_its_segment() {
    let map = RooflineConfig {
        total_pixel_count: 21,
        segments: vec![
            SegmentBuilder::new("a", SegmentType::Peak, 10, 15).build(),
            SegmentBuilder::new("b", SegmentType::Run, 0, 9).build(),
            SegmentBuilder::new("c", SegmentType::Corner, 16, 20).build(),
        ],
    };
    let zone = ZoneSelector::Architectural {
        roles: vec![SegmentType::Peak],
    };
    assert_eq!(resolve_zone(&zone, &map), vec![r(10, 15)]);
}

#[test]
fn architectural_keeps_one_range_per_segment() {
    let zone = ZoneSelector::Architectural {
        roles: vec![SegmentType::Run],
    };
    assert_eq!(resolve_zone(&zone, &house()), vec![r(0, 9), r(21, 39)]);
}

#[test]
fn segments_follow_selector_order_and_skip_unknown_ids() {
    let zone = ZoneSelector::Segments {
        ids: vec!["s2".to_string(), "nope".to_string(), "s0".to_string()],
    };
    assert_eq!(resolve_zone(&zone, &house()), vec![r(16, 20), r(0, 9)]);
}

#[test]
fn location_matches_keyword_family_case_insensitively() {
    let front = ZoneSelector::Location {
        location: "FRONT".to_string(),
    };
    assert_eq!(resolve_zone(&front, &house()), vec![r(0, 9), r(10, 15)]);

    let back = ZoneSelector::Location {
        location: "back of the house".to_string(),
    };
    assert_eq!(resolve_zone(&back, &house()), vec![r(21, 39)]);

    let left = ZoneSelector::Location {
        location: "left".to_string(),
    };
    assert_eq!(resolve_zone(&left, &house()), vec![r(16, 20)]);

    let literal = ZoneSelector::Location {
        location: "gable".to_string(),
    };
    assert_eq!(resolve_zone(&literal, &house()), vec![r(10, 15)]);
}

#[test]
fn level_is_an_exact_match() {
    let zone = ZoneSelector::Level { level: 1 };
    assert_eq!(resolve_zone(&zone, &house()), vec![r(0, 9), r(16, 20)]);
    assert!(resolve_zone(&ZoneSelector::Level { level: 3 }, &house()).is_empty());
}

#[test]
fn custom_ranges_pass_through_unchanged() {
    let zone = ZoneSelector::Custom {
        ranges: vec![r(50, 60), r(3, 4)],
    };
    assert_eq!(resolve_zone(&zone, &house()), vec![r(50, 60), r(3, 4)]);
}

#[test]
fn intersecting_segments_are_ordered_by_position() {
    let map = house();
    let ids: Vec<&str> = segments_intersecting(&map, r(9, 16))
        .into_iter()
        .map(|s| s.id.as_str())
        .collect();
    assert_eq!(ids, vec!["s0", "s1", "s2"]);
}
