use super::*;
use crate::intent::dsl::{IntentBuilder, LayerBuilder, RooflineBuilder, SegmentBuilder};

const RED: [u8; 4] = [255, 0, 0, 0];
const WHITE: [u8; 4] = [0, 0, 0, 255];

fn map() -> RooflineConfig {
    RooflineBuilder::new(20)
        .segment(SegmentBuilder::new("run", SegmentType::Run, 0, 9).build())
        .segment(
            SegmentBuilder::new("peak", SegmentType::Peak, 10, 14)
                .anchors([2])
                .build(),
        )
        .segment(SegmentBuilder::new("corner", SegmentType::Corner, 15, 19).build())
        .build()
        .unwrap()
}

fn intent(layers: Vec<DesignLayer>) -> DesignIntent {
    let mut b = IntentBuilder::new();
    for l in layers {
        b = b.layer(l).unwrap();
    }
    b.build().unwrap()
}

fn flag_ids(intent: &DesignIntent) -> Vec<&str> {
    intent.ambiguities.iter().map(|a| a.id.as_str()).collect()
}

#[test]
fn clean_intent_passes_every_check() {
    let i = intent(vec![
        LayerBuilder::new("base", ZoneSelector::All, WHITE).build(),
        LayerBuilder::new(
            "peaks",
            ZoneSelector::Architectural {
                roles: vec![SegmentType::Peak],
            },
            RED,
        )
        .spacing(SpacingRule::AnchorsOnly)
        .priority(1)
        .build(),
    ]);
    let out = validate_intent(&i, &map());
    assert!(out.is_ready(), "{:?}", out.constraints);
    assert!(out.constraints.iter().any(|c| c.id == ROOFLINE_CONSTRAINT_ID));
    assert!(out.constraints.iter().any(|c| c.id == "spacing:peaks"));
}

#[test]
fn empty_zone_raises_ranked_zone_question() {
    let i = intent(vec![
        LayerBuilder::new("up", ZoneSelector::Level { level: 2 }, RED).build(),
    ]);
    let out = validate_intent(&i, &map());
    assert_eq!(flag_ids(&out), vec!["zone-empty:up"]);
    let flag = &out.ambiguities[0];
    assert_eq!(flag.kind, AmbiguityType::ZoneEmpty);
    assert_eq!(
        flag.options[0].value,
        ClarificationValue::SetZone {
            layer_id: "up".to_string(),
            zone: ZoneSelector::All
        }
    );
    let ranks: Vec<u32> = flag.options.iter().map(|o| o.rank).collect();
    assert_eq!(ranks, (1..=flag.options.len() as u32).collect::<Vec<_>>());
    assert!(matches!(
        flag.options.last().map(|o| &o.value),
        Some(ClarificationValue::DisableLayer { .. })
    ));

    let c = out.constraints.iter().find(|c| c.id == "zone:up").unwrap();
    assert!(!c.satisfied);
    assert_eq!(c.alternatives, flag.options);
}

#[test]
fn impossible_spacing_suggests_a_fitting_one() {
    let i = intent(vec![
        LayerBuilder::new(
            "p",
            ZoneSelector::Segments {
                ids: vec!["peak".to_string()],
            },
            RED,
        )
        .spacing(SpacingRule::EquallySpaced { on_count: 9 })
        .build(),
    ]);
    let out = validate_intent(&i, &map());
    assert_eq!(flag_ids(&out), vec!["spacing:p"]);
    let first = &out.ambiguities[0].options[0];
    assert_eq!(
        first.value,
        ClarificationValue::SetSpacing {
            layer_id: "p".to_string(),
            spacing: Some(SpacingRule::EquallySpaced { on_count: 5 }),
        }
    );
}

#[test]
fn spacing_fit_rules() {
    assert!(spacing_fits(
        &SpacingRule::Pattern {
            on_count: 2,
            off_count: 3,
            start_with_on: true
        },
        5
    ));
    assert!(!spacing_fits(
        &SpacingRule::Pattern {
            on_count: 0,
            off_count: 3,
            start_with_on: true
        },
        5
    ));
    assert!(!spacing_fits(&SpacingRule::EveryNth { interval: 0 }, 5));
    assert!(!spacing_fits(&SpacingRule::EveryNth { interval: 6 }, 5));
    assert!(spacing_fits(&SpacingRule::EquallySpaced { on_count: 5 }, 5));
    assert!(spacing_fits(&SpacingRule::Continuous, 1));
}

#[test]
fn anchors_only_without_anchors_is_flagged() {
    let i = intent(vec![
        LayerBuilder::new(
            "c",
            ZoneSelector::Segments {
                ids: vec!["corner".to_string()],
            },
            RED,
        )
        .spacing(SpacingRule::AnchorsOnly)
        .build(),
    ]);
    let out = validate_intent(&i, &map());
    assert_eq!(flag_ids(&out), vec!["spacing:c"]);
    assert_eq!(
        out.ambiguities[0].options[0].value,
        ClarificationValue::SetZone {
            layer_id: "c".to_string(),
            zone: ZoneSelector::Segments {
                ids: vec!["peak".to_string()]
            },
        }
    );
}

#[test]
fn overlapping_equal_priorities_conflict() {
    let i = intent(vec![
        LayerBuilder::new("a", ZoneSelector::All, WHITE).build(),
        LayerBuilder::new(
            "b",
            ZoneSelector::Segments {
                ids: vec!["run".to_string()],
            },
            RED,
        )
        .build(),
        LayerBuilder::new(
            "c",
            ZoneSelector::Segments {
                ids: vec!["corner".to_string()],
            },
            RED,
        )
        .priority(3)
        .build(),
    ]);
    let out = validate_intent(&i, &map());
    assert_eq!(flag_ids(&out), vec!["priority:a:b"]);
    assert_eq!(
        out.ambiguities[0].options[0].value,
        ClarificationValue::SetPriority {
            layer_id: "b".to_string(),
            priority: 1
        }
    );
}

#[test]
fn acknowledged_flags_are_waived() {
    let mut i = intent(vec![
        LayerBuilder::new("a", ZoneSelector::All, WHITE).build(),
        LayerBuilder::new("b", ZoneSelector::All, RED).build(),
    ]);
    i.acknowledged.push("priority:a:b".to_string());
    let out = validate_intent(&i, &map());
    assert!(out.ambiguities.is_empty());
    let c = out.constraints.iter().find(|c| c.id == "priority:a:b").unwrap();
    assert!(!c.satisfied && c.waived);
    assert!(out.is_ready());
}

#[test]
fn custom_ranges_past_the_strip_offer_a_trim() {
    let i = intent(vec![
        LayerBuilder::new(
            "x",
            ZoneSelector::Custom {
                ranges: vec![PixelRange { start: 15, end: 30 }],
            },
            RED,
        )
        .build(),
    ]);
    let out = validate_intent(&i, &map());
    assert_eq!(flag_ids(&out), vec!["zone-bounds:x"]);
    assert_eq!(
        out.ambiguities[0].options[0].value,
        ClarificationValue::SetZone {
            layer_id: "x".to_string(),
            zone: ZoneSelector::Custom {
                ranges: vec![PixelRange { start: 15, end: 19 }]
            },
        }
    );
}

#[test]
fn revalidation_is_stable_and_keeps_upstream_flags() {
    let mut i = intent(vec![
        LayerBuilder::new("up", ZoneSelector::Level { level: 2 }, RED).build(),
    ]);
    i.ambiguities.push(AmbiguityFlag {
        id: "color".to_string(),
        kind: AmbiguityType::ColorUnclear,
        layer_id: Some("up".to_string()),
        message: "Which red?".to_string(),
        options: vec![],
    });
    let once = validate_intent(&i, &map());
    let twice = validate_intent(&once, &map());
    assert_eq!(once, twice);
    assert_eq!(flag_ids(&twice), vec!["color", "zone-empty:up"]);
}

#[test]
fn disabled_layers_are_skipped() {
    let i = intent(vec![
        LayerBuilder::new("a", ZoneSelector::All, WHITE).build(),
        LayerBuilder::new("off", ZoneSelector::Level { level: 7 }, RED)
            .disabled()
            .build(),
    ]);
    assert!(validate_intent(&i, &map()).is_ready());
}

#[test]
fn invalid_map_is_an_unsatisfied_constraint_without_alternatives() {
    let i = intent(vec![LayerBuilder::new("a", ZoneSelector::All, WHITE).build()]);
    let bad = RooflineConfig {
        total_pixel_count: 10,
        segments: vec![],
    };
    let out = validate_intent(&i, &bad);
    assert!(out.ambiguities.is_empty());
    let c = &out.constraints[0];
    assert_eq!(c.id, ROOFLINE_CONSTRAINT_ID);
    assert!(!c.satisfied && c.alternatives.is_empty());
}

#[test]
fn unsatisfied_upstream_constraint_with_alternatives_becomes_a_question() {
    let mut i = intent(vec![LayerBuilder::new("a", ZoneSelector::All, WHITE).build()]);
    i.constraints.push(DesignConstraint {
        id: "budget".to_string(),
        kind: ConstraintKind::Upstream,
        layer_id: None,
        satisfied: false,
        failure_reason: Some("too bright".to_string()),
        alternatives: vec![suggestion("Keep", "", ClarificationValue::KeepAsIs)],
        waived: false,
    });
    let out = validate_intent(&i, &map());
    assert_eq!(flag_ids(&out), vec!["budget"]);
    assert_eq!(out.ambiguities[0].message, "too bright");
}
