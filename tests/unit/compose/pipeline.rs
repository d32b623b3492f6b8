use super::*;
use crate::composite::compositor::is_canonical;
use crate::foundation::core::PixelRange;
use crate::intent::dsl::{IntentBuilder, LayerBuilder, RooflineBuilder, SegmentBuilder};
use crate::intent::model::{
    MotionDirection, MotionSettings, MotionType, SpacingRule, ZoneSelector,
};
use crate::roofline::model::SegmentType;

const RED: Rgbw = [255, 0, 0, 0];
const GREEN: Rgbw = [0, 255, 0, 0];
const WHITE: Rgbw = [0, 0, 0, 255];

fn map() -> RooflineConfig {
    RooflineBuilder::new(30)
        .segment(SegmentBuilder::new("run", SegmentType::Run, 0, 9).build())
        .segment(
            SegmentBuilder::new("peak", SegmentType::Peak, 10, 19)
                .anchors([5])
                .build(),
        )
        .segment(SegmentBuilder::new("corner", SegmentType::Corner, 20, 29).build())
        .build()
        .unwrap()
}

fn chase(effect_id: u8) -> MotionSettings {
    MotionSettings {
        motion_type: MotionType::Chase,
        direction: MotionDirection::Forward,
        speed: 200,
        intensity: 30,
        reverse: false,
        effect_id,
    }
}

#[test]
fn base_and_accent_layers_compose_canonically() {
    let intent = IntentBuilder::new()
        .layer(
            LayerBuilder::new("base", ZoneSelector::All, WHITE)
                .priority(0)
                .build(),
        )
        .unwrap()
        .layer(
            LayerBuilder::new(
                "peaks",
                ZoneSelector::Architectural {
                    roles: vec![SegmentType::Peak],
                },
                RED,
            )
            .priority(1)
            .build(),
        )
        .unwrap()
        .build()
        .unwrap();

    let out = compose_pattern(&intent, &map(), &ComposeOpts::default()).unwrap();
    assert_eq!(
        out.groups,
        vec![
            LedColorGroup::new(0, 9, WHITE),
            LedColorGroup::new(10, 19, RED),
            LedColorGroup::new(20, 29, WHITE),
        ]
    );
    assert!(is_canonical(&out.groups));
    assert_eq!(out.colors_used, vec![WHITE, RED]);
    assert!(!out.has_motion);
    assert_eq!((out.effect_id, out.effect_speed, out.effect_intensity), (0, 128, 128));
    assert!(out.wled_payload.is_indexed());
    assert!(out.warnings.is_empty());
}

#[test]
fn empty_layer_degrades_to_warning() {
    let intent = IntentBuilder::new()
        .layer(LayerBuilder::new("base", ZoneSelector::All, GREEN).build())
        .unwrap()
        .layer(
            LayerBuilder::new("upstairs", ZoneSelector::Level { level: 2 }, RED)
                .name("Upstairs")
                .build(),
        )
        .unwrap()
        .build()
        .unwrap();
    let out = compose_pattern(&intent, &map(), &ComposeOpts::default()).unwrap();
    assert_eq!(out.groups, vec![LedColorGroup::new(0, 29, GREEN)]);
    assert_eq!(out.warnings.len(), 1);
    assert!(out.warnings[0].contains("Upstairs"));
}

#[test]
fn zone_past_the_strip_is_trimmed_with_a_warning() {
    let intent = IntentBuilder::new()
        .layer(
            LayerBuilder::new(
                "eave",
                ZoneSelector::Custom {
                    ranges: vec![PixelRange { start: 25, end: 40 }],
                },
                RED,
            )
            .name("Eave")
            .build(),
        )
        .unwrap()
        .build()
        .unwrap();
    let out = compose_pattern(&intent, &map(), &ComposeOpts::default()).unwrap();
    assert_eq!(out.groups, vec![LedColorGroup::new(25, 29, RED)]);
    assert_eq!(out.warnings.len(), 1);
    assert!(out.warnings[0].contains("Eave"));
    assert!(out.warnings[0].contains("11 pixels"));
}

#[test]
fn all_layers_empty_is_a_composition_failure() {
    let intent = IntentBuilder::new()
        .layer(LayerBuilder::new("l", ZoneSelector::Level { level: 9 }, RED).build())
        .unwrap()
        .build()
        .unwrap();
    let err = compose_pattern(&intent, &map(), &ComposeOpts::default()).unwrap_err();
    assert!(err.recommends_manual());
}

#[test]
fn no_enabled_layers_is_a_composition_failure() {
    let intent = IntentBuilder::new()
        .layer(LayerBuilder::new("l", ZoneSelector::All, RED).disabled().build())
        .unwrap()
        .build()
        .unwrap();
    let err = compose_pattern(&intent, &map(), &ComposeOpts::default()).unwrap_err();
    assert!(matches!(err, LuminaError::Composition { .. }));
    assert!(!err.recommends_manual());
}

#[test]
fn first_effect_layer_drives_motion_and_others_warn() {
    let intent = IntentBuilder::new()
        .layer(
            LayerBuilder::new("a", ZoneSelector::All, RED)
                .motion(chase(28))
                .build(),
        )
        .unwrap()
        .layer(
            LayerBuilder::new(
                "b",
                ZoneSelector::Segments {
                    ids: vec!["peak".to_string()],
                },
                GREEN,
            )
            .priority(1)
            .motion(chase(40))
            .build(),
        )
        .unwrap()
        .build()
        .unwrap();
    let out = compose_pattern(&intent, &map(), &ComposeOpts::default()).unwrap();
    assert!(out.has_motion);
    assert_eq!((out.effect_id, out.effect_speed, out.effect_intensity), (28, 200, 30));
    assert!(out.wled_payload.is_effect());
    assert_eq!(out.wled_payload.seg[0].col.as_deref(), Some(&[RED, GREEN][..]));
    assert_eq!(out.warnings.len(), 1);
}

#[test]
fn parallel_rendering_matches_sequential() {
    let intent = IntentBuilder::new()
        .layer(
            LayerBuilder::new("a", ZoneSelector::All, RED)
                .spacing(SpacingRule::EveryNth { interval: 3 })
                .build(),
        )
        .unwrap()
        .layer(
            LayerBuilder::new("b", ZoneSelector::All, WHITE)
                .spacing(SpacingRule::AnchorsOnly)
                .build(),
        )
        .unwrap()
        .build()
        .unwrap();
    let seq = compose_pattern(&intent, &map(), &ComposeOpts::default()).unwrap();
    let par = compose_pattern(
        &intent,
        &map(),
        &ComposeOpts {
            parallel: true,
            threads: Some(2),
            ..ComposeOpts::default()
        },
    )
    .unwrap();
    assert_eq!(seq, par);
    assert_eq!(seq.fingerprint(), par.fingerprint());
}

#[test]
fn zero_threads_is_rejected() {
    let intent = IntentBuilder::new()
        .layer(LayerBuilder::new("a", ZoneSelector::All, RED).build())
        .unwrap()
        .build()
        .unwrap();
    let opts = ComposeOpts {
        parallel: true,
        threads: Some(0),
        ..ComposeOpts::default()
    };
    assert!(compose_pattern(&intent, &map(), &opts).is_err());
}

#[test]
fn opts_deserialize_with_defaults() {
    let opts: ComposeOpts = serde_json::from_str(r#"{"parallel": true}"#).unwrap();
    assert!(opts.parallel);
    assert_eq!(opts.max_effect_colors, 3);
    assert_eq!(opts.max_clarification_rounds, 8);
}
