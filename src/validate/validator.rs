use std::collections::HashSet;

use crate::{
    foundation::core::PixelRange,
    intent::model::{
        AlternativeSuggestion, AmbiguityFlag, AmbiguityType, ClarificationValue, ConstraintKind,
        DesignConstraint, DesignIntent, DesignLayer, SpacingRule, ZoneSelector,
    },
    render::layer::anchor_spans_in,
    roofline::model::{RooflineConfig, SegmentType},
    zone::resolver::resolve_zone,
};

/// Id of the constraint recording map validity.
pub const ROOFLINE_CONSTRAINT_ID: &str = "roofline";

/// Role-based zone suggestions offered for an empty zone, at most.
const MAX_ROLE_SUGGESTIONS: usize = 3;

/// Check that `intent` can be realized on `map` and return a copy carrying the results.
///
/// Validator-owned constraints and flags from an earlier pass are replaced; upstream ones are
/// kept. Every failed check with alternatives raises an ambiguity flag unless its id was
/// acknowledged, in which case the constraint is waived. A failed check without alternatives
/// (an invalid map) is recorded as an unsatisfied constraint only.
#[tracing::instrument(skip_all, fields(layers = intent.layers.len()))]
pub fn validate_intent(intent: &DesignIntent, map: &RooflineConfig) -> DesignIntent {
    let mut out = intent.clone();
    out.constraints.retain(|c| !c.kind.is_validator_owned());
    out.ambiguities.retain(|a| !a.kind.is_validator_owned());

    let mut checks = Checks::new(&intent.acknowledged);

    if let Err(e) = map.validate() {
        checks.push(
            Check::new(ROOFLINE_CONSTRAINT_ID, ConstraintKind::PixelBounds, None)
                .failed(e.to_string()),
        );
        checks.finish(&mut out);
        return out;
    }
    checks.push(Check::new(ROOFLINE_CONSTRAINT_ID, ConstraintKind::PixelBounds, None));

    let mut placed: Vec<(&DesignLayer, Vec<PixelRange>)> = Vec::new();
    for layer in intent.enabled_layers() {
        if let Some(ranges) = check_layer(layer, map, &mut checks) {
            placed.push((layer, ranges));
        }
    }
    check_priorities(&placed, &mut checks);

    raise_upstream_flags(&mut out);
    checks.finish(&mut out);

    tracing::debug!(
        constraints = out.constraints.len(),
        ambiguities = out.ambiguities.len(),
        "validated intent"
    );
    out
}

/// Shortest range the spacing rule must fit into.
pub fn shortest_range(ranges: &[PixelRange]) -> Option<usize> {
    ranges.iter().map(|r| r.len()).min()
}

/// Whether `spacing` can be realized on a range of `len` pixels. Anchor rules are checked
/// against the map separately.
pub fn spacing_fits(spacing: &SpacingRule, len: usize) -> bool {
    match *spacing {
        SpacingRule::Pattern {
            on_count,
            off_count,
            ..
        } => on_count >= 1 && on_count.saturating_add(off_count) <= len,
        SpacingRule::EquallySpaced { on_count } => (1..=len).contains(&on_count),
        SpacingRule::EveryNth { interval } => (1..=len).contains(&interval),
        SpacingRule::AnchorsOnly | SpacingRule::Continuous => true,
    }
}

/// Bounds, zone and spacing checks for one layer. Returns the resolved ranges when the layer
/// lights something, for the priority pass.
fn check_layer(
    layer: &DesignLayer,
    map: &RooflineConfig,
    checks: &mut Checks,
) -> Option<Vec<PixelRange>> {
    let label = layer.label();

    if let ZoneSelector::Custom { ranges } = &layer.zone {
        let check = Check::new(
            format!("bounds:{}", layer.id),
            ConstraintKind::PixelBounds,
            Some(&layer.id),
        );
        let bad = ranges
            .iter()
            .filter(|r| r.start > r.end || r.end >= map.total_pixel_count)
            .count();
        if bad > 0 {
            checks.push(
                check
                    .failed(format!(
                        "{bad} custom range(s) of layer '{label}' reach outside the {}-pixel strip",
                        map.total_pixel_count
                    ))
                    .flag(
                        format!("zone-bounds:{}", layer.id),
                        AmbiguityType::ZoneOutOfBounds,
                        format!(
                            "Part of '{label}' falls outside the roofline. How should it be placed?"
                        ),
                        out_of_bounds_alternatives(layer, ranges, map),
                    ),
            );
            return None;
        }
        checks.push(check);
    }

    let strip = map.full_range()?;
    let ranges: Vec<PixelRange> = resolve_zone(&layer.zone, map)
        .into_iter()
        .filter_map(|r| r.intersection(strip))
        .collect();

    let zone_check = Check::new(
        format!("zone:{}", layer.id),
        ConstraintKind::ZoneNonEmpty,
        Some(&layer.id),
    );
    if ranges.is_empty() {
        checks.push(
            zone_check
                .failed(format!("zone of layer '{label}' matches no pixels"))
                .flag(
                    format!("zone-empty:{}", layer.id),
                    AmbiguityType::ZoneEmpty,
                    format!(
                        "'{label}' does not match any part of the roofline. Where should it go?"
                    ),
                    empty_zone_alternatives(layer, map),
                ),
        );
        return None;
    }
    checks.push(zone_check);

    if let Some(spacing) = &layer.colors.spacing {
        check_spacing(layer, spacing, &ranges, map, checks);
    }
    Some(ranges)
}

fn check_spacing(
    layer: &DesignLayer,
    spacing: &SpacingRule,
    ranges: &[PixelRange],
    map: &RooflineConfig,
    checks: &mut Checks,
) {
    let label = layer.label();
    let check = Check::new(
        format!("spacing:{}", layer.id),
        ConstraintKind::SpacingFeasible,
        Some(&layer.id),
    );
    let shortest = shortest_range(ranges).unwrap_or(0);

    let failure = match spacing {
        SpacingRule::AnchorsOnly => {
            let any_anchor = ranges.iter().any(|r| !anchor_spans_in(*r, map).is_empty());
            (!any_anchor).then(|| format!("zone of layer '{label}' contains no anchors"))
        }
        other if !spacing_fits(other, shortest) => Some(format!(
            "spacing of layer '{label}' does not fit a {shortest}-pixel range"
        )),
        _ => None,
    };

    let Some(reason) = failure else {
        checks.push(check);
        return;
    };
    checks.push(check.failed(reason).flag(
        format!("spacing:{}", layer.id),
        AmbiguityType::SpacingImpossible,
        format!("The light spacing for '{label}' does not fit. What should it use instead?"),
        spacing_alternatives(layer, spacing, shortest, map),
    ));
}

/// Flag every pair of placed layers that share a priority and overlap.
fn check_priorities(placed: &[(&DesignLayer, Vec<PixelRange>)], checks: &mut Checks) {
    for (i, (a, a_ranges)) in placed.iter().enumerate() {
        for (b, b_ranges) in &placed[i + 1..] {
            if a.priority != b.priority || !any_overlap(a_ranges, b_ranges) {
                continue;
            }
            let id = format!("priority:{}:{}", a.id, b.id);
            let alternatives = vec![
                suggestion(
                    format!("Put '{}' on top", b.label()),
                    "",
                    ClarificationValue::SetPriority {
                        layer_id: b.id.clone(),
                        priority: b.priority.saturating_add(1),
                    },
                ),
                suggestion(
                    format!("Put '{}' on top", a.label()),
                    "",
                    ClarificationValue::SetPriority {
                        layer_id: a.id.clone(),
                        priority: a.priority.saturating_add(1),
                    },
                ),
                suggestion(
                    "Keep as is",
                    "the later layer wins where they overlap",
                    ClarificationValue::KeepAsIs,
                ),
            ];
            checks.push(
                Check::new(id.clone(), ConstraintKind::PriorityConflict, Some(&a.id))
                    .failed(format!(
                        "layers '{}' and '{}' overlap at the same priority {}",
                        a.label(),
                        b.label(),
                        a.priority
                    ))
                    .flag(
                        id,
                        AmbiguityType::PriorityConflict,
                        format!(
                            "'{}' and '{}' light the same pixels. Which one should show?",
                            a.label(),
                            b.label()
                        ),
                        alternatives,
                    ),
            );
        }
    }
}

/// Unsatisfied upstream constraints with alternatives become questions unless already asked or
/// acknowledged.
fn raise_upstream_flags(out: &mut DesignIntent) {
    let known: HashSet<String> = out
        .ambiguities
        .iter()
        .map(|a| a.id.clone())
        .chain(out.acknowledged.iter().cloned())
        .collect();
    let raised: Vec<AmbiguityFlag> = out
        .constraints
        .iter()
        .filter(|c| !c.satisfied && !c.waived && !c.alternatives.is_empty())
        .filter(|c| !known.contains(&c.id))
        .map(|c| AmbiguityFlag {
            id: c.id.clone(),
            kind: AmbiguityType::Other,
            layer_id: c.layer_id.clone(),
            message: c
                .failure_reason
                .clone()
                .unwrap_or_else(|| format!("constraint '{}' is not met", c.id)),
            options: c.alternatives.clone(),
        })
        .collect();
    out.ambiguities.extend(raised);
}

fn empty_zone_alternatives(layer: &DesignLayer, map: &RooflineConfig) -> Vec<AlternativeSuggestion> {
    let mut out = vec![suggestion(
        "Use the whole roofline",
        "",
        ClarificationValue::SetZone {
            layer_id: layer.id.clone(),
            zone: ZoneSelector::All,
        },
    )];

    let mut roles: Vec<SegmentType> = Vec::new();
    for seg in map.segments_by_position() {
        if !roles.contains(&seg.kind) {
            roles.push(seg.kind);
        }
    }
    out.extend(roles.into_iter().take(MAX_ROLE_SUGGESTIONS).map(|role| {
        suggestion(
            format!("Use the {} segments", role_name(role)),
            "",
            ClarificationValue::SetZone {
                layer_id: layer.id.clone(),
                zone: ZoneSelector::Architectural { roles: vec![role] },
            },
        )
    }));

    out.push(disable(layer));
    ranked(out)
}

fn out_of_bounds_alternatives(
    layer: &DesignLayer,
    ranges: &[PixelRange],
    map: &RooflineConfig,
) -> Vec<AlternativeSuggestion> {
    let mut out = Vec::new();
    if let Some(strip) = map.full_range() {
        let clipped: Vec<PixelRange> = ranges
            .iter()
            .filter(|r| r.start <= r.end)
            .filter_map(|r| r.intersection(strip))
            .collect();
        if !clipped.is_empty() {
            out.push(suggestion(
                "Trim to the roofline",
                "drop the pixels past the end of the strip",
                ClarificationValue::SetZone {
                    layer_id: layer.id.clone(),
                    zone: ZoneSelector::Custom { ranges: clipped },
                },
            ));
        }
    }
    out.push(suggestion(
        "Use the whole roofline",
        "",
        ClarificationValue::SetZone {
            layer_id: layer.id.clone(),
            zone: ZoneSelector::All,
        },
    ));
    out.push(disable(layer));
    ranked(out)
}

fn spacing_alternatives(
    layer: &DesignLayer,
    spacing: &SpacingRule,
    shortest: usize,
    map: &RooflineConfig,
) -> Vec<AlternativeSuggestion> {
    let set = |label: String, spacing: SpacingRule| {
        suggestion(
            label,
            "",
            ClarificationValue::SetSpacing {
                layer_id: layer.id.clone(),
                spacing: Some(spacing),
            },
        )
    };

    let mut out = Vec::new();
    let len = shortest.max(1);
    match *spacing {
        SpacingRule::Pattern {
            on_count,
            off_count,
            start_with_on,
        } => {
            let on = on_count.clamp(1, len);
            let off = off_count.min(len - on);
            out.push(set(
                format!("{on} on, {off} off"),
                SpacingRule::Pattern {
                    on_count: on,
                    off_count: off,
                    start_with_on,
                },
            ));
        }
        SpacingRule::EquallySpaced { on_count } => {
            let n = on_count.clamp(1, len);
            out.push(set(
                format!("{n} evenly spaced lights"),
                SpacingRule::EquallySpaced { on_count: n },
            ));
        }
        SpacingRule::EveryNth { interval } => {
            let n = interval.clamp(1, len);
            out.push(set(
                format!("Every {n} lights"),
                SpacingRule::EveryNth { interval: n },
            ));
        }
        SpacingRule::AnchorsOnly => {
            let anchored: Vec<String> = map
                .segments_by_position()
                .into_iter()
                .filter(|s| !s.anchor_offsets.is_empty())
                .map(|s| s.id.clone())
                .collect();
            if !anchored.is_empty() {
                out.push(suggestion(
                    "Use the segments with anchors",
                    "",
                    ClarificationValue::SetZone {
                        layer_id: layer.id.clone(),
                        zone: ZoneSelector::Segments { ids: anchored },
                    },
                ));
            }
        }
        SpacingRule::Continuous => {}
    }
    out.push(set("Light every pixel".to_string(), SpacingRule::Continuous));
    out.push(disable(layer));
    ranked(out)
}

fn any_overlap(a: &[PixelRange], b: &[PixelRange]) -> bool {
    a.iter().any(|x| b.iter().any(|y| x.intersects(*y)))
}

fn role_name(role: SegmentType) -> &'static str {
    match role {
        SegmentType::Run => "run",
        SegmentType::Corner => "corner",
        SegmentType::Peak => "peak",
        SegmentType::Column => "column",
        SegmentType::Connector => "connector",
    }
}

fn disable(layer: &DesignLayer) -> AlternativeSuggestion {
    suggestion(
        "Turn this layer off",
        "",
        ClarificationValue::DisableLayer {
            layer_id: layer.id.clone(),
        },
    )
}

fn suggestion(
    label: impl Into<String>,
    description: impl Into<String>,
    value: ClarificationValue,
) -> AlternativeSuggestion {
    AlternativeSuggestion {
        label: label.into(),
        description: description.into(),
        value,
        rank: 0,
    }
}

fn ranked(mut alternatives: Vec<AlternativeSuggestion>) -> Vec<AlternativeSuggestion> {
    for (i, alt) in alternatives.iter_mut().enumerate() {
        alt.rank = (i + 1) as u32;
    }
    alternatives
}

/// One check result under construction.
struct Check {
    constraint: DesignConstraint,
    flag: Option<AmbiguityFlag>,
}

impl Check {
    fn new(id: impl Into<String>, kind: ConstraintKind, layer_id: Option<&str>) -> Self {
        Self {
            constraint: DesignConstraint {
                id: id.into(),
                kind,
                layer_id: layer_id.map(str::to_string),
                satisfied: true,
                failure_reason: None,
                alternatives: Vec::new(),
                waived: false,
            },
            flag: None,
        }
    }

    fn failed(mut self, reason: impl Into<String>) -> Self {
        self.constraint.satisfied = false;
        self.constraint.failure_reason = Some(reason.into());
        self
    }

    fn flag(
        mut self,
        id: String,
        kind: AmbiguityType,
        message: String,
        options: Vec<AlternativeSuggestion>,
    ) -> Self {
        self.constraint.alternatives = options.clone();
        self.flag = Some(AmbiguityFlag {
            id,
            kind,
            layer_id: self.constraint.layer_id.clone(),
            message,
            options,
        });
        self
    }
}

/// Accumulates check results in order, applying acknowledgements.
struct Checks<'a> {
    acknowledged: &'a [String],
    constraints: Vec<DesignConstraint>,
    flags: Vec<AmbiguityFlag>,
}

impl<'a> Checks<'a> {
    fn new(acknowledged: &'a [String]) -> Self {
        Self {
            acknowledged,
            constraints: Vec::new(),
            flags: Vec::new(),
        }
    }

    fn push(&mut self, check: Check) {
        let Check {
            mut constraint,
            flag,
        } = check;
        if let Some(flag) = flag {
            if self.acknowledged.iter().any(|id| *id == flag.id) {
                constraint.waived = true;
            } else if !self.flags.iter().any(|f| f.id == flag.id) {
                self.flags.push(flag);
            }
        }
        self.constraints.push(constraint);
    }

    fn finish(self, out: &mut DesignIntent) {
        out.constraints.extend(self.constraints);
        out.ambiguities.extend(self.flags);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/validate/validator.rs"]
mod tests;
