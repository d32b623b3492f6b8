use crate::{
    foundation::core::PixelRange,
    intent::model::ZoneSelector,
    roofline::model::{RooflineConfig, Segment},
};

const FRONT: &[&str] = &["front", "street", "facade", "entry"];
const BACK: &[&str] = &["back", "rear", "yard"];
const LEFT: &[&str] = &["left"];
const RIGHT: &[&str] = &["right"];

/// Resolve a zone selector to concrete pixel ranges.
///
/// Segment-based selectors yield one range per matching segment, never merged, so later stages
/// can still tell which segment (and which anchors) a range came from. An empty result is a valid
/// outcome: the layer simply contributes nothing.
pub fn resolve_zone(zone: &ZoneSelector, map: &RooflineConfig) -> Vec<PixelRange> {
    match zone {
        ZoneSelector::All => map.full_range().into_iter().collect(),
        ZoneSelector::Segments { ids } => ids
            .iter()
            .filter_map(|id| map.segment(id))
            .map(Segment::range)
            .collect(),
        ZoneSelector::Architectural { roles } => {
            ranges_where(map, |s| roles.contains(&s.kind))
        }
        ZoneSelector::Location { location } => {
            let keywords = location_keywords(location);
            ranges_where(map, |s| {
                let name = s.name.to_ascii_lowercase();
                keywords.iter().any(|k| name.contains(k.as_str()))
            })
        }
        ZoneSelector::Level { level } => ranges_where(map, |s| s.level == Some(*level)),
        ZoneSelector::Custom { ranges } => ranges.clone(),
    }
}

/// Segments of `map` whose range intersects `range`, by position.
pub fn segments_intersecting(map: &RooflineConfig, range: PixelRange) -> Vec<&Segment> {
    map.segments_by_position()
        .into_iter()
        .filter(|s| s.range().intersects(range))
        .collect()
}

fn ranges_where(map: &RooflineConfig, pred: impl Fn(&Segment) -> bool) -> Vec<PixelRange> {
    map.segments_by_position()
        .into_iter()
        .filter(|&s| pred(s))
        .map(Segment::range)
        .collect()
}

/// Expand a side tag into its keyword family. Unknown tags match literally.
fn location_keywords(location: &str) -> Vec<String> {
    let tag = location.trim().to_ascii_lowercase();
    if tag.is_empty() {
        return Vec::new();
    }
    for family in [FRONT, BACK, LEFT, RIGHT] {
        if family.iter().any(|k| tag.contains(k)) {
            return family.iter().map(|k| (*k).to_string()).collect();
        }
    }
    vec![tag]
}

#[cfg(test)]
#[path = "../../tests/unit/zone/resolver.rs"]
mod tests;
