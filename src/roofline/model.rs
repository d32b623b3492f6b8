use std::collections::HashSet;

use crate::foundation::{
    core::PixelRange,
    error::{LuminaError, LuminaResult},
};

/// Upper bound on strip length accepted by the composer.
pub const MAX_PIXEL_COUNT: usize = 4096;

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
/// Pixel map of a roofline: ordered, non-overlapping segments covering the whole strip.
///
/// Produced by the roofline mapping editor and read-only to the composer.
pub struct RooflineConfig {
    /// Number of addressable pixels on the strip.
    pub total_pixel_count: usize,
    /// Architectural segments. List order is not significant.
    pub segments: Vec<Segment>,
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
/// One architectural feature mapped onto a contiguous pixel range.
pub struct Segment {
    /// Stable identifier.
    pub id: String,
    /// Display name; location selectors match against it.
    pub name: String,
    /// Structural role.
    #[serde(rename = "type")]
    pub kind: SegmentType,
    /// First pixel (inclusive).
    pub start_pixel: usize,
    /// Last pixel (inclusive).
    pub end_pixel: usize,
    /// Anchor offsets relative to `start_pixel`.
    #[serde(default)]
    pub anchor_offsets: Vec<usize>,
    /// Pixels lit per anchor.
    #[serde(default = "default_anchor_led_count")]
    pub anchor_led_count: usize,
    /// Story the segment sits on, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<i32>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
/// Structural role of a segment.
pub enum SegmentType {
    /// Straight eave or gutter run.
    Run,
    /// Corner where two runs meet.
    Corner,
    /// Gable peak.
    Peak,
    /// Vertical column or post.
    Column,
    /// Short connector between features.
    Connector,
}

fn default_anchor_led_count() -> usize {
    1
}

impl Segment {
    /// Pixel range covered by this segment.
    pub fn range(&self) -> PixelRange {
        PixelRange {
            start: self.start_pixel,
            end: self.end_pixel,
        }
    }

    /// Absolute pixel spans lit by each anchor, unclipped. Ends saturate at `usize::MAX`.
    pub fn anchor_spans(&self) -> impl Iterator<Item = PixelRange> + '_ {
        let width = self.anchor_led_count.max(1);
        self.anchor_offsets.iter().map(move |&off| {
            let start = self.start_pixel.saturating_add(off);
            PixelRange {
                start,
                end: start.saturating_add(width - 1),
            }
        })
    }
}

impl RooflineConfig {
    /// The whole strip as one range, or `None` for an empty strip.
    pub fn full_range(&self) -> Option<PixelRange> {
        if self.total_pixel_count == 0 {
            return None;
        }
        Some(PixelRange {
            start: 0,
            end: self.total_pixel_count - 1,
        })
    }

    /// Look up a segment by id.
    pub fn segment(&self, id: &str) -> Option<&Segment> {
        self.segments.iter().find(|s| s.id == id)
    }

    /// Segments sorted by start pixel.
    pub fn segments_by_position(&self) -> Vec<&Segment> {
        let mut segs: Vec<&Segment> = self.segments.iter().collect();
        segs.sort_by_key(|s| (s.start_pixel, s.end_pixel));
        segs
    }

    /// Check the map invariants: bounds, unique ids, anchors inside their segment, and an exact
    /// non-overlapping tiling of `[0, total_pixel_count)`.
    pub fn validate(&self) -> LuminaResult<()> {
        if self.total_pixel_count == 0 {
            return Err(LuminaError::validation("roofline must have at least one pixel"));
        }
        if self.total_pixel_count > MAX_PIXEL_COUNT {
            return Err(LuminaError::validation(format!(
                "roofline has {} pixels, more than the supported {MAX_PIXEL_COUNT}",
                self.total_pixel_count
            )));
        }
        if self.segments.is_empty() {
            return Err(LuminaError::validation("roofline must have at least one segment"));
        }

        let mut ids = HashSet::new();
        for seg in &self.segments {
            if !ids.insert(seg.id.as_str()) {
                return Err(LuminaError::validation(format!(
                    "duplicate segment id '{}'",
                    seg.id
                )));
            }
            if seg.start_pixel > seg.end_pixel {
                return Err(LuminaError::validation(format!(
                    "segment '{}' has startPixel > endPixel",
                    seg.id
                )));
            }
            if seg.end_pixel >= self.total_pixel_count {
                return Err(LuminaError::validation(format!(
                    "segment '{}' ends at pixel {} beyond the strip ({} pixels)",
                    seg.id, seg.end_pixel, self.total_pixel_count
                )));
            }
            let span = seg.end_pixel - seg.start_pixel;
            if let Some(off) = seg.anchor_offsets.iter().find(|&&o| o > span) {
                return Err(LuminaError::validation(format!(
                    "segment '{}' anchor offset {off} lies outside [0, {span}]",
                    seg.id
                )));
            }
        }

        let mut next = 0usize;
        for seg in self.segments_by_position() {
            if seg.start_pixel < next {
                return Err(LuminaError::validation(format!(
                    "segment '{}' overlaps a previous segment at pixel {}",
                    seg.id, seg.start_pixel
                )));
            }
            if seg.start_pixel > next {
                return Err(LuminaError::validation(format!(
                    "pixels {next}..{} are not covered by any segment",
                    seg.start_pixel - 1
                )));
            }
            next = seg.end_pixel + 1;
        }
        if next != self.total_pixel_count {
            return Err(LuminaError::validation(format!(
                "pixels {next}..{} are not covered by any segment",
                self.total_pixel_count - 1
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/roofline/model.rs"]
mod tests;
