use std::collections::BTreeMap;

use crate::foundation::core::{LedColorGroup, Rgbw};

/// Groups contributed per priority. Within one priority, groups are kept in layer list order.
pub type PriorityGroups = BTreeMap<i32, Vec<LedColorGroup>>;

/// Per-strip composition output before encoding.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Composite {
    /// Canonical groups: sorted, non-overlapping, maximal.
    pub groups: Vec<LedColorGroup>,
    /// Pixels dropped because they fell outside the strip.
    pub clipped_pixels: usize,
}

/// Merge layer output into the canonical group list for a strip of `total_pixel_count` pixels.
///
/// Priorities are painted in ascending order onto a full-length buffer, so higher priorities
/// overwrite lower ones and, within one priority, later layers overwrite earlier ones. The buffer
/// is then run-length encoded; unwritten pixels split runs and are not emitted.
pub fn composite(total_pixel_count: usize, layers: &PriorityGroups) -> Composite {
    let mut buffer: Vec<Option<Rgbw>> = vec![None; total_pixel_count];
    let mut clipped_pixels = 0usize;

    for groups in layers.values() {
        for group in groups {
            if group.is_empty() {
                continue;
            }
            if group.start_led >= total_pixel_count {
                clipped_pixels += group.len();
                continue;
            }
            let end = group.end_led.min(total_pixel_count - 1);
            clipped_pixels += group.end_led - end;
            for px in &mut buffer[group.start_led..=end] {
                *px = Some(group.color);
            }
        }
    }

    Composite {
        groups: run_length_encode(&buffer),
        clipped_pixels,
    }
}

/// Maximal runs of identical written color in `buffer`.
pub fn run_length_encode(buffer: &[Option<Rgbw>]) -> Vec<LedColorGroup> {
    let mut out: Vec<LedColorGroup> = Vec::new();
    let mut current: Option<LedColorGroup> = None;

    for (idx, px) in buffer.iter().enumerate() {
        let Some(color) = *px else {
            if let Some(run) = current.take() {
                out.push(run);
            }
            continue;
        };
        if let Some(run) = current.as_mut().filter(|r| r.color == color) {
            run.end_led = idx;
            continue;
        }
        if let Some(run) = current.replace(LedColorGroup::pixel(idx, color)) {
            out.push(run);
        }
    }
    if let Some(run) = current {
        out.push(run);
    }
    out
}

/// `true` when `groups` is sorted by start, pairwise non-overlapping and maximal (touching
/// neighbors never share a color).
pub fn is_canonical(groups: &[LedColorGroup]) -> bool {
    groups.iter().all(|g| !g.is_empty())
        && groups.windows(2).all(|w| {
            let (a, b) = (w[0], w[1]);
            a.end_led < b.start_led && !(a.end_led + 1 == b.start_led && a.color == b.color)
        })
}

/// Color at `pixel` in a canonical group list, if lit.
pub fn color_at(groups: &[LedColorGroup], pixel: usize) -> Option<Rgbw> {
    let idx = groups.partition_point(|g| g.end_led < pixel);
    groups
        .get(idx)
        .filter(|g| g.start_led <= pixel)
        .map(|g| g.color)
}

#[cfg(test)]
#[path = "../../tests/unit/composite/compositor.rs"]
mod tests;
