use crate::{
    foundation::core::{BLACK, LedColorGroup, PixelRange, Rgbw, lerp_rgbw},
    intent::model::{DesignLayer, GradientStop, PatternRule, SpacingRule},
    roofline::model::RooflineConfig,
    zone::resolver::{resolve_zone, segments_intersecting},
};

/// Render one layer against the map: resolve its zone, clip every range to the strip and render
/// each range in zone order.
///
/// Groups of one layer never overlap each other unless the zone itself lists overlapping
/// ranges; in that case later ranges win when composited.
pub fn render_layer(layer: &DesignLayer, map: &RooflineConfig) -> Vec<LedColorGroup> {
    let Some(strip) = map.full_range() else {
        return Vec::new();
    };
    resolve_zone(&layer.zone, map)
        .into_iter()
        .filter_map(|r| r.intersection(strip))
        .flat_map(|r| render_range(layer, r, map))
        .collect()
}

/// Pixels of the layer's resolved zone that lie outside the strip and are dropped by
/// [`render_layer`].
pub fn out_of_strip_pixels(layer: &DesignLayer, map: &RooflineConfig) -> usize {
    let strip = map.full_range();
    resolve_zone(&layer.zone, map)
        .into_iter()
        .map(|r| {
            let kept = strip.and_then(|s| r.intersection(s)).map_or(0, PixelRange::len);
            r.len() - kept
        })
        .sum()
}

/// Render one layer over one concrete range.
///
/// A spacing rule, when present, takes precedence over the pattern rule.
pub fn render_range(
    layer: &DesignLayer,
    range: PixelRange,
    map: &RooflineConfig,
) -> Vec<LedColorGroup> {
    if range.is_empty() {
        return Vec::new();
    }
    let colors = &layer.colors;
    let on = colors.primary;
    let fill = colors.fill;

    match &colors.spacing {
        Some(SpacingRule::Pattern {
            on_count,
            off_count,
            start_with_on,
        }) => pattern_groups(range, *on_count, *off_count, *start_with_on, on, fill),
        Some(SpacingRule::EquallySpaced { on_count }) => {
            let lit = equally_spaced_positions(range, *on_count)
                .into_iter()
                .map(|p| PixelRange { start: p, end: p })
                .collect();
            spans_with_fill(range, lit, on, fill)
        }
        Some(SpacingRule::EveryNth { interval }) => {
            let lit = every_nth_positions(range, *interval)
                .into_iter()
                .map(|p| PixelRange { start: p, end: p })
                .collect();
            spans_with_fill(range, lit, on, fill)
        }
        Some(SpacingRule::AnchorsOnly) => {
            let color = colors.accent.unwrap_or(on);
            spans_with_fill(range, anchor_spans_in(range, map), color, fill)
        }
        Some(SpacingRule::Continuous) => vec![LedColorGroup::span(range, on)],
        None => pattern_rule_groups(&layer.pattern, range, on, colors.secondary),
    }
}

fn pattern_rule_groups(
    pattern: &PatternRule,
    range: PixelRange,
    primary: Rgbw,
    secondary: Option<Rgbw>,
) -> Vec<LedColorGroup> {
    match pattern {
        PatternRule::Solid | PatternRule::Wave | PatternRule::Twinkle => {
            vec![LedColorGroup::span(range, primary)]
        }
        PatternRule::Alternating => {
            let second = secondary.unwrap_or(BLACK);
            (range.start..=range.end)
                .map(|p| {
                    let c = if (p - range.start) % 2 == 0 {
                        primary
                    } else {
                        second
                    };
                    LedColorGroup::pixel(p, c)
                })
                .collect()
        }
        PatternRule::Gradient { stops } => {
            if stops.is_empty() {
                return vec![LedColorGroup::span(range, primary)];
            }
            let mut sorted = stops.clone();
            sorted.sort_by(|a, b| a.position.total_cmp(&b.position));
            let denom = (range.len() - 1) as f64;
            (range.start..=range.end)
                .map(|p| {
                    let t = if denom > 0.0 {
                        (p - range.start) as f64 / denom
                    } else {
                        0.0
                    };
                    LedColorGroup::pixel(p, gradient_color(&sorted, t))
                })
                .collect()
        }
    }
}

/// Color at fractional position `t` of a gradient with stops sorted by position.
///
/// Positions before the first stop or after the last stop hold the end color.
pub fn gradient_color(stops: &[GradientStop], t: f64) -> Rgbw {
    let (Some(first), Some(last)) = (stops.first(), stops.last()) else {
        return BLACK;
    };
    if t <= first.position {
        return first.color;
    }
    if t >= last.position {
        return last.color;
    }
    for pair in stops.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if t >= a.position && t <= b.position {
            let span = b.position - a.position;
            if span <= 0.0 {
                return b.color;
            }
            return lerp_rgbw(a.color, b.color, (t - a.position) / span);
        }
    }
    last.color
}

/// On/off blocks walked from the range start. Off blocks are emitted only with a fill color.
fn pattern_groups(
    range: PixelRange,
    on_count: usize,
    off_count: usize,
    start_with_on: bool,
    on: Rgbw,
    fill: Option<Rgbw>,
) -> Vec<LedColorGroup> {
    let mut out = Vec::new();
    if on_count == 0 {
        if let Some(fill) = fill {
            out.push(LedColorGroup::span(range, fill));
        }
        return out;
    }

    let mut pos = range.start;
    let mut lit = start_with_on;
    while pos <= range.end {
        let size = if lit { on_count } else { off_count };
        if size == 0 {
            lit = !lit;
            continue;
        }
        let block_end = pos.saturating_add(size - 1).min(range.end);
        if lit {
            out.push(LedColorGroup::new(pos, block_end, on));
        } else if let Some(fill) = fill {
            out.push(LedColorGroup::new(pos, block_end, fill));
        }
        if block_end == range.end {
            break;
        }
        pos = block_end + 1;
        lit = !lit;
    }
    out
}

/// Pixel indices for `on_count` equally spaced pixels over `range`.
///
/// With two or more pixels both endpoints are always included. Rounded positions that collide
/// on short ranges are deduplicated, so the result is strictly increasing and may hold fewer
/// than `on_count` entries.
pub fn equally_spaced_positions(range: PixelRange, on_count: usize) -> Vec<usize> {
    let len = range.len();
    if on_count == 0 || len == 0 {
        return Vec::new();
    }
    if on_count == 1 {
        return vec![range.start + (len - 1) / 2];
    }
    if on_count >= len {
        // Steps of at most one pixel light every pixel.
        return (range.start..=range.end).collect();
    }
    let step = (len - 1) as f64 / (on_count - 1) as f64;
    let mut out: Vec<usize> = Vec::with_capacity(on_count.min(len));
    for i in 0..on_count {
        let offset = ((i as f64) * step).round() as usize;
        let p = range.start + offset.min(len - 1);
        if out.last().is_none_or(|&last| p > last) {
            out.push(p);
        }
    }
    out
}

/// One pixel every `interval` pixels from the range start.
pub fn every_nth_positions(range: PixelRange, interval: usize) -> Vec<usize> {
    if interval == 0 || range.is_empty() {
        return Vec::new();
    }
    (range.start..=range.end).step_by(interval).collect()
}

/// Anchor spans of every segment intersecting `range`, clipped to it, sorted and merged.
pub fn anchor_spans_in(range: PixelRange, map: &RooflineConfig) -> Vec<PixelRange> {
    let mut spans: Vec<PixelRange> = segments_intersecting(map, range)
        .into_iter()
        .flat_map(|s| s.anchor_spans())
        .filter_map(|span| span.intersection(range))
        .collect();
    spans.sort_by_key(|s| (s.start, s.end));

    let mut merged: Vec<PixelRange> = Vec::with_capacity(spans.len());
    for span in spans {
        match merged.last_mut() {
            Some(prev) if span.start <= prev.end + 1 => prev.end = prev.end.max(span.end),
            _ => merged.push(span),
        }
    }
    merged
}

/// Lit spans in `on`, with the gaps between them in `fill` when a fill color is set.
fn spans_with_fill(
    range: PixelRange,
    lit: Vec<PixelRange>,
    on: Rgbw,
    fill: Option<Rgbw>,
) -> Vec<LedColorGroup> {
    let mut out = Vec::with_capacity(lit.len() * 2 + 1);
    let mut cursor = range.start;
    for span in lit {
        if let Some(fill) = fill
            && span.start > cursor
        {
            out.push(LedColorGroup::new(cursor, span.start - 1, fill));
        }
        out.push(LedColorGroup::span(span, on));
        cursor = span.end + 1;
    }
    if let Some(fill) = fill
        && cursor <= range.end
    {
        out.push(LedColorGroup::new(cursor, range.end, fill));
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/render/layer.rs"]
mod tests;
