use crate::{
    foundation::core::{BLACK, LedColorGroup, Rgbw},
    intent::model::{GlobalSettings, MotionDirection, MotionSettings},
};

/// Most colors a WLED segment accepts in its `col` slot list.
pub const MAX_SEGMENT_COLORS: usize = 3;

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// WLED JSON state update (`POST /json/state`).
pub struct WledPayload {
    /// Power state.
    pub on: bool,
    /// Master brightness.
    pub bri: u8,
    /// Crossfade time in 100 ms units.
    pub transition: u32,
    /// Segment descriptors.
    pub seg: Vec<WledSegment>,
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// One WLED segment descriptor.
///
/// Exactly one of the indexed form (`i`) and the effect form (`col` + `fx`) is populated.
pub struct WledSegment {
    /// Segment id on the controller.
    pub id: u32,
    /// First pixel (inclusive).
    pub start: usize,
    /// One past the last pixel.
    pub stop: usize,
    /// Flat `[index, r, g, b, ...]` per-pixel colors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub i: Option<Vec<u32>>,
    /// Effect color slots.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub col: Option<Vec<Rgbw>>,
    /// Effect id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fx: Option<u8>,
    /// Effect speed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sx: Option<u8>,
    /// Effect intensity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ix: Option<u8>,
    /// Reverse effect direction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rev: Option<bool>,
}

impl WledPayload {
    /// `true` when the first segment carries a per-pixel array.
    pub fn is_indexed(&self) -> bool {
        self.seg.first().is_some_and(|s| s.i.is_some())
    }

    /// `true` when the first segment carries an effect.
    pub fn is_effect(&self) -> bool {
        self.seg.first().is_some_and(|s| s.fx.is_some())
    }
}

/// Inputs to [`encode_payload`] besides the canonical groups.
#[derive(Clone, Copy, Debug)]
pub struct EncodeParams<'a> {
    /// Strip-wide settings.
    pub settings: &'a GlobalSettings,
    /// Motion honored for the effect form; `None` or effect id 0 selects the indexed form.
    pub motion: Option<&'a MotionSettings>,
    /// Strip length.
    pub total_pixel_count: usize,
    /// Segment id written into the descriptor.
    pub segment_id: u32,
    /// Cap on `col` entries, clamped to `1..=MAX_SEGMENT_COLORS`.
    pub max_effect_colors: usize,
}

/// Encode canonical groups into a WLED payload.
///
/// A motion with a non-zero effect id selects the effect form, which keeps at most a few
/// representative colors and gives up per-pixel accuracy. Otherwise every lit pixel is listed
/// explicitly in the indexed form.
pub fn encode_payload(groups: &[LedColorGroup], params: &EncodeParams<'_>) -> WledPayload {
    let mut seg = WledSegment {
        id: params.segment_id,
        start: 0,
        stop: params.total_pixel_count,
        i: None,
        col: None,
        fx: None,
        sx: None,
        ix: None,
        rev: None,
    };

    match params.motion.filter(|m| m.effect_id != 0) {
        Some(motion) => {
            let cap = params.max_effect_colors.clamp(1, MAX_SEGMENT_COLORS);
            let mut colors = representative_colors(groups, cap);
            if colors.is_empty() {
                colors.push(BLACK);
            }
            seg.col = Some(colors);
            seg.fx = Some(motion.effect_id);
            seg.sx = Some(motion.speed);
            seg.ix = Some(motion.intensity);
            seg.rev = Some(motion.reverse ^ (motion.direction == MotionDirection::Backward));
        }
        None => seg.i = Some(indexed_array(groups)),
    }

    WledPayload {
        on: params.settings.on,
        bri: params.settings.brightness,
        transition: params.settings.transition,
        seg: vec![seg],
    }
}

/// Distinct colors in first-seen order, at most `cap`.
pub fn representative_colors(groups: &[LedColorGroup], cap: usize) -> Vec<Rgbw> {
    let mut out: Vec<Rgbw> = Vec::with_capacity(cap);
    for g in groups {
        if out.len() >= cap {
            break;
        }
        if !out.contains(&g.color) {
            out.push(g.color);
        }
    }
    out
}

/// Expand groups into the flat `[index, r, g, b, ...]` array.
pub fn indexed_array(groups: &[LedColorGroup]) -> Vec<u32> {
    let lit: usize = groups.iter().map(LedColorGroup::len).sum();
    let mut out = Vec::with_capacity(lit * 4);
    for g in groups {
        let [r, gr, b, _] = g.color;
        for idx in g.start_led..=g.end_led {
            out.extend_from_slice(&[idx as u32, u32::from(r), u32::from(gr), u32::from(b)]);
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/encode/wled.rs"]
mod tests;
