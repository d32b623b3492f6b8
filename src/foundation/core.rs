use crate::foundation::error::{LuminaError, LuminaResult};

/// Four-channel LED color: `[r, g, b, w]`.
pub type Rgbw = [u8; 4];

/// All channels off.
pub const BLACK: Rgbw = [0, 0, 0, 0];

/// Inclusive, contiguous range of pixel indices on the strip.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct PixelRange {
    /// First pixel (inclusive).
    pub start: usize,
    /// Last pixel (inclusive).
    pub end: usize,
}

impl PixelRange {
    /// Build a range, rejecting `start > end`.
    pub fn new(start: usize, end: usize) -> LuminaResult<Self> {
        if start > end {
            return Err(LuminaError::validation(format!(
                "pixel range start {start} must be <= end {end}"
            )));
        }
        Ok(Self { start, end })
    }

    /// Number of pixels covered. An inverted range counts as empty.
    pub fn len(self) -> usize {
        if self.start > self.end {
            0
        } else {
            self.end - self.start + 1
        }
    }

    /// `true` for inverted ranges.
    pub fn is_empty(self) -> bool {
        self.len() == 0
    }

    /// `true` when `pixel` lies inside the range.
    pub fn contains(self, pixel: usize) -> bool {
        self.start <= pixel && pixel <= self.end
    }

    /// `true` when the two ranges share at least one pixel.
    pub fn intersects(self, other: PixelRange) -> bool {
        !self.is_empty() && !other.is_empty() && self.start <= other.end && other.start <= self.end
    }

    /// Overlapping part of two ranges, if any.
    pub fn intersection(self, other: PixelRange) -> Option<PixelRange> {
        if !self.intersects(other) {
            return None;
        }
        Some(PixelRange {
            start: self.start.max(other.start),
            end: self.end.min(other.end),
        })
    }
}

/// Contiguous run of pixels sharing one color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedColorGroup {
    /// First pixel (inclusive).
    pub start_led: usize,
    /// Last pixel (inclusive).
    pub end_led: usize,
    /// Color of every pixel in the run.
    pub color: Rgbw,
}

impl LedColorGroup {
    pub fn new(start_led: usize, end_led: usize, color: Rgbw) -> Self {
        Self {
            start_led,
            end_led,
            color,
        }
    }

    /// Single-pixel group.
    pub fn pixel(index: usize, color: Rgbw) -> Self {
        Self::new(index, index, color)
    }

    /// A range painted in one color.
    pub fn span(range: PixelRange, color: Rgbw) -> Self {
        Self::new(range.start, range.end, color)
    }

    pub fn range(&self) -> PixelRange {
        PixelRange {
            start: self.start_led,
            end: self.end_led,
        }
    }

    pub fn len(&self) -> usize {
        self.range().len()
    }

    pub fn is_empty(&self) -> bool {
        self.range().is_empty()
    }
}

/// Linear interpolation between two colors, per channel, rounded to nearest.
pub fn lerp_rgbw(a: Rgbw, b: Rgbw, t: f64) -> Rgbw {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    let mut out = [0u8; 4];
    for i in 0..4 {
        let av = f64::from(a[i]);
        let bv = f64::from(b[i]);
        out[i] = (av + (bv - av) * t).round().clamp(0.0, 255.0) as u8;
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
