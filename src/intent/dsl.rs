use crate::{
    foundation::core::Rgbw,
    foundation::error::{LuminaError, LuminaResult},
    intent::model::{
        ColorAssignment, DesignIntent, DesignLayer, GlobalSettings, MotionSettings, PatternRule,
        SpacingRule, ZoneSelector,
    },
    roofline::model::{RooflineConfig, Segment, SegmentType},
};

/// Programmatic construction of a [`RooflineConfig`].
pub struct RooflineBuilder {
    total_pixel_count: usize,
    segments: Vec<Segment>,
}

impl RooflineBuilder {
    /// Start a map for a strip of `total_pixel_count` pixels.
    pub fn new(total_pixel_count: usize) -> Self {
        Self {
            total_pixel_count,
            segments: Vec::new(),
        }
    }

    /// Append a segment.
    pub fn segment(mut self, segment: Segment) -> Self {
        self.segments.push(segment);
        self
    }

    /// Build and validate the map.
    pub fn build(self) -> LuminaResult<RooflineConfig> {
        let map = RooflineConfig {
            total_pixel_count: self.total_pixel_count,
            segments: self.segments,
        };
        map.validate()?;
        Ok(map)
    }
}

/// Programmatic construction of a [`Segment`].
pub struct SegmentBuilder {
    segment: Segment,
}

impl SegmentBuilder {
    /// Segment `id` of role `kind` over `[start, end]`; the name defaults to the id.
    pub fn new(id: impl Into<String>, kind: SegmentType, start: usize, end: usize) -> Self {
        let id = id.into();
        Self {
            segment: Segment {
                name: id.clone(),
                id,
                kind,
                start_pixel: start,
                end_pixel: end,
                anchor_offsets: Vec::new(),
                anchor_led_count: 1,
                level: None,
            },
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.segment.name = name.into();
        self
    }

    pub fn anchors(mut self, offsets: impl IntoIterator<Item = usize>) -> Self {
        self.segment.anchor_offsets = offsets.into_iter().collect();
        self
    }

    pub fn anchor_led_count(mut self, n: usize) -> Self {
        self.segment.anchor_led_count = n;
        self
    }

    pub fn level(mut self, level: i32) -> Self {
        self.segment.level = Some(level);
        self
    }

    pub fn build(self) -> Segment {
        self.segment
    }
}

/// Programmatic construction of a [`DesignLayer`].
pub struct LayerBuilder {
    layer: DesignLayer,
}

impl LayerBuilder {
    /// Solid layer `id` over `zone` in `primary`, priority 0, enabled.
    pub fn new(id: impl Into<String>, zone: ZoneSelector, primary: Rgbw) -> Self {
        Self {
            layer: DesignLayer {
                id: id.into(),
                name: String::new(),
                zone,
                colors: ColorAssignment {
                    primary,
                    secondary: None,
                    accent: None,
                    fill: None,
                    spacing: None,
                },
                pattern: PatternRule::Solid,
                motion: None,
                priority: 0,
                enabled: true,
            },
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.layer.name = name.into();
        self
    }

    pub fn secondary(mut self, color: Rgbw) -> Self {
        self.layer.colors.secondary = Some(color);
        self
    }

    pub fn accent(mut self, color: Rgbw) -> Self {
        self.layer.colors.accent = Some(color);
        self
    }

    pub fn fill(mut self, color: Rgbw) -> Self {
        self.layer.colors.fill = Some(color);
        self
    }

    pub fn spacing(mut self, spacing: SpacingRule) -> Self {
        self.layer.colors.spacing = Some(spacing);
        self
    }

    pub fn pattern(mut self, pattern: PatternRule) -> Self {
        self.layer.pattern = pattern;
        self
    }

    pub fn motion(mut self, motion: MotionSettings) -> Self {
        self.layer.motion = Some(motion);
        self
    }

    pub fn priority(mut self, priority: i32) -> Self {
        self.layer.priority = priority;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.layer.enabled = false;
        self
    }

    pub fn build(self) -> DesignLayer {
        self.layer
    }
}

/// Programmatic construction of a [`DesignIntent`].
pub struct IntentBuilder {
    original_text: String,
    layers: Vec<DesignLayer>,
    global_settings: GlobalSettings,
    confidence: f64,
}

impl Default for IntentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl IntentBuilder {
    pub fn new() -> Self {
        Self {
            original_text: String::new(),
            layers: Vec::new(),
            global_settings: GlobalSettings::default(),
            confidence: 1.0,
        }
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.original_text = text.into();
        self
    }

    /// Append a layer; duplicate ids are rejected.
    pub fn layer(mut self, layer: DesignLayer) -> LuminaResult<Self> {
        if self.layers.iter().any(|l| l.id == layer.id) {
            return Err(LuminaError::validation(format!(
                "duplicate layer id '{}'",
                layer.id
            )));
        }
        self.layers.push(layer);
        Ok(self)
    }

    pub fn brightness(mut self, brightness: u8) -> Self {
        self.global_settings.brightness = brightness;
        self
    }

    pub fn transition(mut self, transition: u32) -> Self {
        self.global_settings.transition = transition;
        self
    }

    pub fn confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }

    pub fn build(self) -> LuminaResult<DesignIntent> {
        let intent = DesignIntent {
            original_text: self.original_text,
            layers: self.layers,
            global_settings: self.global_settings,
            constraints: Vec::new(),
            ambiguities: Vec::new(),
            acknowledged: Vec::new(),
            confidence: self.confidence,
        };
        intent.validate()?;
        Ok(intent)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/intent/dsl.rs"]
mod tests;
