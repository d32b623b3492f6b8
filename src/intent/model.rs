use std::collections::HashSet;

use crate::{
    foundation::core::{PixelRange, Rgbw},
    foundation::error::{LuminaError, LuminaResult},
    roofline::model::SegmentType,
};

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
/// Structured lighting design produced upstream from free text.
///
/// An intent is a pure data value owned by the caller. The validator attaches constraints and
/// ambiguity flags to it; the clarification manager folds answers back into its layers. Nothing
/// in the composer keeps a reference to it between calls.
pub struct DesignIntent {
    /// Originating free text, kept for traceability only.
    #[serde(default)]
    pub original_text: String,
    /// Ordered layers; list order breaks priority ties.
    pub layers: Vec<DesignLayer>,
    /// Strip-wide output settings.
    #[serde(default)]
    pub global_settings: GlobalSettings,
    /// Constraint checks attached by upstream parsing and by the validator.
    #[serde(default)]
    pub constraints: Vec<DesignConstraint>,
    /// Open questions that block composition.
    #[serde(default)]
    pub ambiguities: Vec<AmbiguityFlag>,
    /// Question ids answered with "keep as is"; the validator waives them instead of asking again.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub acknowledged: Vec<String>,
    /// Upstream confidence in `[0, 1]`.
    #[serde(default = "default_confidence")]
    pub confidence: f64,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
/// One independent visual rule of a design.
pub struct DesignLayer {
    /// Stable identifier, unique within the intent.
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Which pixels the layer targets.
    pub zone: ZoneSelector,
    /// Colors and optional spacing.
    pub colors: ColorAssignment,
    /// Fill rule used when no spacing rule is set.
    #[serde(default)]
    pub pattern: PatternRule,
    /// Optional animation parameters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub motion: Option<MotionSettings>,
    /// Higher priority wins on pixel conflicts.
    #[serde(default)]
    pub priority: i32,
    /// Disabled layers are ignored everywhere.
    #[serde(default = "default_true")]
    pub enabled: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
/// Symbolic description of the pixels a layer targets.
pub enum ZoneSelector {
    /// The whole strip.
    All,
    /// Explicit segment ids.
    Segments {
        /// Segment ids, in the order they should be resolved.
        ids: Vec<String>,
    },
    /// Every segment with one of the given structural roles.
    Architectural {
        /// Requested roles.
        roles: Vec<SegmentType>,
    },
    /// Segments whose name mentions a side of the building.
    Location {
        /// Side keyword such as `front`, `back`, `left`, `right`.
        location: String,
    },
    /// Segments on one story.
    Level {
        /// Story number.
        level: i32,
    },
    /// Explicit pixel ranges, passed through unchanged.
    Custom {
        /// Inclusive ranges.
        ranges: Vec<PixelRange>,
    },
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
/// Colors used by a layer.
pub struct ColorAssignment {
    /// Main "on" color.
    pub primary: Rgbw,
    /// Second color for alternating patterns.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary: Option<Rgbw>,
    /// Highlight color for anchors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accent: Option<Rgbw>,
    /// Background color for unlit gaps in spaced rules.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<Rgbw>,
    /// Spacing rule; takes precedence over the layer's pattern rule.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spacing: Option<SpacingRule>,
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
/// Deterministic rule selecting which pixels of a range are lit.
pub enum SpacingRule {
    /// Repeating cycle of `on_count` lit and `off_count` unlit pixels.
    Pattern {
        /// Lit pixels per cycle.
        on_count: usize,
        /// Unlit pixels per cycle.
        off_count: usize,
        /// Whether the cycle starts with the lit block.
        #[serde(default = "default_true")]
        start_with_on: bool,
    },
    /// `on_count` single pixels spread over the range, endpoints included.
    EquallySpaced {
        /// Number of lit pixels.
        on_count: usize,
    },
    /// One lit pixel every `interval` pixels from the range start.
    EveryNth {
        /// Stride in pixels.
        interval: usize,
    },
    /// Only segment anchors inside the range.
    AnchorsOnly,
    /// Solid fill.
    Continuous,
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
/// Per-pixel color rule used when no spacing rule is set.
pub enum PatternRule {
    /// Primary color everywhere.
    #[default]
    Solid,
    /// Primary and secondary by pixel parity.
    Alternating,
    /// Linear gradient across the range.
    Gradient {
        /// Stops sorted by position.
        stops: Vec<GradientStop>,
    },
    /// Flat base color; the wave itself is a device effect.
    Wave,
    /// Flat base color; the twinkle itself is a device effect.
    Twinkle,
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
/// Gradient color stop.
pub struct GradientStop {
    /// Position in `[0, 1]` along the range.
    pub position: f64,
    /// Color at that position.
    pub color: Rgbw,
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
/// Animation parameters mapped onto a device effect.
pub struct MotionSettings {
    /// Kind of motion requested.
    #[serde(default)]
    pub motion_type: MotionType,
    /// Travel direction.
    #[serde(default)]
    pub direction: MotionDirection,
    /// Effect speed, 0-255.
    #[serde(default = "default_effect_param")]
    pub speed: u8,
    /// Effect intensity, 0-255.
    #[serde(default = "default_effect_param")]
    pub intensity: u8,
    /// Play the effect reversed.
    #[serde(default)]
    pub reverse: bool,
    /// Device effect id; 0 is the static effect.
    #[serde(default)]
    pub effect_id: u8,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
/// Kind of motion.
pub enum MotionType {
    /// No motion.
    #[default]
    None,
    /// Moving blocks.
    Chase,
    /// Brightness pulse.
    Pulse,
    /// Random sparkles.
    Twinkle,
    /// Travelling wave.
    Wave,
    /// Slow color fade.
    Fade,
    /// Hue cycle.
    Rainbow,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
/// Direction of travel along the strip.
pub enum MotionDirection {
    /// Increasing pixel index.
    #[default]
    Forward,
    /// Decreasing pixel index.
    Backward,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
/// Strip-wide output settings.
pub struct GlobalSettings {
    /// Power state.
    #[serde(default = "default_true")]
    pub on: bool,
    /// Master brightness, 0-255.
    #[serde(default = "default_brightness")]
    pub brightness: u8,
    /// Crossfade time in 100 ms units.
    #[serde(default = "default_transition")]
    pub transition: u32,
}

impl Default for GlobalSettings {
    fn default() -> Self {
        Self {
            on: true,
            brightness: default_brightness(),
            transition: default_transition(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
/// Outcome of one realizability check.
pub struct DesignConstraint {
    /// Deterministic identifier.
    pub id: String,
    /// What was checked.
    pub kind: ConstraintKind,
    /// Layer the check applies to, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layer_id: Option<String>,
    /// Whether the check passed.
    pub satisfied: bool,
    /// Why the check failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
    /// Ranked ways to satisfy the check.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alternatives: Vec<AlternativeSuggestion>,
    /// Failed, but the user chose to keep the design as is.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub waived: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
/// Family of a constraint check.
pub enum ConstraintKind {
    /// Map validity and custom ranges inside the strip.
    PixelBounds,
    /// Zone resolves to at least one range.
    ZoneNonEmpty,
    /// Spacing parameters fit the target range.
    SpacingFeasible,
    /// Overlapping layers have distinct priorities.
    PriorityConflict,
    /// Attached upstream; never rewritten by the validator.
    Upstream,
}

impl ConstraintKind {
    /// Kinds the validator recomputes on every pass.
    pub fn is_validator_owned(self) -> bool {
        !matches!(self, Self::Upstream)
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
/// A point where the intent under-specifies the design.
pub struct AmbiguityFlag {
    /// Deterministic identifier; also the id of the resulting question.
    pub id: String,
    /// Category.
    pub kind: AmbiguityType,
    /// Layer the ambiguity concerns, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layer_id: Option<String>,
    /// Question text shown to the user.
    pub message: String,
    /// Ranked candidate answers.
    #[serde(default)]
    pub options: Vec<AlternativeSuggestion>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
/// Category of an ambiguity.
pub enum AmbiguityType {
    /// A zone resolved to no pixels.
    ZoneEmpty,
    /// A custom zone reaches outside the strip.
    ZoneOutOfBounds,
    /// Spacing parameters cannot be realized on the target range.
    SpacingImpossible,
    /// Overlapping layers share a priority.
    PriorityConflict,
    /// Upstream could not tell which color was meant.
    ColorUnclear,
    /// Upstream could not tell which part of the roofline was meant.
    ZoneUnclear,
    /// Upstream could not tell which pattern was meant.
    PatternUnclear,
    /// Upstream could not tell how pixels should be spaced.
    SpacingUnclear,
    /// Upstream could not tell which motion was meant.
    MotionUnclear,
    /// Anything else raised upstream.
    Other,
}

impl AmbiguityType {
    /// Kinds the validator raises and recomputes on every pass.
    pub fn is_validator_owned(self) -> bool {
        matches!(
            self,
            Self::ZoneEmpty | Self::ZoneOutOfBounds | Self::SpacingImpossible | Self::PriorityConflict
        )
    }

    /// Ordering used when ranking questions; lower is asked first.
    pub fn rank(self) -> u8 {
        match self {
            Self::ZoneEmpty | Self::ZoneOutOfBounds | Self::ZoneUnclear => 0,
            Self::SpacingImpossible | Self::SpacingUnclear => 1,
            Self::PriorityConflict => 2,
            Self::ColorUnclear | Self::PatternUnclear => 3,
            Self::MotionUnclear => 4,
            Self::Other => 5,
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
/// A suggested way to resolve a constraint or ambiguity.
pub struct AlternativeSuggestion {
    /// Short label.
    pub label: String,
    /// Longer explanation.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Value folded back into the intent when chosen.
    pub value: ClarificationValue,
    /// 1 is the best suggestion.
    #[serde(default)]
    pub rank: u32,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "action", rename_all = "camelCase", rename_all_fields = "camelCase")]
/// Opaque answer payload carried by a clarification choice.
pub enum ClarificationValue {
    /// Replace a layer's zone.
    SetZone {
        /// Target layer.
        layer_id: String,
        /// New zone.
        zone: ZoneSelector,
    },
    /// Replace a layer's spacing rule (`None` removes it).
    SetSpacing {
        /// Target layer.
        layer_id: String,
        /// New spacing.
        spacing: Option<SpacingRule>,
    },
    /// Replace a layer's priority.
    SetPriority {
        /// Target layer.
        layer_id: String,
        /// New priority.
        priority: i32,
    },
    /// Replace a layer's primary color.
    SetPrimaryColor {
        /// Target layer.
        layer_id: String,
        /// New color.
        color: Rgbw,
    },
    /// Replace a layer's pattern rule.
    SetPattern {
        /// Target layer.
        layer_id: String,
        /// New pattern.
        pattern: PatternRule,
    },
    /// Disable a layer.
    DisableLayer {
        /// Target layer.
        layer_id: String,
    },
    /// Accept the intent as it stands.
    KeepAsIs,
    /// Stop automatic composition and open manual controls.
    OpenManual,
}

impl DesignIntent {
    /// Build an intent with default settings and no flags.
    pub fn new(layers: Vec<DesignLayer>) -> Self {
        Self {
            original_text: String::new(),
            layers,
            global_settings: GlobalSettings::default(),
            constraints: Vec::new(),
            ambiguities: Vec::new(),
            acknowledged: Vec::new(),
            confidence: default_confidence(),
        }
    }

    /// `true` while any ambiguity is open.
    pub fn needs_clarification(&self) -> bool {
        !self.ambiguities.is_empty()
    }

    /// `true` when every attached constraint passed or was waived.
    pub fn all_constraints_satisfied(&self) -> bool {
        self.constraints.iter().all(|c| c.satisfied || c.waived)
    }

    /// `true` when the intent can be composed as is.
    pub fn is_ready(&self) -> bool {
        !self.needs_clarification() && self.all_constraints_satisfied()
    }

    /// Enabled layers in list order.
    pub fn enabled_layers(&self) -> impl Iterator<Item = &DesignLayer> {
        self.layers.iter().filter(|l| l.enabled)
    }

    /// Look up a layer by id.
    pub fn layer(&self, id: &str) -> Option<&DesignLayer> {
        self.layers.iter().find(|l| l.id == id)
    }

    /// Look up a layer by id for modification.
    pub fn layer_mut(&mut self, id: &str) -> Option<&mut DesignLayer> {
        self.layers.iter_mut().find(|l| l.id == id)
    }

    /// The motion honored in the payload: first enabled layer, in list order, whose motion
    /// carries a non-zero effect id.
    pub fn primary_motion(&self) -> Option<(&DesignLayer, &MotionSettings)> {
        self.enabled_layers().find_map(|l| {
            l.motion
                .as_ref()
                .filter(|m| m.effect_id != 0)
                .map(|m| (l, m))
        })
    }

    /// Structural checks that are errors rather than ambiguities.
    pub fn validate(&self) -> LuminaResult<()> {
        let mut ids = HashSet::new();
        for layer in &self.layers {
            if layer.id.trim().is_empty() {
                return Err(LuminaError::validation("layer id must be non-empty"));
            }
            if !ids.insert(layer.id.as_str()) {
                return Err(LuminaError::validation(format!(
                    "duplicate layer id '{}'",
                    layer.id
                )));
            }
            if let PatternRule::Gradient { stops } = &layer.pattern {
                for stop in stops {
                    if !stop.position.is_finite() || !(0.0..=1.0).contains(&stop.position) {
                        return Err(LuminaError::validation(format!(
                            "layer '{}' gradient stop position {} is outside [0, 1]",
                            layer.id, stop.position
                        )));
                    }
                }
            }
        }
        if !self.confidence.is_finite() || !(0.0..=1.0).contains(&self.confidence) {
            return Err(LuminaError::validation(format!(
                "confidence {} is outside [0, 1]",
                self.confidence
            )));
        }
        Ok(())
    }
}

impl DesignLayer {
    /// Display label: the name, or the id when unnamed.
    pub fn label(&self) -> &str {
        if self.name.trim().is_empty() {
            &self.id
        } else {
            &self.name
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_confidence() -> f64 {
    1.0
}

fn default_brightness() -> u8 {
    255
}

fn default_transition() -> u32 {
    7
}

fn default_effect_param() -> u8 {
    128
}

#[cfg(test)]
#[path = "../../tests/unit/intent/model.rs"]
mod tests;
