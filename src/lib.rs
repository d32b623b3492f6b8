//! Lumina turns a structured lighting design into an exact command for an addressable LED strip
//! mounted along a building's roofline.
//!
//! # Pipeline overview
//!
//! 1. **Validate**: `DesignIntent + RooflineConfig -> DesignIntent` with constraints and
//!    ambiguity flags attached ([`validate_intent`])
//! 2. **Clarify** (when needed): flags become ranked questions; answers are folded back into the
//!    intent ([`questions_for`], [`apply_clarifications`])
//! 3. **Render**: each enabled layer's zone is resolved to pixel ranges and filled according to
//!    its spacing or pattern rule ([`resolve_zone`], [`render_layer`])
//! 4. **Composite**: layers are painted onto a full-length buffer by ascending priority and
//!    run-length encoded into a canonical group list ([`composite`])
//! 5. **Encode**: the groups become a WLED JSON payload, per-pixel indexed or effect-based
//!    ([`encode_payload`])
//!
//! [`DesignSession`] threads a request through these steps as an explicit state value owned by the
//! caller.
//!
//! The key design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Pure core**: every stage is a function of its inputs; no IO and no retained state.
//! - **Deterministic**: the same intent and map always produce a bit-identical payload, with or
//!   without parallel layer rendering.
#![forbid(unsafe_code)]

mod clarify {
    pub mod manager;
}
mod compose {
    pub mod fingerprint;
    pub mod pipeline;
}
mod composite {
    pub mod compositor;
}
mod encode {
    pub mod wled;
}
mod foundation {
    pub mod core;
    pub mod error;
}
mod intent {
    pub mod dsl;
    pub mod model;
}
mod render {
    pub mod layer;
}
mod roofline {
    pub mod model;
}
mod session {
    pub mod orchestrator;
}
mod validate {
    pub mod validator;
}
mod zone {
    pub mod resolver;
}

pub use clarify::manager::{
    Applied, Choice, ClarificationAnswer, ClarificationQuestion, OPEN_MANUAL_LABEL,
    apply_clarifications, questions_for,
};
pub use compose::fingerprint::{PayloadFingerprint, fingerprint_payload};
pub use compose::pipeline::{ComposeOpts, ComposedPattern, compose_pattern};
pub use composite::compositor::{
    Composite, PriorityGroups, color_at, composite, is_canonical, run_length_encode,
};
pub use encode::wled::{
    EncodeParams, MAX_SEGMENT_COLORS, WledPayload, WledSegment, encode_payload, indexed_array,
    representative_colors,
};
pub use foundation::core::{BLACK, LedColorGroup, PixelRange, Rgbw, lerp_rgbw};
pub use foundation::error::{LuminaError, LuminaResult};
pub use intent::dsl::{IntentBuilder, LayerBuilder, RooflineBuilder, SegmentBuilder};
pub use intent::model::{
    AlternativeSuggestion, AmbiguityFlag, AmbiguityType, ClarificationValue, ColorAssignment,
    ConstraintKind, DesignConstraint, DesignIntent, DesignLayer, GlobalSettings, GradientStop,
    MotionDirection, MotionSettings, MotionType, PatternRule, SpacingRule, ZoneSelector,
};
pub use render::layer::{
    anchor_spans_in, equally_spaced_positions, every_nth_positions, gradient_color,
    out_of_strip_pixels, render_layer, render_range,
};
pub use roofline::model::{MAX_PIXEL_COUNT, RooflineConfig, Segment, SegmentType};
pub use session::orchestrator::{DesignSession, OrchestratorState};
pub use validate::validator::{
    ROOFLINE_CONSTRAINT_ID, shortest_range, spacing_fits, validate_intent,
};
pub use zone::resolver::{resolve_zone, segments_intersecting};
