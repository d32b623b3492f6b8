use rayon::prelude::*;

use crate::{
    composite::compositor::{PriorityGroups, composite},
    compose::fingerprint::{PayloadFingerprint, fingerprint_payload},
    encode::wled::{EncodeParams, MAX_SEGMENT_COLORS, WledPayload, encode_payload},
    foundation::core::{LedColorGroup, Rgbw},
    foundation::error::{LuminaError, LuminaResult},
    intent::model::{DesignIntent, DesignLayer},
    render::layer::{out_of_strip_pixels, render_layer},
    roofline::model::RooflineConfig,
};

/// Speed and intensity reported when no effect is active.
const DEFAULT_EFFECT_PARAM: u8 = 128;

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
/// Options for [`compose_pattern`] and the orchestrator.
pub struct ComposeOpts {
    /// Render layers on a dedicated rayon pool.
    pub parallel: bool,
    /// Override the number of rayon worker threads. `None` uses rayon defaults.
    pub threads: Option<usize>,
    /// Cap on representative colors in the effect form (`1..=3`).
    pub max_effect_colors: usize,
    /// WLED segment id written into the payload.
    pub segment_id: u32,
    /// Clarification rounds allowed before giving up with an error.
    pub max_clarification_rounds: u32,
}

impl Default for ComposeOpts {
    fn default() -> Self {
        Self {
            parallel: false,
            threads: None,
            max_effect_colors: MAX_SEGMENT_COLORS,
            segment_id: 0,
            max_clarification_rounds: 8,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
/// Final, immutable output of a composition.
pub struct ComposedPattern {
    /// Canonical group list spanning the strip.
    pub groups: Vec<LedColorGroup>,
    /// Device effect id (0 when static).
    pub effect_id: u8,
    /// Effect speed.
    pub effect_speed: u8,
    /// Effect intensity.
    pub effect_intensity: u8,
    /// Master brightness.
    pub brightness: u8,
    /// Whether an effect drives the payload.
    pub has_motion: bool,
    /// Wire payload for the controller.
    pub wled_payload: WledPayload,
    /// Distinct colors in first-seen order.
    pub colors_used: Vec<Rgbw>,
    /// Strip length targeted.
    pub total_pixel_count: usize,
    /// Non-fatal issues found while composing.
    pub warnings: Vec<String>,
}

impl ComposedPattern {
    pub fn fingerprint(&self) -> PayloadFingerprint {
        fingerprint_payload(&self.wled_payload)
    }
}

/// Render, composite and encode every enabled layer of `intent` against `map`.
///
/// This is a pure function of its inputs: composing the same intent twice produces identical
/// payloads, with or without parallel rendering. Layers that light nothing degrade to warnings
/// as long as one layer contributes pixels.
#[tracing::instrument(skip_all, fields(layers = intent.layers.len(), pixels = map.total_pixel_count))]
pub fn compose_pattern(
    intent: &DesignIntent,
    map: &RooflineConfig,
    opts: &ComposeOpts,
) -> LuminaResult<ComposedPattern> {
    map.validate()?;
    intent.validate()?;

    let layers: Vec<&DesignLayer> = intent.enabled_layers().collect();
    if layers.is_empty() {
        return Err(LuminaError::composition(
            "design has no enabled layers",
            false,
        ));
    }

    let rendered = render_layers(&layers, map, opts)?;
    let mut warnings = Vec::new();

    let mut by_priority = PriorityGroups::new();
    for (layer, groups) in layers.iter().zip(rendered) {
        let clipped = out_of_strip_pixels(layer, map);
        if clipped > 0 {
            tracing::debug!(layer = %layer.id, clipped, "zone extends past the strip");
            warnings.push(format!(
                "layer '{}': {clipped} pixels fell outside the {}-pixel strip and were dropped",
                layer.label(),
                map.total_pixel_count
            ));
        }
        if groups.is_empty() {
            tracing::warn!(layer = %layer.id, "layer lit no pixels");
            warnings.push(format!("layer '{}' did not light any pixels", layer.label()));
            continue;
        }
        tracing::debug!(layer = %layer.id, groups = groups.len(), "rendered layer");
        by_priority.entry(layer.priority).or_default().extend(groups);
    }
    if by_priority.is_empty() {
        return Err(LuminaError::composition(
            "no layer lit any pixels",
            true,
        ));
    }

    let out = composite(map.total_pixel_count, &by_priority);
    if out.clipped_pixels > 0 {
        warnings.push(format!(
            "{} pixels fell outside the {}-pixel strip and were dropped",
            out.clipped_pixels, map.total_pixel_count
        ));
    }

    let primary = intent.primary_motion();
    if let Some((primary_layer, _)) = primary {
        for layer in intent.enabled_layers() {
            let has_effect = layer.motion.as_ref().is_some_and(|m| m.effect_id != 0);
            if has_effect && layer.id != primary_layer.id {
                warnings.push(format!(
                    "motion on layer '{}' ignored; only '{}' drives the effect",
                    layer.label(),
                    primary_layer.label()
                ));
            }
        }
    }
    let motion = primary.map(|(_, m)| m);

    let payload = encode_payload(
        &out.groups,
        &EncodeParams {
            settings: &intent.global_settings,
            motion,
            total_pixel_count: map.total_pixel_count,
            segment_id: opts.segment_id,
            max_effect_colors: opts.max_effect_colors,
        },
    );

    for w in &warnings {
        tracing::warn!("{w}");
    }

    Ok(ComposedPattern {
        colors_used: distinct_colors(&out.groups),
        effect_id: motion.map_or(0, |m| m.effect_id),
        effect_speed: motion.map_or(DEFAULT_EFFECT_PARAM, |m| m.speed),
        effect_intensity: motion.map_or(DEFAULT_EFFECT_PARAM, |m| m.intensity),
        brightness: intent.global_settings.brightness,
        has_motion: motion.is_some(),
        wled_payload: payload,
        total_pixel_count: map.total_pixel_count,
        groups: out.groups,
        warnings,
    })
}

fn render_layers(
    layers: &[&DesignLayer],
    map: &RooflineConfig,
    opts: &ComposeOpts,
) -> LuminaResult<Vec<Vec<LedColorGroup>>> {
    if !opts.parallel {
        return Ok(layers.iter().map(|l| render_layer(l, map)).collect());
    }
    let pool = build_thread_pool(opts.threads)?;
    Ok(pool.install(|| layers.par_iter().map(|l| render_layer(l, map)).collect()))
}

fn build_thread_pool(threads: Option<usize>) -> LuminaResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(LuminaError::validation(
            "compose option 'threads' must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| LuminaError::Other(anyhow::anyhow!("failed to build rayon thread pool: {e}")))
}

fn distinct_colors(groups: &[LedColorGroup]) -> Vec<Rgbw> {
    let mut out: Vec<Rgbw> = Vec::new();
    for g in groups {
        if !out.contains(&g.color) {
            out.push(g.color);
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/compose/pipeline.rs"]
mod tests;
