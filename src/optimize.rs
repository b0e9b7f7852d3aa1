//! Single-image optimization pipeline.
//!
//! ```text
//! input ─▶ [HEIC → JPEG] ─▶ [resize] ─▶ [convert] ─▶ output
//! ```
//!
//! Each stage is optional and consumes the previous stage's output:
//!
//! 1. **Legacy conversion** runs whenever the input is HEIC/HEIF (by mime or
//!    extension), always to JPEG at the configured quality, whatever the
//!    requested output format.
//! 2. **Resize** runs only when both `max_width` and `max_height` are
//!    positive. A single bound is ignored, not treated as proportional.
//! 3. **Conversion** runs unless the format is `original` or `heic`.
//!
//! Stages are skipped, never reordered. The first failing stage aborts the
//! pipeline and its error is returned; there is no partial result.

use crate::error::PipelineError;
use crate::imaging::{
    LegacyConverter, LegacyTarget, Quality, RasterBackend, RustBackend, convert_to,
    default_converter, is_legacy, resize, resize_target,
};
use crate::types::{ImageBlob, OutputFormat};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OptimizationConfig {
    /// Output format of the final conversion stage.
    pub format: OutputFormat,
    /// Encoder quality, 1-100.
    pub quality: u32,
    /// Resize width; 0 means unconstrained.
    pub max_width: u32,
    /// Resize height; 0 means unconstrained.
    pub max_height: u32,
}

impl Default for OptimizationConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::WebP,
            quality: 80,
            max_width: 0,
            max_height: 0,
        }
    }
}

impl OptimizationConfig {
    pub fn validate(&self) -> Result<(), PipelineError> {
        if !(1..=100).contains(&self.quality) {
            return Err(PipelineError::InvalidConfig(format!(
                "optimize.quality must be 1-100, got {}",
                self.quality
            )));
        }
        Ok(())
    }

    pub fn quality(&self) -> Quality {
        Quality::new(self.quality)
    }
}

/// Optimize `blob` with the production backend and the default HEIC
/// converter.
pub fn optimize_image(
    blob: &ImageBlob,
    config: &OptimizationConfig,
) -> Result<ImageBlob, PipelineError> {
    optimize_image_with(&RustBackend::new(), &default_converter(), blob, config)
}

/// Optimize `blob` using specific collaborators (allows testing with mock).
pub fn optimize_image_with(
    backend: &impl RasterBackend,
    legacy: &impl LegacyConverter,
    blob: &ImageBlob,
    config: &OptimizationConfig,
) -> Result<ImageBlob, PipelineError> {
    config.validate()?;
    let quality = config.quality();
    let mut current = blob.clone();

    if is_legacy(&current) {
        tracing::warn!(
            name = current.name(),
            "HEIC input detected, converting to JPEG first"
        );
        current = legacy.convert_legacy(&current, LegacyTarget::Jpeg, quality.fraction())?;
    }

    if let Some((width, height)) = resize_target(config.max_width, config.max_height) {
        current = resize(backend, &current, width, height)?;
    }

    if let Some(codec) = config.format.target_codec() {
        current = convert_to(backend, &current, codec, quality)?;
    }

    tracing::debug!(
        input = blob.name(),
        output = current.name(),
        bytes_in = blob.len(),
        bytes_out = current.len(),
        "optimized"
    );
    Ok(current)
}
