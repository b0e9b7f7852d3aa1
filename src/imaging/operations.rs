//! High-level image operations.
//!
//! These functions combine surfaces with backend execution: format
//! conversion (decode → draw → encode) and stretch-resize. They take a
//! blob and return a new blob; inputs are never modified.

use super::backend::{BackendError, RasterBackend};
use super::color::WHITE;
use super::params::Quality;
use super::surface::Surface;
use crate::types::{Codec, ImageBlob, with_extension};

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Decode `blob` and re-encode it as `codec` at `quality` percent.
///
/// Targets without alpha (JPEG, BMP) are drawn over opaque white, so
/// transparent regions come out white. The output name keeps the stem and
/// takes the codec's canonical extension.
pub fn convert_to(
    backend: &impl RasterBackend,
    blob: &ImageBlob,
    codec: Codec,
    quality: Quality,
) -> Result<ImageBlob> {
    if codec == Codec::Png && quality.value() < 100 {
        tracing::warn!(
            name = blob.name(),
            quality = quality.value(),
            "PNG is lossless; quality has no effect on output size"
        );
    }

    let decoded = backend.decode_to_surface(blob)?;
    let surface = if codec.supports_alpha() {
        decoded
    } else {
        let (w, h) = decoded.dimensions();
        let mut canvas = Surface::filled(w, h, WHITE);
        canvas.draw(&decoded, 0, 0);
        canvas
    };

    let name = with_extension(blob.name(), codec.extension());
    tracing::debug!(from = blob.name(), to = %name, ?codec, "converting");
    backend.encode_surface(&surface, codec, quality.fraction(), &name)
}

pub fn convert_to_webp(
    backend: &impl RasterBackend,
    blob: &ImageBlob,
    quality: Quality,
) -> Result<ImageBlob> {
    convert_to(backend, blob, Codec::WebP, quality)
}

pub fn convert_to_avif(
    backend: &impl RasterBackend,
    blob: &ImageBlob,
    quality: Quality,
) -> Result<ImageBlob> {
    convert_to(backend, blob, Codec::Avif, quality)
}

pub fn convert_to_jpeg(
    backend: &impl RasterBackend,
    blob: &ImageBlob,
    quality: Quality,
) -> Result<ImageBlob> {
    convert_to(backend, blob, Codec::Jpeg, quality)
}

/// `quality` is accepted for symmetry with the lossy conversions and only
/// triggers a warning.
pub fn convert_to_png(
    backend: &impl RasterBackend,
    blob: &ImageBlob,
    quality: Quality,
) -> Result<ImageBlob> {
    convert_to(backend, blob, Codec::Png, quality)
}

/// Stretch `blob` to exactly `width × height` and re-encode it in its
/// original format at [`Quality::RESIZE`]. The name is kept unchanged.
///
/// Fails with [`BackendError::UnsupportedMime`] when the blob's mime type
/// has no encoder.
pub fn resize(
    backend: &impl RasterBackend,
    blob: &ImageBlob,
    width: u32,
    height: u32,
) -> Result<ImageBlob> {
    let codec = Codec::from_mime(blob.mime())
        .ok_or_else(|| BackendError::UnsupportedMime(blob.mime().to_string()))?;
    let surface = backend.decode_and_draw_scaled(blob, width, height)?;
    tracing::debug!(name = blob.name(), width, height, "resized");
    backend.encode_surface(&surface, codec, Quality::RESIZE.fraction(), blob.name())
}

/// [`resize`] followed by a decode of the result: the surface the resized
/// file would show when opened.
pub fn render_resized(
    backend: &impl RasterBackend,
    blob: &ImageBlob,
    width: u32,
    height: u32,
) -> Result<Surface> {
    let resized = resize(backend, blob, width, height)?;
    backend.decode_to_surface(&resized)
}
