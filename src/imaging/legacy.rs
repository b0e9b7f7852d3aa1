//! HEIC/HEIF → JPEG/PNG conversion.
//!
//! The raster backend cannot read HEIF containers, so HEIC input has to go
//! through a [`LegacyConverter`] before any resize or encode step. Detection
//! is by declared mime type OR filename extension, case-insensitive; either
//! signal is enough.
//!
//! With the `heic` feature the default converter is [`LibheifConverter`]
//! (libheif via `libheif-rs`). Without it, [`default_converter`] returns a
//! converter that fails every call with [`LegacyError::Unavailable`].

use crate::types::{Codec, HEIC_MIME, HEIF_MIME, ImageBlob, extension_of};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LegacyError {
    #[error("HEIC decode failed: {0}")]
    Decode(String),
    #[error("HEIC support is not compiled in (enable the `heic` feature)")]
    Unavailable,
    #[error("Failed to re-encode converted HEIC image: {0}")]
    Encode(String),
    #[error("Operation cancelled")]
    Cancelled,
}

/// Intermediate format a legacy container is converted into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegacyTarget {
    Jpeg,
    Png,
}

impl LegacyTarget {
    pub fn codec(self) -> Codec {
        match self {
            LegacyTarget::Jpeg => Codec::Jpeg,
            LegacyTarget::Png => Codec::Png,
        }
    }
}

/// True when `blob` is declared as HEIC/HEIF by mime type or by extension.
pub fn is_legacy(blob: &ImageBlob) -> bool {
    let mime = blob.mime().to_ascii_lowercase();
    let by_mime = mime == HEIC_MIME || mime == HEIF_MIME;
    let by_ext = extension_of(blob.name()).is_some_and(|e| e == "heic" || e == "heif");
    by_mime || by_ext
}

pub trait LegacyConverter: Sync {
    /// Convert a HEIC/HEIF blob into `target` at encoder `quality` in `[0, 1]`.
    /// The result is named like the input with the target's extension.
    fn convert_legacy(
        &self,
        blob: &ImageBlob,
        target: LegacyTarget,
        quality: f32,
    ) -> Result<ImageBlob, LegacyError>;
}

impl<T: LegacyConverter + ?Sized> LegacyConverter for &T {
    fn convert_legacy(
        &self,
        blob: &ImageBlob,
        target: LegacyTarget,
        quality: f32,
    ) -> Result<ImageBlob, LegacyError> {
        (**self).convert_legacy(blob, target, quality)
    }
}

/// Converter used when HEIC support is not compiled in.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoLegacySupport;

impl LegacyConverter for NoLegacySupport {
    fn convert_legacy(
        &self,
        blob: &ImageBlob,
        _target: LegacyTarget,
        _quality: f32,
    ) -> Result<ImageBlob, LegacyError> {
        tracing::warn!(name = blob.name(), "HEIC input but no HEIC decoder available");
        Err(LegacyError::Unavailable)
    }
}

#[cfg(feature = "heic")]
pub use libheif::LibheifConverter;

#[cfg(feature = "heic")]
pub fn default_converter() -> LibheifConverter {
    LibheifConverter
}

#[cfg(not(feature = "heic"))]
pub fn default_converter() -> NoLegacySupport {
    NoLegacySupport
}

#[cfg(feature = "heic")]
mod libheif {
    use super::*;
    use crate::imaging::surface::Surface;
    use image::RgbaImage;
    use libheif_rs::{ColorSpace, HeifContext, LibHeif, RgbChroma};

    /// libheif-backed converter.
    #[derive(Debug, Default, Clone, Copy)]
    pub struct LibheifConverter;

    impl LegacyConverter for LibheifConverter {
        fn convert_legacy(
            &self,
            blob: &ImageBlob,
            target: LegacyTarget,
            quality: f32,
        ) -> Result<ImageBlob, LegacyError> {
            let surface = decode_heif(blob.bytes())?;
            tracing::debug!(
                name = blob.name(),
                width = surface.width(),
                height = surface.height(),
                "decoded HEIC"
            );
            encode_intermediate(&surface, blob, target, quality)
        }
    }

    fn decode_heif(bytes: &[u8]) -> Result<Surface, LegacyError> {
        let lib = LibHeif::new();
        let ctx = HeifContext::read_from_bytes(bytes)
            .map_err(|e| LegacyError::Decode(e.to_string()))?;
        let handle = ctx
            .primary_image_handle()
            .map_err(|e| LegacyError::Decode(e.to_string()))?;
        let image = lib
            .decode(&handle, ColorSpace::Rgb(RgbChroma::Rgba), None)
            .map_err(|e| LegacyError::Decode(e.to_string()))?;
        let planes = image.planes();
        let plane = planes
            .interleaved
            .ok_or_else(|| LegacyError::Decode("no interleaved RGBA plane".into()))?;

        // Rows may be padded; copy width*4 bytes out of each stride.
        let (w, h) = (plane.width, plane.height);
        let row_len = w as usize * 4;
        let mut rgba = Vec::with_capacity(row_len * h as usize);
        for row in plane.data.chunks(plane.stride).take(h as usize) {
            rgba.extend_from_slice(&row[..row_len]);
        }
        RgbaImage::from_raw(w, h, rgba)
            .map(Surface::from_rgba)
            .ok_or_else(|| LegacyError::Decode("truncated HEIC pixel data".into()))
    }

    /// Encode decoded HEIF pixels into the intermediate blob.
    fn encode_intermediate(
        surface: &Surface,
        blob: &ImageBlob,
        target: LegacyTarget,
        quality: f32,
    ) -> Result<ImageBlob, LegacyError> {
        let codec = target.codec();
        let bytes = crate::imaging::rust_backend::encode_pixels(surface, codec, quality)
            .map_err(|e| LegacyError::Encode(e.to_string()))?;
        Ok(ImageBlob::new(
            crate::types::with_extension(blob.name(), codec.extension()),
            codec.mime(),
            bytes,
        ))
    }

}
