//! Raster surface adapter trait and shared error type.
//!
//! The [`RasterBackend`] trait is the only place pixels enter or leave the
//! crate: decode a blob into a [`Surface`], decode-and-stretch in one step,
//! and encode a surface back into a blob. Everything above it (conversions,
//! resize, favicons, PWA bundles) is written against the trait, so tests can
//! swap in a recording mock.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend).

use super::surface::Surface;
use crate::types::{Codec, ImageBlob};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    #[error("Failed to decode {name}: {reason}")]
    Decode { name: String, reason: String },
    #[error("Failed to encode {codec:?}: {reason}")]
    Encode { codec: Codec, reason: String },
    #[error("No encoder for mime type {0:?}")]
    UnsupportedMime(String),
    #[error("Operation cancelled")]
    Cancelled,
}

impl BackendError {
    pub fn decode(name: &str, reason: impl std::fmt::Display) -> Self {
        Self::Decode {
            name: name.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn encode(codec: Codec, reason: impl std::fmt::Display) -> Self {
        Self::Encode {
            codec,
            reason: reason.to_string(),
        }
    }
}

/// Decode/draw/encode primitives every backend must provide.
///
/// `quality` is an encoder fraction in `[0, 1]`; encoders without a quality
/// knob (PNG, GIF, BMP, TIFF) ignore it.
pub trait RasterBackend: Sync {
    /// Decode `blob` into a surface sized to its natural dimensions.
    fn decode_to_surface(&self, blob: &ImageBlob) -> Result<Surface, BackendError>;

    /// Decode `blob` and stretch it to exactly `width × height`.
    fn decode_and_draw_scaled(
        &self,
        blob: &ImageBlob,
        width: u32,
        height: u32,
    ) -> Result<Surface, BackendError>;

    /// Encode `surface` as `codec`. The returned blob is named `name`.
    fn encode_surface(
        &self,
        surface: &Surface,
        codec: Codec,
        quality: f32,
        name: &str,
    ) -> Result<ImageBlob, BackendError>;
}

impl<T: RasterBackend + ?Sized> RasterBackend for &T {
    fn decode_to_surface(&self, blob: &ImageBlob) -> Result<Surface, BackendError> {
        (**self).decode_to_surface(blob)
    }

    fn decode_and_draw_scaled(
        &self,
        blob: &ImageBlob,
        width: u32,
        height: u32,
    ) -> Result<Surface, BackendError> {
        (**self).decode_and_draw_scaled(blob, width, height)
    }

    fn encode_surface(
        &self,
        surface: &Surface,
        codec: Codec,
        quality: f32,
        name: &str,
    ) -> Result<ImageBlob, BackendError> {
        (**self).encode_surface(surface, codec, quality, name)
    }
}
