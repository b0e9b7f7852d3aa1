//! Pure Rust raster backend on the `image` crate ecosystem.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, WebP, GIF, BMP, TIFF) | `image::load_from_memory` |
//! | Decode (AVIF) | `avif-parse` + `rav1d`, see [`avif`](super::avif) |
//! | Stretch | `image::imageops::resize` with `Lanczos3` |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` (quality) |
//! | Encode → WebP | `webp` crate (libwebp, lossy with quality) |
//! | Encode → AVIF | `image::codecs::avif::AvifEncoder` (rav1e, speed 6) |
//! | Encode → PNG, GIF, BMP, TIFF | `image::DynamicImage::write_to` |

use super::avif;
use super::backend::{BackendError, RasterBackend};
use super::surface::Surface;
use crate::types::{Codec, ImageBlob};
use image::codecs::avif::AvifEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ExtendedColorType, ImageEncoder, ImageFormat};
use std::io::Cursor;

/// rav1e speed preset (0 slowest … 10 fastest).
const AVIF_SPEED: u8 = 6;

/// Production backend. Stateless, so one instance can be shared across
/// rayon workers.
#[derive(Debug, Default, Clone, Copy)]
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

fn decode(blob: &ImageBlob) -> Result<Surface, BackendError> {
    let bytes = blob.bytes();
    if avif::is_avif(bytes) {
        let rgb = avif::decode_avif(bytes, blob.name())?;
        return Ok(Surface::from_image(DynamicImage::ImageRgb8(rgb)));
    }
    image::load_from_memory(bytes)
        .map(Surface::from_image)
        .map_err(|e| BackendError::decode(blob.name(), e))
}

/// Encode surface pixels as `codec`. `quality` is a fraction in `[0, 1]`.
pub fn encode_pixels(
    surface: &Surface,
    codec: Codec,
    quality: f32,
) -> Result<Vec<u8>, BackendError> {
    if surface.is_empty() {
        return Err(BackendError::encode(
            codec,
            format!("zero-area surface {}x{}", surface.width(), surface.height()),
        ));
    }
    let (w, h) = surface.dimensions();
    let percent = (quality.clamp(0.0, 1.0) * 100.0).round() as u8;
    let mut out = Vec::new();

    match codec {
        Codec::Jpeg => {
            // No alpha in JPEG; callers composite onto a background first.
            let rgb = DynamicImage::ImageRgba8(surface.pixels().clone()).into_rgb8();
            JpegEncoder::new_with_quality(&mut out, percent.max(1))
                .write_image(rgb.as_raw(), w, h, ExtendedColorType::Rgb8)
                .map_err(|e| BackendError::encode(codec, e))?;
        }
        Codec::WebP => {
            let encoder = webp::Encoder::from_rgba(surface.pixels().as_raw(), w, h);
            // libwebp caps each side at 16383px; encode_simple reports that as an error.
            let encoded = encoder
                .encode_simple(percent >= 100, percent as f32)
                .map_err(|e| BackendError::encode(codec, format!("{e:?}")))?;
            out = encoded.to_vec();
        }
        Codec::Avif => {
            AvifEncoder::new_with_speed_quality(&mut out, AVIF_SPEED, percent.max(1))
                .write_image(surface.pixels().as_raw(), w, h, ExtendedColorType::Rgba8)
                .map_err(|e| BackendError::encode(codec, e))?;
        }
        Codec::Png | Codec::Gif | Codec::Bmp | Codec::Tiff => {
            let format = match codec {
                Codec::Png => ImageFormat::Png,
                Codec::Gif => ImageFormat::Gif,
                Codec::Bmp => ImageFormat::Bmp,
                _ => ImageFormat::Tiff,
            };
            DynamicImage::ImageRgba8(surface.pixels().clone())
                .write_to(&mut Cursor::new(&mut out), format)
                .map_err(|e| BackendError::encode(codec, e))?;
        }
    }

    if out.is_empty() {
        return Err(BackendError::encode(codec, "encoder produced no data"));
    }
    Ok(out)
}

impl RasterBackend for RustBackend {
    fn decode_to_surface(&self, blob: &ImageBlob) -> Result<Surface, BackendError> {
        decode(blob)
    }

    fn decode_and_draw_scaled(
        &self,
        blob: &ImageBlob,
        width: u32,
        height: u32,
    ) -> Result<Surface, BackendError> {
        let source = decode(blob)?;
        if width == 0 || height == 0 {
            // Nothing to draw; the encode step rejects the empty surface.
            return Ok(Surface::new(width, height));
        }
        Ok(source.stretched(width, height))
    }

    fn encode_surface(
        &self,
        surface: &Surface,
        codec: Codec,
        quality: f32,
        name: &str,
    ) -> Result<ImageBlob, BackendError> {
        let bytes = encode_pixels(surface, codec, quality)?;
        Ok(ImageBlob::new(name, codec.mime(), bytes))
    }
}
