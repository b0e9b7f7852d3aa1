//! In-memory drawing surface.
//!
//! A [`Surface`] lives for one decode → draw → encode step and is never
//! shared between operations. Pixels are always RGBA8 so compositing
//! (background fill, centering) works the same for every source format.

use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgba, RgbaImage};

/// Resampling filter for every stretch/scale in the crate.
pub const SCALE_FILTER: FilterType = FilterType::Lanczos3;

#[derive(Debug, Clone, PartialEq)]
pub struct Surface {
    pixels: RgbaImage,
}

impl Surface {
    /// Fully transparent surface.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixels: RgbaImage::new(width, height),
        }
    }

    /// Surface filled edge to edge with `color`.
    pub fn filled(width: u32, height: u32, color: Rgba<u8>) -> Self {
        Self {
            pixels: RgbaImage::from_pixel(width, height, color),
        }
    }

    pub fn from_image(image: DynamicImage) -> Self {
        Self {
            pixels: image.into_rgba8(),
        }
    }

    pub fn from_rgba(pixels: RgbaImage) -> Self {
        Self { pixels }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    /// Zero-area surfaces cannot be encoded.
    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn into_pixels(self) -> RgbaImage {
        self.pixels
    }

    /// Stretch to exactly `width × height`. Aspect ratio is not preserved.
    pub fn stretched(&self, width: u32, height: u32) -> Surface {
        if self.dimensions() == (width, height) {
            return self.clone();
        }
        Surface {
            pixels: imageops::resize(&self.pixels, width, height, SCALE_FILTER),
        }
    }

    /// Alpha-composite `src` onto this surface with its top-left corner at
    /// `(x, y)`. Parts of `src` outside the surface are clipped.
    pub fn draw(&mut self, src: &Surface, x: i64, y: i64) {
        imageops::overlay(&mut self.pixels, &src.pixels, x, y);
    }
}
