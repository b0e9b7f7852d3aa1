//! Encoding parameters.
//!
//! Config records speak in integer percentages (1–100, what users type);
//! the raster backend speaks in fractions (0.0–1.0, what encoders take).
//! [`Quality`] is the single conversion point between the two.

/// Lossy encoding quality as a percentage (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(u32);

impl Quality {
    /// Fixed quality used by the resize operation.
    pub const RESIZE: Quality = Quality(90);

    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }

    /// Encoder-facing fraction in `[0, 1]`.
    pub fn fraction(self) -> f32 {
        self.0 as f32 / 100.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(80)
    }
}
