//! Image processing on the `image` crate ecosystem.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode** | `image::load_from_memory`, AVIF via `avif-parse` + `rav1d` |
//! | **Stretch** | `imageops::resize` with Lanczos3 |
//! | **Composite** | `imageops::overlay` onto a [`Surface`] |
//! | **Encode** | `image` encoders, `webp` for WebP, rav1e for AVIF |
//! | **HEIC → JPEG/PNG** | `libheif-rs` behind the `heic` feature |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for resize gating and splash geometry
//! - **Parameters**: [`Quality`] and [`parse_color`] for CSS colours
//! - **Backend**: [`RasterBackend`] trait + [`RustBackend`]
//! - **Legacy**: [`LegacyConverter`] trait for HEIC/HEIF input
//! - **Operations**: conversions and resize built on the backend

pub(crate) mod avif;
pub mod backend;
mod calculations;
mod color;
pub mod legacy;
pub mod operations;
mod params;
pub mod rust_backend;
mod surface;

pub use backend::{BackendError, RasterBackend};
pub use calculations::{SPLASH_ICON_RATIO, SplashLayout, largest, resize_target, splash_layout};
pub use color::{ColorError, WHITE, parse_color};
pub use legacy::{
    LegacyConverter, LegacyError, LegacyTarget, NoLegacySupport, default_converter, is_legacy,
};
pub use operations::{
    convert_to, convert_to_avif, convert_to_jpeg, convert_to_png, convert_to_webp, render_resized,
    resize,
};
pub use params::Quality;
pub use rust_backend::RustBackend;
pub use surface::{SCALE_FILTER, Surface};

#[cfg(feature = "heic")]
pub use legacy::LibheifConverter;
