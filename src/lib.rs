//! # assetpress
//!
//! Image optimization and web asset generation from a single source image:
//! re-encode photos to WebP/AVIF/JPEG/PNG, render favicons, and build a zipped
//! PWA icon/splash-screen bundle with its `manifest.json`.
//!
//! Everything works on in-memory [`ImageBlob`](types::ImageBlob)s. Reading
//! files and writing results is the caller's business (see the CLI in
//! `main.rs`).
//!
//! # Architecture
//!
//! ```text
//! optimize / favicon / pwa / batch      pipelines (stateless, config in)
//!          │
//! imaging::operations                   convert_to_*, resize
//!          │
//! imaging::RasterBackend  (+ LegacyConverter for HEIC)
//! ```
//!
//! Pipelines are generic over the [`RasterBackend`](imaging::RasterBackend)
//! and [`LegacyConverter`](imaging::LegacyConverter) traits. Each has a
//! convenience function bound to the production backend (`optimize_image`)
//! and a `*_with` variant taking explicit collaborators, which is what the
//! unit tests drive with a recording mock.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`optimize`] | HEIC → resize → convert pipeline for one image |
//! | [`batch`] | Runs `optimize` over many images, isolating failures |
//! | [`favicon`] | Favicon rendering and ICO/PNG packaging |
//! | [`pwa`] | PWA icons, splash screens, manifest and zip bundle |
//! | [`archive`] | Deterministic in-memory zip writer |
//! | [`preview`] | Preview descriptors, data URLs, scoped temp files |
//! | [`tasks`] | Async wrappers on tokio's blocking pool |
//! | [`cancel`] | Cancellation token and cancellable backend wrapper |
//! | [`config`] | `assetpress.toml` loading, merging and validation |
//! | [`error`] | Pipeline error and its coarse [`ErrorKind`](error::ErrorKind) |
//! | [`types`] | `ImageBlob`, `Codec`, `OutputFormat` |
//! | [`imaging`] | Raster backend, HEIC converter, conversions, resize |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Stretch, Never Fit
//!
//! Every resize (optimize, favicons, PWA icons, splash squares) stretches the
//! source to the exact target box. Non-square sources get distorted icons;
//! that is the documented behavior, not an accident.
//!
//! ## Closed Format Enumeration
//!
//! Output formats are an enum, not strings. Adding a format means adding a
//! variant, and the exhaustive match in
//! [`OutputFormat::target_codec`](types::OutputFormat::target_codec) refuses to
//! compile until it has an encoder.
//!
//! ## Favicon ICO Payload
//!
//! By default `favicon.ico` is a PNG with an ICO name and mime type, which
//! browsers accept. `ico_encoding = "container"` writes a real
//! multi-resolution ICO directory instead.
//!
//! ## HEIC Is Optional
//!
//! HEIC decoding needs the libheif system library, so it sits behind the
//! `heic` cargo feature. Without it, HEIC input fails with a
//! `LegacyConversion` error rather than being silently skipped.

pub mod archive;
pub mod batch;
pub mod cancel;
pub mod config;
pub mod error;
pub mod favicon;
pub mod imaging;
pub mod optimize;
pub mod output;
pub mod preview;
pub mod pwa;
pub mod tasks;
pub mod types;

pub use batch::{BatchReport, process_batch};
pub use error::{ErrorKind, PipelineError};
pub use favicon::{FaviconConfig, generate_favicon};
pub use optimize::{OptimizationConfig, optimize_image};
pub use pwa::{PwaBundle, PwaConfig, generate_pwa_icons};
pub use types::{Codec, ImageBlob, OutputFormat};
