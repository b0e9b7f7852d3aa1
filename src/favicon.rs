//! Favicon generation.
//!
//! Every requested size is rendered (stretched to `size × size`) in
//! parallel, then the candidates are packaged:
//!
//! - **PNG**: only the largest requested size survives, as
//!   `favicon-{size}x{size}.png`. Smaller sizes are rendered and dropped.
//! - **ICO, `png-payload`** (default): the widest candidate is encoded as a
//!   plain PNG and labelled `image/x-icon` / `favicon.ico`. Browsers accept
//!   this, but it is not a real ICO container.
//! - **ICO, `container`**: every distinct size becomes a PNG-compressed frame
//!   in a genuine ICO directory.

use crate::error::PipelineError;
use crate::imaging::{
    BackendError, RasterBackend, RustBackend, Surface, largest, render_resized,
};
use crate::types::{Codec, ICO_MIME, ImageBlob};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Largest frame an ICO directory entry can describe.
pub const ICO_MAX_SIZE: u32 = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FaviconFormat {
    Ico,
    Png,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IcoEncoding {
    /// Single PNG payload under an ICO name and mime type.
    PngPayload,
    /// Multi-resolution ICO directory with PNG frames.
    Container,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FaviconConfig {
    pub sizes: Vec<u32>,
    pub output_format: FaviconFormat,
    pub ico_encoding: IcoEncoding,
}

impl Default for FaviconConfig {
    fn default() -> Self {
        Self {
            sizes: vec![16, 32, 48],
            output_format: FaviconFormat::Ico,
            ico_encoding: IcoEncoding::PngPayload,
        }
    }
}

impl FaviconConfig {
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.sizes.is_empty() {
            return Err(PipelineError::InvalidConfig(
                "favicon.sizes must not be empty".into(),
            ));
        }
        if self.sizes.contains(&0) {
            return Err(PipelineError::InvalidConfig(
                "favicon.sizes must be positive".into(),
            ));
        }
        if self.output_format == FaviconFormat::Ico
            && self.ico_encoding == IcoEncoding::Container
            && self.sizes.iter().any(|&s| s > ICO_MAX_SIZE)
        {
            return Err(PipelineError::InvalidConfig(format!(
                "ICO container frames are limited to {ICO_MAX_SIZE}px"
            )));
        }
        Ok(())
    }
}

/// File name of a PNG favicon of `size` pixels.
pub fn png_favicon_name(size: u32) -> String {
    format!("favicon-{size}x{size}.png")
}

pub fn generate_favicon(
    blob: &ImageBlob,
    config: &FaviconConfig,
) -> Result<ImageBlob, PipelineError> {
    generate_favicon_with(&RustBackend::new(), blob, config)
}

/// Generate a favicon using a specific backend (allows testing with mock).
pub fn generate_favicon_with(
    backend: &impl RasterBackend,
    blob: &ImageBlob,
    config: &FaviconConfig,
) -> Result<ImageBlob, PipelineError> {
    config.validate()?;

    let candidates = config
        .sizes
        .par_iter()
        .map(|&size| render_resized(backend, blob, size, size).map(|surface| (size, surface)))
        .collect::<Result<Vec<_>, BackendError>>()?;
    tracing::debug!(
        name = blob.name(),
        count = candidates.len(),
        "rendered favicon candidates"
    );

    match (config.output_format, config.ico_encoding) {
        (FaviconFormat::Png, _) => {
            let size = largest(&config.sizes).unwrap_or_default();
            let surface = candidates
                .iter()
                .find(|(s, _)| *s == size)
                .map(|(_, surface)| surface)
                .ok_or_else(|| PipelineError::InvalidConfig("favicon.sizes is empty".into()))?;
            Ok(backend.encode_surface(surface, Codec::Png, 1.0, &png_favicon_name(size))?)
        }
        (FaviconFormat::Ico, IcoEncoding::PngPayload) => {
            let surface = candidates
                .iter()
                .map(|(_, surface)| surface)
                .max_by_key(|surface| surface.width())
                .ok_or_else(|| PipelineError::InvalidConfig("favicon.sizes is empty".into()))?;
            let png = backend.encode_surface(surface, Codec::Png, 1.0, "favicon.ico")?;
            Ok(png.relabeled(ICO_MIME))
        }
        (FaviconFormat::Ico, IcoEncoding::Container) => {
            let bytes = encode_ico_container(&candidates)?;
            Ok(ImageBlob::new("favicon.ico", ICO_MIME, bytes))
        }
    }
}

/// Write one PNG frame per distinct size, smallest first.
fn encode_ico_container(candidates: &[(u32, Surface)]) -> Result<Vec<u8>, PipelineError> {
    let ico_err = |e: std::io::Error| BackendError::encode(Codec::Png, format!("ICO: {e}"));

    let mut frames: Vec<&(u32, Surface)> = candidates.iter().collect();
    frames.sort_by_key(|(size, _)| *size);
    frames.dedup_by_key(|(size, _)| *size);

    let mut dir = ico::IconDir::new(ico::ResourceType::Icon);
    for (_, surface) in frames {
        let (w, h) = surface.dimensions();
        let image = ico::IconImage::from_rgba_data(w, h, surface.pixels().as_raw().clone());
        let entry = ico::IconDirEntry::encode_as_png(&image).map_err(ico_err)?;
        dir.add_entry(entry);
    }

    let mut out = Vec::new();
    dir.write(&mut out).map_err(ico_err)?;
    Ok(out)
}
