//! Values shared by every pipeline: the blob that flows between stages and
//! the closed format enumerations that replace string dispatch.
//!
//! An [`ImageBlob`] is immutable. Every transformation returns a new blob;
//! the payload sits behind an `Arc` so handing a blob to several consumers
//! (archive + preview) never copies pixels.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

/// Opaque image payload tagged with a mime type and a display name.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageBlob {
    name: String,
    mime: String,
    bytes: Arc<Vec<u8>>,
}

impl ImageBlob {
    pub fn new(name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime: mime.into(),
            bytes: Arc::new(bytes),
        }
    }

    /// Read a file from disk. The mime type comes from the extension, falling
    /// back to content sniffing, then to `application/octet-stream`.
    pub fn read(path: &Path) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mime = mime_from_name(&name)
            .or_else(|| sniff_mime(&bytes))
            .unwrap_or("application/octet-stream");
        Ok(Self::new(name, mime, bytes))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mime(&self) -> &str {
        &self.mime
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Same payload and mime, different display name.
    pub fn renamed(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mime: self.mime.clone(),
            bytes: Arc::clone(&self.bytes),
        }
    }

    /// Same payload and name, different mime tag.
    pub fn relabeled(&self, mime: impl Into<String>) -> Self {
        Self {
            name: self.name.clone(),
            mime: mime.into(),
            bytes: Arc::clone(&self.bytes),
        }
    }
}

impl fmt::Debug for ImageBlob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageBlob")
            .field("name", &self.name)
            .field("mime", &self.mime)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Encodings the raster backend can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Codec {
    Png,
    Jpeg,
    WebP,
    Avif,
    Gif,
    Bmp,
    Tiff,
}

impl Codec {
    pub const ALL: [Codec; 7] = [
        Codec::Png,
        Codec::Jpeg,
        Codec::WebP,
        Codec::Avif,
        Codec::Gif,
        Codec::Bmp,
        Codec::Tiff,
    ];

    pub fn mime(self) -> &'static str {
        match self {
            Codec::Png => "image/png",
            Codec::Jpeg => "image/jpeg",
            Codec::WebP => "image/webp",
            Codec::Avif => "image/avif",
            Codec::Gif => "image/gif",
            Codec::Bmp => "image/bmp",
            Codec::Tiff => "image/tiff",
        }
    }

    /// Canonical file extension, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            Codec::Png => "png",
            Codec::Jpeg => "jpg",
            Codec::WebP => "webp",
            Codec::Avif => "avif",
            Codec::Gif => "gif",
            Codec::Bmp => "bmp",
            Codec::Tiff => "tiff",
        }
    }

    /// Whether the encoding carries an alpha channel.
    pub fn supports_alpha(self) -> bool {
        !matches!(self, Codec::Jpeg | Codec::Bmp)
    }

    pub fn from_mime(mime: &str) -> Option<Self> {
        let mime = mime.trim().to_ascii_lowercase();
        match mime.as_str() {
            "image/jpg" | "image/pjpeg" => Some(Codec::Jpeg),
            "image/x-png" => Some(Codec::Png),
            "image/x-ms-bmp" => Some(Codec::Bmp),
            other => Self::ALL.into_iter().find(|c| c.mime() == other),
        }
    }
}

pub const ICO_MIME: &str = "image/x-icon";
pub const HEIC_MIME: &str = "image/heic";
pub const HEIF_MIME: &str = "image/heif";
pub const ZIP_MIME: &str = "application/zip";

/// Requested output format of the optimize pipeline.
///
/// `Heic` is the legacy passthrough tag: HEIC input is always converted to
/// JPEG first, and asking for `heic` output skips the final conversion.
///
/// Parsing (CLI flags and config files alike) goes through [`FromStr`], so
/// aliases such as `jpg` work everywhere and unknown names fail with
/// [`UnsupportedFormat`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum OutputFormat {
    WebP,
    Jpeg,
    Png,
    Avif,
    Heic,
    Original,
}

impl OutputFormat {
    /// The encoder for the final conversion stage, or `None` when the stage
    /// is skipped.
    pub fn target_codec(self) -> Option<Codec> {
        match self {
            OutputFormat::WebP => Some(Codec::WebP),
            OutputFormat::Jpeg => Some(Codec::Jpeg),
            OutputFormat::Png => Some(Codec::Png),
            OutputFormat::Avif => Some(Codec::Avif),
            OutputFormat::Heic | OutputFormat::Original => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OutputFormat::WebP => "webp",
            OutputFormat::Jpeg => "jpeg",
            OutputFormat::Png => "png",
            OutputFormat::Avif => "avif",
            OutputFormat::Heic => "heic",
            OutputFormat::Original => "original",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unsupported format: {0}")]
pub struct UnsupportedFormat(pub String);

impl FromStr for OutputFormat {
    type Err = UnsupportedFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "webp" => Ok(OutputFormat::WebP),
            "jpeg" | "jpg" => Ok(OutputFormat::Jpeg),
            "png" => Ok(OutputFormat::Png),
            "avif" => Ok(OutputFormat::Avif),
            "heic" | "heif" => Ok(OutputFormat::Heic),
            "original" => Ok(OutputFormat::Original),
            other => Err(UnsupportedFormat(other.to_string())),
        }
    }
}

impl TryFrom<String> for OutputFormat {
    type Error = UnsupportedFormat;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Replace the extension of `name` with `ext`, appending it when `name` has
/// none.
pub fn with_extension(name: &str, ext: &str) -> String {
    match name.rfind('.') {
        Some(dot) if dot > 0 && !name[dot..].contains('/') => {
            format!("{}.{}", &name[..dot], ext)
        }
        _ => format!("{name}.{ext}"),
    }
}

/// Extension of `name`, lowercased, without the dot.
pub fn extension_of(name: &str) -> Option<String> {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

fn mime_from_name(name: &str) -> Option<&'static str> {
    let ext = extension_of(name)?;
    match ext.as_str() {
        "heic" => Some(HEIC_MIME),
        "heif" => Some(HEIF_MIME),
        "ico" => Some(ICO_MIME),
        "jpeg" | "jpg" => Some(Codec::Jpeg.mime()),
        "tif" | "tiff" => Some(Codec::Tiff.mime()),
        other => Codec::ALL
            .into_iter()
            .find(|c| c.extension() == other)
            .map(Codec::mime),
    }
}

fn sniff_mime(bytes: &[u8]) -> Option<&'static str> {
    if bytes.len() >= 12 && &bytes[4..8] == b"ftyp" {
        return match &bytes[8..12] {
            b"heic" | b"heix" | b"hevc" | b"heim" | b"heis" | b"mif1" => Some(HEIC_MIME),
            b"avif" | b"avis" => Some(Codec::Avif.mime()),
            _ => None,
        };
    }
    let format = image::guess_format(bytes).ok()?;
    let codec = match format {
        image::ImageFormat::Png => Codec::Png,
        image::ImageFormat::Jpeg => Codec::Jpeg,
        image::ImageFormat::WebP => Codec::WebP,
        image::ImageFormat::Gif => Codec::Gif,
        image::ImageFormat::Bmp => Codec::Bmp,
        image::ImageFormat::Tiff => Codec::Tiff,
        image::ImageFormat::Ico => return Some(ICO_MIME),
        _ => return None,
    };
    Some(codec.mime())
}
