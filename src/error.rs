//! Top-level pipeline error.
//!
//! Every public pipeline entry point returns [`PipelineError`]. Lower layers
//! keep their own narrow error types ([`BackendError`], [`LegacyError`],
//! [`ColorError`]) and are folded in here; cancellation from any layer ends
//! up as [`PipelineError::Cancelled`].

use crate::imaging::{BackendError, ColorError, LegacyError};
use crate::types::UnsupportedFormat;
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Decode(BackendError),
    #[error(transparent)]
    Encode(BackendError),
    #[error("HEIC conversion failed: {0}")]
    LegacyConversion(LegacyError),
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),
    /// A format name outside [`OutputFormat`](crate::types::OutputFormat).
    /// Library callers get it from `?` on `str::parse`; the CLI and config
    /// loader show the same message through clap and serde.
    #[error(transparent)]
    UnsupportedFormat(#[from] UnsupportedFormat),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error(transparent)]
    InvalidColor(#[from] ColorError),
    #[error("Manifest serialization failed: {0}")]
    Manifest(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Background task failed: {0}")]
    Task(String),
    #[error("Operation cancelled")]
    Cancelled,
}

impl From<BackendError> for PipelineError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Decode { .. } => PipelineError::Decode(err),
            BackendError::Encode { .. } | BackendError::UnsupportedMime(_) => {
                PipelineError::Encode(err)
            }
            BackendError::Cancelled => PipelineError::Cancelled,
        }
    }
}

impl From<LegacyError> for PipelineError {
    fn from(err: LegacyError) -> Self {
        match err {
            LegacyError::Cancelled => PipelineError::Cancelled,
            other => PipelineError::LegacyConversion(other),
        }
    }
}

/// Coarse failure category, used in batch summaries and CLI output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Decode,
    Encode,
    LegacyConversion,
    Archive,
    UnsupportedFormat,
    InvalidInput,
    Io,
    Cancelled,
    Internal,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Decode => "decode",
            ErrorKind::Encode => "encode",
            ErrorKind::LegacyConversion => "legacy-conversion",
            ErrorKind::Archive => "archive",
            ErrorKind::UnsupportedFormat => "unsupported-format",
            ErrorKind::InvalidInput => "invalid-input",
            ErrorKind::Io => "io",
            ErrorKind::Cancelled => "cancelled",
            ErrorKind::Internal => "internal",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl PipelineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::Decode(_) => ErrorKind::Decode,
            PipelineError::Encode(_) => ErrorKind::Encode,
            PipelineError::LegacyConversion(_) => ErrorKind::LegacyConversion,
            PipelineError::Archive(_) => ErrorKind::Archive,
            PipelineError::UnsupportedFormat(_) => ErrorKind::UnsupportedFormat,
            PipelineError::InvalidConfig(_) | PipelineError::InvalidColor(_) => {
                ErrorKind::InvalidInput
            }
            PipelineError::Io(_) => ErrorKind::Io,
            PipelineError::Cancelled => ErrorKind::Cancelled,
            PipelineError::Manifest(_) | PipelineError::Task(_) => ErrorKind::Internal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Codec, OutputFormat};

    #[test]
    fn backend_errors_split_by_stage() {
        let decode: PipelineError = BackendError::decode("a.png", "bad header").into();
        assert_eq!(decode.kind(), ErrorKind::Decode);
        assert_eq!(decode.to_string(), "Failed to decode a.png: bad header");

        let encode: PipelineError = BackendError::encode(Codec::Png, "zero-area").into();
        assert_eq!(encode.kind(), ErrorKind::Encode);

        let mime: PipelineError = BackendError::UnsupportedMime("text/plain".into()).into();
        assert_eq!(mime.kind(), ErrorKind::Encode);
    }

    #[test]
    fn cancellation_collapses_from_every_layer() {
        let from_backend: PipelineError = BackendError::Cancelled.into();
        let from_legacy: PipelineError = LegacyError::Cancelled.into();
        assert!(matches!(from_backend, PipelineError::Cancelled));
        assert!(matches!(from_legacy, PipelineError::Cancelled));
    }

    #[test]
    fn legacy_failure_keeps_reason() {
        let err: PipelineError = LegacyError::Decode("not a heif".into()).into();
        assert_eq!(err.kind(), ErrorKind::LegacyConversion);
        assert!(err.to_string().contains("not a heif"));
    }

    #[test]
    fn format_names_parse_with_question_mark() {
        fn format_of(name: &str) -> Result<OutputFormat, PipelineError> {
            Ok(name.parse::<OutputFormat>()?)
        }
        assert_eq!(format_of("avif").unwrap(), OutputFormat::Avif);
        let err = format_of("tga").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedFormat);
        assert_eq!(err.to_string(), "Unsupported format: tga");
    }

    #[test]
    fn config_and_color_are_invalid_input() {
        let err: PipelineError = ColorError("nope".into()).into();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert_eq!(
            PipelineError::InvalidConfig("x".into()).kind(),
            ErrorKind::InvalidInput
        );
    }
}
