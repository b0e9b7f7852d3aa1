//! Cooperative cancellation.
//!
//! Decode, encode and legacy conversion are the pipeline's suspension
//! points. [`Cancellable`] wraps a backend (and/or a legacy converter) and
//! checks a [`CancelToken`] before each of them, so a cancelled request stops
//! at the next boundary and returns `Cancelled` without partial output.

use crate::imaging::{
    BackendError, LegacyConverter, LegacyError, LegacyTarget, RasterBackend, Surface,
};
use crate::types::{Codec, ImageBlob};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared cancellation flag. Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Backend/converter wrapper that honours a [`CancelToken`].
#[derive(Debug, Clone)]
pub struct Cancellable<T> {
    inner: T,
    token: CancelToken,
}

impl<T> Cancellable<T> {
    pub fn new(inner: T, token: CancelToken) -> Self {
        Self { inner, token }
    }

    fn check(&self) -> Result<(), BackendError> {
        if self.token.is_cancelled() {
            tracing::debug!("cancelled at suspension point");
            return Err(BackendError::Cancelled);
        }
        Ok(())
    }
}

impl<T: RasterBackend> RasterBackend for Cancellable<T> {
    fn decode_to_surface(&self, blob: &ImageBlob) -> Result<Surface, BackendError> {
        self.check()?;
        self.inner.decode_to_surface(blob)
    }

    fn decode_and_draw_scaled(
        &self,
        blob: &ImageBlob,
        width: u32,
        height: u32,
    ) -> Result<Surface, BackendError> {
        self.check()?;
        self.inner.decode_and_draw_scaled(blob, width, height)
    }

    fn encode_surface(
        &self,
        surface: &Surface,
        codec: Codec,
        quality: f32,
        name: &str,
    ) -> Result<ImageBlob, BackendError> {
        self.check()?;
        self.inner.encode_surface(surface, codec, quality, name)
    }
}

impl<T: LegacyConverter> LegacyConverter for Cancellable<T> {
    fn convert_legacy(
        &self,
        blob: &ImageBlob,
        target: LegacyTarget,
        quality: f32,
    ) -> Result<ImageBlob, LegacyError> {
        if self.token.is_cancelled() {
            return Err(LegacyError::Cancelled);
        }
        self.inner.convert_legacy(blob, target, quality)
    }
}
