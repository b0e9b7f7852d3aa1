//! Async entry points.
//!
//! The pipelines are CPU-bound and synchronous. These wrappers move the work
//! onto tokio's blocking pool so an async caller's runtime threads never
//! stall on decode or encode. Each accepts an optional [`CancelToken`],
//! checked at every decode, encode and HEIC conversion.

use crate::batch::{BatchReport, process_batch_with};
use crate::cancel::{CancelToken, Cancellable};
use crate::error::PipelineError;
use crate::favicon::{FaviconConfig, generate_favicon_with};
use crate::imaging::{RustBackend, default_converter};
use crate::optimize::{OptimizationConfig, optimize_image_with};
use crate::pwa::{PwaBundle, PwaConfig, generate_pwa_icons_with};
use crate::types::ImageBlob;

/// Run `work` on the blocking pool. A panicking or aborted task becomes
/// [`PipelineError::Task`].
async fn run_blocking<T, F>(cancel: Option<CancelToken>, work: F) -> Result<T, PipelineError>
where
    T: Send + 'static,
    F: FnOnce(CancelToken) -> Result<T, PipelineError> + Send + 'static,
{
    let token = cancel.unwrap_or_default();
    if token.is_cancelled() {
        return Err(PipelineError::Cancelled);
    }
    tokio::task::spawn_blocking(move || work(token))
        .await
        .map_err(|e| PipelineError::Task(e.to_string()))?
}

pub async fn optimize_image_async(
    blob: ImageBlob,
    config: OptimizationConfig,
    cancel: Option<CancelToken>,
) -> Result<ImageBlob, PipelineError> {
    run_blocking(cancel, move |token| {
        let backend = Cancellable::new(RustBackend::new(), token.clone());
        let legacy = Cancellable::new(default_converter(), token);
        optimize_image_with(&backend, &legacy, &blob, &config)
    })
    .await
}

pub async fn generate_favicon_async(
    blob: ImageBlob,
    config: FaviconConfig,
    cancel: Option<CancelToken>,
) -> Result<ImageBlob, PipelineError> {
    run_blocking(cancel, move |token| {
        let backend = Cancellable::new(RustBackend::new(), token);
        generate_favicon_with(&backend, &blob, &config)
    })
    .await
}

pub async fn generate_pwa_icons_async(
    blob: ImageBlob,
    config: PwaConfig,
    cancel: Option<CancelToken>,
) -> Result<PwaBundle, PipelineError> {
    run_blocking(cancel, move |token| {
        let backend = Cancellable::new(RustBackend::new(), token.clone());
        let bundle = generate_pwa_icons_with(&backend, &blob, &config)?;
        // Honour a cancel that landed while the archive was written.
        if token.is_cancelled() {
            return Err(PipelineError::Cancelled);
        }
        Ok(bundle)
    })
    .await
}

/// Cancelling mid-batch turns the remaining files into `Cancelled` failures;
/// the report is still returned.
pub async fn process_batch_async(
    blobs: Vec<ImageBlob>,
    config: OptimizationConfig,
    cancel: Option<CancelToken>,
) -> Result<BatchReport, PipelineError> {
    run_blocking(cancel, move |token| {
        let backend = Cancellable::new(RustBackend::new(), token.clone());
        let legacy = Cancellable::new(default_converter(), token);
        Ok(process_batch_with(&backend, &legacy, &blobs, &config))
    })
    .await
}
