//! Batch optimization with per-file failure isolation.
//!
//! Every input runs the full [`optimize`](crate::optimize) pipeline
//! independently. A failing file is logged and recorded in
//! [`BatchReport::failures`]; the rest of the batch carries on. The batch
//! itself never fails.
//!
//! Output names are unique within a report. Inputs that map to the same
//! output name (`a.png` and `a.jpg` both becoming `a.webp`) are numbered in
//! input order: `a.webp`, `a-1.webp`, `a-2.webp`.

use crate::error::{ErrorKind, PipelineError};
use crate::imaging::{LegacyConverter, RasterBackend, RustBackend, default_converter};
use crate::optimize::{OptimizationConfig, optimize_image_with};
use crate::types::ImageBlob;
use rayon::prelude::*;
use std::collections::HashSet;

/// Why one file of a batch produced no output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchFailure {
    pub name: String,
    pub kind: ErrorKind,
    pub message: String,
}

#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    /// Successful outputs, in input order.
    pub outputs: Vec<ImageBlob>,
    /// Failed inputs, in input order.
    pub failures: Vec<BatchFailure>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.outputs.len() + self.failures.len()
    }

    /// True when there was input and none of it succeeded.
    pub fn all_failed(&self) -> bool {
        self.outputs.is_empty() && !self.failures.is_empty()
    }
}

pub fn process_batch(blobs: &[ImageBlob], config: &OptimizationConfig) -> BatchReport {
    process_batch_with(&RustBackend::new(), &default_converter(), blobs, config)
}

/// Optimize every blob using specific collaborators (allows testing with mock).
pub fn process_batch_with(
    backend: &impl RasterBackend,
    legacy: &impl LegacyConverter,
    blobs: &[ImageBlob],
    config: &OptimizationConfig,
) -> BatchReport {
    let results: Vec<(&ImageBlob, Result<ImageBlob, PipelineError>)> = blobs
        .par_iter()
        .map(|blob| (blob, optimize_image_with(backend, legacy, blob, config)))
        .collect();

    let mut report = BatchReport::default();
    let mut taken = HashSet::new();
    for (input, result) in results {
        match result {
            Ok(output) => {
                let name = unique_name(output.name(), &mut taken);
                if name == output.name() {
                    report.outputs.push(output);
                } else {
                    tracing::debug!(
                        input = input.name(),
                        output = %name,
                        "renamed colliding output"
                    );
                    report.outputs.push(output.renamed(name));
                }
            }
            Err(e) => {
                tracing::warn!(name = input.name(), kind = %e.kind(), "skipping file: {e}");
                report.failures.push(BatchFailure {
                    name: input.name().to_string(),
                    kind: e.kind(),
                    message: e.to_string(),
                });
            }
        }
    }
    tracing::debug!(
        ok = report.outputs.len(),
        failed = report.failures.len(),
        "batch finished"
    );
    report
}

/// First of `name`, `stem-1.ext`, `stem-2.ext`, ... not yet in `taken`.
fn unique_name(name: &str, taken: &mut HashSet<String>) -> String {
    let (stem, ext) = match name.rfind('.') {
        Some(dot) if dot > 0 => name.split_at(dot),
        _ => (name, ""),
    };
    let mut candidate = name.to_string();
    let mut n = 0;
    while !taken.insert(candidate.clone()) {
        n += 1;
        candidate = format!("{stem}-{n}{ext}");
    }
    candidate
}
