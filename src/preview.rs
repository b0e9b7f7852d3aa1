//! Preview descriptors for generated assets.
//!
//! A [`Preview`] names a derived asset and holds the blob itself, so it lives
//! exactly as long as its owner. Two ways to hand one to a viewer:
//!
//! - [`Preview::data_url`] builds a self-contained `data:` URL. Nothing to
//!   release.
//! - [`PreviewDir`] writes previews into a private temporary directory and
//!   exposes `file://` URLs. The directory and every file in it are removed
//!   when the `PreviewDir` is dropped.

use crate::types::ImageBlob;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::fmt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewKind {
    Icon,
    Splash,
}

impl fmt::Display for PreviewKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PreviewKind::Icon => "icon",
            PreviewKind::Splash => "splash",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview {
    pub name: String,
    pub kind: PreviewKind,
    pub blob: ImageBlob,
}

impl Preview {
    pub fn new(kind: PreviewKind, blob: ImageBlob) -> Self {
        Self {
            name: blob.name().to_string(),
            kind,
            blob,
        }
    }

    /// `data:{mime};base64,...` URL of the preview payload.
    pub fn data_url(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.blob.mime(),
            STANDARD.encode(self.blob.bytes())
        )
    }
}

/// A preview written to disk inside a [`PreviewDir`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewFile {
    pub name: String,
    pub kind: PreviewKind,
    pub path: PathBuf,
}

impl PreviewFile {
    pub fn url(&self) -> String {
        format!("file://{}", self.path.display())
    }
}

/// Scoped on-disk copy of a set of previews. Dropping it deletes the files.
pub struct PreviewDir {
    dir: TempDir,
    files: Vec<PreviewFile>,
}

impl PreviewDir {
    pub fn materialize(previews: &[Preview]) -> std::io::Result<Self> {
        let dir = tempfile::Builder::new().prefix("assetpress-").tempdir()?;
        let mut files = Vec::with_capacity(previews.len());
        for preview in previews {
            let path = dir.path().join(&preview.name);
            std::fs::write(&path, preview.blob.bytes())?;
            files.push(PreviewFile {
                name: preview.name.clone(),
                kind: preview.kind,
                path,
            });
        }
        tracing::debug!(dir = %dir.path().display(), count = files.len(), "previews materialized");
        Ok(Self { dir, files })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn files(&self) -> &[PreviewFile] {
        &self.files
    }

    /// Delete the directory now and report failures, instead of on drop.
    pub fn close(self) -> std::io::Result<()> {
        self.dir.close()
    }
}
