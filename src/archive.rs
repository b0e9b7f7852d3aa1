//! In-memory zip packaging.
//!
//! Entries are written in insertion order with a fixed timestamp, so the same
//! inputs always produce the same archive bytes.

use crate::types::{ImageBlob, ZIP_MIME};
use std::io::{Cursor, Write};
use zip::result::ZipResult;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

pub struct Archive {
    writer: ZipWriter<Cursor<Vec<u8>>>,
    options: SimpleFileOptions,
    entries: usize,
}

impl Archive {
    pub fn new() -> Self {
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .last_modified_time(DateTime::default());
        Self {
            writer: ZipWriter::new(Cursor::new(Vec::new())),
            options,
            entries: 0,
        }
    }

    /// Append a file. Names must be unique within the archive.
    pub fn add(&mut self, name: &str, bytes: &[u8]) -> ZipResult<()> {
        self.writer.start_file(name, self.options)?;
        self.writer.write_all(bytes)?;
        self.entries += 1;
        Ok(())
    }

    pub fn add_blob(&mut self, blob: &ImageBlob) -> ZipResult<()> {
        self.add(blob.name(), blob.bytes())
    }

    /// Finish the central directory and wrap the archive as a blob.
    pub fn finish(self, name: &str) -> ZipResult<ImageBlob> {
        let entries = self.entries;
        let bytes = self.writer.finish()?.into_inner();
        tracing::debug!(name, entries, bytes = bytes.len(), "archive written");
        Ok(ImageBlob::new(name, ZIP_MIME, bytes))
    }
}

impl Default for Archive {
    fn default() -> Self {
        Self::new()
    }
}
