//! Destinations for package files.
//!
//! A [`Sink`] receives every file of the package exactly once, in the order
//! the converter produces them. [`ZipSink`] writes an EPUB container;
//! [`MemorySink`] keeps everything in memory.

use std::collections::{BTreeMap, HashSet};
use std::io::{Seek, Write};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::{EpaperError, Result};

pub const MIMETYPE_PATH: &str = "mimetype";
pub const EPUB_MIMETYPE: &[u8] = b"application/epub+zip";

/// Write-once destination for archive entries.
pub trait Sink {
    /// Stores `bytes` under `path`. Writing the same path twice is an error.
    fn put(&mut self, path: &str, bytes: &[u8]) -> Result<()>;
}

impl<S: Sink + ?Sized> Sink for &mut S {
    fn put(&mut self, path: &str, bytes: &[u8]) -> Result<()> {
        (**self).put(path, bytes)
    }
}

/// EPUB container on top of a zip writer.
///
/// The `mimetype` entry is written uncompressed when the sink is created so
/// it is always the first entry of the archive.
pub struct ZipSink<W: Write + Seek> {
    zip: ZipWriter<W>,
    deflated: SimpleFileOptions,
    written: HashSet<String>,
}

impl<W: Write + Seek> ZipSink<W> {
    pub fn new(writer: W) -> Result<Self> {
        let mut zip = ZipWriter::new(writer);
        let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
        let deflated = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .compression_level(Some(6));

        zip.start_file(MIMETYPE_PATH, stored)?;
        zip.write_all(EPUB_MIMETYPE)?;

        let mut written = HashSet::new();
        written.insert(MIMETYPE_PATH.to_string());
        Ok(Self { zip, deflated, written })
    }

    /// Number of entries written, `mimetype` included.
    pub fn len(&self) -> usize {
        self.written.len()
    }

    pub fn is_empty(&self) -> bool {
        self.written.is_empty()
    }

    /// Writes the central directory and returns the underlying writer.
    pub fn finish(self) -> Result<W> {
        Ok(self.zip.finish()?)
    }
}

impl<W: Write + Seek> Sink for ZipSink<W> {
    fn put(&mut self, path: &str, bytes: &[u8]) -> Result<()> {
        if !self.written.insert(path.to_string()) {
            return Err(EpaperError::DuplicateEntry(path.to_string()));
        }
        self.zip.start_file(path, self.deflated)?;
        self.zip.write_all(bytes)?;
        Ok(())
    }
}

/// In-memory sink, keyed by path.
#[derive(Debug, Default)]
pub struct MemorySink {
    entries: BTreeMap<String, Vec<u8>>,
    order: Vec<String>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &str) -> Option<&[u8]> {
        self.entries.get(path).map(Vec::as_slice)
    }

    /// Entry as UTF-8 text, if present and valid.
    pub fn text(&self, path: &str) -> Option<&str> {
        self.get(path).and_then(|bytes| std::str::from_utf8(bytes).ok())
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    /// Paths in the order they were written.
    pub fn paths(&self) -> &[String] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Sink for MemorySink {
    fn put(&mut self, path: &str, bytes: &[u8]) -> Result<()> {
        if self.entries.contains_key(path) {
            return Err(EpaperError::DuplicateEntry(path.to_string()));
        }
        self.entries.insert(path.to_string(), bytes.to_vec());
        self.order.push(path.to_string());
        Ok(())
    }
}
