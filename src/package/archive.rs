//! ZIP container access over a [`ByteSource`].
//!
//! The central directory is scanned once at open time. Each entry read then
//! goes straight to the byte source at the cached data offset, so any number
//! of threads can read entries concurrently without a shared cursor.

use std::collections::HashMap;
use std::io::{self, Read};
use std::sync::Arc;

use zip::ZipArchive;

use crate::io::{ByteSource, ByteSourceCursor};
use crate::path;

/// Location of an entry's data within the archive.
#[derive(Debug, Clone, Copy)]
struct EntryLoc {
    /// Offset to the compressed data within the ZIP file.
    data_offset: u64,
    compressed_size: u64,
    size: u64,
    /// Compression method (0 = Store, 8 = Deflate).
    compression: u16,
}

/// An opened package archive.
pub struct Archive {
    source: Arc<dyn ByteSource>,
    /// Keyed by normalized entry name.
    index: HashMap<String, EntryLoc>,
    names: Vec<String>,
}

impl Archive {
    /// Scan the central directory of `source`.
    pub fn open(source: Arc<dyn ByteSource>) -> io::Result<Self> {
        let cursor = ByteSourceCursor::new(source.clone());
        let mut archive = ZipArchive::new(cursor).map_err(zip_to_io)?;

        let mut index = HashMap::with_capacity(archive.len());
        let mut names = Vec::with_capacity(archive.len());

        for i in 0..archive.len() {
            let file = archive.by_index_raw(i).map_err(zip_to_io)?;
            if file.is_dir() {
                continue;
            }
            let name = path::normalize(file.name());
            let loc = EntryLoc {
                data_offset: file.data_start(),
                compressed_size: file.compressed_size(),
                size: file.size(),
                compression: compression_to_u16(file.compression()),
            };
            // Duplicate names: the first entry wins.
            if !index.contains_key(&name) {
                index.insert(name.clone(), loc);
                names.push(name);
            }
        }

        tracing::debug!(entries = names.len(), "opened archive");
        Ok(Self {
            source,
            index,
            names,
        })
    }

    /// Whether the archive holds an entry at `path` (normalized before lookup).
    pub fn contains(&self, path: &str) -> bool {
        self.index.contains_key(&path::normalize(path))
    }

    /// Normalized names of all file entries, in central directory order.
    pub fn entries(&self) -> &[String] {
        &self.names
    }

    /// Read and decompress the entry at `path`.
    pub fn read(&self, path: &str) -> io::Result<Vec<u8>> {
        let key = path::normalize(path);
        let loc = self.index.get(&key).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("file not found in archive: {key}"),
            )
        })?;

        let compressed = self
            .source
            .read_at(loc.data_offset, loc.compressed_size as usize)?;

        match loc.compression {
            0 => Ok(compressed),
            8 => {
                let mut decoder = flate2::read::DeflateDecoder::new(&compressed[..]);
                let mut out = Vec::with_capacity(loc.size.min(64 << 20) as usize);
                decoder.read_to_end(&mut out)?;
                Ok(out)
            }
            method => Err(io::Error::new(
                io::ErrorKind::Unsupported,
                format!("unsupported compression method {method} for {key}"),
            )),
        }
    }
}

fn zip_to_io(err: zip::result::ZipError) -> io::Error {
    match err {
        zip::result::ZipError::Io(e) => e,
        other => io::Error::new(io::ErrorKind::InvalidData, other.to_string()),
    }
}

fn compression_to_u16(method: zip::CompressionMethod) -> u16 {
    match method {
        zip::CompressionMethod::Stored => 0,
        zip::CompressionMethod::Deflated => 8,
        _ => u16::MAX,
    }
}
