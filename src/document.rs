//! A loaded document: the package plus everything derived from it.

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::io::{ByteSource, FileSource, MemorySource};
use crate::package::{Manifest, Metadata, Package};
use crate::render;
use crate::resource::{self, Resource};
use crate::spine::{AddressableUnit, ReadingOrder};
use crate::toc::{NavNode, TocEntry, build_toc};

/// An opened e-book.
///
/// Immutable once loaded. All methods take `&self`, so one document can
/// serve concurrent readers; reloading means building a new `Document`.
pub struct Document {
    package: Package,
    order: ReadingOrder,
    toc: Vec<TocEntry>,
}

impl Document {
    /// Open a package from disk.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let source = FileSource::new(file)?;
        Self::from_source(Arc::new(source))
    }

    /// Load a package held in memory.
    pub fn from_bytes(bytes: impl Into<Arc<[u8]>>) -> Result<Self> {
        Self::from_source(Arc::new(MemorySource::new(bytes)))
    }

    /// Load a package from any byte source.
    ///
    /// Fails with [`Error::MalformedPackage`] when the package cannot be
    /// parsed and [`Error::EmptySpine`] when it has nothing to read.
    pub fn from_source(source: Arc<dyn ByteSource>) -> Result<Self> {
        let package = Package::parse(source)?;

        let order = ReadingOrder::resolve(&package.manifest, &package.spine);
        if order.is_empty() {
            return Err(Error::EmptySpine);
        }
        let toc = build_toc(&package.navigation, &order);

        tracing::debug!(
            title = %package.metadata.title,
            units = order.len(),
            toc = toc.len(),
            "loaded document"
        );
        Ok(Self {
            package,
            order,
            toc,
        })
    }

    pub fn metadata(&self) -> &Metadata {
        &self.package.metadata
    }

    pub fn manifest(&self) -> &Manifest {
        &self.package.manifest
    }

    /// Addressable units in reading order.
    pub fn units(&self) -> &[AddressableUnit] {
        self.order.units()
    }

    /// Number of addressable units.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Always `false` for a loaded document; kept for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn unit(&self, position: usize) -> Result<&AddressableUnit> {
        self.order.get(position).ok_or(Error::UnitOutOfRange {
            position,
            len: self.order.len(),
        })
    }

    pub fn reading_order(&self) -> &ReadingOrder {
        &self.order
    }

    /// Flattened, deduplicated table of contents.
    pub fn toc(&self) -> &[TocEntry] {
        &self.toc
    }

    /// Raw navigation tree as declared by the package.
    pub fn navigation(&self) -> &[NavNode] {
        &self.package.navigation
    }

    /// Render the unit at `position`, mapping image references through `map`.
    pub fn render_unit(&self, position: usize, map: &dyn Fn(&str) -> String) -> Result<String> {
        let unit = self.unit(position)?;
        render::render_unit(&self.package.archive, unit, map)
    }

    /// Serve the manifest resource stored at `path`.
    pub fn resolve_resource(&self, path: &str) -> Result<Resource> {
        resource::resolve_resource(&self.package.archive, &self.package.manifest, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Document>();
    }

    #[test]
    fn test_garbage_is_malformed() {
        assert!(matches!(
            Document::from_bytes(b"not a package".to_vec()),
            Err(Error::MalformedPackage(_))
        ));
    }

    #[test]
    fn test_missing_file_is_io() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            Document::open(dir.path().join("missing.epub")),
            Err(Error::Io(_))
        ));
    }
}
