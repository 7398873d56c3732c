//! Package loading: container, OPF, manifest, spine and navigation.
//!
//! [`Package::parse`] is the only entry point. It turns an archive into
//! plain data; the reading order and table of contents are derived from
//! that data by [`spine`](crate::spine) and [`toc`](crate::toc).

mod archive;
mod container;
mod nav;
mod ncx;
mod opf;
pub(crate) mod xml;

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;

pub use archive::Archive;
pub use container::{CONTAINER_PATH, parse_container_xml};
pub use nav::parse_nav;
pub use ncx::parse_ncx;
pub use opf::{OpfData, parse_opf};

use crate::error::{Error, Result};
use crate::io::ByteSource;
use crate::path;
use crate::toc::NavNode;
use crate::util::decode_text;

const NCX_MEDIA_TYPE: &str = "application/x-dtbncx+xml";

/// Descriptive metadata from the OPF.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Metadata {
    pub title: String,
    pub authors: Vec<String>,
    pub language: String,
    pub identifier: String,
    pub publisher: Option<String>,
}

/// One `<item>` of the manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestItem {
    pub id: String,
    /// Normalized package path.
    pub path: String,
    pub media_type: String,
    /// Space-separated `properties` tokens (`nav`, `cover-image`, ...).
    pub properties: Vec<String>,
}

impl ManifestItem {
    pub fn new(id: impl Into<String>, path: impl Into<String>, media_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            path: path.into(),
            media_type: media_type.into(),
            properties: Vec::new(),
        }
    }

    pub fn has_property(&self, property: &str) -> bool {
        self.properties.iter().any(|p| p == property)
    }
}

/// One `<itemref>` of the spine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpineEntry {
    pub idref: String,
    /// `false` when declared `linear="no"`.
    pub linear: bool,
}

impl SpineEntry {
    pub fn new(idref: impl Into<String>) -> Self {
        Self {
            idref: idref.into(),
            linear: true,
        }
    }
}

/// Manifest items indexed by id and by path.
#[derive(Debug, Clone, Default)]
pub struct Manifest {
    items: Vec<ManifestItem>,
    by_id: HashMap<String, usize>,
    by_path: HashMap<String, usize>,
}

impl Manifest {
    /// Index `items`. When ids repeat, the first declaration wins and later
    /// ones are dropped.
    pub fn from_items(items: Vec<ManifestItem>) -> Self {
        let mut manifest = Manifest::default();
        for item in items {
            if manifest.by_id.contains_key(&item.id) {
                tracing::warn!(id = %item.id, "duplicate manifest id ignored");
                continue;
            }
            let idx = manifest.items.len();
            manifest.by_id.insert(item.id.clone(), idx);
            manifest
                .by_path
                .entry(path::normalize(&item.path))
                .or_insert(idx);
            manifest.items.push(item);
        }
        manifest
    }

    pub fn get(&self, id: &str) -> Option<&ManifestItem> {
        self.by_id.get(id).map(|&i| &self.items[i])
    }

    /// Item stored at `path` (normalized before lookup).
    pub fn by_path(&self, path: &str) -> Option<&ManifestItem> {
        self.by_path
            .get(&path::normalize(path))
            .map(|&i| &self.items[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &ManifestItem> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// A parsed package: everything the reader needs, plus the archive for
/// on-demand reads.
pub struct Package {
    pub metadata: Metadata,
    pub manifest: Manifest,
    pub spine: Vec<SpineEntry>,
    /// Raw navigation tree; empty when the package has none or it is unreadable.
    pub navigation: Vec<NavNode>,
    /// Path of the OPF inside the archive.
    pub opf_path: String,
    pub archive: Archive,
}

impl Package {
    /// Open and parse a package.
    ///
    /// Fails with [`Error::MalformedPackage`] when the archive, container or
    /// OPF cannot be read. Navigation problems never fail the load.
    pub fn parse(source: Arc<dyn ByteSource>) -> Result<Self> {
        let archive =
            Archive::open(source).map_err(|e| Error::malformed(format!("not a zip archive: {e}")))?;

        let container = archive
            .read(CONTAINER_PATH)
            .map_err(|e| Error::malformed(format!("{CONTAINER_PATH}: {e}")))?;
        let opf_path = path::normalize(&parse_container_xml(&decode_text(&container).text)?);

        let opf_bytes = archive
            .read(&opf_path)
            .map_err(|e| Error::malformed(format!("{opf_path}: {e}")))?;
        let opf = parse_opf(&decode_text(&opf_bytes).text, &opf_path)?;

        let manifest = Manifest::from_items(opf.manifest);
        let navigation = load_navigation(&archive, &manifest, opf.ncx_id.as_deref());

        Ok(Self {
            metadata: opf.metadata,
            manifest,
            spine: opf.spine,
            navigation,
            opf_path,
            archive,
        })
    }
}

/// Load the navigation tree: the EPUB 3 nav document first, then the NCX.
fn load_navigation(archive: &Archive, manifest: &Manifest, ncx_id: Option<&str>) -> Vec<NavNode> {
    if let Some(item) = manifest.iter().find(|i| i.has_property("nav")) {
        match archive.read(&item.path) {
            Ok(bytes) => match parse_nav(&decode_text(&bytes).text, &item.path) {
                Ok(nodes) if !nodes.is_empty() => return nodes,
                Ok(_) => tracing::debug!(path = %item.path, "navigation document has no entries"),
                Err(e) => tracing::warn!(path = %item.path, error = %e, "unreadable navigation document"),
            },
            Err(e) => tracing::warn!(path = %item.path, error = %e, "missing navigation document"),
        }
    }

    let ncx = ncx_id
        .and_then(|id| manifest.get(id))
        .or_else(|| manifest.iter().find(|i| i.media_type == NCX_MEDIA_TYPE));
    let Some(item) = ncx else {
        return Vec::new();
    };

    match archive.read(&item.path) {
        Ok(bytes) => parse_ncx(&decode_text(&bytes).text, &item.path).unwrap_or_else(|e| {
            tracing::warn!(path = %item.path, error = %e, "unreadable NCX");
            Vec::new()
        }),
        Err(e) => {
            tracing::warn!(path = %item.path, error = %e, "missing NCX");
            Vec::new()
        }
    }
}
