//! Reading order: the spine filtered down to renderable documents.

use std::collections::HashMap;

use serde::Serialize;

use crate::package::{Manifest, SpineEntry};
use crate::path;

/// Media types that can be rendered as a page.
pub const DOCUMENT_MEDIA_TYPES: &[&str] = &["application/xhtml+xml", "text/html"];

/// Whether a manifest media type is a renderable document.
pub fn is_document(media_type: &str) -> bool {
    let essence = media_type.split(';').next().unwrap_or("").trim();
    DOCUMENT_MEDIA_TYPES
        .iter()
        .any(|t| t.eq_ignore_ascii_case(essence))
}

/// One navigable page of content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddressableUnit {
    /// Zero-based reading position.
    pub position: usize,
    /// Manifest id of the underlying item.
    pub id: String,
    /// Package path of the content document.
    pub path: String,
    /// `false` for spine entries declared `linear="no"`.
    pub linear: bool,
}

/// The addressable units of a document plus a path -> position index.
#[derive(Debug, Clone, Default)]
pub struct ReadingOrder {
    units: Vec<AddressableUnit>,
    path_index: HashMap<String, usize>,
}

impl ReadingOrder {
    /// Build the reading order from the manifest and spine.
    ///
    /// Spine entries whose manifest item is missing or is not a document are
    /// skipped; the survivors are numbered `0..N`. When several entries share
    /// a path, the index keeps the first position.
    pub fn resolve(manifest: &Manifest, spine: &[SpineEntry]) -> Self {
        let mut units = Vec::with_capacity(spine.len());
        let mut path_index = HashMap::new();

        for entry in spine {
            let Some(item) = manifest.get(&entry.idref) else {
                tracing::warn!(idref = %entry.idref, "spine entry has no manifest item");
                continue;
            };
            if !is_document(&item.media_type) {
                tracing::debug!(
                    idref = %entry.idref,
                    media_type = %item.media_type,
                    "skipping non-document spine entry"
                );
                continue;
            }

            let position = units.len();
            path_index
                .entry(path::normalize(&item.path))
                .or_insert(position);
            units.push(AddressableUnit {
                position,
                id: item.id.clone(),
                path: item.path.clone(),
                linear: entry.linear,
            });
        }

        Self { units, path_index }
    }

    pub fn units(&self) -> &[AddressableUnit] {
        &self.units
    }

    pub fn get(&self, position: usize) -> Option<&AddressableUnit> {
        self.units.get(position)
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Position of the first unit stored at `path` (any fragment ignored).
    pub fn position_of(&self, path: &str) -> Option<usize> {
        self.path_index.get(&path::normalize(path)).copied()
    }
}
