//! OPF package document: metadata, manifest and spine.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use super::xml::{attr, local_name, resolve_entity};
use super::{ManifestItem, Metadata, SpineEntry};
use crate::error::{Error, Result};
use crate::path;

/// Parsed OPF package data. Manifest paths are absolute within the package.
#[derive(Debug, Default)]
pub struct OpfData {
    pub metadata: Metadata,
    pub manifest: Vec<ManifestItem>,
    pub spine: Vec<SpineEntry>,
    /// Manifest id named by `spine@toc` (the NCX).
    pub ncx_id: Option<String>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Field {
    Title,
    Creator,
    Language,
    Identifier,
    Publisher,
}

impl Field {
    fn from_local(local: &[u8]) -> Option<Self> {
        Some(match local {
            b"title" => Field::Title,
            b"creator" => Field::Creator,
            b"language" => Field::Language,
            b"identifier" => Field::Identifier,
            b"publisher" => Field::Publisher,
            _ => return None,
        })
    }
}

/// Parse the OPF at `opf_path`.
///
/// Fails when the document is not well-formed XML or has no `package` root.
pub fn parse_opf(content: &str, opf_path: &str) -> Result<OpfData> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(false);

    let mut data = OpfData::default();
    let mut seen_package = false;
    let mut in_metadata = false;
    let mut current: Option<Field> = None;
    let mut text = String::new();

    loop {
        let event = reader
            .read_event()
            .map_err(|e| Error::malformed(format!("{opf_path}: {e}")))?;

        match event {
            Event::Start(e) => {
                let name = e.name();
                let local = local_name(name.as_ref());
                match local {
                    b"package" => seen_package = true,
                    b"metadata" => in_metadata = true,
                    _ if in_metadata => {
                        current = Field::from_local(local);
                        text.clear();
                    }
                    _ => handle_element(&e, opf_path, &mut data),
                }
            }
            Event::Empty(e) => {
                if local_name(e.name().as_ref()) == b"package" {
                    seen_package = true;
                }
                handle_element(&e, opf_path, &mut data);
            }
            Event::Text(e) if current.is_some() => {
                text.push_str(&String::from_utf8_lossy(e.as_ref()));
            }
            Event::CData(e) if current.is_some() => {
                text.push_str(&String::from_utf8_lossy(e.as_ref()));
            }
            Event::GeneralRef(e) if current.is_some() => {
                if let Some(resolved) = resolve_entity(&String::from_utf8_lossy(e.as_ref())) {
                    text.push_str(&resolved);
                }
            }
            Event::End(e) => {
                if local_name(e.name().as_ref()) == b"metadata" {
                    in_metadata = false;
                }
                if let Some(field) = current.take() {
                    store_field(&mut data.metadata, field, text.trim());
                    text.clear();
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !seen_package {
        return Err(Error::malformed(format!("{opf_path}: no package element")));
    }

    tracing::debug!(
        items = data.manifest.len(),
        spine = data.spine.len(),
        "parsed package document"
    );
    Ok(data)
}

fn handle_element(e: &BytesStart<'_>, opf_path: &str, data: &mut OpfData) {
    match local_name(e.name().as_ref()) {
        b"item" => {
            let (Some(id), Some(href)) = (attr(e, b"id"), attr(e, b"href")) else {
                return;
            };
            let Some(item_path) = path::resolve(opf_path, &href) else {
                tracing::debug!(id = %id, href = %href, "manifest item points outside the package");
                return;
            };
            let mut item = ManifestItem::new(
                id,
                item_path,
                attr(e, b"media-type").unwrap_or_default(),
            );
            item.properties = attr(e, b"properties")
                .map(|p| p.split_ascii_whitespace().map(String::from).collect())
                .unwrap_or_default();
            data.manifest.push(item);
        }
        b"itemref" => {
            if let Some(idref) = attr(e, b"idref") {
                let mut entry = SpineEntry::new(idref);
                entry.linear = attr(e, b"linear").is_none_or(|v| v.trim() != "no");
                data.spine.push(entry);
            }
        }
        b"spine" => {
            data.ncx_id = attr(e, b"toc");
        }
        _ => {}
    }
}

fn store_field(metadata: &mut Metadata, field: Field, value: &str) {
    if value.is_empty() {
        return;
    }
    let value = value.to_string();
    match field {
        Field::Title if metadata.title.is_empty() => metadata.title = value,
        Field::Creator => metadata.authors.push(value),
        Field::Language if metadata.language.is_empty() => metadata.language = value,
        Field::Identifier if metadata.identifier.is_empty() => metadata.identifier = value,
        Field::Publisher => metadata.publisher = Some(value),
        _ => {}
    }
}
