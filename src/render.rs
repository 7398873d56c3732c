//! Content rendering: decode a unit, rewrite its resource references and
//! serialize it back to markup.

use html5ever::ns;

use crate::dom::{self, Dom};
use crate::error::{Error, Result};
use crate::package::Archive;
use crate::path;
use crate::spine::AddressableUnit;
use crate::util::decode_text;

/// Render one unit from the archive.
///
/// Every image reference is resolved against the unit's own path and
/// replaced with `map(absolute_path)`.
pub fn render_unit(
    archive: &Archive,
    unit: &AddressableUnit,
    map: &dyn Fn(&str) -> String,
) -> Result<String> {
    let bytes = archive.read(&unit.path).map_err(|e| Error::ContentUnreadable {
        position: unit.position,
        reason: e.to_string(),
    })?;

    let decoded = decode_text(&bytes);
    if decoded.lossy {
        tracing::warn!(
            position = unit.position,
            path = %unit.path,
            "content is not valid text; substituted replacement characters"
        );
    }
    if decoded.text.trim().is_empty() {
        return Err(Error::ContentUnreadable {
            position: unit.position,
            reason: "content document is empty".into(),
        });
    }

    Ok(render_markup(&decoded.text, &unit.path, map))
}

/// Parse `markup`, rewrite its references relative to `unit_path` and
/// serialize the result.
pub fn render_markup(markup: &str, unit_path: &str, map: &dyn Fn(&str) -> String) -> String {
    let mut dom = dom::parse_html(markup);
    let rewritten = rewrite_references(&mut dom, unit_path, map);
    tracing::debug!(path = %unit_path, rewritten, "rendered unit");
    dom::serialize(&dom)
}

/// Rewrite image references in place. Returns how many were changed.
///
/// Handles `img@src` and SVG `image@href` / `image@xlink:href`. References
/// that are external, root-absolute, fragment-only or empty are left
/// alone, so a second pass through a mapping that yields root-absolute
/// references changes nothing.
pub fn rewrite_references(dom: &mut Dom, unit_path: &str, map: &dyn Fn(&str) -> String) -> usize {
    let mut rewritten = 0;

    for id in dom.descendants(dom.document()) {
        let Some(name) = dom.qual_name(id) else {
            continue;
        };
        let target = if name.ns == ns!(html) && name.local.as_ref() == "img" {
            "src"
        } else if name.ns == ns!(svg) && name.local.as_ref() == "image" {
            "href"
        } else {
            continue;
        };

        let Some(attrs) = dom.attrs_mut(id) else {
            continue;
        };
        for attr in attrs
            .iter_mut()
            .filter(|a| a.name.local.as_ref() == target)
        {
            if let Some(absolute) = path::resolve(unit_path, &attr.value) {
                attr.value = map(&absolute);
                rewritten += 1;
            }
        }
    }

    rewritten
}
