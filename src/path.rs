//! Package path handling.
//!
//! Paths inside a package are `/`-separated, relative to the archive root
//! and never allowed to climb above it. Nothing here touches the
//! filesystem.

use std::borrow::Cow;

use percent_encoding::percent_decode_str;

/// Normalize a package path: drop empty and `.` segments, apply `..`
/// (clamped at the package root), percent-decode each segment and convert
/// backslashes to `/`.
pub fn normalize(path: &str) -> String {
    let path = strip_fragment(path);
    let mut segments: Vec<Cow<'_, str>> = Vec::new();

    for segment in path.split(['/', '\\']) {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(percent_decode_str(other).decode_utf8_lossy()),
        }
    }

    segments.join("/")
}

/// Remove a `#fragment` (and any `?query`) from an href.
pub fn strip_fragment(href: &str) -> &str {
    let end = href.find(['#', '?']).unwrap_or(href.len());
    &href[..end]
}

/// Directory part of a package path, with a trailing `/` (empty at root).
pub fn parent_dir(path: &str) -> &str {
    match path.rfind('/') {
        Some(idx) => &path[..=idx],
        None => "",
    }
}

/// Whether an href points outside the package: it carries a URL scheme,
/// is root-absolute, fragment-only or empty.
pub fn is_external(href: &str) -> bool {
    let href = href.trim();
    href.is_empty() || href.starts_with('#') || href.starts_with('/') || has_scheme(href)
}

/// Whether `href` starts with a URL scheme such as `https:` or `data:`.
pub fn has_scheme(href: &str) -> bool {
    let Some(colon) = href.find(':') else {
        return false;
    };
    let scheme = &href[..colon];
    let mut chars = scheme.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

/// Resolve `href` relative to the directory of the package file `base`.
///
/// The fragment is dropped. Returns `None` for references that do not
/// address a file inside the package (see [`is_external`]).
///
/// `"OEBPS/text/ch01.xhtml"` + `"../images/a.png"` -> `"OEBPS/images/a.png"`
pub fn resolve(base: &str, href: &str) -> Option<String> {
    let href = href.trim();
    if is_external(href) {
        return None;
    }
    let target = strip_fragment(href);
    if target.is_empty() {
        return None;
    }
    Some(normalize(&format!("{}{}", parent_dir(base), target)))
}

/// Like [`resolve`] but keeps the fragment, for navigation targets.
pub fn resolve_keep_fragment(base: &str, href: &str) -> Option<String> {
    let href = href.trim();
    let resolved = resolve(base, href)?;
    match href.find('#') {
        Some(idx) => Some(format!("{}{}", resolved, &href[idx..])),
        None => Some(resolved),
    }
}
