//! Resource resolution: package path -> bytes + media type.

use serde::Serialize;

use crate::error::{Error, Result};
use crate::package::{Archive, Manifest};
use crate::path;

/// Media type used when nothing better is known.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// A resource read out of the package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resource {
    /// Normalized package path.
    pub path: String,
    #[serde(skip)]
    pub bytes: Vec<u8>,
    pub media_type: &'static str,
}

/// Look up `requested` in the manifest and read its bytes.
///
/// Only manifest items are served; archive entries the manifest does not
/// declare are reported as [`Error::ResourceNotFound`].
pub fn resolve_resource(archive: &Archive, manifest: &Manifest, requested: &str) -> Result<Resource> {
    let normalized = path::normalize(requested);
    let item = manifest
        .by_path(&normalized)
        .ok_or_else(|| Error::ResourceNotFound(normalized.clone()))?;

    let bytes = archive.read(&item.path).map_err(|e| {
        tracing::warn!(path = %item.path, error = %e, "manifest item missing from archive");
        Error::ResourceNotFound(normalized.clone())
    })?;

    Ok(Resource {
        media_type: media_type_for(&normalized),
        path: normalized,
        bytes,
    })
}

/// Media type for a path, from its extension.
///
/// Consults the standard table first, then a fallback table of image
/// formats, and finally returns [`OCTET_STREAM`].
pub fn media_type_for(path: &str) -> &'static str {
    let file = path.rsplit('/').next().unwrap_or(path);
    let Some((_, ext)) = file.rsplit_once('.') else {
        return OCTET_STREAM;
    };
    let ext = ext.to_ascii_lowercase();

    standard_media_type(&ext)
        .or_else(|| fallback_image_type(&ext))
        .unwrap_or(OCTET_STREAM)
}

fn standard_media_type(ext: &str) -> Option<&'static str> {
    Some(match ext {
        "xhtml" | "xht" => "application/xhtml+xml",
        "html" | "htm" => "text/html",
        "css" => "text/css",
        "js" | "mjs" => "text/javascript",
        "xml" => "application/xml",
        "txt" => "text/plain",
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "ico" => "image/vnd.microsoft.icon",
        "tif" | "tiff" => "image/tiff",
        "ttf" => "font/ttf",
        "otf" => "font/otf",
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "mp3" => "audio/mpeg",
        "m4a" => "audio/mp4",
        "ogg" | "oga" => "audio/ogg",
        "mp4" | "m4v" => "video/mp4",
        "webm" => "video/webm",
        "ncx" => "application/x-dtbncx+xml",
        "opf" => "application/oebps-package+xml",
        "smil" => "application/smil+xml",
        "pdf" => "application/pdf",
        _ => return None,
    })
}

fn fallback_image_type(ext: &str) -> Option<&'static str> {
    Some(match ext {
        "jpe" | "jfif" | "pjpeg" | "pjp" => "image/jpeg",
        "apng" => "image/apng",
        "avif" => "image/avif",
        "heic" => "image/heic",
        "heif" => "image/heif",
        "jxl" => "image/jxl",
        "svgz" => "image/svg+xml",
        _ => return None,
    })
}
