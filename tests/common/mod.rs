//! In-memory EPUB packages for integration tests.

#![allow(dead_code)]

use std::io::{Cursor, Write};

use zip::CompressionMethod;
use zip::write::{SimpleFileOptions, ZipWriter};

pub const XHTML: &str = "application/xhtml+xml";

pub fn chapter(title: &str, body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<html xmlns="http://www.w3.org/1999/xhtml"><head><title>{title}</title></head><body>{body}</body></html>"#
    )
}

/// Builds a package under `OEBPS/` with a manifest, spine and optional
/// navigation document.
pub struct EpubBuilder {
    title: String,
    items: Vec<(String, String, String, Vec<u8>)>,
    spine: Vec<(String, bool)>,
    nav: Option<String>,
    ncx: Option<String>,
    /// Manifest items with no archive entry.
    declared: Vec<(String, String, String)>,
    /// Extra raw archive entries (path, bytes), not listed in the manifest.
    extra: Vec<(String, Vec<u8>)>,
}

impl EpubBuilder {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            items: Vec::new(),
            spine: Vec::new(),
            nav: None,
            ncx: None,
            declared: Vec::new(),
            extra: Vec::new(),
        }
    }

    /// Add a manifest item; `href` is relative to `OEBPS/`.
    pub fn item(mut self, id: &str, href: &str, media_type: &str, bytes: impl Into<Vec<u8>>) -> Self {
        self.items
            .push((id.into(), href.into(), media_type.into(), bytes.into()));
        self
    }

    /// Add an XHTML chapter to the manifest and the spine.
    pub fn chapter(self, id: &str, href: &str, body: &str) -> Self {
        let content = chapter(id, body);
        self.item(id, href, XHTML, content).spine(id)
    }

    /// Declare a manifest item without storing it in the archive.
    pub fn declare(mut self, id: &str, href: &str, media_type: &str) -> Self {
        self.declared.push((id.into(), href.into(), media_type.into()));
        self
    }

    pub fn spine(mut self, idref: &str) -> Self {
        self.spine.push((idref.into(), true));
        self
    }

    pub fn spine_nonlinear(mut self, idref: &str) -> Self {
        self.spine.push((idref.into(), false));
        self
    }

    /// EPUB 3 navigation document stored at `OEBPS/nav.xhtml`.
    pub fn nav(mut self, body: &str) -> Self {
        self.nav = Some(body.to_string());
        self
    }

    /// NCX stored at `OEBPS/toc.ncx`, referenced from `spine@toc`.
    pub fn ncx(mut self, nav_map: &str) -> Self {
        self.ncx = Some(nav_map.to_string());
        self
    }

    pub fn raw(mut self, path: &str, bytes: impl Into<Vec<u8>>) -> Self {
        self.extra.push((path.into(), bytes.into()));
        self
    }

    pub fn opf(&self) -> String {
        let mut manifest = String::new();
        let declared = self.declared.iter().map(|(id, href, mt)| (id, href, mt));
        for (id, href, media_type) in self
            .items
            .iter()
            .map(|(id, href, mt, _)| (id, href, mt))
            .chain(declared)
        {
            manifest.push_str(&format!(
                r#"    <item id="{id}" href="{href}" media-type="{media_type}"/>
"#
            ));
        }
        if self.nav.is_some() {
            manifest.push_str(
                r#"    <item id="nav" href="nav.xhtml" media-type="application/xhtml+xml" properties="nav"/>
"#,
            );
        }
        if self.ncx.is_some() {
            manifest.push_str(
                r#"    <item id="ncx" href="toc.ncx" media-type="application/x-dtbncx+xml"/>
"#,
            );
        }

        let mut spine = String::new();
        for (idref, linear) in &self.spine {
            let linear = if *linear { "" } else { r#" linear="no""# };
            spine.push_str(&format!(
                r#"    <itemref idref="{idref}"{linear}/>
"#
            ));
        }
        let toc_attr = if self.ncx.is_some() { r#" toc="ncx""# } else { "" };

        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<package xmlns="http://www.idpf.org/2007/opf" version="3.0" unique-identifier="uid">
  <metadata xmlns:dc="http://purl.org/dc/elements/1.1/">
    <dc:title>{title}</dc:title>
    <dc:creator>Test Author</dc:creator>
    <dc:language>ja</dc:language>
    <dc:identifier id="uid">urn:uuid:test-{title}</dc:identifier>
  </metadata>
  <manifest>
{manifest}  </manifest>
  <spine{toc_attr}>
{spine}  </spine>
</package>"#,
            title = self.title
        )
    }

    pub fn build(&self) -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
        let deflated = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        zip.start_file("mimetype", stored).unwrap();
        zip.write_all(b"application/epub+zip").unwrap();

        zip.start_file("META-INF/container.xml", deflated).unwrap();
        zip.write_all(
            br#"<?xml version="1.0"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="OEBPS/content.opf" media-type="application/oebps-package+xml"/>
  </rootfiles>
</container>"#,
        )
        .unwrap();

        zip.start_file("OEBPS/content.opf", deflated).unwrap();
        zip.write_all(self.opf().as_bytes()).unwrap();

        if let Some(nav) = &self.nav {
            zip.start_file("OEBPS/nav.xhtml", deflated).unwrap();
            zip.write_all(
                format!(
                    r#"<?xml version="1.0" encoding="UTF-8"?>
<html xmlns="http://www.w3.org/1999/xhtml" xmlns:epub="http://www.idpf.org/2007/ops"><head><title>Contents</title></head><body>{nav}</body></html>"#
                )
                .as_bytes(),
            )
            .unwrap();
        }

        if let Some(nav_map) = &self.ncx {
            zip.start_file("OEBPS/toc.ncx", deflated).unwrap();
            zip.write_all(
                format!(
                    r#"<?xml version="1.0" encoding="UTF-8"?>
<ncx xmlns="http://www.daisy.org/z3986/2005/ncx/" version="2005-1"><navMap>{nav_map}</navMap></ncx>"#
                )
                .as_bytes(),
            )
            .unwrap();
        }

        // Alternate stored and deflated entries so both read paths are used.
        for (i, (_, href, _, bytes)) in self.items.iter().enumerate() {
            let options = if i % 2 == 0 { deflated } else { stored };
            zip.start_file(format!("OEBPS/{href}"), options).unwrap();
            zip.write_all(bytes).unwrap();
        }

        for (path, bytes) in &self.extra {
            zip.start_file(path.as_str(), stored).unwrap();
            zip.write_all(bytes).unwrap();
        }

        zip.finish().unwrap().into_inner()
    }
}

/// A small two-part book with images, a nav document and non-linear notes.
pub fn sample_book() -> Vec<u8> {
    EpubBuilder::new("Sample")
        .chapter(
            "cover",
            "text/cover.xhtml",
            r#"<div><img src="../images/cover.png" alt="cover"/></div>"#,
        )
        .chapter(
            "ch1",
            "text/ch1.xhtml",
            r#"<h1>第一章</h1><p>私は本を読む。</p><p><img src="img/fig 1.png"/></p>"#,
        )
        .chapter(
            "ch2",
            "text/ch2.xhtml",
            r#"<h1>第二章</h1><p>昨日、パンを食べました。</p>"#,
        )
        .item(
            "notes",
            "text/notes.xhtml",
            XHTML,
            chapter("notes", "<p>Notes</p>"),
        )
        .spine_nonlinear("notes")
        .item("css", "styles/main.css", "text/css", "p { margin: 0 }")
        .item("cover-img", "images/cover.png", "image/png", b"\x89PNG\r\n\x1a\nCOVER".to_vec())
        .item("fig1", "text/img/fig 1.png", "image/png", b"\x89PNG\r\n\x1a\nFIG1".to_vec())
        .nav(
            r#"<nav epub:type="toc"><ol>
  <li><a href="text/cover.xhtml">Cover</a></li>
  <li><span>Part 1</span><ol>
    <li><a href="text/ch1.xhtml">Chapter 1</a></li>
    <li><a href="text/ch1.xhtml#sec2">Chapter 1, section 2</a></li>
    <li><a href="text/ch2.xhtml">Chapter 2</a></li>
  </ol></li>
  <li><a href="text/missing.xhtml">Missing</a></li>
</ol></nav>"#,
        )
        .build()
}
