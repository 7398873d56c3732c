mod common;

use std::io::Write;

use common::{EpubBuilder, XHTML, sample_book};
use lexipub::{Document, Error, ReaderOptions, ReadingContext};
use tempfile::NamedTempFile;

fn identity(path: &str) -> String {
    path.to_string()
}

#[test]
fn test_load_sample_book() {
    let doc = Document::from_bytes(sample_book()).expect("Failed to load package");

    assert_eq!(doc.metadata().title, "Sample");
    assert_eq!(doc.metadata().authors, vec!["Test Author"]);
    assert_eq!(doc.metadata().language, "ja");

    let paths: Vec<_> = doc.units().iter().map(|u| u.path.as_str()).collect();
    assert_eq!(
        paths,
        [
            "OEBPS/text/cover.xhtml",
            "OEBPS/text/ch1.xhtml",
            "OEBPS/text/ch2.xhtml",
            "OEBPS/text/notes.xhtml",
        ]
    );
    for (i, unit) in doc.units().iter().enumerate() {
        assert_eq!(unit.position, i);
    }
    assert!(doc.units()[2].linear);
    assert!(!doc.units()[3].linear, "linear=\"no\" should be carried");
}

#[test]
fn test_toc_is_flattened_and_deduplicated() {
    let doc = Document::from_bytes(sample_book()).unwrap();

    let toc: Vec<_> = doc
        .toc()
        .iter()
        .map(|e| (e.title.as_str(), e.position))
        .collect();
    assert_eq!(toc, [("Cover", 0), ("Chapter 1", 1), ("Chapter 2", 2)]);
    assert_eq!(doc.toc()[1].href, "OEBPS/text/ch1.xhtml");

    // The raw tree keeps what the package declared.
    assert_eq!(doc.navigation().len(), 3);
}

#[test]
fn test_render_rewrites_images() {
    let doc = Document::from_bytes(sample_book()).unwrap();
    let context = ReadingContext::new(ReaderOptions::default());

    let cover = context.render_page(&doc, 0).unwrap();
    assert!(
        cover
            .markup
            .contains(r#"<img src="/resource/OEBPS/images/cover.png" alt="cover">"#),
        "{}",
        cover.markup
    );
    assert_eq!(cover.total, 4);
    assert_eq!(cover.previous(), None);
    assert_eq!(cover.next(), Some(1));

    let ch1 = context.render_page(&doc, 1).unwrap();
    assert!(
        ch1.markup
            .contains(r#"<img src="/resource/OEBPS/text/img/fig%201.png">"#),
        "{}",
        ch1.markup
    );
    assert!(ch1.markup.contains("<p>私は本を読む。</p>"));
}

#[test]
fn test_rewritten_references_resolve_as_resources() {
    let doc = Document::from_bytes(sample_book()).unwrap();
    let ch1 = doc.render_unit(1, &|p| format!("res:{p}")).unwrap();
    assert!(ch1.contains(r#"src="res:OEBPS/text/img/fig 1.png""#), "{ch1}");

    let resource = doc.resolve_resource("OEBPS/text/img/fig 1.png").unwrap();
    assert_eq!(resource.media_type, "image/png");
    assert_eq!(resource.bytes, b"\x89PNG\r\n\x1a\nFIG1");

    // Percent-encoded and dotted forms name the same resource.
    let again = doc
        .resolve_resource("OEBPS/text/../text/img/fig%201.png")
        .unwrap();
    assert_eq!(again.path, "OEBPS/text/img/fig 1.png");

    let css = doc.resolve_resource("OEBPS/styles/main.css").unwrap();
    assert_eq!(css.media_type, "text/css");
}

#[test]
fn test_unknown_resources_are_not_found() {
    let doc = Document::from_bytes(sample_book()).unwrap();

    assert!(matches!(
        doc.resolve_resource("OEBPS/images/nope.png"),
        Err(Error::ResourceNotFound(_))
    ));
    // In the archive but not in the manifest.
    assert!(matches!(
        doc.resolve_resource("META-INF/container.xml"),
        Err(Error::ResourceNotFound(_))
    ));
}

#[test]
fn test_out_of_range_position() {
    let doc = Document::from_bytes(sample_book()).unwrap();
    let err = doc.render_unit(4, &identity).unwrap_err();
    assert!(matches!(err, Error::UnitOutOfRange { position: 4, len: 4 }));
    assert!(!err.is_fatal());
}

#[test]
fn test_empty_spine() {
    let bytes = EpubBuilder::new("Empty")
        .item("css", "main.css", "text/css", "p {}")
        .item("img", "a.png", "image/png", b"\x89PNG".to_vec())
        .spine("img")
        .spine("missing")
        .build();

    assert!(matches!(Document::from_bytes(bytes), Err(Error::EmptySpine)));
}

#[test]
fn test_non_document_spine_entries_are_skipped() {
    let bytes = EpubBuilder::new("Mixed")
        .chapter("a", "a.xhtml", "<p>A</p>")
        .item("img", "a.png", "image/png", b"\x89PNG".to_vec())
        .spine("img")
        .spine("ghost")
        .chapter("b", "b.xhtml", "<p>B</p>")
        .build();

    let doc = Document::from_bytes(bytes).unwrap();
    let ids: Vec<_> = doc.units().iter().map(|u| u.id.as_str()).collect();
    assert_eq!(ids, ["a", "b"]);
    assert_eq!(doc.units()[1].position, 1);
}

#[test]
fn test_repeated_spine_path_indexes_first_position() {
    let bytes = EpubBuilder::new("Repeat")
        .chapter("a", "a.xhtml", "<p>A</p>")
        .chapter("b", "b.xhtml", "<p>B</p>")
        .spine("a")
        .nav(r##"<nav epub:type="toc"><ol><li><a href="a.xhtml#later">A</a></li></ol></nav>"##)
        .build();

    let doc = Document::from_bytes(bytes).unwrap();
    assert_eq!(doc.len(), 3);
    assert_eq!(doc.reading_order().position_of("OEBPS/a.xhtml"), Some(0));
    assert_eq!(doc.toc().len(), 1);
    assert_eq!(doc.toc()[0].position, 0);
}

#[test]
fn test_malformed_packages() {
    assert!(matches!(
        Document::from_bytes(b"PK\x03\x04 truncated".to_vec()),
        Err(Error::MalformedPackage(_))
    ));

    let no_container = {
        let mut zip = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
        zip.start_file("mimetype", zip::write::SimpleFileOptions::default())
            .unwrap();
        zip.write_all(b"application/epub+zip").unwrap();
        zip.finish().unwrap().into_inner()
    };
    let err = Document::from_bytes(no_container).err().unwrap();
    assert!(matches!(err, Error::MalformedPackage(_)));
    assert!(err.is_fatal());
}

#[test]
fn test_corrupt_navigation_degrades_to_empty_toc() {
    let bytes = EpubBuilder::new("Broken nav")
        .chapter("a", "a.xhtml", "<p>A</p>")
        .ncx(r#"<navPoint id="n1"><navLabel><text>A</text></navLabel><content src="a.xhtml"/>"#)
        .build();

    let doc = Document::from_bytes(bytes).unwrap();
    assert_eq!(doc.len(), 1);
    assert!(doc.toc().is_empty());
    assert!(doc.render_unit(0, &identity).is_ok());
}

#[test]
fn test_deeply_nested_ncx_loads_on_small_stack() {
    const DEPTH: usize = 100_000;
    let mut nav_map = String::new();
    for i in 0..DEPTH {
        nav_map.push_str(&format!(
            r#"<navPoint id="n{i}"><navLabel><text>L{i}</text></navLabel><content src="a.xhtml"/>"#
        ));
    }
    nav_map.push_str(&"</navPoint>".repeat(DEPTH));
    let bytes = EpubBuilder::new("Deep")
        .chapter("a", "a.xhtml", "<p>A</p>")
        .ncx(&nav_map)
        .build();

    let handle = std::thread::Builder::new()
        .stack_size(2 * 1024 * 1024)
        .spawn(move || {
            let doc = Document::from_bytes(bytes).unwrap();
            assert_eq!(doc.toc().len(), 1);
            assert_eq!(doc.toc()[0].title, "L0");
        })
        .unwrap();
    handle.join().unwrap();
}

#[test]
fn test_ncx_navigation() {
    let bytes = EpubBuilder::new("NCX")
        .chapter("part", "text/part.xhtml", "<h1>Part</h1>")
        .chapter("ch1", "text/ch1.xhtml", "<h1>One</h1>")
        .chapter("ch2", "text/ch2.xhtml", "<h1>Two</h1>")
        .ncx(
            r#"<navPoint id="p"><navLabel><text>Part</text></navLabel><content src="text/part.xhtml"/>
  <navPoint id="c1"><navLabel><text>One</text></navLabel><content src="text/ch1.xhtml"/></navPoint>
  <navPoint id="c2"><navLabel><text>Two</text></navLabel><content src="text/ch2.xhtml#top"/></navPoint>
</navPoint>
<navPoint id="x"><navLabel><text>Elsewhere</text></navLabel><content src="text/gone.xhtml"/></navPoint>"#,
        )
        .build();

    let doc = Document::from_bytes(bytes).unwrap();
    let toc: Vec<_> = doc
        .toc()
        .iter()
        .map(|e| (e.title.as_str(), e.position, e.href.as_str()))
        .collect();
    assert_eq!(
        toc,
        [
            ("Part", 0, "OEBPS/text/part.xhtml"),
            ("One", 1, "OEBPS/text/ch1.xhtml"),
            ("Two", 2, "OEBPS/text/ch2.xhtml#top"),
        ]
    );
}

#[test]
fn test_missing_content_is_unreadable() {
    let bytes = EpubBuilder::new("Holes")
        .chapter("a", "a.xhtml", "<p>A</p>")
        .declare("b", "b.xhtml", XHTML)
        .spine("b")
        .item("c", "c.xhtml", XHTML, "  \n")
        .spine("c")
        .build();

    let doc = Document::from_bytes(bytes).unwrap();
    assert_eq!(doc.len(), 3);
    assert!(doc.render_unit(0, &identity).is_ok());

    let err = doc.render_unit(1, &identity).unwrap_err();
    assert!(matches!(err, Error::ContentUnreadable { position: 1, .. }));
    assert!(!err.is_fatal());

    assert!(matches!(
        doc.render_unit(2, &identity),
        Err(Error::ContentUnreadable { position: 2, .. })
    ));

    // The rest of the document is unaffected.
    assert!(doc.render_unit(0, &identity).is_ok());
}

#[test]
fn test_invalid_utf8_is_rendered_leniently() {
    let mut content = b"<html><body><p>caf".to_vec();
    content.extend_from_slice(&[0xff, 0xfe]);
    content.extend_from_slice("é ok</p></body></html>".as_bytes());

    let bytes = EpubBuilder::new("Bytes")
        .item("a", "a.xhtml", XHTML, content)
        .spine("a")
        .build();

    let doc = Document::from_bytes(bytes).unwrap();
    let markup = doc.render_unit(0, &identity).unwrap();
    assert!(markup.contains("caf\u{fffd}"), "{markup}");
    assert!(markup.contains("é ok</p>"), "{markup}");
}

#[test]
fn test_open_from_file() {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(&sample_book()).unwrap();
    file.flush().unwrap();

    let doc = Document::open(file.path()).expect("Failed to open package");
    assert_eq!(doc.len(), 4);
    let resource = doc.resolve_resource("OEBPS/images/cover.png").unwrap();
    assert_eq!(resource.bytes, b"\x89PNG\r\n\x1a\nCOVER");
}

#[test]
fn test_concurrent_reads_share_one_document() {
    let doc = Document::from_bytes(sample_book()).unwrap();
    let expected: Vec<String> = (0..doc.len())
        .map(|i| doc.render_unit(i, &identity).unwrap())
        .collect();

    std::thread::scope(|s| {
        for t in 0..8 {
            let doc = &doc;
            let expected = &expected;
            s.spawn(move || {
                for round in 0..10 {
                    let pos = (t + round) % doc.len();
                    assert_eq!(&doc.render_unit(pos, &identity).unwrap(), &expected[pos]);
                    let res = doc.resolve_resource("OEBPS/images/cover.png").unwrap();
                    assert_eq!(res.bytes.len(), 13);
                }
            });
        }
    });
}
