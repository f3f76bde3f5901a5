//! Fixture EPUBs for unit tests, built on the fly with `zip`.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

pub struct FixtureItem {
    pub href: &'static str,
    pub media_type: &'static str,
    pub content: Vec<u8>,
}

impl FixtureItem {
    pub fn document(href: &'static str, html: &str) -> Self {
        Self {
            href,
            media_type: "application/xhtml+xml",
            content: html.as_bytes().to_vec(),
        }
    }

    pub fn stylesheet(href: &'static str, css: &str) -> Self {
        Self {
            href,
            media_type: "text/css",
            content: css.as_bytes().to_vec(),
        }
    }
}

/// Write a minimal EPUB 2 package holding `items` under `OEBPS/`.
///
/// Every document item is placed in the spine in the order given.
pub fn write_fixture_epub(path: &Path, items: &[FixtureItem]) {
    let file = File::create(path).unwrap();
    let mut zip = ZipWriter::new(file);
    let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    let deflated = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    zip.start_file("mimetype", stored).unwrap();
    zip.write_all(b"application/epub+zip").unwrap();

    zip.start_file("META-INF/container.xml", deflated).unwrap();
    zip.write_all(
        br#"<?xml version="1.0" encoding="UTF-8"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="OEBPS/content.opf" media-type="application/oebps-package+xml"/>
  </rootfiles>
</container>
"#,
    )
    .unwrap();

    let mut manifest = String::new();
    let mut spine = String::new();
    for (i, item) in items.iter().enumerate() {
        manifest.push_str(&format!(
            "    <item id=\"item{}\" href=\"{}\" media-type=\"{}\"/>\n",
            i, item.href, item.media_type
        ));
        if item.media_type == "application/xhtml+xml" {
            spine.push_str(&format!("    <itemref idref=\"item{}\"/>\n", i));
        }
    }

    let opf = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<package xmlns="http://www.idpf.org/2007/opf" version="2.0" unique-identifier="BookId">
  <metadata xmlns:dc="http://purl.org/dc/elements/1.1/">
    <dc:title>Source Book</dc:title>
    <dc:creator>Source Author</dc:creator>
    <dc:language>de</dc:language>
    <dc:identifier id="BookId">urn:uuid:source-book</dc:identifier>
  </metadata>
  <manifest>
    <item id="ncx" href="toc.ncx" media-type="application/x-dtbncx+xml"/>
{manifest}  </manifest>
  <spine toc="ncx">
{spine}  </spine>
</package>
"#
    );
    zip.start_file("OEBPS/content.opf", deflated).unwrap();
    zip.write_all(opf.as_bytes()).unwrap();

    zip.start_file("OEBPS/toc.ncx", deflated).unwrap();
    zip.write_all(
        br#"<?xml version="1.0" encoding="UTF-8"?>
<ncx xmlns="http://www.daisy.org/z3986/2005/ncx/" version="2005-1">
  <head><meta name="dtb:uid" content="urn:uuid:source-book"/></head>
  <docTitle><text>Source Book</text></docTitle>
  <navMap/>
</ncx>
"#,
    )
    .unwrap();

    for item in items {
        zip.start_file(format!("OEBPS/{}", item.href), deflated)
            .unwrap();
        zip.write_all(&item.content).unwrap();
    }

    zip.finish().unwrap();
}

/// Read one entry of a written archive as text.
pub fn read_entry(path: &Path, name: &str) -> String {
    let mut archive = ZipArchive::new(File::open(path).unwrap()).unwrap();
    let mut entry = archive.by_name(name).unwrap();
    let mut text = String::new();
    entry.read_to_string(&mut text).unwrap();
    text
}
