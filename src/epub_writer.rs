//! Output package builder.
//!
//! Writes an EPUB 3 package with one chapter, an EPUB 2 NCX for legacy
//! readers and an EPUB 3 navigation document.

use crate::flatten::FlattenedDocument;
use crate::metadata::PackageMetadata;
use anyhow::{Context, Result};
use std::io::{Seek, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

pub const CHAPTER_FILE: &str = "chapter.xhtml";
pub const CHAPTER_ID: &str = "chapter_0";
pub const CHAPTER_TITLE: &str = "All Content";
pub const TOC_ENTRY_ID: &str = "all_content";
pub const NCX_FILE: &str = "toc.ncx";
pub const NAV_FILE: &str = "nav.xhtml";

/// Directory inside the archive holding the package document and content
const PACKAGE_DIR: &str = "EPUB";

const CONTAINER_XML: &[u8] = br#"<?xml version="1.0" encoding="UTF-8"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="EPUB/content.opf" media-type="application/oebps-package+xml"/>
  </rootfiles>
</container>
"#;

/// Build the package and write it to `output_path`.
///
/// The archive is assembled in a temporary file next to the destination and
/// renamed into place once complete, so a failed run leaves nothing behind.
pub fn write_epub(
    document: &FlattenedDocument,
    metadata: &PackageMetadata,
    output_path: &Path,
) -> Result<()> {
    let dir = match output_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create output file in: {}", dir.display()))?;
    let modified = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string();

    write_package(temp.as_file_mut(), document, metadata, &modified)
        .with_context(|| format!("Failed to write EPUB: {}", output_path.display()))?;

    // Temp files are created owner-only; the finished book should not be.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        temp.as_file()
            .set_permissions(std::fs::Permissions::from_mode(0o644))
            .with_context(|| format!("Failed to set permissions on: {}", output_path.display()))?;
    }

    temp.persist(output_path)
        .with_context(|| format!("Failed to save EPUB: {}", output_path.display()))?;

    debug!("Wrote package to {}", output_path.display());
    Ok(())
}

/// Serialize the whole package into `writer`.
pub fn write_package<W: Write + Seek>(
    writer: W,
    document: &FlattenedDocument,
    metadata: &PackageMetadata,
    modified: &str,
) -> Result<()> {
    let mut zip = ZipWriter::new(writer);
    let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    let deflated = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    // mimetype must be first and uncompressed
    zip.start_file("mimetype", stored)?;
    zip.write_all(b"application/epub+zip")?;

    zip.start_file("META-INF/container.xml", deflated)?;
    zip.write_all(CONTAINER_XML)?;

    let entries = [
        ("content.opf", generate_opf(metadata, modified)),
        (CHAPTER_FILE, generate_chapter(document, metadata)),
        (NCX_FILE, generate_ncx(metadata)),
        (NAV_FILE, generate_nav(metadata)),
    ];
    for (name, content) in &entries {
        zip.start_file(format!("{}/{}", PACKAGE_DIR, name), deflated)?;
        zip.write_all(content.as_bytes())?;
    }

    zip.finish()?;
    Ok(())
}

fn generate_opf(metadata: &PackageMetadata, modified: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<package xmlns="http://www.idpf.org/2007/opf" version="3.0" unique-identifier="id" xml:lang="{language}">
  <metadata xmlns:dc="http://purl.org/dc/elements/1.1/">
    <dc:identifier id="id">{identifier}</dc:identifier>
    <dc:title>{title}</dc:title>
    <dc:language>{language}</dc:language>
    <dc:creator id="creator">{author}</dc:creator>
    <meta property="dcterms:modified">{modified}</meta>
  </metadata>
  <manifest>
    <item id="{chapter_id}" href="{chapter_file}" media-type="application/xhtml+xml"/>
    <item id="ncx" href="{ncx_file}" media-type="application/x-dtbncx+xml"/>
    <item id="nav" href="{nav_file}" media-type="application/xhtml+xml" properties="nav"/>
  </manifest>
  <spine toc="ncx">
    <itemref idref="nav"/>
    <itemref idref="{chapter_id}"/>
  </spine>
</package>
"#,
        identifier = escape_xml(&metadata.identifier),
        title = escape_xml(&metadata.title),
        language = escape_xml(&metadata.language),
        author = escape_xml(&metadata.author),
        modified = escape_xml(modified),
        chapter_id = CHAPTER_ID,
        chapter_file = CHAPTER_FILE,
        ncx_file = NCX_FILE,
        nav_file = NAV_FILE,
    )
}

fn generate_chapter(document: &FlattenedDocument, metadata: &PackageMetadata) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE html>
<html xmlns="http://www.w3.org/1999/xhtml" xmlns:epub="http://www.idpf.org/2007/ops" lang="{language}" xml:lang="{language}">
<head>
  <title>{title}</title>
</head>
<body>{body}</body>
</html>
"#,
        language = escape_xml(&metadata.language),
        title = CHAPTER_TITLE,
        body = document.body(),
    )
}

fn generate_ncx(metadata: &PackageMetadata) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE ncx PUBLIC "-//NISO//DTD ncx 2005-1//EN" "http://www.daisy.org/z3986/2005/ncx-2005-1.dtd">
<ncx xmlns="http://www.daisy.org/z3986/2005/ncx/" version="2005-1">
  <head>
    <meta name="dtb:uid" content="{identifier}"/>
    <meta name="dtb:depth" content="1"/>
    <meta name="dtb:totalPageCount" content="0"/>
    <meta name="dtb:maxPageNumber" content="0"/>
  </head>
  <docTitle>
    <text>{title}</text>
  </docTitle>
  <navMap>
    <navPoint id="{entry_id}" playOrder="1">
      <navLabel><text>{label}</text></navLabel>
      <content src="{chapter_file}"/>
    </navPoint>
  </navMap>
</ncx>
"#,
        identifier = escape_xml(&metadata.identifier),
        title = escape_xml(&metadata.title),
        entry_id = TOC_ENTRY_ID,
        label = CHAPTER_TITLE,
        chapter_file = CHAPTER_FILE,
    )
}

fn generate_nav(metadata: &PackageMetadata) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE html>
<html xmlns="http://www.w3.org/1999/xhtml" xmlns:epub="http://www.idpf.org/2007/ops" lang="{language}" xml:lang="{language}">
<head>
  <title>{title}</title>
</head>
<body>
  <nav epub:type="toc" id="id" role="doc-toc">
    <h2>{title}</h2>
    <ol>
      <li><a href="{chapter_file}">{label}</a></li>
    </ol>
  </nav>
</body>
</html>
"#,
        language = escape_xml(&metadata.language),
        title = escape_xml(&metadata.title),
        chapter_file = CHAPTER_FILE,
        label = CHAPTER_TITLE,
    )
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
