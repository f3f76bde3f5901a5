//! Body extraction from content documents.
//!
//! Parsing is lenient HTML5 (html5ever via `scraper`), so malformed markup is
//! recovered rather than rejected. Output is serialized as XHTML so the merged
//! chapter stays well-formed XML.

use ego_tree::NodeRef;
use scraper::{ElementRef, Html, Node};
use std::borrow::Cow;

/// Elements that never have content and are written self-closed.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "basefont", "bgsound", "br", "col", "embed", "frame", "hr", "img", "input",
    "keygen", "link", "meta", "param", "source", "track", "wbr",
];

/// Elements whose content is raw text; tags inside them are not markup.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "textarea", "title"];

/// Serialized content of the document's body element.
///
/// When the source has no `<body>` tag at all, it is parsed as a body-context
/// fragment: document wrappers (`html`, `head`) are dropped and everything
/// they held is serialized in source order.
pub fn extract_body(content: &[u8]) -> String {
    let decoded = decode_document(content);
    let source = if is_xml_syntax(&decoded) {
        expand_self_closing(&decoded)
    } else {
        Cow::Borrowed(decoded.as_ref())
    };

    if has_body_tag(&source) {
        let document = Html::parse_document(&source);
        let body = document
            .root_element()
            .children()
            .filter_map(ElementRef::wrap)
            .find(|element| element.value().name() == "body");
        if let Some(body) = body {
            return serialize_children(*body).trim().to_string();
        }
    }

    let fragment = Html::parse_fragment(&source);
    serialize_children(*fragment.root_element())
        .trim()
        .to_string()
}

/// Decode document bytes to text.
///
/// UTF-8 first (BOM aware), then the encoding declared in the document, then
/// Windows-1252. Never fails.
pub fn decode_document(bytes: &[u8]) -> Cow<'_, str> {
    let (text, _, malformed) = encoding_rs::UTF_8.decode(bytes);
    if !malformed {
        return text;
    }

    if let Some(encoding) = declared_encoding(bytes)
        .and_then(|label| encoding_rs::Encoding::for_label(label.as_bytes()))
    {
        let (text, _, _) = encoding.decode(bytes);
        return text;
    }

    let (text, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
    text
}

/// Encoding label from an XML declaration or a `<meta charset>` near the top.
fn declared_encoding(bytes: &[u8]) -> Option<String> {
    let head = String::from_utf8_lossy(&bytes[..bytes.len().min(1024)]).to_ascii_lowercase();

    ["encoding=", "charset="].iter().find_map(|key| {
        let start = head.find(key)? + key.len();
        let label: String = head[start..]
            .trim_start_matches(&['"', '\''][..])
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':' | '.'))
            .collect();
        if label.is_empty() {
            None
        } else {
            Some(label)
        }
    })
}

/// A tag found by [`scan_tags`].
#[derive(Debug, PartialEq, Eq)]
struct Tag<'a> {
    name: &'a str,
    /// Byte offset just past the closing `>`
    end: usize,
    closing: bool,
    self_closing: bool,
}

/// Start and end tags of `source`, in order.
///
/// Comments, declarations and the content of raw-text elements are skipped,
/// and quoted attribute values may contain `>`.
fn scan_tags(source: &str) -> Vec<Tag<'_>> {
    let bytes = source.as_bytes();
    let mut tags = Vec::new();
    let mut pos = 0;

    while let Some(offset) = source[pos..].find('<') {
        let start = pos + offset;
        let rest = &source[start..];

        if rest.starts_with("<!--") {
            match rest[4..].find("-->") {
                Some(end) => pos = start + 4 + end + 3,
                None => break,
            }
            continue;
        }
        if rest.starts_with("<!") || rest.starts_with("<?") {
            match rest.find('>') {
                Some(end) => pos = start + end + 1,
                None => break,
            }
            continue;
        }

        let closing = rest[1..].starts_with('/');
        let name_start = start + 1 + usize::from(closing);
        let name_len = bytes[name_start..]
            .iter()
            .take_while(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b':' | b'.'))
            .count();
        if name_len == 0 || !bytes[name_start].is_ascii_alphabetic() {
            pos = start + 1;
            continue;
        }

        let Some(gt) = find_tag_end(bytes, name_start + name_len) else {
            break;
        };
        let name = &source[name_start..name_start + name_len];
        let self_closing = !closing && bytes[gt - 1] == b'/';
        tags.push(Tag {
            name,
            end: gt + 1,
            closing,
            self_closing,
        });
        pos = gt + 1;

        if !closing
            && !self_closing
            && RAW_TEXT_ELEMENTS
                .iter()
                .any(|raw| raw.eq_ignore_ascii_case(name))
        {
            let needle = format!("</{}", name.to_ascii_lowercase());
            pos = source[pos..]
                .to_ascii_lowercase()
                .find(&needle)
                .map_or(source.len(), |found| pos + found);
        }
    }

    tags
}

/// Index of the `>` ending a tag, ignoring any inside quoted values.
fn find_tag_end(bytes: &[u8], from: usize) -> Option<usize> {
    let mut quote = None;
    for (i, &b) in bytes.iter().enumerate().skip(from) {
        match quote {
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None if b == b'"' || b == b'\'' => quote = Some(b),
            None if b == b'>' => return Some(i),
            None => {}
        }
    }
    None
}

// html5ever synthesizes a body for every document, so presence has to be
// decided from the source markup.
fn has_body_tag(source: &str) -> bool {
    scan_tags(source)
        .iter()
        .any(|tag| !tag.closing && tag.name.eq_ignore_ascii_case("body"))
}

/// XML declaration or XHTML namespace present.
fn is_xml_syntax(source: &str) -> bool {
    source.trim_start().starts_with("<?xml") || source.contains("http://www.w3.org/1999/xhtml")
}

/// Rewrite `<x .../>` on non-void elements as `<x ...></x>`.
///
/// The HTML5 tokenizer ignores the trailing slash outside foreign content, so
/// an XHTML `<a id="p1"/>` would otherwise swallow everything after it.
fn expand_self_closing(source: &str) -> Cow<'_, str> {
    let mut out = String::new();
    let mut last = 0;

    for tag in scan_tags(source) {
        if !tag.self_closing || VOID_ELEMENTS.iter().any(|v| v.eq_ignore_ascii_case(tag.name)) {
            continue;
        }
        // tag.end - 2 is the slash
        out.push_str(&source[last..tag.end - 2]);
        out.push_str("></");
        out.push_str(tag.name);
        out.push('>');
        last = tag.end;
    }

    if last == 0 {
        return Cow::Borrowed(source);
    }
    out.push_str(&source[last..]);
    Cow::Owned(out)
}

fn serialize_children(node: NodeRef<'_, Node>) -> String {
    let mut out = String::new();
    for child in node.children() {
        write_node(child, &mut out);
    }
    out
}

fn write_node(node: NodeRef<'_, Node>, out: &mut String) {
    match node.value() {
        Node::Element(element) => {
            let name = element.name();
            out.push('<');
            out.push_str(name);
            for (attr, value) in element.attrs() {
                out.push(' ');
                out.push_str(attr);
                out.push_str("=\"");
                out.push_str(&escape_attribute(value));
                out.push('"');
            }

            if VOID_ELEMENTS.contains(&name) {
                out.push_str("/>");
                return;
            }

            out.push('>');
            for child in node.children() {
                write_node(child, out);
            }
            out.push_str("</");
            out.push_str(name);
            out.push('>');
        }
        Node::Text(text) => out.push_str(&escape_text(text)),
        // XML declarations surface as bogus comments starting with '?'
        Node::Comment(comment) if !comment.starts_with('?') => {
            out.push_str("<!--");
            out.push_str(comment);
            out.push_str("-->");
        }
        Node::Document | Node::Fragment => {
            for child in node.children() {
                write_node(child, out);
            }
        }
        _ => {}
    }
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attribute(value: &str) -> String {
    escape_text(value).replace('"', "&quot;")
}
