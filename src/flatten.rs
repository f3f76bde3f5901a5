use crate::markup;
use crate::reader::{ItemKind, PackageItem};
use std::fmt;
use tracing::info;

/// Marker placed between the bodies of consecutive documents.
pub const SEPARATOR: &str = "\n<hr/>\n";

const SKELETON_OPEN: &str = "<html><head><title>Flattened EPUB</title></head><body>";
const SKELETON_CLOSE: &str = "</body></html>";

/// Only reading content contributes to the flattened output.
pub fn is_primary_document(item: &PackageItem) -> bool {
    item.kind == ItemKind::Document
}

/// Body markup of every primary document, in package order.
pub fn collect_fragments(items: &[PackageItem]) -> Vec<String> {
    items
        .iter()
        .filter(|item| is_primary_document(item))
        .map(|item| {
            info!("Processing: {}", item.file_name);
            markup::extract_body(&item.content)
        })
        .collect()
}

/// All fragments merged into one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlattenedDocument {
    body: String,
}

impl FlattenedDocument {
    /// Returns `None` when there is nothing to flatten.
    pub fn from_fragments(fragments: &[String]) -> Option<Self> {
        if fragments.is_empty() {
            return None;
        }

        Some(Self {
            body: fragments.join(SEPARATOR),
        })
    }

    /// The joined fragments, without the surrounding skeleton.
    pub fn body(&self) -> &str {
        &self.body
    }
}

/// Renders the full document: the fixed skeleton around the joined fragments.
impl fmt::Display for FlattenedDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", SKELETON_OPEN, self.body, SKELETON_CLOSE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn item(file_name: &str, kind: ItemKind, content: &str) -> PackageItem {
        PackageItem {
            file_name: file_name.to_string(),
            kind,
            content: content.as_bytes().to_vec(),
        }
    }

    #[test]
    fn test_separator_exactness() {
        let fragments = vec!["<p>A</p>".to_string(), "<p>B</p>".to_string()];
        let doc = FlattenedDocument::from_fragments(&fragments).unwrap();

        assert_eq!(doc.body(), "<p>A</p>\n<hr/>\n<p>B</p>");
        assert_eq!(
            doc.to_string(),
            "<html><head><title>Flattened EPUB</title></head><body><p>A</p>\n<hr/>\n<p>B</p></body></html>"
        );
    }

    #[test]
    fn test_single_fragment_has_no_separator() {
        let doc = FlattenedDocument::from_fragments(&["<p>only</p>".to_string()]).unwrap();
        assert_eq!(doc.body(), "<p>only</p>");
    }

    #[test]
    fn test_empty_fragments() {
        assert!(FlattenedDocument::from_fragments(&[]).is_none());
    }

    #[test]
    fn test_non_documents_never_contribute() {
        let items = vec![
            item("style.css", ItemKind::Stylesheet, "body { color: red }"),
            item("one.xhtml", ItemKind::Document, "<body><p>1</p></body>"),
            item("cover.jpg", ItemKind::Image, "<body><p>not html</p></body>"),
            item("toc.ncx", ItemKind::Navigation, "<ncx/>"),
            item("two.xhtml", ItemKind::Document, "<body><p>2</p></body>"),
            item("font.otf", ItemKind::Font, ""),
        ];

        assert_eq!(collect_fragments(&items), vec!["<p>1</p>", "<p>2</p>"]);
    }

    #[test]
    fn test_only_non_documents_yields_nothing() {
        let items = vec![
            item("style.css", ItemKind::Stylesheet, "p {}"),
            item("cover.png", ItemKind::Image, ""),
        ];

        let fragments = collect_fragments(&items);
        assert!(fragments.is_empty());
        assert!(FlattenedDocument::from_fragments(&fragments).is_none());
    }

    proptest! {
        #[test]
        fn prop_fragments_keep_package_order(words in prop::collection::vec("[a-z]{1,8}", 1..8)) {
            let items: Vec<_> = words
                .iter()
                .enumerate()
                .map(|(i, word)| {
                    item(&format!("{i}.xhtml"), ItemKind::Document, &format!("<body><p>{word}</p></body>"))
                })
                .collect();

            let expected: Vec<_> = words.iter().map(|word| format!("<p>{word}</p>")).collect();
            let fragments = collect_fragments(&items);
            prop_assert_eq!(&fragments, &expected);

            let doc = FlattenedDocument::from_fragments(&fragments).unwrap();
            prop_assert_eq!(doc.body().split(SEPARATOR).collect::<Vec<_>>(), expected);
        }
    }
}
