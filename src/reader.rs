use anyhow::Result;

/// Classification of a package item, derived from its manifest media type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    Document,
    Stylesheet,
    Image,
    Font,
    /// Legacy NCX navigation index
    Navigation,
    Script,
    /// Audio and video
    Media,
    Other,
}

impl ItemKind {
    pub fn from_media_type(media_type: &str) -> Self {
        let essence = media_type
            .split(';')
            .next()
            .unwrap_or("")
            .trim()
            .to_ascii_lowercase();

        match essence.as_str() {
            "application/xhtml+xml" | "text/html" => ItemKind::Document,
            "text/css" => ItemKind::Stylesheet,
            "application/x-dtbncx+xml" => ItemKind::Navigation,
            "application/vnd.ms-opentype" => ItemKind::Font,
            m if m.starts_with("image/") => ItemKind::Image,
            m if m.starts_with("font/")
                || m.starts_with("application/font-")
                || m.starts_with("application/x-font-") =>
            {
                ItemKind::Font
            }
            m if m.contains("javascript") || m.contains("ecmascript") => ItemKind::Script,
            m if m.starts_with("audio/") || m.starts_with("video/") => ItemKind::Media,
            _ => ItemKind::Other,
        }
    }
}

/// One entry of the source package
#[derive(Debug, Clone)]
pub struct PackageItem {
    /// Path of the item within the archive
    pub file_name: String,
    pub kind: ItemKind,
    pub content: Vec<u8>,
}

/// Trait for reading the items of a packaged book
pub trait BookReader {
    /// All package items, in manifest order
    fn items(&self) -> Result<Vec<PackageItem>>;
}
