pub const DEFAULT_IDENTIFIER: &str = "id123456";
pub const DEFAULT_TITLE: &str = "Flattened Book";
pub const DEFAULT_LANGUAGE: &str = "en";
pub const DEFAULT_AUTHOR: &str = "Unknown";

/// Metadata stamped onto the output package.
///
/// Never derived from the input book; the defaults are fixed literals and
/// every field can be overridden from the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageMetadata {
    pub identifier: String,
    pub title: String,
    pub language: String,
    pub author: String,
}

impl Default for PackageMetadata {
    fn default() -> Self {
        Self {
            identifier: DEFAULT_IDENTIFIER.to_string(),
            title: DEFAULT_TITLE.to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
            author: DEFAULT_AUTHOR.to_string(),
        }
    }
}

impl PackageMetadata {
    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = identifier.into();
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }
}
