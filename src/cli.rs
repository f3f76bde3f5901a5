use crate::metadata::PackageMetadata;
use clap::Parser;
use std::path::PathBuf;

/// Merge every content document of an EPUB into a single-chapter EPUB
#[derive(Parser, Debug)]
#[command(name = "epub-flatten", version, about)]
pub struct Cli {
    /// Path to the input EPUB file
    pub input: PathBuf,

    /// Path of the flattened EPUB to write
    pub output: PathBuf,

    /// Identifier written to the output package
    #[arg(long)]
    pub identifier: Option<String>,

    /// Title written to the output package
    #[arg(long)]
    pub title: Option<String>,

    /// Language tag written to the output package and its chapter
    #[arg(long)]
    pub language: Option<String>,

    /// Author written to the output package
    #[arg(long)]
    pub author: Option<String>,
}

impl Cli {
    /// Package metadata with any command-line overrides applied.
    pub fn metadata(&self) -> PackageMetadata {
        let mut metadata = PackageMetadata::default();
        if let Some(ref identifier) = self.identifier {
            metadata = metadata.with_identifier(identifier);
        }
        if let Some(ref title) = self.title {
            metadata = metadata.with_title(title);
        }
        if let Some(ref language) = self.language {
            metadata = metadata.with_language(language);
        }
        if let Some(ref author) = self.author {
            metadata = metadata.with_author(author);
        }
        metadata
    }
}
