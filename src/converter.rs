use crate::cli::Cli;
use crate::epub_reader::EpubData;
use crate::epub_writer;
use crate::flatten::{self, FlattenedDocument};
use crate::metadata::PackageMetadata;
use crate::reader::BookReader;
use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// How a run ended
#[derive(Debug, PartialEq, Eq)]
pub enum Outcome {
    Written(PathBuf),
    /// The input had no content documents; no output was produced
    NothingToFlatten,
}

pub fn convert(cli: &Cli) -> Result<Outcome> {
    let epub = EpubData::open(&cli.input)?;
    flatten_book(&epub, &cli.metadata(), &cli.output)
}

/// Read, extract, flatten and repackage one book.
pub fn flatten_book(
    reader: &dyn BookReader,
    metadata: &PackageMetadata,
    output_path: &Path,
) -> Result<Outcome> {
    let items = reader.items()?;
    let fragments = flatten::collect_fragments(&items);

    let Some(document) = FlattenedDocument::from_fragments(&fragments) else {
        warn!("No content was found to flatten.");
        return Ok(Outcome::NothingToFlatten);
    };

    info!(
        "Merged {} documents out of {} package items",
        fragments.len(),
        items.len()
    );
    epub_writer::write_epub(&document, metadata, output_path)?;

    Ok(Outcome::Written(output_path.to_path_buf()))
}
