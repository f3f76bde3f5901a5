use crate::reader::{BookReader, ItemKind, PackageItem};
use anyhow::{Context, Result};
use rbook::prelude::*;
use rbook::Epub;
use std::path::Path;

pub struct EpubData {
    epub: Epub,
}

impl EpubData {
    pub fn open(path: &Path) -> Result<Self> {
        let epub = Epub::options()
            .strict(false)
            .open(path)
            .with_context(|| format!("Failed to open EPUB: {}", path.display()))?;
        Ok(Self { epub })
    }
}

impl BookReader for EpubData {
    fn items(&self) -> Result<Vec<PackageItem>> {
        let mut items = Vec::new();

        for entry in self.epub.manifest().entries() {
            let file_name = entry
                .resource()
                .key()
                .value()
                .unwrap_or("unknown")
                .to_string();
            let kind = ItemKind::from_media_type(entry.media_type());

            let content = entry
                .read_bytes()
                .with_context(|| format!("Failed to read item: {}", file_name))?;

            items.push(PackageItem {
                file_name,
                kind,
                content,
            });
        }

        Ok(items)
    }
}
