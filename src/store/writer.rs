//! Location store writer
//!
//! Writes the manifest and per-document location files in the layout the
//! [`LocationStore`](super::LocationStore) maps and reads.

use super::types::*;
use anyhow::{Context, Result};
use rustc_hash::FxHashMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

struct PendingDocument {
    path_index: u32,
    hash: [u8; 32],
    flags: DocFlags,
    pages: Vec<PageContent>,
}

/// Accumulates extracted documents and persists them as a location store
pub struct LocationStoreWriter {
    store_path: PathBuf,
    documents: Vec<PendingDocument>,
    path_to_id: FxHashMap<String, u32>,
    paths: Vec<String>,
    tags: Vec<i8>,
}

impl LocationStoreWriter {
    pub fn new(store_path: &Path) -> Self {
        Self {
            store_path: store_path.to_path_buf(),
            documents: Vec::new(),
            path_to_id: FxHashMap::default(),
            paths: Vec::new(),
            tags: Vec::new(),
        }
    }

    /// Add a document and return its document index
    pub fn add_document(&mut self, path: &str, hash: [u8; 32], pages: Vec<PageContent>) -> DocIdx {
        self.add_document_with_flags(path, hash, pages, DocFlags::default())
    }

    pub fn add_document_with_flags(
        &mut self,
        path: &str,
        hash: [u8; 32],
        pages: Vec<PageContent>,
        flags: DocFlags,
    ) -> DocIdx {
        let doc_idx = self.documents.len() as DocIdx;
        let path_index = self.add_path(path);
        self.documents.push(PendingDocument {
            path_index,
            hash,
            flags,
            pages,
        });
        doc_idx
    }

    /// Set the per-entry tag vector stored verbatim in the manifest
    pub fn set_tags(&mut self, tags: Vec<i8>) {
        self.tags = tags;
    }

    /// Get or create path ID
    fn add_path(&mut self, path: &str) -> u32 {
        if let Some(&id) = self.path_to_id.get(path) {
            return id;
        }

        let id = self.paths.len() as u32;
        self.paths.push(path.to_string());
        self.path_to_id.insert(path.to_string(), id);
        id
    }

    pub fn doc_count(&self) -> usize {
        self.documents.len()
    }

    /// Write the store to disk
    pub fn write(&self) -> Result<()> {
        let docs_path = self.store_path.join(DOCS_DIR);
        fs::create_dir_all(&docs_path)
            .with_context(|| format!("Failed to create {}", docs_path.display()))?;

        for (doc_idx, doc) in self.documents.iter().enumerate() {
            let path = docs_path.join(doc_file_name(doc_idx as DocIdx));
            write_doc_file(&path, &doc.pages)
                .with_context(|| format!("Failed to write {}", path.display()))?;
        }

        self.write_manifest()
            .context("Failed to write manifest.bin")?;

        tracing::debug!(
            store = %self.store_path.display(),
            documents = self.documents.len(),
            "wrote location store"
        );
        Ok(())
    }

    fn write_manifest(&self) -> Result<()> {
        let path = self.store_path.join(MANIFEST_FILE);
        let mut file = BufWriter::new(File::create(&path)?);

        let page_count: u32 = self.documents.iter().map(|d| d.pages.len() as u32).sum();

        // Header
        file.write_all(&STORE_MAGIC.to_le_bytes())?;
        file.write_all(&STORE_VERSION.to_le_bytes())?;
        file.write_all(&(self.documents.len() as u32).to_le_bytes())?;
        file.write_all(&page_count.to_le_bytes())?;
        file.write_all(&(self.tags.len() as u32).to_le_bytes())?;
        file.write_all(&(self.documents.len() as u32).to_le_bytes())?;
        file.write_all(&(ManifestEntry::SIZE as u32).to_le_bytes())?;
        file.write_all(&(self.paths.len() as u32).to_le_bytes())?;

        // Tags
        let tag_bytes: Vec<u8> = self.tags.iter().map(|&t| t as u8).collect();
        file.write_all(&tag_bytes)?;

        // Entries
        let mut entries = Vec::with_capacity(self.documents.len() * ManifestEntry::SIZE);
        let mut first_page = 0u32;
        for doc in &self.documents {
            let entry = ManifestEntry {
                hash: doc.hash,
                path_index: doc.path_index,
                doc: DocDescriptor {
                    page_count: doc.pages.len() as u32,
                    first_page,
                    flags: doc.flags,
                },
            };
            entry.write_to(&mut entries);
            first_page += doc.pages.len() as u32;
        }
        file.write_all(&entries)?;

        // Paths: (count + 1) offsets into the blob that follows
        let mut offset = 0u64;
        for p in &self.paths {
            file.write_all(&offset.to_le_bytes())?;
            offset += p.len() as u64;
        }
        file.write_all(&offset.to_le_bytes())?;
        for p in &self.paths {
            file.write_all(p.as_bytes())?;
        }

        file.flush()?;
        Ok(())
    }
}

/// Write one document's pages: header, page records, text blob, location blob
fn write_doc_file(path: &Path, pages: &[PageContent]) -> Result<()> {
    let mut file = BufWriter::with_capacity(65536, File::create(path)?);

    let records_end = (DocHeader::SIZE + pages.len() * PageRecord::SIZE) as u64;
    let text_total: u64 = pages.iter().map(|p| p.text.len() as u64).sum();

    let mut text_offset = records_end;
    let mut loc_offset = records_end + text_total;

    file.write_all(&STORE_MAGIC.to_le_bytes())?;
    file.write_all(&STORE_VERSION.to_le_bytes())?;
    file.write_all(&(pages.len() as u32).to_le_bytes())?;
    file.write_all(&(PageRecord::SIZE as u32).to_le_bytes())?;

    let mut records = Vec::with_capacity(pages.len() * PageRecord::SIZE);
    for page in pages {
        let record = PageRecord {
            page_number: page.page_number,
            text_len: page.text.len() as u32,
            text_offset,
            loc_offset,
            loc_count: page.locations.len() as u32,
        };
        record.write_to(&mut records);
        text_offset += page.text.len() as u64;
        loc_offset += (page.locations.len() * TextLocation::SIZE) as u64;
    }
    file.write_all(&records)?;

    for page in pages {
        file.write_all(page.text.as_bytes())?;
    }

    let mut buffer = Vec::with_capacity(8 * 1024);
    for page in pages {
        for loc in &page.locations {
            loc.write_to(&mut buffer);
            if buffer.len() >= 8 * 1024 {
                file.write_all(&buffer)?;
                buffer.clear();
            }
        }
    }
    if !buffer.is_empty() {
        file.write_all(&buffer)?;
    }

    file.flush()?;
    Ok(())
}
