//! Location store reader
//!
//! Memory-maps the manifest and, on first use, each document's location file.
//! Every vector element (manifest entry, path, page record, location) is read
//! in O(1) from its fixed offset without decoding the rest of the record.

use super::types::*;
use crate::error::StoreError;
use memmap2::{Mmap, MmapMut};
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn check_len(file: &str, buf: &[u8], needed: usize) -> Result<(), StoreError> {
    if buf.len() < needed {
        return Err(StoreError::Truncated {
            file: file.to_string(),
            needed,
            available: buf.len(),
        });
    }
    Ok(())
}

fn check_magic(file: &str, magic: u32, version: u32) -> Result<(), StoreError> {
    if magic != STORE_MAGIC {
        return Err(StoreError::BadMagic {
            file: file.to_string(),
        });
    }
    if version != STORE_VERSION {
        return Err(StoreError::UnsupportedVersion {
            file: file.to_string(),
            version,
        });
    }
    Ok(())
}

/// Memory-mapped corpus manifest
pub struct Manifest {
    mmap: Mmap,
    header: ManifestHeader,
    entries_at: usize,
    paths_at: usize,
    blob_at: usize,
}

impl Manifest {
    /// Open and validate manifest.bin
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let label = file_label(path);
        let file = File::open(path)?;
        let mmap = unsafe { Mmap::map(&file)? };

        check_len(&label, &mmap, ManifestHeader::SIZE)?;
        let header = ManifestHeader::read_from(&mmap);
        check_magic(&label, header.magic, header.version)?;

        if (header.entry_size as usize) < ManifestEntry::SIZE {
            return Err(StoreError::Truncated {
                file: label,
                needed: ManifestEntry::SIZE,
                available: header.entry_size as usize,
            });
        }

        let entries_at = ManifestHeader::SIZE + header.tag_count as usize;
        let paths_at = entries_at + header.entry_count as usize * header.entry_size as usize;
        let blob_at = paths_at + (header.path_count as usize + 1) * 8;
        check_len(&label, &mmap, blob_at)?;

        let blob_len = le_u64(&mmap, blob_at - 8);
        let blob_end = usize::try_from(blob_len)
            .ok()
            .and_then(|len| blob_at.checked_add(len))
            .ok_or_else(|| StoreError::Truncated {
                file: label.clone(),
                needed: usize::MAX,
                available: mmap.len(),
            })?;
        check_len(&label, &mmap, blob_end)?;

        Ok(Self {
            mmap,
            header,
            entries_at,
            paths_at,
            blob_at,
        })
    }

    pub fn file_count(&self) -> u32 {
        self.header.file_count
    }

    pub fn page_count(&self) -> u32 {
        self.header.page_count
    }

    pub fn tag_count(&self) -> usize {
        self.header.tag_count as usize
    }

    /// Get the `j`th tag
    pub fn tag(&self, j: usize) -> Option<i8> {
        if j >= self.tag_count() {
            return None;
        }
        Some(self.mmap[ManifestHeader::SIZE + j] as i8)
    }

    pub fn entry_count(&self) -> usize {
        self.header.entry_count as usize
    }

    /// Get the `j`th manifest entry
    pub fn entry(&self, j: usize) -> Option<ManifestEntry> {
        if j >= self.entry_count() {
            return None;
        }
        let at = self.entries_at + j * self.header.entry_size as usize;
        Some(ManifestEntry::read_from(&self.mmap[at..at + ManifestEntry::SIZE]))
    }

    pub fn path_count(&self) -> usize {
        self.header.path_count as usize
    }

    /// Get the path stored at `path_index`
    pub fn path(&self, path_index: u32) -> Option<&str> {
        let i = path_index as usize;
        if i >= self.path_count() {
            return None;
        }
        let start = le_u64(&self.mmap, self.paths_at + i * 8) as usize;
        let end = le_u64(&self.mmap, self.paths_at + (i + 1) * 8) as usize;
        if start > end {
            return None;
        }
        self.mmap
            .get(self.blob_at.checked_add(start)?..self.blob_at.checked_add(end)?)
            .and_then(|b| std::str::from_utf8(b).ok())
    }

    /// Overwrite the file and page counters of the manifest at `path` in place
    pub fn set_counts(path: &Path, file_count: u32, page_count: u32) -> Result<(), StoreError> {
        let label = file_label(path);
        let file = OpenOptions::new().read(true).write(true).open(path)?;
        let mut mmap = unsafe { MmapMut::map_mut(&file)? };

        check_len(&label, &mmap, ManifestHeader::SIZE)?;
        let header = ManifestHeader::read_from(&mmap);
        check_magic(&label, header.magic, header.version)?;

        let at = ManifestHeader::FILE_COUNT_AT;
        mmap[at..at + 4].copy_from_slice(&file_count.to_le_bytes());
        let at = ManifestHeader::PAGE_COUNT_AT;
        mmap[at..at + 4].copy_from_slice(&page_count.to_le_bytes());
        mmap.flush()?;
        Ok(())
    }
}

/// Ordered (byte range, rectangle) entries covering one page's text
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundingBoxTable {
    entries: Vec<TextLocation>,
}

impl BoundingBoxTable {
    pub fn new(mut entries: Vec<TextLocation>) -> Self {
        entries.sort_by_key(|e| e.start);
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, n: usize) -> Option<&TextLocation> {
        self.entries.get(n)
    }

    pub fn entries(&self) -> &[TextLocation] {
        &self.entries
    }

    /// Bounding box of the text in `[start, end)`
    ///
    /// Returns the union of the rectangles of every entry that overlaps the
    /// range, or `None` when no entry does. An empty range selects the entry
    /// containing `start`.
    pub fn rectangle_for(&self, start: u32, end: u32) -> Option<Rect> {
        let end = end.max(start.saturating_add(1));
        let upto = self.entries.partition_point(|e| e.start < end);
        self.entries[..upto]
            .iter()
            .filter(|e| e.end > start)
            .map(|e| e.rect)
            .reduce(|acc, r| acc.union(&r))
    }
}

/// Memory-mapped location file of a single document
pub struct DocLocations {
    label: String,
    mmap: Mmap,
    header: DocHeader,
}

impl DocLocations {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let label = file_label(path);
        let file = File::open(path)?;
        let mmap = unsafe { Mmap::map(&file)? };

        check_len(&label, &mmap, DocHeader::SIZE)?;
        let header = DocHeader::read_from(&mmap);
        check_magic(&label, header.magic, header.version)?;

        if (header.record_size as usize) < PageRecord::SIZE {
            return Err(StoreError::Truncated {
                file: label,
                needed: PageRecord::SIZE,
                available: header.record_size as usize,
            });
        }
        let records_end =
            DocHeader::SIZE + header.page_count as usize * header.record_size as usize;
        check_len(&label, &mmap, records_end)?;

        Ok(Self {
            label,
            mmap,
            header,
        })
    }

    pub fn page_count(&self) -> usize {
        self.header.page_count as usize
    }

    /// Get the page record at `page_idx`
    pub fn page(&self, doc_idx: DocIdx, page_idx: PageIdx) -> Result<PageRecord, StoreError> {
        let i = page_idx as usize;
        if i >= self.page_count() {
            return Err(StoreError::PageOutOfRange {
                doc_idx,
                page_idx,
                count: self.page_count(),
            });
        }
        let at = DocHeader::SIZE + i * self.header.record_size as usize;
        Ok(PageRecord::read_from(&self.mmap[at..at + PageRecord::SIZE]))
    }

    fn slice(&self, offset: u64, len: usize) -> Result<&[u8], StoreError> {
        let start = offset as usize;
        start
            .checked_add(len)
            .and_then(|end| self.mmap.get(start..end))
            .ok_or_else(|| StoreError::Truncated {
                file: self.label.clone(),
                needed: start.saturating_add(len),
                available: self.mmap.len(),
            })
    }

    /// Extracted text of a page
    pub fn text(&self, record: &PageRecord) -> Result<&str, StoreError> {
        let bytes = self.slice(record.text_offset, record.text_len as usize)?;
        std::str::from_utf8(bytes).map_err(|_| StoreError::InvalidText {
            file: self.label.clone(),
        })
    }

    /// Get the `n`th location entry of a page
    pub fn location(&self, record: &PageRecord, n: usize) -> Option<TextLocation> {
        if n >= record.loc_count as usize {
            return None;
        }
        let at = record
            .loc_offset
            .checked_add((n * TextLocation::SIZE) as u64)?;
        self.slice(at, TextLocation::SIZE)
            .ok()
            .map(TextLocation::read_from)
    }

    /// Decode a page's bounding-box table
    pub fn table(&self, record: &PageRecord) -> Result<BoundingBoxTable, StoreError> {
        let len = record.loc_count as usize * TextLocation::SIZE;
        let bytes = self.slice(record.loc_offset, len)?;
        let entries = bytes
            .chunks_exact(TextLocation::SIZE)
            .map(TextLocation::read_from)
            .collect();
        Ok(BoundingBoxTable::new(entries))
    }
}

/// A page resolved through the location store
#[derive(Debug, Clone)]
pub struct ResolvedPage {
    pub path: String,
    /// 1-based page number in the source PDF
    pub page_number: u32,
    pub table: Arc<BoundingBoxTable>,
}

/// Read-only view of a persisted location store
pub struct LocationStore {
    root_path: PathBuf,
    manifest: Manifest,
    /// Lazily opened document files, indexed by document index
    docs: Vec<OnceLock<DocLocations>>,
}

impl LocationStore {
    /// Open the location store in `root_path`
    pub fn open(root_path: &Path) -> Result<Self, StoreError> {
        let manifest = Manifest::open(&root_path.join(MANIFEST_FILE))?;
        let docs = (0..manifest.entry_count()).map(|_| OnceLock::new()).collect();

        tracing::debug!(
            store = %root_path.display(),
            files = manifest.file_count(),
            pages = manifest.page_count(),
            "opened location store"
        );

        Ok(Self {
            root_path: root_path.to_path_buf(),
            manifest,
            docs,
        })
    }

    pub fn root_path(&self) -> &Path {
        &self.root_path
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// Number of indexed pages in the corpus
    pub fn page_count(&self) -> u32 {
        self.manifest.page_count()
    }

    pub fn doc_count(&self) -> usize {
        self.docs.len()
    }

    /// Get the document file, opening it on first access
    fn doc(&self, doc_idx: DocIdx) -> Result<&DocLocations, StoreError> {
        let slot = usize::try_from(doc_idx)
            .ok()
            .and_then(|i| self.docs.get(i))
            .ok_or(StoreError::DocumentOutOfRange {
                doc_idx,
                count: self.docs.len(),
            })?;

        if let Some(doc) = slot.get() {
            return Ok(doc);
        }
        let path = self.root_path.join(DOCS_DIR).join(doc_file_name(doc_idx));
        let opened = DocLocations::open(&path)?;
        Ok(slot.get_or_init(|| opened))
    }

    fn entry(&self, doc_idx: DocIdx) -> Result<ManifestEntry, StoreError> {
        usize::try_from(doc_idx)
            .ok()
            .and_then(|i| self.manifest.entry(i))
            .ok_or(StoreError::DocumentOutOfRange {
                doc_idx,
                count: self.docs.len(),
            })
    }

    /// Source path of a document
    pub fn path(&self, doc_idx: DocIdx) -> Result<&str, StoreError> {
        let entry = self.entry(doc_idx)?;
        self.manifest
            .path(entry.path_index)
            .ok_or_else(|| StoreError::Truncated {
                file: MANIFEST_FILE.to_string(),
                needed: entry.path_index as usize + 1,
                available: self.manifest.path_count(),
            })
    }

    /// Resolve a page to its source path, page number and bounding-box table
    pub fn resolve(&self, doc_idx: DocIdx, page_idx: PageIdx) -> Result<ResolvedPage, StoreError> {
        let path = self.path(doc_idx)?.to_string();
        let doc = self.doc(doc_idx)?;
        let record = doc.page(doc_idx, page_idx)?;
        let table = doc.table(&record)?;

        Ok(ResolvedPage {
            path,
            page_number: record.page_number,
            table: Arc::new(table),
        })
    }

    /// Extracted text of a page
    pub fn page_text(&self, doc_idx: DocIdx, page_idx: PageIdx) -> Result<&str, StoreError> {
        let doc = self.doc(doc_idx)?;
        let record = doc.page(doc_idx, page_idx)?;
        doc.text(&record)
    }
}
