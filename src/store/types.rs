//! Types for the location store
//!
//! Fixed-size records are read straight out of memory maps, so every record
//! type carries its on-disk `SIZE` and a `read_from` over a byte slice.

use serde::{Deserialize, Serialize};

/// Document index within a corpus (hex in composite ids)
pub type DocIdx = u64;

/// 0-based page index within a document
pub type PageIdx = u32;

/// Magic number for location store files
pub const STORE_MAGIC: u32 = 0x4C4D4450; // "PDML" in little-endian

/// Current version of the location store format
pub const STORE_VERSION: u32 = 1;

/// Name of the manifest file inside a store directory
pub const MANIFEST_FILE: &str = "manifest.bin";

/// Directory holding per-document location files
pub const DOCS_DIR: &str = "docs";

/// File name of the per-document location record for `doc_idx`
pub fn doc_file_name(doc_idx: DocIdx) -> String {
    format!("{:04X}.loc", doc_idx)
}

#[inline]
pub(crate) fn le_u32(buf: &[u8], at: usize) -> u32 {
    let mut b = [0u8; 4];
    b.copy_from_slice(&buf[at..at + 4]);
    u32::from_le_bytes(b)
}

#[inline]
pub(crate) fn le_u64(buf: &[u8], at: usize) -> u64 {
    let mut b = [0u8; 8];
    b.copy_from_slice(&buf[at..at + 8]);
    u64::from_le_bytes(b)
}

#[inline]
pub(crate) fn le_f32(buf: &[u8], at: usize) -> f32 {
    f32::from_bits(le_u32(buf, at))
}

/// Axis-aligned rectangle in PDF page coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub llx: f32,
    pub lly: f32,
    pub urx: f32,
    pub ury: f32,
}

impl Rect {
    pub fn new(llx: f32, lly: f32, urx: f32, ury: f32) -> Self {
        Self { llx, lly, urx, ury }
    }

    /// Smallest rectangle containing both `self` and `other`
    pub fn union(&self, other: &Rect) -> Rect {
        Rect {
            llx: self.llx.min(other.llx),
            lly: self.lly.min(other.lly),
            urx: self.urx.max(other.urx),
            ury: self.ury.max(other.ury),
        }
    }
}

impl std::fmt::Display for Rect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{:.1} {:.1} {:.1} {:.1}]",
            self.llx, self.lly, self.urx, self.ury
        )
    }
}

/// A byte range of extracted page text and where it sits on the page
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextLocation {
    /// Start offset in the page text (inclusive)
    pub start: u32,
    /// End offset in the page text (exclusive)
    pub end: u32,
    pub rect: Rect,
}

impl TextLocation {
    pub const SIZE: usize = 4 + 4 + 4 * 4; // 24 bytes

    pub fn new(start: u32, end: u32, rect: Rect) -> Self {
        Self { start, end, rect }
    }

    pub(crate) fn read_from(buf: &[u8]) -> Self {
        Self {
            start: le_u32(buf, 0),
            end: le_u32(buf, 4),
            rect: Rect {
                llx: le_f32(buf, 8),
                lly: le_f32(buf, 12),
                urx: le_f32(buf, 16),
                ury: le_f32(buf, 20),
            },
        }
    }

    pub(crate) fn write_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.start.to_le_bytes());
        out.extend_from_slice(&self.end.to_le_bytes());
        out.extend_from_slice(&self.rect.llx.to_le_bytes());
        out.extend_from_slice(&self.rect.lly.to_le_bytes());
        out.extend_from_slice(&self.rect.urx.to_le_bytes());
        out.extend_from_slice(&self.rect.ury.to_le_bytes());
    }
}

/// Header for manifest.bin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManifestHeader {
    pub magic: u32,
    pub version: u32,
    pub file_count: u32,
    pub page_count: u32,
    pub tag_count: u32,
    pub entry_count: u32,
    /// Stride of one entry; may exceed `ManifestEntry::SIZE` in newer files
    pub entry_size: u32,
    pub path_count: u32,
}

impl ManifestHeader {
    pub const SIZE: usize = 8 * 4; // 32 bytes

    /// Byte offset of `file_count` (patched in place)
    pub const FILE_COUNT_AT: usize = 8;
    /// Byte offset of `page_count` (patched in place)
    pub const PAGE_COUNT_AT: usize = 12;

    pub(crate) fn read_from(buf: &[u8]) -> Self {
        Self {
            magic: le_u32(buf, 0),
            version: le_u32(buf, 4),
            file_count: le_u32(buf, 8),
            page_count: le_u32(buf, 12),
            tag_count: le_u32(buf, 16),
            entry_count: le_u32(buf, 20),
            entry_size: le_u32(buf, 24),
            path_count: le_u32(buf, 28),
        }
    }
}

/// Document flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DocFlags(pub u32);

impl DocFlags {
    pub const NONE: u32 = 0;
    /// The PDF could not be fully extracted; some pages may lack text
    pub const PARTIAL: u32 = 1 << 0;
    /// The PDF was encrypted and text came from a decrypted copy
    pub const ENCRYPTED: u32 = 1 << 1;

    pub fn is_partial(&self) -> bool {
        self.0 & Self::PARTIAL != 0
    }

    pub fn is_encrypted(&self) -> bool {
        self.0 & Self::ENCRYPTED != 0
    }
}

/// Manifest entry: one per indexed document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManifestEntry {
    /// Content hash of the source PDF
    pub hash: [u8; 32],
    /// Index into the manifest path table
    pub path_index: u32,
    /// Document descriptor
    pub doc: DocDescriptor,
}

/// What the manifest knows about a document without opening its location file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DocDescriptor {
    pub page_count: u32,
    /// Corpus-wide ordinal of this document's first page
    pub first_page: u32,
    pub flags: DocFlags,
}

impl ManifestEntry {
    pub const SIZE: usize = 32 + 4 + 4 + 4 + 4; // 48 bytes

    pub(crate) fn read_from(buf: &[u8]) -> Self {
        let mut hash = [0u8; 32];
        hash.copy_from_slice(&buf[0..32]);
        Self {
            hash,
            path_index: le_u32(buf, 32),
            doc: DocDescriptor {
                page_count: le_u32(buf, 36),
                first_page: le_u32(buf, 40),
                flags: DocFlags(le_u32(buf, 44)),
            },
        }
    }

    pub(crate) fn write_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.hash);
        out.extend_from_slice(&self.path_index.to_le_bytes());
        out.extend_from_slice(&self.doc.page_count.to_le_bytes());
        out.extend_from_slice(&self.doc.first_page.to_le_bytes());
        out.extend_from_slice(&self.doc.flags.0.to_le_bytes());
    }

    /// Lowercase hex rendering of the content hash
    pub fn hash_hex(&self) -> String {
        self.hash.iter().map(|b| format!("{:02x}", b)).collect()
    }
}

/// Header for a per-document location file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocHeader {
    pub magic: u32,
    pub version: u32,
    pub page_count: u32,
    /// Stride of one page record
    pub record_size: u32,
}

impl DocHeader {
    pub const SIZE: usize = 4 * 4; // 16 bytes

    pub(crate) fn read_from(buf: &[u8]) -> Self {
        Self {
            magic: le_u32(buf, 0),
            version: le_u32(buf, 4),
            page_count: le_u32(buf, 8),
            record_size: le_u32(buf, 12),
        }
    }
}

/// Per-page record in a document location file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRecord {
    /// 1-based page number in the source PDF
    pub page_number: u32,
    pub text_len: u32,
    /// Absolute offset of the page text within the file
    pub text_offset: u64,
    /// Absolute offset of the first location entry within the file
    pub loc_offset: u64,
    pub loc_count: u32,
}

impl PageRecord {
    pub const SIZE: usize = 4 + 4 + 8 + 8 + 4 + 4; // 32 bytes

    pub(crate) fn read_from(buf: &[u8]) -> Self {
        Self {
            page_number: le_u32(buf, 0),
            text_len: le_u32(buf, 4),
            text_offset: le_u64(buf, 8),
            loc_offset: le_u64(buf, 16),
            loc_count: le_u32(buf, 24),
        }
    }

    pub(crate) fn write_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.page_number.to_le_bytes());
        out.extend_from_slice(&self.text_len.to_le_bytes());
        out.extend_from_slice(&self.text_offset.to_le_bytes());
        out.extend_from_slice(&self.loc_offset.to_le_bytes());
        out.extend_from_slice(&self.loc_count.to_le_bytes());
        out.extend_from_slice(&0u32.to_le_bytes()); // reserved
    }
}

/// Extracted content of one PDF page, as handed over by the build pipeline
#[derive(Debug, Clone, Default)]
pub struct PageContent {
    /// 1-based page number in the source PDF
    pub page_number: u32,
    pub text: String,
    pub locations: Vec<TextLocation>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_union() {
        let a = Rect::new(10.0, 10.0, 20.0, 20.0);
        let b = Rect::new(15.0, 5.0, 30.0, 18.0);
        assert_eq!(a.union(&b), Rect::new(10.0, 5.0, 30.0, 20.0));
    }

    #[test]
    fn test_record_sizes_match_encoders() {
        let mut buf = Vec::new();
        TextLocation::new(1, 2, Rect::default()).write_to(&mut buf);
        assert_eq!(buf.len(), TextLocation::SIZE);

        buf.clear();
        let entry = ManifestEntry {
            hash: [7; 32],
            path_index: 3,
            doc: DocDescriptor {
                page_count: 2,
                first_page: 5,
                flags: DocFlags(DocFlags::PARTIAL),
            },
        };
        entry.write_to(&mut buf);
        assert_eq!(buf.len(), ManifestEntry::SIZE);
        assert_eq!(ManifestEntry::read_from(&buf), entry);

        buf.clear();
        let record = PageRecord {
            page_number: 1,
            text_len: 10,
            text_offset: 48,
            loc_offset: 58,
            loc_count: 2,
        };
        record.write_to(&mut buf);
        assert_eq!(buf.len(), PageRecord::SIZE);
        assert_eq!(PageRecord::read_from(&buf), record);
    }

    #[test]
    fn test_doc_file_name_is_padded_hex() {
        assert_eq!(doc_file_name(0), "0000.loc");
        assert_eq!(doc_file_name(0x1AB), "01AB.loc");
        assert_eq!(doc_file_name(0x12345), "12345.loc");
    }
}
