//! Location store
//!
//! Persisted, randomly-accessible tables that map a document/page pair to its
//! source path, extracted page text and bounding-box table. Built once by the
//! extraction pipeline and read-only while searching.
//!
//! ## Architecture
//!
//! - `types`: On-disk record definitions
//! - `writer`: Persists extracted documents
//! - `reader`: Memory-mapped random access
//!
//! ## File Format
//!
//! - `manifest.bin`: file/page counters, tag vector, fixed-stride entries
//!   (hash, path index, document descriptor) and an offset-indexed path table
//! - `docs/<DOC>.loc`: page records followed by the page text blob and the
//!   (byte range, rectangle) location entries of every page
//!
//! All integers are little-endian. Record strides are stored in the headers so
//! newer writers can append fields without breaking older readers.

pub mod reader;
pub mod types;
pub mod writer;

pub use reader::{BoundingBoxTable, DocLocations, LocationStore, Manifest, ResolvedPage};
pub use types::*;
pub use writer::LocationStoreWriter;
