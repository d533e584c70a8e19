//! Composite document/page identifiers
//!
//! Each indexed page is stored in the engine under `"{doc:04X}.{page}"`: the
//! document index in uppercase hex, a single `.`, the page index in decimal.

use crate::error::{Result, SearchError};
use crate::store::{DocIdx, PageIdx};

/// Encode the engine id of page `page_idx` of document `doc_idx`
pub fn encode_id(doc_idx: DocIdx, page_idx: PageIdx) -> String {
    format!("{:04X}.{}", doc_idx, page_idx)
}

/// Decode an engine id into (document index, page index)
pub fn decode_id(id: &str) -> Result<(DocIdx, PageIdx)> {
    let bad = |reason: &str| SearchError::Decode {
        id: id.to_string(),
        reason: reason.to_string(),
    };

    let mut parts = id.split('.');
    let (doc, page) = match (parts.next(), parts.next(), parts.next()) {
        (Some(doc), Some(page), None) => (doc, page),
        _ => return Err(bad("expected exactly one '.' separator")),
    };

    if doc.is_empty() || !doc.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(bad("document index is not hexadecimal"));
    }
    if page.is_empty() || !page.bytes().all(|b| b.is_ascii_digit()) {
        return Err(bad("page index is not decimal"));
    }

    let doc_idx = DocIdx::from_str_radix(doc, 16).map_err(|e| bad(&e.to_string()))?;
    let page_idx = page.parse::<PageIdx>().map_err(|e| bad(&e.to_string()))?;
    Ok((doc_idx, page_idx))
}
