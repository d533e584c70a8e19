//! Byte offset to line mapping over extracted page text.
//!
//! A line owns its terminating `\n`. Text that does not end in `\n` behaves as
//! if it did.

use crate::error::{Result, SearchError};

/// Offsets of every line ending in `text`, preceded by a `0` sentinel
///
/// A virtual ending at `text.len()` is appended when the text does not end in
/// `\n`.
pub fn line_endings(text: &str) -> Vec<u32> {
    let bytes = text.as_bytes();
    let mut endings = Vec::with_capacity(bytes.len() / 40 + 2);
    endings.push(0u32);
    endings.extend(memchr::memchr_iter(b'\n', bytes).map(|i| i as u32));
    if bytes.last() != Some(&b'\n') {
        endings.push(bytes.len() as u32);
    }
    endings
}

/// Line number (1-based) and line text containing byte `offset` of `text`
pub fn line_number(text: &str, offset: u32) -> Result<(u32, String)> {
    let endings = line_endings(text);
    line_number_in(text, &endings, offset)
}

/// As [`line_number`], reusing endings computed by [`line_endings`]
pub fn line_number_in(text: &str, endings: &[u32], offset: u32) -> Result<(u32, String)> {
    let out_of_range = || SearchError::LineLookup {
        offset,
        len: text.len(),
    };
    if offset as usize >= text.len() {
        return Err(out_of_range());
    }

    // First ending at or after `offset`, skipping the sentinel
    let i = 1 + endings[1..].partition_point(|&e| e < offset);
    if i >= endings.len() {
        return Err(out_of_range());
    }

    let (start, end) = (endings[i - 1] as usize, endings[i] as usize);
    let line = text.get(start..end).ok_or_else(out_of_range)?;
    let line = line.strip_prefix('\n').unwrap_or(line);
    Ok((i as u32, line.to_string()))
}
