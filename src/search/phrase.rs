//! Phrase reconstruction
//!
//! Rebuilds the best contiguous alignments of the query terms from a
//! document's term locations. A query term at index `i` found at document
//! position `p` implies a phrase starting at `p - i`; every implied start is
//! then scored by how many query terms sit exactly at `start + k`. There is no
//! gap tolerance and no credit for out-of-order terms.

use super::types::Phrase;
use crate::engine::{Occurrence, TermLocationMap, Token};
use rustc_hash::FxHashMap;
use std::collections::BTreeSet;

/// Best-scoring phrases for `tokens` in `term_locations`
///
/// Returns every phrase tied at the highest score, in ascending start order.
/// Empty when no query term occurs in the document.
pub fn best_phrases(tokens: &[Token], term_locations: &TermLocationMap) -> Vec<Phrase> {
    let phrases = candidate_phrases(tokens, term_locations);

    let best_score = phrases.iter().map(|p| p.score).max().unwrap_or(0);
    let best: Vec<Phrase> = phrases
        .into_iter()
        .filter(|p| p.score == best_score)
        .collect();

    tracing::trace!(
        terms = tokens.len(),
        best_score,
        phrases = best.len(),
        "reconstructed phrases"
    );
    best
}

/// Every candidate phrase with at least one aligned term, in ascending start order
pub fn candidate_phrases(tokens: &[Token], term_locations: &TermLocationMap) -> Vec<Phrase> {
    // term -> position -> occurrence
    let mut positions: FxHashMap<&str, FxHashMap<i64, Occurrence>> = FxHashMap::default();
    let mut starts: BTreeSet<i64> = BTreeSet::new();

    for (i, token) in tokens.iter().enumerate() {
        let Some(occurrences) = term_locations.get(&token.term) else {
            continue;
        };
        let by_pos = positions.entry(token.term.as_str()).or_default();
        for occ in occurrences {
            let pos = i64::from(occ.position);
            by_pos.insert(pos, *occ);
            starts.insert(pos - i as i64);
        }
    }

    let mut phrases = Vec::new();
    for start in starts {
        let mut phrase = Phrase::default();
        for (k, token) in tokens.iter().enumerate() {
            let pos = start + k as i64;
            let Some(occ) = positions
                .get(token.term.as_str())
                .and_then(|by_pos| by_pos.get(&pos))
            else {
                continue;
            };
            phrase.terms.push(token.term.clone());
            phrase.locations.push(*occ);
            phrase.score += 1;
        }

        if let (Some(first), Some(last)) = (phrase.locations.first(), phrase.locations.last()) {
            phrase.start = first.start;
            phrase.end = last.end;
            phrases.push(phrase);
        }
    }
    phrases
}
