//! Maps raw engine hits to page, line and bounding-box precise matches.

use super::id::decode_id;
use super::lines::{line_endings, line_number_in};
use super::phrase::best_phrases;
use super::types::{Match, Span};
use crate::config::LineErrorPolicy;
use crate::engine::{RawHit, TermLocationMap, Token};
use crate::error::{Result, SearchError};
use crate::store::LocationStore;

/// What became of one raw hit
#[derive(Debug, Clone)]
pub enum HitOutcome {
    Matched(Match),
    /// The query terms did not align into any phrase on this page
    NotFound,
    /// A span fell outside the page text and the hit was skipped
    Unlocatable { offset: u32, len: usize },
}

/// Turns raw hits into [`Match`]es using the location store
pub struct HitMapper<'a> {
    store: &'a LocationStore,
    field: &'a str,
    line_errors: LineErrorPolicy,
}

impl<'a> HitMapper<'a> {
    pub fn new(store: &'a LocationStore, field: &'a str, line_errors: LineErrorPolicy) -> Self {
        Self {
            store,
            field,
            line_errors,
        }
    }

    /// Map `hit` for the analyzed query `tokens`
    pub fn to_match(&self, tokens: &[Token], hit: &RawHit) -> Result<HitOutcome> {
        let (doc_idx, page_idx) = decode_id(&hit.id)?;

        let empty = TermLocationMap::new();
        let term_locations = hit.locations.get(self.field).unwrap_or(&empty);
        let spans: Vec<Span> = best_phrases(tokens, term_locations)
            .iter()
            .map(Span::from)
            .collect();
        if spans.is_empty() {
            tracing::debug!(id = %hit.id, "hit has no reconstructible phrase");
            return Ok(HitOutcome::NotFound);
        }

        let fragment: String = hit
            .fragments
            .get(self.field)
            .map(|frags| frags.concat())
            .unwrap_or_default();

        let page = self.store.resolve(doc_idx, page_idx)?;
        let text = self.store.page_text(doc_idx, page_idx)?;
        let endings = line_endings(text);

        let mut line_numbers = Vec::with_capacity(spans.len());
        let mut lines = Vec::with_capacity(spans.len());
        let mut boxes = Vec::with_capacity(spans.len());

        for span in &spans {
            let located = if span.end as usize > text.len() || span.start > span.end {
                Err(SearchError::LineLookup {
                    offset: span.end,
                    len: text.len(),
                })
            } else {
                line_number_in(text, &endings, span.start)
            };

            let (line_number, line) = match located {
                Ok(found) => found,
                Err(SearchError::LineLookup { offset, len })
                    if self.line_errors == LineErrorPolicy::Skip =>
                {
                    tracing::warn!(
                        id = %hit.id,
                        path = %page.path,
                        offset,
                        len,
                        "span outside page text, skipping hit"
                    );
                    return Ok(HitOutcome::Unlocatable { offset, len });
                }
                Err(e) => return Err(e),
            };

            line_numbers.push(line_number);
            lines.push(line);
            boxes.push(page.table.rectangle_for(span.start, span.end));
        }

        Ok(HitOutcome::Matched(Match {
            path: page.path,
            page_number: page.page_number,
            line_numbers,
            lines,
            boxes,
            table: page.table,
            score: hit.score,
            fragment,
            spans,
            doc_idx,
            page_idx,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Analyzer, Occurrence, StandardAnalyzer};
    use crate::search::id::encode_id;
    use crate::store::{LocationStoreWriter, PageContent, Rect, TextLocation};
    use std::collections::HashMap;
    use tempfile::tempdir;

    const PAGE: &str = "Annual report\nThe quick brown fox jumps.\n";

    fn setup_store() -> (tempfile::TempDir, LocationStore) {
        let temp_dir = tempdir().unwrap();
        let mut writer = LocationStoreWriter::new(temp_dir.path());
        writer.add_document(
            "annual.pdf",
            [0; 32],
            vec![PageContent {
                page_number: 1,
                text: PAGE.to_string(),
                locations: vec![
                    TextLocation::new(0, 13, Rect::new(72.0, 700.0, 200.0, 712.0)),
                    TextLocation::new(14, 40, Rect::new(72.0, 680.0, 260.0, 692.0)),
                ],
            }],
        );
        writer.write().unwrap();
        let store = LocationStore::open(temp_dir.path()).unwrap();
        (temp_dir, store)
    }

    fn hit_for(id: &str, text: &str) -> RawHit {
        let mut map = TermLocationMap::new();
        for token in StandardAnalyzer::english().analyze(text) {
            map.entry(token.term).or_insert_with(Vec::new).push(Occurrence {
                position: token.position,
                start: token.start,
                end: token.end,
            });
        }
        RawHit {
            id: id.to_string(),
            score: 1.5,
            fragments: HashMap::from([("Text".to_string(), vec!["frag".to_string()])]),
            locations: HashMap::from([("Text".to_string(), map)]),
        }
    }

    #[test]
    fn test_maps_hit_to_line_and_box() {
        let (_temp_dir, store) = setup_store();
        let mapper = HitMapper::new(&store, "Text", LineErrorPolicy::Skip);
        let tokens = StandardAnalyzer::english().analyze("brown fox");

        let outcome = mapper.to_match(&tokens, &hit_for(&encode_id(0, 0), PAGE)).unwrap();
        let HitOutcome::Matched(m) = outcome else {
            panic!("expected a match, got {outcome:?}");
        };
        assert_eq!(m.path, "annual.pdf");
        assert_eq!(m.page_number, 1);
        assert_eq!(m.spans.len(), 1);
        assert_eq!(m.spans[0].score, 2.0);
        assert_eq!(&PAGE[m.spans[0].start as usize..m.spans[0].end as usize], "brown fox");
        assert_eq!(m.line_numbers, vec![2]);
        assert_eq!(m.lines, vec!["The quick brown fox jumps."]);
        assert_eq!(m.boxes, vec![Some(Rect::new(72.0, 680.0, 260.0, 692.0))]);
        assert_eq!(m.fragment, "frag");
        assert_eq!(m.score, 1.5);
    }

    #[test]
    fn test_no_phrase_is_not_found() {
        let (_temp_dir, store) = setup_store();
        let mapper = HitMapper::new(&store, "Text", LineErrorPolicy::Skip);
        let tokens = StandardAnalyzer::english().analyze("zebra");
        let outcome = mapper.to_match(&tokens, &hit_for("0000.0", PAGE)).unwrap();
        assert!(matches!(outcome, HitOutcome::NotFound));
    }

    #[test]
    fn test_malformed_id() {
        let (_temp_dir, store) = setup_store();
        let mapper = HitMapper::new(&store, "Text", LineErrorPolicy::Skip);
        let tokens = StandardAnalyzer::english().analyze("fox");
        assert!(matches!(
            mapper.to_match(&tokens, &hit_for("0000", PAGE)),
            Err(SearchError::Decode { .. })
        ));
    }

    #[test]
    fn test_desynchronized_text_policy() {
        let (_temp_dir, store) = setup_store();
        let tokens = StandardAnalyzer::english().analyze("fox");
        // Offsets computed against longer text than the stored page
        let hit = hit_for("0000.0", &format!("{}{}", "x ".repeat(40), "fox"));

        let skip = HitMapper::new(&store, "Text", LineErrorPolicy::Skip);
        assert!(matches!(
            skip.to_match(&tokens, &hit).unwrap(),
            HitOutcome::Unlocatable { .. }
        ));

        let abort = HitMapper::new(&store, "Text", LineErrorPolicy::Abort);
        assert!(matches!(
            abort.to_match(&tokens, &hit),
            Err(SearchError::LineLookup { .. })
        ));
    }

    #[test]
    fn test_unknown_page() {
        let (_temp_dir, store) = setup_store();
        let mapper = HitMapper::new(&store, "Text", LineErrorPolicy::Skip);
        let tokens = StandardAnalyzer::english().analyze("fox");
        assert!(matches!(
            mapper.to_match(&tokens, &hit_for("0000.3", PAGE)),
            Err(SearchError::Store(_))
        ));
    }
}
