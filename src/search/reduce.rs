//! Match set reduction

use super::types::{Match, MatchSet};
use rustc_hash::FxHashSet;

impl MatchSet {
    /// Keep only the best-scoring spans across the whole set
    ///
    /// Line numbers, lines and boxes stay parallel to the kept spans. Matches
    /// left without spans are dropped and `total_matches` becomes the number
    /// of kept spans.
    pub fn best(&self) -> MatchSet {
        let best_score = self
            .matches
            .iter()
            .flat_map(|m| m.spans.iter())
            .map(|s| s.score)
            .fold(f64::NEG_INFINITY, f64::max);

        let mut matches = Vec::new();
        let mut kept_spans = 0;
        for m in &self.matches {
            let keep: Vec<usize> = (0..m.spans.len())
                .filter(|&i| m.spans[i].score >= best_score)
                .collect();
            if keep.is_empty() {
                continue;
            }
            kept_spans += keep.len();
            matches.push(Match {
                line_numbers: pick(&m.line_numbers, &keep),
                lines: pick(&m.lines, &keep),
                boxes: pick(&m.boxes, &keep),
                spans: pick(&m.spans, &keep),
                ..m.clone()
            });
        }

        MatchSet {
            total_matches: kept_spans,
            search_duration: self.search_duration,
            matches,
            diagnostics: self.diagnostics,
        }
    }

    /// Distinct file paths in first-seen order
    pub fn files(&self) -> Vec<String> {
        let mut seen = FxHashSet::default();
        self.matches
            .iter()
            .filter(|m| seen.insert(m.path.as_str()))
            .map(|m| m.path.clone())
            .collect()
    }

    /// Same pages in the same order, ignoring scores, spans and lines
    pub fn loose_eq(&self, other: &MatchSet) -> bool {
        self.matches.len() == other.matches.len()
            && self
                .matches
                .iter()
                .zip(&other.matches)
                .all(|(a, b)| a.path == b.path && a.page_number == b.page_number)
    }
}

fn pick<T: Clone>(items: &[T], keep: &[usize]) -> Vec<T> {
    keep.iter().filter_map(|&i| items.get(i).cloned()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::types::Span;
    use crate::store::{BoundingBoxTable, Rect};
    use std::sync::Arc;
    use std::time::Duration;

    fn make_match(path: &str, page_number: u32, scores: &[f64]) -> Match {
        let spans: Vec<Span> = scores
            .iter()
            .enumerate()
            .map(|(i, &score)| Span {
                start: i as u32 * 10,
                end: i as u32 * 10 + 5,
                score,
            })
            .collect();
        Match {
            path: path.to_string(),
            page_number,
            line_numbers: (1..=scores.len() as u32).collect(),
            lines: scores.iter().map(|s| format!("line {s}")).collect(),
            boxes: scores
                .iter()
                .map(|&s| Some(Rect::new(0.0, 0.0, s as f32, 1.0)))
                .collect(),
            table: Arc::new(BoundingBoxTable::default()),
            score: 1.0,
            fragment: String::new(),
            spans,
            doc_idx: 0,
            page_idx: page_number - 1,
        }
    }

    fn match_set(matches: Vec<Match>) -> MatchSet {
        MatchSet {
            total_matches: matches.len(),
            search_duration: Duration::from_millis(12),
            matches,
            ..Default::default()
        }
    }

    #[test]
    fn test_best_keeps_top_spans() {
        let set = match_set(vec![make_match("a.pdf", 1, &[3.0, 3.0, 1.0, 2.0])]);
        let best = set.best();

        assert_eq!(best.total_matches, 2);
        assert_eq!(best.search_duration, Duration::from_millis(12));
        let m = &best.matches[0];
        assert_eq!(m.spans.len(), 2);
        assert!(m.spans.iter().all(|s| s.score == 3.0));
        assert_eq!(m.line_numbers, vec![1, 2]);
        assert_eq!(m.lines, vec!["line 3", "line 3"]);
        assert_eq!(m.boxes.len(), 2);
    }

    #[test]
    fn test_best_drops_weaker_matches() {
        let set = match_set(vec![
            make_match("a.pdf", 1, &[1.0]),
            make_match("b.pdf", 2, &[2.0, 1.0]),
            make_match("c.pdf", 1, &[2.0]),
        ]);
        let best = set.best();

        assert_eq!(best.total_matches, 2);
        assert_eq!(best.files(), vec!["b.pdf", "c.pdf"]);
        assert_eq!(best.matches[0].line_numbers, vec![1]);
    }

    #[test]
    fn test_best_of_empty() {
        let best = MatchSet::default().best();
        assert!(best.is_empty());
        assert_eq!(best.total_matches, 0);
    }

    #[test]
    fn test_files_first_seen_order() {
        let set = match_set(vec![
            make_match("A", 1, &[1.0]),
            make_match("B", 1, &[1.0]),
            make_match("A", 2, &[1.0]),
            make_match("C", 1, &[1.0]),
        ]);
        assert_eq!(set.files(), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_loose_eq() {
        let a = match_set(vec![make_match("a.pdf", 1, &[1.0]), make_match("b.pdf", 3, &[2.0])]);
        let mut b = match_set(vec![
            make_match("a.pdf", 1, &[5.0, 4.0]),
            make_match("b.pdf", 3, &[1.0]),
        ]);
        b.matches[0].lines = vec!["different".to_string()];
        assert!(a.loose_eq(&b));

        b.matches[1].page_number = 4;
        assert!(!a.loose_eq(&b));

        b.matches.pop();
        assert!(!a.loose_eq(&b));
        assert!(MatchSet::default().loose_eq(&MatchSet::default()));
    }
}
