//! Phrase reconstruction and line lookup benchmarks
//!
//! Run with: cargo bench

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use pdfmatch::engine::{Analyzer, Occurrence, StandardAnalyzer, TermLocationMap};
use pdfmatch::search::best_phrases;
use pdfmatch::search::lines::{line_endings, line_number_in};

const WORDS: &[&str] = &[
    "revenue", "growth", "quarter", "annual", "report", "market", "share", "fiscal", "year",
    "operating", "income", "net", "total", "assets",
];

/// Page text of roughly `words` words, twelve words to a line
fn page_text(words: usize) -> String {
    let mut text = String::new();
    for i in 0..words {
        text.push_str(WORDS[(i * 7 + i / 3) % WORDS.len()]);
        text.push(if i % 12 == 11 { '\n' } else { ' ' });
    }
    text
}

fn term_locations(text: &str) -> TermLocationMap {
    let mut map = TermLocationMap::new();
    for token in StandardAnalyzer::english().analyze(text) {
        map.entry(token.term).or_default().push(Occurrence {
            position: token.position,
            start: token.start,
            end: token.end,
        });
    }
    map
}

fn bench_best_phrases(c: &mut Criterion) {
    let analyzer = StandardAnalyzer::english();
    let query = analyzer.analyze("annual report operating income");

    let mut group = c.benchmark_group("best_phrases");
    for words in [100, 1_000, 10_000] {
        let map = term_locations(&page_text(words));
        group.bench_with_input(BenchmarkId::from_parameter(words), &map, |b, map| {
            b.iter(|| best_phrases(black_box(&query), black_box(map)))
        });
    }
    group.finish();
}

fn bench_line_lookup(c: &mut Criterion) {
    let text = page_text(10_000);
    let endings = line_endings(&text);
    let offsets: Vec<u32> = (0..text.len() as u32).step_by(997).collect();

    c.bench_function("line_endings", |b| b.iter(|| line_endings(black_box(&text))));
    c.bench_function("line_number_in", |b| {
        b.iter(|| {
            for &offset in &offsets {
                let _ = line_number_in(black_box(&text), &endings, offset);
            }
        })
    });
}

criterion_group!(benches, bench_best_phrases, bench_line_lookup);
criterion_main!(benches);
