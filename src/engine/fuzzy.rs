//! Bounded edit distance for fuzzy term matching.

/// Are these terms within `max` edits of each other?
///
/// Character-level Levenshtein that bails out once the length difference or
/// the smallest value of a DP row exceeds `max`.
pub fn levenshtein_within(a: &str, b: &str, max: usize) -> bool {
    if a == b {
        return true;
    }

    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.len().abs_diff(b.len()) > max {
        return false;
    }

    let mut row: Vec<usize> = (0..=b.len()).collect();
    for (i, ac) in a.iter().enumerate() {
        let mut prev = row[0];
        row[0] = i + 1;
        let mut min_row = row[0];

        for (j, bc) in b.iter().enumerate() {
            let above = row[j + 1];
            let cost = usize::from(ac != bc);
            row[j + 1] = (above + 1).min(row[j] + 1).min(prev + cost);
            prev = above;
            min_row = min_row.min(row[j + 1]);
        }

        if min_row > max {
            return false;
        }
    }

    row[b.len()] <= max
}
