//! Split a concatenated pinyin string into a fixed number of syllable-like
//! pieces.
//!
//! Every piece must carry a vowel nucleus. Among all valid partitions the one
//! with the most pieces starting on a consonant wins (the first piece is not
//! scored); ties keep the partition whose earlier pieces are longest. The
//! search is tabulated bottom-up over `(start, parts_left)`, so cost is
//! `O(parts * len^2)` with no recursion.

use tracing::trace;

/// Plain and tone-marked pinyin vowels, both cases.
pub const VOWELS: &str = "aeiouüāáǎàēéěèīíǐìōóǒòūúǔùǖǘǚǜAEIOUÜĀÁǍÀĒÉĚÈĪÍǏÌŌÓǑÒŪÚǓÙǕǗǙǛ";

pub fn is_vowel(ch: char) -> bool {
    VOWELS.contains(ch)
}

/// Anything outside the vowel set counts as a plausible syllable onset.
fn is_onset(ch: char) -> bool {
    !is_vowel(ch)
}

#[derive(Debug, Clone, Copy)]
struct Cell {
    /// Exclusive end of the first piece starting at this position.
    end: usize,
    /// Onset score of the pieces after the first one.
    score: usize,
}

/// Partition `s` into exactly `parts` vowel-bearing pieces.
///
/// Returns `None` when no such partition exists, when `parts == 0`, or when
/// `s` has fewer characters than `parts`.
pub fn segment(s: &str, parts: usize) -> Option<Vec<String>> {
    let chars: Vec<char> = s.chars().collect();
    let len = chars.len();
    if parts == 0 || len < parts {
        return None;
    }

    // vowel_prefix[i] = vowels in chars[..i]
    let mut vowel_prefix = Vec::with_capacity(len + 1);
    vowel_prefix.push(0usize);
    for &c in &chars {
        let last = *vowel_prefix.last().unwrap_or(&0);
        vowel_prefix.push(last + usize::from(is_vowel(c)));
    }
    let has_vowel = |a: usize, b: usize| vowel_prefix[b] > vowel_prefix[a];

    // table[k][start]: best split of chars[start..] into k pieces.
    // Local to this call; indices are positions in `chars`.
    let mut table: Vec<Vec<Option<Cell>>> = vec![vec![None; len + 1]; parts + 1];

    for start in 0..len {
        if has_vowel(start, len) {
            table[1][start] = Some(Cell { end: len, score: 0 });
        }
    }

    for k in 2..=parts {
        let max_end = len - (k - 1);
        for start in 0..len {
            let mut best: Option<Cell> = None;
            // Longest first piece first; a later candidate must score strictly higher.
            for end in (start + 1..=max_end).rev() {
                if !has_vowel(start, end) {
                    continue;
                }
                let Some(rest) = table[k - 1][end] else {
                    continue;
                };
                let score = rest.score + usize::from(is_onset(chars[end]));
                if best.map_or(true, |b| score > b.score) {
                    best = Some(Cell { end, score });
                }
            }
            table[k][start] = best;
        }
    }

    let mut pieces = Vec::with_capacity(parts);
    let mut start = 0;
    for k in (1..=parts).rev() {
        let cell = table[k][start]?;
        pieces.push(chars[start..cell.end].iter().collect::<String>());
        start = cell.end;
    }
    trace!(input = s, ?pieces, "segmented pinyin");
    Some(pieces)
}
