pub mod segment;

use crate::hanzi::count_cjk;
use serde::Serialize;
use tracing::debug;

/// How a pinyin string was turned into per-character syllables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AlignStrategy {
    /// No pinyin supplied; nothing to annotate.
    Empty,
    /// The Hanzi side has no CJK characters; raw tokens are returned.
    Unaligned,
    /// Token count already matched the character count.
    Passthrough,
    /// Vowel-respecting segmentation of the flattened pinyin.
    Segmented,
    /// Even character slicing after segmentation was infeasible.
    EvenSlice,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alignment {
    pub syllables: Vec<String>,
    pub strategy: AlignStrategy,
}

/// Align `pinyin` to the CJK characters of `hanzi`.
///
/// Unless `pinyin` is empty or `hanzi` has no CJK characters, the result holds
/// exactly one entry per CJK character.
pub fn align(pinyin: &str, hanzi: &str) -> Vec<String> {
    align_detailed(pinyin, hanzi).syllables
}

pub fn align_detailed(pinyin: &str, hanzi: &str) -> Alignment {
    if pinyin.is_empty() {
        return Alignment {
            syllables: Vec::new(),
            strategy: AlignStrategy::Empty,
        };
    }

    let tokens: Vec<&str> = pinyin.split_whitespace().collect();
    let ch_count = count_cjk(hanzi);

    if ch_count == 0 {
        return Alignment {
            syllables: tokens.into_iter().map(String::from).collect(),
            strategy: AlignStrategy::Unaligned,
        };
    }

    if tokens.len() == ch_count {
        return Alignment {
            syllables: tokens.into_iter().map(String::from).collect(),
            strategy: AlignStrategy::Passthrough,
        };
    }

    let flat = tokens.concat();
    let flat_len = flat.chars().count();

    if flat_len >= ch_count {
        if let Some(syllables) = segment::segment(&flat, ch_count) {
            debug!(
                tokens = tokens.len(),
                chars = ch_count,
                "pinyin re-segmented to character count"
            );
            return Alignment {
                syllables,
                strategy: AlignStrategy::Segmented,
            };
        }
        debug!(pinyin = %flat, chars = ch_count, "no vowel-respecting split, slicing evenly");
    } else {
        debug!(
            pinyin = %flat,
            chars = ch_count,
            "pinyin shorter than character count, padding"
        );
    }

    Alignment {
        syllables: even_slice(&flat, ch_count),
        strategy: AlignStrategy::EvenSlice,
    }
}

/// Spread a pronunciation over the words of non-Chinese text: one token per
/// word in order, surplus tokens joined onto the last word, missing ones
/// left empty. Text without words gets the raw tokens.
pub fn align_words(pronunciation: &str, text: &str) -> Vec<String> {
    let tokens: Vec<&str> = pronunciation.split_whitespace().collect();
    let words = text.split_whitespace().count();
    if tokens.is_empty() || words == 0 {
        return tokens.into_iter().map(String::from).collect();
    }

    let mut out: Vec<String> = tokens.iter().take(words - 1).map(|t| t.to_string()).collect();
    if tokens.len() >= words {
        out.push(tokens[words - 1..].join(" "));
    }
    out.resize(words, String::new());
    out
}

/// Cut `s` into `parts` character runs as evenly as possible; the first
/// `len % parts` runs get one extra character. When `s` is shorter than
/// `parts` the tail is padded with empty strings.
pub fn even_slice(s: &str, parts: usize) -> Vec<String> {
    if parts == 0 {
        return Vec::new();
    }
    let chars: Vec<char> = s.chars().collect();
    let base = chars.len() / parts;
    let extra = chars.len() % parts;

    let mut out = Vec::with_capacity(parts);
    let mut i = 0;
    for k in 0..parts {
        let take = base + usize::from(k < extra);
        out.push(chars[i..i + take].iter().collect());
        i += take;
    }
    out
}
