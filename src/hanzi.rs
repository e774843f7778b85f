//! Hanzi detection. Only the CJK Unified Ideographs block counts as an
//! annotatable character; punctuation, digits and spaces are rendered but
//! never consume a pinyin syllable.

pub fn is_cjk(ch: char) -> bool {
    ('\u{4E00}'..='\u{9FFF}').contains(&ch)
}

/// Number of annotatable characters in `text`.
pub fn count_cjk(text: &str) -> usize {
    text.chars().filter(|&c| is_cjk(c)).count()
}

pub fn contains_cjk(text: &str) -> bool {
    text.chars().any(is_cjk)
}
