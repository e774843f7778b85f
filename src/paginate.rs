use crate::config::LayoutConfig;
use crate::font::FontMetrics;
use crate::layout::{fit_font_size, pack_sentences, position_lines, rows_height, Sentence};
use crate::script::ScriptLine;
use serde::Serialize;
use std::ops::Range;
use tracing::debug;

/// Consecutive script lines shown together in the top box.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page {
    pub lines: Range<usize>,
    /// Translations of the page's lines, space-joined.
    pub translation: String,
}

/// Top-box sentences for `range`, each fitted to the box width on its own.
/// Translation-only lines contribute no sentence.
pub fn page_sentences<'a>(
    lines: &'a [ScriptLine],
    range: Range<usize>,
    syllables: &'a [Vec<String>],
    config: &LayoutConfig,
    hanzi: &dyn FontMetrics,
    latin: &dyn FontMetrics,
) -> Vec<Sentence<'a>> {
    let mut sentences = Vec::new();
    for i in range {
        let line = &lines[i];
        let text = line.top_text();
        if text.is_empty() {
            continue;
        }
        let metrics = if line.is_chinese() { hanzi } else { latin };
        let font_size = fit_font_size(text, metrics, config, config.max_width, None).size;
        sentences.push(Sentence {
            text,
            syllables: syllables.get(i).map(Vec::as_slice).unwrap_or(&[]),
            hanzi: line.is_chinese(),
            font_size,
        });
    }
    sentences
}

/// Height the lines in `range` take in the top box, measured on the packed
/// and positioned rows that are drawn for them.
pub fn block_height(
    lines: &[ScriptLine],
    range: Range<usize>,
    syllables: &[Vec<String>],
    config: &LayoutConfig,
    hanzi: &dyn FontMetrics,
    latin: &dyn FontMetrics,
) -> f32 {
    let sentences = page_sentences(lines, range, syllables, config, hanzi, latin);
    let packed = pack_sentences(&sentences, hanzi, latin, config);
    rows_height(&position_lines(&packed, hanzi, latin, config), config)
}

/// Group script lines into pages. Lines are added while the block still fits
/// `max_height`; the overflowing line opens the next page. A line too tall on
/// its own still gets a page.
pub fn paginate(
    lines: &[ScriptLine],
    syllables: &[Vec<String>],
    config: &LayoutConfig,
    hanzi: &dyn FontMetrics,
    latin: &dyn FontMetrics,
) -> Vec<Page> {
    let mut pages = Vec::new();
    let mut start = 0;

    for end in 1..=lines.len() {
        if end - start > 1
            && block_height(lines, start..end, syllables, config, hanzi, latin) > config.max_height
        {
            pages.push(make_page(lines, start..end - 1));
            start = end - 1;
        }
    }
    if start < lines.len() {
        pages.push(make_page(lines, start..lines.len()));
    }
    debug!(lines = lines.len(), pages = pages.len(), "paginated script");
    pages
}

fn make_page(lines: &[ScriptLine], range: Range<usize>) -> Page {
    let translation = lines[range.clone()]
        .iter()
        .map(|l| l.translation.as_str())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    Page {
        lines: range,
        translation,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::BuiltinMetrics;
    use crate::script::parse_script;

    fn pages_for(script: &str, config: &LayoutConfig) -> Vec<Page> {
        let lines = parse_script(script).unwrap();
        paginate(&lines, &[], config, &BuiltinMetrics, &BuiltinMetrics)
    }

    #[test]
    fn test_short_lines_share_a_page() {
        let pages = pages_for("你好|hi\n谢谢|thanks\n再见|bye", &LayoutConfig::default());
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].lines, 0..3);
        assert_eq!(pages[0].translation, "hi thanks bye");
    }

    #[test]
    fn test_overflow_starts_new_page() {
        let mut config = LayoutConfig::default();
        config.max_height = 80.0;
        let script = "一二三四五六七八九十|ten\n".repeat(3);
        let pages = pages_for(&script, &config);
        assert_eq!(pages.len(), 3);
        assert_eq!(pages[1].lines, 1..2);
        assert_eq!(pages[2].translation, "ten");
    }

    #[test]
    fn test_oversized_line_gets_own_page() {
        let mut config = LayoutConfig::default();
        config.max_height = 10.0;
        let pages = pages_for("你好|hi\n谢谢|thanks", &config);
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].lines, 0..1);
    }

    #[test]
    fn test_cell_padding_counts_toward_height() {
        // 19 characters fit one 640px row unpadded (608px) but not padded
        // (19 * 36 = 684px), so three lines pack into 4 rows = 183.6px.
        let config = LayoutConfig::default();
        let script = "一二三四五六七八九十一二三四五六七八九|x\n".repeat(3);
        let lines = parse_script(&script).unwrap();
        let pages = paginate(&lines, &[], &config, &BuiltinMetrics, &BuiltinMetrics);
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].lines, 0..2);
        for page in &pages {
            let height = block_height(
                &lines,
                page.lines.clone(),
                &[],
                &config,
                &BuiltinMetrics,
                &BuiltinMetrics,
            );
            assert!(height <= config.max_height, "page {:?} is {height}px", page.lines);
        }
    }

    #[test]
    fn test_translation_only_lines_add_no_height() {
        let config = LayoutConfig::default();
        let lines = parse_script("你好|hi\nonly a translation").unwrap();
        let one = block_height(&lines, 0..1, &[], &config, &BuiltinMetrics, &BuiltinMetrics);
        let both = block_height(&lines, 0..2, &[], &config, &BuiltinMetrics, &BuiltinMetrics);
        assert_eq!(one, both);
        assert!((one - 38.4).abs() < 1e-3);
    }

    #[test]
    fn test_page_sentences_carry_syllables() {
        let lines = parse_script("你好|nǐ hǎo|hi\nGracias|thanks").unwrap();
        let syllables = vec![vec!["nǐ".to_string(), "hǎo".to_string()], vec![]];
        let sentences = page_sentences(
            &lines,
            0..2,
            &syllables,
            &LayoutConfig::default(),
            &BuiltinMetrics,
            &BuiltinMetrics,
        );
        assert_eq!(sentences.len(), 2);
        assert_eq!(sentences[0].syllables.len(), 2);
        assert!(sentences[0].hanzi);
        assert!(!sentences[1].hanzi);
        assert_eq!(sentences[1].font_size, 32.0);
    }

    #[test]
    fn test_empty_script() {
        assert!(pages_for("", &LayoutConfig::default()).is_empty());
    }
}
