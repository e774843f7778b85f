use crate::config::LayoutConfig;
use crate::font::{FontMetrics, GlyphBounds};
use crate::hanzi::is_cjk;
use serde::Serialize;

/// One sentence of the top text box, ready to be broken into items.
#[derive(Debug, Clone, Copy)]
pub struct Sentence<'a> {
    pub text: &'a str,
    /// Aligned syllables, one per CJK character, or one per word of plain
    /// text. Empty when unannotated.
    pub syllables: &'a [String],
    /// Laid out per character (Hanzi) rather than per word.
    pub hanzi: bool,
    pub font_size: f32,
}

/// A character or word occupying one cell of a display line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutItem {
    pub text: String,
    pub sentence: usize,
    /// Position among all items of the page, used for highlighting.
    pub index: usize,
    pub hanzi: bool,
    pub font_size: f32,
    /// Reserved horizontal space, advance plus padding.
    pub cell_width: f32,
    pub raw_width: f32,
    /// Ink extent relative to the pen position.
    pub glyph: GlyphBounds,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub syllable: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LayoutLine {
    pub items: Vec<LayoutItem>,
    pub width: f32,
}

/// Break Hanzi text into per-character items. Whitespace is dropped; only CJK
/// characters consume a syllable, punctuation gets a cell without a label.
pub fn hanzi_items(
    sentence_index: usize,
    sentence: &Sentence<'_>,
    metrics: &dyn FontMetrics,
    config: &LayoutConfig,
    next_index: &mut usize,
) -> Vec<LayoutItem> {
    let size = sentence.font_size;
    let pad = config.pad_for(size);
    let mut syllable_pos = 0;
    let mut items = Vec::new();

    for ch in sentence.text.chars().filter(|c| !c.is_whitespace()) {
        let raw_width = metrics.advance_width(ch, size);
        let glyph = metrics.glyph_bounds(ch, size).unwrap_or(GlyphBounds {
            x_min: 0.0,
            width: raw_width,
        });

        let syllable = if is_cjk(ch) {
            let s = sentence
                .syllables
                .get(syllable_pos)
                .filter(|s| !s.is_empty())
                .cloned();
            syllable_pos += 1;
            s
        } else {
            None
        };

        items.push(LayoutItem {
            text: ch.to_string(),
            sentence: sentence_index,
            index: *next_index,
            hanzi: true,
            font_size: size,
            cell_width: raw_width + pad,
            raw_width,
            glyph,
            syllable,
        });
        *next_index += 1;
    }
    items
}

/// Break non-Hanzi text into word items; a word's cell includes its trailing
/// space. Word `k` is labelled with `syllables[k]` when present.
pub fn word_items(
    sentence_index: usize,
    sentence: &Sentence<'_>,
    metrics: &dyn FontMetrics,
    next_index: &mut usize,
) -> Vec<LayoutItem> {
    let size = sentence.font_size;
    sentence
        .text
        .split_whitespace()
        .enumerate()
        .map(|(k, word)| {
            let raw_width = metrics.text_width(word, size);
            let item = LayoutItem {
                text: word.to_string(),
                sentence: sentence_index,
                index: *next_index,
                hanzi: false,
                font_size: size,
                cell_width: metrics.text_width(&format!("{word} "), size),
                raw_width,
                glyph: GlyphBounds {
                    x_min: 0.0,
                    width: raw_width,
                },
                syllable: sentence
                    .syllables
                    .get(k)
                    .filter(|s| !s.is_empty())
                    .cloned(),
            };
            *next_index += 1;
            item
        })
        .collect()
}

/// Greedy line packing: items are appended while the running width stays
/// within `max_width`; an overflowing item starts the next line. The first
/// item of a line is always accepted.
pub fn pack_items(items: Vec<LayoutItem>, max_width: f32) -> Vec<LayoutLine> {
    let mut lines = Vec::new();
    let mut current = LayoutLine::default();

    for item in items {
        if current.items.is_empty() || current.width + item.cell_width <= max_width {
            current.width += item.cell_width;
            current.items.push(item);
        } else {
            lines.push(std::mem::take(&mut current));
            current.width = item.cell_width;
            current.items.push(item);
        }
    }
    if !current.items.is_empty() {
        lines.push(current);
    }
    lines
}

/// Lay out all sentences of a page into display lines.
pub fn pack_sentences(
    sentences: &[Sentence<'_>],
    hanzi: &dyn FontMetrics,
    latin: &dyn FontMetrics,
    config: &LayoutConfig,
) -> Vec<LayoutLine> {
    let mut next_index = 0;
    let mut items = Vec::new();
    for (i, sentence) in sentences.iter().enumerate() {
        if sentence.hanzi {
            items.extend(hanzi_items(i, sentence, hanzi, config, &mut next_index));
        } else {
            items.extend(word_items(i, sentence, latin, &mut next_index));
        }
    }
    pack_items(items, config.max_width)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedLabel {
    pub text: String,
    pub x: f32,
    pub size: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedItem {
    pub text: String,
    pub index: usize,
    pub sentence: usize,
    pub x: f32,
    pub font_size: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<PlacedLabel>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedLine {
    pub y: f32,
    pub height: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label_y: Option<f32>,
    pub items: Vec<PlacedItem>,
}

/// Pinyin label size for a line: the largest label size among annotated items.
pub fn line_label_size(line: &LayoutLine, config: &LayoutConfig) -> Option<f32> {
    line.items
        .iter()
        .filter(|item| item.syllable.is_some())
        .map(|item| config.pinyin_size(item.font_size))
        .reduce(f32::max)
}

/// Absolute x positions for one line. Hanzi are centered in their cell and
/// each label is centered over the glyph's ink box, not over the cell.
pub fn position_line(
    line: &LayoutLine,
    left: f32,
    label_metrics: &dyn FontMetrics,
    label_size: f32,
) -> Vec<PlacedItem> {
    let mut x = left;
    let mut placed = Vec::with_capacity(line.items.len());

    for item in &line.items {
        let char_x = if item.hanzi {
            x + (item.cell_width - item.raw_width) / 2.0
        } else {
            x
        };
        let label = item.syllable.as_ref().map(|text| {
            let width = label_metrics.text_width(text, label_size);
            PlacedLabel {
                text: text.clone(),
                x: char_x + item.glyph.x_min + (item.glyph.width - width) / 2.0,
                size: label_size,
            }
        });
        placed.push(PlacedItem {
            text: item.text.clone(),
            index: item.index,
            sentence: item.sentence,
            x: char_x,
            font_size: item.font_size,
            label,
        });
        x += item.cell_width;
    }
    placed
}

/// Position every line of a page top to bottom starting at the config origin.
pub fn position_lines(
    lines: &[LayoutLine],
    hanzi: &dyn FontMetrics,
    latin: &dyn FontMetrics,
    config: &LayoutConfig,
) -> Vec<PlacedLine> {
    let mut y = config.origin_y;
    let mut out = Vec::with_capacity(lines.len());

    for line in lines {
        let height = line
            .items
            .iter()
            .map(|item| {
                let metrics = if item.hanzi { hanzi } else { latin };
                metrics.line_height(item.font_size)
            })
            .fold(0.0, f32::max);

        let label_size = line_label_size(line, config);
        let label_y = label_size.map(|size| y - latin.line_height(size) - 4.0);
        let items = position_line(
            line,
            config.origin_x,
            latin,
            label_size.unwrap_or(config.pinyin_row_size()),
        );

        out.push(PlacedLine {
            y,
            height,
            label_y,
            items,
        });
        y += height + config.line_spacing;
    }
    out
}

/// Height the positioned rows occupy below the origin: bottom of the last
/// row minus `origin_y`. Labels of the first row sit in the margin above.
pub fn rows_height(rows: &[PlacedLine], config: &LayoutConfig) -> f32 {
    rows.last()
        .map_or(0.0, |row| row.y + row.height - config.origin_y)
}

/// Split text into breakable tokens: every CJK character stands alone, other
/// runs break on whitespace. The flag records whether whitespace preceded.
fn break_tokens(text: &str) -> Vec<(&str, bool)> {
    let mut out = Vec::new();
    let mut spaced = false;
    let mut word_start: Option<usize> = None;

    for (i, ch) in text.char_indices() {
        if ch.is_whitespace() || is_cjk(ch) {
            if let Some(start) = word_start.take() {
                out.push((&text[start..i], spaced));
                spaced = false;
            }
            if ch.is_whitespace() {
                spaced = true;
            } else {
                out.push((&text[i..i + ch.len_utf8()], spaced));
                spaced = false;
            }
        } else if word_start.is_none() {
            word_start = Some(i);
        }
    }
    if let Some(start) = word_start {
        out.push((&text[start..], spaced));
    }
    out
}

/// Greedy wrap of mixed Hanzi/Latin text to `max_width`. A token wider than
/// the box still gets a line of its own.
pub fn wrap_text(text: &str, metrics: &dyn FontMetrics, size: f32, max_width: f32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for (token, spaced) in break_tokens(text) {
        let candidate = if current.is_empty() {
            token.to_string()
        } else if spaced {
            format!("{current} {token}")
        } else {
            format!("{current}{token}")
        };
        if current.is_empty() || metrics.text_width(&candidate, size) <= max_width {
            current = candidate;
        } else {
            lines.push(std::mem::replace(&mut current, token.to_string()));
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

#[derive(Debug, Clone, PartialEq)]
pub struct FittedText {
    pub size: f32,
    pub lines: Vec<String>,
    pub line_height: f32,
    pub total_height: f32,
}

fn measure(text: &str, metrics: &dyn FontMetrics, size: f32, max_width: f32, spacing: f32) -> FittedText {
    let lines = wrap_text(text, metrics, size, max_width);
    let line_height = metrics.line_height(size);
    let total_height = lines.len() as f32 * (line_height + spacing);
    FittedText {
        size,
        lines,
        line_height,
        total_height,
    }
}

/// Largest size, stepping down by 2px from the base size, at which every
/// wrapped line fits `max_width` (and the block fits `max_height` if given).
/// Falls back to the minimum size.
pub fn fit_font_size(
    text: &str,
    metrics: &dyn FontMetrics,
    config: &LayoutConfig,
    max_width: f32,
    max_height: Option<f32>,
) -> FittedText {
    let mut size = config.base_font_size;
    while size >= config.min_font_size {
        let fitted = measure(text, metrics, size, max_width, config.line_spacing);
        let fits_width = fitted
            .lines
            .iter()
            .all(|l| metrics.text_width(l, size) <= max_width);
        let fits_height = max_height.map_or(true, |h| fitted.total_height <= h);
        if fits_width && fits_height {
            return fitted;
        }
        size -= 2.0;
    }
    measure(text, metrics, config.min_font_size, max_width, config.line_spacing)
}
