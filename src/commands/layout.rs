use crate::commands::{align_lines, load_inputs, DEFAULT_PARALLEL};
use crate::config::Config;
use crate::error::PinyinsubResult;
use crate::font::{FontMetrics, FontResolver, FontSet};
use crate::layout::{fit_font_size, pack_sentences, position_lines, PlacedLine};
use crate::paginate::{page_sentences, paginate, Page};
use crate::script::ScriptLine;
use crate::timing::{distribute_frames, fallback_duration, unit_count};
use colored::*;
use serde::Serialize;
use std::ops::Range;
use std::path::{Path, PathBuf};

/// Everything a renderer needs to draw the lesson frames.
#[derive(Debug, Serialize)]
pub struct LayoutDocument {
    pub fps: u32,
    pub fonts: FontNames,
    pub pages: Vec<PageLayout>,
}

#[derive(Debug, Serialize)]
pub struct FontNames {
    pub hanzi: String,
    pub latin: String,
}

#[derive(Debug, Serialize)]
pub struct PageLayout {
    /// Script lines shown on this page.
    pub lines: Range<usize>,
    pub rows: Vec<PlacedLine>,
    pub translation: TranslationBlock,
    pub sentences: Vec<SentenceTiming>,
}

#[derive(Debug, Serialize)]
pub struct TranslationBlock {
    pub text: String,
    pub font_size: f32,
    pub lines: Vec<String>,
}

/// Highlight schedule of one script line. Item `first_item + k` is
/// highlighted for `frames[k]` frames.
#[derive(Debug, Serialize)]
pub struct SentenceTiming {
    pub line: usize,
    pub first_item: usize,
    pub duration_secs: f64,
    pub frames: Vec<u32>,
}

/// Build the page layouts for already aligned script lines.
pub fn build_document(
    lines: &[ScriptLine],
    syllables: &[Vec<String>],
    config: &Config,
    fonts: &FontSet,
) -> LayoutDocument {
    let hanzi = fonts.hanzi.metrics.as_ref();
    let latin = fonts.latin.metrics.as_ref();
    let pages = paginate(lines, syllables, &config.layout, hanzi, latin)
        .iter()
        .map(|page| layout_page(page, lines, syllables, config, hanzi, latin))
        .collect();

    LayoutDocument {
        fps: config.timing.fps,
        fonts: FontNames {
            hanzi: fonts.hanzi.source.to_string(),
            latin: fonts.latin.source.to_string(),
        },
        pages,
    }
}

fn layout_page(
    page: &Page,
    lines: &[ScriptLine],
    syllables: &[Vec<String>],
    config: &Config,
    hanzi: &dyn FontMetrics,
    latin: &dyn FontMetrics,
) -> PageLayout {
    let layout = &config.layout;
    let mut timings = Vec::new();
    let mut first_item = 0;

    for i in page.lines.clone() {
        let line = &lines[i];
        let units = unit_count(line);
        let duration = fallback_duration(units, &config.timing);
        timings.push(SentenceTiming {
            line: i,
            first_item,
            duration_secs: duration,
            frames: distribute_frames(duration, config.timing.fps, units),
        });
        first_item += units;
    }

    let sentences = page_sentences(lines, page.lines.clone(), syllables, layout, hanzi, latin);
    let packed = pack_sentences(&sentences, hanzi, latin, layout);
    let rows = position_lines(&packed, hanzi, latin, layout);

    let fitted = fit_font_size(
        &page.translation,
        latin,
        layout,
        layout.max_width,
        Some(layout.max_height),
    );

    PageLayout {
        lines: page.lines.clone(),
        rows,
        translation: TranslationBlock {
            text: page.translation.clone(),
            font_size: fitted.size,
            lines: fitted.lines,
        },
        sentences: timings,
    }
}

pub async fn run(
    script: &Path,
    config_path: Option<&Path>,
    output: Option<PathBuf>,
    parallel: Option<usize>,
) -> PinyinsubResult<()> {
    let (lines, config) = load_inputs(script, config_path)?;
    let parallel = parallel.unwrap_or(DEFAULT_PARALLEL);

    eprintln!(
        "{} Aligning {} lines (max {} concurrent)",
        "layout:".cyan().bold(),
        lines.len(),
        parallel
    );
    let syllables = align_lines(&lines, parallel).await?;

    let fonts = FontResolver::new(&config.fonts).resolve_all();
    for diagnostic in fonts.diagnostics() {
        eprintln!("{} {diagnostic}", "warning:".yellow().bold());
    }

    let document = build_document(&lines, &syllables, &config, &fonts);
    let json = serde_json::to_string_pretty(&document)?;

    match output {
        Some(path) => {
            std::fs::write(&path, json)?;
            eprintln!(
                "{} {} pages written to {}",
                "done:".green().bold(),
                document.pages.len(),
                path.display()
            );
        }
        None => println!("{json}"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::{BuiltinMetrics, FontSource, ResolvedFont};
    use crate::layout::rows_height;
    use crate::script::parse_script;
    use std::sync::Arc;

    fn builtin_fonts() -> FontSet {
        let builtin = || ResolvedFont {
            metrics: Arc::new(BuiltinMetrics),
            source: FontSource::Builtin,
            diagnostic: None,
        };
        FontSet {
            hanzi: builtin(),
            latin: builtin(),
        }
    }

    async fn document_for(script: &str, config: &Config) -> LayoutDocument {
        let lines = parse_script(script).unwrap();
        let syllables = align_lines(&lines, 2).await.unwrap();
        build_document(&lines, &syllables, config, &builtin_fonts())
    }

    #[tokio::test]
    async fn test_single_page_document() {
        let doc = document_for("你好！|nǐhǎo|Hello!\nGracias|Thanks", &Config::default()).await;
        assert_eq!(doc.fps, 24);
        assert_eq!(doc.pages.len(), 1);

        let page = &doc.pages[0];
        assert_eq!(page.translation.text, "Hello! Thanks");
        assert_eq!(page.rows.len(), 1);

        let items = &page.rows[0].items;
        assert_eq!(items.len(), 4); // 你 好 ！ Gracias
        assert_eq!(items[0].label.as_ref().map(|l| l.text.as_str()), Some("nǐ"));
        assert_eq!(items[1].label.as_ref().map(|l| l.text.as_str()), Some("hǎo"));
        assert!(items[2].label.is_none());
        assert_eq!(items[3].sentence, 1);
    }

    #[tokio::test]
    async fn test_sentence_timing_offsets() {
        let doc = document_for("你好！|nǐhǎo|Hello!\nGracias amigo|Thanks friend", &Config::default()).await;
        let timings = &doc.pages[0].sentences;
        assert_eq!(timings.len(), 2);
        assert_eq!(timings[0].first_item, 0);
        assert_eq!(timings[0].frames, vec![12, 12, 12]);
        assert_eq!(timings[1].first_item, 3);
        assert_eq!(timings[1].frames.len(), 2);
    }

    #[tokio::test]
    async fn test_translation_only_line_keeps_a_frame() {
        let doc = document_for("你好|nǐ hǎo|hi\njust a translation", &Config::default()).await;
        let timings = &doc.pages[0].sentences;
        assert_eq!(timings[1].line, 1);
        assert_eq!(timings[1].first_item, 2);
        assert_eq!(timings[1].frames, vec![2]); // 0.1s at 24fps
        // nothing drawn for the blank top text
        assert!(doc.pages[0].rows.iter().all(|r| r.items.iter().all(|i| i.sentence == 0)));
    }

    #[tokio::test]
    async fn test_plain_line_draws_pronunciation_row() {
        let doc = document_for("Hola amigo|OH-la a-MEE-go|Hello friend", &Config::default()).await;
        let row = &doc.pages[0].rows[0];
        assert!(row.label_y.is_some());
        let labels: Vec<_> = row
            .items
            .iter()
            .filter_map(|i| i.label.as_ref().map(|l| l.text.as_str()))
            .collect();
        assert_eq!(labels, vec!["OH-la", "a-MEE-go"]);
        assert_eq!(doc.pages[0].sentences[0].frames.len(), 2);
    }

    #[tokio::test]
    async fn test_small_box_paginates() {
        let mut config = Config::default();
        // one 38.4px row holds both lines, which is over budget
        config.layout.max_height = 30.0;
        let doc = document_for("你好|nǐ hǎo|hi\n谢谢|xiè xie|thanks", &config).await;
        assert_eq!(doc.pages.len(), 2);
        assert_eq!(doc.pages[1].lines, 1..2);
        assert_eq!(doc.pages[1].sentences[0].first_item, 0);
    }

    #[tokio::test]
    async fn test_pages_stay_within_box_height() {
        let script = "一二三四五六七八九十一二三四五六七八九|yi er san|x\n".repeat(3);
        let config = Config::default();
        let doc = document_for(&script, &config).await;
        assert_eq!(doc.pages.len(), 2);
        for page in &doc.pages {
            let height = rows_height(&page.rows, &config.layout);
            assert!(
                height <= config.layout.max_height,
                "page {:?} is {height}px tall",
                page.lines
            );
        }
    }

    #[tokio::test]
    async fn test_run_writes_json() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("lesson.txt");
        std::fs::write(&script, "你好|nǐ hǎo|Hello\n").unwrap();
        let out = dir.path().join("layout.json");
        run(&script, None, Some(out.clone()), Some(1)).await.unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(value["pages"][0]["lines"]["start"], 0);
        assert_eq!(value["pages"][0]["rows"][0]["items"][0]["text"], "你");
    }
}
