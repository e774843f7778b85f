use crate::config::resolve_config;
use crate::error::{PinyinsubError, PinyinsubResult};
use crate::font::{FontResolver, FontSet, FontSource, ResolvedFont};
use colored::*;
use std::path::Path;

/// One line of the font report.
fn describe(role: &str, font: &ResolvedFont, glyph: char) -> String {
    let status = match font.source {
        FontSource::Builtin => "approximate metrics, no outlines".to_string(),
        _ if font.metrics.glyph_bounds(glyph, 32.0).is_some() => format!("renders '{glyph}'"),
        _ => format!("cannot render '{glyph}'"),
    };
    format!("{role:<6} {} ({status})", font.source)
}

pub fn report(fonts: &FontSet, test_glyph: char) -> Vec<String> {
    vec![
        describe("hanzi", &fonts.hanzi, test_glyph),
        describe("latin", &fonts.latin, 'A'),
    ]
}

/// Fails when any font fell back to builtin metrics.
pub fn check_strict(fonts: &FontSet) -> PinyinsubResult<()> {
    let diagnostics: Vec<&str> = fonts.diagnostics().collect();
    if diagnostics.is_empty() {
        Ok(())
    } else {
        Err(PinyinsubError::Font(diagnostics.join("; ")))
    }
}

pub fn run(config_path: Option<&Path>, strict: bool) -> PinyinsubResult<()> {
    let config = resolve_config(config_path, Some(Path::new(".")))?;
    let fonts = FontResolver::new(&config.fonts).resolve_all();

    for line in report(&fonts, config.fonts.test_char()) {
        println!("{line}");
    }
    if strict {
        check_strict(&fonts)?;
    }
    let mut degraded = false;
    for diagnostic in fonts.diagnostics() {
        degraded = true;
        eprintln!("{} {diagnostic}", "warning:".yellow().bold());
    }
    if !degraded {
        eprintln!("{} all fonts resolved", "done:".green().bold());
    }
    Ok(())
}
