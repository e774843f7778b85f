use crate::commands::{align_lines, load_inputs, DEFAULT_PARALLEL};
use crate::config::TimingConfig;
use crate::error::PinyinsubResult;
use crate::script::ScriptLine;
use crate::subtitle::{build_entries, to_srt};
use crate::timing::{fallback_duration, unit_count};
use colored::*;
use std::path::{Path, PathBuf};

/// Per-line durations when no narration timing is known.
pub fn line_durations(lines: &[ScriptLine], timing: &TimingConfig) -> Vec<f64> {
    lines
        .iter()
        .map(|line| fallback_duration(unit_count(line), timing))
        .collect()
}

pub async fn render_srt(script: &Path, config_path: Option<&Path>) -> PinyinsubResult<String> {
    let (lines, config) = load_inputs(script, config_path)?;
    let syllables = align_lines(&lines, DEFAULT_PARALLEL).await?;
    let durations = line_durations(&lines, &config.timing);
    Ok(to_srt(&build_entries(&lines, &syllables, &durations)))
}

pub async fn run(
    script: &Path,
    config_path: Option<&Path>,
    output: Option<PathBuf>,
) -> PinyinsubResult<()> {
    let srt = render_srt(script, config_path).await?;
    let output = output.unwrap_or_else(|| script.with_extension("srt"));
    std::fs::write(&output, srt)?;
    eprintln!(
        "{} Subtitles written to {}",
        "done:".green().bold(),
        output.display()
    );
    Ok(())
}
