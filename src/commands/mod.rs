pub mod align;
pub mod fonts;
pub mod init;
pub mod layout;
pub mod srt;

use crate::align::{align, align_words};
use crate::config::{resolve_config, Config};
use crate::error::{PinyinsubError, PinyinsubResult};
use crate::script::{load_script, ScriptLine, TopText};
use futures::stream::{self, StreamExt};
use std::path::Path;

/// Default number of lines aligned concurrently.
pub const DEFAULT_PARALLEL: usize = 4;

/// Load a script and the config that applies to it.
pub fn load_inputs(
    script: &Path,
    config_path: Option<&Path>,
) -> PinyinsubResult<(Vec<ScriptLine>, Config)> {
    let lines = load_script(script)?;
    let config = resolve_config(config_path, script.parent())?;
    Ok((lines, config))
}

/// Align the pinyin of every annotated Chinese line, at most `parallel` lines
/// at a time. The result is indexed like `lines`; lines without pinyin get
/// an empty list.
pub async fn align_lines(
    lines: &[ScriptLine],
    parallel: usize,
) -> PinyinsubResult<Vec<Vec<String>>> {
    let jobs: Vec<(usize, String, String)> = lines
        .iter()
        .enumerate()
        .filter_map(|(i, line)| match &line.top {
            TopText::Chinese { hanzi, pinyin } if !pinyin.is_empty() => {
                Some((i, hanzi.clone(), pinyin.clone()))
            }
            _ => None,
        })
        .collect();

    let results: Vec<_> = stream::iter(jobs)
        .map(|(i, hanzi, pinyin)| async move {
            let syllables = tokio::task::spawn_blocking(move || align(&pinyin, &hanzi))
                .await
                .map_err(|e| PinyinsubError::Other(format!("alignment of line {} failed: {e}", i + 1)))?;
            Ok::<_, PinyinsubError>((i, syllables))
        })
        .buffer_unordered(parallel.max(1))
        .collect()
        .await;

    // Collect results in line order; pronunciations of plain lines are split inline
    let mut aligned: Vec<Vec<String>> = lines
        .iter()
        .map(|line| match &line.top {
            TopText::Plain {
                text,
                pronunciation,
            } => align_words(pronunciation, text),
            _ => Vec::new(),
        })
        .collect();
    for result in results {
        let (i, syllables) = result?;
        aligned[i] = syllables;
    }
    Ok(aligned)
}
