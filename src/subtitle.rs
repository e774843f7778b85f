use crate::script::ScriptLine;

/// A single subtitle entry (one script line).
#[derive(Debug, Clone)]
pub struct SubtitleEntry {
    pub index: usize,
    pub start_secs: f64,
    pub end_secs: f64,
    pub text: String,
}

/// Build back-to-back entries, one per script line. The entry text stacks
/// the Hanzi (or plain) line, its aligned pinyin (or pronunciation) and the
/// translation.
/// Lines with nothing to show still consume their duration.
pub fn build_entries(
    lines: &[ScriptLine],
    syllables: &[Vec<String>],
    durations: &[f64],
) -> Vec<SubtitleEntry> {
    let mut entries = Vec::new();
    let mut cursor = 0.0_f64;

    for (i, line) in lines.iter().enumerate() {
        let duration = durations.get(i).copied().unwrap_or(0.0);
        let pinyin = syllables
            .get(i)
            .map(|s| {
                s.iter()
                    .filter(|p| !p.is_empty())
                    .map(String::as_str)
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .unwrap_or_default();

        let text = [line.top_text(), pinyin.as_str(), line.translation.as_str()]
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("\n");

        if !text.is_empty() {
            entries.push(SubtitleEntry {
                index: entries.len() + 1,
                start_secs: cursor,
                end_secs: cursor + duration,
                text,
            });
        }
        cursor += duration;
    }

    entries
}

/// Write subtitle entries as SRT format string.
pub fn to_srt(entries: &[SubtitleEntry]) -> String {
    let mut out = String::new();
    for entry in entries {
        out.push_str(&format!("{}\n", entry.index));
        out.push_str(&format!(
            "{} --> {}\n",
            format_srt_time(entry.start_secs),
            format_srt_time(entry.end_secs),
        ));
        out.push_str(&entry.text);
        out.push_str("\n\n");
    }
    out
}

/// Format seconds as SRT timestamp: "HH:MM:SS,mmm"
fn format_srt_time(secs: f64) -> String {
    let total_ms = (secs * 1000.0).round() as u64;
    let ms = total_ms % 1000;
    let total_s = total_ms / 1000;
    let s = total_s % 60;
    let total_m = total_s / 60;
    let m = total_m % 60;
    let h = total_m / 60;
    format!("{h:02}:{m:02}:{s:02},{ms:03}")
}
