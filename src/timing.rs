use crate::config::TimingConfig;
use crate::script::{ScriptLine, TopText};

/// Highlightable units of a line: every non-space character of Hanzi text,
/// every word otherwise. Matches the item count produced by the layout.
pub fn unit_count(line: &ScriptLine) -> usize {
    match &line.top {
        TopText::Chinese { hanzi, .. } => hanzi.chars().filter(|c| !c.is_whitespace()).count(),
        TopText::Plain { text, .. } => text.split_whitespace().count(),
        TopText::Blank => 0,
    }
}

/// Duration to assume for a line when no narration audio is available.
pub fn fallback_duration(units: usize, timing: &TimingConfig) -> f64 {
    let fps = f64::from(timing.fps.max(1));
    let secs = units as f64 * f64::from(timing.default_frames_per_word) / fps;
    secs.max(0.1)
}

/// Split a line's frames across its units: each unit gets
/// `total / units` frames and the first `total % units` one extra.
/// `total` is the duration in frames (at least 1); zero units count as one.
pub fn distribute_frames(duration_secs: f64, fps: u32, units: usize) -> Vec<u32> {
    let units = units.max(1);
    let total = ((duration_secs * f64::from(fps)).round() as u32).max(1);
    let base = total / units as u32;
    let extra = (total % units as u32) as usize;
    (0..units)
        .map(|i| base + u32::from(i < extra))
        .collect()
}
