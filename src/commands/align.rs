use crate::align::{align_detailed, AlignStrategy, Alignment};
use crate::error::PinyinsubResult;
use crate::hanzi::is_cjk;
use colored::*;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct AlignReport {
    pub hanzi: String,
    pub pinyin: String,
    #[serde(flatten)]
    pub alignment: Alignment,
}

/// Pair each CJK character with its syllable. Missing syllables (no pinyin
/// given) show as empty strings.
pub fn pairs(hanzi: &str, syllables: &[String]) -> Vec<(char, String)> {
    hanzi
        .chars()
        .filter(|c| is_cjk(*c))
        .enumerate()
        .map(|(i, ch)| (ch, syllables.get(i).cloned().unwrap_or_default()))
        .collect()
}

pub fn run(hanzi: &str, pinyin: Option<&str>, json: bool) -> PinyinsubResult<()> {
    let pinyin = pinyin.unwrap_or("");
    let alignment = align_detailed(pinyin, hanzi);

    if json {
        let report = AlignReport {
            hanzi: hanzi.to_string(),
            pinyin: pinyin.to_string(),
            alignment,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if alignment.strategy == AlignStrategy::Unaligned {
        eprintln!(
            "{} no Hanzi in input, tokens left as given",
            "warning:".yellow().bold()
        );
        for token in &alignment.syllables {
            println!("{token}");
        }
    } else {
        for (ch, syllable) in pairs(hanzi, &alignment.syllables) {
            println!("{ch}\t{syllable}");
        }
    }
    eprintln!(
        "{} {:?}",
        "strategy:".cyan().bold(),
        alignment.strategy
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pairs_skip_punctuation() {
        let syllables = vec!["nǐ".to_string(), "hǎo".to_string()];
        let pairs = pairs("你，好！", &syllables);
        assert_eq!(pairs, vec![('你', "nǐ".to_string()), ('好', "hǎo".to_string())]);
    }

    #[test]
    fn test_pairs_without_pinyin() {
        let pairs = pairs("再见", &[]);
        assert_eq!(pairs.len(), 2);
        assert!(pairs.iter().all(|(_, s)| s.is_empty()));
    }

    #[test]
    fn test_report_serializes_flat() {
        let report = AlignReport {
            hanzi: "你好".into(),
            pinyin: "nihao".into(),
            alignment: align_detailed("nihao", "你好"),
        };
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["strategy"], "segmented");
        assert_eq!(value["syllables"][1], "hao");
    }
}
