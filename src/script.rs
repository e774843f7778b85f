use crate::error::{PinyinsubError, PinyinsubResult};
use crate::hanzi::contains_cjk;
use std::path::Path;
use tracing::debug;

/// Text shown in the top box for one script line.
#[derive(Debug, Clone, PartialEq)]
pub enum TopText {
    /// Hanzi with an optional pinyin annotation (empty when not supplied).
    Chinese { hanzi: String, pinyin: String },
    /// Non-Chinese text with an optional pronunciation row drawn word by word.
    Plain { text: String, pronunciation: String },
    /// Translation-only line.
    Blank,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScriptLine {
    pub top: TopText,
    pub translation: String,
}

impl ScriptLine {
    /// Text drawn in the top box.
    pub fn top_text(&self) -> &str {
        match &self.top {
            TopText::Chinese { hanzi, .. } => hanzi,
            TopText::Plain { text, .. } => text,
            TopText::Blank => "",
        }
    }

    pub fn pinyin(&self) -> Option<&str> {
        match &self.top {
            TopText::Chinese { pinyin, .. } if !pinyin.is_empty() => Some(pinyin.as_str()),
            _ => None,
        }
    }

    /// Pronunciation hint of a non-Chinese line.
    pub fn pronunciation(&self) -> Option<&str> {
        match &self.top {
            TopText::Plain { pronunciation, .. } if !pronunciation.is_empty() => {
                Some(pronunciation.as_str())
            }
            _ => None,
        }
    }

    pub fn is_chinese(&self) -> bool {
        matches!(self.top, TopText::Chinese { .. })
    }
}

/// Parse a lesson script: one `Hanzi|Pinyin|English` (or `Hanzi|English`, or
/// a single field) per line. Blank lines are skipped. A script with neither
/// pipes nor Hanzi is read as running bilingual text, see `pair_sentences`.
pub fn parse_script(content: &str) -> PinyinsubResult<Vec<ScriptLine>> {
    if !content.contains('|') && !contains_cjk(content) {
        return Ok(pair_sentences(content));
    }

    let mut lines = Vec::new();
    for (i, raw) in content.lines().enumerate() {
        let raw = raw.trim();
        if raw.is_empty() {
            continue;
        }
        let fields: Vec<&str> = raw.split('|').map(str::trim).collect();
        let line = match fields.as_slice() {
            [top, pinyin, translation] => {
                if contains_cjk(top) {
                    ScriptLine {
                        top: TopText::Chinese {
                            hanzi: top.to_string(),
                            pinyin: pinyin.to_string(),
                        },
                        translation: translation.to_string(),
                    }
                } else {
                    ScriptLine {
                        top: plain(top, pinyin),
                        translation: translation.to_string(),
                    }
                }
            }
            [top, translation] => ScriptLine {
                top: if contains_cjk(top) {
                    TopText::Chinese {
                        hanzi: top.to_string(),
                        pinyin: String::new(),
                    }
                } else {
                    plain(top, "")
                },
                translation: translation.to_string(),
            },
            [only] => {
                if contains_cjk(only) {
                    ScriptLine {
                        top: TopText::Chinese {
                            hanzi: only.to_string(),
                            pinyin: String::new(),
                        },
                        translation: String::new(),
                    }
                } else {
                    ScriptLine {
                        top: TopText::Blank,
                        translation: only.to_string(),
                    }
                }
            }
            _ => {
                return Err(PinyinsubError::ScriptParse {
                    line: i + 1,
                    message: format!("expected at most 3 fields, found {}", fields.len()),
                })
            }
        };
        lines.push(line);
    }
    Ok(lines)
}

fn plain(text: &str, pronunciation: &str) -> TopText {
    if text.is_empty() {
        TopText::Blank
    } else {
        TopText::Plain {
            text: text.to_string(),
            pronunciation: pronunciation.to_string(),
        }
    }
}

/// Split running text into sentences. A sentence ends after a run of `.`, `!`
/// or `?`, or at a line break.
fn split_sentences(content: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut chars = content.char_indices().peekable();

    while let Some((i, ch)) = chars.next() {
        let next = chars.peek().map(|&(_, c)| c);
        let end = match ch {
            '\n' => Some(i),
            '.' | '!' | '?' if !matches!(next, Some('.' | '!' | '?')) => Some(i + ch.len_utf8()),
            _ => None,
        };
        if let Some(end) = end {
            out.push(content[start..end].trim());
            start = i + ch.len_utf8();
        }
    }
    out.push(content[start..].trim());
    out.retain(|s| !s.is_empty());
    out
}

const SPANISH_WORDS: &[&str] = &[
    "estoy", "hola", "mundo", "también", "entonces", "gracias", "yo", "tú", "usted",
];

/// Rough guess whether a sentence is the Spanish side of a bilingual pair.
fn is_spanish(sentence: &str) -> bool {
    if sentence.chars().any(|c| "áéíóúñüÁÉÍÓÚÑÜ¿¡".contains(c)) {
        return true;
    }
    sentence
        .split(|c: char| !c.is_alphanumeric())
        .any(|word| SPANISH_WORDS.contains(&word.to_lowercase().as_str()))
}

/// Pair Spanish sentences with the English sentence next to them, in either
/// order. The Spanish side goes to the top box. Sentences without a partner
/// stand alone: Spanish as top text, English as a translation-only line.
pub fn pair_sentences(content: &str) -> Vec<ScriptLine> {
    let sentences = split_sentences(content);
    let mut lines = Vec::new();
    let mut i = 0;

    while i < sentences.len() {
        let here = sentences[i];
        let spanish = is_spanish(here);
        match sentences.get(i + 1) {
            Some(&next) if is_spanish(next) != spanish => {
                let (top, translation) = if spanish { (here, next) } else { (next, here) };
                lines.push(ScriptLine {
                    top: plain(top, ""),
                    translation: translation.to_string(),
                });
                i += 2;
            }
            _ => {
                lines.push(if spanish {
                    ScriptLine {
                        top: plain(here, ""),
                        translation: String::new(),
                    }
                } else {
                    ScriptLine {
                        top: TopText::Blank,
                        translation: here.to_string(),
                    }
                });
                i += 1;
            }
        }
    }
    debug!(sentences = sentences.len(), lines = lines.len(), "paired unpiped script");
    lines
}

pub fn load_script(path: &Path) -> PinyinsubResult<Vec<ScriptLine>> {
    if !path.is_file() {
        return Err(PinyinsubError::ScriptNotFound(path.to_path_buf()));
    }
    let content = std::fs::read_to_string(path)?;
    let lines = parse_script(&content)?;
    if lines.is_empty() {
        return Err(PinyinsubError::EmptyScript(path.to_path_buf()));
    }
    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_three_fields() {
        let lines = parse_script("你好！| nǐ hǎo | Hello!").unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(
            lines[0].top,
            TopText::Chinese {
                hanzi: "你好！".into(),
                pinyin: "nǐ hǎo".into()
            }
        );
        assert_eq!(lines[0].translation, "Hello!");
        assert_eq!(lines[0].pinyin(), Some("nǐ hǎo"));
    }

    #[test]
    fn test_three_fields_without_hanzi() {
        let lines = parse_script("Hola amigo|OH-la a-MEE-go|Hello friend").unwrap();
        assert_eq!(
            lines[0].top,
            TopText::Plain {
                text: "Hola amigo".into(),
                pronunciation: "OH-la a-MEE-go".into()
            }
        );
        assert_eq!(lines[0].pronunciation(), Some("OH-la a-MEE-go"));
        assert_eq!(lines[0].pinyin(), None);
        assert_eq!(lines[0].translation, "Hello friend");
    }

    #[test]
    fn test_unpiped_script_pairs_sentences() {
        let lines = parse_script("Hola, ¿cómo estás? Hello, how are you?\nI am fine. Estoy bien.").unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].top_text(), "Hola, ¿cómo estás?");
        assert_eq!(lines[0].translation, "Hello, how are you?");
        // English first still puts Spanish on top
        assert_eq!(lines[1].top_text(), "Estoy bien.");
        assert_eq!(lines[1].translation, "I am fine.");
        assert_eq!(lines[1].pronunciation(), None);
    }

    #[test]
    fn test_unpiped_unpaired_sentences_stand_alone() {
        let lines = pair_sentences("Gracias. Muchas gracias. Thanks a lot... See you!");
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].top_text(), "Gracias.");
        assert_eq!(lines[0].translation, "");
        assert_eq!(lines[1].top_text(), "Muchas gracias.");
        assert_eq!(lines[1].translation, "Thanks a lot...");
        assert_eq!(lines[2].top, TopText::Blank);
        assert_eq!(lines[2].translation, "See you!");
    }

    #[test]
    fn test_two_fields() {
        let lines = parse_script("谢谢|Thanks\nGracias|Thanks").unwrap();
        assert!(lines[0].is_chinese());
        assert_eq!(lines[0].pinyin(), None);
        assert_eq!(lines[1].top_text(), "Gracias");
    }

    #[test]
    fn test_single_field() {
        let lines = parse_script("再见\nGoodbye").unwrap();
        assert_eq!(lines[0].top_text(), "再见");
        assert_eq!(lines[0].translation, "");
        assert_eq!(lines[1].top, TopText::Blank);
        assert_eq!(lines[1].translation, "Goodbye");
    }

    #[test]
    fn test_blank_lines_skipped() {
        let lines = parse_script("\n\n你好|nihao|hi\n   \n").unwrap();
        assert_eq!(lines.len(), 1);
    }

    #[test]
    fn test_too_many_fields() {
        let err = parse_script("ok|a|b\n你|ni|you|extra").unwrap_err();
        match err {
            PinyinsubError::ScriptParse { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_load_script_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.txt");
        assert!(matches!(
            load_script(&missing),
            Err(PinyinsubError::ScriptNotFound(_))
        ));

        let empty = dir.path().join("empty.txt");
        std::fs::write(&empty, "\n \n").unwrap();
        assert!(matches!(
            load_script(&empty),
            Err(PinyinsubError::EmptyScript(_))
        ));
    }

    #[test]
    fn test_load_script() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lesson.txt");
        std::fs::write(&path, "我是学生。|wǒ shì xuésheng|I am a student.\n").unwrap();
        let lines = load_script(&path).unwrap();
        assert_eq!(lines[0].top_text(), "我是学生。");
    }
}
