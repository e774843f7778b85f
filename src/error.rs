use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PinyinsubError {
    #[error("Config file not found: {0}")]
    ConfigNotFound(PathBuf),

    #[error("Failed to parse config: {0}")]
    ConfigParse(String),

    #[error("Script not found: {0}")]
    ScriptNotFound(PathBuf),

    #[error("Script error on line {line}: {message}")]
    ScriptParse { line: usize, message: String },

    #[error("No usable lines in {0}")]
    EmptyScript(PathBuf),

    #[error("Font error: {0}")]
    Font(String),

    #[error("Already initialized: {0} already exists")]
    AlreadyInitialized(PathBuf),

    #[error("JSON error: {0}")]
    Json(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl PinyinsubError {
    /// Return an actionable hint for the user, if applicable.
    pub fn hint(&self) -> Option<String> {
        match self {
            PinyinsubError::ConfigNotFound(_) => Some(
                "Run 'pinyinsub init <dir>' to create a pinyinsub.toml, or drop --config to use defaults.".into(),
            ),
            PinyinsubError::ConfigParse(msg) => {
                if msg.contains("unknown field") {
                    Some("Valid sections are [layout], [fonts] and [timing]. Run 'pinyinsub init' for a complete example.".into())
                } else {
                    Some("Check pinyinsub.toml syntax. Run 'pinyinsub init <dir>' to generate a valid example config.".into())
                }
            }
            PinyinsubError::ScriptNotFound(_) => {
                Some("Pass the path of a UTF-8 text file with one 'Hanzi|Pinyin|English' line per sentence.".into())
            }
            PinyinsubError::ScriptParse { .. } => Some(
                "Each line takes at most three '|' separated fields: Hanzi|Pinyin|English.".into(),
            ),
            PinyinsubError::EmptyScript(_) => {
                Some("The script has no non-blank lines. Add at least one sentence.".into())
            }
            PinyinsubError::Font(_) => Some(
                "Install a CJK font (e.g. Noto Sans CJK SC) or list a font file under [fonts] hanzi in pinyinsub.toml.".into(),
            ),
            PinyinsubError::AlreadyInitialized(_) => Some(
                "Use a different directory, or edit the existing pinyinsub.toml.".into(),
            ),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for PinyinsubError {
    fn from(e: serde_json::Error) -> Self {
        PinyinsubError::Json(e.to_string())
    }
}

pub type PinyinsubResult<T> = Result<T, PinyinsubError>;
