use crate::config::{save_config, Config, ConfigUpdate, CONFIG_FILE};
use crate::error::{PinyinsubError, PinyinsubResult};
use colored::*;
use std::path::{Path, PathBuf};

pub const SAMPLE_SCRIPT: &str = "lesson.txt";

const SAMPLE_LESSON: &str = "\
你好！|nǐ hǎo|Hello!
我是学生。|wǒ shì xuésheng|I am a student.
我们去吃饭吧。|wǒmen qù chīfàn ba|Let's go eat.
谢谢|Thank you
See you tomorrow!
";

/// Options for lesson directory creation.
#[derive(Debug, Default)]
pub struct InitOptions {
    pub path: PathBuf,
    pub overrides: ConfigUpdate,
}

/// Files written by `create_lesson`, relative to the lesson directory.
#[derive(Debug)]
pub struct InitResult {
    pub path: PathBuf,
    pub files: Vec<String>,
    pub config: Config,
}

pub fn create_lesson(opts: &InitOptions) -> PinyinsubResult<InitResult> {
    let path = &opts.path;
    if path.join(CONFIG_FILE).exists() {
        return Err(PinyinsubError::AlreadyInitialized(path.to_path_buf()));
    }

    // Nothing touches the disk until the overrides validate
    let mut config = Config::default();
    config.apply(&opts.overrides);
    config.validate()?;

    std::fs::create_dir_all(path)?;
    save_config(path, &config)?;
    let mut files = vec![CONFIG_FILE.to_string()];

    // Never clobber an existing script
    let script = path.join(SAMPLE_SCRIPT);
    if !script.exists() {
        std::fs::write(&script, SAMPLE_LESSON)?;
        files.push(SAMPLE_SCRIPT.to_string());
    }

    Ok(InitResult {
        path: path.to_path_buf(),
        files,
        config,
    })
}

/// CLI entry point, delegates to `create_lesson()`.
pub fn run(path: &Path, overrides: ConfigUpdate) -> PinyinsubResult<()> {
    let result = create_lesson(&InitOptions {
        path: path.to_path_buf(),
        overrides,
    })?;

    eprintln!(
        "{} Created lesson at {}",
        "done:".green().bold(),
        result.path.display()
    );
    for file in &result.files {
        eprintln!("  {file}");
    }
    let layout = &result.config.layout;
    eprintln!(
        "  text box {}x{}px, {}px base font, {} fps",
        layout.max_width, layout.max_height, layout.base_font_size, result.config.timing.fps
    );
    eprintln!();
    eprintln!("Next: edit {}, then run:", SAMPLE_SCRIPT.cyan());
    eprintln!(
        "  pinyinsub layout {}",
        path.join(SAMPLE_SCRIPT).display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::load_config;
    use crate::script::load_script;

    #[test]
    fn test_create_lesson_default() {
        let dir = tempfile::tempdir().unwrap();
        let lesson = dir.path().join("lesson-1");
        let result = create_lesson(&InitOptions {
            path: lesson.clone(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(result.files, vec![CONFIG_FILE, SAMPLE_SCRIPT]);

        let config = load_config(&lesson.join(CONFIG_FILE)).unwrap();
        assert_eq!(config.timing.fps, 24);

        // The sample script parses
        let lines = load_script(&lesson.join(SAMPLE_SCRIPT)).unwrap();
        assert_eq!(lines.len(), 5);
        assert!(lines[0].is_chinese());
        assert_eq!(lines[4].top_text(), "");
    }

    #[test]
    fn test_create_lesson_with_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let result = create_lesson(&InitOptions {
            path: dir.path().to_path_buf(),
            overrides: ConfigUpdate {
                fps: Some(30),
                hanzi_fonts: Some(vec!["KaiTi".into()]),
                ..Default::default()
            },
        })
        .unwrap();
        assert_eq!(result.config.timing.fps, 30);

        let config = load_config(&dir.path().join(CONFIG_FILE)).unwrap();
        assert_eq!(config.fonts.hanzi, vec!["KaiTi"]);
        assert_eq!(config.layout.max_width, 640.0);
    }

    #[test]
    fn test_create_lesson_already_initialized() {
        let dir = tempfile::tempdir().unwrap();
        let opts = InitOptions {
            path: dir.path().to_path_buf(),
            ..Default::default()
        };
        create_lesson(&opts).unwrap();
        let err = create_lesson(&opts).unwrap_err();
        assert!(matches!(err, PinyinsubError::AlreadyInitialized(_)));
    }

    #[test]
    fn test_invalid_override_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let lesson = dir.path().join("lesson");
        let bad = InitOptions {
            path: lesson.clone(),
            overrides: ConfigUpdate {
                base_font_size: Some(8.0), // below min_font_size
                ..Default::default()
            },
        };
        let err = create_lesson(&bad).unwrap_err();
        assert!(matches!(err, PinyinsubError::ConfigParse(_)));
        assert!(!lesson.join(CONFIG_FILE).exists());
        assert!(!lesson.join(SAMPLE_SCRIPT).exists());

        // a corrected retry is not blocked by the failed attempt
        let result = create_lesson(&InitOptions {
            path: lesson.clone(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(result.files, vec![CONFIG_FILE, SAMPLE_SCRIPT]);
    }

    #[test]
    fn test_existing_script_kept() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(SAMPLE_SCRIPT), "再见|Bye\n").unwrap();
        let result = create_lesson(&InitOptions {
            path: dir.path().to_path_buf(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(result.files, vec![CONFIG_FILE]);
        let content = std::fs::read_to_string(dir.path().join(SAMPLE_SCRIPT)).unwrap();
        assert_eq!(content, "再见|Bye\n");
    }
}
