use crate::error::{PinyinsubError, PinyinsubResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "pinyinsub.toml";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub layout: LayoutConfig,
    #[serde(default)]
    pub fonts: FontsConfig,
    #[serde(default)]
    pub timing: TimingConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LayoutConfig {
    /// Width of the top text box in pixels.
    #[serde(default = "default_max_width")]
    pub max_width: f32,
    /// Height budget of the top text box per page.
    #[serde(default = "default_max_height")]
    pub max_height: f32,
    #[serde(default = "default_base_font_size")]
    pub base_font_size: f32,
    #[serde(default = "default_min_font_size")]
    pub min_font_size: f32,
    #[serde(default = "default_line_spacing")]
    pub line_spacing: f32,
    #[serde(default = "default_pad_ratio")]
    pub pad_ratio: f32,
    #[serde(default = "default_min_pad")]
    pub min_pad: f32,
    #[serde(default = "default_pinyin_scale")]
    pub pinyin_scale: f32,
    /// Left edge of the first cell on every line.
    #[serde(default = "default_origin_x")]
    pub origin_x: f32,
    /// Top of the first text line.
    #[serde(default = "default_origin_y")]
    pub origin_y: f32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FontsConfig {
    /// Family names or font file paths, in priority order.
    #[serde(default = "default_hanzi_fonts")]
    pub hanzi: Vec<String>,
    #[serde(default = "default_latin_fonts")]
    pub latin: Vec<String>,
    /// Extra directories to scan in addition to the system fonts.
    #[serde(default)]
    pub dirs: Vec<PathBuf>,
    /// Glyph a Hanzi font must be able to draw to be accepted.
    #[serde(default = "default_test_glyph")]
    pub test_glyph: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TimingConfig {
    #[serde(default = "default_fps")]
    pub fps: u32,
    #[serde(default = "default_frames_per_word")]
    pub default_frames_per_word: u32,
}

// Defaults
fn default_max_width() -> f32 {
    640.0
}
fn default_max_height() -> f32 {
    165.0
}
fn default_base_font_size() -> f32 {
    32.0
}
fn default_min_font_size() -> f32 {
    12.0
}
fn default_line_spacing() -> f32 {
    10.0
}
fn default_pad_ratio() -> f32 {
    0.12
}
fn default_min_pad() -> f32 {
    4.0
}
fn default_pinyin_scale() -> f32 {
    0.45
}
fn default_origin_x() -> f32 {
    80.0
}
fn default_origin_y() -> f32 {
    70.0
}
fn default_hanzi_fonts() -> Vec<String> {
    [
        "Noto Sans CJK SC",
        "Source Han Sans SC",
        "Microsoft YaHei",
        "SimHei",
        "SimSun",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}
fn default_latin_fonts() -> Vec<String> {
    ["Arial", "DejaVu Sans", "Liberation Sans"]
        .into_iter()
        .map(String::from)
        .collect()
}
fn default_test_glyph() -> String {
    "你".into()
}
fn default_fps() -> u32 {
    24
}
fn default_frames_per_word() -> u32 {
    12
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            max_width: default_max_width(),
            max_height: default_max_height(),
            base_font_size: default_base_font_size(),
            min_font_size: default_min_font_size(),
            line_spacing: default_line_spacing(),
            pad_ratio: default_pad_ratio(),
            min_pad: default_min_pad(),
            pinyin_scale: default_pinyin_scale(),
            origin_x: default_origin_x(),
            origin_y: default_origin_y(),
        }
    }
}

impl Default for FontsConfig {
    fn default() -> Self {
        Self {
            hanzi: default_hanzi_fonts(),
            latin: default_latin_fonts(),
            dirs: Vec::new(),
            test_glyph: default_test_glyph(),
        }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            fps: default_fps(),
            default_frames_per_word: default_frames_per_word(),
        }
    }
}

impl LayoutConfig {
    /// Horizontal padding added to a character's advance to form its cell:
    /// `max(min_pad, pad_ratio * size)`, truncated to whole pixels.
    pub fn pad_for(&self, font_size: f32) -> f32 {
        (font_size * self.pad_ratio).floor().max(self.min_pad)
    }

    /// Pinyin label size for a Hanzi font size, never below 10px.
    pub fn pinyin_size(&self, font_size: f32) -> f32 {
        (font_size * self.pinyin_scale).floor().max(10.0)
    }

    /// Label size assumed for a line with no annotated items.
    pub fn pinyin_row_size(&self) -> f32 {
        (self.base_font_size / 2.0).floor().max(10.0)
    }
}

impl FontsConfig {
    pub fn test_char(&self) -> char {
        self.test_glyph.chars().next().unwrap_or('你')
    }
}

impl Config {
    /// Apply the non-None fields of `update`.
    pub fn apply(&mut self, update: &ConfigUpdate) {
        if let Some(w) = update.max_width {
            self.layout.max_width = w;
        }
        if let Some(h) = update.max_height {
            self.layout.max_height = h;
        }
        if let Some(size) = update.base_font_size {
            self.layout.base_font_size = size;
        }
        if let Some(ref fonts) = update.hanzi_fonts {
            self.fonts.hanzi = fonts.clone();
        }
        if let Some(ref fonts) = update.latin_fonts {
            self.fonts.latin = fonts.clone();
        }
        if let Some(fps) = update.fps {
            self.timing.fps = fps;
        }
        if let Some(fpw) = update.default_frames_per_word {
            self.timing.default_frames_per_word = fpw;
        }
    }

    pub fn validate(&self) -> PinyinsubResult<()> {
        let l = &self.layout;
        if l.max_width <= 0.0 || l.max_height <= 0.0 {
            return Err(PinyinsubError::ConfigParse(
                "layout.max_width and layout.max_height must be positive".into(),
            ));
        }
        if l.min_font_size <= 0.0 || l.min_font_size > l.base_font_size {
            return Err(PinyinsubError::ConfigParse(format!(
                "layout.min_font_size ({}) must be positive and not exceed base_font_size ({})",
                l.min_font_size, l.base_font_size
            )));
        }
        if self.timing.fps == 0 {
            return Err(PinyinsubError::ConfigParse(
                "timing.fps must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// All-optional struct for partial config updates.
#[derive(Debug, Default)]
pub struct ConfigUpdate {
    pub max_width: Option<f32>,
    pub max_height: Option<f32>,
    pub base_font_size: Option<f32>,
    pub hanzi_fonts: Option<Vec<String>>,
    pub latin_fonts: Option<Vec<String>>,
    pub fps: Option<u32>,
    pub default_frames_per_word: Option<u32>,
}

/// Save a `Config` to `dir/pinyinsub.toml`.
pub fn save_config(dir: &Path, config: &Config) -> PinyinsubResult<()> {
    let toml_str =
        toml::to_string_pretty(config).map_err(|e| PinyinsubError::ConfigParse(e.to_string()))?;
    std::fs::write(dir.join(CONFIG_FILE), toml_str)?;
    Ok(())
}

pub fn load_config(path: &Path) -> PinyinsubResult<Config> {
    if !path.exists() {
        return Err(PinyinsubError::ConfigNotFound(path.to_path_buf()));
    }
    let content = std::fs::read_to_string(path)?;
    toml::from_str(&content).map_err(|e| PinyinsubError::ConfigParse(e.to_string()))
}

/// Pick the config for a run: an explicit path must exist, otherwise a
/// `pinyinsub.toml` next to the script is used if present, else defaults.
pub fn resolve_config(explicit: Option<&Path>, script_dir: Option<&Path>) -> PinyinsubResult<Config> {
    let config = match explicit {
        Some(path) => load_config(path)?,
        None => match script_dir.map(|d| d.join(CONFIG_FILE)) {
            Some(candidate) if candidate.exists() => load_config(&candidate)?,
            _ => Config::default(),
        },
    };
    config.validate()?;
    Ok(config)
}
