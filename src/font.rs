use crate::config::FontsConfig;
use crate::hanzi::is_cjk;
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Horizontal ink extent of a glyph relative to its pen position, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GlyphBounds {
    pub x_min: f32,
    pub width: f32,
}

/// Measurement capability the layout code depends on. Sizes are pixels.
pub trait FontMetrics: Send + Sync {
    fn advance_width(&self, ch: char, size: f32) -> f32;

    /// Tight bounding box of the rendered glyph, `None` for blank glyphs.
    fn glyph_bounds(&self, ch: char, size: f32) -> Option<GlyphBounds>;

    fn line_height(&self, size: f32) -> f32;

    fn text_width(&self, text: &str, size: f32) -> f32 {
        text.chars().map(|c| self.advance_width(c, size)).sum()
    }

    fn name(&self) -> &str;
}

/// Unscaled metrics of one glyph, in font units.
#[derive(Debug, Clone, Copy)]
struct GlyphUnits {
    advance: f32,
    /// `(x_min, width)` of the ink box, `None` for blank glyphs.
    ink: Option<(f32, f32)>,
}

/// A parsed font face (file bytes + collection index). Glyph metrics are
/// read from the face once per character and cached.
pub struct FontFace {
    name: String,
    data: Vec<u8>,
    index: u32,
    units_per_em: f32,
    line_units: f32,
    glyphs: RwLock<HashMap<char, GlyphUnits>>,
}

impl FontFace {
    pub fn from_bytes(data: Vec<u8>, index: u32, name: impl Into<String>) -> Option<Self> {
        let face = ttf_parser::Face::parse(&data, index).ok()?;
        let units_per_em = f32::from(face.units_per_em().max(1));
        let line_units = f32::from(face.ascender()) - f32::from(face.descender())
            + f32::from(face.line_gap());
        Some(Self {
            name: name.into(),
            data,
            index,
            units_per_em,
            line_units,
            glyphs: RwLock::new(HashMap::new()),
        })
    }

    fn glyph(&self, ch: char) -> GlyphUnits {
        let cached = self.glyphs.read().get(&ch).copied();
        if let Some(units) = cached {
            return units;
        }
        let units = self.measure(ch);
        self.glyphs.write().insert(ch, units);
        units
    }

    fn measure(&self, ch: char) -> GlyphUnits {
        let Ok(face) = ttf_parser::Face::parse(&self.data, self.index) else {
            return GlyphUnits {
                advance: 0.0,
                ink: None,
            };
        };
        let gid = face.glyph_index(ch);
        let advance = face
            .glyph_hor_advance(gid.unwrap_or(ttf_parser::GlyphId(0)))
            .map_or(0.0, f32::from);
        let ink = gid.and_then(|g| face.glyph_bounding_box(g)).map(|rect| {
            let x_min = f32::from(rect.x_min);
            (x_min, f32::from(rect.x_max) - x_min)
        });
        trace!(font = %self.name, %ch, advance, "measured glyph");
        GlyphUnits { advance, ink }
    }

    #[cfg(test)]
    fn cached_glyphs(&self) -> usize {
        self.glyphs.read().len()
    }

    fn scale(&self, size: f32) -> f32 {
        size / self.units_per_em
    }
}

impl FontMetrics for FontFace {
    fn advance_width(&self, ch: char, size: f32) -> f32 {
        self.glyph(ch).advance * self.scale(size)
    }

    fn glyph_bounds(&self, ch: char, size: f32) -> Option<GlyphBounds> {
        let (x_min, width) = self.glyph(ch).ink?;
        let scale = self.scale(size);
        Some(GlyphBounds {
            x_min: x_min * scale,
            width: width * scale,
        })
    }

    fn line_height(&self, size: f32) -> f32 {
        self.line_units * self.scale(size)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Fixed proportional metrics used when no font file can be loaded:
/// full-width cells for CJK and CJK punctuation, half-width for the rest.
#[derive(Debug, Default, Clone, Copy)]
pub struct BuiltinMetrics;

fn is_full_width(ch: char) -> bool {
    is_cjk(ch) || ('\u{3000}'..='\u{303F}').contains(&ch) || ('\u{FF00}'..='\u{FFEF}').contains(&ch)
}

impl FontMetrics for BuiltinMetrics {
    fn advance_width(&self, ch: char, size: f32) -> f32 {
        if is_full_width(ch) {
            size
        } else {
            size * 0.5
        }
    }

    fn glyph_bounds(&self, ch: char, size: f32) -> Option<GlyphBounds> {
        if ch.is_whitespace() {
            return None;
        }
        let advance = self.advance_width(ch, size);
        Some(GlyphBounds {
            x_min: advance * 0.05,
            width: advance * 0.9,
        })
    }

    fn line_height(&self, size: f32) -> f32 {
        size * 1.2
    }

    fn name(&self) -> &str {
        "builtin"
    }
}

/// Where a resolved font came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "kebab-case")]
pub enum FontSource {
    File(PathBuf),
    Family(String),
    /// Found by scanning every known face for the test glyph.
    Scanned(String),
    Builtin,
}

impl fmt::Display for FontSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FontSource::File(p) => write!(f, "file {}", p.display()),
            FontSource::Family(name) => write!(f, "family \"{name}\""),
            FontSource::Scanned(name) => write!(f, "scanned face \"{name}\""),
            FontSource::Builtin => write!(f, "builtin metrics"),
        }
    }
}

pub struct ResolvedFont {
    pub metrics: Arc<dyn FontMetrics>,
    pub source: FontSource,
    /// Set when resolution degraded to builtin metrics.
    pub diagnostic: Option<String>,
}

impl ResolvedFont {
    fn builtin(diagnostic: String) -> Self {
        Self {
            metrics: Arc::new(BuiltinMetrics),
            source: FontSource::Builtin,
            diagnostic: Some(diagnostic),
        }
    }
}

/// Hanzi and Latin fonts for one run.
pub struct FontSet {
    pub hanzi: ResolvedFont,
    pub latin: ResolvedFont,
}

impl FontSet {
    pub fn diagnostics(&self) -> impl Iterator<Item = &str> {
        [&self.hanzi, &self.latin]
            .into_iter()
            .filter_map(|f| f.diagnostic.as_deref())
    }
}

/// True if the face has a non-blank outline for `glyph`.
pub fn can_render(data: &[u8], index: u32, glyph: char) -> bool {
    let Ok(face) = ttf_parser::Face::parse(data, index) else {
        return false;
    };
    face.glyph_index(glyph)
        .and_then(|gid| face.glyph_bounding_box(gid))
        .is_some()
}

/// Finds usable fonts for a run. Built once by the caller and queried per
/// command; candidates are tried in priority order before falling back.
pub struct FontResolver {
    db: fontdb::Database,
    config: FontsConfig,
}

impl FontResolver {
    /// Load system fonts plus the configured extra directories.
    pub fn new(config: &FontsConfig) -> Self {
        let mut db = fontdb::Database::new();
        db.load_system_fonts();
        for dir in &config.dirs {
            db.load_fonts_dir(dir);
        }
        debug!(faces = db.len(), "font database loaded");
        Self::with_database(db, config)
    }

    pub fn with_database(db: fontdb::Database, config: &FontsConfig) -> Self {
        Self {
            db,
            config: config.clone(),
        }
    }

    pub fn resolve_all(&self) -> FontSet {
        FontSet {
            hanzi: self.resolve_hanzi(),
            latin: self.resolve_latin(),
        }
    }

    pub fn resolve_hanzi(&self) -> ResolvedFont {
        let glyph = self.config.test_char();
        if let Some(found) = self.try_candidates(&self.config.hanzi, glyph) {
            return found;
        }
        if let Some(found) = self.scan_for(glyph) {
            return found;
        }
        let msg = format!(
            "no installed font can draw '{glyph}'; using builtin metrics for Hanzi layout"
        );
        warn!("{msg}");
        ResolvedFont::builtin(msg)
    }

    pub fn resolve_latin(&self) -> ResolvedFont {
        if let Some(found) = self.try_candidates(&self.config.latin, 'A') {
            return found;
        }
        let query = fontdb::Query {
            families: &[fontdb::Family::SansSerif],
            ..Default::default()
        };
        if let Some(id) = self.db.query(&query) {
            if let Some(face) = self.face_from_db(id, 'A') {
                let name = face.name().to_string();
                return ResolvedFont {
                    metrics: Arc::new(face),
                    source: FontSource::Family(name),
                    diagnostic: None,
                };
            }
        }
        let msg = "no Latin font found; using builtin metrics for pinyin and translations".to_string();
        warn!("{msg}");
        ResolvedFont::builtin(msg)
    }

    fn try_candidates(&self, candidates: &[String], glyph: char) -> Option<ResolvedFont> {
        for candidate in candidates {
            let path = Path::new(candidate);
            if path.is_file() {
                match load_file(path, glyph) {
                    Some(face) => {
                        debug!(path = %path.display(), "using font file");
                        return Some(ResolvedFont {
                            metrics: Arc::new(face),
                            source: FontSource::File(path.to_path_buf()),
                            diagnostic: None,
                        });
                    }
                    None => debug!(path = %path.display(), "font file rejected"),
                }
                continue;
            }

            let query = fontdb::Query {
                families: &[fontdb::Family::Name(candidate.as_str())],
                ..Default::default()
            };
            let face = self
                .db
                .query(&query)
                .and_then(|id| self.face_from_db(id, glyph));
            match face {
                Some(face) => {
                    debug!(family = %candidate, "using font family");
                    return Some(ResolvedFont {
                        metrics: Arc::new(face),
                        source: FontSource::Family(candidate.clone()),
                        diagnostic: None,
                    });
                }
                None => trace!(family = %candidate, "font family unavailable"),
            }
        }
        None
    }

    fn scan_for(&self, glyph: char) -> Option<ResolvedFont> {
        for info in self.db.faces() {
            if let Some(face) = self.face_from_db(info.id, glyph) {
                debug!(face = face.name(), "found font by scanning");
                let name = face.name().to_string();
                return Some(ResolvedFont {
                    metrics: Arc::new(face),
                    source: FontSource::Scanned(name),
                    diagnostic: None,
                });
            }
        }
        None
    }

    fn face_from_db(&self, id: fontdb::ID, glyph: char) -> Option<FontFace> {
        let name = self
            .db
            .face(id)
            .and_then(|info| info.families.first().map(|(name, _)| name.clone()))
            .unwrap_or_else(|| "unnamed".to_string());
        self.db
            .with_face_data(id, |data, index| {
                if can_render(data, index, glyph) {
                    FontFace::from_bytes(data.to_vec(), index, name)
                } else {
                    None
                }
            })
            .flatten()
    }
}

fn load_file(path: &Path, glyph: char) -> Option<FontFace> {
    let data = std::fs::read(path).ok()?;
    if !can_render(&data, 0, glyph) {
        return None;
    }
    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("font")
        .to_string();
    FontFace::from_bytes(data, 0, name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_resolver(config: &FontsConfig) -> FontResolver {
        FontResolver::with_database(fontdb::Database::new(), config)
    }

    #[test]
    fn test_builtin_widths() {
        let m = BuiltinMetrics;
        assert_eq!(m.advance_width('你', 32.0), 32.0);
        assert_eq!(m.advance_width('，', 32.0), 32.0);
        assert_eq!(m.advance_width('a', 32.0), 16.0);
        assert_eq!(m.text_width("ni hao", 20.0), 60.0);
    }

    #[test]
    fn test_builtin_bounds_narrower_than_advance() {
        let m = BuiltinMetrics;
        let b = m.glyph_bounds('好', 40.0).unwrap();
        assert!((b.x_min - 2.0).abs() < 1e-4);
        assert!((b.width - 36.0).abs() < 1e-4);
        assert!(m.glyph_bounds(' ', 40.0).is_none());
    }

    #[test]
    fn test_can_render_rejects_garbage() {
        assert!(!can_render(b"definitely not a font", 0, '你'));
        assert!(!can_render(&[], 0, 'A'));
    }

    #[test]
    fn test_from_bytes_rejects_garbage() {
        assert!(FontFace::from_bytes(vec![0; 64], 0, "zero").is_none());
    }

    #[test]
    fn test_empty_database_falls_back_to_builtin() {
        let config = FontsConfig::default();
        let resolver = empty_resolver(&config);
        let fonts = resolver.resolve_all();
        assert_eq!(fonts.hanzi.source, FontSource::Builtin);
        assert_eq!(fonts.latin.source, FontSource::Builtin);
        assert_eq!(fonts.diagnostics().count(), 2);
        assert_eq!(fonts.hanzi.metrics.name(), "builtin");
    }

    #[test]
    fn test_invalid_font_file_candidate_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let bogus = dir.path().join("broken.ttf");
        std::fs::write(&bogus, b"not a font").unwrap();
        let config = FontsConfig {
            hanzi: vec![bogus.display().to_string(), "Missing Family".into()],
            ..Default::default()
        };
        let resolved = empty_resolver(&config).resolve_hanzi();
        assert_eq!(resolved.source, FontSource::Builtin);
        assert!(resolved.diagnostic.unwrap().contains('你'));
    }

    #[test]
    fn test_system_face_caches_glyph_metrics() {
        let mut db = fontdb::Database::new();
        db.load_system_fonts();
        let resolver = FontResolver::with_database(db, &FontsConfig::default());
        // Machines without any font have nothing to measure
        let Some(face) = resolver
            .db
            .faces()
            .find_map(|info| resolver.face_from_db(info.id, 'A'))
        else {
            return;
        };

        let first = face.advance_width('A', 32.0);
        assert!(first > 0.0);
        for _ in 0..10 {
            assert_eq!(face.advance_width('A', 32.0), first);
            face.glyph_bounds('A', 32.0);
        }
        assert_eq!(face.cached_glyphs(), 1);

        // scaling is applied after the cache
        assert!((face.advance_width('A', 64.0) - 2.0 * first).abs() < 1e-3);
        face.advance_width(' ', 32.0);
        assert_eq!(face.cached_glyphs(), 2);
    }

    #[test]
    fn test_font_source_display() {
        assert_eq!(FontSource::Builtin.to_string(), "builtin metrics");
        assert_eq!(
            FontSource::Family("SimHei".into()).to_string(),
            "family \"SimHei\""
        );
    }
}
