use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use crate::foundation::core::Rgba8;
use crate::foundation::error::{StudioError, StudioResult};
use crate::text::layout::TextMetrics;

/// Raw font data for one face.
#[derive(Clone)]
pub struct ResolvedFont {
    /// Whole font file bytes.
    pub bytes: Arc<Vec<u8>>,
    /// Face index inside a collection file.
    pub index: u32,
    /// Family name reported by the font database.
    pub family: String,
}

impl std::fmt::Debug for ResolvedFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedFont")
            .field("bytes_len", &self.bytes.len())
            .field("index", &self.index)
            .field("family", &self.family)
            .finish()
    }
}

/// RGBA8 brush carried through Parley layouts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TextBrush {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl From<Rgba8> for TextBrush {
    fn from(c: Rgba8) -> Self {
        Self {
            r: c.r,
            g: c.g,
            b: c.b,
            a: c.a,
        }
    }
}

/// System (plus optional extra-directory) font lookup and Parley shaping.
pub struct FontBook {
    db: usvg::fontdb::Database,
    resolved: HashMap<String, Option<ResolvedFont>>,
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrush>,
    registered: HashMap<FaceKey, String>,
}

/// Identifies a registered face by content rather than by allocation.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct FaceKey {
    family: String,
    index: u32,
    len: usize,
}

impl Default for FontBook {
    fn default() -> Self {
        Self::system()
    }
}

impl FontBook {
    /// Font book backed by the host's installed fonts.
    pub fn system() -> Self {
        let mut db = usvg::fontdb::Database::new();
        db.load_system_fonts();
        tracing::debug!(faces = db.len(), "loaded system fonts");
        Self::from_database(db)
    }

    /// Font book with no fonts at all. Every measurement falls back to the estimate.
    pub fn empty() -> Self {
        Self::from_database(usvg::fontdb::Database::new())
    }

    fn from_database(db: usvg::fontdb::Database) -> Self {
        Self {
            db,
            resolved: HashMap::new(),
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
            registered: HashMap::new(),
        }
    }

    /// Load every `.ttf`/`.otf`/`.ttc` file in `dir` (non-recursive). Missing dirs are ignored.
    pub fn load_fonts_from_dir(&mut self, dir: &Path) {
        let Ok(rd) = std::fs::read_dir(dir) else {
            return;
        };

        for entry in rd.flatten() {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let Some(ext) = path.extension().and_then(|s| s.to_str()) else {
                continue;
            };
            let ext = ext.to_ascii_lowercase();
            if ext != "ttf" && ext != "otf" && ext != "ttc" {
                continue;
            }
            if let Err(e) = self.db.load_font_file(&path) {
                tracing::warn!(path = %path.display(), error = %e, "failed to load font file");
            }
        }
        self.resolved.clear();
    }

    /// Number of faces known to the font database.
    pub fn face_count(&self) -> usize {
        self.db.len()
    }

    /// Resolve `family` (or a generic family) to font bytes. Falls back to any sans-serif face,
    /// then to the first face. `None` when the database is empty.
    pub fn resolve(&mut self, family: &str) -> Option<ResolvedFont> {
        if let Some(hit) = self.resolved.get(family) {
            return hit.clone();
        }

        let found = self.query(family);
        if found.is_none() {
            tracing::warn!(family, "no font available; text metrics will be estimated");
        }
        self.resolved.insert(family.to_string(), found.clone());
        found
    }

    fn query(&self, family: &str) -> Option<ResolvedFont> {
        use usvg::fontdb::Family;

        let requested = match family.trim().to_ascii_lowercase().as_str() {
            "sans-serif" | "sans" => Family::SansSerif,
            "serif" => Family::Serif,
            "monospace" | "mono" => Family::Monospace,
            "cursive" => Family::Cursive,
            "fantasy" => Family::Fantasy,
            _ => Family::Name(family.trim()),
        };
        let families = [requested, Family::SansSerif, Family::Serif];
        let query = usvg::fontdb::Query {
            families: &families,
            weight: usvg::fontdb::Weight::NORMAL,
            stretch: usvg::fontdb::Stretch::Normal,
            style: usvg::fontdb::Style::Normal,
        };

        let id = self
            .db
            .query(&query)
            .or_else(|| self.db.faces().next().map(|f| f.id))?;
        let family_name = self
            .db
            .face(id)
            .and_then(|f| f.families.first().map(|(name, _)| name.clone()))
            .unwrap_or_else(|| family.to_string());
        let (bytes, index) = self
            .db
            .with_face_data(id, |data, index| (data.to_vec(), index))?;

        Some(ResolvedFont {
            bytes: Arc::new(bytes),
            index,
            family: family_name,
        })
    }

    /// Shape `text` as a single unwrapped line.
    pub fn layout_line(
        &mut self,
        text: &str,
        font: &ResolvedFont,
        size_px: f32,
        brush: TextBrush,
    ) -> StudioResult<parley::Layout<TextBrush>> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(StudioError::invalid_config(
                "text size_px must be finite and > 0",
            ));
        }

        let family_name = self.register(font)?;
        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(family_name)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<TextBrush> = builder.build(text);
        layout.break_all_lines(None);
        Ok(layout)
    }

    /// Measure `text`. `None` when no font is available or shaping fails.
    pub fn measure(&mut self, text: &str, family: &str, size_px: f32) -> Option<TextMetrics> {
        let font = self.resolve(family)?;
        match self.layout_line(text, &font, size_px, TextBrush::default()) {
            Ok(layout) => Some(TextMetrics {
                width: f64::from(layout.width()),
                height: f64::from(layout.height()),
            }),
            Err(e) => {
                tracing::warn!(error = %e, "text measurement failed");
                None
            }
        }
    }

    /// Register font bytes with Parley once per distinct face and return the family name.
    fn register(&mut self, font: &ResolvedFont) -> StudioResult<String> {
        let key = FaceKey {
            family: font.family.clone(),
            index: font.index,
            len: font.bytes.len(),
        };
        if let Some(name) = self.registered.get(&key) {
            return Ok(name.clone());
        }

        let families = self.font_ctx.collection.register_fonts(
            parley::fontique::Blob::from(font.bytes.as_ref().clone()),
            None,
        );
        let family_id = families
            .first()
            .map(|(id, _)| *id)
            .ok_or_else(|| StudioError::invalid_config("no font families registered from font bytes"))?;
        let family_name = self
            .font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| StudioError::invalid_config("registered font family has no name"))?
            .to_string();
        self.registered.insert(key, family_name.clone());
        Ok(family_name)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/text/fonts.rs"]
mod tests;
