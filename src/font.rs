use std::path::Path;

use fontdue::{Font, FontSettings};

use crate::error::RenderError;
use crate::traits::{Glyph, GlyphSource};

/// TrueType/OpenType glyphs rasterised on the CPU by fontdue
pub struct FontdueGlyphs {
    font: Font,
}

impl FontdueGlyphs {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, RenderError> {
        let font = Font::from_bytes(bytes, FontSettings::default())
            .map_err(|e| RenderError::InvalidFont(e.to_string()))?;
        Ok(Self { font })
    }

    pub fn load(path: &Path) -> Result<Self, RenderError> {
        let bytes = std::fs::read(path).map_err(|source| RenderError::FontRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_bytes(&bytes)
    }
}

impl GlyphSource for FontdueGlyphs {
    fn rasterize(&self, ch: char, px: f32) -> Result<Glyph, RenderError> {
        // index 0 is .notdef; whitespace may legitimately map there in small fonts
        if !ch.is_whitespace() && self.font.lookup_glyph_index(ch) == 0 {
            return Err(RenderError::MissingGlyph(ch));
        }

        let (metrics, coverage) = self.font.rasterize(ch, px);
        Ok(Glyph {
            width: metrics.width,
            height: metrics.height,
            xmin: metrics.xmin,
            ymin: metrics.ymin,
            advance: metrics.advance_width,
            coverage,
        })
    }
}

/// Stand-in used when the font could not be loaded at startup: every render fails
/// with a `RenderError`, which drops the message without taking the process down.
pub struct UnavailableGlyphs {
    reason: String,
}

impl UnavailableGlyphs {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl GlyphSource for UnavailableGlyphs {
    fn rasterize(&self, _ch: char, _px: f32) -> Result<Glyph, RenderError> {
        Err(RenderError::FontUnavailable(self.reason.clone()))
    }
}
