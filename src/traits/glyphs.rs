use crate::error::RenderError;

/// One rasterised glyph: an 8-bit coverage mask plus placement metrics.
/// `ymin` is the offset of the mask's bottom edge above the baseline.
#[derive(Debug, Clone, PartialEq)]
pub struct Glyph {
    pub width: usize,
    pub height: usize,
    pub xmin: i32,
    pub ymin: i32,
    /// Horizontal pen advance in pixels
    pub advance: f32,
    /// Row-major coverage, `width * height` bytes
    pub coverage: Vec<u8>,
}

/// Font backend - turns characters into coverage masks at a pixel size
pub trait GlyphSource: Send + Sync {
    fn rasterize(&self, ch: char, px: f32) -> Result<Glyph, RenderError>;
}
