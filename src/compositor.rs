// compositor.rs - Frame compositor: background fill, one optional overlay strip and
// left-aligned text lines in the remaining rectangle

use std::path::Path;
use std::sync::Arc;

use image::{ImageFormat, RgbImage};

use crate::core::{Frame, Rect, Rgb, Size};
use crate::error::RenderError;
use crate::traits::{Glyph, GlyphSource};

/// Text styling for one render. Sizes are in points at 72 dpi, so one point is one pixel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextLayoutSpec {
    pub font_size: f32,
    /// Multiplier applied to `font_size` between baselines
    pub line_spacing: f32,
    /// Pen offset from the text rectangle's top-left corner
    pub origin_x: i32,
    pub origin_y: i32,
    pub foreground: Rgb,
    pub background: Rgb,
}

impl TextLayoutSpec {
    /// Blue text on black, origin (2, 2), single spacing
    pub fn new(font_size: f32) -> Self {
        Self {
            font_size,
            line_spacing: 1.0,
            origin_x: 2,
            origin_y: 2,
            foreground: Rgb::BLUE,
            background: Rgb::BLACK,
        }
    }

    pub fn with_origin(mut self, x: i32, y: i32) -> Self {
        self.origin_x = x;
        self.origin_y = y;
        self
    }

    pub fn with_colors(mut self, foreground: Rgb, background: Rgb) -> Self {
        self.foreground = foreground;
        self.background = background;
        self
    }

    /// Whole-pixel ascent used to place the first baseline
    pub fn ascent(&self) -> i32 {
        self.font_size as i32
    }

    pub fn line_advance(&self) -> f32 {
        self.font_size * self.line_spacing
    }
}

/// Where an overlay sits on the canvas. Text always gets the rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlaySlot {
    /// Strip of the given width against the left edge
    Left(u32),
    /// Strip from column `x` to the right edge
    Right(u32),
}

impl OverlaySlot {
    /// Split the canvas into `(overlay, text)` rectangles; they never overlap
    pub fn split(&self, canvas: Size) -> (Rect, Rect) {
        match *self {
            OverlaySlot::Left(width) => {
                let width = width.min(canvas.width);
                (
                    Rect::new(0, 0, width, canvas.height),
                    Rect::new(width, 0, canvas.width - width, canvas.height),
                )
            }
            OverlaySlot::Right(x) => {
                let x = x.min(canvas.width);
                (
                    Rect::new(x, 0, canvas.width - x, canvas.height),
                    Rect::new(0, 0, x, canvas.height),
                )
            }
        }
    }
}

/// Overlay bitmap plus its slot for a single compose call
#[derive(Debug, Clone, Copy)]
pub struct PlacedOverlay<'a> {
    pub bitmap: &'a Frame,
    pub slot: OverlaySlot,
}

/// Rectangle text is drawn into for a given overlay placement
pub fn text_rect(slot: Option<OverlaySlot>, canvas: Size) -> Rect {
    match slot {
        Some(slot) => slot.split(canvas).1,
        None => Rect::full(canvas),
    }
}

/// Builds frames. Holds nothing mutable, so repeated calls with the same inputs
/// produce identical frames.
pub struct Compositor {
    glyphs: Arc<dyn GlyphSource>,
}

impl Compositor {
    pub fn new(glyphs: Arc<dyn GlyphSource>) -> Self {
        Self { glyphs }
    }

    pub fn compose(
        &self,
        spec: &TextLayoutSpec,
        lines: &[String],
        overlay: Option<PlacedOverlay<'_>>,
        size: Size,
    ) -> Result<Frame, RenderError> {
        let mut frame = Frame::filled(size, spec.background);

        if let Some(placed) = overlay {
            let (overlay_area, _) = placed.slot.split(size);
            frame.blit(placed.bitmap, overlay_area);
        }
        let text_area = text_rect(overlay.map(|placed| placed.slot), size);

        self.draw_lines(&mut frame, spec, lines, text_area)?;
        Ok(frame)
    }

    fn draw_lines(
        &self,
        frame: &mut Frame,
        spec: &TextLayoutSpec,
        lines: &[String],
        area: Rect,
    ) -> Result<(), RenderError> {
        let mut baseline = (area.y as i32 + spec.origin_y + spec.ascent()) as f32;

        for line in lines {
            let mut pen_x = (area.x as i32 + spec.origin_x) as f32;
            for ch in line.chars() {
                let glyph = self.glyphs.rasterize(ch, spec.font_size)?;
                let pen = (pen_x.round() as i32, baseline.round() as i32);
                draw_glyph(frame, spec, &glyph, pen, area);
                pen_x += glyph.advance;
            }
            baseline += spec.line_advance();
        }
        Ok(())
    }
}

/// Blend one coverage mask against the background, clipped to `area`
fn draw_glyph(
    frame: &mut Frame,
    spec: &TextLayoutSpec,
    glyph: &Glyph,
    (pen_x, baseline): (i32, i32),
    area: Rect,
) {
    let left = pen_x + glyph.xmin;
    let top = baseline - glyph.ymin - glyph.height as i32;

    for gy in 0..glyph.height {
        for gx in 0..glyph.width {
            let coverage = glyph.coverage[gy * glyph.width + gx];
            if coverage == 0 {
                continue;
            }
            let (x, y) = (left + gx as i32, top + gy as i32);
            if !area.contains(x, y) {
                continue;
            }
            let color = spec.background.mix(spec.foreground, coverage);
            frame.set_pixel(x as u32, y as u32, color);
        }
    }
}

/// Write a frame as PNG for out-of-process inspection
pub fn persist_frame(frame: &Frame, path: &Path) -> Result<(), image::ImageError> {
    let image = RgbImage::from_raw(frame.width(), frame.height(), frame.pixels().to_vec())
        .ok_or_else(|| {
            image::ImageError::Parameter(image::error::ParameterError::from_kind(
                image::error::ParameterErrorKind::DimensionMismatch,
            ))
        })?;
    image.save_with_format(path, ImageFormat::Png)
}
