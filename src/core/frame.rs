use super::geometry::{Rect, Size};

/// RGB colour of a single panel pixel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);
    pub const RED: Rgb = Rgb::new(255, 0, 0);
    pub const GREEN: Rgb = Rgb::new(0, 255, 0);
    pub const BLUE: Rgb = Rgb::new(0, 0, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Mix towards `other` by an 8-bit coverage value (0 = self, 255 = other)
    pub fn mix(self, other: Rgb, coverage: u8) -> Rgb {
        let channel = |from: u8, to: u8| -> u8 {
            let from = from as u32;
            let to = to as u32;
            let cov = coverage as u32;
            ((from * (255 - cov) + to * cov + 127) / 255) as u8
        };
        Rgb::new(
            channel(self.r, other.r),
            channel(self.g, other.g),
            channel(self.b, other.b),
        )
    }

    pub fn inverted(self) -> Rgb {
        Rgb::new(255 - self.r, 255 - self.g, 255 - self.b)
    }

    /// Scale by a 0-100 brightness percentage
    pub fn dimmed(self, percent: u8) -> Rgb {
        let percent = percent.min(100) as u32;
        let scale = |c: u8| ((c as u32 * percent) / 100) as u8;
        Rgb::new(scale(self.r), scale(self.g), scale(self.b))
    }
}

/// Quarter-turn rotation applied when a frame is handed to the panel.
/// Angles are counter-clockwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    pub fn degrees(&self) -> u16 {
        match self {
            Rotation::Deg0 => 0,
            Rotation::Deg90 => 90,
            Rotation::Deg180 => 180,
            Rotation::Deg270 => 270,
        }
    }

    pub fn from_degrees(degrees: u16) -> Option<Self> {
        match degrees {
            0 => Some(Rotation::Deg0),
            90 => Some(Rotation::Deg90),
            180 => Some(Rotation::Deg180),
            270 => Some(Rotation::Deg270),
            _ => None,
        }
    }
}

/// Fixed-size RGB pixel buffer. Used both for composed frames and overlay bitmaps.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Frame {
    width: u32,
    height: u32,
    /// Row-major RGB, 3 bytes per pixel
    pixels: Vec<u8>,
}

impl Frame {
    /// Black frame of the given size
    pub fn new(size: Size) -> Self {
        Self {
            width: size.width,
            height: size.height,
            pixels: vec![0; size.buffer_size()],
        }
    }

    pub fn filled(size: Size, color: Rgb) -> Self {
        let mut frame = Self::new(size);
        frame.fill(color);
        frame
    }

    /// Wrap an existing RGB buffer; `None` if the length does not match
    pub fn from_rgb(size: Size, pixels: Vec<u8>) -> Option<Self> {
        if pixels.len() != size.buffer_size() {
            return None;
        }
        Some(Self {
            width: size.width,
            height: size.height,
            pixels,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    fn index(&self, x: u32, y: u32) -> usize {
        ((y * self.width + x) * 3) as usize
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgb> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = self.index(x, y);
        Some(Rgb::new(
            self.pixels[idx],
            self.pixels[idx + 1],
            self.pixels[idx + 2],
        ))
    }

    /// Set a single pixel; out-of-bounds writes are ignored
    pub fn set_pixel(&mut self, x: u32, y: u32, color: Rgb) {
        if x >= self.width || y >= self.height {
            return;
        }
        let idx = self.index(x, y);
        self.pixels[idx] = color.r;
        self.pixels[idx + 1] = color.g;
        self.pixels[idx + 2] = color.b;
    }

    pub fn fill(&mut self, color: Rgb) {
        for px in self.pixels.chunks_exact_mut(3) {
            px[0] = color.r;
            px[1] = color.g;
            px[2] = color.b;
        }
    }

    /// Fill a rectangle, clipped to the frame
    pub fn fill_rect(&mut self, rect: Rect, color: Rgb) {
        let rect = rect.intersection(&Rect::full(self.size()));
        for y in rect.y..rect.bottom() {
            for x in rect.x..rect.right() {
                self.set_pixel(x, y, color);
            }
        }
    }

    /// Copy `src` into `dest` with replace semantics. The source is anchored at the
    /// rectangle's top-left corner and clipped to both the rectangle and the frame.
    pub fn blit(&mut self, src: &Frame, dest: Rect) {
        let clip = dest.intersection(&Rect::full(self.size()));
        for y in clip.y..clip.bottom() {
            let sy = y - dest.y;
            if sy >= src.height {
                break;
            }
            for x in clip.x..clip.right() {
                let sx = x - dest.x;
                if sx >= src.width {
                    break;
                }
                let s = src.index(sx, sy);
                let d = self.index(x, y);
                self.pixels[d..d + 3].copy_from_slice(&src.pixels[s..s + 3]);
            }
        }
    }

    pub fn map_pixels(&self, f: impl Fn(Rgb) -> Rgb) -> Frame {
        let mut out = self.clone();
        for px in out.pixels.chunks_exact_mut(3) {
            let c = f(Rgb::new(px[0], px[1], px[2]));
            px[0] = c.r;
            px[1] = c.g;
            px[2] = c.b;
        }
        out
    }

    /// Rotated copy; 90 and 270 swap width and height
    pub fn rotated(&self, rotation: Rotation) -> Frame {
        let (w, h) = (self.width, self.height);
        let out_size = match rotation {
            Rotation::Deg0 | Rotation::Deg180 => Size::new(w, h),
            Rotation::Deg90 | Rotation::Deg270 => Size::new(h, w),
        };
        if rotation == Rotation::Deg0 {
            return self.clone();
        }

        let mut out = Frame::new(out_size);
        for y in 0..h {
            for x in 0..w {
                let (dx, dy) = match rotation {
                    Rotation::Deg0 => (x, y),
                    Rotation::Deg90 => (y, w - 1 - x),
                    Rotation::Deg180 => (w - 1 - x, h - 1 - y),
                    Rotation::Deg270 => (h - 1 - y, x),
                };
                let s = self.index(x, y);
                let d = out.index(dx, dy);
                out.pixels[d..d + 3].copy_from_slice(&self.pixels[s..s + 3]);
            }
        }
        out
    }
}
