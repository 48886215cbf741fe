/// Canvas dimensions in panel pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Size {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl Size {
    /// Create new size
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Total number of pixels
    pub fn pixel_count(&self) -> usize {
        (self.width * self.height) as usize
    }

    /// Total size in bytes for an RGB buffer
    pub fn buffer_size(&self) -> usize {
        self.pixel_count() * 3
    }
}

/// Axis-aligned pixel rectangle, half-open on the right and bottom edges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Rectangle covering a whole canvas
    pub const fn full(size: Size) -> Self {
        Self::new(0, 0, size.width, size.height)
    }

    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Signed containment test, so glyph pens left of the canvas can be checked directly
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x as i32
            && y >= self.y as i32
            && x < self.right() as i32
            && y < self.bottom() as i32
    }

    /// Overlapping area of two rectangles, empty when they are disjoint
    pub fn intersection(&self, other: &Rect) -> Rect {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());

        if right <= x || bottom <= y {
            return Rect::new(x, y, 0, 0);
        }
        Rect::new(x, y, right - x, bottom - y)
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        !self.intersection(other).is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixel_count_calculation() {
        let size = Size::new(64, 32);
        assert_eq!(size.pixel_count(), 2048);
    }

    #[test]
    fn test_buffer_size_rgb() {
        let size = Size::new(10, 10);
        // 10x10 pixels * 3 bytes per pixel (RGB)
        assert_eq!(size.buffer_size(), 300);
    }

    #[test]
    fn test_full_rect_covers_canvas() {
        let rect = Rect::full(Size::new(64, 32));
        assert_eq!((rect.right(), rect.bottom()), (64, 32));
        assert!(rect.contains(0, 0));
        assert!(rect.contains(63, 31));
        assert!(!rect.contains(64, 0));
        assert!(!rect.contains(-1, 5));
    }

    #[test]
    fn test_adjacent_strips_do_not_intersect() {
        let left = Rect::new(0, 0, 12, 32);
        let right = Rect::new(12, 0, 52, 32);
        assert!(!left.intersects(&right));
        assert!(left.intersection(&right).is_empty());
    }

    #[test]
    fn test_intersection_of_overlapping_rects() {
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(5, 5, 10, 10);
        assert_eq!(a.intersection(&b), Rect::new(5, 5, 5, 5));
    }
}
