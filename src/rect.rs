use crate::layout::Margins;

/// A point on a raster surface, in whole pixels
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub struct PixelPoint {
    pub x: i32,
    pub y: i32,
}

impl PixelPoint {
    pub fn new(x: i32, y: i32) -> PixelPoint {
        PixelPoint { x, y }
    }
}

/// A rectangle on a raster surface, specified by two opposite corners.
///
/// The first corner is inclusive and the second exclusive, so a rectangle
/// with `x1 == x2` covers no pixels.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub struct PixelRect {
    /// The x-coordinate of the first (top-left) corner.
    pub x1: i32,
    /// The y-coordinate of the first (top-left) corner.
    pub y1: i32,
    /// The x-coordinate of the second (bottom-right) corner.
    pub x2: i32,
    /// The y-coordinate of the second (bottom-right) corner.
    pub y2: i32,
}

impl PixelRect {
    pub fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> PixelRect {
        PixelRect { x1, y1, x2, y2 }
    }

    /// A rectangle anchored at the origin with the given size
    pub fn sized(width: i32, height: i32) -> PixelRect {
        PixelRect::new(0, 0, width, height)
    }

    pub fn width(&self) -> i32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> i32 {
        self.y2 - self.y1
    }

    pub fn min(&self) -> PixelPoint {
        PixelPoint::new(self.x1, self.y1)
    }

    pub fn is_empty(&self) -> bool {
        self.x1 >= self.x2 || self.y1 >= self.y2
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x1 && x < self.x2 && y >= self.y1 && y < self.y2
    }

    /// Move the rectangle by the given offset
    pub fn translate(&self, dx: i32, dy: i32) -> PixelRect {
        PixelRect::new(self.x1 + dx, self.y1 + dy, self.x2 + dx, self.y2 + dy)
    }

    /// The overlapping area of two rectangles, empty if they do not overlap
    pub fn intersect(&self, other: &PixelRect) -> PixelRect {
        let r = PixelRect {
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
            x2: self.x2.min(other.x2),
            y2: self.y2.min(other.y2),
        };
        if r.is_empty() {
            PixelRect::default()
        } else {
            r
        }
    }

    /// Shrink the rectangle by the given spacing, rounding each edge up to
    /// whole pixels
    pub fn inset(&self, spacing: &Margins) -> PixelRect {
        PixelRect {
            x1: self.x1 + spacing.left.ceil(),
            y1: self.y1 + spacing.top.ceil(),
            x2: self.x2 - spacing.right.ceil(),
            y2: self.y2 - spacing.bottom.ceil(),
        }
    }
}
