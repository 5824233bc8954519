//! Fixed-point units used for all layout arithmetic.
//!
//! Layout is done in 26.6 fixed point: 26 bits of integer pixels and 6 bits
//! of fraction, i.e. 64 subunits per pixel. Working in integers keeps line
//! totals exact when they are recomputed by summation, something floating
//! point cannot promise.

use derive_more::{Add, AddAssign, From, Into, Sub, SubAssign, Sum};
use std::fmt;
use std::ops::Neg;

/// A 26.6 fixed-point number (64 subunits per pixel)
#[derive(
    Debug,
    Default,
    Copy,
    Clone,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Add,
    Sub,
    AddAssign,
    SubAssign,
    Sum,
    From,
    Into,
)]
pub struct Fixed(pub i32);

impl Fixed {
    pub const ZERO: Fixed = Fixed(0);

    /// Number of subunits in a single pixel
    pub const ONE: i32 = 64;

    /// Create a fixed value from a whole number of pixels
    pub const fn from_int(px: i32) -> Fixed {
        Fixed(px << 6)
    }

    /// Create a fixed value from fractional pixels, rounding to the nearest subunit
    pub fn from_f32(px: f32) -> Fixed {
        Fixed((px * Self::ONE as f32).round() as i32)
    }

    /// The value in (fractional) pixels
    pub fn to_f32(self) -> f32 {
        self.0 as f32 / Self::ONE as f32
    }

    /// The smallest whole pixel count greater than or equal to this value
    pub fn ceil(self) -> i32 {
        (self.0 + 0x3f) >> 6
    }

    /// The largest whole pixel count less than or equal to this value
    pub fn floor(self) -> i32 {
        self.0 >> 6
    }

    /// The nearest whole pixel count, rounding halves up
    pub fn round(self) -> i32 {
        (self.0 + 0x20) >> 6
    }

    /// Scale by an integer factor
    pub fn mul_int(self, n: i32) -> Fixed {
        Fixed(self.0 * n)
    }

    /// Divide by an integer factor, truncating towards zero
    pub fn div_int(self, n: i32) -> Fixed {
        Fixed(self.0 / n)
    }
}

impl Neg for Fixed {
    type Output = Fixed;

    fn neg(self) -> Fixed {
        Fixed(-self.0)
    }
}

impl fmt::Display for Fixed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // "12:32" is 12 + 32/64 px
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}:{:02}", abs >> 6, abs & 0x3f)
    }
}

/// A point in fixed-point space
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash, Add, Sub, AddAssign, SubAssign)]
pub struct FixedPoint {
    pub x: Fixed,
    pub y: Fixed,
}

impl FixedPoint {
    pub fn new(x: Fixed, y: Fixed) -> FixedPoint {
        FixedPoint { x, y }
    }

    /// Create a point from whole pixels
    pub fn px(x: i32, y: i32) -> FixedPoint {
        FixedPoint {
            x: Fixed::from_int(x),
            y: Fixed::from_int(y),
        }
    }

    pub fn is_zero(&self) -> bool {
        self.x == Fixed::ZERO && self.y == Fixed::ZERO
    }
}

/// A rectangle in fixed-point space, used for glyph ink bounds
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub struct FixedRect {
    pub min: FixedPoint,
    pub max: FixedPoint,
}

impl FixedRect {
    pub fn new(min: FixedPoint, max: FixedPoint) -> FixedRect {
        FixedRect { min, max }
    }

    pub fn width(&self) -> Fixed {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> Fixed {
        self.max.y - self.min.y
    }
}

/// Vertical metrics of a box or a font. `descent` is measured downwards from
/// the baseline and is therefore positive for glyphs that hang below it.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub struct FontMetrics {
    /// Recommended distance between two consecutive baselines
    pub height: Fixed,
    /// Distance from the top of the box to the baseline
    pub ascent: Fixed,
    /// Distance from the baseline to the bottom of the box
    pub descent: Fixed,
}

impl FontMetrics {
    pub fn new(height: Fixed, ascent: Fixed, descent: Fixed) -> FontMetrics {
        FontMetrics {
            height,
            ascent,
            descent,
        }
    }

    /// Metrics for a block sitting entirely above the baseline
    pub fn above_baseline(height: Fixed) -> FontMetrics {
        FontMetrics {
            height,
            ascent: height,
            descent: Fixed::ZERO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_round_trip() {
        assert_eq!(Fixed::from_int(7).ceil(), 7);
        assert_eq!(Fixed::from_int(7).floor(), 7);
        assert_eq!(Fixed::from_int(-3).floor(), -3);
    }

    #[test]
    fn test_ceil_floor_round() {
        let v = Fixed(64 * 2 + 1);
        assert_eq!(v.ceil(), 3);
        assert_eq!(v.floor(), 2);
        assert_eq!(v.round(), 2);
        assert_eq!(Fixed(64 * 2 + 32).round(), 3);
    }

    #[test]
    fn test_sum() {
        let total: Fixed = [Fixed::from_int(1), Fixed::from_int(2), Fixed(32)]
            .into_iter()
            .sum();
        assert_eq!(total, Fixed(64 * 3 + 32));
    }

    #[test]
    fn test_display() {
        assert_eq!(Fixed(64 * 12 + 32).to_string(), "12:32");
        assert_eq!((-Fixed::from_int(1)).to_string(), "-1:00");
    }
}
