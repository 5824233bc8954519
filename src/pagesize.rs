//! Pre-defined page sizes for common paper formats, used to size layout
//! regions in pixels at a given resolution.
//!
//! All sizes are provided in portrait orientation (width, height) where width ≤ height.
//! Use the [`PageOrientation`](crate::pagesize::PageOrientation) trait to convert between
//! portrait and landscape.
//!
//! # Available Sizes
//!
//! ## North American
//! `LETTER`, `HALF_LETTER`, `JUNIOR_LEGAL`, `LEGAL`, `TABLOID`, `LEDGER`
//!
//! ## ANSI
//! `ANSI_A` through `ANSI_E`
//!
//! ## ISO A-Series
//! `A0` through `A6`
//!
//! ## Traditional
//! `FOLIO`, `QUARTO`, `OCTAVO`
//!
//! # Example
//!
//! ```
//! use wordwrap::pagesize::{pixels, LETTER, A4, PageOrientation};
//!
//! // a letter page at 100 dpi
//! assert_eq!(pixels(LETTER, 100.0), (850, 1100));
//!
//! // convert to landscape
//! let landscape = A4.landscape();
//! assert!(landscape.0 > landscape.1);
//! ```

/// Page dimensions as (width, height) in points (1/72 inch).
pub type PageSize = (f32, f32);

/// Number of points in an inch
pub const POINTS_PER_INCH: f32 = 72.0;

/// Convert a length in points to whole pixels at `dpi`, truncating
pub fn points_to_pixels(points: f32, dpi: f32) -> i32 {
    (points * dpi / POINTS_PER_INCH) as i32
}

/// The pixel size of a page at `dpi`
pub fn pixels(size: PageSize, dpi: f32) -> (i32, i32) {
    (points_to_pixels(size.0, dpi), points_to_pixels(size.1, dpi))
}

// north american sizes
pub const LETTER: PageSize = (8.5 * 72.0, 11.0 * 72.0);
pub const HALF_LETTER: PageSize = (5.5 * 72.0, 8.5 * 72.0);
pub const JUNIOR_LEGAL: PageSize = (5.0 * 72.0, 8.0 * 72.0);
pub const LEGAL: PageSize = (8.5 * 72.0, 13.0 * 72.0);
pub const TABLOID: PageSize = (11.0 * 72.0, 17.0 * 72.0);
pub const LEDGER: PageSize = (17.0 * 72.0, 11.0 * 72.0);

// ansi sizes
pub const ANSI_A: PageSize = (8.5 * 72.0, 11.0 * 72.0);
pub const ANSI_B: PageSize = (11.0 * 72.0, 17.0 * 72.0);
pub const ANSI_C: PageSize = (17.0 * 72.0, 22.0 * 72.0);
pub const ANSI_D: PageSize = (22.0 * 72.0, 34.0 * 72.0);
pub const ANSI_E: PageSize = (34.0 * 72.0, 44.0 * 72.0);

// traditional sizes
pub const FOLIO: PageSize = (12.0 * 72.0, 19.0 * 72.0);
pub const QUARTO: PageSize = (9.5 * 72.0, 12.0 * 72.0);
pub const OCTAVO: PageSize = (6.0 * 72.0, 9.0 * 72.0);

// iso a-series (converted from mm to points)
pub const A0: PageSize = (841.0 * 72.0 / 25.4, 1189.0 * 72.0 / 25.4);
pub const A1: PageSize = (594.0 * 72.0 / 25.4, 841.0 * 72.0 / 25.4);
pub const A2: PageSize = (420.0 * 72.0 / 25.4, 594.0 * 72.0 / 25.4);
pub const A3: PageSize = (297.0 * 72.0 / 25.4, 420.0 * 72.0 / 25.4);
pub const A4: PageSize = (210.0 * 72.0 / 25.4, 297.0 * 72.0 / 25.4);
pub const A5: PageSize = (148.0 * 72.0 / 25.4, 210.0 * 72.0 / 25.4);
pub const A6: PageSize = (105.0 * 72.0 / 25.4, 148.0 * 72.0 / 25.4);

/// Convert page sizes between portrait and landscape orientations.
pub trait PageOrientation {
    /// Returns the size in portrait orientation (width ≤ height).
    fn portrait(self) -> Self;
    /// Returns the size in landscape orientation (width ≥ height).
    fn landscape(self) -> Self;
}

impl PageOrientation for PageSize {
    fn portrait(self) -> Self {
        if self.0 <= self.1 {
            self
        } else {
            (self.1, self.0)
        }
    }

    fn landscape(self) -> PageSize {
        if self.0 >= self.1 {
            self
        } else {
            (self.1, self.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_a4_at_common_resolutions() {
        assert_eq!(pixels(A4, 72.0), (595, 841));
        assert_eq!(pixels(A4, 300.0), (2480, 3507));
    }

    #[test]
    fn test_orientation() {
        assert_eq!(LEDGER.portrait(), TABLOID);
        assert_eq!(LETTER.landscape(), (11.0 * 72.0, 8.5 * 72.0));
    }
}
