use crate::units::Fixed;

/// Spacing around the four edges of a box. The same shape is used for the
/// padding, border and margin of decorated boxes as well as for the margin
/// around a whole page.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Margins {
    pub top: Fixed,
    pub right: Fixed,
    pub bottom: Fixed,
    pub left: Fixed,
}

impl Margins {
    /// Create margins by specifying individual components in a clockwise fashion
    /// starting at the top (in the same order as CSS margins)
    pub fn trbl(top: Fixed, right: Fixed, bottom: Fixed, left: Fixed) -> Margins {
        Margins {
            top,
            right,
            bottom,
            left,
        }
    }

    /// Create margins where all values are equal
    pub fn all<D: Into<Fixed>>(value: D) -> Margins {
        let value: Fixed = value.into();
        Margins {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }

    /// Create margins where all values are the same whole number of pixels
    pub fn px(value: i32) -> Margins {
        Margins::all(Fixed::from_int(value))
    }

    /// Create margins by specifying different values for vertical (top and bottom)
    /// and horizontal (left and right) margins
    pub fn symmetric(vertical: Fixed, horizontal: Fixed) -> Margins {
        Margins {
            top: vertical,
            right: horizontal,
            bottom: vertical,
            left: horizontal,
        }
    }

    /// Create margins where all values are 0
    pub fn empty() -> Margins {
        Margins::default()
    }

    /// True when no edge takes up any space
    pub fn is_empty(&self) -> bool {
        *self == Margins::default()
    }

    /// Combined left and right spacing
    pub fn horizontal(&self) -> Fixed {
        self.left + self.right
    }

    /// Combined top and bottom spacing
    pub fn vertical(&self) -> Fixed {
        self.top + self.bottom
    }

    /// Sum two sets of spacing edge by edge
    pub fn combine(&self, other: &Margins) -> Margins {
        Margins {
            top: self.top + other.top,
            right: self.right + other.right,
            bottom: self.bottom + other.bottom,
            left: self.left + other.left,
        }
    }
}
