use image::{Rgba, RgbaImage};
use std::fmt;
use std::sync::Arc;

/// A colour, expressed in RGB, CMYK or grey colour spaces. Everything is
/// converted to 8-bit RGBA when it reaches a raster surface.
#[derive(Copy, Clone, PartialEq, Debug)]
pub enum Colour {
    /// RGB colour; r, g, b, range from 0.0 to 1.0
    RGB { r: f32, g: f32, b: f32 },
    /// RGB colour with coverage; r, g, b, a range from 0.0 to 1.0
    RGBA { r: f32, g: f32, b: f32, a: f32 },
    /// CMYK colour; c, m, y, and k range from 0.0 to 1.0
    CMYK { c: f32, m: f32, y: f32, k: f32 },
    /// Grey colour; g ranges from 0.0 to 1.0
    Grey { g: f32 },
}

impl Colour {
    /// Create a new colour in the RGB space. r, g, and b range from 0.0 to 1.0
    pub fn new_rgb(r: f32, g: f32, b: f32) -> Colour {
        Colour::RGB { r, g, b }
    }

    /// Create a new colour in the RGB space. r, g, and b range from 0 to 255
    pub fn new_rgb_bytes(r: u8, g: u8, b: u8) -> Colour {
        Colour::RGB {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
        }
    }

    /// Create a new translucent colour in the RGB space. All components range from 0 to 255
    pub fn new_rgba_bytes(r: u8, g: u8, b: u8, a: u8) -> Colour {
        Colour::RGBA {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
            a: a as f32 / 255.0,
        }
    }

    /// Create a new colour in the CMYK space. c, m, y, and k range from 0.0 to 1.0
    pub fn new_cmyk(c: f32, m: f32, y: f32, k: f32) -> Colour {
        Colour::CMYK { c, m, y, k }
    }

    /// Create a new colour in the Gray space, g ranges from 0.0 to 1.0
    pub fn new_grey(g: f32) -> Colour {
        Colour::Grey { g }
    }

    /// Create a new colour in the Gray space, g ranges from 0 to 255
    pub fn new_grey_bytes(g: u8) -> Colour {
        Colour::Grey {
            g: g as f32 / 255.0,
        }
    }

    /// Convert to the 8-bit RGBA representation used by raster surfaces
    pub fn to_rgba8(&self) -> Rgba<u8> {
        fn byte(v: f32) -> u8 {
            (v.clamp(0.0, 1.0) * 255.0).round() as u8
        }

        match *self {
            Colour::RGB { r, g, b } => Rgba([byte(r), byte(g), byte(b), 255]),
            Colour::RGBA { r, g, b, a } => Rgba([byte(r), byte(g), byte(b), byte(a)]),
            Colour::CMYK { c, m, y, k } => Rgba([
                byte((1.0 - c) * (1.0 - k)),
                byte((1.0 - m) * (1.0 - k)),
                byte((1.0 - y) * (1.0 - k)),
                255,
            ]),
            Colour::Grey { g } => Rgba([byte(g), byte(g), byte(g), 255]),
        }
    }
}

impl From<Rgba<u8>> for Colour {
    fn from(c: Rgba<u8>) -> Self {
        let [r, g, b, a] = c.0;
        Colour::new_rgba_bytes(r, g, b, a)
    }
}

impl<T: Into<f32>> From<(T, T, T)> for Colour {
    fn from(c: (T, T, T)) -> Self {
        Colour::RGB {
            r: c.0.into(),
            g: c.1.into(),
            b: c.2.into(),
        }
    }
}

impl<T: Into<f32>> From<[T; 3]> for Colour {
    fn from(c: [T; 3]) -> Self {
        let [r, g, b] = c;
        Colour::RGB {
            r: r.into(),
            g: g.into(),
            b: b.into(),
        }
    }
}

/// A list of pre-defined colour constants
pub mod colours {
    use super::*;

    pub const BLACK: Colour = Colour::Grey { g: 0.0 };
    pub const WHITE: Colour = Colour::Grey { g: 1.0 };
    pub const TRANSPARENT: Colour = Colour::RGBA {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 0.0,
    };
    pub const RED: Colour = Colour::RGB {
        r: 1.0,
        g: 0.0,
        b: 0.0,
    };
    pub const GREEN: Colour = Colour::RGB {
        r: 0.0,
        g: 1.0,
        b: 0.0,
    };
    pub const BLUE: Colour = Colour::RGB {
        r: 0.0,
        g: 0.0,
        b: 1.0,
    };
    pub const YELLOW: Colour = Colour::CMYK {
        c: 0.0,
        m: 0.0,
        y: 1.0,
        k: 0.0,
    };
}

/// What a region is filled with: a flat colour, or an image tiled across the
/// region. Used for text, backgrounds and borders alike.
#[derive(Clone)]
pub enum Paint {
    Solid(Colour),
    Pattern(Arc<RgbaImage>),
}

impl Paint {
    pub fn solid<C: Into<Colour>>(c: C) -> Paint {
        Paint::Solid(c.into())
    }

    pub fn pattern(image: RgbaImage) -> Paint {
        Paint::Pattern(Arc::new(image))
    }

    /// The colour of this paint at surface pixel `(x, y)`, where `origin` is
    /// the surface position that maps to the top-left of a pattern tile
    pub fn at(&self, x: i32, y: i32, origin: (i32, i32)) -> Rgba<u8> {
        match self {
            Paint::Solid(c) => c.to_rgba8(),
            Paint::Pattern(img) => {
                let (w, h) = (img.width() as i32, img.height() as i32);
                if w == 0 || h == 0 {
                    return colours::TRANSPARENT.to_rgba8();
                }
                let px = (x - origin.0).rem_euclid(w) as u32;
                let py = (y - origin.1).rem_euclid(h) as u32;
                *img.get_pixel(px, py)
            }
        }
    }

    /// True when drawing this paint can never change a pixel
    pub fn is_invisible(&self) -> bool {
        match self {
            Paint::Solid(c) => c.to_rgba8().0[3] == 0,
            Paint::Pattern(img) => img.width() == 0 || img.height() == 0,
        }
    }
}

impl Default for Paint {
    fn default() -> Self {
        Paint::Solid(colours::BLACK)
    }
}

impl From<Colour> for Paint {
    fn from(c: Colour) -> Self {
        Paint::Solid(c)
    }
}

impl fmt::Debug for Paint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Paint::Solid(c) => f.debug_tuple("Solid").field(c).finish(),
            Paint::Pattern(img) => write!(f, "Pattern({}x{})", img.width(), img.height()),
        }
    }
}

impl PartialEq for Paint {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Paint::Solid(a), Paint::Solid(b)) => a == b,
            (Paint::Pattern(a), Paint::Pattern(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}
