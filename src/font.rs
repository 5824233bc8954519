use crate::colour::Paint;
use crate::rect::PixelRect;
use crate::surface::Surface;
use crate::units::{Fixed, FixedPoint, FixedRect, FontMetrics};
use crate::WrapError;
use ab_glyph::{Font as _, FontVec, PxScale, ScaleFont};
use owned_ttf_parser::{AsFaceRef, OwnedFace};
use std::fmt;
use std::sync::Arc;

/// Something that can measure and draw strings at a fixed size. Boxes keep a
/// reference to the provider that measured them so that the line folder can
/// tell when the font changes in the middle of a line.
pub trait GlyphMetrics: Send + Sync {
    /// Measure a string, returning its ink bounds (relative to the pen on the
    /// baseline, y growing downwards) and how far the pen advances
    fn measure(&self, text: &str) -> (FixedRect, Fixed);

    /// Vertical metrics of the face
    fn metrics(&self) -> FontMetrics;

    /// Draw `text` with the pen starting at `dot` (on the baseline), touching
    /// no pixel outside `clip`
    fn draw(
        &self,
        surface: &mut dyn Surface,
        clip: PixelRect,
        dot: FixedPoint,
        text: &str,
        paint: &Paint,
    );
}

/// Shared handle to a glyph-metrics provider
pub type FaceRef = Arc<dyn GlyphMetrics>;

/// True if both handles refer to the same provider
pub fn same_face(a: &FaceRef, b: &FaceRef) -> bool {
    Arc::ptr_eq(a, b)
}

/// A parsed font object. Fonts can be TTF or OTF fonts. Metrics are read from
/// the font tables directly, glyph coverage is rasterized on demand.
///
/// A `Font` has no size; pair it with one using [`FontFace`].
pub struct Font {
    pub face: OwnedFace,
    raster: FontVec,
}

impl Font {
    /// Load a font from raw bytes, parsing the font and returning an error if the font
    /// could not be parsed
    pub fn load(bytes: Vec<u8>) -> Result<Font, WrapError> {
        let raster = FontVec::try_from_vec(bytes.clone())?;
        let face = OwnedFace::from_vec(bytes, 0)?;

        Ok(Font { face, raster })
    }

    /// Load a font from a file on disk
    pub fn load_from_disk<P: AsRef<std::path::Path>>(path: P) -> Result<Font, WrapError> {
        let bytes = std::fs::read(path)?;
        Font::load(bytes)
    }

    /// Obtain the family name of the font, if it has one
    pub fn family(&self) -> Option<String> {
        self.face
            .as_face_ref()
            .names()
            .into_iter()
            .find(|name| name.name_id == owned_ttf_parser::name_id::FAMILY && name.is_unicode())
            .and_then(|name| name.to_string())
    }

    fn scaling(&self, size_px: f32) -> f32 {
        size_px / self.face.as_face_ref().units_per_em() as f32
    }

    /// Calculate the ascent (distance from the baseline to the top of the font) for the given
    /// pixel size
    pub fn ascent(&self, size_px: f32) -> f32 {
        self.scaling(size_px) * self.face.as_face_ref().ascender() as f32
    }

    /// Calculate the descent (distance from the baseline to the bottom of the font) for the given
    /// pixel size. Note: unlike the font tables this is positive for faces that hang below the
    /// baseline
    pub fn descent(&self, size_px: f32) -> f32 {
        -(self.scaling(size_px) * self.face.as_face_ref().descender() as f32)
    }

    /// Calculate the leading (extra space between lines) for the given pixel size
    pub fn leading(&self, size_px: f32) -> f32 {
        self.scaling(size_px) * self.face.as_face_ref().line_gap() as f32
    }

    /// Calculate the default line height of the font for the given size. The returned value is
    /// how much to vertically offset a second row of text below a first row of text.
    pub fn line_height(&self, size_px: f32) -> f32 {
        self.leading(size_px) + self.ascent(size_px) + self.descent(size_px)
    }

    pub fn glyph_id(&self, ch: char) -> Option<u16> {
        self.face.as_face_ref().glyph_index(ch).map(|i| i.0)
    }

    fn glyph_or_replacement(&self, ch: char) -> owned_ttf_parser::GlyphId {
        let face = self.face.as_face_ref();
        face.glyph_index(ch)
            .or_else(|| face.glyph_index('\u{FFFD}'))
            .or_else(|| face.glyph_index('?'))
            .unwrap_or(owned_ttf_parser::GlyphId(0))
    }
}

/// A [`Font`] at a particular size, ready to measure and draw text
#[derive(Clone)]
pub struct FontFace {
    font: Arc<Font>,
    size_px: f32,
}

impl FontFace {
    /// A face of `size` points rendered at `dpi` dots per inch
    pub fn new(font: Arc<Font>, size: f32, dpi: f32) -> FontFace {
        FontFace {
            font,
            size_px: size * dpi / 72.0,
        }
    }

    /// A face with the em square `size_px` pixels tall
    pub fn with_pixel_size(font: Arc<Font>, size_px: f32) -> FontFace {
        FontFace { font, size_px }
    }

    /// Wrap into a shared provider handle
    pub fn into_ref(self) -> FaceRef {
        Arc::new(self)
    }
}

impl GlyphMetrics for FontFace {
    fn measure(&self, text: &str) -> (FixedRect, Fixed) {
        let scaling = self.font.scaling(self.size_px);
        let face = self.font.face.as_face_ref();
        let mut pen = 0.0f32;
        let mut bounds: Option<(f32, f32, f32, f32)> = None;
        for ch in text.chars() {
            let gid = self.font.glyph_or_replacement(ch);
            if let Some(bb) = face.glyph_bounding_box(gid) {
                let x1 = pen + bb.x_min as f32 * scaling;
                let x2 = pen + bb.x_max as f32 * scaling;
                // font units grow upwards, layout grows downwards
                let y1 = -(bb.y_max as f32) * scaling;
                let y2 = -(bb.y_min as f32) * scaling;
                bounds = Some(match bounds {
                    None => (x1, y1, x2, y2),
                    Some((a, b, c, d)) => (a.min(x1), b.min(y1), c.max(x2), d.max(y2)),
                });
            }
            pen += face.glyph_hor_advance(gid).unwrap_or_default() as f32 * scaling;
        }
        let (x1, y1, x2, y2) = bounds.unwrap_or_default();
        let rect = FixedRect::new(
            FixedPoint::new(Fixed::from_f32(x1), Fixed::from_f32(y1)),
            FixedPoint::new(Fixed::from_f32(x2), Fixed::from_f32(y2)),
        );
        (rect, Fixed::from_f32(pen))
    }

    fn metrics(&self) -> FontMetrics {
        FontMetrics {
            height: Fixed::from_f32(self.font.line_height(self.size_px)),
            ascent: Fixed::from_f32(self.font.ascent(self.size_px)),
            descent: Fixed::from_f32(self.font.descent(self.size_px)),
        }
    }

    fn draw(
        &self,
        surface: &mut dyn Surface,
        clip: PixelRect,
        dot: FixedPoint,
        text: &str,
        paint: &Paint,
    ) {
        let clip = clip.intersect(&surface.bounds());
        if clip.is_empty() {
            return;
        }
        let scaled = self.font.raster.as_scaled(PxScale::from(self.size_px));
        let origin = (clip.x1, clip.y1);
        let mut x = dot.x.to_f32();
        let y = dot.y.to_f32();
        for ch in text.chars() {
            let id = scaled.glyph_id(ch);
            let glyph = id.with_scale_and_position(self.size_px, ab_glyph::point(x, y));
            x += scaled.h_advance(id);
            let Some(outlined) = self.font.raster.outline_glyph(glyph) else {
                continue;
            };
            let bb = outlined.px_bounds();
            outlined.draw(|gx, gy, coverage| {
                let px = bb.min.x as i32 + gx as i32;
                let py = bb.min.y as i32 + gy as i32;
                if clip.contains(px, py) {
                    let c = paint.at(px, py, origin);
                    surface.blend_pixel(px, py, c, coverage);
                }
            });
        }
    }
}

impl fmt::Debug for FontFace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontFace")
            .field("family", &self.font.family())
            .field("size_px", &self.size_px)
            .finish()
    }
}

/// A synthetic face where every character is a solid cell of the same size.
///
/// Whitespace advances like any other character but is not inked. Layout
/// with a `BlockFace` is exact and independent of any font file, which
/// makes it the face of choice for tests and for previewing layouts.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct BlockFace {
    /// Advance of every character, in pixels
    pub advance: i32,
    /// Height above the baseline, in pixels
    pub ascent: i32,
    /// Depth below the baseline, in pixels
    pub descent: i32,
}

impl BlockFace {
    pub fn new(advance: i32, ascent: i32, descent: i32) -> BlockFace {
        BlockFace {
            advance,
            ascent,
            descent,
        }
    }

    /// Wrap into a shared provider handle
    pub fn into_ref(self) -> FaceRef {
        Arc::new(self)
    }
}

impl GlyphMetrics for BlockFace {
    fn measure(&self, text: &str) -> (FixedRect, Fixed) {
        let n = text.chars().count() as i32;
        let advance = Fixed::from_int(self.advance * n);
        let bounds = FixedRect::new(
            FixedPoint::px(0, -self.ascent),
            FixedPoint::new(advance, Fixed::from_int(self.descent)),
        );
        (bounds, advance)
    }

    fn metrics(&self) -> FontMetrics {
        FontMetrics {
            height: Fixed::from_int(self.ascent + self.descent),
            ascent: Fixed::from_int(self.ascent),
            descent: Fixed::from_int(self.descent),
        }
    }

    fn draw(
        &self,
        surface: &mut dyn Surface,
        clip: PixelRect,
        dot: FixedPoint,
        text: &str,
        paint: &Paint,
    ) {
        let clip = clip.intersect(&surface.bounds());
        let origin = (clip.x1, clip.y1);
        let mut x = dot.x.round();
        let baseline = dot.y.round();
        for ch in text.chars() {
            if !ch.is_whitespace() {
                let cell = PixelRect::new(
                    x,
                    baseline - self.ascent,
                    x + self.advance,
                    baseline + self.descent,
                )
                .intersect(&clip);
                for py in cell.y1..cell.y2 {
                    for px in cell.x1..cell.x2 {
                        let c = paint.at(px, py, origin);
                        surface.blend_pixel(px, py, c, 1.0);
                    }
                }
            }
            x += self.advance;
        }
    }
}
