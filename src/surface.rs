//! The raster surface that boxes and lines are drawn onto.
//!
//! Surfaces are owned by the caller. Layout code never allocates one; it is
//! handed `(surface, PixelRect)` pairs and only touches pixels inside the
//! rectangle, which plays the role of a sub-image view.

use crate::colour::Paint;
use crate::rect::{PixelPoint, PixelRect};
use image::{Rgba, RgbaImage};

/// A mutable 2-D pixel surface
pub trait Surface {
    /// The area of the surface that can be drawn to
    fn bounds(&self) -> PixelRect;

    /// Read a pixel. Out-of-bounds reads are transparent.
    fn pixel(&self, x: i32, y: i32) -> Rgba<u8>;

    /// Replace a pixel. Out-of-bounds writes are ignored.
    fn set_pixel(&mut self, x: i32, y: i32, colour: Rgba<u8>);

    /// Composite `colour` over the existing pixel, with `coverage` in 0..=1
    /// scaling the colour's own alpha
    fn blend_pixel(&mut self, x: i32, y: i32, colour: Rgba<u8>, coverage: f32) {
        let src_a = colour.0[3] as f32 / 255.0 * coverage.clamp(0.0, 1.0);
        if src_a <= 0.0 {
            return;
        }
        let dst = self.pixel(x, y);
        let dst_a = dst.0[3] as f32 / 255.0;
        let out_a = src_a + dst_a * (1.0 - src_a);
        let mut out = [0u8; 4];
        for i in 0..3 {
            let s = colour.0[i] as f32 * src_a;
            let d = dst.0[i] as f32 * dst_a * (1.0 - src_a);
            out[i] = if out_a > 0.0 {
                ((s + d) / out_a).round().clamp(0.0, 255.0) as u8
            } else {
                0
            };
        }
        out[3] = (out_a * 255.0).round() as u8;
        self.set_pixel(x, y, Rgba(out));
    }
}

impl Surface for RgbaImage {
    fn bounds(&self) -> PixelRect {
        PixelRect::sized(self.width() as i32, self.height() as i32)
    }

    fn pixel(&self, x: i32, y: i32) -> Rgba<u8> {
        if x < 0 || y < 0 || x >= self.width() as i32 || y >= self.height() as i32 {
            return Rgba([0, 0, 0, 0]);
        }
        *self.get_pixel(x as u32, y as u32)
    }

    fn set_pixel(&mut self, x: i32, y: i32, colour: Rgba<u8>) {
        if x < 0 || y < 0 || x >= self.width() as i32 || y >= self.height() as i32 {
            return;
        }
        self.put_pixel(x as u32, y as u32, colour);
    }
}

/// Replace every pixel of `rect` with `paint`, tiling patterns from `origin`
pub fn fill_rect(
    surface: &mut dyn Surface,
    rect: PixelRect,
    paint: &Paint,
    origin: (i32, i32),
) {
    let rect = rect.intersect(&surface.bounds());
    for y in rect.y1..rect.y2 {
        for x in rect.x1..rect.x2 {
            let c = paint.at(x, y, origin);
            surface.set_pixel(x, y, c);
        }
    }
}

/// Composite `image` over the surface with its top-left corner at `at`,
/// touching no pixel outside `clip`
pub fn draw_image(surface: &mut dyn Surface, at: PixelPoint, clip: PixelRect, image: &RgbaImage) {
    let clip = clip.intersect(&surface.bounds());
    if clip.is_empty() {
        return;
    }
    for (ix, iy, c) in image.enumerate_pixels() {
        let x = at.x + ix as i32;
        let y = at.y + iy as i32;
        if clip.contains(x, y) {
            surface.blend_pixel(x, y, *c, 1.0);
        }
    }
}

/// Stroke a one pixel outline just inside `rect`. Used to visualise box and
/// line extents while debugging a layout.
pub fn stroke_rect(surface: &mut dyn Surface, rect: PixelRect, paint: &Paint) {
    if rect.is_empty() {
        return;
    }
    let origin = (rect.x1, rect.y1);
    for x in rect.x1..rect.x2 {
        surface.set_pixel(x, rect.y1, paint.at(x, rect.y1, origin));
        surface.set_pixel(x, rect.y2 - 1, paint.at(x, rect.y2 - 1, origin));
    }
    for y in rect.y1..rect.y2 {
        surface.set_pixel(rect.x1, y, paint.at(rect.x1, y, origin));
        surface.set_pixel(rect.x2 - 1, y, paint.at(rect.x2 - 1, y, origin));
    }
}
