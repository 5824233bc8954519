//! Sizing a page from its content.
//!
//! [`Wrapper::text_to_specs`] measures the content, feeds the measured size
//! through caller supplied [`SizeFn`]s and lays the content out again at the
//! size they settle on. Size functions compose, so "A4 width, but no wider
//! than the text" is `SizeFn::min(a4_width(96.0), SizeFn::auto())`.

use super::fold::Line;
use super::wrapper::{LayoutSession, Wrapper};
use crate::colour::{Colour, Paint};
use crate::options::DrawOptions;
use crate::pagesize::{self, PageSize};
use crate::rect::{PixelPoint, PixelRect};
use crate::surface::{fill_rect, Surface};
use crate::WrapError;
use image::RgbaImage;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Stand-in for "no limit" when measuring
const UNBOUNDED: i32 = 1_000_000;

/// Maps the measured size of the content (margins included) to the size
/// the page should have, in pixels
#[derive(Clone)]
pub struct SizeFn(Arc<dyn Fn(i32) -> i32 + Send + Sync>);

impl SizeFn {
    pub fn new<F>(f: F) -> SizeFn
    where
        F: Fn(i32) -> i32 + Send + Sync + 'static,
    {
        SizeFn(Arc::new(f))
    }

    /// Always `px`, whatever the content
    pub fn fixed(px: i32) -> SizeFn {
        SizeFn::new(move |_| px)
    }

    /// Exactly the content size
    pub fn unbounded() -> SizeFn {
        SizeFn::new(|n| n)
    }

    /// Exactly the content size
    pub fn auto() -> SizeFn {
        SizeFn::unbounded()
    }

    /// The smaller of two sizes
    pub fn min(a: SizeFn, b: SizeFn) -> SizeFn {
        SizeFn::new(move |n| a.resolve(n).min(b.resolve(n)))
    }

    /// The larger of two sizes
    pub fn max(a: SizeFn, b: SizeFn) -> SizeFn {
        SizeFn::new(move |n| a.resolve(n).max(b.resolve(n)))
    }

    pub fn resolve(&self, content: i32) -> i32 {
        (self.0)(content)
    }
}

impl Default for SizeFn {
    fn default() -> Self {
        SizeFn::unbounded()
    }
}

impl fmt::Debug for SizeFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SizeFn")
    }
}

/// Converts lengths in points to whole pixels at `dpi`
pub fn dpi(dpi: f32) -> impl Fn(f32) -> i32 {
    move |points| pagesize::points_to_pixels(points, dpi)
}

/// The width of a page size at `dpi`
pub fn page_width(size: PageSize, dpi: f32) -> SizeFn {
    SizeFn::fixed(pagesize::pixels(size, dpi).0)
}

/// The height of a page size at `dpi`
pub fn page_height(size: PageSize, dpi: f32) -> SizeFn {
    SizeFn::fixed(pagesize::pixels(size, dpi).1)
}

pub fn a4_width(dpi: f32) -> SizeFn {
    SizeFn::fixed((210.0 / 25.4 * dpi) as i32)
}

pub fn a4_height(dpi: f32) -> SizeFn {
    SizeFn::fixed((297.0 / 25.4 * dpi) as i32)
}

/// Space around the content, in pixels, optionally painted
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct PageMargin {
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
    pub left: i32,
    pub colour: Option<Colour>,
}

impl PageMargin {
    pub fn all(px: i32, colour: Option<Colour>) -> PageMargin {
        PageMargin {
            top: px,
            right: px,
            bottom: px,
            left: px,
            colour,
        }
    }

    pub fn horizontal(&self) -> i32 {
        self.left + self.right
    }

    pub fn vertical(&self) -> i32 {
        self.top + self.bottom
    }
}

/// Constraints for [`Wrapper::text_to_specs`]
#[derive(Debug, Default, Clone)]
pub struct SpecConfig {
    pub width: SizeFn,
    pub height: SizeFn,
    pub margin: PageMargin,
    pub page_background: Option<Colour>,
}

impl SpecConfig {
    pub fn new() -> SpecConfig {
        SpecConfig::default()
    }

    pub fn width(mut self, f: SizeFn) -> SpecConfig {
        self.width = f;
        self
    }

    pub fn height(mut self, f: SizeFn) -> SpecConfig {
        self.height = f;
        self
    }

    /// The same margin on every side, painted with `colour` if given
    pub fn margin(mut self, px: i32, colour: Option<Colour>) -> SpecConfig {
        self.margin = PageMargin::all(px, colour);
        self
    }

    pub fn page_margin(mut self, margin: PageMargin) -> SpecConfig {
        self.margin = margin;
        self
    }

    pub fn page_background(mut self, colour: Colour) -> SpecConfig {
        self.page_background = Some(colour);
        self
    }
}

/// A page sized by [`Wrapper::text_to_specs`]
#[derive(Debug, Clone)]
pub struct LayoutResult {
    pub lines: Vec<Line>,
    pub page_size: PixelPoint,
    /// Top-left of the content area, just inside the margin
    pub content_start: PixelPoint,
    pub margin: PageMargin,
    pub page_background: Option<Colour>,
}

impl LayoutResult {
    /// The page rectangle with its top-left at `origin`
    pub fn page_rect(&self, origin: PixelPoint) -> PixelRect {
        PixelRect::new(origin.x, origin.y, origin.x + self.page_size.x, origin.y + self.page_size.y)
    }

    /// The content rectangle with the page's top-left at `origin`
    pub fn content_rect(&self, origin: PixelPoint) -> PixelRect {
        let page = self.page_rect(origin);
        PixelRect::new(
            page.x1 + self.margin.left,
            page.y1 + self.margin.top,
            page.x2 - self.margin.right,
            page.y2 - self.margin.bottom,
        )
    }

    /// Paint the page background and margin, then the lines
    pub fn draw(
        &self,
        surface: &mut dyn Surface,
        origin: PixelPoint,
        wrapper: &Wrapper,
        opts: &DrawOptions,
    ) {
        let page = self.page_rect(origin);
        let content = self.content_rect(origin);
        if let Some(bg) = self.page_background {
            fill_rect(surface, page, &Paint::Solid(bg), (page.x1, page.y1));
        }
        if let Some(colour) = self.margin.colour {
            let paint = Paint::Solid(colour);
            for band in [
                PixelRect::new(page.x1, page.y1, page.x2, content.y1),
                PixelRect::new(page.x1, content.y2, page.x2, page.y2),
                PixelRect::new(page.x1, content.y1, content.x1, content.y2),
                PixelRect::new(content.x2, content.y1, page.x2, content.y2),
            ] {
                if !band.is_empty() {
                    fill_rect(surface, band, &paint, (page.x1, page.y1));
                }
            }
        }
        wrapper.render_lines(surface, &self.lines, content, opts);
    }

    /// Draw the page onto a new image of exactly its size
    pub fn to_image(&self, wrapper: &Wrapper, opts: &DrawOptions) -> RgbaImage {
        let mut image =
            RgbaImage::new(self.page_size.x.max(0) as u32, self.page_size.y.max(0) as u32);
        self.draw(&mut image, PixelPoint::new(0, 0), wrapper, opts);
        image
    }
}

impl Wrapper {
    /// Lay out the session's content from the start onto a page whose size
    /// is derived from the content by `config`.
    ///
    /// The content is measured unconstrained first, then laid out at the
    /// resolved width to find its height. If the resolved height is smaller
    /// than that, it is laid out a final time at the resolved size.
    pub fn text_to_specs(
        &self,
        session: &mut LayoutSession,
        config: &SpecConfig,
    ) -> Result<LayoutResult, WrapError> {
        let counters = (session.box_count, session.page);
        let restart = |session: &mut LayoutSession| {
            session.reset();
            session.box_count = counters.0;
            session.page = counters.1;
        };

        restart(session);
        let (lines, _) = self
            .text_to_rect(session, PixelRect::sized(UNBOUNDED, UNBOUNDED))
            .map_err(|e| e.in_pass("measure"))?;
        let natural_width = lines.iter().map(|l| l.size().width()).max().unwrap_or(0);

        let mh = config.margin.horizontal();
        let mv = config.margin.vertical();
        let page_width = config.width.resolve(natural_width + mh).max(mh + 1);
        let content_width = page_width - mh;
        // a line only fits if it is narrower than its container
        let fold_width = content_width + 1;

        restart(session);
        let (mut lines, end) = self
            .text_to_rect(session, PixelRect::sized(fold_width, UNBOUNDED))
            .map_err(|e| e.in_pass("layout"))?;
        let natural_height = end.y;

        let page_height = config.height.resolve(natural_height + mv).max(mv + 1);
        let content_height = page_height - mv;
        debug!(natural_width, natural_height, page_width, page_height, "sized page");

        if content_height < natural_height {
            restart(session);
            lines = self
                .text_to_rect(session, PixelRect::sized(fold_width, content_height))
                .map_err(|e| e.in_pass("final"))?
                .0;
        }

        Ok(LayoutResult {
            lines,
            page_size: PixelPoint::new(page_width, page_height),
            content_start: PixelPoint::new(config.margin.left, config.margin.top),
            margin: config.margin,
            page_background: config.page_background,
        })
    }
}
