//! Box wrappers that add spacing, fills and effects around a child.
//!
//! Wrappers never change the child; they report the child's geometry plus
//! their own spacing and draw around it. Styles carry wrappers as an ordered
//! list of [`Decorator`] descriptors which [`apply_decorators`] turns into
//! nested boxes, first descriptor innermost.

use super::boxes::{box_frame, LayoutBox, MinSizeBox};
use super::Margins;
use crate::colour::{Colour, Paint};
use crate::options::DrawOptions;
use crate::rect::PixelRect;
use crate::surface::{fill_rect, Surface};
use crate::units::{Fixed, FixedPoint, FontMetrics};
use std::fmt;
use std::sync::Arc;

/// Which surface position the top-left of a fill's pattern tile is pinned to
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub enum BackgroundPositioning {
    /// The top-left of the content (inside the padding)
    #[default]
    ContentRelative,
    /// The top-left of the decorated frame (inside the margin)
    FrameRelative,
    /// The surface origin, so neighbouring boxes share one continuous pattern
    PassThrough,
}

/// A paint plus where its pattern is pinned
#[derive(Clone, Debug, PartialEq)]
pub struct Fill {
    pub paint: Paint,
    pub positioning: BackgroundPositioning,
}

impl Fill {
    pub fn new<P: Into<Paint>>(paint: P, positioning: BackgroundPositioning) -> Fill {
        Fill {
            paint: paint.into(),
            positioning,
        }
    }

    fn origin(&self, frame: PixelRect, content: PixelRect) -> (i32, i32) {
        match self.positioning {
            BackgroundPositioning::ContentRelative => (content.x1, content.y1),
            BackgroundPositioning::FrameRelative => (frame.x1, frame.y1),
            BackgroundPositioning::PassThrough => (0, 0),
        }
    }

    fn is_invisible(&self) -> bool {
        self.paint.is_invisible()
    }
}

/// Padding, border and margin around a child, plus optional fills for the
/// padding area (background) and the border band.
///
/// From the outside in: margin (never painted), border (painted with
/// `border_fill`), padding (painted with `background`), then the child.
#[derive(Clone, Debug)]
pub struct DecorationBox {
    pub child: Box<LayoutBox>,
    pub padding: Margins,
    pub border: Margins,
    pub margin: Margins,
    pub background: Option<Fill>,
    pub border_fill: Option<Fill>,
}

impl DecorationBox {
    pub fn new(child: LayoutBox) -> DecorationBox {
        DecorationBox {
            child: Box::new(child),
            padding: Margins::empty(),
            border: Margins::empty(),
            margin: Margins::empty(),
            background: None,
            border_fill: None,
        }
    }

    pub fn with_padding(mut self, padding: Margins) -> DecorationBox {
        self.padding = padding;
        self
    }

    pub fn with_margin(mut self, margin: Margins) -> DecorationBox {
        self.margin = margin;
        self
    }

    pub fn with_border(mut self, width: Margins, fill: Option<Fill>) -> DecorationBox {
        self.border = width;
        self.border_fill = fill;
        self
    }

    pub fn with_background(mut self, background: Option<Fill>) -> DecorationBox {
        self.background = background;
        self
    }

    /// Total spacing on each edge
    pub fn spacing(&self) -> Margins {
        self.padding.combine(&self.border).combine(&self.margin)
    }

    /// True when the decoration neither takes space nor paints anything
    pub fn is_invisible(&self) -> bool {
        self.spacing().is_empty()
            && self.background.as_ref().map_or(true, Fill::is_invisible)
            && self.border_fill.as_ref().map_or(true, Fill::is_invisible)
    }

    pub(crate) fn advance(&self) -> Fixed {
        self.child.advance() + self.spacing().horizontal()
    }

    pub(crate) fn metrics(&self) -> FontMetrics {
        let s = self.spacing();
        let mut m = self.child.metrics();
        m.ascent += s.top;
        m.descent += s.bottom;
        m.height += s.vertical();
        m
    }

    pub(crate) fn min_size(&self) -> FixedPoint {
        let s = self.spacing();
        let inner = self.child.min_size();
        FixedPoint::new(inner.x + s.horizontal(), inner.y + s.vertical())
    }

    pub(crate) fn max_size(&self) -> FixedPoint {
        let inner = self.child.max_size();
        if inner.is_zero() {
            return inner;
        }
        let s = self.spacing();
        FixedPoint::new(inner.x + s.horizontal(), inner.y + s.vertical())
    }

    pub(crate) fn draw(
        &self,
        surface: &mut dyn Surface,
        area: PixelRect,
        baseline: Fixed,
        opts: &DrawOptions,
    ) {
        if self.spacing().is_empty() && self.background.is_none() && self.border_fill.is_none() {
            self.child.draw(surface, area, baseline, opts);
            return;
        }

        let frame = box_frame(area, baseline, &self.metrics());
        let outer = frame.inset(&self.margin);
        let padded = outer.inset(&self.border);
        let inner = padded.inset(&self.padding);

        if let Some(fill) = &self.border_fill {
            let origin = fill.origin(outer, inner);
            for band in [
                PixelRect::new(outer.x1, outer.y1, outer.x2, padded.y1),
                PixelRect::new(outer.x1, padded.y2, outer.x2, outer.y2),
                PixelRect::new(outer.x1, padded.y1, padded.x1, padded.y2),
                PixelRect::new(padded.x2, padded.y1, outer.x2, padded.y2),
            ] {
                if !band.is_empty() {
                    fill_rect(surface, band, &fill.paint, origin);
                }
            }
        }

        if let Some(fill) = &self.background {
            fill_rect(surface, padded, &fill.paint, fill.origin(outer, inner));
        }

        if inner.width() <= 0 {
            return;
        }
        let child_baseline = Fixed::from_int(area.y1) + baseline - Fixed::from_int(inner.y1);
        self.child.draw(surface, inner, child_baseline, opts);
    }
}

/// One entry of a style's wrapper list
#[derive(Clone, Debug, PartialEq)]
pub enum Decorator {
    Padding(Margins),
    Margin(Margins),
    Border { width: Margins, fill: Option<Fill> },
    Background(Fill),
    MinSize(FixedPoint),
}

impl Decorator {
    /// Wrap `b` in the box this descriptor stands for
    pub fn apply(&self, b: LayoutBox) -> LayoutBox {
        match self {
            Decorator::Padding(p) => DecorationBox::new(b).with_padding(*p).into(),
            Decorator::Margin(m) => DecorationBox::new(b).with_margin(*m).into(),
            Decorator::Border { width, fill } => {
                DecorationBox::new(b).with_border(*width, fill.clone()).into()
            }
            Decorator::Background(fill) => {
                DecorationBox::new(b).with_background(Some(fill.clone())).into()
            }
            Decorator::MinSize(min) => MinSizeBox::new(b, *min).into(),
        }
    }
}

/// Wrap `core` in every decorator in order, so the last one ends up outermost
pub fn apply_decorators(core: LayoutBox, decorators: &[Decorator]) -> LayoutBox {
    decorators.iter().fold(core, |b, d| d.apply(b))
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum EffectStage {
    /// Drawn before the child, underneath it
    Pre,
    /// Drawn after the child, on top of it
    Post,
}

/// Draws on the surface given the box's slice, its baseline within the slice
/// and the box being decorated
pub type EffectFn = Arc<dyn Fn(&mut dyn Surface, PixelRect, Fixed, &LayoutBox) + Send + Sync>;

#[derive(Clone)]
pub struct BoxEffect {
    pub stage: EffectStage,
    func: EffectFn,
}

impl BoxEffect {
    pub fn new<F>(stage: EffectStage, f: F) -> BoxEffect
    where
        F: Fn(&mut dyn Surface, PixelRect, Fixed, &LayoutBox) + Send + Sync + 'static,
    {
        BoxEffect {
            stage,
            func: Arc::new(f),
        }
    }

    /// A one pixel line just below the baseline
    pub fn underline(colour: Colour) -> BoxEffect {
        let paint = Paint::Solid(colour);
        BoxEffect::new(EffectStage::Post, move |surface, area, baseline, _| {
            let y = ((Fixed::from_int(area.y1) + baseline).ceil() + 1).min(area.y2 - 1);
            let line = PixelRect::new(area.x1, y, area.x2, y + 1).intersect(&area);
            fill_rect(surface, line, &paint, (0, 0));
        })
    }

    /// A one pixel line through the lower part of the x-height
    pub fn strikethrough(colour: Colour) -> BoxEffect {
        let paint = Paint::Solid(colour);
        BoxEffect::new(EffectStage::Post, move |surface, area, baseline, b| {
            let y = (Fixed::from_int(area.y1) + baseline - b.ascent().div_int(3)).round();
            let line = PixelRect::new(area.x1, y, area.x2, y + 1).intersect(&area);
            fill_rect(surface, line, &paint, (0, 0));
        })
    }
}

impl fmt::Debug for BoxEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoxEffect").field("stage", &self.stage).finish()
    }
}

/// Runs effects around drawing its child. Geometry is the child's.
#[derive(Clone, Debug)]
pub struct EffectBox {
    pub child: Box<LayoutBox>,
    pub effects: Vec<BoxEffect>,
}

impl EffectBox {
    pub fn new(child: LayoutBox, effects: Vec<BoxEffect>) -> EffectBox {
        EffectBox {
            child: Box::new(child),
            effects,
        }
    }

    pub(crate) fn draw(
        &self,
        surface: &mut dyn Surface,
        area: PixelRect,
        baseline: Fixed,
        opts: &DrawOptions,
    ) {
        for e in self.effects.iter().filter(|e| e.stage == EffectStage::Pre) {
            (e.func)(&mut *surface, area, baseline, self.child.as_ref());
        }
        self.child.draw(surface, area, baseline, opts);
        for e in self.effects.iter().filter(|e| e.stage == EffectStage::Post) {
            (e.func)(&mut *surface, area, baseline, self.child.as_ref());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colour::colours;
    use crate::font::BlockFace;
    use crate::layout::TextBox;
    use image::{Rgba, RgbaImage};

    fn text(s: &str) -> LayoutBox {
        TextBox::new(&BlockFace::new(2, 6, 2).into_ref(), s, Paint::default()).into()
    }

    fn render(b: &LayoutBox, w: u32, h: u32) -> RgbaImage {
        let mut img = RgbaImage::new(w, h);
        b.draw(&mut img, PixelRect::sized(w as i32, h as i32), b.ascent(), &DrawOptions::default());
        img
    }

    #[test]
    fn test_zero_decoration_is_a_no_op() {
        let plain = text("ab");
        let decorated = LayoutBox::from(DecorationBox::new(plain.clone()));
        assert_eq!(decorated.advance(), plain.advance());
        assert_eq!(decorated.metrics(), plain.metrics());
        assert_eq!(decorated.min_size(), plain.min_size());
        assert_eq!(render(&decorated, 6, 8), render(&plain, 6, 8));
    }

    #[test]
    fn test_spacing_adds_to_geometry() {
        let b = LayoutBox::from(
            DecorationBox::new(text("ab"))
                .with_padding(Margins::px(1))
                .with_border(Margins::px(2), None)
                .with_margin(Margins::trbl(
                    Fixed::from_int(3),
                    Fixed::ZERO,
                    Fixed::ZERO,
                    Fixed::ZERO,
                )),
        );
        assert_eq!(b.advance(), Fixed::from_int(4 + 6));
        assert_eq!(b.ascent(), Fixed::from_int(6 + 6));
        assert_eq!(b.descent(), Fixed::from_int(2 + 3));
    }

    #[test]
    fn test_max_size_stays_unconstrained() {
        let b = LayoutBox::from(DecorationBox::new(text("ab")).with_padding(Margins::px(1)));
        assert!(b.max_size().is_zero());
        assert_eq!(b.min_size(), FixedPoint::px(6, 10));
    }

    #[test]
    fn test_background_fills_padding_not_margin() {
        let b = LayoutBox::from(
            DecorationBox::new(text(" "))
                .with_padding(Margins::px(1))
                .with_margin(Margins::px(1))
                .with_background(Some(Fill::new(
                    colours::RED,
                    BackgroundPositioning::ContentRelative,
                ))),
        );
        let img = render(&b, 6, 12);
        assert_eq!(img.get_pixel(0, 0), &Rgba([0, 0, 0, 0]));
        assert_eq!(img.get_pixel(1, 1), &Rgba([255, 0, 0, 255]));
        assert_eq!(img.get_pixel(4, 10), &Rgba([255, 0, 0, 255]));
        assert_eq!(img.get_pixel(5, 11), &Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn test_background_pattern_origins() {
        let stripes = [[255, 0, 0, 255], [0, 255, 0, 255], [0, 0, 255, 255], [255, 255, 255, 255]];
        let paint = Paint::pattern(RgbaImage::from_fn(4, 1, |x, _| Rgba(stripes[x as usize])));
        let sample = |positioning: BackgroundPositioning| {
            let b = LayoutBox::from(
                DecorationBox::new(text(" "))
                    .with_padding(Margins::px(1))
                    .with_margin(Margins::px(1))
                    .with_background(Some(Fill::new(paint.clone(), positioning))),
            );
            *render(&b, 6, 12).get_pixel(2, 2)
        };
        // content starts at (2, 2), the frame at (1, 1)
        assert_eq!(sample(BackgroundPositioning::ContentRelative), Rgba(stripes[0]));
        assert_eq!(sample(BackgroundPositioning::FrameRelative), Rgba(stripes[1]));
        assert_eq!(sample(BackgroundPositioning::PassThrough), Rgba(stripes[2]));
    }

    #[test]
    fn test_border_paints_band_only() {
        let b = LayoutBox::from(
            DecorationBox::new(text(" "))
                .with_border(
                    Margins::px(1),
                    Some(Fill::new(colours::BLUE, BackgroundPositioning::FrameRelative)),
                ),
        );
        let img = render(&b, 4, 10);
        assert_eq!(img.get_pixel(0, 0), &Rgba([0, 0, 255, 255]));
        assert_eq!(img.get_pixel(3, 9), &Rgba([0, 0, 255, 255]));
        assert_eq!(img.get_pixel(1, 1), &Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn test_visible_decoration_is_not_whitespace() {
        let invisible = LayoutBox::from(DecorationBox::new(text(" ")));
        assert!(invisible.is_whitespace());
        let padded = LayoutBox::from(DecorationBox::new(text(" ")).with_padding(Margins::px(1)));
        assert!(!padded.is_whitespace());
        let highlighted = LayoutBox::from(
            DecorationBox::new(text(" "))
                .with_background(Some(Fill::new(
                    colours::YELLOW,
                    BackgroundPositioning::default(),
                ))),
        );
        assert!(!highlighted.is_whitespace());
        let clear = LayoutBox::from(
            DecorationBox::new(text(" "))
                .with_background(Some(Fill::new(
                    colours::TRANSPARENT,
                    BackgroundPositioning::default(),
                ))),
        );
        assert!(clear.is_whitespace());
    }

    #[test]
    fn test_later_decorators_wrap_earlier() {
        let b = apply_decorators(
            text("a"),
            &[Decorator::Padding(Margins::px(1)), Decorator::Margin(Margins::px(2))],
        );
        let LayoutBox::Decorated(outer) = &b else {
            panic!("expected a decorated box, got {b:?}");
        };
        assert_eq!(outer.margin, Margins::px(2));
        let LayoutBox::Decorated(inner) = outer.child.as_ref() else {
            panic!("expected a decorated child");
        };
        assert_eq!(inner.padding, Margins::px(1));
    }

    #[test]
    fn test_underline_is_drawn_below_baseline() {
        let b = LayoutBox::from(EffectBox::new(
            text(" "),
            vec![BoxEffect::underline(colours::GREEN)],
        ));
        let img = render(&b, 2, 8);
        assert_eq!(img.get_pixel(0, 7), &Rgba([0, 255, 0, 255]));
        assert_eq!(img.get_pixel(0, 5), &Rgba([0, 0, 0, 0]));
    }
}
