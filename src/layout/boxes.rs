use super::decorator::{DecorationBox, EffectBox};
use crate::colour::Paint;
use crate::font::{FaceRef, GlyphMetrics};
use crate::options::DrawOptions;
use crate::rect::{PixelPoint, PixelRect};
use crate::surface::{draw_image, Surface};
use crate::units::{Fixed, FixedPoint, FixedRect, FontMetrics};
use image::RgbaImage;
use std::fmt;
use std::sync::Arc;

/// The atomic unit of layout. Every variant reports its geometry from its own
/// immutable fields, so line totals can always be rebuilt by summation.
#[derive(Clone, Debug)]
pub enum LayoutBox {
    /// An indivisible run of text measured with a single face
    Text(TextBox),
    /// A natural (newline) or effective (overflowing whitespace) line break
    LineBreak(LineBreakBox),
    /// The marker placed at the end of a page when more content follows
    PageBreak(PageBreakBox),
    /// An inline raster image
    Image(ImageBox),
    /// A container laid out as one unbreakable row
    Row(RowBox),
    /// Padding, border, margin and background around a child
    Decorated(DecorationBox),
    /// A child placed against the top, middle or bottom of the line
    Aligned(AlignedBox),
    /// A child grown to a minimum size
    MinSize(MinSizeBox),
    /// A child with drawing effects before or after it
    Effect(EffectBox),
    /// A child tagged with a caller supplied identifier
    Identified(IdentifiedBox),
    /// A child that ends, or takes up, the rest of its line
    FillLine(FillLineBox),
}

impl LayoutBox {
    /// How far the pen moves past this box
    pub fn advance(&self) -> Fixed {
        match self {
            LayoutBox::Text(b) => b.advance,
            LayoutBox::LineBreak(_) => Fixed::ZERO,
            LayoutBox::PageBreak(b) => b.visual.advance(),
            LayoutBox::Image(b) => Fixed::from_int(b.image.width() as i32),
            LayoutBox::Row(b) => b.advance,
            LayoutBox::Decorated(b) => b.advance(),
            LayoutBox::MinSize(b) => b.child.advance().max(b.min.x),
            LayoutBox::Aligned(AlignedBox { child, .. })
            | LayoutBox::Effect(EffectBox { child, .. })
            | LayoutBox::Identified(IdentifiedBox { child, .. })
            | LayoutBox::FillLine(FillLineBox { child, .. }) => child.advance(),
        }
    }

    /// Vertical extent of the box around its baseline
    pub fn metrics(&self) -> FontMetrics {
        match self {
            LayoutBox::Text(b) => b.metrics,
            LayoutBox::LineBreak(b) => match (&b.inner, &b.face) {
                (Some(inner), _) => inner.metrics(),
                (None, Some(face)) => face.metrics(),
                (None, None) => FontMetrics::default(),
            },
            LayoutBox::PageBreak(b) => b.visual.metrics(),
            LayoutBox::Image(b) => b.metrics(),
            LayoutBox::Row(b) => FontMetrics::new(b.height, b.ascent, b.descent),
            LayoutBox::Decorated(b) => b.metrics(),
            LayoutBox::MinSize(b) => {
                let mut m = b.child.metrics();
                let h = m.ascent + m.descent;
                if b.min.y > h {
                    m.ascent += b.min.y - h;
                }
                m.height = m.height.max(b.min.y);
                m
            }
            LayoutBox::Aligned(AlignedBox { child, .. })
            | LayoutBox::Effect(EffectBox { child, .. })
            | LayoutBox::Identified(IdentifiedBox { child, .. })
            | LayoutBox::FillLine(FillLineBox { child, .. }) => child.metrics(),
        }
    }

    pub fn ascent(&self) -> Fixed {
        self.metrics().ascent
    }

    pub fn descent(&self) -> Fixed {
        self.metrics().descent
    }

    /// Space taken on the line: ascent plus descent
    pub fn height(&self) -> Fixed {
        let m = self.metrics();
        m.ascent + m.descent
    }

    /// The box as it came out of the tokenizer: a soft break made by the
    /// folder gives back the whitespace it replaced
    pub fn unbroken(self) -> LayoutBox {
        match self {
            LayoutBox::LineBreak(LineBreakBox {
                inner: Some(inner),
                soft: true,
                ..
            }) => *inner,
            other => other,
        }
    }

    /// True for breakable, invisible space
    pub fn is_whitespace(&self) -> bool {
        match self {
            LayoutBox::Text(b) => b.contents.chars().next().map_or(true, char::is_whitespace),
            LayoutBox::LineBreak(_) => true,
            LayoutBox::PageBreak(_) | LayoutBox::Image(_) | LayoutBox::Row(_) => false,
            LayoutBox::Decorated(b) => b.child.is_whitespace() && b.is_invisible(),
            LayoutBox::Aligned(AlignedBox { child, .. })
            | LayoutBox::MinSize(MinSizeBox { child, .. })
            | LayoutBox::Effect(EffectBox { child, .. })
            | LayoutBox::Identified(IdentifiedBox { child, .. })
            | LayoutBox::FillLine(FillLineBox { child, .. }) => child.is_whitespace(),
        }
    }

    /// Number of input characters the box stands for
    pub fn len(&self) -> usize {
        match self {
            LayoutBox::Text(b) => b.contents.chars().count(),
            LayoutBox::LineBreak(b) => b.inner.as_ref().map_or(0, |b| b.len()),
            LayoutBox::PageBreak(b) => b.container.as_ref().map_or(0, |b| b.len()),
            LayoutBox::Image(_) => 0,
            LayoutBox::Row(b) => b.boxes.iter().map(LayoutBox::len).sum(),
            LayoutBox::Decorated(DecorationBox { child, .. })
            | LayoutBox::Aligned(AlignedBox { child, .. })
            | LayoutBox::MinSize(MinSizeBox { child, .. })
            | LayoutBox::Effect(EffectBox { child, .. })
            | LayoutBox::Identified(IdentifiedBox { child, .. })
            | LayoutBox::FillLine(FillLineBox { child, .. }) => child.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The input text the box was built from. A page break reports only the
    /// content it swallowed, never its marker.
    pub fn text_value(&self) -> String {
        let mut out = String::new();
        self.write_text(&mut out);
        out
    }

    fn write_text(&self, out: &mut String) {
        match self {
            LayoutBox::Text(b) => out.push_str(&b.contents),
            LayoutBox::LineBreak(b) => {
                if let Some(inner) = &b.inner {
                    inner.write_text(out);
                }
            }
            LayoutBox::PageBreak(b) => {
                if let Some(container) = &b.container {
                    container.write_text(out);
                }
            }
            LayoutBox::Image(_) => {}
            LayoutBox::Row(b) => {
                for child in &b.boxes {
                    child.write_text(out);
                }
            }
            LayoutBox::Decorated(DecorationBox { child, .. })
            | LayoutBox::Aligned(AlignedBox { child, .. })
            | LayoutBox::MinSize(MinSizeBox { child, .. })
            | LayoutBox::Effect(EffectBox { child, .. })
            | LayoutBox::Identified(IdentifiedBox { child, .. })
            | LayoutBox::FillLine(FillLineBox { child, .. }) => child.write_text(out),
        }
    }

    /// The smallest size the box can be drawn at
    pub fn min_size(&self) -> FixedPoint {
        match self {
            LayoutBox::Text(_)
            | LayoutBox::Image(_)
            | LayoutBox::Row(_)
            | LayoutBox::PageBreak(_) => FixedPoint::new(self.advance(), self.height()),
            LayoutBox::LineBreak(_) => FixedPoint::default(),
            LayoutBox::Decorated(b) => b.min_size(),
            LayoutBox::MinSize(b) => {
                let inner = b.child.min_size();
                FixedPoint::new(inner.x.max(b.min.x), inner.y.max(b.min.y))
            }
            LayoutBox::Aligned(AlignedBox { child, .. })
            | LayoutBox::Effect(EffectBox { child, .. })
            | LayoutBox::Identified(IdentifiedBox { child, .. })
            | LayoutBox::FillLine(FillLineBox { child, .. }) => child.min_size(),
        }
    }

    /// The largest size the box may be drawn at. Zero on both axes means
    /// unconstrained.
    pub fn max_size(&self) -> FixedPoint {
        match self {
            LayoutBox::Image(_) => FixedPoint::new(self.advance(), self.height()),
            LayoutBox::Text(_)
            | LayoutBox::LineBreak(_)
            | LayoutBox::Row(_)
            | LayoutBox::PageBreak(_) => FixedPoint::default(),
            LayoutBox::Decorated(b) => b.max_size(),
            LayoutBox::Aligned(AlignedBox { child, .. })
            | LayoutBox::MinSize(MinSizeBox { child, .. })
            | LayoutBox::Effect(EffectBox { child, .. })
            | LayoutBox::Identified(IdentifiedBox { child, .. })
            | LayoutBox::FillLine(FillLineBox { child, .. }) => child.max_size(),
        }
    }

    /// The face that measured the box, if any
    pub fn font(&self) -> Option<&FaceRef> {
        match self {
            LayoutBox::Text(b) => Some(&b.face),
            LayoutBox::LineBreak(b) => match &b.inner {
                Some(inner) => inner.font().or(b.face.as_ref()),
                None => b.face.as_ref(),
            },
            LayoutBox::PageBreak(b) => b.visual.font(),
            LayoutBox::Image(_) => None,
            LayoutBox::Row(b) => b.boxes.iter().find_map(LayoutBox::font),
            LayoutBox::Decorated(DecorationBox { child, .. })
            | LayoutBox::Aligned(AlignedBox { child, .. })
            | LayoutBox::MinSize(MinSizeBox { child, .. })
            | LayoutBox::Effect(EffectBox { child, .. })
            | LayoutBox::Identified(IdentifiedBox { child, .. })
            | LayoutBox::FillLine(FillLineBox { child, .. }) => child.font(),
        }
    }

    /// Where the box sits vertically on its line. Looks through the
    /// wrappers placed around an alignment tag.
    pub fn alignment(&self) -> BaselineAlignment {
        match self {
            LayoutBox::Aligned(b) => b.alignment,
            LayoutBox::Decorated(DecorationBox { child, .. })
            | LayoutBox::MinSize(MinSizeBox { child, .. })
            | LayoutBox::Effect(EffectBox { child, .. })
            | LayoutBox::Identified(IdentifiedBox { child, .. })
            | LayoutBox::FillLine(FillLineBox { child, .. }) => child.alignment(),
            _ => BaselineAlignment::Baseline,
        }
    }

    /// The outermost identifier the box was tagged with
    pub fn id(&self) -> Option<&BoxId> {
        match self {
            LayoutBox::Identified(b) => Some(&b.id),
            LayoutBox::Decorated(DecorationBox { child, .. })
            | LayoutBox::Aligned(AlignedBox { child, .. })
            | LayoutBox::MinSize(MinSizeBox { child, .. })
            | LayoutBox::Effect(EffectBox { child, .. })
            | LayoutBox::FillLine(FillLineBox { child, .. }) => child.id(),
            _ => None,
        }
    }

    /// Short name of the variant, used in error messages
    pub fn kind(&self) -> &'static str {
        match self {
            LayoutBox::Text(_) => "text",
            LayoutBox::LineBreak(_) => "line break",
            LayoutBox::PageBreak(_) => "page break",
            LayoutBox::Image(_) => "image",
            LayoutBox::Row(_) => "row",
            LayoutBox::Decorated(_) => "decorated",
            LayoutBox::Aligned(_) => "aligned",
            LayoutBox::MinSize(_) => "min size",
            LayoutBox::Effect(_) => "effect",
            LayoutBox::Identified(_) => "identified",
            LayoutBox::FillLine(_) => "fill line",
        }
    }

    /// Draw the box into `area`, a horizontal slice of its line. `baseline`
    /// is measured down from the top of `area`.
    pub fn draw(
        &self,
        surface: &mut dyn Surface,
        area: PixelRect,
        baseline: Fixed,
        opts: &DrawOptions,
    ) {
        match self {
            LayoutBox::Text(b) => b.draw(surface, area, baseline, opts),
            LayoutBox::LineBreak(_) => {}
            LayoutBox::PageBreak(b) => b.visual.draw(surface, area, baseline, opts),
            LayoutBox::Image(b) => b.draw(surface, area, baseline),
            LayoutBox::Row(b) => b.draw(surface, area, baseline, opts),
            LayoutBox::Decorated(b) => b.draw(surface, area, baseline, opts),
            LayoutBox::Effect(b) => b.draw(surface, area, baseline, opts),
            LayoutBox::Aligned(AlignedBox { child, .. })
            | LayoutBox::MinSize(MinSizeBox { child, .. })
            | LayoutBox::Identified(IdentifiedBox { child, .. })
            | LayoutBox::FillLine(FillLineBox { child, .. }) => {
                child.draw(surface, area, baseline, opts)
            }
        }
    }
}

/// The pixels a box with metrics `m` covers when its slice is `area` and its
/// baseline sits `baseline` below the top of the slice
pub(crate) fn box_frame(area: PixelRect, baseline: Fixed, m: &FontMetrics) -> PixelRect {
    let base = Fixed::from_int(area.y1) + baseline;
    PixelRect::new(area.x1, (base - m.ascent).floor(), area.x2, (base + m.descent).ceil())
}

/// An indivisible run of text, measured once when it is created
#[derive(Clone)]
pub struct TextBox {
    contents: String,
    bounds: FixedRect,
    advance: Fixed,
    metrics: FontMetrics,
    face: FaceRef,
    paint: Paint,
}

impl TextBox {
    pub fn new<S: Into<String>>(face: &FaceRef, contents: S, paint: Paint) -> TextBox {
        let contents = contents.into();
        let (bounds, advance) = face.measure(&contents);
        TextBox {
            contents,
            bounds,
            advance,
            metrics: face.metrics(),
            face: Arc::clone(face),
            paint,
        }
    }

    pub fn contents(&self) -> &str {
        &self.contents
    }

    /// Ink bounds of the text relative to the pen on the baseline
    pub fn bounds(&self) -> FixedRect {
        self.bounds
    }

    pub fn paint(&self) -> &Paint {
        &self.paint
    }

    fn draw(
        &self,
        surface: &mut dyn Surface,
        area: PixelRect,
        baseline: Fixed,
        opts: &DrawOptions,
    ) {
        let dot = FixedPoint::new(Fixed::from_int(area.x1), Fixed::from_int(area.y1) + baseline);
        let paint = opts.map_source(&self.paint);
        self.face.draw(surface, area, dot, &self.contents, &paint);
    }
}

impl fmt::Debug for TextBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextBox")
            .field("contents", &self.contents)
            .field("advance", &self.advance)
            .field("metrics", &self.metrics)
            .finish()
    }
}

/// A line break. Keeps the box that caused it (a newline, or whitespace that
/// did not fit) so its text survives, but never draws anything.
#[derive(Clone)]
pub struct LineBreakBox {
    pub inner: Option<Box<LayoutBox>>,
    face: Option<FaceRef>,
    soft: bool,
}

impl LineBreakBox {
    /// A break standing in for `inner`, falling back to `face` for metrics
    pub fn wrapping(inner: LayoutBox, face: Option<FaceRef>) -> LineBreakBox {
        LineBreakBox {
            inner: Some(Box::new(inner)),
            face,
            soft: false,
        }
    }

    /// A break made only because `inner` did not fit on its line. Undone by
    /// [`LayoutBox::unbroken`] when the box is laid out again.
    pub fn soft(inner: LayoutBox, face: Option<FaceRef>) -> LineBreakBox {
        LineBreakBox {
            soft: true,
            ..LineBreakBox::wrapping(inner, face)
        }
    }

    /// A break with no text of its own
    pub fn empty(face: Option<FaceRef>) -> LineBreakBox {
        LineBreakBox {
            inner: None,
            face,
            soft: false,
        }
    }

    pub fn is_soft(&self) -> bool {
        self.soft
    }
}

impl fmt::Debug for LineBreakBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LineBreakBox")
            .field("inner", &self.inner)
            .field("soft", &self.soft)
            .finish()
    }
}

/// The marker drawn where a page ends early. `visual` is what gets drawn,
/// `container` holds any content swallowed by the break so that its text can
/// still be recovered.
#[derive(Clone, Debug)]
pub struct PageBreakBox {
    pub visual: Box<LayoutBox>,
    pub container: Option<Box<LayoutBox>>,
}

impl PageBreakBox {
    pub fn new(visual: LayoutBox, container: Option<LayoutBox>) -> PageBreakBox {
        PageBreakBox {
            visual: Box::new(visual),
            container: container.map(Box::new),
        }
    }
}

/// How an inline image sits relative to the baseline
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ImageMetricMode {
    /// The bottom of the image rests on the baseline
    #[default]
    AboveTheLine,
    /// The top of the image hangs from the baseline
    BelowTheLine,
    /// The image is centred on the baseline
    Center,
}

#[derive(Clone)]
pub struct ImageBox {
    pub image: Arc<RgbaImage>,
    pub mode: ImageMetricMode,
}

impl ImageBox {
    pub fn new(image: Arc<RgbaImage>) -> ImageBox {
        ImageBox {
            image,
            mode: ImageMetricMode::default(),
        }
    }

    pub fn with_mode(mut self, mode: ImageMetricMode) -> ImageBox {
        self.mode = mode;
        self
    }

    fn metrics(&self) -> FontMetrics {
        let h = self.image.height() as i32;
        let (ascent, descent) = match self.mode {
            ImageMetricMode::AboveTheLine => (h, 0),
            ImageMetricMode::BelowTheLine => (0, h),
            ImageMetricMode::Center => (h / 2, h - h / 2),
        };
        FontMetrics::new(Fixed::from_int(h), Fixed::from_int(ascent), Fixed::from_int(descent))
    }

    fn draw(&self, surface: &mut dyn Surface, area: PixelRect, baseline: Fixed) {
        let frame = box_frame(area, baseline, &self.metrics());
        draw_image(surface, PixelPoint::new(area.x1, frame.y1), area, &self.image);
    }
}

impl fmt::Debug for ImageBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ImageBox({}x{}, {:?})", self.image.width(), self.image.height(), self.mode)
    }
}

/// The boxes of a container, laid out side by side on a shared baseline
#[derive(Clone, Debug)]
pub struct RowBox {
    boxes: Vec<LayoutBox>,
    advance: Fixed,
    ascent: Fixed,
    descent: Fixed,
    height: Fixed,
}

impl RowBox {
    pub fn new(boxes: Vec<LayoutBox>) -> RowBox {
        let mut row = RowBox {
            advance: Fixed::ZERO,
            ascent: Fixed::ZERO,
            descent: Fixed::ZERO,
            height: Fixed::ZERO,
            boxes,
        };
        for b in &row.boxes {
            let m = b.metrics();
            row.advance += b.advance();
            row.ascent = row.ascent.max(m.ascent);
            row.descent = row.descent.max(m.descent);
            row.height = row.height.max(m.height);
        }
        row.height = row.height.max(row.ascent + row.descent);
        row
    }

    pub fn boxes(&self) -> &[LayoutBox] {
        &self.boxes
    }

    fn draw(
        &self,
        surface: &mut dyn Surface,
        area: PixelRect,
        baseline: Fixed,
        opts: &DrawOptions,
    ) {
        let mut x = Fixed::from_int(area.x1);
        for b in &self.boxes {
            let x1 = x.round();
            x += b.advance();
            let slot = PixelRect::new(x1, area.y1, x.round(), area.y2);
            b.draw(surface, slot, baseline, opts);
        }
    }
}

/// Vertical placement of a box within its line
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub enum BaselineAlignment {
    /// Share the line's baseline
    #[default]
    Baseline,
    Top,
    Middle,
    Bottom,
}

#[derive(Clone, Debug)]
pub struct AlignedBox {
    pub child: Box<LayoutBox>,
    pub alignment: BaselineAlignment,
}

impl AlignedBox {
    pub fn new(child: LayoutBox, alignment: BaselineAlignment) -> AlignedBox {
        AlignedBox {
            child: Box::new(child),
            alignment,
        }
    }
}

/// Grows its child to at least `min`. Extra height is added above the
/// child, extra width after it.
#[derive(Clone, Debug)]
pub struct MinSizeBox {
    pub child: Box<LayoutBox>,
    pub min: FixedPoint,
}

impl MinSizeBox {
    pub fn new(child: LayoutBox, min: FixedPoint) -> MinSizeBox {
        MinSizeBox {
            child: Box::new(child),
            min,
        }
    }
}

/// An opaque tag used to find boxes again after layout
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BoxId(Arc<str>);

impl BoxId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for BoxId {
    fn from(s: &str) -> Self {
        BoxId(Arc::from(s))
    }
}

impl From<String> for BoxId {
    fn from(s: String) -> Self {
        BoxId(Arc::from(s))
    }
}

impl fmt::Display for BoxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug)]
pub struct IdentifiedBox {
    pub child: Box<LayoutBox>,
    pub id: BoxId,
}

impl IdentifiedBox {
    pub fn new(child: LayoutBox, id: BoxId) -> IdentifiedBox {
        IdentifiedBox {
            child: Box::new(child),
            id,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum FillLineMode {
    /// Take whatever is left of the current line, then break
    RestOfLine,
    /// Start a new line if needed and take all of it
    EntireLine,
}

/// A box that always ends its line. When it is last on a line it is drawn
/// across the remaining width.
#[derive(Clone, Debug)]
pub struct FillLineBox {
    pub child: Box<LayoutBox>,
    pub mode: FillLineMode,
}

impl FillLineBox {
    pub fn new(child: LayoutBox, mode: FillLineMode) -> FillLineBox {
        FillLineBox {
            child: Box::new(child),
            mode,
        }
    }
}

macro_rules! impl_from_box {
    ($($variant:ident($ty:ty)),* $(,)?) => {
        $(
            impl From<$ty> for LayoutBox {
                fn from(b: $ty) -> Self {
                    LayoutBox::$variant(b)
                }
            }
        )*
    };
}

impl_from_box!(
    Text(TextBox),
    LineBreak(LineBreakBox),
    PageBreak(PageBreakBox),
    Image(ImageBox),
    Row(RowBox),
    Decorated(DecorationBox),
    Aligned(AlignedBox),
    MinSize(MinSizeBox),
    Effect(EffectBox),
    Identified(IdentifiedBox),
    FillLine(FillLineBox),
);
