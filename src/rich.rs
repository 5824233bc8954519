//! Building styled content from a flat list of arguments.
//!
//! Styles are scoped the way nested markup is: an argument changes the style
//! for every argument after it in the same list, and [`group`] opens a nested
//! list whose changes do not leak out.
//!
//! ```
//! use wordwrap::rich::{bg_color, parse_rich, text_color, underline};
//! use wordwrap::{colours, rich, BlockFace};
//!
//! let face = BlockFace::new(8, 10, 2).into_ref();
//! let text = parse_rich(&rich![
//!     face,
//!     "plain ",
//!     text_color(colours::RED, rich!["red ", bg_color(colours::YELLOW, rich!["highlighted"])]),
//!     " plain again",
//!     underline(colours::BLUE),
//!     " underlined",
//! ]);
//! assert_eq!(text.text_value(), "plain red highlighted plain again underlined");
//! ```

use crate::colour::{Colour, Paint};
use crate::content::{Content, Style};
use crate::font::FaceRef;
use crate::image::Image;
use crate::layout::{
    BackgroundPositioning, BaselineAlignment, BoxEffect, BoxId, Decorator, Fill, LayoutSession,
    Margins, Tokenizer, Wrapper,
};
use crate::units::{Fixed, FixedPoint};
use std::fmt;
use std::sync::Arc;

/// One argument of a rich-text list
#[derive(Clone)]
pub enum Arg {
    Font(FaceRef),
    /// Text colour or pattern
    Paint(Paint),
    /// Background for what follows. Unset positioning and fixed flags are
    /// taken from the scope.
    Background {
        paint: Paint,
        positioning: Option<BackgroundPositioning>,
        fixed: Option<bool>,
    },
    Positioning(BackgroundPositioning),
    FixedBackground(bool),
    Padding(Margins),
    Margin(Margins),
    /// An unpainted border
    Border(Margins),
    Alignment(BaselineAlignment),
    MinSize(FixedPoint),
    /// Back to the default style: the first font seen, nothing else
    Reset,
    Id(BoxId),
    Effect(BoxEffect),
    Text(String),
    /// An inline image and its scale
    Image(Image, f32),
    /// Content built elsewhere, added as is
    Content(Content),
    Tokenizer(Arc<dyn Tokenizer>),
    /// A nested list; style changes inside stay inside
    Group(Vec<Arg>),
    /// A nested list laid out as one unbreakable row. The row takes the
    /// decorators, effects, alignment and identifier of the enclosing scope.
    Container(Vec<Arg>),
    /// A nested list framed by a border, painted with the first background
    /// inside it
    BorderGroup { width: Margins, args: Vec<Arg> },
}

impl Arg {
    /// This argument followed by `args`, in a scope of their own
    pub fn with(self, args: Vec<Arg>) -> Arg {
        let mut all = Vec::with_capacity(args.len() + 1);
        all.push(self);
        all.extend(args);
        Arg::Group(all)
    }

    fn kind(&self) -> &'static str {
        match self {
            Arg::Font(_) => "font",
            Arg::Paint(_) => "paint",
            Arg::Background { .. } => "background",
            Arg::Positioning(_) => "positioning",
            Arg::FixedBackground(_) => "fixed background",
            Arg::Padding(_) => "padding",
            Arg::Margin(_) => "margin",
            Arg::Border(_) => "border",
            Arg::Alignment(_) => "alignment",
            Arg::MinSize(_) => "min size",
            Arg::Reset => "reset",
            Arg::Id(_) => "id",
            Arg::Effect(_) => "effect",
            Arg::Text(_) => "text",
            Arg::Image(..) => "image",
            Arg::Content(_) => "content",
            Arg::Tokenizer(_) => "tokenizer",
            Arg::Group(_) => "group",
            Arg::Container(_) => "container",
            Arg::BorderGroup { .. } => "border group",
        }
    }
}

impl fmt::Debug for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arg::Text(s) => write!(f, "Text({s:?})"),
            Arg::Group(args) | Arg::Container(args) | Arg::BorderGroup { args, .. } => {
                f.debug_tuple(self.kind()).field(args).finish()
            }
            other => f.write_str(other.kind()),
        }
    }
}

impl From<&str> for Arg {
    fn from(s: &str) -> Self {
        Arg::Text(s.to_string())
    }
}

impl From<String> for Arg {
    fn from(s: String) -> Self {
        Arg::Text(s)
    }
}

impl From<Content> for Arg {
    fn from(c: Content) -> Self {
        Arg::Content(c)
    }
}

impl From<FaceRef> for Arg {
    fn from(face: FaceRef) -> Self {
        Arg::Font(face)
    }
}

impl From<Colour> for Arg {
    fn from(c: Colour) -> Self {
        Arg::Paint(Paint::Solid(c))
    }
}

impl From<Paint> for Arg {
    fn from(p: Paint) -> Self {
        Arg::Paint(p)
    }
}

impl From<BoxEffect> for Arg {
    fn from(e: BoxEffect) -> Self {
        Arg::Effect(e)
    }
}

impl From<Image> for Arg {
    fn from(image: Image) -> Self {
        Arg::Image(image, 1.0)
    }
}

impl From<BaselineAlignment> for Arg {
    fn from(a: BaselineAlignment) -> Self {
        Arg::Alignment(a)
    }
}

impl From<BackgroundPositioning> for Arg {
    fn from(p: BackgroundPositioning) -> Self {
        Arg::Positioning(p)
    }
}

impl From<Vec<Arg>> for Arg {
    fn from(args: Vec<Arg>) -> Self {
        Arg::Group(args)
    }
}

/// Build an argument list, converting each item with [`Arg::from`]
#[macro_export]
macro_rules! rich {
    ($($arg:expr),* $(,)?) => {
        vec![$($crate::rich::Arg::from($arg)),*]
    };
}

/// `option` alone if there are no `args`, otherwise `option` scoped to them
fn scoped(option: Arg, args: Vec<Arg>) -> Arg {
    if args.is_empty() {
        option
    } else {
        option.with(args)
    }
}

pub fn text_color<C: Into<Colour>>(c: C, args: Vec<Arg>) -> Arg {
    scoped(Arg::Paint(Paint::Solid(c.into())), args)
}

/// Text filled with a tiled image
pub fn text_image(image: Image, args: Vec<Arg>) -> Arg {
    scoped(Arg::Paint(Paint::Pattern(image.image)), args)
}

pub fn bg_color<C: Into<Colour>>(c: C, args: Vec<Arg>) -> Arg {
    scoped(
        Arg::Background {
            paint: Paint::Solid(c.into()),
            positioning: None,
            fixed: None,
        },
        args,
    )
}

pub fn highlight<C: Into<Colour>>(c: C, args: Vec<Arg>) -> Arg {
    bg_color(c, args)
}

/// A tiled background image. Positioning and fixed flags among `args`
/// configure the background itself; anything else is scoped to it.
pub fn bg_image(image: Image, args: Vec<Arg>) -> Arg {
    let mut positioning = None;
    let mut fixed = None;
    let mut rest = Vec::new();
    for arg in args {
        match arg {
            Arg::Positioning(p) => positioning = Some(p),
            Arg::FixedBackground(b) => fixed = Some(b),
            other => rest.push(other),
        }
    }
    scoped(
        Arg::Background {
            paint: Paint::Pattern(image.image),
            positioning,
            fixed,
        },
        rest,
    )
}

pub fn bg_position(p: BackgroundPositioning) -> Arg {
    Arg::Positioning(p)
}

/// Pin backgrounds to the surface so neighbouring boxes share one pattern
pub fn fixed_background(args: Vec<Arg>) -> Arg {
    if args.is_empty() {
        return Arg::FixedBackground(true);
    }
    let (mut all, rest): (Vec<Arg>, Vec<Arg>) = args
        .into_iter()
        .partition(|a| matches!(a, Arg::Positioning(_) | Arg::FixedBackground(_)));
    all.push(Arg::FixedBackground(true));
    all.extend(rest);
    Arg::Group(all)
}

pub fn margin(m: Margins, args: Vec<Arg>) -> Arg {
    scoped(Arg::Margin(m), args)
}

pub fn padding(p: Margins, args: Vec<Arg>) -> Arg {
    scoped(Arg::Padding(p), args)
}

/// Frame `args` with a border of `width`. The first background anywhere in
/// `args` paints the border; backgrounds inside the border never paint the
/// content.
pub fn border(width: Margins, args: Vec<Arg>) -> Arg {
    Arg::BorderGroup { width, args }
}

pub fn id<I: Into<BoxId>>(id: I, args: Vec<Arg>) -> Arg {
    scoped(Arg::Id(id.into()), args)
}

pub fn align(a: BaselineAlignment, args: Vec<Arg>) -> Arg {
    Arg::Alignment(a).with(args)
}

pub fn min_width(px: i32) -> Arg {
    Arg::MinSize(FixedPoint::new(Fixed::from_int(px), Fixed::ZERO))
}

pub fn reset() -> Arg {
    Arg::Reset
}

pub fn underline<C: Into<Colour>>(c: C) -> Arg {
    Arg::Effect(BoxEffect::underline(c.into()))
}

pub fn strikethrough<C: Into<Colour>>(c: C) -> Arg {
    Arg::Effect(BoxEffect::strikethrough(c.into()))
}

pub fn group(args: Vec<Arg>) -> Arg {
    Arg::Group(args)
}

pub fn container(args: Vec<Arg>) -> Arg {
    Arg::Container(args)
}

/// The content built from an argument list
#[derive(Clone, Default)]
pub struct RichText {
    pub contents: Vec<Content>,
    /// The first font in the list, used for text with no font of its own
    pub default_font: Option<FaceRef>,
}

impl RichText {
    pub fn text_value(&self) -> String {
        self.contents.iter().map(Content::text_value).collect()
    }

    /// Start laying the content out with `wrapper`
    pub fn session(&self, wrapper: &Wrapper) -> LayoutSession {
        wrapper.session(self.contents.clone(), self.default_font.clone())
    }
}

impl fmt::Debug for RichText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RichText")
            .field("contents", &self.contents)
            .field("default_font", &self.default_font.as_ref().map(|f| f.metrics()))
            .finish()
    }
}

#[derive(Clone, Default)]
struct Scope {
    style: Style,
    id: Option<BoxId>,
    in_border: bool,
}

impl Scope {
    fn content(&self, mut c: Content) -> Content {
        c.style = self.style.clone();
        c.id = self.id.clone();
        c
    }

    fn background(
        &self,
        paint: &Paint,
        positioning: Option<BackgroundPositioning>,
        fixed: Option<bool>,
    ) -> Fill {
        let fixed = fixed.unwrap_or(self.style.fixed_background);
        let mut positioning = positioning.unwrap_or(self.style.positioning);
        if fixed && positioning == BackgroundPositioning::ContentRelative {
            positioning = BackgroundPositioning::PassThrough;
        }
        Fill::new(paint.clone(), positioning)
    }
}

#[derive(Default)]
struct Parser {
    contents: Vec<Content>,
    default_font: Option<FaceRef>,
    /// First background seen inside the enclosing border group
    border_fill: Option<Fill>,
}

impl Parser {
    fn nested(&self) -> Parser {
        Parser {
            default_font: self.default_font.clone(),
            ..Parser::default()
        }
    }

    fn process(&mut self, args: &[Arg], mut scope: Scope) {
        for arg in args {
            match arg {
                Arg::Font(face) => {
                    scope.style.font = Some(Arc::clone(face));
                    if self.default_font.is_none() {
                        self.default_font = Some(Arc::clone(face));
                    }
                }
                Arg::Paint(p) => scope.style.paint = Some(p.clone()),
                Arg::Background {
                    paint,
                    positioning,
                    fixed,
                } => {
                    if scope.in_border {
                        if self.border_fill.is_none() {
                            self.border_fill = Some(scope.background(paint, *positioning, *fixed));
                        }
                        continue;
                    }
                    let d = Decorator::Background(scope.background(paint, *positioning, *fixed));
                    match scope
                        .style
                        .decorators
                        .iter_mut()
                        .find(|d| matches!(d, Decorator::Background(_)))
                    {
                        Some(existing) => *existing = d,
                        None => scope.style.decorators.push(d),
                    }
                }
                Arg::Positioning(p) => {
                    scope.style.positioning = *p;
                    scope.style.fixed_background = *p == BackgroundPositioning::PassThrough;
                }
                Arg::FixedBackground(fixed) => scope.style.fixed_background = *fixed,
                Arg::Padding(p) => scope.style.decorators.push(Decorator::Padding(*p)),
                Arg::Margin(m) => scope.style.decorators.push(Decorator::Margin(*m)),
                Arg::Border(width) => scope.style.decorators.push(Decorator::Border {
                    width: *width,
                    fill: None,
                }),
                Arg::Alignment(a) => scope.style.alignment = *a,
                Arg::MinSize(min) => scope.style.decorators.push(Decorator::MinSize(*min)),
                Arg::Reset => {
                    scope = Scope {
                        style: Style {
                            font: self.default_font.clone(),
                            ..Style::default()
                        },
                        ..Scope::default()
                    };
                }
                Arg::Id(id) => scope.id = Some(id.clone()),
                Arg::Effect(e) => scope.style.effects.push(e.clone()),
                Arg::Text(s) => self.contents.push(scope.content(Content::text(s.as_str()))),
                Arg::Image(image, scale) => {
                    self.contents.push(scope.content(Content::image(image.clone(), *scale)))
                }
                Arg::Content(c) => self.contents.push(c.clone()),
                Arg::Tokenizer(t) => scope.style.tokenizer = Some(Arc::clone(t)),
                Arg::Group(args) => self.process(args, scope.clone()),
                Arg::Container(args) => {
                    let mut inner = Scope {
                        id: None,
                        ..scope.clone()
                    };
                    inner.style.decorators.clear();
                    let mut children = self.nested();
                    children.process(args, inner);
                    if self.default_font.is_none() {
                        self.default_font = children.default_font;
                    }
                    if self.border_fill.is_none() {
                        self.border_fill = children.border_fill;
                    }

                    let mut node = Content::container(children.contents);
                    node.style.font = scope.style.font.clone();
                    node.style.paint = scope.style.paint.clone();
                    node.style.decorators = scope.style.decorators.clone();
                    node.style.effects = scope.style.effects.clone();
                    node.style.alignment = scope.style.alignment;
                    node.style.tokenizer = scope.style.tokenizer.clone();
                    node.id = scope.id.clone();
                    self.contents.push(node);
                }
                Arg::BorderGroup { width, args } => {
                    let mut framed = self.nested();
                    framed.process(
                        args,
                        Scope {
                            in_border: true,
                            ..scope.clone()
                        },
                    );
                    if self.default_font.is_none() {
                        self.default_font = framed.default_font;
                    }
                    // outermost, around whatever the group itself added
                    let border = Decorator::Border {
                        width: *width,
                        fill: framed.border_fill,
                    };
                    for mut c in framed.contents {
                        c.style.decorators.push(border.clone());
                        self.contents.push(c);
                    }
                }
            }
        }
    }
}

/// Turn an argument list into content
pub fn parse_rich(args: &[Arg]) -> RichText {
    let mut parser = Parser::default();
    parser.process(args, Scope::default());
    RichText {
        contents: parser.contents,
        default_font: parser.default_font,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colour::colours;
    use crate::font::BlockFace;
    use crate::content::ContentKind;
    use crate::layout::{Boxer, SentinelTokenizer};

    fn face() -> FaceRef {
        BlockFace::new(1, 1, 0).into_ref()
    }

    fn backgrounds(c: &Content) -> Vec<&Fill> {
        c.style
            .decorators
            .iter()
            .filter_map(|d| match d {
                Decorator::Background(f) => Some(f),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_groups_do_not_leak() {
        let text = parse_rich(&rich![
            face(),
            "a",
            text_color(colours::RED, rich!["b", padding(Margins::px(1), rich!["c"])]),
            "d",
        ]);
        let [a, b, c, d] = &text.contents[..] else {
            panic!("expected four leaves, got {:?}", text.contents);
        };
        assert!(a.style.paint.is_none());
        assert_eq!(b.style.paint, Some(Paint::Solid(colours::RED)));
        assert_eq!(c.style.paint, Some(Paint::Solid(colours::RED)));
        assert_eq!(c.style.decorators, vec![Decorator::Padding(Margins::px(1))]);
        assert!(d.style.paint.is_none());
        assert!(d.style.decorators.is_empty());
        assert!(text.default_font.is_some());
    }

    #[test]
    fn test_second_background_replaces_first() {
        let text = parse_rich(&rich![
            padding(Margins::px(1), vec![]),
            bg_color(colours::RED, vec![]),
            margin(Margins::px(2), vec![]),
            bg_color(colours::BLUE, vec![]),
            "x",
        ]);
        let leaf = &text.contents[0];
        assert_eq!(leaf.style.decorators.len(), 3);
        assert!(matches!(
            &leaf.style.decorators[1],
            Decorator::Background(f) if f.paint == Paint::Solid(colours::BLUE)
        ));
    }

    #[test]
    fn test_fixed_background_passes_through() {
        let text = parse_rich(&rich![
            fixed_background(rich![bg_color(colours::RED, rich!["a"])]),
            bg_color(colours::RED, rich!["b"]),
            bg_position(BackgroundPositioning::FrameRelative),
            bg_color(colours::RED, rich!["c"]),
        ]);
        let positions: Vec<BackgroundPositioning> =
            text.contents.iter().map(|c| backgrounds(c)[0].positioning).collect();
        assert_eq!(
            positions,
            vec![
                BackgroundPositioning::PassThrough,
                BackgroundPositioning::ContentRelative,
                BackgroundPositioning::FrameRelative,
            ]
        );
    }

    #[test]
    fn test_reset_keeps_default_font() {
        let first = face();
        let text = parse_rich(&rich![
            Arc::clone(&first),
            BlockFace::new(2, 2, 0).into_ref(),
            colours::RED,
            underline(colours::BLUE),
            id("x", vec![]),
            reset(),
            "plain",
        ]);
        let leaf = &text.contents[0];
        let font = leaf.style.font.as_ref().expect("default font");
        assert!(crate::font::same_face(font, &first));
        assert!(leaf.style.paint.is_none());
        assert!(leaf.style.effects.is_empty());
        assert!(leaf.id.is_none());
    }

    #[test]
    fn test_container_takes_parent_decorators() {
        let text = parse_rich(&rich![
            face(),
            id("row", vec![]),
            margin(Margins::px(1), rich![underline(colours::RED), container(rich!["a", "b"])]),
        ]);
        let node = &text.contents[0];
        let ContentKind::Container(children) = &node.kind else {
            panic!("expected a container, got {node:?}");
        };
        assert_eq!(node.style.decorators, vec![Decorator::Margin(Margins::px(1))]);
        assert_eq!(node.style.effects.len(), 1);
        assert_eq!(node.id.as_ref().map(BoxId::as_str), Some("row"));
        assert_eq!(children.len(), 2);
        for child in children {
            assert!(child.style.decorators.is_empty());
            assert!(child.id.is_none());
            assert_eq!(child.style.effects.len(), 1);
        }
    }

    #[test]
    fn test_border_takes_background() {
        let text = parse_rich(&rich![border(
            Margins::px(2),
            rich![bg_color(colours::GREEN, vec![]), "framed"]
        )]);
        let leaf = &text.contents[0];
        assert_eq!(leaf.style.decorators.len(), 1);
        let Decorator::Border { width, fill } = &leaf.style.decorators[0] else {
            panic!("expected a border, got {:?}", leaf.style.decorators);
        };
        assert_eq!(*width, Margins::px(2));
        assert_eq!(fill.as_ref().map(|f| f.paint.clone()), Some(Paint::Solid(colours::GREEN)));
    }

    #[test]
    fn test_border_takes_nested_background() {
        let text = parse_rich(&rich![border(
            Margins::px(1),
            rich![bg_color(colours::GREEN, rich!["x"])]
        )]);
        let leaf = &text.contents[0];
        assert_eq!(
            leaf.style.decorators,
            vec![Decorator::Border {
                width: Margins::px(1),
                fill: Some(Fill::new(colours::GREEN, BackgroundPositioning::ContentRelative)),
            }]
        );
    }

    #[test]
    fn test_border_is_outermost() {
        let text = parse_rich(&rich![border(
            Margins::px(1),
            rich![padding(Margins::px(2), vec![]), "x"]
        )]);
        assert_eq!(
            text.contents[0].style.decorators,
            vec![
                Decorator::Padding(Margins::px(2)),
                Decorator::Border {
                    width: Margins::px(1),
                    fill: None,
                },
            ]
        );
    }

    #[test]
    fn test_border_group_draws_around_text() {
        let text = parse_rich(&rich![
            face(),
            border(Margins::px(1), rich![bg_color(colours::GREEN, rich!["x"])])
        ]);
        let wrapper = Wrapper::new();
        let mut session = text.session(&wrapper);
        let rect = crate::rect::PixelRect::sized(10, 3);
        let (lines, _) = wrapper.text_to_rect(&mut session, rect).expect("layout");
        let mut img = ::image::RgbaImage::new(10, 3);
        wrapper.render_lines(&mut img, &lines, rect, &crate::options::DrawOptions::default());

        let green = ::image::Rgba([0, 255, 0, 255]);
        assert_eq!(img.get_pixel(0, 0), &green);
        assert_eq!(img.get_pixel(2, 1), &green);
        assert_eq!(img.get_pixel(1, 2), &green);
        assert_eq!(img.get_pixel(1, 1), &::image::Rgba([0, 0, 0, 255]));
        assert_eq!(img.get_pixel(3, 1), &::image::Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn test_tokenizer_is_scoped() {
        let text = parse_rich(&rich![
            face(),
            group(rich![Arg::Tokenizer(Arc::new(SentinelTokenizer('-'))), "a-b"]),
            " c-d",
        ]);
        let wrapper = Wrapper::new();
        let mut session = text.session(&wrapper);
        let mut words = Vec::new();
        while let Some((b, _)) = session.boxer().next().expect("boxes") {
            words.push(b.text_value());
        }
        assert_eq!(words, vec!["a", "-", "b", " ", "c-d"]);
    }

    #[test]
    fn test_images_and_min_width() {
        let image = Image::from(::image::RgbaImage::new(2, 2));
        let text = parse_rich(&rich![align(
            BaselineAlignment::Middle,
            rich![min_width(10), Arg::Image(image, 2.0)]
        )]);
        let leaf = &text.contents[0];
        assert!(matches!(leaf.kind, ContentKind::Image { scale, .. } if scale == 2.0));
        assert_eq!(leaf.style.alignment, BaselineAlignment::Middle);
        assert_eq!(leaf.style.decorators, vec![Decorator::MinSize(FixedPoint::px(10, 0))]);
    }
}
