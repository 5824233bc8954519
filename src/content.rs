//! The styled content tree consumed by the tokenizer.

use crate::colour::Paint;
use crate::font::FaceRef;
use crate::image::Image;
use crate::layout::{
    apply_decorators, AlignedBox, BackgroundPositioning, BaselineAlignment, BoxEffect, BoxId,
    DecorationBox, Decorator, EffectBox, Fill, IdentifiedBox, ImageMetricMode, LayoutBox, Margins,
    MinSizeBox, Tokenizer,
};
use crate::units::FixedPoint;
use std::fmt;
use std::sync::Arc;

/// How a piece of content looks. Values left at their defaults fall back to
/// whatever the tokenizer was configured with.
#[derive(Clone, Default)]
pub struct Style {
    pub font: Option<FaceRef>,
    /// Text colour or pattern
    pub paint: Option<Paint>,
    /// Fill behind the padding area
    pub background: Option<Paint>,
    pub positioning: BackgroundPositioning,
    /// Pin the background to the surface instead of the box
    pub fixed_background: bool,
    pub padding: Margins,
    pub margin: Margins,
    pub alignment: BaselineAlignment,
    /// Extra wrappers, applied in order outside everything else
    pub decorators: Vec<Decorator>,
    pub min_size: Option<FixedPoint>,
    pub effects: Vec<BoxEffect>,
    pub image_mode: ImageMetricMode,
    /// Overrides the tokenizer's segmentation for text in this node
    pub tokenizer: Option<Arc<dyn Tokenizer>>,
}

impl Style {
    /// The positioning actually used for the background: a fixed background
    /// with default positioning passes surface coordinates straight through
    pub fn background_positioning(&self) -> BackgroundPositioning {
        if self.fixed_background && self.positioning == BackgroundPositioning::ContentRelative {
            BackgroundPositioning::PassThrough
        } else {
            self.positioning
        }
    }
}

impl fmt::Debug for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Style")
            .field("font", &self.font.is_some())
            .field("paint", &self.paint)
            .field("background", &self.background)
            .field("positioning", &self.background_positioning())
            .field("padding", &self.padding)
            .field("margin", &self.margin)
            .field("alignment", &self.alignment)
            .field("decorators", &self.decorators)
            .field("min_size", &self.min_size)
            .field("effects", &self.effects.len())
            .finish()
    }
}

#[derive(Clone, Debug)]
pub enum ContentKind {
    Text(String),
    /// An inline image; a scale of 0 or 1 keeps its size
    Image { image: Image, scale: f32 },
    /// Children laid out together as one unbreakable row
    Container(Vec<Content>),
}

/// A node of the content tree
#[derive(Clone, Debug)]
pub struct Content {
    pub kind: ContentKind,
    pub style: Style,
    pub id: Option<BoxId>,
}

impl Content {
    fn with_kind(kind: ContentKind) -> Content {
        Content {
            kind,
            style: Style::default(),
            id: None,
        }
    }

    pub fn text<S: Into<String>>(text: S) -> Content {
        Content::with_kind(ContentKind::Text(text.into()))
    }

    pub fn image(image: Image, scale: f32) -> Content {
        Content::with_kind(ContentKind::Image { image, scale })
    }

    pub fn container(children: Vec<Content>) -> Content {
        Content::with_kind(ContentKind::Container(children))
    }

    pub fn with_style(mut self, style: Style) -> Content {
        self.style = style;
        self
    }

    pub fn with_font(mut self, font: FaceRef) -> Content {
        self.style.font = Some(font);
        self
    }

    pub fn with_paint<P: Into<Paint>>(mut self, paint: P) -> Content {
        self.style.paint = Some(paint.into());
        self
    }

    pub fn with_background<P: Into<Paint>>(mut self, paint: P) -> Content {
        self.style.background = Some(paint.into());
        self
    }

    pub fn with_positioning(mut self, positioning: BackgroundPositioning) -> Content {
        self.style.positioning = positioning;
        self
    }

    pub fn with_fixed_background(mut self, fixed: bool) -> Content {
        self.style.fixed_background = fixed;
        self
    }

    pub fn with_padding(mut self, padding: Margins) -> Content {
        self.style.padding = padding;
        self
    }

    pub fn with_margin(mut self, margin: Margins) -> Content {
        self.style.margin = margin;
        self
    }

    pub fn with_alignment(mut self, alignment: BaselineAlignment) -> Content {
        self.style.alignment = alignment;
        self
    }

    pub fn with_decorator(mut self, decorator: Decorator) -> Content {
        self.style.decorators.push(decorator);
        self
    }

    pub fn with_min_size(mut self, min: FixedPoint) -> Content {
        self.style.min_size = Some(min);
        self
    }

    pub fn with_effect(mut self, effect: BoxEffect) -> Content {
        self.style.effects.push(effect);
        self
    }

    pub fn with_image_mode(mut self, mode: ImageMetricMode) -> Content {
        self.style.image_mode = mode;
        self
    }

    pub fn with_tokenizer(mut self, tokenizer: Arc<dyn Tokenizer>) -> Content {
        self.style.tokenizer = Some(tokenizer);
        self
    }

    pub fn with_id<I: Into<BoxId>>(mut self, id: I) -> Content {
        self.id = Some(id.into());
        self
    }

    /// All text in this node and its children
    pub fn text_value(&self) -> String {
        match &self.kind {
            ContentKind::Text(s) => s.clone(),
            ContentKind::Image { .. } => String::new(),
            ContentKind::Container(children) => children.iter().map(Content::text_value).collect(),
        }
    }

    /// Number of characters the node stands for
    pub(crate) fn char_len(&self) -> usize {
        match &self.kind {
            ContentKind::Text(s) => s.chars().count(),
            ContentKind::Image { .. } => 0,
            ContentKind::Container(children) => children.iter().map(Content::char_len).sum(),
        }
    }

    /// Wrap a box produced from this node in the node's styling, innermost
    /// first: minimum size, background and spacing, effects, alignment, the
    /// decorator list, and finally the identifier
    pub(crate) fn wrap(&self, core: LayoutBox) -> LayoutBox {
        let style = &self.style;
        let mut b = core;
        if let Some(min) = style.min_size {
            b = MinSizeBox::new(b, min).into();
        }
        let background = style
            .background
            .clone()
            .map(|paint| Fill::new(paint, style.background_positioning()));
        if background.is_some() || !style.padding.is_empty() || !style.margin.is_empty() {
            b = DecorationBox::new(b)
                .with_padding(style.padding)
                .with_margin(style.margin)
                .with_background(background)
                .into();
        }
        if !style.effects.is_empty() {
            b = EffectBox::new(b, style.effects.clone()).into();
        }
        if style.alignment != BaselineAlignment::Baseline {
            b = AlignedBox::new(b, style.alignment).into();
        }
        b = apply_decorators(b, &style.decorators);
        if let Some(id) = &self.id {
            b = IdentifiedBox::new(b, id.clone()).into();
        }
        b
    }
}

impl From<&str> for Content {
    fn from(s: &str) -> Self {
        Content::text(s)
    }
}

impl From<String> for Content {
    fn from(s: String) -> Self {
        Content::text(s)
    }
}
