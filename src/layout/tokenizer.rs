//! Turning a content tree into a stream of boxes.
//!
//! A [`Tokenizer`] decides where one unit of text ends and the next begins.
//! A [`Boxer`] walks the content tree with a cursor, asks the tokenizer for
//! the next unit of the current text node, measures it and hands it out as a
//! styled [`LayoutBox`]. Boxes the line folder could not place are queued back
//! onto the boxer and handed out again before any new input is read.

use super::boxes::{ImageBox, LayoutBox, LineBreakBox, RowBox, TextBox};
use crate::colour::Paint;
use crate::content::{Content, ContentKind};
use crate::font::FaceRef;
use crate::WrapError;
use image::RgbaImage;
use std::collections::VecDeque;
use std::sync::Arc;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Word,
    Whitespace,
    LineBreak,
}

/// One unit found by a [`Tokenizer`]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Token {
    /// Unprintable characters dropped before the unit starts
    pub skipped: usize,
    /// Length of the unit in chars, not counting `skipped`
    pub len: usize,
    pub kind: TokenKind,
}

/// Segmentation grammar for text nodes
pub trait Tokenizer: Send + Sync {
    /// Find the first unit of `text`. Returns `None` when nothing printable
    /// is left, in which case the rest of the text is dropped.
    fn grab(&self, text: &[char]) -> Option<Token>;
}

fn is_printable(c: char) -> bool {
    !c.is_control() || c.is_whitespace()
}

fn is_newline(c: char) -> bool {
    c == '\r' || c == '\n'
}

fn run_length(text: &[char], f: impl Fn(char) -> bool) -> usize {
    text.iter().take_while(|c| f(**c)).count()
}

/// Splits text into words, runs of whitespace and line breaks. `\r`, `\n` and
/// `\r\n` are each a single break.
#[derive(Debug, Default, Copy, Clone)]
pub struct SimpleTokenizer;

impl Tokenizer for SimpleTokenizer {
    fn grab(&self, text: &[char]) -> Option<Token> {
        let skipped = run_length(text, |c| !is_printable(c));
        let rest = &text[skipped..];
        let (kind, len) = match *rest.first()? {
            '\r' if rest.get(1) == Some(&'\n') => (TokenKind::LineBreak, 2),
            '\r' | '\n' => (TokenKind::LineBreak, 1),
            c if c.is_whitespace() => (
                TokenKind::Whitespace,
                run_length(rest, |c| c.is_whitespace() && !is_newline(c)),
            ),
            _ => (
                TokenKind::Word,
                run_length(rest, |c| !c.is_whitespace() && is_printable(c)),
            ),
        };
        Some(Token { skipped, len, kind })
    }
}

/// Like [`SimpleTokenizer`], but every run of the sentinel character is a
/// unit of its own, so words can be broken at it.
#[derive(Debug, Copy, Clone)]
pub struct SentinelTokenizer(pub char);

impl Tokenizer for SentinelTokenizer {
    fn grab(&self, text: &[char]) -> Option<Token> {
        let mut token = SimpleTokenizer.grab(text)?;
        let start = token.skipped;
        if text[start] == self.0 {
            token.len = run_length(&text[start..], |c| c == self.0);
            if !self.0.is_whitespace() {
                token.kind = TokenKind::Word;
            }
        } else if token.kind == TokenKind::Word {
            token.len = run_length(&text[start..start + token.len], |c| c != self.0);
        }
        Some(token)
    }
}

/// A cursor over some input that hands out one box at a time
pub trait Boxer {
    /// The next box and the number of input chars it consumed. Boxes handed
    /// back through [`Boxer::unshift`] or [`Boxer::push`] consume nothing.
    fn next(&mut self) -> Result<Option<(LayoutBox, usize)>, WrapError>;

    /// True if [`Boxer::next`] would produce a box
    fn has_next(&self) -> bool;

    /// Move the cursor back by `n` chars of input
    fn back(&mut self, n: usize);

    /// Queue boxes after any already queued
    fn push(&mut self, boxes: Vec<LayoutBox>);

    /// Queue boxes in front of any already queued, keeping their order
    fn unshift(&mut self, boxes: Vec<LayoutBox>);

    /// Take the first queued box
    fn shift(&mut self) -> Option<LayoutBox>;

    /// Chars consumed, not counting those of queued boxes
    fn pos(&self) -> usize;

    /// Start over from the beginning with an empty queue
    fn reset(&mut self);

    /// The face used for text that has none of its own
    fn font(&self) -> Option<FaceRef>;

    fn set_font(&mut self, font: Option<FaceRef>);
}

/// Boxes a list of [`Content`] nodes
#[derive(Clone)]
pub struct ContentBoxer {
    contents: Vec<Content>,
    chars: Vec<Vec<char>>,
    /// Scaled image per node, filled on first use and kept across resets
    scaled: Vec<Option<Arc<RgbaImage>>>,
    index: usize,
    offset: usize,
    consumed: usize,
    queue: VecDeque<LayoutBox>,
    font: Option<FaceRef>,
    paint: Paint,
    tokenizer: Arc<dyn Tokenizer>,
}

impl ContentBoxer {
    pub fn new(contents: Vec<Content>, font: Option<FaceRef>) -> ContentBoxer {
        let chars = contents
            .iter()
            .map(|c| match &c.kind {
                ContentKind::Text(s) => s.chars().collect(),
                _ => Vec::new(),
            })
            .collect();
        let scaled = vec![None; contents.len()];
        ContentBoxer {
            contents,
            chars,
            scaled,
            index: 0,
            offset: 0,
            consumed: 0,
            queue: VecDeque::new(),
            font,
            paint: Paint::default(),
            tokenizer: Arc::new(SimpleTokenizer),
        }
    }

    /// Box a plain string set in `face`
    pub fn from_text<S: Into<String>>(text: S, face: FaceRef) -> ContentBoxer {
        ContentBoxer::new(vec![Content::text(text)], Some(face))
    }

    pub fn with_tokenizer(mut self, tokenizer: Arc<dyn Tokenizer>) -> ContentBoxer {
        self.tokenizer = tokenizer;
        self
    }

    /// Paint for text that has none of its own
    pub fn with_paint<P: Into<Paint>>(mut self, paint: P) -> ContentBoxer {
        self.paint = paint.into();
        self
    }

    fn text_box(
        &self,
        node: &Content,
        kind: TokenKind,
        text: String,
    ) -> Result<LayoutBox, WrapError> {
        let face = node
            .style
            .font
            .as_ref()
            .or(self.font.as_ref())
            .ok_or(WrapError::MissingFont)?;
        let paint = node.style.paint.clone().unwrap_or_else(|| self.paint.clone());
        let b = TextBox::new(face, text, paint).into();
        Ok(match kind {
            TokenKind::LineBreak => LineBreakBox::wrapping(b, Some(Arc::clone(face))).into(),
            TokenKind::Word | TokenKind::Whitespace => node.wrap(b),
        })
    }

    fn row_box(&self, node: &Content, children: &[Content]) -> Result<LayoutBox, WrapError> {
        let font = node.style.font.clone().or_else(|| self.font.clone());
        let paint = node.style.paint.clone().unwrap_or_else(|| self.paint.clone());
        let tokenizer = node
            .style
            .tokenizer
            .clone()
            .unwrap_or_else(|| Arc::clone(&self.tokenizer));
        let mut inner = ContentBoxer::new(children.to_vec(), font)
            .with_paint(paint)
            .with_tokenizer(tokenizer);
        let mut boxes = Vec::new();
        while let Some((b, _)) = inner.next()? {
            boxes.push(b);
        }
        Ok(node.wrap(RowBox::new(boxes).into()))
    }

    fn advance_node(&mut self) {
        self.index += 1;
        self.offset = 0;
    }
}

impl Boxer for ContentBoxer {
    fn next(&mut self) -> Result<Option<(LayoutBox, usize)>, WrapError> {
        if let Some(b) = self.queue.pop_front() {
            return Ok(Some((b, 0)));
        }

        while let Some(node) = self.contents.get(self.index) {
            match &node.kind {
                ContentKind::Text(_) => {
                    let chars = &self.chars[self.index];
                    if self.offset >= chars.len() {
                        self.advance_node();
                        continue;
                    }
                    let tokenizer = node.style.tokenizer.as_ref().unwrap_or(&self.tokenizer);
                    let Some(token) = tokenizer.grab(&chars[self.offset..]) else {
                        self.consumed += chars.len() - self.offset;
                        self.advance_node();
                        continue;
                    };
                    let start = self.offset + token.skipped;
                    let text: String = chars[start..start + token.len].iter().collect();
                    let b = self.text_box(node, token.kind, text)?;
                    let used = token.skipped + token.len;
                    self.offset += used;
                    self.consumed += used;
                    return Ok(Some((b, used)));
                }
                ContentKind::Image { image, scale } => {
                    let pixels = self.scaled[self.index]
                        .get_or_insert_with(|| image.scaled(*scale))
                        .clone();
                    let b = ImageBox::new(pixels).with_mode(node.style.image_mode);
                    let b = node.wrap(b.into());
                    self.advance_node();
                    return Ok(Some((b, 0)));
                }
                ContentKind::Container(children) => {
                    let b = self.row_box(node, children)?;
                    let used = node.char_len();
                    self.consumed += used;
                    self.advance_node();
                    return Ok(Some((b, used)));
                }
            }
        }
        Ok(None)
    }

    fn has_next(&self) -> bool {
        if !self.queue.is_empty() {
            return true;
        }
        self.contents
            .iter()
            .enumerate()
            .skip(self.index)
            .any(|(i, node)| match &node.kind {
                ContentKind::Text(_) => {
                    let from = if i == self.index { self.offset } else { 0 };
                    self.chars[i].iter().skip(from).any(|c| is_printable(*c))
                }
                ContentKind::Image { .. } | ContentKind::Container(_) => true,
            })
    }

    fn back(&mut self, mut n: usize) {
        while n > 0 {
            if self.offset > 0 {
                let step = n.min(self.offset);
                self.offset -= step;
                self.consumed -= step;
                n -= step;
                continue;
            }
            if self.index == 0 {
                break;
            }
            self.index -= 1;
            let node = &self.contents[self.index];
            match &node.kind {
                ContentKind::Text(_) => self.offset = self.chars[self.index].len(),
                ContentKind::Image { .. } | ContentKind::Container(_) => {
                    // atomic nodes are always re-read from their start
                    let len = node.char_len();
                    self.consumed -= len;
                    n = n.saturating_sub(len);
                }
            }
        }
    }

    fn push(&mut self, boxes: Vec<LayoutBox>) {
        self.queue.extend(boxes);
    }

    fn unshift(&mut self, boxes: Vec<LayoutBox>) {
        for b in boxes.into_iter().rev() {
            self.queue.push_front(b);
        }
    }

    fn shift(&mut self) -> Option<LayoutBox> {
        self.queue.pop_front()
    }

    fn pos(&self) -> usize {
        let queued: usize = self.queue.iter().map(LayoutBox::len).sum();
        self.consumed.saturating_sub(queued)
    }

    fn reset(&mut self) {
        self.index = 0;
        self.offset = 0;
        self.consumed = 0;
        self.queue.clear();
    }

    fn font(&self) -> Option<FaceRef> {
        self.font.clone()
    }

    fn set_font(&mut self, font: Option<FaceRef>) {
        self.font = font;
    }
}
