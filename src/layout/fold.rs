//! Folding a stream of boxes into lines.

use super::boxes::{
    BaselineAlignment, FillLineBox, FillLineMode, LayoutBox, LineBreakBox, PageBreakBox,
};
use super::tokenizer::Boxer;
use crate::colour::Paint;
use crate::font::FaceRef;
use crate::options::{DrawOptions, LinePositionStats};
use crate::rect::PixelRect;
use crate::surface::{stroke_rect, Surface};
use crate::units::Fixed;
use crate::WrapError;
use tracing::{trace, warn};

/// Horizontal placement of a line within its block
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub enum LineAlignment {
    #[default]
    Left,
    Center,
    Right,
}

/// What to do with a line that does not fit in the height left on a page
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub enum OverflowMode {
    /// Lines must fit entirely
    #[default]
    Strict,
    /// Lines may hang over the bottom by their descent, as long as the
    /// baseline is inside
    DescentOverflow,
    /// The overflowing line is drawn cut off and repeated on the next page
    FullOverflowDuplicate,
}

/// A run of boxes laid out side by side
#[derive(Clone, Debug, Default)]
pub struct Line {
    boxes: Vec<LayoutBox>,
    width: Fixed,
    ascent: Fixed,
    descent: Fixed,
    extra_height: Fixed,
    pub stats: LinePositionStats,
    pub alignment: LineAlignment,
    pub outlined: bool,
    pub outlined_boxes: bool,
}

impl Line {
    pub fn new(alignment: LineAlignment) -> Line {
        Line {
            alignment,
            ..Line::default()
        }
    }

    pub fn push(&mut self, b: LayoutBox) {
        self.add_geometry(&b);
        self.boxes.push(b);
    }

    fn add_geometry(&mut self, b: &LayoutBox) {
        self.width += b.advance();
        if b.alignment() == BaselineAlignment::Baseline {
            let m = b.metrics();
            self.ascent = self.ascent.max(m.ascent);
            self.descent = self.descent.max(m.descent);
        } else {
            self.extra_height = self.extra_height.max(b.height());
        }
    }

    /// Rebuild the totals from the boxes
    pub fn recompute(&mut self) {
        self.width = Fixed::ZERO;
        self.ascent = Fixed::ZERO;
        self.descent = Fixed::ZERO;
        self.extra_height = Fixed::ZERO;
        for b in std::mem::take(&mut self.boxes) {
            self.push(b);
        }
    }

    pub fn boxes(&self) -> &[LayoutBox] {
        &self.boxes
    }

    pub fn into_boxes(self) -> Vec<LayoutBox> {
        self.boxes
    }

    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    /// Sum of the advances of all boxes
    pub fn width(&self) -> Fixed {
        self.width
    }

    pub fn height(&self) -> Fixed {
        (self.ascent + self.descent).max(self.extra_height)
    }

    /// Whole pixels covered by the line, anchored at the origin
    pub fn size(&self) -> PixelRect {
        PixelRect::sized(self.width.ceil(), self.height().ceil())
    }

    /// Distance from the top of the line to its baseline, in whole pixels
    pub fn y_value(&self) -> i32 {
        self.ascent.ceil()
    }

    pub fn text_value(&self) -> String {
        self.boxes.iter().map(LayoutBox::text_value).collect()
    }

    fn baseline_for(&self, b: &LayoutBox) -> Fixed {
        match b.alignment() {
            BaselineAlignment::Baseline => self.ascent,
            BaselineAlignment::Top => b.ascent(),
            BaselineAlignment::Middle => (self.height() - b.height()).div_int(2) + b.ascent(),
            BaselineAlignment::Bottom => self.height() - b.descent(),
        }
    }

    /// Draw the line with its top-left corner at the top-left of `area`
    pub fn draw(&self, surface: &mut dyn Surface, area: PixelRect, opts: &DrawOptions) {
        let bottom = area.y1 + self.height().ceil();
        let mut x = Fixed::from_int(area.x1);
        for (i, b) in self.boxes.iter().enumerate() {
            let x1 = x.round();
            x += b.advance();
            let x2 = match b {
                LayoutBox::FillLine(_) if i + 1 == self.boxes.len() => area.x2,
                _ => x.round(),
            };
            let slot = PixelRect::new(x1, area.y1, x2, bottom);
            let clipped = slot.intersect(&area);
            if !clipped.is_empty() {
                b.draw(surface, clipped, self.baseline_for(b), opts);
            }
            opts.record(b, slot, &self.stats.box_stats(i));
            if self.outlined_boxes {
                stroke_rect(surface, clipped, &opts.map_source(&Paint::default()));
            }
        }
        if self.outlined {
            let outline = PixelRect::new(area.x1, area.y1, area.x1 + self.width.ceil(), bottom)
                .intersect(&area);
            stroke_rect(surface, outline, &opts.map_source(&Paint::default()));
        }
    }

    /// Make room at the end of the line for a page-break `marker` and append
    /// it. Boxes popped off the tail are queued back onto `boxer` in order;
    /// a whitespace box directly before the marker is kept inside it.
    ///
    /// Returns the number of boxes queued back.
    pub fn pop_space_for(
        &mut self,
        boxer: &mut dyn Boxer,
        container: PixelRect,
        marker: LayoutBox,
    ) -> Result<usize, WrapError> {
        if marker.height().ceil() > container.height() {
            warn!(
                marker = marker.height().ceil(),
                available = container.height(),
                "page break taller than its region"
            );
            return Err(WrapError::PageBreakTooTall);
        }

        let mut popped = Vec::new();
        while (self.width + marker.advance()).ceil() >= container.width() {
            let Some(b) = self.boxes.pop() else { break };
            self.width -= b.advance();
            popped.push(b);
        }
        popped.reverse();

        let swallowed = match popped.first() {
            Some(b) if b.is_whitespace() => Some(popped.remove(0).unbroken()),
            _ => None,
        };
        let requeued = popped.len();
        trace!(requeued, swallowed = swallowed.is_some(), "making room for page break");
        boxer.unshift(popped.into_iter().map(LayoutBox::unbroken).collect());

        self.boxes.push(PageBreakBox::new(marker, swallowed).into());
        self.recompute();
        if self.boxes.len() == 1 {
            warn!(width = container.width(), "page break left nothing on its line");
            return Err(WrapError::PageBreakTooLong);
        }
        Ok(requeued)
    }
}

/// Pulls boxes from a [`Boxer`] and greedily fits them into lines
pub struct Folder<'a> {
    boxer: &'a mut dyn Boxer,
    container_width: i32,
    last_font: Option<FaceRef>,
    overflow: OverflowMode,
    alignment: LineAlignment,
    outlined: bool,
    outlined_boxes: bool,
}

impl<'a> Folder<'a> {
    pub fn new(boxer: &'a mut dyn Boxer, container_width: i32) -> Folder<'a> {
        let last_font = boxer.font();
        Folder {
            boxer,
            container_width,
            last_font,
            overflow: OverflowMode::default(),
            alignment: LineAlignment::default(),
            outlined: false,
            outlined_boxes: false,
        }
    }

    pub fn with_overflow(mut self, overflow: OverflowMode) -> Folder<'a> {
        self.overflow = overflow;
        self
    }

    pub fn with_alignment(mut self, alignment: LineAlignment) -> Folder<'a> {
        self.alignment = alignment;
        self
    }

    pub fn with_outlines(mut self, lines: bool, boxes: bool) -> Folder<'a> {
        self.outlined = lines;
        self.outlined_boxes = boxes;
        self
    }

    /// Continue from the font seen last on a previous page
    pub fn with_last_font(mut self, font: Option<FaceRef>) -> Folder<'a> {
        if font.is_some() {
            self.last_font = font;
        }
        self
    }

    /// The face of the last box that had one
    pub fn last_font(&self) -> Option<&FaceRef> {
        self.last_font.as_ref()
    }

    pub fn boxer(&mut self) -> &mut dyn Boxer {
        &mut *self.boxer
    }

    /// Fold the next line. `available_height` is the height left in the
    /// region; in strict mode a box taller than that ends the region and
    /// everything taken for the line is queued back.
    ///
    /// Returns `None` once the input is exhausted or nothing more fits.
    pub fn next(&mut self, available_height: i32) -> Result<Option<Line>, WrapError> {
        let mut line = Line::new(self.alignment);
        line.outlined = self.outlined;
        line.outlined_boxes = self.outlined_boxes;

        loop {
            let pos = self.boxer.pos();
            let Some((b, _)) = self.boxer.next().map_err(|e| e.at_pos(pos))? else {
                break;
            };
            if let Some(face) = b.font() {
                self.last_font = Some(face.clone());
            }

            let h = b.height().ceil();
            if self.overflow == OverflowMode::Strict
                && h > line.height().ceil()
                && h > available_height
            {
                trace!(height = h, available_height, "line does not fit");
                let mut boxes = line.into_boxes();
                boxes.push(b);
                self.boxer.unshift(boxes);
                return Ok(None);
            }

            let overflows = (line.width() + b.advance()).ceil() >= self.container_width;
            match b {
                LayoutBox::LineBreak(_) => {
                    line.push(b);
                    break;
                }
                LayoutBox::PageBreak(_) => {
                    return Err(WrapError::UnknownBox { pos, kind: b.kind() });
                }
                LayoutBox::FillLine(FillLineBox {
                    mode: FillLineMode::RestOfLine,
                    ..
                }) => {
                    if overflows && !line.is_empty() {
                        self.boxer.unshift(vec![b]);
                    } else {
                        line.push(b);
                    }
                    break;
                }
                LayoutBox::FillLine(FillLineBox {
                    mode: FillLineMode::EntireLine,
                    ..
                }) => {
                    if line.is_empty() {
                        line.push(b);
                    } else {
                        self.boxer.unshift(vec![b]);
                    }
                    break;
                }
                LayoutBox::Text(_)
                | LayoutBox::Image(_)
                | LayoutBox::Row(_)
                | LayoutBox::Decorated(_)
                | LayoutBox::Aligned(_)
                | LayoutBox::MinSize(_)
                | LayoutBox::Effect(_)
                | LayoutBox::Identified(_) => {
                    if !overflows {
                        line.push(b);
                        continue;
                    }
                    if b.is_whitespace() {
                        line.push(LineBreakBox::soft(b, self.last_font.clone()).into());
                    } else if line.is_empty() {
                        line.push(b);
                    } else {
                        self.boxer.unshift(vec![b]);
                    }
                    break;
                }
            }
        }

        if line.is_empty() {
            return Ok(None);
        }
        trace!(boxes = line.len(), width = %line.width(), "folded line");
        Ok(Some(line))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::BlockFace;
    use crate::layout::{ContentBoxer, TextBox};
    use std::collections::VecDeque;

    fn face() -> FaceRef {
        BlockFace::new(1, 1, 0).into_ref()
    }

    fn text(s: &str) -> LayoutBox {
        TextBox::new(&face(), s, Paint::default()).into()
    }

    fn fill(s: &str, mode: FillLineMode) -> LayoutBox {
        FillLineBox::new(text(s), mode).into()
    }

    /// Hands out a fixed list of boxes
    #[derive(Default)]
    struct ManualBoxer {
        boxes: VecDeque<LayoutBox>,
    }

    impl Boxer for ManualBoxer {
        fn next(&mut self) -> Result<Option<(LayoutBox, usize)>, WrapError> {
            Ok(self.boxes.pop_front().map(|b| (b, 0)))
        }
        fn has_next(&self) -> bool {
            !self.boxes.is_empty()
        }
        fn back(&mut self, _n: usize) {}
        fn push(&mut self, boxes: Vec<LayoutBox>) {
            self.boxes.extend(boxes);
        }
        fn unshift(&mut self, boxes: Vec<LayoutBox>) {
            for b in boxes.into_iter().rev() {
                self.boxes.push_front(b);
            }
        }
        fn shift(&mut self) -> Option<LayoutBox> {
            self.boxes.pop_front()
        }
        fn pos(&self) -> usize {
            0
        }
        fn reset(&mut self) {}
        fn font(&self) -> Option<FaceRef> {
            None
        }
        fn set_font(&mut self, _font: Option<FaceRef>) {}
    }

    fn fold_all(boxer: &mut dyn Boxer, width: i32) -> Vec<String> {
        let mut folder = Folder::new(boxer, width);
        let mut out = Vec::new();
        while let Some(line) = folder.next(i32::MAX).expect("folds") {
            out.push(line.text_value());
        }
        out
    }

    fn manual(boxes: Vec<LayoutBox>) -> ManualBoxer {
        ManualBoxer { boxes: boxes.into() }
    }

    #[test]
    fn test_single_line_fit() {
        let mut boxer = ContentBoxer::from_text("word that fits", face());
        assert_eq!(fold_all(&mut boxer, 15), vec!["word that fits"]);
    }

    #[test]
    fn test_wrap_converts_trailing_space() {
        let mut boxer = ContentBoxer::from_text("word that fits", face());
        let mut folder = Folder::new(&mut boxer, 6);
        let first = folder.next(100).expect("folds").expect("a line");
        assert_eq!(first.text_value(), "word ");
        assert_eq!(first.width(), Fixed::from_int(5));
        let second = folder.next(100).expect("folds").expect("a line");
        assert_eq!(second.text_value(), "that ");
        let third = folder.next(100).expect("folds").expect("a line");
        assert_eq!(third.text_value(), "fits");
        assert!(folder.next(100).expect("folds").is_none());
    }

    #[test]
    fn test_overflowing_space_becomes_line_break() {
        let mut boxer = ContentBoxer::from_text("word that", face());
        let mut folder = Folder::new(&mut boxer, 5);
        let first = folder.next(100).expect("folds").expect("a line");
        assert_eq!(first.len(), 2);
        assert!(matches!(first.boxes()[1], LayoutBox::LineBreak(_)));
        assert_eq!(first.width(), Fixed::from_int(4));
        assert_eq!(first.text_value(), "word ");
    }

    #[test]
    fn test_over_wide_word_is_accepted_alone() {
        let mut boxer = ContentBoxer::from_text("a enormous b", face());
        assert_eq!(fold_all(&mut boxer, 5), vec!["a ", "enormous", " b"]);
    }

    #[test]
    fn test_newline_ends_line() {
        let mut boxer = ContentBoxer::from_text("a\nb", face());
        assert_eq!(fold_all(&mut boxer, 50), vec!["a\n", "b"]);
    }

    #[test]
    fn test_strict_overflow_requeues_line() {
        let mut boxer = ContentBoxer::from_text("a b", face());
        let mut folder = Folder::new(&mut boxer, 50);
        assert!(folder.next(0).expect("folds").is_none());
        assert_eq!(boxer.pos(), 0);
        assert_eq!(fold_all(&mut boxer, 50), vec!["a b"]);
    }

    #[test]
    fn test_page_break_from_input_is_rejected() {
        let mut boxer = manual(vec![PageBreakBox::new(text(">"), None).into()]);
        let err = Folder::new(&mut boxer, 10).next(10).expect_err("page breaks are not input");
        assert!(matches!(err.root(), WrapError::UnknownBox { kind: "page break", .. }));
    }

    #[test]
    fn test_fill_rest_of_line_fits() {
        let mut boxer = manual(vec![text("A"), fill("B", FillLineMode::RestOfLine), text("C")]);
        assert_eq!(fold_all(&mut boxer, 10), vec!["AB", "C"]);
    }

    #[test]
    fn test_fill_rest_of_line_wraps() {
        let mut boxer = manual(vec![
            text("A"),
            fill("BigBox", FillLineMode::RestOfLine),
            text("C"),
        ]);
        assert_eq!(fold_all(&mut boxer, 5), vec!["A", "BigBox", "C"]);
    }

    #[test]
    fn test_fill_entire_line_at_start() {
        let mut boxer = manual(vec![fill("A", FillLineMode::EntireLine), text("B")]);
        assert_eq!(fold_all(&mut boxer, 10), vec!["A", "B"]);
    }

    #[test]
    fn test_fill_entire_line_in_middle() {
        let mut boxer = manual(vec![text("A"), fill("B", FillLineMode::EntireLine), text("C")]);
        assert_eq!(fold_all(&mut boxer, 10), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_pop_space_for_swallows_whitespace() {
        let mut boxer = manual(Vec::new());
        let mut line = Line::default();
        for s in ["aaa", " ", "bbb"] {
            line.push(text(s));
        }
        let requeued = line
            .pop_space_for(&mut boxer, PixelRect::sized(5, 1), text(">"))
            .expect("room for the marker");
        assert_eq!(requeued, 1);
        assert_eq!(line.len(), 2);
        assert_eq!(line.text_value(), "aaa ");
        assert_eq!(line.width(), Fixed::from_int(4));
        let requeued: Vec<String> =
            std::iter::from_fn(|| boxer.shift().map(|b| b.text_value())).collect();
        assert_eq!(requeued, vec!["bbb"]);
    }

    #[test]
    fn test_pop_space_for_undoes_soft_breaks() {
        let mut boxer = manual(Vec::new());
        let mut line = Line::default();
        for s in ["aaa", " ", "bb"] {
            line.push(text(s));
        }
        line.push(LineBreakBox::soft(text(" "), Some(face())).into());
        let requeued = line
            .pop_space_for(&mut boxer, PixelRect::sized(7, 1), text(">"))
            .expect("room for the marker");
        assert_eq!(requeued, 2);
        assert_eq!(line.text_value(), "aaa ");
        let kinds: Vec<&str> = std::iter::from_fn(|| boxer.shift().map(|b| b.kind())).collect();
        assert_eq!(kinds, vec!["text", "text"]);
    }

    #[test]
    fn test_pop_space_for_errors() {
        let mut boxer = manual(Vec::new());
        let mut line = Line::default();
        line.push(text("aaaaaa"));
        let err = line
            .pop_space_for(&mut boxer, PixelRect::sized(4, 1), text(">"))
            .expect_err("nothing left on the line");
        assert!(matches!(err, WrapError::PageBreakTooLong));

        let tall: LayoutBox =
            TextBox::new(&BlockFace::new(1, 3, 0).into_ref(), ">", Paint::default()).into();
        let err = Line::default()
            .pop_space_for(&mut boxer, PixelRect::sized(4, 2), tall)
            .expect_err("marker taller than the region");
        assert!(matches!(err, WrapError::PageBreakTooTall));
    }
}
