//! Laying out lines page by page.

use super::fold::{Folder, Line, LineAlignment, OverflowMode};
use super::tokenizer::{Boxer, ContentBoxer, Tokenizer};
use super::LayoutBox;
use crate::content::Content;
use crate::font::FaceRef;
use crate::options::{DrawOptions, LinePositionStats};
use crate::rect::{PixelPoint, PixelRect};
use crate::surface::Surface;
use crate::WrapError;
use image::RgbaImage;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Counters carried from one page to the next
pub struct LayoutSession {
    pub(crate) boxer: Box<dyn Boxer>,
    /// Boxes laid out on all previous pages
    pub box_count: usize,
    /// The page the next call lays out, counting from 0
    pub page: usize,
    pub(crate) last_font: Option<FaceRef>,
}

impl LayoutSession {
    pub fn new(boxer: Box<dyn Boxer>) -> LayoutSession {
        LayoutSession {
            boxer,
            box_count: 0,
            page: 0,
            last_font: None,
        }
    }

    /// Continue numbering from an earlier layout
    pub fn with_counters(mut self, box_count: usize, page: usize) -> LayoutSession {
        self.box_count = box_count;
        self.page = page;
        self
    }

    /// True while there is input left to lay out
    pub fn has_next(&self) -> bool {
        self.boxer.has_next()
    }

    /// Input chars consumed so far
    pub fn pos(&self) -> usize {
        self.boxer.pos()
    }

    pub fn boxer(&mut self) -> &mut dyn Boxer {
        self.boxer.as_mut()
    }

    /// Rewind the input and clear the counters
    pub fn reset(&mut self) {
        self.boxer.reset();
        self.box_count = 0;
        self.page = 0;
        self.last_font = None;
    }
}

impl fmt::Debug for LayoutSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayoutSession")
            .field("pos", &self.boxer.pos())
            .field("box_count", &self.box_count)
            .field("page", &self.page)
            .finish()
    }
}

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub enum HorizontalBlockAlignment {
    #[default]
    Left,
    Center,
    Right,
}

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub enum VerticalBlockAlignment {
    #[default]
    Top,
    Center,
    Bottom,
}

/// Where the block of lines sits inside the region it is drawn into
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub struct BlockAlignment {
    pub horizontal: HorizontalBlockAlignment,
    pub vertical: VerticalBlockAlignment,
}

impl BlockAlignment {
    pub fn new(
        horizontal: HorizontalBlockAlignment,
        vertical: VerticalBlockAlignment,
    ) -> BlockAlignment {
        BlockAlignment { horizontal, vertical }
    }

    fn offset(&self, free_width: i32, free_height: i32) -> (i32, i32) {
        let dx = match self.horizontal {
            HorizontalBlockAlignment::Left => 0,
            HorizontalBlockAlignment::Center => free_width / 2,
            HorizontalBlockAlignment::Right => free_width,
        };
        let dy = match self.vertical {
            VerticalBlockAlignment::Top => 0,
            VerticalBlockAlignment::Center => free_height / 2,
            VerticalBlockAlignment::Bottom => free_height,
        };
        (dx.max(0), dy.max(0))
    }
}

/// Lays out boxes into regions and draws the result
#[derive(Clone, Default)]
pub struct Wrapper {
    pub(crate) overflow: OverflowMode,
    pub(crate) page_break: Option<LayoutBox>,
    pub(crate) line_alignment: LineAlignment,
    pub(crate) block_alignment: BlockAlignment,
    pub(crate) outlined_lines: bool,
    pub(crate) outlined_boxes: bool,
    pub(crate) tokenizer: Option<Arc<dyn Tokenizer>>,
}

impl Wrapper {
    pub fn new() -> Wrapper {
        Wrapper::default()
    }

    pub fn with_overflow(mut self, overflow: OverflowMode) -> Wrapper {
        self.overflow = overflow;
        self
    }

    /// Box appended to the last line of a region when more input follows
    pub fn with_page_break<B: Into<LayoutBox>>(mut self, marker: B) -> Wrapper {
        self.page_break = Some(marker.into());
        self
    }

    pub fn with_line_alignment(mut self, alignment: LineAlignment) -> Wrapper {
        self.line_alignment = alignment;
        self
    }

    pub fn with_block_alignment(mut self, alignment: BlockAlignment) -> Wrapper {
        self.block_alignment = alignment;
        self
    }

    /// Outline every line when drawing
    pub fn with_outlined_lines(mut self, outlined: bool) -> Wrapper {
        self.outlined_lines = outlined;
        self
    }

    /// Outline every box when drawing
    pub fn with_outlined_boxes(mut self, outlined: bool) -> Wrapper {
        self.outlined_boxes = outlined;
        self
    }

    /// Segmentation used for text without a tokenizer of its own
    pub fn with_tokenizer(mut self, tokenizer: Arc<dyn Tokenizer>) -> Wrapper {
        self.tokenizer = Some(tokenizer);
        self
    }

    /// Start laying out `contents`, with `font` for text that has none
    pub fn session(&self, contents: Vec<Content>, font: Option<FaceRef>) -> LayoutSession {
        let mut boxer = ContentBoxer::new(contents, font);
        if let Some(tokenizer) = &self.tokenizer {
            boxer = boxer.with_tokenizer(Arc::clone(tokenizer));
        }
        LayoutSession::new(Box::new(boxer))
    }

    pub fn text_session<S: Into<String>>(&self, text: S, face: FaceRef) -> LayoutSession {
        self.session(vec![Content::text(text)], Some(face))
    }

    /// Fill `rect` with as many lines as fit, continuing from where the
    /// session left off. Returns the lines and the point just below the last.
    ///
    /// When a page-break marker is set and input remains, it is appended to
    /// the last line, pushing boxes onto the next page if needed.
    pub fn text_to_rect(
        &self,
        session: &mut LayoutSession,
        rect: PixelRect,
    ) -> Result<(Vec<Line>, PixelPoint), WrapError> {
        let height = rect.height();
        let mut lines: Vec<Line> = Vec::new();
        let mut used = 0;
        let mut page_boxes = 0;
        let mut duplicated = false;

        let mut folder = Folder::new(session.boxer.as_mut(), rect.width())
            .with_overflow(self.overflow)
            .with_alignment(self.line_alignment)
            .with_outlines(self.outlined_lines, self.outlined_boxes)
            .with_last_font(session.last_font.clone());

        while used <= height {
            let line_number = lines.len();
            let next = folder.next(height - used).map_err(|e| e.at_line(line_number))?;
            let Some(mut line) = next else {
                break;
            };
            let line_height = line.size().height();
            match self.overflow {
                OverflowMode::DescentOverflow if used + line.y_value() > height => {
                    let boxes = line.into_boxes().into_iter().map(LayoutBox::unbroken).collect();
                    folder.boxer().unshift(boxes);
                    break;
                }
                OverflowMode::FullOverflowDuplicate if used + line_height > height => {
                    folder
                        .boxer()
                        .unshift(line.boxes().iter().cloned().map(LayoutBox::unbroken).collect());
                    if line_number == 0 {
                        warn!(
                            height = line_height,
                            available = height,
                            "line taller than an empty page"
                        );
                        return Err(WrapError::LineTooTall {
                            height: line_height,
                            available: height,
                        });
                    }
                    duplicated = true;
                }
                _ => {}
            }

            line.stats = LinePositionStats {
                line_number,
                page_box_offset: page_boxes,
                word_offset: session.box_count + page_boxes,
                page_number: session.page,
            };
            page_boxes += line.len();
            used += line_height;
            lines.push(line);
            if duplicated {
                break;
            }
        }
        let last_font = folder.last_font().cloned();

        if let Some(marker) = &self.page_break {
            if !duplicated && folder.boxer().has_next() {
                match lines.last_mut() {
                    Some(line) => {
                        let before = line.len();
                        line.pop_space_for(folder.boxer(), rect, marker.clone())?;
                        page_boxes = page_boxes + line.len() - before;
                    }
                    None if marker.height().ceil() > height => {
                        return Err(WrapError::PageBreakTooTall)
                    }
                    None => {}
                }
            }
        }

        debug!(page = session.page, lines = lines.len(), boxes = page_boxes, used, "laid out page");
        session.box_count += page_boxes;
        session.page += 1;
        if last_font.is_some() {
            session.last_font = last_font;
        }
        Ok((lines, PixelPoint::new(rect.x1, rect.y1 + used)))
    }

    /// Draw `lines` into `rect`, placed by the block alignment and each
    /// line's own alignment
    pub fn render_lines(
        &self,
        surface: &mut dyn Surface,
        lines: &[Line],
        rect: PixelRect,
        opts: &DrawOptions,
    ) {
        let block_width = lines.iter().map(|l| l.size().width()).max().unwrap_or(0);
        let block_height: i32 = lines.iter().map(|l| l.size().height()).sum();
        let (dx, dy) = self
            .block_alignment
            .offset(rect.width() - block_width, rect.height() - block_height);

        let mut y = rect.y1 + dy;
        for line in lines {
            let size = line.size();
            let free = block_width - size.width();
            let lx = match line.alignment {
                LineAlignment::Left => 0,
                LineAlignment::Center => free / 2,
                LineAlignment::Right => free,
            };
            let bottom = (y + size.height()).min(rect.y2);
            let area = PixelRect::new(rect.x1 + dx + lx, y, rect.x2, bottom);
            if !area.is_empty() {
                line.draw(surface, area, opts);
            }
            y += size.height();
        }
    }
}

impl fmt::Debug for Wrapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wrapper")
            .field("overflow", &self.overflow)
            .field("page_break", &self.page_break)
            .field("line_alignment", &self.line_alignment)
            .field("block_alignment", &self.block_alignment)
            .field("outlined_lines", &self.outlined_lines)
            .field("outlined_boxes", &self.outlined_boxes)
            .field("tokenizer", &self.tokenizer.is_some())
            .finish()
    }
}

/// Lay out `text` at `width` pixels and draw it onto a new image just tall
/// enough to hold it
pub fn simple_wrap_text_to_image(
    text: &str,
    face: FaceRef,
    width: u32,
    wrapper: &Wrapper,
) -> Result<RgbaImage, WrapError> {
    let mut session = wrapper.text_session(text, face);
    let unbounded = PixelRect::sized(width as i32, i32::MAX / 2);
    let (lines, end) = wrapper.text_to_rect(&mut session, unbounded)?;
    let mut image = RgbaImage::new(width, end.y.max(0) as u32);
    let rect = PixelRect::sized(width as i32, end.y);
    wrapper.render_lines(&mut image, &lines, rect, &DrawOptions::default());
    Ok(image)
}

/// Lay out as much of `text` as fits in `rect` and draw it there
pub fn simple_wrap_text_to_rect(
    text: &str,
    surface: &mut dyn Surface,
    rect: PixelRect,
    face: FaceRef,
    wrapper: &Wrapper,
) -> Result<(Vec<Line>, PixelPoint), WrapError> {
    let mut session = wrapper.text_session(text, face);
    let (lines, end) = wrapper.text_to_rect(&mut session, rect)?;
    wrapper.render_lines(surface, &lines, rect, &DrawOptions::default());
    Ok((lines, end))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colour::Paint;
    use crate::font::BlockFace;
    use crate::layout::{SentinelTokenizer, TextBox};
    use image::Rgba;

    fn face() -> FaceRef {
        BlockFace::new(1, 1, 0).into_ref()
    }

    #[test]
    fn test_lines_are_stamped() {
        let wrapper = Wrapper::new();
        let mut session = wrapper.text_session("aa bb cc dd", face());
        let (lines, end) = wrapper
            .text_to_rect(&mut session, PixelRect::sized(6, 1))
            .expect("layout");
        assert_eq!(lines.len(), 1);
        assert_eq!(end, PixelPoint::new(0, 1));
        let (lines, _) = wrapper
            .text_to_rect(&mut session, PixelRect::sized(6, 5))
            .expect("layout");
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].stats.page_number, 1);
        assert_eq!(lines[0].stats.word_offset, 4);
        assert_eq!(session.box_count, 7);
        assert!(!session.has_next());
    }

    #[test]
    fn test_box_recorder_sees_every_slot() {
        let wrapper = Wrapper::new();
        let mut session = wrapper.text_session("aa bb cc", face());
        let rect = PixelRect::sized(6, 5);
        let (lines, _) = wrapper.text_to_rect(&mut session, rect).expect("layout");
        assert_eq!(lines.len(), 2);

        let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let opts = DrawOptions::default().with_box_recorder(move |b, slot, stats| {
            sink.lock().expect("recorder lock").push((b.kind(), slot, *stats));
        });
        let mut img = RgbaImage::new(6, 5);
        wrapper.render_lines(&mut img, &lines, rect, &opts);

        let seen = seen.lock().expect("recorder lock");
        let kinds: Vec<&str> = seen.iter().map(|(k, _, _)| *k).collect();
        assert_eq!(kinds, vec!["text", "text", "text", "line break", "text"]);
        assert_eq!(seen[2].1, PixelRect::new(3, 0, 5, 1));
        assert_eq!(seen[4].1, PixelRect::new(0, 1, 2, 2));
        let offsets: Vec<(usize, usize, usize)> = seen
            .iter()
            .map(|(_, _, s)| (s.line.line_number, s.number_in_line, s.word_offset))
            .collect();
        assert_eq!(offsets, vec![(0, 0, 0), (0, 1, 1), (0, 2, 2), (0, 3, 3), (1, 0, 4)]);
    }

    #[test]
    fn test_custom_tokenizer_splits_words() {
        let wrapper = Wrapper::new().with_tokenizer(Arc::new(SentinelTokenizer('-')));
        let mut session = wrapper.text_session("aa-bb", face());
        let (lines, _) = wrapper
            .text_to_rect(&mut session, PixelRect::sized(4, 5))
            .expect("layout");
        let texts: Vec<String> = lines.iter().map(Line::text_value).collect();
        assert_eq!(texts, vec!["aa-", "bb"]);
    }

    #[test]
    fn test_descent_overflow_needs_baseline_inside() {
        let face = BlockFace::new(1, 2, 2).into_ref();
        let strict = Wrapper::new();
        let mut session = strict.text_session("a\nb", face.clone());
        let (lines, _) = strict
            .text_to_rect(&mut session, PixelRect::sized(10, 6))
            .expect("layout");
        assert_eq!(lines.len(), 1);

        let loose = Wrapper::new().with_overflow(OverflowMode::DescentOverflow);
        let mut session = loose.text_session("a\nb", face);
        let (lines, _) = loose.text_to_rect(&mut session, PixelRect::sized(10, 6)).expect("layout");
        assert_eq!(lines.len(), 2);
        assert!(!session.has_next());
    }

    #[test]
    fn test_full_overflow_duplicates_line() {
        let face = BlockFace::new(1, 2, 2).into_ref();
        let wrapper = Wrapper::new().with_overflow(OverflowMode::FullOverflowDuplicate);
        let mut session = wrapper.text_session("a\nb", face);
        let (first, _) = wrapper
            .text_to_rect(&mut session, PixelRect::sized(10, 6))
            .expect("layout");
        assert_eq!(first.len(), 2);
        assert_eq!(first[1].text_value(), "b");
        let (second, _) = wrapper
            .text_to_rect(&mut session, PixelRect::sized(10, 6))
            .expect("layout");
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].text_value(), "b");
    }

    #[test]
    fn test_full_overflow_rejects_line_taller_than_page() {
        let face = BlockFace::new(1, 4, 2).into_ref();
        let wrapper = Wrapper::new().with_overflow(OverflowMode::FullOverflowDuplicate);
        let mut session = wrapper.text_session("a b", face);
        let err = wrapper
            .text_to_rect(&mut session, PixelRect::sized(10, 5))
            .expect_err("line can never fit");
        assert!(matches!(err, WrapError::LineTooTall { height: 6, available: 5 }));
        assert!(err.is_geometry_infeasible());

        // nothing was lost, a taller region still works
        assert_eq!(session.pos(), 0);
        let (lines, _) = wrapper
            .text_to_rect(&mut session, PixelRect::sized(10, 6))
            .expect("layout");
        assert_eq!(lines[0].text_value(), "a b");
    }

    #[test]
    fn test_render_right_aligned_block() {
        let wrapper = Wrapper::new().with_block_alignment(BlockAlignment::new(
            HorizontalBlockAlignment::Right,
            VerticalBlockAlignment::Bottom,
        ));
        let mut session = wrapper.text_session("ab", face());
        let (lines, _) = wrapper
            .text_to_rect(&mut session, PixelRect::sized(5, 3))
            .expect("layout");
        let mut img = RgbaImage::new(5, 3);
        wrapper.render_lines(&mut img, &lines, PixelRect::sized(5, 3), &DrawOptions::default());
        assert_eq!(img.get_pixel(3, 2), &Rgba([0, 0, 0, 255]));
        assert_eq!(img.get_pixel(4, 2), &Rgba([0, 0, 0, 255]));
        assert_eq!(img.get_pixel(2, 2), &Rgba([0, 0, 0, 0]));
        assert_eq!(img.get_pixel(3, 0), &Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn test_empty_page_with_tall_marker() {
        let tall: LayoutBox =
            TextBox::new(&BlockFace::new(1, 5, 0).into_ref(), ">", Paint::default()).into();
        let wrapper = Wrapper::new().with_page_break(tall);
        let mut session = wrapper.text_session("word", BlockFace::new(1, 3, 0).into_ref());
        let err = wrapper
            .text_to_rect(&mut session, PixelRect::sized(10, 2))
            .expect_err("marker cannot fit");
        assert!(err.is_geometry_infeasible());
    }

    #[test]
    fn test_simple_wrap_to_image() {
        let img = simple_wrap_text_to_image("aa bb", face(), 4, &Wrapper::new()).expect("layout");
        assert_eq!((img.width(), img.height()), (4, 2));
        assert_eq!(img.get_pixel(0, 1), &Rgba([0, 0, 0, 255]));
    }
}
