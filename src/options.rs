//! Options threaded through every draw call.

use crate::colour::Paint;
use crate::layout::LayoutBox;
use crate::rect::PixelRect;
use std::sync::Arc;

/// Maps the paint a box would draw with to the paint it actually draws with,
/// e.g. to recolour a selected word
pub type SourceMapper = Arc<dyn Fn(&Paint) -> Paint + Send + Sync>;

/// Told where each top-level box of a line landed on the surface
pub type BoxRecorder = Arc<dyn Fn(&LayoutBox, PixelRect, &BoxPositionStats) + Send + Sync>;

/// Where a line sits in the overall layout. Stamped onto each line by the
/// wrapper so that drawn boxes can be mapped back to the input.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct LinePositionStats {
    /// Index of the line within its page
    pub line_number: usize,
    /// Number of boxes on the page before this line
    pub page_box_offset: usize,
    /// Number of boxes laid out before this line, across all pages
    pub word_offset: usize,
    /// Page the line belongs to, counting from 0
    pub page_number: usize,
}

impl LinePositionStats {
    /// Stats for the box at `number_in_line` within this line
    pub fn box_stats(&self, number_in_line: usize) -> BoxPositionStats {
        BoxPositionStats {
            line: *self,
            number_in_line,
            page_box_offset: self.page_box_offset + number_in_line,
            word_offset: self.word_offset + number_in_line,
        }
    }
}

/// Where a box sits in the overall layout
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct BoxPositionStats {
    pub line: LinePositionStats,
    pub number_in_line: usize,
    pub page_box_offset: usize,
    pub word_offset: usize,
}

/// Options applied while drawing. Both hooks compose: installing a second
/// mapper runs it on the output of the first.
#[derive(Clone, Default)]
pub struct DrawOptions {
    pub source_mapper: Option<SourceMapper>,
    pub box_recorder: Option<BoxRecorder>,
}

impl DrawOptions {
    pub fn new() -> DrawOptions {
        DrawOptions::default()
    }

    /// Add a paint mapper, applied after any already installed
    pub fn with_source_mapper<F>(mut self, f: F) -> DrawOptions
    where
        F: Fn(&Paint) -> Paint + Send + Sync + 'static,
    {
        self.source_mapper = Some(match self.source_mapper.take() {
            Some(prev) => Arc::new(move |p: &Paint| f(&prev(p))),
            None => Arc::new(f),
        });
        self
    }

    /// Add a box recorder, called after any already installed
    pub fn with_box_recorder<F>(mut self, f: F) -> DrawOptions
    where
        F: Fn(&LayoutBox, PixelRect, &BoxPositionStats) + Send + Sync + 'static,
    {
        self.box_recorder = Some(match self.box_recorder.take() {
            Some(prev) => Arc::new(move |b: &LayoutBox, r: PixelRect, s: &BoxPositionStats| {
                prev(b, r, s);
                f(b, r, s);
            }),
            None => Arc::new(f),
        });
        self
    }

    /// The paint to actually draw with
    pub fn map_source(&self, paint: &Paint) -> Paint {
        match &self.source_mapper {
            Some(f) => f(paint),
            None => paint.clone(),
        }
    }

    pub(crate) fn record(&self, b: &LayoutBox, at: PixelRect, stats: &BoxPositionStats) {
        if let Some(f) = &self.box_recorder {
            f(b, at, stats);
        }
    }
}
