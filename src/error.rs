use thiserror::Error;

/// All errors that the crate can generate.
///
/// Boxes that do not fit, exhausted pages and empty input are not errors;
/// they are reported as `Ok(None)` or empty results. Nothing here is retried
/// internally: layout is deterministic, so the caller has to change the input
/// or the constraints (e.g. widen the region) to recover.
#[derive(Error, Debug)]
pub enum WrapError {
    /// A text run had to be measured but neither its style nor the tokenizer
    /// provided a glyph-metrics provider
    #[error("font not provided")]
    MissingFont,

    /// The line folder was handed a box it has no fitting rule for
    #[error("unknown box at pos {pos}: {kind}")]
    UnknownBox { pos: usize, kind: &'static str },

    /// The page-break box could not be placed without emptying the line
    #[error("page break too long or rect too small")]
    PageBreakTooLong,

    /// The page-break box is taller than the region it must be drawn in
    #[error("page break too tall or rect too small")]
    PageBreakTooTall,

    /// A line is taller than an empty region, so repeating it on the next
    /// page would never make progress
    #[error("line of height {height} does not fit in {available}")]
    LineTooTall { height: i32, available: i32 },

    #[error("boxing at pos {pos}: {source}")]
    /// Tokenizing failed at the given text position
    Boxing {
        pos: usize,
        #[source]
        source: Box<WrapError>,
    },

    #[error("boxing text at line {line}: {source}")]
    /// Folding failed while producing the given line of a page
    Line {
        line: usize,
        #[source]
        source: Box<WrapError>,
    },

    #[error("{pass} pass failed: {source}")]
    /// One of the constraint-sizing passes failed
    Pass {
        pass: &'static str,
        #[source]
        source: Box<WrapError>,
    },

    #[error(transparent)]
    /// An I/O error occurred
    Io(#[from] std::io::Error),

    #[error(transparent)]
    /// [owned_ttf_parser] failed to parse the font
    FaceParsingError(#[from] owned_ttf_parser::FaceParsingError),

    #[error(transparent)]
    /// [ab_glyph] rejected the font
    InvalidFont(#[from] ab_glyph::InvalidFont),

    #[error(transparent)]
    /// [image] failed to parse the image
    Image(#[from] image::ImageError),
}

impl WrapError {
    pub(crate) fn at_pos(self, pos: usize) -> WrapError {
        WrapError::Boxing {
            pos,
            source: Box::new(self),
        }
    }

    pub(crate) fn at_line(self, line: usize) -> WrapError {
        WrapError::Line {
            line,
            source: Box::new(self),
        }
    }

    pub(crate) fn in_pass(self, pass: &'static str) -> WrapError {
        WrapError::Pass {
            pass,
            source: Box::new(self),
        }
    }

    /// The innermost error, with all positional context stripped
    pub fn root(&self) -> &WrapError {
        match self {
            WrapError::Boxing { source, .. }
            | WrapError::Line { source, .. }
            | WrapError::Pass { source, .. } => source.root(),
            other => other,
        }
    }

    /// True for errors that mean the requested geometry cannot hold the content
    pub fn is_geometry_infeasible(&self) -> bool {
        matches!(
            self.root(),
            WrapError::PageBreakTooLong
                | WrapError::PageBreakTooTall
                | WrapError::LineTooTall { .. }
        )
    }
}
