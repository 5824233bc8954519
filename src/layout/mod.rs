//! Breaking content into lines and pages.
//!
//! Layout runs in three stages, each usable on its own:
//!
//! - a [`Boxer`](crate::layout::Boxer) turns [`Content`](crate::Content) into
//!   a stream of measured [`LayoutBox`](crate::layout::LayoutBox)es
//! - a [`Folder`](crate::layout::Folder) packs boxes greedily into
//!   [`Line`](crate::layout::Line)s no wider than the container
//! - a [`Wrapper`](crate::layout::Wrapper) stacks lines into a rectangle,
//!   stopping when the next line would not fit and leaving the rest of the
//!   input in the [`LayoutSession`](crate::layout::LayoutSession) for the
//!   next page
//!
//! [`Wrapper::text_to_specs`](crate::layout::Wrapper::text_to_specs) sizes the
//! page from the content instead, within the bounds of a
//! [`SpecConfig`](crate::layout::SpecConfig).
//!
//! # Example
//!
//! ```
//! use wordwrap::layout::Wrapper;
//! use wordwrap::{BlockFace, PixelRect};
//!
//! let face = BlockFace::new(1, 1, 0).into_ref();
//! let wrapper = Wrapper::new();
//! let mut session = wrapper.text_session("aaa bbb ccc ddd eee fff", face);
//!
//! let mut pages = Vec::new();
//! while session.has_next() {
//!     let (lines, _) = wrapper
//!         .text_to_rect(&mut session, PixelRect::sized(10, 2))
//!         .expect("text fits");
//!     pages.push(lines);
//! }
//! assert_eq!(pages.len(), 2);
//! assert_eq!(pages[0][0].text_value(), "aaa bbb ");
//! ```

mod boxes;
mod constraints;
mod decorator;
mod fold;
mod margins;
mod tokenizer;
mod wrapper;

pub use boxes::*;
pub use constraints::*;
pub use decorator::*;
pub use fold::*;
pub use margins::*;
pub use tokenizer::*;
pub use wrapper::*;
