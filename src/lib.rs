mod colour;
pub use colour::*;

mod content;
pub use content::*;

mod font;
pub use font::*;

mod image;
pub use self::image::*;

pub mod layout;

mod options;
pub use options::*;

pub mod pagesize;

mod rect;
pub use rect::*;

pub mod rich;

mod surface;
pub use surface::*;

mod units;
pub use units::*;

mod error;
pub use error::*;
