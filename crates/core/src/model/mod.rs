//! Data model: operator records, colors, and graphics state.

pub mod color;
pub mod objects;
pub mod state;

pub use color::{Color, ColorSpace, PREDEFINED_COLORSPACE, Rgb};
pub use objects::{InlineImage, Op, OpTag, Operand};
pub use state::{GraphicsState, LineCap, LineJoin, Path, Segment, Subpath, TextState, WindingRule};
