//! orinoco - a content-stream interpreter that renders PDF page
//! operators onto an abstract 2D raster surface.

pub mod error;
pub mod interp;
pub mod model;
pub mod resources;
pub mod utils;

pub use error::{RenderError, Result, Severity};
pub use interp::{Page, RasterCanvas, RenderOptions, RenderStats, Renderer};
pub use model::color::{Color, ColorSpace};
pub use model::objects::{Op, OpTag, Operand};
pub use model::state::{GraphicsState, LineCap, LineJoin, WindingRule};
pub use resources::{
    FontFace, FontLoader, FontResource, FormXObject, ImageDecoder, ImageXObject, ResourceMap,
    ResourceScope, XObject,
};
