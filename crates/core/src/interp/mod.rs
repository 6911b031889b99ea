pub mod canvas;
pub mod interpreter;
mod ops;

pub use canvas::{CanvasCall, RasterCanvas, RecordingCanvas, Rgba, StrokeStyle};
pub use interpreter::{Page, RenderOptions, RenderStats, Renderer};
