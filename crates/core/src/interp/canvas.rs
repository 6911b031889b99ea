//! Raster canvas - outbound interface of the interpreter.
//!
//! The canvas owns the pixel state and the actual transform/clip
//! stack used for rasterization; the interpreter is its only mutator.
//! Path rasterization, anti-aliasing and compositing all live behind
//! this trait.

use crate::model::state::{LineCap, LineJoin, WindingRule};
use crate::resources::{FontFace, PixelBuffer};
use crate::utils::{Matrix, Point};

/// RGBA color with each channel in [0, 1].
pub type Rgba = (f64, f64, f64, f64);

/// Everything a stroke needs besides the path itself.
#[derive(Debug, Clone, PartialEq)]
pub struct StrokeStyle<'a> {
    pub color: Rgba,
    pub width: f64,
    pub cap: LineCap,
    pub join: LineJoin,
    pub miter_limit: f64,
    pub dash: &'a [f64],
    pub dash_phase: f64,
}

/// Drawing surface for one page render.
///
/// Fill, stroke and clip consume the segments emitted since the last
/// consuming call. `push_scope`/`pop_scope` bracket transform and
/// clip changes; the interpreter keeps them balanced.
pub trait RasterCanvas {
    fn push_scope(&mut self);
    fn pop_scope(&mut self);
    /// Prepends `m` to the surface transform.
    fn concat(&mut self, m: Matrix);

    fn move_to(&mut self, x: f64, y: f64);
    fn line_to(&mut self, x: f64, y: f64);
    fn curve_to(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, x3: f64, y3: f64);
    fn close_path(&mut self);

    fn fill(&mut self, rule: WindingRule, color: Rgba);
    fn stroke(&mut self, style: &StrokeStyle<'_>);
    /// Intersects the pending path into the clip region.
    fn clip(&mut self, rule: WindingRule);

    /// Draws a decoded image anchored at the current origin, one
    /// image pixel per transform unit.
    fn draw_image(&mut self, image: &PixelBuffer);

    fn set_font_face(&mut self, face: &FontFace, size: f64);
    /// Draws a decoded glyph run with its baseline origin at (x, y).
    fn draw_glyph_run(&mut self, text: &[u8], x: f64, y: f64, color: Rgba);
}

/// One recorded canvas call.
#[derive(Debug, Clone, PartialEq)]
pub enum CanvasCall {
    PushScope,
    PopScope,
    Concat(Matrix),
    MoveTo(Point),
    LineTo(Point),
    CurveTo(Point, Point, Point),
    ClosePath,
    Fill { rule: WindingRule, color: Rgba },
    Stroke {
        color: Rgba,
        width: f64,
        cap: LineCap,
        join: LineJoin,
        dash: Vec<f64>,
        dash_phase: f64,
    },
    Clip(WindingRule),
    DrawImage { width: u32, height: u32 },
    SetFontFace { id: u64, size: f64 },
    GlyphRun { text: Vec<u8>, at: Point, color: Rgba },
}

/// Canvas that records every call instead of painting.
///
/// Backs the property tests in this crate and doubles as a trace
/// device for embedders debugging operator streams.
#[derive(Debug, Default)]
pub struct RecordingCanvas {
    pub calls: Vec<CanvasCall>,
    depth: usize,
}

impl RecordingCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current push/pop nesting depth.
    pub const fn scope_depth(&self) -> usize {
        self.depth
    }

    /// Recorded fill calls, in order.
    pub fn fills(&self) -> Vec<(WindingRule, Rgba)> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                CanvasCall::Fill { rule, color } => Some((*rule, *color)),
                _ => None,
            })
            .collect()
    }

    /// Move/line endpoints emitted so far.
    pub fn vertices(&self) -> Vec<Point> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                CanvasCall::MoveTo(p) | CanvasCall::LineTo(p) => Some(*p),
                _ => None,
            })
            .collect()
    }
}

impl RasterCanvas for RecordingCanvas {
    fn push_scope(&mut self) {
        self.depth += 1;
        self.calls.push(CanvasCall::PushScope);
    }

    fn pop_scope(&mut self) {
        self.depth = self.depth.saturating_sub(1);
        self.calls.push(CanvasCall::PopScope);
    }

    fn concat(&mut self, m: Matrix) {
        self.calls.push(CanvasCall::Concat(m));
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.calls.push(CanvasCall::MoveTo((x, y)));
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.calls.push(CanvasCall::LineTo((x, y)));
    }

    fn curve_to(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, x3: f64, y3: f64) {
        self.calls
            .push(CanvasCall::CurveTo((x1, y1), (x2, y2), (x3, y3)));
    }

    fn close_path(&mut self) {
        self.calls.push(CanvasCall::ClosePath);
    }

    fn fill(&mut self, rule: WindingRule, color: Rgba) {
        self.calls.push(CanvasCall::Fill { rule, color });
    }

    fn stroke(&mut self, style: &StrokeStyle<'_>) {
        self.calls.push(CanvasCall::Stroke {
            color: style.color,
            width: style.width,
            cap: style.cap,
            join: style.join,
            dash: style.dash.to_vec(),
            dash_phase: style.dash_phase,
        });
    }

    fn clip(&mut self, rule: WindingRule) {
        self.calls.push(CanvasCall::Clip(rule));
    }

    fn draw_image(&mut self, image: &PixelBuffer) {
        self.calls.push(CanvasCall::DrawImage {
            width: image.width,
            height: image.height,
        });
    }

    fn set_font_face(&mut self, face: &FontFace, size: f64) {
        self.calls.push(CanvasCall::SetFontFace { id: face.id, size });
    }

    fn draw_glyph_run(&mut self, text: &[u8], x: f64, y: f64, color: Rgba) {
        self.calls.push(CanvasCall::GlyphRun {
            text: text.to_vec(),
            at: (x, y),
            color,
        });
    }
}
