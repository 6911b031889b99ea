//! Path construction and painting operators.
//!
//! Coordinates are negated in y as they are consumed, so the path
//! held in the graphics state is already device-oriented. Clipping
//! is deferred: `W`/`W*` only record the winding rule, and the next
//! path-clearing operator applies it.

use crate::error::Result;
use crate::interp::canvas::{RasterCanvas, Rgba, StrokeStyle};
use crate::interp::interpreter::Renderer;
use crate::model::state::{Segment, WindingRule};

impl<C: RasterCanvas> Renderer<'_, C> {
    pub(crate) fn do_move_to(&mut self, x: f64, y: f64) {
        self.path.move_to((x, -y));
    }

    pub(crate) fn do_line_to(&mut self, x: f64, y: f64) {
        self.path.line_to((x, -y));
    }

    pub(crate) fn do_curve_to(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, x3: f64, y3: f64) {
        self.path.curve_to((x1, -y1), (x2, -y2), (x3, -y3));
    }

    /// `v`: the first control point coincides with the current point.
    pub(crate) fn do_curve_to_initial(&mut self, x2: f64, y2: f64, x3: f64, y3: f64) {
        let p0 = self.path.current_point().unwrap_or((x2, -y2));
        self.path.curve_to(p0, (x2, -y2), (x3, -y3));
    }

    /// `y`: the second control point coincides with the endpoint.
    pub(crate) fn do_curve_to_final(&mut self, x1: f64, y1: f64, x3: f64, y3: f64) {
        self.path.curve_to((x1, -y1), (x3, -y3), (x3, -y3));
    }

    pub(crate) fn do_close_path(&mut self) {
        self.path.close();
    }

    pub(crate) fn do_rectangle(&mut self, x: f64, y: f64, w: f64, h: f64) {
        self.path.rect(x, -y, w, -h);
    }

    pub(crate) fn do_stroke(&mut self, close: bool) -> Result<()> {
        if close {
            self.path.close();
        }
        let color = self.stroke_rgba();
        match color {
            Ok(color) => {
                self.emit_path();
                let state = &self.state;
                self.canvas.stroke(&StrokeStyle {
                    color,
                    width: state.line_width,
                    cap: state.line_cap,
                    join: state.line_join,
                    miter_limit: state.miter_limit,
                    dash: state.dash.0.as_slice(),
                    dash_phase: state.dash.1,
                });
                self.end_path();
                Ok(())
            }
            Err(err) => {
                self.end_path();
                Err(err)
            }
        }
    }

    pub(crate) fn do_fill(&mut self, rule: WindingRule) -> Result<()> {
        match self.fill_rgba() {
            Ok(color) => {
                self.emit_path();
                self.canvas.fill(rule, color);
                self.end_path();
                Ok(())
            }
            Err(err) => {
                self.end_path();
                Err(err)
            }
        }
    }

    pub(crate) fn do_fill_stroke(&mut self, rule: WindingRule, close: bool) -> Result<()> {
        if close {
            self.path.close();
        }
        match (self.fill_rgba(), self.stroke_rgba()) {
            (Ok(fill), Ok(stroke)) => {
                self.emit_path();
                self.canvas.fill(rule, fill);
                self.emit_path();
                let state = &self.state;
                self.canvas.stroke(&StrokeStyle {
                    color: stroke,
                    width: state.line_width,
                    cap: state.line_cap,
                    join: state.line_join,
                    miter_limit: state.miter_limit,
                    dash: state.dash.0.as_slice(),
                    dash_phase: state.dash.1,
                });
                self.end_path();
                Ok(())
            }
            (Err(err), _) | (_, Err(err)) => {
                self.end_path();
                Err(err)
            }
        }
    }

    /// Replays the recorded path into the canvas.
    pub(crate) fn emit_path(&mut self) {
        for segment in self.path.segments() {
            match *segment {
                Segment::MoveTo(p) => self.canvas.move_to(p.0, p.1),
                Segment::LineTo(p) => self.canvas.line_to(p.0, p.1),
                Segment::CurveTo(c1, c2, p) => {
                    self.canvas.curve_to(c1.0, c1.1, c2.0, c2.1, p.0, p.1);
                }
                Segment::Close => self.canvas.close_path(),
            }
        }
    }

    /// Clears the path, applying a pending clip first. Every painting
    /// operator and `n` funnel through here.
    pub(crate) fn end_path(&mut self) {
        if let Some(rule) = self.pending_clip.take() {
            self.emit_path();
            self.canvas.clip(rule);
            self.state.clip = Some(self.path.clone());
        }
        self.path.clear();
    }

    pub(crate) fn stroke_rgba(&self) -> Result<Rgba> {
        let (r, g, b) = self.state.stroke_color.to_rgb()?;
        Ok((r, g, b, self.state.stroke_alpha))
    }

    pub(crate) fn fill_rgba(&self) -> Result<Rgba> {
        let (r, g, b) = self.state.fill_color.to_rgb()?;
        Ok((r, g, b, self.state.fill_alpha))
    }
}
