//! Graphics state and path model.

use std::sync::Arc;

use smallvec::SmallVec;

use crate::error::{RenderError, Result};
use crate::model::color::{Color, ColorSpace, device_gray};
use crate::resources::FontFace;
use crate::utils::{MATRIX_IDENTITY, Matrix, Point};

/// Line cap style for stroked paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineCap {
    #[default]
    Butt,
    Round,
    Square,
}

impl LineCap {
    /// Maps a `J` operand; codes outside 0..=2 are a range error.
    pub fn from_code(code: i64) -> Result<Self> {
        match code {
            0 => Ok(Self::Butt),
            1 => Ok(Self::Round),
            2 => Ok(Self::Square),
            other => Err(RenderError::Range(format!("invalid line cap style {other}"))),
        }
    }
}

/// Line join style for stroked paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineJoin {
    #[default]
    Miter,
    Round,
    Bevel,
}

impl LineJoin {
    /// Maps a `j` operand; codes outside 0..=2 are a range error.
    pub fn from_code(code: i64) -> Result<Self> {
        match code {
            0 => Ok(Self::Miter),
            1 => Ok(Self::Round),
            2 => Ok(Self::Bevel),
            other => Err(RenderError::Range(format!("invalid line join style {other}"))),
        }
    }
}

/// Inside test for fill and clip on self-intersecting paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindingRule {
    NonZero,
    EvenOdd,
}

/// One segment of a subpath.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Segment {
    MoveTo(Point),
    LineTo(Point),
    CurveTo(Point, Point, Point),
    Close,
}

/// An open or closed run of segments starting at a move.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Subpath {
    pub segments: Vec<Segment>,
}

/// The path under construction between path-starting operators and
/// the next paint/clip operator. Tracks the true current point so
/// the `v` operator can use it as its implicit first control point.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Path {
    pub subpaths: Vec<Subpath>,
    current_point: Option<Point>,
    subpath_start: Option<Point>,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.subpaths.iter().all(|sp| sp.segments.is_empty())
    }

    /// The endpoint of the last segment, if a subpath is open.
    pub const fn current_point(&self) -> Option<Point> {
        self.current_point
    }

    fn open_subpath(&mut self) -> &mut Subpath {
        if self.subpaths.is_empty() {
            self.subpaths.push(Subpath::default());
        }
        self.subpaths.last_mut().expect("subpath just ensured")
    }

    /// Starts a new subpath at `p`.
    pub fn move_to(&mut self, p: Point) {
        self.subpaths.push(Subpath {
            segments: vec![Segment::MoveTo(p)],
        });
        self.current_point = Some(p);
        self.subpath_start = Some(p);
    }

    /// Appends a line segment to `p`. Without an open subpath this
    /// degrades to an implicit move.
    pub fn line_to(&mut self, p: Point) {
        if self.current_point.is_none() {
            self.move_to(p);
            return;
        }
        self.open_subpath().segments.push(Segment::LineTo(p));
        self.current_point = Some(p);
    }

    /// Appends a cubic segment with explicit control points.
    pub fn curve_to(&mut self, c1: Point, c2: Point, p: Point) {
        if self.current_point.is_none() {
            self.move_to(c1);
        }
        self.open_subpath().segments.push(Segment::CurveTo(c1, c2, p));
        self.current_point = Some(p);
    }

    /// Closes the current subpath and opens a fresh empty one.
    pub fn close(&mut self) {
        if let Some(sp) = self.subpaths.last_mut()
            && !sp.segments.is_empty()
        {
            sp.segments.push(Segment::Close);
            self.current_point = self.subpath_start;
            self.subpaths.push(Subpath::default());
        }
    }

    /// Appends a complete closed rectangle subpath, then opens a new
    /// one. Caller passes coordinates already in device orientation;
    /// negative extents still yield the consistent corner set.
    pub fn rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        self.move_to((x, y));
        self.line_to((x + w, y));
        self.line_to((x + w, y + h));
        self.line_to((x, y + h));
        self.close();
        self.current_point = Some((x, y));
    }

    pub fn clear(&mut self) {
        self.subpaths.clear();
        self.current_point = None;
        self.subpath_start = None;
    }

    /// All segments across subpaths, in order.
    pub fn segments(&self) -> impl Iterator<Item = &Segment> {
        self.subpaths.iter().flat_map(|sp| sp.segments.iter())
    }
}

/// Text-local positioning and font selection state.
#[derive(Debug, Clone)]
pub struct TextState {
    pub face: Option<Arc<FontFace>>,
    pub size: f64,
    /// Cursor in text space; mapped through `matrix` when drawing.
    pub cursor: Point,
    /// Text-space transform set by `Tm`; identity when positioning
    /// is purely relative.
    pub matrix: Matrix,
    /// Downward distance to the next line in device orientation.
    pub leading: f64,
    pub char_spacing: f64,
    pub word_spacing: f64,
    pub horiz_scaling: f64,
    pub rise: f64,
    /// Raw `Tr` mode; 3 suppresses glyph output.
    pub render_mode: i64,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            face: None,
            size: 0.0,
            cursor: (0.0, 0.0),
            matrix: MATRIX_IDENTITY,
            leading: 0.0,
            char_spacing: 0.0,
            word_spacing: 0.0,
            horiz_scaling: 100.0,
            rise: 0.0,
            render_mode: 0,
        }
    }
}

impl TextState {
    /// Resets positioning at the start of a text object (`BT`).
    pub fn reset_position(&mut self) {
        self.cursor = (0.0, 0.0);
        self.matrix = MATRIX_IDENTITY;
    }
}

/// Snapshot of every mutable paint/transform/clip/text attribute.
///
/// Owned by one interpreter invocation; cloned on `q`, restored by
/// value on `Q`.
#[derive(Debug, Clone)]
pub struct GraphicsState {
    pub ctm: Matrix,
    pub line_width: f64,
    pub line_cap: LineCap,
    pub line_join: LineJoin,
    pub miter_limit: f64,
    pub dash: (SmallVec<[f64; 6]>, f64),
    pub stroke_space: ColorSpace,
    pub stroke_color: Color,
    pub stroke_alpha: f64,
    pub fill_space: ColorSpace,
    pub fill_color: Color,
    pub fill_alpha: f64,
    /// Last path intersected into the clip region. The render target
    /// owns the effective region; this is state-level bookkeeping so
    /// restores stay coherent.
    pub clip: Option<Path>,
    pub text: TextState,
}

impl Default for GraphicsState {
    fn default() -> Self {
        Self {
            ctm: MATRIX_IDENTITY,
            line_width: 1.0,
            line_cap: LineCap::Butt,
            line_join: LineJoin::Miter,
            miter_limit: 10.0,
            dash: (SmallVec::new(), 0.0),
            stroke_space: device_gray(),
            stroke_color: Color::Gray(0.0),
            stroke_alpha: 1.0,
            fill_space: device_gray(),
            fill_color: Color::Gray(0.0),
            fill_alpha: 1.0,
            clip: None,
            text: TextState::default(),
        }
    }
}
