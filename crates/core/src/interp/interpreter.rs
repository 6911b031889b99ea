//! Content-stream interpreter.
//!
//! One [`Renderer`] is a render session: it consumes operators one at
//! a time, maintains the graphics state stack and the path under
//! construction, and issues drawing calls against a [`RasterCanvas`].
//! Nested Form XObjects re-enter [`Renderer::execute`] recursively
//! with their own resource scope; the render target is shared, the
//! path and state scope are not.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use smol_str::SmolStr;
use tracing::{debug, warn};

use crate::error::{RenderError, Result, Severity};
use crate::interp::canvas::RasterCanvas;
use crate::model::objects::{Op, OpTag, Operand};
use crate::model::state::{GraphicsState, LineCap, LineJoin, Path, TextState, WindingRule};
use crate::resources::{FontFace, FontLoader, ImageDecoder, ObjectId, ResourceScope};
use crate::utils::{Matrix, avg_scale, mult_matrix};

/// Top-level render policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions {
    /// Promote every error to fatal instead of the lenient skip
    /// policy of [`RenderError::severity`].
    pub strict: bool,
}

/// Per-session tallies, reset at the start of each page render.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub images: usize,
    pub inline_images: usize,
    pub glyph_runs: usize,
}

/// A page to render: its rectangular extent in device units plus the
/// already-parsed operator sequence of its content streams.
#[derive(Debug, Clone)]
pub struct Page {
    pub width: f64,
    pub height: f64,
    pub ops: Vec<Op>,
}

/// Render session executing operators against a canvas.
pub struct Renderer<'a, C: RasterCanvas> {
    pub(crate) canvas: &'a mut C,
    pub(crate) images: &'a dyn ImageDecoder,
    pub(crate) fonts: &'a dyn FontLoader,
    options: RenderOptions,
    pub(crate) stats: RenderStats,
    /// Loaded faces keyed by font resource identity; repeated `Tf`
    /// with the same resource must not re-decode the program.
    pub(crate) font_cache: FxHashMap<ObjectId, Arc<FontFace>>,
    /// Identities of forms on the active call stack (cycle guard).
    pub(crate) form_stack: Vec<ObjectId>,
    // Per-invocation interpretation state.
    pub(crate) gstack: Vec<GraphicsState>,
    pub(crate) state: GraphicsState,
    pub(crate) path: Path,
    pub(crate) pending_clip: Option<WindingRule>,
    /// Text state saved at `BT`, restored at `ET`.
    pub(crate) text_save: Option<TextState>,
}

impl<'a, C: RasterCanvas> Renderer<'a, C> {
    pub fn new(canvas: &'a mut C, images: &'a dyn ImageDecoder, fonts: &'a dyn FontLoader) -> Self {
        Self::with_options(canvas, images, fonts, RenderOptions::default())
    }

    pub fn with_options(
        canvas: &'a mut C,
        images: &'a dyn ImageDecoder,
        fonts: &'a dyn FontLoader,
        options: RenderOptions,
    ) -> Self {
        Self {
            canvas,
            images,
            fonts,
            options,
            stats: RenderStats::default(),
            font_cache: FxHashMap::default(),
            form_stack: Vec::new(),
            gstack: Vec::new(),
            state: GraphicsState::default(),
            path: Path::new(),
            pending_clip: None,
            text_save: None,
        }
    }

    /// Tallies from the most recent render.
    pub const fn stats(&self) -> &RenderStats {
        &self.stats
    }

    /// Current graphics state (read-only).
    pub const fn state(&self) -> &GraphicsState {
        &self.state
    }

    /// Depth of the graphics state stack.
    pub fn stack_depth(&self) -> usize {
        self.gstack.len()
    }

    /// Renders a full page: paints the backdrop, moves the device
    /// origin to the lower-left corner, and executes the operator
    /// sequence. The raster is sized to the page's declared extent.
    pub fn render_page(&mut self, page: &Page, scope: &dyn ResourceScope) -> Result<()> {
        self.reset_session();

        self.canvas.push_scope();

        // White backdrop over the full extent.
        self.canvas.push_scope();
        self.canvas.move_to(0.0, 0.0);
        self.canvas.line_to(page.width, 0.0);
        self.canvas.line_to(page.width, page.height);
        self.canvas.line_to(0.0, page.height);
        self.canvas.close_path();
        self.canvas.fill(WindingRule::NonZero, (1.0, 1.0, 1.0, 1.0));
        self.canvas.pop_scope();

        // Origin at the lower-left corner; the y-up to y-down flip is
        // applied per coordinate-consuming operator, not here.
        let base = (1.0, 0.0, 0.0, 1.0, 0.0, page.height);
        self.canvas.concat(base);
        self.state.ctm = base;

        let result = self.execute(&page.ops, scope);
        self.canvas.pop_scope();
        result
    }

    fn reset_session(&mut self) {
        self.stats = RenderStats::default();
        self.form_stack.clear();
        self.gstack.clear();
        self.state = GraphicsState::default();
        self.path.clear();
        self.pending_clip = None;
        self.text_save = None;
    }

    /// Executes one operator sequence against the given scope.
    pub fn execute(&mut self, ops: &[Op], scope: &dyn ResourceScope) -> Result<()> {
        for op in ops {
            if let Err(err) = self.dispatch(op, scope) {
                self.recover(op, err)?;
            }
        }
        Ok(())
    }

    /// Applies the propagation policy to a failed operator.
    fn recover(&self, op: &Op, err: RenderError) -> Result<()> {
        if self.options.strict {
            return Err(err);
        }
        match err.severity() {
            Severity::Fatal => Err(err),
            Severity::SkipOperator => {
                warn!(op = op.tag.mnemonic(), error = %err, "skipping operator");
                Ok(())
            }
        }
    }

    fn dispatch(&mut self, op: &Op, scope: &dyn ResourceScope) -> Result<()> {
        match &op.tag {
            // Graphics state.
            OpTag::SaveState => {
                require_operands(op, 0)?;
                self.do_save();
                Ok(())
            }
            OpTag::RestoreState => {
                require_operands(op, 0)?;
                self.do_restore()
            }
            OpTag::Concat => {
                let [a, b, c, d, e, f] = numbers(op)?;
                self.do_concat(a, b, c, d, e, f);
                Ok(())
            }
            OpTag::LineWidth => {
                let [width] = numbers(op)?;
                self.do_line_width(width);
                Ok(())
            }
            OpTag::LineCap => {
                let code = integer(op)?;
                self.state.line_cap = LineCap::from_code(code)?;
                Ok(())
            }
            OpTag::LineJoin => {
                let code = integer(op)?;
                self.state.line_join = LineJoin::from_code(code)?;
                Ok(())
            }
            OpTag::MiterLimit => {
                let [limit] = numbers(op)?;
                self.state.miter_limit = limit;
                Ok(())
            }
            OpTag::Dash => {
                require_operands(op, 2)?;
                let pattern = number_array(&op.operands[0])?;
                let phase = op.operands[1].as_number()?;
                self.state.dash = (pattern.into(), phase);
                Ok(())
            }
            OpTag::RenderingIntent | OpTag::Flatness => {
                debug!(op = op.tag.mnemonic(), "unsupported, skipped");
                Ok(())
            }
            OpTag::ExtGState => {
                let name = name_operand(op)?;
                self.do_ext_gstate(name, scope)
            }

            // Path construction.
            OpTag::MoveTo => {
                let [x, y] = numbers(op)?;
                self.do_move_to(x, y);
                Ok(())
            }
            OpTag::LineTo => {
                let [x, y] = numbers(op)?;
                self.do_line_to(x, y);
                Ok(())
            }
            OpTag::CurveTo => {
                let [x1, y1, x2, y2, x3, y3] = numbers(op)?;
                self.do_curve_to(x1, y1, x2, y2, x3, y3);
                Ok(())
            }
            OpTag::CurveToInitial => {
                let [x2, y2, x3, y3] = numbers(op)?;
                self.do_curve_to_initial(x2, y2, x3, y3);
                Ok(())
            }
            OpTag::CurveToFinal => {
                let [x1, y1, x3, y3] = numbers(op)?;
                self.do_curve_to_final(x1, y1, x3, y3);
                Ok(())
            }
            OpTag::ClosePath => {
                require_operands(op, 0)?;
                self.do_close_path();
                Ok(())
            }
            OpTag::Rectangle => {
                let [x, y, w, h] = numbers(op)?;
                self.do_rectangle(x, y, w, h);
                Ok(())
            }

            // Path painting.
            OpTag::Stroke => self.do_stroke(false),
            OpTag::CloseStroke => self.do_stroke(true),
            OpTag::Fill => self.do_fill(WindingRule::NonZero),
            OpTag::FillEvenOdd => self.do_fill(WindingRule::EvenOdd),
            OpTag::FillStroke => self.do_fill_stroke(WindingRule::NonZero, false),
            OpTag::FillStrokeEvenOdd => self.do_fill_stroke(WindingRule::EvenOdd, false),
            OpTag::CloseFillStroke => self.do_fill_stroke(WindingRule::NonZero, true),
            OpTag::CloseFillStrokeEvenOdd => self.do_fill_stroke(WindingRule::EvenOdd, true),
            OpTag::EndPath => {
                require_operands(op, 0)?;
                self.end_path();
                Ok(())
            }

            // Clipping.
            OpTag::Clip => {
                self.pending_clip = Some(WindingRule::NonZero);
                Ok(())
            }
            OpTag::ClipEvenOdd => {
                self.pending_clip = Some(WindingRule::EvenOdd);
                Ok(())
            }

            // Color.
            OpTag::StrokeGray => {
                let [g] = numbers(op)?;
                self.do_stroke_gray(g);
                Ok(())
            }
            OpTag::FillGray => {
                let [g] = numbers(op)?;
                self.do_fill_gray(g);
                Ok(())
            }
            OpTag::StrokeRgb => {
                let [r, g, b] = numbers(op)?;
                self.do_stroke_rgb(r, g, b);
                Ok(())
            }
            OpTag::FillRgb => {
                let [r, g, b] = numbers(op)?;
                self.do_fill_rgb(r, g, b);
                Ok(())
            }
            OpTag::StrokeCmyk => {
                let [c, m, y, k] = numbers(op)?;
                self.do_stroke_cmyk(c, m, y, k);
                Ok(())
            }
            OpTag::FillCmyk => {
                let [c, m, y, k] = numbers(op)?;
                self.do_fill_cmyk(c, m, y, k);
                Ok(())
            }
            OpTag::StrokeColorSpace => {
                let name = name_operand(op)?;
                self.do_stroke_color_space(name, scope)
            }
            OpTag::FillColorSpace => {
                let name = name_operand(op)?;
                self.do_fill_color_space(name, scope)
            }
            OpTag::StrokeColor => self.do_stroke_color(&op.operands),
            OpTag::FillColor => self.do_fill_color(&op.operands),

            // XObjects and inline images.
            OpTag::XObject => {
                let name = name_operand(op)?;
                self.do_xobject(name, scope)
            }
            OpTag::InlineImage => {
                require_operands(op, 1)?;
                let image = op.operands[0].as_inline_image()?;
                self.do_inline_image(image)
            }

            // Text.
            OpTag::BeginText => {
                require_operands(op, 0)?;
                self.do_begin_text();
                Ok(())
            }
            OpTag::EndText => {
                require_operands(op, 0)?;
                self.do_end_text();
                Ok(())
            }
            OpTag::CharSpacing => {
                let [v] = numbers(op)?;
                self.state.text.char_spacing = v;
                Ok(())
            }
            OpTag::WordSpacing => {
                let [v] = numbers(op)?;
                self.state.text.word_spacing = v;
                Ok(())
            }
            OpTag::HorizScaling => {
                let [v] = numbers(op)?;
                self.state.text.horiz_scaling = v;
                Ok(())
            }
            OpTag::Leading => {
                let [v] = numbers(op)?;
                self.state.text.leading = v;
                Ok(())
            }
            OpTag::SelectFont => {
                require_operands(op, 2)?;
                let name = op.operands[0].as_name()?.clone();
                let size = op.operands[1].as_number()?;
                self.do_select_font(&name, size, scope)
            }
            OpTag::TextRenderMode => {
                self.state.text.render_mode = integer(op)?;
                Ok(())
            }
            OpTag::TextRise => {
                let [v] = numbers(op)?;
                self.state.text.rise = v;
                Ok(())
            }
            OpTag::TextMove => {
                let [dx, dy] = numbers(op)?;
                self.do_text_move(dx, dy);
                Ok(())
            }
            OpTag::TextMoveSetLeading => {
                let [dx, dy] = numbers(op)?;
                self.do_text_move_set_leading(dx, dy);
                Ok(())
            }
            OpTag::TextMatrix => {
                let [a, b, c, d, e, f] = numbers(op)?;
                self.do_text_matrix(a, b, c, d, e, f);
                Ok(())
            }
            OpTag::NextLine => {
                require_operands(op, 0)?;
                self.do_next_line();
                Ok(())
            }
            OpTag::ShowText => {
                require_operands(op, 1)?;
                let text = op.operands[0].as_str()?.to_vec();
                self.do_show_text(&text)
            }
            OpTag::ShowTextAdjusted => {
                require_operands(op, 1)?;
                let items = op.operands[0].as_array()?.to_vec();
                self.do_show_text_adjusted(&items)
            }
            OpTag::NextLineShowText => {
                require_operands(op, 1)?;
                let text = op.operands[0].as_str()?.to_vec();
                self.do_next_line();
                self.do_show_text(&text)
            }
            OpTag::NextLineSetSpacingShowText => {
                require_operands(op, 3)?;
                let word = op.operands[0].as_number()?;
                let char = op.operands[1].as_number()?;
                let text = op.operands[2].as_str()?.to_vec();
                self.state.text.word_spacing = word;
                self.state.text.char_spacing = char;
                self.do_next_line();
                self.do_show_text(&text)
            }

            // Marked content carries no raster effect.
            OpTag::BeginMarkedContent
            | OpTag::BeginMarkedContentProps
            | OpTag::EndMarkedContent
            | OpTag::MarkedContentPoint
            | OpTag::MarkedContentPointProps => Ok(()),

            OpTag::Other(name) => {
                warn!(op = name.as_str(), "unrecognized operator, skipped");
                Ok(())
            }
        }
    }
}

// Operand extraction helpers. Arity is exact: a wrong operand count
// is a range error, a present-but-mistyped operand a type error.

pub(crate) fn require_operands(op: &Op, n: usize) -> Result<()> {
    if op.operands.len() == n {
        Ok(())
    } else {
        Err(RenderError::Range(format!(
            "{} expects {} operands, got {}",
            op.tag.mnemonic(),
            n,
            op.operands.len()
        )))
    }
}

pub(crate) fn numbers<const N: usize>(op: &Op) -> Result<[f64; N]> {
    require_operands(op, N)?;
    let mut out = [0.0; N];
    for (slot, operand) in out.iter_mut().zip(&op.operands) {
        *slot = operand.as_number()?;
    }
    Ok(out)
}

pub(crate) fn integer(op: &Op) -> Result<i64> {
    let [n] = numbers::<1>(op)?;
    if n.fract() != 0.0 {
        return Err(RenderError::Type {
            expected: "integer",
            got: "real",
        });
    }
    Ok(n as i64)
}

pub(crate) fn name_operand(op: &Op) -> Result<SmolStr> {
    require_operands(op, 1)?;
    Ok(op.operands[0].as_name()?.clone())
}

pub(crate) fn number_array(operand: &Operand) -> Result<Vec<f64>> {
    operand
        .as_array()?
        .iter()
        .map(Operand::as_number)
        .collect()
}

/// Snapshot of the per-invocation state, taken around a nested form.
pub(crate) struct FrameSnapshot {
    pub(crate) gstack: Vec<GraphicsState>,
    pub(crate) state: GraphicsState,
    pub(crate) path: Path,
    pub(crate) pending_clip: Option<WindingRule>,
    pub(crate) text_save: Option<TextState>,
}

impl<'a, C: RasterCanvas> Renderer<'a, C> {
    /// Detaches the current frame; the nested invocation starts with
    /// a fresh path and an empty state stack but inherits the CTM and
    /// paint attributes.
    pub(crate) fn snapshot_frame(&mut self) -> FrameSnapshot {
        FrameSnapshot {
            gstack: std::mem::take(&mut self.gstack),
            state: self.state.clone(),
            path: std::mem::replace(&mut self.path, Path::new()),
            pending_clip: self.pending_clip.take(),
            text_save: self.text_save.take(),
        }
    }

    pub(crate) fn restore_frame(&mut self, frame: FrameSnapshot) {
        self.gstack = frame.gstack;
        self.state = frame.state;
        self.path = frame.path;
        self.pending_clip = frame.pending_clip;
        self.text_save = frame.text_save;
    }

    /// Concatenates `m` into the CTM, mirrors it on the canvas, and
    /// re-derives the stroke width by the average-scale
    /// approximation.
    pub(crate) fn concat_matrix(&mut self, m: Matrix) {
        self.state.ctm = mult_matrix(m, self.state.ctm);
        self.canvas.concat(m);
        self.state.line_width *= avg_scale(m);
    }
}
