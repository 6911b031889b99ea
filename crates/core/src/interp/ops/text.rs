//! Text object and text-showing operators.
//!
//! The text cursor lives in unscaled text space; each glyph run is
//! placed by pushing the cursor through the text matrix. Leading is
//! stored so that a positive value moves the next line downward on
//! the flipped raster.

use std::sync::Arc;

use smol_str::SmolStr;
use tracing::{debug, warn};

use crate::error::{RenderError, Result};
use crate::interp::canvas::RasterCanvas;
use crate::interp::interpreter::Renderer;
use crate::model::objects::Operand;
use crate::resources::ResourceScope;
use crate::utils::apply_matrix_pt;

/// Render mode 3 shows nothing.
const RENDER_MODE_INVISIBLE: i64 = 3;

impl<C: RasterCanvas> Renderer<'_, C> {
    pub(crate) fn do_begin_text(&mut self) {
        self.text_save = Some(self.state.text.clone());
        self.state.text.reset_position();
        self.canvas.push_scope();
    }

    pub(crate) fn do_end_text(&mut self) {
        if let Some(saved) = self.text_save.take() {
            self.state.text = saved;
        }
        self.canvas.pop_scope();
    }

    pub(crate) fn do_select_font(
        &mut self,
        name: &SmolStr,
        size: f64,
        scope: &dyn ResourceScope,
    ) -> Result<()> {
        let font = scope
            .font(name)
            .ok_or_else(|| RenderError::ResourceNotFound {
                kind: "Font",
                name: name.to_string(),
            })?;
        self.state.text.size = size;
        if font.program.is_none() {
            debug!(font = name.as_str(), "font carries no embedded program");
            self.state.text.face = None;
            return Ok(());
        }
        let face = match self.font_cache.get(&font.id) {
            Some(face) => Arc::clone(face),
            None => {
                let face = Arc::new(self.fonts.load(&font)?);
                self.font_cache.insert(font.id, Arc::clone(&face));
                face
            }
        };
        self.canvas.set_font_face(&face, size);
        self.state.text.face = Some(face);
        Ok(())
    }

    pub(crate) fn do_text_move(&mut self, dx: f64, dy: f64) {
        self.state.text.cursor.0 += dx;
        self.state.text.cursor.1 += -dy;
    }

    /// `TD` sets the leading to the negated vertical offset, so a
    /// following `T*` repeats the same line step.
    pub(crate) fn do_text_move_set_leading(&mut self, dx: f64, dy: f64) {
        self.state.text.leading = -dy;
        self.do_text_move(dx, dy);
    }

    pub(crate) fn do_text_matrix(&mut self, a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) {
        self.state.text.matrix = (a, b, c, d, e, -f);
        self.state.text.cursor = (0.0, 0.0);
    }

    pub(crate) fn do_next_line(&mut self) {
        self.state.text.cursor.0 = 0.0;
        self.state.text.cursor.1 += self.state.text.leading;
    }

    pub(crate) fn do_show_text(&mut self, text: &[u8]) -> Result<()> {
        self.draw_run(text)
    }

    /// `TJ`: strings are shown, numbers pull the cursor back by
    /// thousandths of the font size.
    pub(crate) fn do_show_text_adjusted(&mut self, items: &[Operand]) -> Result<()> {
        for item in items {
            match item {
                Operand::Str(text) => {
                    let text = text.clone();
                    self.draw_run(&text)?;
                }
                Operand::Number(adjust) => {
                    self.state.text.cursor.0 -= adjust / 1000.0 * self.state.text.size;
                }
                other => {
                    return Err(RenderError::Type {
                        expected: "string or number",
                        got: other.kind(),
                    });
                }
            }
        }
        Ok(())
    }

    fn draw_run(&mut self, text: &[u8]) -> Result<()> {
        if self.state.text.render_mode == RENDER_MODE_INVISIBLE {
            return Ok(());
        }
        if self.state.text.face.is_none() {
            warn!("text shown before a usable font was selected");
            return Ok(());
        }
        let color = self.fill_rgba()?;
        let (x, y) = apply_matrix_pt(self.state.text.matrix, self.state.text.cursor);
        self.canvas.draw_glyph_run(text, x, y, color);
        self.stats.glyph_runs += 1;
        Ok(())
    }
}
