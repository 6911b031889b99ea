//! General graphics state operators: q/Q, cm, stroke attributes and
//! ExtGState application.

use smol_str::SmolStr;
use tracing::debug;

use crate::error::{RenderError, Result};
use crate::interp::canvas::RasterCanvas;
use crate::interp::interpreter::Renderer;
use crate::resources::ResourceScope;
use crate::utils::avg_scale;

impl<C: RasterCanvas> Renderer<'_, C> {
    pub(crate) fn do_save(&mut self) {
        self.gstack.push(self.state.clone());
        self.canvas.push_scope();
    }

    pub(crate) fn do_restore(&mut self) -> Result<()> {
        let saved = self.gstack.pop().ok_or(RenderError::StateUnderflow)?;
        self.state = saved;
        self.canvas.pop_scope();
        Ok(())
    }

    /// `cm`: the translation row is negated so that user-space y-up
    /// composes correctly with the y-down device raster.
    pub(crate) fn do_concat(&mut self, a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) {
        self.concat_matrix((a, b, c, d, e, -f));
    }

    /// `w` takes its operand in user space; the stored width is in
    /// device units.
    pub(crate) fn do_line_width(&mut self, width: f64) {
        self.state.line_width = width * avg_scale(self.state.ctm);
    }

    /// `gs`: applies the entries this renderer honors, logs the rest.
    pub(crate) fn do_ext_gstate(&mut self, name: SmolStr, scope: &dyn ResourceScope) -> Result<()> {
        let gs = scope
            .ext_gstate(&name)
            .ok_or_else(|| RenderError::ResourceNotFound {
                kind: "ExtGState",
                name: name.to_string(),
            })?;
        for (key, value) in &gs.entries {
            match key.as_str() {
                "CA" => {
                    self.state.stroke_alpha = value.as_number()?;
                }
                "ca" => {
                    self.state.fill_alpha = value.as_number()?;
                }
                "LW" => {
                    self.do_line_width(value.as_number()?);
                }
                other => {
                    debug!(entry = other, gstate = name.as_str(), "ExtGState entry ignored");
                }
            }
        }
        Ok(())
    }
}
