//! External object invocation (`Do`) and inline images (`BI..EI`).

use smol_str::SmolStr;
use tracing::{debug, warn};

use crate::error::{RenderError, Result};
use crate::interp::canvas::RasterCanvas;
use crate::interp::interpreter::Renderer;
use crate::model::objects::InlineImage;
use crate::model::state::WindingRule;
use crate::resources::{FormXObject, ImageXObject, PixelBuffer, ResourceScope, XObject};
use crate::utils::scale_matrix;

impl<C: RasterCanvas> Renderer<'_, C> {
    pub(crate) fn do_xobject(&mut self, name: SmolStr, scope: &dyn ResourceScope) -> Result<()> {
        match scope.xobject(&name) {
            Some(XObject::Image(image)) => self.draw_image_xobject(&image),
            Some(XObject::Form(form)) => self.draw_form_xobject(&form, scope),
            None => Err(RenderError::ResourceNotFound {
                kind: "XObject",
                name: name.to_string(),
            }),
        }
    }

    fn draw_image_xobject(&mut self, image: &ImageXObject) -> Result<()> {
        let pixels = self.images.decode(image)?;
        self.place_image(&pixels);
        self.stats.images += 1;
        Ok(())
    }

    pub(crate) fn do_inline_image(&mut self, image: &InlineImage) -> Result<()> {
        let pixels = self.images.decode_inline(image)?;
        self.place_image(&pixels);
        self.stats.inline_images += 1;
        Ok(())
    }

    /// Draws a decoded raster into the current unit square: the CTM
    /// has already placed a 1x1 box, so the image is drawn at
    /// 1/width x 1/height scale with its top edge on the baseline.
    fn place_image(&mut self, pixels: &PixelBuffer) {
        let (w, h) = (f64::from(pixels.width), f64::from(pixels.height));
        self.canvas.push_scope();
        self.canvas.concat(scale_matrix(1.0 / w, 1.0 / h));
        self.canvas.draw_image(pixels);
        self.canvas.pop_scope();
    }

    fn draw_form_xobject(&mut self, form: &FormXObject, scope: &dyn ResourceScope) -> Result<()> {
        if self.form_stack.contains(&form.id) {
            return Err(RenderError::CyclicReference(format!(
                "form xobject {} invokes itself",
                form.id
            )));
        }
        self.form_stack.push(form.id);
        self.canvas.push_scope();

        let frame = self.snapshot_frame();
        if let Some((a, b, c, d, e, f)) = form.matrix {
            self.concat_matrix((a, b, c, d, e, -f));
        }
        match form.bbox {
            Some((x0, y0, x1, y1)) => {
                self.path.rect(x0, -y0, x1 - x0, -(y1 - y0));
                self.emit_path();
                self.canvas.clip(WindingRule::NonZero);
                self.path.clear();
            }
            None => {
                warn!(form = form.id, "form has no bounding box, left unclipped");
            }
        }

        let result = match &form.resources {
            Some(own) => self.execute(&form.ops, own.as_ref()),
            None => {
                debug!(form = form.id, "form inherits the caller's resources");
                self.execute(&form.ops, scope)
            }
        };

        self.restore_frame(frame);
        self.canvas.pop_scope();
        self.form_stack.pop();
        result
    }
}
