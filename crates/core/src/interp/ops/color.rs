//! Color operators: the device shorthands, colorspace selection and
//! component-wise color setting.

use smol_str::SmolStr;

use crate::error::{RenderError, Result};
use crate::interp::canvas::RasterCanvas;
use crate::interp::interpreter::Renderer;
use crate::model::color::{Color, ColorSpace, PREDEFINED_COLORSPACE};
use crate::model::objects::Operand;
use crate::resources::ResourceScope;

impl<C: RasterCanvas> Renderer<'_, C> {
    pub(crate) fn do_stroke_gray(&mut self, gray: f64) {
        self.state.stroke_space = predefined("DeviceGray");
        self.state.stroke_color = Color::Gray(gray);
    }

    pub(crate) fn do_fill_gray(&mut self, gray: f64) {
        self.state.fill_space = predefined("DeviceGray");
        self.state.fill_color = Color::Gray(gray);
    }

    pub(crate) fn do_stroke_rgb(&mut self, r: f64, g: f64, b: f64) {
        self.state.stroke_space = predefined("DeviceRGB");
        self.state.stroke_color = Color::Rgb(r, g, b);
    }

    pub(crate) fn do_fill_rgb(&mut self, r: f64, g: f64, b: f64) {
        self.state.fill_space = predefined("DeviceRGB");
        self.state.fill_color = Color::Rgb(r, g, b);
    }

    pub(crate) fn do_stroke_cmyk(&mut self, c: f64, m: f64, y: f64, k: f64) {
        self.state.stroke_space = predefined("DeviceCMYK");
        self.state.stroke_color = Color::Cmyk(c, m, y, k);
    }

    pub(crate) fn do_fill_cmyk(&mut self, c: f64, m: f64, y: f64, k: f64) {
        self.state.fill_space = predefined("DeviceCMYK");
        self.state.fill_color = Color::Cmyk(c, m, y, k);
    }

    /// `CS`: selecting a space resets the stroke color to the
    /// space's initial value.
    pub(crate) fn do_stroke_color_space(
        &mut self,
        name: SmolStr,
        scope: &dyn ResourceScope,
    ) -> Result<()> {
        let space = resolve_color_space(&name, scope)?;
        self.state.stroke_color = space.initial_color();
        self.state.stroke_space = space;
        Ok(())
    }

    pub(crate) fn do_fill_color_space(
        &mut self,
        name: SmolStr,
        scope: &dyn ResourceScope,
    ) -> Result<()> {
        let space = resolve_color_space(&name, scope)?;
        self.state.fill_color = space.initial_color();
        self.state.fill_space = space;
        Ok(())
    }

    pub(crate) fn do_stroke_color(&mut self, operands: &[Operand]) -> Result<()> {
        self.state.stroke_color = color_from_operands(operands)?;
        Ok(())
    }

    pub(crate) fn do_fill_color(&mut self, operands: &[Operand]) -> Result<()> {
        self.state.fill_color = color_from_operands(operands)?;
        Ok(())
    }
}

fn predefined(name: &str) -> ColorSpace {
    PREDEFINED_COLORSPACE[name].clone()
}

fn resolve_color_space(name: &SmolStr, scope: &dyn ResourceScope) -> Result<ColorSpace> {
    if let Some(space) = PREDEFINED_COLORSPACE.get(name.as_str()) {
        return Ok(space.clone());
    }
    scope
        .color_space(name)
        .ok_or_else(|| RenderError::ResourceNotFound {
            kind: "ColorSpace",
            name: name.to_string(),
        })
}

/// `SC`/`SCN` family: the component count selects the color model; a
/// trailing name operand selects a pattern.
fn color_from_operands(operands: &[Operand]) -> Result<Color> {
    if let Some(Operand::Name(pattern)) = operands.last() {
        return Ok(Color::Pattern(pattern.clone()));
    }
    let mut components = [0.0; 4];
    for (slot, operand) in components.iter_mut().zip(operands) {
        *slot = operand.as_number()?;
    }
    match operands.len() {
        1 => Ok(Color::Gray(components[0])),
        3 => Ok(Color::Rgb(components[0], components[1], components[2])),
        4 => Ok(Color::Cmyk(
            components[0],
            components[1],
            components[2],
            components[3],
        )),
        n => Err(RenderError::Range(format!(
            "color operator expects 1, 3 or 4 components, got {n}"
        ))),
    }
}
