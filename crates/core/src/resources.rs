//! Resource binding and external decode capabilities.
//!
//! A content stream refers to fonts, images, nested forms and
//! extended-state dictionaries by name; the [`ResourceScope`] trait
//! is the read-only lookup the interpreter performs. Decoding the
//! underlying data (image samples, font programs) belongs to the
//! embedding application and is reached through the capability
//! traits at the bottom of this module.

use std::sync::Arc;

use bytes::Bytes;
use rustc_hash::FxHashMap;
use smol_str::SmolStr;

use crate::error::Result;
use crate::model::color::ColorSpace;
use crate::model::objects::{InlineImage, Op, Operand};
use crate::utils::{Matrix, Rect};

/// Identity of a shared resource object, unique per document.
pub type ObjectId = u64;

/// A named extended graphics state dictionary (`gs` operand).
#[derive(Debug, Clone, Default)]
pub struct ExtGState {
    pub entries: FxHashMap<SmolStr, Operand>,
}

impl ExtGState {
    pub fn number(&self, key: &str) -> Option<f64> {
        match self.entries.get(key) {
            Some(Operand::Number(n)) => Some(*n),
            _ => None,
        }
    }
}

/// A font resource: identity plus the raw embedded outline program,
/// when the document carries one. System font substitution is out of
/// scope, so a missing program means `Tf` is skipped.
#[derive(Debug, Clone)]
pub struct FontResource {
    pub id: ObjectId,
    pub name: SmolStr,
    pub program: Option<Bytes>,
}

/// A loaded font face handle, produced by a [`FontLoader`] and cached
/// by the render session keyed on the resource identity.
#[derive(Debug, Clone)]
pub struct FontFace {
    pub id: ObjectId,
    pub program: Bytes,
}

/// An image XObject: identity plus still-encoded sample data.
#[derive(Debug, Clone)]
pub struct ImageXObject {
    pub id: ObjectId,
    pub data: Bytes,
    pub params: FxHashMap<SmolStr, Operand>,
}

/// A form XObject: a self-contained operator sequence with its own
/// coordinate and (optionally) resource scope.
pub struct FormXObject {
    pub id: ObjectId,
    pub ops: Vec<Op>,
    pub matrix: Option<Matrix>,
    /// Required by the format; rendering proceeds unclipped (and the
    /// omission is logged) when absent.
    pub bbox: Option<Rect>,
    pub resources: Option<Arc<dyn ResourceScope>>,
}

/// An external graphical object referenced by `Do`.
#[derive(Clone)]
pub enum XObject {
    Image(Arc<ImageXObject>),
    Form(Arc<FormXObject>),
}

/// Read-only name→object bindings available to one content stream.
///
/// A form may carry its own scope which shadows the parent's for its
/// nested interpretation; the interpreter falls back to the caller's
/// scope only when the form declares none.
pub trait ResourceScope {
    fn ext_gstate(&self, name: &str) -> Option<Arc<ExtGState>>;
    fn font(&self, name: &str) -> Option<Arc<FontResource>>;
    fn xobject(&self, name: &str) -> Option<XObject>;
    fn color_space(&self, name: &str) -> Option<ColorSpace>;
}

/// Map-backed [`ResourceScope`] for embedders and tests.
#[derive(Default)]
pub struct ResourceMap {
    ext_gstates: FxHashMap<SmolStr, Arc<ExtGState>>,
    fonts: FxHashMap<SmolStr, Arc<FontResource>>,
    xobjects: FxHashMap<SmolStr, XObject>,
    color_spaces: FxHashMap<SmolStr, ColorSpace>,
}

impl ResourceMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_ext_gstate(&mut self, name: &str, gs: ExtGState) {
        self.ext_gstates.insert(SmolStr::new(name), Arc::new(gs));
    }

    pub fn add_font(&mut self, name: &str, font: FontResource) {
        self.fonts.insert(SmolStr::new(name), Arc::new(font));
    }

    pub fn add_image(&mut self, name: &str, image: ImageXObject) {
        self.xobjects
            .insert(SmolStr::new(name), XObject::Image(Arc::new(image)));
    }

    pub fn add_form(&mut self, name: &str, form: FormXObject) {
        self.xobjects
            .insert(SmolStr::new(name), XObject::Form(Arc::new(form)));
    }

    pub fn add_color_space(&mut self, name: &str, space: ColorSpace) {
        self.color_spaces.insert(SmolStr::new(name), space);
    }
}

impl ResourceScope for ResourceMap {
    fn ext_gstate(&self, name: &str) -> Option<Arc<ExtGState>> {
        self.ext_gstates.get(name).cloned()
    }

    fn font(&self, name: &str) -> Option<Arc<FontResource>> {
        self.fonts.get(name).cloned()
    }

    fn xobject(&self, name: &str) -> Option<XObject> {
        self.xobjects.get(name).cloned()
    }

    fn color_space(&self, name: &str) -> Option<ColorSpace> {
        self.color_spaces.get(name).cloned()
    }
}

/// A decoded raster: RGBA8 samples, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

/// Decodes encoded image samples into a pixel buffer.
pub trait ImageDecoder {
    fn decode(&self, image: &ImageXObject) -> Result<PixelBuffer>;
    fn decode_inline(&self, image: &InlineImage) -> Result<PixelBuffer>;
}

/// Parses an embedded outline program into a usable face.
pub trait FontLoader {
    fn load(&self, font: &FontResource) -> Result<FontFace>;
}
