//! Operator handlers, grouped by the operator categories of the
//! content-stream grammar. Each module extends [`Renderer`] with the
//! `do_*` methods the dispatcher calls.
//!
//! [`Renderer`]: crate::interp::interpreter::Renderer

mod color;
mod graphics_state;
mod path;
mod text;
mod xobject;
