//! Tests for the text object operators, font caching, XObject
//! invocation and the per-render tallies.

use std::cell::Cell;

use bytes::Bytes;
use orinoco_core::interp::{CanvasCall, RecordingCanvas, Renderer};
use orinoco_core::model::objects::{InlineImage, Op, Operand};
use orinoco_core::model::state::WindingRule;
use orinoco_core::resources::{
    FontFace, FontLoader, FontResource, FormXObject, ImageDecoder, ImageXObject, PixelBuffer,
    ResourceMap,
};
use orinoco_core::{Page, RenderError, Result};

// ============================================================================
// Harness
// ============================================================================

struct FixedDecoder {
    width: u32,
    height: u32,
}

impl ImageDecoder for FixedDecoder {
    fn decode(&self, _image: &ImageXObject) -> Result<PixelBuffer> {
        Ok(PixelBuffer {
            width: self.width,
            height: self.height,
            pixels: vec![0; (self.width * self.height * 4) as usize],
        })
    }

    fn decode_inline(&self, _image: &InlineImage) -> Result<PixelBuffer> {
        self.decode(&ImageXObject {
            id: 0,
            data: Bytes::new(),
            params: Default::default(),
        })
    }
}

#[derive(Default)]
struct CountingLoader {
    loads: Cell<usize>,
}

impl FontLoader for CountingLoader {
    fn load(&self, font: &FontResource) -> Result<FontFace> {
        self.loads.set(self.loads.get() + 1);
        Ok(FontFace {
            id: font.id,
            program: font.program.clone().unwrap_or_default(),
        })
    }
}

struct FailingDecoder;

impl ImageDecoder for FailingDecoder {
    fn decode(&self, _image: &ImageXObject) -> Result<PixelBuffer> {
        Err(RenderError::Decode("unsupported filter".into()))
    }

    fn decode_inline(&self, _image: &InlineImage) -> Result<PixelBuffer> {
        Err(RenderError::Decode("unsupported filter".into()))
    }
}

fn nums(values: &[f64]) -> Vec<Operand> {
    values.iter().map(|v| Operand::Number(*v)).collect()
}

fn name(value: &str) -> Vec<Operand> {
    vec![Operand::Name(value.into())]
}

fn page(ops: Vec<Op>) -> Page {
    Page {
        width: 100.0,
        height: 100.0,
        ops,
    }
}

fn test_font(id: u64) -> FontResource {
    FontResource {
        id,
        name: "F1".into(),
        program: Some(Bytes::from_static(b"\x00\x01\x00\x00")),
    }
}

fn glyph_runs(canvas: &RecordingCanvas) -> Vec<(Vec<u8>, (f64, f64))> {
    canvas
        .calls
        .iter()
        .filter_map(|call| match call {
            CanvasCall::GlyphRun { text, at, .. } => Some((text.clone(), *at)),
            _ => None,
        })
        .collect()
}

// ============================================================================
// Text objects
// ============================================================================

#[test]
fn test_show_text_places_run_through_text_matrix() {
    let mut resources = ResourceMap::new();
    resources.add_font("F1", test_font(1));

    let ops = vec![
        Op::named("BT", vec![]),
        Op::named("Tf", vec![Operand::Name("F1".into()), Operand::Number(12.0)]),
        Op::named("Td", nums(&[72.0, 700.0])),
        Op::named("Tj", vec![Operand::Str(b"Hi".to_vec())]),
        Op::named("ET", vec![]),
    ];
    let mut canvas = RecordingCanvas::new();
    let decoder = FixedDecoder { width: 2, height: 2 };
    let loader = CountingLoader::default();
    let mut renderer = Renderer::new(&mut canvas, &decoder, &loader);
    assert!(renderer.render_page(&page(ops), &resources).is_ok());
    drop(renderer);

    assert_eq!(glyph_runs(&canvas), vec![(b"Hi".to_vec(), (72.0, -700.0))]);
}

#[test]
fn test_text_matrix_overrides_position() {
    let mut resources = ResourceMap::new();
    resources.add_font("F1", test_font(1));

    let ops = vec![
        Op::named("BT", vec![]),
        Op::named("Tf", vec![Operand::Name("F1".into()), Operand::Number(10.0)]),
        Op::named("Td", nums(&[50.0, 50.0])),
        Op::named("Tm", nums(&[2.0, 0.0, 0.0, 2.0, 5.0, 7.0])),
        Op::named("Tj", vec![Operand::Str(b"A".to_vec())]),
        Op::named("ET", vec![]),
    ];
    let mut canvas = RecordingCanvas::new();
    let decoder = FixedDecoder { width: 2, height: 2 };
    let loader = CountingLoader::default();
    let mut renderer = Renderer::new(&mut canvas, &decoder, &loader);
    assert!(renderer.render_page(&page(ops), &resources).is_ok());
    drop(renderer);

    // Tm resets the cursor, so the run lands at the translation.
    assert_eq!(glyph_runs(&canvas), vec![(b"A".to_vec(), (5.0, -7.0))]);
}

#[test]
fn test_leading_drives_next_line() {
    let mut resources = ResourceMap::new();
    resources.add_font("F1", test_font(1));

    // TD both moves and sets the leading, so T* repeats the step.
    let ops = vec![
        Op::named("BT", vec![]),
        Op::named("Tf", vec![Operand::Name("F1".into()), Operand::Number(10.0)]),
        Op::named("TD", nums(&[10.0, -20.0])),
        Op::named("Tj", vec![Operand::Str(b"one".to_vec())]),
        Op::named("T*", vec![]),
        Op::named("Tj", vec![Operand::Str(b"two".to_vec())]),
        Op::named("ET", vec![]),
    ];
    let mut canvas = RecordingCanvas::new();
    let decoder = FixedDecoder { width: 2, height: 2 };
    let loader = CountingLoader::default();
    let mut renderer = Renderer::new(&mut canvas, &decoder, &loader);
    assert!(renderer.render_page(&page(ops), &resources).is_ok());
    drop(renderer);

    assert_eq!(
        glyph_runs(&canvas),
        vec![
            (b"one".to_vec(), (10.0, 20.0)),
            (b"two".to_vec(), (0.0, 40.0)),
        ]
    );
}

#[test]
fn test_show_text_adjusted_pulls_cursor() {
    let mut resources = ResourceMap::new();
    resources.add_font("F1", test_font(1));

    let items = vec![
        Operand::Str(b"A".to_vec()),
        Operand::Number(500.0),
        Operand::Str(b"B".to_vec()),
    ];
    let ops = vec![
        Op::named("BT", vec![]),
        Op::named("Tf", vec![Operand::Name("F1".into()), Operand::Number(10.0)]),
        Op::named("TJ", vec![Operand::Array(items)]),
        Op::named("ET", vec![]),
    ];
    let mut canvas = RecordingCanvas::new();
    let decoder = FixedDecoder { width: 2, height: 2 };
    let loader = CountingLoader::default();
    let mut renderer = Renderer::new(&mut canvas, &decoder, &loader);
    assert!(renderer.render_page(&page(ops), &resources).is_ok());
    let glyphs = renderer.stats().glyph_runs;
    drop(renderer);

    // 500 thousandths of a 10pt font pull the cursor back 5 units.
    assert_eq!(
        glyph_runs(&canvas),
        vec![(b"A".to_vec(), (0.0, 0.0)), (b"B".to_vec(), (-5.0, 0.0))]
    );
    assert_eq!(glyphs, 2);
}

#[test]
fn test_invisible_render_mode_suppresses_runs() {
    let mut resources = ResourceMap::new();
    resources.add_font("F1", test_font(1));

    let ops = vec![
        Op::named("BT", vec![]),
        Op::named("Tf", vec![Operand::Name("F1".into()), Operand::Number(10.0)]),
        Op::named("Tr", nums(&[3.0])),
        Op::named("Tj", vec![Operand::Str(b"hidden".to_vec())]),
        Op::named("ET", vec![]),
    ];
    let mut canvas = RecordingCanvas::new();
    let decoder = FixedDecoder { width: 2, height: 2 };
    let loader = CountingLoader::default();
    let mut renderer = Renderer::new(&mut canvas, &decoder, &loader);
    assert!(renderer.render_page(&page(ops), &resources).is_ok());
    assert_eq!(renderer.stats().glyph_runs, 0);
    drop(renderer);

    assert!(glyph_runs(&canvas).is_empty());
}

#[test]
fn test_font_face_loaded_once_per_resource() {
    let mut resources = ResourceMap::new();
    resources.add_font("F1", test_font(42));

    let ops = vec![
        Op::named("BT", vec![]),
        Op::named("Tf", vec![Operand::Name("F1".into()), Operand::Number(12.0)]),
        Op::named("Tf", vec![Operand::Name("F1".into()), Operand::Number(24.0)]),
        Op::named("ET", vec![]),
    ];
    let mut canvas = RecordingCanvas::new();
    let decoder = FixedDecoder { width: 2, height: 2 };
    let loader = CountingLoader::default();
    let mut renderer = Renderer::new(&mut canvas, &decoder, &loader);
    assert!(renderer.render_page(&page(ops), &resources).is_ok());
    drop(renderer);

    assert_eq!(loader.loads.get(), 1, "second Tf must hit the cache");
    let faces: Vec<(u64, f64)> = canvas
        .calls
        .iter()
        .filter_map(|call| match call {
            CanvasCall::SetFontFace { id, size } => Some((*id, *size)),
            _ => None,
        })
        .collect();
    assert_eq!(faces, vec![(42, 12.0), (42, 24.0)]);
}

#[test]
fn test_missing_font_is_skipped() {
    let ops = vec![
        Op::named("BT", vec![]),
        Op::named("Tf", vec![Operand::Name("F9".into()), Operand::Number(12.0)]),
        Op::named("Tj", vec![Operand::Str(b"x".to_vec())]),
        Op::named("ET", vec![]),
    ];
    let mut canvas = RecordingCanvas::new();
    let decoder = FixedDecoder { width: 2, height: 2 };
    let loader = CountingLoader::default();
    let mut renderer = Renderer::new(&mut canvas, &decoder, &loader);
    let result = renderer.render_page(&page(ops), &ResourceMap::new());
    assert!(result.is_ok(), "missing font skips, not aborts");
    assert_eq!(renderer.stats().glyph_runs, 0);
}

// ============================================================================
// Image XObjects
// ============================================================================

#[test]
fn test_image_xobject_scaled_into_unit_square() {
    let mut resources = ResourceMap::new();
    resources.add_image(
        "Im0",
        ImageXObject {
            id: 5,
            data: Bytes::from_static(b"\xff"),
            params: Default::default(),
        },
    );

    let ops = vec![
        Op::named("cm", nums(&[80.0, 0.0, 0.0, 60.0, 10.0, 10.0])),
        Op::named("Do", name("Im0")),
    ];
    let mut canvas = RecordingCanvas::new();
    let decoder = FixedDecoder {
        width: 4,
        height: 2,
    };
    let loader = CountingLoader::default();
    let mut renderer = Renderer::new(&mut canvas, &decoder, &loader);
    assert!(renderer.render_page(&page(ops), &resources).is_ok());
    assert_eq!(renderer.stats().images, 1);
    drop(renderer);

    let draw_at = canvas
        .calls
        .iter()
        .position(|call| matches!(call, CanvasCall::DrawImage { width: 4, height: 2 }))
        .expect("image was drawn");
    // The draw sits inside its own scope with a 1/w x 1/h scale.
    assert_eq!(
        canvas.calls[draw_at - 1],
        CanvasCall::Concat((0.25, 0.0, 0.0, 0.5, 0.0, 0.0))
    );
    assert_eq!(canvas.calls[draw_at - 2], CanvasCall::PushScope);
    assert_eq!(canvas.calls[draw_at + 1], CanvasCall::PopScope);
}

#[test]
fn test_inline_image_tallied_separately() {
    let image = InlineImage {
        params: Default::default(),
        data: Bytes::from_static(b"\x00"),
    };
    let ops = vec![Op::named("BI", vec![Operand::InlineImage(image)])];
    let mut canvas = RecordingCanvas::new();
    let decoder = FixedDecoder { width: 2, height: 2 };
    let loader = CountingLoader::default();
    let mut renderer = Renderer::new(&mut canvas, &decoder, &loader);
    assert!(renderer.render_page(&page(ops), &ResourceMap::new()).is_ok());
    assert_eq!(renderer.stats().inline_images, 1);
    assert_eq!(renderer.stats().images, 0);
}

#[test]
fn test_undecodable_image_is_skipped() {
    let mut resources = ResourceMap::new();
    resources.add_image(
        "Im0",
        ImageXObject {
            id: 5,
            data: Bytes::new(),
            params: Default::default(),
        },
    );

    let ops = vec![
        Op::named("Do", name("Im0")),
        Op::named("re", nums(&[0.0, 0.0, 10.0, 10.0])),
        Op::named("f", vec![]),
    ];
    let mut canvas = RecordingCanvas::new();
    let decoder = FailingDecoder;
    let loader = CountingLoader::default();
    let mut renderer = Renderer::new(&mut canvas, &decoder, &loader);
    let result = renderer.render_page(&page(ops), &resources);
    assert!(result.is_ok());
    assert_eq!(renderer.stats().images, 0);
    drop(renderer);
    assert_eq!(canvas.fills().len(), 2, "rendering continued past the skip");
}

// ============================================================================
// Form XObjects
// ============================================================================

#[test]
fn test_form_executes_with_own_resources_and_bbox_clip() {
    let mut form_resources = ResourceMap::new();
    form_resources.add_font("F1", test_font(9));

    let form = FormXObject {
        id: 7,
        ops: vec![
            Op::named("re", nums(&[1.0, 1.0, 8.0, 8.0])),
            Op::named("f", vec![]),
        ],
        matrix: Some((1.0, 0.0, 0.0, 1.0, 30.0, 40.0)),
        bbox: Some((0.0, 0.0, 10.0, 10.0)),
        resources: Some(std::sync::Arc::new(form_resources)),
    };
    let mut resources = ResourceMap::new();
    resources.add_form("Fm0", form);

    let ops = vec![Op::named("Do", name("Fm0"))];
    let mut canvas = RecordingCanvas::new();
    let decoder = FixedDecoder { width: 2, height: 2 };
    let loader = CountingLoader::default();
    let mut renderer = Renderer::new(&mut canvas, &decoder, &loader);
    assert!(renderer.render_page(&page(ops), &resources).is_ok());
    drop(renderer);

    // Matrix concat with the flipped translation row, then the bbox
    // clip, then the form body.
    assert!(canvas
        .calls
        .contains(&CanvasCall::Concat((1.0, 0.0, 0.0, 1.0, 30.0, -40.0))));
    let clip_at = canvas
        .calls
        .iter()
        .position(|call| matches!(call, CanvasCall::Clip(WindingRule::NonZero)))
        .expect("bbox clip applied");
    let fill_at = canvas
        .calls
        .iter()
        .rposition(|call| matches!(call, CanvasCall::Fill { .. }))
        .expect("form body filled");
    assert!(clip_at < fill_at);
    assert_eq!(canvas.scope_depth(), 0);
}

#[test]
fn test_form_without_bbox_renders_unclipped() {
    let form = FormXObject {
        id: 7,
        ops: vec![
            Op::named("re", nums(&[0.0, 0.0, 5.0, 5.0])),
            Op::named("f", vec![]),
        ],
        matrix: None,
        bbox: None,
        resources: None,
    };
    let mut resources = ResourceMap::new();
    resources.add_form("Fm0", form);

    let ops = vec![Op::named("Do", name("Fm0"))];
    let mut canvas = RecordingCanvas::new();
    let decoder = FixedDecoder { width: 2, height: 2 };
    let loader = CountingLoader::default();
    let mut renderer = Renderer::new(&mut canvas, &decoder, &loader);
    assert!(renderer.render_page(&page(ops), &resources).is_ok());
    drop(renderer);

    assert!(!canvas.calls.iter().any(|c| matches!(c, CanvasCall::Clip(_))));
    assert_eq!(canvas.fills().len(), 2);
}

#[test]
fn test_form_state_does_not_leak_to_caller() {
    // The form saves no state itself; its paint changes must still
    // be invisible after the invocation.
    let form = FormXObject {
        id: 3,
        ops: vec![Op::named("rg", nums(&[1.0, 0.0, 0.0]))],
        matrix: None,
        bbox: Some((0.0, 0.0, 10.0, 10.0)),
        resources: None,
    };
    let mut resources = ResourceMap::new();
    resources.add_form("Fm0", form);

    let ops = vec![
        Op::named("Do", name("Fm0")),
        Op::named("re", nums(&[0.0, 0.0, 10.0, 10.0])),
        Op::named("f", vec![]),
    ];
    let mut canvas = RecordingCanvas::new();
    let decoder = FixedDecoder { width: 2, height: 2 };
    let loader = CountingLoader::default();
    let mut renderer = Renderer::new(&mut canvas, &decoder, &loader);
    assert!(renderer.render_page(&page(ops), &resources).is_ok());
    drop(renderer);

    let fills = canvas.fills();
    assert_eq!(fills.last().unwrap().1, (0.0, 0.0, 0.0, 1.0));
}

#[test]
fn test_self_referential_form_terminates() {
    // The form body paints once, then invokes itself through the
    // caller's scope; the cycle is cut and siblings still run.
    let form = FormXObject {
        id: 11,
        ops: vec![
            Op::named("re", nums(&[0.0, 0.0, 1.0, 1.0])),
            Op::named("f", vec![]),
            Op::named("Do", name("Fm0")),
        ],
        matrix: None,
        bbox: None,
        resources: None,
    };
    let mut resources = ResourceMap::new();
    resources.add_form("Fm0", form);

    let ops = vec![
        Op::named("Do", name("Fm0")),
        Op::named("re", nums(&[20.0, 20.0, 5.0, 5.0])),
        Op::named("f", vec![]),
    ];
    let mut canvas = RecordingCanvas::new();
    let decoder = FixedDecoder { width: 2, height: 2 };
    let loader = CountingLoader::default();
    let mut renderer = Renderer::new(&mut canvas, &decoder, &loader);
    let result = renderer.render_page(&page(ops), &resources);
    assert!(result.is_ok(), "cycle must not abort the page");
    drop(renderer);

    // Backdrop, one fill inside the form, one sibling fill.
    assert_eq!(canvas.fills().len(), 3);
    assert_eq!(canvas.scope_depth(), 0, "cycle unwound its scopes");
}

// ============================================================================
// Stats lifecycle
// ============================================================================

#[test]
fn test_stats_reset_between_renders() {
    let image = InlineImage {
        params: Default::default(),
        data: Bytes::new(),
    };
    let ops = vec![Op::named("BI", vec![Operand::InlineImage(image)])];
    let mut canvas = RecordingCanvas::new();
    let decoder = FixedDecoder { width: 2, height: 2 };
    let loader = CountingLoader::default();
    let mut renderer = Renderer::new(&mut canvas, &decoder, &loader);

    assert!(renderer.render_page(&page(ops), &ResourceMap::new()).is_ok());
    assert_eq!(renderer.stats().inline_images, 1);

    assert!(renderer.render_page(&page(vec![]), &ResourceMap::new()).is_ok());
    assert_eq!(renderer.stats().inline_images, 0);
}
