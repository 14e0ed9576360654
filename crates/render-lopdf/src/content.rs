use crate::encoding::to_win_ansi;
use crate::resources::ResourceRegistry;
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, StringFormat};
use pagewright_render_core::{DrawOp, RenderError};
use pagewright_traits::{BackendFont, Encoding};
use pagewright_types::Color;
use std::sync::Arc;

fn color_operands(color: &Color) -> Vec<Object> {
    color.to_unit_rgb().iter().map(|c| Object::Real(*c)).collect()
}

fn name(resource: &str) -> Object {
    Object::Name(resource.as_bytes().to_vec())
}

/// Paints the XObject `resource` into the `width` x `height` box at (`x`, `y`).
fn place_xobject(operations: &mut Vec<Operation>, resource: &str, x: f32, y: f32, width: f32, height: f32) {
    operations.push(Operation::new("q", vec![]));
    operations.push(Operation::new(
        "cm",
        vec![width.into(), 0.into(), 0.into(), height.into(), x.into(), y.into()],
    ));
    operations.push(Operation::new("Do", vec![name(resource)]));
    operations.push(Operation::new("Q", vec![]));
}

/// Encodes backend-space draw operations as a PDF content stream.
///
/// Fonts and images are registered with `registry` (and written into `doc`)
/// as they are first referenced. Template placements reserve the template's
/// object id; the form XObject itself is written by whoever owns the template.
/// Text is encoded for the font last selected, so Identity-H fonts need a
/// final [`ResourceRegistry::write_fonts`].
pub fn encode_operations(
    ops: &[DrawOp],
    doc: &mut Document,
    registry: &mut ResourceRegistry,
) -> Result<Vec<u8>, RenderError> {
    let mut operations = Vec::with_capacity(ops.len());
    let mut current_font: Option<Arc<dyn BackendFont>> = None;
    for op in ops {
        match op {
            DrawOp::SaveState => operations.push(Operation::new("q", vec![])),
            DrawOp::RestoreState => operations.push(Operation::new("Q", vec![])),
            DrawOp::BeginText => operations.push(Operation::new("BT", vec![])),
            DrawOp::EndText => operations.push(Operation::new("ET", vec![])),
            DrawOp::SetFont { font, size } => {
                let resource = registry.font(doc, font)?;
                current_font = Some(Arc::clone(font));
                operations.push(Operation::new("Tf", vec![name(&resource), (*size).into()]));
            }
            DrawOp::SetFillColor(color) => operations.push(Operation::new("rg", color_operands(color))),
            DrawOp::SetStrokeColor(color) => operations.push(Operation::new("RG", color_operands(color))),
            DrawOp::SetLineWidth(width) => operations.push(Operation::new("w", vec![(*width).into()])),
            DrawOp::ShowText { x, y, text } => {
                operations.push(Operation::new(
                    "Tm",
                    vec![1.into(), 0.into(), 0.into(), 1.into(), (*x).into(), (*y).into()],
                ));
                let shown = match current_font.as_deref() {
                    Some(font) if font.encoding() == Encoding::IdentityH => {
                        Object::String(registry.encode_text(font, text), StringFormat::Hexadecimal)
                    }
                    Some(font) => Object::String(registry.encode_text(font, text), StringFormat::Literal),
                    None => Object::String(to_win_ansi(text), StringFormat::Literal),
                };
                operations.push(Operation::new("Tj", vec![shown]));
            }
            DrawOp::MoveTo { x, y } => operations.push(Operation::new("m", vec![(*x).into(), (*y).into()])),
            DrawOp::LineTo { x, y } => operations.push(Operation::new("l", vec![(*x).into(), (*y).into()])),
            DrawOp::Rect { x, y, width, height } => operations.push(Operation::new(
                "re",
                vec![(*x).into(), (*y).into(), (*width).into(), (*height).into()],
            )),
            DrawOp::Stroke => operations.push(Operation::new("S", vec![])),
            DrawOp::Fill => operations.push(Operation::new("f", vec![])),
            DrawOp::PlaceImage { image, x, y, width, height } => {
                let resource = registry.image(doc, image)?;
                place_xobject(&mut operations, &resource, *x, *y, *width, *height);
            }
            DrawOp::PlaceTemplate { id, x, y } => {
                let resource = registry.template(doc, *id);
                // form XObjects carry their own BBox, so only translate
                place_xobject(&mut operations, &resource, *x, *y, 1.0, 1.0);
            }
        }
    }
    Ok(Content { operations }.encode()?)
}
