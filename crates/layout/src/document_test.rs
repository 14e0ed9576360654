#![cfg(test)]

use crate::LayoutError;
use crate::graphics::Graphics;
use crate::page_numbering::PageNumbering;
use crate::surface::{DrawTarget, Paginated};
use crate::test_utils::{balance, open_document, small_geometry};
use crate::text_block::TextBlock;
use pagewright_render_core::{DrawOp, Layer};
use pagewright_types::{Color, Dimension, Length, Unit};
use std::cell::RefCell;
use std::rc::Rc;

#[test]
fn test_open_reports_page_size() {
    let doc = open_document(small_geometry()).unwrap();
    assert_eq!(doc.page_number(), 1);
    let backend = doc.close().unwrap();
    let setup = backend.setup.unwrap();
    assert_eq!((setup.width_pt, setup.height_pt), (200.0, 200.0));
    assert_eq!(backend.pages.len(), 1);
    assert!(backend.finished);
}

#[test]
fn test_listener_fires_on_registration_and_every_break() {
    let mut doc = open_document(small_geometry()).unwrap();
    let seen = Rc::new(RefCell::new(Vec::new()));

    let first = Rc::clone(&seen);
    doc.add_page_listener(move |scope| {
        first.borrow_mut().push(("first", scope.page_number()));
        Ok(())
    })
    .unwrap();
    doc.new_page().unwrap();

    let second = Rc::clone(&seen);
    doc.add_page_listener(move |scope| {
        second.borrow_mut().push(("second", scope.page_number()));
        Ok(())
    })
    .unwrap();
    doc.canvas_over().new_page().unwrap();

    assert_eq!(
        *seen.borrow(),
        vec![("first", 1), ("first", 2), ("second", 2), ("first", 3), ("second", 3)]
    );
}

#[test]
fn test_listener_draws_on_each_fresh_page() {
    let mut doc = open_document(small_geometry()).unwrap();
    doc.add_page_listener(|scope| {
        let mut under = scope.under();
        assert_eq!(under.layer(), Layer::Under);
        Graphics::begin(&mut under, Unit::Pt)
            .set_fill_color(Color::LIGHT_GRAY)
            .fill_rect(0.0, 0.0, 180.0, 20.0);
        Ok(())
    })
    .unwrap();
    {
        let mut canvas = doc.canvas_over();
        canvas.advance(Length::pt(181.0)).unwrap();
    }
    let backend = doc.close().unwrap();
    assert_eq!(backend.pages.len(), 2);
    for page in &backend.pages {
        assert!(page.under.iter().any(|op| matches!(op, DrawOp::Fill)));
        assert_eq!(balance(&page.under), 0);
        assert!(page.over.is_empty());
    }
}

#[test]
fn test_listener_error_propagates() {
    let mut doc = open_document(small_geometry()).unwrap();
    let calls = Rc::new(RefCell::new(0));
    let counter = Rc::clone(&calls);
    doc.add_page_listener(move |_| {
        *counter.borrow_mut() += 1;
        if *counter.borrow() > 1 {
            return Err(LayoutError::Generic("listener refused".to_string()));
        }
        Ok(())
    })
    .unwrap();
    assert!(matches!(doc.new_page(), Err(LayoutError::Generic(_))));
    assert_eq!(*calls.borrow(), 2);
}

#[test]
fn test_unbalanced_state_is_rejected_at_page_end() {
    let mut doc = open_document(small_geometry()).unwrap();
    doc.canvas_over().emit(DrawOp::SaveState);
    let err = doc.new_page().unwrap_err();
    assert!(matches!(err, LayoutError::UnbalancedGraphicsState { depth: 1 }));
}

#[test]
fn test_graphics_scope_restores_state() {
    let mut doc = open_document(small_geometry()).unwrap();
    {
        let mut canvas = doc.canvas_over();
        let mut g = Graphics::begin(&mut canvas, Unit::Mm);
        g.set_line_width(1.0).move_to(0.0, 0.0).line_to(10.0, 10.0).stroke();
        g.finish();
    }
    let backend = doc.close().unwrap();
    let ops = &backend.pages[0].over;
    assert!(matches!(ops.first(), Some(DrawOp::SaveState)));
    assert!(matches!(ops.last(), Some(DrawOp::RestoreState)));
    assert!(ops.iter().any(|op| matches!(op, DrawOp::SetLineWidth(w) if (*w - 72.0 / 25.4).abs() < 1e-4)));
    // (10mm, 10mm) in document space, from the top-left of the print area
    let to = Length::mm(10.0).pt_value();
    assert!(ops.iter().any(|op| matches!(op,
        DrawOp::LineTo { x, y } if (*x - (10.0 + to)).abs() < 1e-3 && (*y - (190.0 - to)).abs() < 1e-3)));
}

#[test]
fn test_page_numbering_fills_templates_after_layout() {
    let mut doc = open_document(small_geometry()).unwrap();
    let numbering = PageNumbering::attach(
        &mut doc,
        Dimension::of(Unit::Pt, 120.0, 170.0),
        Dimension::of(Unit::Pt, 60.0, 10.0),
    )
    .unwrap();

    {
        let mut canvas = doc.canvas_over();
        canvas.new_page().unwrap();
        canvas.new_page().unwrap();
    }
    assert_eq!(numbering.borrow().total_pages(), 3);

    numbering
        .borrow_mut()
        .fill_with(|template, page, total| {
            let text = TextBlock::new(template.context(), &format!("{} / {}", page, total))?;
            text.draw_at(template, Dimension::ZERO)?;
            Ok(())
        })
        .unwrap();

    let backend = doc.close().unwrap();
    assert_eq!(backend.templates.len(), 3);
    for (index, template) in backend.templates.iter().enumerate() {
        let shown: Vec<&str> = template
            .ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::ShowText { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(shown, vec![format!("{} / 3", index + 1)]);
        assert_eq!(balance(&template.ops), 0);
    }
    for (page, template) in backend.pages.iter().zip(&backend.templates) {
        let placed = page.over.iter().any(|op| matches!(op, DrawOp::PlaceTemplate { id, .. } if *id == template.id));
        assert!(placed, "page {} does not place {}", page.number, template.id);
    }
}

#[test]
fn test_unbalanced_template_is_rejected_at_close() {
    let mut doc = open_document(small_geometry()).unwrap();
    {
        let mut canvas = doc.canvas_over();
        let mut template = canvas.create_template(Dimension::of(Unit::Pt, 10.0, 10.0)).unwrap();
        template.emit(DrawOp::RestoreState);
    }
    assert!(matches!(doc.close(), Err(LayoutError::UnbalancedGraphicsState { depth: -1 })));
}

#[test]
fn test_template_context_is_a_duplicate() {
    let mut doc = open_document(small_geometry()).unwrap();
    let mut template = doc
        .canvas_over()
        .create_template(Dimension::of(Unit::Pt, 10.0, 10.0))
        .unwrap();
    template.context_mut().set_font_size(Length::pt(20.0)).unwrap();
    let doc_size = doc.context().font().unwrap().size().pt_value();
    assert!((doc_size - 10.0).abs() < 1e-3);
}
