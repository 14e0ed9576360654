#![cfg(test)]

use crate::LayoutError;
use crate::flow::{ColumnFlow, flow_to_canvas};
use crate::image::Image;
use crate::surface::{DrawTarget, Paginated};
use crate::table::Table;
use crate::test_utils::{courier_context, open_document, small_geometry};
use pagewright_types::{Dimension, Geometry, Length, Unit};

/// One column, 100pt wide. Each single-line row is 15pt tall:
/// 10pt of text plus 0.5pt borders and 2pt padding on both sides.
fn table_with_rows(rows: usize) -> Table {
    let ctx = courier_context();
    let mut table = Table::new(&ctx, 1).unwrap();
    table.set_column_widths(&[Length::pt(100.0)]).unwrap();
    for i in 0..rows {
        table.add_text_cell(&format!("row {}", i)).unwrap();
    }
    table
}

#[test]
fn test_can_draw_is_strict() {
    let mut doc = open_document(Geometry::a4_portrait()).unwrap();
    let mut canvas = doc.canvas_over();

    canvas.set_vertical(Length::mm(252.0));
    assert!(!canvas.can_draw(Length::ZERO));

    canvas.set_vertical(Length::mm(242.0));
    assert!(!canvas.can_draw(Length::mm(10.0)));
    assert!(canvas.can_draw(Length::mm(9.99)));
}

#[test]
fn test_advance_is_a_hard_cutoff() {
    let mut doc = open_document(small_geometry()).unwrap();
    let mut canvas = doc.canvas_over();

    assert_eq!(canvas.advance(Length::pt(100.0)).unwrap(), Length::pt(100.0));
    assert_eq!(canvas.advance(Length::pt(80.0)).unwrap(), Length::pt(180.0));
    assert_eq!(canvas.page_number(), 1);

    // passing the print height starts a new page with the cursor at the top
    assert_eq!(canvas.advance(Length::pt(5.0)).unwrap(), Length::ZERO);
    assert_eq!(canvas.page_number(), 2);
}

#[test]
fn test_canvas_new_page_resets_only_its_own_layer() {
    let mut doc = open_document(small_geometry()).unwrap();
    doc.canvas_under().set_vertical(Length::pt(50.0));
    {
        let mut over = doc.canvas_over();
        over.set_vertical(Length::pt(70.0));
        over.new_page().unwrap();
        assert_eq!(over.vertical(), Length::ZERO);
    }
    assert_eq!(doc.page_number(), 2);
    assert_eq!(doc.canvas_under().vertical(), Length::pt(50.0));
}

#[test]
fn test_table_needing_three_pages_breaks_twice() {
    let mut doc = open_document(small_geometry()).unwrap();
    let mut table = table_with_rows(30);
    let summary = {
        let mut canvas = doc.canvas_over();
        let summary = table.add_to_canvas(&mut canvas).unwrap();
        assert_eq!(canvas.vertical(), summary.final_y);
        summary
    };

    assert_eq!(summary.page_breaks, 2);
    assert!(summary.final_y.is_positive());
    assert!(summary.final_y < small_geometry().print_height());
    assert!((summary.final_y.pt_value() - 90.0).abs() < 0.01);
    assert_eq!(doc.page_number(), 3);
}

#[test]
fn test_table_that_fits_does_not_break() {
    let mut doc = open_document(small_geometry()).unwrap();
    let mut table = table_with_rows(5);
    table.set_spacing_before(Length::pt(10.0)).set_spacing_after(Length::pt(3.0));
    let summary = table.add_to_canvas(&mut doc.canvas_over()).unwrap();
    assert_eq!(summary.page_breaks, 0);
    assert!((summary.final_y.pt_value() - 88.0).abs() < 0.01);
    assert_eq!(doc.page_number(), 1);
}

#[test]
fn test_flow_starting_low_on_the_page_moves_to_the_next() {
    let mut doc = open_document(small_geometry()).unwrap();
    let mut table = table_with_rows(1);
    let mut canvas = doc.canvas_over();
    canvas.set_vertical(Length::pt(170.0));
    let summary = table.add_to_canvas(&mut canvas).unwrap();
    assert_eq!(summary.page_breaks, 1);
    assert!((summary.final_y.pt_value() - 15.0).abs() < 0.01);
}

#[test]
fn test_spacing_before_moves_with_a_table_that_did_not_fit() {
    let mut doc = open_document(small_geometry()).unwrap();
    let mut table = table_with_rows(1);
    table.set_spacing_before(Length::pt(10.0));
    let mut canvas = doc.canvas_over();
    canvas.set_vertical(Length::pt(170.0));
    let summary = table.add_to_canvas(&mut canvas).unwrap();
    assert_eq!(summary.page_breaks, 1);
    // 10pt of spacing, then the 15pt row, at the top of page 2
    assert!((summary.final_y.pt_value() - 25.0).abs() < 0.01);
}

#[test]
fn test_image_flows_again_after_reset() {
    let mut doc = open_document(small_geometry()).unwrap();
    let mut image = Image::from_rgb(2, 2, vec![0; 12]).unwrap();
    image.set_draw_size(Dimension::of(Unit::Pt, 40.0, 50.0));
    {
        let mut canvas = doc.canvas_over();
        assert_eq!(image.add_to_canvas(&mut canvas).unwrap().final_y, Length::pt(50.0));
        assert_eq!(image.add_to_canvas(&mut canvas).unwrap().final_y, Length::pt(100.0));
    }
    let backend = doc.close().unwrap();
    let placed = backend.pages[0]
        .over
        .iter()
        .filter(|op| matches!(op, pagewright_render_core::DrawOp::PlaceImage { .. }))
        .count();
    assert_eq!(placed, 2);
}

#[test]
fn test_row_taller_than_a_page_is_an_error() {
    let mut doc = open_document(small_geometry()).unwrap();
    let ctx = courier_context();
    let mut table = Table::new(&ctx, 1).unwrap();
    table.set_column_widths(&[Length::pt(100.0)]).unwrap();
    table.add_text_cell(&vec!["line"; 20].join("\n")).unwrap();

    let err = table.add_to_canvas(&mut doc.canvas_over()).unwrap_err();
    match err {
        LayoutError::ElementTooLarge(needed, page) => {
            assert!(needed > page);
            assert!((page - 180.0).abs() < 1e-3);
        }
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn test_oversized_row_after_content_breaks_once_then_fails() {
    let mut doc = open_document(small_geometry()).unwrap();
    let ctx = courier_context();
    let mut table = Table::new(&ctx, 1).unwrap();
    table.set_column_widths(&[Length::pt(100.0)]).unwrap();
    table.add_text_cell("fits").unwrap();
    table.add_text_cell(&vec!["line"; 20].join("\n")).unwrap();

    let result = table.add_to_canvas(&mut doc.canvas_over());
    assert!(matches!(result, Err(LayoutError::ElementTooLarge(..))));
    assert_eq!(doc.page_number(), 2);
}

#[test]
fn test_flow_needs_a_paginated_target() {
    let mut doc = open_document(small_geometry()).unwrap();
    let mut canvas = doc.canvas_over();
    let mut template = canvas.create_template(Dimension::of(Unit::Pt, 50.0, 50.0)).unwrap();
    let mut table = table_with_rows(1);
    assert!(matches!(table.add_to_canvas(&mut template), Err(LayoutError::NotPaginated)));
}

#[test]
fn test_column_flows_elements_in_sequence() {
    let mut doc = open_document(small_geometry()).unwrap();
    let mut image = Image::from_rgb(2, 2, vec![0; 12]).unwrap();
    image.set_draw_size(Dimension::of(Unit::Pt, 40.0, 100.0));
    let mut table = table_with_rows(6);

    let mut canvas = doc.canvas_over();
    let mut column = ColumnFlow::new();
    column.add_element(&mut image).add_element(&mut table);
    let summary = flow_to_canvas(&mut canvas, &mut column).unwrap();

    // 100pt image leaves room for 5 rows; the sixth goes to page 2
    assert_eq!(summary.page_breaks, 1);
    assert!((summary.final_y.pt_value() - 15.0).abs() < 0.01);
}

#[test]
fn test_empty_column_completes_immediately() {
    let mut doc = open_document(small_geometry()).unwrap();
    let mut canvas = doc.canvas_over();
    canvas.set_vertical(Length::pt(40.0));
    let mut column = ColumnFlow::new();
    assert!(column.is_empty());
    let summary = flow_to_canvas(&mut canvas, &mut column).unwrap();
    assert_eq!(summary.page_breaks, 0);
    assert_eq!(summary.final_y, Length::pt(40.0));
}
