//! Probe-and-continue flow of content across pages.
//!
//! A [`Flowable`] is offered one rectangular area at a time. It draws what
//! fits, remembers where it stopped and reports back. [`flow_to_canvas`]
//! keeps offering areas, breaking pages in between, until the content is
//! exhausted.

use crate::LayoutError;
use crate::surface::DrawTarget;
use pagewright_types::{Length, Rect};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowOutcome {
    /// Nothing is left to draw.
    pub complete: bool,
    /// Something was drawn (or consumed) in this area.
    pub progressed: bool,
    /// Document-space y reached inside the area.
    pub y_line: Length,
    /// Height of the next unit that did not fit; zero once complete.
    pub needed: Length,
}

impl FlowOutcome {
    pub fn done(y_line: Length) -> Self {
        Self { complete: true, progressed: true, y_line, needed: Length::ZERO }
    }

    pub fn blocked(y_line: Length, progressed: bool, needed: Length) -> Self {
        Self { complete: false, progressed, y_line, needed }
    }
}

pub trait Flowable {
    /// Draws as much pending content as fits in `area`, never redrawing
    /// content that an earlier call already drew.
    fn flow_into(&mut self, target: &mut dyn DrawTarget, area: &Rect) -> Result<FlowOutcome, LayoutError>;
}

impl<T: Flowable + ?Sized> Flowable for &mut T {
    fn flow_into(&mut self, target: &mut dyn DrawTarget, area: &Rect) -> Result<FlowOutcome, LayoutError> {
        (**self).flow_into(target, area)
    }
}

/// A column of flowables laid out top-down.
#[derive(Default)]
pub struct ColumnFlow<'a> {
    elements: Vec<Box<dyn Flowable + 'a>>,
    current: usize,
    y_line: Length,
    progressed: bool,
    needed: Length,
}

impl<'a> ColumnFlow<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_element(&mut self, element: impl Flowable + 'a) -> &mut Self {
        self.elements.push(Box::new(element));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Flows pending elements into `area`. Returns true once all have completed.
    pub fn provide_area(&mut self, target: &mut dyn DrawTarget, area: &Rect) -> Result<bool, LayoutError> {
        let mut area = *area;
        self.y_line = area.y;
        self.progressed = false;
        self.needed = Length::ZERO;

        while let Some(element) = self.elements.get_mut(self.current) {
            let outcome = element.flow_into(target, &area)?;
            if outcome.progressed {
                self.progressed = true;
                self.y_line = outcome.y_line;
            }
            if !outcome.complete {
                self.needed = outcome.needed;
                return Ok(false);
            }
            self.current += 1;
            area = area.with_y(self.y_line);
        }
        Ok(true)
    }

    pub fn y_line(&self) -> Length {
        self.y_line
    }

    pub fn progressed(&self) -> bool {
        self.progressed
    }

    pub fn needed(&self) -> Length {
        self.needed
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowSummary {
    pub page_breaks: usize,
    pub final_y: Length,
}

/// Flows `column` onto a paginated target starting at its cursor, breaking
/// pages until everything is drawn. The cursor ends at the last y reached.
pub fn flow_to_canvas(target: &mut dyn DrawTarget, column: &mut ColumnFlow<'_>) -> Result<FlowSummary, LayoutError> {
    let canvas = target.as_paginated().ok_or(LayoutError::NotPaginated)?;
    let geometry = *canvas.geometry();
    let full_page = geometry.print_area();

    let top = canvas.vertical();
    let mut area = full_page.with_y(top);
    let mut area_is_full_page = top.is_zero();
    let mut page_breaks = 0;

    while !column.provide_area(canvas.as_draw_target(), &area)? {
        if area_is_full_page && !column.progressed() {
            return Err(LayoutError::ElementTooLarge(
                column.needed().pt_value(),
                geometry.print_height().pt_value(),
            ));
        }
        canvas.new_page()?;
        page_breaks += 1;
        log::debug!("Flow continues on page {}", canvas.page_number());
        area = full_page;
        area_is_full_page = true;
    }

    let final_y = column.y_line();
    canvas.set_vertical(final_y);
    Ok(FlowSummary { page_breaks, final_y })
}
