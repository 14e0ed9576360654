//! The drawing interfaces shared by canvases, layer views and templates.

use crate::LayoutError;
use crate::template::Template;
use pagewright_render_core::DrawOp;
use pagewright_style::DrawingContext;
use pagewright_types::{Dimension, Geometry, Length};

/// Anything draw operations can be issued against.
pub trait DrawTarget {
    fn geometry(&self) -> &Geometry;

    fn context(&self) -> &DrawingContext;

    /// Records one backend-space operation.
    fn emit(&mut self, op: DrawOp);

    /// Creates a deferred template of `size`. Its context is a duplicate of this target's.
    fn create_template(&mut self, size: Dimension) -> Result<Template, LayoutError>;

    /// Places `template` with its top-left corner at `position` (document space).
    fn place_template(&mut self, template: &Template, position: Dimension) {
        let anchor = self
            .geometry()
            .to_backend_xy(position.x, position.y + template.geometry().size().y);
        self.emit(DrawOp::PlaceTemplate { id: template.id(), x: anchor.x, y: anchor.y });
    }

    /// The paginated view of this target, if it has one.
    fn as_paginated(&mut self) -> Option<&mut dyn Paginated> {
        None
    }
}

/// A target with a vertical cursor that breaks pages.
pub trait Paginated: DrawTarget {
    fn vertical(&self) -> Length;

    fn set_vertical(&mut self, y: Length);

    fn page_number(&self) -> usize;

    /// Ends the current page and resets this cursor to the top.
    fn new_page(&mut self) -> Result<(), LayoutError>;

    fn as_draw_target(&mut self) -> &mut dyn DrawTarget;

    /// Moves the cursor down by `delta`, breaking the page once it passes the
    /// print height. The cursor restarts at 0 on the new page.
    fn advance(&mut self, delta: Length) -> Result<Length, LayoutError> {
        let moved = self.vertical() + delta;
        self.set_vertical(moved);
        if moved > self.geometry().print_height() {
            log::debug!("Cursor {} passed the print height, breaking page", moved);
            self.new_page()?;
        }
        Ok(self.vertical())
    }

    /// True iff `height` fits strictly inside the space left below the cursor.
    fn can_draw(&self, height: Length) -> bool {
        (self.geometry().print_height() - self.vertical() - height).is_positive()
    }
}
