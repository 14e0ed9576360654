use crate::LayoutError;
use crate::document::Document;
use crate::surface::{DrawTarget, Paginated};
use crate::template::Template;
use pagewright_render_core::{DocumentBackend, DrawOp, Layer};
use pagewright_style::DrawingContext;
use pagewright_types::{Dimension, Geometry, Length};

/// A mutable view of one layer of a [`Document`], with a page-bounded cursor.
pub struct Canvas<'d, B: DocumentBackend> {
    doc: &'d mut Document<B>,
    layer: Layer,
}

impl<'d, B: DocumentBackend> Canvas<'d, B> {
    pub(crate) fn new(doc: &'d mut Document<B>, layer: Layer) -> Self {
        Self { doc, layer }
    }

    pub fn layer(&self) -> Layer {
        self.layer
    }

    pub fn context_mut(&mut self) -> &mut DrawingContext {
        self.doc.context_mut()
    }
}

impl<B: DocumentBackend> DrawTarget for Canvas<'_, B> {
    fn geometry(&self) -> &Geometry {
        self.doc.geometry()
    }

    fn context(&self) -> &DrawingContext {
        self.doc.context()
    }

    fn emit(&mut self, op: DrawOp) {
        self.doc.state.layer_mut(self.layer).ops.push(op);
    }

    fn create_template(&mut self, size: Dimension) -> Result<Template, LayoutError> {
        self.doc.state.create_template(size)
    }

    fn as_paginated(&mut self) -> Option<&mut dyn Paginated> {
        Some(self)
    }
}

impl<B: DocumentBackend> Paginated for Canvas<'_, B> {
    fn vertical(&self) -> Length {
        self.doc.state.layer(self.layer).vertical
    }

    fn set_vertical(&mut self, y: Length) {
        self.doc.state.layer_mut(self.layer).vertical = y;
    }

    fn page_number(&self) -> usize {
        self.doc.page_number()
    }

    fn new_page(&mut self) -> Result<(), LayoutError> {
        self.doc.new_page()?;
        self.set_vertical(Length::ZERO);
        Ok(())
    }

    fn as_draw_target(&mut self) -> &mut dyn DrawTarget {
        self
    }
}
