//! The paginated document: page state, page-break listeners and the backend.

use crate::LayoutError;
use crate::canvas::Canvas;
use crate::surface::DrawTarget;
use crate::template::{Template, TemplateStore, check_balance};
use pagewright_render_core::{DocumentBackend, DrawOp, Layer, PageContent, PageSetup};
use pagewright_style::DrawingContext;
use pagewright_types::{Dimension, Geometry, Length};
use std::cell::RefCell;
use std::rc::Rc;

/// Observer invoked once on registration and again after every page break.
pub type PageListener = Box<dyn FnMut(&mut PageScope<'_>) -> Result<(), LayoutError>>;

#[derive(Debug, Default)]
pub(crate) struct LayerBuffer {
    pub(crate) ops: Vec<DrawOp>,
    pub(crate) vertical: Length,
}

#[derive(Debug)]
pub(crate) struct PageState {
    pub(crate) geometry: Geometry,
    pub(crate) context: DrawingContext,
    pub(crate) page_number: usize,
    pub(crate) over: LayerBuffer,
    pub(crate) under: LayerBuffer,
    pub(crate) templates: Rc<RefCell<TemplateStore>>,
}

impl PageState {
    pub(crate) fn layer(&self, layer: Layer) -> &LayerBuffer {
        match layer {
            Layer::Over => &self.over,
            Layer::Under => &self.under,
        }
    }

    pub(crate) fn layer_mut(&mut self, layer: Layer) -> &mut LayerBuffer {
        match layer {
            Layer::Over => &mut self.over,
            Layer::Under => &mut self.under,
        }
    }

    fn take_page(&mut self) -> Result<PageContent, LayoutError> {
        check_balance(&self.under.ops)?;
        check_balance(&self.over.ops)?;
        Ok(PageContent {
            number: self.page_number,
            under: std::mem::take(&mut self.under.ops),
            over: std::mem::take(&mut self.over.ops),
        })
    }

    pub(crate) fn create_template(&self, size: Dimension) -> Result<Template, LayoutError> {
        Template::create(&self.templates, &self.context, size)
    }
}

pub struct Document<B: DocumentBackend> {
    backend: B,
    pub(crate) state: PageState,
    listeners: Vec<PageListener>,
}

impl<B: DocumentBackend> Document<B> {
    /// Begins a backend document sized to `geometry`, positioned on page 1.
    pub fn open(mut backend: B, context: DrawingContext, geometry: Geometry) -> Result<Self, LayoutError> {
        let size = geometry.size();
        backend.begin_document(&PageSetup { width_pt: size.x.pt_value(), height_pt: size.y.pt_value() })?;
        log::debug!("Opened document, geometry {}", geometry);
        Ok(Self {
            backend,
            state: PageState {
                geometry,
                context,
                page_number: 1,
                over: LayerBuffer::default(),
                under: LayerBuffer::default(),
                templates: Rc::new(RefCell::new(TemplateStore::new())),
            },
            listeners: Vec::new(),
        })
    }

    pub fn geometry(&self) -> &Geometry {
        &self.state.geometry
    }

    pub fn context(&self) -> &DrawingContext {
        &self.state.context
    }

    pub fn context_mut(&mut self) -> &mut DrawingContext {
        &mut self.state.context
    }

    pub fn page_number(&self) -> usize {
        self.state.page_number
    }

    pub fn canvas_over(&mut self) -> Canvas<'_, B> {
        Canvas::new(self, Layer::Over)
    }

    pub fn canvas_under(&mut self) -> Canvas<'_, B> {
        Canvas::new(self, Layer::Under)
    }

    /// Flushes the current page, moves to the next and notifies the listeners.
    /// Layer cursors are left alone; each canvas resets its own.
    pub fn new_page(&mut self) -> Result<(), LayoutError> {
        let page = self.state.take_page()?;
        self.backend.render_page(page)?;
        self.state.page_number += 1;
        log::debug!("Started page {}", self.state.page_number);
        self.notify_listeners()
    }

    /// Registers `listener` and runs it immediately for the current page.
    pub fn add_page_listener<F>(&mut self, listener: F) -> Result<(), LayoutError>
    where
        F: FnMut(&mut PageScope<'_>) -> Result<(), LayoutError> + 'static,
    {
        let mut listener: PageListener = Box::new(listener);
        listener(&mut PageScope { state: &mut self.state })?;
        self.listeners.push(listener);
        Ok(())
    }

    fn notify_listeners(&mut self) -> Result<(), LayoutError> {
        for listener in self.listeners.iter_mut() {
            listener(&mut PageScope { state: &mut self.state })?;
        }
        Ok(())
    }

    /// Flushes the last page, materializes every template and returns the backend.
    pub fn close(mut self) -> Result<B, LayoutError> {
        let page = self.state.take_page()?;
        self.backend.render_page(page)?;
        let templates = self.state.templates.borrow_mut().drain()?;
        log::debug!(
            "Closing document after {} pages, {} templates",
            self.state.page_number,
            templates.len()
        );
        self.backend.finish(templates)?;
        Ok(self.backend)
    }
}

/// What a page listener may touch: the fresh page's layers, never the page flow.
pub struct PageScope<'a> {
    state: &'a mut PageState,
}

impl PageScope<'_> {
    pub fn page_number(&self) -> usize {
        self.state.page_number
    }

    pub fn geometry(&self) -> &Geometry {
        &self.state.geometry
    }

    pub fn context(&self) -> &DrawingContext {
        &self.state.context
    }

    pub fn over(&mut self) -> LayerSurface<'_> {
        LayerSurface { state: &mut *self.state, layer: Layer::Over }
    }

    pub fn under(&mut self) -> LayerSurface<'_> {
        LayerSurface { state: &mut *self.state, layer: Layer::Under }
    }
}

/// A non-paginated view of one layer of the current page.
pub struct LayerSurface<'a> {
    state: &'a mut PageState,
    layer: Layer,
}

impl LayerSurface<'_> {
    pub fn layer(&self) -> Layer {
        self.layer
    }
}

impl DrawTarget for LayerSurface<'_> {
    fn geometry(&self) -> &Geometry {
        &self.state.geometry
    }

    fn context(&self) -> &DrawingContext {
        &self.state.context
    }

    fn emit(&mut self, op: DrawOp) {
        self.state.layer_mut(self.layer).ops.push(op);
    }

    fn create_template(&mut self, size: Dimension) -> Result<Template, LayoutError> {
        self.state.create_template(size)
    }
}
