//! Page number placeholders filled in once the page count is known.

use crate::LayoutError;
use crate::document::Document;
use crate::surface::DrawTarget;
use crate::template::Template;
use pagewright_render_core::DocumentBackend;
use pagewright_types::Dimension;
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug)]
pub struct PageSlot {
    pub page_number: usize,
    pub template: Template,
}

/// Places one empty template per page at a fixed position.
#[derive(Debug)]
pub struct PageNumbering {
    position: Dimension,
    size: Dimension,
    slots: Vec<PageSlot>,
}

impl PageNumbering {
    pub fn new(position: Dimension, size: Dimension) -> Self {
        Self { position, size, slots: Vec::new() }
    }

    /// Registers a page listener on `document` that creates a slot for the
    /// current page and for every page that follows.
    pub fn attach<B: DocumentBackend>(
        document: &mut Document<B>,
        position: Dimension,
        size: Dimension,
    ) -> Result<Rc<RefCell<PageNumbering>>, LayoutError> {
        let numbering = Rc::new(RefCell::new(Self::new(position, size)));
        let handle = Rc::clone(&numbering);
        document.add_page_listener(move |scope| {
            let page_number = scope.page_number();
            handle.borrow_mut().create(&mut scope.over(), page_number)
        })?;
        Ok(numbering)
    }

    pub fn create(&mut self, target: &mut dyn DrawTarget, page_number: usize) -> Result<(), LayoutError> {
        let template = target.create_template(self.size)?;
        target.place_template(&template, self.position);
        log::debug!("Page number slot for page {} is template {}", page_number, template.id());
        self.slots.push(PageSlot { page_number, template });
        Ok(())
    }

    pub fn slots(&self) -> &[PageSlot] {
        &self.slots
    }

    pub fn slots_mut(&mut self) -> &mut [PageSlot] {
        &mut self.slots
    }

    pub fn total_pages(&self) -> usize {
        self.slots.len()
    }

    /// Calls `fill` for every slot with its page number and the page total.
    pub fn fill_with<F>(&mut self, mut fill: F) -> Result<(), LayoutError>
    where
        F: FnMut(&mut Template, usize, usize) -> Result<(), LayoutError>,
    {
        let total = self.slots.len();
        for slot in &mut self.slots {
            fill(&mut slot.template, slot.page_number, total)?;
        }
        Ok(())
    }
}
