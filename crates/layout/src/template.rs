//! Deferred off-page buffers.
//!
//! A template can be placed on pages before anything is drawn into it. Its
//! content is collected in the document's [`TemplateStore`] and handed to the
//! backend only when the document closes.

use crate::LayoutError;
use crate::surface::DrawTarget;
use pagewright_render_core::{DrawOp, TemplateContent, TemplateId};
use pagewright_style::DrawingContext;
use pagewright_types::{Dimension, Geometry};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

#[derive(Debug, Default)]
pub struct TemplateStore {
    next_id: u32,
    entries: BTreeMap<TemplateId, TemplateContent>,
}

impl TemplateStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate(&mut self, geometry: &Geometry) -> TemplateId {
        self.next_id += 1;
        let id = TemplateId(self.next_id);
        let size = geometry.size();
        self.entries.insert(
            id,
            TemplateContent { id, width: size.x.pt_value(), height: size.y.pt_value(), ops: Vec::new() },
        );
        log::debug!("Allocated template {} ({})", id, geometry);
        id
    }

    /// Records `op` for template `id`. Ops for a template no longer in the
    /// store (drained when its document closed) are dropped with a warning.
    fn push(&mut self, id: TemplateId, op: DrawOp) -> bool {
        match self.entries.get_mut(&id) {
            Some(entry) => {
                entry.ops.push(op);
                true
            }
            None => {
                log::warn!("Template {} is no longer open; dropping {:?}", id, op);
                false
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Removes every template, checking that each one's graphics state is balanced.
    pub fn drain(&mut self) -> Result<Vec<TemplateContent>, LayoutError> {
        let entries = std::mem::take(&mut self.entries);
        entries
            .into_values()
            .map(|content| {
                check_balance(&content.ops)?;
                Ok(content)
            })
            .collect()
    }
}

/// Fails unless every SaveState is matched by a later RestoreState.
pub fn check_balance(ops: &[DrawOp]) -> Result<(), LayoutError> {
    let mut depth = 0;
    for op in ops {
        depth += op.state_delta();
        if depth < 0 {
            return Err(LayoutError::UnbalancedGraphicsState { depth });
        }
    }
    if depth != 0 {
        return Err(LayoutError::UnbalancedGraphicsState { depth });
    }
    Ok(())
}

pub struct Template {
    id: TemplateId,
    geometry: Geometry,
    context: DrawingContext,
    store: Rc<RefCell<TemplateStore>>,
}

impl Template {
    /// Allocates a template of `size` in `store`, drawing with a duplicate of `context`.
    pub fn create(
        store: &Rc<RefCell<TemplateStore>>,
        context: &DrawingContext,
        size: Dimension,
    ) -> Result<Self, LayoutError> {
        let geometry = Geometry::template(size)?;
        let id = store.borrow_mut().allocate(&geometry);
        Ok(Self { id, geometry, context: context.duplicate(), store: Rc::clone(store) })
    }

    pub fn id(&self) -> TemplateId {
        self.id
    }

    pub fn size(&self) -> Dimension {
        self.geometry.size()
    }

    pub fn context_mut(&mut self) -> &mut DrawingContext {
        &mut self.context
    }
}

impl std::fmt::Debug for Template {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Template")
            .field("id", &self.id)
            .field("geometry", &self.geometry)
            .finish()
    }
}

impl DrawTarget for Template {
    fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    fn context(&self) -> &DrawingContext {
        &self.context
    }

    fn emit(&mut self, op: DrawOp) {
        let _ = self.store.borrow_mut().push(self.id, op);
    }

    fn create_template(&mut self, size: Dimension) -> Result<Template, LayoutError> {
        Template::create(&self.store, &self.context, size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::courier_context;
    use pagewright_types::Unit;

    #[test]
    fn test_drawing_after_drain_is_not_recorded() {
        let _ = env_logger::builder().is_test(true).try_init();
        let store = Rc::new(RefCell::new(TemplateStore::new()));
        let mut template = Template::create(&store, &courier_context(), Dimension::of(Unit::Pt, 30.0, 10.0)).unwrap();
        template.emit(DrawOp::Fill);

        let drained = store.borrow_mut().drain().unwrap();
        assert_eq!(drained.len(), 1);
        assert_eq!(drained[0].ops.len(), 1);

        template.emit(DrawOp::Stroke);
        assert!(store.borrow().is_empty());
        assert!(!store.borrow_mut().push(template.id(), DrawOp::Fill));
    }

    #[test]
    fn test_drain_rejects_unbalanced_state() {
        let store = Rc::new(RefCell::new(TemplateStore::new()));
        let mut template = Template::create(&store, &courier_context(), Dimension::of(Unit::Pt, 30.0, 10.0)).unwrap();
        template.emit(DrawOp::SaveState);
        assert!(matches!(
            store.borrow_mut().drain(),
            Err(LayoutError::UnbalancedGraphicsState { depth: 1 })
        ));
    }
}
