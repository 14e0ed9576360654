//! Drawing layout content onto the pages of an existing PDF.

use crate::error::ComposerError;
use crate::{inherited_attribute, overlay_content, page_ids, underlay_content};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, dictionary};
use pagewright_layout::{DrawTarget, LayoutError, Template, TemplateStore, check_balance};
use pagewright_render_core::{DrawOp, Layer};
use pagewright_render_lopdf::{ResourceRegistry, encode_operations};
use pagewright_style::DrawingContext;
use pagewright_types::{Dimension, Geometry};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::io::Write;
use std::rc::Rc;

/// Resource name prefix for stamped content, kept apart from the page's own names.
const RESOURCE_PREFIX: &str = "PW";

#[derive(Debug, Default)]
struct PageStamp {
    under: Vec<DrawOp>,
    over: Vec<DrawOp>,
}

/// Opens an existing PDF and records draw operations against its pages.
///
/// Nothing touches the document until [`Stamper::finish`], which encodes the
/// recorded content and adds it beneath or on top of each stamped page.
pub struct Stamper {
    document: Document,
    page_ids: Vec<ObjectId>,
    geometry: Geometry,
    context: DrawingContext,
    stamps: BTreeMap<usize, PageStamp>,
    templates: Rc<RefCell<TemplateStore>>,
}

impl Stamper {
    /// Parses `bytes`. Every page is assumed to have `geometry`.
    pub fn load(context: DrawingContext, geometry: Geometry, bytes: &[u8]) -> Result<Self, ComposerError> {
        let document = Document::load_mem(bytes)?;
        let page_ids = page_ids(&document);
        log::debug!("Loaded {} pages for stamping", page_ids.len());
        Ok(Self {
            document,
            page_ids,
            geometry,
            context,
            stamps: BTreeMap::new(),
            templates: Rc::new(RefCell::new(TemplateStore::new())),
        })
    }

    pub fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    pub fn context_mut(&mut self) -> &mut DrawingContext {
        &mut self.context
    }

    /// A drawing surface for one layer of the 1-based `page_number`.
    pub fn surface(&mut self, page_number: usize, layer: Layer) -> Result<StampSurface<'_>, ComposerError> {
        if page_number == 0 || page_number > self.page_ids.len() {
            return Err(ComposerError::PageOutOfRange { page: page_number, count: self.page_ids.len() });
        }
        Ok(StampSurface { stamper: self, page_number, layer })
    }

    /// Adds every recorded stamp to its page and writes the document to `writer`.
    pub fn finish<W: Write>(mut self, mut writer: W) -> Result<W, ComposerError> {
        let mut registry = ResourceRegistry::with_prefix(RESOURCE_PREFIX);
        let resources_id = self.document.new_object_id();

        let templates = self.templates.borrow_mut().drain()?;
        for template in &templates {
            registry.template(&mut self.document, template.id);
        }
        for template in templates {
            let bytes = encode_operations(&template.ops, &mut self.document, &mut registry)?;
            let object_id = registry
                .template_object(template.id)
                .ok_or_else(|| ComposerError::Other(format!("Template {} has no reserved object", template.id)))?;
            let form = Stream::new(
                dictionary! {
                    "Type" => "XObject",
                    "Subtype" => "Form",
                    "BBox" => vec![0.into(), 0.into(), template.width.into(), template.height.into()],
                    "Resources" => resources_id,
                },
                bytes,
            );
            self.document.objects.insert(object_id, Object::Stream(form));
        }

        let stamps = std::mem::take(&mut self.stamps);
        let mut stamped = Vec::with_capacity(stamps.len());
        for (page_number, stamp) in stamps {
            let page_id = self.page_ids[page_number - 1];
            if !stamp.over.is_empty() {
                check_balance(&stamp.over)?;
                let bytes = encode_operations(&stamp.over, &mut self.document, &mut registry)?;
                // isolate the page's own graphics state from the overlay
                underlay_content(&mut self.document, page_id, b"q\n".to_vec())?;
                overlay_content(&mut self.document, page_id, b"\nQ\n".to_vec())?;
                overlay_content(&mut self.document, page_id, wrap_in_state(bytes))?;
            }
            if !stamp.under.is_empty() {
                check_balance(&stamp.under)?;
                let bytes = encode_operations(&stamp.under, &mut self.document, &mut registry)?;
                underlay_content(&mut self.document, page_id, wrap_in_state(bytes))?;
            }
            stamped.push(page_id);
            log::debug!("Stamped page {}", page_number);
        }

        registry.write_fonts(&mut self.document);
        self.document
            .objects
            .insert(resources_id, Object::Dictionary(registry.resources_dictionary()));
        let additions = registry.resources_dictionary();
        for page_id in stamped {
            merge_page_resources(&mut self.document, page_id, &additions)?;
        }

        self.document.save_to(&mut writer)?;
        writer.flush()?;
        Ok(writer)
    }
}

fn wrap_in_state(bytes: Vec<u8>) -> Vec<u8> {
    let mut wrapped = Vec::with_capacity(bytes.len() + 6);
    wrapped.extend_from_slice(b"q\n");
    wrapped.extend(bytes);
    wrapped.extend_from_slice(b"\nQ\n");
    wrapped
}

fn resolve_dictionary(doc: &Document, object: &Object) -> Result<Dictionary, ComposerError> {
    match object {
        Object::Reference(id) => Ok(doc.get_dictionary(*id)?.clone()),
        Object::Dictionary(dict) => Ok(dict.clone()),
        other => Err(ComposerError::Other(format!("Expected a dictionary, found {:?}", other))),
    }
}

/// Gives `page_id` its own resources dictionary: its current (possibly
/// inherited) resources with `additions` merged in per category.
fn merge_page_resources(doc: &mut Document, page_id: ObjectId, additions: &Dictionary) -> Result<(), ComposerError> {
    let mut resources = match inherited_attribute(doc, page_id, b"Resources")? {
        Some(object) => resolve_dictionary(doc, &object)?,
        None => Dictionary::new(),
    };
    for (category, entries) in additions.iter() {
        let Ok(entries) = entries.as_dict() else {
            continue;
        };
        let mut merged = match resources.get(category) {
            Ok(existing) => resolve_dictionary(doc, existing)?,
            Err(_) => Dictionary::new(),
        };
        for (name, value) in entries.iter() {
            merged.set(name.clone(), value.clone());
        }
        resources.set(category.clone(), Object::Dictionary(merged));
    }
    doc.get_object_mut(page_id)?
        .as_dict_mut()?
        .set("Resources", Object::Dictionary(resources));
    Ok(())
}

/// One layer of one page of a [`Stamper`].
pub struct StampSurface<'a> {
    stamper: &'a mut Stamper,
    page_number: usize,
    layer: Layer,
}

impl StampSurface<'_> {
    pub fn page_number(&self) -> usize {
        self.page_number
    }

    pub fn layer(&self) -> Layer {
        self.layer
    }

    pub fn context_mut(&mut self) -> &mut DrawingContext {
        &mut self.stamper.context
    }
}

impl DrawTarget for StampSurface<'_> {
    fn geometry(&self) -> &Geometry {
        &self.stamper.geometry
    }

    fn context(&self) -> &DrawingContext {
        &self.stamper.context
    }

    fn emit(&mut self, op: DrawOp) {
        let stamp = self.stamper.stamps.entry(self.page_number).or_default();
        match self.layer {
            Layer::Over => stamp.over.push(op),
            Layer::Under => stamp.under.push(op),
        }
    }

    fn create_template(&mut self, size: Dimension) -> Result<Template, LayoutError> {
        Template::create(&self.stamper.templates, &self.stamper.context, size)
    }
}
