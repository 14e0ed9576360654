use crate::content::encode_operations;
use crate::resources::ResourceRegistry;
use lopdf::{Document, Object, ObjectId, Stream, dictionary};
use pagewright_render_core::{DocumentBackend, PageContent, PageSetup, RenderError, TemplateContent};
use std::io::Write;

/// Object graph of a document between `begin_document` and `finish`.
struct OpenDocument {
    document: Document,
    setup: PageSetup,
    pages_id: ObjectId,
    resources_id: ObjectId,
    page_ids: Vec<ObjectId>,
    registry: ResourceRegistry,
}

/// A PDF backend that builds the document in memory with `lopdf` and writes
/// it to `W` when the layout document closes.
pub struct LopdfBackend<W: Write> {
    writer: W,
    open: Option<OpenDocument>,
    finished: bool,
}

impl<W: Write> LopdfBackend<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, open: None, finished: false }
    }

    pub fn page_count(&self) -> usize {
        self.open.as_ref().map_or(0, |open| open.page_ids.len())
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Hands back the writer once the document has been written.
    pub fn into_writer(self) -> Result<W, RenderError> {
        if !self.finished {
            return Err(RenderError::Other("Document was never finished".into()));
        }
        Ok(self.writer)
    }

    fn open_mut(&mut self) -> Result<&mut OpenDocument, RenderError> {
        self.open
            .as_mut()
            .ok_or_else(|| RenderError::Other("Document not started".into()))
    }
}

impl<W: Write> DocumentBackend for LopdfBackend<W> {
    fn begin_document(&mut self, setup: &PageSetup) -> Result<(), RenderError> {
        if self.open.is_some() || self.finished {
            return Err(RenderError::Other("Document already started".into()));
        }
        let mut document = Document::with_version("1.7");
        let pages_id = document.new_object_id();
        let resources_id = document.new_object_id();
        log::debug!("Beginning PDF document, page size {}x{}pt", setup.width_pt, setup.height_pt);
        self.open = Some(OpenDocument {
            document,
            setup: *setup,
            pages_id,
            resources_id,
            page_ids: Vec::new(),
            registry: ResourceRegistry::new(),
        });
        Ok(())
    }

    fn render_page(&mut self, page: PageContent) -> Result<(), RenderError> {
        let open = self.open_mut()?;
        let mut contents = Vec::with_capacity(2);
        for ops in [&page.under, &page.over] {
            let bytes = encode_operations(ops, &mut open.document, &mut open.registry)?;
            let stream_id = open.document.add_object(Stream::new(dictionary! {}, bytes));
            contents.push(Object::Reference(stream_id));
        }

        let page_dict = dictionary! {
            "Type" => "Page",
            "Parent" => open.pages_id,
            "MediaBox" => vec![0.into(), 0.into(), open.setup.width_pt.into(), open.setup.height_pt.into()],
            "Contents" => contents,
            "Resources" => open.resources_id,
        };
        let page_id = open.document.add_object(page_dict);
        open.page_ids.push(page_id);
        log::debug!("Wrote page {} as object {:?}", page.number, page_id);
        Ok(())
    }

    fn finish(&mut self, templates: Vec<TemplateContent>) -> Result<(), RenderError> {
        let mut open = self
            .open
            .take()
            .ok_or_else(|| RenderError::Other("Document was never started with begin_document".into()))?;

        // Reserve every id up front so templates may place one another.
        for template in &templates {
            open.registry.template(&mut open.document, template.id);
        }
        for template in templates {
            let bytes = encode_operations(&template.ops, &mut open.document, &mut open.registry)?;
            let object_id = open
                .registry
                .template_object(template.id)
                .ok_or_else(|| RenderError::Other(format!("Template {} has no reserved object", template.id)))?;
            let form = Stream::new(
                dictionary! {
                    "Type" => "XObject",
                    "Subtype" => "Form",
                    "BBox" => vec![0.into(), 0.into(), template.width.into(), template.height.into()],
                    "Resources" => open.resources_id,
                },
                bytes,
            );
            open.document.objects.insert(object_id, Object::Stream(form));
        }
        for id in open.registry.template_ids() {
            let materialized = open
                .registry
                .template_object(id)
                .is_some_and(|object_id| open.document.objects.contains_key(&object_id));
            if !materialized {
                return Err(RenderError::Other(format!("Template {} was placed but never recorded", id)));
            }
        }

        open.registry.write_fonts(&mut open.document);
        let resources = open.registry.resources_dictionary();
        open.document.objects.insert(open.resources_id, Object::Dictionary(resources));

        let pages_dict = dictionary! {
            "Type" => "Pages",
            "Kids" => open.page_ids.iter().map(|id| Object::Reference(*id)).collect::<Vec<Object>>(),
            "Count" => open.page_ids.len() as i64,
        };
        open.document.objects.insert(open.pages_id, Object::Dictionary(pages_dict));

        let catalog_id = open.document.add_object(dictionary! { "Type" => "Catalog", "Pages" => open.pages_id });
        open.document.trailer.set("Root", catalog_id);

        open.document.save_to(&mut self.writer)?;
        self.writer.flush()?;
        self.finished = true;
        log::debug!("Finished PDF document with {} pages", open.page_ids.len());
        Ok(())
    }
}
