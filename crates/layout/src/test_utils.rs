use crate::LayoutError;
use crate::document::Document;
use crate::fonts::FontLibrary;
use pagewright_render_core::{DocumentBackend, DrawOp, PageContent, PageSetup, RenderError, TemplateContent};
use pagewright_style::{ContextDefaults, DrawingContext};
use pagewright_types::{Dimension, Geometry, Insets, Length, Unit};
use std::sync::Arc;

/// Keeps everything a document hands to its backend.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    pub setup: Option<PageSetup>,
    pub pages: Vec<PageContent>,
    pub templates: Vec<TemplateContent>,
    pub finished: bool,
}

impl DocumentBackend for RecordingBackend {
    fn begin_document(&mut self, setup: &PageSetup) -> Result<(), RenderError> {
        self.setup = Some(*setup);
        Ok(())
    }

    fn render_page(&mut self, page: PageContent) -> Result<(), RenderError> {
        self.pages.push(page);
        Ok(())
    }

    fn finish(&mut self, templates: Vec<TemplateContent>) -> Result<(), RenderError> {
        self.templates = templates;
        self.finished = true;
        Ok(())
    }
}

impl RecordingBackend {
    /// Text shown on a page's over layer, in emission order.
    pub fn shown_text(&self, page: usize) -> Vec<String> {
        self.pages[page]
            .over
            .iter()
            .filter_map(|op| match op {
                DrawOp::ShowText { text, .. } => Some(text.clone()),
                _ => None,
            })
            .collect()
    }
}

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A context using built-in Courier at 10pt, so every character is 6pt wide.
pub fn courier_context() -> DrawingContext {
    init_logger();
    let defaults = ContextDefaults {
        font_face: "Courier".to_string(),
        font_size_mm: 10.0 * 25.4 / 72.0,
        ..ContextDefaults::default()
    };
    DrawingContext::from_defaults(Arc::new(FontLibrary::new()), &defaults).unwrap()
}

/// A 200pt x 200pt page with 10pt margins: a 180pt square print area.
pub fn small_geometry() -> Geometry {
    Geometry::new(Dimension::of(Unit::Pt, 200.0, 200.0), Insets::uniform(Length::pt(10.0))).unwrap()
}

pub fn open_document(geometry: Geometry) -> Result<Document<RecordingBackend>, LayoutError> {
    Document::open(RecordingBackend::default(), courier_context(), geometry)
}

pub fn balance(ops: &[DrawOp]) -> i32 {
    ops.iter().map(DrawOp::state_delta).sum()
}
