#![allow(dead_code)]

pub mod pdf_assertions;

use lopdf::Document as LopdfDocument;
use pagewright::layout::{Document, FontLibrary, LayoutError};
use pagewright::render_lopdf::LopdfBackend;
use pagewright::style::DrawingContext;
use pagewright::types::Geometry;
use pagewright::{DeliverySlip, RenderConfig};
use std::sync::Arc;

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

/// Wrapper around a generated PDF with helper methods
pub struct GeneratedPdf {
    pub bytes: Vec<u8>,
    pub doc: LopdfDocument,
}

impl GeneratedPdf {
    /// Create a GeneratedPdf from raw bytes
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, Box<dyn std::error::Error>> {
        let doc = LopdfDocument::load_mem(&bytes)?;
        Ok(Self { bytes, doc })
    }

    /// Get the number of pages in the PDF
    pub fn page_count(&self) -> usize {
        self.doc.get_pages().len()
    }

    /// The decoded content streams of a 1-based page, concatenated
    pub fn page_content(&self, page_num: u32) -> String {
        pdf_assertions::page_content(&self.doc, page_num)
    }

    /// Save PDF to a file for manual debugging
    pub fn save_for_debug(&self, name: &str) -> std::io::Result<()> {
        std::fs::write(format!("test_output_{}.pdf", name), &self.bytes)
    }
}

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A default context over the built-in standard fonts
pub fn standard_context() -> DrawingContext {
    DrawingContext::default_context(Arc::new(FontLibrary::new())).expect("default context")
}

/// Renders the sample delivery slip with `config`
pub fn render_slip(config: &RenderConfig) -> Result<GeneratedPdf, Box<dyn std::error::Error>> {
    init_logger();
    let slip = DeliverySlip::sample(config.groups, config.rows_per_group);
    let bytes = slip.render(config, Vec::<u8>::new())?;
    GeneratedPdf::from_bytes(bytes)
}

/// Opens a document on `geometry`, lets `build` draw into it, then closes it
pub fn render_document<F>(geometry: Geometry, build: F) -> Result<GeneratedPdf, Box<dyn std::error::Error>>
where
    F: FnOnce(&mut Document<LopdfBackend<Vec<u8>>>) -> Result<(), LayoutError>,
{
    init_logger();
    let mut document = Document::open(LopdfBackend::new(Vec::<u8>::new()), standard_context(), geometry)?;
    build(&mut document)?;
    let bytes = document.close()?.into_writer()?;
    GeneratedPdf::from_bytes(bytes)
}
