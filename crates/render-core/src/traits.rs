use crate::error::RenderError;
use crate::types::{PageContent, PageSetup, TemplateContent};

/// A sink for finished pages, abstracting the output format.
///
/// Calls arrive in order: `begin_document` once, `render_page` once per page
/// in page order, then `finish` with every template recorded during layout.
/// Pages may reference templates that are only materialized by `finish`.
pub trait DocumentBackend {
    fn begin_document(&mut self, setup: &PageSetup) -> Result<(), RenderError>;

    fn render_page(&mut self, page: PageContent) -> Result<(), RenderError>;

    fn finish(&mut self, templates: Vec<TemplateContent>) -> Result<(), RenderError>;
}
