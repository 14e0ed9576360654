use pagewright_layout::LayoutError;
use pagewright_render_core::RenderError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ComposerError {
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("Layout error: {0}")]
    Layout(#[from] LayoutError),

    #[error("Nothing to compose: no documents were added.")]
    Empty,

    #[error("Page {page} is out of range; the document has {count} pages.")]
    PageOutOfRange { page: usize, count: usize },

    #[error("{0}")]
    Other(String),
}
