use pagewright_layout::LayoutError;
use pagewright_pdf_composer::ComposerError;
use pagewright_render_core::RenderError;
use pagewright_style::StyleError;
use pagewright_traits::{FontError, ResourceError};
use pagewright_types::GeometryError;
use thiserror::Error;

/// Top-level error for building and writing a document.
#[derive(Error, Debug)]
pub enum PagewrightError {
    #[error("Layout failed: {0}")]
    Layout(#[from] LayoutError),

    #[error("Rendering failed: {0}")]
    Render(#[from] RenderError),

    #[error("Composing failed: {0}")]
    Composer(#[from] ComposerError),

    #[error("Style error: {0}")]
    Style(#[from] StyleError),

    #[error("Invalid page geometry: {0}")]
    Geometry(#[from] GeometryError),

    #[error("Font error: {0}")]
    Font(#[from] FontError),

    #[error("Resource error: {0}")]
    Resource(#[from] ResourceError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration is invalid: {0}")]
    Config(#[from] serde_json::Error),
}
