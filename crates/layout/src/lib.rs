use pagewright_render_core::RenderError;
use pagewright_style::StyleError;
use pagewright_traits::FontError;
use pagewright_types::GeometryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LayoutError {
    #[error("Element has a height of {0:.2} which exceeds the total page content height of {1:.2}.")]
    ElementTooLarge(f32, f32),
    #[error("Render error: {0}")]
    Render(#[from] RenderError),
    #[error("Style error: {0}")]
    Style(#[from] StyleError),
    #[error("Font error: {0}")]
    Font(#[from] FontError),
    #[error("Geometry error: {0}")]
    Geometry(#[from] GeometryError),
    #[error("Flow requires a paginated canvas.")]
    NotPaginated,
    #[error("Column mismatch: expected {expected} values, got {got}.")]
    ColumnMismatch { expected: usize, got: usize },
    #[error("Invalid column widths: {0}")]
    InvalidColumnWidths(String),
    #[error("Unbalanced graphics state: depth {depth} at end of content.")]
    UnbalancedGraphicsState { depth: i32 },
    #[error("Image error: {0}")]
    Image(String),
    #[error("Generic layout error: {0}")]
    Generic(String),
}

pub mod canvas;
pub mod document;
pub mod flow;
pub mod fonts;
pub mod graphics;
pub mod image;
pub mod page_numbering;
pub mod paragraph;
pub mod surface;
pub mod table;
pub mod template;
pub mod text_block;
pub mod util;

pub use self::canvas::Canvas;
pub use self::document::{Document, LayerSurface, PageListener, PageScope};
pub use self::flow::{ColumnFlow, FlowOutcome, FlowSummary, Flowable, flow_to_canvas};
pub use self::fonts::FontLibrary;
pub use self::graphics::Graphics;
pub use self::image::Image;
pub use self::page_numbering::{PageNumbering, PageSlot};
pub use self::paragraph::Paragraph;
pub use self::surface::{DrawTarget, Paginated};
pub use self::table::{Cell, CellContent, Table};
pub use self::template::{Template, TemplateStore, check_balance};
pub use self::text_block::{FoldedLine, FoldedText, TextBlock, WrapMode};
pub use self::util::format_price;

#[cfg(test)]
mod document_test;
#[cfg(test)]
mod flow_test;
#[cfg(test)]
mod test_utils;
