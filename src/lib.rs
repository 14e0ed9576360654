//! Paginated document layout on top of a PDF backend.
//!
//! The member crates are re-exported under short names. The root adds a JSON
//! [`RenderConfig`] and a [`DeliverySlip`] document that exercises text blocks,
//! graphics, images, templates and multi-page tables together.

pub mod config;
pub mod error;
pub mod slip;

pub use pagewright_layout as layout;
pub use pagewright_pdf_composer as composer;
pub use pagewright_render_core as render_core;
pub use pagewright_render_lopdf as render_lopdf;
pub use pagewright_style as style;
pub use pagewright_traits as traits;
pub use pagewright_types as types;

pub use config::{MarginsConfig, PageSetupConfig, RenderConfig};
pub use error::PagewrightError;
pub use slip::{DeliverySlip, SalesGroup, SlipLine};
