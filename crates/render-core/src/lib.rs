//! Core rendering abstractions for paginated output.
//!
//! This crate provides the fundamental traits and types used by rendering backends:
//! - `DrawOp`, the closed set of backend-space drawing commands
//! - `DocumentBackend` trait for abstracting page and template output
//! - Error types for rendering operations
//! - Font naming shared by font backends

mod error;
mod traits;
mod types;
pub mod utils;

pub use error::RenderError;
pub use traits::DocumentBackend;
pub use types::{DrawOp, ImageData, Layer, PageContent, PageSetup, TemplateContent, TemplateId};
