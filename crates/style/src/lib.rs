//! Shared, copy-on-write drawing resources: fonts, cell styles and the
//! drawing context that carries them from a document down to its templates.

pub mod base_font;
pub mod cell;
pub mod context;
pub mod defaults;
pub mod error;
pub mod font;
pub mod shared;

#[cfg(test)]
mod test_support;

pub use base_font::BaseFont;
pub use cell::CellStyle;
pub use context::{DrawingContext, Duplicate};
pub use defaults::{CellDefaults, ContextDefaults, DEFAULTS};
pub use error::StyleError;
pub use font::Font;
pub use shared::Shared;
