//! PDF document backend using lopdf.
//!
//! [`LopdfBackend`] receives finished pages from the layout engine and builds
//! an in-memory `lopdf::Document`, which is written out when the layout
//! document closes. [`ResourceRegistry`] and [`encode_operations`] are public
//! so content can also be encoded into an existing PDF.

mod content;
mod encoding;
mod renderer;
mod resources;

pub use content::encode_operations;
pub use encoding::{from_win_ansi, to_win_ansi};
pub use renderer::LopdfBackend;
pub use resources::ResourceRegistry;
