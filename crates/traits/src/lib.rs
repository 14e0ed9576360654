pub mod font;
pub mod resource;

pub use font::{BackendFont, Encoding, FontBackend, FontError, FontRequest, FontStyleSet, SharedFontData};
pub use resource::{
    FilesystemResourceProvider, InMemoryResourceProvider, ResourceError, ResourceProvider,
    SharedResourceData,
};
