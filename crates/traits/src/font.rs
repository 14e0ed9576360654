//! Font collaborator interfaces.
//!
//! The layout engine never reads font files itself. It asks a [`FontBackend`]
//! for a measurable [`BackendFont`] and hands that font to the rendering
//! backend inside draw operations.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::sync::Arc;
use thiserror::Error;

/// Raw font file bytes, shared between the measuring side and the writer.
pub type SharedFontData = Arc<Vec<u8>>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FontError {
    #[error("Font not found: {0}")]
    NotFound(String),

    #[error("Invalid font data: {0}")]
    InvalidFont(String),

    #[error("Font '{face}' cannot be used with encoding {encoding:?}")]
    UnsupportedEncoding { face: String, encoding: Encoding },
}

/// How text shown with a font is turned into bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Encoding {
    /// Single-byte Windows-1252. Works with the standard fonts.
    #[default]
    WinAnsi,
    /// Two-byte glyph ids of an embedded TrueType program. Covers any
    /// character the font has a glyph for, CJK included.
    IdentityH,
}

/// Bold/italic/underline bits carried by a font independently of its face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct FontStyleSet {
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
    #[serde(default)]
    pub underline: bool,
}

impl FontStyleSet {
    pub const PLAIN: FontStyleSet = FontStyleSet { bold: false, italic: false, underline: false };
    pub const BOLD: FontStyleSet = FontStyleSet { bold: true, italic: false, underline: false };
    pub const ITALIC: FontStyleSet = FontStyleSet { bold: false, italic: true, underline: false };
    pub const BOLD_ITALIC: FontStyleSet = FontStyleSet { bold: true, italic: true, underline: false };

    pub fn with_underline(mut self, underline: bool) -> Self {
        self.underline = underline;
        self
    }

    /// The part of the style that selects a different font program.
    /// Underline is drawn, not looked up.
    pub fn face_variant(self) -> FontStyleSet {
        self.with_underline(false)
    }
}

/// Everything needed to instantiate one backend font.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FontRequest {
    pub face: String,
    pub encoding: Encoding,
    pub embedded: bool,
    pub style: FontStyleSet,
}

impl FontRequest {
    pub fn new(face: impl Into<String>) -> Self {
        Self {
            face: face.into(),
            encoding: Encoding::default(),
            embedded: false,
            style: FontStyleSet::PLAIN,
        }
    }

    pub fn with_style(mut self, style: FontStyleSet) -> Self {
        self.style = style;
        self
    }

    pub fn with_encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn with_embedded(mut self, embedded: bool) -> Self {
        self.embedded = embedded;
        self
    }
}

/// A measurable font resource.
///
/// Widths are in glyph space units (1/1000 em), the convention of PDF font
/// metrics.
pub trait BackendFont: Send + Sync + Debug {
    fn postscript_name(&self) -> &str;

    fn glyph_width(&self, ch: char) -> u16;

    fn ascent(&self) -> i16;

    fn descent(&self) -> i16;

    /// Font program bytes when the font can be embedded.
    fn font_data(&self) -> Option<SharedFontData> {
        None
    }

    fn encoding(&self) -> Encoding {
        Encoding::WinAnsi
    }

    /// Glyph id of `ch` in the font program. Only fonts that can be shown
    /// with [`Encoding::IdentityH`] need to answer.
    fn glyph_id(&self, _ch: char) -> Option<u16> {
        None
    }

    fn string_width_pt(&self, text: &str, size_pt: f32) -> f32 {
        let units: u32 = text.chars().map(|c| u32::from(self.glyph_width(c))).sum();
        units as f32 * size_pt / 1000.0
    }
}

/// Produces backend fonts from a family identifier, encoding, embed flag and style bits.
pub trait FontBackend: Send + Sync + Debug {
    fn create_font(&self, request: &FontRequest) -> Result<Arc<dyn BackendFont>, FontError>;

    /// Returns a human-readable name for this backend (for logging/debugging).
    fn name(&self) -> &'static str;
}
