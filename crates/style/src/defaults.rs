//! Process-wide default context template.
//!
//! The template itself is immutable. Every document gets its own context built
//! from it, so nothing a caller changes leaks into another document.

use crate::base_font::BaseFont;
use crate::cell::CellStyle;
use crate::context::DrawingContext;
use crate::error::StyleError;
use once_cell::sync::Lazy;
use pagewright_traits::{Encoding, FontBackend};
use pagewright_types::{Align, Color, Length, VerticalAlign};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CellDefaults {
    pub borders_visible: bool,
    pub border_width_pt: f32,
    pub padding_pt: f32,
    pub background: Option<Color>,
    pub align: Align,
    pub vertical_align: VerticalAlign,
}

impl Default for CellDefaults {
    fn default() -> Self {
        Self {
            borders_visible: true,
            border_width_pt: 0.5,
            padding_pt: 2.0,
            background: None,
            align: Align::Left,
            vertical_align: VerticalAlign::Top,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextDefaults {
    pub font_face: String,
    pub encoding: Encoding,
    pub embedded: bool,
    pub font_size_mm: f32,
    pub font_color: Color,
    pub cell: CellDefaults,
}

impl Default for ContextDefaults {
    fn default() -> Self {
        Self {
            font_face: "Helvetica".to_string(),
            encoding: Encoding::WinAnsi,
            embedded: false,
            font_size_mm: 3.0,
            font_color: Color::BLACK,
            cell: CellDefaults::default(),
        }
    }
}

pub static DEFAULTS: Lazy<ContextDefaults> = Lazy::new(ContextDefaults::default);

impl DrawingContext {
    /// A fresh context built from the process-wide [`DEFAULTS`].
    pub fn default_context(backend: Arc<dyn FontBackend>) -> Result<Self, StyleError> {
        Self::from_defaults(backend, &DEFAULTS)
    }

    pub fn from_defaults(backend: Arc<dyn FontBackend>, defaults: &ContextDefaults) -> Result<Self, StyleError> {
        let base = BaseFont::new(backend, defaults.font_face.as_str(), defaults.encoding, defaults.embedded)?;
        let mut font = base.create_font(Length::mm(defaults.font_size_mm));
        font.set_color(defaults.font_color);
        log::debug!(
            "Default context: face '{}', size {}",
            defaults.font_face,
            Length::mm(defaults.font_size_mm)
        );

        let mut ctx = DrawingContext::new();
        ctx.set_base_font(base)
            .set_font(font)
            .set_cell(CellStyle::from_defaults(&defaults.cell));
        Ok(ctx)
    }
}
