//! JSON configuration for the delivery slip renderer.

use crate::error::PagewrightError;
use pagewright_layout::FontLibrary;
use pagewright_style::{ContextDefaults, DrawingContext};
use pagewright_traits::FontBackend;
use pagewright_types::{Dimension, Geometry, Insets, Length, Unit};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageSetupConfig {
    #[default]
    A4Portrait,
    A4Landscape,
    /// Paper size and margins in millimetres.
    Custom {
        width_mm: f32,
        height_mm: f32,
        margins_mm: MarginsConfig,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarginsConfig {
    pub top: f32,
    pub bottom: f32,
    pub left: f32,
    pub right: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub page: PageSetupConfig,
    pub context: ContextDefaults,
    /// TrueType files registered before the context is built.
    pub font_files: Vec<PathBuf>,
    /// Also look up faces among the installed system fonts.
    pub system_fonts: bool,
    /// PNG or JPEG drawn in the top-right corner. A generated placeholder is used when absent.
    pub logo: Option<PathBuf>,
    /// Number of sales groups in the sample table.
    pub groups: usize,
    /// Detail rows per sales group.
    pub rows_per_group: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            page: PageSetupConfig::default(),
            context: ContextDefaults::default(),
            font_files: Vec::new(),
            system_fonts: false,
            logo: None,
            groups: 10,
            rows_per_group: 5,
        }
    }
}

impl RenderConfig {
    pub fn from_json(json: &str) -> Result<Self, PagewrightError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, PagewrightError> {
        let path = path.as_ref();
        log::debug!("Loading render configuration from {}", path.display());
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// The page geometry. Custom sizes are validated here, so a print area
    /// swallowed by its margins is reported before any drawing starts.
    pub fn geometry(&self) -> Result<Geometry, PagewrightError> {
        Ok(match &self.page {
            PageSetupConfig::A4Portrait => Geometry::a4_portrait(),
            PageSetupConfig::A4Landscape => Geometry::a4_landscape(),
            PageSetupConfig::Custom { width_mm, height_mm, margins_mm } => Geometry::new(
                Dimension::of(Unit::Mm, *width_mm, *height_mm),
                Insets::of(Unit::Mm, margins_mm.top, margins_mm.bottom, margins_mm.left, margins_mm.right),
            )?,
        })
    }

    pub fn font_library(&self) -> Result<FontLibrary, PagewrightError> {
        let library = FontLibrary::new();
        #[cfg(feature = "system-fonts")]
        let library = library.with_system_fonts(self.system_fonts);
        if !cfg!(feature = "system-fonts") && self.system_fonts {
            log::warn!("System fonts requested but the system-fonts feature is disabled");
        }
        for path in &self.font_files {
            let name = library.register_font_file(path)?;
            log::info!("Registered font '{}' from {}", name, path.display());
        }
        Ok(library)
    }

    /// A fresh drawing context built from the configured defaults.
    pub fn context(&self, backend: Arc<dyn FontBackend>) -> Result<DrawingContext, PagewrightError> {
        Ok(DrawingContext::from_defaults(backend, &self.context)?)
    }

    pub fn font_size(&self) -> Length {
        Length::mm(self.context.font_size_mm)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagewright_types::GeometryError;

    #[test]
    fn test_empty_json_gives_defaults() {
        let config = RenderConfig::from_json("{}").unwrap();
        assert_eq!(config, RenderConfig::default());
        assert_eq!(config.groups, 10);
        assert_eq!(config.context.font_face, "Helvetica");
    }

    #[test]
    fn test_partial_context_override() {
        let config = RenderConfig::from_json(
            r#"{ "page": "a4_landscape", "context": { "font_size_mm": 4.5 }, "groups": 2 }"#,
        )
        .unwrap();
        assert_eq!(config.page, PageSetupConfig::A4Landscape);
        assert_eq!(config.context.font_size_mm, 4.5);
        assert_eq!(config.context.font_face, "Helvetica");
        assert_eq!(config.rows_per_group, 5);
        let geometry = config.geometry().unwrap();
        assert!(geometry.size().x > geometry.size().y);
    }

    #[test]
    fn test_custom_page() {
        let config = RenderConfig::from_json(
            r#"{ "page": { "custom": { "width_mm": 100, "height_mm": 150,
                 "margins_mm": { "top": 10, "bottom": 10, "left": 5, "right": 5 } } } }"#,
        )
        .unwrap();
        let geometry = config.geometry().unwrap();
        assert!((geometry.print_width().mm_value() - 90.0).abs() < 1e-3);
        assert!((geometry.print_height().mm_value() - 130.0).abs() < 1e-3);
    }

    #[test]
    fn test_margins_wider_than_page_are_rejected() {
        let config = RenderConfig {
            page: PageSetupConfig::Custom {
                width_mm: 50.0,
                height_mm: 50.0,
                margins_mm: MarginsConfig { top: 10.0, bottom: 10.0, left: 30.0, right: 30.0 },
            },
            ..RenderConfig::default()
        };
        assert!(matches!(
            config.geometry(),
            Err(PagewrightError::Geometry(GeometryError::NegativePrintArea { .. }))
        ));
    }

    #[test]
    fn test_malformed_json_is_a_config_error() {
        assert!(matches!(RenderConfig::from_json("{ groups: }"), Err(PagewrightError::Config(_))));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("slip.json");
        std::fs::write(&path, r#"{ "rows_per_group": 3 }"#).unwrap();
        assert_eq!(RenderConfig::load(&path).unwrap().rows_per_group, 3);
        assert!(matches!(
            RenderConfig::load(dir.path().join("missing.json")),
            Err(PagewrightError::Io(_))
        ));
    }

    #[test]
    fn test_missing_font_file_fails() {
        let config = RenderConfig { font_files: vec![PathBuf::from("/nonexistent/font.ttf")], ..RenderConfig::default() };
        assert!(matches!(config.font_library(), Err(PagewrightError::Font(_))));
    }
}
