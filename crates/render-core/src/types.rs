use pagewright_traits::BackendFont;
use pagewright_types::Color;
use std::fmt;
use std::sync::Arc;

/// Identifies a deferred template within one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TemplateId(pub u32);

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

/// The two drawing layers of a page. `Under` is painted first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layer {
    Over,
    Under,
}

/// Decoded raster image, 8 bits per RGB channel, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageData {
    pub width: u32,
    pub height: u32,
    pub rgb: Vec<u8>,
}

/// A drawing command in backend space: points, origin at the bottom-left.
#[derive(Debug, Clone)]
pub enum DrawOp {
    SaveState,
    RestoreState,
    BeginText,
    EndText,
    SetFont { font: Arc<dyn BackendFont>, size: f32 },
    SetFillColor(Color),
    SetStrokeColor(Color),
    SetLineWidth(f32),
    /// Shows `text` with its baseline origin at (`x`, `y`).
    ShowText { x: f32, y: f32, text: String },
    MoveTo { x: f32, y: f32 },
    LineTo { x: f32, y: f32 },
    Rect { x: f32, y: f32, width: f32, height: f32 },
    Stroke,
    Fill,
    /// Paints `image` with its bottom-left corner at (`x`, `y`).
    PlaceImage { image: Arc<ImageData>, x: f32, y: f32, width: f32, height: f32 },
    /// Paints a template with its bottom-left corner at (`x`, `y`).
    PlaceTemplate { id: TemplateId, x: f32, y: f32 },
}

impl DrawOp {
    /// Change in graphics-state nesting caused by this op.
    pub fn state_delta(&self) -> i32 {
        match self {
            DrawOp::SaveState => 1,
            DrawOp::RestoreState => -1,
            _ => 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSetup {
    pub width_pt: f32,
    pub height_pt: f32,
}

/// Everything drawn on one page, per layer.
#[derive(Debug, Clone, Default)]
pub struct PageContent {
    /// 1-based page number.
    pub number: usize,
    pub under: Vec<DrawOp>,
    pub over: Vec<DrawOp>,
}

impl PageContent {
    pub fn is_empty(&self) -> bool {
        self.under.is_empty() && self.over.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct TemplateContent {
    pub id: TemplateId,
    pub width: f32,
    pub height: f32,
    pub ops: Vec<DrawOp>,
}
