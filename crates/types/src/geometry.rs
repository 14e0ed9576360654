use crate::unit::{Dimension, Length, Unit};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    #[error("Margins leave a negative or non-finite print area ({width:.2}pt x {height:.2}pt).")]
    NegativePrintArea { width: f32, height: f32 },
}

/// A position in backend space: points, origin at the bottom-left of the page.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BackendPoint {
    pub x: f32,
    pub y: f32,
}

impl BackendPoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: Length,
    pub y: Length,
    pub width: Length,
    pub height: Length,
}

impl Rect {
    pub fn new(x: Length, y: Length, width: Length, height: Length) -> Self {
        Self { x, y, width, height }
    }

    pub fn of(unit: Unit, x: f32, y: f32, width: f32, height: f32) -> Self {
        Self::new(
            Length::new(unit, x),
            Length::new(unit, y),
            Length::new(unit, width),
            Length::new(unit, height),
        )
    }

    pub fn from_parts(origin: Dimension, size: Dimension) -> Self {
        Self::new(origin.x, origin.y, size.x, size.y)
    }

    pub fn origin(&self) -> Dimension {
        Dimension::new(self.x, self.y)
    }

    pub fn size(&self) -> Dimension {
        Dimension::new(self.width, self.height)
    }

    pub fn left(&self) -> Length {
        self.x
    }

    pub fn right(&self) -> Length {
        self.x + self.width
    }

    pub fn top(&self) -> Length {
        self.y
    }

    pub fn bottom(&self) -> Length {
        self.y + self.height
    }

    pub fn top_left(&self) -> Dimension {
        self.origin()
    }

    pub fn top_right(&self) -> Dimension {
        Dimension::new(self.right(), self.top())
    }

    pub fn bottom_left(&self) -> Dimension {
        Dimension::new(self.left(), self.bottom())
    }

    pub fn bottom_right(&self) -> Dimension {
        Dimension::new(self.right(), self.bottom())
    }

    /// Same rectangle with its top edge moved to `y`, keeping the bottom edge.
    pub fn with_y(&self, y: Length) -> Rect {
        Rect::new(self.x, y, self.width, self.bottom() - y)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Insets {
    pub top: Length,
    pub bottom: Length,
    pub left: Length,
    pub right: Length,
}

impl Insets {
    pub const ZERO: Insets = Insets {
        top: Length::ZERO,
        bottom: Length::ZERO,
        left: Length::ZERO,
        right: Length::ZERO,
    };

    pub fn new(top: Length, bottom: Length, left: Length, right: Length) -> Self {
        Self { top, bottom, left, right }
    }

    pub fn of(unit: Unit, top: f32, bottom: f32, left: f32, right: f32) -> Self {
        Self::new(
            Length::new(unit, top),
            Length::new(unit, bottom),
            Length::new(unit, left),
            Length::new(unit, right),
        )
    }

    pub fn uniform(value: Length) -> Self {
        Self::new(value, value, value, value)
    }

    pub fn top_left(&self) -> Dimension {
        Dimension::new(self.left, self.top)
    }

    pub fn bottom_right(&self) -> Dimension {
        Dimension::new(self.right, self.bottom)
    }

    pub fn horizontal(&self) -> Length {
        self.left + self.right
    }

    pub fn vertical(&self) -> Length {
        self.top + self.bottom
    }
}

/// Page size plus margins for one document, and the mapping between
/// document space and backend space.
///
/// Document space has its origin at the top-left corner of the print area
/// with y growing downward. Backend space is the full page in points with
/// the origin at the bottom-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawGeometry")]
pub struct Geometry {
    size: Dimension,
    margins: Insets,
}

#[derive(Deserialize)]
struct RawGeometry {
    size: Dimension,
    margins: Insets,
}

impl TryFrom<RawGeometry> for Geometry {
    type Error = GeometryError;

    fn try_from(raw: RawGeometry) -> Result<Self, Self::Error> {
        Geometry::new(raw.size, raw.margins)
    }
}

impl Geometry {
    pub fn new(size: Dimension, margins: Insets) -> Result<Self, GeometryError> {
        let geometry = Self { size, margins };
        let width = geometry.print_width().pt_value();
        let height = geometry.print_height().pt_value();
        if !width.is_finite() || !height.is_finite() || width < 0.0 || height < 0.0 {
            return Err(GeometryError::NegativePrintArea { width, height });
        }
        Ok(geometry)
    }

    /// A4 portrait, margins top 20, bottom 25, left 25, right 15 (mm).
    pub fn a4_portrait() -> Self {
        Self {
            size: Dimension::of(Unit::Mm, 210.0, 297.0),
            margins: Insets::of(Unit::Mm, 20.0, 25.0, 25.0, 15.0),
        }
    }

    /// A4 landscape, margins top 25, bottom 20, left 20, right 20 (mm).
    pub fn a4_landscape() -> Self {
        Self {
            size: Dimension::of(Unit::Mm, 297.0, 210.0),
            margins: Insets::of(Unit::Mm, 25.0, 20.0, 20.0, 20.0),
        }
    }

    /// Geometry of an off-page buffer: the whole size is printable.
    pub fn template(size: Dimension) -> Result<Self, GeometryError> {
        Self::new(size, Insets::ZERO)
    }

    pub fn size(&self) -> Dimension {
        self.size
    }

    pub fn paper_size(&self) -> Dimension {
        self.size
    }

    pub fn margins(&self) -> Insets {
        self.margins
    }

    pub fn top_left_margin(&self) -> Dimension {
        self.margins.top_left()
    }

    pub fn print_width(&self) -> Length {
        self.size.x - self.margins.left - self.margins.right
    }

    pub fn print_height(&self) -> Length {
        self.size.y - self.margins.top - self.margins.bottom
    }

    pub fn print_size(&self) -> Dimension {
        Dimension::new(self.print_width().to_unit(Unit::Mm), self.print_height().to_unit(Unit::Mm))
    }

    /// Print area as a rectangle in document space.
    pub fn print_area(&self) -> Rect {
        Rect::new(Length::ZERO, Length::ZERO, self.print_width(), self.print_height())
    }

    pub fn bottom_left(&self) -> Dimension {
        Dimension::new(Length::ZERO, self.print_height())
    }

    pub fn top_right(&self) -> Dimension {
        Dimension::new(self.print_width(), Length::ZERO)
    }

    pub fn to_backend(&self, position: Dimension) -> BackendPoint {
        self.to_backend_xy(position.x, position.y)
    }

    pub fn to_backend_xy(&self, x: Length, y: Length) -> BackendPoint {
        BackendPoint {
            x: x.pt_value() + self.margins.left.pt_value(),
            y: self.print_height().pt_value() - y.pt_value() + self.margins.bottom.pt_value(),
        }
    }

    /// Inverse of [`Geometry::to_backend`]; the result is in points.
    pub fn from_backend(&self, point: BackendPoint) -> Dimension {
        Dimension::of(
            Unit::Pt,
            point.x - self.margins.left.pt_value(),
            self.size.y.pt_value() - point.y - self.margins.top.pt_value(),
        )
    }
}

impl fmt::Display for Geometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "size:{},insets:({}, {}, {}, {})",
            self.size, self.margins.top, self.margins.bottom, self.margins.left, self.margins.right
        )
    }
}
