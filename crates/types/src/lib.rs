pub mod align;
pub mod color;
pub mod geometry;
pub mod unit;

pub use align::{Align, Border, BorderSet, VerticalAlign};
pub use color::Color;
pub use geometry::{BackendPoint, Geometry, GeometryError, Insets, Rect};
pub use unit::{Dimension, Length, Unit};
