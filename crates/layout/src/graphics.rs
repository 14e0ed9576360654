use crate::surface::DrawTarget;
use pagewright_render_core::DrawOp;
use pagewright_types::{Color, Length, Unit};

/// Scoped vector drawing on a target.
///
/// Opening the scope saves the graphics state and dropping it restores the
/// state, so every exit path leaves the target balanced. Coordinates are
/// document-space values in `unit`.
pub struct Graphics<'t> {
    target: &'t mut dyn DrawTarget,
    unit: Unit,
}

impl<'t> Graphics<'t> {
    pub fn begin(target: &'t mut dyn DrawTarget, unit: Unit) -> Self {
        target.emit(DrawOp::SaveState);
        Self { target, unit }
    }

    fn point(&self, x: f32, y: f32) -> (f32, f32) {
        let p = self
            .target
            .geometry()
            .to_backend_xy(Length::new(self.unit, x), Length::new(self.unit, y));
        (p.x, p.y)
    }

    fn to_pt(&self, value: f32) -> f32 {
        Length::new(self.unit, value).pt_value()
    }

    pub fn set_line_width(&mut self, width: f32) -> &mut Self {
        let width = self.to_pt(width);
        self.target.emit(DrawOp::SetLineWidth(width));
        self
    }

    pub fn set_stroke_color(&mut self, color: Color) -> &mut Self {
        self.target.emit(DrawOp::SetStrokeColor(color));
        self
    }

    pub fn set_fill_color(&mut self, color: Color) -> &mut Self {
        self.target.emit(DrawOp::SetFillColor(color));
        self
    }

    pub fn move_to(&mut self, x: f32, y: f32) -> &mut Self {
        let (x, y) = self.point(x, y);
        self.target.emit(DrawOp::MoveTo { x, y });
        self
    }

    pub fn line_to(&mut self, x: f32, y: f32) -> &mut Self {
        let (x, y) = self.point(x, y);
        self.target.emit(DrawOp::LineTo { x, y });
        self
    }

    /// Adds a rectangle path whose top-left corner is (`x`, `y`).
    pub fn rect(&mut self, x: f32, y: f32, width: f32, height: f32) -> &mut Self {
        let (left, bottom) = self.point(x, y + height);
        let op = DrawOp::Rect { x: left, y: bottom, width: self.to_pt(width), height: self.to_pt(height) };
        self.target.emit(op);
        self
    }

    pub fn stroke(&mut self) -> &mut Self {
        self.target.emit(DrawOp::Stroke);
        self
    }

    pub fn fill(&mut self) -> &mut Self {
        self.target.emit(DrawOp::Fill);
        self
    }

    pub fn stroke_rect(&mut self, x: f32, y: f32, width: f32, height: f32) -> &mut Self {
        self.rect(x, y, width, height).stroke()
    }

    pub fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32) -> &mut Self {
        self.rect(x, y, width, height).fill()
    }

    /// Ends the scope now instead of at the end of the enclosing block.
    pub fn finish(self) {}
}

impl Drop for Graphics<'_> {
    fn drop(&mut self) {
        self.target.emit(DrawOp::RestoreState);
    }
}
