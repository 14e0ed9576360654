use crate::LayoutError;
use crate::flow::{ColumnFlow, FlowOutcome, FlowSummary, Flowable, flow_to_canvas};
use crate::surface::DrawTarget;
use crate::text_block::{Measure, PlacedLine, WrapMode, emit_lines, split_source_lines};
use pagewright_style::{DrawingContext, Font};
use pagewright_types::{Align, Length, Rect};

/// Word-wrapped running text that can split across pages between lines.
#[derive(Debug, Clone)]
pub struct Paragraph {
    source: Vec<String>,
    font: Font,
    align: Align,
    spacing_before: Length,
    spacing_after: Length,
    line_spacing: f32,
    wrapped: Option<Wrapped>,
    next_line: usize,
    started: bool,
}

#[derive(Debug, Clone)]
struct Wrapped {
    width_pt: f32,
    lines: Vec<(String, f32)>,
}

impl Paragraph {
    pub fn new(ctx: &DrawingContext, text: &str) -> Result<Self, LayoutError> {
        Ok(Self::with_font(ctx.font()?.duplicate(), text))
    }

    pub fn with_font(font: Font, text: &str) -> Self {
        Self {
            source: split_source_lines(text),
            font,
            align: Align::Left,
            spacing_before: Length::ZERO,
            spacing_after: Length::ZERO,
            line_spacing: 20.0,
            wrapped: None,
            next_line: 0,
            started: false,
        }
    }

    pub fn set_align(&mut self, align: Align) -> &mut Self {
        self.align = align;
        self
    }

    pub fn set_spacing_before(&mut self, spacing: Length) -> &mut Self {
        self.spacing_before = spacing;
        self
    }

    pub fn set_spacing_after(&mut self, spacing: Length) -> &mut Self {
        self.spacing_after = spacing;
        self
    }

    /// Gap between lines as a percentage of the font size.
    pub fn set_line_spacing(&mut self, percent: f32) -> &mut Self {
        self.line_spacing = percent;
        self
    }

    pub fn font_mut(&mut self) -> &mut Font {
        self.wrapped = None;
        &mut self.font
    }

    /// Forgets flow progress so the paragraph can be flowed again from the start.
    pub fn reset(&mut self) {
        self.next_line = 0;
        self.started = false;
    }

    fn wrap(&mut self, width: Length) -> Result<(), LayoutError> {
        let width_pt = width.pt_value();
        if self.wrapped.as_ref().is_some_and(|w| (w.width_pt - width_pt).abs() < 0.01) {
            return Ok(());
        }
        let backend = self.font.backend_font()?;
        let measure = Measure::new(backend.as_ref(), self.font.size().pt_value());
        let mut texts = Vec::new();
        for line in &self.source {
            measure.fold(line, width_pt, WrapMode::Word, &mut texts);
        }
        let lines = texts
            .into_iter()
            .map(|text| {
                let width = measure.width_pt(&text);
                (text, width)
            })
            .collect();
        self.wrapped = Some(Wrapped { width_pt, lines });
        Ok(())
    }

    pub fn add_to_canvas(&mut self, target: &mut dyn DrawTarget) -> Result<FlowSummary, LayoutError> {
        self.reset();
        let mut column = ColumnFlow::new();
        column.add_element(&mut *self);
        flow_to_canvas(target, &mut column)
    }
}

impl Flowable for Paragraph {
    fn flow_into(&mut self, target: &mut dyn DrawTarget, area: &Rect) -> Result<FlowOutcome, LayoutError> {
        self.wrap(area.width)?;
        let Some(wrapped) = self.wrapped.as_ref() else {
            return Ok(FlowOutcome::done(area.y));
        };

        let mut y = area.y;
        if !self.started {
            y = y + self.spacing_before;
        }

        let size = self.font.size();
        let step = size.scale((100.0 + self.line_spacing) / 100.0);
        let bottom = area.bottom();
        let geometry = *target.geometry();
        let area_width = area.width.pt_value();

        let mut placed = Vec::new();
        while let Some((text, width)) = wrapped.lines.get(self.next_line) {
            if y + size > bottom + Length::pt(0.01) {
                break;
            }
            let top = geometry.to_backend_xy(area.x, y);
            let x = match self.align {
                Align::Center => top.x + (area_width - width) / 2.0,
                Align::Right => top.x + area_width - width,
                Align::Left | Align::Justified => top.x,
            };
            placed.push(PlacedLine { text, x, baseline: top.y - size.pt_value(), width: *width });
            y = y + step;
            self.next_line += 1;
        }

        let progressed = !placed.is_empty();
        if progressed {
            self.started = true;
            emit_lines(target, &self.font, &placed)?;
        }
        if self.next_line < wrapped.lines.len() {
            return Ok(FlowOutcome::blocked(y, progressed, size));
        }
        Ok(FlowOutcome::done(y + self.spacing_after))
    }
}
