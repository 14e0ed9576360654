//! Multi-line text blocks: folding to a width limit, sizing and rendering.

use crate::LayoutError;
use crate::surface::{DrawTarget, Paginated};
use pagewright_render_core::DrawOp;
use pagewright_style::{DrawingContext, Font};
use pagewright_traits::BackendFont;
use pagewright_types::{Align, Dimension, Length, Unit};
use std::cell::OnceCell;

const DEFAULT_SPACING: f32 = 20.0;
const UNDERLINE_OFFSET: f32 = 0.1;
const UNDERLINE_THICKNESS: f32 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WrapMode {
    /// Break anywhere between characters.
    #[default]
    Character,
    /// Break at whitespace, falling back to characters for long words.
    Word,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FoldedLine {
    pub text: String,
    /// Measured width, in points.
    pub width: Length,
}

/// Display lines of a text block and the block's size in millimetres.
#[derive(Debug, Clone, PartialEq)]
pub struct FoldedText {
    pub lines: Vec<FoldedLine>,
    pub size: Dimension,
}

/// Widths of strings in one font at one size.
pub(crate) struct Measure<'f> {
    font: &'f dyn BackendFont,
    size_pt: f32,
}

impl<'f> Measure<'f> {
    pub(crate) fn new(font: &'f dyn BackendFont, size_pt: f32) -> Self {
        Self { font, size_pt }
    }

    fn units_to_pt(&self, units: u32) -> f32 {
        units as f32 * self.size_pt / 1000.0
    }

    pub(crate) fn width_pt(&self, text: &str) -> f32 {
        self.font.string_width_pt(text, self.size_pt)
    }

    /// Splits `line` into pieces each measuring strictly below `limit_pt`.
    /// A character wider than the limit on its own becomes a piece by itself.
    pub(crate) fn fold_chars(&self, line: &str, limit_pt: f32, out: &mut Vec<String>) {
        let chars: Vec<char> = line.chars().collect();
        if chars.is_empty() {
            out.push(String::new());
            return;
        }
        let mut cumulative = Vec::with_capacity(chars.len() + 1);
        cumulative.push(0u32);
        for ch in &chars {
            let last = cumulative[cumulative.len() - 1];
            cumulative.push(last + u32::from(self.font.glyph_width(*ch)));
        }

        let mut start = 0;
        while start < chars.len() {
            let base = cumulative[start];
            // widths grow with the prefix length, so the fitting prefixes form a run
            let fitting = cumulative[start + 1..]
                .partition_point(|&units| self.units_to_pt(units - base) < limit_pt);
            let take = if fitting == 0 {
                log::warn!(
                    "Character '{}' is wider than the {}pt limit; placing it on its own line",
                    chars[start],
                    limit_pt
                );
                1
            } else {
                fitting
            };
            out.push(chars[start..start + take].iter().collect());
            start += take;
        }
    }

    /// Greedy word wrap; words that cannot fit alone are folded by character.
    pub(crate) fn fold_words(&self, line: &str, limit_pt: f32, out: &mut Vec<String>) {
        if line.is_empty() || self.width_pt(line) < limit_pt {
            out.push(line.to_string());
            return;
        }
        let emitted = out.len();
        let mut current = String::new();
        for word in line.split_whitespace() {
            let candidate = if current.is_empty() { word.to_string() } else { format!("{} {}", current, word) };
            if self.width_pt(&candidate) < limit_pt {
                current = candidate;
                continue;
            }
            if !current.is_empty() {
                out.push(std::mem::take(&mut current));
            }
            if self.width_pt(word) < limit_pt {
                current = word.to_string();
            } else {
                let mut pieces = Vec::new();
                self.fold_chars(word, limit_pt, &mut pieces);
                current = pieces.pop().unwrap_or_default();
                out.extend(pieces);
            }
        }
        if !current.is_empty() || out.len() == emitted {
            out.push(current);
        }
    }

    pub(crate) fn fold(&self, line: &str, limit_pt: f32, mode: WrapMode, out: &mut Vec<String>) {
        match mode {
            WrapMode::Character => self.fold_chars(line, limit_pt, out),
            WrapMode::Word => self.fold_words(line, limit_pt, out),
        }
    }
}

/// One line ready to be shown, in backend coordinates.
pub(crate) struct PlacedLine<'a> {
    pub(crate) text: &'a str,
    pub(crate) x: f32,
    pub(crate) baseline: f32,
    pub(crate) width: f32,
}

/// Emits a balanced text object for `lines`, plus underline strokes when the font asks for them.
pub(crate) fn emit_lines(target: &mut dyn DrawTarget, font: &Font, lines: &[PlacedLine<'_>]) -> Result<(), LayoutError> {
    let backend = font.backend_font()?;
    let size = font.size().pt_value();
    let color = font.color();

    target.emit(DrawOp::SaveState);
    target.emit(DrawOp::BeginText);
    target.emit(DrawOp::SetFont { font: backend, size });
    target.emit(DrawOp::SetFillColor(color));
    for line in lines.iter().filter(|l| !l.text.is_empty()) {
        target.emit(DrawOp::ShowText { x: line.x, y: line.baseline, text: line.text.to_string() });
    }
    target.emit(DrawOp::EndText);

    if font.is_underlined() {
        target.emit(DrawOp::SetStrokeColor(color));
        target.emit(DrawOp::SetLineWidth(size * UNDERLINE_THICKNESS));
        for line in lines.iter().filter(|l| !l.text.is_empty()) {
            let y = line.baseline - size * UNDERLINE_OFFSET;
            target.emit(DrawOp::MoveTo { x: line.x, y });
            target.emit(DrawOp::LineTo { x: line.x + line.width, y });
        }
        target.emit(DrawOp::Stroke);
    }
    target.emit(DrawOp::RestoreState);
    Ok(())
}

pub(crate) fn split_source_lines(text: &str) -> Vec<String> {
    let mut lines: Vec<String> = text
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line).to_string())
        .collect();
    while lines.len() > 1 && lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    lines
}

#[derive(Debug, Clone)]
pub struct TextBlock {
    source: Vec<String>,
    font: Font,
    limit: Option<Length>,
    spacing: f32,
    text_align: Align,
    block_align: Align,
    wrap: WrapMode,
    folded: OnceCell<FoldedText>,
}

impl TextBlock {
    /// A block of `text` in the context's current font.
    pub fn new(ctx: &DrawingContext, text: &str) -> Result<Self, LayoutError> {
        Ok(Self::with_font(ctx.font()?.duplicate(), text))
    }

    pub fn with_font(font: Font, text: &str) -> Self {
        Self {
            source: split_source_lines(text),
            font,
            limit: None,
            spacing: DEFAULT_SPACING,
            text_align: Align::Left,
            block_align: Align::Left,
            wrap: WrapMode::Character,
            folded: OnceCell::new(),
        }
    }

    fn invalidate(&mut self) {
        self.folded = OnceCell::new();
    }

    pub fn set_text(&mut self, text: &str) -> &mut Self {
        self.source = split_source_lines(text);
        self.invalidate();
        self
    }

    pub fn source_lines(&self) -> &[String] {
        &self.source
    }

    pub fn font(&self) -> &Font {
        &self.font
    }

    pub fn font_mut(&mut self) -> &mut Font {
        self.invalidate();
        &mut self.font
    }

    pub fn set_font(&mut self, font: Font) -> &mut Self {
        self.font = font;
        self.invalidate();
        self
    }

    pub fn limit_width(&self) -> Option<Length> {
        self.limit
    }

    pub fn set_limit_width(&mut self, limit: Option<Length>) -> &mut Self {
        self.limit = limit;
        self.invalidate();
        self
    }

    pub fn spacing(&self) -> f32 {
        self.spacing
    }

    /// Gap between lines as a percentage of the font size.
    pub fn set_spacing(&mut self, percent: f32) -> &mut Self {
        self.spacing = percent;
        self.invalidate();
        self
    }

    pub fn text_align(&self) -> Align {
        self.text_align
    }

    pub fn set_text_align(&mut self, align: Align) -> &mut Self {
        self.text_align = align;
        self
    }

    pub fn block_align(&self) -> Align {
        self.block_align
    }

    /// Position of the block inside its limit width. Has no effect without a limit.
    pub fn set_block_align(&mut self, align: Align) -> &mut Self {
        self.block_align = align;
        self
    }

    pub fn wrap_mode(&self) -> WrapMode {
        self.wrap
    }

    pub fn set_wrap_mode(&mut self, mode: WrapMode) -> &mut Self {
        self.wrap = mode;
        self.invalidate();
        self
    }

    /// The folded lines, computed on first use and cached until a folding input changes.
    pub fn folded(&self) -> Result<&FoldedText, LayoutError> {
        if let Some(folded) = self.folded.get() {
            return Ok(folded);
        }
        let folded = self.fold()?;
        Ok(self.folded.get_or_init(|| folded))
    }

    pub fn lines(&self) -> Result<Vec<&str>, LayoutError> {
        Ok(self.folded()?.lines.iter().map(|l| l.text.as_str()).collect())
    }

    /// Block size in millimetres.
    pub fn size(&self) -> Result<Dimension, LayoutError> {
        Ok(self.folded()?.size)
    }

    fn fold(&self) -> Result<FoldedText, LayoutError> {
        let backend = self.font.backend_font()?;
        let size = self.font.size();
        let measure = Measure::new(backend.as_ref(), size.pt_value());

        let mut texts = Vec::with_capacity(self.source.len());
        match self.limit {
            None => texts.extend(self.source.iter().cloned()),
            Some(limit) => {
                for line in &self.source {
                    measure.fold(line, limit.pt_value(), self.wrap, &mut texts);
                }
            }
        }

        let lines: Vec<FoldedLine> = texts
            .into_iter()
            .map(|text| FoldedLine { width: Length::pt(measure.width_pt(&text)), text })
            .collect();

        let line_height = size.mm_value();
        let line_spacing = line_height * self.spacing / 100.0;
        let width = lines.iter().map(|l| l.width.mm_value()).fold(0.0, f32::max);
        let height = if lines.is_empty() {
            0.0
        } else {
            lines.len() as f32 * (line_height + line_spacing) - line_spacing
        };
        log::debug!(
            "Folded {} source lines into {} lines ({:.2}mm x {:.2}mm)",
            self.source.len(),
            lines.len(),
            width,
            height
        );
        Ok(FoldedText { lines, size: Dimension::of(Unit::Mm, width, height) })
    }

    /// Draws the block with its top-left corner at `position` and returns the
    /// y coordinate just below it.
    pub fn draw_at(&self, target: &mut dyn DrawTarget, position: Dimension) -> Result<Length, LayoutError> {
        let folded = self.folded()?;
        let origin = target.geometry().to_backend(position);
        let block_width = folded.size.x.pt_value();

        let mut left = origin.x;
        if let Some(limit) = self.limit {
            let slack = limit.pt_value() - block_width;
            match self.block_align {
                Align::Center => left += slack / 2.0,
                Align::Right => left += slack,
                Align::Left | Align::Justified => {}
            }
        }

        let size_pt = self.font.size().pt_value();
        let step = size_pt * (100.0 + self.spacing) / 100.0;
        let placed: Vec<PlacedLine<'_>> = folded
            .lines
            .iter()
            .enumerate()
            .map(|(i, line)| {
                let width = line.width.pt_value();
                let x = match self.text_align {
                    Align::Center => left + block_width / 2.0 - width / 2.0,
                    Align::Right => left + block_width - width,
                    Align::Left | Align::Justified => left,
                };
                PlacedLine { text: &line.text, x, baseline: origin.y - size_pt - step * i as f32, width }
            })
            .collect();

        emit_lines(target, &self.font, &placed)?;
        Ok(position.y + folded.size.y)
    }

    /// Draws the block at the canvas cursor, breaking the page first when it
    /// does not fit, and moves the cursor below it.
    pub fn add_to_canvas(&self, canvas: &mut dyn Paginated, x: Length) -> Result<Length, LayoutError> {
        let height = self.size()?.y;
        if !canvas.can_draw(height) && canvas.vertical().is_positive() {
            canvas.new_page()?;
        }
        let remaining = canvas.geometry().print_height() - canvas.vertical();
        if height > remaining {
            log::warn!("Text block of height {} overflows the {} left on page {}", height, remaining, canvas.page_number());
        }

        let y = canvas.vertical();
        self.draw_at(canvas.as_draw_target(), Dimension::new(x, y))?;
        let bottom = y + height;
        canvas.set_vertical(bottom);
        Ok(bottom)
    }

    /// Limits the block to the print width and adds it at the left margin.
    pub fn add_to_canvas_print_width_limited(&mut self, canvas: &mut dyn Paginated) -> Result<Length, LayoutError> {
        let width = canvas.geometry().print_width();
        self.set_limit_width(Some(width));
        self.add_to_canvas(canvas, Length::ZERO)
    }
}
