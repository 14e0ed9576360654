//! Tables of styled cells with column and row spans, flowed across pages.
//!
//! Cells fill the grid left to right, skipping slots held by rowspans from
//! earlier rows. Rows joined by a rowspan form a group that is never split
//! across pages. Header rows repeat at the top of each continuation area.

use crate::LayoutError;
use crate::flow::{ColumnFlow, FlowOutcome, FlowSummary, Flowable, flow_to_canvas};
use crate::graphics::Graphics;
use crate::image::Image;
use crate::surface::DrawTarget;
use crate::text_block::{TextBlock, WrapMode};
use crate::util::float_slices_fuzzy_eq;
use pagewright_style::{CellStyle, DrawingContext};
use pagewright_types::{Align, Border, Color, Dimension, Insets, Length, Rect, Unit, VerticalAlign};
use std::ops::Range;

/// Slack allowed when deciding whether a row group fits, in points.
const FIT_TOLERANCE: f32 = 0.01;

#[derive(Debug, Clone)]
pub enum CellContent {
    Text(TextBlock),
    Composite(Vec<CellElement>),
    Empty,
}

#[derive(Debug, Clone)]
pub enum CellElement {
    Text(TextBlock),
    Image(Image),
}

impl CellElement {
    fn height_pt(&self) -> Result<f32, LayoutError> {
        Ok(match self {
            CellElement::Text(block) => block.size()?.y.pt_value(),
            CellElement::Image(image) => image.draw_size().y.pt_value(),
        })
    }

    fn natural_width_pt(&self) -> Result<f32, LayoutError> {
        Ok(match self {
            CellElement::Text(block) => {
                let mut unlimited = block.clone();
                unlimited.set_limit_width(None);
                unlimited.size()?.x.pt_value()
            }
            CellElement::Image(image) => image.draw_size().x.pt_value(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct Cell {
    style: CellStyle,
    content: CellContent,
}

impl Cell {
    /// A text cell in the context's current font and default cell style.
    pub fn text(ctx: &DrawingContext, text: &str) -> Result<Self, LayoutError> {
        let mut block = TextBlock::new(ctx, text)?;
        block.set_wrap_mode(WrapMode::Word);
        Ok(Self { style: ctx.cell()?.duplicate(), content: CellContent::Text(block) })
    }

    pub fn composite(ctx: &DrawingContext) -> Result<Self, LayoutError> {
        Ok(Self { style: ctx.cell()?.duplicate(), content: CellContent::Composite(Vec::new()) })
    }

    pub fn empty(ctx: &DrawingContext) -> Result<Self, LayoutError> {
        Ok(Self { style: ctx.cell()?.duplicate(), content: CellContent::Empty })
    }

    pub fn with_style(style: CellStyle, content: CellContent) -> Self {
        Self { style, content }
    }

    fn push_element(&mut self, element: CellElement) {
        let content = std::mem::replace(&mut self.content, CellContent::Empty);
        self.content = match content {
            CellContent::Composite(mut elements) => {
                elements.push(element);
                CellContent::Composite(elements)
            }
            CellContent::Text(block) => CellContent::Composite(vec![CellElement::Text(block), element]),
            CellContent::Empty => CellContent::Composite(vec![element]),
        };
    }

    pub fn add_text_block(&mut self, block: TextBlock) -> &mut Self {
        self.push_element(CellElement::Text(block));
        self
    }

    pub fn add_image(&mut self, image: Image) -> &mut Self {
        self.push_element(CellElement::Image(image));
        self
    }

    pub fn content(&self) -> &CellContent {
        &self.content
    }

    pub fn style(&self) -> &CellStyle {
        &self.style
    }

    pub fn style_mut(&mut self) -> &mut CellStyle {
        &mut self.style
    }

    pub fn set_colspan(&mut self, span: usize) -> &mut Self {
        self.style.set_colspan(span);
        self
    }

    pub fn set_rowspan(&mut self, span: usize) -> &mut Self {
        self.style.set_rowspan(span);
        self
    }

    pub fn set_align(&mut self, align: Align) -> &mut Self {
        self.style.set_align(align);
        self
    }

    pub fn set_vertical_align(&mut self, align: VerticalAlign) -> &mut Self {
        self.style.set_vertical_align(align);
        self
    }

    pub fn set_background(&mut self, color: Option<Color>) -> &mut Self {
        self.style.set_background(color);
        self
    }

    pub fn set_border_visible(&mut self, visible: bool) -> &mut Self {
        self.style.set_border_visible(visible);
        self
    }

    pub fn set_border_widths(&mut self, widths: Insets) -> &mut Self {
        self.style.set_border_widths(widths);
        self
    }

    pub fn set_padding(&mut self, padding: Insets) -> &mut Self {
        self.style.set_padding(padding);
        self
    }

    pub fn duplicate(&self) -> Self {
        self.clone()
    }

    fn elements(&self) -> Vec<CellElement> {
        match &self.content {
            CellContent::Text(block) => vec![CellElement::Text(block.clone())],
            CellContent::Composite(elements) => elements.clone(),
            CellContent::Empty => Vec::new(),
        }
    }

    /// Content fitted to `inner_width`, and its total height in points.
    fn prepare(&self, inner_width: Length) -> Result<(Vec<CellElement>, f32), LayoutError> {
        let align = self.style.align();
        let mut elements = self.elements();
        let mut height = 0.0;
        for element in &mut elements {
            if let CellElement::Text(block) = element {
                block.set_limit_width(Some(inner_width)).set_text_align(align).set_block_align(align);
            }
            height += element.height_pt()?;
        }
        Ok((elements, height))
    }

    fn natural_width_pt(&self) -> Result<f32, LayoutError> {
        let mut width: f32 = 0.0;
        for element in self.elements() {
            width = width.max(element.natural_width_pt()?);
        }
        Ok(width)
    }

    fn draw(
        &self,
        target: &mut dyn DrawTarget,
        elements: &[CellElement],
        content_height: f32,
        frame: [f32; 4],
    ) -> Result<(), LayoutError> {
        let [x, y, width, height] = frame;
        let style = &self.style;

        if let Some(color) = style.background() {
            let mut g = Graphics::begin(target, Unit::Pt);
            g.set_fill_color(color).fill_rect(x, y, width, height);
        }

        let borders = style.border_widths();
        let padding = style.padding();
        let inner_x = x + borders.left.pt_value() + padding.left.pt_value();
        let inner_y = y + borders.top.pt_value() + padding.top.pt_value();
        let inner_width = width - style.horizontal_chrome().pt_value();
        let inner_height = height - style.vertical_chrome().pt_value();
        let offset = match style.vertical_align() {
            VerticalAlign::Top => 0.0,
            VerticalAlign::Middle => (inner_height - content_height) / 2.0,
            VerticalAlign::Bottom => inner_height - content_height,
        }
        .max(0.0);

        let mut cursor = inner_y + offset;
        for element in elements {
            match element {
                CellElement::Text(block) => {
                    block.draw_at(target, Dimension::of(Unit::Pt, inner_x, cursor))?;
                }
                CellElement::Image(image) => {
                    let image_width = image.draw_size().x.pt_value();
                    let image_x = match style.align() {
                        Align::Center => inner_x + (inner_width - image_width) / 2.0,
                        Align::Right => inner_x + inner_width - image_width,
                        Align::Left | Align::Justified => inner_x,
                    };
                    image.draw_at(target, Dimension::of(Unit::Pt, image_x, cursor));
                }
            }
            cursor += element.height_pt()?;
        }

        let visible = style.borders();
        if !visible.is_empty() {
            let mut g = Graphics::begin(target, Unit::Pt);
            g.set_stroke_color(Color::BLACK);
            for border in visible.iter() {
                let line = match border {
                    Border::Left => borders.left,
                    Border::Right => borders.right,
                    Border::Top => borders.top,
                    Border::Bottom => borders.bottom,
                }
                .pt_value();
                if line <= 0.0 {
                    continue;
                }
                let half = line / 2.0;
                g.set_line_width(line);
                match border {
                    Border::Top => g.move_to(x, y + half).line_to(x + width, y + half),
                    Border::Bottom => g.move_to(x, y + height - half).line_to(x + width, y + height - half),
                    Border::Left => g.move_to(x + half, y).line_to(x + half, y + height),
                    Border::Right => g.move_to(x + width - half, y).line_to(x + width - half, y + height),
                };
                g.stroke();
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
struct PlacedCell {
    index: usize,
    row: usize,
    col: usize,
    colspan: usize,
    rowspan: usize,
}

#[derive(Debug)]
struct TableLayout {
    widths: Vec<f32>,
    placed: Vec<PlacedCell>,
    prepared: Vec<(Vec<CellElement>, f32)>,
    row_heights: Vec<f32>,
    /// Rows `0..header_end` repeat on every area.
    header_end: usize,
    groups: Vec<Range<usize>>,
}

impl TableLayout {
    fn total_width(&self) -> f32 {
        self.widths.iter().sum()
    }

    fn rows_height(&self, rows: Range<usize>) -> f32 {
        self.row_heights[rows].iter().sum()
    }

    fn header_height(&self) -> f32 {
        self.rows_height(0..self.header_end)
    }

    /// Draws every cell starting in `rows` from (`x`, `y`) and returns the y below them.
    fn draw_rows(
        &self,
        cells: &[Cell],
        target: &mut dyn DrawTarget,
        rows: Range<usize>,
        x: Length,
        y: Length,
    ) -> Result<Length, LayoutError> {
        let (x, y) = (x.pt_value(), y.pt_value());
        for (slot, placed) in self.placed.iter().enumerate() {
            if !rows.contains(&placed.row) {
                continue;
            }
            let (elements, content_height) = &self.prepared[slot];
            let frame = [
                x + self.widths[..placed.col].iter().sum::<f32>(),
                y + self.rows_height(rows.start..placed.row),
                self.widths[placed.col..placed.col + placed.colspan].iter().sum(),
                self.rows_height(placed.row..placed.row + placed.rowspan),
            ];
            cells[placed.index].draw(target, elements, *content_height, frame)?;
        }
        Ok(Length::pt(y + self.rows_height(rows)))
    }
}

#[derive(Debug)]
pub struct Table {
    context: DrawingContext,
    columns: usize,
    widths: Option<Vec<Length>>,
    cells: Vec<Cell>,
    header_rows: usize,
    spacing_before: Length,
    spacing_after: Length,
    align: Align,
    layout: Option<TableLayout>,
    next_group: usize,
    started: bool,
}

impl Table {
    pub fn new(ctx: &DrawingContext, columns: usize) -> Result<Self, LayoutError> {
        if columns == 0 {
            return Err(LayoutError::InvalidColumnWidths("a table needs at least one column".to_string()));
        }
        Ok(Self {
            context: ctx.duplicate(),
            columns,
            widths: None,
            cells: Vec::new(),
            header_rows: 0,
            spacing_before: Length::ZERO,
            spacing_after: Length::ZERO,
            align: Align::Left,
            layout: None,
            next_group: 0,
            started: false,
        })
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn context(&self) -> &DrawingContext {
        &self.context
    }

    /// The table's own context; changes affect cells added afterwards.
    pub fn context_mut(&mut self) -> &mut DrawingContext {
        &mut self.context
    }

    pub fn column_widths(&self) -> Option<&[Length]> {
        self.widths.as_deref()
    }

    pub fn set_column_widths(&mut self, widths: &[Length]) -> Result<&mut Self, LayoutError> {
        if widths.len() != self.columns {
            return Err(LayoutError::ColumnMismatch { expected: self.columns, got: widths.len() });
        }
        if widths.iter().any(|w| w.is_negative()) {
            return Err(LayoutError::InvalidColumnWidths("negative column width".to_string()));
        }
        let total = widths.iter().fold(Length::ZERO, |sum, w| sum + *w);
        if !total.is_positive() {
            return Err(LayoutError::InvalidColumnWidths(format!("total width {} is not positive", total)));
        }
        self.widths = Some(widths.to_vec());
        self.layout = None;
        Ok(self)
    }

    /// Splits `total` between the columns in proportion to `ratios`.
    pub fn set_column_ratios(&mut self, total: Length, ratios: &[f32]) -> Result<&mut Self, LayoutError> {
        if ratios.len() != self.columns {
            return Err(LayoutError::ColumnMismatch { expected: self.columns, got: ratios.len() });
        }
        let sum: f32 = ratios.iter().sum();
        if !total.is_positive() || sum <= 0.0 || ratios.iter().any(|r| *r < 0.0) {
            return Err(LayoutError::InvalidColumnWidths(format!(
                "cannot split {} by ratios {:?}",
                total, ratios
            )));
        }
        let widths: Vec<Length> = ratios.iter().map(|r| total.scale(r / sum)).collect();
        self.set_column_widths(&widths)
    }

    pub fn set_header_rows(&mut self, rows: usize) -> &mut Self {
        self.header_rows = rows;
        self.layout = None;
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

    pub fn set_align(&mut self, align: Align) -> &mut Self {
        self.align = align;
        self
    }

    pub fn add_cell(&mut self, cell: &Cell) -> &mut Self {
        self.cells.push(cell.duplicate());
        self.layout = None;
        self
    }

    pub fn add_text_cell(&mut self, text: &str) -> Result<&mut Self, LayoutError> {
        let cell = Cell::text(&self.context, text)?;
        Ok(self.add_cell(&cell))
    }

    /// Adds a text cell whose alignment overrides the context's default cell style.
    pub fn add_text_cell_aligned(&mut self, text: &str, align: Align) -> Result<&mut Self, LayoutError> {
        let mut cell = Cell::text(&self.context, text)?;
        cell.set_align(align);
        Ok(self.add_cell(&cell))
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn row_count(&self) -> usize {
        self.place_cells().1
    }

    fn place_cells(&self) -> (Vec<PlacedCell>, usize) {
        let columns = self.columns;
        let mut occupied: Vec<Vec<bool>> = Vec::new();
        let ensure_rows = |occupied: &mut Vec<Vec<bool>>, rows: usize| {
            while occupied.len() < rows {
                occupied.push(vec![false; columns]);
            }
        };

        let mut placed = Vec::with_capacity(self.cells.len());
        let (mut row, mut col) = (0, 0);
        for (index, cell) in self.cells.iter().enumerate() {
            loop {
                if col >= columns {
                    row += 1;
                    col = 0;
                }
                ensure_rows(&mut occupied, row + 1);
                if !occupied[row][col] {
                    break;
                }
                col += 1;
            }

            let wanted = cell.style.colspan();
            let mut colspan = 1;
            while colspan < wanted && col + colspan < columns && !occupied[row][col + colspan] {
                colspan += 1;
            }
            if colspan < wanted {
                log::warn!("Cell {} asks for colspan {} but only {} columns are free", index, wanted, colspan);
            }

            let rowspan = cell.style.rowspan();
            ensure_rows(&mut occupied, row + rowspan);
            for slots in &mut occupied[row..row + rowspan] {
                for slot in &mut slots[col..col + colspan] {
                    *slot = true;
                }
            }
            placed.push(PlacedCell { index, row, col, colspan, rowspan });
            col += colspan;
        }

        let rows = placed.iter().map(|p| p.row + p.rowspan).max().unwrap_or(0);
        (placed, rows)
    }

    fn compute_layout(&self, widths: Vec<f32>) -> Result<TableLayout, LayoutError> {
        let (placed, rows) = self.place_cells();

        let mut prepared = Vec::with_capacity(placed.len());
        let mut row_heights = vec![0.0f32; rows];
        for p in &placed {
            let cell = &self.cells[p.index];
            let width: f32 = widths[p.col..p.col + p.colspan].iter().sum();
            let inner = (width - cell.style.horizontal_chrome().pt_value()).max(0.0);
            let (elements, content_height) = cell.prepare(Length::pt(inner))?;
            let required = content_height + cell.style.vertical_chrome().pt_value();
            if p.rowspan == 1 {
                row_heights[p.row] = row_heights[p.row].max(required);
            }
            prepared.push((elements, content_height));
        }
        for (p, (_, content_height)) in placed.iter().zip(&prepared) {
            if p.rowspan > 1 {
                let required = content_height + self.cells[p.index].style.vertical_chrome().pt_value();
                let last = p.row + p.rowspan - 1;
                let spanned: f32 = row_heights[p.row..=last].iter().sum();
                if required > spanned {
                    row_heights[last] += required - spanned;
                }
            }
        }

        let mut groups = Vec::new();
        let mut start = 0;
        while start < rows {
            let mut end = start + 1;
            let mut row = start;
            while row < end {
                for p in placed.iter().filter(|p| p.row == row) {
                    end = end.max(p.row + p.rowspan);
                }
                row += 1;
            }
            groups.push(start..end);
            start = end;
        }

        let mut header_end = 0;
        if self.header_rows > 0 {
            let wanted = self.header_rows.min(rows);
            header_end = groups.iter().map(|g| g.end).find(|end| *end >= wanted).unwrap_or(0);
        }
        groups.retain(|g| g.start >= header_end);
        if groups.is_empty() && header_end > 0 {
            // a table of only header rows flows them as ordinary rows
            groups.push(0..header_end);
            header_end = 0;
        }
        log::debug!(
            "Table layout: {} cells in {} rows, {} row groups, {} header rows",
            placed.len(),
            rows,
            groups.len(),
            header_end
        );

        Ok(TableLayout { widths, placed, prepared, row_heights, header_end, groups })
    }

    fn resolve_widths(&self, available: Length) -> Vec<f32> {
        match &self.widths {
            Some(widths) => widths.iter().map(|w| w.pt_value()).collect(),
            None => vec![available.pt_value() / self.columns as f32; self.columns],
        }
    }

    fn ensure_layout(&mut self, available: Length) -> Result<(), LayoutError> {
        let widths = self.resolve_widths(available);
        let stale = match &self.layout {
            Some(layout) => !float_slices_fuzzy_eq(&layout.widths, &widths),
            None => true,
        };
        if stale {
            self.layout = Some(self.compute_layout(widths)?);
        }
        Ok(())
    }

    /// Widest single-column content per column, including borders and padding.
    pub fn column_max_widths(&self) -> Result<Vec<Length>, LayoutError> {
        let (placed, _) = self.place_cells();
        let mut widths = vec![0.0f32; self.columns];
        for p in placed.iter().filter(|p| p.colspan == 1) {
            let cell = &self.cells[p.index];
            let width = cell.natural_width_pt()? + cell.style.horizontal_chrome().pt_value();
            widths[p.col] = widths[p.col].max(width);
        }
        Ok(widths.into_iter().map(Length::pt).collect())
    }

    /// Total width and height, in points. Requires column widths.
    pub fn size(&self) -> Result<Dimension, LayoutError> {
        let widths = self
            .widths
            .as_ref()
            .ok_or_else(|| LayoutError::InvalidColumnWidths("column widths are not set".to_string()))?;
        let layout = self.compute_layout(widths.iter().map(|w| w.pt_value()).collect())?;
        let height = layout.rows_height(0..layout.row_heights.len());
        Ok(Dimension::of(Unit::Pt, layout.total_width(), height))
    }

    /// Draws every row at `position` without pagination and returns the y below the table.
    pub fn draw_at(&mut self, target: &mut dyn DrawTarget, position: Dimension) -> Result<Length, LayoutError> {
        self.ensure_layout(target.geometry().print_width())?;
        match &self.layout {
            Some(layout) => {
                let rows = 0..layout.row_heights.len();
                layout.draw_rows(&self.cells, target, rows, position.x, position.y)
            }
            None => Ok(position.y),
        }
    }

    fn reset_flow(&mut self) {
        self.next_group = 0;
        self.started = false;
    }

    /// Flows the table onto a paginated target from its cursor.
    pub fn add_to_canvas(&mut self, target: &mut dyn DrawTarget) -> Result<FlowSummary, LayoutError> {
        self.reset_flow();
        let mut column = ColumnFlow::new();
        column.add_element(&mut *self);
        flow_to_canvas(target, &mut column)
    }

    pub fn add_to_canvas_aligned(&mut self, target: &mut dyn DrawTarget, align: Align) -> Result<FlowSummary, LayoutError> {
        self.align = align;
        self.add_to_canvas(target)
    }
}

impl Flowable for Table {
    fn flow_into(&mut self, target: &mut dyn DrawTarget, area: &Rect) -> Result<FlowOutcome, LayoutError> {
        self.ensure_layout(area.width)?;
        let Some(layout) = self.layout.as_ref() else {
            return Ok(FlowOutcome::done(area.y));
        };

        // spacing before stays pending until a row group lands
        let mut y = Length::pt(area.y.pt_value());
        if !self.started {
            y = y + self.spacing_before;
        }

        let slack = area.width.pt_value() - layout.total_width();
        let x = area.x
            + Length::pt(match self.align {
                Align::Center => slack / 2.0,
                Align::Right => slack,
                Align::Left | Align::Justified => 0.0,
            });
        let bottom = area.bottom().pt_value() + FIT_TOLERANCE;
        let header_height = layout.header_height();

        let mut header_drawn = false;
        let mut progressed = false;
        while let Some(group) = layout.groups.get(self.next_group) {
            let group_height = layout.rows_height(group.clone());
            let header_needed = if layout.header_end > 0 && !header_drawn { header_height } else { 0.0 };
            if y.pt_value() + header_needed + group_height > bottom {
                return Ok(FlowOutcome::blocked(y, progressed, Length::pt(header_height + group_height)));
            }
            if layout.header_end > 0 && !header_drawn {
                y = layout.draw_rows(&self.cells, target, 0..layout.header_end, x, y)?;
                header_drawn = true;
            }
            y = layout.draw_rows(&self.cells, target, group.clone(), x, y)?;
            self.next_group += 1;
            self.started = true;
            progressed = true;
        }
        Ok(FlowOutcome::done(y + self.spacing_after))
    }
}
