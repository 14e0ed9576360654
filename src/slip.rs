//! A delivery slip: addressed customer block, title, logo and a multi-page
//! sales table with page numbers filled in once the page total is known.

use crate::config::RenderConfig;
use crate::error::PagewrightError;
use pagewright_layout::{
    Cell, Document, DrawTarget, FlowSummary, Graphics, Image, PageNumbering, Paginated, Table, TextBlock,
    format_price,
};
use pagewright_render_lopdf::LopdfBackend;
use pagewright_traits::{FilesystemResourceProvider, FontBackend};
use pagewright_types::{Align, Dimension, Length, Rect, Unit, VerticalAlign};
use std::io::Write;
use std::sync::Arc;

/// Where the sales table starts, below the address block and logo.
const TABLE_TOP_MM: f32 = 55.0;
const LOGO_SIZE_MM: f32 = 50.0;
const COLUMN_RATIOS: [f32; 6] = [15.0, 15.0, 100.0, 15.0, 15.0, 15.0];
const HEADINGS: [&str; 6] = ["", "Code", "Item", "Price", "Qty", "Amount"];

#[derive(Debug, Clone, PartialEq)]
pub struct SlipLine {
    pub code: String,
    pub name: String,
    pub unit_price: i64,
    pub quantity: i64,
}

impl SlipLine {
    pub fn amount(&self) -> i64 {
        self.unit_price * self.quantity
    }
}

/// One purchase date and the lines bought on it.
#[derive(Debug, Clone, PartialEq)]
pub struct SalesGroup {
    pub label: String,
    pub lines: Vec<SlipLine>,
}

impl SalesGroup {
    pub fn subtotal(&self) -> i64 {
        self.lines.iter().map(SlipLine::amount).sum()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeliverySlip {
    pub address: String,
    pub title: String,
    pub groups: Vec<SalesGroup>,
}

impl DeliverySlip {
    /// Generated sample data: `groups` purchase dates of `rows_per_group` lines each.
    pub fn sample(groups: usize, rows_per_group: usize) -> Self {
        let groups = (0..groups)
            .map(|group| SalesGroup {
                label: format!("Purchases of {:02}/{:02}", group % 12 + 1, group % 28 + 1),
                lines: (1..=rows_per_group.max(1) as i64)
                    .map(|detail| SlipLine {
                        code: format!("{:05}", 1234 + detail),
                        name: format!("Product name {}", detail),
                        unit_price: detail * 100,
                        quantity: detail,
                    })
                    .collect(),
            })
            .collect();
        Self {
            address: "ZIP 123-4567\n\n12-23-34 Sample Street, Example City\n\nMr. Ichiro Suzuki".to_string(),
            title: "Delivery Slip".to_string(),
            groups,
        }
    }

    pub fn grand_total(&self) -> i64 {
        self.groups.iter().map(SalesGroup::subtotal).sum()
    }

    /// Lays the slip out and writes it as PDF to `writer`, which is returned.
    pub fn render<W: Write>(&self, config: &RenderConfig, writer: W) -> Result<W, PagewrightError> {
        let fonts: Arc<dyn FontBackend> = Arc::new(config.font_library()?);
        let context = config.context(fonts)?;
        let geometry = config.geometry()?;
        let logo = load_logo(config)?;

        let mut document = Document::open(LopdfBackend::new(writer), context, geometry)?;
        let numbering = PageNumbering::attach(
            &mut document,
            geometry.bottom_left(),
            Dimension::new(geometry.print_width(), config.font_size()),
        )?;

        let summary = {
            let mut canvas = document.canvas_over();
            self.draw_customer(&mut canvas)?;
            self.draw_title(&mut canvas)?;
            draw_logo(&mut canvas, logo);
            canvas.set_vertical(Length::mm(TABLE_TOP_MM));
            self.draw_table(&mut canvas)?
        };
        log::debug!("Sales table broke {} times, ending at {}", summary.page_breaks, summary.final_y);

        numbering.borrow_mut().fill_with(|template, page, total| {
            let mut block = TextBlock::new(template.context(), &format!("{} / {}", page, total))?;
            block.set_limit_width(Some(template.size().x)).set_block_align(Align::Center);
            block.draw_at(template, Dimension::ZERO)?;
            Ok(())
        })?;

        let pages = numbering.borrow().total_pages();
        let backend = document.close()?;
        log::info!("Delivery slip written: {} pages, total {}", pages, format_price(self.grand_total(), ""));
        Ok(backend.into_writer()?)
    }

    fn draw_customer(&self, target: &mut dyn DrawTarget) -> Result<(), PagewrightError> {
        let block = TextBlock::new(target.context(), &self.address)?;
        block.draw_at(target, Dimension::ZERO)?;

        let mut graphics = Graphics::begin(target, Unit::Mm);
        graphics.set_line_width(0.1).stroke_rect(0.0, 0.0, 50.0, 30.0);
        graphics.finish();
        Ok(())
    }

    fn draw_title(&self, target: &mut dyn DrawTarget) -> Result<(), PagewrightError> {
        let mut context = target.context().duplicate();
        context.set_font_size(Length::mm(6.0))?;
        let mut title = TextBlock::new(&context, &self.title)?;
        title
            .set_limit_width(Some(target.geometry().print_width()))
            .set_block_align(Align::Center);
        title.draw_at(target, Dimension::ZERO)?;
        Ok(())
    }

    fn draw_table(&self, canvas: &mut dyn Paginated) -> Result<FlowSummary, PagewrightError> {
        let mut table = Table::new(canvas.context(), COLUMN_RATIOS.len())?;
        table
            .set_column_ratios(canvas.geometry().print_width(), &COLUMN_RATIOS)?
            .set_header_rows(1);
        for heading in HEADINGS {
            table.add_text_cell_aligned(heading, Align::Center)?;
        }

        for group in &self.groups {
            let mut date = Cell::text(table.context(), &group.label)?;
            date.set_colspan(COLUMN_RATIOS.len());
            table.add_cell(&date);

            let mut detail = Cell::text(table.context(), "Detail")?;
            detail
                .set_rowspan(group.lines.len().max(1))
                .set_align(Align::Center)
                .set_vertical_align(VerticalAlign::Middle);
            table.add_cell(&detail);
            for line in &group.lines {
                table
                    .add_text_cell_aligned(&line.code, Align::Right)?
                    .add_text_cell(&line.name)?
                    .add_text_cell_aligned(&format_price(line.unit_price, ""), Align::Right)?
                    .add_text_cell_aligned(&line.quantity.to_string(), Align::Right)?
                    .add_text_cell_aligned(&format_price(line.amount(), ""), Align::Right)?;
            }
            add_total_row(&mut table, "Subtotal", group.subtotal())?;
        }
        add_total_row(&mut table, "Grand total", self.grand_total())?;

        Ok(table.add_to_canvas(canvas.as_draw_target())?)
    }
}

/// A borderless spacer over the first three columns, then a caption and an amount.
fn add_total_row(table: &mut Table, caption: &str, amount: i64) -> Result<(), PagewrightError> {
    let mut spacer = Cell::empty(table.context())?;
    spacer.set_colspan(3).set_border_visible(false);
    table.add_cell(&spacer);

    let mut label = Cell::text(table.context(), caption)?;
    label.set_colspan(2);
    table.add_cell(&label);
    table.add_text_cell_aligned(&format_price(amount, ""), Align::Right)?;
    Ok(())
}

fn draw_logo(target: &mut dyn DrawTarget, mut logo: Image) {
    let print_width = target.geometry().print_width().mm_value();
    logo.set_size_aspect(Dimension::of(Unit::Mm, LOGO_SIZE_MM, LOGO_SIZE_MM));
    let area = Rect::of(Unit::Mm, print_width - LOGO_SIZE_MM, 0.0, LOGO_SIZE_MM, LOGO_SIZE_MM);
    logo.draw_centered(target, &area);
}

fn load_logo(config: &RenderConfig) -> Result<Image, PagewrightError> {
    match &config.logo {
        Some(path) => {
            let provider = FilesystemResourceProvider::new(".");
            Ok(Image::from_provider(&provider, &path.to_string_lossy())?)
        }
        None => Ok(placeholder_logo()?),
    }
}

/// A 64x48 blue-to-green gradient standing in for a logo file.
fn placeholder_logo() -> Result<Image, pagewright_layout::LayoutError> {
    let (width, height) = (64u32, 48u32);
    let mut rgb = Vec::with_capacity((width * height * 3) as usize);
    for y in 0..height {
        for x in 0..width {
            rgb.extend_from_slice(&[0x20, (x * 255 / width) as u8, (y * 255 / height) as u8]);
        }
    }
    Image::from_rgb(width, height, rgb)
}
