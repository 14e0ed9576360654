use crate::LayoutError;
use crate::flow::{ColumnFlow, FlowOutcome, FlowSummary, Flowable, flow_to_canvas};
use crate::surface::DrawTarget;
use pagewright_render_core::{DrawOp, ImageData, RenderError};
use pagewright_traits::ResourceProvider;
use pagewright_types::{Dimension, Length, Rect, Unit};
use std::sync::Arc;

/// A raster image with a draw size. Defaults to one point per pixel.
///
/// As a [`Flowable`] it is drawn once per flow; [`Image::add_to_canvas`]
/// starts a new flow, and [`Image::reset`] rearms it for a hand-built column.
#[derive(Debug, Clone)]
pub struct Image {
    data: Arc<ImageData>,
    draw_size: Dimension,
    placed: bool,
}

impl Image {
    /// Decodes PNG or JPEG bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, LayoutError> {
        let decoded = ::image::load_from_memory(bytes).map_err(|e| LayoutError::Image(e.to_string()))?;
        let rgb = decoded.to_rgb8();
        let (width, height) = rgb.dimensions();
        log::debug!("Decoded {}x{} image", width, height);
        Self::from_rgb(width, height, rgb.into_raw())
    }

    pub fn from_provider(provider: &dyn ResourceProvider, path: &str) -> Result<Self, LayoutError> {
        let bytes = provider.load(path).map_err(RenderError::from)?;
        Self::from_bytes(&bytes)
    }

    pub fn from_rgb(width: u32, height: u32, rgb: Vec<u8>) -> Result<Self, LayoutError> {
        let expected = width as usize * height as usize * 3;
        if rgb.len() != expected || width == 0 || height == 0 {
            return Err(LayoutError::Image(format!(
                "expected {} RGB bytes for a {}x{} image, got {}",
                expected,
                width,
                height,
                rgb.len()
            )));
        }
        Ok(Self {
            data: Arc::new(ImageData { width, height, rgb }),
            draw_size: Dimension::of(Unit::Pt, width as f32, height as f32),
            placed: false,
        })
    }

    pub fn data(&self) -> &Arc<ImageData> {
        &self.data
    }

    pub fn pixel_width(&self) -> u32 {
        self.data.width
    }

    pub fn pixel_height(&self) -> u32 {
        self.data.height
    }

    pub fn draw_size(&self) -> Dimension {
        self.draw_size
    }

    pub fn set_draw_size(&mut self, size: Dimension) -> &mut Self {
        self.draw_size = size;
        self
    }

    /// Fits the image inside `size`, keeping its aspect ratio.
    pub fn set_size_aspect(&mut self, size: Dimension) -> &mut Self {
        let pw = self.data.width as f32;
        let ph = self.data.height as f32;
        self.draw_size = if size.y.value * pw < ph * size.x.value_in(size.y.unit) {
            let height = size.y;
            Dimension::new(height.scale(pw / ph), height)
        } else {
            let width = size.x;
            Dimension::new(width, width.scale(ph / pw))
        };
        self
    }

    /// Draws the image with its top-left corner at `position`.
    pub fn draw_at(&self, target: &mut dyn DrawTarget, position: Dimension) {
        let anchor = target
            .geometry()
            .to_backend_xy(position.x, position.y + self.draw_size.y);
        target.emit(DrawOp::PlaceImage {
            image: Arc::clone(&self.data),
            x: anchor.x,
            y: anchor.y,
            width: self.draw_size.x.pt_value(),
            height: self.draw_size.y.pt_value(),
        });
    }

    pub fn reset(&mut self) {
        self.placed = false;
    }

    /// Flows the image onto a paginated target at its cursor, breaking the
    /// page first when it does not fit below.
    pub fn add_to_canvas(&mut self, target: &mut dyn DrawTarget) -> Result<FlowSummary, LayoutError> {
        self.reset();
        let mut column = ColumnFlow::new();
        column.add_element(&mut *self);
        flow_to_canvas(target, &mut column)
    }

    /// Draws the image centred in `area`.
    pub fn draw_centered(&self, target: &mut dyn DrawTarget, area: &Rect) {
        let x = area.x + (area.width - self.draw_size.x).scale(0.5);
        let y = area.y + (area.height - self.draw_size.y).scale(0.5);
        self.draw_at(target, Dimension::new(x, y));
    }
}

impl Flowable for Image {
    fn flow_into(&mut self, target: &mut dyn DrawTarget, area: &Rect) -> Result<FlowOutcome, LayoutError> {
        if self.placed {
            return Ok(FlowOutcome::done(area.y));
        }
        let height = self.draw_size.y;
        if height > area.height + Length::pt(0.01) {
            return Ok(FlowOutcome::blocked(area.y, false, height));
        }
        self.draw_at(target, area.top_left());
        self.placed = true;
        Ok(FlowOutcome::done(area.y + height))
    }
}
