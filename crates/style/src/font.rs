use crate::base_font::BaseFont;
use crate::shared::Shared;
use pagewright_traits::{BackendFont, FontError, FontStyleSet};
use pagewright_types::{Color, Length};
use std::sync::Arc;

#[derive(Clone, Debug)]
pub struct FontData {
    base: BaseFont,
    size_pt: f32,
    style: FontStyleSet,
    color: Color,
}

/// A sized, styled and coloured use of a [`BaseFont`].
#[derive(Clone, Debug)]
pub struct Font(Shared<FontData>);

impl Font {
    pub fn new(base: BaseFont, size: Length) -> Self {
        let style = base.style();
        Self(Shared::new(FontData {
            base,
            size_pt: size.pt_value(),
            style,
            color: Color::BLACK,
        }))
    }

    pub fn size(&self) -> Length {
        Length::pt(self.0.read(|d| d.size_pt))
    }

    pub fn set_size(&mut self, size: Length) -> &mut Self {
        let size_pt = size.pt_value();
        self.0.modify(|d| d.size_pt = size_pt);
        self
    }

    pub fn style(&self) -> FontStyleSet {
        self.0.read(|d| d.style)
    }

    pub fn set_style(&mut self, style: FontStyleSet) -> &mut Self {
        self.0.modify(|d| d.style = style);
        self
    }

    pub fn is_underlined(&self) -> bool {
        self.0.read(|d| d.style.underline)
    }

    pub fn color(&self) -> Color {
        self.0.read(|d| d.color)
    }

    pub fn set_color(&mut self, color: Color) -> &mut Self {
        self.0.modify(|d| d.color = color);
        self
    }

    pub fn base_font(&self) -> BaseFont {
        self.0.read(|d| d.base.duplicate())
    }

    /// The backend font matching this font's bold/italic bits.
    pub fn backend_font(&self) -> Result<Arc<dyn BackendFont>, FontError> {
        self.0.read(|d| d.base.styled(d.style))
    }

    /// Measured advance width of `text`, in points.
    pub fn string_width(&self, text: &str) -> Result<Length, FontError> {
        let font = self.backend_font()?;
        let size_pt = self.0.read(|d| d.size_pt);
        Ok(Length::pt(font.string_width_pt(text, size_pt)))
    }

    pub fn duplicate(&self) -> Self {
        Self(self.0.duplicate())
    }

    pub fn share_count(&self) -> usize {
        self.0.share_count()
    }

    pub fn ptr_eq(&self, other: &Font) -> bool {
        self.0.ptr_eq(&other.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{courier, test_backend};
    use pagewright_traits::Encoding;

    #[test]
    fn test_create_font_measures_in_points() {
        let base = courier();
        let font = base.create_font(Length::pt(10.0));
        assert_eq!(font.size(), Length::pt(10.0));
        assert_eq!(font.string_width("abc").unwrap(), Length::pt(18.0));
    }

    #[test]
    fn test_font_size_from_millimetres() {
        let font = courier().create_font(Length::mm(3.0));
        assert!((font.size().pt_value() - 8.503937).abs() < 1e-3);
    }

    #[test]
    fn test_duplicate_then_modify_is_isolated() {
        let a = courier().create_font(Length::pt(10.0));
        let mut b = a.duplicate();
        assert!(a.ptr_eq(&b));

        b.set_size(Length::pt(20.0)).set_color(Color::RED);
        assert_eq!(a.size(), Length::pt(10.0));
        assert_eq!(a.color(), Color::BLACK);
        assert_eq!(b.size(), Length::pt(20.0));
        assert_eq!(b.color(), Color::RED);
    }

    #[test]
    fn test_styled_variant_is_cached_per_base_font() {
        let backend = test_backend();
        let base = BaseFont::new(backend.clone(), "Courier", Encoding::WinAnsi, false).unwrap();
        let mut font = base.create_font(Length::pt(10.0));
        font.set_style(FontStyleSet::BOLD.with_underline(true));

        let first = font.backend_font().unwrap();
        let second = font.backend_font().unwrap();
        assert_eq!(first.postscript_name(), "Courier-Bold");
        assert!(Arc::ptr_eq(&first, &second));
        assert!(font.is_underlined());
        // one plain resolution plus one bold variant
        assert_eq!(backend.requests(), 2);
    }

    #[test]
    fn test_set_embedded_is_copy_on_write() {
        let base = courier();
        let mut other = base.duplicate();
        other.set_embedded(true).unwrap();
        assert!(!base.embedded());
        assert!(other.embedded());
        assert!(!base.ptr_eq(&other));
    }
}
