use crate::defaults::CellDefaults;
use crate::shared::Shared;
use pagewright_types::{Align, BorderSet, Color, Insets, Length, VerticalAlign};

#[derive(Clone, Debug, PartialEq)]
pub struct CellData {
    background: Option<Color>,
    borders: BorderSet,
    border_widths: Insets,
    padding: Insets,
    colspan: usize,
    rowspan: usize,
    align: Align,
    vertical_align: VerticalAlign,
}

impl From<&CellDefaults> for CellData {
    fn from(defaults: &CellDefaults) -> Self {
        let borders = if defaults.borders_visible { BorderSet::all() } else { BorderSet::none() };
        CellData {
            background: defaults.background,
            borders,
            border_widths: Insets::uniform(Length::pt(defaults.border_width_pt)),
            padding: Insets::uniform(Length::pt(defaults.padding_pt)),
            colspan: 1,
            rowspan: 1,
            align: defaults.align,
            vertical_align: defaults.vertical_align,
        }
    }
}

/// Table cell appearance, shared copy-on-write between cells.
#[derive(Clone, Debug)]
pub struct CellStyle(Shared<CellData>);

impl Default for CellStyle {
    fn default() -> Self {
        Self::from_defaults(&CellDefaults::default())
    }
}

impl CellStyle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_defaults(defaults: &CellDefaults) -> Self {
        Self(Shared::new(CellData::from(defaults)))
    }

    pub fn background(&self) -> Option<Color> {
        self.0.read(|d| d.background)
    }

    pub fn set_background(&mut self, color: Option<Color>) -> &mut Self {
        self.0.modify(|d| d.background = color);
        self
    }

    pub fn set_border_visible(&mut self, visible: bool) -> &mut Self {
        let borders = if visible { BorderSet::all() } else { BorderSet::none() };
        self.set_borders(borders)
    }

    pub fn borders(&self) -> BorderSet {
        self.0.read(|d| d.borders)
    }

    pub fn set_borders(&mut self, borders: BorderSet) -> &mut Self {
        self.0.modify(|d| d.borders = borders);
        self
    }

    pub fn border_widths(&self) -> Insets {
        self.0.read(|d| d.border_widths)
    }

    pub fn set_border_widths(&mut self, widths: Insets) -> &mut Self {
        self.0.modify(|d| d.border_widths = widths);
        self
    }

    pub fn padding(&self) -> Insets {
        self.0.read(|d| d.padding)
    }

    pub fn set_padding(&mut self, padding: Insets) -> &mut Self {
        self.0.modify(|d| d.padding = padding);
        self
    }

    pub fn colspan(&self) -> usize {
        self.0.read(|d| d.colspan)
    }

    /// Spans below 1 are treated as 1.
    pub fn set_colspan(&mut self, span: usize) -> &mut Self {
        self.0.modify(|d| d.colspan = span.max(1));
        self
    }

    pub fn rowspan(&self) -> usize {
        self.0.read(|d| d.rowspan)
    }

    pub fn set_rowspan(&mut self, span: usize) -> &mut Self {
        self.0.modify(|d| d.rowspan = span.max(1));
        self
    }

    pub fn align(&self) -> Align {
        self.0.read(|d| d.align)
    }

    pub fn set_align(&mut self, align: Align) -> &mut Self {
        self.0.modify(|d| d.align = align);
        self
    }

    pub fn vertical_align(&self) -> VerticalAlign {
        self.0.read(|d| d.vertical_align)
    }

    pub fn set_vertical_align(&mut self, align: VerticalAlign) -> &mut Self {
        self.0.modify(|d| d.vertical_align = align);
        self
    }

    /// Horizontal space taken by the left/right borders and padding.
    pub fn horizontal_chrome(&self) -> Length {
        self.0.read(|d| d.border_widths.horizontal() + d.padding.horizontal())
    }

    /// Vertical space taken by the top/bottom borders and padding.
    pub fn vertical_chrome(&self) -> Length {
        self.0.read(|d| d.border_widths.vertical() + d.padding.vertical())
    }

    pub fn duplicate(&self) -> Self {
        Self(self.0.duplicate())
    }

    pub fn share_count(&self) -> usize {
        self.0.share_count()
    }

    pub fn ptr_eq(&self, other: &CellStyle) -> bool {
        self.0.ptr_eq(&other.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagewright_types::Border;

    #[test]
    fn test_default_cell_style() {
        let style = CellStyle::new();
        assert_eq!(style.borders(), BorderSet::all());
        assert_eq!(style.border_widths().left, Length::pt(0.5));
        assert_eq!(style.padding().top, Length::pt(2.0));
        assert_eq!(style.colspan(), 1);
        assert_eq!(style.rowspan(), 1);
        assert_eq!(style.align(), Align::Left);
        assert_eq!(style.vertical_align(), VerticalAlign::Top);
        assert_eq!(style.horizontal_chrome(), Length::pt(5.0));
    }

    #[test]
    fn test_setters_copy_on_write() {
        let base = CellStyle::new();
        let mut spanned = base.duplicate();
        spanned.set_colspan(3).set_align(Align::Right).set_border_visible(false);

        assert_eq!(base.colspan(), 1);
        assert_eq!(base.align(), Align::Left);
        assert!(base.borders().contains(Border::Top));
        assert_eq!(spanned.colspan(), 3);
        assert!(spanned.borders().is_empty());
        assert_eq!(base.share_count(), 1);
    }

    #[test]
    fn test_zero_span_clamps_to_one() {
        let mut style = CellStyle::new();
        style.set_rowspan(0);
        assert_eq!(style.rowspan(), 1);
    }
}
