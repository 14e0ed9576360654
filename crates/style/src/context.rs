//! The drawing context: a bag of duplicable values keyed by their type.

use crate::base_font::BaseFont;
use crate::cell::CellStyle;
use crate::error::StyleError;
use crate::font::Font;
use pagewright_types::Length;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;

/// A value that can be cheaply duplicated into a child context.
pub trait Duplicate: 'static {
    fn duplicate(&self) -> Self
    where
        Self: Sized;
}

impl Duplicate for Font {
    fn duplicate(&self) -> Self {
        Font::duplicate(self)
    }
}

impl Duplicate for BaseFont {
    fn duplicate(&self) -> Self {
        BaseFont::duplicate(self)
    }
}

impl Duplicate for CellStyle {
    fn duplicate(&self) -> Self {
        CellStyle::duplicate(self)
    }
}

trait ContextValue {
    fn duplicate_boxed(&self) -> Box<dyn ContextValue>;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
    fn type_name(&self) -> &'static str;
}

impl<T: Duplicate> ContextValue for T {
    fn duplicate_boxed(&self) -> Box<dyn ContextValue> {
        Box::new(Duplicate::duplicate(self))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

#[derive(Default)]
pub struct DrawingContext {
    entries: HashMap<TypeId, Box<dyn ContextValue>>,
}

impl DrawingContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get<T: Duplicate>(&self) -> Option<&T> {
        self.entries
            .get(&TypeId::of::<T>())
            .and_then(|value| value.as_any().downcast_ref::<T>())
    }

    pub fn get_mut<T: Duplicate>(&mut self) -> Option<&mut T> {
        self.entries
            .get_mut(&TypeId::of::<T>())
            .and_then(|value| value.as_any_mut().downcast_mut::<T>())
    }

    /// Installs `value`, returning the entry it replaced.
    pub fn put<T: Duplicate>(&mut self, value: T) -> Option<T> {
        let previous = self.entries.insert(TypeId::of::<T>(), Box::new(value))?;
        previous.into_any().downcast::<T>().ok().map(|boxed| *boxed)
    }

    pub fn contains<T: Duplicate>(&self) -> bool {
        self.entries.contains_key(&TypeId::of::<T>())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn require<T: Duplicate>(&self, name: &'static str) -> Result<&T, StyleError> {
        self.get::<T>().ok_or(StyleError::MissingEntry(name))
    }

    fn require_mut<T: Duplicate>(&mut self, name: &'static str) -> Result<&mut T, StyleError> {
        self.get_mut::<T>().ok_or(StyleError::MissingEntry(name))
    }

    pub fn font(&self) -> Result<&Font, StyleError> {
        self.require::<Font>("font")
    }

    pub fn font_mut(&mut self) -> Result<&mut Font, StyleError> {
        self.require_mut::<Font>("font")
    }

    pub fn set_font(&mut self, font: Font) -> &mut Self {
        self.put(font);
        self
    }

    /// Creates a font of `size` from the current base font and makes it current.
    pub fn set_font_size(&mut self, size: Length) -> Result<Font, StyleError> {
        let font = self.base_font()?.create_font(size);
        self.put(font.duplicate());
        Ok(font)
    }

    pub fn base_font(&self) -> Result<&BaseFont, StyleError> {
        self.require::<BaseFont>("base font")
    }

    pub fn set_base_font(&mut self, base: BaseFont) -> &mut Self {
        self.put(base);
        self
    }

    pub fn cell(&self) -> Result<&CellStyle, StyleError> {
        self.require::<CellStyle>("cell style")
    }

    pub fn cell_mut(&mut self) -> Result<&mut CellStyle, StyleError> {
        self.require_mut::<CellStyle>("cell style")
    }

    pub fn set_cell(&mut self, cell: CellStyle) -> &mut Self {
        self.put(cell);
        self
    }

    /// Duplicates every entry. Changes to the copy never reach `self`.
    pub fn duplicate(&self) -> Self {
        let entries = self
            .entries
            .iter()
            .map(|(key, value)| (*key, value.duplicate_boxed()))
            .collect();
        Self { entries }
    }
}

impl Clone for DrawingContext {
    fn clone(&self) -> Self {
        self.duplicate()
    }
}

impl fmt::Debug for DrawingContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.entries.values().map(|v| v.type_name()).collect();
        names.sort_unstable();
        f.debug_struct("DrawingContext").field("entries", &names).finish()
    }
}
