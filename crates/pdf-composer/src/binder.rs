use crate::error::ComposerError;
use crate::{merge_documents, page_ids};
use lopdf::Document;
use std::io::{Read, Write};
use std::path::Path;

/// Concatenates whole PDF documents, in the order they are added.
///
/// The first document becomes the base; the pages of every later one are
/// appended to it.
#[derive(Default)]
pub struct Binder {
    bound: Option<Document>,
}

impl Binder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_document(&mut self, document: Document) -> Result<&mut Self, ComposerError> {
        match self.bound.as_mut() {
            Some(bound) => merge_documents(bound, document, false)?,
            None => {
                log::debug!("Binder base document has {} pages", page_ids(&document).len());
                self.bound = Some(document);
            }
        }
        Ok(self)
    }

    pub fn add_bytes(&mut self, bytes: &[u8]) -> Result<&mut Self, ComposerError> {
        self.add_document(Document::load_mem(bytes)?)
    }

    pub fn add_reader<R: Read>(&mut self, reader: R) -> Result<&mut Self, ComposerError> {
        self.add_document(Document::load_from(reader)?)
    }

    pub fn add_file(&mut self, path: impl AsRef<Path>) -> Result<&mut Self, ComposerError> {
        let path = path.as_ref();
        log::debug!("Binding {}", path.display());
        self.add_document(Document::load(path)?)
    }

    /// Pages bound so far.
    pub fn page_count(&self) -> usize {
        self.bound.as_ref().map_or(0, |doc| doc.get_pages().len())
    }

    /// Writes the bound document to `writer` and returns it.
    pub fn finish<W: Write>(self, mut writer: W) -> Result<W, ComposerError> {
        let mut bound = self.bound.ok_or(ComposerError::Empty)?;
        bound.renumber_objects();
        bound.save_to(&mut writer)?;
        writer.flush()?;
        Ok(writer)
    }
}
