//! PDF composition utilities for merging, binding and stamping PDF documents.
//!
//! This crate provides low-level PDF manipulation using lopdf:
//! - Deep object copying with cycle detection
//! - Document merging (prepend/append pages) and the [`Binder`]
//! - Content overlaying and underlaying
//! - The [`Stamper`], which draws layout content onto existing pages

mod binder;
mod error;
mod stamper;

pub use binder::Binder;
pub use error::ComposerError;
pub use stamper::{StampSurface, Stamper};

use lopdf::{Document, Object, ObjectId, Stream, dictionary};
use std::collections::{HashMap, HashSet};

/// Page attributes a page may inherit from its ancestors in the page tree.
const INHERITABLE: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// A helper struct to manage the state of copying objects between documents.
struct ObjectCopier<'a> {
    source_doc: &'a Document,
    target_doc: &'a mut Document,
    id_map: HashMap<ObjectId, ObjectId>,
}

impl<'a> ObjectCopier<'a> {
    fn new(source_doc: &'a Document, target_doc: &'a mut Document) -> Self {
        Self { source_doc, target_doc, id_map: HashMap::new() }
    }

    /// Deep copies an object from the source document to the target document.
    /// Each object is copied once; the id is mapped before recursing so that
    /// reference cycles terminate.
    fn copy_object(&mut self, source_id: ObjectId) -> Result<ObjectId, lopdf::Error> {
        if let Some(target_id) = self.id_map.get(&source_id) {
            return Ok(*target_id);
        }

        let new_id = self.target_doc.add_object(Object::Null);
        self.id_map.insert(source_id, new_id);

        let obj = self.source_doc.get_object(source_id)?.clone();
        let new_obj = self.remap_references(obj)?;
        self.store(new_id, new_obj)?;
        Ok(new_id)
    }

    /// Copies a page without its `Parent` link, pulling inherited attributes
    /// down onto the page so it stands alone in the target's page tree.
    fn copy_page(&mut self, source_id: ObjectId) -> Result<ObjectId, lopdf::Error> {
        let mut page = self.source_doc.get_dictionary(source_id)?.clone();
        for key in INHERITABLE {
            if !page.has(key)
                && let Some(value) = inherited_attribute(self.source_doc, source_id, key)?
            {
                page.set(key.to_vec(), value);
            }
        }
        page.remove(b"Parent");

        let new_id = self.target_doc.add_object(Object::Null);
        self.id_map.insert(source_id, new_id);
        let new_obj = self.remap_references(Object::Dictionary(page))?;
        self.store(new_id, new_obj)?;
        Ok(new_id)
    }

    fn store(&mut self, id: ObjectId, object: Object) -> Result<(), lopdf::Error> {
        match self.target_doc.objects.get_mut(&id) {
            Some(target_obj) => {
                *target_obj = object;
                Ok(())
            }
            None => Err(lopdf::Error::ObjectNotFound(id)),
        }
    }

    /// Traverses an object and replaces any `Object::Reference` with a new ID
    /// from the target document by recursively calling `copy_object`.
    fn remap_references(&mut self, obj: Object) -> Result<Object, lopdf::Error> {
        match obj {
            Object::Reference(id) => {
                let new_id = self.copy_object(id)?;
                Ok(Object::Reference(new_id))
            }
            Object::Array(arr) => {
                let new_arr = arr
                    .into_iter()
                    .map(|o| self.remap_references(o))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Object::Array(new_arr))
            }
            Object::Dictionary(mut dict) => {
                for (_, value) in dict.iter_mut() {
                    *value = self.remap_references(value.clone())?;
                }
                Ok(Object::Dictionary(dict))
            }
            Object::Stream(mut stream) => {
                for (_, value) in stream.dict.iter_mut() {
                    *value = self.remap_references(value.clone())?;
                }
                Ok(Object::Stream(stream))
            }
            _ => Ok(obj),
        }
    }
}

/// Looks `key` up on a page, then on its ancestors in the page tree.
pub(crate) fn inherited_attribute(
    doc: &Document,
    page_id: ObjectId,
    key: &[u8],
) -> Result<Option<Object>, lopdf::Error> {
    let mut current = page_id;
    let mut visited = HashSet::new();
    while visited.insert(current) {
        let dict = doc.get_dictionary(current)?;
        if let Ok(value) = dict.get(key) {
            return Ok(Some(value.clone()));
        }
        match dict.get(b"Parent").and_then(Object::as_reference) {
            Ok(parent) => current = parent,
            Err(_) => break,
        }
    }
    Ok(None)
}

/// Page object ids in page order.
pub fn page_ids(doc: &Document) -> Vec<ObjectId> {
    doc.get_pages().into_values().collect()
}

/// Merges the pages from a source document into a target document.
///
/// Every page and the objects it references (resources, content streams,
/// fonts) are copied from `source` to `target` under fresh object ids.
///
/// # Arguments
/// * `target` - The document to merge into.
/// * `source` - The document to take pages from.
/// * `prepend` - If `true`, pages from `source` are added to the beginning.
///   If `false`, they are appended.
///
/// Links and outlines in `target` are not adjusted.
pub fn merge_documents(target: &mut Document, source: Document, prepend: bool) -> Result<(), ComposerError> {
    let source_pages = page_ids(&source);
    if source_pages.is_empty() {
        return Ok(());
    }

    let mut copier = ObjectCopier::new(&source, target);
    let mut copied_page_ids = Vec::with_capacity(source_pages.len());
    for page_id in &source_pages {
        copied_page_ids.push(copier.copy_page(*page_id)?);
    }
    let new_kids: Vec<Object> = copied_page_ids.iter().map(|id| Object::Reference(*id)).collect();

    let root_id = target.trailer.get(b"Root")?.as_reference()?;
    let pages_id = target.get_dictionary(root_id)?.get(b"Pages")?.as_reference()?;
    let pages_dict = target.get_object_mut(pages_id)?.as_dict_mut()?;

    let mut kids = pages_dict.get(b"Kids")?.as_array()?.clone();
    let original_count = pages_dict.get(b"Count")?.as_i64()?;
    if prepend {
        let mut final_kids = new_kids;
        final_kids.extend(kids);
        kids = final_kids;
    } else {
        kids.extend(new_kids);
    }
    pages_dict.set("Kids", Object::Array(kids));
    pages_dict.set("Count", original_count + source_pages.len() as i64);

    for page_id in copied_page_ids {
        if let Ok(Object::Dictionary(page_dict)) = target.get_object_mut(page_id) {
            page_dict.set("Parent", Object::Reference(pages_id));
        }
    }
    log::debug!(
        "Merged {} pages ({})",
        source_pages.len(),
        if prepend { "prepended" } else { "appended" }
    );
    Ok(())
}

fn add_content(doc: &mut Document, page_id: ObjectId, content_stream: Vec<u8>, on_top: bool) -> Result<(), ComposerError> {
    let stream = Stream::new(dictionary! {}, content_stream);
    let new_content_id = doc.add_object(Object::Stream(stream));

    let page_dict = doc.get_object_mut(page_id)?.as_dict_mut()?;
    let mut contents = match page_dict.get(b"Contents") {
        Ok(Object::Array(arr)) => arr.clone(),
        Ok(single) => vec![single.clone()],
        Err(_) => {
            return Err(ComposerError::Other(format!("Page {:?} is missing a /Contents key.", page_id)));
        }
    };
    if on_top {
        contents.push(Object::Reference(new_content_id));
    } else {
        contents.insert(0, Object::Reference(new_content_id));
    }
    page_dict.set("Contents", Object::Array(contents));
    Ok(())
}

/// Adds a new content stream to an existing page, drawn on top of its
/// current content. Used for headers, footers and watermarks.
///
/// # Arguments
/// * `doc` - The document containing the page to modify.
/// * `page_id` - The `ObjectId` of the page to add the overlay to.
/// * `content_stream` - The raw bytes of the new content stream.
pub fn overlay_content(doc: &mut Document, page_id: ObjectId, content_stream: Vec<u8>) -> Result<(), ComposerError> {
    add_content(doc, page_id, content_stream, true)
}

/// Adds a new content stream to an existing page, drawn underneath its current content.
pub fn underlay_content(doc: &mut Document, page_id: ObjectId, content_stream: Vec<u8>) -> Result<(), ComposerError> {
    add_content(doc, page_id, content_stream, false)
}


#[cfg(test)]
mod tests {
    use super::test_support::create_dummy_pdf;
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{Object, StringFormat};

    fn page_text(doc: &Document, page_number: u32) -> String {
        let pages = doc.get_pages();
        let content = doc.get_page_content(pages[&page_number]).unwrap();
        String::from_utf8_lossy(&content).to_string()
    }

    fn text_stream(text: &str) -> Vec<u8> {
        Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![100.into(), 100.into()]),
                Operation::new("Tj", vec![Object::String(text.as_bytes().to_vec(), StringFormat::Literal)]),
                Operation::new("ET", vec![]),
            ],
        }
        .encode()
        .unwrap()
    }

    #[test]
    fn test_merge_documents_append() {
        let mut target_doc = create_dummy_pdf(2, "Target Page");
        let source_doc = create_dummy_pdf(3, "Source Page");

        merge_documents(&mut target_doc, source_doc, false).unwrap();

        assert_eq!(target_doc.get_pages().len(), 5);
        assert!(page_text(&target_doc, 3).contains("Source Page 1"));
        assert!(page_text(&target_doc, 5).contains("Source Page 3"));
    }

    #[test]
    fn test_merge_documents_prepend() {
        let mut target_doc = create_dummy_pdf(2, "Target Page");
        let source_doc = create_dummy_pdf(3, "Source Page");

        merge_documents(&mut target_doc, source_doc, true).unwrap();

        assert_eq!(target_doc.get_pages().len(), 5);
        assert!(page_text(&target_doc, 1).contains("Source Page 1"));
        assert!(page_text(&target_doc, 4).contains("Target Page 1"));
    }

    #[test]
    fn test_merged_pages_carry_inherited_attributes() {
        let mut target_doc = create_dummy_pdf(1, "Target Page");
        let source_doc = create_dummy_pdf(1, "Source Page");
        merge_documents(&mut target_doc, source_doc, false).unwrap();

        let copied = page_ids(&target_doc)[1];
        let page = target_doc.get_dictionary(copied).unwrap();
        assert!(page.has(b"Resources"));
        assert!(page.has(b"MediaBox"));
        let root_pages = target_doc.catalog().unwrap().get(b"Pages").unwrap().as_reference().unwrap();
        assert_eq!(page.get(b"Parent").unwrap().as_reference().unwrap(), root_pages);
    }

    #[test]
    fn test_inherited_attribute_walks_the_page_tree() {
        let doc = create_dummy_pdf(1, "Page");
        let page = page_ids(&doc)[0];
        assert!(inherited_attribute(&doc, page, b"MediaBox").unwrap().is_some());
        assert!(inherited_attribute(&doc, page, b"Rotate").unwrap().is_none());
    }

    #[test]
    fn test_overlay_content() {
        let mut doc = create_dummy_pdf(1, "Original Content");
        let page_id = page_ids(&doc)[0];

        overlay_content(&mut doc, page_id, text_stream("Overlay Content")).unwrap();

        let page_dict = doc.get_object(page_id).unwrap().as_dict().unwrap();
        let contents_array = page_dict.get(b"Contents").unwrap().as_array().unwrap();
        assert_eq!(contents_array.len(), 2);

        let content_str = page_text(&doc, 1);
        let original = content_str.find("Original Content").unwrap();
        let overlay = content_str.find("Overlay Content").unwrap();
        assert!(original < overlay);
    }

    #[test]
    fn test_underlay_content_goes_first() {
        let mut doc = create_dummy_pdf(1, "Original Content");
        let page_id = page_ids(&doc)[0];

        underlay_content(&mut doc, page_id, text_stream("Underlay Content")).unwrap();

        let content_str = page_text(&doc, 1);
        let original = content_str.find("Original Content").unwrap();
        let underlay = content_str.find("Underlay Content").unwrap();
        assert!(underlay < original);
    }
}
