use lopdf::content::Content;
use lopdf::{Dictionary, Document as LopdfDocument, Object};

/// Extract all text content from a PDF document
pub fn extract_text(doc: &LopdfDocument) -> String {
    let mut text = String::new();
    let pages = doc.get_pages();
    for page_num in 1..=pages.len() {
        if let Ok(page_text) = doc.extract_text(&[page_num as u32]) {
            text.push_str(&page_text);
            text.push('\n');
        }
    }
    text
}

/// The raw content of a 1-based page as text
pub fn page_content(doc: &LopdfDocument, page_num: u32) -> String {
    doc.get_pages()
        .get(&page_num)
        .and_then(|id| doc.get_page_content(*id).ok())
        .map(|bytes| String::from_utf8_lossy(&bytes).to_string())
        .unwrap_or_default()
}

/// Every operation on a 1-based page as `(operator, numeric operands)`
pub fn page_operations(doc: &LopdfDocument, page_num: u32) -> Vec<(String, Vec<f32>)> {
    let Some(bytes) = doc.get_pages().get(&page_num).and_then(|id| doc.get_page_content(*id).ok()) else {
        return Vec::new();
    };
    let Ok(content) = Content::decode(&bytes) else {
        return Vec::new();
    };
    content
        .operations
        .iter()
        .map(|op| {
            let operands = op.operands.iter().filter_map(|o| o.as_float().ok()).collect();
            (op.operator.clone(), operands)
        })
        .collect()
}

fn resolve_dict<'a>(doc: &'a LopdfDocument, object: &'a Object) -> Option<&'a Dictionary> {
    match object.as_reference() {
        Ok(id) => doc.get_dictionary(id).ok(),
        Err(_) => object.as_dict().ok(),
    }
}

fn page_resources<'a>(doc: &'a LopdfDocument, page_num: u32) -> Option<&'a Dictionary> {
    let page_id = doc.get_pages().get(&page_num).copied()?;
    let page = doc.get_dictionary(page_id).ok()?;
    resolve_dict(doc, page.get(b"Resources").ok()?)
}

/// Extract font names from the PDF (base fonts referenced by any page)
pub fn extract_font_names(doc: &LopdfDocument) -> Vec<String> {
    let mut fonts = std::collections::BTreeSet::new();
    for page_num in doc.get_pages().keys() {
        let Some(resources) = page_resources(doc, *page_num) else { continue };
        let Some(font_dict) = resources.get(b"Font").ok().and_then(|f| resolve_dict(doc, f)) else {
            continue;
        };
        for (_name, font) in font_dict.iter() {
            if let Some(font) = resolve_dict(doc, font)
                && let Ok(base_font) = font.get(b"BaseFont").and_then(Object::as_name)
            {
                fonts.insert(String::from_utf8_lossy(base_font).to_string());
            }
        }
    }
    fonts.into_iter().collect()
}

/// Resource names in one category (`Font`, `XObject`) of a page
pub fn resource_names(doc: &LopdfDocument, page_num: u32, category: &[u8]) -> Vec<String> {
    page_resources(doc, page_num)
        .and_then(|resources| resources.get(category).ok())
        .and_then(|entries| resolve_dict(doc, entries))
        .map(|entries| entries.iter().map(|(name, _)| String::from_utf8_lossy(name).to_string()).collect())
        .unwrap_or_default()
}

fn streams_with_subtype<'a>(doc: &'a LopdfDocument, subtype: &'a [u8]) -> impl Iterator<Item = &'a lopdf::Stream> + 'a {
    doc.objects
        .values()
        .filter_map(|object| object.as_stream().ok())
        .filter(move |stream| stream.dict.get(b"Subtype").and_then(Object::as_name).ok() == Some(subtype))
}

/// Content of every Form XObject in the file
pub fn form_contents(doc: &LopdfDocument) -> Vec<String> {
    streams_with_subtype(doc, b"Form")
        .map(|stream| {
            let bytes = stream.decompressed_content().unwrap_or_else(|_| stream.content.clone());
            String::from_utf8_lossy(&bytes).to_string()
        })
        .collect()
}

/// Number of Image XObjects in the file
pub fn count_images(doc: &LopdfDocument) -> usize {
    streams_with_subtype(doc, b"Image").count()
}

/// Get page dimensions (width, height) in points
pub fn get_page_dimensions(doc: &LopdfDocument, page_num: u32) -> Option<(f32, f32)> {
    let page_id = doc.get_pages().get(&page_num).copied()?;
    let media_box = doc.get_dictionary(page_id).ok()?.get(b"MediaBox").ok()?.as_array().ok()?;
    if media_box.len() < 4 {
        return None;
    }
    let width = media_box[2].as_float().ok()? - media_box[0].as_float().ok()?;
    let height = media_box[3].as_float().ok()? - media_box[1].as_float().ok()?;
    Some((width, height))
}

// ============================================================================
// Fluent Assertion Macros
// ============================================================================

/// Assert that PDF contains specific text
#[macro_export]
macro_rules! assert_pdf_contains_text {
    ($pdf:expr, $text:expr) => {
        let extracted = $crate::common::pdf_assertions::extract_text(&$pdf.doc);
        assert!(
            extracted.contains($text),
            "PDF should contain '{}', but extracted text was:\n{}",
            $text,
            extracted
        );
    };
}

/// Assert that a page's content stream shows a string with `Tj`
#[macro_export]
macro_rules! assert_page_shows {
    ($pdf:expr, $page:expr, $text:expr) => {
        let content = $pdf.page_content($page);
        let needle = format!("({}) Tj", $text);
        assert!(
            content.contains(&needle),
            "Page {} should show '{}', content was:\n{}",
            $page,
            $text,
            content
        );
    };
}

/// Assert the number of pages in a PDF
#[macro_export]
macro_rules! assert_pdf_page_count {
    ($pdf:expr, $count:expr) => {
        assert_eq!(
            $pdf.page_count(),
            $count,
            "Expected {} pages, got {}",
            $count,
            $pdf.page_count()
        );
    };
}

/// Assert minimum number of pages
#[macro_export]
macro_rules! assert_pdf_min_pages {
    ($pdf:expr, $min:expr) => {
        assert!(
            $pdf.page_count() >= $min,
            "Expected at least {} pages, got {}",
            $min,
            $pdf.page_count()
        );
    };
}

/// Assert that PDF contains a font matching a pattern
#[macro_export]
macro_rules! assert_pdf_has_font {
    ($pdf:expr, $pattern:expr) => {
        let fonts = $crate::common::pdf_assertions::extract_font_names(&$pdf.doc);
        assert!(
            fonts.iter().any(|f| f.contains($pattern)),
            "PDF should contain font matching '{}', fonts found: {:?}",
            $pattern,
            fonts
        );
    };
}

/// Assert page dimensions within tolerance
#[macro_export]
macro_rules! assert_pdf_page_size {
    ($pdf:expr, $page:expr, $width:expr, $height:expr) => {
        let dims = $crate::common::pdf_assertions::get_page_dimensions(&$pdf.doc, $page);
        assert!(dims.is_some(), "Could not get dimensions for page {}", $page);
        let (w, h) = dims.unwrap();
        assert!(
            (w - $width).abs() < 1.0,
            "Page {} width expected ~{}, got {}",
            $page,
            $width,
            w
        );
        assert!(
            (h - $height).abs() < 1.0,
            "Page {} height expected ~{}, got {}",
            $page,
            $height,
            h
        );
    };
}
