use crate::encoding::{from_win_ansi, to_identity_h, to_unicode_cmap, to_win_ansi};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, dictionary};
use once_cell::sync::Lazy;
use pagewright_render_core::{ImageData, RenderError, TemplateId};
use pagewright_traits::{BackendFont, Encoding};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

/// The base fonts every PDF reader provides without embedding.
static STANDARD_FONTS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "Helvetica",
        "Helvetica-Bold",
        "Helvetica-Oblique",
        "Helvetica-BoldOblique",
        "Courier",
        "Courier-Bold",
        "Courier-Oblique",
        "Courier-BoldOblique",
        "Times-Roman",
        "Times-Bold",
        "Times-Italic",
        "Times-BoldItalic",
        "Symbol",
        "ZapfDingbats",
    ]
    .into_iter()
    .collect()
});

const FIRST_CHAR: u8 = 32;
const LAST_CHAR: u8 = 255;

#[derive(Debug)]
struct NamedObject {
    name: String,
    id: ObjectId,
}

/// A font shown through Identity-H. Its objects are written by
/// [`ResourceRegistry::write_fonts`] once every glyph it shows is known.
#[derive(Debug)]
struct CompositeFont {
    font: Arc<dyn BackendFont>,
    glyphs: BTreeMap<u16, char>,
}

#[derive(Debug)]
struct FontEntry {
    resource: NamedObject,
    composite: Option<CompositeFont>,
}

#[derive(Debug)]
struct ImageEntry {
    // Held so the pointer key stays unique while registered.
    _image: Arc<ImageData>,
    resource: NamedObject,
}

/// Tracks the fonts, images and templates a set of content streams refers to.
///
/// Simple fonts and images are written into the document the first time
/// they are referenced. Identity-H fonts and template ids are only reserved:
/// composite fonts are written by [`ResourceRegistry::write_fonts`], and the
/// caller writes each form XObject once the template's content is known.
#[derive(Debug, Default)]
pub struct ResourceRegistry {
    prefix: String,
    fonts: HashMap<(String, Encoding), FontEntry>,
    images: HashMap<usize, ImageEntry>,
    templates: BTreeMap<TemplateId, NamedObject>,
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry whose resource names start with `prefix`, to avoid clashing
    /// with names already used by an existing page.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self { prefix: prefix.into(), ..Self::default() }
    }

    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty() && self.images.is_empty() && self.templates.is_empty()
    }

    /// Resource name of `font`, adding its font dictionary on first use.
    pub fn font(&mut self, doc: &mut Document, font: &Arc<dyn BackendFont>) -> Result<String, RenderError> {
        let key = font_key(font.as_ref());
        if let Some(entry) = self.fonts.get(&key) {
            return Ok(entry.resource.name.clone());
        }
        let name = format!("{}F{}", self.prefix, self.fonts.len() + 1);
        let (id, composite) = match font.encoding() {
            Encoding::WinAnsi => (write_simple_font(doc, font.as_ref())?, None),
            Encoding::IdentityH => {
                if font.font_data().is_none() {
                    return Err(RenderError::Other(format!(
                        "Font '{}' must be embedded to be shown with IdentityH",
                        key.0
                    )));
                }
                (doc.new_object_id(), Some(CompositeFont { font: Arc::clone(font), glyphs: BTreeMap::new() }))
            }
        };
        log::debug!("Registered font '{}' ({:?}) as /{}", key.0, key.1, name);
        self.fonts.insert(key, FontEntry { resource: NamedObject { name: name.clone(), id }, composite });
        Ok(name)
    }

    /// Encodes `text` for showing with `font`, recording the glyphs an
    /// Identity-H font has to carry widths and Unicode mappings for.
    pub fn encode_text(&mut self, font: &dyn BackendFont, text: &str) -> Vec<u8> {
        match self.fonts.get_mut(&font_key(font)).and_then(|entry| entry.composite.as_mut()) {
            Some(composite) => to_identity_h(font, text, &mut composite.glyphs),
            None => to_win_ansi(text),
        }
    }

    /// Writes the objects of every Identity-H font at its reserved id.
    /// Call once all content using these fonts has been encoded.
    pub fn write_fonts(&self, doc: &mut Document) {
        for entry in self.fonts.values() {
            if let Some(composite) = &entry.composite {
                write_composite_font(doc, entry.resource.id, composite);
            }
        }
    }

    /// Resource name of `image`, adding its image XObject on first use.
    /// Images are shared by pointer, so one `Arc` is written once.
    pub fn image(&mut self, doc: &mut Document, image: &Arc<ImageData>) -> Result<String, RenderError> {
        let key = Arc::as_ptr(image) as usize;
        if let Some(entry) = self.images.get(&key) {
            return Ok(entry.resource.name.clone());
        }
        let expected = image.width as usize * image.height as usize * 3;
        if image.width == 0 || image.height == 0 || image.rgb.len() != expected {
            return Err(RenderError::Image(format!(
                "{}x{} image carries {} bytes, expected {}",
                image.width,
                image.height,
                image.rgb.len(),
                expected
            )));
        }
        let stream = Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => image.width as i64,
                "Height" => image.height as i64,
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8,
            },
            image.rgb.clone(),
        );
        let id = doc.add_object(stream);
        let name = format!("{}Im{}", self.prefix, self.images.len() + 1);
        log::debug!("Registered {}x{} image as /{}", image.width, image.height, name);
        self.images.insert(
            key,
            ImageEntry { _image: Arc::clone(image), resource: NamedObject { name: name.clone(), id } },
        );
        Ok(name)
    }

    /// Resource name of template `id`, reserving its object id on first use.
    pub fn template(&mut self, doc: &mut Document, id: TemplateId) -> String {
        let count = self.templates.len();
        let prefix = &self.prefix;
        self.templates
            .entry(id)
            .or_insert_with(|| NamedObject { name: format!("{}T{}", prefix, count + 1), id: doc.new_object_id() })
            .name
            .clone()
    }

    /// The object id reserved for template `id`, if it has been referenced.
    pub fn template_object(&self, id: TemplateId) -> Option<ObjectId> {
        self.templates.get(&id).map(|entry| entry.id)
    }

    /// Templates referenced so far, in id order.
    pub fn template_ids(&self) -> Vec<TemplateId> {
        self.templates.keys().copied().collect()
    }

    /// Font entries keyed by resource name.
    pub fn font_dictionary(&self) -> Dictionary {
        let mut dict = Dictionary::new();
        for entry in self.fonts.values().map(|font| &font.resource) {
            dict.set(entry.name.as_bytes(), Object::Reference(entry.id));
        }
        dict
    }

    /// Image and template entries keyed by resource name.
    pub fn xobject_dictionary(&self) -> Dictionary {
        let mut dict = Dictionary::new();
        for entry in self.images.values().map(|image| &image.resource).chain(self.templates.values()) {
            dict.set(entry.name.as_bytes(), Object::Reference(entry.id));
        }
        dict
    }

    /// A complete resources dictionary for everything registered.
    pub fn resources_dictionary(&self) -> Dictionary {
        dictionary! {
            "Font" => self.font_dictionary(),
            "XObject" => self.xobject_dictionary(),
        }
    }
}

fn font_key(font: &dyn BackendFont) -> (String, Encoding) {
    (font.postscript_name().to_string(), font.encoding())
}

/// A FontDescriptor, with the font program attached when there is one.
fn write_descriptor(doc: &mut Document, font: &dyn BackendFont) -> ObjectId {
    let base_font = font.postscript_name().to_string();
    let ascent = i64::from(font.ascent());
    let descent = i64::from(font.descent());
    let mut descriptor = dictionary! {
        "Type" => "FontDescriptor",
        "FontName" => base_font.clone(),
        "Flags" => 32,
        "FontBBox" => vec![Object::Integer(0), descent.into(), Object::Integer(1000), ascent.into()],
        "ItalicAngle" => 0,
        "Ascent" => ascent,
        "Descent" => descent,
        "CapHeight" => ascent,
        "StemV" => 80,
    };
    match font.font_data() {
        Some(bytes) => {
            let length = bytes.len() as i64;
            let file_id = doc.add_object(Stream::new(dictionary! { "Length1" => length }, bytes.to_vec()));
            descriptor.set("FontFile2", file_id);
        }
        None => log::warn!("Font '{}' is neither standard nor embeddable; referencing it by name", base_font),
    }
    doc.add_object(descriptor)
}

fn write_simple_font(doc: &mut Document, font: &dyn BackendFont) -> Result<ObjectId, RenderError> {
    let base_font = font.postscript_name().to_string();
    if font.font_data().is_none() && STANDARD_FONTS.contains(base_font.as_str()) {
        return Ok(doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => base_font,
            "Encoding" => "WinAnsiEncoding",
        }));
    }

    let descriptor_id = write_descriptor(doc, font);
    let widths: Vec<Object> = (FIRST_CHAR..=LAST_CHAR)
        .map(|code| from_win_ansi(code).map_or(0, |c| i64::from(font.glyph_width(c))).into())
        .collect();
    Ok(doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "TrueType",
        "BaseFont" => base_font,
        "FirstChar" => i64::from(FIRST_CHAR),
        "LastChar" => i64::from(LAST_CHAR),
        "Widths" => widths,
        "Encoding" => "WinAnsiEncoding",
        "FontDescriptor" => descriptor_id,
    }))
}

/// A Type0 font over a CIDFontType2 descendant, with widths and Unicode
/// mappings for the glyphs actually shown.
fn write_composite_font(doc: &mut Document, type0_id: ObjectId, composite: &CompositeFont) {
    let font = composite.font.as_ref();
    let base_font = font.postscript_name().to_string();
    let descriptor_id = write_descriptor(doc, font);

    let mut widths = Vec::with_capacity(composite.glyphs.len() * 2);
    for (glyph, c) in &composite.glyphs {
        widths.push(Object::Integer(i64::from(*glyph)));
        widths.push(Object::Array(vec![Object::Integer(i64::from(font.glyph_width(*c)))]));
    }
    let cid_font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "CIDFontType2",
        "BaseFont" => base_font.clone(),
        "CIDSystemInfo" => dictionary! {
            "Registry" => Object::string_literal("Adobe"),
            "Ordering" => Object::string_literal("Identity"),
            "Supplement" => 0,
        },
        "FontDescriptor" => descriptor_id,
        "W" => widths,
        "CIDToGIDMap" => "Identity",
    });
    let to_unicode_id = doc.add_object(Stream::new(dictionary! {}, to_unicode_cmap(&composite.glyphs)));

    doc.objects.insert(
        type0_id,
        Object::Dictionary(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type0",
            "BaseFont" => base_font.clone(),
            "Encoding" => "Identity-H",
            "DescendantFonts" => vec![Object::Reference(cid_font_id)],
            "ToUnicode" => to_unicode_id,
        }),
    );
    log::debug!("Wrote Identity-H font '{}' with {} glyphs", base_font, composite.glyphs.len());
}
