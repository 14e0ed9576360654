//! Font library for the layout engine.
//!
//! `FontLibrary` resolves font requests from three places:
//! - **Built-in metrics** for the standard Helvetica and Courier families
//! - **Registered TrueType data** handed in with [`FontLibrary::register_font_data`]
//! - **System fonts** via fontdb (feature: `system-fonts`)
//!
//! Lookups by styled name go through `styled_font_name`, so registering
//! `Roboto-Bold` makes `Roboto` with the bold bit resolve to it.

use pagewright_render_core::utils::styled_font_name;
use pagewright_traits::{BackendFont, Encoding, FontBackend, FontError, FontRequest, FontStyleSet, SharedFontData};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};

#[cfg(feature = "system-fonts")]
use fontdb;

/// Glyph widths for codes 32..=126, in 1/1000 em.
#[rustfmt::skip]
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
    278, 278, 584, 584, 584, 556, 1015,
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833,
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
    278, 278, 278, 469, 556, 333,
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833,
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500,
    334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
    333, 333, 584, 584, 584, 611, 975,
    722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833,
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
    333, 278, 333, 584, 556, 333,
    556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889,
    611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500,
    389, 280, 389, 584,
];

/// Metrics of one of the standard Type1 fonts every PDF reader provides.
#[derive(Debug)]
struct StandardFont {
    name: String,
    widths: Option<&'static [u16; 95]>,
    default_width: u16,
    ascent: i16,
    descent: i16,
}

impl StandardFont {
    fn lookup(face: &str, style: FontStyleSet) -> Option<Self> {
        let suffix = match (style.bold, style.italic) {
            (false, false) => "",
            (true, false) => "-Bold",
            (false, true) => "-Oblique",
            (true, true) => "-BoldOblique",
        };
        match face.to_ascii_lowercase().as_str() {
            "helvetica" => Some(Self {
                name: format!("Helvetica{}", suffix),
                widths: Some(if style.bold { &HELVETICA_BOLD_WIDTHS } else { &HELVETICA_WIDTHS }),
                default_width: 556,
                ascent: 718,
                descent: -207,
            }),
            "courier" => Some(Self {
                name: format!("Courier{}", suffix),
                widths: None,
                default_width: 600,
                ascent: 629,
                descent: -157,
            }),
            _ => None,
        }
    }
}

impl BackendFont for StandardFont {
    fn postscript_name(&self) -> &str {
        &self.name
    }

    fn glyph_width(&self, ch: char) -> u16 {
        match (self.widths, ch as u32) {
            (Some(widths), code @ 32..=126) => widths[(code - 32) as usize],
            _ => self.default_width,
        }
    }

    fn ascent(&self) -> i16 {
        self.ascent
    }

    fn descent(&self) -> i16 {
        self.descent
    }
}

/// Parsed TrueType metrics, scaled to 1000 units per em.
struct TrueTypeMetrics {
    postscript_name: String,
    data: SharedFontData,
    face_index: u32,
    units_per_em: u16,
    latin_widths: Vec<u16>,
    missing_width: u16,
    ascent: i16,
    descent: i16,
}

impl fmt::Debug for TrueTypeMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrueTypeMetrics")
            .field("postscript_name", &self.postscript_name)
            .field("data_len", &self.data.len())
            .field("units_per_em", &self.units_per_em)
            .finish()
    }
}

fn scale_units(value: i32, units_per_em: u16) -> i32 {
    value * 1000 / i32::from(units_per_em.max(1))
}

fn advance_of(face: &ttf_parser::Face<'_>, ch: char) -> Option<u16> {
    let glyph = face.glyph_index(ch)?;
    face.glyph_hor_advance(glyph)
}

impl TrueTypeMetrics {
    fn parse(data: SharedFontData, face_index: u32) -> Result<Self, FontError> {
        let face = ttf_parser::Face::parse(&data, face_index).map_err(|e| FontError::InvalidFont(e.to_string()))?;
        let units_per_em = face.units_per_em();
        let scale = |advance: u16| scale_units(i32::from(advance), units_per_em).clamp(0, i32::from(u16::MAX)) as u16;

        let missing_width = face.glyph_hor_advance(ttf_parser::GlyphId(0)).map(scale).unwrap_or(500);
        let latin_widths = (0u8..=255)
            .map(|code| advance_of(&face, char::from(code)).map(scale).unwrap_or(missing_width))
            .collect();
        let postscript_name = extract_postscript_name(&face).unwrap_or_else(|| "UnnamedFont".to_string());
        let ascent = scale_units(i32::from(face.ascender()), units_per_em) as i16;
        let descent = scale_units(i32::from(face.descender()), units_per_em) as i16;

        log::debug!(
            "Parsed TrueType font '{}' ({} bytes, {} units/em)",
            postscript_name,
            data.len(),
            units_per_em
        );
        Ok(Self {
            postscript_name,
            data,
            face_index,
            units_per_em,
            latin_widths,
            missing_width,
            ascent,
            descent,
        })
    }

    fn face(&self) -> Option<ttf_parser::Face<'_>> {
        ttf_parser::Face::parse(&self.data, self.face_index).ok()
    }

    fn width(&self, ch: char) -> u16 {
        let code = ch as u32;
        if code < 256 {
            return self.latin_widths[code as usize];
        }
        self.face()
            .and_then(|face| advance_of(&face, ch))
            .map(|advance| scale_units(i32::from(advance), self.units_per_em).clamp(0, i32::from(u16::MAX)) as u16)
            .unwrap_or(self.missing_width)
    }
}

/// Extracts the PostScript name from a parsed face.
/// Tries the full name and then the family name when it is missing.
fn extract_postscript_name(face: &ttf_parser::Face<'_>) -> Option<String> {
    let find = |id: u16| {
        face.names()
            .into_iter()
            .find(|n| n.name_id == id)
            .and_then(|n| n.to_string())
    };

    if let Some(ps_name) = find(ttf_parser::name_id::POST_SCRIPT_NAME) {
        return Some(ps_name);
    }
    if let Some(full_name) = find(ttf_parser::name_id::FULL_NAME) {
        log::debug!("Using full name as PostScript name: {}", full_name);
        return Some(full_name.replace(' ', ""));
    }
    if let Some(family) = find(ttf_parser::name_id::FAMILY) {
        log::debug!("Using family name as PostScript name: {}", family);
        return Some(family.replace(' ', ""));
    }
    log::warn!("Could not extract any usable name from font data");
    None
}

/// A TrueType font as handed out to documents. Only embedded fonts expose their bytes.
#[derive(Debug)]
struct LoadedFont {
    metrics: Arc<TrueTypeMetrics>,
    encoding: Encoding,
    embedded: bool,
}

impl BackendFont for LoadedFont {
    fn postscript_name(&self) -> &str {
        &self.metrics.postscript_name
    }

    fn glyph_width(&self, ch: char) -> u16 {
        self.metrics.width(ch)
    }

    fn ascent(&self) -> i16 {
        self.metrics.ascent
    }

    fn descent(&self) -> i16 {
        self.metrics.descent
    }

    fn font_data(&self) -> Option<SharedFontData> {
        self.embedded.then(|| Arc::clone(&self.metrics.data))
    }

    fn encoding(&self) -> Encoding {
        self.encoding
    }

    fn glyph_id(&self, ch: char) -> Option<u16> {
        self.metrics.face()?.glyph_index(ch).map(|glyph| glyph.0)
    }
}

/// A cloneable, thread-safe font backend.
#[derive(Clone)]
pub struct FontLibrary {
    #[cfg(feature = "system-fonts")]
    db: Arc<RwLock<fontdb::Database>>,

    /// Parsed TrueType fonts keyed by the name they were registered under.
    registry: Arc<RwLock<HashMap<String, Arc<TrueTypeMetrics>>>>,
}

impl FontLibrary {
    /// Creates a library that knows only the built-in standard fonts.
    pub fn new() -> Self {
        Self {
            #[cfg(feature = "system-fonts")]
            db: Arc::new(RwLock::new(fontdb::Database::new())),
            registry: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Enables system font lookup for faces that are neither built in nor registered.
    #[cfg(feature = "system-fonts")]
    pub fn with_system_fonts(self, enable: bool) -> Self {
        if enable && let Ok(mut db) = self.db.write() {
            db.load_system_fonts();
            log::debug!("Loaded {} system font faces", db.len());
        }
        self
    }

    /// Adds every font in a directory to the system font database.
    #[cfg(all(feature = "system-fonts", not(target_arch = "wasm32")))]
    pub fn add_font_dir<P: AsRef<std::path::Path>>(&self, path: P) {
        if let Ok(mut db) = self.db.write() {
            db.load_fonts_dir(path);
        }
    }

    /// Parses TrueType data and registers it under its PostScript name, which is returned.
    pub fn register_font_data(&self, data: Vec<u8>) -> Result<String, FontError> {
        let metrics = Arc::new(TrueTypeMetrics::parse(Arc::new(data), 0)?);
        let name = metrics.postscript_name.clone();
        self.insert(name.clone(), metrics)?;
        Ok(name)
    }

    /// Registers TrueType data under an explicit name, e.g. `Roboto-Bold`.
    pub fn register_font_data_as(&self, name: &str, data: Vec<u8>) -> Result<(), FontError> {
        let metrics = Arc::new(TrueTypeMetrics::parse(Arc::new(data), 0)?);
        self.insert(name.to_string(), metrics)
    }

    pub fn register_font_file<P: AsRef<std::path::Path>>(&self, path: P) -> Result<String, FontError> {
        let path = path.as_ref();
        let data = std::fs::read(path)
            .map_err(|e| FontError::NotFound(format!("{}: {}", path.display(), e)))?;
        log::debug!("Registering font file {}", path.display());
        self.register_font_data(data)
    }

    fn insert(&self, name: String, metrics: Arc<TrueTypeMetrics>) -> Result<(), FontError> {
        let mut registry = self
            .registry
            .write()
            .map_err(|_| FontError::InvalidFont("font registry lock poisoned".to_string()))?;
        if registry.insert(name.clone(), metrics).is_some() {
            log::debug!("Font '{}' replaced in registry", name);
        } else {
            log::debug!("Font '{}' registered. Registry now has {} fonts", name, registry.len());
        }
        Ok(())
    }

    fn registered(&self, name: &str) -> Option<Arc<TrueTypeMetrics>> {
        self.registry.read().ok()?.get(name).cloned()
    }

    /// Names of all registered TrueType fonts.
    pub fn registered_fonts(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .registry
            .read()
            .map(|r| r.keys().cloned().collect())
            .unwrap_or_default();
        names.sort();
        names
    }

    #[cfg(feature = "system-fonts")]
    fn resolve_from_fontdb(&self, family: &str, style: FontStyleSet) -> Result<Option<Arc<TrueTypeMetrics>>, FontError> {
        let db = self
            .db
            .read()
            .map_err(|_| FontError::InvalidFont("fontdb lock poisoned".to_string()))?;
        let query = fontdb::Query {
            families: &[fontdb::Family::Name(family)],
            weight: if style.bold { fontdb::Weight::BOLD } else { fontdb::Weight::NORMAL },
            stretch: fontdb::Stretch::Normal,
            style: if style.italic { fontdb::Style::Italic } else { fontdb::Style::Normal },
        };
        let Some(id) = db.query(&query) else {
            return Ok(None);
        };
        let Some((bytes, index)) = db.with_face_data(id, |data, index| (data.to_vec(), index)) else {
            return Ok(None);
        };
        drop(db);
        log::debug!("  → Found '{}' in fontdb ({} bytes)", family, bytes.len());
        Ok(Some(Arc::new(TrueTypeMetrics::parse(Arc::new(bytes), index)?)))
    }

    #[cfg(not(feature = "system-fonts"))]
    fn resolve_from_fontdb(&self, _family: &str, _style: FontStyleSet) -> Result<Option<Arc<TrueTypeMetrics>>, FontError> {
        Ok(None)
    }
}

impl Default for FontLibrary {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for FontLibrary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontLibrary")
            .field("registered", &self.registered_fonts())
            .finish()
    }
}

impl FontBackend for FontLibrary {
    fn create_font(&self, request: &FontRequest) -> Result<Arc<dyn BackendFont>, FontError> {
        let variant = request.style.face_variant();
        let styled = styled_font_name(&request.face, variant);
        log::debug!("Resolving font '{}' (embedded: {})", styled, request.embedded);

        // glyph ids mean nothing to a reader without the font program
        let embedded = request.embedded || request.encoding == Encoding::IdentityH;
        let loaded = |metrics: Arc<TrueTypeMetrics>| -> Arc<dyn BackendFont> {
            Arc::new(LoadedFont { metrics, encoding: request.encoding, embedded })
        };

        if let Some(metrics) = self.registered(&styled) {
            return Ok(loaded(metrics));
        }
        if variant != FontStyleSet::PLAIN
            && let Some(metrics) = self.registered(&request.face)
        {
            log::debug!("  → No '{}' registered, using regular face '{}'", styled, request.face);
            return Ok(loaded(metrics));
        }
        if let Some(standard) = StandardFont::lookup(&request.face, variant) {
            if request.encoding != Encoding::WinAnsi {
                return Err(FontError::UnsupportedEncoding { face: standard.name, encoding: request.encoding });
            }
            log::debug!("  → Built-in {}", standard.name);
            return Ok(Arc::new(standard));
        }
        if let Some(metrics) = self.resolve_from_fontdb(&request.face, variant)? {
            self.insert(styled, Arc::clone(&metrics))?;
            return Ok(loaded(metrics));
        }

        log::warn!("  → Font not found: {}", styled);
        Err(FontError::NotFound(styled))
    }

    fn name(&self) -> &'static str {
        "font-library"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(face: &str, style: FontStyleSet) -> FontRequest {
        FontRequest::new(face).with_style(style)
    }

    #[test]
    fn test_builtin_helvetica_widths() {
        let library = FontLibrary::new();
        let font = library.create_font(&request("Helvetica", FontStyleSet::PLAIN)).unwrap();
        assert_eq!(font.postscript_name(), "Helvetica");
        assert_eq!(font.glyph_width('A'), 667);
        assert_eq!(font.glyph_width(' '), 278);
        assert_eq!(font.glyph_width('~'), 584);
        assert_eq!(font.glyph_width('é'), 556);
        assert!(font.font_data().is_none());
    }

    #[test]
    fn test_builtin_variant_names() {
        let library = FontLibrary::new();
        let bold = library.create_font(&request("Helvetica", FontStyleSet::BOLD)).unwrap();
        assert_eq!(bold.postscript_name(), "Helvetica-Bold");
        assert_eq!(bold.glyph_width('b'), 611);

        let oblique = library.create_font(&request("helvetica", FontStyleSet::ITALIC)).unwrap();
        assert_eq!(oblique.postscript_name(), "Helvetica-Oblique");
        assert_eq!(oblique.glyph_width('b'), 556);

        let courier = library.create_font(&request("Courier", FontStyleSet::BOLD_ITALIC)).unwrap();
        assert_eq!(courier.postscript_name(), "Courier-BoldOblique");
        assert_eq!(courier.glyph_width('W'), 600);
        assert_eq!(courier.string_width_pt("abcde", 10.0), 30.0);
    }

    #[test]
    fn test_underline_does_not_change_face() {
        let library = FontLibrary::new();
        let font = library
            .create_font(&request("Courier", FontStyleSet::PLAIN.with_underline(true)))
            .unwrap();
        assert_eq!(font.postscript_name(), "Courier");
    }

    #[test]
    fn test_unknown_face_is_not_found() {
        let library = FontLibrary::new();
        let err = library.create_font(&request("NoSuchFace", FontStyleSet::BOLD)).unwrap_err();
        assert_eq!(err, FontError::NotFound("NoSuchFace-Bold".to_string()));
    }

    #[test]
    fn test_builtin_fonts_have_no_glyph_ids() {
        let library = FontLibrary::new();
        let err = library
            .create_font(&request("Helvetica", FontStyleSet::BOLD).with_encoding(Encoding::IdentityH))
            .unwrap_err();
        assert_eq!(
            err,
            FontError::UnsupportedEncoding { face: "Helvetica-Bold".to_string(), encoding: Encoding::IdentityH }
        );
        let plain = library.create_font(&request("Helvetica", FontStyleSet::PLAIN)).unwrap();
        assert_eq!(plain.encoding(), Encoding::WinAnsi);
    }

    #[test]
    fn test_register_rejects_invalid_data() {
        let library = FontLibrary::new();
        assert!(matches!(library.register_font_data(vec![0, 1, 2, 3]), Err(FontError::InvalidFont(_))));
        assert!(library.registered_fonts().is_empty());
    }

    #[test]
    fn test_library_is_shared_between_clones() {
        let library = FontLibrary::new();
        let clone = library.clone();
        assert!(Arc::ptr_eq(&library.registry, &clone.registry));
    }
}
