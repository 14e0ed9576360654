use crate::font::Font;
use crate::shared::Shared;
use pagewright_traits::{BackendFont, Encoding, FontBackend, FontError, FontRequest, FontStyleSet};
use pagewright_types::Length;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

#[derive(Clone)]
pub struct BaseFontData {
    face: String,
    encoding: Encoding,
    embedded: bool,
    style: FontStyleSet,
    backend: Arc<dyn FontBackend>,
    resolved: Arc<dyn BackendFont>,
    /// Styled variants resolved so far, one per bold/italic combination.
    variants: RefCell<HashMap<FontStyleSet, Arc<dyn BackendFont>>>,
}

impl BaseFontData {
    fn request(&self, style: FontStyleSet) -> FontRequest {
        FontRequest {
            face: self.face.clone(),
            encoding: self.encoding,
            embedded: self.embedded,
            style,
        }
    }
}

impl fmt::Debug for BaseFontData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BaseFontData")
            .field("face", &self.face)
            .field("encoding", &self.encoding)
            .field("embedded", &self.embedded)
            .field("style", &self.style)
            .field("resolved", &self.resolved.postscript_name())
            .finish()
    }
}

/// Binding of a font family to a backend font, shared copy-on-write.
#[derive(Clone, Debug)]
pub struct BaseFont(Shared<BaseFontData>);

impl BaseFont {
    pub fn new(
        backend: Arc<dyn FontBackend>,
        face: impl Into<String>,
        encoding: Encoding,
        embedded: bool,
    ) -> Result<Self, FontError> {
        Self::with_style(backend, face, encoding, embedded, FontStyleSet::PLAIN)
    }

    pub fn with_style(
        backend: Arc<dyn FontBackend>,
        face: impl Into<String>,
        encoding: Encoding,
        embedded: bool,
        style: FontStyleSet,
    ) -> Result<Self, FontError> {
        let face = face.into();
        let request = FontRequest { face: face.clone(), encoding, embedded, style: style.face_variant() };
        let resolved = backend.create_font(&request)?;
        log::debug!(
            "Base font '{}' resolved to '{}' via {}",
            face,
            resolved.postscript_name(),
            backend.name()
        );
        Ok(Self(Shared::new(BaseFontData {
            face,
            encoding,
            embedded,
            style,
            backend,
            resolved,
            variants: RefCell::new(HashMap::new()),
        })))
    }

    pub fn face(&self) -> String {
        self.0.read(|d| d.face.clone())
    }

    pub fn encoding(&self) -> Encoding {
        self.0.read(|d| d.encoding)
    }

    pub fn embedded(&self) -> bool {
        self.0.read(|d| d.embedded)
    }

    pub fn style(&self) -> FontStyleSet {
        self.0.read(|d| d.style)
    }

    pub fn backend(&self) -> Arc<dyn FontBackend> {
        self.0.read(|d| Arc::clone(&d.backend))
    }

    pub fn backend_font(&self) -> Arc<dyn BackendFont> {
        self.0.read(|d| Arc::clone(&d.resolved))
    }

    /// Backend font for `style`, created on first use and cached per base font.
    pub fn styled(&self, style: FontStyleSet) -> Result<Arc<dyn BackendFont>, FontError> {
        let key = style.face_variant();
        self.0.read(|data| {
            if key == data.style.face_variant() {
                return Ok(Arc::clone(&data.resolved));
            }
            let cached = data.variants.borrow().get(&key).cloned();
            if let Some(font) = cached {
                return Ok(font);
            }
            let font = data.backend.create_font(&data.request(key))?;
            log::debug!("Created styled variant {:?} of '{}': {}", key, data.face, font.postscript_name());
            data.variants.borrow_mut().insert(key, Arc::clone(&font));
            Ok(font)
        })
    }

    /// Changes the embed flag, re-resolving the backend font for this owner only.
    pub fn set_embedded(&mut self, embedded: bool) -> Result<&mut Self, FontError> {
        let (backend, request) = self.0.read(|d| {
            let mut request = d.request(d.style.face_variant());
            request.embedded = embedded;
            (Arc::clone(&d.backend), request)
        });
        let resolved = backend.create_font(&request)?;
        self.0.modify(|d| {
            d.embedded = embedded;
            d.resolved = resolved;
            d.variants.borrow_mut().clear();
        });
        Ok(self)
    }

    pub fn create_font(&self, size: Length) -> Font {
        Font::new(self.duplicate(), size)
    }

    pub fn duplicate(&self) -> Self {
        Self(self.0.duplicate())
    }

    pub fn share_count(&self) -> usize {
        self.0.share_count()
    }

    pub fn ptr_eq(&self, other: &BaseFont) -> bool {
        self.0.ptr_eq(&other.0)
    }
}
