#![cfg(test)]

use crate::base_font::BaseFont;
use pagewright_traits::{BackendFont, Encoding, FontBackend, FontError, FontRequest};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug)]
pub struct FixedWidthFont {
    name: String,
}

impl BackendFont for FixedWidthFont {
    fn postscript_name(&self) -> &str {
        &self.name
    }

    fn glyph_width(&self, _ch: char) -> u16 {
        600
    }

    fn ascent(&self) -> i16 {
        629
    }

    fn descent(&self) -> i16 {
        -157
    }
}

/// Hands out fixed-width fonts and counts how often it was asked.
#[derive(Debug, Default)]
pub struct CountingBackend {
    requests: AtomicUsize,
}

impl CountingBackend {
    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

impl FontBackend for CountingBackend {
    fn create_font(&self, request: &FontRequest) -> Result<Arc<dyn BackendFont>, FontError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        let suffix = match (request.style.bold, request.style.italic) {
            (false, false) => "",
            (true, false) => "-Bold",
            (false, true) => "-Oblique",
            (true, true) => "-BoldOblique",
        };
        Ok(Arc::new(FixedWidthFont { name: format!("{}{}", request.face, suffix) }))
    }

    fn name(&self) -> &'static str {
        "CountingBackend"
    }
}

pub fn test_backend() -> Arc<CountingBackend> {
    let _ = env_logger::builder().is_test(true).try_init();
    Arc::new(CountingBackend::default())
}

pub fn courier() -> BaseFont {
    BaseFont::new(test_backend(), "Courier", Encoding::WinAnsi, false).unwrap()
}
