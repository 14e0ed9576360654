//! Text encodings for content streams.
//!
//! Standard fonts take WinAnsiEncoding (Windows-1252) strings. Embedded
//! TrueType fonts shown through Identity-H take two-byte glyph ids, with a
//! ToUnicode CMap so the text can be extracted again.

use pagewright_traits::BackendFont;
use std::collections::BTreeMap;

/// Code points 0x80..=0x9F, where WinAnsi departs from Latin-1. `None` marks unused codes.
const HIGH_CODES: [Option<char>; 32] = [
    Some('\u{20AC}'),
    None,
    Some('\u{201A}'),
    Some('\u{0192}'),
    Some('\u{201E}'),
    Some('\u{2026}'),
    Some('\u{2020}'),
    Some('\u{2021}'),
    Some('\u{02C6}'),
    Some('\u{2030}'),
    Some('\u{0160}'),
    Some('\u{2039}'),
    Some('\u{0152}'),
    None,
    Some('\u{017D}'),
    None,
    None,
    Some('\u{2018}'),
    Some('\u{2019}'),
    Some('\u{201C}'),
    Some('\u{201D}'),
    Some('\u{2022}'),
    Some('\u{2013}'),
    Some('\u{2014}'),
    Some('\u{02DC}'),
    Some('\u{2122}'),
    Some('\u{0161}'),
    Some('\u{203A}'),
    Some('\u{0153}'),
    None,
    Some('\u{017E}'),
    Some('\u{0178}'),
];

fn encode_char(c: char) -> Option<u8> {
    let code = c as u32;
    match code {
        0x20..=0x7E | 0xA0..=0xFF => Some(code as u8),
        _ => HIGH_CODES
            .iter()
            .position(|&mapped| mapped == Some(c))
            .map(|index| 0x80 + index as u8),
    }
}

/// Encodes `text` as WinAnsi bytes. Characters outside the encoding become `?`.
pub fn to_win_ansi(text: &str) -> Vec<u8> {
    let mut missing = 0usize;
    let bytes = text
        .chars()
        .map(|c| {
            encode_char(c).unwrap_or_else(|| {
                missing += 1;
                b'?'
            })
        })
        .collect();
    if missing > 0 {
        log::warn!(
            "{} character(s) of {:?} have no WinAnsi code and were replaced by '?'; use an embedded TrueType font with IdentityH",
            missing,
            text
        );
    }
    bytes
}

/// Encodes `text` as big-endian two-byte glyph ids of `font`.
///
/// Every glyph shown is recorded in `used` with the character it stands for.
/// Characters the font has no glyph for are shown as glyph 0.
pub fn to_identity_h(font: &dyn BackendFont, text: &str, used: &mut BTreeMap<u16, char>) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(text.len() * 2);
    for c in text.chars() {
        let glyph = match font.glyph_id(c) {
            Some(glyph) => {
                used.entry(glyph).or_insert(c);
                glyph
            }
            None => {
                log::warn!("Font '{}' has no glyph for {:?}", font.postscript_name(), c);
                0
            }
        };
        bytes.extend_from_slice(&glyph.to_be_bytes());
    }
    bytes
}

/// A ToUnicode CMap mapping each glyph id in `glyphs` back to its character.
pub fn to_unicode_cmap(glyphs: &BTreeMap<u16, char>) -> Vec<u8> {
    let mut cmap = String::from(
        "/CIDInit /ProcSet findresource begin\n\
         12 dict begin\n\
         begincmap\n\
         /CIDSystemInfo << /Registry (Adobe) /Ordering (UCS) /Supplement 0 >> def\n\
         /CMapName /Adobe-Identity-UCS def\n\
         /CMapType 2 def\n\
         1 begincodespacerange\n<0000> <FFFF>\nendcodespacerange\n",
    );
    let entries: Vec<(&u16, &char)> = glyphs.iter().collect();
    // bfchar sections are limited to 100 entries each
    for chunk in entries.chunks(100) {
        cmap.push_str(&format!("{} beginbfchar\n", chunk.len()));
        for (glyph, c) in chunk {
            let mut units = [0u16; 2];
            let utf16: String = c.encode_utf16(&mut units).iter().map(|unit| format!("{:04X}", unit)).collect();
            cmap.push_str(&format!("<{:04X}> <{}>\n", glyph, utf16));
        }
        cmap.push_str("endbfchar\n");
    }
    cmap.push_str("endcmap\nCMapName currentdict /CMap defineresource pop\nend\nend\n");
    cmap.into_bytes()
}

/// The character a WinAnsi code stands for, if the code is assigned.
pub fn from_win_ansi(code: u8) -> Option<char> {
    match code {
        0x20..=0x7E | 0xA0..=0xFF => Some(code as char),
        0x80..=0x9F => HIGH_CODES[usize::from(code - 0x80)],
        _ => None,
    }
}
