//! Character encoding used by Generation III games for names and nicknames.
//!
//! Each byte indexes [`GLYPHS`]; empty entries are unmapped or control
//! codes. `0xFF` terminates a string and pads unused field bytes.

pub const TERMINATOR: u8 = 0xFF;
pub const LINE_BREAK: u8 = 0xFE;
pub const PAGE_BREAK: u8 = 0xFB;
pub const SPACE: u8 = 0x00;

#[rustfmt::skip]
pub const GLYPHS: [&str; 256] = [
    // 0x00
    " ", "À", "Á", "Â", "Ç", "È", "É", "Ê", "Ë", "Ì", "", "Î", "Ï", "Ò", "Ó", "Ô",
    // 0x10
    "Œ", "Ù", "Ú", "Û", "Ñ", "ß", "à", "á", "", "ç", "è", "é", "ê", "ë", "ì", "",
    // 0x20
    "î", "ï", "ò", "ó", "ô", "œ", "ù", "ú", "û", "ñ", "º", "ª", "ᵉʳ", "&", "+", "",
    // 0x30
    "", "", "", "", "Lv", "=", ";", "", "", "", "", "", "", "", "", "",
    // 0x40
    "", "", "", "", "", "", "", "", "", "", "", "", "", "", "", "",
    // 0x50
    "", "¿", "¡", "PK", "MN", "PO", "Ké", "BL", "OC", "K", "Í", "%", "(", ")", "", "",
    // 0x60
    "", "", "", "", "", "", "", "", "â", "", "", "", "", "", "", "í",
    // 0x70
    "", "", "", "", "", "", "", "", "", "↑", "↓", "←", "→", "", "", "",
    // 0x80
    "", "", "", "", "ᵉ", "<", ">", "", "", "", "", "", "", "", "", "",
    // 0x90
    "", "", "", "", "", "", "", "", "", "", "", "", "", "", "", "",
    // 0xA0
    "ʳᵉ", "0", "1", "2", "3", "4", "5", "6", "7", "8", "9", "!", "?", ".", "-", "・",
    // 0xB0
    "…", "“", "”", "‘", "’", "♂", "♀", "$", ",", "×", "/", "A", "B", "C", "D", "E",
    // 0xC0
    "F", "G", "H", "I", "J", "K", "L", "M", "N", "O", "P", "Q", "R", "S", "T", "U",
    // 0xD0
    "V", "W", "X", "Y", "Z", "a", "b", "c", "d", "e", "f", "g", "h", "i", "j", "k",
    // 0xE0
    "l", "m", "n", "o", "p", "q", "r", "s", "t", "u", "v", "w", "x", "y", "z", "▶",
    // 0xF0
    ":", "Ä", "Ö", "Ü", "ä", "ö", "ü", "", "", "", "", "", "", "", "", "",
];

/// Decodes bytes up to the first terminator.
///
/// Line and page breaks are dropped, as are bytes with no glyph.
pub fn decode(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    for &b in bytes {
        match b {
            TERMINATOR => break,
            LINE_BREAK | PAGE_BREAK => continue,
            _ => out.push_str(GLYPHS[b as usize]),
        }
    }
    out
}

/// Encodes `text` into a field of exactly `len` bytes, padded with `0xFF`.
///
/// Characters without a glyph become spaces; text longer than the field
/// is truncated.
pub fn encode(text: &str, len: usize) -> Vec<u8> {
    let mut out = vec![TERMINATOR; len];
    for (slot, ch) in out.iter_mut().zip(text.chars()) {
        *slot = encode_char(ch).unwrap_or(SPACE);
    }
    out
}

/// Returns the byte for a single-character glyph.
pub fn encode_char(ch: char) -> Option<u8> {
    let mut buf = [0u8; 4];
    let needle: &str = match ch {
        '\'' => "’",
        '"' => "”",
        _ => ch.encode_utf8(&mut buf),
    };
    GLYPHS
        .iter()
        .position(|glyph| *glyph == needle)
        .map(|idx| idx as u8)
}

/// Strips trailing `0xFF` padding, scanning from the end.
pub fn trim_padding(bytes: &[u8]) -> &[u8] {
    let end = bytes
        .iter()
        .rposition(|&b| b != TERMINATOR)
        .map_or(0, |idx| idx + 1);
    &bytes[..end]
}
