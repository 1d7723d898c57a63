// Copyright (c) 2026 rezky_nightky

//! Glyph alphabets for the rain layer.

use std::char;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Charset(u32);

impl Charset {
    pub const NONE: Charset = Charset(0);
    pub const UPPER: Charset = Charset(0x1);
    pub const DIGITS: Charset = Charset(0x2);
    /// The punctuation run of the classic boot-screen alphabet.
    pub const BOOT_PUNCT: Charset = Charset(0x4);
    /// Half-width, so every glyph stays one terminal cell wide.
    pub const KATAKANA: Charset = Charset(0x8);
    pub const BINARY: Charset = Charset(0x10);
    pub const HEX: Charset = Charset(0x20);
    pub const GREEK: Charset = Charset(0x40);
    pub const SYMBOLS: Charset = Charset(0x80);
    pub const BRAILLE: Charset = Charset(0x100);
    pub const BLOCKS: Charset = Charset(0x200);

    pub const COSMIC: Charset = Charset(0xF);
    pub const ASCII_SAFE: Charset = Charset(0x7);

    pub const fn union(self, other: Charset) -> Charset {
        Charset(self.0 | other.0)
    }

    pub fn contains(self, other: Charset) -> bool {
        (self.0 & other.0) != 0
    }
}

pub const BOOT_PUNCTUATION: &str = "!@#$%^&*()_+-=[]{}|;:,.<>?";

/// `(name, description)` for `--list-charsets`.
pub const CHARSET_NAMES: &[(&str, &str)] = &[
    ("auto", "cosmic, or ascii when the locale is not UTF-8"),
    ("cosmic", "katakana, A-Z, 0-9 and boot punctuation"),
    ("ascii", "A-Z, 0-9 and boot punctuation"),
    ("katakana", "half-width katakana only"),
    ("binary", "0 and 1"),
    ("hex", "0-9 and A-F"),
    ("greek", "Greek capitals and small letters"),
    ("quantum", "Greek letters and math symbols"),
    ("braille", "Braille patterns"),
    ("blocks", "block elements"),
];

pub fn parse_user_hex_chars(s: &str) -> Result<Vec<char>, String> {
    let mut out = Vec::new();
    for (i, part) in s.split(',').enumerate() {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let v = u32::from_str_radix(part.trim_start_matches("0x"), 16)
            .map_err(|_| format!("invalid hex char at index {}", i + 1))?;
        let ch = char::from_u32(v)
            .ok_or_else(|| format!("invalid unicode scalar at index {}", i + 1))?;
        out.push(ch);
    }
    Ok(out)
}

pub fn charset_from_str(name: &str, default_to_ascii: bool) -> Result<Charset, String> {
    let name = name.trim().to_ascii_lowercase();
    match name.as_str() {
        "auto" => Ok(if default_to_ascii {
            Charset::ASCII_SAFE
        } else {
            Charset::COSMIC
        }),
        "cosmic" | "matrix" => Ok(Charset::COSMIC),
        "ascii" => Ok(Charset::ASCII_SAFE),
        "katakana" => Ok(Charset::KATAKANA),
        "bin" | "binary" | "01" => Ok(Charset::BINARY),
        "hex" | "hexadecimal" => Ok(Charset::HEX),
        "greek" => Ok(Charset::GREEK),
        "quantum" => Ok(Charset::GREEK.union(Charset::SYMBOLS)),
        "braille" => Ok(Charset::BRAILLE),
        "blocks" => Ok(Charset::BLOCKS),
        _ => Err(format!("unsupported charset: {} (see --list-charsets)", name)),
    }
}

fn push_range(out: &mut Vec<char>, start: u32, end: u32) {
    out.extend((start..=end).filter_map(char::from_u32));
}

/// Expands `charset` plus any explicit glyphs into a de-duplicated alphabet.
/// Never returns an empty alphabet.
pub fn build_chars(charset: Charset, extra: &[char]) -> Vec<char> {
    let mut out: Vec<char> = Vec::new();

    if charset.contains(Charset::KATAKANA) {
        push_range(&mut out, 0xFF66, 0xFF9D);
    }
    if charset.contains(Charset::DIGITS) {
        push_range(&mut out, 0x30, 0x39);
    }
    if charset.contains(Charset::UPPER) {
        push_range(&mut out, 0x41, 0x5A);
    }
    if charset.contains(Charset::BOOT_PUNCT) {
        out.extend(BOOT_PUNCTUATION.chars());
    }
    if charset.contains(Charset::BINARY) {
        push_range(&mut out, 0x30, 0x31);
    }
    if charset.contains(Charset::HEX) {
        push_range(&mut out, 0x30, 0x39);
        push_range(&mut out, 0x41, 0x46);
    }
    if charset.contains(Charset::GREEK) {
        push_range(&mut out, 0x0391, 0x03A1);
        push_range(&mut out, 0x03A3, 0x03A9);
        push_range(&mut out, 0x03B1, 0x03C9);
    }
    if charset.contains(Charset::SYMBOLS) {
        out.extend("∞∑∫√π∆Ωµλ≈≠≤≥×÷±∂∇∈∩∪⊕⊗".chars());
    }
    if charset.contains(Charset::BRAILLE) {
        push_range(&mut out, 0x2801, 0x28FF);
    }
    if charset.contains(Charset::BLOCKS) {
        push_range(&mut out, 0x2580, 0x259F);
    }
    out.extend(extra.iter().copied().filter(|c| !c.is_control() && !c.is_whitespace()));

    let mut seen = std::collections::HashSet::new();
    out.retain(|c| seen.insert(*c));

    if out.is_empty() {
        out.push('0');
        out.push('1');
    }
    out
}
