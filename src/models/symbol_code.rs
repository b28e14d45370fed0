//! Accidental symbol identifiers
//!
//! A symbol is either a glyph from the symbol table (numeric code) or a
//! free-form ASCII accidental entered as text. Numeric codes always sort
//! before text codes, so the two spaces never collide in a hash.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Code of the natural sign, the default naturalizer of a config
pub const NATURAL: SymbolCode = SymbolCode::Glyph(2);

/// Marker prefixed to text accidentals in hashes
pub const TEXT_MARKER: char = '\'';

/// Serialized as its hash word so it can key JSON maps
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum SymbolCode {
    /// Index into the symbol table
    Glyph(u16),
    /// ASCII accidental text, stored without the quote marker
    Text(String),
}

impl SymbolCode {
    pub fn text(s: impl Into<String>) -> Self {
        SymbolCode::Text(s.into())
    }

    pub fn is_text(&self) -> bool {
        matches!(self, SymbolCode::Text(_))
    }

    pub fn glyph_code(&self) -> Option<u16> {
        match self {
            SymbolCode::Glyph(code) => Some(*code),
            SymbolCode::Text(_) => None,
        }
    }
}

impl From<u16> for SymbolCode {
    fn from(code: u16) -> Self {
        SymbolCode::Glyph(code)
    }
}

/// Hash word form: `3` for glyphs, `'abc` for text
impl fmt::Display for SymbolCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SymbolCode::Glyph(code) => write!(f, "{}", code),
            SymbolCode::Text(text) => write!(f, "{}{}", TEXT_MARKER, text),
        }
    }
}

impl FromStr for SymbolCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(text) = s.strip_prefix(TEXT_MARKER) {
            return Ok(SymbolCode::Text(text.to_string()));
        }
        s.parse::<u16>()
            .map(SymbolCode::Glyph)
            .map_err(|_| format!("Invalid symbol code: {}", s))
    }
}

impl From<SymbolCode> for String {
    fn from(sym: SymbolCode) -> String {
        sym.to_string()
    }
}

impl TryFrom<String> for SymbolCode {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}
