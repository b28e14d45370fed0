//! Static bidirectional lookup between symbol codes, glyph labels and text codes

pub mod table;

use once_cell::sync::Lazy;
use std::collections::HashMap;

use crate::models::SymbolCode;
use table::{build_entries, SymbolEntry};

struct Tables {
    entries: Vec<SymbolEntry>,
    label_to_code: HashMap<String, u16>,
    text_to_code: HashMap<String, u16>,
}

static TABLES: Lazy<Tables> = Lazy::new(|| {
    let entries = build_entries();
    let mut label_to_code = HashMap::new();
    let mut text_to_code = HashMap::new();

    for entry in &entries {
        for label in &entry.labels {
            label_to_code.insert(label.clone(), entry.code);
        }
        if let Some(text) = &entry.text_code {
            text_to_code.insert(text.clone(), entry.code);
        }
    }

    Tables {
        entries,
        label_to_code,
        text_to_code,
    }
});

/// Stateless facade over the symbol table
pub struct SymbolTable;

impl SymbolTable {
    /// Number of valid numeric codes, including the reserved code 0
    pub fn len() -> usize {
        TABLES.entries.len() + 1
    }

    fn entry(code: u16) -> Option<&'static SymbolEntry> {
        if code == 0 {
            return None;
        }
        TABLES.entries.get(code as usize - 1)
    }

    /// Code for a text code such as `#` or `bv2`
    pub fn code_from_text(text: &str) -> Option<u16> {
        TABLES.text_to_code.get(text).copied()
    }

    /// Code for a glyph label as reported by the host
    pub fn code_from_label(label: &str) -> Option<u16> {
        TABLES.label_to_code.get(label).copied()
    }

    /// All labels of a code. The first is the preferred SMuFL name.
    pub fn labels(code: u16) -> &'static [String] {
        Self::entry(code).map(|e| e.labels.as_slice()).unwrap_or(&[])
    }

    pub fn primary_label(code: u16) -> Option<&'static str> {
        Self::labels(code).first().map(|s| s.as_str())
    }

    pub fn text_code(code: u16) -> Option<&'static str> {
        Self::entry(code).and_then(|e| e.text_code.as_deref())
    }

    /// Human readable name of any symbol, used in diagnostics
    pub fn describe(sym: &SymbolCode) -> String {
        match sym {
            SymbolCode::Glyph(code) => Self::text_code(*code)
                .or_else(|| Self::primary_label(*code))
                .map(|s| s.to_string())
                .unwrap_or_else(|| format!("#{}", code)),
            SymbolCode::Text(text) => format!("'{}'", text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conventional_codes() {
        assert_eq!(SymbolTable::code_from_text("b"), Some(1));
        assert_eq!(SymbolTable::code_from_text("n"), Some(2));
        assert_eq!(SymbolTable::code_from_text("#"), Some(3));
        assert_eq!(SymbolTable::code_from_text("x"), Some(4));
        assert_eq!(SymbolTable::code_from_text("bbb"), Some(7));
        assert_eq!(SymbolTable::code_from_text("nope"), None);
    }

    #[test]
    fn test_label_lookup_both_ways() {
        let code = SymbolTable::code_from_label("accidentalSharp").unwrap();
        assert_eq!(code, 3);
        assert_eq!(SymbolTable::code_from_label("SHARP"), Some(3));
        assert_eq!(SymbolTable::primary_label(code), Some("accidentalSharp"));
    }

    #[test]
    fn test_reserved_zero() {
        assert!(SymbolTable::labels(0).is_empty());
        assert_eq!(SymbolTable::text_code(0), None);
        assert!(SymbolTable::len() > 60);
    }

    #[test]
    fn test_describe() {
        assert_eq!(SymbolTable::describe(&SymbolCode::Glyph(3)), "#");
        assert_eq!(SymbolTable::describe(&SymbolCode::text("+")), "'+'");
    }
}
