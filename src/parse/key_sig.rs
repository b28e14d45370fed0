//! Key signature directive
//!
//! `keysig <nominal 0 symbols> <nominal 1 symbols> ...` with one symbols
//! declaration per nominal, counted from the reference nominal. The keyword
//! is case-insensitive.

use crate::models::{AccidentalSymbols, KeySig, SymbolCode, NATURAL};

use super::tokens::{parse_symbols_declaration, space_separated};

const KEYWORD: &str = "keysig";

/// Entry symbols that mean "no accidental" for the nominal
fn is_no_accidental(sym: &SymbolCode) -> bool {
    *sym == SymbolCode::Glyph(0) || *sym == NATURAL
}

/// `None` if the text is not a key signature. Invalid entries read as no accidental.
pub fn parse_key_sig(text: &str) -> Option<KeySig> {
    let text = text.trim();
    let prefix = text.get(..KEYWORD.len())?;
    if !prefix.eq_ignore_ascii_case(KEYWORD) {
        return None;
    }

    let entries = space_separated(text)
        .into_iter()
        .skip(1)
        .map(|word| match parse_symbols_declaration(word) {
            Some(symbols) if !symbols.first().map_or(true, is_no_accidental) => {
                Some(AccidentalSymbols::from_list(&symbols).to_hash())
            }
            Some(_) => None,
            None => {
                log::warn!("key signature: '{}' is not a valid symbols declaration", word);
                None
            }
        })
        .collect();

    let key_sig = KeySig::new(entries);
    log::debug!("parsed key signature: {:?}", key_sig);
    Some(key_sig)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_entries() {
        let ks = parse_key_sig("keysig n n # n n b.b 0").unwrap();
        assert_eq!(ks.len(), 7);
        assert_eq!(ks.get(0), None);
        assert_eq!(ks.get(2), Some("3 1"));
        assert_eq!(ks.get(5), Some("1 2"));
        assert_eq!(ks.get(6), None);
    }

    #[test]
    fn test_keyword_case_insensitive() {
        assert!(parse_key_sig("KeySig # #").is_some());
        assert!(parse_key_sig("  KEYSIG").unwrap().is_empty());
    }

    #[test]
    fn test_not_a_key_sig() {
        assert!(parse_key_sig("A4: 440").is_none());
        assert!(parse_key_sig("key").is_none());
        assert!(parse_key_sig("").is_none());
    }

    #[test]
    fn test_invalid_symbol_is_no_accidental() {
        let ks = parse_key_sig("keysig # what").unwrap();
        assert_eq!(ks.len(), 2);
        assert_eq!(ks.get(1), None);
    }
}
