//! Word-level grammar shared by the tuning config, key signature and
//! annotation parsers

use crate::models::SymbolCode;
use crate::symbols::SymbolTable;

use super::expression::evaluate;

/// Characters that may follow a backslash in a symbols declaration
const VALID_ESCAPES: [char; 3] = ['\\', '\'', '/'];

/// Resolve a text code (`#`, `bv2`) or numeric code (`3`) to a glyph symbol
pub fn read_symbol_code(code_or_text: &str) -> Option<SymbolCode> {
    if let Some(code) = SymbolTable::code_from_text(code_or_text) {
        return Some(SymbolCode::Glyph(code));
    }

    let code: u16 = code_or_text.parse().ok()?;
    if (code as usize) < SymbolTable::len() {
        Some(SymbolCode::Glyph(code))
    } else {
        None
    }
}

/// Parse a dot-separated symbols declaration such as `b.'+'.\\`
///
/// Quoted tokens become text symbols, anything else is looked up as a code.
/// Dots inside quotes are literal. Returns `None` on an unknown code,
/// invalid escape, unterminated quote, or empty declaration.
pub fn parse_symbols_declaration(s: &str) -> Option<Vec<SymbolCode>> {
    let mut symbols = Vec::new();
    let mut in_quotes = false;
    let mut escaping = false;
    let mut current = String::new();
    let mut current_is_text = false;

    for c in s.chars() {
        if escaping {
            if !VALID_ESCAPES.contains(&c) {
                log::debug!("invalid escape sequence \\{} in '{}'", c, s);
                return None;
            }
            escaping = false;
            current.push(c);
        } else if c == '\\' {
            escaping = true;
        } else if c == '\'' {
            in_quotes = !in_quotes;
            current_is_text = true;
        } else if c == '.' && !in_quotes {
            symbols.push(finish_token(&current, current_is_text)?);
            current.clear();
            current_is_text = false;
        } else {
            current.push(c);
        }
    }

    if in_quotes || escaping {
        log::debug!("unterminated symbols declaration '{}'", s);
        return None;
    }

    if current.is_empty() {
        return None;
    }

    symbols.push(finish_token(&current, current_is_text)?);
    Some(symbols)
}

fn finish_token(token: &str, is_text: bool) -> Option<SymbolCode> {
    if is_text {
        return Some(SymbolCode::Text(token.to_string()));
    }
    let code = read_symbol_code(token);
    if code.is_none() {
        log::debug!("unknown symbol '{}'", token);
    }
    code
}

/// Parse `<expr>c` as cents, or `<expr>` as a frequency ratio converted to
/// cents. Negative ratios give negative cents, a zero ratio gives 0.
pub fn parse_cents_or_ratio(s: &str) -> Option<f64> {
    let s = s.trim();
    if let Some(cents_expr) = s.strip_suffix('c') {
        return evaluate(cents_expr).ok();
    }

    let ratio = evaluate(s).ok()?;
    Some(ratio_to_cents(ratio))
}

/// `1200*log2(r)`, mirrored for negative ratios
pub fn ratio_to_cents(ratio: f64) -> f64 {
    if ratio < 0.0 {
        -(-ratio).log2() * 1200.0
    } else if ratio == 0.0 {
        0.0
    } else {
        ratio.log2() * 1200.0
    }
}

/// Split a chain degree word into its symbols and optional trailing
/// `(<cents-or-ratio>)` offset.
///
/// If the parenthesized group spans the whole word, or does not parse as
/// cents/ratio, the whole word is the symbols declaration with no offset.
pub fn parse_symbol_offset_pair(word: &str) -> (String, f64) {
    if !word.ends_with(')') {
        return (word.to_string(), 0.0);
    }

    let chars: Vec<char> = word.chars().collect();
    let mut depth = 1;
    let mut split = 0;
    for i in (0..chars.len() - 1).rev() {
        match chars[i] {
            ')' => depth += 1,
            '(' => depth -= 1,
            _ => {}
        }
        if depth == 0 {
            split = i;
            break;
        }
    }

    if split == 0 {
        return (word.to_string(), 0.0);
    }

    let symbols: String = chars[..split].iter().collect();
    let offset: String = chars[split + 1..chars.len() - 1].iter().collect();

    match parse_cents_or_ratio(&offset) {
        Some(cents) => (symbols, cents),
        None => (word.to_string(), 0.0),
    }
}

/// Whitespace separated words with empties removed
pub fn space_separated(s: &str) -> Vec<&str> {
    s.split_whitespace().collect()
}
