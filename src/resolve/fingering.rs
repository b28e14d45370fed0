//! Accidental entry through annotation text
//!
//! A freshly typed annotation on a note can spell its accidentals either as
//! ASCII text declared in the `sec()` conversions (`#+`, `bv`, ...) or as an
//! accidental vector literal `a<deg>,<deg>,...`.

use serde::{Deserialize, Serialize};

use crate::models::{av_key, AccidentalVector, FingeringKind, MsNote, SymbolCode, TuningConfig};
use crate::utils::remove_formatting_code;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FingeringEntryKind {
    Ascii,
    AccidentalVector,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FingeringEntry {
    pub symbols: Vec<SymbolCode>,
    pub kind: FingeringEntryKind,
    /// Index into the note's fingerings; the host removes it once applied
    pub fingering_idx: usize,
}

/// Convert text made up entirely of declared ASCII conversions.
///
/// Conversions are tried in declaration order and every occurrence of a
/// conversion is consumed before the next is tried. `None` if any text is
/// left over.
pub fn parse_ascii_accidentals(text: &str, config: &TuningConfig) -> Option<Vec<SymbolCode>> {
    let mut parts = vec![text.to_string()];
    let mut symbols = Vec::new();

    for conversion in &config.ascii_conversions {
        if conversion.from.is_empty() {
            continue;
        }

        let mut matches = 0;
        let mut remaining = Vec::new();
        for part in &parts {
            let pieces: Vec<&str> = part.split(conversion.from.as_str()).collect();
            matches += pieces.len() - 1;
            remaining.extend(pieces.into_iter().filter(|p| !p.is_empty()).map(String::from));
        }

        if matches > 0 {
            for _ in 0..matches {
                symbols.extend(conversion.to.iter().cloned());
            }
            parts = remaining;
        }
    }

    if parts.is_empty() {
        Some(symbols)
    } else {
        None
    }
}

/// `a1,-2` → degrees per chain. Missing degrees are 0, extra ones are ignored.
pub fn parse_av_literal(text: &str, config: &TuningConfig) -> Option<AccidentalVector> {
    let body = text.strip_prefix('a')?;
    let degrees = body
        .trim()
        .split(',')
        .map(|d| d.trim().parse::<i32>().ok())
        .collect::<Option<Vec<_>>>()?;

    Some(
        (0..config.num_chains())
            .map(|idx| degrees.get(idx).copied().unwrap_or(0))
            .collect(),
    )
}

/// First unprocessed annotation on the note that enters accidentals
pub fn read_fingering_accidental_input(note: &MsNote, config: &TuningConfig) -> Option<FingeringEntry> {
    for (idx, fingering) in note.fingerings.iter().enumerate() {
        if fingering.kind != FingeringKind::Unprocessed {
            continue;
        }

        let text = remove_formatting_code(&fingering.text);

        if let Some(symbols) = parse_ascii_accidentals(&text, config) {
            log::debug!("ascii accidental entry '{}' on {}", text, note.id);
            return Some(FingeringEntry {
                symbols,
                kind: FingeringEntryKind::Ascii,
                fingering_idx: idx,
            });
        }

        if let Some(av) = parse_av_literal(&text, config) {
            match config.canonical_symbols(&av) {
                Some(symbols) => {
                    log::debug!("accidental vector entry [{}] on {}", av_key(&av), note.id);
                    return Some(FingeringEntry {
                        symbols: symbols.clone(),
                        kind: FingeringEntryKind::AccidentalVector,
                        fingering_idx: idx,
                    });
                }
                None => log::warn!("accidental vector [{}] has no spelling", av_key(&av)),
            }
        }
    }

    None
}
