//! Canonical note spellings

use serde::{Deserialize, Serialize};

use super::accidental_symbols::AccidentalSymbols;
use super::symbol_code::SymbolCode;

/// Signed degree per accidental chain, 0 = the chain's central degree
pub type AccidentalVector = Vec<i32>;

/// Map key for an accidental vector, e.g. `"-1,0,2"`
pub fn av_key(av: &[i32]) -> String {
    av.iter()
        .map(|d| d.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

/// `"<nominal> <accidental hash>"`, or just the nominal without accidentals
pub fn xen_hash(nominal: usize, accidentals: &AccidentalSymbols) -> String {
    if accidentals.is_empty() {
        nominal.to_string()
    } else {
        format!("{} {}", nominal, accidentals.to_hash())
    }
}

/// One spelling of a note in a tuning system
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct XenNote {
    pub nominal: usize,

    /// Left-to-right rendering order of the accidental symbols
    pub ordered_symbols: Vec<SymbolCode>,

    pub hash: String,

    /// Spelling comes from a strong (non-`?`) ligature
    pub has_ligature_priority: bool,

    /// Spelling comes from an important (`!`) ligature, or has no accidentals
    /// in a config without chains
    pub has_important_ligature: bool,
}

impl XenNote {
    pub fn new(nominal: usize, ordered_symbols: Vec<SymbolCode>) -> Self {
        let hash = xen_hash(nominal, &AccidentalSymbols::from_list(&ordered_symbols));
        Self {
            nominal,
            ordered_symbols,
            hash,
            has_ligature_priority: false,
            has_important_ligature: false,
        }
    }

    pub fn accidentals(&self) -> AccidentalSymbols {
        AccidentalSymbols::from_list(&self.ordered_symbols)
    }

    /// True for a bare nominal with no accidental symbols
    pub fn is_bare_nominal(&self) -> bool {
        self.ordered_symbols.is_empty()
    }
}
