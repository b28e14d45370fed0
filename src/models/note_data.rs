//! Resolved notes and navigation results

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::note::MsNote;
use super::symbol_code::SymbolCode;
use super::xen_note::XenNote;

/// A host note resolved against a tuning config
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteData {
    pub ms: MsNote,
    pub xen: XenNote,

    /// Equaves between the reference nominal and this note's nominal
    pub equaves: i32,

    /// Matched secondary symbols, left-to-right
    pub secondary_acc_syms: Vec<SymbolCode>,

    /// Secondary accidental index → number of times matched
    pub secondary_acc_matches: BTreeMap<usize, u32>,

    /// Replacement symbols for the note, set when a fingering entered new accidentals
    pub updated_symbols: Option<Vec<SymbolCode>>,

    /// Index into `ms.fingerings` of the fingering consumed as accidental entry
    pub consumed_fingering: Option<usize>,
}

impl NoteData {
    pub fn nominal(&self) -> usize {
        self.xen.nominal
    }

    /// Secondary followed by primary symbols, as rendered left-to-right
    pub fn all_symbols(&self) -> Vec<SymbolCode> {
        self.secondary_acc_syms
            .iter()
            .chain(self.xen.ordered_symbols.iter())
            .cloned()
            .collect()
    }

    pub fn has_secondary(&self) -> bool {
        !self.secondary_acc_matches.is_empty()
    }
}

/// Spelling chosen by the navigator, without secondary accidentals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NextNote {
    pub xen: XenNote,

    /// Nominals from A4 of the new spelling
    pub nominals_from_a4: i32,

    /// Equaves of the new spelling relative to the reference
    pub equaves: i32,

    /// Change in staff line (negated nominal change)
    pub line_offset: i32,

    /// Spelling was taken from the prior accidental or key signature
    pub matches_prior_acc: bool,
}
