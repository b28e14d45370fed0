//! Compiled tuning configuration
//!
//! Built once per distinct config text by `parse::parse_tuning_config` and
//! never mutated afterwards. Reference tuning changes produce a new value.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

use super::symbol_code::{SymbolCode, NATURAL};
use super::xen_note::{av_key, AccidentalVector, XenNote};
use crate::utils::modulo;

/// One linear chain of accidentals, e.g. `bb b (100c) # x`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccidentalChain {
    /// Symbols per degree. `None` at `central_idx`.
    pub degrees: Vec<Option<Vec<SymbolCode>>>,

    /// Cents per degree, including the increment and any per-degree offset
    pub tunings: Vec<f64>,

    pub central_idx: usize,
}

impl AccidentalChain {
    pub fn len(&self) -> usize {
        self.degrees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.degrees.is_empty()
    }

    /// Lowest signed degree
    pub fn min_degree(&self) -> i32 {
        -(self.central_idx as i32)
    }

    /// Highest signed degree
    pub fn max_degree(&self) -> i32 {
        self.degrees.len() as i32 - 1 - self.central_idx as i32
    }

    /// Symbols of a signed degree. `None` for the central degree or out of range.
    pub fn symbols_at(&self, degree: i32) -> Option<&Vec<SymbolCode>> {
        let idx = degree + self.central_idx as i32;
        if idx < 0 {
            return None;
        }
        self.degrees.get(idx as usize).and_then(|d| d.as_ref())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LigatureEntry {
    /// Signed degrees of the regarded chains, in `regarding` order
    pub av: Vec<i32>,
    pub symbols: Vec<SymbolCode>,
}

/// Substitution of a compound symbol for the symbols of several chain degrees
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ligature {
    /// 0-based chain indices
    pub regarding: Vec<usize>,
    /// `?`: does not take over the canonical spelling
    pub is_weak: bool,
    /// `!`: preferred exclusively when cycling enharmonics
    pub is_important: bool,
    pub entries: Vec<LigatureEntry>,
}

impl Ligature {
    pub fn symbols_for(&self, av: &[i32]) -> Option<&Vec<SymbolCode>> {
        self.entries
            .iter()
            .find(|e| e.av.as_slice() == av)
            .map(|e| &e.symbols)
    }
}

/// Cents of a secondary accidental, either shared or per nominal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SecondaryTuning {
    Uniform(f64),
    PerNominal(Vec<f64>),
}

impl SecondaryTuning {
    pub fn cents_for(&self, nominal: usize) -> f64 {
        match self {
            SecondaryTuning::Uniform(cents) => *cents,
            SecondaryTuning::PerNominal(cents) => cents.get(nominal).copied().unwrap_or(0.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecondaryAccidental {
    pub hash: String,
    pub symbols: Vec<SymbolCode>,
    pub tuning: SecondaryTuning,
}

/// Text entered as an annotation and the symbols it stands for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AsciiConversion {
    pub from: String,
    pub to: Vec<SymbolCode>,
}

/// Explicit tuning for one nominal + accidental vector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TuningOverride {
    pub nominal: usize,
    pub av: AccidentalVector,
    pub cents: f64,
}

/// What an `aux(...)` operation holds fixed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstantConstrictions {
    /// Nominal cannot change (0 absent from the aux list)
    pub hold_nominal: bool,
    /// 0-based chains whose degree cannot change
    pub held_chains: Vec<usize>,
}

impl ConstantConstrictions {
    /// Every chain held and the nominal free: a diatonic step
    pub fn is_diatonic(&self, num_chains: usize) -> bool {
        !self.hold_nominal && self.held_chains.len() == num_chains
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DisplayPosition {
    Above,
    Below,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CentsReference {
    /// Offset from the unmodified nominal
    Nominal,
    /// Cents above the reference, reduced to one equave
    Absolute,
    /// Offset from the nearest 12edo semitone
    Semitone,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CentsDisplay {
    pub reference: CentsReference,
    pub precision: u32,
    pub position: DisplayPosition,
}

impl Default for CentsDisplay {
    fn default() -> Self {
        Self {
            reference: CentsReference::Nominal,
            precision: 0,
            position: DisplayPosition::Above,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepsDisplay {
    pub steps: u32,
    pub position: DisplayPosition,
}

/// Cents (wrapped into one equave) and how many equaves were added to wrap
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TuningEntry {
    pub cents: f64,
    pub equaves_adjusted: i32,
}

impl TuningEntry {
    /// Pre-wrap cents from the reference nominal
    pub fn unwrapped(&self, equave_size: f64) -> f64 {
        self.cents - self.equaves_adjusted as f64 * equave_size
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TuningConfig {
    /// Cents of each nominal from the reference nominal
    pub nominals: Vec<f64>,
    pub num_nominals: usize,

    /// Signed, nonzero
    pub equave_size: f64,

    /// Nominals from A4 to the reference note
    pub tuning_nominal: i32,
    /// Nominals from `tuning_nominal` to the note used as 1/1 for JI annotations
    pub relative_tuning_nominal: i32,
    /// MIDI note of the reference
    pub tuning_note: i32,
    pub tuning_freq: f64,
    pub original_tuning_freq: f64,

    pub acc_chains: Vec<AccidentalChain>,
    pub ligatures: Vec<Ligature>,
    pub overrides: Vec<TuningOverride>,

    /// Index 0 is the plain up/down operation
    pub aux_list: Vec<Option<ConstantConstrictions>>,

    pub secondary_accidentals: Vec<SecondaryAccidental>,
    pub secondary_index: HashMap<String, usize>,

    /// Conversions tried in declaration order
    pub ascii_conversions: Vec<AsciiConversion>,

    pub independent_symbol_groups: Vec<Vec<SymbolCode>>,
    pub symbol_group_lookup: HashMap<SymbolCode, usize>,
    /// First symbol of each group
    pub naturalizers: Vec<SymbolCode>,
    pub naturalizer_group: HashMap<SymbolCode, usize>,

    pub used_symbols: BTreeSet<SymbolCode>,
    pub used_secondary_symbols: BTreeSet<SymbolCode>,

    pub non_bold_text_accidental: bool,
    pub always_explicit_accidental: bool,
    pub display_cents: CentsDisplay,
    pub display_steps: Option<StepsDisplay>,

    pub notes_table: HashMap<String, XenNote>,
    pub av_table: HashMap<String, AccidentalVector>,
    pub tuning_table: HashMap<String, TuningEntry>,
    /// Canonical spelling per accidental vector, keyed by `av_key`
    pub av_to_symbols: HashMap<String, Vec<SymbolCode>>,

    /// Enharmonic groups in ascending cents
    pub steps_list: Vec<Vec<String>>,
    pub steps_lookup: HashMap<String, usize>,
    pub enharmonics: HashMap<String, String>,
}

impl TuningConfig {
    pub fn num_chains(&self) -> usize {
        self.acc_chains.len()
    }

    /// Nominal index of a note `nominals_from_a4` letters away from A4
    pub fn nominal_of(&self, nominals_from_a4: i32) -> usize {
        modulo(nominals_from_a4 - self.tuning_nominal, self.num_nominals as i32) as usize
    }

    /// Equaves between the reference and a note
    pub fn equaves_of(&self, nominals_from_a4: i32) -> i32 {
        (nominals_from_a4 - self.tuning_nominal).div_euclid(self.num_nominals as i32)
    }

    pub fn note(&self, hash: &str) -> Option<&XenNote> {
        self.notes_table.get(hash)
    }

    pub fn av(&self, hash: &str) -> Option<&AccidentalVector> {
        self.av_table.get(hash)
    }

    pub fn tuning(&self, hash: &str) -> Option<&TuningEntry> {
        self.tuning_table.get(hash)
    }

    pub fn canonical_symbols(&self, av: &[i32]) -> Option<&Vec<SymbolCode>> {
        self.av_to_symbols.get(&av_key(av))
    }

    pub fn aux(&self, idx: usize) -> Option<&ConstantConstrictions> {
        self.aux_list.get(idx).and_then(|c| c.as_ref())
    }

    /// Symbol group of a symbol. Unregistered symbols belong to group 0.
    pub fn group_of(&self, sym: &SymbolCode) -> usize {
        self.symbol_group_lookup.get(sym).copied().unwrap_or(0)
    }

    pub fn num_groups(&self) -> usize {
        self.independent_symbol_groups.len().max(1)
    }

    pub fn naturalizer(&self, group: usize) -> SymbolCode {
        self.naturalizers.get(group).cloned().unwrap_or(NATURAL)
    }

    pub fn is_naturalizer(&self, sym: &SymbolCode) -> bool {
        self.naturalizer_group.contains_key(sym)
    }

    /// Used as a primary or secondary accidental
    pub fn uses_symbol(&self, sym: &SymbolCode) -> bool {
        self.used_symbols.contains(sym) || self.used_secondary_symbols.contains(sym)
    }

    pub fn secondary(&self, idx: usize) -> Option<&SecondaryAccidental> {
        self.secondary_accidentals.get(idx)
    }

    /// Cents of the reference frequency above A440
    pub fn reference_cents_from_a440(&self) -> f64 {
        (self.tuning_freq / 440.0).log2() * 1200.0
    }

    /// Cents from the reference to the relative reference nominal
    pub fn relative_reference_cents(&self) -> f64 {
        let n = self.num_nominals as i32;
        let nominal = modulo(self.relative_tuning_nominal, n) as usize;
        let equaves = self.relative_tuning_nominal.div_euclid(n);
        self.nominals[nominal] + equaves as f64 * self.equave_size
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
