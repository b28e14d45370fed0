//! Multiset of accidental symbols
//!
//! Order of appearance is irrelevant here. Left-to-right rendering order is
//! carried separately as a plain `Vec<SymbolCode>`.
//!
//! Hash format: `"<sym> <count> <sym> <count> ..."` sorted by symbol code,
//! e.g. `"3 1 '+ 2"` is one sharp and two `+` text accidentals.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::symbol_code::SymbolCode;

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccidentalSymbols {
    counts: BTreeMap<SymbolCode, u32>,
}

impl AccidentalSymbols {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_list(symbols: &[SymbolCode]) -> Self {
        let mut acc = Self::new();
        for sym in symbols {
            acc.insert(sym.clone(), 1);
        }
        acc
    }

    /// Parse an accidental hash. The empty string is the empty multiset.
    pub fn from_hash(hash: &str) -> Result<Self, String> {
        let words: Vec<&str> = hash.split_whitespace().collect();
        if words.len() % 2 != 0 {
            return Err(format!("Odd number of words in accidental hash: {}", hash));
        }

        let mut acc = Self::new();
        for pair in words.chunks(2) {
            let sym: SymbolCode = pair[0].parse()?;
            let count: u32 = pair[1]
                .parse()
                .map_err(|_| format!("Invalid symbol count '{}' in hash: {}", pair[1], hash))?;
            acc.insert(sym, count);
        }
        Ok(acc)
    }

    pub fn to_hash(&self) -> String {
        self.counts
            .iter()
            .map(|(sym, count)| format!("{} {}", sym, count))
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Number of distinct symbols
    pub fn distinct(&self) -> usize {
        self.counts.len()
    }

    /// Number of symbols counting repeats
    pub fn total(&self) -> u32 {
        self.counts.values().sum()
    }

    pub fn count(&self, sym: &SymbolCode) -> u32 {
        self.counts.get(sym).copied().unwrap_or(0)
    }

    pub fn contains(&self, sym: &SymbolCode) -> bool {
        self.counts.contains_key(sym)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SymbolCode, u32)> {
        self.counts.iter().map(|(sym, count)| (sym, *count))
    }

    pub fn symbols(&self) -> impl Iterator<Item = &SymbolCode> {
        self.counts.keys()
    }

    pub fn insert(&mut self, sym: SymbolCode, count: u32) {
        if count == 0 {
            return;
        }
        *self.counts.entry(sym).or_insert(0) += count;
    }

    /// Overwrite the count of a symbol
    pub fn set(&mut self, sym: SymbolCode, count: u32) {
        if count == 0 {
            self.counts.remove(&sym);
        } else {
            self.counts.insert(sym, count);
        }
    }

    pub fn remove(&mut self, sym: &SymbolCode) -> u32 {
        self.counts.remove(sym).unwrap_or(0)
    }

    pub fn retain(&mut self, mut keep: impl FnMut(&SymbolCode) -> bool) {
        self.counts.retain(|sym, _| keep(sym));
    }

    pub fn add(&self, other: &AccidentalSymbols) -> AccidentalSymbols {
        let mut sum = self.clone();
        for (sym, count) in other.iter() {
            sum.insert(sym.clone(), count);
        }
        sum
    }

    /// Remove `other` from `self`. `None` if `other` is not a sub-multiset.
    pub fn checked_sub(&self, other: &AccidentalSymbols) -> Option<AccidentalSymbols> {
        let mut diff = self.clone();
        for (sym, count) in other.iter() {
            let have = diff.count(sym);
            if have < count {
                return None;
            }
            diff.set(sym.clone(), have - count);
        }
        Some(diff)
    }

    pub fn checked_sub_list(&self, symbols: &[SymbolCode]) -> Option<AccidentalSymbols> {
        self.checked_sub(&AccidentalSymbols::from_list(symbols))
    }

    /// Expanded list in hash order
    pub fn to_list(&self) -> Vec<SymbolCode> {
        let mut list = Vec::with_capacity(self.total() as usize);
        for (sym, count) in self.iter() {
            for _ in 0..count {
                list.push(sym.clone());
            }
        }
        list
    }
}

impl fmt::Display for AccidentalSymbols {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hash())
    }
}

impl FromIterator<SymbolCode> for AccidentalSymbols {
    fn from_iter<I: IntoIterator<Item = SymbolCode>>(iter: I) -> Self {
        let mut acc = Self::new();
        for sym in iter {
            acc.insert(sym, 1);
        }
        acc
    }
}
