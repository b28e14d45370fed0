//! Per-nominal default accidentals

use serde::{Deserialize, Serialize};

use super::accidental_symbols::AccidentalSymbols;
use super::tuning_config::TuningConfig;

/// Accidental hash per nominal, `None` for no accidental.
///
/// Parsed without knowing the tuning, so the number of entries may not match
/// the config it is used with. Check `is_valid_for` before applying.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeySig(pub Vec<Option<String>>);

impl KeySig {
    pub fn new(entries: Vec<Option<String>>) -> Self {
        Self(entries)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn is_valid_for(&self, config: &TuningConfig) -> bool {
        self.0.len() == config.num_nominals
    }

    /// Accidental hash of a nominal
    pub fn get(&self, nominal: usize) -> Option<&str> {
        self.0.get(nominal).and_then(|entry| entry.as_deref())
    }

    /// Accidental symbols of a nominal, `None` if the entry is empty or malformed
    pub fn symbols(&self, nominal: usize) -> Option<AccidentalSymbols> {
        let hash = self.get(nominal)?;
        match AccidentalSymbols::from_hash(hash) {
            Ok(symbols) if !symbols.is_empty() => Some(symbols),
            Ok(_) => None,
            Err(e) => {
                log::warn!("ignoring malformed key signature entry '{}': {}", hash, e);
                None
            }
        }
    }
}

/// Key signature only if it fits the config's nominal count
pub fn valid_key_sig<'a>(key_sig: Option<&'a KeySig>, config: &TuningConfig) -> Option<&'a KeySig> {
    match key_sig {
        Some(ks) if ks.is_valid_for(config) => Some(ks),
        Some(ks) => {
            log::debug!(
                "key signature has {} entries, tuning has {} nominals; ignoring",
                ks.len(),
                config.num_nominals
            );
            None
        }
        None => None,
    }
}
