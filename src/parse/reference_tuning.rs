//! Reference tuning changes
//!
//! A single line `[!]<Letter>[<Octave>]: [<frequency expr>]` retunes the
//! current config without recompiling it:
//!
//! - `C4: 263` keeps the nominal mode, retuning so that the written C4 sounds at 263 Hz
//! - `!C4: 263` makes C4 the new reference nominal at 263 Hz
//! - `C4:` only moves the 1/1 used by JI ratio annotations to C4

use serde::{Deserialize, Serialize};

use crate::models::{midi_of_letter_octave, nominals_from_letter_octave, TuningConfig};
use crate::utils::modulo;

use super::expression::evaluate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceTuningChange {
    /// Keep the config's reference nominal (no `!` prefix)
    pub preserve_nominals_mode: bool,
    /// Nominals from A4 of the declared note
    pub tuning_nominal: i32,
    /// MIDI note of the declared note
    pub tuning_note: i32,
    /// `None` when only the relative reference nominal changes
    pub tuning_freq: Option<f64>,
}

/// Parse `<Letter><Octave>` into (nominals from A4, MIDI note).
/// A missing octave takes `default_octave`, or fails if there is none.
pub(crate) fn parse_reference_pitch(s: &str, default_octave: Option<i32>) -> Option<(i32, i32)> {
    let mut chars = s.chars();
    let letter = chars.next()?;
    let octave_str = chars.as_str().trim();

    let octave = if octave_str.is_empty() {
        default_octave?
    } else {
        octave_str.parse::<i32>().ok()?
    };

    Some((
        nominals_from_letter_octave(letter, octave)?,
        midi_of_letter_octave(letter, octave)?,
    ))
}

/// Positive, finite frequency in Hz
pub(crate) fn parse_frequency(s: &str) -> Option<f64> {
    evaluate(s).ok().filter(|f| *f > 0.0 && f.is_finite())
}

pub fn parse_change_reference_tuning(text: &str) -> Option<ReferenceTuningChange> {
    let text = text.trim();
    if text.contains('\n') {
        return None;
    }

    let parts: Vec<&str> = text.split(':').map(str::trim).collect();
    if parts.len() != 2 {
        return None;
    }

    let (note, preserve_nominals_mode) = match parts[0].strip_prefix('!') {
        Some(rest) => (rest.trim(), false),
        None => (parts[0], true),
    };

    let (tuning_nominal, tuning_note) = parse_reference_pitch(note, Some(4))?;

    let tuning_freq = if parts[1].is_empty() {
        None
    } else {
        Some(parse_frequency(parts[1])?)
    };

    Some(ReferenceTuningChange {
        preserve_nominals_mode,
        tuning_nominal,
        tuning_note,
        tuning_freq,
    })
}

impl TuningConfig {
    /// New config with the reference change applied. `self` is left untouched.
    pub fn with_reference_change(&self, change: &ReferenceTuningChange) -> TuningConfig {
        let mut config = self.clone();

        match change.tuning_freq {
            Some(freq) if !change.preserve_nominals_mode => {
                config.tuning_nominal = change.tuning_nominal;
                config.relative_tuning_nominal = 0;
                config.tuning_note = change.tuning_note;
                config.tuning_freq = freq;
                config.original_tuning_freq = freq;
            }
            Some(freq) => {
                let from_reference = change.tuning_nominal - config.tuning_nominal;
                config.relative_tuning_nominal = from_reference;

                let n = config.num_nominals as i32;
                let nominal = modulo(from_reference, n) as usize;
                let equaves = from_reference.div_euclid(n);
                let old_cents = config.nominals[nominal] + equaves as f64 * config.equave_size;
                let old_hz = config.original_tuning_freq * (old_cents / 1200.0).exp2();

                config.tuning_freq = freq / old_hz * config.original_tuning_freq;
            }
            None => {
                config.relative_tuning_nominal = change.tuning_nominal - config.tuning_nominal;
            }
        }

        log::debug!(
            "reference change: nominal {} (relative {}), {} Hz",
            config.tuning_nominal,
            config.relative_tuning_nominal,
            config.tuning_freq
        );

        config
    }
}
