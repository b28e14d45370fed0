//! Steps and cents readouts attached to notes
//!
//! Configured by the `displaysteps(...)` and `displaycents(...)` directives.
//! Both measure from the relative reference nominal (the 1/1 of the tuning).

use serde::{Deserialize, Serialize};

use crate::models::{CentsReference, DisplayPosition, NoteData, TuningConfig};
use crate::settings::EngineSettings;
use crate::utils::{modulo, modulo_f64, round_to};

use super::cents::calc_cents_offset;

/// Text to attach to a note and where
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayText {
    pub text: String,
    pub position: DisplayPosition,
}

/// Just below half a semitone, so exact quarter tones read as sharp
const HALF_SEMITONE: f64 = 49.99999999;

fn relative_reference_from_a440(config: &TuningConfig) -> f64 {
    config.relative_reference_cents() + config.reference_cents_from_a440()
}

/// Step number of the note within the equave, `None` without `displaysteps`.
///
/// If the config has exactly that many steps and the note has no secondary
/// accidentals, the step is read off the compiled steps. Otherwise it is the
/// nearest step of an equal division.
pub fn steps_display(
    data: &NoteData,
    config: &TuningConfig,
    settings: &EngineSettings,
) -> Option<DisplayText> {
    let display = config.display_steps?;
    let steps = display.steps as i32;
    if steps == 0 {
        return None;
    }

    let n = config.num_nominals as i32;
    let reference_hash = modulo(config.relative_tuning_nominal, n).to_string();

    let from_table = if config.steps_list.len() == display.steps as usize
        && data.secondary_acc_syms.is_empty()
    {
        match (
            config.steps_lookup.get(&reference_hash),
            config.steps_lookup.get(&data.xen.hash),
        ) {
            (Some(&reference), Some(&note)) => Some(modulo(note as i32 - reference as i32, steps)),
            _ => None,
        }
    } else {
        None
    };

    let step = from_table.unwrap_or_else(|| {
        let cents = calc_cents_offset(data, config, true, settings) - relative_reference_from_a440(config);
        let step = (cents / config.equave_size * steps as f64).round() as i32;
        modulo(step, steps)
    });

    Some(DisplayText {
        text: step.to_string(),
        position: display.position,
    })
}

/// Cents readout per the config's `displaycents` settings
pub fn cents_display(data: &NoteData, config: &TuningConfig, settings: &EngineSettings) -> DisplayText {
    let display = config.display_cents;
    let from_a440 = calc_cents_offset(data, config, true, settings);

    let (cents, signed) = match display.reference {
        CentsReference::Absolute => {
            let from_reference = from_a440 - relative_reference_from_a440(config);
            (modulo_f64(from_reference, config.equave_size), false)
        }
        CentsReference::Nominal => {
            let nominal = config.reference_cents_from_a440()
                + config.nominals[data.xen.nominal]
                + data.equaves as f64 * config.equave_size;
            (from_a440 - nominal, true)
        }
        CentsReference::Semitone => {
            let from_reference = from_a440 - relative_reference_from_a440(config);
            (modulo_f64(from_reference + HALF_SEMITONE, 100.0) - HALF_SEMITONE, true)
        }
    };

    let cents = round_to(cents, display.precision);
    let sign = if signed && cents >= 0.0 { "+" } else { "" };

    DisplayText {
        text: format!("{}{:.*}", sign, display.precision as usize, cents),
        position: display.position,
    }
}
